use clap::Parser;
use pixie::adapters::display::HeadlessSink;
use pixie::core::blink::run_animation;
use pixie::utils::error::exit_on_error;
use pixie::utils::{logger, validation::Validate};
use pixie::KioskConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "eye-blink")]
#[command(about = "Full-screen two-eye blink animation")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Render without a window
    #[arg(long)]
    headless: bool,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,

    #[arg(short, long)]
    verbose: bool,

    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logger::init(args.verbose, args.log_json);

    if let Err(e) = run(args).await {
        exit_on_error(&e);
    }
}

async fn run(args: Args) -> pixie::Result<()> {
    let config = KioskConfig::load(args.config.as_deref())?;
    config.validate()?;

    let (width, height) = (config.display.width, config.display.height);

    #[cfg(feature = "window")]
    if !args.headless {
        let mut sink = pixie::adapters::display::WindowSink::open("Pixie", width, height)?;
        let stats = run_animation(&mut sink, &config.blink_settings(args.frames)).await?;
        println!("👀 {} frames, {} blinks", stats.frames, stats.blinks);
        return Ok(());
    }

    #[cfg(not(feature = "window"))]
    if !args.headless {
        tracing::warn!("Built without the `window` feature, rendering headless");
    }

    // 無視窗模式預設只跑 10 秒
    let frames = args.frames.or(Some(10_000 / config.display.frame_ms.max(1)));
    let mut sink = HeadlessSink::new(width, height);
    let stats = run_animation(&mut sink, &config.blink_settings(frames)).await?;
    println!(
        "👀 {} frames, {} blinks (headless, {} frames with eyes)",
        stats.frames,
        stats.blinks,
        sink.frames_with_eyes()
    );
    Ok(())
}
