use clap::Parser;
use pixie::domain::model::{ClipStep, Emotion};
use pixie::utils::error::exit_on_error;
use pixie::utils::{logger, shutdown, validation::Validate};
use pixie::{ClipShow, KioskConfig, ProcessPlayer};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "clip-show")]
#[command(about = "Play expression clips full-screen through an external player")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the clip sequence, e.g. --clip sad --clip love
    #[arg(long = "clip")]
    clips: Vec<Emotion>,

    /// Hold time per overridden clip
    #[arg(long, default_value = "2000")]
    hold_ms: u64,

    /// Play the sequence this many times
    #[arg(long)]
    repeat: Option<u32>,

    /// Override the player binary
    #[arg(long)]
    player: Option<String>,

    /// Show the commands without launching the player
    #[arg(long)]
    dry_run: bool,

    #[arg(short, long)]
    verbose: bool,

    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logger::init(args.verbose, args.log_json);

    tracing::info!("🎬 Starting clip show");

    if let Err(e) = run(args).await {
        exit_on_error(&e);
    }
}

async fn run(args: Args) -> pixie::Result<()> {
    let mut config = KioskConfig::load(args.config.as_deref())?;

    // 應用命令列覆蓋設定
    if !args.clips.is_empty() {
        config.clips.steps = args
            .clips
            .iter()
            .map(|&emotion| ClipStep {
                emotion,
                hold_ms: args.hold_ms,
            })
            .collect();
    }
    if let Some(repeat) = args.repeat {
        config.clips.repeat = repeat;
    }
    if let Some(player) = args.player {
        config.player.binary = player;
    }

    config.validate()?;

    let player = ProcessPlayer::new(config.player.binary.clone(), config.player.args.clone());
    let show = ClipShow::new(
        player,
        config.asset_library(),
        config.clips.steps.clone(),
        Duration::from_millis(config.player.gap_ms),
    )
    .with_repeat(config.clips.repeat);

    if args.dry_run {
        println!("🔍 Dry run, {} round(s):", config.clips.repeat.max(1));
        for line in show.describe() {
            println!("  {}", line);
        }
        if let Err(e) = show.check_assets() {
            println!("  ⚠️ {}", e);
        }
        return Ok(());
    }

    let report = show
        .run_until(shutdown::ctrl_c())
        .await?;

    println!(
        "✅ Played {} clip(s), {} early exit(s){}",
        report.played.len(),
        report.early_exits,
        if report.interrupted { ", interrupted" } else { "" }
    );
    Ok(())
}
