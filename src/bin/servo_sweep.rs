use clap::Parser;
use pixie::adapters::simulated_servo::SimulatedServo;
use pixie::adapters::sysfs_pwm::SysfsPwm;
use pixie::config::toml_config::ServoBackend;
use pixie::utils::error::exit_on_error;
use pixie::utils::{logger, validation::Validate};
use pixie::{KioskConfig, ServoDriver};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "servo-sweep")]
#[command(about = "Center the servo, sweep 0-180 degrees, center again")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Drive the sysfs PWM channel instead of the simulated line
    #[arg(long)]
    hardware: bool,

    /// Override the step size in degrees
    #[arg(long)]
    step: Option<u32>,

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
    let mut config = KioskConfig::load(args.config.as_deref())?;
    if args.hardware {
        config.servo.backend = ServoBackend::Sysfs;
    }
    if let Some(step) = args.step {
        config.servo.step_degrees = step;
    }
    config.validate()?;

    let servo = &config.servo;
    tracing::info!(
        "🔧 Servo on GPIO {} at {} Hz ({:?} backend)",
        servo.pin,
        servo.frequency_hz,
        servo.backend
    );

    match servo.backend {
        ServoBackend::Sysfs => {
            let line = SysfsPwm::new(servo.pwm_chip, servo.pwm_channel, servo.frequency_hz);
            let mut driver = ServoDriver::new(line, config.servo_settings());
            driver.run_test_routine().await?;
        }
        ServoBackend::Simulated => {
            let mut driver = ServoDriver::new(SimulatedServo::new(), config.servo_settings());
            driver.run_test_routine().await?;
            let line = driver.into_line();
            println!(
                "🔧 Simulated {} duty updates, {} releases",
                line.duty_history().len(),
                line.release_count()
            );
        }
    }

    println!("✅ Servo test finished");
    Ok(())
}
