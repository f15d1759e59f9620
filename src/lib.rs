pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::KioskConfig;

pub use adapters::gateway::GatewayClient;
pub use adapters::process_player::ProcessPlayer;
pub use crate::core::{clip_show::ClipShow, engine::HeartbeatEngine, servo::ServoDriver};
pub use utils::error::{KioskError, Result};
