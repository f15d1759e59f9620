use crate::domain::model::Event;
use crate::utils::error::Result;
use async_trait::async_trait;
use embedded_hal::pwm::SetDutyCycle;
use std::path::Path;

/// 閘道 token 的存放位置
pub trait TokenStore: Send + Sync {
    fn load(&self) -> impl std::future::Future<Output = Result<Option<String>>> + Send;
    fn save(&self, token: &str) -> impl std::future::Future<Output = Result<()>> + Send;
    fn exists(&self) -> impl std::future::Future<Output = bool> + Send;
    fn location(&self) -> String;
}

/// A running player process showing one clip.
#[async_trait]
pub trait PlaybackHandle: Send {
    fn is_running(&mut self) -> bool;
    async fn terminate(&mut self) -> Result<()>;
}

#[async_trait]
pub trait MediaPlayer: Send + Sync {
    async fn launch(&self, clip: &Path) -> Result<Box<dyn PlaybackHandle>>;

    /// Human-readable command line, used by dry runs.
    fn describe(&self, clip: &Path) -> String;
}

/// A PWM output driving a hobby servo.
///
/// `start` brings the line up at 0 % duty, `release` stops the signal and
/// hands the pin back to the system.
pub trait ServoLine: SetDutyCycle {
    fn start(&mut self) -> std::result::Result<(), Self::Error>;
    fn release(&mut self) -> std::result::Result<(), Self::Error>;
}

pub trait FrameSink {
    fn size(&self) -> (usize, usize);
    /// Shows one frame. Returns `false` once the viewer asked to quit.
    fn present(&mut self, buffer: &[u32]) -> Result<bool>;
}

#[async_trait]
pub trait EventSource: Send {
    async fn next_event(&mut self, tick: u64) -> Event;
}
