pub mod blink;
pub mod clip_show;
pub mod emotion;
pub mod engine;
pub mod servo;

pub use crate::domain::model::{AssetLibrary, ClipStep, Emotion, EmotionState, Event};
pub use crate::domain::ports::{EventSource, FrameSink, MediaPlayer, PlaybackHandle, ServoLine, TokenStore};
pub use crate::utils::error::Result;
