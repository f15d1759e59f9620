use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// 臉部表情，每個表情對應一段影片
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Emotion {
    Neutral,
    Blink,
    Excited,
    Love,
    Sad,
    Angry,
    Shock,
    Sleepy,
}

impl Emotion {
    pub const ALL: [Emotion; 8] = [
        Emotion::Neutral,
        Emotion::Blink,
        Emotion::Excited,
        Emotion::Love,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Shock,
        Emotion::Sleepy,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Emotion::Neutral => "neutral",
            Emotion::Blink => "blink",
            Emotion::Excited => "excited",
            Emotion::Love => "love",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Shock => "shock",
            Emotion::Sleepy => "sleepy",
        }
    }

    pub fn clip_file(&self) -> String {
        format!("{}.mp4", self.name())
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Emotion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Emotion::ALL
            .iter()
            .copied()
            .find(|e| e.name() == wanted)
            .ok_or_else(|| format!("Unknown emotion: {}", s))
    }
}

impl TryFrom<String> for Emotion {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// 表情影片所在的資料夾
#[derive(Debug, Clone)]
pub struct AssetLibrary {
    root: PathBuf,
}

impl AssetLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn clip_path(&self, emotion: Emotion) -> PathBuf {
        self.root.join(emotion.clip_file())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EmotionState {
    Idle,
    Success,
    Error,
}

impl EmotionState {
    pub fn expression(&self) -> Emotion {
        match self {
            EmotionState::Idle => Emotion::Neutral,
            EmotionState::Success => Emotion::Excited,
            EmotionState::Error => Emotion::Sad,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Event {
    Tick,
    WorkSucceeded,
    WorkFailed,
    Reset,
}

/// 一段表情播放：播放哪個表情、停留多久
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipStep {
    pub emotion: Emotion,
    pub hold_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TickRecord {
    pub tick: u64,
    pub event: Event,
    pub from: EmotionState,
    pub to: EmotionState,
    pub at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emotion_parses_case_insensitively() {
        assert_eq!("LOVE".parse::<Emotion>().unwrap(), Emotion::Love);
        assert_eq!(" sad ".parse::<Emotion>().unwrap(), Emotion::Sad);
        assert!("grumpy".parse::<Emotion>().is_err());
    }

    #[test]
    fn test_emotion_deserializes_like_from_str() {
        let parsed: Vec<Emotion> = serde_json::from_str(r#"["Sad", "LOVE", "sleepy"]"#).unwrap();
        assert_eq!(parsed, vec![Emotion::Sad, Emotion::Love, Emotion::Sleepy]);
        assert!(serde_json::from_str::<Emotion>(r#""grumpy""#).is_err());
        // 輸出一律小寫
        assert_eq!(serde_json::to_string(&Emotion::Shock).unwrap(), r#""shock""#);
    }

    #[test]
    fn test_clip_path_uses_emotion_name() {
        let library = AssetLibrary::new("assets/expressions");
        assert_eq!(
            library.clip_path(Emotion::Angry),
            PathBuf::from("assets/expressions/angry.mp4")
        );
    }

    #[test]
    fn test_state_expressions() {
        assert_eq!(EmotionState::Idle.expression(), Emotion::Neutral);
        assert_eq!(EmotionState::Success.expression(), Emotion::Excited);
        assert_eq!(EmotionState::Error.expression(), Emotion::Sad);
    }
}
