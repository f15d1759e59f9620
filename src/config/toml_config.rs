use crate::adapters::web::WebConfig;
use crate::core::blink::BlinkSettings;
use crate::core::servo::ServoSettings;
use crate::domain::model::{AssetLibrary, ClipStep, Emotion};
use crate::utils::error::{KioskError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "pixie.toml";

pub const DEFAULT_PLAYER_ARGS: [&str; 8] = [
    "--fullscreen",
    "--repeat",
    "--no-video-title-show",
    "--no-audio",
    "--no-embedded-video",
    "--no-qt-fs-controller",
    "--qt-fullscreen-screennumber=1",
    "--vout=mmal_vout",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KioskConfig {
    pub web: WebSection,
    pub gateway: GatewaySection,
    pub heartbeat: HeartbeatSection,
    pub assets: AssetsSection,
    pub player: PlayerSection,
    pub clips: ClipsSection,
    pub display: DisplaySection,
    pub servo: ServoSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSection {
    pub bind: String,
    pub web_dir: String,
    pub states_dir: String,
}

impl Default for WebSection {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8787".to_string(),
            web_dir: "web".to_string(),
            states_dir: "states".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySection {
    pub enabled: bool,
    pub url: String,
    pub token_path: Option<String>,
    pub webhook_secret: Option<String>,
    pub pairing_code: Option<String>,
    pub every: u64,
    pub message: String,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            enabled: false,
            url: "http://127.0.0.1:8080".to_string(),
            token_path: None,
            webhook_secret: None,
            pairing_code: None,
            every: 6,
            message: "Pixie proactive heartbeat check-in".to_string(),
        }
    }
}

impl GatewaySection {
    /// token 檔案位置：設定值 > PIXIE_TOKEN_PATH > $HOME/.pixie/gateway_token
    pub fn token_path(&self) -> PathBuf {
        if let Some(path) = &self.token_path {
            return PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("PIXIE_TOKEN_PATH") {
            return PathBuf::from(path);
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".pixie").join("gateway_token");
        }
        PathBuf::from(".pixie").join("gateway_token")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeartbeatSection {
    pub ticks: u64,
    pub interval_ms: u64,
}

impl Default for HeartbeatSection {
    fn default() -> Self {
        Self {
            ticks: 24,
            interval_ms: 800,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsSection {
    pub root: String,
}

impl Default for AssetsSection {
    fn default() -> Self {
        Self {
            root: "assets/expressions".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSection {
    pub binary: String,
    pub args: Vec<String>,
    pub gap_ms: u64,
}

impl Default for PlayerSection {
    fn default() -> Self {
        Self {
            binary: "cvlc".to_string(),
            args: DEFAULT_PLAYER_ARGS.iter().map(|s| s.to_string()).collect(),
            gap_ms: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipsSection {
    pub steps: Vec<ClipStep>,
    pub repeat: u32,
}

impl Default for ClipsSection {
    fn default() -> Self {
        Self {
            steps: vec![
                ClipStep {
                    emotion: Emotion::Sad,
                    hold_ms: 2000,
                },
                ClipStep {
                    emotion: Emotion::Love,
                    hold_ms: 2000,
                },
            ],
            repeat: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySection {
    pub width: usize,
    pub height: usize,
    pub blink_interval_ms: u64,
    pub frame_ms: u64,
    pub eye_radius: u32,
    pub eye_offset: u32,
    pub outline: u32,
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
            blink_interval_ms: 1000,
            frame_ms: 16,
            eye_radius: 50,
            eye_offset: 150,
            outline: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServoBackend {
    Simulated,
    Sysfs,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServoSection {
    pub pin: u32,
    pub frequency_hz: u32,
    pub center_duty: f32,
    pub step_degrees: u32,
    pub dwell_ms: u64,
    pub center_hold_ms: u64,
    pub backend: ServoBackend,
    pub pwm_chip: u32,
    pub pwm_channel: u32,
}

impl Default for ServoSection {
    fn default() -> Self {
        Self {
            pin: 17,
            frequency_hz: 50,
            center_duty: 7.5,
            step_degrees: 10,
            dwell_ms: 500,
            center_hold_ms: 1000,
            backend: ServoBackend::Simulated,
            pwm_chip: 0,
            pwm_channel: 0,
        }
    }
}

/// 顯示尺寸與眼睛大小的上限（像素）
const MAX_DISPLAY_SIDE: usize = 8192;
const MAX_EYE_SIZE: u32 = 8192;

impl KioskConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(KioskError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| KioskError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 指定檔案 > 目前目錄的 pixie.toml > 預設值，最後套用環境變數
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// 替換環境變數 (例如 ${PIXIE_SECRET})，找不到的保留原文
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| KioskError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("PIXIE_GATEWAY_URL") {
            self.gateway.url = url;
        }
        if let Ok(secret) = std::env::var("PIXIE_WEBHOOK_SECRET") {
            self.gateway.webhook_secret = Some(secret);
        }
        if let Ok(path) = std::env::var("PIXIE_TOKEN_PATH") {
            self.gateway.token_path = Some(path);
        }
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_socket_addr("web.bind", &self.web.bind)?;
        validation::validate_path("web.web_dir", &self.web.web_dir)?;
        validation::validate_path("web.states_dir", &self.web.states_dir)?;

        validation::validate_url("gateway.url", &self.gateway.url)?;
        validation::validate_positive_number("gateway.every", self.gateway.every, 1)?;
        validation::validate_non_empty_string("gateway.message", &self.gateway.message)?;

        validation::validate_positive_number("heartbeat.ticks", self.heartbeat.ticks, 1)?;
        validation::validate_positive_number("heartbeat.interval_ms", self.heartbeat.interval_ms, 1)?;

        validation::validate_path("assets.root", &self.assets.root)?;
        validation::validate_non_empty_string("player.binary", &self.player.binary)?;
        if self.clips.steps.is_empty() {
            return Err(KioskError::MissingConfigError {
                field: "clips.steps".to_string(),
            });
        }

        validation::validate_range("display.width", self.display.width, 1, MAX_DISPLAY_SIDE)?;
        validation::validate_range("display.height", self.display.height, 1, MAX_DISPLAY_SIDE)?;
        validation::validate_range("display.eye_radius", self.display.eye_radius, 1, MAX_EYE_SIZE)?;
        validation::validate_range("display.outline", self.display.outline, 0, MAX_EYE_SIZE)?;
        validation::validate_range("display.eye_offset", self.display.eye_offset, 0, MAX_EYE_SIZE)?;
        validation::validate_positive_number(
            "display.blink_interval_ms",
            self.display.blink_interval_ms,
            1,
        )?;

        validation::validate_range("servo.frequency_hz", self.servo.frequency_hz, 1, 1000)?;
        validation::validate_range("servo.center_duty", self.servo.center_duty, 0.0, 100.0)?;
        validation::validate_range("servo.step_degrees", self.servo.step_degrees, 1, 180)?;

        Ok(())
    }

    pub fn web_config(&self) -> Result<WebConfig> {
        Ok(WebConfig {
            bind: validation::validate_socket_addr("web.bind", &self.web.bind)?,
            gateway_url: self.gateway.url.clone(),
            token_path: self.gateway.token_path(),
            webhook_secret: self.gateway.webhook_secret.clone(),
            pairing_code: self.gateway.pairing_code.clone(),
            web_dir: PathBuf::from(&self.web.web_dir),
            states_dir: PathBuf::from(&self.web.states_dir),
        })
    }

    pub fn asset_library(&self) -> AssetLibrary {
        AssetLibrary::new(&self.assets.root)
    }

    pub fn servo_settings(&self) -> ServoSettings {
        ServoSettings {
            center_duty: self.servo.center_duty,
            step_degrees: self.servo.step_degrees,
            dwell: Duration::from_millis(self.servo.dwell_ms),
            center_hold: Duration::from_millis(self.servo.center_hold_ms),
        }
    }

    pub fn blink_settings(&self, max_frames: Option<u64>) -> BlinkSettings {
        BlinkSettings {
            interval: Duration::from_millis(self.display.blink_interval_ms),
            frame_period: Duration::from_millis(self.display.frame_ms),
            radius: self.display.eye_radius,
            offset: self.display.eye_offset,
            outline: self.display.outline,
            max_frames,
        }
    }
}

impl Validate for KioskConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = KioskConfig::from_toml_str("").unwrap();

        assert_eq!(config.web.bind, "127.0.0.1:8787");
        assert_eq!(config.heartbeat.ticks, 24);
        assert_eq!(config.servo.pin, 17);
        assert_eq!(config.servo.backend, ServoBackend::Simulated);
        assert_eq!(config.clips.steps.len(), 2);
        assert_eq!(config.clips.steps[0].emotion, Emotion::Sad);
        assert!(config.player.args.contains(&"--no-audio".to_string()));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_sections() {
        let toml_content = r#"
[web]
bind = "0.0.0.0:5000"

[clips]
repeat = 3
steps = [
    { emotion = "angry", hold_ms = 500 },
    { emotion = "love", hold_ms = 1500 },
    { emotion = "sleepy", hold_ms = 100 },
]

[servo]
backend = "sysfs"
pwm_chip = 2
"#;

        let config = KioskConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.web.bind, "0.0.0.0:5000");
        // 沒寫的欄位保持預設
        assert_eq!(config.web.web_dir, "web");
        assert_eq!(config.clips.repeat, 3);
        assert_eq!(config.clips.steps[2].emotion, Emotion::Sleepy);
        assert_eq!(config.servo.backend, ServoBackend::Sysfs);
        assert_eq!(config.servo.pwm_chip, 2);
        assert_eq!(config.servo.frequency_hz, 50);
    }

    #[test]
    fn test_unknown_emotion_is_rejected() {
        let toml_content = r#"
[clips]
steps = [{ emotion = "grumpy", hold_ms = 10 }]
"#;
        assert!(KioskConfig::from_toml_str(toml_content).is_err());
    }

    #[test]
    fn test_clip_emotions_are_case_insensitive() {
        let toml_content = r#"
[clips]
steps = [{ emotion = "Sad", hold_ms = 10 }, { emotion = "LOVE", hold_ms = 10 }]
"#;
        let config = KioskConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.clips.steps[0].emotion, Emotion::Sad);
        assert_eq!(config.clips.steps[1].emotion, Emotion::Love);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PIXIE_TEST_SECRET", "s3cret");

        let toml_content = r#"
[gateway]
webhook_secret = "${PIXIE_TEST_SECRET}"
message = "${PIXIE_TEST_UNSET_VAR}"
"#;

        let config = KioskConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.gateway.webhook_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.gateway.message, "${PIXIE_TEST_UNSET_VAR}");

        std::env::remove_var("PIXIE_TEST_SECRET");
    }

    #[test]
    fn test_config_validation() {
        let bad_url = KioskConfig::from_toml_str("[gateway]\nurl = \"invalid-url\"\n").unwrap();
        assert!(bad_url.validate().is_err());

        let bad_bind = KioskConfig::from_toml_str("[web]\nbind = \"nowhere\"\n").unwrap();
        assert!(bad_bind.validate().is_err());

        let bad_step = KioskConfig::from_toml_str("[servo]\nstep_degrees = 0\n").unwrap();
        assert!(bad_step.validate().is_err());

        let no_clips = KioskConfig::from_toml_str("[clips]\nsteps = []\n").unwrap();
        assert!(matches!(
            no_clips.validate(),
            Err(KioskError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_display_sizes_are_bounded() {
        let huge_radius =
            KioskConfig::from_toml_str("[display]\neye_radius = 4000000000\n").unwrap();
        assert!(matches!(
            huge_radius.validate(),
            Err(KioskError::InvalidConfigValueError { ref field, .. }) if field == "display.eye_radius"
        ));

        let huge_outline = KioskConfig::from_toml_str("[display]\noutline = 100000\n").unwrap();
        assert!(huge_outline.validate().is_err());

        let huge_offset = KioskConfig::from_toml_str("[display]\neye_offset = 100000\n").unwrap();
        assert!(huge_offset.validate().is_err());

        let zero_width = KioskConfig::from_toml_str("[display]\nwidth = 0\n").unwrap();
        assert!(zero_width.validate().is_err());
    }

    #[test]
    fn test_env_overrides_win_over_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(
                b"[gateway]\nurl = \"http://file-host:8080\"\nwebhook_secret = \"from-file\"\ntoken_path = \"/tmp/file-token\"\n",
            )
            .unwrap();

        std::env::set_var("PIXIE_GATEWAY_URL", "http://env-host:9090");
        std::env::set_var("PIXIE_WEBHOOK_SECRET", "from-env");
        std::env::set_var("PIXIE_TOKEN_PATH", "/tmp/env-token");

        let loaded = KioskConfig::load(Some(temp_file.path()));

        std::env::remove_var("PIXIE_GATEWAY_URL");
        std::env::remove_var("PIXIE_WEBHOOK_SECRET");
        std::env::remove_var("PIXIE_TOKEN_PATH");

        let config = loaded.unwrap();
        assert_eq!(config.gateway.url, "http://env-host:9090");
        assert_eq!(config.gateway.webhook_secret.as_deref(), Some("from-env"));
        assert_eq!(config.gateway.token_path(), PathBuf::from("/tmp/env-token"));

        // 沒有環境變數時保留檔案內容
        let from_file = KioskConfig::load(Some(temp_file.path())).unwrap();
        assert_eq!(from_file.gateway.url, "http://file-host:8080");
        assert_eq!(from_file.gateway.webhook_secret.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[heartbeat]\nticks = 3\ninterval_ms = 10\n")
            .unwrap();

        let config = KioskConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.heartbeat.ticks, 3);
        assert_eq!(config.heartbeat.interval_ms, 10);
    }

    #[test]
    fn test_explicit_token_path_wins() {
        let section = GatewaySection {
            token_path: Some("/tmp/pixie-token".to_string()),
            ..GatewaySection::default()
        };
        assert_eq!(section.token_path(), PathBuf::from("/tmp/pixie-token"));
    }
}
