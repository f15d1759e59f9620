use thiserror::Error;

#[derive(Error, Debug)]
pub enum KioskError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Gateway returned status {status}: {body}")]
    GatewayStatus { status: u16, body: String },

    #[error("Gateway error: {message}")]
    GatewayError { message: String },

    #[error("Player error: {message}")]
    PlayerError { message: String },

    #[error("Hardware error: {message}")]
    HardwareError { message: String },

    #[error("Display error: {message}")]
    DisplayError { message: String },

    #[error("Web server error: {message}")]
    ServerError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Media,
    Hardware,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl KioskError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            KioskError::ConfigError { .. }
            | KioskError::ConfigValidationError { .. }
            | KioskError::InvalidConfigValueError { .. }
            | KioskError::MissingConfigError { .. } => ErrorCategory::Configuration,
            KioskError::ApiError(_)
            | KioskError::GatewayStatus { .. }
            | KioskError::GatewayError { .. } => ErrorCategory::Network,
            KioskError::PlayerError { .. } | KioskError::DisplayError { .. } => {
                ErrorCategory::Media
            }
            KioskError::HardwareError { .. } => ErrorCategory::Hardware,
            KioskError::IoError(_)
            | KioskError::SerializationError(_)
            | KioskError::ServerError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 網路錯誤通常可以重試
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Media => ErrorSeverity::High,
            ErrorCategory::Hardware | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            KioskError::ApiError(_) | KioskError::GatewayError { .. } => {
                "Check that the gateway is running and the gateway URL is reachable"
            }
            KioskError::GatewayStatus { status: 401, .. } => {
                "The saved token was rejected; pair again with a fresh pairing code"
            }
            KioskError::GatewayStatus { .. } => "Inspect the gateway logs for the failed request",
            KioskError::IoError(_) => "Check file paths and permissions",
            KioskError::SerializationError(_) => "The payload was not valid JSON",
            KioskError::ConfigError { .. }
            | KioskError::ConfigValidationError { .. }
            | KioskError::InvalidConfigValueError { .. } => {
                "Fix the value in pixie.toml or on the command line"
            }
            KioskError::MissingConfigError { .. } => {
                "Add the missing setting to pixie.toml or pass it as a flag"
            }
            KioskError::PlayerError { .. } => {
                "Make sure the player binary is installed and the clip files exist"
            }
            KioskError::HardwareError { .. } => {
                "Check the PWM chip/channel and that the process can write to /sys/class/pwm"
            }
            KioskError::DisplayError { .. } => "Make sure a display is attached and DISPLAY is set",
            KioskError::ServerError { .. } => "Check that the bind address is free",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Could not talk to the gateway: {}", self),
            ErrorCategory::Media => format!("Playback failed: {}", self),
            ErrorCategory::Hardware => format!("Hardware failure: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    /// 依嚴重程度決定的行程結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, KioskError>;

/// 記錄錯誤、輸出使用者訊息，並依嚴重程度結束行程
pub fn exit_on_error(e: &KioskError) {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = e.exit_code();
    if exit_code > 0 {
        std::process::exit(exit_code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_errors_are_retryable() {
        let err = KioskError::GatewayStatus {
            status: 503,
            body: "busy".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Network);
        assert_eq!(err.severity(), ErrorSeverity::Medium);
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_unauthorized_suggests_pairing() {
        let err = KioskError::GatewayStatus {
            status: 401,
            body: String::new(),
        };
        assert!(err.recovery_suggestion().contains("pair"));
    }

    #[test]
    fn test_hardware_errors_are_critical() {
        let err = KioskError::HardwareError {
            message: "pwmchip0 missing".to_string(),
        };
        assert_eq!(err.exit_code(), 3);
        assert!(err.user_friendly_message().starts_with("Hardware failure"));
    }
}
