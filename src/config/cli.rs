use crate::config::toml_config::KioskConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Parser)]
#[command(name = "pixie")]
#[command(about = "Pixie kiosk: web frontend, emotion heartbeat and gateway client")]
pub struct CliConfig {
    /// Path to TOML configuration file (defaults to ./pixie.toml when present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Run the kiosk web frontend server
    #[arg(long)]
    pub serve: bool,

    /// Web server bind address, e.g. 127.0.0.1:8787
    #[arg(long)]
    pub bind: Option<String>,

    #[arg(long)]
    pub web_dir: Option<String>,

    #[arg(long)]
    pub states_dir: Option<String>,

    /// Call the gateway from the heartbeat loop
    #[arg(long)]
    pub gateway: bool,

    #[arg(long)]
    pub gateway_url: Option<String>,

    /// One-time code for the /pair token exchange
    #[arg(long)]
    pub pairing_code: Option<String>,

    #[arg(long)]
    pub token_path: Option<String>,

    /// Call the gateway every n ticks
    #[arg(long)]
    pub gateway_every: Option<u64>,

    /// Message sent on proactive gateway ticks
    #[arg(long)]
    pub message: Option<String>,

    #[arg(long)]
    pub webhook_secret: Option<String>,

    #[arg(long)]
    pub ticks: Option<u64>,

    #[arg(long)]
    pub interval_ms: Option<u64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl CliConfig {
    /// 命令列參數覆蓋檔案設定
    pub fn apply(&self, config: &mut KioskConfig) {
        if let Some(bind) = &self.bind {
            config.web.bind = bind.clone();
        }
        if let Some(dir) = &self.web_dir {
            config.web.web_dir = dir.clone();
        }
        if let Some(dir) = &self.states_dir {
            config.web.states_dir = dir.clone();
        }
        // 網頁模式一定會用到閘道
        if self.gateway || self.serve {
            config.gateway.enabled = true;
        }
        if let Some(url) = &self.gateway_url {
            config.gateway.url = url.clone();
        }
        if let Some(code) = &self.pairing_code {
            config.gateway.pairing_code = Some(code.clone());
        }
        if let Some(path) = &self.token_path {
            config.gateway.token_path = Some(path.clone());
        }
        if let Some(every) = self.gateway_every {
            config.gateway.every = every;
        }
        if let Some(message) = &self.message {
            config.gateway.message = message.clone();
        }
        if let Some(secret) = &self.webhook_secret {
            config.gateway.webhook_secret = Some(secret.clone());
        }
        if let Some(ticks) = self.ticks {
            config.heartbeat.ticks = ticks;
        }
        if let Some(interval) = self.interval_ms {
            config.heartbeat.interval_ms = interval;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_file_values() {
        let cli = CliConfig::parse_from([
            "pixie",
            "--ticks",
            "5",
            "--gateway-url",
            "http://gw.local:9000",
            "--pairing-code",
            "123456",
        ]);
        let mut config = KioskConfig::default();
        cli.apply(&mut config);

        assert_eq!(config.heartbeat.ticks, 5);
        assert_eq!(config.heartbeat.interval_ms, 800);
        assert_eq!(config.gateway.url, "http://gw.local:9000");
        assert_eq!(config.gateway.pairing_code.as_deref(), Some("123456"));
        assert!(!config.gateway.enabled);
    }

    #[test]
    fn test_serve_enables_gateway() {
        let cli = CliConfig::parse_from(["pixie", "--serve"]);
        let mut config = KioskConfig::default();
        cli.apply(&mut config);
        assert!(config.gateway.enabled);
    }

    #[test]
    fn test_zero_ticks_fails_validation() {
        use crate::utils::validation::Validate;

        let cli = CliConfig::parse_from(["pixie", "--ticks", "0"]);
        let mut config = KioskConfig::default();
        cli.apply(&mut config);
        assert!(config.validate().is_err());
    }
}
