use crate::domain::model::Event;
use crate::domain::ports::{EventSource, TokenStore};
use crate::utils::error::{KioskError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const TOKEN_KEYS: [&str; 4] = ["token", "bearer_token", "access_token", "auth_token"];
const REPLY_KEYS: [&str; 4] = ["reply", "response", "message", "text"];

/// Client for the chat gateway: `/pair` exchanges a one-time pairing code
/// for a bearer token, `/webhook` delivers a message and returns the reply.
pub struct GatewayClient<T: TokenStore> {
    http: Client,
    base_url: String,
    webhook_secret: Option<String>,
    store: T,
    token_cache: Option<String>,
}

impl<T: TokenStore> GatewayClient<T> {
    pub fn new(base_url: &str, webhook_secret: Option<String>, store: T) -> Self {
        Self {
            http: Client::new(),
            base_url: normalize_base_url(base_url),
            webhook_secret,
            store,
            token_cache: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token_location(&self) -> String {
        self.store.location()
    }

    pub async fn has_saved_token(&self) -> bool {
        self.store.exists().await
    }

    /// 只做配對並保存 token
    pub async fn pair_only(&mut self, pairing_code: &str) -> Result<()> {
        let token = self.pair(pairing_code).await?;
        self.remember(token).await?;
        Ok(())
    }

    pub async fn send_message(&mut self, message: &str, pairing_code: Option<&str>) -> Result<String> {
        let token = self.ensure_token(pairing_code).await?;

        match self.webhook_with_token(&token, message).await {
            Err(KioskError::GatewayStatus { status: 401, .. }) => {
                tracing::warn!("🔑 Gateway rejected the saved token, re-pairing");
                let code = pairing_code.ok_or_else(|| KioskError::GatewayError {
                    message: "Gateway token rejected and no pairing code provided for re-pairing"
                        .to_string(),
                })?;
                let token = self.pair(code).await?;
                let token = self.remember(token).await?;
                self.webhook_with_token(&token, message).await
            }
            other => other,
        }
    }

    async fn ensure_token(&mut self, pairing_code: Option<&str>) -> Result<String> {
        if let Some(token) = &self.token_cache {
            return Ok(token.clone());
        }

        match self.store.load().await {
            Ok(Some(token)) => {
                self.token_cache = Some(token.clone());
                return Ok(token);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("Could not read saved gateway token: {}", e),
        }

        let code = pairing_code.ok_or_else(|| KioskError::GatewayError {
            message: format!(
                "No saved gateway token at {} and no pairing code provided",
                self.store.location()
            ),
        })?;

        let token = self.pair(code).await?;
        self.remember(token).await
    }

    async fn remember(&mut self, token: String) -> Result<String> {
        self.store.save(&token).await?;
        self.token_cache = Some(token.clone());
        tracing::debug!("gateway token saved to {}", self.store.location());
        Ok(token)
    }

    async fn pair(&self, pairing_code: &str) -> Result<String> {
        let url = format!("{}/pair", self.base_url);
        tracing::debug!("Pairing with gateway at {}", url);

        let response = self
            .http
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .header("X-Pairing-Code", pairing_code)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(KioskError::GatewayStatus {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        extract_token(&body).ok_or_else(|| KioskError::GatewayError {
            message: format!("Pair response did not contain a token: {}", body.trim()),
        })
    }

    async fn webhook_with_token(&self, token: &str, message: &str) -> Result<String> {
        let url = format!("{}/webhook", self.base_url);
        let mut request = self
            .http
            .post(&url)
            .timeout(REQUEST_TIMEOUT)
            .bearer_auth(token)
            .json(&serde_json::json!({ "message": message }));
        if let Some(secret) = &self.webhook_secret {
            request = request.header("X-Webhook-Secret", secret);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(KioskError::GatewayStatus {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        Ok(extract_reply(&body))
    }
}

/// Heartbeat event source that pings the gateway every `every` ticks.
pub struct GatewayEvents<T: TokenStore> {
    client: GatewayClient<T>,
    every: u64,
    message: String,
    pairing_code: Option<String>,
}

impl<T: TokenStore> GatewayEvents<T> {
    pub fn new(client: GatewayClient<T>, every: u64, message: String, pairing_code: Option<String>) -> Self {
        Self {
            client,
            every: every.max(1),
            message,
            pairing_code,
        }
    }
}

#[async_trait]
impl<T: TokenStore> EventSource for GatewayEvents<T> {
    async fn next_event(&mut self, tick: u64) -> Event {
        if tick % self.every != 0 {
            return Event::Tick;
        }

        let prompt = format!("{} (tick {})", self.message, tick);
        match self
            .client
            .send_message(&prompt, self.pairing_code.as_deref())
            .await
        {
            Ok(reply) => {
                tracing::info!("💬 gateway reply: {}", reply);
                Event::WorkSucceeded
            }
            Err(e) => {
                tracing::error!("❌ gateway error: {}", e);
                Event::WorkFailed
            }
        }
    }
}

pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim().trim_end_matches('/').to_string()
}

pub fn extract_token(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if let Some(token) = find_str_key(&value, &TOKEN_KEYS) {
            return Some(token.to_string());
        }
        if let Some(as_str) = value.as_str() {
            return Some(as_str.to_string());
        }
    }

    // 純文字 token 不能含空白
    if trimmed.contains(char::is_whitespace) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn extract_reply(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if let Some(reply) = find_str_key(&value, &REPLY_KEYS) {
            return reply.to_string();
        }
    }

    trimmed.to_string()
}

fn find_str_key<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    let object = value.as_object()?;
    keys.iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_base_url() {
        assert_eq!(normalize_base_url("http://127.0.0.1:8080/"), "http://127.0.0.1:8080");
        assert_eq!(normalize_base_url("http://gw.local//"), "http://gw.local");
    }

    #[test]
    fn test_extract_token_variants() {
        assert_eq!(extract_token(r#"{"token":"abc123"}"#).as_deref(), Some("abc123"));
        assert_eq!(extract_token(r#"{"access_token":"xyz"}"#).as_deref(), Some("xyz"));
        assert_eq!(extract_token(r#""quoted""#).as_deref(), Some("quoted"));
        assert_eq!(extract_token("bare-token\n").as_deref(), Some("bare-token"));
        assert_eq!(extract_token("not a token"), None);
        assert_eq!(extract_token("   "), None);
        assert_eq!(extract_token(r#"{"other": 1}"#), None);
    }

    #[test]
    fn test_extract_reply() {
        assert_eq!(extract_reply(r#"{"reply":"hello from the gateway"}"#), "hello from the gateway");
        assert_eq!(extract_reply(r#"{"text":"fallback key"}"#), "fallback key");
        assert_eq!(extract_reply("  plain reply  "), "plain reply");
        assert_eq!(extract_reply(""), "");
    }
}
