use crate::adapters::gateway::GatewayClient;
use crate::adapters::token_store::FileTokenStore;
use crate::domain::model::Emotion;
use crate::utils::error::{KioskError, Result};
use crate::utils::shutdown;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::services::{ServeDir, ServeFile};

/// Served at `/` when the web directory has no `index.html`.
pub const PLACEHOLDER_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Pixie</title>
  <style>
    html, body { margin: 0; height: 100%; background: #000; color: #fff; }
    body { display: flex; align-items: center; justify-content: center; font-family: sans-serif; }
  </style>
</head>
<body>
  <h1>Pixie</h1>
</body>
</html>
"#;

#[derive(Debug, Clone)]
pub struct WebConfig {
    pub bind: SocketAddr,
    pub gateway_url: String,
    pub token_path: PathBuf,
    pub webhook_secret: Option<String>,
    pub pairing_code: Option<String>,
    pub web_dir: PathBuf,
    pub states_dir: PathBuf,
}

#[derive(Clone)]
pub struct AppState {
    gateway: Arc<Mutex<GatewayClient<FileTokenStore>>>,
    pairing_code: Arc<Mutex<Option<String>>>,
    index_file: PathBuf,
    started_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct PairingRequest {
    pairing_code: String,
}

#[derive(Debug, Serialize)]
struct PairingResponse {
    paired: bool,
    token_path: String,
}

#[derive(Debug, Serialize)]
struct PairingStatusResponse {
    token_present: bool,
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    reply: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    started_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct EmotionEntry {
    name: &'static str,
    clip_url: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.to_string(),
        }
    }

    fn bad_gateway(context: &str, err: KioskError) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: format!("{}: {}", context, err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// 建立共享狀態；有設定配對碼時先配對一次
pub async fn app_state(config: &WebConfig) -> AppState {
    let client = GatewayClient::new(
        &config.gateway_url,
        config.webhook_secret.clone(),
        FileTokenStore::new(config.token_path.clone()),
    );
    let state = AppState {
        gateway: Arc::new(Mutex::new(client)),
        pairing_code: Arc::new(Mutex::new(config.pairing_code.clone())),
        index_file: config.web_dir.join("index.html"),
        started_at: Utc::now(),
    };

    if let Some(code) = &config.pairing_code {
        let mut client = state.gateway.lock().await;
        match client.pair_only(code).await {
            Ok(()) => tracing::info!("🔑 Startup auto-pair succeeded"),
            Err(e) => tracing::warn!("⚠️ Startup auto-pair failed: {}", e),
        }
    }

    state
}

pub fn router(state: AppState, config: &WebConfig) -> Router {
    let index_file = config.web_dir.join("index.html");

    Router::new()
        .route("/", get(home))
        .route("/api/health", get(api_health))
        .route("/api/emotions", get(api_emotions))
        .route("/api/pairing/status", get(api_pairing_status))
        .route("/api/pairing", post(api_pairing))
        .route("/api/chat", post(api_chat))
        .with_state(state)
        .nest_service("/states", ServeDir::new(&config.states_dir))
        .fallback_service(ServeDir::new(&config.web_dir).fallback(ServeFile::new(index_file)))
}

/// 在已綁定的 listener 上服務，直到 `shutdown` 完成
pub async fn serve<F>(listener: TcpListener, config: WebConfig, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let state = app_state(&config).await;
    let app = router(state, &config);

    let local = listener.local_addr()?;
    tracing::info!("🌐 Pixie web UI: http://{}", local);
    tracing::info!("Gateway URL: {}", config.gateway_url);
    tracing::info!("Token file: {}", config.token_path.display());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| KioskError::ServerError {
            message: e.to_string(),
        })
}

pub async fn run_server(config: WebConfig) -> Result<()> {
    let listener = TcpListener::bind(config.bind)
        .await
        .map_err(|e| KioskError::ServerError {
            message: format!("Failed to bind {}: {}", config.bind, e),
        })?;

    tracing::info!("Open in a kiosk-mode browser for full-screen display");
    serve(listener, config, async {
        shutdown::ctrl_c().await;
        tracing::info!("🛑 Shutting down web server");
    })
    .await
}

async fn home(State(state): State<AppState>) -> Html<String> {
    match tokio::fs::read_to_string(&state.index_file).await {
        Ok(page) => Html(page),
        Err(_) => Html(PLACEHOLDER_PAGE.to_string()),
    }
}

async fn api_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        started_at: state.started_at,
    })
}

async fn api_emotions() -> Json<Vec<EmotionEntry>> {
    Json(
        Emotion::ALL
            .iter()
            .map(|e| EmotionEntry {
                name: e.name(),
                clip_url: format!("/states/{}", e.clip_file()),
            })
            .collect(),
    )
}

async fn api_pairing_status(State(state): State<AppState>) -> Json<PairingStatusResponse> {
    let client = state.gateway.lock().await;
    Json(PairingStatusResponse {
        token_present: client.has_saved_token().await,
    })
}

async fn api_pairing(
    State(state): State<AppState>,
    Json(req): Json<PairingRequest>,
) -> std::result::Result<Json<PairingResponse>, ApiError> {
    let code = req.pairing_code.trim().to_string();
    if code.is_empty() {
        return Err(ApiError::bad_request("pairing_code is required"));
    }

    let mut client = state.gateway.lock().await;
    client
        .pair_only(&code)
        .await
        .map_err(|e| ApiError::bad_gateway("Pairing failed", e))?;

    *state.pairing_code.lock().await = Some(code);

    Ok(Json(PairingResponse {
        paired: true,
        token_path: client.token_location(),
    }))
}

async fn api_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> std::result::Result<Json<ChatResponse>, ApiError> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err(ApiError::bad_request("message is required"));
    }

    let pairing_code = state.pairing_code.lock().await.clone();
    let mut client = state.gateway.lock().await;
    let reply = client
        .send_message(message, pairing_code.as_deref())
        .await
        .map_err(|e| ApiError::bad_gateway("Gateway request failed", e))?;

    Ok(Json(ChatResponse { reply }))
}
