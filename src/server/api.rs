use crate::agent::SukhAgent;
use crate::config::ConfigError;
use crate::history::{ DEFAULT_SESSION_ID, MAX_SESSION_ID_LEN };
use crate::models::api::{ ChatRequest, ChatResponse, ErrorResponse, StatusResponse };
use axum::{
    routing::{ get, post },
    Router,
    Json,
    extract::State,
    response::{ IntoResponse, Response },
    http::{ HeaderValue, StatusCode },
};
use thiserror::Error;
use tower_http::cors::{ AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer };
use log::{ info, warn, debug };

pub const STATUS_MESSAGE: &str = "Sukh backend is running.";
pub const EMPTY_MESSAGE_DETAIL: &str = "Message cannot be empty.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(ErrorResponse { detail: self.to_string() })).into_response()
    }
}

#[derive(Debug, Clone)]
pub struct CorsSettings {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allow_credentials: true,
        }
    }
}

/// Wildcard plus credentials is expressed by echoing the request, which is the
/// only form browsers accept for credentialed requests.
pub fn build_cors(settings: &CorsSettings) -> Result<CorsLayer, ConfigError> {
    let origins: Vec<&str> = settings.allowed_origins
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .collect();
    let wildcard = origins.is_empty() || origins.contains(&"*");

    let layer = if wildcard {
        if settings.allow_credentials {
            warn!("CORS allows any origin with credentials. Restrict CORS_ALLOWED_ORIGINS in production.");
            CorsLayer::new()
                .allow_origin(AllowOrigin::mirror_request())
                .allow_methods(AllowMethods::mirror_request())
                .allow_headers(AllowHeaders::mirror_request())
                .allow_credentials(true)
        } else {
            CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
        }
    } else {
        let parsed = origins
            .iter()
            .map(|o| HeaderValue::from_str(o).map_err(|_| ConfigError::InvalidCorsOrigin(o.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        info!("CORS restricted to origins: {}", origins.join(", "));
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(parsed))
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(settings.allow_credentials)
    };

    Ok(layer)
}

#[derive(Clone)]
struct AppState {
    agent: SukhAgent,
}

pub fn router(agent: SukhAgent, cors: &CorsSettings) -> Result<Router, ConfigError> {
    let cors = build_cors(cors)?;
    let app_state = AppState { agent };

    Ok(
        Router::new()
            .route("/", get(root_handler))
            .route("/chat", post(chat_handler))
            .layer(cors)
            .with_state(app_state)
    )
}

async fn root_handler() -> Json<StatusResponse> {
    Json(StatusResponse { message: STATUS_MESSAGE.to_string() })
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err(ApiError::Validation(EMPTY_MESSAGE_DETAIL.to_string()));
    }

    let session_id = req.session_id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_SESSION_ID)
        .to_string();
    if session_id.len() > MAX_SESSION_ID_LEN {
        return Err(
            ApiError::Validation(
                format!("session_id must be at most {} bytes.", MAX_SESSION_ID_LEN)
            )
        );
    }
    debug!("Chat request for session '{}' ({} chars)", session_id, message.chars().count());

    let reply = state.agent.process_turn(&session_id, message).await;
    Ok(Json(ChatResponse { reply, session_id }))
}
