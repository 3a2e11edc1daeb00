mod collaborator;
mod export;

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wizard_flow::{
    Collaborator, DisabledCollaborator, InMemorySessionStorage, ParagraphSlot, Session,
    WizardError, WizardRunner,
};

use crate::collaborator::RigCollaborator;

#[derive(Clone)]
struct AppState {
    runner: WizardRunner,
}

#[derive(Debug, Deserialize)]
struct ArticlesRequest {
    first: String,
    second: String,
}

#[derive(Debug, Deserialize)]
struct TextRequest {
    text: String,
}

type ApiError = (StatusCode, Json<Value>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "writing_service=debug,wizard_flow=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Credential check happens once here; without a key every AI operation
    // degrades to a fixed disabled notice for the life of the process.
    let collaborator: Arc<dyn Collaborator> = match std::env::var("OPENROUTER_API_KEY") {
        Ok(key) if !key.trim().is_empty() => Arc::new(RigCollaborator::new(&key)),
        _ => {
            warn!("OPENROUTER_API_KEY not set; AI features disabled");
            Arc::new(DisabledCollaborator)
        }
    };

    let storage = Arc::new(InMemorySessionStorage::new());
    let runner = WizardRunner::new(storage, collaborator);

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/session", post(create_session))
        .route("/session/{id}", get(get_session))
        .route("/session/{id}/articles", post(set_articles))
        .route("/session/{id}/reflection", post(set_reflection))
        .route("/session/{id}/advance", post(advance))
        .route("/session/{id}/back", post(back))
        .route("/session/{id}/restart", post(restart))
        .route("/session/{id}/paragraph/{slot}", put(update_paragraph))
        .route(
            "/session/{id}/paragraph/{slot}/feedback",
            post(paragraph_feedback),
        )
        .route("/session/{id}/final", put(set_final_text))
        .route("/session/{id}/export", get(export_document))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { runner });

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
    info!("Server running on http://0.0.0.0:3000");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}

fn api_error(err: WizardError) -> ApiError {
    let status = match &err {
        WizardError::SessionNotFound(_) | WizardError::UnknownSlot(_) => StatusCode::NOT_FOUND,
        WizardError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::BAD_REQUEST,
    };
    let body = match &err {
        WizardError::StageIncomplete { requirements, .. } => json!({
            "error": err.to_string(),
            "requirements": requirements,
        }),
        _ => json!({ "error": err.to_string() }),
    };
    (status, Json(body))
}

fn parse_slot(slot: &str) -> Result<ParagraphSlot, ApiError> {
    ParagraphSlot::from_id(slot).ok_or_else(|| api_error(WizardError::UnknownSlot(slot.to_string())))
}

async fn create_session(State(state): State<AppState>) -> Result<Json<Session>, ApiError> {
    let session = state.runner.create_session().await.map_err(api_error)?;
    info!(session_id = %session.id, "created session");
    Ok(Json(session))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    state.runner.get(&id).await.map(Json).map_err(api_error)
}

async fn set_articles(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ArticlesRequest>,
) -> Result<Json<Session>, ApiError> {
    state
        .runner
        .set_articles(&id, &request.first, &request.second)
        .await
        .map(Json)
        .map_err(api_error)
}

async fn set_reflection(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<TextRequest>,
) -> Result<Json<Session>, ApiError> {
    state
        .runner
        .set_reflection(&id, &request.text)
        .await
        .map(Json)
        .map_err(api_error)
}

async fn advance(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    state.runner.advance(&id).await.map(Json).map_err(api_error)
}

async fn back(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    state.runner.back(&id).await.map(Json).map_err(api_error)
}

async fn restart(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    state.runner.restart(&id).await.map(Json).map_err(api_error)
}

async fn update_paragraph(
    State(state): State<AppState>,
    Path((id, slot)): Path<(String, String)>,
    Json(request): Json<TextRequest>,
) -> Result<Json<Session>, ApiError> {
    let slot = parse_slot(&slot)?;
    state
        .runner
        .update_paragraph(&id, slot, &request.text)
        .await
        .map(Json)
        .map_err(api_error)
}

async fn paragraph_feedback(
    State(state): State<AppState>,
    Path((id, slot)): Path<(String, String)>,
) -> Result<Json<Value>, ApiError> {
    let slot = parse_slot(&slot)?;
    let (session, feedback) = state
        .runner
        .paragraph_feedback(&id, slot)
        .await
        .map_err(api_error)?;
    Ok(Json(json!({
        "session": session,
        "feedback": feedback,
    })))
}

async fn set_final_text(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<TextRequest>,
) -> Result<Json<Session>, ApiError> {
    state
        .runner
        .set_final_text(&id, &request.text)
        .await
        .map(Json)
        .map_err(api_error)
}

async fn export_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<String, ApiError> {
    let session = state.runner.get(&id).await.map_err(api_error)?;
    Ok(export::render_document(&session))
}
