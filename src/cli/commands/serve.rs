//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for questions, voice queries, collections and
//! per-user sessions with the suggested-actions checklist.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::GenanimlError;
use crate::orchestrator::Orchestrator;
use crate::rag::AssistantResponse;
use crate::session::{Completion, Session, SessionStore};
use crate::transcription::{AudioClip, TranscriptionResult};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

/// Sessions untouched for this long are dropped when new ones are created.
const SESSION_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
    sessions: SessionStore,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(settings)?;

    let state = Arc::new(AppState {
        orchestrator,
        sessions: SessionStore::with_max_age(SESSION_MAX_AGE),
    });

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Genaniml API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Ask", "POST /ask");
    Output::kv("Transcribe", "POST /transcribe?language=kn-IN&ask=true (WAV body)");
    Output::kv("Collections", "GET  /collections");
    Output::kv("New session", "POST /sessions");
    Output::kv("Get session", "GET  /sessions/:id");
    Output::kv("End session", "DELETE /sessions/:id");
    Output::kv("Tick task", "POST /sessions/:id/tasks/:index");
    Output::kv("New chat", "POST /sessions/:id/new");
    Output::kv("Finish", "POST /sessions/:id/done");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/ask", post(ask))
        .route("/transcribe", post(transcribe))
        .route("/collections", get(list_collections))
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(get_session).delete(delete_session))
        .route("/sessions/{id}/tasks/{index}", post(set_task))
        .route("/sessions/{id}/new", post(new_chat))
        .route("/sessions/{id}/done", post(finish_session))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct AskRequest {
    question: String,
    /// Record the answer in this session and reveal its checklist.
    #[serde(default)]
    session_id: Option<Uuid>,
}

#[derive(Serialize)]
struct AskResponse {
    #[serde(flatten)]
    response: AssistantResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    session: Option<Session>,
}

#[derive(Deserialize)]
struct TranscribeParams {
    #[serde(default)]
    language: Option<String>,
    /// Answer the recognised question as well.
    #[serde(default)]
    ask: bool,
}

#[derive(Serialize)]
struct TranscribeResponse {
    /// Recognised text, absent when recognition failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    transcript: Option<String>,
    /// Why recognition failed, in the same form the UI shows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response: Option<AssistantResponse>,
}

impl TranscribeResponse {
    fn new(transcript: TranscriptionResult) -> Self {
        let (transcript, error) = match transcript {
            Ok(text) => (Some(text), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            transcript,
            error,
            query: None,
            response: None,
        }
    }
}

#[derive(Serialize)]
struct CollectionsResponse {
    collections: Vec<CollectionEntry>,
    total: usize,
}

#[derive(Serialize)]
struct CollectionEntry {
    name: String,
    document_count: usize,
    created_at: String,
}

#[derive(Deserialize)]
struct TaskRequest {
    done: bool,
}

#[derive(Serialize)]
struct FinishResponse {
    #[serde(flatten)]
    completion: Completion,
    session: Session,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(ErrorResponse { error: error.into() })).into_response()
}

fn status_for(error: &GenanimlError) -> StatusCode {
    match error {
        GenanimlError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn session_not_found(id: Uuid) -> Response {
    error_response(StatusCode::NOT_FOUND, format!("Session not found: {}", id))
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn ask(State(state): State<Arc<AppState>>, Json(req): Json<AskRequest>) -> impl IntoResponse {
    if let Some(id) = req.session_id {
        if state.sessions.get(id).await.is_none() {
            return session_not_found(id);
        }
    }

    let response = match state.orchestrator.respond_to_text(&req.question).await {
        Ok(response) => response,
        Err(e) => return error_response(status_for(&e), e.to_string()),
    };

    let session = match req.session_id {
        Some(id) => {
            let answer = response.answer.clone();
            match state
                .sessions
                .update(id, |s| {
                    s.record(answer);
                    Ok(())
                })
                .await
            {
                Ok(session) => Some(session),
                Err(_) => return session_not_found(id),
            }
        }
        None => None,
    };

    Json(AskResponse { response, session }).into_response()
}

async fn transcribe(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TranscribeParams>,
    body: Bytes,
) -> impl IntoResponse {
    let clip = match AudioClip::from_wav(&body) {
        Ok(clip) => clip,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, format!("Invalid WAV body: {}", e))
        }
    };

    let language = params
        .language
        .unwrap_or_else(|| state.orchestrator.settings().transcription.language.clone());

    if !params.ask {
        let transcript = state.orchestrator.recognizer().recognize(&clip, &language).await;
        return Json(TranscribeResponse::new(transcript)).into_response();
    }

    match state.orchestrator.respond_to_audio(&clip, &language).await {
        Ok(voice) => {
            let mut body = TranscribeResponse::new(voice.transcript);
            body.query = voice.query;
            body.response = voice.response;
            Json(body).into_response()
        }
        Err(e) => error_response(status_for(&e), e.to_string()),
    }
}

async fn list_collections(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.orchestrator.knowledge_base().list_collections().await {
        Ok(collections) => Json(CollectionsResponse {
            total: collections.len(),
            collections: collections
                .into_iter()
                .map(|c| CollectionEntry {
                    name: c.name,
                    document_count: c.document_count,
                    created_at: c.created_at.to_rfc3339(),
                })
                .collect(),
        })
        .into_response(),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn create_session(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session = state.sessions.create().await;
    (StatusCode::CREATED, Json(session)).into_response()
}

async fn get_session(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match state.sessions.get(id).await {
        Some(session) => Json(session).into_response(),
        None => session_not_found(id),
    }
}

async fn delete_session(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match state.sessions.remove(id).await {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => session_not_found(id),
    }
}

/// `index` is 1-based, matching the numbers shown next to each task.
async fn set_task(
    State(state): State<Arc<AppState>>,
    Path((id, index)): Path<(Uuid, usize)>,
    Json(req): Json<TaskRequest>,
) -> impl IntoResponse {
    if state.sessions.get(id).await.is_none() {
        return session_not_found(id);
    }
    if index == 0 {
        return error_response(StatusCode::BAD_REQUEST, "Task numbers start at 1");
    }

    match state
        .sessions
        .update(id, |s| s.checklist.set(index - 1, req.done))
        .await
    {
        Ok(session) => Json(session).into_response(),
        Err(e) => error_response(status_for(&e), e.to_string()),
    }
}

async fn new_chat(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match state
        .sessions
        .update(id, |s| {
            s.new_chat();
            Ok(())
        })
        .await
    {
        Ok(session) => Json(session).into_response(),
        Err(_) => session_not_found(id),
    }
}

/// Check the checklist. The session is left as it is either way.
async fn finish_session(State(state): State<Arc<AppState>>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let Some(session) = state.sessions.get(id).await else {
        return session_not_found(id);
    };

    let completion = session.finish();
    let status = match completion {
        Completion::Done => StatusCode::OK,
        Completion::Incomplete { .. } => StatusCode::CONFLICT,
    };
    (status, Json(FinishResponse { completion, session })).into_response()
}
