//! # Proposalflow Web
//!
//! A single-page front end for the proposalflow pipeline: `GET /` shows a
//! form, `POST /` runs the pipeline for the submitted URL and renders the
//! proposal or the failure.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, rust_2018_idioms)]
#![allow(clippy::module_name_repetitions, clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod pages;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Form, Router,
};
use proposalflow::events::LoggingEventSink;
use proposalflow::pipeline::Coordinator;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// State shared by every handler.
#[derive(Debug)]
pub struct AppState {
    /// The pipeline, shared by all requests.
    pub coordinator: Coordinator,
}

/// Shared handle to [`AppState`].
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Wraps `coordinator` for use as router state.
    pub fn shared(coordinator: Coordinator) -> SharedState {
        Arc::new(Self { coordinator })
    }
}

/// The submitted form. A missing `url` is the empty string.
#[derive(Debug, Default, Deserialize)]
pub struct ProposalForm {
    /// Company URL as typed by the user.
    #[serde(default)]
    pub url: String,
}

/// The sink reporting pipeline progress.
///
/// Logs at `INFO` so stage progress shows under the default log filter.
pub fn progress_sink() -> LoggingEventSink {
    LoggingEventSink::info()
}

/// Builds the application router.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(index).post(submit))
        .route("/health", get(health))
        .with_state(state)
}

/// Renders the input form.
pub async fn index() -> Html<String> {
    Html(pages::index_page())
}

/// Runs the pipeline for the submitted URL.
///
/// Responds 200 with the proposal, or 502 with the failing stage.
pub async fn submit(State(state): State<SharedState>, Form(form): Form<ProposalForm>) -> Response {
    info!(url = %form.url, "Proposal requested");
    match state.coordinator.execute(&form.url).await {
        Ok(run) => {
            info!(run_id = %run.run_id, duration_ms = run.duration_ms(), "Proposal generated");
            let proposal = run.final_output.unwrap_or_default();
            Html(pages::result_page(&form.url, &proposal)).into_response()
        }
        Err(err) => {
            warn!(url = %form.url, stage = %err.stage(), error = %err, "Proposal generation failed");
            (StatusCode::BAD_GATEWAY, Html(pages::error_page(&form.url, &err))).into_response()
        }
    }
}

/// Liveness probe.
pub async fn health() -> &'static str {
    "ok"
}

/// Serves the router on `addr` until the process is stopped.
pub async fn run_server(addr: SocketAddr, state: SharedState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use pretty_assertions::assert_eq;
    use proposalflow::core::StageId;
    use proposalflow::errors::GenerationError;
    use proposalflow::testing::{scripted_coordinator, ScriptedGenerator};

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn state(generator: ScriptedGenerator) -> SharedState {
        AppState::shared(scripted_coordinator(Arc::new(generator)))
    }

    #[tokio::test]
    async fn test_index_renders_form() {
        let Html(page) = index().await;
        assert!(page.contains("<form"));
    }

    #[tokio::test]
    async fn test_health() {
        assert_eq!(health().await, "ok");
    }

    #[tokio::test]
    async fn test_submit_success() {
        let generator = ScriptedGenerator::new().with_answer(StageId::Proposal, "1. Chatbot <priority high>");
        let form = ProposalForm { url: "https://example.com".to_string() };

        let response = submit(State(state(generator)), Form(form)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("Proposal for https://example.com"));
        assert!(body.contains("<pre>1. Chatbot &lt;priority high&gt;</pre>"));
    }

    #[tokio::test]
    async fn test_submit_failure_renders_error_page() {
        let generator = ScriptedGenerator::new().failing_on(StageId::Resource, GenerationError::Api("boom".to_string()));
        let form = ProposalForm { url: "https://example.com".to_string() };

        let response = submit(State(state(generator)), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = body_text(response).await;
        assert!(body.contains("<strong>Resource</strong>"));
        assert!(body.contains("boom"));
    }

    #[tokio::test]
    async fn test_submit_missing_url_fails_at_research() {
        let response = submit(State(state(ScriptedGenerator::new())), Form(ProposalForm::default())).await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(body_text(response).await.contains("<strong>Research</strong>"));
    }

    #[test]
    fn test_progress_sink_logs_at_info() {
        assert_eq!(progress_sink().level(), tracing::Level::INFO);
    }

    #[test]
    fn test_missing_url_deserializes_empty() {
        let form: ProposalForm = serde_json::from_str("{}").unwrap();
        assert_eq!(form.url, "");
    }
}
