//! HTTP routes.
//!
//! - `GET /`: status page polling `/status`
//! - `GET|POST /start`: launch a job, return at once
//! - `GET /status`: status of the most recently launched job
//! - `GET /jobs`, `GET /jobs/:id`, `GET /jobs/:id/status`: job records
//! - `POST /jobs/:id/cancel`: cancel a job
//! - `GET /health`: liveness probe

use crate::assets::index_html;
use crate::error::ApiError;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use serde_json::json;
use std::sync::Arc;
use tp_core::state::JobManager;
use tp_protocol::job_models::{Job, StartResponse, StatusRecord};
use tracing::info;
use uuid::Uuid;

/// Shared state of every handler.
#[derive(Clone)]
pub struct AppState {
    jobs: Arc<JobManager>,
}

impl AppState {
    pub fn new(jobs: Arc<JobManager>) -> Self {
        Self { jobs }
    }
}

/// Creates the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/start", get(start).post(start))
        .route("/status", get(status))
        .route("/jobs", get(list_jobs))
        .route("/jobs/:id", get(get_job))
        .route("/jobs/:id/status", get(job_status))
        .route("/jobs/:id/cancel", post(cancel_job))
        .route("/health", get(health_check))
        .with_state(state)
}

async fn index() -> impl IntoResponse {
    match index_html() {
        Some(html) => Html(html).into_response(),
        None => (StatusCode::INTERNAL_SERVER_ERROR, "status page missing").into_response(),
    }
}

/// Launches a job and reports success without waiting for it.
async fn start(State(state): State<AppState>) -> Json<StartResponse> {
    let job_id = state.jobs.start_job().await;
    info!(%job_id, "Pipeline started via HTTP");
    Json(StartResponse::started(job_id))
}

async fn status(State(state): State<AppState>) -> Json<StatusRecord> {
    Json(state.jobs.latest_status().await)
}

async fn list_jobs(State(state): State<AppState>) -> Json<Vec<Job>> {
    Json(state.jobs.list_jobs().await)
}

async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Job>, ApiError> {
    state
        .jobs
        .get_job(id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Job {id} not found")))
}

async fn job_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StatusRecord>, ApiError> {
    state
        .jobs
        .job_status(id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Job {id} not found")))
}

async fn cancel_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.jobs.cancel_job(id).await?;
    Ok(Json(json!({ "status": "Cancellation requested" })))
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tower::ServiceExt;
    use tp_core::engine::PipelineEngine;
    use tp_core::generators::adapters::MockStoryGenerator;
    use tp_core::generators::GeneratorSet;
    use tp_core::media::{CompositionOutput, CompositionRequest, Compositor, MediaError};
    use tp_protocol::config_models::PipelineConfig;
    use tp_protocol::job_models::JobStatus;

    struct TouchCompositor;

    #[async_trait]
    impl Compositor for TouchCompositor {
        fn name(&self) -> &'static str {
            "touch"
        }

        async fn compose(
            &self,
            request: &CompositionRequest,
        ) -> Result<CompositionOutput, MediaError> {
            tokio::fs::write(&request.output, b"mp4").await?;
            Ok(CompositionOutput {
                path: request.output.clone(),
                duration: Duration::from_secs(2),
                frame_count: 50,
            })
        }
    }

    fn test_manager(generators: GeneratorSet, dir: &std::path::Path) -> Arc<JobManager> {
        let mut config = PipelineConfig::default();
        config.storage.work_dir = dir.display().to_string();
        config.video.width = 16;
        config.video.height = 9;

        let engine = PipelineEngine::new(generators, Arc::new(TouchCompositor), config);
        let (tx, mut rx) = mpsc::channel(100);
        tokio::spawn(async move { while rx.recv().await.is_some() {} });
        Arc::new(JobManager::new(engine, tx))
    }

    fn slow_story() -> GeneratorSet {
        GeneratorSet {
            story: Arc::new(MockStoryGenerator::default().with_delay(Duration::from_secs(60))),
            ..GeneratorSet::mock()
        }
    }

    async fn send(app: Router, method: Method, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn test_health_check() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(AppState::new(test_manager(GeneratorSet::mock(), dir.path())));

        let (status, body) = send(app, Method::GET, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn test_status_idle_before_any_job() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(AppState::new(test_manager(GeneratorSet::mock(), dir.path())));

        let (status, body) = send(app, Method::GET, "/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"step": "Idle", "youtube_link": ""}));
    }

    #[tokio::test]
    async fn test_index_serves_html() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(AppState::new(test_manager(GeneratorSet::mock(), dir.path())));

        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()["content-type"].to_str().unwrap();
        assert!(content_type.starts_with("text/html"));
    }

    /// The fox scenario through HTTP: start, then poll until complete.
    #[tokio::test]
    async fn test_start_then_status_complete() {
        let dir = tempfile::tempdir().unwrap();
        let manager = test_manager(GeneratorSet::mock(), dir.path());
        let app = router(AppState::new(Arc::clone(&manager)));

        let (status, body) = send(app.clone(), Method::GET, "/start").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "Pipeline started");
        let reply: StartResponse = serde_json::from_value(body).unwrap();
        let job_id = reply.job_id;

        manager.wait_for(job_id).await.unwrap();

        let (_, body) = send(app.clone(), Method::GET, "/status").await;
        assert_eq!(
            body,
            json!({
                "step": "Complete",
                "youtube_link": "https://www.youtube.com/watch?v=abc123"
            })
        );

        let (status, body) = send(app, Method::GET, &format!("/jobs/{job_id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "COMPLETED");
    }

    #[tokio::test]
    async fn test_post_start_while_running() {
        let dir = tempfile::tempdir().unwrap();
        let manager = test_manager(slow_story(), dir.path());
        let app = router(AppState::new(Arc::clone(&manager)));

        let (first, _) = send(app.clone(), Method::POST, "/start").await;
        let (second, _) = send(app.clone(), Method::POST, "/start").await;
        assert_eq!(first, StatusCode::OK);
        assert_eq!(second, StatusCode::OK);

        let (status, body) = send(app, Method::GET, "/jobs").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        manager.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_job_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = router(AppState::new(test_manager(GeneratorSet::mock(), dir.path())));
        let id = Uuid::new_v4();

        let (status, body) = send(app.clone(), Method::GET, &format!("/jobs/{id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains(&id.to_string()));

        let (status, _) = send(app.clone(), Method::GET, &format!("/jobs/{id}/status")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(app, Method::POST, &format!("/jobs/{id}/cancel")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cancel_running_then_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let manager = test_manager(slow_story(), dir.path());
        let app = router(AppState::new(Arc::clone(&manager)));

        let job_id = manager.start_job().await;

        let (status, body) = send(app.clone(), Method::POST, &format!("/jobs/{job_id}/cancel")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "Cancellation requested");

        let job = manager.wait_for(job_id).await.unwrap();
        assert_eq!(job.status, JobStatus::Cancelled);

        let (status, body) = send(app.clone(), Method::GET, &format!("/jobs/{job_id}/status")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["step"], "Cancelled");

        let (status, _) = send(app, Method::POST, &format!("/jobs/{job_id}/cancel")).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
