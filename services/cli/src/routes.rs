use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use docgen::error::AppError;
use docgen::pipeline::{spawn_guarded_run, RunSummary};
use serde::Deserialize;
use serde_json::json;
use std::path::{Component, Path, PathBuf};
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReportRequest {
    #[serde(default)]
    pub(crate) roster_paths: Vec<PathBuf>,
    #[serde(default)]
    pub(crate) report_directory: Option<PathBuf>,
    #[serde(default)]
    pub(crate) include_invoice_pending: Option<bool>,
    #[serde(default)]
    pub(crate) include_account_pending: Option<bool>,
    #[serde(default)]
    pub(crate) include_pso_pending: Option<bool>,
}

pub(crate) fn with_report_routes() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/reports", post(generate_reports_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Runs the full report pipeline and answers once it has finished.
pub(crate) async fn generate_reports_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ReportRequest>,
) -> Result<Json<RunSummary>, AppError> {
    let reports = state.reports;
    let guard = reports
        .gate
        .try_acquire()
        .ok_or(AppError::RunInProgress)?;

    let ReportRequest {
        roster_paths,
        report_directory,
        include_invoice_pending,
        include_account_pending,
        include_pso_pending,
    } = payload;

    let roster_paths = if roster_paths.is_empty() {
        vec![reports.officials_list.clone()]
    } else {
        roster_paths
    };

    let mut pipeline = reports.pipeline.clone();
    if let Some(dir) = report_directory {
        pipeline.report_directory = within_report_root(&pipeline.report_directory, &dir)?;
    }
    if let Some(include) = include_invoice_pending {
        pipeline.statuses.invoice_pending = include;
    }
    if let Some(include) = include_account_pending {
        pipeline.statuses.account_pending = include;
    }
    if let Some(include) = include_pso_pending {
        pipeline.statuses.pso_pending = include;
    }

    let summary =
        spawn_guarded_run(guard, reports.store.clone(), pipeline, roster_paths).await?;
    info!(
        written = summary.written,
        skipped = summary.skipped,
        "report request served"
    );
    Ok(Json(summary))
}

/// Requested output directories are relative to the configured report root.
fn within_report_root(root: &Path, requested: &Path) -> Result<PathBuf, AppError> {
    let escapes = requested
        .components()
        .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(AppError::InvalidRequest(format!(
            "report_directory '{}' must be a relative path inside the report directory",
            requested.display()
        )));
    }
    Ok(root.join(requested))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{test_config, ReportState};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use docgen::report::FsDocumentStore;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use tower::ServiceExt;

    const EXPORT: &str = "Registration Id,Last Name,First Name,Email,ClubCode,Club,AffiliatedClubs,Status,Current_CertificationLevel\n\
        1,Smith,Ann,ann@example.com,ABC,Alpha Club,,Active,\n\
        2,Jones,Bo,bo@example.com,ABC,Alpha Club,,Invoice Pending,LEVEL I - RED PIN\n";

    fn state(root: &Path, ready: bool) -> AppState {
        let config = test_config(root);
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            reports: ReportState::new(&config, Arc::new(FsDocumentStore)),
        }
    }

    fn app(state: AppState) -> Router {
        with_report_routes().layer(Extension(state))
    }

    fn report_request(roster: &Path, out: &str) -> Request<Body> {
        let body = json!({
            "roster_paths": [roster],
            "report_directory": out,
            "include_invoice_pending": false,
        });
        Request::post("/api/v1/reports")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    fn write_roster(dir: &Path, contents: &str) -> PathBuf {
        let roster = dir.join("roster.csv");
        std::fs::write(&roster, contents).expect("roster written");
        roster
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body reads");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn health_and_readiness_report_status() {
        let dir = tempfile::tempdir().expect("tempdir");
        let response = app(state(dir.path(), false))
            .oneshot(Request::get("/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app(state(dir.path(), false))
            .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json_body(response).await["status"], "initializing");
    }

    #[tokio::test]
    async fn report_request_runs_pipeline() {
        let dir = tempfile::tempdir().expect("tempdir");
        let roster = write_roster(dir.path(), EXPORT);

        let response = app(state(dir.path(), true))
            .oneshot(report_request(&roster, "reports"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["written"], 1);
        assert_eq!(body["clubs"][0], "Alpha Club");
        assert_eq!(body["manifest"][0]["Last Name"], "Smith");
        assert!(dir.path().join("reports").join("smith-ann.html").exists());
    }

    #[tokio::test]
    async fn malformed_roster_is_a_bad_request() {
        let dir = tempfile::tempdir().expect("tempdir");
        let roster = write_roster(dir.path(), "Registration Id,Last Name\n1,Smith\n");

        let response = app(state(dir.path(), true))
            .oneshot(report_request(&roster, "reports"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["error"]
            .as_str()
            .expect("error message")
            .contains("ClubCode"));
    }

    #[tokio::test]
    async fn output_outside_report_root_is_refused() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("root");
        let roster = write_roster(dir.path(), EXPORT);

        for out in ["../escaped", "/tmp/elsewhere"] {
            let response = app(state(&root, true))
                .oneshot(report_request(&roster, out))
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
        assert!(!dir.path().join("escaped").exists());
    }

    #[tokio::test]
    async fn concurrent_run_is_refused() {
        let dir = tempfile::tempdir().expect("tempdir");
        let roster = write_roster(dir.path(), EXPORT);

        let state = state(dir.path(), true);
        let _running = state.reports.gate.try_acquire().expect("gate free");

        let response = app(state)
            .oneshot(report_request(&roster, "reports"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn report_root_accepts_nested_relative_directories() {
        let root = Path::new("/srv/reports");
        assert_eq!(
            within_report_root(root, Path::new("./2024/club")).expect("inside root"),
            PathBuf::from("/srv/reports/./2024/club")
        );
        assert!(within_report_root(root, Path::new("2024/../../etc")).is_err());
    }
}
