//! Web server implementation

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use specrunner_common::{
    HealthStatus, ReportLink, RunRequest, RunRequestBody, RunResult, RunnerConfig, TestDefinition,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::catalog::TestCatalog;
use crate::error::ApiError;
use crate::executor::{PlaywrightExecutor, TestExecutor};
use crate::report::{report_url, ReportStore, REPORT_MOUNT};
use crate::runs::RunCoordinator;

/// Test-runner web server
#[derive(Clone)]
pub struct RunnerServer {
    state: Arc<RunnerState>,
}

struct RunnerState {
    catalog: TestCatalog,
    runs: RunCoordinator,
    reports: ReportStore,
    /// Host used in report URLs when the request carries none
    fallback_host: String,
}

impl RunnerServer {
    /// Server backed by the configured external test CLI
    pub fn new(config: &RunnerConfig) -> Self {
        let executor = PlaywrightExecutor::new(&config.executor, &config.paths.workdir);
        Self::with_executor(config, Arc::new(executor))
    }

    /// Server backed by any [`TestExecutor`]
    pub fn with_executor(config: &RunnerConfig, executor: Arc<dyn TestExecutor>) -> Self {
        let report_dir = absolute(config.report_dir());
        let env = RunCoordinator::run_env(report_dir.clone(), &config.executor.env);

        Self {
            state: Arc::new(RunnerState {
                catalog: TestCatalog::new(config.tests_dir(), config.executor.test_extensions.clone()),
                runs: RunCoordinator::new(executor, config.executor.max_concurrent_runs, env),
                reports: ReportStore::new(report_dir),
                fallback_host: config.listen_addr(),
            }),
        }
    }

    /// Create the report directory so the static mount has something to serve
    pub async fn prepare(&self) -> anyhow::Result<()> {
        self.state.reports.ensure_dir().await?;
        info!("Serving report from {}", self.state.reports.dir().display());
        Ok(())
    }

    /// Create router
    pub fn router(&self) -> Router {
        let report_files = ServeDir::new(self.state.reports.dir()).append_index_html_on_directories(true);

        Router::new()
            .route("/", get(root_handler))
            .route("/api/health", get(health_handler))
            .route("/tests", get(list_tests_handler))
            .route("/run", post(run_test_handler))
            .route("/api/open-report", get(open_report_handler))
            .nest_service(REPORT_MOUNT, report_files)
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Start the web server and run until `ctrl_c`
    pub async fn serve(self, addr: SocketAddr) -> anyhow::Result<()> {
        self.prepare().await?;
        info!("Test runner listening on http://{}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Test runner stopped");
        Ok(())
    }
}

/// The test CLI runs in its own working directory, so it needs an absolute
/// report path.
fn absolute(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received shutdown signal");
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn root_handler() -> &'static str {
    "Test runner ready"
}

async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn list_tests_handler(
    State(state): State<Arc<RunnerState>>,
) -> Result<Json<Vec<TestDefinition>>, ApiError> {
    Ok(Json(state.catalog.list().await?))
}

async fn run_test_handler(
    State(state): State<Arc<RunnerState>>,
    payload: Result<Json<RunRequestBody>, JsonRejection>,
) -> Result<Json<RunResult>, ApiError> {
    let body = match payload {
        Ok(Json(body)) => body,
        // No body / no content type reads as an empty request
        Err(JsonRejection::MissingJsonContentType(_)) => RunRequestBody::default(),
        Err(rejection) => {
            return Err(ApiError::bad_request(format!(
                "Invalid request body: {}",
                rejection.body_text()
            )))
        }
    };

    let request = RunRequest::try_from(body)?;
    let test = state.catalog.resolve(&request).await?;
    let result = state.runs.run(test).await?;
    Ok(Json(result))
}

async fn open_report_handler(State(state): State<Arc<RunnerState>>, headers: HeaderMap) -> Response {
    let no_cache = [
        (header::CACHE_CONTROL, "no-store, no-cache, must-revalidate, proxy-revalidate"),
        (header::PRAGMA, "no-cache"),
        (header::EXPIRES, "0"),
    ];

    let body = match state.reports.latest().await {
        Ok(report) => Json(ReportLink {
            success: true,
            message: "Report available".to_string(),
            url: report_url(&headers, &state.fallback_host),
            updated_at: report.updated_at,
        })
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    };

    (no_cache, body).into_response()
}
