//! Form and JSON handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Form, Json,
};
use boardmerge_core::{scan_and_merge, BoardCatalog, NullReporter, Reporter, ScanOptions, TracingReporter};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use crate::render::{self, FormValues};
use crate::state::AppState;

/// API error response
#[derive(Serialize)]
struct ApiError {
    error: String,
}

impl ApiError {
    fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

/// Scan parameters as submitted by the form or the query string
///
/// Checkboxes arrive as `"on"` when ticked and are missing otherwise.
#[derive(Debug, Default, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    path: String,
    #[serde(default)]
    recursive: Option<String>,
    #[serde(default)]
    depth: Option<String>,
    #[serde(default)]
    logging: Option<String>,
}

impl ScanRequest {
    fn form_values(&self, default_depth: usize) -> FormValues {
        FormValues {
            path: self.path.trim().to_string(),
            recursive: is_checked(self.recursive.as_deref()),
            depth: self
                .depth
                .as_deref()
                .and_then(|d| d.trim().parse().ok())
                .unwrap_or(default_depth),
            logging: is_checked(self.logging.as_deref()),
        }
    }
}

fn is_checked(value: Option<&str>) -> bool {
    matches!(value.map(str::trim), Some("on" | "true" | "1"))
}

/// Serve the empty scan form
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let form = FormValues::defaults(&state.config.scan);
    Html(render::page(&form, None))
}

/// Run the pipeline for a form submission and render the board table
pub async fn process_path(
    State(state): State<Arc<AppState>>,
    Form(request): Form<ScanRequest>,
) -> Html<String> {
    let form = request.form_values(state.config.scan.default_depth);
    let outcome = run_pipeline(&form).await;
    Html(render::page(&form, Some(&outcome)))
}

/// Run the pipeline and return the catalog as JSON
pub async fn get_catalog(
    State(state): State<Arc<AppState>>,
    Query(request): Query<ScanRequest>,
) -> impl IntoResponse {
    let form = request.form_values(state.config.scan.default_depth);
    match run_pipeline(&form).await {
        Ok(catalog) => Json(catalog).into_response(),
        Err(message) => (StatusCode::UNPROCESSABLE_ENTITY, Json(ApiError::new(message))).into_response(),
    }
}

/// Scan and merge on the blocking pool
///
/// Failures are flattened to their display text, which is what both the
/// HTML and JSON surfaces show.
async fn run_pipeline(form: &FormValues) -> Result<BoardCatalog, String> {
    let path = PathBuf::from(&form.path);
    let options = ScanOptions {
        recursive: form.recursive,
        max_depth: form.depth,
    };
    let logging = form.logging;

    info!(path = %path.display(), recursive = options.recursive, depth = options.max_depth, "Processing path");

    let task = tokio::task::spawn_blocking(move || {
        let reporter: &dyn Reporter = if logging { &TracingReporter } else { &NullReporter };
        scan_and_merge(&path, options, reporter)
    });

    match task.await {
        Ok(Ok(catalog)) => {
            info!(
                boards = catalog.metadata.total_boards,
                vendors = catalog.metadata.unique_vendors,
                "Merged board catalog"
            );
            Ok(catalog)
        }
        Ok(Err(e)) => {
            info!(error = %e, "Board merge failed");
            Err(e.to_string())
        }
        Err(e) => {
            error!(error = %e, "Board merge task failed");
            Err(format!("board merge task failed: {}", e))
        }
    }
}
