use crate::infra::AppState;
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use clarification::explorer::{explorer_router, ChatTransport, RatingPredictor, SessionController};
use serde_json::json;
use std::sync::Arc;

/// Embedded dashboard shell, keyed by file name.
const SHELL_ASSETS: [(&str, &str); 3] = [
    ("index.html", include_str!("../assets/index.html")),
    ("app.js", include_str!("../assets/app.js")),
    ("app.css", include_str!("../assets/app.css")),
];

pub(crate) fn with_dashboard_routes<P, T>(controller: Arc<SessionController<P, T>>) -> axum::Router
where
    P: RatingPredictor + 'static,
    T: ChatTransport + 'static,
{
    explorer_router(controller)
        .route("/", axum::routing::get(shell_index))
        .route("/assets/:file", axum::routing::get(shell_asset))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
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

pub(crate) async fn shell_index() -> Response {
    serve_asset("index.html")
}

pub(crate) async fn shell_asset(Path(file): Path<String>) -> Response {
    serve_asset(&file)
}

fn serve_asset(name: &str) -> Response {
    match SHELL_ASSETS.iter().find(|(file, _)| *file == name) {
        Some((file, body)) => {
            let mime = mime_guess::from_path(file).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.essence_str().to_string())],
                *body,
            )
                .into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("no asset named '{name}'") })),
        )
            .into_response(),
    }
}
