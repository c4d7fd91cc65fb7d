use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{CompanyRecord, ScoreKind};
use super::narrative::ChatTransport;
use super::predictor::RatingPredictor;
use super::session::{SessionController, SessionEditState, SessionError, SessionKey};
use super::views::{AnalysisDialogView, CompanyCardView, CompanyProfileView, ComparatorView};

/// Router builder exposing the dashboard JSON API.
pub fn explorer_router<P, T>(controller: Arc<SessionController<P, T>>) -> Router
where
    P: RatingPredictor + 'static,
    T: ChatTransport + 'static,
{
    Router::new()
        .route("/api/v1/companies", get(list_handler::<P, T>))
        .route("/api/v1/companies/:company", get(profile_handler::<P, T>))
        .route("/api/v1/comparison", post(comparison_handler::<P, T>))
        .route("/api/v1/sessions", post(open_session_handler::<P, T>))
        .route(
            "/api/v1/sessions/:session_id/companies/:company",
            get(card_handler::<P, T>),
        )
        .route(
            "/api/v1/sessions/:session_id/companies/:company/edits",
            post(edit_handler::<P, T>),
        )
        .route(
            "/api/v1/sessions/:session_id/companies/:company/analysis",
            post(analysis_handler::<P, T>),
        )
        .route(
            "/api/v1/sessions/:session_id/companies/:company/reset",
            post(reset_handler::<P, T>),
        )
        .with_state(controller)
}

#[derive(Debug, Default, Deserialize)]
pub struct CompanyQuery {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompanyListResponse<'a> {
    pub total: usize,
    pub companies: Vec<&'a str>,
}

#[derive(Debug, Deserialize)]
pub struct ComparisonRequest {
    #[serde(default)]
    pub companies: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionKeyParts {
    session_id: String,
    company: String,
}

impl SessionKeyParts {
    fn into_key(self) -> SessionKey {
        SessionKey::new(self.session_id, self.company)
    }
}

#[derive(Debug, Deserialize)]
pub struct EditRequest {
    pub score: String,
    pub value: f64,
}

pub(crate) async fn list_handler<P, T>(
    State(controller): State<Arc<SessionController<P, T>>>,
    Query(query): Query<CompanyQuery>,
) -> Response
where
    P: RatingPredictor + 'static,
    T: ChatTransport + 'static,
{
    let store = controller.store();
    let companies = store.search(query.q.as_deref().unwrap_or_default());
    let body = CompanyListResponse {
        total: store.len(),
        companies,
    };
    (StatusCode::OK, axum::Json(body)).into_response()
}

pub(crate) async fn profile_handler<P, T>(
    State(controller): State<Arc<SessionController<P, T>>>,
    Path(company): Path<String>,
) -> Response
where
    P: RatingPredictor + 'static,
    T: ChatTransport + 'static,
{
    match controller.store().get(&company) {
        Some(record) => {
            (StatusCode::OK, axum::Json(CompanyProfileView::build(record))).into_response()
        }
        None => session_failure(SessionError::UnknownCompany(company)),
    }
}

pub(crate) async fn comparison_handler<P, T>(
    State(controller): State<Arc<SessionController<P, T>>>,
    axum::Json(request): axum::Json<ComparisonRequest>,
) -> Response
where
    P: RatingPredictor + 'static,
    T: ChatTransport + 'static,
{
    let records = controller.store().select(&request.companies);
    (StatusCode::OK, axum::Json(ComparatorView::build(&records))).into_response()
}

pub(crate) async fn open_session_handler<P, T>(
    State(controller): State<Arc<SessionController<P, T>>>,
) -> Response
where
    P: RatingPredictor + 'static,
    T: ChatTransport + 'static,
{
    match controller.open_session() {
        Ok(session) => {
            (StatusCode::CREATED, axum::Json(json!({ "session_id": session.0 }))).into_response()
        }
        Err(error) => session_failure(error),
    }
}

pub(crate) async fn card_handler<P, T>(
    State(controller): State<Arc<SessionController<P, T>>>,
    Path(parts): Path<SessionKeyParts>,
) -> Response
where
    P: RatingPredictor + 'static,
    T: ChatTransport + 'static,
{
    let key = parts.into_key();
    let result = controller.snapshot(&key);
    card_response(&controller, &key, result)
}

pub(crate) async fn edit_handler<P, T>(
    State(controller): State<Arc<SessionController<P, T>>>,
    Path(parts): Path<SessionKeyParts>,
    axum::Json(request): axum::Json<EditRequest>,
) -> Response
where
    P: RatingPredictor + 'static,
    T: ChatTransport + 'static,
{
    let kind = match request.score.parse::<ScoreKind>() {
        Ok(kind) => kind,
        Err(error) => {
            return error_response(StatusCode::UNPROCESSABLE_ENTITY, error.to_string());
        }
    };
    let key = parts.into_key();
    let result = controller.edit(&key, kind, request.value);
    card_response(&controller, &key, result)
}

pub(crate) async fn analysis_handler<P, T>(
    State(controller): State<Arc<SessionController<P, T>>>,
    Path(parts): Path<SessionKeyParts>,
) -> Response
where
    P: RatingPredictor + 'static,
    T: ChatTransport + 'static,
{
    let key = parts.into_key();
    match controller.analyze(&key).await {
        Ok(result) => match record_for(&controller, &key) {
            Some(record) => {
                let dialog = AnalysisDialogView::build(record, result);
                (StatusCode::OK, axum::Json(dialog)).into_response()
            }
            None => session_failure(SessionError::UnknownCompany(key.company.0)),
        },
        Err(error) => session_failure(error),
    }
}

pub(crate) async fn reset_handler<P, T>(
    State(controller): State<Arc<SessionController<P, T>>>,
    Path(parts): Path<SessionKeyParts>,
) -> Response
where
    P: RatingPredictor + 'static,
    T: ChatTransport + 'static,
{
    let key = parts.into_key();
    let result = controller.reset(&key);
    card_response(&controller, &key, result)
}

fn record_for<'a, P, T>(
    controller: &'a SessionController<P, T>,
    key: &SessionKey,
) -> Option<&'a CompanyRecord>
where
    P: RatingPredictor + 'static,
    T: ChatTransport + 'static,
{
    controller.store().get(key.company.as_str())
}

fn card_response<P, T>(
    controller: &SessionController<P, T>,
    key: &SessionKey,
    result: Result<SessionEditState, SessionError>,
) -> Response
where
    P: RatingPredictor + 'static,
    T: ChatTransport + 'static,
{
    let state = match result {
        Ok(state) => state,
        Err(error) => return session_failure(error),
    };
    match record_for(controller, key) {
        Some(record) => {
            let card = CompanyCardView::build(record, &state);
            (StatusCode::OK, axum::Json(card)).into_response()
        }
        None => session_failure(SessionError::UnknownCompany(key.company.0.clone())),
    }
}

fn session_failure(error: SessionError) -> Response {
    let status = match error {
        SessionError::UnknownCompany(_) | SessionError::UnknownSession(_) => {
            StatusCode::NOT_FOUND
        }
        SessionError::ScoreOutOfRange { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SessionError::Poisoned => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, error.to_string())
}

fn error_response(status: StatusCode, message: String) -> Response {
    let payload = json!({
        "error": message,
    });
    (status, axum::Json(payload)).into_response()
}
