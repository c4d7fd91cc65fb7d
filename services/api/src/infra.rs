use crate::cli::SourceArgs;
use clarification::config::AppConfig;
use clarification::explorer::{
    CompanyStore, HttpChatTransport, NarrativeGenerator, Predictor, SessionController,
};
use clarification::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

pub(crate) type DashboardController = SessionController<Predictor, HttpChatTransport>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn apply_sources(config: &mut AppConfig, sources: SourceArgs) {
    if let Some(data) = sources.data {
        config.data.companies_csv = data;
    }
    if let Some(model) = sources.model {
        config.model.model_path = model;
    }
    if let Some(scaler) = sources.scaler {
        config.model.scaler_path = scaler;
    }
}

/// Loads the dataset and both model artifacts. Any failure is fatal.
pub(crate) fn build_controller(config: &AppConfig) -> Result<DashboardController, AppError> {
    let store = CompanyStore::from_path(&config.data.companies_csv)?;
    let predictor = Predictor::load(&config.model.model_path, &config.model.scaler_path)?;
    let transport = HttpChatTransport::new(&config.narrative)?;
    info!(
        companies = store.len(),
        endpoint = %transport.endpoint(),
        model = %config.narrative.model,
        "dashboard sources loaded"
    );

    let narrator = NarrativeGenerator::new(Arc::new(transport), config.narrative.model.clone());
    Ok(SessionController::new(
        Arc::new(store),
        Arc::new(predictor),
        Arc::new(narrator),
    ))
}
