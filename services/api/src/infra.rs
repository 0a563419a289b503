use jobboard::applications::LocalResumeStore;
use jobboard::config::AppConfig;
use jobboard::http::ApiServices;
use jobboard::identity::{Argon2Hasher, JwtAuthority};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Services on in-memory stores, with credentials and resume storage taken
/// from configuration.
pub(crate) fn build_services(config: &AppConfig) -> ApiServices {
    ApiServices::in_memory(
        Arc::new(Argon2Hasher),
        Arc::new(JwtAuthority::from_config(&config.auth)),
        Arc::new(LocalResumeStore::from_config(&config.storage)),
    )
}
