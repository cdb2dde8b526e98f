use campus_placement::error::AppError;
use campus_placement::workflows::placement::{
    InMemoryPlacementStore, StudentRosterImporter, TenantScope,
};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Build the in-memory store, optionally hydrated from a roster export.
pub(crate) fn load_store(
    roster: Option<(&Path, &TenantScope)>,
) -> Result<Arc<InMemoryPlacementStore>, AppError> {
    let store = Arc::new(InMemoryPlacementStore::new());

    if let Some((path, scope)) = roster {
        let students = StudentRosterImporter::from_path(path)?;
        let loaded = store.seed_students(scope, students)?;
        info!(tenant = %scope.tenant(), loaded, path = %path.display(), "student roster imported");
    }

    Ok(store)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
