use serde::Serialize;
use std::sync::Arc;
use std::time::SystemTime;

use crate::admission::{AdmissionConfig, AdmissionController};
use crate::store::RecordStore;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub laureates: usize,
    pub data_file: String,
    pub tracked_clients: usize,
    pub admission: AdmissionConfig,
}

static START_TIME: std::sync::LazyLock<SystemTime> = std::sync::LazyLock::new(SystemTime::now);

#[derive(Clone)]
pub struct HealthChecker {
    store: Arc<RecordStore>,
    admission: AdmissionController,
}

impl HealthChecker {
    pub fn new(store: Arc<RecordStore>, admission: AdmissionController) -> Self {
        // Uptime counts from construction.
        std::sync::LazyLock::force(&START_TIME);
        Self { store, admission }
    }

    pub async fn check_health(&self) -> HealthStatus {
        let now = SystemTime::now();
        let uptime = now.duration_since(*START_TIME)
            .unwrap_or_default()
            .as_secs();

        // A poisoned admission lock leaves mutations failing with 500s.
        let (status, tracked_clients) = match self.admission.tracked_clients() {
            Ok(count) => ("healthy", count),
            Err(_) => ("degraded", 0),
        };

        HealthStatus {
            status: status.to_string(),
            timestamp: now.duration_since(SystemTime::UNIX_EPOCH)
                .unwrap_or_default()
                .as_secs(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: uptime,
            laureates: self.store.len().await,
            data_file: self.store.path().display().to_string(),
            tracked_clients,
            admission: self.admission.config(),
        }
    }
}
