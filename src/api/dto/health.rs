//! DTOs for the `/health` endpoint.

use serde::Serialize;

/// Overall service state reported by `/health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Healthy,
    Degraded,
}

/// State of a single dependency probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeState {
    Ok,
    Error,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: ServiceState,
    pub service: String,
    pub version: &'static str,
    pub checks: HealthChecks,
}

impl HealthResponse {
    /// Derives the overall state from the individual probes.
    pub fn new(service: impl Into<String>, checks: HealthChecks) -> Self {
        let status = if checks.database.status == ProbeState::Ok {
            ServiceState::Healthy
        } else {
            ServiceState::Degraded
        };

        Self {
            status,
            service: service.into(),
            version: env!("CARGO_PKG_VERSION"),
            checks,
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == ServiceState::Healthy
    }
}

#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub database: Probe,
}

#[derive(Debug, Serialize)]
pub struct Probe {
    pub status: ProbeState,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Probe {
    pub fn ok() -> Self {
        Self {
            status: ProbeState::Ok,
            message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: ProbeState::Error,
            message: Some(message.into()),
        }
    }
}
