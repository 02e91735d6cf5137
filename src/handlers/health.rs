use axum::{Json, extract::State};
use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::router::BuddyState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: String,
    /// Seconds since the server started.
    pub uptime: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUsage {
    pub rss_bytes: Option<u64>,
    pub virtual_bytes: Option<u64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedHealth {
    #[serde(flatten)]
    pub basic: HealthStatus,
    pub version: &'static str,
    pub environment: String,
    pub database: &'static str,
    pub memory: MemoryUsage,
}

fn basic(state: &BuddyState, status: &'static str) -> HealthStatus {
    HealthStatus {
        status,
        timestamp: Utc::now().to_rfc3339(),
        uptime: state.started_at.elapsed().as_secs_f64(),
    }
}

/// Parse `VmRSS` / `VmSize` (kB) out of a `/proc/<pid>/status` dump.
fn parse_proc_status(status: &str) -> MemoryUsage {
    let field = |name: &str| {
        status
            .lines()
            .find_map(|line| line.strip_prefix(name))
            .and_then(|rest| rest.split_whitespace().next())
            .and_then(|kb| kb.parse::<u64>().ok())
            .map(|kb| kb * 1024)
    };
    MemoryUsage {
        rss_bytes: field("VmRSS:"),
        virtual_bytes: field("VmSize:"),
    }
}

fn memory_usage() -> MemoryUsage {
    match std::fs::read_to_string("/proc/self/status") {
        Ok(s) => parse_proc_status(&s),
        Err(_) => MemoryUsage {
            rss_bytes: None,
            virtual_bytes: None,
        },
    }
}

/// GET /health
pub async fn health(State(state): State<BuddyState>) -> Json<HealthStatus> {
    Json(basic(&state, "ok"))
}

/// GET /health/detailed
pub async fn health_detailed(State(state): State<BuddyState>) -> Json<DetailedHealth> {
    let database = match state.storage.ping().await {
        Ok(()) => "ok",
        Err(e) => {
            warn!(error = %e, "database health check failed");
            "error"
        }
    };
    let status = if database == "ok" { "ok" } else { "degraded" };
    Json(DetailedHealth {
        basic: basic(&state, status),
        version: env!("CARGO_PKG_VERSION"),
        environment: state.environment.to_string(),
        database,
        memory: memory_usage(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_proc_status_fields() {
        let sample = "Name:\tbuddy\nVmSize:\t  2048 kB\nVmRSS:\t   512 kB\n";
        let mem = parse_proc_status(sample);
        assert_eq!(mem.rss_bytes, Some(512 * 1024));
        assert_eq!(mem.virtual_bytes, Some(2048 * 1024));
        assert_eq!(parse_proc_status("").rss_bytes, None);
    }
}
