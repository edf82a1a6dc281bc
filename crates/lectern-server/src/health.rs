//! Liveness and readiness probes.
//!
//! - `/health` reports that the process is up, with service name, version
//!   and uptime.
//! - `/ready` reports whether the server should receive traffic. It turns
//!   unready while draining connections during shutdown, and when any
//!   registered check fails.
//!
//! ```rust
//! use lectern_server::{HealthCheck, ReadinessCheck};
//!
//! let health = HealthCheck::new("shop-docs", "1.4.0");
//! assert!(health.status().is_healthy());
//!
//! let readiness = ReadinessCheck::new().add_check("descriptor_table", || true);
//! assert!(readiness.is_ready());
//! ```

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Body of the `/health` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    status: String,
    service: String,
    version: String,
    uptime_seconds: u64,
}

impl HealthStatus {
    /// Creates a healthy status.
    #[must_use]
    pub fn healthy(
        service: impl Into<String>,
        version: impl Into<String>,
        uptime: Duration,
    ) -> Self {
        Self {
            status: "healthy".to_string(),
            service: service.into(),
            version: version.into(),
            uptime_seconds: uptime.as_secs(),
        }
    }

    /// Returns `true` for a healthy status.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }

    /// The reporting service.
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// The reporting service's version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Seconds since the server started.
    #[must_use]
    pub fn uptime_seconds(&self) -> u64 {
        self.uptime_seconds
    }
}

/// Liveness probe.
#[derive(Debug, Clone)]
pub struct HealthCheck {
    service: String,
    version: String,
    start_time: Instant,
}

impl HealthCheck {
    /// Creates a probe; uptime counts from now.
    #[must_use]
    pub fn new(service: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            version: version.into(),
            start_time: Instant::now(),
        }
    }

    /// Current status. Always healthy while the process can answer.
    #[must_use]
    pub fn status(&self) -> HealthStatus {
        HealthStatus::healthy(&self.service, &self.version, self.start_time.elapsed())
    }
}

/// Body of the `/ready` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReadinessStatus {
    ready: bool,
    checks: BTreeMap<String, bool>,
}

impl ReadinessStatus {
    /// Whether the server should receive traffic.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Result of a named check.
    #[must_use]
    pub fn check(&self, name: &str) -> Option<bool> {
        self.checks.get(name).copied()
    }
}

type ReadinessCheckFn = Arc<dyn Fn() -> bool + Send + Sync>;

/// Readiness probe: ready when not draining and every check passes.
#[derive(Clone)]
pub struct ReadinessCheck {
    checks: Vec<(String, ReadinessCheckFn)>,
    accepting: Arc<AtomicBool>,
}

impl std::fmt::Debug for ReadinessCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadinessCheck")
            .field(
                "checks",
                &self.checks.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .field("accepting", &self.accepting)
            .finish()
    }
}

impl ReadinessCheck {
    /// Creates a probe with no checks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            checks: Vec::new(),
            accepting: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Adds a named check.
    #[must_use]
    pub fn add_check<F>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.checks.push((name.into(), Arc::new(check)));
        self
    }

    /// Returns `true` when ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.accepting.load(Ordering::SeqCst) && self.checks.iter().all(|(_, check)| check())
    }

    /// Evaluates every check.
    #[must_use]
    pub fn status(&self) -> ReadinessStatus {
        let checks: BTreeMap<String, bool> = self
            .checks
            .iter()
            .map(|(name, check)| (name.clone(), check()))
            .collect();
        let ready = self.accepting.load(Ordering::SeqCst) && checks.values().all(|&ok| ok);

        ReadinessStatus { ready, checks }
    }

    /// Marks the server as accepting traffic or draining.
    pub fn set_ready(&self, ready: bool) {
        self.accepting.store(ready, Ordering::SeqCst);
    }
}

impl Default for ReadinessCheck {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status() {
        let health = HealthCheck::new("shop-docs", "1.0.0");
        let status = health.status();

        assert!(status.is_healthy());
        assert_eq!(status.service(), "shop-docs");
        assert_eq!(status.version(), "1.0.0");
        assert!(status.uptime_seconds() < 5);
    }

    #[test]
    fn test_health_status_serialization() {
        let status = HealthStatus::healthy("shop-docs", "1.0.0", Duration::from_secs(42));
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["uptime_seconds"], 42);
    }

    #[test]
    fn test_readiness_without_checks() {
        assert!(ReadinessCheck::new().is_ready());
    }

    #[test]
    fn test_readiness_follows_checks() {
        let loaded = Arc::new(AtomicBool::new(true));
        let probe = Arc::clone(&loaded);
        let readiness = ReadinessCheck::new()
            .add_check("descriptor_table", move || probe.load(Ordering::SeqCst));

        assert!(readiness.is_ready());
        loaded.store(false, Ordering::SeqCst);
        assert!(!readiness.is_ready());

        let status = readiness.status();
        assert!(!status.is_ready());
        assert_eq!(status.check("descriptor_table"), Some(false));
    }

    #[test]
    fn test_draining_is_not_ready() {
        let readiness = ReadinessCheck::new().add_check("always", || true);
        let shared = readiness.clone();

        shared.set_ready(false);
        assert!(!readiness.is_ready());
        assert!(!readiness.status().is_ready());
        assert_eq!(readiness.status().check("always"), Some(true));
    }
}
