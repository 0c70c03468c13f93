//! In-process abuse guard counting failures per client.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use coopbook_shared::config::AbuseGuardConfig;
use dashmap::DashMap;
use tokio::time::Instant;

use super::error::GuardError;
use super::ports::{AbuseGuard, Blocker, GuardDecision};
use super::types::RequestContext;

#[derive(Debug, Default)]
struct ClientRecord {
    failures: VecDeque<Instant>,
    blocked_until: Option<Instant>,
}

#[derive(Debug)]
struct Shared {
    clients: DashMap<String, ClientRecord>,
    max_failures: usize,
    window: Duration,
    block_for: Duration,
}

/// Blocks a client for a while once it fails too often inside a window.
#[derive(Debug, Clone)]
pub struct FailureWindowGuard {
    shared: Arc<Shared>,
}

impl FailureWindowGuard {
    /// Create a guard from configuration.
    #[must_use]
    pub fn new(config: &AbuseGuardConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                clients: DashMap::new(),
                max_failures: usize::try_from(config.max_failures).unwrap_or(usize::MAX),
                window: Duration::from_secs(config.window_secs),
                block_for: Duration::from_secs(config.block_secs),
            }),
        }
    }

    /// Returns true if `client_key` is blocked right now.
    #[must_use]
    pub fn is_blocked(&self, client_key: &str) -> bool {
        let now = Instant::now();
        self.shared
            .clients
            .get(client_key)
            .and_then(|record| record.blocked_until)
            .is_some_and(|until| until > now)
    }

    /// Failures of `client_key` inside the current window.
    #[must_use]
    pub fn failure_count(&self, client_key: &str) -> usize {
        self.shared
            .clients
            .get(client_key)
            .map_or(0, |record| record.failures.len())
    }
}

impl AbuseGuard for FailureWindowGuard {
    type Blocker = FailureBlocker;

    async fn check(&self, ctx: &RequestContext) -> Result<GuardDecision<FailureBlocker>, GuardError> {
        Ok(GuardDecision {
            blocked: self.is_blocked(&ctx.client_key),
            blocker: FailureBlocker {
                shared: Arc::clone(&self.shared),
                client_key: ctx.client_key.clone(),
            },
        })
    }
}

/// Failure reporter bound to one client.
#[derive(Debug, Clone)]
pub struct FailureBlocker {
    shared: Arc<Shared>,
    client_key: String,
}

impl Blocker for FailureBlocker {
    fn block(&self, reason: &str) {
        let now = Instant::now();
        let mut record = self
            .shared
            .clients
            .entry(self.client_key.clone())
            .or_default();

        while record
            .failures
            .front()
            .is_some_and(|at| now.duration_since(*at) > self.shared.window)
        {
            record.failures.pop_front();
        }
        record.failures.push_back(now);

        if record.failures.len() >= self.shared.max_failures {
            record.blocked_until = Some(now + self.shared.block_for);
            record.failures.clear();
            tracing::warn!(
                client = %self.client_key,
                reason,
                block_secs = self.shared.block_for.as_secs(),
                "client blocked after repeated failures"
            );
        } else {
            tracing::debug!(client = %self.client_key, reason, "failure recorded");
        }
    }
}
