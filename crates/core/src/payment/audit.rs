//! Audit sink writing to the tracing pipeline.

use super::ports::{AuditEvent, AuditSink};

/// Target of every audit event, for filtering with `RUST_LOG`.
pub const AUDIT_TARGET: &str = "coopbook::audit";

/// Writes each audit event as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        if is_failure(event.activity) {
            tracing::warn!(
                target: AUDIT_TARGET,
                activity = event.activity,
                module = event.module,
                description = %event.description,
                "audit"
            );
        } else {
            tracing::info!(
                target: AUDIT_TARGET,
                activity = event.activity,
                module = event.module,
                description = %event.description,
                "audit"
            );
        }
    }
}

fn is_failure(activity: &str) -> bool {
    activity.ends_with("-error")
        || activity.ends_with("-mismatch")
        || activity.ends_with("-exceeded")
        || activity.ends_with("-warning")
        || activity == "guard-blocked"
}
