//! Payment posting pipeline.
//!
//! This module provides:
//! - `PaymentService`, the admission-to-commit state machine for one posting
//! - Collaborator ports for storage, actor resolution, abuse guard and audit
//! - `MemoryStore`, an in-process store with per-account locks
//! - `FailureWindowGuard` and `TracingAuditSink` adapters

pub mod audit;
pub mod error;
pub mod guard;
pub mod memory;
pub mod ports;
pub mod service;
pub mod types;


pub use audit::{AUDIT_TARGET, TracingAuditSink};
pub use error::{ActorError, GuardError, PaymentError, StoreError};
pub use guard::{FailureBlocker, FailureWindowGuard};
pub use memory::{MemoryStore, MemoryUnitOfWork};
pub use ports::{
    AbuseGuard, ActorResolver, AuditEvent, AuditSink, Blocker, GuardDecision, PaymentStore,
    UnitOfWork,
};
pub use service::PaymentService;
pub use types::{
    MemberProfile, OfficialReceiptCounter, PaymentRequest, PaymentType, RequestContext,
    TransactionResult, UserOrganization, UserType,
};
