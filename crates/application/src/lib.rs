//! Application services and ports.

#![forbid(unsafe_code)]

mod access_evaluator;
mod audit_ports;
mod grant_ports;
mod grant_store_service;
mod session_reconciler;
mod user_ports;

#[cfg(test)]
mod test_fakes;

pub use access_evaluator::AccessEvaluator;
pub use audit_ports::{
    AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditPurgeResult,
    AuditRepository,
};
pub use grant_ports::{
    AccessRequestQuery, ApprovedAccessRequest, GrantRepository, RequestReview,
    TemporaryGrantQuery,
};
pub use grant_store_service::GrantStoreService;
pub use session_reconciler::{
    AccessChanged, ClientSession, EffectiveRegionsSource, ReconcilerHandle, ReconcilerSchedule,
    ReconcilerState, RegionCache, RegionSnapshot, SessionContext, SessionReconciler, SkipReason,
    TickOutcome,
};
pub use user_ports::UserDirectory;
