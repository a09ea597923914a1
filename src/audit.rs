//! Audit trail of authorization decisions.
//!
//! - `AuditEvent`: one policy check, with safe identifiers only
//! - `AuditTrail`: thread-safe in-memory recorder
//! - `emit`: writes an event as a structured `tracing` record
//!
//! Events never carry query values or claim contents; only the request id,
//! the caller id, the policy name, the request path and the outcome.

mod event;
mod trail;

pub use event::{emit, AuditEvent, AuditOutcome};
pub use trail::AuditTrail;
