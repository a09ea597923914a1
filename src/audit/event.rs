//! Audit event schema.

use std::fmt;

use serde::Serialize;

/// Outcome of an audited policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// The policy granted access
    Granted,
    /// The policy denied access
    Denied,
}

impl From<bool> for AuditOutcome {
    fn from(granted: bool) -> Self {
        if granted {
            AuditOutcome::Granted
        } else {
            AuditOutcome::Denied
        }
    }
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditOutcome::Granted => write!(f, "granted"),
            AuditOutcome::Denied => write!(f, "denied"),
        }
    }
}

/// A record of one policy check.
///
/// # Example
///
/// ```
/// use admin_authz::audit::{AuditEvent, AuditOutcome};
///
/// let event = AuditEvent::new("req-123", Some("u1"), "EditRolePolicy", AuditOutcome::Denied)
///     .with_path("/Administration/ManageUserRoles");
///
/// assert_eq!(event.policy(), "EditRolePolicy");
/// assert_eq!(event.principal(), Some("u1"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEvent {
    request_id: String,
    principal: Option<String>,
    policy: String,
    outcome: AuditOutcome,
    path: Option<String>,
}

impl AuditEvent {
    /// Creates an audit event with the required fields.
    pub fn new(
        request_id: impl Into<String>,
        principal: Option<impl Into<String>>,
        policy: impl Into<String>,
        outcome: AuditOutcome,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            principal: principal.map(Into::into),
            policy: policy.into(),
            outcome,
            path: None,
        }
    }

    /// Sets the request path. Must not include the query string.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Returns the request identifier.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the caller id, if any.
    pub fn principal(&self) -> Option<&str> {
        self.principal.as_deref()
    }

    /// Returns the checked policy.
    pub fn policy(&self) -> &str {
        &self.policy
    }

    /// Returns the outcome.
    pub fn outcome(&self) -> AuditOutcome {
        self.outcome
    }

    /// Returns the request path, if set.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}

impl fmt::Display for AuditEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AuditEvent[policy={}, outcome={}, request_id={}, principal={}",
            self.policy,
            self.outcome,
            self.request_id,
            self.principal.as_deref().unwrap_or("<none>")
        )?;

        if let Some(path) = &self.path {
            write!(f, ", path={}", path)?;
        }

        write!(f, "]")
    }
}

/// Writes an audit event as a structured `tracing` record.
pub fn emit(event: &AuditEvent) {
    tracing::info!(
        target: "policy_audit",
        request_id = %event.request_id(),
        principal = ?event.principal(),
        policy = %event.policy(),
        outcome = %event.outcome(),
        path = ?event.path(),
        "audit event"
    );
}
