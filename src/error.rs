use thiserror::Error;

use crate::requirement::Requirement;

/// A denied request with details about what failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct Violation {
    /// The kind of violation that occurred
    pub kind: ViolationKind,
    /// Human-readable message explaining the violation
    pub message: String,
}

impl Violation {
    /// Creates a new violation.
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// The kind of policy violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViolationKind {
    /// A policy failed and no principal was present
    #[error("Unauthenticated")]
    Unauthenticated,
    /// A policy failed for an authenticated principal
    #[error("Forbidden by '{policy}'")]
    Forbidden {
        /// The policy that denied access
        policy: String,
    },
    /// A required policy is not registered
    #[error("Unknown policy '{policy}'")]
    UnknownPolicy {
        /// The name that was looked up
        policy: String,
    },
}

/// Problems building or querying a [`PolicyRegistry`](crate::PolicyRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two policies share a name
    #[error("policy '{0}' is registered more than once")]
    DuplicatePolicy(String),
    /// A policy depends on a requirement nobody handles
    #[error("policy '{policy}' requires '{requirement}' but no handler is registered for it")]
    UnhandledRequirement {
        /// Policy naming the requirement
        policy: String,
        /// Requirement without handlers
        requirement: Requirement,
    },
    /// A policy has no requirements and would allow everyone
    #[error("policy '{policy}' has no requirements")]
    EmptyPolicy {
        /// Name of the empty policy
        policy: String,
    },
    /// Evaluation asked for a policy that does not exist
    #[error("no policy named '{0}'")]
    UnknownPolicy(String),
}

/// Problems loading [`AuthConfig`](crate::AuthConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed
    #[error("invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),
    /// A redirect path is not rooted
    #[error("{field} must start with '/', got '{value}'")]
    InvalidPath {
        /// Configuration field name
        field: &'static str,
        /// Offending value
        value: String,
    },
    /// An environment override could not be parsed
    #[error("{field} has invalid value '{value}'")]
    InvalidValue {
        /// Environment variable name
        field: &'static str,
        /// Offending value
        value: String,
    },
}
