//! Runs the policy gate for an endpoint and maps denials to redirects.
//!
//! # Integration Flow
//!
//! ```text
//! HTTP Request
//!   ↓
//! Framework-specific code builds RequestAdapter
//!   ↓
//! authorize_request(adapter, registry, config, endpoint)
//!   ↓
//! Ok(Ctx)                     → run the endpoint
//! Err(Rejection::Challenge)    → redirect to the login page
//! Err(Rejection::Forbidden)    → redirect to the access-denied page
//! Err(Rejection::Misconfigured)→ 500
//! ```

use thiserror::Error;

use crate::config::AuthConfig;
use crate::context::Ctx;
use crate::error::{Violation, ViolationKind};
use crate::gate::PolicyGate;
use crate::registry::PolicyRegistry;

use super::{ExtractMetadata, RequestAdapter};

/// Authorization requirements of one endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoint {
    policies: Vec<String>,
    allow_anonymous: bool,
}

impl Endpoint {
    /// An endpoint protected by the fallback policy only.
    pub fn protected() -> Self {
        Self::default()
    }

    /// An endpoint reachable without signing in.
    pub fn anonymous() -> Self {
        Self {
            policies: Vec::new(),
            allow_anonymous: true,
        }
    }

    /// Adds a named policy the endpoint requires.
    pub fn with_policy(mut self, policy: impl Into<String>) -> Self {
        self.policies.push(policy.into());
        self
    }

    /// Returns the named policies.
    pub fn policies(&self) -> &[String] {
        &self.policies
    }

    /// Returns `true` if the fallback policy is skipped.
    pub fn allows_anonymous(&self) -> bool {
        self.allow_anonymous
    }
}

/// Why a request was not let through, and where to send the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The caller must sign in first
    #[error("sign-in required, redirecting to {redirect}")]
    Challenge {
        /// Login page with the original target attached
        redirect: String,
    },
    /// The caller is signed in but not allowed
    #[error("access denied by '{policy}', redirecting to {redirect}")]
    Forbidden {
        /// Policy that denied access
        policy: String,
        /// Access-denied page with the original target attached
        redirect: String,
    },
    /// The endpoint names a policy the registry does not know
    #[error("endpoint requires unregistered policy '{policy}'")]
    Misconfigured {
        /// The unknown policy name
        policy: String,
    },
}

impl Rejection {
    /// HTTP status the host should answer with.
    pub fn status(&self) -> u16 {
        match self {
            Rejection::Challenge { .. } | Rejection::Forbidden { .. } => 302,
            Rejection::Misconfigured { .. } => 500,
        }
    }

    /// Redirect location, if the rejection is a redirect.
    pub fn redirect(&self) -> Option<&str> {
        match self {
            Rejection::Challenge { redirect } | Rejection::Forbidden { redirect, .. } => {
                Some(redirect)
            }
            Rejection::Misconfigured { .. } => None,
        }
    }
}

/// Runs every policy an endpoint requires.
///
/// The fallback policy applies unless the endpoint is anonymous or the
/// configuration turns it off.
///
/// # Errors
///
/// Returns a [`Rejection`] describing the redirect to send.
///
/// # Examples
///
/// ```
/// use admin_authz::web::{authorize_request, Endpoint, RequestAdapter};
/// use admin_authz::{policies, standard_registry, AuthConfig, Principal};
///
/// let registry = standard_registry().unwrap();
/// let config = AuthConfig::default();
/// let endpoint = Endpoint::protected().with_policy(policies::EDIT_ROLE);
///
/// let adapter = RequestAdapter::from_uri("req-1", "/Administration/ManageUserRoles?userId=u2")
///     .with_principal(Principal::new("u1").with_role("User"));
///
/// let rejection = authorize_request(&adapter, &registry, &config, &endpoint).unwrap_err();
/// assert_eq!(
///     rejection.redirect(),
///     Some("/Administration/AccessDenied?ReturnUrl=%2FAdministration%2FManageUserRoles%3FuserId%3Du2"),
/// );
/// ```
pub fn authorize_request(
    adapter: &RequestAdapter,
    registry: &PolicyRegistry,
    config: &AuthConfig,
    endpoint: &Endpoint,
) -> Result<Ctx, Rejection> {
    let mut gate = PolicyGate::new(adapter.extract_metadata());
    if endpoint.allow_anonymous || !config.require_authenticated_user {
        gate = gate.allow_anonymous();
    }
    for policy in &endpoint.policies {
        gate = gate.require(policy.as_str());
    }

    gate.build(registry)
        .map_err(|violation| reject(violation, adapter, config))
}

fn reject(violation: Violation, adapter: &RequestAdapter, config: &AuthConfig) -> Rejection {
    let return_url = adapter.resource().to_uri();

    match violation.kind {
        ViolationKind::Unauthenticated => Rejection::Challenge {
            redirect: with_return_url(&config.login_path, &config.return_url_parameter, &return_url),
        },
        ViolationKind::Forbidden { policy } => Rejection::Forbidden {
            policy,
            redirect: with_return_url(
                &config.access_denied_path,
                &config.return_url_parameter,
                &return_url,
            ),
        },
        ViolationKind::UnknownPolicy { policy } => Rejection::Misconfigured { policy },
    }
}

fn with_return_url(path: &str, parameter: &str, return_url: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair(parameter, return_url)
        .finish();
    format!("{}?{}", path, query)
}
