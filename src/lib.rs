//! Claims- and role-based authorization for an administration area.
//!
//! The crate decides whether an authenticated caller may perform an action:
//! - **Policies**: named rules combining roles, claims and custom requirements
//! - **Handlers**: custom requirement logic, such as "admins may edit other
//!   admins but never themselves"
//! - **Registry**: an immutable policy table built once at startup and shared
//!   by every request
//! - **Gate**: the only way to obtain a [`Ctx`]
//!
//! # Core Types
//!
//! - [`Principal`]: The caller, with roles and claims
//! - [`Policy`]: A named [`Rule`] tree
//! - [`PolicyRegistry`]: Policies plus the handlers for their requirements
//! - [`PolicyGate`]: Builder that evaluates policies and creates contexts
//! - [`Ctx`]: Context proving which policies were granted
//!
//! # Examples
//!
//! ```
//! use admin_authz::{
//!     claims::{claim_types, roles},
//!     policies, standard_registry, Claim, PolicyGate, Principal, RequestMeta, RequestResource,
//! };
//!
//! let registry = standard_registry().expect("standard policies are consistent");
//!
//! let mut meta = RequestMeta::new("req-123");
//! meta.principal = Some(
//!     Principal::new("u1")
//!         .with_role(roles::ADMIN)
//!         .with_claim(Claim::flag(claim_types::EDIT_ROLE, true)),
//! );
//! meta.resource = Some(RequestResource::from_uri("/Administration/ManageUserRoles?userId=U1"));
//!
//! // Editing yourself is refused, whatever the case of the identifier.
//! let denied = PolicyGate::new(meta).require(policies::EDIT_ROLE).build(&registry);
//! assert!(denied.is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod audit;
pub mod claims;
mod config;
mod context;
mod error;
mod gate;
mod handler;
mod password;
pub mod policies;
mod policy;
mod registry;
mod request;
mod requirement;
pub mod web;

pub use claims::Claim;
pub use config::{
    AuthConfig, DEFAULT_ACCESS_DENIED_PATH, DEFAULT_LOGIN_PATH, DEFAULT_RETURN_URL_PARAMETER,
};
pub use context::{Ctx, DecisionContext};
pub use error::{ConfigError, RegistryError, Violation, ViolationKind};
pub use gate::PolicyGate;
pub use handler::{
    any_handler_succeeds, AuthorizationHandler, EditOtherAdminHandler, HandlerOutcome,
    SuperAdminHandler, TARGET_USER_QUERY_KEY,
};
pub use password::{PasswordOptions, PasswordViolation};
pub use policies::standard_registry;
pub use policy::{Assertion, HandlerSource, NoHandlers, Policy, PolicyBuilder, Rule};
pub use registry::{Decision, PolicyRegistry, PolicyRegistryBuilder};
pub use request::{Principal, RequestMeta, RequestResource};
pub use requirement::Requirement;
