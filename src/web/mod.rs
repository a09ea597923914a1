//! Web framework integration surface.
//!
//! This module is the boundary between an HTTP framework and the policy
//! registry. It contains no framework-specific code:
//! - `RequestAdapter` carries the parts of a request a decision needs
//! - `ExtractMetadata` maps a framework request to `RequestMeta`
//! - `authorize_request` runs the gate and maps a denial to the redirect the
//!   host should send
//!
//! # Example Flow
//!
//! ```ignore
//! // In a framework-specific integration (e.g., axum, actix):
//! let adapter = RequestAdapter::from_uri(request_id, req.uri().to_string())
//!     .with_principal(session.principal());
//!
//! match authorize_request(&adapter, &registry, &config, &Endpoint::protected().with_policy("EditRolePolicy")) {
//!     Ok(ctx) => render_edit_page(ctx),
//!     Err(rejection) => redirect(rejection.redirect()),
//! }
//! ```

mod adapter;
mod extract;
mod middleware;

pub use adapter::RequestAdapter;
pub use extract::ExtractMetadata;
pub use middleware::{authorize_request, Endpoint, Rejection};
