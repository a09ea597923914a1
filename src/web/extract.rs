//! Extraction boundary trait for web integration.

use crate::request::RequestMeta;

/// Extracts request metadata from a framework-specific request.
///
/// Framework integrations implement this to supply the request id, the
/// principal rehydrated from the session, and the request target. It only
/// maps types; it never decides access.
///
/// # Examples
///
/// ```
/// use admin_authz::web::ExtractMetadata;
/// use admin_authz::{Principal, RequestMeta, RequestResource};
///
/// struct MyFrameworkRequest {
///     request_id: String,
///     target: String,
///     user: Option<String>,
/// }
///
/// impl ExtractMetadata for MyFrameworkRequest {
///     fn extract_metadata(&self) -> RequestMeta {
///         RequestMeta {
///             request_id: self.request_id.clone(),
///             principal: self.user.as_deref().map(Principal::new),
///             resource: Some(RequestResource::from_uri(&self.target)),
///         }
///     }
/// }
/// ```
pub trait ExtractMetadata {
    /// Extracts request metadata for policy validation.
    fn extract_metadata(&self) -> RequestMeta;
}
