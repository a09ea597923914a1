//! Request adapter for mapping HTTP requests to crate types.

use crate::request::{Principal, RequestMeta, RequestResource};

use super::ExtractMetadata;

/// Framework-neutral snapshot of an incoming request.
///
/// Holds simple owned data so it can be built from any framework's request
/// type. Framework-specific code should implement
/// `From<FrameworkRequest>` for `RequestAdapter`.
///
/// # Examples
///
/// ```
/// use admin_authz::web::{ExtractMetadata, RequestAdapter};
/// use admin_authz::Principal;
///
/// let adapter = RequestAdapter::from_uri("req-12345", "/Administration/EditUser?userId=u2")
///     .with_principal(Principal::new("u1").with_role("Admin"));
///
/// let meta = adapter.extract_metadata();
/// assert_eq!(meta.request_id, "req-12345");
/// assert_eq!(meta.resource.unwrap().query_value("userId").as_deref(), Some("u2"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestAdapter {
    request_id: String,
    principal: Option<Principal>,
    resource: RequestResource,
}

impl RequestAdapter {
    /// Creates an adapter for `/` with no principal and no query.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            principal: None,
            resource: RequestResource::new("/"),
        }
    }

    /// Creates an adapter from a request target such as `/path?key=value`.
    pub fn from_uri(request_id: impl Into<String>, target: &str) -> Self {
        Self {
            request_id: request_id.into(),
            principal: None,
            resource: RequestResource::from_uri(target),
        }
    }

    /// Sets the authenticated principal, builder style.
    pub fn with_principal(mut self, principal: Principal) -> Self {
        self.principal = Some(principal);
        self
    }

    /// Sets or clears the authenticated principal.
    ///
    /// Called by the host after it has validated the session cookie.
    pub fn set_principal(&mut self, principal: Option<Principal>) {
        self.principal = principal;
    }

    /// Replaces the request path, keeping the query.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.resource.set_path(path);
    }

    /// Adds a query parameter.
    pub fn add_query_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.resource.push_query_param(key, value);
    }

    /// Returns the request ID.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the principal, if present.
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Returns the requested resource.
    pub fn resource(&self) -> &RequestResource {
        &self.resource
    }
}

impl ExtractMetadata for RequestAdapter {
    fn extract_metadata(&self) -> RequestMeta {
        RequestMeta {
            request_id: self.request_id.clone(),
            principal: self.principal.clone(),
            resource: Some(self.resource.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_adapter_new() {
        let adapter = RequestAdapter::new("req-test");
        assert_eq!(adapter.request_id(), "req-test");
        assert!(adapter.principal().is_none());
        assert_eq!(adapter.resource().path(), "/");
    }

    #[test]
    fn request_adapter_set_principal() {
        let mut adapter = RequestAdapter::new("req-1");
        adapter.set_principal(Some(Principal::new("user-1")));
        assert_eq!(adapter.principal().and_then(Principal::id), Some("user-1"));

        adapter.set_principal(None);
        assert!(adapter.principal().is_none());
    }

    #[test]
    fn request_adapter_add_query_param() {
        let mut adapter = RequestAdapter::new("req-1");
        adapter.add_query_param("userId", "u2");

        let meta = adapter.extract_metadata();
        let resource = meta.resource.expect("adapter always has a resource");
        assert_eq!(resource.query_value("userId").as_deref(), Some("u2"));
    }

    #[test]
    fn set_path_keeps_query() {
        let mut adapter = RequestAdapter::from_uri("req-1", "/old?userId=u2");
        adapter.set_path("/Administration/EditUser");

        assert_eq!(adapter.resource().path(), "/Administration/EditUser");
        assert_eq!(adapter.resource().query_value("userId").as_deref(), Some("u2"));
    }

    #[test]
    fn multiple_extractions_produce_independent_copies() {
        let adapter = RequestAdapter::from_uri("req-1", "/a?k=v")
            .with_principal(Principal::new("u1"));

        let first = adapter.extract_metadata();
        let second = adapter.extract_metadata();

        assert_eq!(first.request_id, second.request_id);
        assert_eq!(first.principal, second.principal);
    }
}
