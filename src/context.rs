use crate::request::{Principal, RequestResource};

/// The inputs of a single authorization decision.
///
/// A borrowed view over the caller, the requested resource and the request
/// id. Created per evaluation and dropped afterwards; nothing in it is
/// mutable.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    request_id: &'a str,
    principal: Option<&'a Principal>,
    resource: Option<&'a RequestResource>,
}

impl<'a> DecisionContext<'a> {
    /// Creates a decision context from borrowed request parts.
    pub fn new(
        request_id: &'a str,
        principal: Option<&'a Principal>,
        resource: Option<&'a RequestResource>,
    ) -> Self {
        Self {
            request_id,
            principal,
            resource,
        }
    }

    /// Returns the request id.
    pub fn request_id(&self) -> &'a str {
        self.request_id
    }

    /// Returns the caller, if authenticated.
    pub fn principal(&self) -> Option<&'a Principal> {
        self.principal
    }

    /// Returns the requested resource, if the host supplied one.
    pub fn resource(&self) -> Option<&'a RequestResource> {
        self.resource
    }

    /// Looks up a query value on the requested resource.
    pub fn query_value(&self, key: &str) -> Option<String> {
        self.resource.and_then(|r| r.query_value(key))
    }
}

/// Proof that every policy a request required granted access.
///
/// `Ctx` can only be produced by [`PolicyGate`](crate::PolicyGate); holding
/// one means the gate ran and nothing denied. The principal is absent only
/// for anonymous endpoints.
///
/// # Examples
///
/// ```
/// use admin_authz::{standard_registry, PolicyGate, Principal, RequestMeta, policies};
///
/// let registry = standard_registry().expect("valid registry");
///
/// let mut meta = RequestMeta::new("req-1");
/// meta.principal = Some(Principal::new("u1").with_role("User"));
///
/// let ctx = PolicyGate::new(meta)
///     .require(policies::ADMINISTRATION)
///     .build(&registry)
///     .expect("policy satisfied");
///
/// assert!(ctx.is_granted(policies::ADMINISTRATION));
/// ```
#[derive(Debug, Clone)]
pub struct Ctx {
    request_id: String,
    principal: Option<Principal>,
    granted: Vec<String>,
}

impl Ctx {
    /// Creates a context after the gate validated every policy.
    pub(crate) fn new_authorized(
        request_id: String,
        principal: Option<Principal>,
        granted: Vec<String>,
    ) -> Self {
        Self {
            request_id,
            principal,
            granted,
        }
    }

    /// Returns the request ID for this context.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Returns the principal if present.
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    /// Returns the names of the policies that granted access, in check order.
    pub fn granted_policies(&self) -> &[String] {
        &self.granted
    }

    /// Returns `true` if the named policy was checked and granted.
    pub fn is_granted(&self, policy: &str) -> bool {
        self.granted.iter().any(|g| g == policy)
    }
}
