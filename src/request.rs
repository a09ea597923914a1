use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::claims::{Claim, TRUE};
use crate::context::DecisionContext;

/// Metadata about an incoming request.
///
/// Contains the request identifier, the principal resolved by the
/// authentication layer (if any) and the requested resource.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    /// Unique identifier for this request
    pub request_id: String,
    /// Authenticated principal, if any
    pub principal: Option<Principal>,
    /// Path and query of the request, if the host provided them
    pub resource: Option<RequestResource>,
}

impl RequestMeta {
    /// Creates metadata with no principal and no resource.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            principal: None,
            resource: None,
        }
    }

    /// Borrows this request as a decision context.
    pub fn decision_context(&self) -> DecisionContext<'_> {
        DecisionContext::new(
            &self.request_id,
            self.principal.as_ref(),
            self.resource.as_ref(),
        )
    }
}

/// An authenticated caller.
///
/// Built once by the authentication layer and never mutated during a request.
/// The identifier is optional: a session that lost its name-identifier claim
/// still yields a principal, and identifier-dependent checks abstain for it.
///
/// # Examples
///
/// ```
/// use admin_authz::{Claim, Principal, claims::{claim_types, roles}};
///
/// let admin = Principal::new("u1")
///     .with_role(roles::ADMIN)
///     .with_claim(Claim::flag(claim_types::EDIT_ROLE, true));
///
/// assert!(admin.is_in_role("Admin"));
/// assert!(!admin.is_in_role("admin"));
/// assert!(admin.has_flag(claim_types::EDIT_ROLE));
/// assert!(admin.find_claim(claim_types::DELETE_ROLE).is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    roles: BTreeSet<String>,
    #[serde(default)]
    claims: Vec<Claim>,
}

impl Principal {
    /// Creates a principal with the given unique identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Creates a principal whose session carries no identifier.
    pub fn without_identifier() -> Self {
        Self::default()
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds a role membership.
    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into());
        self
    }

    /// Adds several role memberships.
    pub fn with_roles<I, R>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        self.roles.extend(roles.into_iter().map(Into::into));
        self
    }

    /// Adds a claim.
    pub fn with_claim(mut self, claim: Claim) -> Self {
        self.claims.push(claim);
        self
    }

    /// Returns the unique identifier, if the session carried one.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Returns the display name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the role memberships.
    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    /// Returns all claims in insertion order.
    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    /// Returns `true` if the principal is a member of `role` (exact match).
    pub fn is_in_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    /// Returns the first claim of the given type.
    ///
    /// A missing claim is `None`, never a fault.
    pub fn find_claim(&self, claim_type: &str) -> Option<&Claim> {
        self.claims.iter().find(|c| c.claim_type() == claim_type)
    }

    /// Returns `true` if any claim matches both type and value exactly.
    pub fn has_claim(&self, claim_type: &str, value: &str) -> bool {
        self.claims
            .iter()
            .any(|c| c.claim_type() == claim_type && c.value() == value)
    }

    /// Returns `true` if the principal holds `claim_type` with the value `"True"`.
    pub fn has_flag(&self, claim_type: &str) -> bool {
        self.has_claim(claim_type, TRUE)
    }
}

/// The requested path and its query parameters.
///
/// Query keys are matched case-insensitively; repeated keys yield their
/// values joined with `,`.
///
/// # Examples
///
/// ```
/// use admin_authz::RequestResource;
///
/// let resource = RequestResource::from_uri("/Administration/EditUser?UserId=a%20b");
/// assert_eq!(resource.path(), "/Administration/EditUser");
/// assert_eq!(resource.query_value("userId").as_deref(), Some("a b"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestResource {
    path: String,
    query: Vec<(String, String)>,
}

impl RequestResource {
    /// Creates a resource for `path` with no query parameters.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    /// Parses a request target such as `/path?key=value`.
    ///
    /// Query values are percent-decoded. A target without `?` has no query.
    pub fn from_uri(target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (target, ""),
        };

        Self {
            path: path.to_string(),
            query: url::form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        }
    }

    /// Appends a query parameter.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push_query_param(key, value);
        self
    }

    /// Appends a query parameter in place.
    pub fn push_query_param(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.push((key.into(), value.into()));
    }

    /// Replaces the path, keeping the query.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    /// Returns the request path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the raw query parameters in arrival order.
    pub fn query_params(&self) -> &[(String, String)] {
        &self.query
    }

    /// Looks up a query value by key, ignoring ASCII case.
    pub fn query_value(&self, key: &str) -> Option<String> {
        let values: Vec<&str> = self
            .query
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
            .collect();

        if values.is_empty() {
            None
        } else {
            Some(values.join(","))
        }
    }

    /// Returns the path and query re-encoded as a request target.
    pub fn to_uri(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }

        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{}?{}", self.path, query)
    }
}
