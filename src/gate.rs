use crate::audit::{self, AuditEvent, AuditOutcome, AuditTrail};
use crate::context::Ctx;
use crate::error::{Violation, ViolationKind};
use crate::policy::Policy;
use crate::registry::PolicyRegistry;
use crate::request::RequestMeta;

/// The policy enforcement gate.
///
/// `PolicyGate` is the only way to obtain a `Ctx`. It checks the
/// registry's fallback policy (unless the endpoint allows anonymous access)
/// and then every named policy, in the order they were required. The first
/// policy that denies access decides the violation.
///
/// # Examples
///
/// ```
/// use admin_authz::{
///     policies, standard_registry, Claim, PolicyGate, Principal, RequestMeta, RequestResource,
/// };
///
/// let registry = standard_registry().unwrap();
///
/// let mut meta = RequestMeta::new("req-123");
/// meta.principal = Some(
///     Principal::new("u1")
///         .with_role("Admin")
///         .with_claim(Claim::flag("Edit Role", true)),
/// );
/// meta.resource = Some(RequestResource::from_uri("/Administration/ManageUserRoles?userId=u2"));
///
/// let ctx = PolicyGate::new(meta)
///     .require(policies::EDIT_ROLE)
///     .build(&registry)
///     .expect("admin may edit another admin");
///
/// assert!(ctx.is_granted(policies::EDIT_ROLE));
/// ```
pub struct PolicyGate<'a> {
    meta: RequestMeta,
    policies: Vec<String>,
    allow_anonymous: bool,
    trail: Option<&'a AuditTrail>,
}

impl<'a> PolicyGate<'a> {
    /// Creates a new policy gate with the given request metadata.
    pub fn new(meta: RequestMeta) -> Self {
        Self {
            meta,
            policies: Vec::new(),
            allow_anonymous: false,
            trail: None,
        }
    }

    /// Adds a named policy to the gate, deduplicating repeated names.
    pub fn require(mut self, policy: impl Into<String>) -> Self {
        let policy = policy.into();
        if !self.policies.contains(&policy) {
            self.policies.push(policy);
        }
        self
    }

    /// Skips the registry's fallback policy for this request.
    pub fn allow_anonymous(mut self) -> Self {
        self.allow_anonymous = true;
        self
    }

    /// Records one audit event per checked policy into `trail`.
    pub fn audit(mut self, trail: &'a AuditTrail) -> Self {
        self.trail = Some(trail);
        self
    }

    /// Checks every policy and builds an authorized context.
    ///
    /// # Errors
    ///
    /// - [`ViolationKind::UnknownPolicy`] if a required name is not registered
    ///   (reported before anything is evaluated)
    /// - [`ViolationKind::Unauthenticated`] if a policy denies and there is no
    ///   principal
    /// - [`ViolationKind::Forbidden`] if a policy denies an authenticated
    ///   principal
    pub fn build(self, registry: &PolicyRegistry) -> Result<Ctx, Violation> {
        let checks = self.resolve(registry)?;
        let ctx = self.meta.decision_context();

        let mut granted = Vec::with_capacity(checks.len());
        for policy in checks {
            let decision = registry.evaluate_policy(policy, &ctx);
            self.record(policy, decision.is_allowed());

            if !decision.is_allowed() {
                tracing::info!(
                    request_id = %self.meta.request_id,
                    policy = %policy.name(),
                    authenticated = ctx.principal().is_some(),
                    "access denied"
                );
                return Err(self.denial(policy));
            }
            granted.push(policy.name().to_string());
        }

        Ok(Ctx::new_authorized(
            self.meta.request_id,
            self.meta.principal,
            granted,
        ))
    }

    /// Looks up every policy to check, fallback first.
    fn resolve<'r>(&self, registry: &'r PolicyRegistry) -> Result<Vec<&'r Policy>, Violation> {
        let mut checks = Vec::with_capacity(self.policies.len() + 1);

        if !self.allow_anonymous {
            if let Some(fallback) = registry.fallback_policy() {
                checks.push(fallback);
            }
        }

        for name in &self.policies {
            let policy = registry.policy(name).ok_or_else(|| {
                tracing::error!(
                    request_id = %self.meta.request_id,
                    policy = %name,
                    "required policy is not registered"
                );
                Violation::new(
                    ViolationKind::UnknownPolicy {
                        policy: name.clone(),
                    },
                    "Policy is not registered",
                )
            })?;
            checks.push(policy);
        }

        Ok(checks)
    }

    fn denial(&self, policy: &Policy) -> Violation {
        if self.meta.principal.is_none() {
            Violation::new(
                ViolationKind::Unauthenticated,
                format!("Authentication required by '{}'", policy.name()),
            )
        } else {
            Violation::new(
                ViolationKind::Forbidden {
                    policy: policy.name().to_string(),
                },
                "Principal does not satisfy the policy",
            )
        }
    }

    fn record(&self, policy: &Policy, granted: bool) {
        let Some(trail) = self.trail else {
            return;
        };

        let mut event = AuditEvent::new(
            self.meta.request_id.as_str(),
            self.meta.principal.as_ref().and_then(|p| p.id()),
            policy.name(),
            AuditOutcome::from(granted),
        );
        if let Some(resource) = &self.meta.resource {
            event = event.with_path(resource.path());
        }

        audit::emit(&event);
        trail.record(event);
    }
}
