//! The process-wide table of named policies.
//!
//! A [`PolicyRegistry`] is assembled once at startup with
//! [`PolicyRegistryBuilder`] and never changes afterwards. It is `Send + Sync`
//! and is meant to be shared behind an `Arc` or a `'static` reference.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use crate::context::DecisionContext;
use crate::error::RegistryError;
use crate::handler::AuthorizationHandler;
use crate::policy::{HandlerSource, Policy, Rule};
use crate::requirement::Requirement;

/// Outcome of evaluating a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The policy holds.
    Allow,
    /// The policy does not hold.
    Deny,
}

impl Decision {
    /// Returns `true` for [`Decision::Allow`].
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }
}

impl From<bool> for Decision {
    fn from(allowed: bool) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allow => write!(f, "allow"),
            Decision::Deny => write!(f, "deny"),
        }
    }
}

/// Immutable mapping from policy names to rule trees, plus the handlers
/// registered for each requirement.
pub struct PolicyRegistry {
    policies: HashMap<String, Policy>,
    handlers: BTreeMap<Requirement, Vec<Arc<dyn AuthorizationHandler>>>,
    fallback: Option<Policy>,
}

impl PolicyRegistry {
    /// Starts an empty builder.
    pub fn builder() -> PolicyRegistryBuilder {
        PolicyRegistryBuilder::default()
    }

    /// Returns the named policy.
    pub fn policy(&self, name: &str) -> Option<&Policy> {
        self.policies.get(name)
    }

    /// Returns the policy applied to every request that does not opt out.
    pub fn fallback_policy(&self) -> Option<&Policy> {
        self.fallback.as_ref()
    }

    /// Returns the registered policy names, sorted.
    pub fn policy_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.policies.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Evaluates the named policy.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownPolicy`] if no policy has that name.
    pub fn evaluate(
        &self,
        policy_name: &str,
        ctx: &DecisionContext<'_>,
    ) -> Result<Decision, RegistryError> {
        let policy = self
            .policy(policy_name)
            .ok_or_else(|| RegistryError::UnknownPolicy(policy_name.to_string()))?;
        Ok(self.evaluate_policy(policy, ctx))
    }

    /// Evaluates a policy against this registry's handlers.
    pub fn evaluate_policy(&self, policy: &Policy, ctx: &DecisionContext<'_>) -> Decision {
        let decision = Decision::from(policy.evaluate(ctx, self));

        tracing::debug!(
            request_id = %ctx.request_id(),
            principal = ?ctx.principal().and_then(|p| p.id()),
            policy = %policy.name(),
            decision = %decision,
            "policy evaluated"
        );

        decision
    }

    /// Evaluates a single rule against this registry's handlers.
    pub fn evaluate_rule(&self, rule: &Rule, ctx: &DecisionContext<'_>) -> bool {
        rule.evaluate(ctx, self)
    }
}

impl HandlerSource for PolicyRegistry {
    fn handlers_for(&self, requirement: Requirement) -> &[Arc<dyn AuthorizationHandler>] {
        self.handlers
            .get(&requirement)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl fmt::Debug for PolicyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyRegistry")
            .field("policies", &self.policy_names())
            .field("handlers", &self.handlers)
            .field("fallback", &self.fallback.as_ref().map(Policy::name))
            .finish()
    }
}

/// Collects policies and handlers before freezing them into a
/// [`PolicyRegistry`].
///
/// # Examples
///
/// ```
/// use admin_authz::{
///     DecisionContext, EditOtherAdminHandler, Policy, PolicyRegistry, Principal,
///     Requirement, SuperAdminHandler,
/// };
///
/// let registry = PolicyRegistry::builder()
///     .add_policy(
///         Policy::builder("EditRolePolicy")
///             .add_requirement(Requirement::ManageAdminRolesAndClaims)
///             .build(),
///     )
///     .add_handler(EditOtherAdminHandler)
///     .add_handler(SuperAdminHandler)
///     .build()
///     .expect("consistent registry");
///
/// let root = Principal::new("u9").with_role("Super Admin");
/// let ctx = DecisionContext::new("req-1", Some(&root), None);
/// assert!(registry.evaluate("EditRolePolicy", &ctx).unwrap().is_allowed());
/// ```
#[derive(Default)]
pub struct PolicyRegistryBuilder {
    policies: Vec<Policy>,
    handlers: Vec<Arc<dyn AuthorizationHandler>>,
    fallback: Option<Policy>,
}

impl PolicyRegistryBuilder {
    /// Adds a named policy.
    pub fn add_policy(mut self, policy: Policy) -> Self {
        self.policies.push(policy);
        self
    }

    /// Registers a handler for its requirement.
    pub fn add_handler<H>(self, handler: H) -> Self
    where
        H: AuthorizationHandler + 'static,
    {
        self.add_shared_handler(Arc::new(handler))
    }

    /// Registers an already shared handler.
    pub fn add_shared_handler(mut self, handler: Arc<dyn AuthorizationHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    /// Sets the policy applied to every request that does not opt out.
    pub fn fallback_policy(mut self, policy: Policy) -> Self {
        self.fallback = Some(policy);
        self
    }

    /// Freezes the registry.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::DuplicatePolicy`] if two policies share a name
    /// - [`RegistryError::EmptyPolicy`] if a policy has no requirements
    /// - [`RegistryError::UnhandledRequirement`] if a policy names a
    ///   requirement with no registered handler
    pub fn build(self) -> Result<PolicyRegistry, RegistryError> {
        let mut handlers: BTreeMap<Requirement, Vec<Arc<dyn AuthorizationHandler>>> =
            BTreeMap::new();
        for handler in self.handlers {
            handlers.entry(handler.requirement()).or_default().push(handler);
        }

        if let Some(fallback) = &self.fallback {
            check_policy(fallback, &handlers)?;
        }

        let mut policies = HashMap::with_capacity(self.policies.len());
        for policy in self.policies {
            check_policy(&policy, &handlers)?;
            if policies.contains_key(policy.name()) {
                return Err(RegistryError::DuplicatePolicy(policy.name().to_string()));
            }
            policies.insert(policy.name().to_string(), policy);
        }

        tracing::debug!(
            policies = policies.len(),
            requirements = handlers.len(),
            fallback = self.fallback.is_some(),
            "policy registry built"
        );

        Ok(PolicyRegistry {
            policies,
            handlers,
            fallback: self.fallback,
        })
    }
}

fn check_policy(
    policy: &Policy,
    handlers: &BTreeMap<Requirement, Vec<Arc<dyn AuthorizationHandler>>>,
) -> Result<(), RegistryError> {
    if policy.rule().is_unconditional() {
        return Err(RegistryError::EmptyPolicy {
            policy: policy.name().to_string(),
        });
    }

    match policy
        .rule()
        .requirements()
        .into_iter()
        .find(|r| !handlers.contains_key(r))
    {
        Some(requirement) => Err(RegistryError::UnhandledRequirement {
            policy: policy.name().to_string(),
            requirement,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::roles;
    use crate::handler::{EditOtherAdminHandler, SuperAdminHandler};
    use crate::request::Principal;

    fn edit_role_policy() -> Policy {
        Policy::builder("EditRolePolicy")
            .add_requirement(Requirement::ManageAdminRolesAndClaims)
            .build()
    }

    #[test]
    fn unknown_policy_is_an_error() {
        let registry = PolicyRegistry::builder().build().unwrap();
        let ctx = DecisionContext::new("req", None, None);
        assert_eq!(
            registry.evaluate("Nope", &ctx),
            Err(RegistryError::UnknownPolicy("Nope".to_string()))
        );
    }

    #[test]
    fn duplicate_policy_names_are_rejected() {
        let result = PolicyRegistry::builder()
            .add_policy(Policy::builder("A").require_authenticated_user().build())
            .add_policy(Policy::builder("A").require_role([roles::ADMIN]).build())
            .build();
        assert_eq!(
            result.unwrap_err(),
            RegistryError::DuplicatePolicy("A".to_string())
        );
    }

    #[test]
    fn policy_without_requirements_is_rejected() {
        let result = PolicyRegistry::builder()
            .add_policy(Policy::builder("Empty").build())
            .build();
        assert_eq!(
            result.unwrap_err(),
            RegistryError::EmptyPolicy {
                policy: "Empty".to_string()
            }
        );

        let result = PolicyRegistry::builder()
            .fallback_policy(Policy::new("Fallback", Rule::AllOf(vec![])))
            .build();
        assert!(matches!(result, Err(RegistryError::EmptyPolicy { .. })));
    }

    #[test]
    fn requirement_without_handler_is_rejected() {
        let result = PolicyRegistry::builder().add_policy(edit_role_policy()).build();
        assert!(matches!(
            result,
            Err(RegistryError::UnhandledRequirement { .. })
        ));
    }

    #[test]
    fn handlers_are_grouped_by_requirement() {
        let registry = PolicyRegistry::builder()
            .add_policy(edit_role_policy())
            .add_handler(EditOtherAdminHandler)
            .add_handler(SuperAdminHandler)
            .build()
            .unwrap();

        assert_eq!(
            registry
                .handlers_for(Requirement::ManageAdminRolesAndClaims)
                .len(),
            2
        );
    }

    #[test]
    fn fallback_is_kept_apart_from_named_policies() {
        let registry = PolicyRegistry::builder()
            .add_policy(Policy::builder("Named").require_role([roles::USER]).build())
            .fallback_policy(Policy::builder("Fallback").require_authenticated_user().build())
            .build()
            .unwrap();

        assert_eq!(registry.policy_names(), vec!["Named"]);
        assert_eq!(registry.fallback_policy().map(Policy::name), Some("Fallback"));
    }

    #[test]
    fn fallback_may_share_a_name_with_a_named_policy() {
        let registry = PolicyRegistry::builder()
            .add_policy(Policy::builder("Authenticated").require_authenticated_user().build())
            .fallback_policy(Policy::builder("Authenticated").require_authenticated_user().build())
            .build()
            .unwrap();

        assert_eq!(registry.policy_names(), vec!["Authenticated"]);
    }

    #[test]
    fn evaluate_policy_reports_decision() {
        let registry = PolicyRegistry::builder()
            .add_policy(edit_role_policy())
            .add_handler(SuperAdminHandler)
            .build()
            .unwrap();

        let root = Principal::new("u9").with_role(roles::SUPER_ADMIN);
        let user = Principal::new("u1").with_role(roles::USER);

        let ctx = DecisionContext::new("req", Some(&root), None);
        assert_eq!(registry.evaluate("EditRolePolicy", &ctx), Ok(Decision::Allow));

        let ctx = DecisionContext::new("req", Some(&user), None);
        assert_eq!(registry.evaluate("EditRolePolicy", &ctx), Ok(Decision::Deny));
    }
}
