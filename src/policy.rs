//! Policy combinators.
//!
//! A [`Policy`] is a named [`Rule`] tree. Two composition primitives are
//! explicit:
//!
//! - [`Rule::AllOf`]: every child must hold (the requirements listed on one
//!   policy are combined this way)
//! - [`Rule::AnyOf`]: at least one child must hold
//!
//! A [`Rule::Requirement`] is itself an OR: it holds when any handler
//! registered for the requirement succeeds.

use std::fmt;
use std::sync::Arc;

use crate::claims::TRUE;
use crate::context::DecisionContext;
use crate::handler::{any_handler_succeeds, AuthorizationHandler};
use crate::requirement::Requirement;

/// Supplies the handlers registered for a requirement.
pub trait HandlerSource {
    /// Returns the handlers for `requirement`, possibly none.
    fn handlers_for(&self, requirement: Requirement) -> &[Arc<dyn AuthorizationHandler>];
}

/// A handler source with no handlers; every requirement is unmet.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHandlers;

impl HandlerSource for NoHandlers {
    fn handlers_for(&self, _requirement: Requirement) -> &[Arc<dyn AuthorizationHandler>] {
        &[]
    }
}

type CheckFn = dyn Fn(&DecisionContext<'_>) -> bool + Send + Sync;

/// A named inline predicate over the decision context.
#[derive(Clone)]
pub struct Assertion {
    name: &'static str,
    check: Arc<CheckFn>,
}

impl Assertion {
    /// Wraps a predicate under a name used for logging and deduplication.
    pub fn new<F>(name: &'static str, check: F) -> Self
    where
        F: Fn(&DecisionContext<'_>) -> bool + Send + Sync + 'static,
    {
        Self {
            name,
            check: Arc::new(check),
        }
    }

    /// Returns the assertion name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Runs the predicate.
    pub fn check(&self, ctx: &DecisionContext<'_>) -> bool {
        (self.check)(ctx)
    }
}

impl fmt::Debug for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Assertion").field(&self.name).finish()
    }
}

/// A node of a policy's decision tree.
#[derive(Debug, Clone)]
pub enum Rule {
    /// A principal is present.
    Authenticated,
    /// The principal holds at least one of these roles.
    AnyRole(Vec<String>),
    /// The principal holds a claim of this type whose value is one of
    /// `allowed`. An empty `allowed` list accepts any value.
    Claim {
        /// Claim type to look for
        claim_type: String,
        /// Accepted values, compared exactly
        allowed: Vec<String>,
    },
    /// Any handler registered for the requirement succeeds.
    Requirement(Requirement),
    /// Custom predicate.
    Assertion(Assertion),
    /// Every child rule holds. Empty is satisfied.
    AllOf(Vec<Rule>),
    /// At least one child rule holds. Empty is not satisfied.
    AnyOf(Vec<Rule>),
}

impl Rule {
    /// Rule requiring a single role.
    pub fn role(role: impl Into<String>) -> Self {
        Rule::AnyRole(vec![role.into()])
    }

    /// Rule requiring any of several roles.
    pub fn any_role<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Rule::AnyRole(roles.into_iter().map(Into::into).collect())
    }

    /// Rule requiring a claim with one of the given values.
    pub fn claim<I, V>(claim_type: impl Into<String>, allowed: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Rule::Claim {
            claim_type: claim_type.into(),
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// Rule requiring a boolean claim set to `"True"`.
    pub fn flag(claim_type: impl Into<String>) -> Self {
        Rule::claim(claim_type, [TRUE])
    }

    /// Evaluates the rule for one request.
    ///
    /// Rules that inspect the principal are unmet when there is none.
    pub fn evaluate<H>(&self, ctx: &DecisionContext<'_>, handlers: &H) -> bool
    where
        H: HandlerSource + ?Sized,
    {
        match self {
            Rule::Authenticated => ctx.principal().is_some(),
            Rule::AnyRole(roles) => ctx
                .principal()
                .is_some_and(|p| roles.iter().any(|r| p.is_in_role(r))),
            Rule::Claim {
                claim_type,
                allowed,
            } => ctx.principal().is_some_and(|p| {
                p.claims().iter().any(|c| {
                    c.claim_type() == claim_type
                        && (allowed.is_empty() || allowed.iter().any(|v| v == c.value()))
                })
            }),
            Rule::Requirement(requirement) => {
                any_handler_succeeds(handlers.handlers_for(*requirement), ctx)
            }
            Rule::Assertion(assertion) => assertion.check(ctx),
            Rule::AllOf(rules) => rules.iter().all(|r| r.evaluate(ctx, handlers)),
            Rule::AnyOf(rules) => rules.iter().any(|r| r.evaluate(ctx, handlers)),
        }
    }

    /// Collects every requirement referenced anywhere in the tree.
    pub fn requirements(&self) -> Vec<Requirement> {
        let mut found = Vec::new();
        self.collect_requirements(&mut found);
        found
    }

    /// Returns `true` if the tree states no condition at all.
    ///
    /// Such a rule is an `AllOf` with nothing (or only empty `AllOf`s)
    /// inside, so it holds for every request.
    pub fn is_unconditional(&self) -> bool {
        match self {
            Rule::AllOf(rules) => rules.iter().all(Rule::is_unconditional),
            _ => false,
        }
    }

    fn collect_requirements(&self, found: &mut Vec<Requirement>) {
        match self {
            Rule::Requirement(r) => {
                if !found.contains(r) {
                    found.push(*r);
                }
            }
            Rule::AllOf(rules) | Rule::AnyOf(rules) => {
                for rule in rules {
                    rule.collect_requirements(found);
                }
            }
            _ => {}
        }
    }

    /// Structural equality used to drop repeated requirements.
    ///
    /// Assertions are equal when they share a name.
    fn same_as(&self, other: &Rule) -> bool {
        match (self, other) {
            (Rule::Authenticated, Rule::Authenticated) => true,
            (Rule::AnyRole(a), Rule::AnyRole(b)) => a == b,
            (
                Rule::Claim {
                    claim_type: t1,
                    allowed: a1,
                },
                Rule::Claim {
                    claim_type: t2,
                    allowed: a2,
                },
            ) => t1 == t2 && a1 == a2,
            (Rule::Requirement(a), Rule::Requirement(b)) => a == b,
            (Rule::Assertion(a), Rule::Assertion(b)) => a.name() == b.name(),
            (Rule::AllOf(a), Rule::AllOf(b)) | (Rule::AnyOf(a), Rule::AnyOf(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_as(y))
            }
            _ => false,
        }
    }
}

/// A named authorization rule.
#[derive(Debug, Clone)]
pub struct Policy {
    name: String,
    rule: Rule,
}

impl Policy {
    /// Creates a policy from a complete rule tree.
    pub fn new(name: impl Into<String>, rule: Rule) -> Self {
        Self {
            name: name.into(),
            rule,
        }
    }

    /// Starts a builder for a policy called `name`.
    pub fn builder(name: impl Into<String>) -> PolicyBuilder {
        PolicyBuilder::new(name)
    }

    /// Returns the policy name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the policy's rule tree.
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// Evaluates the policy for one request.
    pub fn evaluate<H>(&self, ctx: &DecisionContext<'_>, handlers: &H) -> bool
    where
        H: HandlerSource + ?Sized,
    {
        self.rule.evaluate(ctx, handlers)
    }
}

/// Fluent builder for a [`Policy`].
///
/// Every `require_*` call adds one requirement; all of them must hold.
///
/// # Examples
///
/// ```
/// use admin_authz::{Claim, DecisionContext, NoHandlers, Policy, Principal};
///
/// let policy = Policy::builder("DeleteRolePolicy")
///     .require_flag("Delete Role")
///     .require_flag("Create Role")
///     .build();
///
/// let both = Principal::new("u1")
///     .with_claim(Claim::flag("Delete Role", true))
///     .with_claim(Claim::flag("Create Role", true));
/// let one = Principal::new("u2").with_claim(Claim::flag("Delete Role", true));
///
/// assert!(policy.evaluate(&DecisionContext::new("r", Some(&both), None), &NoHandlers));
/// assert!(!policy.evaluate(&DecisionContext::new("r", Some(&one), None), &NoHandlers));
/// ```
#[derive(Debug)]
pub struct PolicyBuilder {
    name: String,
    requirements: Vec<Rule>,
}

impl PolicyBuilder {
    /// Creates an empty builder.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            requirements: Vec::new(),
        }
    }

    /// Adds a rule, skipping it if an identical one is already present.
    pub fn require(mut self, rule: Rule) -> Self {
        if !self.requirements.iter().any(|r| r.same_as(&rule)) {
            self.requirements.push(rule);
        }
        self
    }

    /// Requires an authenticated principal.
    pub fn require_authenticated_user(self) -> Self {
        self.require(Rule::Authenticated)
    }

    /// Requires membership in at least one of `roles`.
    pub fn require_role<I, R>(self, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        self.require(Rule::any_role(roles))
    }

    /// Requires a claim of `claim_type` with one of `allowed` values.
    pub fn require_claim<I, V>(self, claim_type: impl Into<String>, allowed: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.require(Rule::claim(claim_type, allowed))
    }

    /// Requires a boolean claim set to `"True"`.
    pub fn require_flag(self, claim_type: impl Into<String>) -> Self {
        self.require(Rule::flag(claim_type))
    }

    /// Requires a custom predicate to hold.
    pub fn require_assertion<F>(self, name: &'static str, check: F) -> Self
    where
        F: Fn(&DecisionContext<'_>) -> bool + Send + Sync + 'static,
    {
        self.require(Rule::Assertion(Assertion::new(name, check)))
    }

    /// Requires a handler-backed requirement.
    pub fn add_requirement(self, requirement: Requirement) -> Self {
        self.require(Rule::Requirement(requirement))
    }

    /// Finishes the policy. A single requirement is used as is; several are
    /// wrapped in [`Rule::AllOf`].
    pub fn build(mut self) -> Policy {
        let rule = if self.requirements.len() == 1 {
            self.requirements.remove(0)
        } else {
            Rule::AllOf(self.requirements)
        };
        Policy::new(self.name, rule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::{claim_types, roles, Claim};
    use crate::request::Principal;

    fn eval(rule: &Rule, principal: Option<&Principal>) -> bool {
        rule.evaluate(&DecisionContext::new("req", principal, None), &NoHandlers)
    }

    #[test]
    fn empty_combinators() {
        assert!(eval(&Rule::AllOf(vec![]), None));
        assert!(!eval(&Rule::AnyOf(vec![]), None));
    }

    #[test]
    fn builder_without_requirements_is_unconditional() {
        let policy = Policy::builder("Empty").build();
        assert!(policy.rule().is_unconditional());
        assert!(Rule::AllOf(vec![Rule::AllOf(vec![])]).is_unconditional());

        assert!(!Rule::AnyOf(vec![]).is_unconditional());
        let auth = Policy::builder("Auth").require_authenticated_user().build();
        assert!(!auth.rule().is_unconditional());
    }

    #[test]
    fn all_of_is_and() {
        let rule = Rule::AllOf(vec![Rule::role(roles::ADMIN), Rule::flag(claim_types::EDIT_ROLE)]);
        let admin = Principal::new("u1").with_role(roles::ADMIN);
        let admin_with_claim = admin.clone().with_claim(Claim::flag(claim_types::EDIT_ROLE, true));

        assert!(!eval(&rule, Some(&admin)));
        assert!(eval(&rule, Some(&admin_with_claim)));
    }

    #[test]
    fn any_of_is_or() {
        let rule = Rule::AnyOf(vec![Rule::role(roles::ADMIN), Rule::role(roles::SUPER_ADMIN)]);
        assert!(eval(&rule, Some(&Principal::new("a").with_role(roles::SUPER_ADMIN))));
        assert!(!eval(&rule, Some(&Principal::new("b").with_role(roles::USER))));
    }

    #[test]
    fn claim_rule_matches_exact_values() {
        let rule = Rule::claim(claim_types::EDIT, ["Read", "Write"]);
        let read = Principal::new("a").with_claim(Claim::new(claim_types::EDIT, "Read"));
        let lower = Principal::new("b").with_claim(Claim::new(claim_types::EDIT, "read"));
        assert!(eval(&rule, Some(&read)));
        assert!(!eval(&rule, Some(&lower)));
    }

    #[test]
    fn claim_rule_without_values_accepts_any_value() {
        let rule = Rule::claim(claim_types::EDIT, Vec::<String>::new());
        let p = Principal::new("a").with_claim(Claim::new(claim_types::EDIT, "anything"));
        assert!(eval(&rule, Some(&p)));
        assert!(!eval(&rule, Some(&Principal::new("b"))));
    }

    #[test]
    fn principal_rules_fail_for_anonymous() {
        assert!(!eval(&Rule::Authenticated, None));
        assert!(!eval(&Rule::role(roles::USER), None));
        assert!(!eval(&Rule::flag(claim_types::EDIT_ROLE), None));
    }

    #[test]
    fn requirement_without_handlers_is_unmet() {
        let rule = Rule::Requirement(Requirement::ManageAdminRolesAndClaims);
        let p = Principal::new("u9").with_role(roles::SUPER_ADMIN);
        assert!(!eval(&rule, Some(&p)));
    }

    #[test]
    fn assertion_sees_context() {
        let rule = Rule::Assertion(Assertion::new("request-1-only", |ctx| {
            ctx.request_id() == "req-1"
        }));
        assert!(rule.evaluate(&DecisionContext::new("req-1", None, None), &NoHandlers));
        assert!(!rule.evaluate(&DecisionContext::new("req-2", None, None), &NoHandlers));
    }

    #[test]
    fn builder_deduplicates_identical_requirements() {
        let policy = Policy::builder("p")
            .require_authenticated_user()
            .require_authenticated_user()
            .require_flag(claim_types::DELETE_ROLE)
            .require_flag(claim_types::DELETE_ROLE)
            .build();

        match policy.rule() {
            Rule::AllOf(rules) => assert_eq!(rules.len(), 2),
            other => panic!("expected AllOf, got {other:?}"),
        }
    }

    #[test]
    fn builder_with_single_requirement_is_unwrapped() {
        let policy = Policy::builder("p").require_role([roles::ADMIN]).build();
        assert!(matches!(policy.rule(), Rule::AnyRole(_)));
    }

    #[test]
    fn requirements_are_collected_once() {
        let rule = Rule::AnyOf(vec![
            Rule::Requirement(Requirement::ManageAdminRolesAndClaims),
            Rule::AllOf(vec![Rule::Requirement(Requirement::ManageAdminRolesAndClaims)]),
        ]);
        assert_eq!(rule.requirements(), vec![Requirement::ManageAdminRolesAndClaims]);
    }
}
