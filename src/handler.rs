//! Requirement handlers.
//!
//! A handler inspects one decision context and either succeeds or abstains.
//! It never denies: when several handlers are registered for the same
//! [`Requirement`], the requirement is met as soon as any one succeeds.
//!
//! Handlers hold no state and perform no I/O, so a single instance is shared
//! across every concurrent request.

use std::fmt;

use crate::claims::{claim_types, roles};
use crate::context::DecisionContext;
use crate::request::Principal;
use crate::requirement::Requirement;

/// Query key naming the account being edited.
pub const TARGET_USER_QUERY_KEY: &str = "userId";

/// Result of a single handler evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// The handler vouches for the requirement.
    Succeed,
    /// The handler has no opinion; other handlers may still succeed.
    Abstain,
}

impl HandlerOutcome {
    /// Returns `true` for [`HandlerOutcome::Succeed`].
    pub fn is_success(self) -> bool {
        matches!(self, HandlerOutcome::Succeed)
    }
}

impl From<bool> for HandlerOutcome {
    fn from(succeeded: bool) -> Self {
        if succeeded {
            HandlerOutcome::Succeed
        } else {
            HandlerOutcome::Abstain
        }
    }
}

impl fmt::Display for HandlerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerOutcome::Succeed => write!(f, "succeed"),
            HandlerOutcome::Abstain => write!(f, "abstain"),
        }
    }
}

/// An evaluator attached to one requirement.
pub trait AuthorizationHandler: Send + Sync + fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// The requirement this handler can satisfy.
    fn requirement(&self) -> Requirement;

    /// Evaluates the handler for one request.
    fn handle(&self, ctx: &DecisionContext<'_>) -> HandlerOutcome;
}

/// Returns `true` if any handler succeeds.
///
/// This is the OR across handlers sharing a requirement. An empty handler
/// list never succeeds.
pub fn any_handler_succeeds<H>(handlers: &[H], ctx: &DecisionContext<'_>) -> bool
where
    H: AsRef<dyn AuthorizationHandler>,
{
    handlers.iter().any(|h| h.as_ref().handle(ctx).is_success())
}

/// Lets an admin with the `Edit Role` claim edit any account but their own.
///
/// # Examples
///
/// ```
/// use admin_authz::{Claim, EditOtherAdminHandler, HandlerOutcome, Principal};
///
/// let admin = Principal::new("u1")
///     .with_role("Admin")
///     .with_claim(Claim::flag("Edit Role", true));
///
/// let handler = EditOtherAdminHandler;
/// assert_eq!(handler.evaluate(&admin, Some("u2")), HandlerOutcome::Succeed);
/// assert_eq!(handler.evaluate(&admin, Some("U1")), HandlerOutcome::Abstain);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct EditOtherAdminHandler;

impl EditOtherAdminHandler {
    /// Evaluates the handler against a caller and the targeted account id.
    ///
    /// An absent target compares as the empty string. A caller without an
    /// identifier abstains.
    pub fn evaluate(&self, principal: &Principal, target_user_id: Option<&str>) -> HandlerOutcome {
        let Some(caller_id) = principal.id() else {
            return HandlerOutcome::Abstain;
        };
        let target = target_user_id.unwrap_or_default();

        let allowed = principal.is_in_role(roles::ADMIN)
            && principal.has_flag(claim_types::EDIT_ROLE)
            && target.to_lowercase() != caller_id.to_lowercase();

        allowed.into()
    }
}

impl AuthorizationHandler for EditOtherAdminHandler {
    fn name(&self) -> &'static str {
        "EditOtherAdminHandler"
    }

    fn requirement(&self) -> Requirement {
        Requirement::ManageAdminRolesAndClaims
    }

    fn handle(&self, ctx: &DecisionContext<'_>) -> HandlerOutcome {
        // Without the request there is no target to compare against.
        let (Some(principal), Some(_)) = (ctx.principal(), ctx.resource()) else {
            return HandlerOutcome::Abstain;
        };

        let target = ctx.query_value(TARGET_USER_QUERY_KEY);
        self.evaluate(principal, target.as_deref())
    }
}

/// Lets a super admin edit any account, including their own.
#[derive(Debug, Clone, Copy, Default)]
pub struct SuperAdminHandler;

impl SuperAdminHandler {
    /// Succeeds iff the caller holds the `Super Admin` role.
    pub fn evaluate(&self, principal: &Principal) -> HandlerOutcome {
        principal.is_in_role(roles::SUPER_ADMIN).into()
    }
}

impl AuthorizationHandler for SuperAdminHandler {
    fn name(&self) -> &'static str {
        "SuperAdminHandler"
    }

    fn requirement(&self) -> Requirement {
        Requirement::ManageAdminRolesAndClaims
    }

    fn handle(&self, ctx: &DecisionContext<'_>) -> HandlerOutcome {
        match ctx.principal() {
            Some(principal) => self.evaluate(principal),
            None => HandlerOutcome::Abstain,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::claims::Claim;
    use crate::request::RequestResource;

    fn editing_admin(id: &str) -> Principal {
        Principal::new(id)
            .with_role(roles::ADMIN)
            .with_claim(Claim::flag(claim_types::EDIT_ROLE, true))
    }

    fn edit_target(user_id: &str) -> RequestResource {
        RequestResource::new("/Administration/ManageUserRoles")
            .with_query_param(TARGET_USER_QUERY_KEY, user_id)
    }

    #[test]
    fn admin_with_claim_edits_other_account() {
        let p = editing_admin("u1");
        assert_eq!(EditOtherAdminHandler.evaluate(&p, Some("u2")), HandlerOutcome::Succeed);
    }

    #[test]
    fn admin_cannot_edit_self_in_any_case() {
        let p = editing_admin("AbC");
        for target in ["AbC", "abc", "ABC", "aBc"] {
            assert_eq!(
                EditOtherAdminHandler.evaluate(&p, Some(target)),
                HandlerOutcome::Abstain,
                "target {target}"
            );
        }
    }

    #[test]
    fn false_edit_role_claim_abstains() {
        let p = Principal::new("u1")
            .with_role(roles::ADMIN)
            .with_claim(Claim::flag(claim_types::EDIT_ROLE, false));
        assert_eq!(EditOtherAdminHandler.evaluate(&p, Some("u2")), HandlerOutcome::Abstain);
    }

    #[test]
    fn lowercase_true_is_not_true() {
        let p = Principal::new("u1")
            .with_role(roles::ADMIN)
            .with_claim(Claim::new(claim_types::EDIT_ROLE, "true"));
        assert_eq!(EditOtherAdminHandler.evaluate(&p, Some("u2")), HandlerOutcome::Abstain);
    }

    #[test]
    fn non_admin_never_succeeds() {
        let p = Principal::new("u1")
            .with_role(roles::USER)
            .with_role(roles::SUPER_ADMIN)
            .with_claim(Claim::flag(claim_types::EDIT_ROLE, true));
        assert_eq!(EditOtherAdminHandler.evaluate(&p, Some("u2")), HandlerOutcome::Abstain);
    }

    #[test]
    fn absent_target_compares_as_empty_string() {
        let p = editing_admin("u1");
        assert_eq!(EditOtherAdminHandler.evaluate(&p, None), HandlerOutcome::Succeed);
        assert_eq!(EditOtherAdminHandler.evaluate(&p, Some("")), HandlerOutcome::Succeed);
    }

    #[test]
    fn caller_without_identifier_abstains() {
        let p = Principal::without_identifier()
            .with_role(roles::ADMIN)
            .with_claim(Claim::flag(claim_types::EDIT_ROLE, true));
        assert_eq!(EditOtherAdminHandler.evaluate(&p, Some("u2")), HandlerOutcome::Abstain);
    }

    #[test]
    fn handle_reads_user_id_from_query() {
        let p = editing_admin("u1");
        let other = edit_target("u2");
        let own = edit_target("U1");

        let ctx = DecisionContext::new("req", Some(&p), Some(&other));
        assert_eq!(EditOtherAdminHandler.handle(&ctx), HandlerOutcome::Succeed);

        let ctx = DecisionContext::new("req", Some(&p), Some(&own));
        assert_eq!(EditOtherAdminHandler.handle(&ctx), HandlerOutcome::Abstain);
    }

    #[test]
    fn handle_matches_query_key_in_any_case() {
        let p = editing_admin("u1");
        let own = RequestResource::new("/Administration/ManageUserRoles")
            .with_query_param("USERID", "u1");

        let ctx = DecisionContext::new("req", Some(&p), Some(&own));
        assert_eq!(EditOtherAdminHandler.handle(&ctx), HandlerOutcome::Abstain);
    }

    #[test]
    fn handle_without_resource_abstains() {
        let p = editing_admin("u1");
        let ctx = DecisionContext::new("req", Some(&p), None);
        assert_eq!(EditOtherAdminHandler.handle(&ctx), HandlerOutcome::Abstain);
    }

    #[test]
    fn handle_without_query_key_uses_empty_target() {
        let p = editing_admin("u1");
        let resource = RequestResource::new("/Administration/ManageUserRoles");
        let ctx = DecisionContext::new("req", Some(&p), Some(&resource));
        assert_eq!(EditOtherAdminHandler.handle(&ctx), HandlerOutcome::Succeed);
    }

    #[test]
    fn super_admin_succeeds_for_any_target() {
        let p = Principal::new("u9").with_role(roles::SUPER_ADMIN);
        let own = edit_target("u9");
        let ctx = DecisionContext::new("req", Some(&p), Some(&own));
        assert_eq!(SuperAdminHandler.handle(&ctx), HandlerOutcome::Succeed);

        let ctx = DecisionContext::new("req", Some(&p), None);
        assert_eq!(SuperAdminHandler.handle(&ctx), HandlerOutcome::Succeed);
    }

    #[test]
    fn handlers_abstain_for_anonymous() {
        let resource = edit_target("u2");
        let ctx = DecisionContext::new("req", None, Some(&resource));
        assert_eq!(SuperAdminHandler.handle(&ctx), HandlerOutcome::Abstain);
        assert_eq!(EditOtherAdminHandler.handle(&ctx), HandlerOutcome::Abstain);
    }

    #[test]
    fn any_handler_succeeds_is_or() {
        let handlers: Vec<Arc<dyn AuthorizationHandler>> =
            vec![Arc::new(EditOtherAdminHandler), Arc::new(SuperAdminHandler)];
        let target = edit_target("u9");

        let super_admin = Principal::new("u9").with_role(roles::SUPER_ADMIN);
        let ctx = DecisionContext::new("req", Some(&super_admin), Some(&target));
        assert!(any_handler_succeeds(&handlers, &ctx));

        let plain = Principal::new("u1").with_role(roles::USER);
        let ctx = DecisionContext::new("req", Some(&plain), Some(&target));
        assert!(!any_handler_succeeds(&handlers, &ctx));

        let none: Vec<Arc<dyn AuthorizationHandler>> = Vec::new();
        let ctx = DecisionContext::new("req", Some(&super_admin), Some(&target));
        assert!(!any_handler_succeeds(&none, &ctx));
    }

    #[test]
    fn handlers_share_one_requirement() {
        assert_eq!(EditOtherAdminHandler.requirement(), SuperAdminHandler.requirement());
    }
}
