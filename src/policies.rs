//! The application's named policies.

use crate::claims::{claim_types, roles};
use crate::error::RegistryError;
use crate::handler::{EditOtherAdminHandler, SuperAdminHandler};
use crate::policy::{Policy, Rule};
use crate::registry::PolicyRegistry;
use crate::requirement::Requirement;

/// Both `Delete Role` and `Create Role` claims set to `"True"`.
pub const DELETE_ROLE: &str = "DeleteRolePolicy";

/// Any of the `Admin`, `User` or `Super Admin` roles.
pub const ADMINISTRATION: &str = "AdministrationPolicy";

/// `Admin` with `Manage User Claims`, or `Super Admin`.
pub const MANAGE_USER_CLAIMS: &str = "ManageUserClaimsPolicy";

/// Editing another admin's roles and claims.
pub const EDIT_ROLE: &str = "EditRolePolicy";

/// Applied to every request not marked anonymous.
pub const AUTHENTICATED_USER: &str = "RequireAuthenticatedUser";

/// Requires two claims at once; both checks live in one AND.
pub fn delete_role_policy() -> Policy {
    Policy::builder(DELETE_ROLE)
        .require_flag(claim_types::DELETE_ROLE)
        .require_flag(claim_types::CREATE_ROLE)
        .build()
}

/// Requires any one of the three application roles.
pub fn administration_policy() -> Policy {
    Policy::builder(ADMINISTRATION)
        .require_role([roles::ADMIN, roles::USER, roles::SUPER_ADMIN])
        .build()
}

/// `(Admin && Manage User Claims == "True") || Super Admin`.
pub fn manage_user_claims_policy() -> Policy {
    Policy::new(
        MANAGE_USER_CLAIMS,
        Rule::AnyOf(vec![
            Rule::AllOf(vec![
                Rule::role(roles::ADMIN),
                Rule::flag(claim_types::MANAGE_USER_CLAIMS),
            ]),
            Rule::role(roles::SUPER_ADMIN),
        ]),
    )
}

/// Satisfied by any handler registered for
/// [`Requirement::ManageAdminRolesAndClaims`].
pub fn edit_role_policy() -> Policy {
    Policy::builder(EDIT_ROLE)
        .add_requirement(Requirement::ManageAdminRolesAndClaims)
        .build()
}

/// Requires nothing but an authenticated caller.
pub fn authenticated_user_policy() -> Policy {
    Policy::builder(AUTHENTICATED_USER)
        .require_authenticated_user()
        .build()
}

/// Builds the registry used by the administration area.
///
/// Registers the four named policies, both requirement handlers, and the
/// authenticated-user fallback.
///
/// # Errors
///
/// Only fails if the definitions above become inconsistent.
pub fn standard_registry() -> Result<PolicyRegistry, RegistryError> {
    PolicyRegistry::builder()
        .add_policy(delete_role_policy())
        .add_policy(administration_policy())
        .add_policy(manage_user_claims_policy())
        .add_policy(edit_role_policy())
        .add_handler(EditOtherAdminHandler)
        .add_handler(SuperAdminHandler)
        .fallback_policy(authenticated_user_policy())
        .build()
}
