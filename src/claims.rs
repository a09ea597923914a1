//! Role and claim vocabulary.
//!
//! Role names, claim types and claim values are matched as exact,
//! case-sensitive strings. Boolean claims travel as the literal strings
//! `"True"` and `"False"`; [`Claim::as_flag`] reads them back as a real `bool`
//! without coercing any other spelling.

use serde::{Deserialize, Serialize};

/// Role names.
pub mod roles {
    /// Unrestricted administrator.
    pub const SUPER_ADMIN: &str = "Super Admin";
    /// Administrator whose reach is limited by claims.
    pub const ADMIN: &str = "Admin";
    /// Regular account.
    pub const USER: &str = "User";
}

/// Claim types.
pub mod claim_types {
    /// May create roles.
    pub const CREATE_ROLE: &str = "Create Role";
    /// May edit roles and claims of other accounts.
    pub const EDIT_ROLE: &str = "Edit Role";
    /// May delete roles.
    pub const DELETE_ROLE: &str = "Delete Role";
    /// May manage the claims attached to user accounts.
    pub const MANAGE_USER_CLAIMS: &str = "Manage User Claims";
    /// Generic create permission.
    pub const CREATE: &str = "Create";
    /// Generic edit permission.
    pub const EDIT: &str = "Edit";
    /// Generic delete permission.
    pub const DELETE: &str = "Delete";
}

/// Wire value of a true boolean claim.
pub const TRUE: &str = "True";

/// Wire value of a false boolean claim.
pub const FALSE: &str = "False";

/// A typed name/value fact attached to a principal.
///
/// # Examples
///
/// ```
/// use admin_authz::{Claim, claims::claim_types};
///
/// let claim = Claim::flag(claim_types::EDIT_ROLE, true);
/// assert_eq!(claim.value(), "True");
/// assert_eq!(claim.as_flag(), Some(true));
///
/// // Other spellings are not booleans.
/// assert_eq!(Claim::new(claim_types::EDIT_ROLE, "true").as_flag(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claim {
    #[serde(rename = "type")]
    claim_type: String,
    value: String,
}

impl Claim {
    /// Creates a claim holding a raw string value.
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }

    /// Creates a boolean claim, encoded as `"True"` or `"False"`.
    pub fn flag(claim_type: impl Into<String>, value: bool) -> Self {
        Self::new(claim_type, flag_value(value))
    }

    /// Returns the claim type.
    pub fn claim_type(&self) -> &str {
        &self.claim_type
    }

    /// Returns the raw claim value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Reads the value as a boolean.
    ///
    /// Only the exact strings `"True"` and `"False"` are booleans.
    pub fn as_flag(&self) -> Option<bool> {
        match self.value.as_str() {
            TRUE => Some(true),
            FALSE => Some(false),
            _ => None,
        }
    }
}

/// Returns the wire encoding of a boolean claim value.
pub fn flag_value(value: bool) -> &'static str {
    if value {
        TRUE
    } else {
        FALSE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_round_trips_through_wire_strings() {
        assert_eq!(Claim::flag(claim_types::CREATE_ROLE, true).value(), "True");
        assert_eq!(Claim::flag(claim_types::CREATE_ROLE, false).value(), "False");
        assert_eq!(Claim::flag(claim_types::CREATE_ROLE, false).as_flag(), Some(false));
    }

    #[test]
    fn as_flag_does_not_coerce_other_spellings() {
        for raw in ["true", "TRUE", "1", "yes", " True", "True ", ""] {
            assert_eq!(
                Claim::new(claim_types::EDIT_ROLE, raw).as_flag(),
                None,
                "{raw:?} must not read as a boolean"
            );
        }
    }

    #[test]
    fn claim_serializes_with_type_key() {
        let claim = Claim::flag(claim_types::DELETE_ROLE, true);
        let json = serde_json::to_string(&claim).unwrap();
        assert_eq!(json, r#"{"type":"Delete Role","value":"True"}"#);

        let back: Claim = serde_json::from_str(&json).unwrap();
        assert_eq!(back, claim);
    }

    #[test]
    fn vocabulary_is_exact() {
        assert_eq!(roles::SUPER_ADMIN, "Super Admin");
        assert_eq!(roles::ADMIN, "Admin");
        assert_eq!(roles::USER, "User");
        assert_eq!(claim_types::MANAGE_USER_CLAIMS, "Manage User Claims");
    }
}
