use std::fmt;

/// A unit of authorization logic that handlers try to satisfy.
///
/// Requirements carry no state. A policy names a requirement, and every
/// handler registered for it gets a chance to succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[non_exhaustive]
pub enum Requirement {
    /// Caller may edit the roles and claims of another administrator.
    ManageAdminRolesAndClaims,
}

impl Requirement {
    /// Returns the stable name of the requirement.
    pub fn name(&self) -> &'static str {
        match self {
            Requirement::ManageAdminRolesAndClaims => "ManageAdminRolesAndClaims",
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
