use std::fmt;

use super::code_prefix::CodePrefix;

/// Canonical roles of the reporting hierarchy
///
/// Role names arrive in mixed forms ("Super Admin", "super admin", "SUPER_ADMIN").
/// They are normalized once, here, and every other component matches on the enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleName {
    SuperAdmin,
    Admin,
    Manager,
    Agent,
}

impl RoleName {
    pub const ALL: [RoleName; 4] = [
        RoleName::SuperAdmin,
        RoleName::Admin,
        RoleName::Manager,
        RoleName::Agent,
    ];

    /// Parse a stored or submitted role name
    ///
    /// Matching is case-insensitive and treats runs of whitespace, `_` and `-`
    /// as a single space. Returns `None` for any name outside the hierarchy.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw
            .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
            .filter(|part| !part.is_empty())
            .map(|part| part.to_lowercase())
            .collect::<Vec<_>>()
            .join(" ");

        match normalized.as_str() {
            "super admin" => Some(RoleName::SuperAdmin),
            "admin" => Some(RoleName::Admin),
            "manager" => Some(RoleName::Manager),
            "agent" => Some(RoleName::Agent),
            _ => None,
        }
    }

    /// Human label, as stored in the roles table
    pub fn label(&self) -> &'static str {
        match self {
            RoleName::SuperAdmin => "Super Admin",
            RoleName::Admin => "Admin",
            RoleName::Manager => "Manager",
            RoleName::Agent => "Agent",
        }
    }

    pub fn code_prefix(&self) -> CodePrefix {
        match self {
            RoleName::SuperAdmin => CodePrefix::SuperAdmin,
            RoleName::Admin => CodePrefix::Admin,
            RoleName::Manager => CodePrefix::Manager,
            RoleName::Agent => CodePrefix::Agent,
        }
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
