use std::fmt;

/// Prefix of a generated business code, e.g. `AGT` in `AGT-123456`
///
/// Each prefix owns exactly one table column in which its codes must be unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodePrefix {
    SuperAdmin,
    Admin,
    Manager,
    Agent,
    /// Users whose role is outside the reporting hierarchy
    User,
    Property,
    Brokerage,
}

impl CodePrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            CodePrefix::SuperAdmin => "SAD",
            CodePrefix::Admin => "ADM",
            CodePrefix::Manager => "MNG",
            CodePrefix::Agent => "AGT",
            CodePrefix::User => "USR",
            CodePrefix::Property => "PRP",
            CodePrefix::Brokerage => "BRK",
        }
    }

    /// Table and column holding codes with this prefix
    pub fn target(&self) -> (&'static str, &'static str) {
        match self {
            CodePrefix::SuperAdmin
            | CodePrefix::Admin
            | CodePrefix::Manager
            | CodePrefix::Agent
            | CodePrefix::User => ("users", "code"),
            CodePrefix::Property => ("properties", "property_code"),
            CodePrefix::Brokerage => ("brokerages", "brokerage_code"),
        }
    }

    /// Format a six-digit suffix as `PREFIX-NNNNNN`
    pub fn format(&self, suffix: u32) -> String {
        format!("{}-{:06}", self.as_str(), suffix)
    }
}

impl fmt::Display for CodePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
