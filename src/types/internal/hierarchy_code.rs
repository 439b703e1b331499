use std::fmt;

/// A business code that doubles as a join key into the reporting hierarchy
///
/// `AGT-100200` is both the agent's human-facing identifier and the value
/// business rows carry in `agent_code`. Codes are trimmed and never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HierarchyCode(String);

impl HierarchyCode {
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HierarchyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<HierarchyCode> for String {
    fn from(code: HierarchyCode) -> Self {
        code.0
    }
}
