use crate::errors::internal::AuthorizationError;
use crate::types::internal::{EntityDescriptor, HierarchyCode, RoleName};

/// Comparison applied by a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Like,
    Gte,
    Lte,
}

/// Bound value of a predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    Text(String),
    Int(i64),
}

/// One `alias.column <op> value` fragment of a WHERE clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Predicate {
    pub alias: &'static str,
    pub column: &'static str,
    pub comparator: Comparator,
    pub value: FilterValue,
}

impl Predicate {
    pub fn eq_text(alias: &'static str, column: &'static str, value: impl Into<String>) -> Self {
        Self {
            alias,
            column,
            comparator: Comparator::Eq,
            value: FilterValue::Text(value.into()),
        }
    }
}

/// Rows a requester may see, derived from role and hierarchy code
///
/// | Role        | Predicate                           |
/// |-------------|-------------------------------------|
/// | Super Admin | none                                |
/// | Admin       | `<hierarchy>.admin_code = code`     |
/// | Manager     | `<hierarchy>.manager_code = code`   |
/// | Agent       | `<entity>.agent_code = code`        |
///
/// Roles outside the hierarchy never produce a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VisibilityScope {
    Unrestricted,
    Admin(HierarchyCode),
    Manager(HierarchyCode),
    Agent(HierarchyCode),
}

impl VisibilityScope {
    /// Resolve the scope of a requester
    ///
    /// # Arguments
    /// * `role` - Canonical role name as stored, in any casing
    /// * `code` - The requester's hierarchy code
    ///
    /// # Returns
    /// * `Err(MissingRole)` - No role was resolved
    /// * `Err(UnrecognizedRole)` - Role outside the hierarchy
    /// * `Err(MissingHierarchyCode)` - Scoped role without a code
    pub fn for_role(
        role: Option<&str>,
        code: Option<&HierarchyCode>,
    ) -> Result<Self, AuthorizationError> {
        let raw = role.ok_or(AuthorizationError::MissingRole)?;
        let role = RoleName::parse(raw)
            .ok_or_else(|| AuthorizationError::UnrecognizedRole(raw.to_string()))?;

        if role == RoleName::SuperAdmin {
            return Ok(VisibilityScope::Unrestricted);
        }

        let code = code
            .cloned()
            .ok_or_else(|| AuthorizationError::MissingHierarchyCode {
                role: role.label().to_string(),
            })?;

        Ok(match role {
            RoleName::Admin => VisibilityScope::Admin(code),
            RoleName::Manager => VisibilityScope::Manager(code),
            // SuperAdmin returned above
            _ => VisibilityScope::Agent(code),
        })
    }

    /// Predicates restricting `desc` to this scope, empty when unrestricted
    pub fn predicates(&self, desc: &EntityDescriptor) -> Vec<Predicate> {
        match self {
            VisibilityScope::Unrestricted => Vec::new(),
            VisibilityScope::Admin(code) => vec![Predicate::eq_text(
                desc.hierarchy_alias(),
                "admin_code",
                code.as_str(),
            )],
            VisibilityScope::Manager(code) => vec![Predicate::eq_text(
                desc.hierarchy_alias(),
                "manager_code",
                code.as_str(),
            )],
            VisibilityScope::Agent(code) => vec![Predicate::eq_text(
                desc.alias,
                desc.owner_column,
                code.as_str(),
            )],
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, VisibilityScope::Unrestricted)
    }
}

/// Resolve a requester's role and code straight into predicates for one entity
pub fn scope_for(
    role: Option<&str>,
    code: Option<&HierarchyCode>,
    desc: &EntityDescriptor,
) -> Result<Vec<Predicate>, AuthorizationError> {
    Ok(VisibilityScope::for_role(role, code)?.predicates(desc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::internal::EntityKind;

    fn code(raw: &str) -> HierarchyCode {
        HierarchyCode::parse(raw).unwrap()
    }

    #[test]
    fn test_super_admin_is_unrestricted_for_every_entity() {
        for role in ["Super Admin", "super admin", "SUPER_ADMIN"] {
            for kind in EntityKind::ALL {
                let predicates = scope_for(Some(role), None, kind.descriptor()).unwrap();
                assert!(predicates.is_empty());
            }
        }
    }

    #[test]
    fn test_admin_matches_admin_code_through_hierarchy_alias() {
        let admin = code("ADM-111111");
        for kind in EntityKind::ALL {
            let desc = kind.descriptor();
            let predicates = scope_for(Some("Admin"), Some(&admin), desc).unwrap();
            assert_eq!(
                predicates,
                vec![Predicate::eq_text(desc.hierarchy_alias(), "admin_code", "ADM-111111")]
            );
        }
    }

    #[test]
    fn test_manager_matches_manager_code_through_hierarchy_alias() {
        let manager = code("MNG-300400");
        let predicates =
            scope_for(Some("manager"), Some(&manager), EntityKind::Brokerage.descriptor()).unwrap();

        assert_eq!(predicates, vec![Predicate::eq_text("ag", "manager_code", "MNG-300400")]);
    }

    #[test]
    fn test_agent_matches_own_code_on_entity_alias() {
        let agent = code("AGT-100200");
        let predicates =
            scope_for(Some("Agent"), Some(&agent), EntityKind::Property.descriptor()).unwrap();

        assert_eq!(predicates, vec![Predicate::eq_text("p", "agent_code", "AGT-100200")]);

        let predicates =
            scope_for(Some("agent"), Some(&agent), EntityKind::Agent.descriptor()).unwrap();
        assert_eq!(predicates, vec![Predicate::eq_text("a", "agent_code", "AGT-100200")]);
    }

    #[test]
    fn test_every_recognized_role_yields_at_most_one_predicate() {
        let c = code("XXX-000001");
        for role in RoleName::ALL {
            for kind in EntityKind::ALL {
                let predicates = scope_for(Some(role.label()), Some(&c), kind.descriptor()).unwrap();
                let expected = if role == RoleName::SuperAdmin { 0 } else { 1 };
                assert_eq!(predicates.len(), expected);
            }
        }
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let c = code("GST-000001");
        for kind in EntityKind::ALL {
            let result = scope_for(Some("guest"), Some(&c), kind.descriptor());
            assert_eq!(result, Err(AuthorizationError::UnrecognizedRole("guest".to_string())));
        }
    }

    #[test]
    fn test_missing_role_is_rejected() {
        let result = VisibilityScope::for_role(None, Some(&code("AGT-100200")));

        assert_eq!(result, Err(AuthorizationError::MissingRole));
    }

    #[test]
    fn test_scoped_role_without_code_is_rejected() {
        let result = VisibilityScope::for_role(Some("Agent"), None);

        assert_eq!(
            result,
            Err(AuthorizationError::MissingHierarchyCode {
                role: "Agent".to_string()
            })
        );
    }
}
