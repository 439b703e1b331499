use std::collections::HashSet;

use sea_orm::ConnectionTrait;

use crate::errors::InternalError;
use crate::errors::internal::AuthorizationError;
use crate::stores::RbacStore;
use crate::types::internal::PermissionTag;

/// Route guard over a required permission list (logical OR)
///
/// Declared as a constant next to each endpoint so the required tags are
/// checked by the compiler against the closed vocabulary.
#[derive(Debug, Clone, Copy)]
pub struct PermissionGate {
    required: &'static [PermissionTag],
}

impl PermissionGate {
    pub const fn any_of(required: &'static [PermissionTag]) -> Self {
        Self { required }
    }

    /// Whether any granted name matches a required tag
    ///
    /// Names outside the vocabulary are ignored. An empty requirement list
    /// denies everything.
    pub fn allows<S: AsRef<str>>(&self, granted: &[S]) -> bool {
        let granted: HashSet<PermissionTag> = granted
            .iter()
            .filter_map(|name| PermissionTag::parse(name.as_ref()))
            .collect();
        self.required.iter().any(|tag| granted.contains(tag))
    }

    /// `allows` as a Result carrying the denial
    pub fn check<S: AsRef<str>>(&self, granted: &[S]) -> Result<(), AuthorizationError> {
        if self.allows(granted) {
            Ok(())
        } else {
            Err(AuthorizationError::PermissionDenied {
                required: self.required.iter().map(|t| t.to_string()).collect(),
            })
        }
    }

    /// Re-read the user's permissions and check them against this gate
    ///
    /// Nothing is cached, so a grant or revocation applies to the very next
    /// request.
    pub async fn authorize(
        &self,
        conn: &impl ConnectionTrait,
        rbac: &RbacStore,
        user_id: i32,
    ) -> Result<(), InternalError> {
        let granted: Vec<String> = rbac
            .resolve_permissions(conn, user_id)
            .await
            .into_iter()
            .map(|p| p.name)
            .collect();

        self.check(&granted).map_err(|e| {
            tracing::warn!("User {} denied: {}", user_id, e);
            InternalError::from(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CREATE_GATE: PermissionGate = PermissionGate::any_of(&[PermissionTag::PROPERTY_CREATE]);

    #[test]
    fn test_gate_rejects_missing_permission() {
        assert!(!CREATE_GATE.allows(&["property-list"]));
    }

    #[test]
    fn test_gate_allows_when_one_required_tag_is_granted() {
        assert!(CREATE_GATE.allows(&["property-list", "property-create"]));
    }

    #[test]
    fn test_gate_is_logical_or_over_required_tags() {
        let gate = PermissionGate::any_of(&[PermissionTag::USER_EDIT, PermissionTag::ROLE_EDIT]);

        assert!(gate.allows(&["role-edit"]));
        assert!(gate.allows(&["user-edit"]));
        assert!(!gate.allows(&["user-list", "role-list"]));
    }

    #[test]
    fn test_gate_ignores_names_outside_vocabulary() {
        assert!(!CREATE_GATE.allows(&["property-create-all", "PROPERTY-CREATE", "*"]));
    }

    #[test]
    fn test_gate_denies_empty_grants_and_empty_requirements() {
        let empty: [&str; 0] = [];
        assert!(!CREATE_GATE.allows(&empty));
        assert!(!PermissionGate::any_of(&[]).allows(&["property-create"]));
    }

    #[test]
    fn test_check_reports_required_tags() {
        let err = CREATE_GATE.check(&["property-list"]).unwrap_err();

        assert_eq!(
            err,
            AuthorizationError::PermissionDenied {
                required: vec!["property-create".to_string()]
            }
        );
    }

    #[test]
    fn test_repeated_evaluation_is_stable() {
        let granted = vec!["property-create".to_string()];
        for _ in 0..3 {
            assert!(CREATE_GATE.check(&granted).is_ok());
        }
    }
}
