use std::fmt;

/// Resource half of a permission tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    User,
    Role,
    Permission,
    Property,
    Brokerage,
    Estimate,
    Visit,
    Deal,
    Notification,
    Report,
}

impl Resource {
    pub const ALL: [Resource; 10] = [
        Resource::User,
        Resource::Role,
        Resource::Permission,
        Resource::Property,
        Resource::Brokerage,
        Resource::Estimate,
        Resource::Visit,
        Resource::Deal,
        Resource::Notification,
        Resource::Report,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::User => "user",
            Resource::Role => "role",
            Resource::Permission => "permission",
            Resource::Property => "property",
            Resource::Brokerage => "brokerage",
            Resource::Estimate => "estimate",
            Resource::Visit => "visit",
            Resource::Deal => "deal",
            Resource::Notification => "notification",
            Resource::Report => "report",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == raw)
    }
}

/// Action half of a permission tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    List,
    Create,
    Edit,
    Delete,
    View,
    Export,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::List,
        Action::Create,
        Action::Edit,
        Action::Delete,
        Action::View,
        Action::Export,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::View => "view",
            Action::Export => "export",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == raw)
    }
}

/// A permission name such as `property-list`
///
/// The set of tags is closed: every guard in the codebase names a tag by
/// constant, so a typo is a compile error instead of a silently denied route.
/// Names stored in the database that do not parse are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PermissionTag {
    pub resource: Resource,
    pub action: Action,
}

impl PermissionTag {
    pub const USER_LIST: PermissionTag = PermissionTag::new(Resource::User, Action::List);
    pub const USER_CREATE: PermissionTag = PermissionTag::new(Resource::User, Action::Create);
    pub const USER_EDIT: PermissionTag = PermissionTag::new(Resource::User, Action::Edit);
    pub const USER_DELETE: PermissionTag = PermissionTag::new(Resource::User, Action::Delete);
    pub const ROLE_LIST: PermissionTag = PermissionTag::new(Resource::Role, Action::List);
    pub const ROLE_EDIT: PermissionTag = PermissionTag::new(Resource::Role, Action::Edit);
    pub const PERMISSION_LIST: PermissionTag = PermissionTag::new(Resource::Permission, Action::List);
    pub const PERMISSION_EDIT: PermissionTag = PermissionTag::new(Resource::Permission, Action::Edit);
    pub const PROPERTY_LIST: PermissionTag = PermissionTag::new(Resource::Property, Action::List);
    pub const PROPERTY_VIEW: PermissionTag = PermissionTag::new(Resource::Property, Action::View);
    pub const PROPERTY_CREATE: PermissionTag = PermissionTag::new(Resource::Property, Action::Create);
    pub const PROPERTY_EXPORT: PermissionTag = PermissionTag::new(Resource::Property, Action::Export);
    pub const BROKERAGE_LIST: PermissionTag = PermissionTag::new(Resource::Brokerage, Action::List);
    pub const BROKERAGE_CREATE: PermissionTag = PermissionTag::new(Resource::Brokerage, Action::Create);
    pub const ESTIMATE_LIST: PermissionTag = PermissionTag::new(Resource::Estimate, Action::List);
    pub const VISIT_LIST: PermissionTag = PermissionTag::new(Resource::Visit, Action::List);
    pub const DEAL_LIST: PermissionTag = PermissionTag::new(Resource::Deal, Action::List);
    pub const NOTIFICATION_LIST: PermissionTag = PermissionTag::new(Resource::Notification, Action::List);
    pub const REPORT_VIEW: PermissionTag = PermissionTag::new(Resource::Report, Action::View);

    pub const fn new(resource: Resource, action: Action) -> Self {
        Self { resource, action }
    }

    /// Parse `<resource>-<action>`; `None` for anything outside the vocabulary
    pub fn parse(raw: &str) -> Option<Self> {
        let (resource, action) = raw.trim().split_once('-')?;
        Some(Self::new(Resource::parse(resource)?, Action::parse(action)?))
    }

    /// Every tag in the vocabulary, resource-major
    pub fn all() -> impl Iterator<Item = PermissionTag> {
        Resource::ALL
            .into_iter()
            .flat_map(|r| Action::ALL.into_iter().map(move |a| PermissionTag::new(r, a)))
    }

    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for PermissionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.resource.as_str(), self.action.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_resource_action_form() {
        assert_eq!(PermissionTag::PROPERTY_LIST.to_string(), "property-list");
        assert_eq!(PermissionTag::REPORT_VIEW.to_string(), "report-view");
    }

    #[test]
    fn test_parse_accepts_every_vocabulary_name() {
        for tag in PermissionTag::all() {
            assert_eq!(PermissionTag::parse(&tag.to_string()), Some(tag));
        }
        assert_eq!(PermissionTag::all().count(), 60);
    }

    #[test]
    fn test_parse_rejects_unknown_names() {
        assert_eq!(PermissionTag::parse("property"), None);
        assert_eq!(PermissionTag::parse("property-approve"), None);
        assert_eq!(PermissionTag::parse("house-list"), None);
        assert_eq!(PermissionTag::parse("Property-List"), None);
    }
}
