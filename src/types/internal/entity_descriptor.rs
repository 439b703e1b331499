use std::fmt;

/// Business entities reachable through a scoped listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Property,
    Brokerage,
    Estimate,
    Visit,
    Deal,
    Notification,
    Agent,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Property,
        EntityKind::Brokerage,
        EntityKind::Estimate,
        EntityKind::Visit,
        EntityKind::Deal,
        EntityKind::Notification,
        EntityKind::Agent,
    ];

    pub fn descriptor(&self) -> &'static EntityDescriptor {
        match self {
            EntityKind::Property => &PROPERTY,
            EntityKind::Brokerage => &BROKERAGE,
            EntityKind::Estimate => &ESTIMATE,
            EntityKind::Visit => &VISIT,
            EntityKind::Deal => &DEAL,
            EntityKind::Notification => &NOTIFICATION,
            EntityKind::Agent => &AGENT,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Property => "property",
            EntityKind::Brokerage => "brokerage",
            EntityKind::Estimate => "estimate",
            EntityKind::Visit => "visit",
            EntityKind::Deal => "deal",
            EntityKind::Notification => "notification",
            EntityKind::Agent => "agent",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the `admin_code` / `manager_code` columns of an entity live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchySource {
    /// Reached through the join with this alias (the agents table)
    Joined { alias: &'static str },
    /// Columns of the entity table itself
    Inline,
}

/// Fixed ordering of a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingOrder {
    PrimaryKeyAsc,
    /// Creation time descending, primary key descending as tie-break
    CreatedDesc,
}

/// A left join that is part of an entity's base query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinSpec {
    pub table: &'static str,
    pub alias: &'static str,
    /// Column on the joined table
    pub foreign_column: &'static str,
    /// Column on the entity table it is matched against
    pub local_column: &'static str,
    /// Joined columns added to the select list
    pub selected: &'static [&'static str],
}

/// Static description of an entity's base query
///
/// Everything the composer needs to build a listing: the table and its alias,
/// the fixed joins, which columns may be searched or filtered, and how the
/// row reaches the reporting hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub kind: EntityKind,
    pub table: &'static str,
    pub alias: &'static str,
    pub primary_key: &'static str,
    pub columns: &'static [&'static str],
    pub joins: &'static [JoinSpec],
    /// Column matched against an agent's own code
    pub owner_column: &'static str,
    pub hierarchy: HierarchySource,
    /// `(alias, column)` pairs ORed together for free-text search
    pub search_columns: &'static [(&'static str, &'static str)],
    /// Entity columns accepted as equality filters
    pub filterable: &'static [&'static str],
    pub created_column: &'static str,
    pub default_limit: u64,
    pub listing_order: ListingOrder,
}

impl EntityDescriptor {
    /// Alias carrying `admin_code` and `manager_code` for this entity
    pub fn hierarchy_alias(&self) -> &'static str {
        match self.hierarchy {
            HierarchySource::Joined { alias } => alias,
            HierarchySource::Inline => self.alias,
        }
    }

    pub fn is_filterable(&self, column: &str) -> bool {
        self.filterable.contains(&column)
    }
}

/// A listing row type bound to the entity it is read from
pub trait ScopedRow: sea_orm::FromQueryResult + Send + Sync + 'static {
    const KIND: EntityKind;
}

const AGENT_HIERARCHY_JOIN: JoinSpec = JoinSpec {
    table: "agents",
    alias: "ag",
    foreign_column: "agent_code",
    local_column: "agent_code",
    selected: &[],
};

const AGENT_HIERARCHY: HierarchySource = HierarchySource::Joined { alias: "ag" };

pub static PROPERTY: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Property,
    table: "properties",
    alias: "p",
    primary_key: "id",
    columns: &[
        "id",
        "property_code",
        "title",
        "city",
        "status",
        "price",
        "agent_code",
        "created_at",
        "updated_at",
    ],
    joins: &[AGENT_HIERARCHY_JOIN],
    owner_column: "agent_code",
    hierarchy: AGENT_HIERARCHY,
    search_columns: &[("p", "property_code"), ("p", "title"), ("p", "city")],
    filterable: &["status", "city", "agent_code", "property_code"],
    created_column: "created_at",
    default_limit: 10,
    listing_order: ListingOrder::PrimaryKeyAsc,
};

pub static BROKERAGE: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Brokerage,
    table: "brokerages",
    alias: "b",
    primary_key: "id",
    columns: &[
        "id",
        "brokerage_code",
        "property_code",
        "client_name",
        "amount",
        "status",
        "agent_code",
        "created_at",
    ],
    joins: &[AGENT_HIERARCHY_JOIN],
    owner_column: "agent_code",
    hierarchy: AGENT_HIERARCHY,
    search_columns: &[
        ("b", "brokerage_code"),
        ("b", "client_name"),
        ("b", "property_code"),
    ],
    filterable: &["status", "agent_code", "property_code"],
    created_column: "created_at",
    default_limit: 10,
    listing_order: ListingOrder::PrimaryKeyAsc,
};

pub static ESTIMATE: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Estimate,
    table: "estimates",
    alias: "e",
    primary_key: "id",
    columns: &[
        "id",
        "property_code",
        "client_name",
        "amount",
        "status",
        "agent_code",
        "created_at",
    ],
    joins: &[AGENT_HIERARCHY_JOIN],
    owner_column: "agent_code",
    hierarchy: AGENT_HIERARCHY,
    search_columns: &[("e", "client_name"), ("e", "property_code")],
    filterable: &["status", "agent_code", "property_code"],
    created_column: "created_at",
    default_limit: 10,
    listing_order: ListingOrder::PrimaryKeyAsc,
};

pub static VISIT: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Visit,
    table: "visits",
    alias: "v",
    primary_key: "id",
    columns: &[
        "id",
        "property_code",
        "visitor_name",
        "visit_at",
        "status",
        "agent_code",
        "created_at",
    ],
    joins: &[AGENT_HIERARCHY_JOIN],
    owner_column: "agent_code",
    hierarchy: AGENT_HIERARCHY,
    search_columns: &[("v", "visitor_name"), ("v", "property_code")],
    filterable: &["status", "agent_code", "property_code"],
    created_column: "created_at",
    default_limit: 10,
    listing_order: ListingOrder::PrimaryKeyAsc,
};

pub static DEAL: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Deal,
    table: "deals",
    alias: "d",
    primary_key: "id",
    columns: &[
        "id",
        "brokerage_code",
        "property_code",
        "amount",
        "stage",
        "agent_code",
        "created_at",
    ],
    joins: &[AGENT_HIERARCHY_JOIN],
    owner_column: "agent_code",
    hierarchy: AGENT_HIERARCHY,
    search_columns: &[("d", "brokerage_code"), ("d", "property_code")],
    filterable: &["stage", "agent_code", "brokerage_code", "property_code"],
    created_column: "created_at",
    default_limit: 10,
    listing_order: ListingOrder::PrimaryKeyAsc,
};

pub static NOTIFICATION: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Notification,
    table: "notifications",
    alias: "n",
    primary_key: "id",
    columns: &[
        "id",
        "title",
        "message",
        "agent_code",
        "created_by",
        "is_read",
        "created_at",
    ],
    joins: &[AGENT_HIERARCHY_JOIN],
    owner_column: "agent_code",
    hierarchy: AGENT_HIERARCHY,
    search_columns: &[("n", "title"), ("n", "message")],
    filterable: &["agent_code"],
    created_column: "created_at",
    default_limit: 20,
    listing_order: ListingOrder::CreatedDesc,
};

pub static AGENT: EntityDescriptor = EntityDescriptor {
    kind: EntityKind::Agent,
    table: "agents",
    alias: "a",
    primary_key: "user_id",
    columns: &[
        "user_id",
        "agent_code",
        "manager_code",
        "admin_code",
        "commission_bps",
        "overdraft",
        "balance",
        "created_at",
    ],
    joins: &[JoinSpec {
        table: "users",
        alias: "u",
        foreign_column: "id",
        local_column: "user_id",
        selected: &["name", "email"],
    }],
    owner_column: "agent_code",
    hierarchy: HierarchySource::Inline,
    search_columns: &[("a", "agent_code"), ("u", "name"), ("u", "email")],
    filterable: &["agent_code", "manager_code", "admin_code"],
    created_column: "created_at",
    default_limit: 10,
    listing_order: ListingOrder::PrimaryKeyAsc,
};
