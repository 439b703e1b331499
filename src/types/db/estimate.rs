use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "estimates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub property_code: Option<String>,
    pub client_name: String,
    pub amount: i64,
    pub status: String,
    #[sea_orm(indexed)]
    pub agent_code: Option<String>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
