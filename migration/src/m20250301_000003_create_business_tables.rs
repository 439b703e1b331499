use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create properties table
        manager
            .create_table(
                Table::create()
                    .table(Properties::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Properties::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Properties::PropertyCode).string().not_null().unique_key())
                    .col(ColumnDef::new(Properties::Title).string().not_null())
                    .col(ColumnDef::new(Properties::City).string().null())
                    .col(ColumnDef::new(Properties::Status).string().not_null().default("available"))
                    .col(ColumnDef::new(Properties::Price).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Properties::AgentCode).string().null())
                    .col(ColumnDef::new(Properties::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Properties::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Create brokerages table
        manager
            .create_table(
                Table::create()
                    .table(Brokerages::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Brokerages::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Brokerages::BrokerageCode).string().not_null().unique_key())
                    .col(ColumnDef::new(Brokerages::PropertyCode).string().null())
                    .col(ColumnDef::new(Brokerages::ClientName).string().not_null())
                    .col(ColumnDef::new(Brokerages::Amount).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Brokerages::Status).string().not_null().default("open"))
                    .col(ColumnDef::new(Brokerages::AgentCode).string().null())
                    .col(ColumnDef::new(Brokerages::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Create estimates table
        manager
            .create_table(
                Table::create()
                    .table(Estimates::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Estimates::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Estimates::PropertyCode).string().null())
                    .col(ColumnDef::new(Estimates::ClientName).string().not_null())
                    .col(ColumnDef::new(Estimates::Amount).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Estimates::Status).string().not_null().default("draft"))
                    .col(ColumnDef::new(Estimates::AgentCode).string().null())
                    .col(ColumnDef::new(Estimates::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Create visits table
        manager
            .create_table(
                Table::create()
                    .table(Visits::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Visits::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Visits::PropertyCode).string().null())
                    .col(ColumnDef::new(Visits::VisitorName).string().not_null())
                    .col(ColumnDef::new(Visits::VisitAt).big_integer().not_null())
                    .col(ColumnDef::new(Visits::Status).string().not_null().default("scheduled"))
                    .col(ColumnDef::new(Visits::AgentCode).string().null())
                    .col(ColumnDef::new(Visits::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Create deals table
        manager
            .create_table(
                Table::create()
                    .table(Deals::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Deals::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Deals::BrokerageCode).string().null())
                    .col(ColumnDef::new(Deals::PropertyCode).string().null())
                    .col(ColumnDef::new(Deals::Amount).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Deals::Stage).string().not_null().default("open"))
                    .col(ColumnDef::new(Deals::AgentCode).string().null())
                    .col(ColumnDef::new(Deals::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Create notifications table
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Notifications::Id).integer().not_null().auto_increment().primary_key())
                    .col(ColumnDef::new(Notifications::Title).string().not_null())
                    .col(ColumnDef::new(Notifications::Message).string().not_null())
                    .col(ColumnDef::new(Notifications::AgentCode).string().null())
                    .col(ColumnDef::new(Notifications::CreatedBy).integer().null())
                    .col(ColumnDef::new(Notifications::IsRead).boolean().not_null().default(false))
                    .col(ColumnDef::new(Notifications::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Every business table is scoped through agent_code
        for (name, table) in [
            ("idx_properties_agent_code", "properties"),
            ("idx_brokerages_agent_code", "brokerages"),
            ("idx_estimates_agent_code", "estimates"),
            ("idx_visits_agent_code", "visits"),
            ("idx_deals_agent_code", "deals"),
            ("idx_notifications_agent_code", "notifications"),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Alias::new(table))
                        .col(Alias::new("agent_code"))
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Deals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Visits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Estimates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Brokerages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Properties::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Properties {
    Table,
    Id,
    PropertyCode,
    Title,
    City,
    Status,
    Price,
    AgentCode,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Brokerages {
    Table,
    Id,
    BrokerageCode,
    PropertyCode,
    ClientName,
    Amount,
    Status,
    AgentCode,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Estimates {
    Table,
    Id,
    PropertyCode,
    ClientName,
    Amount,
    Status,
    AgentCode,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Visits {
    Table,
    Id,
    PropertyCode,
    VisitorName,
    VisitAt,
    Status,
    AgentCode,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Deals {
    Table,
    Id,
    BrokerageCode,
    PropertyCode,
    Amount,
    Stage,
    AgentCode,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    Title,
    Message,
    AgentCode,
    CreatedBy,
    IsRead,
    CreatedAt,
}
