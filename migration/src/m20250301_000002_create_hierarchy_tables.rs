use sea_orm_migration::prelude::*;

use crate::m20250301_000001_create_identity_tables::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Managers report to an admin through admin_code (a users.code value)
        manager
            .create_table(
                Table::create()
                    .table(Managers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Managers::UserId).integer().not_null().primary_key())
                    .col(ColumnDef::new(Managers::ManagerCode).string().not_null().unique_key())
                    .col(ColumnDef::new(Managers::AdminCode).string().null())
                    .col(ColumnDef::new(Managers::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_managers_user_id")
                            .from(Managers::Table, Managers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Agents carry both codes of their reporting line
        manager
            .create_table(
                Table::create()
                    .table(Agents::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Agents::UserId).integer().not_null().primary_key())
                    .col(ColumnDef::new(Agents::AgentCode).string().not_null().unique_key())
                    .col(ColumnDef::new(Agents::ManagerCode).string().null())
                    .col(ColumnDef::new(Agents::AdminCode).string().null())
                    .col(ColumnDef::new(Agents::CommissionBps).integer().not_null().default(0))
                    .col(ColumnDef::new(Agents::Overdraft).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Agents::Balance).big_integer().not_null().default(0))
                    .col(ColumnDef::new(Agents::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_agents_user_id")
                            .from(Agents::Table, Agents::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_agents_manager_code")
                    .table(Agents::Table)
                    .col(Agents::ManagerCode)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_agents_admin_code")
                    .table(Agents::Table)
                    .col(Agents::AdminCode)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Agents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Managers::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Managers {
    Table,
    UserId,
    ManagerCode,
    AdminCode,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Agents {
    Table,
    UserId,
    AgentCode,
    ManagerCode,
    AdminCode,
    CommissionBps,
    Overdraft,
    Balance,
    CreatedAt,
}
