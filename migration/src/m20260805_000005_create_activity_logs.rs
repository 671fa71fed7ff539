use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(AdminActivityLogs::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(AdminActivityLogs::Id)
              .string()
              .not_null()
              .primary_key(),
          )
          .col(
            ColumnDef::new(AdminActivityLogs::AdminEmail).string().not_null(),
          )
          .col(ColumnDef::new(AdminActivityLogs::Action).string().not_null())
          .col(ColumnDef::new(AdminActivityLogs::TargetType).string())
          .col(ColumnDef::new(AdminActivityLogs::TargetId).string())
          .col(ColumnDef::new(AdminActivityLogs::Details).json())
          .col(ColumnDef::new(AdminActivityLogs::IpAddress).string())
          .col(ColumnDef::new(AdminActivityLogs::UserAgent).string())
          .col(
            ColumnDef::new(AdminActivityLogs::CreatedAt).date_time().not_null(),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(AdminActivityLogs::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum AdminActivityLogs {
  Table,
  Id,
  AdminEmail,
  Action,
  TargetType,
  TargetId,
  Details,
  IpAddress,
  UserAgent,
  CreatedAt,
}
