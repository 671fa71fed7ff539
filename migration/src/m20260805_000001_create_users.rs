use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Users::Table)
          .if_not_exists()
          .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
          .col(ColumnDef::new(Users::Email).string().not_null().unique_key())
          .col(ColumnDef::new(Users::Name).string())
          .col(
            ColumnDef::new(Users::SubscriptionTier)
              .string()
              .not_null()
              .default("FREE"),
          )
          .col(ColumnDef::new(Users::SubscriptionExpiry).date_time())
          .col(
            ColumnDef::new(Users::ChargedCredit)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(Users::DailyCredit)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(Users::WeeklyCredit)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(Users::IsEmailVerified)
              .boolean()
              .not_null()
              .default(false),
          )
          .col(ColumnDef::new(Users::CreatedAt).date_time().not_null())
          .col(ColumnDef::new(Users::LastLoginAt).date_time())
          .col(ColumnDef::new(Users::DeletedAt).date_time())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Users::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Users {
  Table,
  Id,
  Email,
  Name,
  SubscriptionTier,
  SubscriptionExpiry,
  ChargedCredit,
  DailyCredit,
  WeeklyCredit,
  IsEmailVerified,
  CreatedAt,
  LastLoginAt,
  DeletedAt,
}
