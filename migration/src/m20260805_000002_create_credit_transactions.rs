use sea_orm_migration::prelude::*;

use super::m20260805_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(CreditTransactions::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(CreditTransactions::Id)
              .string()
              .not_null()
              .primary_key(),
          )
          .col(ColumnDef::new(CreditTransactions::UserId).string().not_null())
          .col(
            ColumnDef::new(CreditTransactions::Amount)
              .big_integer()
              .not_null(),
          )
          .col(
            ColumnDef::new(CreditTransactions::TransactionType)
              .string()
              .not_null(),
          )
          .col(ColumnDef::new(CreditTransactions::CreditType).string())
          .col(ColumnDef::new(CreditTransactions::Description).string())
          .col(ColumnDef::new(CreditTransactions::Metadata).json())
          .col(
            ColumnDef::new(CreditTransactions::CreatedAt)
              .date_time()
              .not_null(),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_credit_transactions_user")
              .from(CreditTransactions::Table, CreditTransactions::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Restrict),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_credit_transactions_user_created")
          .table(CreditTransactions::Table)
          .col(CreditTransactions::UserId)
          .col(CreditTransactions::CreatedAt)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(CreditTransactions::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum CreditTransactions {
  Table,
  Id,
  UserId,
  Amount,
  TransactionType,
  CreditType,
  Description,
  Metadata,
  CreatedAt,
}
