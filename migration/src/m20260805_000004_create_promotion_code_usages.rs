use sea_orm_migration::prelude::*;

use super::m20260805_000001_create_users::Users;
use super::m20260805_000003_create_promotion_codes::PromotionCodes;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(PromotionCodeUsages::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(PromotionCodeUsages::Id)
              .string()
              .not_null()
              .primary_key(),
          )
          .col(
            ColumnDef::new(PromotionCodeUsages::PromotionCodeId)
              .string()
              .not_null(),
          )
          .col(ColumnDef::new(PromotionCodeUsages::UserId).string().not_null())
          .col(
            ColumnDef::new(PromotionCodeUsages::CreditAmount)
              .big_integer()
              .not_null(),
          )
          .col(
            ColumnDef::new(PromotionCodeUsages::CreatedAt)
              .date_time()
              .not_null(),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_promotion_code_usages_code")
              .from(
                PromotionCodeUsages::Table,
                PromotionCodeUsages::PromotionCodeId,
              )
              .to(PromotionCodes::Table, PromotionCodes::Id)
              .on_delete(ForeignKeyAction::Restrict),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_promotion_code_usages_user")
              .from(PromotionCodeUsages::Table, PromotionCodeUsages::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Restrict),
          )
          .to_owned(),
      )
      .await?;

    // One row per (code, user) pair, enforced by the store itself.
    manager
      .create_index(
        Index::create()
          .name("idx_promotion_code_usages_code_user")
          .table(PromotionCodeUsages::Table)
          .col(PromotionCodeUsages::PromotionCodeId)
          .col(PromotionCodeUsages::UserId)
          .unique()
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(PromotionCodeUsages::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum PromotionCodeUsages {
  Table,
  Id,
  PromotionCodeId,
  UserId,
  CreditAmount,
  CreatedAt,
}
