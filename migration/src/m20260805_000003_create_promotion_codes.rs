use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(PromotionCodes::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(PromotionCodes::Id).string().not_null().primary_key(),
          )
          .col(
            ColumnDef::new(PromotionCodes::Code)
              .string()
              .not_null()
              .unique_key(),
          )
          .col(
            ColumnDef::new(PromotionCodes::PromoType)
              .string()
              .not_null()
              .default("PUBLIC"),
          )
          .col(
            ColumnDef::new(PromotionCodes::CreditAmount)
              .big_integer()
              .not_null(),
          )
          .col(ColumnDef::new(PromotionCodes::Quota).integer())
          .col(
            ColumnDef::new(PromotionCodes::IsActive)
              .boolean()
              .not_null()
              .default(true),
          )
          .col(ColumnDef::new(PromotionCodes::Description).string())
          .col(ColumnDef::new(PromotionCodes::ExpiresAt).date_time())
          .col(ColumnDef::new(PromotionCodes::CreatedAt).date_time().not_null())
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(PromotionCodes::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum PromotionCodes {
  Table,
  Id,
  Code,
  PromoType,
  CreditAmount,
  Quota,
  IsActive,
  Description,
  ExpiresAt,
  CreatedAt,
}
