//! Database migrations using SeaORM

pub use sea_orm_migration::prelude::*;

mod m20260805_000001_create_users;
mod m20260805_000002_create_credit_transactions;
mod m20260805_000003_create_promotion_codes;
mod m20260805_000004_create_promotion_code_usages;
mod m20260805_000005_create_activity_logs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20260805_000001_create_users::Migration),
      Box::new(m20260805_000002_create_credit_transactions::Migration),
      Box::new(m20260805_000003_create_promotion_codes::Migration),
      Box::new(m20260805_000004_create_promotion_code_usages::Migration),
      Box::new(m20260805_000005_create_activity_logs::Migration),
    ]
  }
}
