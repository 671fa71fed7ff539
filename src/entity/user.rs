//! User entity - account row owning the three credit buckets

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
  Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionTier {
  #[sea_orm(string_value = "FREE")]
  Free,
  #[sea_orm(string_value = "BASIC")]
  Basic,
  #[sea_orm(string_value = "PRO")]
  Pro,
  #[sea_orm(string_value = "ENTERPRISE")]
  Enterprise,
}

impl Default for SubscriptionTier {
  fn default() -> Self {
    Self::Free
  }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  #[sea_orm(unique)]
  pub email: String,
  pub name: Option<String>,
  pub subscription_tier: SubscriptionTier,
  pub subscription_expiry: Option<DateTime>,
  pub charged_credit: i64,
  pub daily_credit: i64,
  pub weekly_credit: i64,
  pub is_email_verified: bool,
  pub created_at: DateTime,
  pub last_login_at: Option<DateTime>,
  pub deleted_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "super::credit_transaction::Entity")]
  CreditTransactions,
  #[sea_orm(has_many = "super::promotion_code_usage::Entity")]
  PromotionCodeUsages,
}

impl Related<super::credit_transaction::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::CreditTransactions.def()
  }
}

impl Related<super::promotion_code_usage::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::PromotionCodeUsages.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
