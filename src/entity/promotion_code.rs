//! Promotion code entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
  Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromoType {
  #[sea_orm(string_value = "PUBLIC")]
  Public,
  #[sea_orm(string_value = "PRIVATE")]
  Private,
}

impl Default for PromoType {
  fn default() -> Self {
    Self::Public
  }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "promotion_codes")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  #[sea_orm(unique)]
  pub code: String,
  pub promo_type: PromoType,
  pub credit_amount: i64,
  pub quota: Option<i32>,
  pub is_active: bool,
  pub description: Option<String>,
  pub expires_at: Option<DateTime>,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "super::promotion_code_usage::Entity")]
  Usages,
}

impl Related<super::promotion_code_usage::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Usages.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
