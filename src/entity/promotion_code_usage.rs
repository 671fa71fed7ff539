//! Promotion code usage entity - one row per (code, user) redemption
//!
//! A unique index over (promotion_code_id, user_id) backs the at-most-once
//! guarantee, so racing redemptions collapse into a single surviving row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "promotion_code_usages")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  pub promotion_code_id: String,
  pub user_id: String,
  pub credit_amount: i64,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::promotion_code::Entity",
    from = "Column::PromotionCodeId",
    to = "super::promotion_code::Column::Id"
  )]
  PromotionCode,
  #[sea_orm(
    belongs_to = "super::user::Entity",
    from = "Column::UserId",
    to = "super::user::Column::Id"
  )]
  User,
}

impl Related<super::promotion_code::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::PromotionCode.def()
  }
}

impl Related<super::user::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::User.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
