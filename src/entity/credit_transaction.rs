//! Credit transaction entity - append-only history of balance changes

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(
  Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
  #[sea_orm(string_value = "PURCHASE")]
  Purchase,
  #[sea_orm(string_value = "INITIAL_CREDIT")]
  InitialCredit,
  #[sea_orm(string_value = "USAGE")]
  Usage,
  #[sea_orm(string_value = "REFUND")]
  Refund,
  #[sea_orm(string_value = "BONUS")]
  Bonus,
  #[sea_orm(string_value = "SUBSCRIPTION")]
  Subscription,
}

/// Which credit pocket the entry settled against.
#[derive(
  Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreditType {
  #[sea_orm(string_value = "CHARGED")]
  Charged,
  #[sea_orm(string_value = "SUBSCRIPTION")]
  Subscription,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "credit_transactions")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  pub user_id: String,
  pub amount: i64,
  pub transaction_type: TransactionType,
  pub credit_type: Option<CreditType>,
  pub description: Option<String>,
  pub metadata: Option<Json>,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::user::Entity",
    from = "Column::UserId",
    to = "super::user::Column::Id"
  )]
  User,
}

impl Related<super::user::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::User.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}
