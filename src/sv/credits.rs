//! Credit adjustment service
//!
//! Admin-side balance corrections. Every adjustment lands as one atomic
//! store transaction holding the in-place balance add plus the appended
//! ledger entry, so the sum of a user's transactions always explains the
//! balance drift. The audit trail is written only after the commit.

use sea_orm::sea_query::{Expr, ExprTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  entity::{CreditType, TransactionType, credit_transaction, user},
  prelude::*,
  sv::{self, ActivityAction, Actor, Page, Paged},
};

/// The three balance pockets carried on a user row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditBucket {
  Charged,
  Daily,
  Weekly,
}

impl CreditBucket {
  pub fn column(self) -> user::Column {
    match self {
      Self::Charged => user::Column::ChargedCredit,
      Self::Daily => user::Column::DailyCredit,
      Self::Weekly => user::Column::WeeklyCredit,
    }
  }

  /// Ledger classification: paid pocket or subscription allowance.
  pub fn credit_type(self) -> CreditType {
    match self {
      Self::Charged => CreditType::Charged,
      Self::Daily | Self::Weekly => CreditType::Subscription,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Charged => "charged",
      Self::Daily => "daily",
      Self::Weekly => "weekly",
    }
  }

  fn value_of(self, user: &user::Model) -> i64 {
    match self {
      Self::Charged => user.charged_credit,
      Self::Daily => user.daily_credit,
      Self::Weekly => user.weekly_credit,
    }
  }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CreditBalances {
  pub charged: i64,
  pub daily: i64,
  pub weekly: i64,
}

impl From<&user::Model> for CreditBalances {
  fn from(user: &user::Model) -> Self {
    Self {
      charged: user.charged_credit,
      daily: user.daily_credit,
      weekly: user.weekly_credit,
    }
  }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct TransactionFilter {
  pub user_id: Option<String>,
  pub transaction_type: Option<TransactionType>,
  pub credit_type: Option<CreditType>,
  pub from: Option<DateTime>,
  pub to: Option<DateTime>,
}

pub struct Credits<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Credits<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn balances(&self, user_id: &str) -> Result<CreditBalances> {
    let user = user::Entity::find_by_id(user_id)
      .one(self.db)
      .await?
      .ok_or(Error::UserNotFound)?;

    Ok(CreditBalances::from(&user))
  }

  /// Applies a signed delta to one bucket and appends the ledger entry.
  ///
  /// Positive deltas land as `BONUS`, negative ones as `USAGE`. Balances
  /// may go below zero; clamping is left to the consuming platform.
  pub async fn adjust(
    &self,
    user_id: &str,
    bucket: CreditBucket,
    amount: i64,
    reason: &str,
    actor: &Actor,
  ) -> Result<CreditBalances> {
    if amount == 0 {
      return Err(Error::InvalidArgument(
        "adjustment amount must be non-zero".into(),
      ));
    }

    let reason = reason.trim();
    if reason.is_empty() {
      return Err(Error::InvalidArgument(
        "adjustment reason must not be empty".into(),
      ));
    }

    let txn = self.db.begin().await?;

    let user = user::Entity::find_by_id(user_id)
      .one(&txn)
      .await?
      .ok_or(Error::UserNotFound)?;
    let before = bucket.value_of(&user);

    user::Entity::update_many()
      .col_expr(bucket.column(), Expr::col(bucket.column()).add(amount))
      .filter(user::Column::Id.eq(user_id))
      .exec(&txn)
      .await?;

    let kind = if amount > 0 {
      TransactionType::Bonus
    } else {
      TransactionType::Usage
    };

    credit_transaction::ActiveModel {
      id: Set(Uuid::new_v4().to_string()),
      user_id: Set(user_id.to_string()),
      amount: Set(amount),
      transaction_type: Set(kind),
      credit_type: Set(Some(bucket.credit_type())),
      description: Set(Some(format!("[admin] {reason}"))),
      metadata: Set(Some(json::json!({
        "adjusted_by": actor.email,
        "bucket": bucket.as_str(),
      }))),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(&txn)
    .await?;

    let user = user::Entity::find_by_id(user_id)
      .one(&txn)
      .await?
      .ok_or(Error::UserNotFound)?;

    txn.commit().await?;

    sv::Audit::new(self.db)
      .record(
        actor,
        ActivityAction::CreditAdjust,
        "user",
        user_id,
        json::json!({
          "bucket": bucket.as_str(),
          "amount": amount,
          "before": before,
          "after": bucket.value_of(&user),
          "reason": reason,
        }),
      )
      .await;

    Ok(CreditBalances::from(&user))
  }

  pub async fn transactions(
    &self,
    filter: TransactionFilter,
    page: Page,
  ) -> Result<Paged<credit_transaction::Model>> {
    let mut query = credit_transaction::Entity::find()
      .order_by_desc(credit_transaction::Column::CreatedAt);

    if let Some(user_id) = &filter.user_id {
      query = query.filter(credit_transaction::Column::UserId.eq(user_id));
    }
    if let Some(kind) = &filter.transaction_type {
      query = query
        .filter(credit_transaction::Column::TransactionType.eq(kind.clone()));
    }
    if let Some(pocket) = &filter.credit_type {
      query = query
        .filter(credit_transaction::Column::CreditType.eq(pocket.clone()));
    }
    if let Some(from) = filter.from {
      query = query.filter(credit_transaction::Column::CreatedAt.gte(from));
    }
    if let Some(to) = filter.to {
      query = query.filter(credit_transaction::Column::CreatedAt.lte(to));
    }

    sv::paged(self.db, query, page).await
  }
}

#[cfg(test)]
mod tests {
  use sea_orm::{ConnectionTrait, Database, DbBackend, Schema};

  use super::*;
  use crate::entity::*;

  async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();

    let schema = Schema::new(DbBackend::Sqlite);

    let stmt = schema.create_table_from_entity(user::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(credit_transaction::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    let stmt = schema.create_table_from_entity(activity_log::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    db
  }

  async fn seed_user(
    db: &DatabaseConnection,
    id: &str,
    charged: i64,
  ) -> user::Model {
    user::ActiveModel {
      id: Set(id.to_string()),
      email: Set(format!("{id}@example.com")),
      name: Set(Some(id.to_string())),
      subscription_tier: Set(SubscriptionTier::Free),
      subscription_expiry: Set(None),
      charged_credit: Set(charged),
      daily_credit: Set(0),
      weekly_credit: Set(0),
      is_email_verified: Set(true),
      created_at: Set(Utc::now().naive_utc()),
      last_login_at: Set(None),
      deleted_at: Set(None),
    }
    .insert(db)
    .await
    .unwrap()
  }

  fn actor() -> Actor {
    Actor::new("ops@tiro.app")
  }

  #[tokio::test]
  async fn test_adjust_debits_charged_bucket() {
    let db = setup_test_db().await;
    seed_user(&db, "u-1", 500).await;

    let balances = Credits::new(&db)
      .adjust("u-1", CreditBucket::Charged, -200, "CS refund", &actor())
      .await
      .unwrap();

    assert_eq!(balances.charged, 300);
    assert_eq!(balances.daily, 0);

    let entries = credit_transaction::Entity::find().all(&db).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].amount, -200);
    assert_eq!(entries[0].transaction_type, TransactionType::Usage);
    assert_eq!(entries[0].credit_type, Some(CreditType::Charged));
    assert_eq!(entries[0].description.as_deref(), Some("[admin] CS refund"));

    let metadata = entries[0].metadata.clone().unwrap();
    assert_eq!(metadata["adjusted_by"], "ops@tiro.app");
    assert_eq!(metadata["bucket"], "charged");

    let logs = activity_log::Entity::find().all(&db).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].action, "user.credit_adjust");
    assert_eq!(logs[0].target_id.as_deref(), Some("u-1"));

    let details = logs[0].details.clone().unwrap();
    assert_eq!(details["before"], 500);
    assert_eq!(details["after"], 300);
    assert_eq!(details["reason"], "CS refund");
  }

  #[tokio::test]
  async fn test_adjust_credits_daily_bucket() {
    let db = setup_test_db().await;
    seed_user(&db, "u-1", 500).await;

    let balances = Credits::new(&db)
      .adjust("u-1", CreditBucket::Daily, 100, "goodwill", &actor())
      .await
      .unwrap();

    assert_eq!(balances.daily, 100);
    assert_eq!(balances.charged, 500);

    let entries = credit_transaction::Entity::find().all(&db).await.unwrap();
    assert_eq!(entries[0].transaction_type, TransactionType::Bonus);
    assert_eq!(entries[0].credit_type, Some(CreditType::Subscription));
  }

  #[tokio::test]
  async fn test_adjust_rejects_zero_amount() {
    let db = setup_test_db().await;
    seed_user(&db, "u-1", 500).await;

    let result = Credits::new(&db)
      .adjust("u-1", CreditBucket::Charged, 0, "noop", &actor())
      .await;

    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert_eq!(
      credit_transaction::Entity::find().count(&db).await.unwrap(),
      0
    );

    let balances = Credits::new(&db).balances("u-1").await.unwrap();
    assert_eq!(balances.charged, 500);
  }

  #[tokio::test]
  async fn test_adjust_rejects_blank_reason() {
    let db = setup_test_db().await;
    seed_user(&db, "u-1", 500).await;

    let result = Credits::new(&db)
      .adjust("u-1", CreditBucket::Charged, 50, "   ", &actor())
      .await;

    assert!(matches!(result, Err(Error::InvalidArgument(_))));
  }

  #[tokio::test]
  async fn test_adjust_unknown_user_leaves_no_trace() {
    let db = setup_test_db().await;

    let result = Credits::new(&db)
      .adjust("ghost", CreditBucket::Charged, 100, "welcome", &actor())
      .await;

    assert!(matches!(result, Err(Error::UserNotFound)));
    assert_eq!(
      credit_transaction::Entity::find().count(&db).await.unwrap(),
      0
    );
    assert_eq!(activity_log::Entity::find().count(&db).await.unwrap(), 0);
  }

  #[tokio::test]
  async fn test_adjust_below_zero_allowed() {
    let db = setup_test_db().await;
    seed_user(&db, "u-1", 100).await;

    let balances = Credits::new(&db)
      .adjust("u-1", CreditBucket::Charged, -250, "clawback", &actor())
      .await
      .unwrap();

    assert_eq!(balances.charged, -150);
  }

  #[tokio::test]
  async fn test_adjust_preserves_ledger_equality() {
    let db = setup_test_db().await;
    seed_user(&db, "u-1", 1000).await;
    let sv = Credits::new(&db);

    let deltas = [250i64, -120, 35, -400];
    for delta in deltas {
      sv.adjust("u-1", CreditBucket::Charged, delta, "rebalance", &actor())
        .await
        .unwrap();
    }

    let balances = sv.balances("u-1").await.unwrap();
    assert_eq!(balances.charged, 1000 + deltas.iter().sum::<i64>());

    let entries = credit_transaction::Entity::find().all(&db).await.unwrap();
    assert_eq!(entries.len(), deltas.len());
    assert_eq!(
      entries.iter().map(|entry| entry.amount).sum::<i64>(),
      deltas.iter().sum::<i64>()
    );
  }

  #[tokio::test]
  async fn test_adjust_rolls_back_when_ledger_write_fails() {
    let db = setup_test_db().await;
    seed_user(&db, "u-1", 500).await;

    // Ledger insert fails after the balance add went through inside the
    // same transaction, so the balance add must not survive either.
    db.execute_unprepared("DROP TABLE credit_transactions").await.unwrap();

    let result = Credits::new(&db)
      .adjust("u-1", CreditBucket::Charged, -200, "CS refund", &actor())
      .await;
    assert!(matches!(result, Err(Error::Database(_))));

    let balances = Credits::new(&db).balances("u-1").await.unwrap();
    assert_eq!(balances.charged, 500);
    assert_eq!(activity_log::Entity::find().count(&db).await.unwrap(), 0);
  }

  #[tokio::test]
  async fn test_adjust_survives_audit_outage() {
    let db = setup_test_db().await;
    seed_user(&db, "u-1", 500).await;

    db.execute_unprepared("DROP TABLE admin_activity_logs").await.unwrap();

    let balances = Credits::new(&db)
      .adjust("u-1", CreditBucket::Charged, -100, "CS refund", &actor())
      .await
      .unwrap();

    assert_eq!(balances.charged, 400);
    assert_eq!(
      credit_transaction::Entity::find().count(&db).await.unwrap(),
      1
    );
  }

  #[tokio::test]
  async fn test_transactions_filtering() {
    let db = setup_test_db().await;
    seed_user(&db, "u-1", 500).await;
    seed_user(&db, "u-2", 500).await;
    let sv = Credits::new(&db);

    sv.adjust("u-1", CreditBucket::Charged, 100, "bonus", &actor())
      .await
      .unwrap();
    sv.adjust("u-1", CreditBucket::Charged, -40, "correction", &actor())
      .await
      .unwrap();
    sv.adjust("u-2", CreditBucket::Weekly, -10, "correction", &actor())
      .await
      .unwrap();

    let all = sv
      .transactions(TransactionFilter::default(), Page::default())
      .await
      .unwrap();
    assert_eq!(all.total, 3);

    let debits = sv
      .transactions(
        TransactionFilter {
          user_id: Some("u-1".into()),
          transaction_type: Some(TransactionType::Usage),
          ..Default::default()
        },
        Page::default(),
      )
      .await
      .unwrap();
    assert_eq!(debits.total, 1);
    assert_eq!(debits.items[0].amount, -40);

    let subscription = sv
      .transactions(
        TransactionFilter {
          credit_type: Some(CreditType::Subscription),
          ..Default::default()
        },
        Page::default(),
      )
      .await
      .unwrap();
    assert_eq!(subscription.total, 1);
    assert_eq!(subscription.items[0].user_id, "u-2");
  }
}
