//! Aggregate counters for the dashboard landing page.

use serde::Serialize;

use crate::{
  entity::{
    TransactionType, credit_transaction, promotion_code, promotion_code_usage,
    user,
  },
  prelude::*,
};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Overview {
  pub total_users: u64,
  pub today_signups: u64,
  /// Credits burned since midnight UTC, reported as a positive number.
  pub today_usage: i64,
  pub active_promotions: u64,
  pub promo_credit_granted: i64,
}

pub struct Stats<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Stats<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn overview(&self) -> Result<Overview> {
    let now = Utc::now().naive_utc();
    let today = utils::day_start(now);

    let total_users = user::Entity::find()
      .filter(user::Column::DeletedAt.is_null())
      .count(self.db)
      .await?;

    let today_signups = user::Entity::find()
      .filter(user::Column::DeletedAt.is_null())
      .filter(user::Column::CreatedAt.gte(today))
      .count(self.db)
      .await?;

    let today_usage = credit_transaction::Entity::find()
      .select_only()
      .column_as(credit_transaction::Column::Amount.sum(), "total")
      .filter(
        credit_transaction::Column::TransactionType.eq(TransactionType::Usage),
      )
      .filter(credit_transaction::Column::CreatedAt.gte(today))
      .into_tuple::<Option<i64>>()
      .one(self.db)
      .await?
      .flatten()
      .unwrap_or(0)
      .abs();

    let active_promotions = promotion_code::Entity::find()
      .filter(promotion_code::Column::IsActive.eq(true))
      .filter(
        Condition::any()
          .add(promotion_code::Column::ExpiresAt.is_null())
          .add(promotion_code::Column::ExpiresAt.gt(now)),
      )
      .count(self.db)
      .await?;

    let promo_credit_granted = promotion_code_usage::Entity::find()
      .select_only()
      .column_as(promotion_code_usage::Column::CreditAmount.sum(), "total")
      .into_tuple::<Option<i64>>()
      .one(self.db)
      .await?
      .flatten()
      .unwrap_or(0);

    Ok(Overview {
      total_users,
      today_signups,
      today_usage,
      active_promotions,
      promo_credit_granted,
    })
  }
}

#[cfg(test)]
mod tests {
  use migration::Migrator;

  use super::*;
  use crate::{
    entity::*,
    sv::{Actor, Credits, Promos, credits::CreditBucket, promo::CreatePromo},
  };

  async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
  }

  async fn seed_user(db: &DatabaseConnection, id: &str, email: &str) {
    user::ActiveModel {
      id: Set(id.to_string()),
      email: Set(email.to_string()),
      name: Set(None),
      subscription_tier: Set(SubscriptionTier::Free),
      subscription_expiry: Set(None),
      charged_credit: Set(1_000),
      daily_credit: Set(0),
      weekly_credit: Set(0),
      is_email_verified: Set(true),
      created_at: Set(Utc::now().naive_utc()),
      last_login_at: Set(None),
      deleted_at: Set(None),
    }
    .insert(db)
    .await
    .unwrap();
  }

  fn actor() -> Actor {
    Actor::new("ops@tiro.app")
  }

  #[tokio::test]
  async fn test_overview_counts() {
    let db = setup_test_db().await;
    seed_user(&db, "u-1", "a@example.com").await;
    seed_user(&db, "u-2", "b@example.com").await;

    // Burn 300 credits today, grant 250 via a promotion.
    Credits::new(&db)
      .adjust("u-1", CreditBucket::Charged, -300, "burn", &actor())
      .await
      .unwrap();

    let promos = Promos::new(&db);
    promos
      .create(
        CreatePromo {
          code: "OVERVIEW".into(),
          promo_type: PromoType::Public,
          credit_amount: 250,
          quota: None,
          description: None,
          expires_at: None,
        },
        &actor(),
      )
      .await
      .unwrap();
    promos.redeem("OVERVIEW", "u-2", &actor()).await.unwrap();

    let overview = Stats::new(&db).overview().await.unwrap();
    assert_eq!(overview.total_users, 2);
    assert_eq!(overview.today_signups, 2);
    assert_eq!(overview.today_usage, 300);
    assert_eq!(overview.active_promotions, 1);
    assert_eq!(overview.promo_credit_granted, 250);
  }

  #[tokio::test]
  async fn test_overview_skips_deleted_and_expired() {
    let db = setup_test_db().await;
    seed_user(&db, "u-1", "a@example.com").await;
    seed_user(&db, "u-2", "b@example.com").await;

    crate::sv::Users::new(&db).deactivate("u-2", &actor()).await.unwrap();

    let promos = Promos::new(&db);
    promos
      .create(
        CreatePromo {
          code: "BYGONE".into(),
          promo_type: PromoType::Public,
          credit_amount: 100,
          quota: None,
          description: None,
          expires_at: Some(Utc::now().naive_utc() - TimeDelta::days(1)),
        },
        &actor(),
      )
      .await
      .unwrap();

    let overview = Stats::new(&db).overview().await.unwrap();
    assert_eq!(overview.total_users, 1);
    assert_eq!(overview.active_promotions, 0);
    assert_eq!(overview.today_usage, 0);
    assert_eq!(overview.promo_credit_granted, 0);
  }

  #[tokio::test]
  async fn test_overview_empty_store() {
    let db = setup_test_db().await;
    let overview = Stats::new(&db).overview().await.unwrap();
    assert_eq!(overview, Overview::default());
  }
}
