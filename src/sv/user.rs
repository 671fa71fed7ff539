//! User administration service
//!
//! Accounts are never hard-deleted; deactivation stamps `deleted_at` so
//! transaction and redemption history stays reconcilable.

use serde::Deserialize;

use crate::{
  entity::{SubscriptionTier, user},
  prelude::*,
  sv::{self, ActivityAction, Actor, Page, Paged},
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
  #[default]
  Active,
  Deleted,
  All,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct UserFilter {
  pub search: Option<String>,
  pub tier: Option<SubscriptionTier>,
  #[serde(default)]
  pub status: UserStatus,
}

/// Patch payload where a missing field keeps the stored value and an
/// explicit null clears it.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UpdateUser {
  #[serde(default, deserialize_with = "sv::patch_field")]
  pub name: Option<Option<String>>,
  pub is_email_verified: Option<bool>,
}

pub struct Users<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Users<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn by_id(&self, id: &str) -> Result<Option<user::Model>> {
    let user = user::Entity::find_by_id(id).one(self.db).await?;
    Ok(user)
  }

  pub async fn list(
    &self,
    filter: UserFilter,
    page: Page,
  ) -> Result<Paged<user::Model>> {
    let mut query =
      user::Entity::find().order_by_desc(user::Column::CreatedAt);

    if let Some(search) = &filter.search {
      query = query.filter(
        Condition::any()
          .add(user::Column::Email.contains(search))
          .add(user::Column::Name.contains(search)),
      );
    }
    if let Some(tier) = &filter.tier {
      query = query.filter(user::Column::SubscriptionTier.eq(tier.clone()));
    }
    match filter.status {
      UserStatus::Active => {
        query = query.filter(user::Column::DeletedAt.is_null());
      }
      UserStatus::Deleted => {
        query = query.filter(user::Column::DeletedAt.is_not_null());
      }
      UserStatus::All => {}
    }

    sv::paged(self.db, query, page).await
  }

  pub async fn update(
    &self,
    id: &str,
    patch: UpdateUser,
    actor: &Actor,
  ) -> Result<user::Model> {
    let user = user::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::UserNotFound)?;

    let mut changed: Vec<&str> = Vec::new();
    let mut active: user::ActiveModel = user.clone().into();

    if let Some(name) = patch.name {
      active.name = Set(name);
      changed.push("name");
    }
    if let Some(flag) = patch.is_email_verified {
      active.is_email_verified = Set(flag);
      changed.push("is_email_verified");
    }

    if changed.is_empty() {
      return Ok(user);
    }

    let updated = active.update(self.db).await?;

    sv::Audit::new(self.db)
      .record(
        actor,
        ActivityAction::UserUpdate,
        "user",
        id,
        json::json!({ "email": updated.email, "updated": changed }),
      )
      .await;

    Ok(updated)
  }

  pub async fn deactivate(&self, id: &str, actor: &Actor) -> Result<()> {
    let user = user::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::UserNotFound)?;

    if user.deleted_at.is_some() {
      return Err(Error::InvalidArgument(
        "user is already deactivated".into(),
      ));
    }

    let email = user.email.clone();
    user::ActiveModel {
      deleted_at: Set(Some(Utc::now().naive_utc())),
      ..user.into()
    }
    .update(self.db)
    .await?;

    sv::Audit::new(self.db)
      .record(
        actor,
        ActivityAction::UserDelete,
        "user",
        id,
        json::json!({ "email": email }),
      )
      .await;

    Ok(())
  }

  pub async fn change_plan(
    &self,
    id: &str,
    tier: SubscriptionTier,
    expiry: Option<DateTime>,
    reason: &str,
    actor: &Actor,
  ) -> Result<user::Model> {
    let reason = reason.trim();
    if reason.is_empty() {
      return Err(Error::InvalidArgument(
        "plan change reason must not be empty".into(),
      ));
    }

    let user = user::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::UserNotFound)?;

    let before = json::json!({
      "tier": user.subscription_tier,
      "expiry": user.subscription_expiry,
    });

    let updated = user::ActiveModel {
      subscription_tier: Set(tier),
      subscription_expiry: Set(expiry),
      ..user.into()
    }
    .update(self.db)
    .await?;

    sv::Audit::new(self.db)
      .record(
        actor,
        ActivityAction::PlanChange,
        "user",
        id,
        json::json!({
          "before": before,
          "after": {
            "tier": updated.subscription_tier,
            "expiry": updated.subscription_expiry,
          },
          "reason": reason,
        }),
      )
      .await;

    Ok(updated)
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

    let stmt = schema.create_table_from_entity(activity_log::Entity);
    db.execute(db.get_database_backend().build(&stmt)).await.unwrap();

    db
  }

  async fn seed_user(
    db: &DatabaseConnection,
    id: &str,
    email: &str,
    tier: SubscriptionTier,
  ) -> user::Model {
    user::ActiveModel {
      id: Set(id.to_string()),
      email: Set(email.to_string()),
      name: Set(Some("Han".into())),
      subscription_tier: Set(tier),
      subscription_expiry: Set(None),
      charged_credit: Set(0),
      daily_credit: Set(0),
      weekly_credit: Set(0),
      is_email_verified: Set(false),
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
  async fn test_update_user_fields() {
    let db = setup_test_db().await;
    seed_user(&db, "u-1", "han@example.com", SubscriptionTier::Free).await;

    let updated = Users::new(&db)
      .update(
        "u-1",
        UpdateUser {
          name: Some(Some("Han Solo".into())),
          is_email_verified: Some(true),
        },
        &actor(),
      )
      .await
      .unwrap();

    assert_eq!(updated.name.as_deref(), Some("Han Solo"));
    assert!(updated.is_email_verified);

    let logs = activity_log::Entity::find().all(&db).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].action, "user.update");
  }

  #[tokio::test]
  async fn test_update_clears_name() {
    let db = setup_test_db().await;
    seed_user(&db, "u-1", "han@example.com", SubscriptionTier::Free).await;

    let updated = Users::new(&db)
      .update(
        "u-1",
        UpdateUser { name: Some(None), ..Default::default() },
        &actor(),
      )
      .await
      .unwrap();

    assert_eq!(updated.name, None);
  }

  #[tokio::test]
  async fn test_deactivate_is_soft_and_single_shot() {
    let db = setup_test_db().await;
    seed_user(&db, "u-1", "han@example.com", SubscriptionTier::Free).await;
    let sv = Users::new(&db);

    sv.deactivate("u-1", &actor()).await.unwrap();

    let user = sv.by_id("u-1").await.unwrap().unwrap();
    assert!(user.deleted_at.is_some());

    let again = sv.deactivate("u-1", &actor()).await;
    assert!(matches!(again, Err(Error::InvalidArgument(_))));

    let logs = activity_log::Entity::find().all(&db).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].action, "user.delete");
  }

  #[tokio::test]
  async fn test_list_status_filter() {
    let db = setup_test_db().await;
    let sv = Users::new(&db);

    seed_user(&db, "u-1", "a@example.com", SubscriptionTier::Free).await;
    seed_user(&db, "u-2", "b@example.com", SubscriptionTier::Pro).await;
    sv.deactivate("u-2", &actor()).await.unwrap();

    let active =
      sv.list(UserFilter::default(), Page::default()).await.unwrap();
    assert_eq!(active.total, 1);
    assert_eq!(active.items[0].id, "u-1");

    let deleted = sv
      .list(
        UserFilter { status: UserStatus::Deleted, ..Default::default() },
        Page::default(),
      )
      .await
      .unwrap();
    assert_eq!(deleted.total, 1);
    assert_eq!(deleted.items[0].id, "u-2");

    let all = sv
      .list(
        UserFilter { status: UserStatus::All, ..Default::default() },
        Page::default(),
      )
      .await
      .unwrap();
    assert_eq!(all.total, 2);
  }

  #[tokio::test]
  async fn test_list_search_and_tier() {
    let db = setup_test_db().await;
    let sv = Users::new(&db);

    seed_user(&db, "u-1", "luke@example.com", SubscriptionTier::Free).await;
    seed_user(&db, "u-2", "leia@example.com", SubscriptionTier::Pro).await;

    let searched = sv
      .list(
        UserFilter { search: Some("leia".into()), ..Default::default() },
        Page::default(),
      )
      .await
      .unwrap();
    assert_eq!(searched.total, 1);
    assert_eq!(searched.items[0].id, "u-2");

    let pro = sv
      .list(
        UserFilter { tier: Some(SubscriptionTier::Pro), ..Default::default() },
        Page::default(),
      )
      .await
      .unwrap();
    assert_eq!(pro.total, 1);
    assert_eq!(pro.items[0].email, "leia@example.com");
  }

  #[tokio::test]
  async fn test_change_plan() {
    let db = setup_test_db().await;
    seed_user(&db, "u-1", "han@example.com", SubscriptionTier::Free).await;
    let sv = Users::new(&db);

    let expiry = Utc::now().naive_utc() + TimeDelta::days(30);
    let updated = sv
      .change_plan(
        "u-1",
        SubscriptionTier::Pro,
        Some(expiry),
        "charge back settled",
        &actor(),
      )
      .await
      .unwrap();

    assert_eq!(updated.subscription_tier, SubscriptionTier::Pro);
    assert_eq!(updated.subscription_expiry, Some(expiry));

    let logs = activity_log::Entity::find().all(&db).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].action, "user.plan_change");

    let details = logs[0].details.clone().unwrap();
    assert_eq!(details["before"]["tier"], "FREE");
    assert_eq!(details["after"]["tier"], "PRO");

    let blank = sv
      .change_plan("u-1", SubscriptionTier::Free, None, "  ", &actor())
      .await;
    assert!(matches!(blank, Err(Error::InvalidArgument(_))));
  }

  #[tokio::test]
  async fn test_unknown_user() {
    let db = setup_test_db().await;
    let sv = Users::new(&db);

    assert!(sv.by_id("ghost").await.unwrap().is_none());
    assert!(matches!(
      sv.deactivate("ghost", &actor()).await,
      Err(Error::UserNotFound)
    ));
  }
}
