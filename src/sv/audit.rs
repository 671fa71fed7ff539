//! Admin activity trail
//!
//! Every mutating operation reports itself here after its own writes have
//! committed. Recording is infallible for callers: a broken audit sink must
//! never turn a finished mutation into an error, so failures are logged and
//! swallowed.

use serde::Deserialize;
use uuid::Uuid;

use crate::{
  entity::activity_log,
  prelude::*,
  sv::{Page, Paged, paged},
};

/// Identity of the operator a request was authenticated as.
#[derive(Debug, Clone)]
pub struct Actor {
  pub email: String,
  pub ip: Option<String>,
  pub user_agent: Option<String>,
}

impl Actor {
  pub fn new(email: impl Into<String>) -> Self {
    Self { email: email.into(), ip: None, user_agent: None }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityAction {
  UserUpdate,
  UserDelete,
  CreditAdjust,
  PlanChange,
  PromoCreate,
  PromoUpdate,
  PromoDelete,
  PromoRedeem,
}

impl ActivityAction {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::UserUpdate => "user.update",
      Self::UserDelete => "user.delete",
      Self::CreditAdjust => "user.credit_adjust",
      Self::PlanChange => "user.plan_change",
      Self::PromoCreate => "promotion.create",
      Self::PromoUpdate => "promotion.update",
      Self::PromoDelete => "promotion.delete",
      Self::PromoRedeem => "promotion.redeem",
    }
  }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct AuditFilter {
  pub action: Option<String>,
  pub admin_email: Option<String>,
  pub target_type: Option<String>,
}

pub struct Audit<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Audit<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Appends one entry with the payload frozen at write time.
  pub async fn record(
    &self,
    actor: &Actor,
    action: ActivityAction,
    target_type: &str,
    target_id: &str,
    details: json::Value,
  ) {
    let entry = activity_log::ActiveModel {
      id: Set(Uuid::new_v4().to_string()),
      admin_email: Set(actor.email.clone()),
      action: Set(action.as_str().to_string()),
      target_type: Set(Some(target_type.to_string())),
      target_id: Set(Some(target_id.to_string())),
      details: Set(Some(details)),
      ip_address: Set(actor.ip.clone()),
      user_agent: Set(actor.user_agent.clone()),
      created_at: Set(Utc::now().naive_utc()),
    };

    if let Err(err) = entry.insert(self.db).await {
      error!("Failed to record audit entry `{}`: {err}", action.as_str());
    }
  }

  pub async fn entries(
    &self,
    filter: AuditFilter,
    page: Page,
  ) -> Result<Paged<activity_log::Model>> {
    let mut query = activity_log::Entity::find()
      .order_by_desc(activity_log::Column::CreatedAt);

    if let Some(action) = &filter.action {
      query = query.filter(activity_log::Column::Action.eq(action));
    }
    if let Some(email) = &filter.admin_email {
      query = query.filter(activity_log::Column::AdminEmail.contains(email));
    }
    if let Some(target) = &filter.target_type {
      query = query.filter(activity_log::Column::TargetType.eq(target));
    }

    paged(self.db, query, page).await
  }
}
