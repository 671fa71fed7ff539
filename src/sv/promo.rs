//! Promotion code lifecycle and redemption
//!
//! Redemption runs as a single store transaction: the usage row, the
//! balance add and the ledger entry commit together or not at all. On top
//! of the in-transaction checks, a unique (promotion_code_id, user_id)
//! index lets the store itself reject whichever racing redemption loses.

use std::collections::HashMap;

use sea_orm::{
  SqlErr,
  sea_query::{Expr, ExprTrait},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  entity::{
    CreditType, PromoType, TransactionType, credit_transaction,
    promotion_code, promotion_code_usage, user,
  },
  prelude::*,
  sv::{self, ActivityAction, Actor, Page, Paged},
};

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePromo {
  pub code: String,
  #[serde(default)]
  pub promo_type: PromoType,
  pub credit_amount: i64,
  pub quota: Option<i32>,
  pub description: Option<String>,
  pub expires_at: Option<DateTime>,
}

/// Patch payload where a missing field keeps the stored value and an
/// explicit null clears it.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UpdatePromo {
  pub credit_amount: Option<i64>,
  pub promo_type: Option<PromoType>,
  pub is_active: Option<bool>,
  #[serde(default, deserialize_with = "sv::patch_field")]
  pub quota: Option<Option<i32>>,
  #[serde(default, deserialize_with = "sv::patch_field")]
  pub description: Option<Option<String>>,
  #[serde(default, deserialize_with = "sv::patch_field")]
  pub expires_at: Option<Option<DateTime>>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct PromoFilter {
  pub search: Option<String>,
  pub promo_type: Option<PromoType>,
  pub is_active: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct PromoDetail {
  #[serde(flatten)]
  pub promo: promotion_code::Model,
  pub used_count: u64,
}

pub struct Promos<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Promos<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn create(
    &self,
    req: CreatePromo,
    actor: &Actor,
  ) -> Result<promotion_code::Model> {
    let code = normalize(&req.code);
    if code.is_empty() {
      return Err(Error::InvalidArgument("code must not be empty".into()));
    }
    if req.credit_amount <= 0 {
      return Err(Error::InvalidArgument(
        "credit amount must be positive".into(),
      ));
    }
    if req.quota.is_some_and(|quota| quota < 0) {
      return Err(Error::InvalidArgument("quota must not be negative".into()));
    }

    let existing = promotion_code::Entity::find()
      .filter(promotion_code::Column::Code.eq(&code))
      .one(self.db)
      .await?;
    if existing.is_some() {
      return Err(Error::DuplicateCode);
    }

    let promo = promotion_code::ActiveModel {
      id: Set(Uuid::new_v4().to_string()),
      code: Set(code),
      promo_type: Set(req.promo_type),
      credit_amount: Set(req.credit_amount),
      quota: Set(req.quota),
      is_active: Set(true),
      description: Set(req.description),
      expires_at: Set(req.expires_at),
      created_at: Set(Utc::now().naive_utc()),
    }
    .insert(self.db)
    .await
    .map_err(|err| match err.sql_err() {
      Some(SqlErr::UniqueConstraintViolation(_)) => Error::DuplicateCode,
      _ => Error::Database(err),
    })?;

    sv::Audit::new(self.db)
      .record(
        actor,
        ActivityAction::PromoCreate,
        "promotion",
        &promo.id,
        json::json!({
          "code": promo.code,
          "credit_amount": promo.credit_amount,
          "quota": promo.quota,
        }),
      )
      .await;

    Ok(promo)
  }

  pub async fn by_id(&self, id: &str) -> Result<PromoDetail> {
    let promo = promotion_code::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::CodeNotFound)?;

    let used_count = promotion_code_usage::Entity::find()
      .filter(promotion_code_usage::Column::PromotionCodeId.eq(id))
      .count(self.db)
      .await?;

    Ok(PromoDetail { promo, used_count })
  }

  pub async fn list(
    &self,
    filter: PromoFilter,
    page: Page,
  ) -> Result<Paged<PromoDetail>> {
    let mut query = promotion_code::Entity::find()
      .order_by_desc(promotion_code::Column::CreatedAt);

    if let Some(search) = &filter.search {
      query = query.filter(
        Condition::any()
          .add(promotion_code::Column::Code.contains(search))
          .add(promotion_code::Column::Description.contains(search)),
      );
    }
    if let Some(kind) = &filter.promo_type {
      query = query.filter(promotion_code::Column::PromoType.eq(kind.clone()));
    }
    if let Some(active) = filter.is_active {
      query = query.filter(promotion_code::Column::IsActive.eq(active));
    }

    let codes = sv::paged(self.db, query, page).await?;

    let ids: Vec<String> =
      codes.items.iter().map(|promo| promo.id.clone()).collect();
    let counts: Vec<(String, i64)> = promotion_code_usage::Entity::find()
      .select_only()
      .column(promotion_code_usage::Column::PromotionCodeId)
      .column_as(promotion_code_usage::Column::Id.count(), "used")
      .filter(promotion_code_usage::Column::PromotionCodeId.is_in(ids))
      .group_by(promotion_code_usage::Column::PromotionCodeId)
      .into_tuple()
      .all(self.db)
      .await?;
    let counts: HashMap<String, i64> = counts.into_iter().collect();

    let items = codes
      .items
      .into_iter()
      .map(|promo| {
        let used_count = counts.get(&promo.id).copied().unwrap_or(0) as u64;
        PromoDetail { promo, used_count }
      })
      .collect();

    Ok(Paged { items, total: codes.total, page: codes.page, pages: codes.pages })
  }

  /// Individual redemption rows of one code, newest first.
  pub async fn usages(
    &self,
    id: &str,
    page: Page,
  ) -> Result<Paged<promotion_code_usage::Model>> {
    promotion_code::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::CodeNotFound)?;

    let query = promotion_code_usage::Entity::find()
      .filter(promotion_code_usage::Column::PromotionCodeId.eq(id))
      .order_by_desc(promotion_code_usage::Column::CreatedAt);

    sv::paged(self.db, query, page).await
  }

  pub async fn update(
    &self,
    id: &str,
    patch: UpdatePromo,
    actor: &Actor,
  ) -> Result<promotion_code::Model> {
    if patch.credit_amount.is_some_and(|amount| amount <= 0) {
      return Err(Error::InvalidArgument(
        "credit amount must be positive".into(),
      ));
    }
    if let Some(Some(quota)) = patch.quota {
      if quota < 0 {
        return Err(Error::InvalidArgument(
          "quota must not be negative".into(),
        ));
      }
    }

    let promo = promotion_code::Entity::find_by_id(id)
      .one(self.db)
      .await?
      .ok_or(Error::CodeNotFound)?;
    let code = promo.code.clone();

    let mut changed: Vec<&str> = Vec::new();
    let mut active: promotion_code::ActiveModel = promo.clone().into();

    if let Some(amount) = patch.credit_amount {
      active.credit_amount = Set(amount);
      changed.push("credit_amount");
    }
    if let Some(kind) = patch.promo_type {
      active.promo_type = Set(kind);
      changed.push("promo_type");
    }
    if let Some(flag) = patch.is_active {
      active.is_active = Set(flag);
      changed.push("is_active");
    }
    if let Some(quota) = patch.quota {
      active.quota = Set(quota);
      changed.push("quota");
    }
    if let Some(description) = patch.description {
      active.description = Set(description);
      changed.push("description");
    }
    if let Some(expires_at) = patch.expires_at {
      active.expires_at = Set(expires_at);
      changed.push("expires_at");
    }

    if changed.is_empty() {
      return Ok(promo);
    }

    let updated = active.update(self.db).await?;

    sv::Audit::new(self.db)
      .record(
        actor,
        ActivityAction::PromoUpdate,
        "promotion",
        id,
        json::json!({ "code": code, "updated": changed }),
      )
      .await;

    Ok(updated)
  }

  /// Hard-deletes an unused code. Once any redemption exists the code is
  /// part of ledger history and can only be deactivated.
  pub async fn delete(&self, id: &str, actor: &Actor) -> Result<()> {
    let txn = self.db.begin().await?;

    let promo = promotion_code::Entity::find_by_id(id)
      .one(&txn)
      .await?
      .ok_or(Error::CodeNotFound)?;

    let used = promotion_code_usage::Entity::find()
      .filter(promotion_code_usage::Column::PromotionCodeId.eq(id))
      .count(&txn)
      .await?;
    if used > 0 {
      return Err(Error::CodeInUse);
    }

    promotion_code::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;

    sv::Audit::new(self.db)
      .record(
        actor,
        ActivityAction::PromoDelete,
        "promotion",
        id,
        json::json!({ "code": promo.code }),
      )
      .await;

    Ok(())
  }

  /// Redeems `code` for one user, applying the grant at most once.
  pub async fn redeem(
    &self,
    code: &str,
    user_id: &str,
    actor: &Actor,
  ) -> Result<promotion_code_usage::Model> {
    let code = normalize(code);
    if code.is_empty() {
      return Err(Error::InvalidArgument("code must not be empty".into()));
    }

    let now = Utc::now().naive_utc();
    let txn = self.db.begin().await?;

    let promo = promotion_code::Entity::find()
      .filter(promotion_code::Column::Code.eq(&code))
      .one(&txn)
      .await?
      .ok_or(Error::CodeNotFound)?;

    if !promo.is_active {
      return Err(Promo::Inactive.into());
    }
    if promo.expires_at.is_some_and(|expires_at| expires_at < now) {
      return Err(Promo::Expired.into());
    }

    // A repeat caller is told so even when their own redemption was the
    // one that filled the quota.
    let redeemed = promotion_code_usage::Entity::find()
      .filter(promotion_code_usage::Column::PromotionCodeId.eq(&promo.id))
      .filter(promotion_code_usage::Column::UserId.eq(user_id))
      .one(&txn)
      .await?;
    if redeemed.is_some() {
      return Err(Promo::AlreadyRedeemed.into());
    }

    if let Some(quota) = promo.quota {
      let used = promotion_code_usage::Entity::find()
        .filter(promotion_code_usage::Column::PromotionCodeId.eq(&promo.id))
        .count(&txn)
        .await?;
      if used >= quota as u64 {
        return Err(Promo::QuotaExhausted.into());
      }
    }

    user::Entity::find_by_id(user_id)
      .one(&txn)
      .await?
      .ok_or(Error::UserNotFound)?;

    // The unique (code, user) index turns a racing insert into a reject.
    let usage = promotion_code_usage::ActiveModel {
      id: Set(Uuid::new_v4().to_string()),
      promotion_code_id: Set(promo.id.clone()),
      user_id: Set(user_id.to_string()),
      credit_amount: Set(promo.credit_amount),
      created_at: Set(now),
    }
    .insert(&txn)
    .await
    .map_err(|err| match err.sql_err() {
      Some(SqlErr::UniqueConstraintViolation(_)) => {
        Error::Promo(Promo::AlreadyRedeemed)
      }
      _ => Error::Database(err),
    })?;

    user::Entity::update_many()
      .col_expr(
        user::Column::ChargedCredit,
        Expr::col(user::Column::ChargedCredit).add(promo.credit_amount),
      )
      .filter(user::Column::Id.eq(user_id))
      .exec(&txn)
      .await?;

    credit_transaction::ActiveModel {
      id: Set(Uuid::new_v4().to_string()),
      user_id: Set(user_id.to_string()),
      amount: Set(promo.credit_amount),
      transaction_type: Set(TransactionType::Bonus),
      credit_type: Set(Some(CreditType::Charged)),
      description: Set(Some(format!("Promotion code {code}"))),
      metadata: Set(Some(json::json!({
        "promotion_code_id": promo.id,
        "code": code,
      }))),
      created_at: Set(now),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    sv::Audit::new(self.db)
      .record(
        actor,
        ActivityAction::PromoRedeem,
        "promotion",
        &promo.id,
        json::json!({
          "code": code,
          "user_id": user_id,
          "credit_amount": promo.credit_amount,
        }),
      )
      .await;

    Ok(usage)
  }
}

fn normalize(code: &str) -> String {
  code.trim().to_uppercase()
}
