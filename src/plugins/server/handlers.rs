use std::{net::SocketAddr, sync::Arc};

use axum::{
  Json,
  extract::{ConnectInfo, FromRequestParts, Path, Query, State},
  http::{StatusCode, header, request::Parts},
};
use serde::{Deserialize, Serialize};

use crate::{
  entity::{
    SubscriptionTier, activity_log, credit_transaction, promotion_code,
    promotion_code_usage, user,
  },
  prelude::*,
  state::AppState,
  sv::{
    Actor, Page, Paged,
    audit::AuditFilter,
    credits::{CreditBalances, CreditBucket, TransactionFilter},
    promo::{CreatePromo, PromoDetail, PromoFilter, UpdatePromo},
    stats::Overview,
    user::{UpdateUser, UserFilter},
  },
};

/// Every mutating route wants to know who is acting. The dashboard proxy
/// authenticates the operator and forwards their identity in headers.
impl<S: Send + Sync> FromRequestParts<S> for Actor {
  type Rejection = (StatusCode, Json<json::Value>);

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> std::result::Result<Self, Self::Rejection> {
    let email = parts
      .headers
      .get("x-admin-email")
      .and_then(|v| v.to_str().ok())
      .map(str::trim)
      .filter(|v| !v.is_empty());

    let Some(email) = email else {
      return Err((
        StatusCode::UNAUTHORIZED,
        Json(json::json!({
          "success": false,
          "error": "Missing x-admin-email header",
        })),
      ));
    };

    let user_agent = parts
      .headers
      .get(header::USER_AGENT)
      .and_then(|v| v.to_str().ok())
      .map(ToString::to_string);

    Ok(Actor { email: email.to_string(), ip: client_ip(parts), user_agent })
  }
}

fn client_ip(parts: &Parts) -> Option<String> {
  let forwarded = parts
    .headers
    .get("x-forwarded-for")
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.split(',').next())
    .map(str::trim)
    .filter(|v| !v.is_empty());

  if let Some(ip) = forwarded {
    return Some(ip.to_string());
  }

  if let Some(ip) = parts.headers.get("x-real-ip").and_then(|v| v.to_str().ok())
  {
    return Some(ip.to_string());
  }

  parts
    .extensions
    .get::<ConnectInfo<SocketAddr>>()
    .map(|ConnectInfo(addr)| addr.ip().to_string())
}

pub async fn health() -> &'static str {
  "OK"
}

pub async fn overview(
  State(app): State<Arc<AppState>>,
) -> Result<Json<Overview>> {
  Ok(Json(app.sv().stats.overview().await?))
}

pub async fn list_users(
  State(app): State<Arc<AppState>>,
  Query(filter): Query<UserFilter>,
  Query(page): Query<Page>,
) -> Result<Json<Paged<user::Model>>> {
  Ok(Json(app.sv().users.list(filter, page).await?))
}

pub async fn get_user(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<user::Model>> {
  let user = app.sv().users.by_id(&id).await?.ok_or(Error::UserNotFound)?;
  Ok(Json(user))
}

pub async fn update_user(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
  actor: Actor,
  Json(patch): Json<UpdateUser>,
) -> Result<Json<user::Model>> {
  Ok(Json(app.sv().users.update(&id, patch, &actor).await?))
}

pub async fn deactivate_user(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
  actor: Actor,
) -> Result<Json<json::Value>> {
  app.sv().users.deactivate(&id, &actor).await?;
  Ok(Json(json::json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
pub struct ChangePlanReq {
  pub tier: SubscriptionTier,
  pub expiry: Option<DateTime>,
  pub reason: String,
}

pub async fn change_plan(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
  actor: Actor,
  Json(req): Json<ChangePlanReq>,
) -> Result<Json<user::Model>> {
  let user = app
    .sv()
    .users
    .change_plan(&id, req.tier, req.expiry, &req.reason, &actor)
    .await?;
  Ok(Json(user))
}

pub async fn balances(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<CreditBalances>> {
  Ok(Json(app.sv().credits.balances(&id).await?))
}

#[derive(Debug, Deserialize)]
pub struct AdjustCreditsReq {
  pub amount: i64,
  pub bucket: CreditBucket,
  pub reason: String,
}

pub async fn adjust_credits(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
  actor: Actor,
  Json(req): Json<AdjustCreditsReq>,
) -> Result<Json<CreditBalances>> {
  let balances = app
    .sv()
    .credits
    .adjust(&id, req.bucket, req.amount, &req.reason, &actor)
    .await?;
  Ok(Json(balances))
}

pub async fn user_transactions(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
  Query(filter): Query<TransactionFilter>,
  Query(page): Query<Page>,
) -> Result<Json<Paged<credit_transaction::Model>>> {
  let filter = TransactionFilter { user_id: Some(id), ..filter };
  Ok(Json(app.sv().credits.transactions(filter, page).await?))
}

pub async fn list_transactions(
  State(app): State<Arc<AppState>>,
  Query(filter): Query<TransactionFilter>,
  Query(page): Query<Page>,
) -> Result<Json<Paged<credit_transaction::Model>>> {
  Ok(Json(app.sv().credits.transactions(filter, page).await?))
}

pub async fn list_promotions(
  State(app): State<Arc<AppState>>,
  Query(filter): Query<PromoFilter>,
  Query(page): Query<Page>,
) -> Result<Json<Paged<PromoDetail>>> {
  Ok(Json(app.sv().promos.list(filter, page).await?))
}

pub async fn create_promotion(
  State(app): State<Arc<AppState>>,
  actor: Actor,
  Json(req): Json<CreatePromo>,
) -> Result<(StatusCode, Json<promotion_code::Model>)> {
  let promo = app.sv().promos.create(req, &actor).await?;
  Ok((StatusCode::CREATED, Json(promo)))
}

pub async fn get_promotion(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<PromoDetail>> {
  Ok(Json(app.sv().promos.by_id(&id).await?))
}

pub async fn update_promotion(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
  actor: Actor,
  Json(patch): Json<UpdatePromo>,
) -> Result<Json<promotion_code::Model>> {
  Ok(Json(app.sv().promos.update(&id, patch, &actor).await?))
}

pub async fn promotion_usages(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
  Query(page): Query<Page>,
) -> Result<Json<Paged<promotion_code_usage::Model>>> {
  Ok(Json(app.sv().promos.usages(&id, page).await?))
}

pub async fn delete_promotion(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
  actor: Actor,
) -> Result<Json<json::Value>> {
  app.sv().promos.delete(&id, &actor).await?;
  Ok(Json(json::json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
pub struct RedeemReq {
  pub code: String,
  pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct RedeemRes {
  pub usage: promotion_code_usage::Model,
  pub balances: CreditBalances,
}

pub async fn redeem(
  State(app): State<Arc<AppState>>,
  actor: Actor,
  Json(req): Json<RedeemReq>,
) -> Result<Json<RedeemRes>> {
  let sv = app.sv();
  let usage = sv.promos.redeem(&req.code, &req.user_id, &actor).await?;
  let balances = sv.credits.balances(&req.user_id).await?;
  Ok(Json(RedeemRes { usage, balances }))
}

pub async fn audit_logs(
  State(app): State<Arc<AppState>>,
  Query(filter): Query<AuditFilter>,
  Query(page): Query<Page>,
) -> Result<Json<Paged<activity_log::Model>>> {
  Ok(Json(app.sv().audit.entries(filter, page).await?))
}
