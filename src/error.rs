//! Error taxonomy shared by the ledger services

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("Database error: {0}")]
  Database(#[from] sea_orm::DbErr),

  #[error("User not found")]
  UserNotFound,

  #[error("Promotion code not found")]
  CodeNotFound,

  #[error("{0}")]
  InvalidArgument(String),

  #[error("Promotion code already exists")]
  DuplicateCode,

  #[error("Promotion code has recorded redemptions")]
  CodeInUse,

  #[error(transparent)]
  Promo(#[from] Promo),
}

/// Reasons a redemption attempt is rejected.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum Promo {
  #[error("Promotion code is not active")]
  Inactive,

  #[error("Promotion code has expired")]
  Expired,

  #[error("Promotion code quota exhausted")]
  QuotaExhausted,

  #[error("Promotion code already redeemed")]
  AlreadyRedeemed,
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let status = match &self {
      Error::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
      Error::UserNotFound | Error::CodeNotFound => StatusCode::NOT_FOUND,
      Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
      Error::DuplicateCode | Error::CodeInUse => StatusCode::CONFLICT,
      Error::Promo(Promo::Inactive | Promo::Expired) => StatusCode::BAD_REQUEST,
      Error::Promo(Promo::QuotaExhausted | Promo::AlreadyRedeemed) => {
        StatusCode::CONFLICT
      }
    };

    let message = match &self {
      Error::Database(err) => {
        tracing::error!("Database error: {err}");
        String::from("Database error")
      }
      other => other.to_string(),
    };

    let body = json::json!({
      "success": false,
      "error": message
    });

    (status, axum::Json(body)).into_response()
  }
}

pub type Result<T> = std::result::Result<T, Error>;
