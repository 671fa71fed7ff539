//! TIRO admin backend - credit and promotion ledger
//!
//! Architecture:
//! - SeaORM for database access (SQLite)
//! - Axum for the admin HTTP API with rate limiting
//! - Tokio for async runtime

mod entity;
mod error;
mod plugins;
mod prelude;
mod state;
mod sv;
mod utils;

use std::{env, sync::Arc};

use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{prelude::*, state::AppState};

#[tokio::main]
async fn main() {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "tiro_admin=debug,tower_http=debug,axum=trace,sea_orm=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let db_url = env::var("DATABASE_URL")
    .unwrap_or_else(|_| "sqlite:tiro-admin.db?mode=rwc".into());

  info!("Starting TIRO admin backend v{}", env!("CARGO_PKG_VERSION"));

  let app = Arc::new(AppState::new(&db_url).await);

  plugins::App::new().register(plugins::server::Plugin).run(app).await;

  if let Err(err) = tokio::signal::ctrl_c().await {
    error!("Failed to listen for shutdown signal: {err}");
  }
  info!("Shutting down");
}
