mod handlers;

use std::{net::SocketAddr, sync::Arc};

use async_trait::async_trait;
use axum::{
  Router,
  routing::{get, patch, post},
};
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

use crate::{prelude::*, state::AppState};

pub struct Plugin;

#[async_trait]
impl super::Plugin for Plugin {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let governor_conf = Arc::new(
      GovernorConfigBuilder::default()
        .per_second(app.config.rate_per_second)
        .burst_size(app.config.rate_burst)
        .finish()
        .context("Failed to build rate limiter config")?,
    );

    let limiter = governor_conf.limiter().clone();

    let router = Router::new()
      .route("/health", get(handlers::health))
      .route("/api/stats/overview", get(handlers::overview))
      .route("/api/users", get(handlers::list_users))
      .route(
        "/api/users/{id}",
        get(handlers::get_user)
          .patch(handlers::update_user)
          .delete(handlers::deactivate_user),
      )
      .route("/api/users/{id}/plan", patch(handlers::change_plan))
      .route(
        "/api/users/{id}/credits",
        get(handlers::balances).post(handlers::adjust_credits),
      )
      .route("/api/users/{id}/transactions", get(handlers::user_transactions))
      .route("/api/transactions", get(handlers::list_transactions))
      .route(
        "/api/promotions",
        get(handlers::list_promotions).post(handlers::create_promotion),
      )
      .route(
        "/api/promotions/{id}",
        get(handlers::get_promotion)
          .patch(handlers::update_promotion)
          .delete(handlers::delete_promotion),
      )
      .route("/api/promotions/{id}/usages", get(handlers::promotion_usages))
      .route("/api/promotions/redeem", post(handlers::redeem))
      .route("/api/audit-logs", get(handlers::audit_logs))
      .layer(
        ServiceBuilder::new()
          .layer(TraceLayer::new_for_http())
          .layer(GovernorLayer::new(governor_conf))
          .layer(
            CorsLayer::new()
              .allow_origin(Any)
              .allow_methods(Any)
              .allow_headers(Any),
          ),
      )
      .with_state(app)
      .into_make_service_with_connect_info::<SocketAddr>();

    let port: u16 =
      std::env::var("PORT").ok().and_then(|p| p.parse().ok()).unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener =
      tokio::net::TcpListener::bind(addr).await.context("Failed to bind")?;
    info!("HTTP server listening on {addr}");

    let limiter = async {
      loop {
        tokio::time::sleep(Duration::from_secs(60)).await;
        limiter.retain_recent();
      }
    };

    let server = async {
      axum::serve(listener, router).await.context("Axum server error")
    };

    tokio::select! {
      result = server => {
        match &result {
          Ok(_) => info!("Server stopped gracefully"),
          Err(err) => error!("Server stopped with error: {err}"),
        }
        result
      }
      _ = limiter => {
        error!("Rate limiter cleaner stopped unexpectedly!");
        Ok(())
      }
    }
  }
}
