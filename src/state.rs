use migration::Migrator;

use crate::{prelude::*, sv};

#[derive(Debug, Clone)]
pub struct Config {
  /// Sustained requests per second allowed per client IP.
  pub rate_per_second: u64,
  /// Burst allowance on top of the sustained rate.
  pub rate_burst: u32,
}

impl Default for Config {
  fn default() -> Self {
    Self { rate_per_second: 2, rate_burst: 100 }
  }
}

pub struct Services<'a> {
  pub users: sv::Users<'a>,
  pub credits: sv::Credits<'a>,
  pub promos: sv::Promos<'a>,
  pub audit: sv::Audit<'a>,
  pub stats: sv::Stats<'a>,
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub config: Config,
}

impl AppState {
  pub async fn new(db_url: &str) -> Self {
    Self::with_config(db_url, Config::default()).await
  }

  pub async fn with_config(db_url: &str, config: Config) -> Self {
    info!("Connecting to database...");
    let db =
      Database::connect(db_url).await.expect("Failed to connect to database");

    info!("Running migrations...");
    Migrator::up(&db, None).await.expect("Failed to run migrations");

    Self { db, config }
  }

  pub fn sv(&self) -> Services<'_> {
    Services {
      users: sv::Users::new(&self.db),
      credits: sv::Credits::new(&self.db),
      promos: sv::Promos::new(&self.db),
      audit: sv::Audit::new(&self.db),
      stats: sv::Stats::new(&self.db),
    }
  }
}
