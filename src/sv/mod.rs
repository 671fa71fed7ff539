pub mod audit;
pub mod credits;
pub mod promo;
pub mod stats;
pub mod user;

pub use audit::{ActivityAction, Actor, Audit};
pub use credits::Credits;
pub use promo::Promos;
pub use stats::Stats;
pub use user::Users;

use sea_orm::{FromQueryResult, ItemsAndPagesNumber, Select};
use serde::{Deserialize, Serialize};

use crate::prelude::*;

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;

/// One-based page selector with a clamped page size.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct Page {
  pub page: u64,
  pub per_page: u64,
}

impl Default for Page {
  fn default() -> Self {
    Self { page: 1, per_page: DEFAULT_PAGE_SIZE }
  }
}

impl Page {
  pub fn number(self) -> u64 {
    self.page.max(1)
  }

  pub fn limit(self) -> u64 {
    self.per_page.clamp(1, MAX_PAGE_SIZE)
  }
}

#[derive(Debug, Serialize)]
pub struct Paged<T> {
  pub items: Vec<T>,
  pub total: u64,
  pub page: u64,
  pub pages: u64,
}

pub(crate) async fn paged<E>(
  db: &DatabaseConnection,
  query: Select<E>,
  page: Page,
) -> Result<Paged<E::Model>>
where
  E: EntityTrait,
  E::Model: FromQueryResult + Send + Sync,
{
  let paginator = query.paginate(db, page.limit());
  let ItemsAndPagesNumber { number_of_items, number_of_pages } =
    paginator.num_items_and_pages().await?;
  let items = paginator.fetch_page(page.number() - 1).await?;

  Ok(Paged {
    items,
    total: number_of_items,
    page: page.number(),
    pages: number_of_pages,
  })
}

/// Distinguishes an absent patch field from an explicit null.
pub(crate) fn patch_field<'de, T, D>(
  de: D,
) -> std::result::Result<Option<T>, D::Error>
where
  T: Deserialize<'de>,
  D: serde::Deserializer<'de>,
{
  T::deserialize(de).map(Some)
}
