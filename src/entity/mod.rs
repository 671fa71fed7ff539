//! SeaORM entity definitions

pub mod activity_log;
pub mod credit_transaction;
pub mod promotion_code;
pub mod promotion_code_usage;
pub mod user;

pub use credit_transaction::{CreditType, TransactionType};
pub use promotion_code::PromoType;
pub use user::SubscriptionTier;
