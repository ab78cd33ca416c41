//! Data models for the balance timeline

pub mod cache_entry;
pub mod page;
pub mod timeline;
pub mod transaction;

// Re-export for convenience
pub use cache_entry::CacheEntry;
pub use page::TransactionPage;
pub use timeline::{BalancePoint, CalibrationOutcome, ResolutionStats, Timeline};
pub use transaction::{Direction, TransactionRecord};
