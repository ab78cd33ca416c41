//! Balance Timeline Library
//!
//! Reconstructs the balance history of an Idena address from the explorer
//! API: pages the address transaction list, resolves each transaction's
//! block height and timestamp (with a durable per-hash cache), folds the
//! transactions into a running balance, and optionally anchors the series to
//! the live balance.

// Public modules - these are the API surface
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod providers;
pub mod tracker;
pub mod traits;
pub mod utils;

// Re-export commonly used items for easier access
pub use config::{CalibrationPolicy, TimelineConfig};
pub use error::{ApiError, RecordError, Result, TimelineError};
pub use models::{
    BalancePoint, CacheEntry, CalibrationOutcome, Direction, ResolutionStats, Timeline,
    TransactionPage, TransactionRecord,
};
pub use traits::{DetailCache, ExplorerApi, TimelineSink};
pub use providers::{FileDetailCache, IdenaApi, MemoryDetailCache};
pub use handlers::{CompositeSink, ConsoleSink, CsvSink, JsonlSink, TailCsvSink};
pub use tracker::TimelineTracker;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
