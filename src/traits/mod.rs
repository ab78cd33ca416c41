//! Core traits for the timeline pipeline

pub mod data_provider;
pub mod detail_cache;
pub mod event_handler;

// Re-export for convenience
pub use data_provider::ExplorerApi;
pub use detail_cache::DetailCache;
pub use event_handler::TimelineSink;
