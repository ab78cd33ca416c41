//! Export sinks for finished timelines

pub mod composite;
pub mod console;
pub mod csv_sink;
pub mod jsonl;
pub mod rows;

// Re-export for convenience
pub use composite::CompositeSink;
pub use console::ConsoleSink;
pub use csv_sink::{CsvSink, TailCsvSink};
pub use jsonl::JsonlSink;
pub use rows::{TailRow, TimelineRow};
