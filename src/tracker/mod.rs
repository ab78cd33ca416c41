//! The fetch, resolve, reconstruct and calibrate pipeline

pub mod calibrator;
pub mod fetcher;
pub mod pager;
pub mod reconstructor;
pub mod timeline_tracker;

pub use calibrator::Calibrator;
pub use fetcher::{CollectedHashes, Resolution, ResolvedDetails, TransactionFetcher};
pub use pager::{StopReason, TransactionPager};
pub use reconstructor::{build_records, reconstruct, RecordSet, RelativeSeries};
pub use timeline_tracker::TimelineTracker;
