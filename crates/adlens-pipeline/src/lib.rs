//! Ingestion orchestration and the unified read view over stored ads.

pub mod catalog;
pub mod ingest;
pub mod view;

pub use catalog::{fetch_ad_by_id, fetch_ads, ReadError};
pub use ingest::{resolve_targets, run_ingest, IngestReport, TargetOutcome, TriggerSource};
pub use view::{assemble_ad_view, AdView, PLACEHOLDER_IMAGE};
