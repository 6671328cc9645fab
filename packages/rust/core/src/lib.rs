//! Conversion and enrichment passes for the MeepleVault catalog.
//!
//! This crate provides:
//! - [`normalize`] — CSV rows → canonical [`Game`](meeplevault_shared::Game)
//!   records, per-item store files, and the merged catalog artifact
//! - [`enrich`] — the fill pass: select records with missing fields, consult
//!   the external lookup collaborator, and merge under the
//!   "existing non-empty value wins" policy

pub mod enrich;
pub mod normalize;

pub use enrich::{FillProgress, FillResult, SilentProgress, run_fill};
pub use normalize::{ConvertResult, run_convert};
