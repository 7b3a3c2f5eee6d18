//! # cs-pipeline
//!
//! Orchestration of the clip processing pipeline.
//!
//! - **[`upload`]** -- extension whitelist, streaming size ceiling, probed
//!   duration window; rejected files are removed.
//! - **[`trim`]** -- bounds check, sub-range extraction, re-probe.
//! - **[`merge`]** -- existence check, ordered stream-copy concatenation
//!   through a transient manifest, re-probe.
//! - **[`share`]** -- unguessable slugs and the expiry gate in front of
//!   streaming.
//!
//! Engines take a [`PipelineContext`] built once at startup; they return
//! [`cs_core::AssetFields`] and leave persistence to the caller.

pub mod context;
pub mod merge;
pub mod share;
pub mod trim;
pub mod upload;

#[cfg(test)]
mod testing;

pub use context::PipelineContext;
