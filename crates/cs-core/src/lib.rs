//! cs-core: shared types, IDs, errors, and configuration.
//!
//! This crate is the foundational dependency for all other cs-* crates,
//! providing type-safe identifiers, a unified error type with the HTTP
//! status mapping the API exposes, media size/duration helpers, and the
//! immutable application configuration.

pub mod config;
pub mod error;
pub mod ids;
pub mod media;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, ErrorKind, Result};
pub use ids::*;
pub use media::*;
