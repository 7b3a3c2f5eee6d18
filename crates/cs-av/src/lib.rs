//! # cs-av
//!
//! Audio/video tooling for the clipshare pipeline.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`ToolRegistry`]) -- find and cache paths to ffmpeg
//!   and ffprobe.
//! - **Command execution** ([`ToolCommand`]) -- async builder with timeout
//!   support; the child process is killed when the timeout fires.
//! - **Probing** ([`Prober`], [`FfprobeProber`]) -- duration and size of a
//!   media file.
//! - **Transcoding** ([`Transcoder`], [`FfmpegTranscoder`]) -- sub-range
//!   extraction and stream-copy concatenation.
//! - **Scoped files** ([`PendingOutput`], [`ConcatManifest`]) -- outputs and
//!   manifests that delete themselves unless explicitly kept.

pub mod actions;
pub mod command;
pub mod output;
pub mod probe;
pub mod tools;
pub mod transcoder;

// ---- Re-exports for convenience ----

pub use command::{ToolCommand, ToolOutput};
pub use output::{ConcatManifest, PendingOutput};
pub use probe::{FfprobeProber, Prober};
pub use tools::{ToolConfig, ToolInfo, ToolRegistry};
pub use transcoder::{FfmpegTranscoder, Transcoder};
