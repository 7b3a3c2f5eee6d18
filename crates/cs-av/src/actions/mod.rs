//! ffmpeg actions: sub-range extraction and stream-copy concatenation.

mod concat;
mod extract;

pub use concat::{concat_args, concat_copy};
pub use extract::{extract_args, extract_range};
