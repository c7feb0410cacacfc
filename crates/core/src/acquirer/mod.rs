//! Audio acquisition.
//!
//! Drives the process supervisor to fetch and transcode the source into a
//! temporary audio artifact (plus optional thumbnail) inside a per-job scratch
//! directory.

mod error;
mod traits;
mod types;
mod ytdlp;

pub use error::AcquireError;
pub use traits::Acquirer;
pub use types::Acquisition;
pub use ytdlp::{AcquirerConfig, YtdlpAcquirer};
