//! Error types for the emote manager.
//!
//! This crate provides the error types used throughout the emote manager workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Two kinds deserve special mention because they decide control flow in batch
//! operations:
//! - [`ItemError`] is reported for a single item, and the batch moves on.
//! - [`BatchError`] aborts the whole operation and is shown to the user verbatim.
//!
//! There is deliberately no conversion between the two.
//!
//! # Examples
//!
//! ```
//! use emote_error::{BatchError, BatchErrorKind, EmoteResult};
//!
//! fn check_slots(free: usize) -> EmoteResult<()> {
//!     if free == 0 {
//!         Err(BatchError::new(BatchErrorKind::QuotaExhausted))?
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_slots(0).is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod archive;
mod batch;
mod config;
mod error;
mod fetch;
mod item;
mod platform;

pub use archive::{ArchiveError, ArchiveErrorKind};
pub use batch::{BatchError, BatchErrorKind};
pub use config::ConfigError;
pub use error::{EmoteError, EmoteErrorKind, EmoteResult};
pub use fetch::{FetchError, FetchErrorKind};
pub use item::{ItemError, ItemErrorKind, natural_size};
pub use platform::{PlatformError, PlatformErrorKind};
