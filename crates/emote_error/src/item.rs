//! Per-item error types.
//!
//! An item error describes why one emote, archive entry or download in a batch
//! failed. It is turned into a message for the user and the batch continues.

use crate::FetchErrorKind;
use std::fmt;

/// Kinds of per-item failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemErrorKind {
    /// The payload is not an accepted image format.
    InvalidImage,
    /// The item exceeds a size budget.
    FileTooBig {
        /// Configured limit in bytes.
        limit: u64,
        /// Actual size in bytes.
        size: u64,
    },
    /// Downloading the item failed.
    Fetch(FetchErrorKind),
    /// The platform refused to create the emote.
    Rejected {
        /// HTTP status code returned by the platform.
        status: u16,
        /// Platform error message.
        message: String,
    },
    /// Converting the image to the other category's format failed.
    Conversion(String),
    /// The item alone does not fit in any archive shard.
    TooLargeForShard,
}

impl fmt::Display for ItemErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemErrorKind::InvalidImage => write!(
                f,
                "The file supplied was not a valid GIF, PNG, JPEG, or WEBP file."
            ),
            ItemErrorKind::FileTooBig { limit, size } => write!(
                f,
                "file too big. The limit is {} but this file is {}.",
                natural_size(*limit),
                natural_size(*size)
            ),
            ItemErrorKind::Fetch(kind) => write!(f, "{}", kind),
            ItemErrorKind::Rejected { status, message } => write!(
                f,
                "An error occurred while creating the emote:\n{}: {}",
                status, message
            ),
            ItemErrorKind::Conversion(reason) => {
                write!(f, "Failed to convert the image: {}", reason)
            }
            ItemErrorKind::TooLargeForShard => write!(
                f,
                "could not be added because it alone would exceed the file size limit."
            ),
        }
    }
}

/// Per-item error with the offending item's name and location tracking.
///
/// # Examples
///
/// ```
/// use emote_error::{ItemError, ItemErrorKind};
///
/// let err = ItemError::new("blobcat", ItemErrorKind::InvalidImage);
/// assert!(err.user_message().starts_with("blobcat: "));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Item Error: {}: {} at line {} in {}", item, kind, line, file)]
pub struct ItemError {
    /// Name of the item that failed
    pub item: String,
    /// The kind of error that occurred
    pub kind: ItemErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ItemError {
    /// Create a new item error with automatic location tracking.
    #[track_caller]
    pub fn new(item: impl Into<String>, kind: ItemErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            item: item.into(),
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Message suitable for sending to the user.
    pub fn user_message(&self) -> String {
        format!("{}: {}", self.item, self.kind)
    }
}

/// Human-readable decimal size, e.g. `50.0 MB`.
///
/// # Examples
///
/// ```
/// use emote_error::natural_size;
///
/// assert_eq!(natural_size(1), "1 Byte");
/// assert_eq!(natural_size(512), "512 Bytes");
/// assert_eq!(natural_size(50_000_000), "50.0 MB");
/// ```
pub fn natural_size(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["kB", "MB", "GB", "TB", "PB", "EB"];

    match bytes {
        1 => "1 Byte".to_string(),
        0..1000 => format!("{} Bytes", bytes),
        _ => {
            let mut value = bytes as f64 / 1000.0;
            let mut unit = 0;
            while value >= 1000.0 && unit < UNITS.len() - 1 {
                value /= 1000.0;
                unit += 1;
            }
            format!("{:.1} {}", value, UNITS[unit])
        }
    }
}
