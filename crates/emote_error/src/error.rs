//! Top-level error wrapper types.

use crate::{ArchiveError, BatchError, ConfigError, FetchError, ItemError, PlatformError};

/// Every error the emote manager can surface.
///
/// # Examples
///
/// ```
/// use emote_error::{EmoteError, FetchError, FetchErrorKind};
///
/// let err: EmoteError = FetchError::new(FetchErrorKind::Timeout).into();
/// assert!(format!("{}", err).contains("Fetch Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum EmoteErrorKind {
    /// Operation-ending error
    #[from(BatchError)]
    Batch(BatchError),
    /// Single item failure that escaped its batch
    #[from(ItemError)]
    Item(ItemError),
    /// Retrieval error
    #[from(FetchError)]
    Fetch(FetchError),
    /// Archive error
    #[from(ArchiveError)]
    Archive(ArchiveError),
    /// Chat platform error
    #[from(PlatformError)]
    Platform(PlatformError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Emote manager error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Emote Manager Error: {}", _0)]
pub struct EmoteError(Box<EmoteErrorKind>);

impl EmoteError {
    /// Create a new error from a kind.
    pub fn new(kind: EmoteErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &EmoteErrorKind {
        &self.0
    }

    /// The batch error, if this error ends an operation with a user-facing reason.
    pub fn as_batch(&self) -> Option<&BatchError> {
        match self.kind() {
            EmoteErrorKind::Batch(err) => Some(err),
            _ => None,
        }
    }
}

// Generic From implementation for any type that converts to EmoteErrorKind
impl<T> From<T> for EmoteError
where
    T: Into<EmoteErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for emote manager operations.
pub type EmoteResult<T> = std::result::Result<T, EmoteError>;
