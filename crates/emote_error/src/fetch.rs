//! Retrieval error types.

/// Kinds of retrieval failures.
///
/// Every transport failure is folded into one of these before it leaves the fetcher,
/// so callers never see a raw HTTP client error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum FetchErrorKind {
    /// The declared content type is not in the allowed set.
    #[display("Error: the file is not of an accepted type.")]
    InvalidFile,
    /// The URL could not be parsed.
    #[display("Error: Invalid URL.")]
    InvalidUrl(String),
    /// The remote responded with a non-success status.
    #[display("Error: the server responded with status code {}.", _0)]
    Status(u16),
    /// Retrieval exceeded its time bound.
    #[display("Error: retrieving the file took too long.")]
    Timeout,
    /// The body exceeded the download limit, in bytes.
    #[display("Error: the file is larger than the limit of {}.", crate::natural_size(*_0))]
    TooLarge(u64),
    /// Connection-level failure without a response.
    #[display("An error occurred while retrieving the file: {}", _0)]
    Transport(String),
}

/// Retrieval error with location tracking.
///
/// # Examples
///
/// ```
/// use emote_error::{FetchError, FetchErrorKind};
///
/// let err = FetchError::new(FetchErrorKind::Status(404));
/// assert_eq!(err.kind, FetchErrorKind::Status(404));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Fetch Error: {} at line {} in {}", kind, line, file)]
pub struct FetchError {
    /// The kind of error that occurred
    pub kind: FetchErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl FetchError {
    /// Create a new fetch error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: FetchErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Whether the remote timed out.
    pub fn is_timeout(&self) -> bool {
        self.kind == FetchErrorKind::Timeout
    }
}
