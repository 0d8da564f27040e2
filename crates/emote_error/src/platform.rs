//! Chat platform error types.

/// Kinds of platform failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PlatformErrorKind {
    /// The platform answered with an error status.
    #[display("HTTP {}: {}", status, message)]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message from the platform.
        message: String,
    },
    /// The submitted payload was rejected before or during upload as malformed.
    #[display("Invalid payload: {}", _0)]
    InvalidPayload(String),
    /// The platform could not be reached or failed unexpectedly.
    #[display("Platform unavailable: {}", _0)]
    Unavailable(String),
}

/// Platform error with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Platform Error: {} at line {} in {}", kind, line, file)]
pub struct PlatformError {
    /// The kind of error that occurred
    pub kind: PlatformErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl PlatformError {
    /// Create a new platform error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PlatformErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
