//! Archive container error types.

/// Kinds of archive container errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ArchiveErrorKind {
    /// The bytes are neither a zip nor a tar container.
    #[display("the file is not a zip or tar archive")]
    UnknownFormat,
    /// The container was recognised but its structure is unreadable.
    #[display("the archive is corrupt: {}", _0)]
    Corrupt(String),
    /// Writing an archive failed.
    #[display("failed to write archive: {}", _0)]
    Write(String),
}

/// Archive error with location tracking.
///
/// # Examples
///
/// ```
/// use emote_error::{ArchiveError, ArchiveErrorKind};
///
/// let err = ArchiveError::new(ArchiveErrorKind::UnknownFormat);
/// assert!(format!("{}", err).contains("zip or tar"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Archive Error: {} at line {} in {}", kind, line, file)]
pub struct ArchiveError {
    /// The kind of error that occurred
    pub kind: ArchiveErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ArchiveError {
    /// Create a new archive error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ArchiveErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl From<std::io::Error> for ArchiveError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(ArchiveErrorKind::Write(err.to_string()))
    }
}
