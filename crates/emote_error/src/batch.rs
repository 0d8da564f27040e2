//! Batch-aborting error types.

/// Conditions that end a whole operation.
///
/// The display text of each variant is meant for the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum BatchErrorKind {
    /// No category has a free emote slot.
    #[display("This server is out of emote slots.")]
    QuotaExhausted,
    /// The archive container itself could not be read.
    #[display("Error: {}", _0)]
    ArchiveFormat(String),
    /// The command arguments are unusable.
    #[display("{}", _0)]
    BadArgument(String),
    /// No emote matched the given name.
    #[display("An emote called `{}` does not exist in this server.", _0)]
    EmoteNotFound(String),
    /// The user did not answer a prompt in time.
    #[display("Sorry, you took too long. Try again.")]
    TookTooLong,
    /// The user picked a number outside the offered list.
    #[display("{} is not a valid choice. Pick a number from 1 to {}.", choice, max)]
    InvalidChoice {
        /// Number the user sent.
        choice: i64,
        /// Highest valid choice.
        max: usize,
    },
    /// The prompt was abandoned because the component is shutting down.
    #[display("The request was cancelled.")]
    Cancelled,
    /// Another transfer ran in this server too recently.
    #[display("This command has a cooldown. Try again in {} seconds.", retry_after_secs)]
    Cooldown {
        /// Seconds until the next transfer is allowed.
        retry_after_secs: u64,
    },
    /// The command needs a server.
    #[display("Sorry, this command may only be used in a server.")]
    NoPrivateMessage,
}

/// Batch-aborting error with location tracking.
///
/// # Examples
///
/// ```
/// use emote_error::{BatchError, BatchErrorKind};
///
/// let err = BatchError::new(BatchErrorKind::QuotaExhausted);
/// assert_eq!(err.user_message(), "This server is out of emote slots.");
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Batch Error: {} at line {} in {}", kind, line, file)]
pub struct BatchError {
    /// The kind of error that occurred
    pub kind: BatchErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl BatchError {
    /// Create a new batch error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: BatchErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Message suitable for sending to the user.
    pub fn user_message(&self) -> String {
        self.kind.to_string()
    }
}
