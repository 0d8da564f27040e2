//! Invocation context handed to commands by the platform adapter.

use crate::{ChannelId, GuildId, MessageId, UserId};
use std::fmt;

/// The user who invoked a command.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Author {
    /// User identifier
    pub id: UserId,
    /// Display tag, e.g. `someone#1234`
    pub name: String,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// A file attached to the invoking message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Download URL
    pub url: String,
    /// Original filename
    pub filename: String,
}

/// Where and by whom a command was invoked.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Guild the command ran in, `None` in direct messages
    pub guild: Option<GuildId>,
    /// Channel the command ran in
    pub channel: ChannelId,
    /// The invoking message
    pub message: MessageId,
    /// Invoking user
    pub author: Author,
    /// Files attached to the invoking message
    pub attachments: Vec<Attachment>,
}
