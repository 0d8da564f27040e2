//! Snapshots of posted messages, for finding the emotes they use.

use crate::{ChannelId, CustomEmoteRef, EmoteId, GuildId, MessageId, emote_url};
use emote_error::{BatchError, BatchErrorKind};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static MESSAGE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https://(?:[a-z]+\.)?discord(?:app)?\.com/channels/(?P<guild>[0-9]{15,21})/(?P<channel>[0-9]{15,21})/(?P<message>[0-9]{15,21})$",
    )
    .expect("message link pattern is valid")
});

/// An emoji a message was reacted with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReactionEmoji {
    /// A guild's custom emote
    Custom {
        /// Emote name
        name: String,
        /// Emote identifier
        id: EmoteId,
        /// Whether the emote is animated
        animated: bool,
    },
    /// A standard unicode emoji
    Unicode(String),
}

/// Text and reactions of a posted message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageSnapshot {
    /// Raw message text
    pub content: String,
    /// Reactions in the order the platform reports them
    pub reactions: Vec<ReactionEmoji>,
}

impl MessageSnapshot {
    /// Custom emotes used in the text, without repeats, in order of first use.
    pub fn content_emotes(&self) -> Vec<CustomEmoteRef> {
        let mut seen = Vec::new();
        for reference in CustomEmoteRef::find_all(&self.content) {
            if !seen.contains(&reference) {
                seen.push(reference);
            }
        }
        seen
    }
}

/// Location of a message, as copied from a client's "Copy Message Link".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageLink {
    /// Guild the message was posted in
    pub guild: GuildId,
    /// Channel the message was posted in
    pub channel: ChannelId,
    /// The message itself
    pub message: MessageId,
}

impl MessageLink {
    /// Parse a message link.
    ///
    /// # Examples
    ///
    /// ```
    /// use emote_core::{MessageLink, MessageId};
    ///
    /// let link = MessageLink::parse(
    ///     "https://discord.com/channels/111111111111111111/222222222222222222/333333333333333333",
    /// )
    /// .unwrap();
    /// assert_eq!(link.message, MessageId(333333333333333333));
    /// assert!(MessageLink::parse("https://example.com/channels/1/2/3").is_none());
    /// ```
    pub fn parse(url: &str) -> Option<Self> {
        let captures = MESSAGE_LINK.captures(url.trim())?;
        Some(Self {
            guild: GuildId(captures["guild"].parse().ok()?),
            channel: ChannelId(captures["channel"].parse().ok()?),
            message: MessageId(captures["message"].parse().ok()?),
        })
    }
}

/// Which parts of a message to look at when identifying emotes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum IdentifyScope {
    /// Text and reactions
    #[default]
    All,
    /// Text only
    Message,
    /// Reactions only
    Reaction,
}

impl IdentifyScope {
    /// Whether emotes in the message text are included.
    pub fn includes_content(self) -> bool {
        matches!(self, IdentifyScope::All | IdentifyScope::Message)
    }

    /// Whether reactions are included.
    pub fn includes_reactions(self) -> bool {
        matches!(self, IdentifyScope::All | IdentifyScope::Reaction)
    }
}

impl FromStr for IdentifyScope {
    type Err = BatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(IdentifyScope::All),
            "message" | "messages" => Ok(IdentifyScope::Message),
            "reaction" | "reactions" => Ok(IdentifyScope::Reaction),
            other => Err(BatchError::new(BatchErrorKind::BadArgument(format!(
                "`{}` is not a valid place to look. Use `all`, `message` or `reaction`.",
                other
            )))),
        }
    }
}

impl fmt::Display for ReactionEmoji {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReactionEmoji::Custom { name, id, animated } => {
                write!(f, ":{}: {}", name, emote_url(*id, *animated))
            }
            ReactionEmoji::Unicode(emoji) => write!(f, "{} (Unicode emoji)", emoji),
        }
    }
}
