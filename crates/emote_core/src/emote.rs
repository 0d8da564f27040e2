//! Managed emotes and their categories.

use crate::{EmoteId, GuildId, emote_url};
use chrono::{DateTime, Utc};
use derive_getters::Getters;
use emote_error::{BatchError, BatchErrorKind};
use std::fmt;
use std::str::FromStr;

/// Mutually exclusive emote category, each with an independent quota.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::EnumIter,
    derive_more::Display,
)]
pub enum Category {
    /// Still images (PNG, JPEG, WEBP)
    #[display("static")]
    Static,
    /// Animated images (GIF)
    #[display("animated")]
    Animated,
}

impl Category {
    /// Category for an emote's animated flag.
    pub fn from_animated(animated: bool) -> Self {
        if animated {
            Category::Animated
        } else {
            Category::Static
        }
    }

    /// The other category.
    pub fn other(self) -> Self {
        match self {
            Category::Static => Category::Animated,
            Category::Animated => Category::Static,
        }
    }

    /// File extension used when exporting emotes of this category.
    pub fn extension(self) -> &'static str {
        match self {
            Category::Static => "png",
            Category::Animated => "gif",
        }
    }
}

/// A named custom emote belonging to a guild.
///
/// Names are not unique within a guild.
#[derive(Debug, Clone, PartialEq, Eq, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct ManagedEmote {
    /// Emote identifier
    id: EmoteId,
    /// Display name
    name: String,
    /// Whether the emote is animated
    animated: bool,
    /// Where the image can be downloaded
    url: String,
    /// When the emote was created
    created_at: DateTime<Utc>,
    /// Owning guild
    guild_id: GuildId,
    /// Whether the emote must be wrapped in colons, i.e. can be looked up by name
    require_colons: bool,
}

impl ManagedEmote {
    /// Create an emote with the CDN URL and creation time derived from its id.
    pub fn new(id: EmoteId, name: impl Into<String>, animated: bool, guild_id: GuildId) -> Self {
        Self {
            id,
            name: name.into(),
            animated,
            url: emote_url(id, animated),
            created_at: id.created_at(),
            guild_id,
            require_colons: true,
        }
    }

    /// The emote's category.
    pub fn category(&self) -> Category {
        Category::from_animated(self.animated)
    }

    /// Raw form with the colons escaped, e.g. `\<:blobcat:1234>`.
    pub fn escaped(&self) -> String {
        self.to_string().replace(':', r"\:")
    }
}

impl fmt::Display for ManagedEmote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.animated { "a" } else { "" };
        write!(f, "<{}:{}:{}>", prefix, self.name, self.id)
    }
}

/// Filter selecting emotes by category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, derive_more::Display)]
pub enum EmoteFilter {
    /// Every emote
    #[default]
    #[display("all")]
    All,
    /// Static emotes only
    #[display("static")]
    Static,
    /// Animated emotes only
    #[display("animated")]
    Animated,
}

impl EmoteFilter {
    /// Whether the emote passes this filter.
    pub fn matches(&self, emote: &ManagedEmote) -> bool {
        match self {
            EmoteFilter::All => true,
            EmoteFilter::Static => !emote.animated,
            EmoteFilter::Animated => emote.animated,
        }
    }
}

impl FromStr for EmoteFilter {
    type Err = BatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(EmoteFilter::All),
            "static" => Ok(EmoteFilter::Static),
            "animated" => Ok(EmoteFilter::Animated),
            other => Err(BatchError::new(BatchErrorKind::BadArgument(format!(
                "`{}` is not a valid emote type. Use `all`, `static` or `animated`.",
                other
            )))),
        }
    }
}
