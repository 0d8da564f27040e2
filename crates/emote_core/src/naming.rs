//! Emote naming helpers and custom emote reference parsing.

use crate::EmoteId;
use regex::Regex;
use std::sync::LazyLock;

static CUSTOM_EMOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?P<animated>a?):(?P<name>[A-Za-z0-9_]{2,32}):(?P<id>[0-9]{15,21})>")
        .expect("custom emote pattern is valid")
});

static MENTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@(everyone|here|[!&]?[0-9]{15,21})").expect("mention pattern is valid")
});

/// CDN URL of a custom emote's image.
pub fn emote_url(id: EmoteId, animated: bool) -> String {
    let extension = if animated { "gif" } else { "png" };
    format!("https://cdn.discordapp.com/emojis/{}.{}", id, extension)
}

/// A custom emote written in message syntax, e.g. `<a:partyparrot:1234>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CustomEmoteRef {
    /// Whether the emote is animated
    pub animated: bool,
    /// Emote name
    pub name: String,
    /// Emote identifier
    pub id: EmoteId,
}

impl CustomEmoteRef {
    /// Parse a reference at the start of `text`.
    ///
    /// # Examples
    ///
    /// ```
    /// use emote_core::CustomEmoteRef;
    ///
    /// let parsed = CustomEmoteRef::parse("<a:partyparrot:379127000398430219>").unwrap();
    /// assert!(parsed.animated);
    /// assert_eq!(parsed.name, "partyparrot");
    /// assert!(CustomEmoteRef::parse("partyparrot").is_none());
    /// ```
    pub fn parse(text: &str) -> Option<Self> {
        let captures = CUSTOM_EMOTE.captures(text)?;
        if captures.get(0)?.start() != 0 {
            return None;
        }
        Self::from_captures(&captures)
    }

    /// Every reference in `text`, in order of appearance.
    pub fn find_all(text: &str) -> Vec<Self> {
        CUSTOM_EMOTE
            .captures_iter(text)
            .filter_map(|captures| Self::from_captures(&captures))
            .collect()
    }

    /// CDN URL of the referenced emote's image.
    pub fn url(&self) -> String {
        emote_url(self.id, self.animated)
    }

    fn from_captures(captures: &regex::Captures<'_>) -> Option<Self> {
        let id = captures["id"].parse::<u64>().ok()?;
        Some(Self {
            animated: !captures["animated"].is_empty(),
            name: captures["name"].to_string(),
            id: EmoteId(id),
        })
    }
}

/// Final component of a `/`-separated path.
pub fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Turn a filename into an emote name the way the platform does on upload.
///
/// The extension is dropped, anything after the last `-` is treated as a
/// discriminator and removed, and spaces are stripped.
///
/// # Examples
///
/// ```
/// use emote_core::format_emote_filename;
///
/// assert_eq!(format_emote_filename("blobcat.png"), "blobcat");
/// assert_eq!(format_emote_filename("blobcat-2.png"), "blobcat");
/// assert_eq!(format_emote_filename("party parrot.gif"), "partyparrot");
/// ```
pub fn format_emote_filename(filename: &str) -> String {
    let stem = match filename.rfind('.') {
        Some(index) if !filename[..index].chars().all(|c| c == '.') => &filename[..index],
        _ => filename,
    };

    let name = match stem.rsplit_once('-') {
        Some((left, _)) if !left.is_empty() => left,
        Some((_, right)) => right,
        None => stem,
    };

    name.replace(' ', "")
}

/// Strip the `<...>` that suppresses link embeds.
pub fn strip_angle_brackets(text: &str) -> &str {
    text.strip_prefix('<')
        .and_then(|inner| inner.strip_suffix('>'))
        .unwrap_or(text)
}

/// Neutralise `@everyone`, `@here` and user/role mentions in outgoing text.
///
/// # Examples
///
/// ```
/// use emote_core::escape_mentions;
///
/// assert_eq!(escape_mentions("hi @everyone"), "hi @\u{200b}everyone");
/// ```
pub fn escape_mentions(text: &str) -> String {
    MENTION.replace_all(text, "@\u{200b}$1").into_owned()
}
