//! Static HTML page listing a guild's emotes.

use chrono::{DateTime, Utc};
use emote_core::ManagedEmote;
use std::fmt::Write;

const STYLE: &str = "body { background-color: #36393f; color: #dcddde; font-family: sans-serif; }\n\
    h1 { font-weight: normal; }\n\
    img { width: 48px; height: 48px; object-fit: contain; margin: 4px; }\n";

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
    out
}

/// Render an HTML page showing every emote, titled after the guild and `generated_at`.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use emote_core::{EmoteId, GuildId, ManagedEmote};
/// use emote_transfer::render_gallery;
///
/// let emotes = [ManagedEmote::new(EmoteId(7), "blob", false, GuildId(1))];
/// let when = Utc.with_ymd_and_hms(2024, 3, 9, 18, 5, 0).unwrap();
/// let page = render_gallery("Blob Land", &emotes, when);
/// assert!(page.contains("<title>Blob Land Emote Archive (March 09, 2024)</title>"));
/// assert!(page.contains(r#"src="https://cdn.discordapp.com/emojis/7.png""#));
/// ```
pub fn render_gallery(guild_name: &str, emotes: &[ManagedEmote], generated_at: DateTime<Utc>) -> String {
    let guild_name = escape_html(guild_name);
    let date = generated_at.format("%B %d, %Y");
    let time = generated_at.format("%H:%M UTC");

    let mut page = String::new();
    // Writing to a String cannot fail.
    let _ = write!(
        page,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{guild_name} Emote Archive ({date})</title>\n\
         <style>\n{STYLE}</style>\n</head>\n<body>\n\
         <h1>{guild_name} Emote Archive</h1>\n\
         <p>Generated {date} at {time}. {count} emotes.</p>\n",
        count = emotes.len(),
    );
    for emote in emotes {
        let label = escape_html(&format!(":{}:", emote.name()));
        let _ = writeln!(
            page,
            "<img title=\"{label}\" alt=\"{label}\" src=\"{}\">",
            escape_html(emote.url())
        );
    }
    page.push_str("</body>\n</html>\n");
    page
}
