//! `EmotePlatform` over serenity's HTTP client.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use emote_core::{
    ChannelId, EmoteId, GuildId, GuildLimits, ImageKind, ManagedEmote, MessageId,
    MessageSnapshot, ReactionEmoji,
};
use emote_error::{PlatformError, PlatformErrorKind};
use emote_transfer::{EmotePlatform, PlatformResult};
use serde_json::json;
use serenity::all::{CreateAttachment, Emoji, ReactionType};
use serenity::http::{Http, HttpError};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Discord implementation of [`EmotePlatform`].
#[derive(Clone)]
pub struct DiscordPlatform {
    http: Arc<Http>,
}

impl DiscordPlatform {
    /// Wrap an authenticated HTTP client.
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

fn guild_id(guild: GuildId) -> serenity::all::GuildId {
    serenity::all::GuildId::new(guild.get())
}

fn channel_id(channel: ChannelId) -> serenity::all::ChannelId {
    serenity::all::ChannelId::new(channel.get())
}

fn message_id(message: MessageId) -> serenity::all::MessageId {
    serenity::all::MessageId::new(message.get())
}

fn emoji_id(emote: EmoteId) -> serenity::all::EmojiId {
    serenity::all::EmojiId::new(emote.get())
}

fn to_emote(guild: GuildId, emoji: Emoji) -> ManagedEmote {
    ManagedEmote::new(EmoteId(emoji.id.get()), emoji.name, emoji.animated, guild)
        .with_require_colons(emoji.require_colons)
}

fn to_reaction(reaction: ReactionType) -> Option<ReactionEmoji> {
    match reaction {
        ReactionType::Custom { animated, id, name } => Some(ReactionEmoji::Custom {
            name: name.unwrap_or_else(|| "_".to_string()),
            id: EmoteId(id.get()),
            animated,
        }),
        ReactionType::Unicode(emoji) => Some(ReactionEmoji::Unicode(emoji)),
        _ => None,
    }
}

/// Base64 data URI Discord expects for emoji images.
fn data_uri(image: &[u8]) -> PlatformResult<String> {
    let kind = ImageKind::sniff(image).ok_or_else(|| {
        PlatformError::new(PlatformErrorKind::InvalidPayload(
            "unrecognised image format".to_string(),
        ))
    })?;
    Ok(format!(
        "data:{};base64,{}",
        kind.mime_type(),
        STANDARD.encode(image)
    ))
}

/// Map serenity errors onto platform error kinds.
///
/// Rejections that point at the image field are reported as invalid payloads.
fn map_error(err: serenity::Error) -> PlatformError {
    match err {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => {
            if response.error.errors.iter().any(|e| e.path == "image") {
                PlatformError::new(PlatformErrorKind::InvalidPayload(response.error.message))
            } else {
                PlatformError::new(PlatformErrorKind::Http {
                    status: response.status_code.as_u16(),
                    message: response.error.message,
                })
            }
        }
        other => PlatformError::new(PlatformErrorKind::Unavailable(other.to_string())),
    }
}

#[async_trait]
impl EmotePlatform for DiscordPlatform {
    #[instrument(skip(self))]
    async fn emotes(&self, guild: GuildId) -> PlatformResult<Vec<ManagedEmote>> {
        let emojis = self
            .http
            .get_emojis(guild_id(guild))
            .await
            .map_err(map_error)?;
        debug!(count = emojis.len(), "Fetched guild emojis");
        Ok(emojis.into_iter().map(|e| to_emote(guild, e)).collect())
    }

    #[instrument(skip(self))]
    async fn guild_limits(&self, guild: GuildId) -> PlatformResult<GuildLimits> {
        let partial = self
            .http
            .get_guild(guild_id(guild))
            .await
            .map_err(map_error)?;
        Ok(GuildLimits::for_premium_tier(u8::from(partial.premium_tier)))
    }

    #[instrument(skip(self))]
    async fn guild_name(&self, guild: GuildId) -> PlatformResult<String> {
        let partial = self
            .http
            .get_guild(guild_id(guild))
            .await
            .map_err(map_error)?;
        Ok(partial.name)
    }

    #[instrument(skip(self, image, reason), fields(size = image.len()))]
    async fn create_emote(
        &self,
        guild: GuildId,
        name: &str,
        image: &[u8],
        reason: &str,
    ) -> PlatformResult<ManagedEmote> {
        let map = json!({
            "name": name,
            "image": data_uri(image)?,
        });
        let emoji = self
            .http
            .create_emoji(guild_id(guild), &map, Some(reason))
            .await
            .map_err(map_error)?;
        Ok(to_emote(guild, emoji))
    }

    #[instrument(skip(self, reason))]
    async fn delete_emote(&self, guild: GuildId, emote: EmoteId, reason: &str) -> PlatformResult<()> {
        self.http
            .delete_emoji(guild_id(guild), emoji_id(emote), Some(reason))
            .await
            .map_err(map_error)
    }

    #[instrument(skip(self, reason))]
    async fn rename_emote(
        &self,
        guild: GuildId,
        emote: EmoteId,
        name: &str,
        reason: &str,
    ) -> PlatformResult<ManagedEmote> {
        let emoji = self
            .http
            .edit_emoji(guild_id(guild), emoji_id(emote), &json!({ "name": name }), Some(reason))
            .await
            .map_err(map_error)?;
        Ok(to_emote(guild, emoji))
    }

    #[instrument(skip(self, content), fields(len = content.len()))]
    async fn send_message(&self, channel: ChannelId, content: &str) -> PlatformResult<MessageId> {
        let map = json!({
            "content": content,
            "allowed_mentions": { "parse": [] },
        });
        let message = self
            .http
            .send_message(channel_id(channel), Vec::new(), &map)
            .await
            .map_err(map_error)?;
        Ok(MessageId(message.id.get()))
    }

    #[instrument(skip(self, content), fields(len = content.len()))]
    async fn edit_message(
        &self,
        channel: ChannelId,
        message: MessageId,
        content: &str,
    ) -> PlatformResult<()> {
        let map = json!({
            "content": content,
            "allowed_mentions": { "parse": [] },
        });
        self.http
            .edit_message(channel_id(channel), message_id(message), &map, Vec::new())
            .await
            .map_err(map_error)?;
        Ok(())
    }

    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn send_file(
        &self,
        channel: ChannelId,
        filename: &str,
        data: Vec<u8>,
    ) -> PlatformResult<MessageId> {
        let attachment = CreateAttachment::bytes(data, filename);
        let message = self
            .http
            .send_message(channel_id(channel), vec![attachment], &json!({}))
            .await
            .map_err(map_error)?;
        Ok(MessageId(message.id.get()))
    }

    #[instrument(skip(self))]
    async fn add_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> PlatformResult<()> {
        self.http
            .create_reaction(
                channel_id(channel),
                message_id(message),
                &ReactionType::Unicode(emoji.to_string()),
            )
            .await
            .map_err(map_error)
    }

    #[instrument(skip(self))]
    async fn fetch_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> PlatformResult<MessageSnapshot> {
        let message = self
            .http
            .get_message(channel_id(channel), message_id(message))
            .await
            .map_err(map_error)?;
        Ok(MessageSnapshot {
            content: message.content,
            reactions: message
                .reactions
                .into_iter()
                .filter_map(|reaction| to_reaction(reaction.reaction_type))
                .collect(),
        })
    }
}
