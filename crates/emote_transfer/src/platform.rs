//! Chat platform abstraction.
//!
//! The pipeline never talks to a platform SDK directly. Adapters (e.g. the Serenity
//! adapter in `emote_social`) implement `EmotePlatform`, and tests use mocks.

use async_trait::async_trait;
use emote_core::{
    ChannelId, EmoteId, GuildId, GuildLimits, ManagedEmote, MessageId, MessageSnapshot,
};
use emote_error::PlatformError;

/// Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Operations the emote manager needs from a chat platform.
///
/// The platform is the source of truth for a guild's emotes and serialises
/// conflicting mutations itself.
#[async_trait]
pub trait EmotePlatform: Send + Sync {
    /// Current emotes of a guild.
    async fn emotes(&self, guild: GuildId) -> PlatformResult<Vec<ManagedEmote>>;

    /// Quotas the guild is subject to.
    async fn guild_limits(&self, guild: GuildId) -> PlatformResult<GuildLimits>;

    /// Display name of a guild.
    async fn guild_name(&self, guild: GuildId) -> PlatformResult<String>;

    /// Create an emote from raw image bytes.
    ///
    /// # Arguments
    ///
    /// * `name` - Emote name
    /// * `image` - Raw PNG, JPEG, GIF or WEBP bytes
    /// * `reason` - Free-text audit log entry
    ///
    /// # Errors
    ///
    /// Returns `PlatformErrorKind::InvalidPayload` if the image is malformed and
    /// `PlatformErrorKind::Http` if the platform refuses the request.
    async fn create_emote(
        &self,
        guild: GuildId,
        name: &str,
        image: &[u8],
        reason: &str,
    ) -> PlatformResult<ManagedEmote>;

    /// Delete an emote.
    async fn delete_emote(&self, guild: GuildId, emote: EmoteId, reason: &str)
    -> PlatformResult<()>;

    /// Rename an emote.
    async fn rename_emote(
        &self,
        guild: GuildId,
        emote: EmoteId,
        name: &str,
        reason: &str,
    ) -> PlatformResult<ManagedEmote>;

    /// Post a text message.
    async fn send_message(&self, channel: ChannelId, content: &str) -> PlatformResult<MessageId>;

    /// Replace the text of a previously posted message.
    async fn edit_message(
        &self,
        channel: ChannelId,
        message: MessageId,
        content: &str,
    ) -> PlatformResult<()>;

    /// Upload a file.
    async fn send_file(
        &self,
        channel: ChannelId,
        filename: &str,
        data: Vec<u8>,
    ) -> PlatformResult<MessageId>;

    /// React to a message with a unicode emoji.
    async fn add_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> PlatformResult<()>;

    /// Text and reactions of a posted message.
    ///
    /// # Errors
    ///
    /// Returns `PlatformErrorKind::Http` if the message is missing or not visible to the bot.
    async fn fetch_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> PlatformResult<MessageSnapshot>;
}
