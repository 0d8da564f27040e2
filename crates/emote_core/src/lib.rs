//! Core data model for the emote manager.
//!
//! This crate defines the types shared by the transfer pipeline and the platform
//! adapters:
//! - Snowflake identifiers (`GuildId`, `EmoteId`, ...)
//! - `ManagedEmote`, the named image resource owned by a guild
//! - `Category` and `ImageKind`, with byte-level format sniffing
//! - `QuotaState` and `GuildLimits` for per-category slot accounting
//! - Naming helpers and custom emote reference parsing
//! - Message links and snapshots of posted messages

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod context;
mod emote;
mod ids;
mod image_kind;
mod message;
mod naming;
mod quota;

pub use context::{Attachment, Author, CommandContext};
pub use emote::{Category, EmoteFilter, ManagedEmote};
pub use ids::{ChannelId, EmoteId, GuildId, MessageId, UserId};
pub use image_kind::ImageKind;
pub use message::{IdentifyScope, MessageLink, MessageSnapshot, ReactionEmoji};
pub use naming::{
    CustomEmoteRef, basename, emote_url, escape_mentions, format_emote_filename,
    strip_angle_brackets,
};
pub use quota::{GuildLimits, QuotaState};
