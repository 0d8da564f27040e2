//! Emote manager: bulk transfer and housekeeping of a guild's custom emotes.
//!
//! Exports a guild's emotes as size-limited zip shards, imports emotes from zip
//! or tar archives, and adds, removes, renames and lists emotes one at a time.
//!
//! # Cargo Features
//!
//! - `discord` - Discord bot integration and the `emote-manager` binary
//!
//! # Architecture
//!
//! - `emote_error` - Error types
//! - `emote_core` - Emote model, identifiers, quotas and naming rules
//! - `emote_rate_limit` - Configuration and the per-guild transfer cooldown
//! - `emote_transfer` - Fetching, archive reading and writing, creation and commands
//! - `emote_social` - Command parsing and the Discord adapter
//!
//! This crate re-exports everything for convenience.

pub use emote_core::*;
pub use emote_error::*;
pub use emote_rate_limit::*;
pub use emote_social::*;
pub use emote_transfer::*;

pub mod observability;
