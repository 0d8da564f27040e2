//! Chat platform integration for the emote manager.
//!
//! The prefix command router is platform independent. The Discord adapter,
//! built on Serenity, is available with the `discord` feature.
//!
//! # Usage
//!
//! ```rust,ignore
//! use emote_rate_limit::EmoteConfig;
//! use emote_social::EmoteBot;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EmoteConfig::load()?;
//!     let mut bot = EmoteBot::new(std::env::var("DISCORD_TOKEN")?, config).await?;
//!     bot.start().await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

mod command;

pub use command::{Command, HELP_TEXT, parse_command, split_args};

#[cfg(feature = "discord")]
mod discord;

#[cfg(feature = "discord")]
pub use discord::{
    DiscordError, DiscordErrorKind, DiscordPlatform, DiscordResult, EmoteBot, EmoteHandler,
};
