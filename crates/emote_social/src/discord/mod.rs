//! Discord integration over serenity.
//!
//! - **platform**: `EmotePlatform` implemented on serenity's HTTP client
//! - **handler**: event handler routing messages and reactions to the emote manager
//! - **client**: bot construction and lifecycle
//! - **error**: Discord-specific error types
//!
//! Available with the `discord` feature.
//!
//! ```rust,ignore
//! use emote_social::EmoteBot;
//! use emote_rate_limit::EmoteConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EmoteConfig::load()?;
//!     let mut bot = EmoteBot::new(std::env::var("DISCORD_TOKEN")?, config).await?;
//!     bot.start().await?;
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod handler;
mod platform;

pub use client::EmoteBot;
pub use error::{DiscordError, DiscordErrorKind, DiscordResult};
pub use handler::EmoteHandler;
pub use platform::DiscordPlatform;
