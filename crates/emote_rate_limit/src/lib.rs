//! Transfer cooldowns and configuration.
//!
//! This crate provides:
//! - `TransferCooldown` - one export/import per guild per time window
//! - `EmoteConfig` - TOML configuration with bundled defaults and user overrides

mod config;
mod cooldown;

pub use config::{
    BotSettings, DisambiguationSettings, EmoteConfig, HttpSettings, ImportSettings,
    PaginationSettings, TransferSettings,
};
pub use cooldown::TransferCooldown;
