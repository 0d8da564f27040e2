//! Discord bot client setup and lifecycle management.

use super::{DiscordError, DiscordErrorKind, DiscordPlatform, EmoteHandler};
use emote_rate_limit::EmoteConfig;
use emote_transfer::{EmoteManager, HttpFetcher};
use serenity::Client;
use serenity::gateway::ShardManager;
use serenity::http::Http;
use std::sync::Arc;
use tracing::{info, instrument};

/// Discord bot managing emotes through [`EmoteManager`].
///
/// # Example
/// ```no_run
/// use emote_rate_limit::EmoteConfig;
/// use emote_social::EmoteBot;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let token = std::env::var("DISCORD_TOKEN")?;
///     let mut bot = EmoteBot::new(token, EmoteConfig::load()?).await?;
///     bot.start().await?;
///     Ok(())
/// }
/// ```
pub struct EmoteBot {
    client: Client,
    manager: Arc<EmoteManager>,
}

impl EmoteBot {
    /// Build the HTTP client, emote manager and gateway client.
    ///
    /// # Errors
    /// Returns an error if the token is empty, the download client cannot be
    /// built, or serenity fails to initialise.
    #[instrument(skip(token, config), fields(token_len = token.len()))]
    pub async fn new(token: String, config: EmoteConfig) -> Result<Self, DiscordError> {
        if token.trim().is_empty() {
            return Err(DiscordError::new(DiscordErrorKind::InvalidToken));
        }
        info!("Initializing emote bot");

        let http = Arc::new(Http::new(&token));
        let platform = Arc::new(DiscordPlatform::new(Arc::clone(&http)));
        let fetcher = Arc::new(
            HttpFetcher::new(config.http())?.with_body_limit(*config.import().size_limit()),
        );
        let prefix = config.bot().prefix().clone();
        let manager = Arc::new(EmoteManager::new(platform, fetcher, config));

        let handler = EmoteHandler::new(Arc::clone(&manager), prefix);
        let intents = EmoteHandler::intents();
        info!(?intents, "Building Serenity client");

        let client = Client::builder(&token, intents)
            .event_handler(handler)
            .await
            .map_err(|e| {
                DiscordError::new(DiscordErrorKind::ConnectionFailed(format!(
                    "Failed to build client: {}",
                    e
                )))
            })?;

        Ok(Self { client, manager })
    }

    /// The emote manager commands are routed to.
    pub fn manager(&self) -> &Arc<EmoteManager> {
        &self.manager
    }

    /// Handle for stopping every shard, e.g. from a signal handler.
    pub fn shard_manager(&self) -> Arc<ShardManager> {
        Arc::clone(&self.client.shard_manager)
    }

    /// Connect and run until the shards shut down.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Result<(), DiscordError> {
        info!("Starting emote bot");
        self.client.start().await.map_err(|e| {
            DiscordError::new(DiscordErrorKind::ConnectionFailed(format!(
                "Client error: {}",
                e
            )))
        })
    }
}
