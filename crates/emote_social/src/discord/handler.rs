//! Serenity event handler for the emote bot.
//!
//! Every non-bot message is first offered to the reply broker so pending
//! disambiguation prompts can see it, then parsed as a prefixed command.

use crate::parse_command;
use emote_core::{Attachment, Author, ChannelId, CommandContext, GuildId, MessageId, UserId};
use emote_error::EmoteError;
use emote_transfer::{EmoteManager, PageControl};
use serenity::all::{Message, Reaction, ReactionType, Ready};
use serenity::async_trait;
use serenity::client::{Context, EventHandler};
use serenity::model::gateway::GatewayIntents;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Event handler for the emote bot.
pub struct EmoteHandler {
    manager: Arc<EmoteManager>,
    prefix: String,
}

impl EmoteHandler {
    /// Create a handler routing commands with `prefix` to `manager`.
    pub fn new(manager: Arc<EmoteManager>, prefix: impl Into<String>) -> Self {
        Self {
            manager,
            prefix: prefix.into(),
        }
    }

    /// Required gateway intents for the bot.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
            | GatewayIntents::GUILD_MESSAGE_REACTIONS
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::GUILD_EMOJIS_AND_STICKERS
    }

    fn context(msg: &Message) -> CommandContext {
        CommandContext {
            guild: msg.guild_id.map(|id| GuildId(id.get())),
            channel: ChannelId(msg.channel_id.get()),
            message: MessageId(msg.id.get()),
            author: Author {
                id: UserId(msg.author.id.get()),
                name: msg.author.tag(),
            },
            attachments: msg
                .attachments
                .iter()
                .map(|a| Attachment {
                    url: a.url.clone(),
                    filename: a.filename.clone(),
                })
                .collect(),
        }
    }

    async fn report(&self, ctx: &CommandContext, err: &EmoteError) {
        if let Err(e) = self.manager.report_error(ctx, err).await {
            error!(error = %e, original = %err, "Could not report command error");
        }
    }
}

#[async_trait]
impl EventHandler for EmoteHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            user = %ready.user.tag(),
            guilds = ready.guilds.len(),
            prefix = %self.prefix,
            "Emote bot connected"
        );
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let author = UserId(msg.author.id.get());
        let channel = ChannelId(msg.channel_id.get());
        if self.manager.broker().offer(author, channel, &msg.content) {
            debug!(%author, %channel, "Message answered a pending prompt");
            return;
        }

        let Some(parsed) = parse_command(&self.prefix, &msg.content) else {
            return;
        };
        let ctx = Self::context(&msg);
        let result = match parsed {
            Ok(command) => command.run(&self.manager, &ctx).await,
            Err(err) => Err(err.into()),
        };
        if let Err(err) = result {
            self.report(&ctx, &err).await;
        }
    }

    async fn reaction_add(&self, _ctx: Context, reaction: Reaction) {
        let Some(user) = reaction.user_id else {
            return;
        };
        let ReactionType::Unicode(emoji) = &reaction.emoji else {
            return;
        };
        let Some(control) = PageControl::from_emoji(emoji) else {
            return;
        };
        let routed = self.manager.paginators().route(
            MessageId(reaction.message_id.get()),
            UserId(user.get()),
            control,
        );
        if routed {
            debug!(?control, "Routed page control");
        }
    }
}
