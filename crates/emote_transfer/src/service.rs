//! The emote manager's commands.
//!
//! Command routing and permission checks belong to the platform adapter; every
//! method here takes an already parsed `CommandContext` and arguments.

use crate::create::{CreationPipeline, CreationRequest};
use crate::disambiguate::NameDisambiguator;
use crate::extract::{ArchiveEntry, ArchiveReader};
use crate::fetch::{ARCHIVE_MIMETYPES, Fetcher, IMAGE_MIMETYPES};
use crate::gallery::render_gallery;
use crate::pack::{PackItem, ShardPacker};
use crate::paginate::{ListPaginator, PaginatorRegistry};
use crate::platform::EmotePlatform;
use crate::reply::ReplyBroker;
use chrono::Utc;
use emote_core::{
    Category, CommandContext, CustomEmoteRef, EmoteFilter, GuildId, IdentifyScope, ManagedEmote,
    MessageLink, QuotaState, basename, escape_mentions, format_emote_filename,
    strip_angle_brackets,
};
use emote_error::{
    BatchError, BatchErrorKind, EmoteError, EmoteResult, FetchErrorKind, ItemError, ItemErrorKind,
    PlatformErrorKind,
};
use emote_rate_limit::{EmoteConfig, TransferCooldown};
use futures::StreamExt;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Reaction added to a command message once a batch has finished.
pub const SUCCESS_REACTION: &str = "\u{2705}";

/// Work out the emote name and image URL for `add`.
///
/// Accepted forms, in order of precedence:
/// - an attachment, named by the joined arguments or after the attachment's filename
/// - a single custom emote, e.g. `<:blobcat:1234...>`
/// - a name followed by a URL or custom emote
pub fn parse_add_args(ctx: &CommandContext, args: &[String]) -> Result<(String, String), BatchError> {
    let (name, url) = match (ctx.attachments.first(), args) {
        (Some(attachment), []) => (
            format_emote_filename(&attachment.filename),
            attachment.url.clone(),
        ),
        (Some(attachment), words) => (
            format_emote_filename(&words.concat()),
            attachment.url.clone(),
        ),
        (None, []) => {
            return Err(BatchError::new(BatchErrorKind::BadArgument(
                "You must specify an emote name and a URL, emote or attachment.".to_string(),
            )));
        }
        (None, [single]) => match CustomEmoteRef::parse(single) {
            Some(emote) => (emote.name.clone(), emote.url()),
            None => {
                return Err(BatchError::new(BatchErrorKind::BadArgument(
                    "If you're not using an attachment, you must provide a name and a URL or emote."
                        .to_string(),
                )));
            }
        },
        (None, [name, source, ..]) => match CustomEmoteRef::parse(source) {
            Some(emote) => (name.clone(), emote.url()),
            None => (name.clone(), strip_angle_brackets(source).to_string()),
        },
    };

    Ok((name.trim_matches(':').to_string(), url))
}

fn require_guild(ctx: &CommandContext) -> Result<GuildId, BatchError> {
    ctx.guild
        .ok_or_else(|| BatchError::new(BatchErrorKind::NoPrivateMessage))
}

/// Share of `limit` used, rounded to two decimals and always printed with a
/// fractional part, e.g. `10.0`, `12.5`, `33.33`.
fn percent_full(count: usize, limit: usize) -> String {
    if limit == 0 {
        return "100.0".to_string();
    }
    let percent = (count as f64 * 10_000.0 / limit as f64).round() / 100.0;
    if percent.fract() == 0.0 {
        format!("{:.1}", percent)
    } else {
        format!("{}", percent)
    }
}

/// Emote management commands for one bot instance.
///
/// Owns the reply broker and the paginator registry; `shutdown` tears both down.
pub struct EmoteManager {
    platform: Arc<dyn EmotePlatform>,
    fetcher: Arc<dyn Fetcher>,
    config: EmoteConfig,
    pipeline: CreationPipeline,
    broker: Arc<ReplyBroker>,
    disambiguator: NameDisambiguator,
    paginators: PaginatorRegistry,
    cooldown: TransferCooldown,
    archive_cooldown: TransferCooldown,
}

impl EmoteManager {
    /// Create a manager talking to `platform` and downloading through `fetcher`.
    pub fn new(
        platform: Arc<dyn EmotePlatform>,
        fetcher: Arc<dyn Fetcher>,
        config: EmoteConfig,
    ) -> Self {
        let broker = Arc::new(ReplyBroker::new());
        let disambiguator =
            NameDisambiguator::new(Arc::clone(&broker), config.disambiguation().timeout());
        let cooldown = TransferCooldown::new(config.transfer().cooldown());
        let archive_cooldown = TransferCooldown::new(config.transfer().cooldown());

        Self {
            platform,
            fetcher,
            pipeline: CreationPipeline::default(),
            broker,
            disambiguator,
            paginators: PaginatorRegistry::new(),
            cooldown,
            archive_cooldown,
            config,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &EmoteConfig {
        &self.config
    }

    /// Broker that incoming messages should be offered to.
    pub fn broker(&self) -> &ReplyBroker {
        &self.broker
    }

    /// Registry that reactions should be routed to.
    pub fn paginators(&self) -> &PaginatorRegistry {
        &self.paginators
    }

    async fn say(&self, ctx: &CommandContext, text: &str) -> EmoteResult<()> {
        self.platform
            .send_message(ctx.channel, &escape_mentions(text))
            .await?;
        Ok(())
    }

    async fn react_success(&self, ctx: &CommandContext) {
        if let Err(e) = self
            .platform
            .add_reaction(ctx.channel, ctx.message, SUCCESS_REACTION)
            .await
        {
            debug!(error = %e, "Could not add success reaction");
        }
    }

    /// Tell the user about an error that ended a command.
    ///
    /// Batch errors are shown verbatim; anything else is logged and reported generically.
    pub async fn report_error(&self, ctx: &CommandContext, err: &EmoteError) -> EmoteResult<()> {
        match err.as_batch() {
            Some(batch) => self.say(ctx, &batch.user_message()).await,
            None => {
                error!(error = %err, "Command failed");
                self.say(ctx, "An unexpected error occurred. Please try again later.")
                    .await
            }
        }
    }

    async fn fetch_and_create(
        &self,
        guild: GuildId,
        ctx: &CommandContext,
        name: &str,
        url: &str,
    ) -> EmoteResult<String> {
        let image = match self.fetcher.fetch(url, IMAGE_MIMETYPES, true).await {
            Ok(image) => image,
            Err(err) => {
                warn!(name, error = %err, "Image download failed");
                let kind = match err.kind {
                    FetchErrorKind::InvalidFile => ItemErrorKind::InvalidImage,
                    other => ItemErrorKind::Fetch(other),
                };
                return Ok(ItemError::new(name, kind).user_message());
            }
        };

        let request = CreationRequest::new(name, image, ctx.author.clone());
        let report = self
            .pipeline
            .create(self.platform.as_ref(), guild, request)
            .await?;
        Ok(report.user_message())
    }

    /// Add one emote from an attachment, a custom emote or a name and URL.
    #[instrument(skip(self, ctx, args), fields(author = %ctx.author))]
    pub async fn add(&self, ctx: &CommandContext, args: &[String]) -> EmoteResult<()> {
        let guild = require_guild(ctx)?;
        let (name, url) = parse_add_args(ctx, args)?;
        let message = self.fetch_and_create(guild, ctx, &name, &url).await?;
        self.say(ctx, &message).await
    }

    /// Add every custom emote mentioned in `args`, one after another.
    #[instrument(skip(self, ctx, args), fields(author = %ctx.author))]
    pub async fn add_these(&self, ctx: &CommandContext, args: &[String]) -> EmoteResult<()> {
        let guild = require_guild(ctx)?;
        let references = CustomEmoteRef::find_all(&args.join(" "));
        if references.is_empty() {
            return self.say(ctx, "Error: no custom emotes were provided.").await;
        }

        for reference in references {
            let message = self
                .fetch_and_create(guild, ctx, &reference.name, &reference.url())
                .await?;
            self.say(ctx, &message).await?;
        }

        self.react_success(ctx).await;
        Ok(())
    }

    /// Upload the guild's emotes as one or more zip archives.
    #[instrument(skip(self, ctx), fields(guild = ?ctx.guild))]
    pub async fn export(&self, ctx: &CommandContext, filter: EmoteFilter) -> EmoteResult<()> {
        let guild = require_guild(ctx)?;
        self.cooldown.check(guild)?;

        let emotes: Vec<ManagedEmote> = self
            .platform
            .emotes(guild)
            .await?
            .into_iter()
            .filter(|emote| filter.matches(emote))
            .collect();
        if emotes.is_empty() {
            return Err(BatchError::new(BatchErrorKind::BadArgument(
                "No emotes of that type were found in this server.".to_string(),
            ))
            .into());
        }

        let limits = self.platform.guild_limits(guild).await?;
        let downloads = join_all(emotes.iter().map(|emote| async move {
            let result = self.fetcher.fetch(emote.url(), IMAGE_MIMETYPES, false).await;
            (emote, result)
        }))
        .await;

        let mut items = Vec::with_capacity(downloads.len());
        for (emote, result) in downloads {
            match result {
                Ok(data) => items.push(PackItem {
                    name: emote.name().clone(),
                    animated: *emote.animated(),
                    created_at: *emote.created_at(),
                    data,
                }),
                Err(err) => {
                    warn!(emote = %emote, error = %err, "Export download failed");
                    self.say(ctx, &format!("{}: {}", emote.name(), err.kind))
                        .await?;
                }
            }
        }

        let mut shards = ShardPacker::new(format!("emotes-{}", guild), limits.filesize_limit)
            .pack(items);
        let rejected: Vec<String> = shards
            .rejected()
            .iter()
            .map(|item| ItemError::new(item.name(), ItemErrorKind::TooLargeForShard).user_message())
            .collect();
        for message in rejected {
            self.say(ctx, &message).await?;
        }

        let mut uploaded = 0;
        for shard in &mut shards {
            let shard = shard?;
            let filename = shard.filename().clone();
            self.platform
                .send_file(ctx.channel, &filename, shard.into_data())
                .await?;
            uploaded += 1;
        }

        info!(emotes = emotes.len(), shards = uploaded, "Export finished");
        Ok(())
    }

    /// Create emotes from a zip or tar archive given by URL or attachment.
    #[instrument(skip(self, ctx, url), fields(guild = ?ctx.guild))]
    pub async fn import(&self, ctx: &CommandContext, url: Option<&str>) -> EmoteResult<()> {
        let guild = require_guild(ctx)?;
        let url = match (url, ctx.attachments.first()) {
            (Some(_), Some(_)) => {
                return Err(BatchError::new(BatchErrorKind::BadArgument(
                    "Either a URL or an attachment must be given, not both.".to_string(),
                ))
                .into());
            }
            (None, None) => {
                return Err(BatchError::new(BatchErrorKind::BadArgument(
                    "A URL or attachment must be given.".to_string(),
                ))
                .into());
            }
            (Some(url), None) => strip_angle_brackets(url).to_string(),
            (None, Some(attachment)) => attachment.url.clone(),
        };
        self.cooldown.check(guild)?;

        let archive = match self.fetcher.fetch(&url, ARCHIVE_MIMETYPES, true).await {
            Ok(archive) => archive,
            Err(err) => {
                warn!(error = %err, "Archive download failed");
                return self.say(ctx, &err.kind.to_string()).await;
            }
        };

        let reader = ArchiveReader::open(archive, *self.config.import().size_limit())
            .map_err(|e| BatchError::new(BatchErrorKind::ArchiveFormat(e.kind.to_string())))?;

        let mut entries = reader.entries();
        let mut created = 0;
        while let Some(entry) = entries.next().await {
            match entry {
                ArchiveEntry::Image { name, data, .. } => {
                    let emote_name = format_emote_filename(basename(&name));
                    let request = CreationRequest::new(emote_name, data, ctx.author.clone());
                    let report = self
                        .pipeline
                        .create(self.platform.as_ref(), guild, request)
                        .await?;
                    if report.is_created() {
                        created += 1;
                    }
                    self.say(ctx, &report.user_message()).await?;
                }
                ArchiveEntry::Oversized { name, limit, size } => {
                    let err = ItemError::new(name, ItemErrorKind::FileTooBig { limit, size });
                    self.say(ctx, &err.user_message()).await?;
                }
                ArchiveEntry::Invalid { name, reason } => {
                    debug!(%name, %reason, "Skipping archive entry");
                }
            }
        }

        info!(created, "Import finished");
        self.react_success(ctx).await;
        Ok(())
    }

    /// Delete each named emote.
    #[instrument(skip(self, ctx, names), fields(count = names.len()))]
    pub async fn remove(&self, ctx: &CommandContext, names: &[String]) -> EmoteResult<()> {
        let guild = require_guild(ctx)?;
        if names.is_empty() {
            return Err(BatchError::new(BatchErrorKind::BadArgument(
                "You must specify at least one emote to remove.".to_string(),
            ))
            .into());
        }

        for name in names {
            let emotes = self.platform.emotes(guild).await?;
            let emote = self
                .disambiguator
                .parse_emote(self.platform.as_ref(), ctx, &emotes, name)
                .await?;
            self.platform
                .delete_emote(guild, *emote.id(), &format!("Removed by {}", ctx.author))
                .await?;
            info!(emote = %emote, "Removed emote");
            self.say(ctx, &format!("Emote \\:{}: successfully removed.", emote.name()))
                .await?;
        }

        if names.len() > 1 {
            self.react_success(ctx).await;
        }
        Ok(())
    }

    /// Rename an emote.
    #[instrument(skip(self, ctx))]
    pub async fn rename(&self, ctx: &CommandContext, old: &str, new: &str) -> EmoteResult<()> {
        let guild = require_guild(ctx)?;
        let emotes = self.platform.emotes(guild).await?;
        let emote = self
            .disambiguator
            .parse_emote(self.platform.as_ref(), ctx, &emotes, old)
            .await?;

        let new = new.trim_matches(':');
        let reason = format!("Renamed by {}", ctx.author);
        match self
            .platform
            .rename_emote(guild, *emote.id(), new, &reason)
            .await
        {
            Ok(renamed) => {
                info!(from = %emote, to = %renamed, "Renamed emote");
                self.say(ctx, &format!("Emote successfully renamed to \\:{}:", renamed.name()))
                    .await
            }
            Err(err) => match err.kind {
                PlatformErrorKind::Http { status, message } => {
                    self.say(
                        ctx,
                        &format!(
                            "An error occurred while renaming the emote:\n{}: {}",
                            status, message
                        ),
                    )
                    .await
                }
                _ => Err(err.into()),
            },
        }
    }

    /// Page through the guild's emotes, sorted by name.
    #[instrument(skip(self, ctx), fields(guild = ?ctx.guild))]
    pub async fn list(&self, ctx: &CommandContext, filter: EmoteFilter) -> EmoteResult<()> {
        let guild = require_guild(ctx)?;
        let mut emotes: Vec<ManagedEmote> = self
            .platform
            .emotes(guild)
            .await?
            .into_iter()
            .filter(|emote| filter.matches(emote))
            .collect();
        if emotes.is_empty() {
            return self
                .say(ctx, "No emotes of that type were found in this server.")
                .await;
        }

        emotes.sort_by_key(|emote| emote.name().to_lowercase());
        let lines = emotes
            .iter()
            .map(|emote| format!("{} {}", emote, emote.escaped()));
        ListPaginator::new(lines)
            .begin(
                self.platform.as_ref(),
                &self.paginators,
                ctx.channel,
                ctx.author.id,
                self.config.pagination().idle_timeout(),
            )
            .await
    }

    /// Report how full each category is.
    #[instrument(skip(self, ctx), fields(guild = ?ctx.guild))]
    pub async fn stats(&self, ctx: &CommandContext) -> EmoteResult<()> {
        let guild = require_guild(ctx)?;
        let emotes = self.platform.emotes(guild).await?;
        let limits = self.platform.guild_limits(guild).await?;
        let quota = QuotaState::from_emotes(&emotes, limits.emoji_limit);

        let limit = quota.limit();
        let static_count = quota.count(Category::Static);
        let animated_count = quota.count(Category::Animated);
        let total = static_count + animated_count;

        let message = format!(
            "Static emotes: **{} / {}** ({} left, {}% full)\n\
             Animated emotes: **{} / {}** ({} left, {}% full)\n\
             Total: **{} / {}**",
            static_count,
            limit,
            quota.remaining(Category::Static),
            percent_full(static_count, limit),
            animated_count,
            limit,
            quota.remaining(Category::Animated),
            percent_full(animated_count, limit),
            total,
            limit * 2,
        );
        self.say(ctx, &message).await
    }

    /// Show an emote at full size along with its details.
    ///
    /// Custom emote syntax works anywhere, even for emotes of other servers; a
    /// bare name is looked up among the current server's emotes.
    #[instrument(skip(self, ctx), fields(author = %ctx.author))]
    pub async fn show(&self, ctx: &CommandContext, arg: Option<&str>) -> EmoteResult<()> {
        let must_specify =
            || BatchError::new(BatchErrorKind::BadArgument("You must specify an emote.".to_string()));
        let arg = arg.map(str::trim).filter(|arg| !arg.is_empty()).ok_or_else(must_specify)?;

        let emote = match (CustomEmoteRef::parse(arg), ctx.guild) {
            (Some(reference), Some(guild)) => {
                let emotes = self.platform.emotes(guild).await?;
                match emotes.into_iter().find(|emote| *emote.id() == reference.id) {
                    Some(emote) => emote,
                    None => {
                        return self
                            .say(ctx, &format!(":{}: {}", reference.name, reference.url()))
                            .await;
                    }
                }
            }
            (Some(reference), None) => {
                return self
                    .say(ctx, &format!(":{}: {}", reference.name, reference.url()))
                    .await;
            }
            (None, Some(guild)) => {
                let emotes = self.platform.emotes(guild).await?;
                self.disambiguator
                    .parse_emote(self.platform.as_ref(), ctx, &emotes, arg)
                    .await?
            }
            (None, None) => return Err(must_specify().into()),
        };

        let message = format!(
            "{}\n**Name:** \\:{}:\n**URL:** {}\n**Added:** {}",
            emote,
            emote.name(),
            emote.url(),
            emote.created_at().format("%Y-%m-%d %H:%M UTC"),
        );
        self.say(ctx, &message).await
    }

    /// List the emotes used in a message of this server, given its link.
    #[instrument(skip(self, ctx), fields(guild = ?ctx.guild))]
    pub async fn identify(
        &self,
        ctx: &CommandContext,
        url: &str,
        scope: IdentifyScope,
    ) -> EmoteResult<()> {
        let guild = require_guild(ctx)?;
        let Some(link) = MessageLink::parse(strip_angle_brackets(url)) else {
            return self
                .say(
                    ctx,
                    "\u{274c} You did not specify a valid URL. You can get a message's URL by \
                     right clicking on it and selecting 'Copy Message Link'.",
                )
                .await;
        };
        if link.guild != guild {
            return self
                .say(
                    ctx,
                    "\u{274c} You are only allowed to specify a message from within this server.",
                )
                .await;
        }

        let snapshot = match self.platform.fetch_message(link.channel, link.message).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                debug!(error = %err, message = %link.message, "Could not fetch message");
                return self.say(ctx, "\u{274c} I cannot access this message.").await;
            }
        };

        let mut lines = Vec::new();
        if scope.includes_content() {
            lines.extend(
                snapshot
                    .content_emotes()
                    .into_iter()
                    .map(|reference| format!(":{}: {}", reference.name, reference.url())),
            );
        }
        if scope.includes_reactions() {
            lines.extend(
                snapshot
                    .reactions
                    .iter()
                    .map(|reaction| format!("(reaction) {}", reaction)),
            );
        }
        if lines.is_empty() {
            return self
                .say(ctx, "I did not see any emotes in this message.")
                .await;
        }

        ListPaginator::new(lines)
            .begin(
                self.platform.as_ref(),
                &self.paginators,
                ctx.channel,
                ctx.author.id,
                self.config.pagination().idle_timeout(),
            )
            .await
    }

    /// Upload an HTML page showing every emote of the server.
    #[instrument(skip(self, ctx), fields(guild = ?ctx.guild))]
    pub async fn archive(&self, ctx: &CommandContext) -> EmoteResult<()> {
        let guild = require_guild(ctx)?;
        self.archive_cooldown.check(guild)?;

        let emotes = self.platform.emotes(guild).await?;
        if emotes.is_empty() {
            return self.say(ctx, "This server has no emotes to archive.").await;
        }

        let guild_name = self.platform.guild_name(guild).await?;
        let now = Utc::now();
        let page = render_gallery(&guild_name, &emotes, now);
        let stamp = now.timestamp_nanos_opt().unwrap_or_else(|| now.timestamp());
        let filename = format!("emote-archive-{}.html", stamp);

        self.platform
            .send_file(ctx.channel, &filename, page.into_bytes())
            .await?;
        info!(count = emotes.len(), %filename, "Uploaded emote archive page");
        Ok(())
    }

    /// Send usage text to the invoking channel.
    pub async fn help(&self, ctx: &CommandContext, text: &str) -> EmoteResult<()> {
        self.say(ctx, text).await
    }

    /// Stop every paginator and cancel every pending prompt.
    pub fn shutdown(&self) {
        let paginators = self.paginators.shutdown();
        self.broker.close();
        info!(paginators, "Emote manager shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emote_core::{Attachment, Author, ChannelId, MessageId, UserId};

    fn ctx(attachments: Vec<Attachment>) -> CommandContext {
        CommandContext {
            guild: Some(GuildId(1)),
            channel: ChannelId(2),
            message: MessageId(3),
            author: Author {
                id: UserId(4),
                name: "tester".to_string(),
            },
            attachments,
        }
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_add_args_forms() {
        let attachment = Attachment {
            url: "https://cdn.test/party parrot-1.gif".to_string(),
            filename: "party parrot-1.gif".to_string(),
        };
        let (name, url) = parse_add_args(&ctx(vec![attachment.clone()]), &[]).unwrap();
        assert_eq!(name, "partyparrot");
        assert_eq!(url, attachment.url);

        let (name, _) =
            parse_add_args(&ctx(vec![attachment.clone()]), &args(&[":parrot:"])).unwrap();
        assert_eq!(name, "parrot");

        let (name, _) =
            parse_add_args(&ctx(vec![attachment.clone()]), &args(&["party", "parrot"])).unwrap();
        assert_eq!(name, "partyparrot");

        let (name, _) = parse_add_args(&ctx(vec![attachment]), &args(&["blob.png"])).unwrap();
        assert_eq!(name, "blob");

        let (name, url) =
            parse_add_args(&ctx(vec![]), &args(&["<a:dance:123456789012345678>"])).unwrap();
        assert_eq!(name, "dance");
        assert_eq!(url, "https://cdn.discordapp.com/emojis/123456789012345678.gif");

        let (name, url) =
            parse_add_args(&ctx(vec![]), &args(&["cat", "<https://example.com/cat.png>"]))
                .unwrap();
        assert_eq!(name, "cat");
        assert_eq!(url, "https://example.com/cat.png");
    }

    #[test]
    fn test_percent_full_rounds_to_two_decimals() {
        assert_eq!(percent_full(5, 50), "10.0");
        assert_eq!(percent_full(1, 3), "33.33");
        assert_eq!(percent_full(2, 3), "66.67");
        assert_eq!(percent_full(1, 8), "12.5");
        assert_eq!(percent_full(0, 0), "100.0");
    }

    #[test]
    fn test_parse_add_args_rejects_missing_source() {
        let err = parse_add_args(&ctx(vec![]), &[]).unwrap_err();
        assert!(matches!(err.kind, BatchErrorKind::BadArgument(_)));

        let err = parse_add_args(&ctx(vec![]), &args(&["lonely"])).unwrap_err();
        assert!(matches!(err.kind, BatchErrorKind::BadArgument(_)));
    }
}
