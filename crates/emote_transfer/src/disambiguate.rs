//! Resolving an emote reference when several emotes share a name.

use crate::platform::EmotePlatform;
use crate::reply::ReplyBroker;
use emote_core::{CommandContext, CustomEmoteRef, ManagedEmote};
use emote_error::{BatchError, BatchErrorKind, EmoteResult};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

/// Emotes whose name matches `name`, ignoring case and surrounding colons.
///
/// Only emotes that can be referenced by name (`require_colons`) are considered.
pub fn candidates<'a>(emotes: &'a [ManagedEmote], name: &str) -> Vec<&'a ManagedEmote> {
    let wanted = name.trim_matches(':').to_lowercase();
    emotes
        .iter()
        .filter(|emote| *emote.require_colons() && emote.name().to_lowercase() == wanted)
        .collect()
}

/// Turns a user-supplied emote reference into exactly one emote.
#[derive(Debug, Clone)]
pub struct NameDisambiguator {
    broker: Arc<ReplyBroker>,
    timeout: Duration,
}

impl NameDisambiguator {
    /// Prompts wait up to `timeout` for the user's choice.
    pub fn new(broker: Arc<ReplyBroker>, timeout: Duration) -> Self {
        Self { broker, timeout }
    }

    /// Resolve a reference that is either a full `<:name:id>` or a bare name.
    ///
    /// Full references are looked up by id and never prompt.
    pub async fn parse_emote(
        &self,
        platform: &dyn EmotePlatform,
        ctx: &CommandContext,
        emotes: &[ManagedEmote],
        reference: &str,
    ) -> EmoteResult<ManagedEmote> {
        if let Some(parsed) = CustomEmoteRef::parse(reference) {
            return emotes
                .iter()
                .find(|emote| *emote.id() == parsed.id)
                .cloned()
                .ok_or_else(|| BatchError::new(BatchErrorKind::EmoteNotFound(parsed.name)).into());
        }

        self.resolve(platform, ctx, emotes, reference).await
    }

    /// Resolve a bare name, asking the author to pick when it is ambiguous.
    ///
    /// # Errors
    ///
    /// * `EmoteNotFound` - nothing matches
    /// * `TookTooLong` - no numeric reply arrived in time
    /// * `InvalidChoice` - the reply was out of range
    /// * `Cancelled` - the broker shut down
    #[instrument(skip(self, platform, ctx, emotes), fields(author = %ctx.author))]
    pub async fn resolve(
        &self,
        platform: &dyn EmotePlatform,
        ctx: &CommandContext,
        emotes: &[ManagedEmote],
        name: &str,
    ) -> EmoteResult<ManagedEmote> {
        let matches = candidates(emotes, name);
        match matches.as_slice() {
            [] => Err(BatchError::new(BatchErrorKind::EmoteNotFound(
                name.trim_matches(':').to_string(),
            ))
            .into()),
            [only] => Ok((*only).clone()),
            _ => {
                debug!(count = matches.len(), "Ambiguous emote name");
                let pending = self.broker.expect_reply(ctx.author.id, ctx.channel);
                platform
                    .send_message(ctx.channel, &prompt(&matches))
                    .await?;

                let choice = pending.wait(self.timeout).await?;
                pick(&matches, choice)
            }
        }
    }
}

fn prompt(matches: &[&ManagedEmote]) -> String {
    let mut message = String::from("Multiple emotes were found with that name. Which one do you mean?\n");
    for (index, emote) in matches.iter().enumerate() {
        message.push_str(&format!("{}. {} (\\:{}:)\n", index + 1, emote, emote.name()));
    }
    message.push_str("Reply with the number of the emote you want.");
    message
}

fn pick(matches: &[&ManagedEmote], choice: i64) -> EmoteResult<ManagedEmote> {
    usize::try_from(choice)
        .ok()
        .and_then(|choice| choice.checked_sub(1))
        .and_then(|index| matches.get(index))
        .map(|emote| (*emote).clone())
        .ok_or_else(|| {
            BatchError::new(BatchErrorKind::InvalidChoice {
                choice,
                max: matches.len(),
            })
            .into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use emote_core::{EmoteId, GuildId};

    fn emote(id: u64, name: &str) -> ManagedEmote {
        ManagedEmote::new(EmoteId(id), name, false, GuildId(1))
    }

    #[test]
    fn test_candidates_ignore_case_and_colons() {
        let emotes = vec![
            emote(1, "Blob"),
            emote(2, "blob"),
            emote(3, "cat"),
            emote(4, "blob").with_require_colons(false),
        ];
        let found = candidates(&emotes, ":BLOB:");
        let ids: Vec<_> = found.iter().map(|e| e.id().get()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_pick_bounds() {
        let emotes = [emote(1, "a"), emote(2, "a")];
        let matches: Vec<_> = emotes.iter().collect();
        assert_eq!(pick(&matches, 2).unwrap().id().get(), 2);
        for choice in [0, 3, -1] {
            let err = pick(&matches, choice).unwrap_err();
            assert!(matches!(
                err.as_batch().map(|e| &e.kind),
                Some(BatchErrorKind::InvalidChoice { max: 2, .. })
            ));
        }
    }
}
