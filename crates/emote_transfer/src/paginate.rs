//! Reaction-driven paging of long lists.

use crate::platform::EmotePlatform;
use emote_core::{ChannelId, MessageId, UserId};
use emote_error::EmoteResult;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, instrument};

const MAX_PAGE_LINES: usize = 20;
const MAX_PAGE_CHARS: usize = 1900;

/// Navigation reactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageControl {
    /// Jump to the first page
    First,
    /// Go back one page
    Previous,
    /// Go forward one page
    Next,
    /// Jump to the last page
    Last,
    /// End the session
    Stop,
}

impl PageControl {
    /// All controls in the order they are attached to a message.
    pub const ALL: [PageControl; 5] = [
        PageControl::First,
        PageControl::Previous,
        PageControl::Next,
        PageControl::Last,
        PageControl::Stop,
    ];

    /// The reaction emoji for this control.
    pub fn emoji(self) -> &'static str {
        match self {
            PageControl::First => "\u{23ee}",
            PageControl::Previous => "\u{25c0}",
            PageControl::Next => "\u{25b6}",
            PageControl::Last => "\u{23ed}",
            PageControl::Stop => "\u{23f9}",
        }
    }

    /// Recognise a reaction, ignoring a trailing variation selector.
    pub fn from_emoji(emoji: &str) -> Option<Self> {
        let emoji = emoji.trim_end_matches('\u{fe0f}');
        Self::ALL.into_iter().find(|control| control.emoji() == emoji)
    }

    fn apply(self, current: usize, pages: usize) -> Option<usize> {
        let last = pages.saturating_sub(1);
        match self {
            PageControl::First => Some(0),
            PageControl::Previous => Some(current.saturating_sub(1)),
            PageControl::Next => Some((current + 1).min(last)),
            PageControl::Last => Some(last),
            PageControl::Stop => None,
        }
    }
}

/// Live paging sessions, keyed by the message being paged.
///
/// Sessions remove themselves when they end; `shutdown` ends them all.
#[derive(Debug, Default)]
pub struct PaginatorRegistry {
    sessions: Mutex<HashMap<MessageId, Session>>,
}

#[derive(Debug)]
struct Session {
    owner: UserId,
    controls: mpsc::Sender<PageControl>,
}

impl PaginatorRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking a session for `message`, controllable only by `owner`.
    pub fn register(&self, message: MessageId, owner: UserId) -> PaginatorTicket<'_> {
        let (controls, receiver) = mpsc::channel(8);
        self.sessions
            .lock()
            .insert(message, Session { owner, controls });
        PaginatorTicket {
            registry: self,
            message,
            receiver,
        }
    }

    /// Forward a reaction to the session paging `message`.
    ///
    /// Returns `false` if there is no such session or `user` does not own it.
    pub fn route(&self, message: MessageId, user: UserId, control: PageControl) -> bool {
        let sessions = self.sessions.lock();
        match sessions.get(&message) {
            Some(session) if session.owner == user => session.controls.try_send(control).is_ok(),
            _ => false,
        }
    }

    /// Number of live sessions.
    pub fn active(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Stop every session. Returns how many were running.
    pub fn shutdown(&self) -> usize {
        let sessions: Vec<Session> = self.sessions.lock().drain().map(|(_, s)| s).collect();
        for session in &sessions {
            // A full queue still ends once the sender is dropped.
            let _ = session.controls.try_send(PageControl::Stop);
        }
        debug!(stopped = sessions.len(), "Stopped paginators");
        sessions.len()
    }

    fn remove(&self, message: MessageId) {
        self.sessions.lock().remove(&message);
    }
}

/// A registered session. Dropping it unregisters the session.
#[derive(Debug)]
pub struct PaginatorTicket<'a> {
    registry: &'a PaginatorRegistry,
    message: MessageId,
    receiver: mpsc::Receiver<PageControl>,
}

impl PaginatorTicket<'_> {
    /// Next control from the owner, or `None` once the registry shut down.
    pub async fn next_control(&mut self) -> Option<PageControl> {
        self.receiver.recv().await
    }
}

impl Drop for PaginatorTicket<'_> {
    fn drop(&mut self) {
        self.registry.remove(self.message);
    }
}

/// Splits lines into message-sized pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPaginator {
    pages: Vec<String>,
}

impl ListPaginator {
    /// Paginate `lines`, at most 20 lines and 1900 characters per page.
    pub fn new(lines: impl IntoIterator<Item = String>) -> Self {
        let mut pages = Vec::new();
        let mut page = String::new();
        let mut count = 0;

        for line in lines {
            let fits = count < MAX_PAGE_LINES
                && page.chars().count() + line.chars().count() + 1 <= MAX_PAGE_CHARS;
            if !fits && count > 0 {
                pages.push(std::mem::take(&mut page));
                count = 0;
            }
            if count > 0 {
                page.push('\n');
            }
            page.push_str(&line);
            count += 1;
        }

        if count > 0 {
            pages.push(page);
        }
        Self { pages }
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Text of page `index`, with a footer when there is more than one page.
    pub fn render(&self, index: usize) -> String {
        let Some(page) = self.pages.get(index) else {
            return String::from("Nothing to show.");
        };

        if self.pages.len() > 1 {
            format!("{}\n\nPage {}/{}", page, index + 1, self.pages.len())
        } else {
            page.clone()
        }
    }

    /// Post the first page and follow the owner's reactions until stopped or idle.
    ///
    /// A single page is posted without controls and returns at once.
    #[instrument(skip(self, platform, registry), fields(pages = self.pages.len()))]
    pub async fn begin(
        &self,
        platform: &dyn EmotePlatform,
        registry: &PaginatorRegistry,
        channel: ChannelId,
        owner: UserId,
        idle_timeout: Duration,
    ) -> EmoteResult<()> {
        let message = platform.send_message(channel, &self.render(0)).await?;
        if self.pages.len() <= 1 {
            return Ok(());
        }

        let mut ticket = registry.register(message, owner);
        for control in PageControl::ALL {
            platform
                .add_reaction(channel, message, control.emoji())
                .await?;
        }

        let mut current = 0;
        loop {
            let control = match tokio::time::timeout(idle_timeout, ticket.next_control()).await {
                Ok(Some(control)) => control,
                Ok(None) => break,
                Err(_) => {
                    debug!("Paginator idle");
                    break;
                }
            };

            let Some(next) = control.apply(current, self.pages.len()) else {
                break;
            };
            if next != current {
                current = next;
                platform
                    .edit_message(channel, message, &self.render(current))
                    .await?;
            }
        }

        Ok(())
    }
}
