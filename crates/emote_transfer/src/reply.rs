//! Routing of numeric replies to waiting prompts.

use emote_core::{ChannelId, UserId};
use emote_error::{BatchError, BatchErrorKind};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, instrument};

type ReplyKey = (UserId, ChannelId);

/// Delivers a user's numeric reply to the prompt waiting for it.
///
/// At most one prompt waits per (user, channel). A newer prompt replaces an
/// older one, whose waiter is then cancelled.
#[derive(Debug, Default)]
pub struct ReplyBroker {
    waiters: Mutex<HashMap<ReplyKey, oneshot::Sender<i64>>>,
    closed: AtomicBool,
}

impl ReplyBroker {
    /// Create an empty broker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register interest in the next integer `author` sends in `channel`.
    ///
    /// Register before posting the prompt so that a fast reply is not missed.
    pub fn expect_reply(&self, author: UserId, channel: ChannelId) -> PendingReply {
        let (sender, receiver) = oneshot::channel();
        if self.closed.load(Ordering::Acquire) {
            // Dropping the sender cancels the reply straight away.
            return PendingReply { receiver };
        }

        let mut waiters = self.waiters.lock();
        waiters.retain(|_, waiter| !waiter.is_closed());
        waiters.insert((author, channel), sender);
        PendingReply { receiver }
    }

    /// Offer an incoming message.
    ///
    /// Returns `true` if it was a whole number that resolved a waiting prompt.
    #[instrument(skip(self, content), fields(author = %author, channel = %channel))]
    pub fn offer(&self, author: UserId, channel: ChannelId, content: &str) -> bool {
        let Ok(choice) = content.trim().parse::<i64>() else {
            return false;
        };

        let Some(sender) = self.waiters.lock().remove(&(author, channel)) else {
            return false;
        };

        let delivered = sender.send(choice).is_ok();
        debug!(choice, delivered, "Offered reply");
        delivered
    }

    /// Cancel every waiting prompt and refuse new ones.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Release);
        let cancelled = {
            let mut waiters = self.waiters.lock();
            let count = waiters.len();
            waiters.clear();
            count
        };
        debug!(cancelled, "Closed reply broker");
    }

    /// Number of prompts still waiting.
    pub fn pending(&self) -> usize {
        self.waiters
            .lock()
            .values()
            .filter(|waiter| !waiter.is_closed())
            .count()
    }
}

/// A prompt's claim on the next numeric reply.
#[derive(Debug)]
pub struct PendingReply {
    receiver: oneshot::Receiver<i64>,
}

impl PendingReply {
    /// Wait for the reply.
    ///
    /// # Errors
    ///
    /// Returns `BatchErrorKind::TookTooLong` when `timeout` elapses and
    /// `BatchErrorKind::Cancelled` if the broker is closed or the prompt replaced.
    pub async fn wait(self, timeout: Duration) -> Result<i64, BatchError> {
        match tokio::time::timeout(timeout, self.receiver).await {
            Ok(Ok(choice)) => Ok(choice),
            Ok(Err(_)) => Err(BatchError::new(BatchErrorKind::Cancelled)),
            Err(_) => Err(BatchError::new(BatchErrorKind::TookTooLong)),
        }
    }
}
