//! Per-guild transfer cooldown using governor.
//!
//! Exports and imports are expensive for both the bot and the platform, so each
//! guild may start one transfer per window. The GCRA limiter is keyed by guild and
//! allows a burst of one.

use emote_core::GuildId;
use emote_error::{BatchError, BatchErrorKind};
use governor::clock::{Clock, DefaultClock};
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use std::time::Duration;
use tracing::{debug, instrument};

type KeyedRateLimiter = RateLimiter<GuildId, DefaultKeyedStateStore<GuildId>, DefaultClock>;

/// One transfer per guild per window.
///
/// # Example
///
/// ```
/// use emote_core::GuildId;
/// use emote_rate_limit::TransferCooldown;
/// use std::time::Duration;
///
/// let cooldown = TransferCooldown::new(Duration::from_secs(20));
/// assert!(cooldown.check(GuildId(1)).is_ok());
/// assert!(cooldown.check(GuildId(1)).is_err());
/// assert!(cooldown.check(GuildId(2)).is_ok());
/// ```
pub struct TransferCooldown {
    // None when the window is zero, i.e. cooldowns are disabled
    limiter: Option<KeyedRateLimiter>,
    clock: DefaultClock,
}

impl TransferCooldown {
    /// Create a cooldown with the given window.
    pub fn new(window: Duration) -> Self {
        let limiter = Quota::with_period(window).map(RateLimiter::keyed);
        Self {
            limiter,
            clock: DefaultClock::default(),
        }
    }

    /// Record a transfer for the guild, or fail if the previous one was too recent.
    ///
    /// # Errors
    ///
    /// Returns `BatchErrorKind::Cooldown` with the whole seconds left, rounded up.
    #[instrument(skip(self), fields(guild = %guild))]
    pub fn check(&self, guild: GuildId) -> Result<(), BatchError> {
        let Some(limiter) = &self.limiter else {
            return Ok(());
        };

        limiter.retain_recent();

        match limiter.check_key(&guild) {
            Ok(()) => {
                debug!("Transfer allowed");
                Ok(())
            }
            Err(not_until) => {
                let wait = not_until.wait_time_from(self.clock.now());
                debug!(wait_ms = wait.as_millis() as u64, "Transfer on cooldown");
                Err(BatchError::new(BatchErrorKind::Cooldown {
                    retry_after_secs: wait.as_secs() + 1,
                }))
            }
        }
    }
}
