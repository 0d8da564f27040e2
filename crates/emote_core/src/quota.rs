//! Per-category emote slot accounting.

use crate::{Category, ManagedEmote};
use serde::{Deserialize, Serialize};

/// Limits a guild is subject to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildLimits {
    /// Maximum emotes per category
    pub emoji_limit: usize,
    /// Maximum upload size in bytes
    pub filesize_limit: u64,
}

impl GuildLimits {
    /// Limits for a guild at the given boost tier (0 to 3).
    pub fn for_premium_tier(tier: u8) -> Self {
        const MIB: u64 = 1024 * 1024;
        match tier {
            0 => Self {
                emoji_limit: 50,
                filesize_limit: 10 * MIB,
            },
            1 => Self {
                emoji_limit: 100,
                filesize_limit: 10 * MIB,
            },
            2 => Self {
                emoji_limit: 150,
                filesize_limit: 50 * MIB,
            },
            _ => Self {
                emoji_limit: 250,
                filesize_limit: 100 * MIB,
            },
        }
    }
}

/// Emote counts per category against the guild's limit.
///
/// A snapshot: recompute it before every creation, since each creation changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaState {
    static_count: usize,
    animated_count: usize,
    limit: usize,
}

impl QuotaState {
    /// Create a quota snapshot from explicit counts.
    pub fn new(static_count: usize, animated_count: usize, limit: usize) -> Self {
        Self {
            static_count,
            animated_count,
            limit,
        }
    }

    /// Count the guild's existing emotes.
    pub fn from_emotes<'a>(emotes: impl IntoIterator<Item = &'a ManagedEmote>, limit: usize) -> Self {
        let (animated, still): (Vec<_>, Vec<_>) =
            emotes.into_iter().partition(|emote| *emote.animated());
        Self::new(still.len(), animated.len(), limit)
    }

    /// Number of emotes in a category.
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Static => self.static_count,
            Category::Animated => self.animated_count,
        }
    }

    /// Per-category limit.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Free slots in a category.
    pub fn remaining(&self, category: Category) -> usize {
        self.limit.saturating_sub(self.count(category))
    }

    /// Whether a category has a free slot.
    ///
    /// Counts can exceed the limit, e.g. after a guild loses its boost.
    pub fn has_room(&self, category: Category) -> bool {
        self.count(category) < self.limit
    }

    /// Whether no category has a free slot.
    pub fn is_exhausted(&self) -> bool {
        !self.has_room(Category::Static) && !self.has_room(Category::Animated)
    }

    /// Category a new emote of the wanted category should be created in.
    ///
    /// Falls back to the other category when the wanted one is full; `None` when
    /// the guild is out of slots altogether.
    pub fn placement(&self, wanted: Category) -> Option<Category> {
        if self.has_room(wanted) {
            Some(wanted)
        } else if self.has_room(wanted.other()) {
            Some(wanted.other())
        } else {
            None
        }
    }
}
