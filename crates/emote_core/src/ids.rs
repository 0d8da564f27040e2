//! Snowflake identifiers.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Milliseconds between the Unix epoch and the Discord epoch (2015-01-01).
const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            Serialize,
            Deserialize,
            derive_more::Display,
            derive_more::From,
        )]
        #[display("{}", _0)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw snowflake value.
            pub fn get(self) -> u64 {
                self.0
            }

            /// Creation time encoded in the snowflake, truncated to milliseconds.
            pub fn created_at(self) -> DateTime<Utc> {
                let millis = (self.0 >> 22) + DISCORD_EPOCH_MS;
                Utc.timestamp_millis_opt(millis as i64)
                    .single()
                    .unwrap_or_default()
            }
        }
    };
}

snowflake!(
    /// Guild (server) identifier. A guild owns a set of emotes and their quotas.
    GuildId
);
snowflake!(
    /// Channel identifier.
    ChannelId
);
snowflake!(
    /// User identifier.
    UserId
);
snowflake!(
    /// Message identifier.
    MessageId
);
snowflake!(
    /// Custom emote identifier.
    EmoteId
);
