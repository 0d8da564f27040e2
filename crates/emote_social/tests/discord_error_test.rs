#![cfg(feature = "discord")]

use emote_error::{ConfigError, EmoteError};
use emote_rate_limit::EmoteConfig;
use emote_social::{DiscordError, DiscordErrorKind, EmoteBot};

#[test]
fn test_setup_errors_become_configuration_errors() {
    let err: DiscordError = EmoteError::from(ConfigError::new("bad http settings")).into();
    match err.kind() {
        DiscordErrorKind::ConfigurationError(message) => {
            assert!(message.contains("bad http settings"))
        }
        other => panic!("unexpected kind: {other}"),
    }
}

#[tokio::test]
async fn test_blank_token_is_rejected_before_connecting() {
    let config = EmoteConfig::bundled().unwrap();
    let err = EmoteBot::new("   ".to_string(), config).await.err().unwrap();
    assert_eq!(err.kind(), &DiscordErrorKind::InvalidToken);
}
