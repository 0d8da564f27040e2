//! Configuration for the emote manager.
//!
//! Configuration sources, in increasing order of precedence:
//! 1. Bundled defaults (`emote_manager.toml` at the workspace root)
//! 2. `~/.config/emote_manager/emote_manager.toml`
//! 3. `./emote_manager.toml`
//!
//! User files are optional and skipped when missing.

use config::{Config, File, FileFormat};
use derive_getters::Getters;
use emote_error::{ConfigError, EmoteResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../emote_manager.toml");

/// Chat-facing bot settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Getters)]
pub struct BotSettings {
    /// Command prefix, e.g. `em/`
    prefix: String,
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Getters)]
pub struct HttpSettings {
    /// User-Agent header sent with every request
    user_agent: String,
    /// Bound on a whole download, in seconds
    read_timeout_secs: u64,
    /// Bound on the header check, in seconds
    head_timeout_secs: u64,
}

impl HttpSettings {
    /// Download timeout.
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }

    /// Header check timeout.
    pub fn head_timeout(&self) -> Duration {
        Duration::from_secs(self.head_timeout_secs)
    }
}

/// Archive import settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Getters)]
pub struct ImportSettings {
    /// Ceiling on the total decompressed bytes of one archive
    size_limit: u64,
}

/// Export/import scheduling settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Getters)]
pub struct TransferSettings {
    /// Seconds between transfers in the same guild; 0 disables the cooldown
    cooldown_secs: u64,
}

impl TransferSettings {
    /// Cooldown window.
    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

/// Interactive name disambiguation settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Getters)]
pub struct DisambiguationSettings {
    /// Seconds to wait for the user's choice
    timeout_secs: u64,
}

impl DisambiguationSettings {
    /// Reply deadline.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Paginated list settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Getters)]
pub struct PaginationSettings {
    /// Seconds without interaction before a list stops responding
    idle_timeout_secs: u64,
}

impl PaginationSettings {
    /// Idle timeout.
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

/// Top-level emote manager configuration.
///
/// # Example
///
/// ```no_run
/// use emote_rate_limit::EmoteConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = EmoteConfig::load()?;
/// println!("Import ceiling: {} bytes", config.import().size_limit());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Getters)]
pub struct EmoteConfig {
    /// Bot settings
    bot: BotSettings,
    /// HTTP client settings
    http: HttpSettings,
    /// Archive import settings
    import: ImportSettings,
    /// Transfer scheduling settings
    transfer: TransferSettings,
    /// Disambiguation settings
    disambiguation: DisambiguationSettings,
    /// Pagination settings
    pagination: PaginationSettings,
}

impl EmoteConfig {
    /// The bundled defaults, without user overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled file is malformed.
    pub fn bundled() -> EmoteResult<Self> {
        Self::build(Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml)))
    }

    /// Load configuration from a specific file layered over the bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> EmoteResult<Self> {
        debug!("Loading configuration from file");

        Self::build(
            Config::builder()
                .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
                .add_source(File::from(path.as_ref())),
        )
    }

    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be parsed.
    #[instrument]
    pub fn load() -> EmoteResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/emote_manager/emote_manager.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("emote_manager").required(false));

        Self::build(builder)
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> EmoteResult<Self> {
        let config: Self = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.prefix.is_empty() {
            return Err(ConfigError::new("bot.prefix must not be empty"));
        }
        if self.http.read_timeout_secs == 0 || self.http.head_timeout_secs == 0 {
            return Err(ConfigError::new("http timeouts must be at least one second"));
        }
        if self.import.size_limit == 0 {
            return Err(ConfigError::new("import.size_limit must be positive"));
        }
        if self.disambiguation.timeout_secs == 0 {
            return Err(ConfigError::new("disambiguation.timeout_secs must be positive"));
        }
        Ok(())
    }
}
