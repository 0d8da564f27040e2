//! Quota-aware emote creation.

use crate::convert::{EMOTE_SIZE_LIMIT, convert_to_category, shrink_to_fit};
use crate::platform::EmotePlatform;
use emote_core::{Author, Category, GuildId, ImageKind, ManagedEmote, QuotaState};
use emote_error::{
    BatchError, BatchErrorKind, EmoteResult, ItemError, ItemErrorKind, PlatformErrorKind,
};
use tracing::{debug, info, instrument, warn};

/// One emote to create.
#[derive(Debug, Clone)]
pub struct CreationRequest {
    /// Emote name
    pub name: String,
    /// Raw image bytes
    pub image: Vec<u8>,
    /// User on whose behalf the emote is created
    pub author: Author,
    /// Audit log reason; defaults to `Created by <author>`
    pub reason: Option<String>,
}

impl CreationRequest {
    /// Create a request with the default audit log reason.
    pub fn new(name: impl Into<String>, image: Vec<u8>, author: Author) -> Self {
        Self {
            name: name.into(),
            image,
            author,
            reason: None,
        }
    }
}

/// Outcome of a creation attempt that did not abort the batch.
#[derive(Debug, Clone)]
pub enum CreationReport {
    /// The emote exists now
    Created {
        /// The new emote
        emote: ManagedEmote,
        /// Set if the image was converted to fit the other category's quota
        converted: Option<Category>,
    },
    /// This item failed; the batch goes on
    Failed(ItemError),
}

impl CreationReport {
    /// Whether the emote was created.
    pub fn is_created(&self) -> bool {
        matches!(self, CreationReport::Created { .. })
    }

    /// Message shown to the requesting user.
    pub fn user_message(&self) -> String {
        match self {
            CreationReport::Created {
                emote,
                converted: None,
            } => format!("Emote {} successfully created.", emote),
            CreationReport::Created {
                emote,
                converted: Some(Category::Animated),
            } => format!("Emote {} successfully created as a GIF.", emote),
            CreationReport::Created {
                emote,
                converted: Some(Category::Static),
            } => format!("Emote {} successfully created as a PNG.", emote),
            CreationReport::Failed(err) => err.user_message(),
        }
    }
}

/// Creates emotes, converting between static and animated when one quota is full.
#[derive(Debug, Clone)]
pub struct CreationPipeline {
    size_limit: usize,
}

impl Default for CreationPipeline {
    fn default() -> Self {
        Self::new(EMOTE_SIZE_LIMIT)
    }
}

impl CreationPipeline {
    /// Static images larger than `size_limit` bytes are downscaled before upload.
    pub fn new(size_limit: usize) -> Self {
        Self { size_limit }
    }

    /// Create one emote.
    ///
    /// Quota is read fresh from the platform on every call, so concurrent
    /// changes made elsewhere are respected.
    ///
    /// # Errors
    ///
    /// Returns `BatchErrorKind::QuotaExhausted` when neither category has room,
    /// before any conversion is attempted. Platform outages are also returned as
    /// errors. Everything specific to this item is reported as
    /// `CreationReport::Failed`.
    #[instrument(
        skip(self, platform, request),
        fields(guild = %guild, name = %request.name, size = request.image.len())
    )]
    pub async fn create(
        &self,
        platform: &dyn EmotePlatform,
        guild: GuildId,
        request: CreationRequest,
    ) -> EmoteResult<CreationReport> {
        let emotes = platform.emotes(guild).await?;
        let limits = platform.guild_limits(guild).await?;
        let quota = QuotaState::from_emotes(&emotes, limits.emoji_limit);

        if quota.is_exhausted() {
            warn!(limit = quota.limit(), "No emote slots left");
            return Err(BatchError::new(BatchErrorKind::QuotaExhausted).into());
        }

        let CreationRequest {
            name,
            image,
            author,
            reason,
        } = request;

        let Some(kind) = ImageKind::sniff(&image) else {
            return Ok(CreationReport::Failed(ItemError::new(
                name,
                ItemErrorKind::InvalidImage,
            )));
        };

        let wanted = kind.category();
        let Some(placement) = quota.placement(wanted) else {
            return Err(BatchError::new(BatchErrorKind::QuotaExhausted).into());
        };

        let (image, converted) = if placement == wanted {
            (image, None)
        } else {
            debug!(from = %wanted, to = %placement, "Converting to fit quota");
            match convert_to_category(image, placement).await {
                Ok(image) => (image, Some(placement)),
                Err(kind) => return Ok(CreationReport::Failed(ItemError::new(name, kind))),
            }
        };

        let image = if placement == Category::Static {
            match shrink_to_fit(image, self.size_limit).await {
                Ok(image) => image,
                Err(kind) => return Ok(CreationReport::Failed(ItemError::new(name, kind))),
            }
        } else {
            image
        };

        let reason = reason.unwrap_or_else(|| format!("Created by {}", author));
        match platform.create_emote(guild, &name, &image, &reason).await {
            Ok(emote) => {
                info!(emote = %emote, converted = converted.is_some(), "Created emote");
                Ok(CreationReport::Created { emote, converted })
            }
            Err(err) => match err.kind {
                PlatformErrorKind::InvalidPayload(_) => Ok(CreationReport::Failed(
                    ItemError::new(name, ItemErrorKind::InvalidImage),
                )),
                PlatformErrorKind::Http { status, message } => Ok(CreationReport::Failed(
                    ItemError::new(name, ItemErrorKind::Rejected { status, message }),
                )),
                PlatformErrorKind::Unavailable(_) => Err(err.into()),
            },
        }
    }
}
