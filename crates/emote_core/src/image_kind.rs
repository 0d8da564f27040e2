//! Image formats accepted as emotes, recognised by content rather than filename.

use crate::Category;
use image::ImageFormat;

/// Image formats the platform accepts for emotes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::EnumIter,
    derive_more::Display,
)]
pub enum ImageKind {
    /// Portable Network Graphics
    #[display("PNG")]
    Png,
    /// JPEG
    #[display("JPEG")]
    Jpeg,
    /// Graphics Interchange Format
    #[display("GIF")]
    Gif,
    /// WebP
    #[display("WEBP")]
    WebP,
}

impl ImageKind {
    /// Identify the image format from the payload's magic bytes.
    ///
    /// Returns `None` for anything that is not PNG, JPEG, GIF or WEBP.
    ///
    /// # Examples
    ///
    /// ```
    /// use emote_core::ImageKind;
    ///
    /// assert_eq!(ImageKind::sniff(b"GIF89a\x01\x00\x01\x00"), Some(ImageKind::Gif));
    /// assert_eq!(ImageKind::sniff(b"definitely not an image"), None);
    /// ```
    pub fn sniff(data: &[u8]) -> Option<Self> {
        match image::guess_format(data).ok()? {
            ImageFormat::Png => Some(ImageKind::Png),
            ImageFormat::Jpeg => Some(ImageKind::Jpeg),
            ImageFormat::Gif => Some(ImageKind::Gif),
            ImageFormat::WebP => Some(ImageKind::WebP),
            _ => None,
        }
    }

    /// MIME type for the format.
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Gif => "image/gif",
            ImageKind::WebP => "image/webp",
        }
    }

    /// Quota category an emote made from this format falls into.
    pub fn category(self) -> Category {
        match self {
            ImageKind::Gif => Category::Animated,
            _ => Category::Static,
        }
    }

    /// Whether archive imports accept this format.
    pub fn accepted_in_archive(self) -> bool {
        !matches!(self, ImageKind::WebP)
    }

    /// The matching `image` crate format.
    pub fn image_format(self) -> ImageFormat {
        match self {
            ImageKind::Png => ImageFormat::Png,
            ImageKind::Jpeg => ImageFormat::Jpeg,
            ImageKind::Gif => ImageFormat::Gif,
            ImageKind::WebP => ImageFormat::WebP,
        }
    }
}
