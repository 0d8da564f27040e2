//! Image conversion between emote categories.
//!
//! Decoding and encoding are CPU-bound, so they run on Tokio's blocking pool.

use emote_core::Category;
use emote_error::ItemErrorKind;
use image::codecs::gif::GifEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, Frame, ImageFormat};
use std::io::Cursor;
use tracing::{debug, instrument};

/// Largest image the platform accepts for an emote, in bytes.
pub const EMOTE_SIZE_LIMIT: usize = 256 * 1024;

/// Re-encode an image so it counts against `target`'s quota.
///
/// Static images become single-frame GIFs. Animated images become a PNG of
/// their first frame.
#[instrument(skip(data), fields(size = data.len()))]
pub async fn convert_to_category(data: Vec<u8>, target: Category) -> Result<Vec<u8>, ItemErrorKind> {
    run_blocking(move || match target {
        Category::Animated => to_gif(&data),
        Category::Static => to_png(&data),
    })
    .await
}

/// Downscale a static image until its PNG encoding fits in `limit` bytes.
///
/// Images already within the limit are returned untouched.
#[instrument(skip(data), fields(size = data.len()))]
pub async fn shrink_to_fit(data: Vec<u8>, limit: usize) -> Result<Vec<u8>, ItemErrorKind> {
    if data.len() <= limit {
        return Ok(data);
    }

    run_blocking(move || {
        let mut image = image::load_from_memory(&data)?;
        loop {
            let (width, height) = (image.width() / 2, image.height() / 2);
            if width == 0 || height == 0 {
                return Err(image::ImageError::Limits(
                    image::error::LimitError::from_kind(
                        image::error::LimitErrorKind::DimensionError,
                    ),
                ));
            }

            image = image.resize(width, height, FilterType::Triangle);
            let encoded = encode_png(&image)?;
            debug!(width, height, size = encoded.len(), "Downscaled");
            if encoded.len() <= limit {
                return Ok(encoded);
            }
        }
    })
    .await
}

async fn run_blocking<F>(work: F) -> Result<Vec<u8>, ItemErrorKind>
where
    F: FnOnce() -> image::ImageResult<Vec<u8>> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ItemErrorKind::Conversion(e.to_string()))?
        .map_err(|e| ItemErrorKind::Conversion(e.to_string()))
}

fn to_gif(data: &[u8]) -> image::ImageResult<Vec<u8>> {
    let image = image::load_from_memory(data)?;
    let mut out = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut out);
        encoder.encode_frame(Frame::new(image.to_rgba8()))?;
    }
    Ok(out)
}

/// GIF decoding yields the first frame.
fn to_png(data: &[u8]) -> image::ImageResult<Vec<u8>> {
    let image = image::load_from_memory(data)?;
    encode_png(&image)
}

fn encode_png(image: &DynamicImage) -> image::ImageResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png)?;
    Ok(out.into_inner())
}
