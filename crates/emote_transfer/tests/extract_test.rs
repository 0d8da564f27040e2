//! Tests for streaming archive extraction.

mod common;

use common::{gif, png, tar_archive, zip_archive};
use emote_core::ImageKind;
use emote_error::ArchiveErrorKind;
use emote_transfer::{ArchiveEntry, ArchiveReader};
use futures::StreamExt;

async fn extract(data: Vec<u8>, limit: u64) -> Vec<ArchiveEntry> {
    ArchiveReader::open(data, limit)
        .expect("Archive opens")
        .entries()
        .collect()
        .await
}

#[tokio::test]
async fn test_zip_images_in_order() {
    let still = png(4, 4);
    let moving = gif(4, 4);
    let archive = zip_archive(&[
        ("one.png", still.as_slice()),
        ("dir/two.gif", moving.as_slice()),
    ]);

    let entries = extract(archive, 1_000_000).await;
    assert_eq!(
        entries,
        vec![
            ArchiveEntry::Image {
                name: "one.png".to_string(),
                data: still,
                kind: ImageKind::Png
            },
            ArchiveEntry::Image {
                name: "dir/two.gif".to_string(),
                data: moving,
                kind: ImageKind::Gif
            },
        ]
    );
}

#[tokio::test]
async fn test_tar_images() {
    let still = png(4, 4);
    let archive = tar_archive(&[("emotes/blob.png", still.as_slice())]);

    let entries = extract(archive, 1_000_000).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name(), "emotes/blob.png");
    assert!(matches!(entries[0], ArchiveEntry::Image { kind: ImageKind::Png, .. }));
}

#[tokio::test]
async fn test_format_is_sniffed_not_guessed_from_name() {
    let still = png(4, 4);
    let archive = zip_archive(&[
        ("actually-a-png.txt", still.as_slice()),
        ("fake.png", &b"this is plain text, not an image"[..]),
    ]);

    let entries = extract(archive, 1_000_000).await;
    assert!(matches!(entries[0], ArchiveEntry::Image { kind: ImageKind::Png, .. }));
    assert!(matches!(entries[1], ArchiveEntry::Invalid { .. }));
    assert_eq!(entries[1].name(), "fake.png");
}

#[tokio::test]
async fn test_oversized_entry_among_valid_ones() {
    let first = png(2, 2);
    let last = png(3, 3);
    let big = vec![0u8; 5000];
    let limit = 1000;
    assert!((first.len() + last.len()) < limit as usize);

    let archive = zip_archive(&[
        ("first.png", first.as_slice()),
        ("big.png", big.as_slice()),
        ("last.png", last.as_slice()),
    ]);
    let entries = extract(archive, limit).await;

    assert_eq!(entries.len(), 3);
    assert!(matches!(entries[0], ArchiveEntry::Image { .. }));
    assert_eq!(
        entries[1],
        ArchiveEntry::Oversized {
            name: "big.png".to_string(),
            limit: 1000,
            size: 5000
        }
    );
    assert!(matches!(entries[2], ArchiveEntry::Image { .. }));
}

#[tokio::test]
async fn test_budget_is_cumulative() {
    let image = png(8, 8);
    let limit = image.len() as u64 * 2 + 10;
    let archive = zip_archive(&[
        ("a.png", image.as_slice()),
        ("b.png", image.as_slice()),
        ("c.png", image.as_slice()),
    ]);

    let entries = extract(archive, limit).await;
    assert!(matches!(entries[0], ArchiveEntry::Image { .. }));
    assert!(matches!(entries[1], ArchiveEntry::Image { .. }));
    assert!(matches!(entries[2], ArchiveEntry::Oversized { .. }));
}

#[tokio::test]
async fn test_corrupt_zip_yields_no_entries() {
    let mut archive = zip_archive(&[("a.png", png(4, 4).as_slice())]);
    archive.truncate(archive.len() / 2);

    let err = ArchiveReader::open(archive, 1_000_000).unwrap_err();
    assert!(matches!(err.kind, ArchiveErrorKind::Corrupt(_)));
}

#[tokio::test]
async fn test_not_an_archive() {
    let err = ArchiveReader::open(png(4, 4), 1_000_000).unwrap_err();
    assert_eq!(err.kind, ArchiveErrorKind::UnknownFormat);
}

#[tokio::test]
async fn test_corrupt_tar_tail_ends_stream() {
    let still = png(4, 4);
    let mut archive = tar_archive(&[("a.png", still.as_slice()), ("b.png", still.as_slice())]);

    // Damage the second header's checksum field.
    let second_header = 512 + still.len().div_ceil(512) * 512;
    archive[second_header + 148..second_header + 156].copy_from_slice(b"garbage!");

    let entries = extract(archive, 1_000_000).await;
    assert_eq!(entries.len(), 2);
    assert!(matches!(entries[0], ArchiveEntry::Image { .. }));
    assert!(matches!(entries[1], ArchiveEntry::Invalid { .. }));
}

#[tokio::test]
async fn test_dropping_stream_early_is_fine() {
    let image = png(4, 4);
    let archive = zip_archive(&[
        ("a.png", image.as_slice()),
        ("b.png", image.as_slice()),
        ("c.png", image.as_slice()),
    ]);

    let mut entries = ArchiveReader::open(archive, 1_000_000).unwrap().entries();
    let first = entries.next().await;
    assert!(matches!(first, Some(ArchiveEntry::Image { .. })));
    drop(entries);
}
