//! Streaming extraction of zip and tar archives.
//!
//! Archives come from untrusted users, so every entry is checked against a
//! running decompressed-size budget and classified by its magic bytes. Bad
//! entries are reported in-band and never abort the walk.

use emote_core::ImageKind;
use emote_error::{ArchiveError, ArchiveErrorKind};
use futures::Stream;
use std::io::{Cursor, Read};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tracing::{debug, instrument, warn};

const ZIP_LOCAL_HEADER: &[u8] = b"PK\x03\x04";
const ZIP_EMPTY_ARCHIVE: &[u8] = b"PK\x05\x06";
const TAR_BLOCK: usize = 512;

/// One file found inside an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveEntry {
    /// A usable PNG, JPEG or GIF image
    Image {
        /// Path inside the archive
        name: String,
        /// Raw image bytes
        data: Vec<u8>,
        /// Format recognised from the content
        kind: ImageKind,
    },
    /// The entry would push the archive past its decompressed-size budget
    Oversized {
        /// Path inside the archive
        name: String,
        /// Budget for the whole archive
        limit: u64,
        /// Size of this entry
        size: u64,
    },
    /// The entry is unreadable or not an accepted image
    Invalid {
        /// Path inside the archive
        name: String,
        /// Why it was rejected
        reason: String,
    },
}

impl ArchiveEntry {
    /// Path of the entry inside the archive.
    pub fn name(&self) -> &str {
        match self {
            ArchiveEntry::Image { name, .. }
            | ArchiveEntry::Oversized { name, .. }
            | ArchiveEntry::Invalid { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Zip,
    Tar,
}

/// An archive whose container format has been recognised.
#[derive(Debug)]
pub struct ArchiveReader {
    data: Vec<u8>,
    container: Container,
    size_limit: u64,
}

impl ArchiveReader {
    /// Recognise the container format.
    ///
    /// Zip archives are detected by signature. Anything else must parse as a
    /// tar stream.
    ///
    /// # Errors
    ///
    /// Returns `ArchiveErrorKind::UnknownFormat` if the payload is neither zip nor
    /// tar, and `ArchiveErrorKind::Corrupt` if a zip central directory is unreadable.
    /// No entries are produced in either case.
    #[instrument(skip(data), fields(size = data.len()))]
    pub fn open(data: Vec<u8>, size_limit: u64) -> Result<Self, ArchiveError> {
        let container = if data.starts_with(ZIP_LOCAL_HEADER) || data.starts_with(ZIP_EMPTY_ARCHIVE)
        {
            zip::ZipArchive::new(Cursor::new(data.as_slice()))
                .map_err(|e| ArchiveError::new(ArchiveErrorKind::Corrupt(e.to_string())))?;
            Container::Zip
        } else {
            check_tar_header(&data)?;
            Container::Tar
        };

        debug!(?container, "Opened archive");
        Ok(Self {
            data,
            container,
            size_limit,
        })
    }

    /// Stream the archive's entries in archive order.
    ///
    /// Decompression happens on a blocking thread one entry ahead of the
    /// consumer. Dropping the stream stops the walk. Must be called from within
    /// a Tokio runtime.
    pub fn entries(self) -> ArchiveEntries {
        let (sender, receiver) = mpsc::channel(1);
        let ArchiveReader {
            data,
            container,
            size_limit,
        } = self;

        tokio::task::spawn_blocking(move || {
            let mut budget = SizeBudget::new(size_limit);
            let mut emit = |entry: ArchiveEntry| sender.blocking_send(entry).is_ok();
            match container {
                Container::Zip => walk_zip(&data, &mut budget, &mut emit),
                Container::Tar => walk_tar(&data, &mut budget, &mut emit),
            }
        });

        ArchiveEntries { receiver }
    }
}

/// Lazy stream of `ArchiveEntry` values.
#[derive(Debug)]
pub struct ArchiveEntries {
    receiver: mpsc::Receiver<ArchiveEntry>,
}

impl Stream for ArchiveEntries {
    type Item = ArchiveEntry;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

/// Running total of decompressed bytes.
struct SizeBudget {
    limit: u64,
    used: u64,
}

impl SizeBudget {
    fn new(limit: u64) -> Self {
        Self { limit, used: 0 }
    }

    /// Read one entry, trusting neither the declared size nor the payload.
    fn read_entry(&mut self, name: String, declared: u64, reader: impl Read) -> ArchiveEntry {
        let remaining = self.limit.saturating_sub(self.used);
        if declared > remaining {
            return ArchiveEntry::Oversized {
                name,
                limit: self.limit,
                size: declared,
            };
        }

        let mut data = Vec::with_capacity(declared as usize);
        match reader.take(remaining + 1).read_to_end(&mut data) {
            Err(e) => ArchiveEntry::Invalid {
                name,
                reason: e.to_string(),
            },
            Ok(read) if read as u64 > remaining => ArchiveEntry::Oversized {
                name,
                limit: self.limit,
                size: read as u64,
            },
            Ok(read) => {
                self.used += read as u64;
                classify(name, data)
            }
        }
    }
}

fn classify(name: String, data: Vec<u8>) -> ArchiveEntry {
    match ImageKind::sniff(&data) {
        Some(kind) if kind.accepted_in_archive() => ArchiveEntry::Image { name, data, kind },
        Some(kind) => ArchiveEntry::Invalid {
            name,
            reason: format!("{} images are not accepted in archives", kind),
        },
        None => ArchiveEntry::Invalid {
            name,
            reason: "not a PNG, JPEG or GIF image".to_string(),
        },
    }
}

fn check_tar_header(data: &[u8]) -> Result<(), ArchiveError> {
    if data.len() < TAR_BLOCK {
        return Err(ArchiveError::new(ArchiveErrorKind::UnknownFormat));
    }

    let mut archive = tar::Archive::new(Cursor::new(data));
    let mut entries = archive
        .entries()
        .map_err(|_| ArchiveError::new(ArchiveErrorKind::UnknownFormat))?;

    match entries.next() {
        Some(Err(_)) => Err(ArchiveError::new(ArchiveErrorKind::UnknownFormat)),
        Some(Ok(_)) | None => Ok(()),
    }
}

fn walk_zip(data: &[u8], budget: &mut SizeBudget, emit: &mut impl FnMut(ArchiveEntry) -> bool) {
    let mut archive = match zip::ZipArchive::new(Cursor::new(data)) {
        Ok(archive) => archive,
        Err(e) => {
            warn!(error = %e, "Zip archive became unreadable");
            return;
        }
    };

    for index in 0..archive.len() {
        let entry = match archive.by_index(index) {
            Ok(file) if file.is_dir() => continue,
            Ok(file) => {
                let name = file.name().to_string();
                let declared = file.size();
                budget.read_entry(name, declared, file)
            }
            Err(e) => ArchiveEntry::Invalid {
                name: format!("entry #{}", index + 1),
                reason: e.to_string(),
            },
        };

        if !emit(entry) {
            return;
        }
    }
}

fn walk_tar(data: &[u8], budget: &mut SizeBudget, emit: &mut impl FnMut(ArchiveEntry) -> bool) {
    let mut archive = tar::Archive::new(Cursor::new(data));
    let entries = match archive.entries() {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "Tar archive became unreadable");
            return;
        }
    };

    for (index, entry) in entries.enumerate() {
        let entry = match entry {
            Ok(entry) if !entry.header().entry_type().is_file() => continue,
            Ok(entry) => {
                let name = entry
                    .path()
                    .map(|path| path.to_string_lossy().into_owned())
                    .unwrap_or_else(|_| format!("entry #{}", index + 1));
                let declared = entry.size();
                budget.read_entry(name, declared, entry)
            }
            Err(e) => {
                // Tar headers are sequential, so nothing after a bad one can be trusted.
                emit(ArchiveEntry::Invalid {
                    name: format!("entry #{}", index + 1),
                    reason: e.to_string(),
                });
                return;
            }
        };

        if !emit(entry) {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_rejects_declared_size_over_remaining() {
        let mut budget = SizeBudget::new(10);
        let entry = budget.read_entry("big".to_string(), 11, &[0u8; 11][..]);
        assert_eq!(
            entry,
            ArchiveEntry::Oversized {
                name: "big".to_string(),
                limit: 10,
                size: 11
            }
        );
        assert_eq!(budget.used, 0);
    }

    #[test]
    fn test_budget_catches_understated_size() {
        let mut budget = SizeBudget::new(10);
        let entry = budget.read_entry("liar".to_string(), 2, &[0u8; 64][..]);
        assert!(matches!(entry, ArchiveEntry::Oversized { size: 11, .. }));
    }

    #[test]
    fn test_budget_accumulates_across_entries() {
        let mut budget = SizeBudget::new(10);
        let first = budget.read_entry("a".to_string(), 6, &[0u8; 6][..]);
        assert!(matches!(first, ArchiveEntry::Invalid { .. }));
        assert_eq!(budget.used, 6);

        let second = budget.read_entry("b".to_string(), 6, &[0u8; 6][..]);
        assert!(matches!(second, ArchiveEntry::Oversized { limit: 10, size: 6, .. }));
    }

    #[test]
    fn test_unknown_format() {
        let err = ArchiveReader::open(b"hello".to_vec(), 100).unwrap_err();
        assert_eq!(err.kind, ArchiveErrorKind::UnknownFormat);

        let err = ArchiveReader::open(vec![0xAB; 2048], 100).unwrap_err();
        assert_eq!(err.kind, ArchiveErrorKind::UnknownFormat);
    }
}
