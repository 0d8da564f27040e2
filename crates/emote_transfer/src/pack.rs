//! Packing emotes into size-bounded zip shards.
//!
//! Shards are filled first-fit in input order, so every emote lands in exactly
//! one shard and shard `n` only holds emotes listed after those in shard `n - 1`.

use chrono::{DateTime, Datelike, Timelike, Utc};
use derive_getters::Getters;
use emote_core::Category;
use emote_error::{ArchiveError, ArchiveErrorKind};
use std::collections::{HashMap, HashSet, VecDeque};
use std::io::{Cursor, Write};
use tracing::{debug, instrument, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Estimated per-entry zip overhead in bytes, added to the payload and filename length.
pub const ZIP_OVERHEAD_BYTES: u64 = 30;

/// An emote waiting to be written to an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackItem {
    /// Emote name, without extension
    pub name: String,
    /// Whether the image is animated, choosing `.gif` over `.png`
    pub animated: bool,
    /// Stored as the entry's modification time
    pub created_at: DateTime<Utc>,
    /// Image bytes
    pub data: Vec<u8>,
}

/// Hands out unique names, suffixing repeats with `-2`, `-3`, ...
///
/// Comparison ignores ASCII case so that the resulting files can be extracted
/// side by side on case-insensitive filesystems.
#[derive(Debug, Default)]
pub struct NameDiscriminator {
    seen: HashMap<String, usize>,
    taken: HashSet<String>,
}

impl NameDiscriminator {
    /// Create an empty discriminator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `name` if unused, otherwise the next free `name-N`.
    ///
    /// # Examples
    ///
    /// ```
    /// use emote_transfer::NameDiscriminator;
    ///
    /// let mut names = NameDiscriminator::new();
    /// assert_eq!(names.resolve("blobcat"), "blobcat");
    /// assert_eq!(names.resolve("blobcat"), "blobcat-2");
    /// assert_eq!(names.resolve("BlobCat"), "BlobCat-3");
    /// ```
    pub fn resolve(&mut self, name: &str) -> String {
        let count = self.seen.entry(name.to_ascii_lowercase()).or_insert(0);
        loop {
            *count += 1;
            let candidate = if *count == 1 {
                name.to_string()
            } else {
                format!("{}-{}", name, count)
            };
            if self.taken.insert(candidate.to_ascii_lowercase()) {
                return candidate;
            }
        }
    }
}

/// An item that cannot fit in any shard.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct RejectedItem {
    /// Original emote name
    name: String,
    /// Filename it would have been stored under
    filename: String,
    /// Estimated archive contribution
    estimated_size: u64,
}

/// A finished zip archive.
#[derive(Debug, Clone, Getters)]
pub struct SealedShard {
    /// e.g. `emotes-1234-1.zip`
    filename: String,
    /// Zip bytes
    data: Vec<u8>,
    /// Entry filenames in archive order
    entries: Vec<String>,
    /// Sum of the estimates of the entries, always below the budget
    estimated_size: u64,
}

impl SealedShard {
    /// Take the zip bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

#[derive(Debug)]
struct PendingEntry {
    filename: String,
    created_at: DateTime<Utc>,
    data: Vec<u8>,
    estimated_size: u64,
}

/// Splits emotes across zip archives that each stay below a byte budget.
#[derive(Debug, Clone)]
pub struct ShardPacker {
    prefix: String,
    budget: u64,
}

impl ShardPacker {
    /// Create a packer producing `<prefix>-<n>.zip` shards of less than `budget` estimated bytes.
    pub fn new(prefix: impl Into<String>, budget: u64) -> Self {
        Self {
            prefix: prefix.into(),
            budget,
        }
    }

    /// Assign filenames and queue items for packing.
    ///
    /// Items whose own estimate reaches the budget are set aside in
    /// `PackedShards::rejected`. Shards are built lazily as the result is iterated.
    #[instrument(skip(self, items), fields(prefix = %self.prefix, budget = self.budget))]
    pub fn pack(&self, items: impl IntoIterator<Item = PackItem>) -> PackedShards {
        let mut names = NameDiscriminator::new();
        let mut queue = VecDeque::new();
        let mut rejected = Vec::new();

        for item in items {
            let filename = format!(
                "{}.{}",
                names.resolve(&item.name),
                Category::from_animated(item.animated).extension()
            );
            let estimated_size = item.data.len() as u64 + ZIP_OVERHEAD_BYTES + filename.len() as u64;

            if estimated_size >= self.budget {
                warn!(name = %item.name, estimated_size, "Emote too large for any shard");
                rejected.push(RejectedItem {
                    name: item.name,
                    filename,
                    estimated_size,
                });
            } else {
                queue.push_back(PendingEntry {
                    filename,
                    created_at: item.created_at,
                    data: item.data,
                    estimated_size,
                });
            }
        }

        debug!(queued = queue.len(), rejected = rejected.len(), "Packing");
        PackedShards {
            prefix: self.prefix.clone(),
            budget: self.budget,
            queue,
            rejected,
            next_index: 1,
        }
    }
}

/// Iterator over sealed shards, numbered from 1.
#[derive(Debug)]
pub struct PackedShards {
    prefix: String,
    budget: u64,
    queue: VecDeque<PendingEntry>,
    rejected: Vec<RejectedItem>,
    next_index: usize,
}

impl PackedShards {
    /// Items that were too large to pack.
    pub fn rejected(&self) -> &[RejectedItem] {
        &self.rejected
    }

    fn seal_next(&mut self) -> Result<SealedShard, ArchiveError> {
        let mut shard = ShardWriter::new();

        while self
            .queue
            .front()
            .is_some_and(|entry| shard.estimated_size + entry.estimated_size < self.budget)
        {
            if let Some(entry) = self.queue.pop_front() {
                shard.add(entry)?;
            }
        }

        let filename = format!("{}-{}.zip", self.prefix, self.next_index);
        self.next_index += 1;
        shard.seal(filename)
    }
}

impl Iterator for PackedShards {
    type Item = Result<SealedShard, ArchiveError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.queue.is_empty() {
            return None;
        }
        Some(self.seal_next())
    }
}

struct ShardWriter {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    estimated_size: u64,
    entries: Vec<String>,
}

impl ShardWriter {
    fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            estimated_size: 0,
            entries: Vec::new(),
        }
    }

    fn add(&mut self, entry: PendingEntry) -> Result<(), ArchiveError> {
        // Images are already compressed.
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Stored)
            .last_modified_time(zip_timestamp(entry.created_at));

        self.writer
            .start_file(entry.filename.as_str(), options)
            .map_err(write_error)?;
        self.writer.write_all(&entry.data)?;

        self.estimated_size += entry.estimated_size;
        self.entries.push(entry.filename);
        Ok(())
    }

    fn seal(self, filename: String) -> Result<SealedShard, ArchiveError> {
        let data = self.writer.finish().map_err(write_error)?.into_inner();
        debug!(%filename, entries = self.entries.len(), bytes = data.len(), "Sealed shard");
        Ok(SealedShard {
            filename,
            data,
            entries: self.entries,
            estimated_size: self.estimated_size,
        })
    }
}

/// Zip timestamps only cover 1980 to 2107.
fn zip_timestamp(at: DateTime<Utc>) -> zip::DateTime {
    let year = u16::try_from(at.year()).unwrap_or_default();
    zip::DateTime::from_date_and_time(
        year,
        at.month() as u8,
        at.day() as u8,
        at.hour() as u8,
        at.minute() as u8,
        at.second() as u8,
    )
    .unwrap_or_default()
}

fn write_error(err: zip::result::ZipError) -> ArchiveError {
    ArchiveError::new(ArchiveErrorKind::Write(err.to_string()))
}
