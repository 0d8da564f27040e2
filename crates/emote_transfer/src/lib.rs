//! Export, import and creation pipeline for the emote manager.
//!
//! This crate moves emotes between a chat platform and zip/tar archives while
//! respecting the platform's quotas.
//!
//! # Components
//!
//! - `Fetcher` / `HttpFetcher` - validated concurrent downloads
//! - `ArchiveReader` - defensive streaming extraction of zip and tar archives
//! - `ShardPacker` - size-bounded, order-preserving zip shards for export
//! - `CreationPipeline` - quota-aware emote creation with format conversion
//! - `NameDisambiguator` / `ReplyBroker` - interactive resolution of duplicate names
//! - `ListPaginator` / `PaginatorRegistry` - paged list output with explicit teardown
//! - `render_gallery` - a static HTML page of a guild's emotes
//! - `EmoteManager` - the commands built from the above
//!
//! The chat platform itself is abstracted behind the `EmotePlatform` trait.

#![warn(missing_docs)]

mod convert;
mod create;
mod disambiguate;
mod extract;
mod fetch;
mod gallery;
mod pack;
mod paginate;
mod platform;
mod reply;
mod service;

pub use convert::{EMOTE_SIZE_LIMIT, convert_to_category, shrink_to_fit};
pub use create::{CreationPipeline, CreationReport, CreationRequest};
pub use disambiguate::{NameDisambiguator, candidates};
pub use extract::{ArchiveEntries, ArchiveEntry, ArchiveReader};
pub use fetch::{ARCHIVE_MIMETYPES, DEFAULT_BODY_LIMIT, Fetcher, HttpFetcher, IMAGE_MIMETYPES};
pub use gallery::render_gallery;
pub use pack::{
    NameDiscriminator, PackItem, PackedShards, RejectedItem, SealedShard, ShardPacker,
    ZIP_OVERHEAD_BYTES,
};
pub use paginate::{ListPaginator, PageControl, PaginatorRegistry, PaginatorTicket};
pub use platform::{EmotePlatform, PlatformResult};
pub use reply::{PendingReply, ReplyBroker};
pub use service::{EmoteManager, SUCCESS_REACTION, parse_add_args};
