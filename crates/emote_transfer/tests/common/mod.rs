//! Shared fixtures: a mock platform, an in-memory fetcher and archive builders.

#![allow(dead_code)]

use async_trait::async_trait;
use emote_core::{
    Author, ChannelId, CommandContext, EmoteId, GuildId, GuildLimits, ImageKind, ManagedEmote,
    MessageId, MessageSnapshot, UserId,
};
use emote_error::{FetchError, FetchErrorKind, PlatformError, PlatformErrorKind};
use emote_transfer::{EmotePlatform, Fetcher, PlatformResult};
use image::codecs::gif::GifEncoder;
use image::{DynamicImage, Frame, ImageFormat, Rgba, RgbaImage};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::{Cursor, Write};

pub const GUILD: GuildId = GuildId(1);
pub const CHANNEL: ChannelId = ChannelId(2);
pub const AUTHOR: UserId = UserId(3);
pub const GUILD_NAME: &str = "Blob Emoji";

const FIRST_EMOTE_ID: u64 = 300_000_000_000_000_000;

pub fn ctx() -> CommandContext {
    CommandContext {
        guild: Some(GUILD),
        channel: CHANNEL,
        message: MessageId(99),
        author: Author {
            id: AUTHOR,
            name: "tester".to_string(),
        },
        attachments: Vec::new(),
    }
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 31 % 256) as u8, (y * 17 % 256) as u8, 128, 255])
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image)
        .write_to(&mut out, ImageFormat::Png)
        .expect("Encode PNG");
    out.into_inner()
}

pub fn gif(width: u32, height: u32) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut out);
        for shade in [0u8, 255] {
            let frame = RgbaImage::from_pixel(width, height, Rgba([shade, 0, 0, 255]));
            encoder.encode_frame(Frame::new(frame)).expect("Encode GIF frame");
        }
    }
    out
}

pub fn zip_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, data) in entries {
        writer
            .start_file(*name, zip::write::SimpleFileOptions::default())
            .expect("Start zip entry");
        writer.write_all(data).expect("Write zip entry");
    }
    writer.finish().expect("Finish zip").into_inner()
}

pub fn tar_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, *data)
            .expect("Append tar entry");
    }
    builder.into_inner().expect("Finish tar")
}

/// Names of the entries of a zip archive, in order.
pub fn zip_names(data: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data)).expect("Valid zip");
    (0..archive.len())
        .map(|i| archive.by_index(i).expect("Entry").name().to_string())
        .collect()
}

#[derive(Default)]
struct MockState {
    emotes: Vec<ManagedEmote>,
    images: HashMap<EmoteId, Vec<u8>>,
    messages: Vec<String>,
    edits: Vec<(MessageId, String)>,
    files: Vec<(String, Vec<u8>)>,
    reactions: Vec<(MessageId, String)>,
    create_calls: usize,
    created_images: Vec<Vec<u8>>,
    next_id: u64,
    next_message: u64,
    reject_create: Option<PlatformErrorKind>,
    posted: HashMap<(ChannelId, MessageId), MessageSnapshot>,
}

/// In-memory platform for a single guild.
pub struct MockPlatform {
    limits: GuildLimits,
    state: Mutex<MockState>,
}

impl MockPlatform {
    pub fn new(emoji_limit: usize, filesize_limit: u64) -> Self {
        Self {
            limits: GuildLimits {
                emoji_limit,
                filesize_limit,
            },
            state: Mutex::new(MockState::default()),
        }
    }

    pub fn with_create_failure(self, kind: PlatformErrorKind) -> Self {
        self.state.lock().reject_create = Some(kind);
        self
    }

    /// Seed an emote without counting it as a create call.
    pub fn seed(&self, name: &str, animated: bool, image: Vec<u8>) -> ManagedEmote {
        Self::insert(&mut self.state.lock(), name, animated, image)
    }

    fn insert(state: &mut MockState, name: &str, animated: bool, image: Vec<u8>) -> ManagedEmote {
        state.next_id += 1;
        let id = EmoteId(FIRST_EMOTE_ID + (state.next_id << 22));
        let emote = ManagedEmote::new(id, name, animated, GUILD);
        state.emotes.push(emote.clone());
        state.images.insert(id, image);
        emote
    }

    /// Make a message visible to `fetch_message`.
    pub fn post(&self, channel: ChannelId, message: MessageId, snapshot: MessageSnapshot) {
        self.state.lock().posted.insert((channel, message), snapshot);
    }

    pub fn emote_list(&self) -> Vec<ManagedEmote> {
        self.state.lock().emotes.clone()
    }

    pub fn image(&self, id: EmoteId) -> Option<Vec<u8>> {
        self.state.lock().images.get(&id).cloned()
    }

    pub fn messages(&self) -> Vec<String> {
        self.state.lock().messages.clone()
    }

    pub fn edits(&self) -> Vec<(MessageId, String)> {
        self.state.lock().edits.clone()
    }

    pub fn files(&self) -> Vec<(String, Vec<u8>)> {
        self.state.lock().files.clone()
    }

    pub fn reactions(&self) -> Vec<(MessageId, String)> {
        self.state.lock().reactions.clone()
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().create_calls
    }

    pub fn created_images(&self) -> Vec<Vec<u8>> {
        self.state.lock().created_images.clone()
    }
}

#[async_trait]
impl EmotePlatform for MockPlatform {
    async fn emotes(&self, guild: GuildId) -> PlatformResult<Vec<ManagedEmote>> {
        Ok(self
            .state
            .lock()
            .emotes
            .iter()
            .filter(|emote| *emote.guild_id() == guild)
            .cloned()
            .collect())
    }

    async fn guild_limits(&self, _guild: GuildId) -> PlatformResult<GuildLimits> {
        Ok(self.limits)
    }

    async fn guild_name(&self, _guild: GuildId) -> PlatformResult<String> {
        Ok(GUILD_NAME.to_string())
    }

    async fn create_emote(
        &self,
        _guild: GuildId,
        name: &str,
        image: &[u8],
        _reason: &str,
    ) -> PlatformResult<ManagedEmote> {
        let mut state = self.state.lock();
        state.create_calls += 1;
        state.created_images.push(image.to_vec());

        if let Some(kind) = state.reject_create.clone() {
            return Err(PlatformError::new(kind));
        }

        let Some(kind) = ImageKind::sniff(image) else {
            return Err(PlatformError::new(PlatformErrorKind::InvalidPayload(
                "Unsupported image type".to_string(),
            )));
        };

        Ok(Self::insert(&mut state, name, kind == ImageKind::Gif, image.to_vec()))
    }

    async fn delete_emote(&self, _guild: GuildId, emote: EmoteId, _reason: &str) -> PlatformResult<()> {
        let mut state = self.state.lock();
        let before = state.emotes.len();
        state.emotes.retain(|e| *e.id() != emote);
        if state.emotes.len() == before {
            return Err(PlatformError::new(PlatformErrorKind::Http {
                status: 404,
                message: "Unknown Emoji".to_string(),
            }));
        }
        state.images.remove(&emote);
        Ok(())
    }

    async fn rename_emote(
        &self,
        _guild: GuildId,
        emote: EmoteId,
        name: &str,
        _reason: &str,
    ) -> PlatformResult<ManagedEmote> {
        if name.len() < 2 {
            return Err(PlatformError::new(PlatformErrorKind::Http {
                status: 400,
                message: "Invalid Form Body".to_string(),
            }));
        }

        let mut state = self.state.lock();
        let found = state.emotes.iter_mut().find(|e| *e.id() == emote).ok_or_else(|| {
            PlatformError::new(PlatformErrorKind::Http {
                status: 404,
                message: "Unknown Emoji".to_string(),
            })
        })?;
        *found = found.clone().with_name(name.to_string());
        Ok(found.clone())
    }

    async fn send_message(&self, _channel: ChannelId, content: &str) -> PlatformResult<MessageId> {
        let mut state = self.state.lock();
        state.messages.push(content.to_string());
        state.next_message += 1;
        Ok(MessageId(1000 + state.next_message))
    }

    async fn edit_message(
        &self,
        _channel: ChannelId,
        message: MessageId,
        content: &str,
    ) -> PlatformResult<()> {
        self.state.lock().edits.push((message, content.to_string()));
        Ok(())
    }

    async fn send_file(
        &self,
        _channel: ChannelId,
        filename: &str,
        data: Vec<u8>,
    ) -> PlatformResult<MessageId> {
        let mut state = self.state.lock();
        state.files.push((filename.to_string(), data));
        state.next_message += 1;
        Ok(MessageId(1000 + state.next_message))
    }

    async fn add_reaction(
        &self,
        _channel: ChannelId,
        message: MessageId,
        emoji: &str,
    ) -> PlatformResult<()> {
        self.state.lock().reactions.push((message, emoji.to_string()));
        Ok(())
    }

    async fn fetch_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> PlatformResult<MessageSnapshot> {
        self.state
            .lock()
            .posted
            .get(&(channel, message))
            .cloned()
            .ok_or_else(|| {
                PlatformError::new(PlatformErrorKind::Http {
                    status: 404,
                    message: "Unknown Message".to_string(),
                })
            })
    }
}

/// Fetcher serving bytes from memory.
#[derive(Default)]
pub struct MapFetcher {
    bodies: Mutex<HashMap<String, Result<Vec<u8>, FetchErrorKind>>>,
    calls: Mutex<Vec<(String, bool)>>,
}

impl MapFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, url: impl Into<String>, body: Vec<u8>) {
        self.bodies.lock().insert(url.into(), Ok(body));
    }

    pub fn fail(&self, url: impl Into<String>, kind: FetchErrorKind) {
        self.bodies.lock().insert(url.into(), Err(kind));
    }

    /// Every fetch as `(url, check_headers)`.
    pub fn calls(&self) -> Vec<(String, bool)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Fetcher for MapFetcher {
    async fn fetch(
        &self,
        url: &str,
        _allowed: &[&str],
        check_headers: bool,
    ) -> Result<Vec<u8>, FetchError> {
        self.calls.lock().push((url.to_string(), check_headers));
        match self.bodies.lock().get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(kind)) => Err(FetchError::new(kind.clone())),
            None => Err(FetchError::new(FetchErrorKind::Status(404))),
        }
    }
}
