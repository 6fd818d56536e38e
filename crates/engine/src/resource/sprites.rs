use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use image::ImageReader;
use tracing::{error, warn};

use super::spritesheet::parse_sheet_descriptor;
use super::upload::{TextureDevice, UploadJob, UploadQueue};
use super::{image_key, image_key_jpeg, portrait_key, IMAGES_DIR, SPRITESHEET_EXTENSION};

/// Stable index into the cache's texture slot arena. Many sprites may
/// share one slot (spritesheet members).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// Handle issued by the rendering backend once an upload has finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceTextureId(pub u32);

/// Texture-space rectangle as fractions of the owning sheet's pixel size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl UvRect {
    pub const FULL: UvRect = UvRect {
        x0: 0.0,
        y0: 0.0,
        x1: 1.0,
        y1: 1.0,
    };

    pub fn from_pixel_rect(
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        sheet_width: u32,
        sheet_height: u32,
    ) -> Self {
        Self {
            x0: x as f64 / sheet_width as f64,
            y0: y as f64 / sheet_height as f64,
            x1: (x + width) as f64 / sheet_width as f64,
            y1: (y + height) as f64 / sheet_height as f64,
        }
    }

    pub fn to_pixel_rect(&self, sheet_width: u32, sheet_height: u32) -> (u32, u32, u32, u32) {
        let x = (self.x0 * sheet_width as f64).round() as u32;
        let y = (self.y0 * sheet_height as f64).round() as u32;
        let right = (self.x1 * sheet_width as f64).round() as u32;
        let bottom = (self.y1 * sheet_height as f64).round() as u32;
        (x, y, right - x, bottom - y)
    }
}

/// One resolvable sprite: which texture slot backs it, its pixel size, and
/// the UV window it occupies on that texture. Safe to hold and render
/// immediately; rendering checks residency per frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteEntry {
    pub texture: TextureId,
    pub width: u32,
    pub height: u32,
    pub uv: UvRect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    /// Reserved; pixels are in flight on the upload queue.
    Pending,
    /// Uploaded; the device handle is live.
    Resident(DeviceTextureId),
    /// Evicted; a late upload job for this slot is discarded on drain.
    Retired,
}

#[derive(Debug, Clone, Copy)]
struct TextureSlot {
    width: u32,
    height: u32,
    state: SlotState,
}

/// Deduplicated sprite/texture registry keyed by resource path. Decoding
/// happens synchronously in `get`; the GPU upload is deferred through the
/// hand-off queue until the render thread calls `drain_uploads`.
#[derive(Debug)]
pub struct SpriteCache {
    resources_dir: PathBuf,
    slots: Vec<TextureSlot>,
    sprites: HashMap<String, SpriteEntry>,
    sheets: HashMap<String, TextureId>,
    /// Resources whose decode failed; permanently absent, never retried.
    missing: HashSet<String>,
    uploads: UploadQueue,
}

impl SpriteCache {
    pub fn new(resources_dir: impl Into<PathBuf>) -> Self {
        Self {
            resources_dir: resources_dir.into(),
            slots: Vec::new(),
            sprites: HashMap::new(),
            sheets: HashMap::new(),
            missing: HashSet::new(),
            uploads: UploadQueue::new(),
        }
    }

    /// Resolves the sprite at the full resource key, loading it on first
    /// use. The returned entry may point at a still-pending slot; that is
    /// fine to render (it draws nothing until resident).
    pub fn get(&mut self, key: &str) -> Option<SpriteEntry> {
        if let Some(entry) = self.sprites.get(key) {
            return Some(*entry);
        }
        if self.missing.contains(key) {
            return None;
        }

        let (width, height, rgba) = self.decode_rgba(key)?;
        let texture = self.reserve_slot(width, height);
        self.uploads.push(UploadJob {
            texture,
            width,
            height,
            rgba,
        });
        let entry = SpriteEntry {
            texture,
            width,
            height,
            uv: UvRect::FULL,
        };
        self.register_sprite(key, entry);
        Some(entry)
    }

    /// Sprite lookup by id under `images/`, trying PNG then JPEG.
    pub fn get_sprite_any_extension(&mut self, id: &str) -> Option<SpriteEntry> {
        let png = self.get(&image_key(id));
        if png.is_some() {
            return png;
        }
        self.get(&image_key_jpeg(id))
    }

    pub fn get_sprite(&mut self, id: &str) -> Option<SpriteEntry> {
        self.get(&image_key(id))
    }

    pub fn get_portrait(&mut self, id: &str) -> Option<SpriteEntry> {
        self.get(&portrait_key(id))
    }

    /// Whether the reference is already resolvable without loading. A bare
    /// id is interpreted as a PNG sprite id under `images/`.
    pub fn has_sprite(&self, reference: &str) -> bool {
        if reference.ends_with(super::PNG_EXTENSION) || reference.ends_with(super::JPEG_EXTENSION)
        {
            self.sprites.contains_key(reference)
        } else {
            self.sprites.contains_key(&image_key(reference))
        }
    }

    pub fn sprite_keys(&self) -> impl Iterator<Item = &str> {
        self.sprites.keys().map(String::as_str)
    }

    /// Loads every `.spritesheet` descriptor under the `images/` resource
    /// directory. Sheets that fail to load are logged and skipped.
    pub fn load_spritesheets(&mut self) {
        let images_dir = self.resources_dir.join(IMAGES_DIR);
        let Ok(entries) = fs::read_dir(&images_dir) else {
            warn!(path = %images_dir.display(), "spritesheet_directory_unreadable");
            return;
        };
        let mut sheet_files = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .file_name()
                        .and_then(|name| name.to_str())
                        .is_some_and(|name| name.ends_with(SPRITESHEET_EXTENSION))
            })
            .collect::<Vec<_>>();
        sheet_files.sort();

        for sheet_file in sheet_files {
            let Some(file_name) = sheet_file.file_name().and_then(|name| name.to_str()) else {
                continue;
            };
            let resource = format!("{IMAGES_DIR}/{file_name}");
            self.load_spritesheet(&resource);
        }
    }

    /// Reads the sheet descriptor at the resource key, decodes the shared
    /// sheet texture, and registers one sprite entry per member. Returns
    /// the sprite ids (`<sheet>/<image>`) that became resolvable.
    pub fn load_spritesheet(&mut self, resource: &str) -> Vec<String> {
        let path = self.resources_dir.join(resource);
        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(io_error) => {
                error!(
                    resource,
                    path = %path.display(),
                    error = %io_error,
                    "spritesheet_read_failed"
                );
                return Vec::new();
            }
        };
        let Some(descriptor) = parse_sheet_descriptor(&source, resource) else {
            return Vec::new();
        };

        let parent = resource.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("");
        let sheet_image_key = join_key(parent, &format!("{}.png", descriptor.sheet_name));
        let Some((sheet_width, sheet_height, rgba)) = self.decode_rgba(&sheet_image_key) else {
            return Vec::new();
        };

        let texture = self.reserve_slot(sheet_width, sheet_height);
        self.uploads.push(UploadJob {
            texture,
            width: sheet_width,
            height: sheet_height,
            rgba,
        });

        let mut registered = Vec::new();
        for member in &descriptor.images {
            let uv = UvRect::from_pixel_rect(
                member.x,
                member.y,
                member.width,
                member.height,
                sheet_width,
                sheet_height,
            );
            let member_key = join_key(
                parent,
                &format!("{}/{}.png", descriptor.sheet_name, member.name),
            );
            self.register_sprite(
                &member_key,
                SpriteEntry {
                    texture,
                    width: member.width,
                    height: member.height,
                    uv,
                },
            );
            registered.push(format!("{}/{}", descriptor.sheet_name, member.name));
        }

        let sheet_key = join_key(parent, &descriptor.sheet_name);
        if self.sheets.contains_key(&sheet_key) {
            warn!(resource = sheet_key.as_str(), "spritesheet_overwritten");
        }
        self.sheets.insert(sheet_key, texture);
        registered
    }

    /// Releases the slot's device texture (at most once) and removes every
    /// sprite and sheet entry that referenced it.
    pub fn evict(&mut self, texture: TextureId, device: &mut dyn TextureDevice) {
        let Some(slot) = self.slots.get_mut(texture.0 as usize) else {
            return;
        };
        match slot.state {
            SlotState::Resident(device_texture) => device.delete_texture(device_texture),
            // A pending slot has no device texture yet; retiring it makes
            // the drain step discard the in-flight pixels.
            SlotState::Pending => {}
            SlotState::Retired => return,
        }
        slot.state = SlotState::Retired;

        self.sprites.retain(|_, entry| entry.texture != texture);
        self.sheets.retain(|_, sheet| *sheet != texture);
    }

    /// Evicts everything; used at full display teardown. The negative
    /// cache resets too so a rebuilt display reloads from disk.
    pub fn clear(&mut self, device: &mut dyn TextureDevice) {
        for index in 0..self.slots.len() {
            self.evict(TextureId(index as u32), device);
        }
        self.sprites.clear();
        self.sheets.clear();
        self.missing.clear();
    }

    /// Render-thread step: finalize queued uploads, flipping slots from
    /// pending to resident. Jobs for slots evicted in the meantime are
    /// dropped. Returns the number of textures that became resident.
    pub fn drain_uploads(&mut self, device: &mut dyn TextureDevice) -> usize {
        let mut uploaded = 0;
        while let Some(job) = self.uploads.try_pop() {
            let Some(slot) = self.slots.get_mut(job.texture.0 as usize) else {
                continue;
            };
            match slot.state {
                SlotState::Pending => {
                    let device_texture = device.create_texture(job.width, job.height, &job.rgba);
                    slot.state = SlotState::Resident(device_texture);
                    uploaded += 1;
                }
                SlotState::Retired => {}
                SlotState::Resident(_) => {
                    warn!(texture = job.texture.0, "duplicate_upload_discarded");
                }
            }
        }
        uploaded
    }

    pub fn is_resident(&self, texture: TextureId) -> bool {
        matches!(
            self.slots.get(texture.0 as usize).map(|slot| slot.state),
            Some(SlotState::Resident(_))
        )
    }

    /// Total bytes of pixel data held by live (pending or resident) slots,
    /// counted once per texture regardless of how many sprites share it.
    pub fn texture_memory_bytes(&self) -> u64 {
        self.slots
            .iter()
            .filter(|slot| slot.state != SlotState::Retired)
            .map(|slot| slot.width as u64 * slot.height as u64 * 4)
            .sum()
    }

    fn reserve_slot(&mut self, width: u32, height: u32) -> TextureId {
        let id = TextureId(self.slots.len() as u32);
        self.slots.push(TextureSlot {
            width,
            height,
            state: SlotState::Pending,
        });
        id
    }

    fn register_sprite(&mut self, key: &str, entry: SpriteEntry) {
        if self.sprites.contains_key(key) {
            // Mod content may legitimately redefine a resource;
            // last-writer-wins.
            warn!(resource = key, "sprite_overwritten_by_duplicate_registration");
        }
        self.sprites.insert(key.to_string(), entry);
    }

    fn decode_rgba(&mut self, key: &str) -> Option<(u32, u32, Vec<u8>)> {
        let path = self.resources_dir.join(key);
        let reader = match ImageReader::open(&path) {
            Ok(reader) => reader,
            Err(io_error) => {
                self.note_missing(key, &path, &format!("open failed: {io_error}"));
                return None;
            }
        };
        match reader.decode() {
            Ok(decoded) => {
                let rgba = decoded.to_rgba8();
                let (width, height) = (rgba.width(), rgba.height());
                Some((width, height, rgba.into_raw()))
            }
            Err(decode_error) => {
                self.note_missing(key, &path, &format!("decode failed: {decode_error}"));
                None
            }
        }
    }

    fn note_missing(&mut self, key: &str, path: &Path, reason: &str) {
        if self.missing.insert(key.to_string()) {
            warn!(
                resource = key,
                path = %path.display(),
                reason,
                "sprite_load_failed_marked_absent"
            );
        }
    }
}

fn join_key(parent: &str, rest: &str) -> String {
    if parent.is_empty() {
        rest.to_string()
    } else {
        format!("{parent}/{rest}")
    }
}
