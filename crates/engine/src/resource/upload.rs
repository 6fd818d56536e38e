use std::collections::HashSet;
use std::sync::mpsc::{channel, Receiver, Sender};

use tracing::warn;

use super::sprites::{DeviceTextureId, TextureId};

/// Decoded pixels waiting for the render thread: the slot id reserved at
/// decode time plus the raw RGBA data to upload into it.
#[derive(Debug)]
pub struct UploadJob {
    pub texture: TextureId,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// The GPU seam. Upload finalization and texture release happen only on the
/// thread that owns the rendering context; everything above this trait is
/// context-free.
pub trait TextureDevice {
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> DeviceTextureId;
    fn delete_texture(&mut self, texture: DeviceTextureId);
}

/// Single-producer single-consumer hand-off between decode and upload.
/// Loaders push from wherever decoding ran; the render thread drains once
/// per frame.
#[derive(Debug)]
pub(crate) struct UploadQueue {
    sender: Sender<UploadJob>,
    receiver: Receiver<UploadJob>,
}

impl UploadQueue {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = channel();
        Self { sender, receiver }
    }

    pub(crate) fn push(&self, job: UploadJob) {
        // The receiver lives as long as the queue; a failed send means the
        // cache itself is gone.
        let _ = self.sender.send(job);
    }

    pub(crate) fn try_pop(&self) -> Option<UploadJob> {
        self.receiver.try_recv().ok()
    }
}

/// In-memory texture device: the stand-in the host and tests use where a
/// real rendering backend would sit. Tracks live handles so shared-texture
/// eviction bugs (double frees, leaks) are observable.
#[derive(Debug, Default)]
pub struct SoftwareTextureDevice {
    next_id: u32,
    live: HashSet<DeviceTextureId>,
    created_count: usize,
    double_free_count: usize,
}

impl SoftwareTextureDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_texture_count(&self) -> usize {
        self.live.len()
    }

    pub fn created_count(&self) -> usize {
        self.created_count
    }

    pub fn double_free_count(&self) -> usize {
        self.double_free_count
    }
}

impl TextureDevice for SoftwareTextureDevice {
    fn create_texture(&mut self, _width: u32, _height: u32, _rgba: &[u8]) -> DeviceTextureId {
        let id = DeviceTextureId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.live.insert(id);
        self.created_count += 1;
        id
    }

    fn delete_texture(&mut self, texture: DeviceTextureId) {
        if !self.live.remove(&texture) {
            self.double_free_count += 1;
            warn!(texture = texture.0, "texture_double_free_detected");
        }
    }
}
