use image::RgbaImage;
use log::{debug, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::BridgeError;
use crate::renderer::HostCanvas;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct TextureHandle(pub u64);

impl TextureHandle {
    pub const NULL: TextureHandle = TextureHandle(0);

    pub fn is_null(self) -> bool {
        self.0 == 0
    }
}

/// Resolves texture sources through the host.
pub trait ResourceLoader {
    fn load_texture(&self, path: &str) -> Option<RgbaImage>;
}

/// Loads images from disk, trying `root` + path first and the path as given
/// second.
#[derive(Debug, Clone, Default)]
pub struct FsResourceLoader {
    root: PathBuf,
}

impl FsResourceLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn decode(path: &Path) -> Option<RgbaImage> {
        if !path.is_file() {
            return None;
        }
        match image::open(path) {
            Ok(img) => Some(img.to_rgba8()),
            Err(err) => {
                debug!("failed to decode {}: {}", path.display(), err);
                None
            }
        }
    }
}

impl ResourceLoader for FsResourceLoader {
    fn load_texture(&self, path: &str) -> Option<RgbaImage> {
        Self::decode(&self.root.join(path)).or_else(|| Self::decode(Path::new(path)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextureSource {
    File(String),
    Generated,
}

#[derive(Debug, Clone)]
pub struct TextureEntry {
    pub host: Uuid,
    pub width: u32,
    pub height: u32,
    pub source: TextureSource,
}

#[derive(Debug, Default)]
pub struct TextureCache {
    entries: HashMap<TextureHandle, TextureEntry>,
    next_handle: u64,
}

impl TextureCache {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            next_handle: 1,
        }
    }

    fn insert(&mut self, entry: TextureEntry) -> TextureHandle {
        let handle = TextureHandle(self.next_handle);
        self.next_handle += 1;
        self.entries.insert(handle, entry);
        handle
    }

    pub fn load_from_source(
        &mut self,
        canvas: &mut dyn HostCanvas,
        loader: &dyn ResourceLoader,
        path: &str,
    ) -> Result<(TextureHandle, (u32, u32)), BridgeError> {
        let image = loader
            .load_texture(path)
            .ok_or_else(|| BridgeError::ResourceNotFound(path.to_string()))?;
        let (width, height) = image.dimensions();
        let host = canvas.create_texture(&image);
        let handle = self.insert(TextureEntry {
            host,
            width,
            height,
            source: TextureSource::File(path.to_string()),
        });
        info!("Texture loaded from {}.", path);
        Ok((handle, (width, height)))
    }

    pub fn generate_from_pixels(
        &mut self,
        canvas: &mut dyn HostCanvas,
        buffer: &[u8],
        width: u32,
        height: u32,
    ) -> Result<TextureHandle, BridgeError> {
        // saturates so an overflowing size can never match a real buffer
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .unwrap_or(usize::MAX);
        let invalid = || BridgeError::InvalidPixelBuffer {
            width,
            height,
            expected,
            actual: buffer.len(),
        };
        if width == 0 || height == 0 || expected == usize::MAX || buffer.len() != expected {
            return Err(invalid());
        }
        let image = RgbaImage::from_raw(width, height, buffer.to_vec()).ok_or_else(invalid)?;
        let host = canvas.create_texture(&image);
        Ok(self.insert(TextureEntry {
            host,
            width,
            height,
            source: TextureSource::Generated,
        }))
    }

    pub fn release(
        &mut self,
        canvas: &mut dyn HostCanvas,
        handle: TextureHandle,
    ) -> Result<(), BridgeError> {
        if handle.is_null() {
            return Ok(());
        }
        let entry = self
            .entries
            .remove(&handle)
            .ok_or(BridgeError::InvalidHandle {
                kind: "texture",
                handle: handle.0,
            })?;
        canvas.free_texture(entry.host);
        Ok(())
    }

    pub fn get(&self, handle: TextureHandle) -> Option<&TextureEntry> {
        self.entries.get(&handle)
    }

    /// Host texture bound for draws that reference `handle`. Null or unknown
    /// handles draw untextured.
    pub fn host_texture(&self, handle: TextureHandle) -> Option<Uuid> {
        self.entries.get(&handle).map(|entry| entry.host)
    }

    pub fn dimensions(&self, handle: TextureHandle) -> Option<(u32, u32)> {
        self.entries
            .get(&handle)
            .map(|entry| (entry.width, entry.height))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn release_all(&mut self, canvas: &mut dyn HostCanvas) {
        for (_, entry) in self.entries.drain() {
            canvas.free_texture(entry.host);
        }
    }
}
