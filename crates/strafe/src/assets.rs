//! # Assets: Texture Cache
//!
//! Textures are decoded once at startup and never change afterwards.
//! Components hold a [`Texture`], a `Copy` handle plus pixel size, so no
//! lookup happens inside the frame loop.
//!
//! ```text
//! TextureCache (owned by startup code, no globals)
//! ┌────────────────────────────────────────────────┐
//! │ textures: HashMap<String, Texture>             │
//! │   "resources/images/player.png" → Texture(1)   │
//! │   "resources/images/ufo.png"    → Texture(2)   │
//! └────────────────────────────────────────────────┘
//!            │ load(path, factory)
//!            ▼
//!   TextureFactory::create_texture(label, w, h, rgba)
//!     ├── GpuCanvas        → wgpu texture + bind group
//!     └── RecordingCanvas  → bookkeeping only (headless)
//! ```
//!
//! The handful of textures spawning needs are resolved into a [`SpriteSheet`]
//! resource right after loading, which is the only point a missing texture
//! can be reported.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Backend-specific texture id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub usize);

/// A loaded texture: handle plus its pixel size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Texture {
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    pub fn new(handle: TextureHandle, width: u32, height: u32) -> Self {
        Self {
            handle,
            width,
            height,
        }
    }
}

/// Something that can turn RGBA8 pixels into a drawable texture.
pub trait TextureFactory {
    fn create_texture(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> TextureHandle;
}

// ── Errors ──────────────────────────────────────────────────────────────

/// Errors raised while loading textures or animation tables.
#[derive(Debug)]
pub enum AssetError {
    /// The file could not be read.
    Io { path: PathBuf, source: std::io::Error },
    /// The file was read but isn't a decodable image.
    Decode { path: PathBuf, message: String },
    /// The file was read but isn't a valid animation definition.
    Parse { path: PathBuf, message: String },
    /// A texture was requested that was never loaded.
    MissingTexture(String),
    /// An animation clip was requested that no table defines.
    MissingClip(String),
}

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetError::Io { path, source } => {
                write!(f, "failed to read '{}': {source}", path.display())
            }
            AssetError::Decode { path, message } => {
                write!(f, "failed to decode image '{}': {message}", path.display())
            }
            AssetError::Parse { path, message } => {
                write!(f, "invalid animation file '{}': {message}", path.display())
            }
            AssetError::MissingTexture(key) => write!(f, "texture '{key}' was never loaded"),
            AssetError::MissingClip(name) => write!(f, "no animation clip named '{name}'"),
        }
    }
}

impl std::error::Error for AssetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AssetError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ── TextureCache ────────────────────────────────────────────────────────

/// Path-keyed texture cache. Loading the same path twice returns the first
/// texture without decoding again.
#[derive(Default)]
pub struct TextureCache {
    textures: HashMap<String, Texture>,
}

fn cache_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `path` and upload it through `factory`, once.
    pub fn load(
        &mut self,
        path: impl AsRef<Path>,
        factory: &mut dyn TextureFactory,
    ) -> Result<Texture, AssetError> {
        let path = path.as_ref();
        let key = cache_key(path);
        if let Some(&texture) = self.textures.get(&key) {
            return Ok(texture);
        }

        let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let img = image::load_from_memory(&bytes)
            .map_err(|e| AssetError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?
            .to_rgba8();
        let (width, height) = img.dimensions();
        let handle = factory.create_texture(&key, width, height, img.as_raw());
        let texture = Texture::new(handle, width, height);

        log::debug!("Loaded texture '{key}' ({width}x{height}) as {handle:?}");
        self.textures.insert(key, texture);
        Ok(texture)
    }

    /// Register a texture that didn't come from a file.
    pub fn insert(&mut self, key: impl Into<String>, texture: Texture) {
        self.textures.insert(key.into(), texture);
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Result<Texture, AssetError> {
        let key = cache_key(path.as_ref());
        self.textures
            .get(&key)
            .copied()
            .ok_or(AssetError::MissingTexture(key))
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

// ── SpriteSheet ─────────────────────────────────────────────────────────

/// Resource: every texture the game spawns with, resolved up front.
#[derive(Debug, Clone, Copy)]
pub struct SpriteSheet {
    pub background: Texture,
    pub player: Texture,
    pub ufo: Texture,
    pub boss: Texture,
    pub bullet: Texture,
}

impl SpriteSheet {
    pub const BACKGROUND: &'static str = "background.png";
    pub const PLAYER: &'static str = "player.png";
    pub const UFO: &'static str = "ufo.png";
    pub const BOSS: &'static str = "boss.png";
    pub const BULLET: &'static str = "bullet.png";

    pub const FILES: [&'static str; 5] = [
        Self::BACKGROUND,
        Self::PLAYER,
        Self::UFO,
        Self::BOSS,
        Self::BULLET,
    ];

    /// Load every sprite texture from `dir` into `cache`, then resolve them.
    pub fn load(
        dir: &Path,
        cache: &mut TextureCache,
        factory: &mut dyn TextureFactory,
    ) -> Result<Self, AssetError> {
        for file in Self::FILES {
            cache.load(dir.join(file), factory)?;
        }
        Self::resolve(dir, cache)
    }

    /// Look up already loaded textures.
    pub fn resolve(dir: &Path, cache: &TextureCache) -> Result<Self, AssetError> {
        Ok(Self {
            background: cache.get(dir.join(Self::BACKGROUND))?,
            player: cache.get(dir.join(Self::PLAYER))?,
            ufo: cache.get(dir.join(Self::UFO))?,
            boss: cache.get(dir.join(Self::BOSS))?,
            bullet: cache.get(dir.join(Self::BULLET))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts uploads and hands out sequential handles.
    #[derive(Default)]
    struct CountingFactory {
        uploads: Vec<(String, u32, u32)>,
    }

    impl TextureFactory for CountingFactory {
        fn create_texture(
            &mut self,
            label: &str,
            width: u32,
            height: u32,
            rgba: &[u8],
        ) -> TextureHandle {
            assert_eq!(rgba.len(), (width * height * 4) as usize);
            self.uploads.push((label.to_string(), width, height));
            TextureHandle(self.uploads.len() - 1)
        }
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("strafe-assets-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_png(path: &Path, w: u32, h: u32) {
        image::RgbaImage::from_pixel(w, h, image::Rgba([255, 0, 0, 255]))
            .save(path)
            .unwrap();
    }

    #[test]
    fn load_is_idempotent() {
        let dir = temp_dir("idempotent");
        let path = dir.join("ship.png");
        write_png(&path, 8, 4);

        let mut cache = TextureCache::new();
        let mut factory = CountingFactory::default();
        let first = cache.load(&path, &mut factory).unwrap();
        let second = cache.load(&path, &mut factory).unwrap();

        assert_eq!(first, second);
        assert_eq!((first.width, first.height), (8, 4));
        assert_eq!(factory.uploads.len(), 1);
        assert_eq!(cache.get(&path).unwrap(), first);
    }

    #[test]
    fn missing_file_is_io_error() {
        let mut cache = TextureCache::new();
        let mut factory = CountingFactory::default();
        let err = cache
            .load("definitely/not/here.png", &mut factory)
            .unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
        assert!(factory.uploads.is_empty());
    }

    #[test]
    fn garbage_file_is_decode_error() {
        let dir = temp_dir("garbage");
        let path = dir.join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();

        let err = TextureCache::new()
            .load(&path, &mut CountingFactory::default())
            .unwrap_err();
        assert!(matches!(err, AssetError::Decode { .. }));
    }

    #[test]
    fn get_unloaded_is_missing_texture() {
        let cache = TextureCache::new();
        let err = cache.get("resources/images/boss.png").unwrap_err();
        assert!(matches!(err, AssetError::MissingTexture(_)));
        assert!(err.to_string().contains("boss.png"));
    }

    #[test]
    fn sprite_sheet_loads_every_file() {
        let dir = temp_dir("sheet");
        for (i, file) in SpriteSheet::FILES.iter().enumerate() {
            write_png(&dir.join(file), 2 + i as u32, 2);
        }

        let mut cache = TextureCache::new();
        let mut factory = CountingFactory::default();
        let sheet = SpriteSheet::load(&dir, &mut cache, &mut factory).unwrap();

        assert_eq!(cache.len(), 5);
        assert_eq!(sheet.boss.width, 5);
        assert_eq!(sheet.bullet.width, 6);
    }
}
