//! # Animation: Frame Tables and Sprite Playback
//!
//! An [`AnimationClip`] is an ordered list of atlas rectangles, each shown for
//! its own duration. Clips are grouped by name in an [`AnimationTable`],
//! usually loaded from a TexturePacker / Aseprite JSON export.
//!
//! The [`Animation`] component plays one clip on an entity. Every tick
//! [`animate_sprites`] advances its clock by `speed * dt` and writes the
//! current frame into the entity's [`SourceRect`]. Playback always loops.
//!
//! ```text
//! clip "ufo": [f0 100ms][f1 100ms][f2 100ms]      total = 300ms
//!
//! elapsed = 730ms  →  730 mod 300 = 130ms  →  f1
//! ```
//!
//! ## JSON format
//!
//! ```text
//! {
//!   "frames": [ { "filename": "ufo0.png",
//!                 "frame": { "x": 0, "y": 0, "w": 32, "h": 32 },
//!                 "duration": 100 }, ... ],        // or an object keyed by name
//!   "meta": { "frameTags": [ { "name": "idle", "from": 0, "to": 2 } ] }
//! }
//! ```
//!
//! Durations are milliseconds (100 if absent). Without `frameTags` the whole
//! file becomes one clip named after the file stem (`ufo.json` → `"ufo"`).

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::assets::AssetError;
use crate::components::SourceRect;
use crate::ecs::World;
use crate::math::Rect;
use crate::time::Time;

const DEFAULT_FRAME_MS: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationFrame {
    pub rect: Rect,
    /// Seconds this frame stays on screen.
    pub duration: f32,
}

/// An ordered, looping sequence of frames. Immutable once built.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnimationClip {
    frames: Vec<AnimationFrame>,
    total: f32,
}

impl AnimationClip {
    pub fn new(frames: Vec<AnimationFrame>) -> Self {
        let total = frames.iter().map(|f| f.duration.max(0.0)).sum();
        Self { frames, total }
    }

    /// Every rect shown for the same `frame_time`.
    pub fn uniform(rects: impl IntoIterator<Item = Rect>, frame_time: f32) -> Self {
        Self::new(
            rects
                .into_iter()
                .map(|rect| AnimationFrame {
                    rect,
                    duration: frame_time,
                })
                .collect(),
        )
    }

    pub fn frames(&self) -> &[AnimationFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Length of one loop in seconds.
    pub fn total_duration(&self) -> f32 {
        self.total
    }

    /// Index of the frame showing `elapsed` seconds into playback, looping.
    /// `None` for an empty clip.
    pub fn frame_index_at(&self, elapsed: f32) -> Option<usize> {
        if self.frames.is_empty() {
            return None;
        }
        if self.total <= 0.0 {
            return Some(0);
        }
        let t = elapsed.rem_euclid(self.total);
        let mut end = 0.0;
        for (i, frame) in self.frames.iter().enumerate() {
            end += frame.duration.max(0.0);
            if t < end {
                return Some(i);
            }
        }
        // Rounding in the running sum can leave t a hair past the end.
        Some(self.frames.len() - 1)
    }
}

// ── AnimationTable ──────────────────────────────────────────────────────

/// Named clips, shared read-only with every entity that plays them.
#[derive(Debug, Clone, Default)]
pub struct AnimationTable {
    clips: HashMap<String, Arc<AnimationClip>>,
}

#[derive(Deserialize)]
struct SheetFile {
    frames: FrameList,
    #[serde(default)]
    meta: SheetMeta,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FrameList {
    Array(Vec<FrameEntry>),
    Hash(serde_json::Map<String, serde_json::Value>),
}

#[derive(Deserialize)]
struct FrameEntry {
    frame: Rect,
    #[serde(default)]
    duration: Option<f32>,
}

#[derive(Deserialize, Default)]
struct SheetMeta {
    #[serde(default, rename = "frameTags")]
    frame_tags: Vec<FrameTag>,
}

#[derive(Deserialize)]
struct FrameTag {
    name: String,
    from: usize,
    to: usize,
}

impl AnimationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, clip: AnimationClip) {
        self.clips.insert(name.into(), Arc::new(clip));
    }

    pub fn get(&self, name: &str) -> Option<Arc<AnimationClip>> {
        self.clips.get(name).cloned()
    }

    /// Like [`get`](Self::get), for call sites that treat absence as an error.
    pub fn clip(&self, name: &str) -> Result<Arc<AnimationClip>, AssetError> {
        self.get(name)
            .ok_or_else(|| AssetError::MissingClip(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Merge another table in. Clips with the same name are replaced.
    pub fn extend(&mut self, other: AnimationTable) {
        self.clips.extend(other.clips);
    }

    /// Load a JSON sprite-sheet export from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AssetError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let table = Self::from_json(&text, &stem).map_err(|message| AssetError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        log::debug!("Loaded {} animation clip(s) from '{}'", table.len(), path.display());
        Ok(table)
    }

    /// Parse a JSON sprite-sheet export. `default_name` names the single clip
    /// produced when the file has no frame tags.
    pub fn from_json(text: &str, default_name: &str) -> Result<Self, String> {
        let sheet: SheetFile = serde_json::from_str(text).map_err(|e| e.to_string())?;

        let entries = match sheet.frames {
            FrameList::Array(entries) => entries,
            FrameList::Hash(map) => map
                .into_iter()
                .map(|(name, value)| {
                    serde_json::from_value::<FrameEntry>(value)
                        .map_err(|e| format!("frame '{name}': {e}"))
                })
                .collect::<Result<Vec<_>, _>>()?,
        };
        let frames: Vec<AnimationFrame> = entries
            .into_iter()
            .map(|entry| AnimationFrame {
                rect: entry.frame,
                duration: entry.duration.unwrap_or(DEFAULT_FRAME_MS) / 1000.0,
            })
            .collect();

        let mut table = Self::new();
        if sheet.meta.frame_tags.is_empty() {
            table.insert(default_name, AnimationClip::new(frames));
            return Ok(table);
        }
        for tag in sheet.meta.frame_tags {
            if tag.from > tag.to || tag.to >= frames.len() {
                return Err(format!(
                    "tag '{}' spans frames {}..={} but the sheet has {}",
                    tag.name,
                    tag.from,
                    tag.to,
                    frames.len()
                ));
            }
            table.insert(tag.name, AnimationClip::new(frames[tag.from..=tag.to].to_vec()));
        }
        Ok(table)
    }
}

// ── Animation component ─────────────────────────────────────────────────

/// Component: plays a shared clip on an entity. Requires a [`SourceRect`].
#[derive(Debug, Clone)]
pub struct Animation {
    clip: Arc<AnimationClip>,
    /// Playback speed multiplier (1.0 = authored timing).
    pub speed: f32,
    elapsed: f32,
    current: usize,
}

impl Animation {
    pub fn new(clip: Arc<AnimationClip>, speed: f32) -> Self {
        Self {
            clip,
            speed,
            elapsed: 0.0,
            current: 0,
        }
    }

    /// Advance playback. Elapsed time is kept within one loop so long
    /// sessions don't lose float precision.
    pub fn update(&mut self, dt: f32) {
        self.elapsed += self.speed * dt;
        let total = self.clip.total_duration();
        if total > 0.0 {
            self.elapsed = self.elapsed.rem_euclid(total);
        }
        if let Some(index) = self.clip.frame_index_at(self.elapsed) {
            self.current = index;
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// `None` only for an empty clip.
    pub fn current_frame(&self) -> Option<Rect> {
        self.clip.frames().get(self.current).map(|f| f.rect)
    }

    pub fn clip(&self) -> &AnimationClip {
        &self.clip
    }
}

/// System: advance every animation and publish its frame to `SourceRect`.
pub fn animate_sprites(world: &mut World) {
    let dt = world.resource::<Time>().delta_secs();

    world.query::<(&mut Animation, &mut SourceRect)>(|_entity, (animation, source)| {
        animation.update(dt);
        if let Some(rect) = animation.current_frame() {
            source.0 = rect;
        }
    });
}
