//! Tile images and their scaled variants.
//!
//! Images are decoded once, before rendering starts. Unrotated tiles are
//! scaled to the sprite size on first use and cached for the rest of the
//! session; rotated tiles are scaled and rotated on every draw.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use image::imageops::{self, FilterType};
use image::RgbaImage;
use tracing::{debug, info};

use crate::types::Rotation;

#[derive(Debug, Clone, Default)]
pub struct SpriteSheet {
    sprite_size: u32,
    originals: HashMap<u32, RgbaImage>,
    scaled: HashMap<u32, RgbaImage>,
}

impl SpriteSheet {
    pub fn new(sprite_size: u32) -> Self {
        Self {
            sprite_size: sprite_size.max(1),
            originals: HashMap::new(),
            scaled: HashMap::new(),
        }
    }

    /// Decode every `<id>.png` in `dir`.
    ///
    /// Files whose stem is not a number are ignored.
    pub fn load_dir(dir: impl AsRef<Path>, sprite_size: u32) -> Result<Self> {
        let dir = dir.as_ref();
        let mut sheet = Self::new(sprite_size);

        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("reading tile directory {}", dir.display()))?;
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("png") {
                continue;
            }
            let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<u32>().ok())
            else {
                debug!(path = %path.display(), "skipping non-tile image");
                continue;
            };
            let img = image::open(&path)
                .with_context(|| format!("decoding tile {}", path.display()))?
                .to_rgba8();
            sheet.insert(id, img);
        }

        info!(count = sheet.len(), dir = %dir.display(), "loaded tile images");
        Ok(sheet)
    }

    pub fn sprite_size(&self) -> u32 {
        self.sprite_size
    }

    pub fn insert(&mut self, id: u32, img: RgbaImage) {
        self.scaled.remove(&id);
        self.originals.insert(id, img);
    }

    pub fn contains(&self, id: u32) -> bool {
        self.originals.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.originals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }

    /// Number of scaled images currently cached.
    pub fn cached_len(&self) -> usize {
        self.scaled.len()
    }

    /// Drop every scaled image. Originals are kept.
    pub fn clear_cache(&mut self) {
        self.scaled.clear();
    }

    /// Draw-ready image for a tile layer, or `None` when the id is unknown.
    pub fn tile(&mut self, id: u32, rotation: Rotation) -> Option<Tile<'_>> {
        let s = self.sprite_size;
        match rotation {
            Rotation::Deg0 => {
                if !self.scaled.contains_key(&id) {
                    let original = self.originals.get(&id)?;
                    self.scaled.insert(id, scale(original, s));
                }
                self.scaled.get(&id).map(Tile::Cached)
            }
            rotation => {
                let scaled = scale(self.originals.get(&id)?, s);
                let rotated = match rotation {
                    Rotation::Deg90 => imageops::rotate90(&scaled),
                    Rotation::Deg180 => imageops::rotate180(&scaled),
                    _ => imageops::rotate270(&scaled),
                };
                Some(Tile::Transformed(rotated))
            }
        }
    }
}

/// A scaled tile, either borrowed from the cache or freshly transformed.
pub enum Tile<'a> {
    Cached(&'a RgbaImage),
    Transformed(RgbaImage),
}

impl Tile<'_> {
    pub fn image(&self) -> &RgbaImage {
        match self {
            Tile::Cached(img) => img,
            Tile::Transformed(img) => img,
        }
    }
}

fn scale(img: &RgbaImage, size: u32) -> RgbaImage {
    if img.width() == size && img.height() == size {
        return img.clone();
    }
    imageops::resize(img, size, size, FilterType::Nearest)
}
