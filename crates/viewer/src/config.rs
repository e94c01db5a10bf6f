//! Viewer configuration.

use std::env;
use std::path::PathBuf;

use crate::types::{TileRect, ViewKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerConfig {
    pub view: ViewKind,
    pub sprite_size: u32,
    pub surface_width: u32,
    pub surface_height: u32,
    pub tiles_dir: PathBuf,
    pub log_path: PathBuf,
    /// Seed for floating damage directions.
    pub rng_seed: u32,
    /// Tile rectangle of a follow view to outline on the world view.
    pub follow_box: Option<TileRect>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            view: ViewKind::default(),
            sprite_size: 32,
            surface_width: 1024,
            surface_height: 768,
            tiles_dir: PathBuf::from("resources/tiles"),
            log_path: PathBuf::from("rogue-view.log"),
            rng_seed: 0x5eed,
            follow_box: None,
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_positive(key: &str) -> Option<u32> {
    var(key).and_then(|s| s.parse().ok()).filter(|&v| v > 0)
}

/// Parse `x,y,width,height` in tiles.
fn parse_rect(s: &str) -> Option<TileRect> {
    let mut parts = s.split(',').map(str::trim);
    let x = parts.next()?.parse().ok()?;
    let y = parts.next()?.parse().ok()?;
    let width = parts.next()?.parse().ok()?;
    let height = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(TileRect { x, y, width, height })
}

impl ViewerConfig {
    /// Create from `ROGUE_VIEW_*` environment variables.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            view: var("ROGUE_VIEW_VIEW")
                .and_then(|s| ViewKind::from_str(&s))
                .unwrap_or(d.view),
            sprite_size: parse_positive("ROGUE_VIEW_SPRITE_SIZE").unwrap_or(d.sprite_size),
            surface_width: parse_positive("ROGUE_VIEW_SURFACE_WIDTH").unwrap_or(d.surface_width),
            surface_height: parse_positive("ROGUE_VIEW_SURFACE_HEIGHT").unwrap_or(d.surface_height),
            tiles_dir: var("ROGUE_VIEW_TILES_DIR").map(PathBuf::from).unwrap_or(d.tiles_dir),
            log_path: var("ROGUE_VIEW_LOG_PATH").map(PathBuf::from).unwrap_or(d.log_path),
            rng_seed: d.rng_seed,
            follow_box: var("ROGUE_VIEW_FOLLOW_BOX").and_then(|s| parse_rect(&s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = ViewerConfig::default();
        assert_eq!(c.view, ViewKind::Follow);
        assert_eq!(c.sprite_size, 32);
        assert_eq!((c.surface_width, c.surface_height), (1024, 768));
        assert_eq!(c.tiles_dir, PathBuf::from("resources/tiles"));
        assert_eq!(c.follow_box, None);
    }

    #[test]
    fn test_parse_rect() {
        assert_eq!(
            parse_rect("4, -2,10,8"),
            Some(TileRect {
                x: 4,
                y: -2,
                width: 10,
                height: 8
            })
        );
        assert_eq!(parse_rect("4,2,10"), None);
        assert_eq!(parse_rect("4,2,10,8,1"), None);
        assert_eq!(parse_rect("4,2,-10,8"), None);
    }
}
