//! Sparse world tile store.
//!
//! Maps a world coordinate to the layer stack last reported for it. Entries
//! live for the whole session and are dropped wholesale on reconnect.

use std::collections::HashMap;

use tracing::debug;

use crate::types::{key_in_range, world_key, LayerStack, TileLayer};

#[derive(Debug, Clone, Default)]
pub struct TileDataStore {
    entries: HashMap<i64, LayerStack>,
}

impl TileDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stack at a world coordinate.
    ///
    /// The previous occupant is discarded entirely, whatever its layer count.
    /// Returns `false` and stores nothing when `y` is outside the packed key
    /// range.
    pub fn replace(&mut self, x: i32, y: i32, stack: LayerStack) -> bool {
        if !key_in_range(y) {
            debug!(x, y, "tile outside the key range, dropping write");
            return false;
        }
        self.entries.insert(world_key(x, y), stack);
        true
    }

    /// Layers at a world coordinate, bottom first.
    pub fn get(&self, x: i32, y: i32) -> Option<&[TileLayer]> {
        if !key_in_range(y) {
            return None;
        }
        self.entries.get(&world_key(x, y)).map(Vec::as_slice)
    }

    /// Image id of the bottom layer, if the cell is known.
    pub fn base_image(&self, x: i32, y: i32) -> Option<u32> {
        self.get(x, y)
            .and_then(|layers| layers.first())
            .map(|l| l.image_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rotation;

    fn layer(id: u32) -> TileLayer {
        TileLayer::new(id, Rotation::Deg0)
    }

    #[test]
    fn replace_overwrites_instead_of_merging() {
        let mut store = TileDataStore::new();
        store.replace(3, 4, vec![layer(1), layer(2)]);
        store.replace(3, 4, vec![layer(7)]);

        assert_eq!(store.get(3, 4), Some(&[layer(7)][..]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn neighbouring_cells_do_not_collide() {
        let mut store = TileDataStore::new();
        store.replace(0, 1, vec![layer(1)]);
        store.replace(1, 0, vec![layer(2)]);
        assert_eq!(store.base_image(0, 1), Some(1));
        assert_eq!(store.base_image(1, 0), Some(2));
        assert_eq!(store.base_image(1, 1), None);
    }

    #[test]
    fn empty_stack_is_kept_as_known_cell() {
        let mut store = TileDataStore::new();
        store.replace(0, 0, Vec::new());
        assert_eq!(store.get(0, 0), Some(&[][..]));
        assert_eq!(store.base_image(0, 0), None);
    }

    #[test]
    fn out_of_range_rows_are_not_stored() {
        let mut store = TileDataStore::new();
        assert!(store.replace(0, 1, vec![layer(1)]));
        // 32768 would alias (1, 0) if it were packed.
        assert!(!store.replace(0, 32_768, vec![layer(2)]));
        assert!(!store.replace(5, -40_000, vec![layer(3)]));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(0, 32_768), None);
        assert_eq!(store.base_image(1, 0), None);
        assert_eq!(store.base_image(0, 1), Some(1));
    }

    #[test]
    fn clear_drops_everything() {
        let mut store = TileDataStore::new();
        store.replace(0, 0, vec![layer(1)]);
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.get(0, 0), None);
    }
}
