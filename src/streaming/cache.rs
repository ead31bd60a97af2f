//! Windowed tile cache
//!
//! Keeps exactly the tiles within `view_distance` of the tile under the
//! viewpoint. Each update generates the missing tiles of the window and
//! evicts everything outside it. Terrain chunks and parallax tiles are both
//! stored here; only the `generate` closure differs.

use std::collections::BTreeMap;

use super::span::{index_for, TileSpan};
use crate::core::error::ensure_positive;
use crate::core::Result;

/// What one `update` call changed.
#[derive(Debug)]
pub struct WindowUpdate<T> {
    /// Tile index under the viewpoint.
    pub center: i64,
    /// Indices generated by this call, ascending.
    pub generated: Vec<i64>,
    /// Tiles evicted by this call, ascending by index. The caller releases
    /// their resources.
    pub evicted: Vec<(i64, T)>,
}

impl<T> WindowUpdate<T> {
    /// True if the live set did not change.
    pub fn is_unchanged(&self) -> bool {
        self.generated.is_empty() && self.evicted.is_empty()
    }
}

/// World-aligned tile store with a sliding window.
#[derive(Debug)]
pub struct TileCache<T> {
    /// Live tiles by index
    tiles: BTreeMap<i64, T>,
    /// Tile width in world units
    tile_width: f64,
    /// Tiles kept on each side of the center
    view_distance: u32,
    /// Center index of the last update
    last_center: Option<i64>,
}

impl<T> TileCache<T> {
    /// Create an empty cache.
    ///
    /// # Arguments
    /// * `tile_width` - World width of each tile, finite and > 0
    /// * `view_distance` - Number of tiles kept on each side of the center
    pub fn new(tile_width: f64, view_distance: u32) -> Result<Self> {
        ensure_positive("tile_width", tile_width)?;
        Ok(Self {
            tiles: BTreeMap::new(),
            tile_width,
            view_distance,
            last_center: None,
        })
    }

    pub fn tile_width(&self) -> f64 {
        self.tile_width
    }

    pub fn view_distance(&self) -> u32 {
        self.view_distance
    }

    /// Center index of the last update, if any.
    pub fn last_center(&self) -> Option<i64> {
        self.last_center
    }

    /// Index of the tile containing world x.
    pub fn index_for(&self, x: f64) -> i64 {
        index_for(x, self.tile_width)
    }

    /// Span of tile `index`.
    pub fn span(&self, index: i64) -> TileSpan {
        TileSpan::at(index, self.tile_width)
    }

    /// Inclusive index window around `center`.
    pub fn window(&self, center: i64) -> std::ops::RangeInclusive<i64> {
        let d = self.view_distance as i64;
        center.saturating_sub(d)..=center.saturating_add(d)
    }

    /// Slide the window so it is centered on the tile containing world x.
    ///
    /// Missing tiles are built with `generate`; tiles already live are never
    /// rebuilt. Tiles farther than `view_distance` from the center are
    /// removed and handed back in the result.
    pub fn update<F>(&mut self, x: f64, mut generate: F) -> WindowUpdate<T>
    where
        F: FnMut(TileSpan) -> T,
    {
        let center = self.index_for(x);
        let window = self.window(center);

        let mut generated = Vec::new();
        for index in window.clone() {
            if !self.tiles.contains_key(&index) {
                let tile = generate(self.span(index));
                self.tiles.insert(index, tile);
                generated.push(index);
            }
        }

        let stale: Vec<i64> = self
            .tiles
            .keys()
            .copied()
            .filter(|i| !window.contains(i))
            .collect();
        let evicted = stale
            .into_iter()
            .filter_map(|i| self.tiles.remove(&i).map(|t| (i, t)))
            .collect();

        self.last_center = Some(center);
        WindowUpdate { center, generated, evicted }
    }

    /// Get a tile by index
    pub fn get(&self, index: i64) -> Option<&T> {
        self.tiles.get(&index)
    }

    /// Remove a tile. Removing an absent index is a no-op.
    pub fn remove(&mut self, index: i64) -> Option<T> {
        self.tiles.remove(&index)
    }

    /// Remove every tile, returning them in index order.
    pub fn drain(&mut self) -> Vec<(i64, T)> {
        self.last_center = None;
        std::mem::take(&mut self.tiles).into_iter().collect()
    }

    pub fn contains(&self, index: i64) -> bool {
        self.tiles.contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Live indices in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = i64> + '_ {
        self.tiles.keys().copied()
    }

    /// Live tiles in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &T)> {
        self.tiles.iter().map(|(i, t)| (*i, t))
    }
}
