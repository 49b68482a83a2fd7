//! Mirrored tile placement
//!
//! Symmetry modes fan one edit out to up to four grid writes. Which tile id
//! lands on the mirrored side comes from a flip pairing table loaded from a
//! RON resource; tiles without a pairing are their own flip.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::level::{Layer, Level, TileId};

use super::history::EditKind;
use super::state::Tab;

/// Error type for flip-table resources
#[derive(Debug)]
pub enum FlipTableError {
    Io(std::io::Error),
    Parse(ron::error::SpannedError),
}

impl From<std::io::Error> for FlipTableError {
    fn from(e: std::io::Error) -> Self {
        FlipTableError::Io(e)
    }
}

impl From<ron::error::SpannedError> for FlipTableError {
    fn from(e: ron::error::SpannedError) -> Self {
        FlipTableError::Parse(e)
    }
}

impl std::fmt::Display for FlipTableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlipTableError::Io(e) => write!(f, "IO error: {}", e),
            FlipTableError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for FlipTableError {}

/// On-disk shape of the flip-definition resource (RON)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlipTableDef {
    pub horizontal: Vec<(TileId, TileId)>,
    pub vertical: Vec<(TileId, TileId)>,
}

/// Tile-flip lookup table. A pair `(a, b)` maps both ways, so `hflip` and
/// `vflip` are involutions over every mapped id.
#[derive(Debug, Clone, Default)]
pub struct FlipTable {
    horizontal: HashMap<TileId, TileId>,
    vertical: HashMap<TileId, TileId>,
}

impl From<FlipTableDef> for FlipTable {
    fn from(def: FlipTableDef) -> Self {
        let mut table = FlipTable::default();
        for (a, b) in def.horizontal {
            table.horizontal.insert(a, b);
            table.horizontal.insert(b, a);
        }
        for (a, b) in def.vertical {
            table.vertical.insert(a, b);
            table.vertical.insert(b, a);
        }
        table
    }
}

impl FlipTable {
    /// Empty table: every tile is its own flip
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a flip-definition resource from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, FlipTableError> {
        let contents = fs::read_to_string(path)?;
        Self::load_from_str(&contents)
    }

    /// Parse a flip-definition resource from a RON string
    pub fn load_from_str(contents: &str) -> Result<Self, FlipTableError> {
        let def: FlipTableDef = ron::from_str(contents)?;
        Ok(def.into())
    }

    /// Horizontal-flip equivalent of a tile id
    pub fn hflip(&self, id: TileId) -> TileId {
        *self.horizontal.get(&id).unwrap_or(&id)
    }

    /// Vertical-flip equivalent of a tile id
    pub fn vflip(&self, id: TileId) -> TileId {
        *self.vertical.get(&id).unwrap_or(&id)
    }
}

/// Write one tile through the full placement pipeline: bounds check, layer
/// activity check, history recording, then the grid write. Out-of-bounds or
/// inactive-layer writes are silent no-ops.
pub fn place_tile(tab: &mut Tab, x: i32, y: i32, id: TileId, layer: Layer, kind: EditKind) {
    if !tab.level.in_bounds(x, y) {
        return;
    }
    if !tab.layer_active(layer) {
        return;
    }
    let old = tab.level.get(x, y, layer);
    tab.history.record_edit(x, y, layer, old, id, kind);
    tab.level.set(x, y, layer, id);
    tab.dirty = true;
}

/// Place a tile and fan it out to the enabled mirror axes.
///
/// The base write always happens. Horizontal mirror adds `(W-1-x, y)` with
/// the h-flipped id, vertical adds `(x, H-1-y)` with the v-flipped id, and
/// with both enabled the diagonal cell gets `hflip(vflip(id))` (vertical
/// flip applied first). Every write goes through [`place_tile`], so writes
/// that overlap near a mirror axis simply land in call order.
pub fn place_mirrored(
    tab: &mut Tab,
    table: &FlipTable,
    x: i32,
    y: i32,
    id: TileId,
    layer: Layer,
    kind: EditKind,
) {
    let w = tab.level.width();
    let h = tab.level.height();
    let mirror_h = tab.mirror_h;
    let mirror_v = tab.mirror_v;

    place_tile(tab, x, y, id, layer, kind);
    if mirror_h {
        place_tile(tab, w - 1 - x, y, table.hflip(id), layer, kind);
    }
    if mirror_v {
        place_tile(tab, x, h - 1 - y, table.vflip(id), layer, kind);
    }
    if mirror_h && mirror_v {
        place_tile(
            tab,
            w - 1 - x,
            h - 1 - y,
            table.hflip(table.vflip(id)),
            layer,
            kind,
        );
    }
}

/// Mirror the content of every masked layer left-to-right, mapping ids
/// through the flip table. An involution: applying it twice restores the
/// level, which is exactly how history undoes a flip.
pub fn flip_level_horizontal(level: &mut Level, mask: [bool; 5], table: &FlipTable) {
    let w = level.width();
    let h = level.height();
    for layer in Layer::ALL {
        if !mask[layer.index()] {
            continue;
        }
        for y in 0..h {
            let row: Vec<TileId> = (0..w).map(|x| level.get(x, y, layer)).collect();
            for x in 0..w {
                level.set(x, y, layer, table.hflip(row[(w - 1 - x) as usize]));
            }
        }
    }
}

/// Mirror the content of every masked layer top-to-bottom. Also an
/// involution; see [`flip_level_horizontal`].
pub fn flip_level_vertical(level: &mut Level, mask: [bool; 5], table: &FlipTable) {
    let w = level.width();
    let h = level.height();
    for layer in Layer::ALL {
        if !mask[layer.index()] {
            continue;
        }
        for x in 0..w {
            let column: Vec<TileId> = (0..h).map(|y| level.get(x, y, layer)).collect();
            for y in 0..h {
                level.set(x, y, layer, table.vflip(column[(h - 1 - y) as usize]));
            }
        }
    }
}
