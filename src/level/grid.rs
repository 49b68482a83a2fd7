//! Tile grid storage and resize

/// A placeable tile id. `0` means "empty cell".
pub type TileId = i32;

/// Format constants and validation limits for level data
pub mod limits {
    /// On-disk format version written to new levels
    pub const FORMAT_VERSION: i32 = 1;
    /// Number of tile layers per level
    pub const LAYER_COUNT: usize = 5;
    /// Smallest allowed level dimension (width or height)
    pub const MIN_DIM: i32 = 1;
    /// Largest allowed level dimension, to reject malicious files
    pub const MAX_DIM: i32 = 4096;
}

/// One of the five tile planes of a level.
///
/// The discriminant order here is the logical enumeration order. The on-disk
/// layer order differs; both serialization directions go through
/// [`Layer::DISK_ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Tag,
    Overlay,
    Active,
    Back1,
    Back2,
}

impl Layer {
    /// All layers in logical enumeration order
    pub const ALL: [Layer; limits::LAYER_COUNT] = [
        Layer::Tag,
        Layer::Overlay,
        Layer::Active,
        Layer::Back1,
        Layer::Back2,
    ];

    /// Layers in the order they appear in a level file
    pub const DISK_ORDER: [Layer; limits::LAYER_COUNT] = [
        Layer::Back1,
        Layer::Active,
        Layer::Tag,
        Layer::Overlay,
        Layer::Back2,
    ];

    /// Index of this layer into per-layer arrays (logical order)
    pub fn index(self) -> usize {
        match self {
            Layer::Tag => 0,
            Layer::Overlay => 1,
            Layer::Active => 2,
            Layer::Back1 => 3,
            Layer::Back2 => 4,
        }
    }
}

/// Anchor for the old content when a level is resized.
///
/// The anchor names where the existing tiles stay pinned inside the new
/// bounds: `NorthWest` keeps them at the top-left corner, `Center` keeps
/// them centered, and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeAnchor {
    NorthWest,
    North,
    NorthEast,
    West,
    Center,
    East,
    SouthWest,
    South,
    SouthEast,
}

impl ResizeAnchor {
    /// Offset of the old content's origin inside the new bounds.
    ///
    /// Components can be negative on shrink; the copy loop clamps per cell.
    pub fn content_offset(self, old_w: i32, old_h: i32, new_w: i32, new_h: i32) -> (i32, i32) {
        let dx = new_w - old_w;
        let dy = new_h - old_h;
        match self {
            ResizeAnchor::NorthWest => (0, 0),
            ResizeAnchor::North => (dx / 2, 0),
            ResizeAnchor::NorthEast => (dx, 0),
            ResizeAnchor::West => (0, dy / 2),
            ResizeAnchor::Center => (dx / 2, dy / 2),
            ResizeAnchor::East => (dx, dy / 2),
            ResizeAnchor::SouthWest => (0, dy),
            ResizeAnchor::South => (dx / 2, dy),
            ResizeAnchor::SouthEast => (dx, dy),
        }
    }
}

/// A level document: header fields plus five parallel tile planes.
///
/// Tiles are stored row-major with the origin at the top-left, so the cell
/// `(x, y)` lives at index `y * width + x`. All five planes always have
/// exactly `width * height` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    pub version: i32,
    width: i32,
    height: i32,
    layers: [Vec<TileId>; limits::LAYER_COUNT],
}

impl Level {
    /// Create an empty level (all cells 0) at the current format version
    pub fn new(width: i32, height: i32) -> Self {
        let cells = (width.max(0) as usize) * (height.max(0) as usize);
        Self {
            version: limits::FORMAT_VERSION,
            width,
            height,
            layers: std::array::from_fn(|_| vec![0; cells]),
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Check whether a tile coordinate is inside the grid
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    fn idx(&self, x: i32, y: i32) -> usize {
        (y * self.width + x) as usize
    }

    /// Read one cell. The coordinate must be in bounds; out-of-range access
    /// is a programming error, callers guard with [`Level::in_bounds`].
    pub fn get(&self, x: i32, y: i32, layer: Layer) -> TileId {
        self.layers[layer.index()][self.idx(x, y)]
    }

    /// Write one cell. Same bounds contract as [`Level::get`].
    pub fn set(&mut self, x: i32, y: i32, layer: Layer, id: TileId) {
        let idx = self.idx(x, y);
        self.layers[layer.index()][idx] = id;
    }

    /// Full tile plane for one layer, row-major
    pub fn layer_tiles(&self, layer: Layer) -> &[TileId] {
        &self.layers[layer.index()]
    }

    pub fn layer_tiles_mut(&mut self, layer: Layer) -> &mut [TileId] {
        &mut self.layers[layer.index()]
    }

    /// Build a resized copy with the old content anchored per `anchor`.
    ///
    /// Content that falls outside the new bounds is discarded; cells the old
    /// content does not cover stay empty. No read or write ever leaves
    /// either buffer.
    pub fn resized(&self, anchor: ResizeAnchor, new_w: i32, new_h: i32) -> Level {
        let (ox, oy) = anchor.content_offset(self.width, self.height, new_w, new_h);
        let mut out = Level::new(new_w, new_h);
        out.version = self.version;
        for layer in Layer::ALL {
            for y in 0..self.height {
                let ny = y + oy;
                if ny < 0 || ny >= new_h {
                    continue;
                }
                for x in 0..self.width {
                    let nx = x + ox;
                    if nx < 0 || nx >= new_w {
                        continue;
                    }
                    out.set(nx, ny, layer, self.get(x, y, layer));
                }
            }
        }
        out
    }
}
