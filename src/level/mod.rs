//! Level module - multi-layer tile grid data model
//!
//! - Five parallel tile planes per level, one `i32` tile id per cell
//! - Bounds-checked access is the caller's job; the grid itself is pure data
//! - Binary save/load in the fixed big-endian level format

mod grid;
mod io;

pub use grid::*;
pub use io::*;
