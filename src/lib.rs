//! Tile-level editing engine for 2D games
//!
//! The engine owns the document model (a multi-layer tile grid), the tool
//! state machine (brush / fill / select), mirrored placement, flood fill,
//! the selection model, the clipboard, and a multi-kind undo/redo log.
//! Rendering, widgets and the window loop live downstream: callers feed
//! discrete input events in and read engine state back out.

pub mod editor;
pub mod level;

pub use editor::{Editor, Tab};
pub use level::{Layer, Level, TileId};
