//! Tile editor engine
//!
//! Everything above raw level storage:
//! - Tool state machine (brush, fill, select)
//! - Mirrored placement and the tile flip table
//! - Undo/redo history
//! - Selection boxes and the clipboard
//! - The multi-tab editor shell

mod clipboard;
mod fill;
mod history;
mod mirror;
mod selection;
mod state;
mod tools;

pub use clipboard::*;
pub use fill::*;
pub use history::*;
pub use mirror::*;
pub use selection::*;
pub use state::*;
pub use tools::*;
