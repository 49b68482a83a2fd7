//! Copy, cut and paste over selection boxes
//!
//! The clipboard holds one entry per visible selection box. Entry offsets
//! are relative to the top-left of the union boundary of all visible boxes,
//! so a multi-box copy keeps its internal layout when pasted somewhere
//! else. The clipboard itself lives on the editor, not on a tab, and moves
//! content between documents.

use crate::level::{limits, Layer, TileId};

use super::history::{EditKind, HistoryState};
use super::mirror::{place_mirrored, place_tile, FlipTable};
use super::state::Tab;

/// One copied selection box, with its layout offset inside the copy
#[derive(Debug, Clone)]
pub struct ClipboardEntry {
    /// Top-left of this entry relative to the union boundary's top-left
    pub offset: (i32, i32),
    pub width: i32,
    pub height: i32,
    /// Row-major tile planes in logical layer order; layers that were
    /// inactive at copy time are all zeros
    pub tiles: [Vec<TileId>; limits::LAYER_COUNT],
}

/// Copy every visible selection box into the clipboard, replacing its
/// previous contents. Only active layers are captured. With no visible
/// selection the clipboard is left untouched.
pub fn copy(tab: &Tab, clipboard: &mut Vec<ClipboardEntry>) {
    let Some((union_left, union_top, _, _)) = tab.selection.union_boundary() else {
        return;
    };
    clipboard.clear();
    for bounds in tab.selection.boxes().iter().filter(|b| b.visible) {
        let (left, top, right, bottom) = bounds.ordered();
        let width = right - left + 1;
        let height = bottom - top + 1;
        let mut tiles: [Vec<TileId>; limits::LAYER_COUNT] =
            std::array::from_fn(|_| vec![0; (width * height) as usize]);
        for layer in Layer::ALL {
            if !tab.layer_active(layer) {
                continue;
            }
            let plane = &mut tiles[layer.index()];
            for dy in 0..height {
                for dx in 0..width {
                    let (x, y) = (left + dx, top + dy);
                    if tab.level.in_bounds(x, y) {
                        plane[(dy * width + dx) as usize] = tab.level.get(x, y, layer);
                    }
                }
            }
        }
        clipboard.push(ClipboardEntry {
            offset: (left - union_left, top - union_top),
            width,
            height,
            tiles,
        });
    }
}

/// Copy the visible selection, then clear the copied cells in one `Clear`
/// history state and drop the selection
pub fn cut(tab: &mut Tab, clipboard: &mut Vec<ClipboardEntry>) {
    if !tab.selection.any_visible() {
        return;
    }
    copy(tab, clipboard);
    tab.history.new_state(HistoryState::Clear { edits: Vec::new() });
    let boxes = tab.selection.snapshot();
    for bounds in boxes.iter().filter(|b| b.visible) {
        let (left, top, right, bottom) = bounds.ordered();
        for y in top..=bottom {
            for x in left..=right {
                for layer in Layer::ALL {
                    // Overlapping boxes coalesce to one edit per cell
                    place_tile(tab, x, y, 0, layer, EditKind::Clear);
                }
            }
        }
    }
    tab.selection.clear();
}

/// Paste the clipboard anchored at `mouse_tile`, as one `Normal` history
/// state. Every entry cell is written, including zeros, so pasted content
/// stamps over what was there. Writes go through the mirror fan-out like
/// any other placement; the parts that land out of bounds are dropped.
pub fn paste(
    tab: &mut Tab,
    table: &FlipTable,
    clipboard: &[ClipboardEntry],
    mouse_tile: (i32, i32),
) {
    if clipboard.is_empty() {
        return;
    }
    tab.history.new_state(HistoryState::Normal { edits: Vec::new() });
    for entry in clipboard {
        for layer in Layer::ALL {
            let plane = &entry.tiles[layer.index()];
            for dy in 0..entry.height {
                for dx in 0..entry.width {
                    let id = plane[(dy * entry.width + dx) as usize];
                    let x = mouse_tile.0 + entry.offset.0 + dx;
                    let y = mouse_tile.1 + entry.offset.1 + dy;
                    place_mirrored(tab, table, x, y, id, layer, EditKind::Normal);
                }
            }
        }
    }
}
