//! Flood fill and global find/replace
//!
//! Both operations are constrained by the visible selection: whichever side
//! of it the origin cell sits on (inside or outside) is the side the
//! operation is confined to. With no visible selection there is no
//! constraint.

use std::collections::VecDeque;

use crate::level::{Layer, TileId};

use super::history::EditKind;
use super::mirror::{place_mirrored, place_tile, FlipTable};
use super::state::Tab;

/// The selection side of the origin cell: `Some(true)` inside, `Some(false)`
/// outside, `None` when no selection is visible
fn selection_side(tab: &Tab, x: i32, y: i32) -> Option<bool> {
    if tab.selection.any_visible() {
        Some(tab.selection.inside_any(x, y))
    } else {
        None
    }
}

fn side_matches(tab: &Tab, side: Option<bool>, x: i32, y: i32) -> bool {
    match side {
        Some(inside) => tab.selection.inside_any(x, y) == inside,
        None => true,
    }
}

/// BFS region fill from the origin cell.
///
/// 4-connected; a cell qualifies while its id still equals `find_id` and it
/// sits on the origin's side of the selection. Qualifying cells are placed
/// through the mirror fan-out and expanded; a visited grid sized to the
/// level prevents revisits and is discarded after the run.
pub fn flood_fill(
    tab: &mut Tab,
    table: &FlipTable,
    origin: (i32, i32),
    find_id: TileId,
    replace_id: TileId,
    layer: Layer,
) {
    if find_id == replace_id || !tab.level.in_bounds(origin.0, origin.1) {
        return;
    }
    let side = selection_side(tab, origin.0, origin.1);
    let w = tab.level.width();
    let h = tab.level.height();

    let mut visited = vec![false; (w * h) as usize];
    let mut queue = VecDeque::new();
    visited[(origin.1 * w + origin.0) as usize] = true;
    queue.push_back(origin);

    while let Some((x, y)) = queue.pop_front() {
        if tab.level.get(x, y, layer) != find_id || !side_matches(tab, side, x, y) {
            continue;
        }
        place_mirrored(tab, table, x, y, replace_id, layer, EditKind::Normal);
        for (nx, ny) in [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)] {
            if !tab.level.in_bounds(nx, ny) {
                continue;
            }
            let idx = (ny * w + nx) as usize;
            if !visited[idx] {
                visited[idx] = true;
                queue.push_back((nx, ny));
            }
        }
    }
}

/// Replace every `find_id` on the layer across the whole level, restricted
/// to the origin's side of the selection when one is visible
pub fn global_replace(
    tab: &mut Tab,
    origin: (i32, i32),
    find_id: TileId,
    replace_id: TileId,
    layer: Layer,
) {
    if find_id == replace_id {
        return;
    }
    let side = selection_side(tab, origin.0, origin.1);
    for y in 0..tab.level.height() {
        for x in 0..tab.level.width() {
            if tab.level.get(x, y, layer) == find_id && side_matches(tab, side, x, y) {
                place_tile(tab, x, y, replace_id, layer, EditKind::Normal);
            }
        }
    }
}
