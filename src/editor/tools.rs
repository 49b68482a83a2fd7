//! Tool state machine
//!
//! Brush, fill and select are driven by a small discrete input-event enum
//! instead of raw windowing events, so the engine stays decoupled from any
//! particular input library. A press-to-release gesture is the implicit
//! transaction boundary for `Normal` history states: there is no commit
//! call, a state just stops accepting edits when the next gesture opens a
//! new one.

use crate::level::{Layer, TileId};

use super::fill;
use super::history::{EditKind, HistoryState};
use super::mirror::{place_mirrored, FlipTable};
use super::selection::SelectBounds;
use super::state::Tab;

/// Which tool is selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolKind {
    #[default]
    Brush,
    Fill,
    Select,
}

/// What the active tool is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolState {
    #[default]
    Idle,
    Place,
    Erase,
}

/// Discrete input events consumed by the tool state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    LeftDown,
    LeftUp,
    RightDown,
    RightUp,
    Move,
    /// The editor lost input focus: forces Idle without finalizing the open
    /// history state
    FocusLost,
}

/// Collaborator inputs sampled per event: pointer, palette and modifiers
#[derive(Debug, Clone, Copy)]
pub struct ToolContext {
    pub mouse_tile: (i32, i32),
    /// Whether the pointer is inside the editor viewport
    pub inside_viewport: bool,
    pub selected_tile: TileId,
    pub selected_layer: Layer,
    /// "Add to selection" modifier
    pub add_modifier: bool,
    /// Global find/replace modifier for the fill tool
    pub replace_modifier: bool,
}

impl Default for ToolContext {
    fn default() -> Self {
        Self {
            mouse_tile: (0, 0),
            inside_viewport: true,
            selected_tile: 0,
            selected_layer: Layer::Active,
            add_modifier: false,
            replace_modifier: false,
        }
    }
}

/// Transient tool state for one document
#[derive(Debug, Clone, Default)]
pub struct ToolEngine {
    pub kind: ToolKind,
    pub state: ToolState,
    /// The box being dragged, addressed by index: the selection vector may
    /// reallocate mid-gesture, so holding a reference would dangle
    active_box: Option<usize>,
    boxes_at_gesture_start: usize,
    selection_before: Vec<SelectBounds>,
}

/// Feed one input event through the tool state machine
pub fn handle_event(tab: &mut Tab, table: &FlipTable, event: InputEvent, ctx: &ToolContext) {
    match event {
        InputEvent::LeftDown => {
            if ctx.inside_viewport && tab.tools.state == ToolState::Idle {
                begin_gesture(tab, table, ctx, ToolState::Place);
            }
        }
        InputEvent::RightDown => {
            if tab.tools.kind == ToolKind::Select {
                // Right-click with the select tool drops the selection
                tab.selection.clear();
                return;
            }
            if ctx.inside_viewport && tab.tools.state == ToolState::Idle {
                begin_gesture(tab, table, ctx, ToolState::Erase);
            }
        }
        InputEvent::LeftUp => {
            if tab.tools.state == ToolState::Place {
                end_gesture(tab);
            }
        }
        InputEvent::RightUp => {
            if tab.tools.state == ToolState::Erase {
                end_gesture(tab);
            }
        }
        InputEvent::Move => {
            if tab.tools.state != ToolState::Idle {
                drag(tab, table, ctx);
            }
        }
        InputEvent::FocusLost => {
            // In-progress edits stay recorded; the gesture just stops
            tab.tools.state = ToolState::Idle;
            tab.tools.active_box = None;
        }
    }
}

fn begin_gesture(tab: &mut Tab, table: &FlipTable, ctx: &ToolContext, state: ToolState) {
    tab.tools.state = state;
    match tab.tools.kind {
        ToolKind::Brush => {
            tab.history.new_state(HistoryState::Normal { edits: Vec::new() });
            brush_stroke(tab, table, ctx);
        }
        ToolKind::Fill => {
            tab.history.new_state(HistoryState::Normal { edits: Vec::new() });
            fill_once(tab, table, ctx);
        }
        ToolKind::Select => begin_select(tab, ctx),
    }
}

fn end_gesture(tab: &mut Tab) {
    if tab.tools.kind == ToolKind::Select && tab.tools.state == ToolState::Place {
        if tab.selection.len() > tab.tools.boxes_at_gesture_start {
            let old = std::mem::take(&mut tab.tools.selection_before);
            tab.history.new_state(HistoryState::Select {
                old,
                new: tab.selection.snapshot(),
            });
        } else {
            tab.tools.selection_before.clear();
        }
        tab.tools.active_box = None;
    }
    tab.tools.state = ToolState::Idle;
}

fn drag(tab: &mut Tab, table: &FlipTable, ctx: &ToolContext) {
    match tab.tools.kind {
        ToolKind::Brush => brush_stroke(tab, table, ctx),
        // Fill fires exactly once, at the press
        ToolKind::Fill => {}
        ToolKind::Select => drag_select(tab, ctx),
    }
}

fn brush_stroke(tab: &mut Tab, table: &FlipTable, ctx: &ToolContext) {
    let id = if tab.tools.state == ToolState::Place {
        ctx.selected_tile
    } else {
        0
    };
    let (x, y) = ctx.mouse_tile;
    place_mirrored(tab, table, x, y, id, ctx.selected_layer, EditKind::Normal);
}

fn fill_once(tab: &mut Tab, table: &FlipTable, ctx: &ToolContext) {
    let (x, y) = ctx.mouse_tile;
    if !tab.level.in_bounds(x, y) {
        return;
    }
    let find_id = tab.level.get(x, y, ctx.selected_layer);
    let replace_id = if tab.tools.state == ToolState::Place {
        ctx.selected_tile
    } else {
        0
    };
    if find_id == replace_id {
        return;
    }
    if ctx.replace_modifier {
        fill::global_replace(tab, (x, y), find_id, replace_id, ctx.selected_layer);
    } else {
        fill::flood_fill(tab, table, (x, y), find_id, replace_id, ctx.selected_layer);
    }
}

fn begin_select(tab: &mut Tab, ctx: &ToolContext) {
    tab.tools.selection_before = tab.selection.snapshot();
    tab.tools.boxes_at_gesture_start = tab.selection.len();
    if !ctx.add_modifier {
        tab.selection.clear();
    }
    let (x, y) = clamp_tile(tab, ctx.mouse_tile);
    let index = tab.selection.push(SelectBounds::at(x, y));
    tab.tools.active_box = Some(index);
}

fn drag_select(tab: &mut Tab, ctx: &ToolContext) {
    let Some(index) = tab.tools.active_box else {
        return;
    };
    let pointer_in_bounds = tab.level.in_bounds(ctx.mouse_tile.0, ctx.mouse_tile.1);
    let clamped = clamp_tile(tab, ctx.mouse_tile);
    let Some(bounds) = tab.selection.get_mut(index) else {
        tab.tools.active_box = None;
        return;
    };
    if !bounds.visible {
        // The box materializes the first time the drag enters the level
        if pointer_in_bounds {
            bounds.visible = true;
            bounds.anchor_b = clamped;
        }
    } else {
        bounds.anchor_b = clamped;
    }
}

fn clamp_tile(tab: &Tab, (x, y): (i32, i32)) -> (i32, i32) {
    (
        x.clamp(0, tab.level.width() - 1),
        y.clamp(0, tab.level.height() - 1),
    )
}
