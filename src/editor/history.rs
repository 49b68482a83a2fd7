//! Undo/redo history log
//!
//! An append-only log of tagged edit records addressed by a cursor.
//! `cursor == -1` means "before the first state"; states past the cursor
//! form the redo branch and are discarded the moment a new state is
//! appended anywhere but the tail (branch overwrite).
//!
//! `Normal`/`Clear` states accumulate per-cell diffs over one gesture and
//! coalesce repeat edits of the same cell, so undo always restores the true
//! pre-gesture value no matter how often a cell was painted during a drag.

use crate::level::{Layer, Level, ResizeAnchor, TileId};

use super::mirror::{flip_level_horizontal, flip_level_vertical, FlipTable};
use super::selection::{SelectBounds, SelectionModel};

/// Which diff-list flavor an edit belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Normal,
    Clear,
}

/// One recorded cell edit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileEdit {
    pub x: i32,
    pub y: i32,
    pub layer: Layer,
    pub old_id: TileId,
    pub new_id: TileId,
}

/// One entry in the history log, with per-kind payload
#[derive(Debug, Clone)]
pub enum HistoryState {
    /// Painted edits accumulated over one gesture
    Normal { edits: Vec<TileEdit> },
    /// Deleted content (Cut), same diff shape as `Normal`
    Clear { edits: Vec<TileEdit> },
    /// Whole-level horizontal flip; the mask snapshots which layers were
    /// active, so undo/redo re-applies the involution to the same layers
    FlipH { layer_mask: [bool; 5] },
    /// Whole-level vertical flip, see [`HistoryState::FlipH`]
    FlipV { layer_mask: [bool; 5] },
    /// Selection change: box sets before and after
    Select {
        old: Vec<SelectBounds>,
        new: Vec<SelectBounds>,
    },
    /// Level resize. Full before/after snapshots: a partial-diff resize is
    /// error-prone, so memory is traded for correctness here.
    Resize {
        anchor: ResizeAnchor,
        old_w: i32,
        old_h: i32,
        new_w: i32,
        new_h: i32,
        old_data: Level,
        new_data: Level,
    },
}

impl HistoryState {
    /// The edit kind this state accumulates, if it is a diff-list state
    pub fn edit_kind(&self) -> Option<EditKind> {
        match self {
            HistoryState::Normal { .. } => Some(EditKind::Normal),
            HistoryState::Clear { .. } => Some(EditKind::Clear),
            _ => None,
        }
    }

    /// A `Normal` state whose gesture never produced an edit
    fn is_empty_normal(&self) -> bool {
        matches!(self, HistoryState::Normal { edits } if edits.is_empty())
    }
}

/// Decide whether a recorded edit needs a fresh history state.
///
/// `current` is the kind of the currently-open state, if any. Opening a new
/// state whenever the kinds differ is what keeps, say, a flip executed mid
/// brush-stroke from corrupting the stroke's diff list.
pub fn should_open_new(current: Option<EditKind>, requested: EditKind) -> bool {
    current != Some(requested)
}

/// The undo/redo log for one document
#[derive(Debug, Clone, Default)]
pub struct HistoryLog {
    states: Vec<HistoryState>,
    cursor: isize,
    /// Whether the state at the cursor still accepts edits. Set when a
    /// diff-list state is appended, cleared by undo/redo; a new gesture
    /// always appends its own state, so there is no explicit commit.
    open: bool,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            cursor: -1,
            open: false,
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn cursor(&self) -> isize {
        self.cursor
    }

    pub fn can_undo(&self) -> bool {
        self.cursor >= 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor < self.states.len() as isize - 1
    }

    /// Discard the redo branch, append a fresh state, and move the cursor
    /// to it.
    pub fn new_state(&mut self, state: HistoryState) {
        self.states.truncate((self.cursor + 1) as usize);
        self.open = state.edit_kind().is_some();
        self.states.push(state);
        self.cursor = self.states.len() as isize - 1;
    }

    /// Kind of the state currently accepting edits, if any
    fn open_kind(&self) -> Option<EditKind> {
        if !self.open || self.cursor < 0 || self.cursor != self.states.len() as isize - 1 {
            return None;
        }
        self.states[self.cursor as usize].edit_kind()
    }

    /// Record one cell edit into the open diff-list state, opening a new
    /// state of the requested kind first when necessary. A repeat edit of
    /// the same `(x, y, layer)` overwrites `new_id` in place and keeps the
    /// original `old_id`: one entry per cell per gesture.
    pub fn record_edit(
        &mut self,
        x: i32,
        y: i32,
        layer: Layer,
        old_id: TileId,
        new_id: TileId,
        kind: EditKind,
    ) {
        if should_open_new(self.open_kind(), kind) {
            self.new_state(match kind {
                EditKind::Normal => HistoryState::Normal { edits: Vec::new() },
                EditKind::Clear => HistoryState::Clear { edits: Vec::new() },
            });
        }
        if let HistoryState::Normal { edits } | HistoryState::Clear { edits } =
            &mut self.states[self.cursor as usize]
        {
            match edits
                .iter_mut()
                .find(|e| e.x == x && e.y == y && e.layer == layer)
            {
                Some(edit) => edit.new_id = new_id,
                None => edits.push(TileEdit {
                    x,
                    y,
                    layer,
                    old_id,
                    new_id,
                }),
            }
        }
    }

    /// Step the document one state backwards.
    ///
    /// No-op before the first state. After undoing an empty `Normal` state
    /// the call repeats, transparently skipping degenerate zero-effect
    /// strokes so the visible undo count matches meaningful edits.
    pub fn undo(&mut self, level: &mut Level, selection: &mut SelectionModel, table: &FlipTable) {
        loop {
            if self.cursor < 0 {
                return;
            }
            let state = &self.states[self.cursor as usize];
            match state {
                HistoryState::Resize { old_data, .. } => *level = old_data.clone(),
                HistoryState::Select { old, .. } => selection.restore(old),
                HistoryState::FlipH { layer_mask } => {
                    flip_level_horizontal(level, *layer_mask, table)
                }
                HistoryState::FlipV { layer_mask } => {
                    flip_level_vertical(level, *layer_mask, table)
                }
                HistoryState::Normal { edits } | HistoryState::Clear { edits } => {
                    for edit in edits {
                        if level.in_bounds(edit.x, edit.y) {
                            level.set(edit.x, edit.y, edit.layer, edit.old_id);
                        }
                    }
                }
            }
            let was_empty = self.states[self.cursor as usize].is_empty_normal();
            self.cursor -= 1;
            self.open = false;
            if !was_empty {
                return;
            }
        }
    }

    /// Step the document one state forwards.
    ///
    /// No-op at the tail. After applying, peeks one state ahead and
    /// advances over an empty `Normal` so the skip mirrors [`Self::undo`]
    /// (different mechanics, same user-visible effect; kept as-is on
    /// purpose and pinned by tests).
    pub fn redo(&mut self, level: &mut Level, selection: &mut SelectionModel, table: &FlipTable) {
        if !self.can_redo() {
            return;
        }
        self.cursor += 1;
        self.open = false;
        match &self.states[self.cursor as usize] {
            HistoryState::Resize { new_data, .. } => *level = new_data.clone(),
            HistoryState::Select { new, .. } => selection.restore(new),
            HistoryState::FlipH { layer_mask } => flip_level_horizontal(level, *layer_mask, table),
            HistoryState::FlipV { layer_mask } => flip_level_vertical(level, *layer_mask, table),
            HistoryState::Normal { edits } | HistoryState::Clear { edits } => {
                for edit in edits {
                    if level.in_bounds(edit.x, edit.y) {
                        level.set(edit.x, edit.y, edit.layer, edit.new_id);
                    }
                }
            }
        }
        let next = (self.cursor + 1) as usize;
        if next < self.states.len() && self.states[next].is_empty_normal() {
            self.cursor = next as isize;
        }
    }

    /// Undo all the way to before the first state
    pub fn history_begin(
        &mut self,
        level: &mut Level,
        selection: &mut SelectionModel,
        table: &FlipTable,
    ) {
        while self.can_undo() {
            self.undo(level, selection, table);
        }
    }

    /// Redo all the way to the tail
    pub fn history_end(
        &mut self,
        level: &mut Level,
        selection: &mut SelectionModel,
        table: &FlipTable,
    ) {
        while self.can_redo() {
            self.redo(level, selection, table);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_ctx() -> (Level, SelectionModel, FlipTable) {
        (Level::new(4, 4), SelectionModel::new(), FlipTable::new())
    }

    fn select_state(n: i32) -> HistoryState {
        HistoryState::Select {
            old: Vec::new(),
            new: vec![SelectBounds {
                anchor_a: (n, n),
                anchor_b: (n, n),
                visible: true,
            }],
        }
    }

    #[test]
    fn test_should_open_new() {
        assert!(should_open_new(None, EditKind::Normal));
        assert!(should_open_new(None, EditKind::Clear));
        assert!(!should_open_new(Some(EditKind::Normal), EditKind::Normal));
        assert!(!should_open_new(Some(EditKind::Clear), EditKind::Clear));
        assert!(should_open_new(Some(EditKind::Normal), EditKind::Clear));
        assert!(should_open_new(Some(EditKind::Clear), EditKind::Normal));
    }

    #[test]
    fn test_record_edit_coalesces_per_cell() {
        let mut log = HistoryLog::new();
        log.record_edit(1, 1, Layer::Active, 0, 5, EditKind::Normal);
        log.record_edit(1, 1, Layer::Active, 5, 9, EditKind::Normal);
        log.record_edit(2, 1, Layer::Active, 0, 5, EditKind::Normal);

        assert_eq!(log.len(), 1);
        match &log.states[0] {
            HistoryState::Normal { edits } => {
                assert_eq!(edits.len(), 2);
                // Original old_id survives, new_id tracks the latest write
                assert_eq!(edits[0].old_id, 0);
                assert_eq!(edits[0].new_id, 9);
            }
            other => panic!("expected Normal state, got {:?}", other),
        }
    }

    #[test]
    fn test_same_cell_different_layer_gets_own_entry() {
        let mut log = HistoryLog::new();
        log.record_edit(1, 1, Layer::Active, 0, 5, EditKind::Normal);
        log.record_edit(1, 1, Layer::Back1, 0, 5, EditKind::Normal);
        match &log.states[0] {
            HistoryState::Normal { edits } => assert_eq!(edits.len(), 2),
            other => panic!("expected Normal state, got {:?}", other),
        }
    }

    #[test]
    fn test_kind_change_opens_new_state() {
        let mut log = HistoryLog::new();
        log.record_edit(0, 0, Layer::Active, 0, 5, EditKind::Normal);
        log.record_edit(1, 0, Layer::Active, 3, 0, EditKind::Clear);
        log.record_edit(2, 0, Layer::Active, 0, 5, EditKind::Normal);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_non_edit_state_closes_diff_list() {
        // A flip executed mid brush-stroke must not corrupt the stroke
        let mut log = HistoryLog::new();
        log.record_edit(0, 0, Layer::Active, 0, 5, EditKind::Normal);
        log.new_state(HistoryState::FlipH {
            layer_mask: [true; 5],
        });
        log.record_edit(1, 0, Layer::Active, 0, 5, EditKind::Normal);
        assert_eq!(log.len(), 3);
        assert!(matches!(log.states[2], HistoryState::Normal { .. }));
    }

    #[test]
    fn test_undo_redo_normal_edits() {
        let (mut level, mut sel, table) = empty_ctx();
        let mut log = HistoryLog::new();

        log.record_edit(1, 2, Layer::Active, 0, 7, EditKind::Normal);
        level.set(1, 2, Layer::Active, 7);

        log.undo(&mut level, &mut sel, &table);
        assert_eq!(level.get(1, 2, Layer::Active), 0);
        assert_eq!(log.cursor(), -1);

        log.redo(&mut level, &mut sel, &table);
        assert_eq!(level.get(1, 2, Layer::Active), 7);
        assert_eq!(log.cursor(), 0);
    }

    #[test]
    fn test_undo_at_boundary_is_noop() {
        let (mut level, mut sel, table) = empty_ctx();
        let mut log = HistoryLog::new();
        log.undo(&mut level, &mut sel, &table);
        assert_eq!(log.cursor(), -1);
        log.redo(&mut level, &mut sel, &table);
        assert_eq!(log.cursor(), -1);
    }

    #[test]
    fn test_branch_overwrite_discards_redo_states() {
        let (mut level, mut sel, table) = empty_ctx();
        let mut log = HistoryLog::new();

        let n = 5;
        for i in 0..n {
            log.new_state(select_state(i));
        }
        let m = 3;
        for _ in 0..m {
            log.undo(&mut level, &mut sel, &table);
        }
        assert_eq!(log.cursor(), (n - m - 1) as isize);

        // A new edit appends at the cursor; the redo branch is gone for good
        log.record_edit(0, 0, Layer::Active, 0, 1, EditKind::Normal);
        assert_eq!(log.len(), (n - m) as usize + 1);
        assert_eq!(log.cursor(), log.len() as isize - 1);
        assert!(!log.can_redo());
        assert!(log
            .states
            .iter()
            .take((n - m) as usize)
            .all(|s| matches!(s, HistoryState::Select { .. })));
    }

    #[test]
    fn test_undo_skips_empty_normal_states() {
        let (mut level, mut sel, table) = empty_ctx();
        let mut log = HistoryLog::new();

        log.record_edit(0, 0, Layer::Active, 0, 5, EditKind::Normal);
        level.set(0, 0, Layer::Active, 5);
        // Two degenerate strokes: gestures that never touched a cell
        log.new_state(HistoryState::Normal { edits: Vec::new() });
        log.new_state(HistoryState::Normal { edits: Vec::new() });

        // One undo falls through both empty states and the real stroke
        log.undo(&mut level, &mut sel, &table);
        assert_eq!(level.get(0, 0, Layer::Active), 0);
        assert_eq!(log.cursor(), -1);
    }

    #[test]
    fn test_redo_steps_over_trailing_empty_normal() {
        let (mut level, mut sel, table) = empty_ctx();
        let mut log = HistoryLog::new();

        log.record_edit(0, 0, Layer::Active, 0, 5, EditKind::Normal);
        level.set(0, 0, Layer::Active, 5);
        log.new_state(HistoryState::Normal { edits: Vec::new() });

        log.undo(&mut level, &mut sel, &table);
        assert_eq!(log.cursor(), -1);

        // Redo applies the real stroke, then advances over the empty one
        log.redo(&mut level, &mut sel, &table);
        assert_eq!(level.get(0, 0, Layer::Active), 5);
        assert_eq!(log.cursor(), 1);
        assert!(!log.can_redo());
    }

    #[test]
    fn test_undo_redo_flip_reapplies_to_masked_layers() {
        let (mut level, mut sel, _) = empty_ctx();
        let table = FlipTable::load_from_str("(horizontal: [(5, 6)], vertical: [])").unwrap();
        let mut log = HistoryLog::new();

        let mut mask = [false; 5];
        mask[Layer::Active.index()] = true;

        level.set(0, 0, Layer::Active, 5);
        let before = level.clone();
        flip_level_horizontal(&mut level, mask, &table);
        log.new_state(HistoryState::FlipH { layer_mask: mask });

        // Flips are involutions: undo re-applies the same flip
        log.undo(&mut level, &mut sel, &table);
        assert_eq!(level, before);
        log.redo(&mut level, &mut sel, &table);
        assert_eq!(level.get(3, 0, Layer::Active), 6);
    }

    #[test]
    fn test_undo_redo_select_state() {
        let (mut level, mut sel, table) = empty_ctx();
        let mut log = HistoryLog::new();

        let old = sel.snapshot();
        sel.push(SelectBounds {
            anchor_a: (1, 1),
            anchor_b: (2, 2),
            visible: true,
        });
        log.new_state(HistoryState::Select {
            old,
            new: sel.snapshot(),
        });

        log.undo(&mut level, &mut sel, &table);
        assert!(sel.is_empty());
        log.redo(&mut level, &mut sel, &table);
        assert_eq!(sel.len(), 1);
    }

    #[test]
    fn test_undo_redo_resize_restores_data() {
        let (mut level, mut sel, table) = empty_ctx();
        let mut log = HistoryLog::new();

        level.set(3, 3, Layer::Active, 9);
        let old_data = level.clone();
        let new_data = level.resized(ResizeAnchor::NorthWest, 2, 2);
        let (old_w, old_h) = (level.width(), level.height());
        level = new_data.clone();
        log.new_state(HistoryState::Resize {
            anchor: ResizeAnchor::NorthWest,
            old_w,
            old_h,
            new_w: 2,
            new_h: 2,
            old_data,
            new_data,
        });

        log.undo(&mut level, &mut sel, &table);
        assert_eq!(level.width(), 4);
        assert_eq!(level.get(3, 3, Layer::Active), 9);

        log.redo(&mut level, &mut sel, &table);
        assert_eq!(level.width(), 2);
    }

    #[test]
    fn test_history_begin_and_end() {
        let (mut level, mut sel, table) = empty_ctx();
        let mut log = HistoryLog::new();

        for i in 0..3 {
            log.record_edit(i, 0, Layer::Active, 0, i + 1, EditKind::Normal);
            level.set(i, 0, Layer::Active, i + 1);
            log.new_state(HistoryState::FlipH {
                layer_mask: [false; 5],
            });
        }

        log.history_begin(&mut level, &mut sel, &table);
        assert_eq!(log.cursor(), -1);
        assert!(level.layer_tiles(Layer::Active).iter().all(|&id| id == 0));

        log.history_end(&mut level, &mut sel, &table);
        assert!(!log.can_redo());
        for i in 0..3 {
            assert_eq!(level.get(i, 0, Layer::Active), i + 1);
        }
    }
}
