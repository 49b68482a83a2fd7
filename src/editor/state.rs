//! Editor documents and the multi-tab shell
//!
//! A [`Tab`] is one open level document with everything document-scoped:
//! the level, its history, its selection, tool state, camera and mirror
//! flags. The [`Editor`] owns the tabs plus the state that is shared across
//! them, the clipboard and the tile flip table.

use std::path::{Path, PathBuf};

use log::warn;

use crate::level::{
    limits, load_level, load_restore, save_level, save_restore, Layer, Level, LevelError,
    ResizeAnchor,
};

use super::clipboard::{self, ClipboardEntry};
use super::history::{HistoryLog, HistoryState};
use super::mirror::{flip_level_horizontal, flip_level_vertical, FlipTable};
use super::selection::SelectionModel;
use super::tools::{self, InputEvent, ToolContext, ToolEngine};

/// Pan/zoom over the tile grid
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    pub offset_x: f32,
    pub offset_y: f32,
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Camera {
    /// Map a screen position to the tile under it. The result may lie
    /// outside the level; callers bounds-check it.
    pub fn screen_to_tile(&self, sx: f32, sy: f32, tile_size: f32) -> (i32, i32) {
        let scale = tile_size * self.zoom;
        (
            ((sx - self.offset_x) / scale).floor() as i32,
            ((sy - self.offset_y) / scale).floor() as i32,
        )
    }
}

/// One open level document
#[derive(Debug, Clone)]
pub struct Tab {
    pub level: Level,
    pub name: String,
    /// Where the document was loaded from or last saved to
    pub path: Option<PathBuf>,
    /// Which layers accept edits; indexed by [`Layer::index`]
    pub layer_mask: [bool; limits::LAYER_COUNT],
    pub tools: ToolEngine,
    pub selection: SelectionModel,
    pub history: HistoryLog,
    pub camera: Camera,
    pub mirror_h: bool,
    pub mirror_v: bool,
    /// Unsaved changes since the last save or load
    pub dirty: bool,
}

impl Tab {
    /// New empty document with every layer active
    pub fn new(name: &str, width: i32, height: i32) -> Self {
        Self {
            level: Level::new(width, height),
            name: name.to_string(),
            path: None,
            layer_mask: [true; limits::LAYER_COUNT],
            tools: ToolEngine::default(),
            selection: SelectionModel::new(),
            history: HistoryLog::new(),
            camera: Camera::default(),
            mirror_h: false,
            mirror_v: false,
            dirty: false,
        }
    }

    /// Open a document from a level file, named after the file stem
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LevelError> {
        let path = path.as_ref();
        let level = load_level(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "untitled".to_string());
        let mut tab = Tab::new(&name, level.width(), level.height());
        tab.level = level;
        tab.path = Some(path.to_path_buf());
        Ok(tab)
    }

    /// Reopen a document from a crash-restore file. Restored documents keep
    /// their original name but no path; saving asks for one again.
    pub fn load_restored<P: AsRef<Path>>(path: P) -> Result<Self, LevelError> {
        let (name, level) = load_restore(path)?;
        let mut tab = Tab::new(&name, level.width(), level.height());
        tab.level = level;
        tab.dirty = true;
        Ok(tab)
    }

    /// Save to a file and remember the path
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<(), LevelError> {
        save_level(&self.level, path.as_ref())?;
        self.path = Some(path.as_ref().to_path_buf());
        self.dirty = false;
        Ok(())
    }

    /// Write the crash-restore variant without touching path or dirty state
    pub fn save_restore_file<P: AsRef<Path>>(&self, path: P) -> Result<(), LevelError> {
        save_restore(&self.level, &self.name, path)
    }

    pub fn layer_active(&self, layer: Layer) -> bool {
        self.layer_mask[layer.index()]
    }

    pub fn undo(&mut self, table: &FlipTable) {
        let Tab {
            level,
            selection,
            history,
            ..
        } = self;
        history.undo(level, selection, table);
        self.dirty = true;
    }

    pub fn redo(&mut self, table: &FlipTable) {
        let Tab {
            level,
            selection,
            history,
            ..
        } = self;
        history.redo(level, selection, table);
        self.dirty = true;
    }

    /// Undo everything, back to the freshly opened document
    pub fn history_begin(&mut self, table: &FlipTable) {
        let Tab {
            level,
            selection,
            history,
            ..
        } = self;
        history.history_begin(level, selection, table);
        self.dirty = true;
    }

    /// Redo everything, forward to the newest state
    pub fn history_end(&mut self, table: &FlipTable) {
        let Tab {
            level,
            selection,
            history,
            ..
        } = self;
        history.history_end(level, selection, table);
        self.dirty = true;
    }

    /// Mirror the active layers left-to-right, as one history state
    pub fn flip_horizontal(&mut self, table: &FlipTable) {
        let mask = self.layer_mask;
        flip_level_horizontal(&mut self.level, mask, table);
        self.history.new_state(HistoryState::FlipH { layer_mask: mask });
        self.dirty = true;
    }

    /// Mirror the active layers top-to-bottom, as one history state
    pub fn flip_vertical(&mut self, table: &FlipTable) {
        let mask = self.layer_mask;
        flip_level_vertical(&mut self.level, mask, table);
        self.history.new_state(HistoryState::FlipV { layer_mask: mask });
        self.dirty = true;
    }

    /// Resize the level with the old content pinned per `anchor`.
    ///
    /// History keeps full before/after level snapshots, so undo across a
    /// shrink brings discarded content back exactly.
    pub fn resize(&mut self, anchor: ResizeAnchor, new_w: i32, new_h: i32) {
        if new_w < limits::MIN_DIM
            || new_h < limits::MIN_DIM
            || new_w > limits::MAX_DIM
            || new_h > limits::MAX_DIM
        {
            warn!("rejected resize of '{}' to {}x{}", self.name, new_w, new_h);
            return;
        }
        if new_w == self.level.width() && new_h == self.level.height() {
            return;
        }
        let old_data = self.level.clone();
        let new_data = self.level.resized(anchor, new_w, new_h);
        self.history.new_state(HistoryState::Resize {
            anchor,
            old_w: old_data.width(),
            old_h: old_data.height(),
            new_w,
            new_h,
            old_data,
            new_data: new_data.clone(),
        });
        self.level = new_data;
        self.dirty = true;
    }
}

/// The whole editor: open tabs plus cross-tab state
#[derive(Debug, Default)]
pub struct Editor {
    pub tabs: Vec<Tab>,
    current: usize,
    pub clipboard: Vec<ClipboardEntry>,
    pub flip_table: FlipTable,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new empty document and focus it, returning its index
    pub fn new_tab(&mut self, name: &str, width: i32, height: i32) -> usize {
        self.tabs.push(Tab::new(name, width, height));
        self.current = self.tabs.len() - 1;
        self.current
    }

    /// Open a document from a file and focus it
    pub fn open_tab<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, LevelError> {
        let tab = Tab::load(path)?;
        self.tabs.push(tab);
        self.current = self.tabs.len() - 1;
        Ok(self.current)
    }

    pub fn current_tab(&self) -> Option<&Tab> {
        self.tabs.get(self.current)
    }

    pub fn current_tab_mut(&mut self) -> Option<&mut Tab> {
        self.tabs.get_mut(self.current)
    }

    pub fn select_tab(&mut self, index: usize) {
        if index < self.tabs.len() {
            self.current = index;
        }
    }

    pub fn close_tab(&mut self, index: usize) {
        if index < self.tabs.len() {
            self.tabs.remove(index);
            if self.current >= self.tabs.len() && self.current > 0 {
                self.current = self.tabs.len() - 1;
            }
        }
    }

    /// Feed one input event to the focused tab's tool state machine
    pub fn handle_input(&mut self, event: InputEvent, ctx: &ToolContext) {
        let Some(tab) = self.tabs.get_mut(self.current) else {
            return;
        };
        tools::handle_event(tab, &self.flip_table, event, ctx);
    }

    pub fn copy(&mut self) {
        let Some(tab) = self.tabs.get(self.current) else {
            return;
        };
        clipboard::copy(tab, &mut self.clipboard);
    }

    pub fn cut(&mut self) {
        let Some(tab) = self.tabs.get_mut(self.current) else {
            return;
        };
        clipboard::cut(tab, &mut self.clipboard);
    }

    pub fn paste(&mut self, mouse_tile: (i32, i32)) {
        let Some(tab) = self.tabs.get_mut(self.current) else {
            return;
        };
        clipboard::paste(tab, &self.flip_table, &self.clipboard, mouse_tile);
    }

    pub fn undo(&mut self) {
        let Some(tab) = self.tabs.get_mut(self.current) else {
            return;
        };
        let Tab {
            level,
            selection,
            history,
            ..
        } = tab;
        history.undo(level, selection, &self.flip_table);
        tab.dirty = true;
    }

    pub fn redo(&mut self) {
        let Some(tab) = self.tabs.get_mut(self.current) else {
            return;
        };
        let Tab {
            level,
            selection,
            history,
            ..
        } = tab;
        history.redo(level, selection, &self.flip_table);
        tab.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::history::EditKind;
    use crate::editor::mirror::place_mirrored;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use tempfile::NamedTempFile;

    #[test]
    fn test_mirrored_stroke_undoes_in_one_step() {
        // Both mirrors on: a 3-cell drag fans out to 12 writes, but the
        // whole gesture is still one history state
        let mut tab = Tab::new("test", 8, 8);
        tab.mirror_h = true;
        tab.mirror_v = true;
        let table = FlipTable::new();

        tab.history.new_state(HistoryState::Normal { edits: Vec::new() });
        for x in 1..4 {
            place_mirrored(&mut tab, &table, x, 1, 5, Layer::Active, EditKind::Normal);
        }
        let painted = tab
            .level
            .layer_tiles(Layer::Active)
            .iter()
            .filter(|&&id| id != 0)
            .count();
        assert_eq!(painted, 12);
        assert_eq!(tab.history.len(), 1);

        tab.undo(&table);
        assert!(tab.level.layer_tiles(Layer::Active).iter().all(|&id| id == 0));
    }

    #[test]
    fn test_repainted_cell_undoes_to_original_value() {
        let mut tab = Tab::new("test", 4, 4);
        let table = FlipTable::new();
        tab.level.set(2, 2, Layer::Active, 1);

        // One gesture paints the same cell three times
        tab.history.new_state(HistoryState::Normal { edits: Vec::new() });
        for id in [5, 6, 7] {
            place_mirrored(&mut tab, &table, 2, 2, id, Layer::Active, EditKind::Normal);
        }
        assert_eq!(tab.level.get(2, 2, Layer::Active), 7);

        tab.undo(&table);
        assert_eq!(tab.level.get(2, 2, Layer::Active), 1);
    }

    #[test]
    fn test_resize_undo_redo_round_trip() {
        let mut tab = Tab::new("test", 6, 6);
        let table = FlipTable::new();
        tab.level.set(5, 5, Layer::Active, 9);

        tab.resize(ResizeAnchor::NorthWest, 3, 3);
        assert_eq!(tab.level.width(), 3);
        assert_eq!(tab.history.len(), 1);

        // Undo brings back the discarded corner
        tab.undo(&table);
        assert_eq!(tab.level.width(), 6);
        assert_eq!(tab.level.get(5, 5, Layer::Active), 9);

        tab.redo(&table);
        assert_eq!(tab.level.width(), 3);
    }

    #[test]
    fn test_resize_rejects_out_of_range_dimensions() {
        let mut tab = Tab::new("test", 4, 4);
        tab.resize(ResizeAnchor::Center, 0, 4);
        tab.resize(ResizeAnchor::Center, 4, limits::MAX_DIM + 1);
        assert_eq!(tab.level.width(), 4);
        assert!(tab.history.is_empty());
    }

    #[test]
    fn test_resize_to_same_size_records_nothing() {
        let mut tab = Tab::new("test", 4, 4);
        tab.resize(ResizeAnchor::Center, 4, 4);
        assert!(tab.history.is_empty());
        assert!(!tab.dirty);
    }

    #[test]
    fn test_flip_skips_inactive_layers_on_undo_too() {
        let mut tab = Tab::new("test", 3, 1);
        let table = FlipTable::new();
        tab.level.set(0, 0, Layer::Active, 5);
        tab.level.set(0, 0, Layer::Back1, 9);
        tab.layer_mask[Layer::Back1.index()] = false;

        tab.flip_horizontal(&table);
        assert_eq!(tab.level.get(2, 0, Layer::Active), 5);
        assert_eq!(tab.level.get(0, 0, Layer::Back1), 9);

        // Undo flips the same layers back; Back1 stays where it was
        tab.undo(&table);
        assert_eq!(tab.level.get(0, 0, Layer::Active), 5);
        assert_eq!(tab.level.get(0, 0, Layer::Back1), 9);
    }

    #[test]
    fn test_random_edit_history_round_trip() {
        let mut tab = Tab::new("test", 16, 16);
        let table = FlipTable::load_from_str("(horizontal: [(1, 2)], vertical: [(3, 4)])")
            .unwrap();
        let mut rng = StdRng::seed_from_u64(0x7145);

        for _ in 0..40 {
            tab.mirror_h = rng.gen_bool(0.5);
            tab.mirror_v = rng.gen_bool(0.5);
            tab.history.new_state(HistoryState::Normal { edits: Vec::new() });
            for _ in 0..rng.gen_range(1..8) {
                let x = rng.gen_range(0..16);
                let y = rng.gen_range(0..16);
                let id = rng.gen_range(0..6);
                let layer = Layer::ALL[rng.gen_range(0..5)];
                place_mirrored(&mut tab, &table, x, y, id, layer, EditKind::Normal);
            }
        }
        let final_level = tab.level.clone();

        // All the way back: the document is empty again
        tab.history_begin(&table);
        for layer in Layer::ALL {
            assert!(tab.level.layer_tiles(layer).iter().all(|&id| id == 0));
        }

        // All the way forward: every gesture replays byte for byte
        tab.history_end(&table);
        assert_eq!(tab.level, final_level);
    }

    #[test]
    fn test_camera_screen_to_tile() {
        let camera = Camera {
            offset_x: 32.0,
            offset_y: 0.0,
            zoom: 2.0,
        };
        assert_eq!(camera.screen_to_tile(32.0, 0.0, 16.0), (0, 0));
        assert_eq!(camera.screen_to_tile(95.9, 33.0, 16.0), (1, 1));
        // Left of the origin rounds toward negative, not zero
        assert_eq!(camera.screen_to_tile(0.0, 0.0, 16.0), (-1, 0));
    }

    #[test]
    fn test_tab_save_load_round_trip() {
        let mut tab = Tab::new("cavern", 5, 4);
        tab.level.set(1, 2, Layer::Overlay, 7);
        tab.dirty = true;

        let temp = NamedTempFile::new().unwrap();
        tab.save(temp.path()).unwrap();
        assert!(!tab.dirty);
        assert_eq!(tab.path.as_deref(), Some(temp.path()));

        let loaded = Tab::load(temp.path()).unwrap();
        assert_eq!(loaded.level, tab.level);
        assert!(!loaded.dirty);
    }

    #[test]
    fn test_tab_restore_round_trip() {
        let mut tab = Tab::new("cavern", 3, 3);
        tab.level.set(0, 0, Layer::Active, 4);

        let temp = NamedTempFile::new().unwrap();
        tab.save_restore_file(temp.path()).unwrap();

        let restored = Tab::load_restored(temp.path()).unwrap();
        assert_eq!(restored.name, "cavern");
        assert_eq!(restored.level, tab.level);
        // Restored documents are unsaved by definition
        assert!(restored.dirty);
        assert!(restored.path.is_none());
    }

    #[test]
    fn test_editor_tab_management() {
        let mut editor = Editor::new();
        assert!(editor.current_tab().is_none());

        let a = editor.new_tab("a", 4, 4);
        let _b = editor.new_tab("b", 4, 4);
        assert_eq!(editor.current_tab().map(|t| t.name.as_str()), Some("b"));

        editor.select_tab(a);
        assert_eq!(editor.current_tab().map(|t| t.name.as_str()), Some("a"));

        editor.close_tab(a);
        assert_eq!(editor.current_tab().map(|t| t.name.as_str()), Some("b"));
        editor.close_tab(0);
        assert!(editor.current_tab().is_none());
    }

    #[test]
    fn test_editor_clipboard_crosses_tabs() {
        use crate::editor::selection::SelectBounds;

        let mut editor = Editor::new();
        let a = editor.new_tab("a", 4, 4);
        let b = editor.new_tab("b", 4, 4);

        editor.select_tab(a);
        {
            let tab = editor.current_tab_mut().unwrap();
            tab.level.set(1, 1, Layer::Active, 8);
            tab.selection.push(SelectBounds {
                anchor_a: (1, 1),
                anchor_b: (1, 1),
                visible: true,
            });
        }
        editor.copy();

        editor.select_tab(b);
        editor.paste((2, 3));
        assert_eq!(
            editor.current_tab().unwrap().level.get(2, 3, Layer::Active),
            8
        );
    }
}
