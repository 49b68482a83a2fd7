//! Selection model - rectangles over the tile grid
//!
//! A selection box keeps the two drag anchors exactly as the user placed
//! them; drag direction decides which one is left/top. Nothing reads the
//! raw anchors directly, everything goes through [`SelectBounds::ordered`].

/// One rectangular selection box, defined by two unordered anchors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectBounds {
    pub anchor_a: (i32, i32),
    pub anchor_b: (i32, i32),
    /// Boxes start invisible until the drag first enters the level bounds
    pub visible: bool,
}

impl SelectBounds {
    /// New invisible box with both anchors at one tile
    pub fn at(x: i32, y: i32) -> Self {
        Self {
            anchor_a: (x, y),
            anchor_b: (x, y),
            visible: false,
        }
    }

    /// Ordered edges `(left, top, right, bottom)`, all inclusive
    pub fn ordered(&self) -> (i32, i32, i32, i32) {
        (
            self.anchor_a.0.min(self.anchor_b.0),
            self.anchor_a.1.min(self.anchor_b.1),
            self.anchor_a.0.max(self.anchor_b.0),
            self.anchor_a.1.max(self.anchor_b.1),
        )
    }

    /// Check whether a tile lies inside this box
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let (left, top, right, bottom) = self.ordered();
        x >= left && x <= right && y >= top && y <= bottom
    }
}

/// The set of selection boxes for one document
#[derive(Debug, Clone, Default)]
pub struct SelectionModel {
    boxes: Vec<SelectBounds>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boxes(&self) -> &[SelectBounds] {
        &self.boxes
    }

    /// Add a box and return its index. Callers keep the index, not a
    /// reference; the vector may reallocate under them.
    pub fn push(&mut self, bounds: SelectBounds) -> usize {
        self.boxes.push(bounds);
        self.boxes.len() - 1
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut SelectBounds> {
        self.boxes.get_mut(index)
    }

    pub fn clear(&mut self) {
        self.boxes.clear();
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Copy of the current box set, for history snapshots
    pub fn snapshot(&self) -> Vec<SelectBounds> {
        self.boxes.clone()
    }

    /// Replace the box set from a history snapshot
    pub fn restore(&mut self, snapshot: &[SelectBounds]) {
        self.boxes = snapshot.to_vec();
    }

    pub fn any_visible(&self) -> bool {
        self.boxes.iter().any(|b| b.visible)
    }

    /// Check whether a tile is inside any visible box
    pub fn inside_any(&self, x: i32, y: i32) -> bool {
        self.boxes.iter().any(|b| b.visible && b.contains(x, y))
    }

    /// Bounding rectangle of all visible boxes, `(left, top, right, bottom)`
    pub fn union_boundary(&self) -> Option<(i32, i32, i32, i32)> {
        let mut union: Option<(i32, i32, i32, i32)> = None;
        for bounds in self.boxes.iter().filter(|b| b.visible) {
            let (l, t, r, b) = bounds.ordered();
            union = Some(match union {
                None => (l, t, r, b),
                Some((ul, ut, ur, ub)) => (ul.min(l), ut.min(t), ur.max(r), ub.max(b)),
            });
        }
        union
    }
}
