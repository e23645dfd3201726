// Layout module - rectangle geometry and the slot planner
// Planning is pure: no OS calls, no clock reads unless a chaotic layout has no seed.

pub mod planner;

pub use planner::{capacity, plan, CHAOTIC_COLS, CHAOTIC_ROWS};

use serde::{Deserialize, Serialize};

/// Screen rectangle in the coordinate space of one display's working area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// True when `other` lies entirely inside `self`
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// True when the two rectangles share a non-empty area
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Copy with width and height raised to at least `min`
    pub fn with_min_size(&self, min: i32) -> Rect {
        Rect {
            width: self.width.max(min),
            height: self.height.max(min),
            ..*self
        }
    }
}

/// Placement strategy for one planning call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutMode {
    /// Near-square grid sized from the client count
    Auto,
    /// Same geometry as `Auto`
    Grid,
    /// Random distinct cells of a fixed 10x5 grid; `None` seeds from the clock
    Chaotic { seed: Option<u64> },
    /// One row with a column per client
    Horizontal,
    /// One column with a row per client
    Vertical,
    /// Caller-chosen grid dimensions, never grown to fit the count
    CustomGrid { cols: usize, rows: usize },
    /// Pre-selected row-major cell indices of a designer grid, in selection order
    DesignerCells {
        cells: Vec<usize>,
        cols: usize,
        rows: usize,
    },
}

impl LayoutMode {
    pub fn name(&self) -> &'static str {
        match self {
            LayoutMode::Auto => "auto",
            LayoutMode::Grid => "grid",
            LayoutMode::Chaotic { .. } => "chaotic",
            LayoutMode::Horizontal => "horizontal",
            LayoutMode::Vertical => "vertical",
            LayoutMode::CustomGrid { .. } => "custom",
            LayoutMode::DesignerCells { .. } => "designer",
        }
    }
}
