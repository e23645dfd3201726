// Grid dimensions shared by the designer template and the custom layout
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        // Visual designer template
        Self { rows: 5, cols: 10 }
    }
}

impl GridConfig {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Same grid with both dimensions floored to 1
    pub fn clamped(&self) -> Self {
        Self {
            rows: self.rows.max(1),
            cols: self.cols.max(1),
        }
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }
}
