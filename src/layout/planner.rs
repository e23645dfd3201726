// Slot planner - turns a client count, a working area and a mode into target rectangles

use super::{LayoutMode, Rect};
use log::debug;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::time::{SystemTime, UNIX_EPOCH};

/// Columns of the fixed chaotic reference grid
pub const CHAOTIC_COLS: usize = 10;
/// Rows of the fixed chaotic reference grid
pub const CHAOTIC_ROWS: usize = 5;

/// Number of rectangles `plan` returns for `count` clients in `mode`
pub fn capacity(count: usize, mode: &LayoutMode) -> usize {
    match mode {
        LayoutMode::Auto | LayoutMode::Grid | LayoutMode::Horizontal | LayoutMode::Vertical => {
            count
        }
        LayoutMode::Chaotic { .. } => count.min(CHAOTIC_COLS * CHAOTIC_ROWS),
        LayoutMode::CustomGrid { cols, rows } => count.min((*cols).max(1) * (*rows).max(1)),
        LayoutMode::DesignerCells { cells, cols, rows } => {
            count.min(designer_cells(cells, *cols, *rows).len())
        }
    }
}

/// Compute the ordered target rectangles for `count` clients.
///
/// The result always has `capacity(count, mode)` entries and every rectangle
/// lies inside `area`. Every mode except an unseeded `Chaotic` is a pure
/// function of its inputs.
pub fn plan(count: usize, area: Rect, mode: &LayoutMode) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }

    let rects = match mode {
        LayoutMode::Auto | LayoutMode::Grid => {
            let cols = ceil_sqrt(count);
            let rows = count.div_ceil(cols);
            uniform_grid(count, cols, rows, area)
        }
        LayoutMode::Horizontal => uniform_grid(count, count, 1, area),
        LayoutMode::Vertical => uniform_grid(count, 1, count, area),
        LayoutMode::CustomGrid { cols, rows } => {
            uniform_grid(count, (*cols).max(1), (*rows).max(1), area)
        }
        LayoutMode::Chaotic { seed } => {
            let seed = seed.unwrap_or_else(clock_seed);
            chaotic(count, area, seed)
        }
        LayoutMode::DesignerCells { cells, cols, rows } => {
            let cols = (*cols).max(1);
            let rows = (*rows).max(1);
            let (cell_w, cell_h) = cell_size(area, cols, rows);
            designer_cells(cells, cols, rows)
                .into_iter()
                .take(count)
                .map(|idx| cell_rect(area, cols, idx, cell_w, cell_h))
                .collect()
        }
    };

    debug!(
        "Planned {} of {} slots in {} mode over {}x{} at ({}, {})",
        rects.len(),
        count,
        mode.name(),
        area.width,
        area.height,
        area.x,
        area.y
    );
    rects
}

/// Row-major fill of a `cols` x `rows` grid; cells past the last row are never emitted
fn uniform_grid(count: usize, cols: usize, rows: usize, area: Rect) -> Vec<Rect> {
    let (cell_w, cell_h) = cell_size(area, cols, rows);
    let mut rects = Vec::with_capacity(count.min(cols * rows));

    for i in 0..count {
        if i / cols >= rows {
            break;
        }
        rects.push(cell_rect(area, cols, i, cell_w, cell_h));
    }
    rects
}

fn chaotic(count: usize, area: Rect, seed: u64) -> Vec<Rect> {
    let (cell_w, cell_h) = cell_size(area, CHAOTIC_COLS, CHAOTIC_ROWS);
    let mut cells: Vec<usize> = (0..CHAOTIC_COLS * CHAOTIC_ROWS).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    cells.shuffle(&mut rng);

    cells
        .into_iter()
        .take(count)
        .map(|idx| cell_rect(area, CHAOTIC_COLS, idx, cell_w, cell_h))
        .collect()
}

/// Distinct, in-range designer selections in their original order
fn designer_cells(cells: &[usize], cols: usize, rows: usize) -> Vec<usize> {
    let limit = cols.max(1) * rows.max(1);
    let mut picked: Vec<usize> = Vec::with_capacity(cells.len());
    for &idx in cells {
        if idx < limit && !picked.contains(&idx) {
            picked.push(idx);
        }
    }
    picked
}

fn cell_size(area: Rect, cols: usize, rows: usize) -> (i32, i32) {
    let width = area.width.max(0);
    let height = area.height.max(0);
    (width / cols.max(1) as i32, height / rows.max(1) as i32)
}

fn cell_rect(area: Rect, cols: usize, idx: usize, cell_w: i32, cell_h: i32) -> Rect {
    let row = (idx / cols) as i32;
    let col = (idx % cols) as i32;
    let x = area.x + col * cell_w;
    let y = area.y + row * cell_h;

    Rect {
        x,
        y,
        width: cell_w.min(area.right() - x).max(0),
        height: cell_h.min(area.bottom() - y).max(0),
    }
}

/// Smallest `c` with `c * c >= n`
fn ceil_sqrt(n: usize) -> usize {
    let mut c = (n as f64).sqrt() as usize;
    while c * c < n {
        c += 1;
    }
    while c > 1 && (c - 1) * (c - 1) >= n {
        c -= 1;
    }
    c.max(1)
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}
