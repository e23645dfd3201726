// Display formatting utilities for the e_fleet console

use crate::layout::Rect;
use crate::window::{ArrangementOutcome, WindowId};
use crossterm::{
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{self, Write};

const SLOT_GLYPHS: &[u8] = b"123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Format a counter with thousands separators (12345 -> "12,345")
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Format a window handle for display (last 2 digits in hex)
pub fn format_window_id(window: WindowId) -> String {
    let display_val = (window.0 % 0x100) as u8;
    format!("{:02X}", display_val)
}

/// One-line description of an arrangement outcome
pub fn format_outcome(pid: u32, outcome: &ArrangementOutcome) -> String {
    match outcome {
        ArrangementOutcome::Positioned { window, rect } => format!(
            "pid {} -> window {} at ({}, {}) {}x{}",
            pid,
            format_window_id(*window),
            rect.x,
            rect.y,
            rect.width,
            rect.height
        ),
        ArrangementOutcome::WindowNotFound => format!("pid {} -> no visible window", pid),
        ArrangementOutcome::ProcessGone => format!("pid {} -> process exited", pid),
        ArrangementOutcome::Unassigned => format!("pid {} -> no free slot", pid),
        ArrangementOutcome::MoveFailed(msg) => format!("pid {} -> move failed: {}", pid, msg),
        ArrangementOutcome::NotRunning => format!("pid {} -> not running", pid),
    }
}

/// Print working area header with bounds and resolution
pub fn print_monitor_header(monitor_index: usize, area: Rect, slot_count: usize) {
    println!();
    println!("=== MONITOR {} WORKING AREA ===", monitor_index);
    println!(
        "Bounds: ({}, {}) to ({}, {}) - Resolution: {}x{}",
        area.x,
        area.y,
        area.right(),
        area.bottom(),
        area.width,
        area.height
    );
    println!("Slots planned: {}", slot_count);
}

/// Render `rects` over `area` as a `cols` x `rows` character map.
///
/// Each character samples the center of its sub-cell: '.' is free space, a
/// glyph marks the 1-based slot number covering that point.
pub fn preview_rows(area: Rect, rects: &[Rect], cols: usize, rows: usize) -> Vec<String> {
    let cols = cols.max(1);
    let rows = rows.max(1);
    let mut lines = Vec::with_capacity(rows);

    for row in 0..rows {
        let mut line = String::with_capacity(cols);
        let y = area.y + ((2 * row + 1) as i64 * area.height as i64 / (2 * rows) as i64) as i32;
        for col in 0..cols {
            let x = area.x + ((2 * col + 1) as i64 * area.width as i64 / (2 * cols) as i64) as i32;
            let slot = rects
                .iter()
                .position(|r| x >= r.x && x < r.right() && y >= r.y && y < r.bottom());
            line.push(match slot {
                Some(i) => *SLOT_GLYPHS.get(i).unwrap_or(&b'#') as char,
                None => '.',
            });
        }
        lines.push(line);
    }
    lines
}

/// Print a colored preview of planned slots
pub fn print_layout_preview(area: Rect, rects: &[Rect]) -> io::Result<()> {
    const PALETTE: [Color; 6] = [
        Color::Cyan,
        Color::Green,
        Color::Yellow,
        Color::Magenta,
        Color::Blue,
        Color::Red,
    ];

    let mut stdout = io::stdout();
    for line in preview_rows(area, rects, 60, 20) {
        for ch in line.chars() {
            if ch == '.' {
                queue!(stdout, SetForegroundColor(Color::DarkGrey), Print(ch))?;
            } else {
                let idx = SLOT_GLYPHS.iter().position(|g| *g as char == ch).unwrap_or(0);
                queue!(
                    stdout,
                    SetForegroundColor(PALETTE[idx % PALETTE.len()]),
                    Print(ch)
                )?;
            }
        }
        queue!(stdout, ResetColor, Print('\n'))?;
    }
    stdout.flush()
}
