// Display module for console formatting of scans, plans and arrangement results
pub mod formatters;

// Re-export main functions
pub use formatters::{
    format_count, format_outcome, format_window_id, preview_rows, print_layout_preview,
    print_monitor_header,
};
