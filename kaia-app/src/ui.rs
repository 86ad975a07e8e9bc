//! Terminal color helpers.

pub const GREEN: &str = "\x1b[92m";
pub const BLUE: &str = "\x1b[94m";
pub const YELLOW: &str = "\x1b[93m";
pub const RED: &str = "\x1b[91m";
pub const RESET: &str = "\x1b[0m";

/// Usage coloring: <=70% green, <=80% yellow, above that red.
pub fn color_for_percentage(percent: f64) -> &'static str {
    if percent <= 70.0 {
        GREEN
    } else if percent <= 80.0 {
        YELLOW
    } else {
        RED
    }
}

pub fn boxed_heading(title: &str) -> String {
    format!("┌── {} ──┐", title)
}

pub fn boxed_footer(title: &str) -> String {
    // Width matches the heading for the same title.
    let width = title.chars().count() + 8;
    format!("└{}┘", "─".repeat(width.saturating_sub(2)))
}
