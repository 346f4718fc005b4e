//! Utility functions for the quiz

use crate::types::Rating;

/// Format a rating change with an explicit sign, e.g. `+16` or `-10`
pub fn format_delta(delta: Rating) -> String {
    if delta >= 0 {
        format!("+{}", delta)
    } else {
        delta.to_string()
    }
}

/// Format a fraction as a whole percentage
pub fn format_percentage(fraction: f64) -> String {
    format!("{:.0}%", fraction * 100.0)
}
