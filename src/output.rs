//! Terminal-width aware output helpers for help rendering.

use std::env;
use std::io::{self, Write};

pub fn terminal_width() -> usize {
    env::var("TERM_WIDTH")
        .ok()
        .and_then(|w| w.parse().ok())
        .or_else(|| env::var("COLUMNS").ok().and_then(|c| c.parse().ok()))
        .unwrap_or(80)
}

/// Lay values out in columns fitting the terminal width.
pub fn columnize(out: &mut dyn Write, values: &[String]) -> io::Result<()> {
    columnize_to(out, values, terminal_width())
}

/// Column layout with an explicit width: find the smallest number of rows
/// whose per-column widths fit, then emit row by row.
pub fn columnize_to(out: &mut dyn Write, values: &[String], width: usize) -> io::Result<()> {
    if values.is_empty() {
        return Ok(());
    }
    let n = values.len();
    for nrows in 1..=n {
        let ncols = n.div_ceil(nrows);
        let col_widths: Vec<usize> = (0..ncols)
            .map(|col| {
                (0..nrows)
                    .filter_map(|row| values.get(col * nrows + row))
                    .map(|v| v.len())
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        let total: usize = col_widths.iter().map(|w| w + 2).sum();
        if total > width && ncols > 1 {
            continue;
        }
        for row in 0..nrows {
            let mut line = String::new();
            for (col, col_width) in col_widths.iter().enumerate() {
                if let Some(value) = values.get(col * nrows + row) {
                    line.push_str("  ");
                    line.push_str(value);
                    if col + 1 < ncols {
                        for _ in value.len()..*col_width {
                            line.push(' ');
                        }
                    }
                }
            }
            writeln!(out, "{}", line.trim_end())?;
        }
        return Ok(());
    }
    Ok(())
}
