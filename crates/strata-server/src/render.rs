//! Plain-text rendering of loaded slices.

use strata_blocks::{SliceMap, symbols};

/// Renders columns `lo..hi` as `height` text rows, top row first. Columns
/// that are not loaded render as air.
pub fn render_rows(map: &SliceMap, lo: i64, hi: i64, height: usize) -> Vec<String> {
    (0..height)
        .map(|row| {
            (lo..hi)
                .map(|x| map.block(x, row).unwrap_or(symbols::AIR))
                .collect()
        })
        .collect()
}
