//! Gravity and connectivity.
//!
//! A depth-first search from the bottom of the window marks every solid cell
//! connected to the ground through 8-neighbourhoods. The two columns just
//! outside the window always count as connected, anchoring structures that
//! reach past it. Every other solid cell falls one row per pass.

use std::collections::BTreeMap;
use std::ops::Range;

use rustc_hash::FxHashSet;
use strata_blocks::{BlockRegistry, SliceMap, symbols};

/// Per-column cell rewrites: x → (row → new symbol).
pub type FallDeltas = BTreeMap<i64, BTreeMap<usize, char>>;

/// Cells reachable from the floor of `edges`, as `(x, row)`.
pub fn grounded_cells(
    map: &SliceMap,
    edges: Range<i64>,
    height: usize,
    blocks: &BlockRegistry,
) -> FxHashSet<(i64, i64)> {
    let mut found = FxHashSet::default();
    if height == 0 {
        return found;
    }
    let height = height as i64;
    let boundary = [edges.start - 1, edges.end];
    let columns = edges.start - 1..=edges.end;

    let start = ((edges.start + edges.end).div_euclid(2), height - 1);
    let mut stack = vec![start];
    while let Some((x, row)) = stack.pop() {
        if row < 0 || row >= height || !columns.contains(&x) || found.contains(&(x, row)) {
            continue;
        }
        let solid = map
            .block(x, row as usize)
            .is_some_and(|block| blocks.is_solid(block));
        if !solid && !boundary.contains(&x) {
            continue;
        }
        found.insert((x, row));
        for dx in -1..=1 {
            for dy in -1..=1 {
                if dx != 0 || dy != 0 {
                    stack.push((x + dx, row + dy));
                }
            }
        }
    }
    found
}

/// One discrete fall step over the columns of `map` within `edges`.
///
/// Every unsupported solid cell, scanning each column bottom-up from just
/// above the bedrock row, is replaced by air and written one row lower.
pub fn fall_step(
    map: &SliceMap,
    edges: Range<i64>,
    height: usize,
    blocks: &BlockRegistry,
) -> FallDeltas {
    let grounded = grounded_cells(map, edges.clone(), height, blocks);
    let mut deltas = FallDeltas::new();

    for (x, column) in map.range(edges.start, edges.end) {
        for row in (0..column.len().saturating_sub(2)).rev() {
            let block = column[row];
            if !blocks.is_solid(block) || grounded.contains(&(x, row as i64)) {
                continue;
            }
            let changes = deltas.entry(x).or_default();
            changes.insert(row, symbols::AIR);
            changes.insert(row + 1, block);
        }
    }

    if !deltas.is_empty() {
        tracing::debug!(
            lo = edges.start,
            hi = edges.end,
            columns = deltas.len(),
            "unsupported blocks falling"
        );
    }
    deltas
}

/// Writes `deltas` into `map`. Columns or rows that do not exist are skipped.
pub fn apply_deltas(map: &mut SliceMap, deltas: &FallDeltas) {
    for (&x, changes) in deltas {
        let Some(column) = map.get_mut(x) else {
            continue;
        };
        for (&row, &block) in changes {
            if let Some(cell) = column.get_mut(row) {
                *cell = block;
            }
        }
    }
}
