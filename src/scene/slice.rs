use smallvec::SmallVec;

use crate::foundation::core::ColumnRange;

/// Per-frame table of worker column ranges.
pub type SliceTable = SmallVec<[ColumnRange; 16]>;

/// Compute the column range for each worker over a `width`-column viewport.
///
/// Policy: the width is divided as evenly as possible; the first
/// `width % workers` workers each take one extra column. Ranges are
/// contiguous and strictly increasing by worker index and exactly tile
/// `[0, width)`. When `workers > width`, the trailing workers receive empty
/// ranges `[n, n)` and short-circuit the pipeline.
pub fn slice_columns(width: u32, workers: usize) -> SliceTable {
    debug_assert!(workers >= 1, "slice_columns requires at least one worker");
    let n = workers as u32;
    let base = width / n;
    let remainder = width % n;

    let mut table = SliceTable::with_capacity(workers);
    let mut x = 0;
    for i in 0..n {
        let len = base + u32::from(i < remainder);
        table.push(ColumnRange { x1: x, x2: x + len });
        x += len;
    }
    table
}
