//! Pure match detection over grid contents.
//!
//! Every function here reads kinds through [`KindSource`], which lets swap
//! validation evaluate a hypothetically swapped grid without mutating it.

use std::collections::BTreeSet;

use match3_core::{Axis, CellCoord, TileKindId};

use crate::cells::TileGrid;

/// Read-only access to the kind stored at each cell.
pub(crate) trait KindSource {
    /// Number of columns and rows.
    fn dimensions(&self) -> (u32, u32);

    /// Kind stored at the cell, or `None` when the cell is empty.
    fn kind_at(&self, cell: CellCoord) -> Option<TileKindId>;
}

impl KindSource for TileGrid {
    fn dimensions(&self) -> (u32, u32) {
        TileGrid::dimensions(self)
    }

    fn kind_at(&self, cell: CellCoord) -> Option<TileKindId> {
        TileGrid::kind_at(self, cell)
    }
}

/// Overlay that reports the grid as if two cells had exchanged tiles.
pub(crate) struct SwappedView<'a> {
    grid: &'a TileGrid,
    first: CellCoord,
    second: CellCoord,
}

impl<'a> SwappedView<'a> {
    pub(crate) fn new(grid: &'a TileGrid, first: CellCoord, second: CellCoord) -> Self {
        Self {
            grid,
            first,
            second,
        }
    }
}

impl KindSource for SwappedView<'_> {
    fn dimensions(&self) -> (u32, u32) {
        self.grid.dimensions()
    }

    fn kind_at(&self, cell: CellCoord) -> Option<TileKindId> {
        if cell == self.first {
            self.grid.kind_at(self.second)
        } else if cell == self.second {
            self.grid.kind_at(self.first)
        } else {
            self.grid.kind_at(cell)
        }
    }
}

/// Counts contiguous tiles of `kind` through `cell` along `axis`.
///
/// The cell itself always counts as one, whatever it currently holds, so the
/// function also answers "what if `kind` were placed here". Extension stops at
/// the grid boundary, an empty cell, or a different kind.
///
/// # Panics
///
/// Panics when `cell` lies outside the grid.
pub(crate) fn run_length<S>(source: &S, cell: CellCoord, kind: TileKindId, axis: Axis) -> u32
where
    S: KindSource + ?Sized,
{
    let (columns, rows) = source.dimensions();
    assert!(
        cell.column() < columns && cell.row() < rows,
        "cell {cell} lies outside the {columns}x{rows} grid"
    );

    let mut length = 1;
    for delta in [-1_i64, 1] {
        let mut cursor = cell;
        while let Some(next) = neighbour(cursor, axis, delta, columns, rows) {
            if source.kind_at(next) != Some(kind) {
                break;
            }
            length += 1;
            cursor = next;
        }
    }
    length
}

/// Reports whether `kind` at `cell` takes part in a run of at least `threshold`.
pub(crate) fn is_qualifying_match<S>(
    source: &S,
    cell: CellCoord,
    kind: TileKindId,
    threshold: u32,
) -> bool
where
    S: KindSource + ?Sized,
{
    Axis::ALL
        .iter()
        .any(|axis| run_length(source, cell, kind, *axis) >= threshold)
}

/// Collects every occupied cell that belongs to a qualifying run.
pub(crate) fn find_all_matches(grid: &TileGrid, threshold: u32) -> BTreeSet<CellCoord> {
    grid.iter()
        .filter(|tile| is_qualifying_match(grid, tile.cell, tile.kind, threshold))
        .map(|tile| tile.cell)
        .collect()
}

/// Reports whether exchanging the two cells would create a qualifying match
/// at either of them.
pub(crate) fn swap_creates_match(
    grid: &TileGrid,
    first: CellCoord,
    second: CellCoord,
    threshold: u32,
) -> bool {
    let view = SwappedView::new(grid, first, second);
    [first, second].into_iter().any(|cell| {
        view.kind_at(cell)
            .map_or(false, |kind| is_qualifying_match(&view, cell, kind, threshold))
    })
}

fn neighbour(cell: CellCoord, axis: Axis, delta: i64, columns: u32, rows: u32) -> Option<CellCoord> {
    let (column, row) = match axis {
        Axis::Column => (i64::from(cell.column()), i64::from(cell.row()) + delta),
        Axis::Row => (i64::from(cell.column()) + delta, i64::from(cell.row())),
    };
    if column < 0 || row < 0 || column >= i64::from(columns) || row >= i64::from(rows) {
        return None;
    }
    Some(CellCoord::new(column as u32, row as u32))
}
