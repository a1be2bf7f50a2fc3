//! Dense cell storage owning every tile entity on the grid.

use match3_core::{CellCoord, TileId, TileKindId};

use crate::tiles::Tile;

/// Rectangular array of slots, each holding zero or one tile.
#[derive(Clone, Debug)]
pub(crate) struct TileGrid {
    columns: u32,
    rows: u32,
    slots: Vec<Option<Tile>>,
}

impl TileGrid {
    pub(crate) fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            slots: vec![None; capacity],
        }
    }

    pub(crate) const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    pub(crate) fn get(&self, cell: CellCoord) -> Option<&Tile> {
        let index = self.index(cell);
        self.slots[index].as_ref()
    }

    pub(crate) fn get_mut(&mut self, cell: CellCoord) -> Option<&mut Tile> {
        let index = self.index(cell);
        self.slots[index].as_mut()
    }

    pub(crate) fn kind_at(&self, cell: CellCoord) -> Option<TileKindId> {
        self.get(cell).map(|tile| tile.kind)
    }

    /// Removes the tile from the cell, leaving it empty.
    pub(crate) fn take(&mut self, cell: CellCoord) -> Option<Tile> {
        let index = self.index(cell);
        self.slots[index].take()
    }

    /// Stores the tile in an empty cell and rewrites its coordinates to match.
    pub(crate) fn place(&mut self, cell: CellCoord, mut tile: Tile) {
        let index = self.index(cell);
        debug_assert!(
            self.slots[index].is_none(),
            "cell {cell} already holds a tile"
        );
        tile.cell = cell;
        self.slots[index] = Some(tile);
    }

    /// Exchanges the contents of two cells and fixes both tiles' coordinates.
    pub(crate) fn swap(&mut self, first: CellCoord, second: CellCoord) {
        let first_index = self.index(first);
        let second_index = self.index(second);
        self.slots.swap(first_index, second_index);
        if let Some(tile) = self.slots[first_index].as_mut() {
            tile.cell = first;
        }
        if let Some(tile) = self.slots[second_index].as_mut() {
            tile.cell = second;
        }
    }

    /// Finds the cell currently occupied by the tile.
    pub(crate) fn locate(&self, id: TileId) -> Option<CellCoord> {
        self.iter().find(|tile| tile.id == id).map(|tile| tile.cell)
    }

    /// Iterator over occupied slots in scan order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.slots.iter().flatten()
    }

    /// Iterator over every cell in scan order (column-major).
    pub(crate) fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let rows = self.rows;
        (0..self.columns).flat_map(move |column| (0..rows).map(move |row| CellCoord::new(column, row)))
    }

    /// Reports whether every stored tile agrees with the slot holding it.
    pub(crate) fn is_consistent(&self) -> bool {
        self.cells()
            .all(|cell| self.get(cell).map_or(true, |tile| tile.cell == cell))
    }

    fn index(&self, cell: CellCoord) -> usize {
        assert!(
            self.contains(cell),
            "cell {cell} lies outside the {}x{} grid",
            self.columns,
            self.rows
        );
        let rows = self.rows as usize;
        cell.column() as usize * rows + cell.row() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(id: u32, kind: u16) -> Tile {
        Tile::new(TileId::new(id), CellCoord::new(0, 0), TileKindId::new(kind))
    }

    #[test]
    fn place_rewrites_tile_coordinates() {
        let mut grid = TileGrid::new(3, 2);
        grid.place(CellCoord::new(2, 1), tile(4, 1));

        let stored = grid.get(CellCoord::new(2, 1)).expect("tile stored");
        assert_eq!(stored.cell, CellCoord::new(2, 1));
        assert_eq!(grid.locate(TileId::new(4)), Some(CellCoord::new(2, 1)));
        assert!(grid.is_consistent());
    }

    #[test]
    fn swap_moves_entities_and_coordinates_together() {
        let mut grid = TileGrid::new(2, 2);
        grid.place(CellCoord::new(0, 0), tile(1, 0));
        grid.place(CellCoord::new(1, 0), tile(2, 1));

        grid.swap(CellCoord::new(0, 0), CellCoord::new(1, 0));

        assert_eq!(grid.locate(TileId::new(1)), Some(CellCoord::new(1, 0)));
        assert_eq!(grid.locate(TileId::new(2)), Some(CellCoord::new(0, 0)));
        assert_eq!(grid.kind_at(CellCoord::new(0, 0)), Some(TileKindId::new(1)));
        assert!(grid.is_consistent());
    }

    #[test]
    fn take_leaves_cell_empty() {
        let mut grid = TileGrid::new(1, 1);
        grid.place(CellCoord::new(0, 0), tile(9, 0));

        let taken = grid.take(CellCoord::new(0, 0));
        assert_eq!(taken.map(|tile| tile.id), Some(TileId::new(9)));
        assert!(grid.get(CellCoord::new(0, 0)).is_none());
        assert_eq!(grid.iter().count(), 0);
    }

    #[test]
    fn cells_are_scanned_column_major() {
        let grid = TileGrid::new(2, 3);
        let cells: Vec<_> = grid.cells().collect();
        assert_eq!(
            cells,
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(0, 1),
                CellCoord::new(0, 2),
                CellCoord::new(1, 0),
                CellCoord::new(1, 1),
                CellCoord::new(1, 2),
            ]
        );
    }

    #[test]
    #[should_panic(expected = "outside the 2x2 grid")]
    fn out_of_bounds_access_panics() {
        let grid = TileGrid::new(2, 2);
        let _ = grid.get(CellCoord::new(2, 0));
    }
}
