//! Tile entities and identifier allocation.

use match3_core::{CellCoord, TileId, TileKindId, TileSnapshot};

/// Mutable tile entity stored inside the grid.
///
/// The same entity keeps its identifier when it is swapped or shifted; only
/// its `cell` changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Tile {
    /// Identifier allocated by the world for the tile.
    pub(crate) id: TileId,
    /// Cell the tile occupies. Always equal to the slot holding the tile.
    pub(crate) cell: CellCoord,
    /// Kind drawn for the tile.
    pub(crate) kind: TileKindId,
    /// Whether the tile is the pending selection.
    pub(crate) selected: bool,
}

impl Tile {
    /// Creates an unselected tile.
    pub(crate) fn new(id: TileId, cell: CellCoord, kind: TileKindId) -> Self {
        Self {
            id,
            cell,
            kind,
            selected: false,
        }
    }

    /// Captures an immutable copy of the tile for queries.
    pub(crate) fn snapshot(&self) -> TileSnapshot {
        TileSnapshot {
            id: self.id,
            cell: self.cell,
            kind: self.kind,
            selected: self.selected,
        }
    }
}

/// Hands out tile identifiers that are never reused within one world.
#[derive(Debug)]
pub(crate) struct TileIdAllocator {
    next_tile_id: TileId,
}

impl TileIdAllocator {
    /// Creates an allocator starting at identifier zero.
    pub(crate) fn new() -> Self {
        Self {
            next_tile_id: TileId::new(0),
        }
    }

    /// Returns the next unused identifier.
    pub(crate) fn allocate(&mut self) -> TileId {
        let id = self.next_tile_id;
        self.next_tile_id = TileId::new(id.get().wrapping_add(1));
        id
    }
}
