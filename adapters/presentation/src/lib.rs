#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Presentation contracts for match-3 adapters.
//!
//! The engine reports tile placements through [`TileObserver`]; [`Scene`]
//! records them as world-space positions computed by [`GridLayout`], and a
//! [`RenderingBackend`] draws the scene however it likes.

use std::{collections::BTreeMap, error::Error, fmt};

use anyhow::Result as AnyResult;
use glam::Vec2;
use match3_core::{CellCoord, PlacementCause, TileId, TileKindId, TileObserver, TilePlacement};

/// RGBA color used when presenting tiles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

const PALETTE: [Color; 6] = [
    Color::from_rgb_u8(0xc8, 0x2a, 0x36),
    Color::from_rgb_u8(0x2f, 0x95, 0x32),
    Color::from_rgb_u8(0x58, 0x47, 0xff),
    Color::from_rgb_u8(0xff, 0xc1, 0x07),
    Color::from_rgb_u8(0x9c, 0x27, 0xb0),
    Color::from_rgb_u8(0x00, 0xa5, 0xb5),
];

/// Color assigned to a tile kind. Kinds beyond the palette reuse it cyclically.
#[must_use]
pub fn kind_color(kind: TileKindId) -> Color {
    PALETTE[kind.index() % PALETTE.len()]
}

/// Maps grid cells to world-space positions centred on the origin.
///
/// Rows grow downward, so row zero has the smallest `y`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
    columns: u32,
    rows: u32,
    tile_size: f32,
}

impl GridLayout {
    /// Creates a layout for a grid of the provided dimensions.
    ///
    /// Returns an error when `tile_size` is not a positive finite number.
    pub fn new(columns: u32, rows: u32, tile_size: f32) -> Result<Self, PresentationError> {
        if !tile_size.is_finite() || tile_size <= 0.0 {
            return Err(PresentationError::InvalidTileSize { tile_size });
        }
        Ok(Self {
            columns,
            rows,
            tile_size,
        })
    }

    /// Side length of a single tile in world units.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Number of columns and rows.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }

    /// World-space centre of the cell.
    ///
    /// Each axis uses `index * size - (count / 2 * size - size / 2)` with an
    /// integer `count / 2`, so grids with an even count are exactly centred and
    /// odd ones sit half a tile off.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(
            self.axis_position(cell.column(), self.columns),
            self.axis_position(cell.row(), self.rows),
        )
    }

    /// Cell whose tile covers the world-space position, if any.
    #[must_use]
    pub fn cell_at(&self, position: Vec2) -> Option<CellCoord> {
        let column = self.axis_index(position.x, self.columns)?;
        let row = self.axis_index(position.y, self.rows)?;
        Some(CellCoord::new(column, row))
    }

    fn axis_offset(&self, count: u32) -> f32 {
        (count / 2) as f32 * self.tile_size - self.tile_size / 2.0
    }

    fn axis_position(&self, index: u32, count: u32) -> f32 {
        index as f32 * self.tile_size - self.axis_offset(count)
    }

    fn axis_index(&self, value: f32, count: u32) -> Option<u32> {
        let shifted = (value + self.axis_offset(count)) / self.tile_size + 0.5;
        if !shifted.is_finite() || shifted < 0.0 {
            return None;
        }
        let index = shifted.floor() as u32;
        (index < count).then_some(index)
    }
}

/// Presentation state of a single tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneTile {
    /// Kind of the tile.
    pub kind: TileKindId,
    /// Cell the tile occupies.
    pub cell: CellCoord,
    /// World-space centre of the tile.
    pub position: Vec2,
    /// Whether the tile is highlighted as the pending selection.
    pub selected: bool,
    /// Why the tile last changed position.
    pub cause: PlacementCause,
}

/// Scene assembled from observer callbacks.
#[derive(Clone, Debug)]
pub struct Scene {
    layout: GridLayout,
    tiles: BTreeMap<TileId, SceneTile>,
    removed: u64,
}

impl Scene {
    /// Creates an empty scene using the layout for positioning.
    #[must_use]
    pub fn new(layout: GridLayout) -> Self {
        Self {
            layout,
            tiles: BTreeMap::new(),
            removed: 0,
        }
    }

    /// Layout used to compute tile positions.
    #[must_use]
    pub const fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Presentation state of the tile, if it is in the scene.
    #[must_use]
    pub fn tile(&self, id: TileId) -> Option<&SceneTile> {
        self.tiles.get(&id)
    }

    /// Tile currently drawn at the cell, if any.
    #[must_use]
    pub fn tile_at(&self, cell: CellCoord) -> Option<(TileId, &SceneTile)> {
        self.tiles
            .iter()
            .find(|(_, tile)| tile.cell == cell)
            .map(|(id, tile)| (*id, tile))
    }

    /// Iterator over every tile in identifier order.
    pub fn tiles(&self) -> impl Iterator<Item = (TileId, &SceneTile)> {
        self.tiles.iter().map(|(id, tile)| (*id, tile))
    }

    /// Number of tiles currently in the scene.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Reports whether the scene holds no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Number of tiles removed since the scene was created.
    #[must_use]
    pub const fn removed(&self) -> u64 {
        self.removed
    }

    /// Drops every tile, keeping the layout.
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.removed = 0;
    }
}

impl TileObserver for Scene {
    fn tile_placed(&mut self, placement: TilePlacement) {
        let position = self.layout.cell_center(placement.cell);
        let selected = self
            .tiles
            .get(&placement.tile)
            .map_or(false, |tile| tile.selected);
        let _ = self.tiles.insert(
            placement.tile,
            SceneTile {
                kind: placement.kind,
                cell: placement.cell,
                position,
                selected,
                cause: placement.cause,
            },
        );
    }

    fn tile_removed(&mut self, tile: TileId, _cell: CellCoord) {
        if self.tiles.remove(&tile).is_some() {
            self.removed = self.removed.saturating_add(1);
        }
    }

    fn selection_changed(&mut self, tile: TileId, selected: bool) {
        if let Some(entry) = self.tiles.get_mut(&tile) {
            entry.selected = selected;
        }
    }
}

/// Rendering backend capable of presenting a scene.
pub trait RenderingBackend {
    /// Draws the scene once.
    fn present(&mut self, scene: &Scene) -> AnyResult<()>;
}

/// Errors that can occur when constructing presentation descriptors.
#[derive(Debug, PartialEq)]
pub enum PresentationError {
    /// Tiles must have a positive finite size.
    InvalidTileSize {
        /// Provided size that failed validation.
        tile_size: f32,
    },
}

impl fmt::Display for PresentationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileSize { tile_size } => {
                write!(f, "tile_size must be positive and finite (received {tile_size})")
            }
        }
    }
}

impl Error for PresentationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(columns: u32, rows: u32) -> GridLayout {
        GridLayout::new(columns, rows, 1.0).expect("valid layout")
    }

    #[test]
    fn layout_rejects_non_positive_tile_size() {
        let error = GridLayout::new(4, 4, 0.0).expect_err("zero size must be rejected");
        assert_eq!(error, PresentationError::InvalidTileSize { tile_size: 0.0 });
        assert!(GridLayout::new(4, 4, f32::NAN).is_err());
    }

    #[test]
    fn even_grids_are_centred_on_the_origin() {
        let layout = layout(6, 6);
        assert_eq!(layout.cell_center(CellCoord::new(0, 0)), Vec2::new(-2.5, -2.5));
        assert_eq!(layout.cell_center(CellCoord::new(5, 5)), Vec2::new(2.5, 2.5));
    }

    #[test]
    fn odd_grids_use_integer_halving() {
        let layout = layout(5, 3);
        assert_eq!(layout.cell_center(CellCoord::new(0, 0)), Vec2::new(-1.5, -0.5));
        assert_eq!(layout.cell_center(CellCoord::new(4, 2)), Vec2::new(2.5, 1.5));
    }

    #[test]
    fn cell_at_inverts_cell_center() {
        let layout = GridLayout::new(7, 4, 32.0).expect("valid layout");
        for column in 0..7 {
            for row in 0..4 {
                let cell = CellCoord::new(column, row);
                assert_eq!(layout.cell_at(layout.cell_center(cell)), Some(cell));
            }
        }
        assert_eq!(layout.cell_at(Vec2::new(-1000.0, 0.0)), None);
        assert_eq!(layout.cell_at(Vec2::new(0.0, 1000.0)), None);
    }

    #[test]
    fn scene_tracks_placements_and_removals() {
        let mut scene = Scene::new(layout(2, 2));
        let tile = TileId::new(3);
        scene.tile_placed(TilePlacement {
            tile,
            kind: TileKindId::new(1),
            cell: CellCoord::new(0, 0),
            cause: PlacementCause::Generated,
        });
        scene.selection_changed(tile, true);
        scene.tile_placed(TilePlacement {
            tile,
            kind: TileKindId::new(1),
            cell: CellCoord::new(0, 1),
            cause: PlacementCause::Fell,
        });

        let entry = scene.tile(tile).expect("tile present");
        assert_eq!(entry.cell, CellCoord::new(0, 1));
        assert_eq!(entry.position, Vec2::new(-0.5, 0.5));
        assert!(entry.selected, "moving keeps the highlight");
        assert_eq!(scene.tile_at(CellCoord::new(0, 1)).map(|(id, _)| id), Some(tile));

        scene.tile_removed(tile, CellCoord::new(0, 1));
        assert!(scene.is_empty());
        assert_eq!(scene.removed(), 1);
    }

    #[test]
    fn palette_cycles_past_its_end() {
        assert_eq!(kind_color(TileKindId::new(0)), kind_color(TileKindId::new(6)));
        assert_ne!(kind_color(TileKindId::new(0)), kind_color(TileKindId::new(1)));
    }
}
