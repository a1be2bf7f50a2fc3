#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the match-3 engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then reports [`Event`] values
//! describing every state transition that took place. Systems consume event
//! streams, query immutable snapshots, and respond exclusively with new command
//! batches.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Match Three.";

/// Default number of random draws allowed per cell while generating a grid.
pub const DEFAULT_GENERATION_ATTEMPTS: u32 = 256;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the presentation clock by the provided delta time.
    Tick {
        /// Duration of time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Marks a tile as the pending selection.
    SelectTile {
        /// Tile that was activated by the player.
        tile: TileId,
    },
    /// Clears the selection flag of a tile.
    DeselectTile {
        /// Tile whose selection should be cleared.
        tile: TileId,
    },
    /// Requests that two tiles exchange cells.
    SwapTiles {
        /// Tile activated most recently.
        first: TileId,
        /// Tile that was pending selection when `first` was activated.
        second: TileId,
    },
    /// Advances an in-progress cascade by exactly one transition.
    StepCascade,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the presentation clock advanced.
    TimeAdvanced {
        /// Duration of time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a tile became the pending selection.
    TileSelected {
        /// Tile that is now selected.
        tile: TileId,
    },
    /// Confirms that a tile is no longer selected.
    TileDeselected {
        /// Tile whose selection was cleared.
        tile: TileId,
    },
    /// Confirms that two tiles exchanged cells and a cascade started.
    SwapApplied {
        /// Tile activated most recently.
        first: TileId,
        /// Tile that was pending selection.
        second: TileId,
    },
    /// Reports that a swap request was rejected. The grid is left untouched.
    SwapRejected {
        /// Tile activated most recently.
        first: TileId,
        /// Tile that was pending selection.
        second: TileId,
        /// Specific reason the swap failed.
        reason: SwapRejection,
    },
    /// Reports that a tile entity now occupies a different cell.
    TileMoved {
        /// Tile that moved.
        tile: TileId,
        /// Cell the tile occupied before moving.
        from: CellCoord,
        /// Cell the tile occupies after moving.
        to: CellCoord,
        /// Why the tile moved.
        cause: MoveCause,
    },
    /// Reports that a matched tile was destroyed and its cell cleared.
    TileDestroyed {
        /// Tile that was destroyed.
        tile: TileId,
        /// Cell the tile occupied.
        cell: CellCoord,
        /// Kind of the destroyed tile.
        kind: TileKindId,
        /// Score value awarded for the tile.
        score: u32,
    },
    /// Reports that a fresh tile was created in an empty cell during a refill.
    TileSpawned {
        /// Identifier allocated to the new tile.
        tile: TileId,
        /// Cell the tile occupies.
        cell: CellCoord,
        /// Kind drawn for the tile.
        kind: TileKindId,
    },
    /// Summarises a resolving pass that removed at least one tile.
    MatchesCleared {
        /// One-based index of the pass within the current cascade.
        pass: u32,
        /// Number of tiles destroyed by the pass.
        tiles: u32,
    },
    /// Announces that the cascade state machine entered a new phase.
    CascadePhaseChanged {
        /// Phase that became active.
        phase: CascadePhase,
    },
    /// Announces that a cascade reached its fixed point and the grid is stable.
    CascadeSettled {
        /// Number of resolving passes that removed tiles.
        passes: u32,
    },
}

/// States of the cascade resolution state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum CascadePhase {
    /// No cascade is running; the grid is stable and accepts input.
    #[default]
    Idle,
    /// The next step searches for matches and destroys them.
    Resolving,
    /// The next step compacts surviving tiles along the gravity direction.
    Collapsing,
    /// The next step fills every empty cell with a fresh tile.
    Refilling,
}

impl CascadePhase {
    /// Reports whether no cascade is in progress.
    #[must_use]
    pub const fn is_idle(self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// Reasons a swap request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SwapRejection {
    /// At least one identifier does not name a tile on the grid.
    UnknownTile,
    /// Both identifiers name the same tile.
    SameTile,
    /// The tiles do not share an edge.
    NotAdjacent,
    /// Exchanging the tiles would not create a qualifying match.
    NoMatch,
    /// A cascade is still resolving; input is accepted again once it settles.
    CascadeInProgress,
}

/// Result of a swap attempt. Rejection is a normal gameplay outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SwapOutcome {
    /// The tiles exchanged cells and a cascade started.
    Applied,
    /// The swap was refused and the grid is unchanged.
    Rejected(SwapRejection),
}

impl SwapOutcome {
    /// Reports whether the swap took effect.
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Why a tile entity changed cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveCause {
    /// The tile took part in a player swap.
    Swap,
    /// The tile fell into a gap along the gravity direction.
    Gravity,
}

/// Unique identifier assigned to a tile entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(u32);

impl TileId {
    /// Creates a new tile identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Index of a tile kind within a [`TileCatalog`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileKindId(u16);

impl TileKindId {
    /// Creates a new kind identifier with the provided catalog index.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the catalog index.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }

    /// Catalog index widened for slice access.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Reports whether the two cells share an edge.
    #[must_use]
    pub fn is_adjacent(self, other: CellCoord) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Grid axes along which runs are measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Along a column: the row index varies, the column is fixed.
    Column,
    /// Along a row: the column index varies, the row is fixed.
    Row,
}

impl Axis {
    /// Both axes in evaluation order.
    pub const ALL: [Axis; 2] = [Axis::Column, Axis::Row];
}

/// Direction in which surviving tiles fall after matched tiles are removed.
///
/// Rows grow downward on screen, so `TopToBottom` packs tiles toward the
/// highest row index and refills open up at row zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GravityDirection {
    /// Tiles fall toward the last row.
    #[default]
    TopToBottom,
    /// Tiles fall toward row zero.
    BottomToTop,
}

/// A single tile category with its score value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileKind {
    name: String,
    score: u32,
}

impl TileKind {
    /// Creates a new tile kind.
    #[must_use]
    pub fn new(name: impl Into<String>, score: u32) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }

    /// Human readable name of the kind.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Points awarded for each destroyed tile of this kind.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }
}

/// Fixed enumeration of tile kinds available to a grid.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileCatalog {
    kinds: Vec<TileKind>,
}

impl TileCatalog {
    /// Creates a catalog from the provided kinds. Order defines [`TileKindId`] values.
    #[must_use]
    pub fn new(kinds: Vec<TileKind>) -> Self {
        Self { kinds }
    }

    /// Number of kinds in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Reports whether the catalog defines no kinds.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Looks up the kind with the provided identifier.
    #[must_use]
    pub fn get(&self, id: TileKindId) -> Option<&TileKind> {
        self.kinds.get(id.index())
    }

    /// Score value of the kind, or zero for identifiers outside the catalog.
    #[must_use]
    pub fn score(&self, id: TileKindId) -> u32 {
        self.get(id).map_or(0, TileKind::score)
    }

    /// Reports whether the identifier names a kind in this catalog.
    #[must_use]
    pub fn contains(&self, id: TileKindId) -> bool {
        id.index() < self.kinds.len()
    }

    /// Iterator over every kind identifier in catalog order.
    pub fn ids(&self) -> impl Iterator<Item = TileKindId> + '_ {
        (0..self.kinds.len()).map(|index| TileKindId::new(index as u16))
    }

    /// Iterator over the kinds paired with their identifiers.
    pub fn iter(&self) -> impl Iterator<Item = (TileKindId, &TileKind)> + '_ {
        self.ids().zip(self.kinds.iter())
    }
}

impl Default for TileCatalog {
    fn default() -> Self {
        Self::new(vec![
            TileKind::new("ruby", 10),
            TileKind::new("emerald", 10),
            TileKind::new("sapphire", 10),
            TileKind::new("topaz", 15),
            TileKind::new("amethyst", 20),
        ])
    }
}

/// Construction-time configuration of a grid, fixed for the grid's lifetime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Number of columns laid out in the grid.
    pub columns: u32,
    /// Number of rows laid out in the grid.
    pub rows: u32,
    /// Tile kinds available to generation and refills.
    pub catalog: TileCatalog,
    /// Minimum run length that counts as a match.
    pub win_threshold: u32,
    /// Direction in which tiles fall after a match.
    pub gravity: GravityDirection,
    /// Random draws allowed per cell before generation gives up.
    pub generation_attempts: u32,
}

impl GridConfig {
    /// Creates a configuration with the provided dimensions and default rules.
    #[must_use]
    pub fn with_dimensions(columns: u32, rows: u32) -> Self {
        Self {
            columns,
            rows,
            ..Self::default()
        }
    }

    /// Checks the preconditions generation relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.columns == 0 || self.rows == 0 {
            return Err(ConfigError::EmptyGrid {
                columns: self.columns,
                rows: self.rows,
            });
        }
        if self.catalog.len() < 2 {
            return Err(ConfigError::CatalogTooSmall {
                kinds: self.catalog.len(),
            });
        }
        if self.catalog.len() > usize::from(u16::MAX) {
            return Err(ConfigError::CatalogTooLarge {
                kinds: self.catalog.len(),
            });
        }
        if self.win_threshold < 2 {
            return Err(ConfigError::ThresholdTooSmall {
                threshold: self.win_threshold,
            });
        }
        if self.generation_attempts == 0 {
            return Err(ConfigError::NoGenerationAttempts);
        }
        Ok(())
    }

    /// Total number of cells in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.columns) * u64::from(self.rows);
        usize::try_from(count).unwrap_or(usize::MAX)
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 8,
            rows: 8,
            catalog: TileCatalog::default(),
            win_threshold: 3,
            gravity: GravityDirection::default(),
            generation_attempts: DEFAULT_GENERATION_ATTEMPTS,
        }
    }
}

/// Reasons a [`GridConfig`] is rejected before generation starts.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The grid has no cells.
    #[error("grid must have at least one column and one row, got {columns}x{rows}")]
    EmptyGrid {
        /// Configured column count.
        columns: u32,
        /// Configured row count.
        rows: u32,
    },
    /// Generation cannot avoid matches with fewer than two kinds.
    #[error("tile catalog must define at least two kinds, got {kinds}")]
    CatalogTooSmall {
        /// Number of kinds supplied.
        kinds: usize,
    },
    /// Kind identifiers are 16 bits wide.
    #[error("tile catalog defines {kinds} kinds, more than a kind identifier can address")]
    CatalogTooLarge {
        /// Number of kinds supplied.
        kinds: usize,
    },
    /// A single tile would always count as a match.
    #[error("win threshold must be at least 2, got {threshold}")]
    ThresholdTooSmall {
        /// Configured threshold.
        threshold: u32,
    },
    /// Generation would never draw a tile.
    #[error("generation attempts per cell must be non-zero")]
    NoGenerationAttempts,
}

/// Fatal errors raised while building a grid.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The configuration violates a generation precondition.
    #[error("invalid grid configuration: {0}")]
    Config(#[from] ConfigError),
    /// Every draw for a cell would have created a match.
    #[error(
        "no match-free tile found for cell {cell} after {attempts} attempts; \
         the catalog is too small for the win threshold"
    )]
    Exhausted {
        /// Cell that could not be filled.
        cell: CellCoord,
        /// Number of draws that were attempted.
        attempts: u32,
    },
    /// An explicit layout does not match the configured dimensions.
    #[error("layout is {columns}x{rows} but the grid is configured as {expected_columns}x{expected_rows}")]
    LayoutDimensions {
        /// Columns found in the layout.
        columns: u32,
        /// Rows found in the layout.
        rows: u32,
        /// Configured column count.
        expected_columns: u32,
        /// Configured row count.
        expected_rows: u32,
    },
    /// An explicit layout or refill script references a kind outside the catalog.
    #[error("kind {} is not part of the tile catalog", kind.get())]
    UnknownKind {
        /// Offending kind identifier.
        kind: TileKindId,
    },
}

/// Read-only snapshot of a single tile entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileSnapshot {
    /// Identifier of the tile entity.
    pub id: TileId,
    /// Cell currently occupied by the tile.
    pub cell: CellCoord,
    /// Kind of the tile.
    pub kind: TileKindId,
    /// Whether the tile is the pending selection.
    pub selected: bool,
}

/// Why a tile was handed to the presentation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlacementCause {
    /// The tile was created when the grid was generated.
    Generated,
    /// The tile exchanged cells with a neighbour.
    Swapped,
    /// The tile fell into a gap.
    Fell,
    /// The tile was created to fill an empty cell.
    Refilled,
}

/// Position update delivered to a [`TileObserver`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TilePlacement {
    /// Tile whose position changed.
    pub tile: TileId,
    /// Kind of the tile.
    pub kind: TileKindId,
    /// Cell the tile now occupies.
    pub cell: CellCoord,
    /// Why the tile was placed.
    pub cause: PlacementCause,
}

/// Fire-and-forget callback surface consumed from the rendering collaborator.
///
/// The engine never waits on an observer; implementations own all timing and
/// coordinate-to-screen mapping.
pub trait TileObserver {
    /// Called whenever a tile is generated, swapped, shifted by gravity, or spawned.
    fn tile_placed(&mut self, placement: TilePlacement);

    /// Called when a matched tile is destroyed.
    fn tile_removed(&mut self, _tile: TileId, _cell: CellCoord) {}

    /// Called when a tile's selection flag changes.
    fn selection_changed(&mut self, _tile: TileId, _selected: bool) {}
}

/// Score total and move count accumulated over one session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionCounters {
    score: u64,
    moves: u32,
}

impl SessionCounters {
    /// Creates zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self { score: 0, moves: 0 }
    }

    /// Accumulated score.
    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    /// Number of applied swaps.
    #[must_use]
    pub const fn moves(&self) -> u32 {
        self.moves
    }

    /// Adds the value of a destroyed tile to the total.
    pub fn add_score(&mut self, value: u32) {
        self.score = self.score.saturating_add(u64::from(value));
    }

    /// Counts one applied swap.
    pub fn add_move(&mut self) {
        self.moves = self.moves.saturating_add(1);
    }
}
