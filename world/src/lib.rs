#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid state for the match-3 engine.
//!
//! The world owns every tile entity. It is mutated exclusively through
//! [`apply`], which executes a [`Command`] and reports each resulting state
//! transition as an [`Event`]. Systems and adapters observe the grid through
//! the read-only [`query`] module.

mod cascade;
mod cells;
mod generation;
mod matching;
mod tiles;

use match3_core::{
    CascadePhase, CellCoord, Command, ConfigError, Event, GenerationError, GridConfig, MoveCause,
    SwapOutcome, SwapRejection, TileId, TileKindId, WELCOME_BANNER,
};
use tracing::{debug, info};

use crate::{
    cells::TileGrid,
    generation::{populate, KindSampler},
    matching::swap_creates_match,
    tiles::{Tile, TileIdAllocator},
};

/// Represents the authoritative match-3 grid state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: GridConfig,
    grid: TileGrid,
    ids: TileIdAllocator,
    sampler: KindSampler,
    phase: CascadePhase,
    pass: u32,
    selected: Option<TileId>,
}

impl World {
    /// Generates a fresh match-free grid from the configuration and seed.
    pub fn new(config: GridConfig, seed: u64) -> Result<Self, GenerationError> {
        WorldBuilder::new(config).seed(seed).build()
    }

    fn set_selected(&mut self, tile: TileId, selected: bool, out_events: &mut Vec<Event>) {
        let Some(cell) = self.grid.locate(tile) else {
            return;
        };
        let Some(entity) = self.grid.get_mut(cell) else {
            return;
        };
        if entity.selected == selected {
            return;
        }
        entity.selected = selected;
        if selected {
            self.selected = Some(tile);
            out_events.push(Event::TileSelected { tile });
        } else {
            if self.selected == Some(tile) {
                self.selected = None;
            }
            out_events.push(Event::TileDeselected { tile });
        }
    }

    fn select(&mut self, tile: TileId, out_events: &mut Vec<Event>) {
        if self.grid.locate(tile).is_none() {
            debug!(tile = tile.get(), "ignoring selection of unknown tile");
            return;
        }
        if let Some(previous) = self.selected {
            if previous != tile {
                self.set_selected(previous, false, out_events);
            }
        }
        self.set_selected(tile, true, out_events);
    }

    fn check_swap(
        &self,
        first: TileId,
        second: TileId,
    ) -> Result<(CellCoord, CellCoord), SwapRejection> {
        if !self.phase.is_idle() {
            return Err(SwapRejection::CascadeInProgress);
        }
        let (Some(first_cell), Some(second_cell)) =
            (self.grid.locate(first), self.grid.locate(second))
        else {
            return Err(SwapRejection::UnknownTile);
        };
        if first == second {
            return Err(SwapRejection::SameTile);
        }
        if !first_cell.is_adjacent(second_cell) {
            return Err(SwapRejection::NotAdjacent);
        }
        if !swap_creates_match(
            &self.grid,
            first_cell,
            second_cell,
            self.config.win_threshold,
        ) {
            return Err(SwapRejection::NoMatch);
        }
        Ok((first_cell, second_cell))
    }

    fn swap(&mut self, first: TileId, second: TileId, out_events: &mut Vec<Event>) -> SwapOutcome {
        let (first_cell, second_cell) = match self.check_swap(first, second) {
            Ok(cells) => cells,
            Err(reason) => {
                debug!(
                    first = first.get(),
                    second = second.get(),
                    ?reason,
                    "swap rejected"
                );
                out_events.push(Event::SwapRejected {
                    first,
                    second,
                    reason,
                });
                return SwapOutcome::Rejected(reason);
            }
        };

        debug!(
            first = first.get(),
            second = second.get(),
            from = %first_cell,
            to = %second_cell,
            "swap applied"
        );
        out_events.push(Event::SwapApplied { first, second });
        self.grid.swap(first_cell, second_cell);
        debug_assert!(self.grid.is_consistent());
        out_events.push(Event::TileMoved {
            tile: first,
            from: first_cell,
            to: second_cell,
            cause: MoveCause::Swap,
        });
        out_events.push(Event::TileMoved {
            tile: second,
            from: second_cell,
            to: first_cell,
            cause: MoveCause::Swap,
        });
        self.set_selected(first, false, out_events);
        self.set_selected(second, false, out_events);

        self.pass = 0;
        self.enter_phase(CascadePhase::Resolving, out_events);
        SwapOutcome::Applied
    }
}

/// Configures how a [`World`] is populated before play starts.
///
/// Without an explicit layout the grid is generated from the seeded RNG. A
/// layout is taken verbatim, including any runs it already contains.
#[derive(Clone, Debug)]
pub struct WorldBuilder {
    config: GridConfig,
    seed: u64,
    layout: Option<Vec<Vec<TileKindId>>>,
    scripted_refills: Vec<TileKindId>,
}

impl WorldBuilder {
    /// Starts a builder for the configuration with a zero seed.
    #[must_use]
    pub fn new(config: GridConfig) -> Self {
        Self {
            config,
            seed: 0,
            layout: None,
            scripted_refills: Vec::new(),
        }
    }

    /// Seeds the RNG used for generation and refills.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Uses an explicit initial layout indexed as `layout[row][column]`.
    #[must_use]
    pub fn layout(mut self, layout: Vec<Vec<TileKindId>>) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Queues kinds consumed by refills before the RNG is consulted.
    #[must_use]
    pub fn scripted_refills(mut self, kinds: impl IntoIterator<Item = TileKindId>) -> Self {
        self.scripted_refills.extend(kinds);
        self
    }

    /// Validates the configuration and populates the grid.
    pub fn build(self) -> Result<World, GenerationError> {
        let Self {
            config,
            seed,
            layout,
            scripted_refills,
        } = self;

        config.validate()?;
        let kinds = u16::try_from(config.catalog.len()).map_err(|_| {
            ConfigError::CatalogTooLarge {
                kinds: config.catalog.len(),
            }
        })?;
        if let Some(kind) = scripted_refills
            .iter()
            .copied()
            .find(|kind| !config.catalog.contains(*kind))
        {
            return Err(GenerationError::UnknownKind { kind });
        }

        let mut grid = TileGrid::new(config.columns, config.rows);
        let mut ids = TileIdAllocator::new();
        let mut sampler = KindSampler::new(seed, kinds, scripted_refills);

        match layout {
            Some(layout) => place_layout(&config, &mut grid, &mut ids, &layout)?,
            None => populate(
                &mut grid,
                &mut ids,
                &mut sampler,
                config.win_threshold,
                config.generation_attempts,
            )?,
        }

        info!(
            columns = config.columns,
            rows = config.rows,
            kinds,
            seed,
            "grid generated"
        );

        Ok(World {
            banner: WELCOME_BANNER,
            config,
            grid,
            ids,
            sampler,
            phase: CascadePhase::Idle,
            pass: 0,
            selected: None,
        })
    }
}

fn place_layout(
    config: &GridConfig,
    grid: &mut TileGrid,
    ids: &mut TileIdAllocator,
    layout: &[Vec<TileKindId>],
) -> Result<(), GenerationError> {
    let rows = u32::try_from(layout.len()).unwrap_or(u32::MAX);
    let mismatched_row = layout
        .iter()
        .map(|row| u32::try_from(row.len()).unwrap_or(u32::MAX))
        .find(|columns| *columns != config.columns);
    if rows != config.rows || mismatched_row.is_some() {
        return Err(GenerationError::LayoutDimensions {
            columns: mismatched_row.unwrap_or(config.columns),
            rows,
            expected_columns: config.columns,
            expected_rows: config.rows,
        });
    }

    for cell in grid.cells().collect::<Vec<_>>() {
        let kind = layout[cell.row() as usize][cell.column() as usize];
        if !config.catalog.contains(kind) {
            return Err(GenerationError::UnknownKind { kind });
        }
        grid.place(cell, Tile::new(ids.allocate(), cell, kind));
    }
    Ok(())
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => out_events.push(Event::TimeAdvanced { dt }),
        Command::SelectTile { tile } => world.select(tile, out_events),
        Command::DeselectTile { tile } => world.set_selected(tile, false, out_events),
        Command::SwapTiles { first, second } => {
            let _ = world.swap(first, second, out_events);
        }
        Command::StepCascade => world.step_cascade(out_events),
    }
}

/// Attempts a swap and reports the outcome directly.
///
/// Equivalent to applying [`Command::SwapTiles`]; the same events are emitted.
pub fn try_swap(
    world: &mut World,
    first: TileId,
    second: TileId,
    out_events: &mut Vec<Event>,
) -> SwapOutcome {
    world.swap(first, second, out_events)
}

/// Steps the cascade until the grid is stable again.
///
/// Does nothing when no cascade is running. There is no cap on the number of
/// passes.
pub fn settle(world: &mut World, out_events: &mut Vec<Event>) {
    while !world.phase.is_idle() {
        world.step_cascade(out_events);
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use crate::matching::{self, swap_creates_match};
    use match3_core::{
        Axis, CascadePhase, CellCoord, GridConfig, TileId, TileKindId, TileSnapshot,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Configuration the grid was built with.
    #[must_use]
    pub fn config(world: &World) -> &GridConfig {
        &world.config
    }

    /// Number of columns and rows.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        world.grid.dimensions()
    }

    /// Current phase of the cascade state machine.
    #[must_use]
    pub fn cascade_phase(world: &World) -> CascadePhase {
        world.phase
    }

    /// Tile currently marked as the pending selection, if any.
    #[must_use]
    pub fn selected_tile(world: &World) -> Option<TileId> {
        world.selected
    }

    /// Snapshot of the tile at the cell. `None` for empty or out-of-bounds cells.
    #[must_use]
    pub fn tile_at(world: &World, cell: CellCoord) -> Option<TileSnapshot> {
        if !world.grid.contains(cell) {
            return None;
        }
        world.grid.get(cell).map(|tile| tile.snapshot())
    }

    /// Snapshot of the tile with the identifier, if it is still on the grid.
    #[must_use]
    pub fn tile(world: &World, id: TileId) -> Option<TileSnapshot> {
        world
            .grid
            .locate(id)
            .and_then(|cell| world.grid.get(cell))
            .map(|tile| tile.snapshot())
    }

    /// Captures a read-only view of every tile on the grid.
    #[must_use]
    pub fn grid_view(world: &World) -> GridView {
        GridView {
            snapshots: world.grid.iter().map(|tile| tile.snapshot()).collect(),
        }
    }

    /// Counts contiguous tiles of `kind` through `cell` along `axis`,
    /// including the cell itself.
    ///
    /// # Panics
    ///
    /// Panics when `cell` lies outside the grid.
    #[must_use]
    pub fn run_length(world: &World, cell: CellCoord, kind: TileKindId, axis: Axis) -> u32 {
        matching::run_length(&world.grid, cell, kind, axis)
    }

    /// Reports whether `kind` at `cell` would belong to a qualifying run.
    ///
    /// # Panics
    ///
    /// Panics when `cell` lies outside the grid.
    #[must_use]
    pub fn is_qualifying_match(world: &World, cell: CellCoord, kind: TileKindId) -> bool {
        matching::is_qualifying_match(&world.grid, cell, kind, world.config.win_threshold)
    }

    /// Every cell that currently belongs to a qualifying run, in scan order.
    #[must_use]
    pub fn find_all_matches(world: &World) -> Vec<CellCoord> {
        matching::find_all_matches(&world.grid, world.config.win_threshold)
            .into_iter()
            .collect()
    }

    /// Reports whether the grid is idle and free of qualifying runs.
    #[must_use]
    pub fn is_stable(world: &World) -> bool {
        world.phase.is_idle()
            && matching::find_all_matches(&world.grid, world.config.win_threshold).is_empty()
    }

    /// Lists every neighbouring pair a swap would currently accept.
    ///
    /// Each pair is reported once, with the tile on the left or above first.
    /// The list is empty while a cascade is running.
    #[must_use]
    pub fn legal_swaps(world: &World) -> Vec<(TileId, TileId)> {
        if !world.phase.is_idle() {
            return Vec::new();
        }
        let (columns, rows) = world.grid.dimensions();
        let threshold = world.config.win_threshold;
        let mut swaps = Vec::new();
        for tile in world.grid.iter() {
            let cell = tile.cell;
            let neighbours = [
                (cell.column() + 1 < columns)
                    .then(|| CellCoord::new(cell.column() + 1, cell.row())),
                (cell.row() + 1 < rows).then(|| CellCoord::new(cell.column(), cell.row() + 1)),
            ];
            for neighbour in neighbours.into_iter().flatten() {
                let Some(other) = world.grid.get(neighbour) else {
                    continue;
                };
                if swap_creates_match(&world.grid, cell, neighbour, threshold) {
                    swaps.push((tile.id, other.id));
                }
            }
        }
        swaps
    }

    /// Read-only snapshot of the tiles occupying the grid.
    #[derive(Clone, Debug)]
    pub struct GridView {
        snapshots: Vec<TileSnapshot>,
    }

    impl GridView {
        /// Iterator over the captured tiles in scan order.
        pub fn iter(&self) -> impl Iterator<Item = &TileSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        pub fn into_vec(self) -> Vec<TileSnapshot> {
            self.snapshots
        }
    }
}
