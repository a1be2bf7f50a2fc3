//! Initial grid population and tile kind sampling.

use std::collections::VecDeque;

use match3_core::{CellCoord, GenerationError, TileKindId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    cells::TileGrid,
    matching::is_qualifying_match,
    tiles::{Tile, TileIdAllocator},
};

/// Source of tile kinds for generation and refills.
///
/// Refills drain the scripted queue first and fall back to the seeded RNG
/// once it is empty; generation always uses the RNG.
#[derive(Debug)]
pub(crate) struct KindSampler {
    rng: ChaCha8Rng,
    kinds: u16,
    scripted: VecDeque<TileKindId>,
}

impl KindSampler {
    pub(crate) fn new(seed: u64, kinds: u16, scripted: Vec<TileKindId>) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            kinds,
            scripted: scripted.into(),
        }
    }

    /// Draws a kind uniformly from the catalog.
    pub(crate) fn random(&mut self) -> TileKindId {
        TileKindId::new(self.rng.gen_range(0..self.kinds))
    }

    /// Draws the kind for a refilled cell.
    pub(crate) fn refill(&mut self) -> TileKindId {
        match self.scripted.pop_front() {
            Some(kind) => kind,
            None => self.random(),
        }
    }
}

/// Fills every cell in scan order with a kind that does not complete a run
/// of `threshold` with the tiles placed before it.
pub(crate) fn populate(
    grid: &mut TileGrid,
    ids: &mut TileIdAllocator,
    sampler: &mut KindSampler,
    threshold: u32,
    attempts: u32,
) -> Result<(), GenerationError> {
    let cells: Vec<CellCoord> = grid.cells().collect();
    for cell in cells {
        let kind = draw_match_free(grid, sampler, cell, threshold, attempts)?;
        grid.place(cell, Tile::new(ids.allocate(), cell, kind));
    }
    Ok(())
}

fn draw_match_free(
    grid: &TileGrid,
    sampler: &mut KindSampler,
    cell: CellCoord,
    threshold: u32,
    attempts: u32,
) -> Result<TileKindId, GenerationError> {
    for _ in 0..attempts {
        let kind = sampler.random();
        if !is_qualifying_match(grid, cell, kind, threshold) {
            return Ok(kind);
        }
    }
    Err(GenerationError::Exhausted { cell, attempts })
}
