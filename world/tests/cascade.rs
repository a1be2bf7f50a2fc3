use match3_core::{
    CascadePhase, CellCoord, Command, Event, GridConfig, MoveCause, SwapOutcome, SwapRejection,
    TileCatalog, TileId, TileKind, TileKindId,
};
use match3_world::{self as world, query, World, WorldBuilder};

/// Six by six grid following `(column + 2 * row) % 3` with a near miss in row 3:
/// swapping (2, 2) and (2, 3) completes a run of zeros across columns 2 to 4.
const NEAR_MISS: [[u16; 6]; 6] = [
    [0, 1, 2, 0, 1, 2],
    [2, 0, 1, 2, 0, 1],
    [1, 2, 0, 1, 2, 0],
    [0, 1, 2, 0, 0, 2],
    [2, 0, 1, 2, 0, 1],
    [1, 2, 0, 1, 2, 0],
];

fn config() -> GridConfig {
    GridConfig {
        catalog: TileCatalog::new(vec![
            TileKind::new("circle", 5),
            TileKind::new("square", 7),
            TileKind::new("triangle", 11),
        ]),
        ..GridConfig::with_dimensions(6, 6)
    }
}

fn near_miss_world(refills: &[u16]) -> World {
    let layout = NEAR_MISS
        .iter()
        .map(|row| row.iter().copied().map(TileKindId::new).collect())
        .collect();
    WorldBuilder::new(config())
        .layout(layout)
        .scripted_refills(refills.iter().copied().map(TileKindId::new))
        .build()
        .expect("layout fits the configuration")
}

fn id_at(world: &World, column: u32, row: u32) -> TileId {
    query::tile_at(world, CellCoord::new(column, row))
        .expect("cell occupied")
        .id
}

fn kind_rows(world: &World) -> Vec<Vec<u16>> {
    let (columns, rows) = query::dimensions(world);
    (0..rows)
        .map(|row| {
            (0..columns)
                .map(|column| {
                    query::tile_at(world, CellCoord::new(column, row))
                        .expect("stable grid is full")
                        .kind
                        .get()
                })
                .collect()
        })
        .collect()
}

fn destroyed_score(events: &[Event]) -> u64 {
    events
        .iter()
        .map(|event| match event {
            Event::TileDestroyed { score, .. } => u64::from(*score),
            _ => 0,
        })
        .sum()
}

#[test]
fn near_miss_swap_clears_the_completed_run() {
    let mut world = near_miss_world(&[0, 2, 0]);
    let mut events = Vec::new();
    let pending = id_at(&world, 2, 2);
    let activated = id_at(&world, 2, 3);

    let outcome = world::try_swap(&mut world, activated, pending, &mut events);
    world::settle(&mut world, &mut events);

    assert_eq!(outcome, SwapOutcome::Applied);
    let destroyed: Vec<CellCoord> = events
        .iter()
        .filter_map(|event| match event {
            Event::TileDestroyed { cell, .. } => Some(*cell),
            _ => None,
        })
        .collect();
    assert_eq!(
        destroyed,
        vec![
            CellCoord::new(2, 3),
            CellCoord::new(3, 3),
            CellCoord::new(4, 3),
        ]
    );
    assert_eq!(destroyed_score(&events), 15);
    assert_eq!(events.last(), Some(&Event::CascadeSettled { passes: 1 }));
    assert!(query::is_stable(&world));
    assert_eq!(
        kind_rows(&world),
        vec![
            vec![0, 1, 0, 2, 0, 2],
            vec![2, 0, 2, 0, 1, 1],
            vec![1, 2, 1, 2, 0, 0],
            vec![0, 1, 2, 1, 2, 2],
            vec![2, 0, 1, 2, 0, 1],
            vec![1, 2, 0, 1, 2, 0],
        ]
    );
}

#[test]
fn refill_that_completes_a_run_triggers_a_second_pass() {
    let mut world = near_miss_world(&[1, 1, 1, 2, 0, 2, 0]);
    let mut events = Vec::new();
    let pending = id_at(&world, 2, 2);
    let activated = id_at(&world, 2, 3);

    assert!(world::try_swap(&mut world, activated, pending, &mut events).is_applied());
    world::settle(&mut world, &mut events);

    let passes: Vec<(u32, u32)> = events
        .iter()
        .filter_map(|event| match event {
            Event::MatchesCleared { pass, tiles } => Some((*pass, *tiles)),
            _ => None,
        })
        .collect();
    assert_eq!(passes, vec![(1, 3), (2, 4)]);
    assert_eq!(destroyed_score(&events), 15 + 4 * 7);
    assert_eq!(events.last(), Some(&Event::CascadeSettled { passes: 2 }));
    assert!(query::find_all_matches(&world).is_empty());
    assert_eq!(kind_rows(&world)[0], vec![0, 2, 0, 2, 0, 2]);
}

#[test]
fn cascade_phases_follow_the_state_machine() {
    let mut world = near_miss_world(&[0, 2, 0]);
    let mut events = Vec::new();
    let pending = id_at(&world, 2, 2);
    let activated = id_at(&world, 2, 3);

    assert!(world::try_swap(&mut world, activated, pending, &mut events).is_applied());
    world::settle(&mut world, &mut events);

    let phases: Vec<CascadePhase> = events
        .iter()
        .filter_map(|event| match event {
            Event::CascadePhaseChanged { phase } => Some(*phase),
            _ => None,
        })
        .collect();
    assert_eq!(
        phases,
        vec![
            CascadePhase::Resolving,
            CascadePhase::Collapsing,
            CascadePhase::Refilling,
            CascadePhase::Resolving,
            CascadePhase::Idle,
        ]
    );
}

#[test]
fn collapse_preserves_column_order_and_counts() {
    let mut world = near_miss_world(&[0, 2, 0]);
    let before: Vec<TileId> = (0..3).map(|row| id_at(&world, 3, row)).collect();
    let untouched = id_at(&world, 3, 4);
    let mut events = Vec::new();
    let pending = id_at(&world, 2, 2);
    let activated = id_at(&world, 2, 3);

    assert!(world::try_swap(&mut world, activated, pending, &mut events).is_applied());
    world::settle(&mut world, &mut events);

    let after: Vec<TileId> = (1..4).map(|row| id_at(&world, 3, row)).collect();
    assert_eq!(after, before, "survivors keep their relative order");
    assert_eq!(id_at(&world, 3, 4), untouched);

    let gravity_moves = events
        .iter()
        .filter(|event| {
            matches!(
                event,
                Event::TileMoved {
                    cause: MoveCause::Gravity,
                    ..
                }
            )
        })
        .count();
    assert_eq!(gravity_moves, 9);

    let spawned: Vec<CellCoord> = events
        .iter()
        .filter_map(|event| match event {
            Event::TileSpawned { cell, .. } => Some(*cell),
            _ => None,
        })
        .collect();
    assert_eq!(
        spawned,
        vec![
            CellCoord::new(2, 0),
            CellCoord::new(3, 0),
            CellCoord::new(4, 0),
        ]
    );
}

#[test]
fn moved_tiles_keep_their_identity() {
    let mut world = near_miss_world(&[0, 2, 0]);
    let mut events = Vec::new();
    let pending = id_at(&world, 2, 2);
    let activated = id_at(&world, 2, 3);

    assert!(world::try_swap(&mut world, activated, pending, &mut events).is_applied());
    world::settle(&mut world, &mut events);

    // The activated tile moved up by the swap and back down by gravity, while
    // the pending tile landed in the run and was destroyed.
    let snapshot = query::tile(&world, activated).expect("activated tile survives");
    assert_eq!(snapshot.cell, CellCoord::new(2, 3));
    assert!(query::tile(&world, pending).is_none());
}

#[test]
fn non_adjacent_swap_leaves_everything_unchanged() {
    let mut world = near_miss_world(&[]);
    let before = query::grid_view(&world).into_vec();
    let mut events = Vec::new();
    let pending = id_at(&world, 0, 0);
    let activated = id_at(&world, 5, 5);

    let outcome = world::try_swap(&mut world, activated, pending, &mut events);

    assert_eq!(outcome, SwapOutcome::Rejected(SwapRejection::NotAdjacent));
    assert_eq!(query::grid_view(&world).into_vec(), before);
    assert_eq!(destroyed_score(&events), 0);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::SwapApplied { .. })));
}

#[test]
fn resolving_after_idle_is_a_no_op() {
    let mut world = near_miss_world(&[0, 2, 0]);
    let mut events = Vec::new();
    let pending = id_at(&world, 2, 2);
    let activated = id_at(&world, 2, 3);
    assert!(world::try_swap(&mut world, activated, pending, &mut events).is_applied());
    world::settle(&mut world, &mut events);
    let settled = query::grid_view(&world).into_vec();

    let mut later = Vec::new();
    for _ in 0..3 {
        world::apply(&mut world, Command::StepCascade, &mut later);
    }

    assert!(later.is_empty());
    assert_eq!(query::grid_view(&world).into_vec(), settled);
}

#[test]
fn legal_swaps_include_the_near_miss() {
    let world = near_miss_world(&[]);
    let pending = id_at(&world, 2, 2);
    let activated = id_at(&world, 2, 3);

    assert!(query::legal_swaps(&world).contains(&(pending, activated)));
}

#[test]
fn vertical_clear_keeps_survivors_in_column_order() {
    let layout = [[1, 0, 2], [2, 1, 0], [0, 2, 1], [0, 1, 2], [1, 0, 2]]
        .iter()
        .map(|row| row.iter().copied().map(TileKindId::new).collect())
        .collect();
    let mut world = WorldBuilder::new(GridConfig {
        columns: 3,
        rows: 5,
        ..config()
    })
    .layout(layout)
    .scripted_refills([1, 2, 0].map(TileKindId::new))
    .build()
    .expect("layout fits the configuration");
    let top = id_at(&world, 0, 0);
    let below = id_at(&world, 0, 1);
    let corner = id_at(&world, 0, 4);
    let neighbour = id_at(&world, 1, 4);
    let mut events = Vec::new();

    let outcome = world::try_swap(&mut world, corner, neighbour, &mut events);
    world::settle(&mut world, &mut events);

    assert_eq!(outcome, SwapOutcome::Applied);
    let falls: Vec<(TileId, CellCoord, CellCoord)> = events
        .iter()
        .filter_map(|event| match event {
            Event::TileMoved {
                tile,
                from,
                to,
                cause: MoveCause::Gravity,
            } => Some((*tile, *from, *to)),
            _ => None,
        })
        .collect();
    assert_eq!(
        falls,
        vec![
            (below, CellCoord::new(0, 1), CellCoord::new(0, 4)),
            (top, CellCoord::new(0, 0), CellCoord::new(0, 3)),
        ]
    );
    assert_eq!(events.last(), Some(&Event::CascadeSettled { passes: 1 }));
    assert!(query::is_stable(&world));
    assert_eq!(
        kind_rows(&world),
        vec![
            vec![1, 0, 2],
            vec![2, 1, 0],
            vec![0, 2, 1],
            vec![1, 1, 2],
            vec![2, 1, 2],
        ]
    );
}
