use std::time::Duration;

use match3_core::{CascadePhase, CellCoord, Command, Event, GridConfig};
use match3_system_cascade::{CascadeDriver, Config};
use match3_world::{self as world, query, World};

fn resolving() -> Event {
    Event::CascadePhaseChanged {
        phase: CascadePhase::Resolving,
    }
}

#[test]
fn emits_one_step_per_elapsed_interval() {
    let mut driver = CascadeDriver::new(Config::new(Duration::from_millis(250)));
    let mut commands = Vec::new();

    driver.handle(
        &[
            resolving(),
            Event::TimeAdvanced {
                dt: Duration::from_secs(1),
            },
        ],
        &mut commands,
    );

    assert_eq!(commands, vec![Command::StepCascade; 4]);
}

#[test]
fn carries_partial_intervals_between_calls() {
    let mut driver = CascadeDriver::new(Config::new(Duration::from_millis(100)));
    let mut commands = Vec::new();

    driver.handle(
        &[
            resolving(),
            Event::TimeAdvanced {
                dt: Duration::from_millis(60),
            },
        ],
        &mut commands,
    );
    assert!(commands.is_empty(), "no step before a full interval");

    driver.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_millis(60),
        }],
        &mut commands,
    );
    assert_eq!(commands, vec![Command::StepCascade]);
}

#[test]
fn idle_world_produces_no_steps() {
    let mut driver = CascadeDriver::new(Config::new(Duration::from_millis(10)));
    let mut commands = Vec::new();

    driver.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_secs(5),
        }],
        &mut commands,
    );

    assert!(commands.is_empty());
}

#[test]
fn immediate_driver_settles_a_real_cascade() {
    let mut world = World::new(GridConfig::default(), 8).expect("generation succeeds");
    let Some((first, second)) = query::legal_swaps(&world).into_iter().next() else {
        return;
    };
    let mut driver = CascadeDriver::new(Config::immediate());

    let mut events = Vec::new();
    world::apply(&mut world, Command::SwapTiles { first, second }, &mut events);

    let mut rounds = 0;
    loop {
        let mut commands = Vec::new();
        driver.handle(&events, &mut commands);
        if commands.is_empty() {
            break;
        }
        events.clear();
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
        rounds += 1;
        assert!(rounds < 10_000, "cascade failed to settle");
    }

    assert!(query::is_stable(&world));
    assert!(query::tile_at(&world, CellCoord::new(0, 0)).is_some());
}
