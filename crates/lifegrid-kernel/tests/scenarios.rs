//! End-to-end behavior of the simulation core with default parameters.

use lifegrid_kernel::prelude::*;

fn core_without_movement() -> SimulationCore {
    let mut settings = SimulationSettings::default();
    settings.enable_movement = false;
    SimulationCore::new(settings)
}

#[test]
fn test_single_cell_dies() {
    let mut core = SimulationCore::new(SimulationSettings::default());
    core.set_cell_alive(5, 5, 1.5, 0);
    core.tick();

    assert!(!core.is_alive(5, 5));
    assert_eq!(core.population(), 0);
}

#[test]
fn test_block_is_stable_and_gains_energy() {
    let mut core = SimulationCore::new(SimulationSettings::default());
    let block = [(0, 0), (1, 0), (0, 1), (1, 1)];
    for (x, y) in block {
        core.set_cell_alive(x, y, 1.5, 0);
    }
    core.tick();

    for (x, y) in block {
        assert!(core.is_alive(x, y));
        assert!((core.energy(x, y) - 1.75).abs() < 1e-4);
        assert_eq!(core.age(x, y), 1);
    }
    assert_eq!(core.population(), 4);
}

#[test]
fn test_birth_next_to_three_strong_cells() {
    let mut core = core_without_movement();
    // (2,2) has exactly three live neighbors and five free slots
    for (x, y) in [(1, 1), (2, 1), (3, 1)] {
        core.set_cell_alive(x, y, 1.2, 0);
    }
    core.tick();

    assert!(core.is_alive(2, 2));
    assert!((core.energy(2, 2) - 1.5).abs() < f32::EPSILON);
    assert_eq!(core.age(2, 2), 0);
}

#[test]
fn test_emptied_region_leaves_active_chunks() {
    let mut core = SimulationCore::new(SimulationSettings::default());
    core.set_cell_alive(1000, 1000, 1.5, 0);
    core.set_cell_alive(0, 0, 1.5, 0);
    assert_eq!(
        core.active_chunks(),
        vec![ChunkCoord::new(0, 0), ChunkCoord::new(3, 3)]
    );

    core.tick();
    assert!(core.active_chunks().is_empty());
}

#[test]
fn test_reset_clears_everything() {
    let mut core = SimulationCore::new(SimulationSettings::default());
    Preset::Random.apply(&mut core, &SeedOptions::default());
    core.tick();
    core.tick();
    core.reset();

    assert_eq!(core.tick_count(), 0);
    assert_eq!(core.population(), 0);
    assert!(core.active_chunks().is_empty());
}

#[test]
fn test_isolation_death_across_chunks() {
    let mut settings = SimulationSettings::with_chunk_size(8);
    settings.enable_movement = false;
    let mut core = SimulationCore::new(settings);
    for (x, y) in [(-20, -20), (7, 7), (8, 8 + 5)] {
        core.set_cell_alive(x, y, 5.0, 3);
    }
    core.tick();
    assert_eq!(core.population(), 0);
}

#[test]
fn test_chunk_lifecycle() {
    let mut core = SimulationCore::new(SimulationSettings::with_chunk_size(16));
    core.set_cell_alive(3, 3, 2.0, 9);
    core.set_cell_dead(3, 3);
    assert!(core.world().try_get_chunk(ChunkCoord::new(0, 0)).is_none());

    core.set_cell_alive(4, 4, 1.0, 0);
    let chunk = core
        .world()
        .try_get_chunk(ChunkCoord::new(0, 0))
        .expect("chunk recreated");
    let old = chunk.index(3, 3);
    assert!(!chunk.is_alive(old));
    assert_eq!(chunk.energy(old), 0.0);
    assert_eq!(chunk.age(old), 0);
    assert_eq!(chunk.live_count(), 1);
}

#[test]
fn test_drifting_chunk_stays_dirty() {
    let mut core = core_without_movement();
    for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
        core.set_cell_alive(x, y, 1.5, 0);
    }
    // A block gains energy every tick, so its chunk is never pruned
    for _ in 0..5 {
        core.tick();
        assert_eq!(core.dirty_chunks(), vec![ChunkCoord::new(0, 0)]);
    }
}

#[test]
fn test_balanced_chunk_goes_quiet() {
    let mut settings = SimulationSettings::default();
    settings.enable_movement = false;
    settings.gain_free = 0.0;
    settings.cost_alive = 0.0;
    settings.cost_crowd = 0.0;
    let mut core = SimulationCore::new(settings);
    for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
        core.set_cell_alive(x, y, 1.5, 0);
    }

    core.tick();
    assert!(core.dirty_chunks().is_empty());
    assert_eq!(core.age(0, 0), 1);

    // Nothing dirty: the next tick recomputes every populated chunk
    core.tick();
    assert_eq!(core.age(0, 0), 2);
    assert_eq!(core.population(), 4);
}

#[test]
fn test_movement_never_doubles_up() {
    let options = SeedOptions {
        seed: 7,
        density: 0.6,
        spread: 12,
    };
    let mut settings = SimulationSettings::with_chunk_size(8);
    settings.enable_movement = false;
    let mut still = SimulationCore::new(settings.clone());
    settings.enable_movement = true;
    settings.move_stress_threshold = 4;
    let mut moving = SimulationCore::new(settings);

    Preset::Random.apply(&mut still, &options);
    Preset::Random.apply(&mut moving, &options);
    still.tick();
    moving.tick();

    // Movement only relocates cells; a collision would lose one
    assert_eq!(moving.population(), still.population());
    assert!(check_world(moving.world(), moving.tick_count()).is_clean());
}

#[test]
fn test_notification_after_tick() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let mut core = SimulationCore::new(SimulationSettings::default());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    let id = core.subscribe(move || log.borrow_mut().push("changed"));

    core.tick();
    core.reset();
    assert!(core.unsubscribe(id));
    core.tick();
    assert_eq!(seen.borrow().len(), 2);
}
