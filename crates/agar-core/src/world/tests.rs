use super::*;
use crate::entity::FoodColor;
use crate::geometry;
use crate::input::{Command, TickInput};

fn quiet_config() -> SimConfig {
    SimConfig {
        spawn_threshold: 0,
        ..SimConfig::default()
    }
}

fn world_with(cells: Vec<Cell>, food: Vec<Food>) -> World {
    World::try_from_parts(quiet_config(), cells, food).expect("valid fixture")
}

fn cell_at(id: u32, position: [f64; 2], mass: f64) -> Cell {
    Cell::new(id, position, mass)
}

fn pellet(position: [f64; 2]) -> Food {
    Food::new(position, FoodColor::Green)
}

#[test]
fn new_world_has_single_baseline_cell_at_origin() {
    let world = World::new(SimConfig::default());
    assert_eq!(world.cells().len(), 1);
    assert_eq!(world.cells()[0].position, [0.0, 0.0]);
    assert_eq!(world.cells()[0].mass, 1.0);
    assert!(world.food().is_empty());
    assert!(world.single_cell());
}

#[test]
fn split_conserves_mass_and_boosts_parent() {
    let mut parent = cell_at(0, [100.0, 100.0], 8.0);
    parent.velocity = [10.0, -5.0];
    let mut world = world_with(vec![parent], Vec::new());

    world.step_split_phase();

    assert_eq!(world.split_state(), SplitState::Split);
    assert!(!world.single_cell());
    let cells = world.cells();
    assert_eq!(cells.len(), 2);
    assert!((cells[0].mass + cells[1].mass - 8.0).abs() < 1e-12);
    assert_eq!(cells[0].mass, 4.0);
    assert!((cells[0].velocity[0] - 12.0).abs() < 1e-12);
    assert!((cells[0].velocity[1] + 6.0).abs() < 1e-12);
    assert!((cells[1].velocity[0] - 6.0).abs() < 1e-12);
    assert!((cells[1].velocity[1] + 3.0).abs() < 1e-12);
    assert_eq!(cells[1].position, [101.0, 101.0]);
    assert_ne!(cells[0].id, cells[1].id);
}

#[test]
fn merge_conserves_mass_and_reaps_second_cell() {
    let mut world = world_with(
        vec![cell_at(0, [10.0, 10.0], 3.0), cell_at(1, [40.0, 10.0], 2.5)],
        Vec::new(),
    );
    assert!(!world.single_cell());

    world.step_split_phase();
    assert!(world.single_cell(), "merge takes effect immediately");
    assert_eq!(world.cells().len(), 2, "absorbed cell lingers until reaping");
    assert_eq!(world.cells()[0].mass, 5.5);

    world.prune_dead_entities();
    assert_eq!(world.cells().len(), 1);
    assert_eq!(world.cells()[0].id, 0);
    assert_eq!(world.total_mass(), 5.5);
}

#[test]
fn merged_away_cell_does_not_eat_in_the_same_tick() {
    let mut world = world_with(
        vec![cell_at(0, [10.0, 10.0], 1.0), cell_at(1, [500.0, 500.0], 1.0)],
        vec![pellet([502.0, 500.0])],
    );
    world.step(&TickInput::toggle());
    assert_eq!(world.cells().len(), 1);
    assert_eq!(world.food().len(), 1, "pellet near the absorbed cell survives");
    assert_eq!(world.total_food_eaten, 0);
}

#[test]
fn food_within_reach_is_eaten_and_far_food_is_untouched() {
    let mut world = world_with(
        vec![cell_at(0, [200.0, 200.0], 5.0)],
        vec![pellet([210.0, 200.0]), pellet([250.0, 200.0])],
    );
    assert_eq!(world.cells()[0].effective_radius(10.0), 14.0);

    world.step_consumption_phase();
    assert_eq!(world.cells()[0].mass, 6.0);
    assert!(!world.food()[0].is_alive());
    assert!(world.food()[1].is_alive());
    assert_eq!(world.food().len(), 2, "dead food is only flagged before reaping");

    world.prune_dead_entities();
    assert_eq!(world.food().len(), 1);
    assert_eq!(world.food()[0].position(), [250.0, 200.0]);
}

#[test]
fn full_tick_applies_decay_after_eating() {
    let mut world = world_with(
        vec![cell_at(0, [200.0, 200.0], 5.0)],
        vec![pellet([210.0, 200.0])],
    );
    world.step(&TickInput::default());
    assert!((world.cells()[0].mass - 6.0 * 0.9995).abs() < 1e-12);
    assert!(world.food().is_empty());
    assert_eq!(world.food_eaten_last_step, 1);
}

#[test]
fn contested_food_is_credited_once_to_nearest_cell() {
    let mut world = world_with(
        vec![cell_at(0, [100.0, 100.0], 1.0), cell_at(1, [110.0, 100.0], 1.0)],
        vec![pellet([107.0, 100.0])],
    );
    world.step_consumption_phase();
    assert_eq!(world.cells()[0].mass, 1.0);
    assert_eq!(world.cells()[1].mass, 2.0);
    assert_eq!(world.total_food_eaten, 1);
}

#[test]
fn exact_tie_goes_to_first_cell() {
    let mut world = world_with(
        vec![cell_at(0, [100.0, 100.0], 1.0), cell_at(1, [110.0, 100.0], 1.0)],
        vec![pellet([105.0, 100.0])],
    );
    world.step_consumption_phase();
    assert_eq!(world.cells()[0].mass, 2.0);
    assert_eq!(world.cells()[1].mass, 1.0);
}

#[test]
fn reaping_twice_is_a_no_op() {
    let mut world = world_with(
        vec![cell_at(0, [0.0, 0.0], 2.0), cell_at(1, [50.0, 50.0], 2.0)],
        vec![pellet([3.0, 0.0]), pellet([600.0, 600.0])],
    );
    world.step_split_phase();
    world.step_consumption_phase();
    assert_eq!(world.prune_dead_entities(), (1, 1));
    let cells = world.cells().to_vec();
    let food = world.food().to_vec();
    assert_eq!(world.prune_dead_entities(), (0, 0));
    assert_eq!(world.cells(), cells.as_slice());
    assert_eq!(world.food(), food.as_slice());
}

#[test]
fn move_target_overwrites_velocity_and_respects_cap() {
    let mut moving = cell_at(0, [0.0, 0.0], 1.0);
    moving.velocity = [-7.0, 3.0];
    let mut world = world_with(vec![moving], Vec::new());
    world.step_input_phase([30.0, 40.0]);
    let v = world.cells()[0].velocity;
    assert!((v[0] - 6.0).abs() < 1e-12);
    assert!((v[1] - 8.0).abs() < 1e-12);

    world.step_input_phase([1000.0, 0.0]);
    let v = world.cells()[0].velocity;
    let cap = geometry::speed_cap(1.0, geometry::MAX_SPEED);
    assert!((geometry::speed(v) - cap).abs() < 1e-9);
    assert!(v[1].abs() < 1e-12);
}

#[test]
fn move_target_is_clamped_to_play_area() {
    let mut world = world_with(vec![cell_at(0, [990.0, 10.0], 1.0)], Vec::new());
    world.step_input_phase([5000.0, -50.0]);
    let v = world.cells()[0].velocity;
    assert!((v[0] - 2.0).abs() < 1e-12);
    assert!((v[1] + 2.0).abs() < 1e-12);
}

#[test]
fn non_finite_move_target_is_ignored() {
    let mut moving = cell_at(0, [0.0, 0.0], 1.0);
    moving.velocity = [1.0, 1.0];
    let mut world = world_with(vec![moving], Vec::new());
    world.step(&TickInput::move_to(f64::NAN, 3.0));
    assert_eq!(world.cells()[0].velocity, [1.0, 1.0]);
}

#[test]
fn every_live_cell_follows_the_target() {
    let mut world = world_with(
        vec![cell_at(0, [0.0, 0.0], 1.0), cell_at(1, [10.0, 0.0], 1.0)],
        Vec::new(),
    );
    world.step_input_phase([20.0, 0.0]);
    assert!((world.cells()[0].velocity[0] - 4.0).abs() < 1e-12);
    assert!((world.cells()[1].velocity[0] - 2.0).abs() < 1e-12);
    assert_eq!(world.cells()[1].velocity[1], 0.0);
}

#[test]
fn mass_decays_toward_floor_without_crossing() {
    let mut world = world_with(vec![cell_at(0, [0.0, 0.0], 40.0)], Vec::new());
    for _ in 0..50_000 {
        world.step(&TickInput::default());
        assert!(world.cells()[0].mass >= 1.0);
    }
    assert!(world.cells()[0].mass < 1.01);
}

#[test]
fn end_to_end_move_split_merge() {
    let mut world = World::new(quiet_config());

    world.step(&TickInput::move_to(100.0, 0.0));
    let cell = &world.cells()[0];
    assert!((cell.velocity[0] - 20.0).abs() < 1e-12);
    assert_eq!(cell.velocity[1], 0.0);
    assert!((cell.position[0] - 1.0).abs() < 1e-12);
    assert_eq!(cell.position[1], 0.0);

    let before = world.total_mass();
    world.step(&TickInput::toggle());
    assert_eq!(world.cells().len(), 2);
    assert!(!world.single_cell());
    assert!((world.total_mass() - before).abs() < 1e-12);

    world.step(&TickInput::toggle());
    assert_eq!(world.cells().len(), 1);
    assert!(world.single_cell());
    assert!((world.cells()[0].mass - before).abs() < 1e-12);
    assert_eq!(world.total_splits, 1);
    assert_eq!(world.total_merges, 1);
}

#[test]
fn same_seed_and_script_replay_identically() {
    let mut script = InputScript::new();
    for tick in (1..3_000).step_by(97) {
        let x = (tick * 37 % 1000) as f64;
        let y = (tick * 13 % 720) as f64;
        script.push(tick, Command::SetMoveTarget { x, y });
    }
    for tick in (50..3_000).step_by(400) {
        script.push(tick, Command::ToggleSplit);
    }
    let config = SimConfig {
        seed: 77,
        ..SimConfig::default()
    };
    let mut a = World::new(config.clone());
    let mut b = World::new(config);
    a.run_experiment(3_000, 500, &script);
    b.run_experiment(3_000, 500, &script);
    assert_eq!(a.snapshot(), b.snapshot());
    assert!(!a.food().is_empty(), "default spawner should have produced food");
}

#[test]
fn split_state_matches_cell_count_across_toggles() {
    let mut world = World::new(quiet_config());
    for i in 0..20 {
        world.step(&TickInput::toggle());
        let expected = if i % 2 == 0 { 2 } else { 1 };
        assert_eq!(world.cells().len(), expected);
        assert_eq!(world.single_cell(), expected == 1);
    }
}

#[test]
fn food_cap_limits_live_food() {
    let config = SimConfig {
        spawn_threshold: 101,
        max_food: Some(25),
        initial_position: [999.0, 719.0],
        ..SimConfig::default()
    };
    let mut world = World::new(config);
    for _ in 0..200 {
        world.step(&TickInput::default());
        assert!(world.food().len() <= 25);
    }
}

#[test]
fn snapshot_reports_radii_and_optional_label() {
    let config = SimConfig {
        spawn_threshold: 0,
        show_mass_label: true,
        ..SimConfig::default()
    };
    let world = World::try_from_parts(
        config,
        vec![cell_at(0, [5.0, 5.0], 7.9)],
        vec![pellet([300.0, 300.0])],
    )
    .unwrap();
    let snap = world.snapshot();
    assert_eq!(snap.mass_label, Some(7));
    assert!((snap.cells[0].radius - 16.9).abs() < 1e-12);
    assert_eq!(snap.food[0].radius, 5.0);
    assert_eq!(snap.food[0].color, FoodColor::Green);

    let hidden = world_with(vec![cell_at(0, [5.0, 5.0], 7.9)], Vec::new()).snapshot();
    assert_eq!(hidden.mass_label, None);
}

#[test]
fn from_parts_rejects_bad_cell_counts() {
    assert_eq!(
        World::try_from_parts(quiet_config(), Vec::new(), Vec::new()).err(),
        Some(WorldInitError::InvalidCellCount { actual: 0 })
    );
    let three = (0..3).map(|i| cell_at(i, [0.0, 0.0], 1.0)).collect();
    assert_eq!(
        World::try_from_parts(quiet_config(), three, Vec::new()).err(),
        Some(WorldInitError::InvalidCellCount { actual: 3 })
    );
}

#[test]
fn from_parts_rejects_non_finite_cells() {
    let bad = cell_at(4, [0.0, f64::INFINITY], 1.0);
    assert_eq!(
        World::try_from_parts(quiet_config(), vec![bad], Vec::new()).err(),
        Some(WorldInitError::NonFiniteCell { id: 4 })
    );
}

#[test]
fn invalid_config_is_reported_with_source() {
    let config = SimConfig {
        init_radius: -1.0,
        ..SimConfig::default()
    };
    let err = World::try_new(config).err().expect("invalid config");
    assert!(matches!(err, WorldInitError::Config(_)));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn set_config_rebuilds_spawner() {
    let mut world = World::new(quiet_config());
    world
        .set_config(SimConfig {
            spawn_threshold: 101,
            ..SimConfig::default()
        })
        .unwrap();
    world.step(&TickInput::default());
    assert_eq!(world.food_spawned_last_step, 1);

    let bad = SimConfig {
        dt: f64::NAN,
        ..SimConfig::default()
    };
    assert!(world.set_config(bad).is_err());
    assert_eq!(world.config().spawn_threshold, 101);
}

#[test]
fn experiment_rejects_zero_sample_interval() {
    let mut world = World::new(quiet_config());
    assert_eq!(
        world
            .try_run_experiment(10, 0, &InputScript::new())
            .err(),
        Some(ExperimentError::InvalidSampleEvery)
    );
}

#[test]
fn experiment_rejects_excessive_steps() {
    let mut world = World::new(quiet_config());
    let steps = World::MAX_EXPERIMENT_STEPS + 1;
    assert_eq!(
        world.try_run_experiment(steps, steps, &InputScript::new()).err(),
        Some(ExperimentError::TooManySteps {
            max: World::MAX_EXPERIMENT_STEPS,
            actual: steps
        })
    );
}

#[test]
fn experiment_samples_on_interval_and_final_step() {
    let mut world = World::new(SimConfig::default());
    let mut script = InputScript::new();
    script.push(1, Command::SetMoveTarget { x: 500.0, y: 360.0 });
    script.push(10, Command::ToggleSplit);
    let summary = world.run_experiment(25, 10, &script);
    let steps: Vec<usize> = summary.samples.iter().map(|s| s.step).collect();
    assert_eq!(steps, vec![10, 20, 25]);
    assert_eq!(summary.total_splits, 1);
    assert_eq!(summary.final_split_state, SplitState::Split);
    assert_eq!(summary.samples[0].cell_count, 2);

    let json = serde_json::to_string(&summary).unwrap();
    let back: RunSummary = serde_json::from_str(&json).unwrap();
    assert_eq!(back.samples.len(), 3);
    assert_eq!(back.seed, 42);
}
