use agar_core::entity::{Cell, Food, FoodColor};
use agar_core::input::{Command, InputScript, TickInput};
use agar_core::world::World;
use agar_core::SimConfig;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::time::Instant;

fn create_food(config: &SimConfig, count: usize) -> Vec<Food> {
    let mut rng = ChaCha12Rng::seed_from_u64(config.seed);
    (0..count)
        .map(|_| {
            let pos = [
                rng.random::<f64>() * config.play_area_width,
                rng.random::<f64>() * config.play_area_height,
            ];
            Food::new(pos, FoodColor::random(&mut rng))
        })
        .collect()
}

fn create_world(config: &SimConfig, food_count: usize) -> World {
    let center = [config.play_area_width / 2.0, config.play_area_height / 2.0];
    let cell = Cell::new(0, center, 60.0);
    World::try_from_parts(config.clone(), vec![cell], create_food(config, food_count))
        .expect("benchmark config is valid")
}

fn main() {
    let food_count = 50_000;
    println!("Benchmarking with {} pre-seeded food pellets", food_count);

    let config = SimConfig {
        play_area_width: 20_000.0,
        play_area_height: 20_000.0,
        seed: 42,
        ..SimConfig::default()
    };

    let mut world1 = create_world(&config, food_count);
    let mut world2 = create_world(&config, food_count);

    let steps = 200;
    let mut script = InputScript::new();
    script.push(1, Command::SetMoveTarget { x: 0.0, y: 0.0 });
    script.push(steps / 2, Command::ToggleSplit);

    // Run WITHOUT metrics
    let start = Instant::now();
    let mut consumption_us = 0u64;
    for step in 1..=steps {
        let input: TickInput = script.input_for(step);
        consumption_us += world1.step(&input).consumption_us;
    }
    let duration_no_metrics = start.elapsed();
    println!("Time for {} steps WITHOUT metrics: {:?}", steps, duration_no_metrics);
    println!("Avg time per step (no metrics): {:?}", duration_no_metrics / steps as u32);
    println!("Avg consumption phase: {} us", consumption_us / steps as u64);

    // Run WITH metrics (every step)
    let start = Instant::now();
    world2.run_experiment(steps, 1, &script);
    let duration_metrics = start.elapsed();

    println!("Time for {} steps WITH metrics: {:?}", steps, duration_metrics);
    println!("Avg time per step (with metrics): {:?}", duration_metrics / steps as u32);

    let diff = duration_metrics.saturating_sub(duration_no_metrics);
    println!("Total metrics overhead: {:?}", diff);
    println!("Avg metrics overhead per step: {:?}", diff / steps as u32);
}
