use crate::config::SimConfig;
use crate::entity::{Food, FoodColor};
use rand::Rng;

/// Density-based food generator: at most one pellet per tick.
#[derive(Clone, Debug, PartialEq)]
pub struct FoodSpawner {
    pub threshold: u32,
    pub roll_max: u32,
    pub width: f64,
    pub height: f64,
    pub max_food: Option<usize>,
}

impl FoodSpawner {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            threshold: config.spawn_threshold,
            roll_max: config.spawn_roll_max,
            width: config.play_area_width,
            height: config.play_area_height,
            max_food: config.max_food,
        }
    }

    /// Long-run fraction of ticks that spawn a pellet.
    pub fn spawn_probability(&self) -> f64 {
        let outcomes = self.roll_max as f64 + 1.0;
        (self.threshold as f64).min(outcomes) / outcomes
    }

    /// Roll once for this tick. The roll is always drawn, even when the food
    /// cap suppresses the spawn, so the RNG stream does not depend on the cap.
    pub fn maybe_spawn<R: Rng + ?Sized>(&self, rng: &mut R, live_food: usize) -> Option<Food> {
        let roll = rng.random_range(0..=self.roll_max);
        if roll >= self.threshold {
            return None;
        }
        if self.max_food.is_some_and(|cap| live_food >= cap) {
            tracing::trace!(live_food, "food cap reached, spawn skipped");
            return None;
        }
        let position = [
            rng.random_range(0.0..self.width),
            rng.random_range(0.0..self.height),
        ];
        Some(Food::new(position, FoodColor::random(rng)))
    }
}
