pub mod lifecycle;
pub mod metrics;
#[cfg(test)]
mod tests;

pub use metrics::*;

use crate::config::{SimConfig, SimConfigError};
use crate::entity::{Cell, Food};
use crate::input::InputScript;
use crate::spawner::FoodSpawner;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

/// Whether the player currently controls one cell or two.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SplitState {
    Single,
    Split,
}

pub struct World {
    pub(crate) cells: Vec<Cell>,
    pub(crate) food: Vec<Food>,
    pub(crate) config: SimConfig,
    pub(crate) spawner: FoodSpawner,
    pub(crate) rng: ChaCha12Rng,
    pub(crate) next_cell_id: u32,
    pub(crate) step_index: usize,
    pub(crate) food_eaten_last_step: usize,
    pub(crate) food_spawned_last_step: usize,
    pub(crate) total_food_eaten: usize,
    pub(crate) total_food_spawned: usize,
    pub(crate) total_splits: usize,
    pub(crate) total_merges: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorldInitError {
    Config(SimConfigError),
    InvalidCellCount { actual: usize },
    NonFiniteCell { id: u32 },
}

impl fmt::Display for WorldInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldInitError::Config(e) => write!(f, "{}", e),
            WorldInitError::InvalidCellCount { actual } => {
                write!(f, "player must control one or two live cells (got {actual})")
            }
            WorldInitError::NonFiniteCell { id } => {
                write!(f, "cell {id} has a non-finite position, velocity or mass")
            }
        }
    }
}

impl From<SimConfigError> for WorldInitError {
    fn from(err: SimConfigError) -> Self {
        WorldInitError::Config(err)
    }
}

impl Error for WorldInitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WorldInitError::Config(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExperimentError {
    InvalidSampleEvery,
    TooManySteps { max: usize, actual: usize },
    TooManySamples { max: usize, actual: usize },
}

impl fmt::Display for ExperimentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExperimentError::InvalidSampleEvery => write!(f, "sample_every must be positive"),
            ExperimentError::TooManySteps { max, actual } => {
                write!(f, "steps ({actual}) exceed supported maximum ({max})")
            }
            ExperimentError::TooManySamples { max, actual } => {
                write!(
                    f,
                    "sample count ({actual}) exceeds supported maximum ({max})"
                )
            }
        }
    }
}

impl Error for ExperimentError {}

impl World {
    pub const MAX_EXPERIMENT_STEPS: usize = 10_000_000;
    pub const MAX_EXPERIMENT_SAMPLES: usize = 50_000;

    pub fn new(config: SimConfig) -> Self {
        Self::try_new(config).unwrap_or_else(|e| panic!("{e}"))
    }

    /// Fresh world: one cell at `initial_position` with `initial_mass`, no food.
    pub fn try_new(config: SimConfig) -> Result<Self, WorldInitError> {
        let cell = Cell::new(0, config.initial_position, config.initial_mass);
        Self::try_from_parts(config, vec![cell], Vec::new())
    }

    /// Resume from explicit entity state, e.g. a hand-built test fixture.
    pub fn try_from_parts(
        config: SimConfig,
        cells: Vec<Cell>,
        food: Vec<Food>,
    ) -> Result<Self, WorldInitError> {
        config.validate()?;
        let live = cells.iter().filter(|c| c.is_alive()).count();
        if !(1..=2).contains(&live) {
            return Err(WorldInitError::InvalidCellCount { actual: live });
        }
        if let Some(bad) = cells.iter().find(|c| !Self::cell_is_finite(c)) {
            return Err(WorldInitError::NonFiniteCell { id: bad.id });
        }
        let next_cell_id = cells
            .iter()
            .map(|c| c.id)
            .max()
            .map_or(0, |id| id.saturating_add(1));

        let mut world = Self {
            cells,
            food,
            spawner: FoodSpawner::from_config(&config),
            rng: ChaCha12Rng::seed_from_u64(config.seed),
            config,
            next_cell_id,
            step_index: 0,
            food_eaten_last_step: 0,
            food_spawned_last_step: 0,
            total_food_eaten: 0,
            total_food_spawned: 0,
            total_splits: 0,
            total_merges: 0,
        };
        world.prune_dead_entities();
        Ok(world)
    }

    pub(crate) fn cell_is_finite(cell: &Cell) -> bool {
        cell.mass.is_finite()
            && cell.position.iter().all(|v| v.is_finite())
            && cell.velocity.iter().all(|v| v.is_finite())
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Swap parameters mid-run. Entity state and the RNG stream are kept.
    pub fn set_config(&mut self, config: SimConfig) -> Result<(), WorldInitError> {
        config.validate()?;
        self.spawner = FoodSpawner::from_config(&config);
        self.config = config;
        Ok(())
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn food(&self) -> &[Food] {
        &self.food
    }

    pub fn step_index(&self) -> usize {
        self.step_index
    }

    pub fn live_cell_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_alive()).count()
    }

    pub fn live_food_count(&self) -> usize {
        self.food.iter().filter(|f| f.is_alive()).count()
    }

    /// Derived from the live cell count so it can never drift from the
    /// collection itself.
    pub fn split_state(&self) -> SplitState {
        if self.live_cell_count() >= 2 {
            SplitState::Split
        } else {
            SplitState::Single
        }
    }

    pub fn single_cell(&self) -> bool {
        self.split_state() == SplitState::Single
    }

    pub fn total_mass(&self) -> f64 {
        self.cells
            .iter()
            .filter(|c| c.is_alive())
            .map(|c| c.mass)
            .sum()
    }

    pub fn run_experiment(
        &mut self,
        steps: usize,
        sample_every: usize,
        script: &InputScript,
    ) -> RunSummary {
        self.try_run_experiment(steps, sample_every, script)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    /// Drive `steps` ticks, feeding `script` (ticks counted from 1 relative
    /// to the start of this run) and sampling metrics every `sample_every`
    /// ticks plus the final tick.
    pub fn try_run_experiment(
        &mut self,
        steps: usize,
        sample_every: usize,
        script: &InputScript,
    ) -> Result<RunSummary, ExperimentError> {
        if sample_every == 0 {
            return Err(ExperimentError::InvalidSampleEvery);
        }
        if steps > Self::MAX_EXPERIMENT_STEPS {
            return Err(ExperimentError::TooManySteps {
                max: Self::MAX_EXPERIMENT_STEPS,
                actual: steps,
            });
        }
        let estimated_samples = if steps == 0 {
            0
        } else {
            ((steps - 1) / sample_every) + 1
        };
        if estimated_samples > Self::MAX_EXPERIMENT_SAMPLES {
            return Err(ExperimentError::TooManySamples {
                max: Self::MAX_EXPERIMENT_SAMPLES,
                actual: estimated_samples,
            });
        }

        let eaten_before = self.total_food_eaten;
        let spawned_before = self.total_food_spawned;
        let splits_before = self.total_splits;
        let merges_before = self.total_merges;
        let mut samples = Vec::with_capacity(estimated_samples);
        for step in 1..=steps {
            self.step(&script.input_for(step));
            if step % sample_every == 0 || step == steps {
                samples.push(self.collect_step_metrics(step));
            }
        }
        tracing::debug!(
            steps,
            samples = samples.len(),
            final_mass = self.total_mass(),
            "experiment finished"
        );
        Ok(RunSummary {
            schema_version: 1,
            steps,
            sample_every,
            seed: self.config.seed,
            samples,
            total_food_eaten: self.total_food_eaten - eaten_before,
            total_food_spawned: self.total_food_spawned - spawned_before,
            total_splits: self.total_splits - splits_before,
            total_merges: self.total_merges - merges_before,
            final_mass: self.total_mass(),
            final_split_state: self.split_state(),
        })
    }
}
