use super::{SplitState, World};
use crate::entity::FoodColor;
use crate::geometry::{self, Point};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug)]
pub struct StepTimings {
    pub input_us: u64,
    pub spawn_us: u64,
    pub consumption_us: u64,
    pub integration_us: u64,
    pub total_us: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepMetrics {
    pub step: usize,
    pub cell_count: usize,
    pub food_count: usize,
    pub total_mass: f64,
    pub largest_mass: f64,
    pub mean_speed: f64,
    pub food_eaten: usize,
    pub food_spawned: usize,
    pub split_state: SplitState,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub steps: usize,
    pub sample_every: usize,
    pub seed: u64,
    pub samples: Vec<StepMetrics>,
    #[serde(default)]
    pub total_food_eaten: usize,
    #[serde(default)]
    pub total_food_spawned: usize,
    #[serde(default)]
    pub total_splits: usize,
    #[serde(default)]
    pub total_merges: usize,
    pub final_mass: f64,
    pub final_split_state: SplitState,
}

/// What a renderer needs to draw one pellet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoodView {
    pub position: Point,
    pub radius: f64,
    pub color: FoodColor,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellView {
    pub id: u32,
    pub position: Point,
    pub radius: f64,
}

/// Read-only copy of the drawable state after a tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub step: usize,
    pub food: Vec<FoodView>,
    pub cells: Vec<CellView>,
    /// Truncated mass of the controlling cell, when the label is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mass_label: Option<u32>,
}

impl World {
    pub fn snapshot(&self) -> Snapshot {
        let init_radius = self.config.init_radius;
        let food_radius = self.config.food_radius();
        let food = self
            .food
            .iter()
            .filter(|f| f.is_alive())
            .map(|f| FoodView {
                position: f.position(),
                radius: food_radius,
                color: f.color,
            })
            .collect();
        let live_cells: Vec<_> = self.cells.iter().filter(|c| c.is_alive()).collect();
        let cells = live_cells
            .iter()
            .map(|c| CellView {
                id: c.id,
                position: c.position,
                radius: c.effective_radius(init_radius),
            })
            .collect();
        let mass_label = if self.config.show_mass_label {
            live_cells.first().map(|c| c.mass.max(0.0) as u32)
        } else {
            None
        };
        Snapshot {
            step: self.step_index,
            food,
            cells,
            mass_label,
        }
    }

    /// Metrics for the state reached after the most recent tick.
    pub fn metrics(&self) -> StepMetrics {
        self.collect_step_metrics(self.step_index)
    }

    pub(crate) fn collect_step_metrics(&self, step: usize) -> StepMetrics {
        let mut cell_count = 0usize;
        let mut total_mass = 0.0f64;
        let mut largest_mass = 0.0f64;
        let mut speed_sum = 0.0f64;
        for cell in self.cells.iter().filter(|c| c.is_alive()) {
            cell_count += 1;
            total_mass += cell.mass;
            largest_mass = largest_mass.max(cell.mass);
            speed_sum += geometry::speed(cell.velocity);
        }
        StepMetrics {
            step,
            cell_count,
            food_count: self.live_food_count(),
            total_mass,
            largest_mass,
            mean_speed: speed_sum / cell_count.max(1) as f64,
            food_eaten: self.food_eaten_last_step,
            food_spawned: self.food_spawned_last_step,
            split_state: self.split_state(),
        }
    }
}
