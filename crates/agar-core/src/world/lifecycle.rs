use super::metrics::StepTimings;
use super::{SplitState, World};
use crate::entity::Cell;
use crate::geometry::{self, Point};
use crate::input::TickInput;
use crate::spatial;
use std::time::Instant;

impl World {
    fn next_cell_id(&mut self) -> u32 {
        let id = self.next_cell_id;
        self.next_cell_id = self.next_cell_id.wrapping_add(1);
        id
    }

    /// Indices of live cells in collection order.
    fn live_cell_indices(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter_map(|(idx, c)| c.is_alive().then_some(idx))
            .collect()
    }

    fn clamp_to_play_area(&self, target: Point) -> Point {
        [
            target[0].clamp(0.0, self.config.play_area_width),
            target[1].clamp(0.0, self.config.play_area_height),
        ]
    }

    /// Remove eaten food and retired cells. Returns (food, cells) removed.
    pub(crate) fn prune_dead_entities(&mut self) -> (usize, usize) {
        let food_before = self.food.len();
        let cells_before = self.cells.len();
        self.food.retain(|f| f.is_alive());
        self.cells.retain(|c| c.is_alive());
        (
            food_before - self.food.len(),
            cells_before - self.cells.len(),
        )
    }

    /// Redirect every live cell toward `target`. Overwrites velocity.
    pub(crate) fn step_input_phase(&mut self, target: Point) {
        if !target.iter().all(|v| v.is_finite()) {
            tracing::warn!(?target, "ignoring non-finite move target");
            return;
        }
        let target = self.clamp_to_play_area(target);
        let drag = self.config.drag_speed;
        let max_speed = self.config.max_speed;
        for cell in self.cells.iter_mut().filter(|c| c.is_alive()) {
            let pull = [
                drag * (target[0] - cell.position[0]),
                drag * (target[1] - cell.position[1]),
            ];
            cell.velocity = geometry::rescale_velocity_capped(pull, cell.mass, max_speed);
        }
    }

    /// SINGLE -> SPLIT divides the cell in two; SPLIT -> SINGLE folds the
    /// second cell back into the first. Mass is conserved either way.
    pub(crate) fn step_split_phase(&mut self) {
        let live = self.live_cell_indices();
        match (self.split_state(), live.as_slice()) {
            (SplitState::Single, &[parent_idx]) => {
                let child_id = self.next_cell_id();
                let offset = self.config.split_offset;
                let parent = &mut self.cells[parent_idx];
                let half = parent.mass / 2.0;
                parent.mass = half;
                parent.velocity[0] *= self.config.split_boost;
                parent.velocity[1] *= self.config.split_boost;
                let mut child = Cell::new(
                    child_id,
                    [parent.position[0] + offset[0], parent.position[1] + offset[1]],
                    half,
                );
                let ratio = self.config.split_child_velocity_ratio;
                child.velocity = [parent.velocity[0] * ratio, parent.velocity[1] * ratio];
                tracing::debug!(
                    step = self.step_index,
                    parent = parent.id,
                    child = child_id,
                    mass = half,
                    "cell split"
                );
                self.cells.push(child);
                self.total_splits += 1;
            }
            (SplitState::Split, &[keep_idx, absorb_idx, ..]) => {
                let absorbed = self.cells[absorb_idx].retire();
                let keep = &mut self.cells[keep_idx];
                keep.mass += absorbed;
                tracing::debug!(
                    step = self.step_index,
                    cell = keep.id,
                    mass = keep.mass,
                    "cells merged"
                );
                self.total_merges += 1;
            }
            _ => {
                tracing::warn!(
                    live_cells = live.len(),
                    "split toggle ignored without a controllable cell"
                );
            }
        }
    }

    pub(crate) fn step_spawn_phase(&mut self) {
        let live_food = self.live_food_count();
        if let Some(food) = self.spawner.maybe_spawn(&mut self.rng, live_food) {
            self.food.push(food);
            self.food_spawned_last_step += 1;
            self.total_food_spawned += 1;
        }
    }

    /// Each live pellet within reach of a live cell is eaten by exactly one
    /// cell: the nearest, then the lowest index on an exact tie.
    pub(crate) fn step_consumption_phase(&mut self) {
        if self.food.is_empty() {
            return;
        }
        let tree = spatial::build_food_index(&self.food);
        let init_radius = self.config.init_radius;
        let factor = self.config.consumption_radius_factor;

        let mut claims: Vec<Option<(usize, f64)>> = vec![None; self.food.len()];
        for (cell_idx, cell) in self.cells.iter().enumerate() {
            if !cell.is_alive() {
                continue;
            }
            let reach = cell.interaction_radius(init_radius, factor);
            for (food_idx, dist) in spatial::food_within(&tree, cell.position, reach) {
                let slot = &mut claims[food_idx];
                if slot.is_none_or(|(_, best)| dist < best) {
                    *slot = Some((cell_idx, dist));
                }
            }
        }

        for (food_idx, claim) in claims.into_iter().enumerate() {
            let Some((cell_idx, _)) = claim else {
                continue;
            };
            if self.food[food_idx].consume() {
                self.cells[cell_idx].mass += self.config.food_mass;
                self.food_eaten_last_step += 1;
                self.total_food_eaten += 1;
            }
        }
    }

    pub(crate) fn step_integration_phase(&mut self) {
        let dt = self.config.dt;
        let deficit = self.config.mass_deficit;
        let floor = self.config.decay_floor_mass;
        for cell in self.cells.iter_mut().filter(|c| c.is_alive()) {
            cell.integrate(dt, deficit, floor);
            if !Self::cell_is_finite(cell) {
                tracing::warn!(
                    cell = cell.id,
                    mass = cell.mass,
                    "retiring cell with non-finite state"
                );
                cell.retire();
            }
        }
    }

    pub fn step(&mut self, input: &TickInput) -> StepTimings {
        let total_start = Instant::now();
        self.step_index = self.step_index.saturating_add(1);
        self.food_eaten_last_step = 0;
        self.food_spawned_last_step = 0;

        let t0 = Instant::now();
        if let Some(target) = input.move_target {
            self.step_input_phase(target);
        }
        if input.toggle_split {
            self.step_split_phase();
        }
        let input_us = t0.elapsed().as_micros() as u64;

        let t1 = Instant::now();
        self.step_spawn_phase();
        let spawn_us = t1.elapsed().as_micros() as u64;

        let t2 = Instant::now();
        self.step_consumption_phase();
        let consumption_us = t2.elapsed().as_micros() as u64;

        let t3 = Instant::now();
        self.step_integration_phase();
        self.prune_dead_entities();
        let integration_us = t3.elapsed().as_micros() as u64;

        debug_assert!(
            self.cells.len() <= 2,
            "player controls at most two cells (got {})",
            self.cells.len()
        );
        tracing::trace!(
            step = self.step_index,
            cells = self.cells.len(),
            food = self.food.len(),
            eaten = self.food_eaten_last_step,
            "tick complete"
        );

        StepTimings {
            input_us,
            spawn_us,
            consumption_us,
            integration_us,
            total_us: total_start.elapsed().as_micros() as u64,
        }
    }
}
