use crate::geometry::Point;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Display palette for food pellets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FoodColor {
    Red,
    Green,
    Blue,
    Yellow,
    Cyan,
    Magenta,
}

impl FoodColor {
    pub const PALETTE: [FoodColor; 6] = [
        FoodColor::Red,
        FoodColor::Green,
        FoodColor::Blue,
        FoodColor::Yellow,
        FoodColor::Cyan,
        FoodColor::Magenta,
    ];

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::PALETTE[rng.random_range(0..Self::PALETTE.len())]
    }

    pub fn rgb(self) -> [u8; 3] {
        match self {
            FoodColor::Red => [255, 0, 0],
            FoodColor::Green => [0, 255, 0],
            FoodColor::Blue => [0, 0, 255],
            FoodColor::Yellow => [255, 255, 0],
            FoodColor::Cyan => [0, 255, 255],
            FoodColor::Magenta => [255, 0, 255],
        }
    }
}

/// Stationary pellet. Position never changes after spawn.
#[derive(Clone, Debug, PartialEq)]
pub struct Food {
    position: Point,
    pub color: FoodColor,
    pub(crate) alive: bool,
}

impl Food {
    pub fn new(position: Point, color: FoodColor) -> Self {
        Self {
            position,
            color,
            alive: true,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Flags the pellet as eaten. Returns `false` if it was already gone.
    pub(crate) fn consume(&mut self) -> bool {
        std::mem::replace(&mut self.alive, false)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub id: u32,
    pub position: Point,
    pub velocity: Point,
    pub mass: f64,
    pub(crate) alive: bool,
}

impl Cell {
    pub fn new(id: u32, position: Point, mass: f64) -> Self {
        Self {
            id,
            position,
            velocity: [0.0, 0.0],
            mass,
            alive: true,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Collision and display radius; grows linearly with mass.
    pub fn effective_radius(&self, init_radius: f64) -> f64 {
        init_radius + self.mass - 1.0
    }

    /// Reach within which this cell swallows food.
    pub fn interaction_radius(&self, init_radius: f64, factor: f64) -> f64 {
        factor * init_radius + self.mass - 1.0
    }

    /// Advance one fixed step and apply mass decay above `floor`.
    pub fn integrate(&mut self, dt: f64, mass_deficit: f64, floor: f64) {
        self.position[0] += self.velocity[0] * dt;
        self.position[1] += self.velocity[1] * dt;
        if self.mass > floor {
            self.mass = (self.mass * mass_deficit).max(floor);
        }
    }

    /// Marks the cell for reaping and hands back the mass it held.
    pub(crate) fn retire(&mut self) -> f64 {
        self.alive = false;
        std::mem::take(&mut self.mass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;

    #[test]
    fn radius_tracks_mass() {
        let mut cell = Cell::new(0, [0.0, 0.0], 1.0);
        assert_eq!(cell.effective_radius(10.0), 10.0);
        cell.mass = 5.0;
        assert_eq!(cell.effective_radius(10.0), 14.0);
        assert_eq!(cell.interaction_radius(10.0, 1.5), 19.0);
    }

    #[test]
    fn integrate_moves_by_velocity_times_dt() {
        let mut cell = Cell::new(0, [1.0, 2.0], 1.0);
        cell.velocity = [20.0, -10.0];
        cell.integrate(0.05, 0.9995, 1.0);
        assert!((cell.position[0] - 2.0).abs() < 1e-12);
        assert!((cell.position[1] - 1.5).abs() < 1e-12);
    }

    #[test]
    fn baseline_mass_does_not_decay() {
        let mut cell = Cell::new(0, [0.0, 0.0], 1.0);
        for _ in 0..1_000 {
            cell.integrate(0.05, 0.9995, 1.0);
        }
        assert_eq!(cell.mass, 1.0);
    }

    #[test]
    fn sub_baseline_mass_does_not_decay() {
        let mut cell = Cell::new(0, [0.0, 0.0], 0.5);
        cell.integrate(0.05, 0.9995, 1.0);
        assert_eq!(cell.mass, 0.5);
    }

    #[test]
    fn food_is_consumed_once() {
        let mut food = Food::new([3.0, 4.0], FoodColor::Cyan);
        assert!(food.consume());
        assert!(!food.consume());
        assert!(!food.is_alive());
        assert_eq!(food.position(), [3.0, 4.0]);
    }

    #[test]
    fn retire_hands_back_mass() {
        let mut cell = Cell::new(1, [0.0, 0.0], 3.5);
        assert_eq!(cell.retire(), 3.5);
        assert!(!cell.is_alive());
        assert_eq!(cell.mass, 0.0);
    }

    #[test]
    fn random_color_is_deterministic_for_fixed_seed() {
        let mut a = ChaCha12Rng::seed_from_u64(9);
        let mut b = ChaCha12Rng::seed_from_u64(9);
        let xs: Vec<_> = (0..16).map(|_| FoodColor::random(&mut a)).collect();
        let ys: Vec<_> = (0..16).map(|_| FoodColor::random(&mut b)).collect();
        assert_eq!(xs, ys);
    }

    proptest! {
        #[test]
        fn decay_approaches_but_never_crosses_floor(
            mass in 1.0f64..500.0,
            ticks in 1usize..5_000,
        ) {
            let mut cell = Cell::new(0, [0.0, 0.0], mass);
            let mut previous = cell.mass;
            for _ in 0..ticks {
                cell.integrate(0.05, 0.9995, 1.0);
                prop_assert!(cell.mass >= 1.0);
                prop_assert!(cell.mass <= previous);
                previous = cell.mass;
            }
        }
    }
}
