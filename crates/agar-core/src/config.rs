use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

/// Simulation parameters. Defaults reproduce the classic single-player game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub seed: u64,
    /// Radius of a cell at mass 1. Food radius is half of this.
    pub init_radius: f64,
    /// Nominal time covered by one tick.
    pub dt: f64,
    /// Velocity gain applied to the offset between target and cell.
    pub drag_speed: f64,
    pub max_speed: f64,
    /// Per-tick multiplicative mass decay for cells above `decay_floor_mass`.
    pub mass_deficit: f64,
    pub decay_floor_mass: f64,
    pub initial_mass: f64,
    pub initial_position: [f64; 2],
    /// Food is eaten when its center is within
    /// `consumption_radius_factor * init_radius + mass - 1` of a cell center.
    pub consumption_radius_factor: f64,
    pub food_mass: f64,
    /// A uniform roll in `0..=spawn_roll_max` below this spawns one food.
    pub spawn_threshold: u32,
    pub spawn_roll_max: u32,
    pub max_food: Option<usize>,
    pub play_area_width: f64,
    pub play_area_height: f64,
    pub split_offset: [f64; 2],
    pub split_boost: f64,
    pub split_child_velocity_ratio: f64,
    pub show_mass_label: bool,
    /// Rate at which a realtime driver should call `World::step`.
    pub tick_rate_hz: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            init_radius: 10.0,
            dt: 0.05,
            drag_speed: 0.2,
            max_speed: crate::geometry::MAX_SPEED,
            mass_deficit: 0.9995,
            decay_floor_mass: 1.0,
            initial_mass: 1.0,
            initial_position: [0.0, 0.0],
            consumption_radius_factor: 1.5,
            food_mass: 1.0,
            spawn_threshold: 5,
            spawn_roll_max: 100,
            max_food: None,
            play_area_width: 1000.0,
            play_area_height: 720.0,
            split_offset: [1.0, 1.0],
            split_boost: 1.2,
            split_child_velocity_ratio: 0.5,
            show_mass_label: false,
            tick_rate_hz: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SimConfigError {
    NonPositive { field: &'static str, value: f64 },
    Negative { field: &'static str, value: f64 },
    NonFinite { field: &'static str },
    InvalidMassDeficit { value: f64 },
    SpawnThresholdOutOfRange { threshold: u32, roll_max: u32 },
    PlayAreaTooLarge { max: f64, actual: f64 },
    InitialPositionOutsidePlayArea,
    InvalidTickRate,
    Parse(String),
}

impl fmt::Display for SimConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimConfigError::NonPositive { field, value } => {
                write!(f, "{field} must be positive (got {value})")
            }
            SimConfigError::Negative { field, value } => {
                write!(f, "{field} must not be negative (got {value})")
            }
            SimConfigError::NonFinite { field } => write!(f, "{field} must be finite"),
            SimConfigError::InvalidMassDeficit { value } => {
                write!(f, "mass_deficit must be in (0, 1] (got {value})")
            }
            SimConfigError::SpawnThresholdOutOfRange {
                threshold,
                roll_max,
            } => write!(
                f,
                "spawn_threshold ({threshold}) exceeds roll range 0..={roll_max}"
            ),
            SimConfigError::PlayAreaTooLarge { max, actual } => {
                write!(f, "play area dimension ({actual}) exceeds supported maximum ({max})")
            }
            SimConfigError::InitialPositionOutsidePlayArea => {
                write!(f, "initial_position must lie inside the play area")
            }
            SimConfigError::InvalidTickRate => write!(f, "tick_rate_hz must be positive"),
            SimConfigError::Parse(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl Error for SimConfigError {}

impl SimConfig {
    pub const MAX_PLAY_AREA: f64 = 1.0e6;

    pub fn validate(&self) -> Result<(), SimConfigError> {
        let positive = [
            ("init_radius", self.init_radius),
            ("dt", self.dt),
            ("max_speed", self.max_speed),
            ("play_area_width", self.play_area_width),
            ("play_area_height", self.play_area_height),
            ("initial_mass", self.initial_mass),
        ];
        for (field, value) in positive {
            if !value.is_finite() {
                return Err(SimConfigError::NonFinite { field });
            }
            if value <= 0.0 {
                return Err(SimConfigError::NonPositive { field, value });
            }
        }
        let non_negative = [
            ("drag_speed", self.drag_speed),
            ("decay_floor_mass", self.decay_floor_mass),
            ("consumption_radius_factor", self.consumption_radius_factor),
            ("food_mass", self.food_mass),
            ("split_boost", self.split_boost),
            ("split_child_velocity_ratio", self.split_child_velocity_ratio),
        ];
        for (field, value) in non_negative {
            if !value.is_finite() {
                return Err(SimConfigError::NonFinite { field });
            }
            if value < 0.0 {
                return Err(SimConfigError::Negative { field, value });
            }
        }
        if !(self.mass_deficit > 0.0 && self.mass_deficit <= 1.0) {
            return Err(SimConfigError::InvalidMassDeficit {
                value: self.mass_deficit,
            });
        }
        if self.spawn_threshold > self.spawn_roll_max.saturating_add(1) {
            return Err(SimConfigError::SpawnThresholdOutOfRange {
                threshold: self.spawn_threshold,
                roll_max: self.spawn_roll_max,
            });
        }
        let largest = self.play_area_width.max(self.play_area_height);
        if largest > Self::MAX_PLAY_AREA {
            return Err(SimConfigError::PlayAreaTooLarge {
                max: Self::MAX_PLAY_AREA,
                actual: largest,
            });
        }
        if !self.split_offset.iter().all(|v| v.is_finite()) {
            return Err(SimConfigError::NonFinite {
                field: "split_offset",
            });
        }
        let [x, y] = self.initial_position;
        if !(0.0..=self.play_area_width).contains(&x) || !(0.0..=self.play_area_height).contains(&y)
        {
            return Err(SimConfigError::InitialPositionOutsidePlayArea);
        }
        if self.tick_rate_hz == 0 {
            return Err(SimConfigError::InvalidTickRate);
        }
        Ok(())
    }

    /// Parse a JSON document (missing fields take defaults) and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, SimConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SimConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn food_radius(&self) -> f64 {
        self.init_radius / 2.0
    }

    /// Nominal wall-clock duration of one tick for realtime drivers.
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.tick_rate_hz.max(1) as f64)
    }
}
