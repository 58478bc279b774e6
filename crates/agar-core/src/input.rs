use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Abstract player command emitted by a render/input adapter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    SetMoveTarget { x: f64, y: f64 },
    ToggleSplit,
}

/// Commands pending for a single tick. At most one of each kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    pub move_target: Option<Point>,
    pub toggle_split: bool,
}

impl TickInput {
    pub fn move_to(x: f64, y: f64) -> Self {
        Self {
            move_target: Some([x, y]),
            toggle_split: false,
        }
    }

    pub fn toggle() -> Self {
        Self {
            move_target: None,
            toggle_split: true,
        }
    }

    /// Fold a command in. A later target replaces an earlier one; repeated
    /// toggles within one tick collapse into a single toggle.
    pub fn push(&mut self, command: Command) {
        match command {
            Command::SetMoveTarget { x, y } => self.move_target = Some([x, y]),
            Command::ToggleSplit => self.toggle_split = true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.move_target.is_none() && !self.toggle_split
    }
}

impl FromIterator<Command> for TickInput {
    fn from_iter<I: IntoIterator<Item = Command>>(iter: I) -> Self {
        let mut input = TickInput::default();
        for command in iter {
            input.push(command);
        }
        input
    }
}

/// Tick-indexed command schedule for headless runs. Ticks are 1-based,
/// matching `StepMetrics::step`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InputScript {
    ticks: BTreeMap<usize, TickInput>,
}

impl InputScript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tick: usize, command: Command) -> &mut Self {
        self.ticks.entry(tick).or_default().push(command);
        self
    }

    pub fn input_for(&self, tick: usize) -> TickInput {
        self.ticks.get(&tick).copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    pub fn last_tick(&self) -> Option<usize> {
        self.ticks.keys().next_back().copied()
    }
}
