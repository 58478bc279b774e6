use agar_core::input::{Command, InputScript, TickInput};
use agar_core::world::World;
use agar_core::SimConfig;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

fn value_error(err: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn parse_config(config_json: Option<&str>) -> PyResult<SimConfig> {
    match config_json {
        Some(json) => SimConfig::from_json_str(json).map_err(value_error),
        None => Ok(SimConfig::default()),
    }
}

#[pyfunction]
fn version() -> &'static str {
    "0.1.0"
}

#[pyfunction]
fn default_config_json() -> PyResult<String> {
    serde_json::to_string(&SimConfig::default()).map_err(value_error)
}

/// Run an input-free session and return the `RunSummary` as JSON.
#[pyfunction]
#[pyo3(signature = (config_json, steps, sample_every=100))]
fn run_experiment_json(config_json: &str, steps: usize, sample_every: usize) -> PyResult<String> {
    let config = parse_config(Some(config_json))?;
    let mut world = World::try_new(config).map_err(value_error)?;
    let summary = world
        .try_run_experiment(steps, sample_every, &InputScript::new())
        .map_err(value_error)?;
    serde_json::to_string(&summary).map_err(value_error)
}

/// Interactive handle: queue commands, then advance one tick at a time.
#[pyclass]
struct Simulation {
    world: World,
    pending: TickInput,
}

#[pymethods]
impl Simulation {
    #[new]
    #[pyo3(signature = (config_json=None))]
    fn new(config_json: Option<&str>) -> PyResult<Self> {
        let world = World::try_new(parse_config(config_json)?).map_err(value_error)?;
        Ok(Self {
            world,
            pending: TickInput::default(),
        })
    }

    fn set_move_target(&mut self, x: f64, y: f64) {
        self.pending.push(Command::SetMoveTarget { x, y });
    }

    fn toggle_split(&mut self) {
        self.pending.push(Command::ToggleSplit);
    }

    /// Advance `ticks` steps; queued commands apply to the first one only.
    #[pyo3(signature = (ticks=1))]
    fn step(&mut self, ticks: usize) {
        let first = std::mem::take(&mut self.pending);
        for i in 0..ticks {
            if i == 0 {
                self.world.step(&first);
            } else {
                self.world.step(&TickInput::default());
            }
        }
    }

    fn snapshot_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.world.snapshot()).map_err(value_error)
    }

    fn metrics_json(&self) -> PyResult<String> {
        serde_json::to_string(&self.world.metrics()).map_err(value_error)
    }

    fn single_cell(&self) -> bool {
        self.world.single_cell()
    }

    fn cell_count(&self) -> usize {
        self.world.live_cell_count()
    }

    fn food_count(&self) -> usize {
        self.world.live_food_count()
    }

    fn total_mass(&self) -> f64 {
        self.world.total_mass()
    }

    #[getter]
    fn step_index(&self) -> usize {
        self.world.step_index()
    }
}

/// PyO3 module exposing agar-core to Python.
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add_function(wrap_pyfunction!(default_config_json, m)?)?;
    m.add_function(wrap_pyfunction!(run_experiment_json, m)?)?;
    m.add_class::<Simulation>()?;
    Ok(())
}
