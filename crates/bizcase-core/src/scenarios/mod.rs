pub mod grid;
pub mod objective;
pub mod scenario;
pub mod sensitivity;
pub mod variable;

pub use grid::{sensitivity_grid, GridAxis, GridOutput};
pub use objective::{Metric, MetricValues, Objective};
pub use scenario::{
    apply_named_scenario, run_scenarios, NamedScenario, ScenarioDefinition, ScenarioReport,
    ScenarioResult,
};
pub use sensitivity::{
    run_sensitivity, run_sensitivity_with_abort, DeltaMode, PerturbationSpec, PerturbationTarget,
    RunStatus, SensitivityReport, SensitivityRun,
};
pub use variable::{apply_delta, SensitivityVariable};
