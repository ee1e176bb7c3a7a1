//! Scenario definition, builder API, and processor configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, ParamError, SimError};
use crate::task::{validate_set, TaskDef};
use crate::types::{Freq, TaskId, Time, Work};

pub const ENV_F_MIN: &str = "DVFS_SIM_F_MIN";
pub const ENV_F_MAX: &str = "DVFS_SIM_F_MAX";
pub const ENV_ALPHA: &str = "DVFS_SIM_ALPHA";
pub const ENV_DT: &str = "DVFS_SIM_DT";
pub const ENV_HORIZON: &str = "DVFS_SIM_HORIZON";

/// Processor parameters for one run.
///
/// Defaults: `f_min=1.0`, `f_max=4.0`, `alpha=2.0`, `dt=1.0`,
/// `horizon=1000.0`. Missing keys in a config file keep their default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessorParams {
    /// Minimum sustained frequency.
    pub f_min: Freq,
    /// Maximum frequency.
    pub f_max: Freq,
    /// Energy exponent: power is `frequency^alpha`.
    pub alpha: f64,
    /// Re-evaluation quantum while a task executes.
    pub dt: Time,
    /// Absolute cutoff; work left at this time fails the run.
    pub horizon: Time,
}

impl Default for ProcessorParams {
    fn default() -> Self {
        ProcessorParams {
            f_min: 1.0,
            f_max: 4.0,
            alpha: 2.0,
            dt: 1.0,
            horizon: 1000.0,
        }
    }
}

impl ProcessorParams {
    /// Check that every parameter is finite and in range.
    pub fn validate(&self) -> Result<(), ParamError> {
        let check = |name, value: f64, ok: bool, reason| {
            if !value.is_finite() {
                Err(ParamError {
                    name,
                    value,
                    reason: "must be finite",
                })
            } else if !ok {
                Err(ParamError {
                    name,
                    value,
                    reason,
                })
            } else {
                Ok(())
            }
        };
        check("f_min", self.f_min, self.f_min > 0.0, "must be positive")?;
        check(
            "f_max",
            self.f_max,
            self.f_max >= self.f_min,
            "must be at least f_min",
        )?;
        check("alpha", self.alpha, self.alpha > 0.0, "must be positive")?;
        check("dt", self.dt, self.dt > 0.0, "must be positive")?;
        check(
            "horizon",
            self.horizon,
            self.horizon > 0.0,
            "must be positive",
        )?;
        // The clock must still move by dt near the horizon.
        check(
            "dt",
            self.dt,
            self.horizon + self.dt > self.horizon,
            "too small to advance the clock before the horizon",
        )?;
        Ok(())
    }

    /// Defaults overridden by `DVFS_SIM_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env()
    }

    /// Overlay `DVFS_SIM_*` environment variables onto `self`.
    pub fn with_env(self) -> Result<Self, ConfigError> {
        self.with_vars(|var| std::env::var(var).ok())
    }

    /// Overlay variables from an arbitrary lookup. Unset or empty values
    /// leave the field untouched.
    pub fn with_vars<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let fields: [(&'static str, &mut f64); 5] = [
            (ENV_F_MIN, &mut self.f_min),
            (ENV_F_MAX, &mut self.f_max),
            (ENV_ALPHA, &mut self.alpha),
            (ENV_DT, &mut self.dt),
            (ENV_HORIZON, &mut self.horizon),
        ];
        for (var, field) in fields {
            match lookup(var) {
                None => {}
                Some(value) if value.trim().is_empty() => {}
                Some(value) => {
                    *field = value
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::Env { var, value })?;
                }
            }
        }
        Ok(self)
    }

    /// Parse a TOML document, e.g. `f_max = 3.0`.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Load parameters from a TOML file and check their ranges.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let params = Self::read(path)?;
        params.validate()?;
        Ok(params)
    }

    /// Read a TOML file without range checks, for use as one layer of a
    /// merged configuration that is validated as a whole.
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let params = Self::from_toml_str(&contents).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), ?params, "read processor config");
        Ok(params)
    }
}

/// A complete, validated simulation input: tasks in input order plus
/// processor parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    tasks: Vec<TaskDef>,
    params: ProcessorParams,
}

impl Scenario {
    pub fn builder() -> ScenarioBuilder {
        ScenarioBuilder {
            tasks: Vec::new(),
            params: ProcessorParams::default(),
        }
    }

    /// Validate a task set and parameters into a scenario.
    pub fn new(tasks: Vec<TaskDef>, params: ProcessorParams) -> Result<Self, SimError> {
        params.validate()?;
        validate_set(&tasks)?;
        Ok(Scenario { tasks, params })
    }

    pub fn tasks(&self) -> &[TaskDef] {
        &self.tasks
    }

    pub fn params(&self) -> &ProcessorParams {
        &self.params
    }

    /// Same tasks with different processor parameters.
    pub fn with_params(&self, params: ProcessorParams) -> Result<Self, SimError> {
        params.validate()?;
        Ok(Scenario {
            tasks: self.tasks.clone(),
            params,
        })
    }
}

/// Builder for constructing scenarios.
pub struct ScenarioBuilder {
    tasks: Vec<TaskDef>,
    params: ProcessorParams,
}

impl ScenarioBuilder {
    /// Add a task with a full TaskDef.
    pub fn task(mut self, def: TaskDef) -> Self {
        self.tasks.push(def);
        self
    }

    /// Convenience: add a task with an auto-assigned id.
    pub fn add_task(self, release: Time, deadline: Time, workload: Work) -> Self {
        self.add_task_after(release, deadline, workload, &[])
    }

    /// Convenience: add a task with an auto-assigned id that waits for
    /// `deps` to complete.
    ///
    /// The id is one past the largest id added so far. Past `u32::MAX` it
    /// saturates, and `build()` reports the resulting duplicate id.
    pub fn add_task_after(
        mut self,
        release: Time,
        deadline: Time,
        workload: Work,
        deps: &[TaskId],
    ) -> Self {
        let id = self
            .tasks
            .iter()
            .map(|t| t.id.0)
            .max()
            .map_or(TaskId(1), |max| TaskId(max.saturating_add(1)));
        self.tasks.push(TaskDef {
            id,
            release,
            deadline,
            workload,
            dependencies: deps.to_vec(),
        });
        self
    }

    /// Replace all processor parameters.
    pub fn params(mut self, params: ProcessorParams) -> Self {
        self.params = params;
        self
    }

    pub fn f_min(mut self, f: Freq) -> Self {
        self.params.f_min = f;
        self
    }

    pub fn f_max(mut self, f: Freq) -> Self {
        self.params.f_max = f;
        self
    }

    pub fn alpha(mut self, alpha: f64) -> Self {
        self.params.alpha = alpha;
        self
    }

    /// Set the re-evaluation quantum.
    pub fn dt(mut self, dt: Time) -> Self {
        self.params.dt = dt;
        self
    }

    pub fn horizon(mut self, horizon: Time) -> Self {
        self.params.horizon = horizon;
        self
    }

    /// Validate and build the scenario.
    pub fn build(self) -> Result<Scenario, SimError> {
        Scenario::new(self.tasks, self.params)
    }
}
