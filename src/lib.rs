//! dvfs_simulator - Deterministic simulator for energy-aware real-time
//! scheduling on a single variable-speed processor.
//!
//! Tasks with release times, deadlines, workloads and optional
//! prerequisites are run earliest-deadline-first. Each slice runs at the
//! lowest frequency that still meets the running task's deadline (clamped
//! to the processor's range), and energy is charged as `f^alpha * time`.
//!
//! # Architecture
//!
//! - **Tasks**: validated definitions and the per-run registry snapshot
//! - **Policy**: readiness (release, remaining work, prerequisites) and EDF
//! - **Power**: frequency selection and slice energy
//! - **Engine**: quantum steps while busy, release jumps while idle
//! - **Trace**: schedule entries and the run outcome
//!
//! # Usage
//!
//! ```rust
//! use dvfs_simulator::*;
//!
//! let scenario = Scenario::builder()
//!     .add_task(0.0, 4.0, 8.0)
//!     .add_task(5.0, 6.0, 1.0)
//!     .build()
//!     .unwrap();
//!
//! let result = Simulator::new().run(&scenario);
//! assert!(result.success());
//! assert_eq!(result.energy(), 17.0);
//! ```

pub mod engine;
pub mod error;
pub mod export;
pub mod fmt;
pub mod loader;
pub mod policy;
pub mod power;
pub mod scenario;
pub mod stats;
pub mod task;
pub mod trace;
pub mod types;

// Re-export the main public types for convenience.
pub use engine::{run_simulation, ExitKind, Simulator};
pub use error::{ConfigError, LoadError, ParamError, SimError, TaskError};
pub use export::{save_schedule, write_schedule};
pub use fmt::{init_tracing, SimFormat};
pub use loader::{load_tasks, parse_task, parse_tasks, task_id_at};
pub use power::{energy_cost, plan_slice, required_frequency, SliceCost};
pub use scenario::{ProcessorParams, Scenario, ScenarioBuilder};
pub use stats::{RunStats, TaskStats};
pub use task::{TaskDef, TaskRegistry};
pub use trace::{merge_slices, Residual, ScheduleEntry, SimulationResult};
pub use types::{Energy, Freq, TaskId, Time, Work, EPSILON};
