//! Time-advance engine.
//!
//! The clock moves in two ways. While a task is ready it advances by one
//! quantum, or less when the running task finishes mid-quantum. While
//! nothing is ready it jumps straight to the next release; it never polls
//! in `dt` steps across an idle gap.
//!
//! Each run works on a private [`TaskRegistry`] snapshot, so the same
//! [`Scenario`] can be run any number of times with identical results.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::SimError;
use crate::fmt::set_sim_clock;
use crate::policy;
use crate::power::plan_slice;
use crate::scenario::{ProcessorParams, Scenario};
use crate::stats::RunStats;
use crate::task::{TaskDef, TaskRegistry};
use crate::trace::{Residual, ScheduleEntry, SimulationResult};
use crate::types::{Energy, Time};

/// How a run terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitKind {
    /// Every task's remaining workload reached zero (within epsilon).
    Completed,
    /// The clock reached the horizon with work left.
    HorizonExceeded,
    /// Work is left but nothing is ready and no release is pending, e.g.
    /// a dependency cycle.
    Deadlock,
    /// The cancellation flag was raised between steps.
    Cancelled,
}

impl ExitKind {
    /// Every outcome other than `Completed` is a missed-deadline outcome.
    pub fn is_error(&self) -> bool {
        !matches!(self, ExitKind::Completed)
    }
}

impl fmt::Display for ExitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitKind::Completed => "completed",
            ExitKind::HorizonExceeded => "horizon exceeded",
            ExitKind::Deadlock => "deadlock",
            ExitKind::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// The simulation driver.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    cancel: Option<Arc<AtomicBool>>,
}

impl Simulator {
    pub fn new() -> Self {
        Simulator { cancel: None }
    }

    /// Check `flag` between steps and halt with [`ExitKind::Cancelled`]
    /// once it is set. The schedule up to that point is unchanged.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Run a scenario and return its outcome.
    pub fn run(&self, scenario: &Scenario) -> SimulationResult {
        let params = scenario.params();
        let mut reg = TaskRegistry::snapshot(scenario.tasks());
        let mut stats = RunStats::new(&reg);
        let mut schedule: Vec<ScheduleEntry> = Vec::new();
        let mut energy: Energy = 0.0;
        let mut t: Time = 0.0;

        info!(
            tasks = reg.len(),
            f_min = params.f_min,
            f_max = params.f_max,
            alpha = params.alpha,
            dt = params.dt,
            horizon = params.horizon,
            "starting run"
        );

        let exit_kind = loop {
            set_sim_clock(Some(t));

            if self.cancelled() {
                break ExitKind::Cancelled;
            }
            if t >= params.horizon {
                break ExitKind::HorizonExceeded;
            }

            let ready = policy::ready_set(&reg, t);
            let Some(idx) = policy::select_edf(&reg, &ready) else {
                match policy::next_release(&reg, t) {
                    Some(next) => {
                        debug!(until = next, "idle");
                        t = next;
                        continue;
                    }
                    None if reg.all_complete() => break ExitKind::Completed,
                    None => break ExitKind::Deadlock,
                }
            };

            let task = reg.get(idx);
            let slice = plan_slice(task.remaining, task.deadline, t, params);
            let entry = ScheduleEntry {
                task_id: task.id,
                start: t,
                end: t + slice.duration,
                frequency: slice.frequency,
            };

            let remaining = reg.consume(idx, slice.work);
            energy += slice.energy;
            stats.record_slice(idx, &entry, slice.duration, slice.energy);
            debug!(
                task = %entry.task_id,
                ready = ready.len(),
                freq = slice.frequency,
                duration = slice.duration,
                remaining,
                "run"
            );
            if reg.get(idx).is_complete() {
                stats.record_completion(idx, entry.end);
            }
            schedule.push(entry);
            t = entry.end;

            if reg.all_complete() {
                break ExitKind::Completed;
            }
        };

        let residuals: Vec<Residual> = reg
            .tasks()
            .iter()
            .filter(|task| !task.is_complete())
            .map(|task| Residual {
                task_id: task.id,
                remaining: task.remaining,
                deadline: task.deadline,
            })
            .collect();

        match exit_kind {
            ExitKind::Completed => info!(energy, slices = schedule.len(), "all tasks completed"),
            ExitKind::Deadlock => warn!(
                incomplete = residuals.len(),
                "no ready task and no pending release; unreachable dependencies"
            ),
            ExitKind::HorizonExceeded => warn!(
                incomplete = residuals.len(),
                horizon = params.horizon,
                "horizon reached with work left"
            ),
            ExitKind::Cancelled => warn!(incomplete = residuals.len(), "run cancelled"),
        }
        set_sim_clock(None);

        stats.finish(t);
        SimulationResult::new(schedule, energy, exit_kind, t, residuals, stats)
    }
}

/// Validate `tasks` and `params`, then run them once.
///
/// The caller's definitions are only read; every call starts from the
/// initial workloads.
pub fn run_simulation(
    tasks: &[TaskDef],
    params: &ProcessorParams,
) -> Result<SimulationResult, SimError> {
    let scenario = Scenario::new(tasks.to_vec(), *params)?;
    Ok(Simulator::new().run(&scenario))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskId;

    #[test]
    fn test_exit_kind_is_error() {
        assert!(!ExitKind::Completed.is_error());
        assert!(ExitKind::HorizonExceeded.is_error());
        assert!(ExitKind::Deadlock.is_error());
        assert!(ExitKind::Cancelled.is_error());
    }

    #[test]
    fn test_empty_scenario_completes_at_zero() {
        let scenario = Scenario::new(Vec::new(), ProcessorParams::default()).unwrap();
        let result = Simulator::new().run(&scenario);
        assert_eq!(result.exit_kind(), &ExitKind::Completed);
        assert_eq!(result.end_time(), 0.0);
        assert!(result.schedule().is_empty());
    }

    #[test]
    fn test_cancel_before_first_step() {
        let scenario = Scenario::builder().add_task(0.0, 4.0, 8.0).build().unwrap();
        let flag = Arc::new(AtomicBool::new(true));
        let result = Simulator::new().with_cancel(flag).run(&scenario);
        assert_eq!(result.exit_kind(), &ExitKind::Cancelled);
        assert!(result.schedule().is_empty());
        assert_eq!(result.residuals()[0].task_id, TaskId(1));
        assert_eq!(result.residuals()[0].remaining, 8.0);
    }

    #[test]
    fn test_run_simulation_rejects_invalid_input() {
        let bad = vec![TaskDef {
            id: TaskId(1),
            release: 0.0,
            deadline: 1.0,
            workload: -1.0,
            dependencies: Vec::new(),
        }];
        assert!(matches!(
            run_simulation(&bad, &ProcessorParams::default()),
            Err(SimError::Task(_))
        ));
    }
}
