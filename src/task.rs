//! Task model for the simulator.
//!
//! A [`TaskDef`] is the caller's immutable definition. Each run builds a
//! [`TaskRegistry`]: a private snapshot holding the mutable remaining
//! workload, so definitions are never touched and runs never share state.

use std::collections::{HashMap, HashSet};

use crate::error::TaskError;
use crate::types::{is_complete, TaskId, Time, Work};

/// Definition of a task for scenario creation.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskDef {
    pub id: TaskId,
    /// The task is not eligible before this time.
    pub release: Time,
    /// Absolute deadline, strictly after `release`.
    pub deadline: Time,
    /// Total work at creation.
    pub workload: Work,
    /// Tasks that must be complete before this one becomes eligible.
    pub dependencies: Vec<TaskId>,
}

impl TaskDef {
    /// Create a validated task definition with no dependencies.
    pub fn new(
        id: TaskId,
        release: Time,
        deadline: Time,
        workload: Work,
    ) -> Result<Self, TaskError> {
        let def = TaskDef {
            id,
            release,
            deadline,
            workload,
            dependencies: Vec::new(),
        };
        def.validate()?;
        Ok(def)
    }

    /// Add prerequisite tasks.
    pub fn after(mut self, deps: &[TaskId]) -> Self {
        self.dependencies.extend_from_slice(deps);
        self
    }

    /// Check the per-task invariants. Dependencies are checked against the
    /// whole set by [`validate_set`].
    pub fn validate(&self) -> Result<(), TaskError> {
        let id = self.id;
        for (field, value) in [
            ("release time", self.release),
            ("deadline", self.deadline),
            ("workload", self.workload),
        ] {
            if !value.is_finite() {
                return Err(TaskError::NonFinite { id, field });
            }
        }
        if self.release < 0.0 {
            return Err(TaskError::NegativeRelease {
                id,
                release: self.release,
            });
        }
        if self.deadline <= self.release {
            return Err(TaskError::DeadlineNotAfterRelease {
                id,
                release: self.release,
                deadline: self.deadline,
            });
        }
        if self.workload <= 0.0 {
            return Err(TaskError::NonPositiveWorkload {
                id,
                workload: self.workload,
            });
        }
        Ok(())
    }
}

/// Validate every task and the cross-task constraints: unique ids and
/// known dependency targets. Cycles are accepted here and surface as a
/// deadlock at run time.
pub fn validate_set(tasks: &[TaskDef]) -> Result<(), TaskError> {
    let mut seen = HashSet::with_capacity(tasks.len());
    for def in tasks {
        def.validate()?;
        if !seen.insert(def.id) {
            return Err(TaskError::DuplicateId(def.id));
        }
    }
    for def in tasks {
        if let Some(&dep) = def.dependencies.iter().find(|d| !seen.contains(*d)) {
            return Err(TaskError::UnknownDependency { id: def.id, dep });
        }
    }
    Ok(())
}

/// A task at runtime: identity copied from its definition plus the live
/// remaining workload.
#[derive(Debug, Clone)]
pub struct SimTask {
    pub id: TaskId,
    pub release: Time,
    pub deadline: Time,
    /// Remaining work. Non-increasing, never negative.
    pub remaining: Work,
    /// Registry indices of prerequisite tasks.
    pub deps: Vec<usize>,
}

impl SimTask {
    pub fn is_complete(&self) -> bool {
        is_complete(self.remaining)
    }
}

/// Per-run task state. Index order is input order, which is also the EDF
/// tie-break order.
#[derive(Debug, Clone)]
pub struct TaskRegistry {
    tasks: Vec<SimTask>,
}

impl TaskRegistry {
    /// Snapshot a task set. The set must already have passed
    /// [`validate_set`]; unknown dependency ids are ignored.
    pub fn snapshot(defs: &[TaskDef]) -> Self {
        let index: HashMap<TaskId, usize> =
            defs.iter().enumerate().map(|(i, d)| (d.id, i)).collect();
        let tasks = defs
            .iter()
            .map(|d| SimTask {
                id: d.id,
                release: d.release,
                deadline: d.deadline,
                remaining: d.workload,
                deps: d
                    .dependencies
                    .iter()
                    .filter_map(|dep| index.get(dep).copied())
                    .collect(),
            })
            .collect();
        TaskRegistry { tasks }
    }

    pub fn tasks(&self) -> &[SimTask] {
        &self.tasks
    }

    pub fn get(&self, idx: usize) -> &SimTask {
        &self.tasks[idx]
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Subtract executed work from a task, flooring at zero. Returns the
    /// new remaining workload.
    pub fn consume(&mut self, idx: usize, work: Work) -> Work {
        let task = &mut self.tasks[idx];
        task.remaining = (task.remaining - work).max(0.0);
        task.remaining
    }

    /// Whether every task's remaining workload is within epsilon of zero.
    pub fn all_complete(&self) -> bool {
        self.tasks.iter().all(SimTask::is_complete)
    }
}
