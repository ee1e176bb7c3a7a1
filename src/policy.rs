//! Readiness and earliest-deadline-first selection.
//!
//! A task is ready at `t` when it has been released, still has work, and
//! every prerequisite is complete. Among ready tasks the one with the
//! smallest deadline runs; equal deadlines go to the task that comes first
//! in input order. That tie-break is a pinned, user-visible contract.

use ordered_float::OrderedFloat;

use crate::task::TaskRegistry;
use crate::types::Time;

/// Whether the task at `idx` may run at time `t`.
pub fn is_ready(reg: &TaskRegistry, idx: usize, t: Time) -> bool {
    let task = reg.get(idx);
    task.release <= t
        && task.remaining > 0.0
        && task.deps.iter().all(|&dep| reg.get(dep).is_complete())
}

/// Registry indices of all ready tasks, in input order.
pub fn ready_set(reg: &TaskRegistry, t: Time) -> Vec<usize> {
    (0..reg.len()).filter(|&idx| is_ready(reg, idx, t)).collect()
}

/// Pick the ready task with the earliest deadline. `None` means idle.
pub fn select_edf(reg: &TaskRegistry, ready: &[usize]) -> Option<usize> {
    ready
        .iter()
        .copied()
        .min_by_key(|&idx| (OrderedFloat(reg.get(idx).deadline), idx))
}

/// Earliest release strictly after `t` among tasks that still have work.
/// `None` means no future event can make anything ready.
pub fn next_release(reg: &TaskRegistry, t: Time) -> Option<Time> {
    reg.tasks()
        .iter()
        .filter(|task| task.remaining > 0.0 && task.release > t)
        .map(|task| OrderedFloat(task.release))
        .min()
        .map(|r| r.into_inner())
}
