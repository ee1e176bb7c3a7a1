#![allow(dead_code)]

use dvfs_simulator::{ScheduleEntry, SimulationResult, TaskId, Work};

/// Initialize tracing from `RUST_LOG`.
///
/// `init_tracing()` uses `try_init()`, so only the first call in the
/// process installs the subscriber.
pub fn setup_test() {
    dvfs_simulator::init_tracing();
}

/// Work executed by one slice.
pub fn work_of(entry: &ScheduleEntry) -> Work {
    entry.frequency * entry.duration()
}

/// Total work executed for `id` over the whole run.
pub fn executed_work(result: &SimulationResult, id: TaskId) -> Work {
    result.entries_for(id).map(work_of).sum()
}

/// Task ids in schedule order, one per slice.
pub fn run_order(result: &SimulationResult) -> Vec<u32> {
    result.schedule().iter().map(|e| e.task_id.0).collect()
}
