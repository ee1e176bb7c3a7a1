//! Schedule recording and run outcome.
//!
//! Every executed slice becomes one immutable [`ScheduleEntry`]. When the
//! engine halts, the entries, total energy and residual work are packaged
//! into a [`SimulationResult`].

use std::fmt;

use tracing::info;

use crate::engine::ExitKind;
use crate::stats::RunStats;
use crate::types::{Energy, Freq, TaskId, Time, Work};

/// One execution slice at constant frequency, covering `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleEntry {
    pub task_id: TaskId,
    pub start: Time,
    pub end: Time,
    pub frequency: Freq,
}

impl ScheduleEntry {
    pub fn duration(&self) -> Time {
        self.end - self.start
    }
}

impl fmt::Display for ScheduleEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Task {}: [{:.1}, {:.1}] at f={:.2}",
            self.task_id, self.start, self.end, self.frequency
        )
    }
}

/// Coalesce back-to-back slices of the same task at the same frequency.
///
/// The engine re-evaluates every quantum, so a task running at a steady
/// rate shows up as several adjacent slices. Merging them changes neither
/// the covered time nor the energy.
pub fn merge_slices(entries: &[ScheduleEntry]) -> Vec<ScheduleEntry> {
    let mut merged: Vec<ScheduleEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        if let Some(last) = merged.last_mut() {
            if last.task_id == entry.task_id
                && last.frequency == entry.frequency
                && last.end == entry.start
            {
                last.end = entry.end;
                continue;
            }
        }
        merged.push(*entry);
    }
    merged
}

/// A task left with work when the run halted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Residual {
    pub task_id: TaskId,
    pub remaining: Work,
    pub deadline: Time,
}

/// Outcome of one simulation run.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    schedule: Vec<ScheduleEntry>,
    energy: Energy,
    exit_kind: ExitKind,
    end_time: Time,
    residuals: Vec<Residual>,
    stats: RunStats,
}

impl SimulationResult {
    pub(crate) fn new(
        schedule: Vec<ScheduleEntry>,
        energy: Energy,
        exit_kind: ExitKind,
        end_time: Time,
        residuals: Vec<Residual>,
        stats: RunStats,
    ) -> Self {
        SimulationResult {
            schedule,
            energy,
            exit_kind,
            end_time,
            residuals,
            stats,
        }
    }

    /// True only when every task finished.
    pub fn success(&self) -> bool {
        !self.exit_kind.is_error()
    }

    pub fn exit_kind(&self) -> &ExitKind {
        &self.exit_kind
    }

    /// Total energy accumulated over all slices.
    pub fn energy(&self) -> Energy {
        self.energy
    }

    /// All slices in execution order.
    pub fn schedule(&self) -> &[ScheduleEntry] {
        &self.schedule
    }

    /// The schedule with steady-rate runs coalesced; see [`merge_slices`].
    pub fn merged_schedule(&self) -> Vec<ScheduleEntry> {
        merge_slices(&self.schedule)
    }

    /// Tasks with work left, in input order. Empty on success.
    pub fn residuals(&self) -> &[Residual] {
        &self.residuals
    }

    /// Simulated clock when the run halted.
    pub fn end_time(&self) -> Time {
        self.end_time
    }

    /// Number of executed slices.
    pub fn steps(&self) -> usize {
        self.schedule.len()
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Slices belonging to one task, in order.
    pub fn entries_for(&self, id: TaskId) -> impl Iterator<Item = &ScheduleEntry> {
        self.schedule.iter().filter(move |e| e.task_id == id)
    }

    /// Log every slice and the outcome.
    pub fn dump(&self) {
        for entry in &self.schedule {
            info!("{entry}");
        }
        info!(
            exit = %self.exit_kind,
            energy = self.energy,
            end_time = self.end_time,
            "run finished"
        );
        for r in &self.residuals {
            info!(task = %r.task_id, remaining = r.remaining, "incomplete");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_display() {
        let e = ScheduleEntry {
            task_id: TaskId(1),
            start: 0.0,
            end: 4.0,
            frequency: 2.0,
        };
        assert_eq!(e.to_string(), "Task 1: [0.0, 4.0] at f=2.00");

        let e = ScheduleEntry {
            task_id: TaskId(12),
            start: 5.24,
            end: 5.76,
            frequency: 1.0 / 3.0,
        };
        assert_eq!(e.to_string(), "Task 12: [5.2, 5.8] at f=0.33");
    }

    fn entry(id: u32, start: f64, end: f64, frequency: f64) -> ScheduleEntry {
        ScheduleEntry {
            task_id: TaskId(id),
            start,
            end,
            frequency,
        }
    }

    #[test]
    fn test_merge_slices() {
        let raw = vec![
            entry(1, 0.0, 1.0, 2.0),
            entry(1, 1.0, 2.0, 2.0),
            entry(1, 2.0, 3.0, 3.0),
            entry(2, 3.0, 4.0, 3.0),
            // Gap: not merged even though task and frequency match.
            entry(2, 5.0, 6.0, 3.0),
        ];
        assert_eq!(
            merge_slices(&raw),
            vec![
                entry(1, 0.0, 2.0, 2.0),
                entry(1, 2.0, 3.0, 3.0),
                entry(2, 3.0, 4.0, 3.0),
                entry(2, 5.0, 6.0, 3.0),
            ]
        );
        assert!(merge_slices(&[]).is_empty());
    }
}
