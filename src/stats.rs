//! Run statistics.
//!
//! Diagnostics collected alongside the schedule: per-task busy time,
//! energy and completion/lateness, plus processor-wide utilization and
//! frequency figures. Lateness never changes a run's success; only
//! residual work does.

use std::fmt;

use crate::task::TaskRegistry;
use crate::trace::ScheduleEntry;
use crate::types::{Energy, Freq, TaskId, Time};

/// Per-task statistics for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskStats {
    pub task_id: TaskId,
    pub deadline: Time,
    /// Number of slices the task ran.
    pub slices: usize,
    /// Total time on the processor.
    pub busy_time: Time,
    /// Energy spent on this task.
    pub energy: Energy,
    /// Start of the first slice.
    pub first_start: Option<Time>,
    /// End of the slice that finished the task.
    pub completion: Option<Time>,
}

impl TaskStats {
    fn new(task_id: TaskId, deadline: Time) -> Self {
        TaskStats {
            task_id,
            deadline,
            slices: 0,
            busy_time: 0.0,
            energy: 0.0,
            first_start: None,
            completion: None,
        }
    }

    /// `completion - deadline`; positive means late.
    pub fn lateness(&self) -> Option<Time> {
        self.completion.map(|c| c - self.deadline)
    }

    /// Finished at or before the deadline.
    pub fn met_deadline(&self) -> bool {
        self.completion.is_some_and(|c| c <= self.deadline)
    }
}

/// Statistics for a whole run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStats {
    /// Per-task statistics, in input order.
    pub tasks: Vec<TaskStats>,
    /// Time the processor spent running tasks.
    pub busy_time: Time,
    /// Clock at the end of the run.
    pub end_time: Time,
    /// Highest frequency used by any slice (0 when nothing ran).
    pub peak_frequency: Freq,
    /// Adjacent slices that belong to different tasks.
    pub switches: usize,
    freq_time: f64,
    last_task: Option<TaskId>,
}

impl RunStats {
    pub(crate) fn new(reg: &TaskRegistry) -> Self {
        RunStats {
            tasks: reg
                .tasks()
                .iter()
                .map(|t| TaskStats::new(t.id, t.deadline))
                .collect(),
            busy_time: 0.0,
            end_time: 0.0,
            peak_frequency: 0.0,
            switches: 0,
            freq_time: 0.0,
            last_task: None,
        }
    }

    /// Account one executed slice for the task at registry index `idx`.
    pub(crate) fn record_slice(
        &mut self,
        idx: usize,
        entry: &ScheduleEntry,
        duration: Time,
        energy: Energy,
    ) {
        let task = &mut self.tasks[idx];
        task.slices += 1;
        task.busy_time += duration;
        task.energy += energy;
        task.first_start.get_or_insert(entry.start);

        self.busy_time += duration;
        self.freq_time += entry.frequency * duration;
        self.peak_frequency = self.peak_frequency.max(entry.frequency);
        if self.last_task.is_some_and(|prev| prev != entry.task_id) {
            self.switches += 1;
        }
        self.last_task = Some(entry.task_id);
    }

    /// First call wins; later slices of an already-complete task do not
    /// move its completion time.
    pub(crate) fn record_completion(&mut self, idx: usize, at: Time) {
        self.tasks[idx].completion.get_or_insert(at);
    }

    pub(crate) fn finish(&mut self, end_time: Time) {
        self.end_time = end_time;
    }

    /// Time between 0 and the end of the run with nothing executing.
    pub fn idle_time(&self) -> Time {
        (self.end_time - self.busy_time).max(0.0)
    }

    /// Busy fraction of `[0, end_time]`.
    pub fn utilization(&self) -> f64 {
        if self.end_time > 0.0 {
            self.busy_time / self.end_time
        } else {
            0.0
        }
    }

    /// Time-weighted mean frequency over busy time.
    pub fn avg_frequency(&self) -> Freq {
        if self.busy_time > 0.0 {
            self.freq_time / self.busy_time
        } else {
            0.0
        }
    }

    /// Number of tasks that finished.
    pub fn completed(&self) -> usize {
        self.tasks.iter().filter(|t| t.completion.is_some()).count()
    }

    /// Tasks that finished after their deadline.
    pub fn late(&self) -> impl Iterator<Item = &TaskStats> {
        self.tasks
            .iter()
            .filter(|t| t.completion.is_some() && !t.met_deadline())
    }

    pub fn task(&self, id: TaskId) -> Option<&TaskStats> {
        self.tasks.iter().find(|t| t.task_id == id)
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run Statistics:")?;
        writeln!(f, "  end_time:         {:.3}", self.end_time)?;
        writeln!(f, "  busy_time:        {:.3}", self.busy_time)?;
        writeln!(f, "  idle_time:        {:.3}", self.idle_time())?;
        writeln!(f, "  utilization:      {:.1}%", self.utilization() * 100.0)?;
        writeln!(f, "  avg_frequency:    {:.2}", self.avg_frequency())?;
        writeln!(f, "  peak_frequency:   {:.2}", self.peak_frequency)?;
        writeln!(f, "  switches:         {}", self.switches)?;
        writeln!(
            f,
            "  completed:        {}/{}",
            self.completed(),
            self.tasks.len()
        )?;
        writeln!(f, "  late:             {}", self.late().count())?;
        for t in &self.tasks {
            write!(
                f,
                "  task {:<4} slices={:<4} busy={:<8.3} energy={:<10.3}",
                t.task_id, t.slices, t.busy_time, t.energy
            )?;
            match t.lateness() {
                Some(l) => writeln!(f, " lateness={l:+.3}")?,
                None => writeln!(f, " incomplete")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskDef;

    fn registry() -> TaskRegistry {
        TaskRegistry::snapshot(&[
            TaskDef::new(TaskId(1), 0.0, 2.0, 2.0).unwrap(),
            TaskDef::new(TaskId(2), 0.0, 3.0, 4.0).unwrap(),
        ])
    }

    fn slice(id: u32, start: f64, end: f64, frequency: f64) -> ScheduleEntry {
        ScheduleEntry {
            task_id: TaskId(id),
            start,
            end,
            frequency,
        }
    }

    #[test]
    fn test_accumulates_per_task_and_aggregate() {
        let mut s = RunStats::new(&registry());
        s.record_slice(0, &slice(1, 0.0, 1.0, 2.0), 1.0, 4.0);
        s.record_slice(1, &slice(2, 1.0, 2.0, 4.0), 1.0, 16.0);
        s.record_slice(0, &slice(1, 2.0, 2.5, 2.0), 0.5, 2.0);
        s.record_completion(0, 2.5);
        s.finish(4.0);

        let t1 = s.task(TaskId(1)).unwrap();
        assert_eq!(t1.slices, 2);
        assert_eq!(t1.busy_time, 1.5);
        assert_eq!(t1.energy, 6.0);
        assert_eq!(t1.first_start, Some(0.0));
        assert_eq!(t1.lateness(), Some(0.5));
        assert!(!t1.met_deadline());

        assert_eq!(s.switches, 2);
        assert_eq!(s.peak_frequency, 4.0);
        assert_eq!(s.busy_time, 2.5);
        assert_eq!(s.idle_time(), 1.5);
        assert_eq!(s.utilization(), 2.5 / 4.0);
        // (2*1 + 4*1 + 2*0.5) / 2.5
        assert_eq!(s.avg_frequency(), 7.0 / 2.5);
        assert_eq!(s.completed(), 1);
        assert_eq!(s.late().count(), 1);
    }

    #[test]
    fn test_empty_run() {
        let s = RunStats::new(&TaskRegistry::snapshot(&[]));
        assert_eq!(s.utilization(), 0.0);
        assert_eq!(s.avg_frequency(), 0.0);
        assert!(s.to_string().contains("completed:        0/0"));
    }
}
