//! Textual run report.

use std::io::{self, Write};

use dvfs_simulator::{ExitKind, ScheduleEntry, SimulationResult};

pub fn print<W: Write>(
    out: &mut W,
    result: &SimulationResult,
    schedule: &[ScheduleEntry],
) -> io::Result<()> {
    if result.success() {
        writeln!(out, "All tasks completed.")?;
        writeln!(out, "Total energy consumed: {:.1}", result.energy())?;
        writeln!(out, "Schedule:")?;
        for entry in schedule {
            writeln!(out, "{entry}")?;
        }
        return Ok(());
    }

    writeln!(out, "Some tasks missed their deadlines.")?;
    for r in result.residuals() {
        writeln!(
            out,
            "Task {} not completed, remaining work: {}",
            r.task_id, r.remaining
        )?;
    }
    let cause = match result.exit_kind() {
        ExitKind::HorizonExceeded => "time horizon reached with work left",
        ExitKind::Deadlock => "remaining tasks wait on dependencies that can never complete",
        ExitKind::Cancelled => "run cancelled",
        ExitKind::Completed => "completed",
    };
    writeln!(
        out,
        "Stopped at t={:.1}: {cause} (energy so far: {:.1})",
        result.end_time(),
        result.energy()
    )
}

pub fn print_stats<W: Write>(out: &mut W, result: &SimulationResult) -> io::Result<()> {
    writeln!(out)?;
    write!(out, "{}", result.stats())
}
