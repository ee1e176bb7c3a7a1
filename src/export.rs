//! Plain text schedule dump, one `Task <id>: [<start>, <end>] at f=<f>`
//! line per slice.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::trace::ScheduleEntry;

pub fn write_schedule<W: Write>(mut writer: W, schedule: &[ScheduleEntry]) -> io::Result<()> {
    for entry in schedule {
        writeln!(writer, "{entry}")?;
    }
    writer.flush()
}

/// Write the schedule to `path`, replacing any existing file.
pub fn save_schedule(path: &Path, schedule: &[ScheduleEntry]) -> io::Result<()> {
    let file = File::create(path)?;
    write_schedule(BufWriter::new(file), schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskId;

    #[test]
    fn test_write_schedule_lines() {
        let schedule = [
            ScheduleEntry {
                task_id: TaskId(1),
                start: 0.0,
                end: 1.0,
                frequency: 2.0,
            },
            ScheduleEntry {
                task_id: TaskId(2),
                start: 1.0,
                end: 1.5,
                frequency: 4.0,
            },
        ];
        let mut out = Vec::new();
        write_schedule(&mut out, &schedule).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Task 1: [0.0, 1.0] at f=2.00\nTask 2: [1.0, 1.5] at f=4.00\n"
        );
    }

    #[test]
    fn test_empty_schedule_writes_nothing() {
        let mut out = Vec::new();
        write_schedule(&mut out, &[]).unwrap();
        assert!(out.is_empty());
    }
}
