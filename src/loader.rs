//! Parser for line-oriented task files.
//!
//! One task per line:
//!
//! ```text
//! # release, deadline, workload [; prerequisite ids]
//! 0, 4, 8
//! 5, 6, 1
//! 6, 12, 3 ; 1 2
//! ```
//!
//! Ids are assigned 1-based in the order task lines appear. Blank lines and
//! `#` comments are not task lines. Any other malformed line rejects the
//! whole batch; a partially loaded list is never returned.

use std::path::Path;

use tracing::debug;

use crate::error::{LoadError, TaskError};
use crate::task::{validate_set, TaskDef};
use crate::types::TaskId;

enum LineError {
    Parse(String),
    Task(TaskError),
}

fn parse_number(field: &str, name: &str) -> Result<f64, LineError> {
    let field = field.trim();
    field
        .parse::<f64>()
        .map_err(|_| LineError::Parse(format!("{name} {field:?} is not a number")))
}

fn parse_line(text: &str, id: TaskId) -> Result<TaskDef, LineError> {
    let (triple, deps) = match text.split_once(';') {
        Some((triple, deps)) => (triple, Some(deps)),
        None => (text, None),
    };

    let fields: Vec<&str> = triple.split(',').collect();
    if fields.len() != 3 {
        return Err(LineError::Parse(format!(
            "expected 3 comma-separated numbers, found {} fields",
            fields.len()
        )));
    }
    let release = parse_number(fields[0], "release time")?;
    let deadline = parse_number(fields[1], "deadline")?;
    let workload = parse_number(fields[2], "workload")?;

    let dependencies = match deps {
        None => Vec::new(),
        Some(deps) => deps
            .split_whitespace()
            .map(|dep| {
                dep.parse::<u32>()
                    .ok()
                    .filter(|&n| n > 0)
                    .map(TaskId)
                    .ok_or_else(|| LineError::Parse(format!("invalid task id {dep:?}")))
            })
            .collect::<Result<Vec<_>, _>>()?,
    };

    let def = TaskDef {
        id,
        release,
        deadline,
        workload,
        dependencies,
    };
    def.validate().map_err(LineError::Task)?;
    Ok(def)
}

/// 1-based task id for the task at zero-based `index`, or `None` once ids
/// run out.
pub fn task_id_at(index: usize) -> Option<TaskId> {
    u32::try_from(index).ok()?.checked_add(1).map(TaskId)
}

/// Parse a single `release,deadline,workload[; deps]` definition, e.g. from
/// a command-line argument.
pub fn parse_task(text: &str, id: TaskId) -> Result<TaskDef, LoadError> {
    parse_line(text, id).map_err(|e| match e {
        LineError::Parse(reason) => LoadError::Parse {
            line: 1,
            reason,
            text: text.to_string(),
        },
        LineError::Task(source) => LoadError::Task { line: 1, source },
    })
}

/// Parse a whole task file.
pub fn parse_tasks(input: &str) -> Result<Vec<TaskDef>, LoadError> {
    let mut tasks = Vec::new();
    for (i, raw) in input.lines().enumerate() {
        let line = i + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }
        let id = task_id_at(tasks.len()).ok_or(LoadError::TooManyTasks { line })?;
        match parse_line(text, id) {
            Ok(def) => tasks.push(def),
            Err(LineError::Parse(reason)) => {
                return Err(LoadError::Parse {
                    line,
                    reason,
                    text: text.to_string(),
                })
            }
            Err(LineError::Task(source)) => return Err(LoadError::Task { line, source }),
        }
    }
    validate_set(&tasks)?;
    Ok(tasks)
}

/// Read and parse a task file.
pub fn load_tasks(path: &Path) -> Result<Vec<TaskDef>, LoadError> {
    let input = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let tasks = parse_tasks(&input)?;
    debug!(path = %path.display(), tasks = tasks.len(), "loaded task file");
    Ok(tasks)
}
