//! Error taxonomy.
//!
//! Only input problems are errors. Missed deadlines, structural deadlock
//! and horizon overrun are run outcomes and live in [`crate::ExitKind`].

use std::path::PathBuf;

use thiserror::Error;

use crate::types::TaskId;

/// A task definition (or task set) rejected before any run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskError {
    #[error("task {id}: workload must be positive, got {workload}")]
    NonPositiveWorkload { id: TaskId, workload: f64 },
    #[error("task {id}: deadline {deadline} must be after release time {release}")]
    DeadlineNotAfterRelease {
        id: TaskId,
        release: f64,
        deadline: f64,
    },
    #[error("task {id}: release time must be non-negative, got {release}")]
    NegativeRelease { id: TaskId, release: f64 },
    #[error("task {id}: {field} must be a finite number")]
    NonFinite { id: TaskId, field: &'static str },
    #[error("duplicate task id {0}")]
    DuplicateId(TaskId),
    #[error("task {id}: unknown dependency {dep}")]
    UnknownDependency { id: TaskId, dep: TaskId },
}

/// A batch of task definitions rejected as a whole.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("line {line}: {reason}: {text:?}")]
    Parse {
        line: usize,
        reason: String,
        text: String,
    },
    #[error("line {line}: {source}")]
    Task {
        line: usize,
        #[source]
        source: TaskError,
    },
    #[error("task set: {0}")]
    TaskSet(#[from] TaskError),
    #[error("line {line}: more tasks than 32-bit task ids can number")]
    TooManyTasks { line: usize },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A processor parameter outside its valid range.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{name} = {value}: {reason}")]
pub struct ParamError {
    pub name: &'static str,
    pub value: f64,
    pub reason: &'static str,
}

/// Anything that prevents a run from starting.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error(transparent)]
    Params(#[from] ParamError),
}

/// Invalid processor parameters or an unreadable configuration source.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Params(#[from] ParamError),
    #[error("{var}={value:?}: expected a number")]
    Env { var: &'static str, value: String },
    #[error("failed to parse {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
