//! Newtype wrappers and type aliases for domain concepts.
//!
//! Task identifiers get a newtype so they cannot be confused with registry
//! indices. Time, work, frequency and energy are plain `f64` aliases.

use std::fmt;

/// Stable task identifier, assigned 1-based in input order by the builder
/// and the batch loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u32);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Simulated time (abstract units).
pub type Time = f64;

/// Amount of work (frequency × time).
pub type Work = f64;

/// Processor frequency (work per unit time).
pub type Freq = f64;

/// Accumulated energy (frequency^alpha × time).
pub type Energy = f64;

/// Remaining workload at or below this is treated as complete.
pub const EPSILON: Work = 1e-6;

/// Whether a remaining workload counts as finished.
pub fn is_complete(remaining: Work) -> bool {
    remaining <= EPSILON
}
