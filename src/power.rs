//! Frequency and energy model.
//!
//! Dynamic power is modeled as `f^alpha`: with voltage scaling linearly in
//! frequency, `V^2 * f` collapses to a single power-law term. A slice run
//! at frequency `f` for duration `d` costs `f^alpha * d`.
//!
//! Everything here is pure. The engine applies the returned work and
//! energy to its own state.

use crate::scenario::ProcessorParams;
use crate::types::{Energy, Freq, Time, Work};

/// Outcome of running one task for (at most) one quantum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliceCost {
    /// Frequency held for the whole slice.
    pub frequency: Freq,
    /// `dt`, or less when the task finishes mid-quantum.
    pub duration: Time,
    /// Work performed, never more than what remained.
    pub work: Work,
    pub energy: Energy,
}

/// Frequency needed to finish `remaining` work by `deadline` starting at
/// `t`, clamped to `[f_min, f_max]`. Zero or negative slack runs flat out.
pub fn required_frequency(
    remaining: Work,
    deadline: Time,
    t: Time,
    params: &ProcessorParams,
) -> Freq {
    let slack = deadline - t;
    if slack > 0.0 {
        (remaining / slack).clamp(params.f_min, params.f_max)
    } else {
        params.f_max
    }
}

/// Energy of holding `frequency` for `duration`.
pub fn energy_cost(frequency: Freq, duration: Time, alpha: f64) -> Energy {
    frequency.powf(alpha) * duration
}

/// Plan the next slice for a task with `remaining` work.
pub fn plan_slice(
    remaining: Work,
    deadline: Time,
    t: Time,
    params: &ProcessorParams,
) -> SliceCost {
    let frequency = required_frequency(remaining, deadline, t, params);
    let capacity = frequency * params.dt;
    let duration = if capacity <= remaining {
        params.dt
    } else {
        remaining / frequency
    };
    SliceCost {
        frequency,
        duration,
        work: capacity.min(remaining),
        energy: energy_cost(frequency, duration, params.alpha),
    }
}
