//! Cyclic learning-rate schedulers with warmup
//!
//! The pruning recipes this crate serves pair gradual pruning with cyclic
//! learning rates: each cycle warms up linearly, then decays (linearly or
//! with a cosine curve), and the schedule restarts every `cycle_steps` —
//! giving the model a fresh learning-rate burst after each sparsity jump.

use crate::error::{PruneError, Result};

/// Learning rate scheduler trait
pub trait LRScheduler {
    /// Learning rate for the current step, as a multiplier on the base
    /// learning rate.
    fn get_lr(&self) -> f32;

    /// Step the scheduler (typically called once per training step).
    fn step(&mut self);
}

/// Linear warmup followed by linear decay, cycling every `cycle_steps`.
pub struct CyclicLinearLR {
    warmup_steps: usize,
    cycle_steps: usize,
    current_step: usize,
}

impl CyclicLinearLR {
    /// Create a scheduler. `warmup_steps` greater than `cycle_steps` is
    /// truncated to the cycle length.
    pub fn new(warmup_steps: usize, cycle_steps: usize) -> Self {
        let cycle_steps = cycle_steps.max(1);
        Self {
            warmup_steps: warmup_steps.min(cycle_steps),
            cycle_steps,
            current_step: 0,
        }
    }
}

/// Warmup multiplier and decay progress within the current cycle.
///
/// The decay ratio is negative during warmup, pushing the decay factor
/// above 1 while the warmup ramp dominates; the two curves cross at the
/// end of warmup.
fn cycle_position(step: usize, warmup_steps: usize, cycle_steps: usize) -> (f32, f32) {
    let adj_step = step % cycle_steps;
    let warmup_mult = if warmup_steps == 0 {
        1.0
    } else {
        (adj_step as f32 / warmup_steps as f32).min(1.0)
    };
    let decay_span = (cycle_steps.saturating_sub(warmup_steps + 1)).max(1) as f32;
    let ratio = (adj_step as f32 - warmup_steps as f32) / decay_span;
    (warmup_mult, ratio)
}

impl LRScheduler for CyclicLinearLR {
    fn get_lr(&self) -> f32 {
        let (warmup_mult, ratio) = cycle_position(self.current_step, self.warmup_steps, self.cycle_steps);
        warmup_mult * (1.0 - ratio)
    }

    fn step(&mut self) {
        self.current_step += 1;
    }
}

/// Linear warmup followed by cosine decay, cycling every `cycle_steps`.
pub struct CyclicCosineLR {
    warmup_steps: usize,
    cycle_steps: usize,
    current_step: usize,
}

impl CyclicCosineLR {
    /// Create a scheduler. `warmup_steps` greater than `cycle_steps` is
    /// truncated to the cycle length.
    pub fn new(warmup_steps: usize, cycle_steps: usize) -> Self {
        let cycle_steps = cycle_steps.max(1);
        Self {
            warmup_steps: warmup_steps.min(cycle_steps),
            cycle_steps,
            current_step: 0,
        }
    }
}

impl LRScheduler for CyclicCosineLR {
    fn get_lr(&self) -> f32 {
        let (warmup_mult, ratio) = cycle_position(self.current_step, self.warmup_steps, self.cycle_steps);
        // only the cosine output is clamped; a negative ratio is fed
        // through as-is
        let cos_mult = (0.5 * (1.0 + (std::f32::consts::PI * ratio).cos())).max(0.0);
        warmup_mult * cos_mult
    }

    fn step(&mut self) {
        self.current_step += 1;
    }
}

/// Build a cyclic scheduler by name (`"cyclic_linear"` or
/// `"cyclic_cosine"`).
///
/// # Errors
///
/// Unknown names fail with [`PruneError::InvalidConfig`].
pub fn create_scheduler(
    kind: &str,
    warmup_steps: usize,
    cycle_steps: usize,
) -> Result<Box<dyn LRScheduler>> {
    match kind {
        "cyclic_linear" => Ok(Box::new(CyclicLinearLR::new(warmup_steps, cycle_steps))),
        "cyclic_cosine" => Ok(Box::new(CyclicCosineLR::new(warmup_steps, cycle_steps))),
        other => Err(PruneError::InvalidConfig(format!(
            "unknown lr schedule {other:?}"
        ))),
    }
}
