//! Sparsity schedule: polynomial interpolation between initial and final
//! sparsity over a step range, gated by an update frequency.
//!
//! The interpolation exponent shapes the pruning rate: `power = 1` is
//! linear; `power > 1` follows `t^(1/power)`, pruning aggressively early
//! and tapering off as sparsity approaches the final value, giving the
//! model the remaining steps to recover accuracy.

use crate::error::{PruneError, Result};
use serde::{Deserialize, Serialize};

/// Which lifecycle clock drives schedule checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UpdateGranularity {
    /// Check once per training step, keyed by the global step count.
    #[default]
    Step,
    /// Check once per epoch, keyed by the epoch number.
    Epoch,
}

/// Polynomial sparsity schedule.
///
/// # Example
///
/// ```
/// use podar::prune::SparsitySchedule;
///
/// let schedule = SparsitySchedule::new(0.0, 0.9, 0, 1000, 100, 3.0);
/// schedule.validate().unwrap();
/// assert_eq!(schedule.sparsity_at_step(0), 0.0);
/// assert_eq!(schedule.sparsity_at_step(1000), 0.9);
/// assert!(schedule.should_update_at_step(500));
/// assert!(!schedule.should_update_at_step(550));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparsitySchedule {
    /// Sparsity at `start_step`.
    pub init_sparsity: f32,
    /// Sparsity at and after `end_step`.
    pub final_sparsity: f32,
    /// Step at which pruning begins.
    pub start_step: usize,
    /// Step at which `final_sparsity` is reached.
    pub end_step: usize,
    /// Recompute masks every N steps.
    pub update_frequency: usize,
    /// Interpolation power; the curve follows `t^(1/power)`.
    pub power: f32,
}

impl SparsitySchedule {
    /// Create a schedule. Call [`validate`](Self::validate) before use.
    pub fn new(
        init_sparsity: f32,
        final_sparsity: f32,
        start_step: usize,
        end_step: usize,
        update_frequency: usize,
        power: f32,
    ) -> Self {
        Self {
            init_sparsity,
            final_sparsity,
            start_step,
            end_step,
            update_frequency,
            power,
        }
    }

    /// Check schedule parameters.
    ///
    /// # Errors
    ///
    /// Rejects `start_step >= end_step`, sparsities outside `[0, 1]`,
    /// a zero update frequency, and a non-positive power.
    pub fn validate(&self) -> Result<()> {
        if self.start_step >= self.end_step {
            return Err(PruneError::InvalidStepRange {
                start_step: self.start_step,
                end_step: self.end_step,
            });
        }
        for (name, value) in [
            ("init_sparsity", self.init_sparsity),
            ("final_sparsity", self.final_sparsity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PruneError::InvalidConfig(format!(
                    "{name} ({value}) must be between 0.0 and 1.0"
                )));
            }
        }
        if self.update_frequency == 0 {
            return Err(PruneError::InvalidConfig(
                "update_frequency must be at least 1".to_string(),
            ));
        }
        if self.power <= 0.0 {
            return Err(PruneError::InvalidConfig(format!(
                "power ({}) must be positive",
                self.power
            )));
        }
        Ok(())
    }

    /// Target sparsity at a training step.
    ///
    /// The step is clamped into `[start_step, end_step]`, so every step at
    /// or before the start yields exactly `init_sparsity` and every step
    /// at or after the end yields exactly `final_sparsity`.
    pub fn sparsity_at_step(&self, step: usize) -> f32 {
        if step <= self.start_step {
            return self.init_sparsity;
        }
        if step >= self.end_step {
            return self.final_sparsity;
        }
        let t = (step - self.start_step) as f32 / (self.end_step - self.start_step) as f32;
        self.init_sparsity + (self.final_sparsity - self.init_sparsity) * t.powf(1.0 / self.power)
    }

    /// Whether a mask update fires at this step.
    ///
    /// True iff `step >= start_step` and `(step - start_step)` is a
    /// multiple of the update frequency; the start step itself fires.
    /// Steps past `end_step` still fire on the frequency grid — sparsity
    /// has saturated at `final_sparsity`, so those updates are idempotent.
    pub fn should_update_at_step(&self, step: usize) -> bool {
        step >= self.start_step && (step - self.start_step).is_multiple_of(self.update_frequency)
    }
}

// =============================================================================
// Tests
// =============================================================================


// =============================================================================
// Property Tests with Proptest
// =============================================================================
