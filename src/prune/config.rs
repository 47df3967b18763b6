//! Pruning configuration
//!
//! Immutable parameters supplied at modifier construction. Field names and
//! defaults follow the sparsification argument surface of the fine-tuning
//! recipe this crate serves.

use crate::error::{PruneError, Result};
use crate::prune::schedule::{SparsitySchedule, UpdateGranularity};
use serde::{Deserialize, Serialize};

/// Name matching every parameter, bypassing regex selection.
pub const ALL_PARAMS: &str = "__ALL__";

/// How pruned entries are kept at zero between mask updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MaskMode {
    /// Multiply gradients by the mask before the optimizer consumes them,
    /// so pruned weights receive no gradient signal.
    #[default]
    GradientHook,
    /// Re-apply `parameter *= mask` after every optimizer step. Required
    /// every step, not just update steps: momentum-driven optimizer state
    /// can reintroduce nonzero values at pruned positions.
    Reapply,
}

/// Configuration for magnitude pruning during fine-tuning.
///
/// # Example
///
/// ```
/// use podar::prune::{MaskMode, PruningConfig};
///
/// let config = PruningConfig::new()
///     .with_init_sparsity(0.0)
///     .with_final_sparsity(0.9)
///     .with_end_step(10_000)
///     .with_prunable_params("weight")
///     .with_mask_mode(MaskMode::GradientHook);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PruningConfig {
    /// Sparsity at the start of the schedule.
    init_sparsity: f32,
    /// Sparsity at the end of the schedule.
    final_sparsity: f32,
    /// Step at which pruning begins.
    start_step: usize,
    /// Step at which final sparsity is reached. `None` means unset; a
    /// value must be supplied before the modifier is constructed.
    end_step: Option<usize>,
    /// Recompute masks every N steps.
    update_frequency: usize,
    /// `"__ALL__"`, or a regex searched against parameter names.
    prunable_params: String,
    /// Pool magnitude scores on the CPU in global mode. A placement knob
    /// with no effect on output values; a no-op for this host-resident
    /// backend, accepted for config compatibility.
    comp_scores_on_cpu: bool,
    /// One threshold over all prunable parameters instead of one per
    /// parameter.
    global_sparsity: bool,
    /// Interpolation power of the sparsity schedule.
    inter_pow: f32,
    /// Gradient-hook suppression vs. explicit re-masking.
    mask_mode: MaskMode,
    /// Step-based vs. epoch-based schedule checks.
    granularity: UpdateGranularity,
    /// Emit sparsity logs every N steps; `None` disables logging.
    log_frequency: Option<usize>,
}

impl Default for PruningConfig {
    fn default() -> Self {
        Self {
            init_sparsity: 0.0,
            final_sparsity: 0.5,
            start_step: 0,
            end_step: None,
            update_frequency: 100,
            prunable_params: ALL_PARAMS.to_string(),
            comp_scores_on_cpu: false,
            global_sparsity: false,
            inter_pow: 3.0,
            mask_mode: MaskMode::default(),
            granularity: UpdateGranularity::default(),
            log_frequency: None,
        }
    }
}

impl PruningConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial sparsity.
    pub fn with_init_sparsity(mut self, sparsity: f32) -> Self {
        self.init_sparsity = sparsity;
        self
    }

    /// Set the final sparsity.
    pub fn with_final_sparsity(mut self, sparsity: f32) -> Self {
        self.final_sparsity = sparsity;
        self
    }

    /// Set the step at which pruning begins.
    pub fn with_start_step(mut self, step: usize) -> Self {
        self.start_step = step;
        self
    }

    /// Set the step at which final sparsity is reached.
    pub fn with_end_step(mut self, step: usize) -> Self {
        self.end_step = Some(step);
        self
    }

    /// Set the mask update frequency.
    pub fn with_update_frequency(mut self, frequency: usize) -> Self {
        self.update_frequency = frequency;
        self
    }

    /// Set the prunable-parameter selector (`"__ALL__"` or a regex).
    pub fn with_prunable_params(mut self, selector: impl Into<String>) -> Self {
        self.prunable_params = selector.into();
        self
    }

    /// Pool global magnitude scores on the CPU.
    pub fn with_comp_scores_on_cpu(mut self, on_cpu: bool) -> Self {
        self.comp_scores_on_cpu = on_cpu;
        self
    }

    /// Use one threshold across all prunable parameters.
    pub fn with_global_sparsity(mut self, global: bool) -> Self {
        self.global_sparsity = global;
        self
    }

    /// Set the interpolation power.
    pub fn with_inter_pow(mut self, power: f32) -> Self {
        self.inter_pow = power;
        self
    }

    /// Set the mask maintenance mode.
    pub fn with_mask_mode(mut self, mode: MaskMode) -> Self {
        self.mask_mode = mode;
        self
    }

    /// Set the schedule-check granularity.
    pub fn with_granularity(mut self, granularity: UpdateGranularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Enable sparsity logging every `frequency` steps.
    pub fn with_log_frequency(mut self, frequency: usize) -> Self {
        self.log_frequency = Some(frequency);
        self
    }

    /// Get the initial sparsity.
    pub fn init_sparsity(&self) -> f32 {
        self.init_sparsity
    }

    /// Get the final sparsity.
    pub fn final_sparsity(&self) -> f32 {
        self.final_sparsity
    }

    /// Get the start step.
    pub fn start_step(&self) -> usize {
        self.start_step
    }

    /// Get the end step, if set.
    pub fn end_step(&self) -> Option<usize> {
        self.end_step
    }

    /// Get the update frequency.
    pub fn update_frequency(&self) -> usize {
        self.update_frequency
    }

    /// Get the prunable-parameter selector string.
    pub fn prunable_params(&self) -> &str {
        &self.prunable_params
    }

    /// Whether global scores are pooled on the CPU.
    pub fn comp_scores_on_cpu(&self) -> bool {
        self.comp_scores_on_cpu
    }

    /// Whether sparsity is global.
    pub fn global_sparsity(&self) -> bool {
        self.global_sparsity
    }

    /// Get the interpolation power.
    pub fn inter_pow(&self) -> f32 {
        self.inter_pow
    }

    /// Get the mask maintenance mode.
    pub fn mask_mode(&self) -> MaskMode {
        self.mask_mode
    }

    /// Get the schedule-check granularity.
    pub fn granularity(&self) -> UpdateGranularity {
        self.granularity
    }

    /// Get the log frequency, if logging is enabled.
    pub fn log_frequency(&self) -> Option<usize> {
        self.log_frequency
    }

    /// Build the sparsity schedule from this configuration.
    ///
    /// # Errors
    ///
    /// Fails if `end_step` is unset or the schedule parameters are invalid.
    pub fn schedule(&self) -> Result<SparsitySchedule> {
        let end_step = self.end_step.ok_or(PruneError::EndStepUnset)?;
        let schedule = SparsitySchedule::new(
            self.init_sparsity,
            self.final_sparsity,
            self.start_step,
            end_step,
            self.update_frequency,
            self.inter_pow,
        );
        schedule.validate()?;
        Ok(schedule)
    }

    /// Validate the full configuration, including the selector pattern.
    pub fn validate(&self) -> Result<()> {
        self.schedule()?;
        if self.prunable_params != ALL_PARAMS {
            regex::Regex::new(&self.prunable_params)?;
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
