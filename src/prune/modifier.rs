//! Magnitude pruning modifier: the lifecycle surface the training loop
//! drives
//!
//! The modifier owns the schedule, the compiled selector, and the mask
//! engine. The external loop calls `initialize` once, `check_mask_update`
//! once per step (or epoch), `mask_gradients` between backward and the
//! optimizer step in hook mode, `reapply_masks` after each optimizer step
//! in re-masking mode, and `finalize` once at the end.

use crate::error::Result;
use crate::model::Model;
use crate::prune::config::{MaskMode, PruningConfig};
use crate::prune::engine::MaskEngine;
use crate::prune::schedule::SparsitySchedule;
use crate::prune::select::ParamSelector;

/// Gradual magnitude pruning of model parameters during fine-tuning.
///
/// # Example
///
/// ```
/// use podar::prune::{MagnitudePruningModifier, PruningConfig};
/// use podar::{Model, Tensor};
///
/// let config = PruningConfig::new()
///     .with_final_sparsity(0.5)
///     .with_end_step(1000)
///     .with_update_frequency(100);
/// let mut modifier = MagnitudePruningModifier::new(config).unwrap();
///
/// let mut model = Model::new();
/// model.add_param("layer.weight", Tensor::from_slice(&[-5.0, -1.0, 0.0, 2.0, 9.0]));
/// modifier.initialize(&model);
///
/// for step in 0..=1000 {
///     modifier.check_mask_update(&mut model, step);
///     // backward pass, modifier.mask_gradients(&mut model), optimizer step
/// }
/// modifier.finalize();
/// ```
#[derive(Debug)]
pub struct MagnitudePruningModifier {
    config: PruningConfig,
    schedule: SparsitySchedule,
    selector: ParamSelector,
    engine: MaskEngine,
    current_sparsity: f32,
}

impl MagnitudePruningModifier {
    /// Create a modifier, validating the configuration.
    ///
    /// # Errors
    ///
    /// Configuration errors (unset or inverted step range, out-of-range
    /// sparsities, zero frequency, invalid selector regex) surface here,
    /// before any training step is processed.
    pub fn new(config: PruningConfig) -> Result<Self> {
        let schedule = config.schedule()?;
        let selector = ParamSelector::compile(config.prunable_params())?;
        Ok(Self {
            config,
            schedule,
            selector,
            engine: MaskEngine::new(),
            current_sparsity: 0.0,
        })
    }

    /// Select prunable parameters and install all-true masks.
    ///
    /// Called once before training steps begin; calling again replaces the
    /// selection, so one call per process is idempotent-safe. Returns the
    /// number of selected parameters — zero is not an error but likely a
    /// misconfiguration, and turns scheduling and masking into no-ops.
    pub fn initialize(&mut self, model: &Model) -> usize {
        self.current_sparsity = 0.0;
        self.engine.select(model, &self.selector)
    }

    /// Scheduled check for one step (or epoch, under epoch granularity).
    ///
    /// Returns true iff the schedule fired: `current_sparsity` was
    /// recomputed and, when nonzero, masks were rebuilt and pruned weights
    /// zeroed. A recomputed sparsity of zero skips the mask update
    /// entirely.
    pub fn check_mask_update(&mut self, model: &mut Model, step: usize) -> bool {
        if !self.schedule.should_update_at_step(step) {
            return false;
        }
        self.current_sparsity = self.schedule.sparsity_at_step(step);
        if self.current_sparsity > 0.0 {
            self.engine
                .update_masks(model, self.current_sparsity, self.config.global_sparsity());
        }
        true
    }

    /// Pre-optimizer gradient transform (hook variant): suppress the
    /// gradient signal to pruned entries. The loop must call this between
    /// the backward pass and the optimizer step when the mask mode is
    /// [`MaskMode::GradientHook`].
    pub fn mask_gradients(&self, model: &mut Model) {
        self.engine.mask_gradients(model);
    }

    /// Re-zero pruned entries (re-masking variant): the loop must call
    /// this after every optimizer step when the mask mode is
    /// [`MaskMode::Reapply`].
    pub fn reapply_masks(&self, model: &mut Model) {
        self.engine.reapply_masks(model);
    }

    /// Release masks and selection state. Must not fail even if
    /// `initialize` selected zero parameters or was never called.
    pub fn finalize(&mut self) {
        self.engine.finalize();
    }

    /// Most recently scheduled sparsity.
    pub fn current_sparsity(&self) -> f32 {
        self.current_sparsity
    }

    /// The configuration this modifier was built from.
    pub fn config(&self) -> &PruningConfig {
        &self.config
    }

    /// The validated schedule.
    pub fn schedule(&self) -> &SparsitySchedule {
        &self.schedule
    }

    /// The mask engine (mask registry, counters, measured sparsities).
    pub fn engine(&self) -> &MaskEngine {
        &self.engine
    }

    /// Number of prunable parameters selected at initialization.
    pub fn num_prunable(&self) -> usize {
        self.engine.num_prunable()
    }

    /// Whether the loop is expected to call [`reapply_masks`](Self::reapply_masks)
    /// after every optimizer step.
    pub fn needs_reapply(&self) -> bool {
        self.config.mask_mode() == MaskMode::Reapply
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::Tensor;

    fn config() -> PruningConfig {
        PruningConfig::new()
            .with_init_sparsity(0.0)
            .with_final_sparsity(0.8)
            .with_start_step(0)
            .with_end_step(1000)
            .with_update_frequency(100)
    }

    fn model() -> Model {
        let mut m = Model::new();
        m.add_param(
            "encoder.weight",
            Tensor::from_slice(&[-5.0, -1.0, 0.1, 2.0, 9.0, -3.0, 0.4, 7.0, -0.2, 6.0]),
        );
        m.add_param("encoder.bias", Tensor::from_slice(&[0.5, -0.5, 0.1, 0.9]));
        m
    }

    #[test]
    fn test_new_rejects_unset_end_step() {
        // TEST_ID: MOD-001
        let result = MagnitudePruningModifier::new(PruningConfig::default());
        assert!(
            result.is_err(),
            "MOD-001 FALSIFIED: construction must fail while end_step is unset"
        );
    }

    #[test]
    fn test_new_rejects_invalid_selector() {
        // TEST_ID: MOD-002
        let config = config().with_prunable_params("(unclosed");
        assert!(MagnitudePruningModifier::new(config).is_err());
    }

    #[test]
    fn test_initialize_reports_match_count() {
        // TEST_ID: MOD-003
        let mut modifier =
            MagnitudePruningModifier::new(config().with_prunable_params("weight")).unwrap();
        let model = model();
        assert_eq!(modifier.initialize(&model), 1);
        assert_eq!(modifier.num_prunable(), 1);
        assert!(modifier.engine().mask("encoder.weight").is_some());
        assert!(modifier.engine().mask("encoder.bias").is_none());
    }

    #[test]
    fn test_initialize_twice_is_safe() {
        // TEST_ID: MOD-004
        let mut modifier = MagnitudePruningModifier::new(config()).unwrap();
        let model = model();
        assert_eq!(modifier.initialize(&model), 2);
        assert_eq!(modifier.initialize(&model), 2);
        assert!(modifier.engine().mask("encoder.weight").unwrap().is_all_true());
    }

    #[test]
    fn test_check_fires_only_on_frequency_grid() {
        // TEST_ID: MOD-005
        let mut modifier = MagnitudePruningModifier::new(config()).unwrap();
        let mut m = model();
        modifier.initialize(&m);
        assert!(modifier.check_mask_update(&mut m, 0));
        assert!(
            !modifier.check_mask_update(&mut m, 50),
            "MOD-005 FALSIFIED: off-grid step must not trigger"
        );
        assert!(modifier.check_mask_update(&mut m, 100));
        assert!(modifier.check_mask_update(&mut m, 1100));
    }

    #[test]
    fn test_zero_sparsity_trigger_skips_threshold_query() {
        // TEST_ID: MOD-006
        let mut modifier = MagnitudePruningModifier::new(config()).unwrap();
        let mut m = model();
        modifier.initialize(&m);
        // init_sparsity is 0.0, so the start-step trigger recomputes
        // sparsity but must not touch masks or issue a threshold query
        assert!(modifier.check_mask_update(&mut m, 0));
        assert_eq!(modifier.current_sparsity(), 0.0);
        assert_eq!(
            modifier.engine().threshold_computations(),
            0,
            "MOD-006 FALSIFIED: zero sparsity must short-circuit the mask update"
        );
        assert!(modifier.engine().mask("encoder.weight").unwrap().is_all_true());
    }

    #[test]
    fn test_sparsity_saturates_at_final() {
        // TEST_ID: MOD-007
        let mut modifier = MagnitudePruningModifier::new(config()).unwrap();
        let mut m = model();
        modifier.initialize(&m);
        modifier.check_mask_update(&mut m, 1000);
        assert!((modifier.current_sparsity() - 0.8).abs() < 1e-6);
        modifier.check_mask_update(&mut m, 2000);
        assert!((modifier.current_sparsity() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_scheduled_update_prunes_weights() {
        // TEST_ID: MOD-008
        let mut modifier = MagnitudePruningModifier::new(config()).unwrap();
        let mut m = model();
        modifier.initialize(&m);
        modifier.check_mask_update(&mut m, 1000);
        let weight = m.param("encoder.weight").unwrap();
        let zeros = weight.data().iter().filter(|&&v| v == 0.0).count();
        // floor(10 * 0.8) = 8 pruned in the weight tensor
        assert_eq!(zeros, 8, "MOD-008 FALSIFIED: expected 8 pruned entries");
    }

    #[test]
    fn test_finalize_without_initialize_is_safe() {
        // TEST_ID: MOD-009
        let mut modifier = MagnitudePruningModifier::new(config()).unwrap();
        modifier.finalize();
        assert_eq!(modifier.num_prunable(), 0);
    }

    #[test]
    fn test_needs_reapply_follows_mask_mode() {
        // TEST_ID: MOD-010
        let hook = MagnitudePruningModifier::new(config()).unwrap();
        assert!(!hook.needs_reapply());
        let reapply =
            MagnitudePruningModifier::new(config().with_mask_mode(MaskMode::Reapply)).unwrap();
        assert!(reapply.needs_reapply());
    }
}
