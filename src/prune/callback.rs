//! Pruning callback for training-loop integration
//!
//! Wires the magnitude pruning modifier into the crate's callback
//! contract: schedule checks on step (or epoch) boundaries, re-masking
//! after optimizer steps, and sparsity logging gated by log frequency and
//! the main-process flag.

use crate::metrics::{Metric, MetricsCollector};
use crate::model::Model;
use crate::prune::config::PruningConfig;
use crate::prune::modifier::MagnitudePruningModifier;
use crate::prune::schedule::UpdateGranularity;
use crate::train::callback::{CallbackAction, CallbackContext, TrainerCallback};

/// Callback applying magnitude pruning during training.
///
/// In [`MaskMode::GradientHook`](crate::prune::MaskMode::GradientHook) the
/// loop must additionally call [`mask_gradients`](Self::mask_gradients)
/// between the backward pass and the optimizer step; the callback contract
/// has no hook at that point by design — the optimizer boundary belongs to
/// the loop.
#[derive(Debug)]
pub struct PruningCallback {
    modifier: MagnitudePruningModifier,
    collector: MetricsCollector,
}

impl PruningCallback {
    /// Create a callback from a validated configuration.
    ///
    /// # Errors
    ///
    /// Propagates configuration errors from
    /// [`MagnitudePruningModifier::new`].
    pub fn new(config: PruningConfig) -> crate::error::Result<Self> {
        Ok(Self {
            modifier: MagnitudePruningModifier::new(config)?,
            collector: MetricsCollector::new(),
        })
    }

    /// The wrapped modifier.
    pub fn modifier(&self) -> &MagnitudePruningModifier {
        &self.modifier
    }

    /// Recorded sparsity metrics.
    pub fn collector(&self) -> &MetricsCollector {
        &self.collector
    }

    /// Pre-optimizer gradient transform; see the type-level docs.
    pub fn mask_gradients(&self, model: &mut Model) {
        self.modifier.mask_gradients(model);
    }

    /// Most recently scheduled sparsity.
    pub fn current_sparsity(&self) -> f32 {
        self.modifier.current_sparsity()
    }

    fn should_log(&self, step: usize) -> bool {
        self.modifier
            .config()
            .log_frequency()
            .is_some_and(|freq| freq > 0 && step.is_multiple_of(freq))
    }

    fn check(&mut self, model: &mut Model, step: usize, ctx: &CallbackContext) {
        if !self.modifier.check_mask_update(model, step) {
            return;
        }
        if !self.should_log(step) || !ctx.is_main_process {
            return;
        }
        let sparsity = self.modifier.current_sparsity();
        self.collector
            .record(Metric::Sparsity, step, f64::from(sparsity));
        eprintln!("[PruningCallback] step {step}: sparsity {sparsity:.4}");
        for (name, measured) in self.modifier.engine().parameter_sparsities(model) {
            eprintln!("[PruningCallback]   {name}: {measured:.4}");
        }
    }
}

impl TrainerCallback for PruningCallback {
    fn on_train_begin(&mut self, model: &mut Model, ctx: &CallbackContext) -> CallbackAction {
        let selected = self.modifier.initialize(model);
        if selected == 0 && ctx.is_main_process {
            eprintln!(
                "[PruningCallback] no parameters matched prunable_params {:?}; pruning is a no-op",
                self.modifier.config().prunable_params()
            );
        }
        CallbackAction::Continue
    }

    fn on_epoch_begin(&mut self, model: &mut Model, ctx: &CallbackContext) -> CallbackAction {
        if self.modifier.config().granularity() == UpdateGranularity::Epoch {
            self.check(model, ctx.epoch, ctx);
        }
        CallbackAction::Continue
    }

    fn on_step_begin(&mut self, model: &mut Model, ctx: &CallbackContext) -> CallbackAction {
        if self.modifier.config().granularity() == UpdateGranularity::Step {
            self.check(model, ctx.global_step, ctx);
        }
        CallbackAction::Continue
    }

    fn on_step_end(&mut self, model: &mut Model, _ctx: &CallbackContext) -> CallbackAction {
        // Every step, not just update steps: an unmasked optimizer step can
        // reintroduce nonzero values at pruned positions.
        if self.modifier.needs_reapply() {
            self.modifier.reapply_masks(model);
        }
        CallbackAction::Continue
    }

    fn on_train_end(&mut self, _model: &mut Model, ctx: &CallbackContext) {
        if ctx.is_main_process && self.modifier.current_sparsity() > 0.0 {
            eprintln!(
                "[PruningCallback] training complete, final sparsity {:.4}",
                self.modifier.current_sparsity()
            );
        }
        self.modifier.finalize();
    }

    fn name(&self) -> &'static str {
        "PruningCallback"
    }
}

// =============================================================================
// Tests
// =============================================================================
