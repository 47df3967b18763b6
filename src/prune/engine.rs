//! Mask engine: magnitude thresholds and mask maintenance
//!
//! Given a target sparsity the engine computes the magnitude value at the
//! matching order statistic (per parameter, or once over a global pool),
//! replaces each keep-mask, and zeroes the pruned weights in place.
//!
//! Gradient suppression is registry-indexed rather than closure-captured:
//! [`MaskEngine::mask_gradients`] looks the current mask up by parameter
//! name at call time, so replacing a mask in the registry atomically
//! changes gradient behavior. There is no stale-hook window to defend
//! against.

use crate::model::Model;
use crate::prune::mask::{measured_sparsity, Mask};
use crate::prune::select::ParamSelector;
use std::collections::BTreeMap;

/// Owns the mask registry for the selected prunable parameters.
///
/// The engine is the sole writer of mask state and the sole mutator of
/// parameter values during masking; tensors stay owned by the external
/// [`Model`] and are borrowed only for the duration of each operation.
#[derive(Debug, Clone, Default)]
pub struct MaskEngine {
    /// Prunable parameter names, in model insertion order. The order fixes
    /// the global score pool layout, keeping thresholds deterministic.
    prunable: Vec<String>,
    masks: BTreeMap<String, Mask>,
    threshold_computations: usize,
}

/// The k-th smallest value of `scores`, 1-indexed.
///
/// `k` must be in `1..=scores.len()`; `k == len` selects the maximum, so a
/// sparsity of exactly 1.0 stays in range.
fn kth_smallest(scores: &mut [f32], k: usize) -> f32 {
    debug_assert!(k >= 1 && k <= scores.len());
    let (_, kth, _) = scores.select_nth_unstable_by(k - 1, f32::total_cmp);
    *kth
}

impl MaskEngine {
    /// Create an engine with no selected parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select prunable parameters and install all-true masks.
    ///
    /// Replaces any previous selection, so calling once per process is
    /// idempotent-safe. Returns the number of selected parameters; zero
    /// turns every subsequent operation into a no-op.
    pub fn select(&mut self, model: &Model, selector: &ParamSelector) -> usize {
        self.prunable.clear();
        self.masks.clear();
        self.threshold_computations = 0;
        for (name, param) in model.named_parameters() {
            if selector.matches(name) {
                self.prunable.push(name.to_string());
                self.masks.insert(name.to_string(), Mask::ones_like(param));
            }
        }
        self.prunable.len()
    }

    /// Recompute every mask for the target sparsity and zero pruned
    /// weights.
    ///
    /// `global` selects one threshold over the pooled magnitudes of all
    /// prunable parameters; otherwise each parameter gets its own
    /// threshold. A sparsity of zero returns immediately: masks stay as
    /// they are and no order-statistic query is issued (observable through
    /// [`threshold_computations`](Self::threshold_computations)).
    pub fn update_masks(&mut self, model: &mut Model, sparsity: f32, global: bool) {
        if sparsity <= 0.0 {
            return;
        }
        if global {
            self.update_global(model, sparsity);
        } else {
            self.update_per_param(model, sparsity);
        }
    }

    /// Recompute masks with one global threshold over all prunable
    /// parameters.
    ///
    /// The magnitude pool is concatenated in selection order; `k` is the
    /// same `floor(M * sparsity)` order statistic as the per-parameter
    /// path, applied uniformly. Score pooling always happens on the host
    /// with this backend, so the CPU-offload knob does not change results.
    fn update_global(&mut self, model: &mut Model, sparsity: f32) {
        let mut pool: Vec<f32> = Vec::with_capacity(self.global_pool_len(model));
        for name in &self.prunable {
            if let Some(param) = model.param(name) {
                pool.extend(param.data().iter().map(|v| v.abs()));
            }
        }
        if pool.is_empty() {
            return;
        }
        let k = ((pool.len() as f32 * sparsity) as usize).min(pool.len());
        if k == 0 {
            self.reset_masks(model);
            return;
        }
        self.threshold_computations += 1;
        let threshold = kth_smallest(&mut pool, k);
        for name in &self.prunable {
            if let Some(param) = model.param_mut(name) {
                let mask = Mask::from_threshold(param, threshold);
                mask.apply(param);
                self.masks.insert(name.clone(), mask);
            }
        }
    }

    /// Recompute masks independently per parameter.
    fn update_per_param(&mut self, model: &mut Model, sparsity: f32) {
        for name in &self.prunable {
            let Some(param) = model.param_mut(name) else {
                continue;
            };
            let n = param.len();
            if n == 0 {
                continue;
            }
            let k = ((n as f32 * sparsity) as usize).min(n);
            if k == 0 {
                // fewer than one entry to prune; the replacement mask
                // keeps everything
                self.masks.insert(name.clone(), Mask::ones_like(param));
                continue;
            }
            let mut scores: Vec<f32> = param.data().iter().map(|v| v.abs()).collect();
            self.threshold_computations += 1;
            let threshold = kth_smallest(&mut scores, k);
            let mask = Mask::from_threshold(param, threshold);
            mask.apply(param);
            self.masks.insert(name.clone(), mask);
        }
    }

    /// Replace every mask with an all-true mask of the parameter's shape.
    fn reset_masks(&mut self, model: &Model) {
        for name in &self.prunable {
            if let Some(param) = model.param(name) {
                self.masks.insert(name.clone(), Mask::ones_like(param));
            }
        }
    }

    /// Multiply each prunable parameter's stored gradient elementwise by
    /// its current mask.
    ///
    /// This is the pre-optimizer gradient transform of the hook variant:
    /// pruned entries receive no gradient signal, unpruned gradients pass
    /// through untouched.
    pub fn mask_gradients(&self, model: &mut Model) {
        for (name, mask) in &self.masks {
            if let Some(param) = model.param_mut(name) {
                if let Some(grad) = param.grad_mut() {
                    mask.apply_to_grad(grad);
                }
            }
        }
    }

    /// Re-zero pruned entries of every prunable parameter.
    ///
    /// The non-hook variant calls this after every optimizer step, since
    /// momentum-driven updates can reintroduce nonzero values at pruned
    /// positions.
    pub fn reapply_masks(&self, model: &mut Model) {
        for (name, mask) in &self.masks {
            if let Some(param) = model.param_mut(name) {
                mask.apply(param);
            }
        }
    }

    /// Release all masks and selection state. Safe to call when nothing
    /// was ever selected.
    pub fn finalize(&mut self) {
        self.prunable.clear();
        self.masks.clear();
    }

    /// Current mask for a parameter, if it is prunable.
    pub fn mask(&self, name: &str) -> Option<&Mask> {
        self.masks.get(name)
    }

    /// Selected parameter names in pool order.
    pub fn prunable_names(&self) -> &[String] {
        &self.prunable
    }

    /// Number of selected parameters.
    pub fn num_prunable(&self) -> usize {
        self.prunable.len()
    }

    /// How many order-statistic queries have been issued since selection.
    pub fn threshold_computations(&self) -> usize {
        self.threshold_computations
    }

    /// Measured sparsity of each prunable parameter (zero entries over
    /// total entries).
    pub fn parameter_sparsities(&self, model: &Model) -> Vec<(String, f32)> {
        self.prunable
            .iter()
            .filter_map(|name| {
                model
                    .param(name)
                    .map(|param| (name.clone(), measured_sparsity(param)))
            })
            .collect()
    }

    fn global_pool_len(&self, model: &Model) -> usize {
        self.prunable
            .iter()
            .filter_map(|name| model.param(name).map(crate::tensor::Tensor::len))
            .sum()
    }
}

// =============================================================================
// Tests
// =============================================================================
