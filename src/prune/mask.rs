//! Boolean keep-masks
//!
//! A mask marks which entries of a parameter survive pruning: `true` keeps
//! the value, `false` forces it to zero. Masks are replaced wholesale on
//! each update, never merged, and always share their parameter's shape.

use crate::tensor::Tensor;
use ndarray::Array1;

/// Boolean keep-mask for one parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    keep: Array1<bool>,
    shape: Vec<usize>,
}

impl Mask {
    /// All-true mask matching a parameter's shape.
    pub fn ones_like(param: &Tensor) -> Self {
        Self {
            keep: Array1::from_elem(param.len(), true),
            shape: param.shape().to_vec(),
        }
    }

    /// Mask keeping entries whose magnitude is strictly greater than the
    /// threshold. Ties at the threshold are pruned; with many entries at
    /// the exact threshold magnitude (e.g. exact zeros) the achieved
    /// sparsity can exceed the requested fraction.
    pub fn from_threshold(param: &Tensor, threshold: f32) -> Self {
        Self {
            keep: param.data().mapv(|v| v.abs() > threshold),
            shape: param.shape().to_vec(),
        }
    }

    /// Zero the parameter entries this mask prunes.
    pub fn apply(&self, param: &mut Tensor) {
        for (value, keep) in param.data_mut().iter_mut().zip(self.keep.iter()) {
            if !keep {
                *value = 0.0;
            }
        }
    }

    /// Multiply a gradient elementwise by this mask, suppressing the
    /// gradient signal to pruned entries.
    pub fn apply_to_grad(&self, grad: &mut Array1<f32>) {
        for (g, keep) in grad.iter_mut().zip(self.keep.iter()) {
            if !keep {
                *g = 0.0;
            }
        }
    }

    /// Fraction of entries this mask prunes.
    pub fn sparsity(&self) -> f32 {
        if self.keep.is_empty() {
            return 0.0;
        }
        let pruned = self.keep.iter().filter(|&&k| !k).count();
        pruned as f32 / self.keep.len() as f32
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.keep.len()
    }

    /// True if the mask covers no entries.
    pub fn is_empty(&self) -> bool {
        self.keep.is_empty()
    }

    /// Logical shape, always equal to the parameter's shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// True if every entry is kept.
    pub fn is_all_true(&self) -> bool {
        self.keep.iter().all(|&k| k)
    }

    /// Keep flags as a slice.
    pub fn values(&self) -> &[bool] {
        self.keep.as_slice().unwrap_or(&[])
    }
}

/// Measured sparsity of a tensor: zero entries over total entries.
///
/// Counts elements, not indices of nonzero positions; the two diverge on
/// multi-dimensional data and only the element count is meaningful.
pub fn measured_sparsity(param: &Tensor) -> f32 {
    if param.is_empty() {
        return 0.0;
    }
    let zeros = param.data().iter().filter(|&&v| v == 0.0).count();
    zeros as f32 / param.len() as f32
}
