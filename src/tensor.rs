//! Minimal tensor with an optional gradient slot
//!
//! Stand-in for the autograd backend at the pruning boundary: the engine
//! only needs element access, in-place mutation, and a gradient buffer of
//! the same length.

use ndarray::Array1;

/// A flat `f32` tensor with a logical shape and an optional gradient.
///
/// Data is stored flattened; `shape` records the logical dimensions so
/// masks can assert shape agreement.
#[derive(Debug, Clone)]
pub struct Tensor {
    data: Array1<f32>,
    shape: Vec<usize>,
    grad: Option<Array1<f32>>,
}

impl Tensor {
    /// Create a 1-D tensor from a slice.
    pub fn from_slice(values: &[f32]) -> Self {
        Self {
            data: Array1::from_vec(values.to_vec()),
            shape: vec![values.len()],
            grad: None,
        }
    }

    /// Create a tensor from flattened values and a logical shape.
    ///
    /// Returns `None` if the shape does not account for every element.
    pub fn from_shape(values: Vec<f32>, shape: Vec<usize>) -> Option<Self> {
        if shape.iter().product::<usize>() != values.len() {
            return None;
        }
        Some(Self {
            data: Array1::from_vec(values),
            shape,
            grad: None,
        })
    }

    /// Create a zero-filled 1-D tensor of length `n`.
    pub fn zeros(n: usize) -> Self {
        Self {
            data: Array1::zeros(n),
            shape: vec![n],
            grad: None,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the tensor has no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Logical shape.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Flattened data view.
    pub fn data(&self) -> &Array1<f32> {
        &self.data
    }

    /// Mutable flattened data view.
    pub fn data_mut(&mut self) -> &mut Array1<f32> {
        &mut self.data
    }

    /// Current gradient, if one has been set.
    pub fn grad(&self) -> Option<&Array1<f32>> {
        self.grad.as_ref()
    }

    /// Mutable access to the current gradient.
    pub fn grad_mut(&mut self) -> Option<&mut Array1<f32>> {
        self.grad.as_mut()
    }

    /// Install a gradient. Silently ignored if the length does not match
    /// the parameter; the backend owns shape agreement for gradients.
    pub fn set_grad(&mut self, grad: Array1<f32>) {
        if grad.len() == self.data.len() {
            self.grad = Some(grad);
        }
    }

    /// Drop the gradient.
    pub fn zero_grad(&mut self) {
        self.grad = None;
    }
}
