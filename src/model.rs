//! Named-parameter store
//!
//! A `Model` is an ordered mapping from parameter name to tensor, the shape
//! the pruning engine expects from the training side. Insertion order is
//! preserved so global score pooling is deterministic across processes
//! holding identical model state.

use crate::tensor::Tensor;

/// Ordered collection of named parameters.
#[derive(Debug, Clone, Default)]
pub struct Model {
    params: Vec<(String, Tensor)>,
}

impl Model {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named parameter. Names must be unique; a duplicate replaces
    /// the existing tensor in place, keeping the original position.
    pub fn add_param(&mut self, name: impl Into<String>, tensor: Tensor) {
        let name = name.into();
        if let Some(slot) = self.params.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = tensor;
        } else {
            self.params.push((name, tensor));
        }
    }

    /// Iterate over `(name, tensor)` pairs in insertion order.
    pub fn named_parameters(&self) -> impl Iterator<Item = (&str, &Tensor)> {
        self.params.iter().map(|(n, t)| (n.as_str(), t))
    }

    /// Iterate mutably over `(name, tensor)` pairs in insertion order.
    pub fn named_parameters_mut(&mut self) -> impl Iterator<Item = (&str, &mut Tensor)> {
        self.params.iter_mut().map(|(n, t)| (n.as_str(), t))
    }

    /// Look up a parameter by name.
    pub fn param(&self, name: &str) -> Option<&Tensor> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    /// Look up a parameter mutably by name.
    pub fn param_mut(&mut self, name: &str) -> Option<&mut Tensor> {
        self.params
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, t)| t)
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// True if the model holds no parameters.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
