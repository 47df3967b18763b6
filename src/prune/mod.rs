//! Magnitude pruning during fine-tuning
//!
//! This module implements gradual magnitude pruning driven by an external
//! training loop:
//!
//! - **Sparsity Schedule**: polynomial interpolation between initial and
//!   final sparsity over a step range, gated by an update frequency
//! - **Mask Engine**: magnitude thresholds via order statistics
//!   (per-parameter or global), boolean keep-masks, gradient suppression
//! - **Pruning Callback**: integration with the training callback contract
//!
//! # Example
//!
//! ```
//! use podar::prune::{MagnitudePruningModifier, PruningConfig};
//! use podar::{Model, Tensor};
//!
//! let config = PruningConfig::new()
//!     .with_final_sparsity(0.9)
//!     .with_end_step(10_000)
//!     .with_prunable_params("weight");
//! let mut modifier = MagnitudePruningModifier::new(config).unwrap();
//!
//! let mut model = Model::new();
//! model.add_param("layer.weight", Tensor::from_slice(&[0.3, -2.0, 1.5]));
//! modifier.initialize(&model);
//! ```
//!
//! # References
//!
//! - Han, S., et al. (2015). Learning both weights and connections. NeurIPS.
//! - Zhu, M., & Gupta, S. (2017). To prune, or not to prune. arXiv:1710.01878.

mod callback;
mod config;
mod engine;
mod mask;
mod modifier;
mod schedule;
mod select;

pub use callback::PruningCallback;
pub use config::{MaskMode, PruningConfig, ALL_PARAMS};
pub use engine::MaskEngine;
pub use mask::{measured_sparsity, Mask};
pub use modifier::MagnitudePruningModifier;
pub use schedule::{SparsitySchedule, UpdateGranularity};
pub use select::ParamSelector;
