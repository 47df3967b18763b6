//! Podar: magnitude pruning during fine-tuning
//!
//! Gradually sparsifies model parameters while an external training loop
//! fine-tunes them. A polynomial schedule decides the target sparsity at
//! each step; a mask engine selects magnitude thresholds via order
//! statistics, zeroes pruned weights, and suppresses their gradients so
//! they stay pruned.
//!
//! The training loop is an external collaborator: it drives the
//! [`train::TrainerCallback`] lifecycle (train-begin, epoch-begin,
//! step-begin, step-end, train-end), owns the model's tensors, and in
//! gradient-hook mode calls
//! [`prune::PruningCallback::mask_gradients`] between backward and the
//! optimizer step.
//!
//! # Example
//!
//! ```
//! use podar::prune::{PruningCallback, PruningConfig};
//! use podar::train::{CallbackContext, TrainerCallback};
//! use podar::{Model, Tensor};
//!
//! let mut model = Model::new();
//! model.add_param("layer.weight", Tensor::from_slice(&[-5.0, -1.0, 0.0, 2.0, 9.0]));
//!
//! let config = PruningConfig::new()
//!     .with_final_sparsity(0.4)
//!     .with_end_step(100)
//!     .with_update_frequency(10);
//! let mut callback = PruningCallback::new(config).unwrap();
//!
//! let ctx = CallbackContext::default();
//! callback.on_train_begin(&mut model, &ctx);
//! for global_step in 0..=100 {
//!     let ctx = CallbackContext { global_step, ..CallbackContext::default() };
//!     callback.on_step_begin(&mut model, &ctx);
//!     // forward, backward, callback.mask_gradients(&mut model), optimizer
//!     callback.on_step_end(&mut model, &ctx);
//! }
//! callback.on_train_end(&mut model, &CallbackContext::default());
//! ```

pub mod error;
pub mod metrics;
pub mod model;
pub mod optim;
pub mod prune;
pub mod tensor;
pub mod train;

pub use error::{PruneError, Result};
pub use model::Model;
pub use tensor::Tensor;
