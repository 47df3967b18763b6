//! Callback contract between the external training loop and this crate
//!
//! The loop owns ordering: it decides which hooks to invoke and when. The
//! expected sequence is `on_train_begin`, then per epoch `on_epoch_begin`,
//! per step `on_step_begin` / `on_step_end`, and finally `on_train_end`.
//! Callbacks receive mutable access to the model because pruning rewrites
//! parameter values in place.

use crate::model::Model;

/// Training state passed to every callback invocation.
#[derive(Clone, Debug)]
pub struct CallbackContext {
    /// Current epoch (0-indexed)
    pub epoch: usize,
    /// Current step within the epoch
    pub step: usize,
    /// Global step count across epochs
    pub global_step: usize,
    /// Whether this process is the designated logging process.
    ///
    /// In multi-process training only one rank should emit sparsity logs;
    /// masking itself runs identically on every rank.
    pub is_main_process: bool,
}

impl Default for CallbackContext {
    fn default() -> Self {
        Self {
            epoch: 0,
            step: 0,
            global_step: 0,
            is_main_process: true,
        }
    }
}

/// Action requested by a callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    /// Continue training normally
    Continue,
    /// Stop training
    Stop,
}

/// Trait for training callbacks.
///
/// All methods have default no-op implementations; implement only the
/// events you care about.
pub trait TrainerCallback: Send {
    /// Called once before training steps begin.
    fn on_train_begin(&mut self, _model: &mut Model, _ctx: &CallbackContext) -> CallbackAction {
        CallbackAction::Continue
    }

    /// Called before each epoch.
    fn on_epoch_begin(&mut self, _model: &mut Model, _ctx: &CallbackContext) -> CallbackAction {
        CallbackAction::Continue
    }

    /// Called before each training step.
    fn on_step_begin(&mut self, _model: &mut Model, _ctx: &CallbackContext) -> CallbackAction {
        CallbackAction::Continue
    }

    /// Called after each optimizer step.
    fn on_step_end(&mut self, _model: &mut Model, _ctx: &CallbackContext) -> CallbackAction {
        CallbackAction::Continue
    }

    /// Called once after training ends.
    fn on_train_end(&mut self, _model: &mut Model, _ctx: &CallbackContext) {}

    /// Callback name for logging.
    fn name(&self) -> &'static str {
        "TrainerCallback"
    }
}
