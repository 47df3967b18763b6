//! Training-loop integration surface

pub mod callback;

pub use callback::{CallbackAction, CallbackContext, TrainerCallback};
