//! Optimizer-side utilities

mod scheduler;

pub use scheduler::{create_scheduler, CyclicCosineLR, CyclicLinearLR, LRScheduler};
