//! Async tasks

mod sweep;

pub use sweep::sweep_task;
