//! Sliding-window derivative estimation for noisy per-frame samples.

pub mod window;

pub use window::{DeltaWindow, WINDOW_CAPACITY};
