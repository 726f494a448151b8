//! Utility helpers - terminal styling and progress reporting

pub mod progress;
pub mod styling;

pub use progress::*;
pub use styling::*;
