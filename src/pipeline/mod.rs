//! Pipeline module - orchestrates the churn prediction stages

pub mod eda;
pub mod encoder;
pub mod error;
pub mod features;
pub mod loader;
pub mod target;

pub use eda::*;
pub use encoder::*;
pub use error::PipelineError;
pub use features::*;
pub use loader::*;
pub use target::*;
