//! Core data models: platforms, operations, outcomes and their classification

mod classifier;
mod model_info;
mod operation;
mod outcome;
mod platform;
mod prompt;

pub use classifier::*;
pub use model_info::*;
pub use operation::*;
pub use outcome::*;
pub use platform::*;
pub use prompt::*;
