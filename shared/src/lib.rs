pub mod deadline;
pub mod error;
pub mod evaluator;
pub mod models;
pub mod mutator;
pub mod validation;
pub mod user_info;

pub use error::{ErrorCode, ErrorResponse};
pub use models::*;
pub use mutator::PollError;
pub use validation::*;
pub use user_info::*;
