//! The surrogate model contract for the Effigy framework.

mod error;
mod hyperparameters;
mod surrogate;

pub use error::SurrogateError;
pub use hyperparameters::Hyperparameters;
pub use surrogate::Surrogate;
