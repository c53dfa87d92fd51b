pub mod complex;
pub mod error;
pub mod evaluator;
pub mod plane;

// Re-export primary types for convenience.
pub use complex::Complex;
pub use error::CoreError;
pub use evaluator::{EvalParams, Family, IterationOutcome};
pub use plane::{PlaneMap, RasterSize, Rectangle};

/// Convenience result type for the core crate.
pub type Result<T> = std::result::Result<T, CoreError>;
