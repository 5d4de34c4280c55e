use thiserror::Error;

/// Errors that may occur when querying or updating a surrogate model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurrogateError {
    /// The queried point is incompatible with the model's domain.
    ///
    /// Rust rules out points of the wrong type statically, so this variant
    /// covers the runtime remainder: wrong shape, non-finite coordinates, or
    /// values outside the region the model was built for.
    #[error("point is not in the model's domain: {reason}")]
    DomainMismatch { reason: String },

    /// Paired sequences have unequal or unexpected lengths.
    ///
    /// Raised by batch operations over parallel sequences, and by the
    /// single-point sampling adapter when a joint draw over one point does
    /// not contain exactly one value.
    #[error("expected {expected} values but received {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// A statistic was requested before the model had data to condition on.
    ///
    /// Whether a model can answer queries without observations is up to the
    /// model; those that cannot report this error instead of guessing.
    #[error("`{operation}` requires at least one observation")]
    Untrained { operation: &'static str },

    /// The operation is not defined by this model.
    ///
    /// For example, a deterministic interpolant has no likelihood to report.
    #[error("operation `{operation}` is not supported by this model")]
    Unsupported { operation: &'static str },

    /// The input values are invalid or inconsistent.
    ///
    /// Covers malformed observations, out-of-range hyperparameter values,
    /// and hyperparameter names the model does not recognize.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The calculation failed due to a numerical or internal error.
    ///
    /// For example, a failure to factorize, converge, or draw a sample.
    #[error("calculation error: {0}")]
    Calculation(String),
}
