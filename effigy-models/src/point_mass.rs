/// The degenerate joint posterior of a deterministic surrogate.
///
/// A deterministic model assigns all probability mass to a single outcome,
/// so its joint posterior at a set of points is fully described by the
/// predicted value at each point, in request order. [`Constant`] and
/// [`NearestNeighbor`] both return this handle from their posterior
/// operations.
///
/// [`Constant`]: crate::Constant
/// [`NearestNeighbor`]: crate::NearestNeighbor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointMass<V> {
    values: Vec<V>,
}

impl<V> PointMass<V> {
    pub(crate) fn new(values: Vec<V>) -> Self {
        Self { values }
    }

    /// Returns the predicted values, one per requested point, in request order.
    #[must_use]
    pub fn values(&self) -> &[V] {
        &self.values
    }

    /// Consumes the handle and returns the predicted values.
    #[must_use]
    pub fn into_values(self) -> Vec<V> {
        self.values
    }

    /// Returns the number of points the posterior covers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the posterior covers no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
