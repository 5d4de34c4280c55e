use effigy_core::{Hyperparameters, Surrogate, SurrogateError};
use num_traits::Zero;
use rand::RngCore;

use crate::PointMass;

/// A surrogate that predicts the value of the nearest stored observation.
///
/// The model keeps every observation it is given and answers queries by
/// scanning for the stored point with the smallest distance to the query,
/// under a caller-supplied distance function. Ties break toward the earliest
/// observation. The result is a deterministic interpolant: the predictive
/// variance is zero everywhere and samples never vary, so the posterior is a
/// [`PointMass`]. A deterministic interpolant assigns no density to data, so
/// [`log_marginal_likelihood`](Surrogate::log_marginal_likelihood) is
/// unsupported.
///
/// Before the first observation the model has nothing to predict from, and
/// every statistic fails with [`SurrogateError::Untrained`].
///
/// The distance function defines the model's domain: a point whose distance
/// to itself is not finite is rejected at
/// [`add_point`](Surrogate::add_point). Stored points at NaN distance from a
/// query are skipped during the scan; if every stored point is at NaN
/// distance, the query fails.
///
/// # Example
///
/// ```
/// use effigy_core::Surrogate;
/// use effigy_models::NearestNeighbor;
///
/// fn absolute_difference(a: &f64, b: &f64) -> f64 {
///     (a - b).abs()
/// }
///
/// let mut model = NearestNeighbor::new(absolute_difference);
/// model.add_points(vec![0.0, 10.0], vec![1.0, 2.0])?;
///
/// assert_eq!(model.mean(&3.0)?, 1.0);
/// assert_eq!(model.mean(&8.0)?, 2.0);
/// assert_eq!(model.variance(&8.0)?, 0.0);
/// # Ok::<(), effigy_core::SurrogateError>(())
/// ```
#[derive(Debug, Clone)]
pub struct NearestNeighbor<P, V> {
    distance: fn(&P, &P) -> f64,
    data: Vec<(P, V)>,
}

impl<P: PartialEq, V: PartialEq> PartialEq for NearestNeighbor<P, V> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::fn_addr_eq(self.distance, other.distance) && self.data == other.data
    }
}

impl<P, V> NearestNeighbor<P, V> {
    /// Creates an empty model that measures closeness with `distance`.
    #[must_use]
    pub fn new(distance: fn(&P, &P) -> f64) -> Self {
        Self {
            distance,
            data: Vec::new(),
        }
    }

    /// Returns the number of observations stored so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if no observations have been stored yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Finds the stored value nearest to `point`.
    ///
    /// Stored points at NaN distance are skipped. Ties break toward the
    /// earliest observation.
    fn nearest(&self, point: &P, operation: &'static str) -> Result<&V, SurrogateError> {
        if self.data.is_empty() {
            return Err(SurrogateError::Untrained { operation });
        }

        let mut best: Option<(&V, f64)> = None;
        for (stored, value) in &self.data {
            let distance = (self.distance)(stored, point);
            if distance.is_nan() {
                continue;
            }
            if best.is_none_or(|(_, best_distance)| distance < best_distance) {
                best = Some((value, distance));
            }
        }

        best.map(|(value, _)| value).ok_or_else(|| {
            SurrogateError::Calculation("every stored point is at NaN distance".into())
        })
    }
}

impl<P, V: Clone + Zero> Surrogate for NearestNeighbor<P, V> {
    type Point = P;
    type Value = V;
    type Posterior = PointMass<V>;

    /// Returns the value of the nearest stored observation.
    fn evaluate(&self, point: &P) -> Result<V, SurrogateError> {
        self.nearest(point, "evaluate").cloned()
    }

    /// Stores the observation after checking it sits in the metric's domain.
    fn add_point(&mut self, point: P, value: V) -> Result<(), SurrogateError> {
        let self_distance = (self.distance)(&point, &point);
        if !self_distance.is_finite() {
            return Err(SurrogateError::DomainMismatch {
                reason: "the point's distance to itself is not finite".into(),
            });
        }
        self.data.push((point, value));
        Ok(())
    }

    /// Accepts only an empty record; the model has nothing to tune.
    fn update_hyperparameters(&mut self, prior: &Hyperparameters) -> Result<(), SurrogateError> {
        match prior.names().next() {
            None => Ok(()),
            Some(name) => Err(SurrogateError::InvalidInput(format!(
                "unknown hyperparameter `{name}`"
            ))),
        }
    }

    /// Returns an empty record.
    fn hyperparameters(&self) -> Hyperparameters {
        Hyperparameters::new()
    }

    /// Returns a point mass over the nearest stored value per point.
    fn posterior(&self, points: &[P]) -> Result<PointMass<V>, SurrogateError> {
        let values = points
            .iter()
            .map(|point| self.nearest(point, "posterior").cloned())
            .collect::<Result<Vec<V>, SurrogateError>>()?;

        Ok(PointMass::new(values))
    }

    /// Returns the value of the nearest stored observation.
    fn mean(&self, point: &P) -> Result<V, SurrogateError> {
        self.nearest(point, "mean").cloned()
    }

    /// Returns zero; the interpolant has no spread.
    fn variance(&self, point: &P) -> Result<V, SurrogateError> {
        self.nearest(point, "variance").map(|_| V::zero())
    }

    /// Repeats the nearest stored value per point; the draw consumes no
    /// randomness.
    fn sample(&self, points: &[P], _rng: &mut dyn RngCore) -> Result<Vec<V>, SurrogateError> {
        points
            .iter()
            .map(|point| self.nearest(point, "sample").cloned())
            .collect()
    }

    /// A deterministic interpolant assigns no density to observed data.
    fn log_marginal_likelihood(&self) -> Result<f64, SurrogateError> {
        Err(SurrogateError::Unsupported {
            operation: "log_marginal_likelihood",
        })
    }
}
