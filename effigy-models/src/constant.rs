use std::marker::PhantomData;

use effigy_core::{Hyperparameters, Surrogate, SurrogateError};
use num_traits::Zero;
use rand::RngCore;

use crate::PointMass;

/// A surrogate that predicts the same fixed value everywhere.
///
/// The model is a point mass: every statistic collapses onto the configured
/// value, the predictive variance is zero, and samples never vary. It is
/// useful as a baseline in model comparisons and as the simplest possible
/// conforming implementation when exercising code written against
/// [`Surrogate`].
///
/// Observations are counted but otherwise ignored; the model is never
/// untrained and never changes its prediction. It has no hyperparameters,
/// so only an empty record is accepted by
/// [`update_hyperparameters`](Surrogate::update_hyperparameters). A
/// noiseless point mass assigns no density to data, so
/// [`log_marginal_likelihood`](Surrogate::log_marginal_likelihood) is
/// unsupported.
///
/// # Example
///
/// ```
/// use effigy_core::Surrogate;
/// use effigy_models::Constant;
///
/// let model: Constant<f64, f64> = Constant::new(2.5);
///
/// assert_eq!(model.mean(&10.0)?, 2.5);
/// assert_eq!(model.variance(&10.0)?, 0.0);
/// assert_eq!(model.means(&[1.0, 2.0, 3.0])?, vec![2.5, 2.5, 2.5]);
/// # Ok::<(), effigy_core::SurrogateError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constant<P, V> {
    value: V,
    observations: usize,
    point: PhantomData<fn(&P)>,
}

impl<P, V> Constant<P, V> {
    /// Creates a model that predicts `value` at every point.
    #[must_use]
    pub fn new(value: V) -> Self {
        Self {
            value,
            observations: 0,
            point: PhantomData,
        }
    }

    /// Returns the value predicted everywhere.
    #[must_use]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Returns the number of observations added so far.
    #[must_use]
    pub fn observations(&self) -> usize {
        self.observations
    }
}

impl<P, V: Clone + Zero> Surrogate for Constant<P, V> {
    type Point = P;
    type Value = V;
    type Posterior = PointMass<V>;

    /// Returns the configured value.
    fn evaluate(&self, _point: &P) -> Result<V, SurrogateError> {
        Ok(self.value.clone())
    }

    /// Counts the observation; the prediction never changes.
    fn add_point(&mut self, _point: P, _value: V) -> Result<(), SurrogateError> {
        self.observations += 1;
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

    /// Returns a point mass repeating the configured value.
    fn posterior(&self, points: &[P]) -> Result<PointMass<V>, SurrogateError> {
        Ok(PointMass::new(vec![self.value.clone(); points.len()]))
    }

    /// Returns the configured value.
    fn mean(&self, _point: &P) -> Result<V, SurrogateError> {
        Ok(self.value.clone())
    }

    /// Returns zero; a point mass has no spread.
    fn variance(&self, _point: &P) -> Result<V, SurrogateError> {
        Ok(V::zero())
    }

    /// Repeats the configured value; the draw consumes no randomness.
    fn sample(&self, points: &[P], _rng: &mut dyn RngCore) -> Result<Vec<V>, SurrogateError> {
        Ok(vec![self.value.clone(); points.len()])
    }

    /// A noiseless point mass assigns no density to observed data.
    fn log_marginal_likelihood(&self) -> Result<f64, SurrogateError> {
        Err(SurrogateError::Unsupported {
            operation: "log_marginal_likelihood",
        })
    }
}
