use rand::RngCore;

use crate::{Hyperparameters, SurrogateError};

/// The core trait for surrogate models in Effigy.
///
/// A `Surrogate` approximates an unknown function from observed input/output
/// pairs and reports posterior-predictive statistics at new points. Downstream
/// code (optimizers, samplers, experiment loops) programs against this trait
/// and never against a concrete model.
///
/// ## Implementing `Surrogate`
///
/// Implementers choose a [`Point`] type for inputs, a [`Value`] type for
/// outputs, and a [`Posterior`] type for the joint posterior handle, then
/// supply the nine required methods. The five derived operations
/// ([`add_points`], [`posterior_at`], [`means`], [`variances`], and
/// [`sample_at`]) are built mechanically from the required methods; an
/// implementation may override them, but only with observably equivalent
/// behavior.
///
/// ## Statistics and consistency
///
/// [`mean`], [`variance`], and [`sample`] each describe the model's
/// posterior predictive, but this layer never checks that they agree with
/// each other or with the handle returned by [`posterior`]. That numerical
/// consistency is each implementation's responsibility.
///
/// Randomness enters only through [`sample`] and [`sample_at`], which draw
/// from a caller-supplied random number generator. Every other operation is
/// deterministic given the model's state.
///
/// ## Dynamic dispatch
///
/// The trait is dyn-compatible: a model can be held and queried as
/// `&dyn Surrogate<Point = P, Value = V, Posterior = Q>`, so heterogeneous
/// models with the same associated types are interchangeable at runtime.
///
/// [`Point`]: Surrogate::Point
/// [`Value`]: Surrogate::Value
/// [`Posterior`]: Surrogate::Posterior
/// [`mean`]: Surrogate::mean
/// [`variance`]: Surrogate::variance
/// [`sample`]: Surrogate::sample
/// [`posterior`]: Surrogate::posterior
/// [`add_points`]: Surrogate::add_points
/// [`posterior_at`]: Surrogate::posterior_at
/// [`means`]: Surrogate::means
/// [`variances`]: Surrogate::variances
/// [`sample_at`]: Surrogate::sample_at
///
/// # Example
///
/// ```
/// use effigy_core::{Hyperparameters, Surrogate, SurrogateError};
/// use rand::RngCore;
///
/// /// Predicts the mean of everything observed so far, with no uncertainty.
/// #[derive(Debug, Default)]
/// struct RunningMean {
///     values: Vec<f64>,
/// }
///
/// impl RunningMean {
///     fn current(&self, operation: &'static str) -> Result<f64, SurrogateError> {
///         if self.values.is_empty() {
///             return Err(SurrogateError::Untrained { operation });
///         }
///         Ok(self.values.iter().sum::<f64>() / self.values.len() as f64)
///     }
/// }
///
/// impl Surrogate for RunningMean {
///     type Point = f64;
///     type Value = f64;
///     type Posterior = Vec<f64>;
///
///     fn evaluate(&self, _point: &f64) -> Result<f64, SurrogateError> {
///         self.current("evaluate")
///     }
///
///     fn add_point(&mut self, _point: f64, value: f64) -> Result<(), SurrogateError> {
///         self.values.push(value);
///         Ok(())
///     }
///
///     fn update_hyperparameters(
///         &mut self,
///         prior: &Hyperparameters,
///     ) -> Result<(), SurrogateError> {
///         if prior.is_empty() {
///             Ok(())
///         } else {
///             Err(SurrogateError::InvalidInput("model has no hyperparameters".into()))
///         }
///     }
///
///     fn hyperparameters(&self) -> Hyperparameters {
///         Hyperparameters::new()
///     }
///
///     fn posterior(&self, points: &[f64]) -> Result<Vec<f64>, SurrogateError> {
///         let mean = self.current("posterior")?;
///         Ok(vec![mean; points.len()])
///     }
///
///     fn mean(&self, _point: &f64) -> Result<f64, SurrogateError> {
///         self.current("mean")
///     }
///
///     fn variance(&self, _point: &f64) -> Result<f64, SurrogateError> {
///         self.current("variance").map(|_| 0.0)
///     }
///
///     fn sample(
///         &self,
///         points: &[f64],
///         _rng: &mut dyn RngCore,
///     ) -> Result<Vec<f64>, SurrogateError> {
///         // A point mass: every draw is the mean.
///         self.posterior(points)
///     }
///
///     fn log_marginal_likelihood(&self) -> Result<f64, SurrogateError> {
///         Err(SurrogateError::Unsupported { operation: "log_marginal_likelihood" })
///     }
/// }
///
/// let mut model = RunningMean::default();
/// assert_eq!(
///     model.mean(&0.5),
///     Err(SurrogateError::Untrained { operation: "mean" }),
/// );
///
/// model.add_points(vec![0.0, 1.0, 2.0], vec![3.0, 5.0, 7.0])?;
///
/// assert_eq!(model.mean(&0.5)?, 5.0);
/// assert_eq!(model.means(&[0.5, 1.5])?, vec![5.0, 5.0]);
/// assert_eq!(model.posterior_at(&0.5)?, vec![5.0]);
/// # Ok::<(), SurrogateError>(())
/// ```
pub trait Surrogate {
    /// The input type of the approximated function.
    type Point;

    /// The output type of the approximated function.
    ///
    /// Predictive means and variances are reported in this type.
    type Value;

    /// The joint posterior handle returned by [`Surrogate::posterior`].
    ///
    /// Its representation is entirely implementation-defined; this layer
    /// never inspects it.
    type Posterior;

    /// Returns the model's deterministic point estimate at `point`.
    ///
    /// This is the cheapest query a surrogate offers: a single best-guess
    /// value with no uncertainty attached and no randomness involved.
    ///
    /// # Errors
    ///
    /// Fails if `point` lies outside the model's domain or if the model
    /// cannot produce an estimate in its current state.
    fn evaluate(&self, point: &Self::Point) -> Result<Self::Value, SurrogateError>;

    /// Incorporates one observation of the underlying function.
    ///
    /// The model takes ownership of the pair and updates its internal state.
    /// Observations accumulate; there is no removal operation.
    ///
    /// # Errors
    ///
    /// Fails if `point` lies outside the model's domain or the pair is
    /// otherwise rejected. A rejected pair leaves the model unchanged.
    fn add_point(&mut self, point: Self::Point, value: Self::Value) -> Result<(), SurrogateError>;

    /// Re-estimates or overrides the model's hyperparameters.
    ///
    /// The `prior` record carries caller-supplied prior information. How it
    /// is used is implementation-defined: a model may treat the entries as
    /// exact overrides, as a prior for internal inference, or reject the
    /// record outright.
    ///
    /// # Errors
    ///
    /// Fails if the record contains names the model does not recognize or
    /// values it cannot honor. A rejected record leaves the model unchanged.
    fn update_hyperparameters(&mut self, prior: &Hyperparameters) -> Result<(), SurrogateError>;

    /// Returns a snapshot of the hyperparameters currently in effect.
    ///
    /// Read-only; the returned record is a copy, and editing it has no
    /// effect on the model. A model with no tunable settings returns an
    /// empty record.
    fn hyperparameters(&self) -> Hyperparameters;

    /// Returns the model's joint posterior predictive at the given points.
    ///
    /// The handle must reflect whatever cross-point structure the model
    /// represents internally; for a one-element slice it describes the
    /// marginal at that point.
    ///
    /// # Errors
    ///
    /// Fails if any point lies outside the model's domain or if the model
    /// cannot produce a posterior in its current state.
    fn posterior(&self, points: &[Self::Point]) -> Result<Self::Posterior, SurrogateError>;

    /// Returns the posterior-predictive mean at `point`.
    ///
    /// # Errors
    ///
    /// Fails if `point` lies outside the model's domain or if the model
    /// cannot produce the statistic in its current state.
    fn mean(&self, point: &Self::Point) -> Result<Self::Value, SurrogateError>;

    /// Returns the posterior-predictive variance at `point`.
    ///
    /// A valid variance is never negative; upholding that is the
    /// implementation's responsibility.
    ///
    /// # Errors
    ///
    /// Fails if `point` lies outside the model's domain or if the model
    /// cannot produce the statistic in its current state.
    fn variance(&self, point: &Self::Point) -> Result<Self::Value, SurrogateError>;

    /// Draws one joint sample from the posterior predictive at the given
    /// points.
    ///
    /// The returned vector has the same length and order as `points`, one
    /// drawn value per point, with whatever cross-point correlation the
    /// model implies. Randomness comes from the caller-supplied `rng`;
    /// repeated calls are expected to produce different draws.
    ///
    /// # Errors
    ///
    /// Fails if any point lies outside the model's domain or if the model
    /// cannot produce a sample in its current state.
    fn sample(
        &self,
        points: &[Self::Point],
        rng: &mut dyn RngCore,
    ) -> Result<Vec<Self::Value>, SurrogateError>;

    /// Returns the natural log probability of the observed data under the
    /// current model and hyperparameters.
    ///
    /// Used for model comparison and hyperparameter selection by external
    /// callers. Log densities are dimensionless, so the result is a bare
    /// `f64` regardless of [`Surrogate::Value`].
    ///
    /// # Errors
    ///
    /// Fails if the model does not define a data likelihood or cannot
    /// compute it in its current state.
    fn log_marginal_likelihood(&self) -> Result<f64, SurrogateError>;

    /// Incorporates a batch of observations, pairing points with values
    /// position by position.
    ///
    /// Equivalent to calling [`Surrogate::add_point`] once per pair, in
    /// order. The length check happens before any mutation, but a pair
    /// rejected mid-batch aborts the rest: observations added before the
    /// failure remain in the model.
    ///
    /// # Errors
    ///
    /// Fails with [`SurrogateError::LengthMismatch`] if `points` and
    /// `values` differ in length, or propagates the first
    /// [`Surrogate::add_point`] error.
    fn add_points(
        &mut self,
        points: Vec<Self::Point>,
        values: Vec<Self::Value>,
    ) -> Result<(), SurrogateError> {
        if points.len() != values.len() {
            return Err(SurrogateError::LengthMismatch {
                expected: points.len(),
                actual: values.len(),
            });
        }
        for (point, value) in points.into_iter().zip(values) {
            self.add_point(point, value)?;
        }
        Ok(())
    }

    /// Returns the posterior predictive at a single point.
    ///
    /// Equivalent to [`Surrogate::posterior`] over a one-element slice.
    ///
    /// # Errors
    ///
    /// Propagates any [`Surrogate::posterior`] error.
    fn posterior_at(&self, point: &Self::Point) -> Result<Self::Posterior, SurrogateError> {
        self.posterior(std::slice::from_ref(point))
    }

    /// Returns the posterior-predictive mean at each of the given points.
    ///
    /// Equivalent to calling [`Surrogate::mean`] independently at each
    /// point, in order. Marginal statistics only: this does not route
    /// through the joint posterior.
    ///
    /// # Errors
    ///
    /// Propagates the first [`Surrogate::mean`] error.
    fn means(&self, points: &[Self::Point]) -> Result<Vec<Self::Value>, SurrogateError> {
        points.iter().map(|point| self.mean(point)).collect()
    }

    /// Returns the posterior-predictive variance at each of the given points.
    ///
    /// Equivalent to calling [`Surrogate::variance`] independently at each
    /// point, in order.
    ///
    /// # Errors
    ///
    /// Propagates the first [`Surrogate::variance`] error.
    fn variances(&self, points: &[Self::Point]) -> Result<Vec<Self::Value>, SurrogateError> {
        points.iter().map(|point| self.variance(point)).collect()
    }

    /// Draws one sample from the posterior predictive at a single point.
    ///
    /// Equivalent to [`Surrogate::sample`] over a one-element slice,
    /// unwrapped to the single drawn value.
    ///
    /// # Errors
    ///
    /// Propagates any [`Surrogate::sample`] error, or fails with
    /// [`SurrogateError::LengthMismatch`] if the underlying draw does not
    /// contain exactly one value.
    fn sample_at(
        &self,
        point: &Self::Point,
        rng: &mut dyn RngCore,
    ) -> Result<Self::Value, SurrogateError> {
        let draw = self.sample(std::slice::from_ref(point), rng)?;
        let [value] =
            <[Self::Value; 1]>::try_from(draw).map_err(|draw| SurrogateError::LengthMismatch {
                expected: 1,
                actual: draw.len(),
            })?;
        Ok(value)
    }
}
