use std::f64::consts::PI;
use std::marker::PhantomData;

use effigy_core::{Hyperparameters, Surrogate, SurrogateError};
use rand::RngCore;
use rand_distr::{Distribution, Normal};
use thiserror::Error;

const PRIOR_MEAN: &str = "prior_mean";
const PRIOR_VARIANCE: &str = "prior_variance";
const NOISE_VARIANCE: &str = "noise_variance";

/// Errors that can occur when validating a global mean model's settings.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("prior_mean must be finite")]
    PriorMean,

    #[error("prior_variance must be finite and positive")]
    PriorVariance,

    #[error("noise_variance must be finite and positive")]
    NoiseVariance,
}

/// A Bayesian surrogate that models the function as one unknown level.
///
/// The model assumes every observation measures the same global level `c`
/// through additive Gaussian noise:
///
/// ```text
/// y = c + ε,    c ~ N(prior_mean, prior_variance),    ε ~ N(0, noise_variance)
/// ```
///
/// All statistics follow from the conjugate normal-normal update of `c`,
/// computed in scalar arithmetic from running sufficient statistics, so the
/// query point is ignored entirely. Reported means and variances describe
/// the level `c` itself, not a future noisy observation.
///
/// With no data the posterior is the prior, so the model is never untrained.
/// A joint sample draws one level and repeats it across the requested
/// points: distinct points are perfectly correlated under this model.
///
/// Hyperparameters are `prior_mean`, `prior_variance`, and `noise_variance`.
/// An update record may name any subset of them; the combined settings are
/// validated before any entry is applied, and unknown names are rejected.
/// Observations survive a hyperparameter update, with the posterior simply
/// recomputed under the new settings.
///
/// # Example
///
/// ```
/// use effigy_core::Surrogate;
/// use effigy_models::GlobalMean;
///
/// // Standard normal prior over the level, unit observation noise.
/// let mut model: GlobalMean<f64> = GlobalMean::new(0.0, 1.0, 1.0).unwrap();
///
/// // Before any data, the posterior is the prior.
/// assert_eq!(model.mean(&0.5).unwrap(), 0.0);
/// assert_eq!(model.variance(&0.5).unwrap(), 1.0);
///
/// model
///     .add_points(vec![0.0, 1.0, 2.0], vec![1.0, 2.0, 3.0])
///     .unwrap();
///
/// // Three observations at unit noise pull the level toward their average.
/// assert_eq!(model.mean(&0.5).unwrap(), 1.5);
/// assert_eq!(model.variance(&0.5).unwrap(), 0.25);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalMean<P> {
    prior_mean: f64,
    prior_variance: f64,
    noise_variance: f64,
    count: usize,
    sum: f64,
    sum_squares: f64,
    point: PhantomData<fn(&P)>,
}

impl<P> GlobalMean<P> {
    /// Creates a model with validated prior and noise settings.
    ///
    /// # Errors
    ///
    /// Returns an error if `prior_mean` is not finite, or if
    /// `prior_variance` or `noise_variance` is not finite and positive.
    pub fn new(
        prior_mean: f64,
        prior_variance: f64,
        noise_variance: f64,
    ) -> Result<Self, ConfigError> {
        Self::validate(prior_mean, prior_variance, noise_variance)?;

        Ok(Self {
            prior_mean,
            prior_variance,
            noise_variance,
            count: 0,
            sum: 0.0,
            sum_squares: 0.0,
            point: PhantomData,
        })
    }

    /// Returns the prior mean of the level.
    #[must_use]
    pub fn prior_mean(&self) -> f64 {
        self.prior_mean
    }

    /// Returns the prior variance of the level.
    #[must_use]
    pub fn prior_variance(&self) -> f64 {
        self.prior_variance
    }

    /// Returns the observation noise variance.
    #[must_use]
    pub fn noise_variance(&self) -> f64 {
        self.noise_variance
    }

    /// Returns the number of observations added so far.
    #[must_use]
    pub fn observations(&self) -> usize {
        self.count
    }

    fn validate(
        prior_mean: f64,
        prior_variance: f64,
        noise_variance: f64,
    ) -> Result<(), ConfigError> {
        if !prior_mean.is_finite() {
            return Err(ConfigError::PriorMean);
        }
        if !prior_variance.is_finite() || prior_variance <= 0.0 {
            return Err(ConfigError::PriorVariance);
        }
        if !noise_variance.is_finite() || noise_variance <= 0.0 {
            return Err(ConfigError::NoiseVariance);
        }

        Ok(())
    }

    /// Posterior mean and variance of the level given all observations.
    ///
    /// With no data the precision term vanishes and the result is the prior.
    fn level(&self) -> (f64, f64) {
        let n = self.count as f64;
        let precision = 1.0 / self.prior_variance + n / self.noise_variance;
        let variance = 1.0 / precision;
        let mean =
            variance * (self.prior_mean / self.prior_variance + self.sum / self.noise_variance);

        (mean, variance)
    }
}

impl<P> Default for GlobalMean<P> {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(0.0, 1.0, 1.0).unwrap()
    }
}

/// The joint posterior of a [`GlobalMean`] model at a set of points.
///
/// Every requested point shares the single latent level, so the joint
/// distribution is fully described by the level's posterior moments and the
/// number of points it covers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Posterior {
    mean: f64,
    variance: f64,
    len: usize,
}

impl Posterior {
    /// Returns the posterior mean of the level.
    #[must_use]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Returns the posterior variance of the level.
    #[must_use]
    pub fn variance(&self) -> f64 {
        self.variance
    }

    /// Returns the number of points the posterior covers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the posterior covers no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<P> Surrogate for GlobalMean<P> {
    type Point = P;
    type Value = f64;
    type Posterior = Posterior;

    /// Returns the posterior mean of the level.
    fn evaluate(&self, _point: &P) -> Result<f64, SurrogateError> {
        Ok(self.level().0)
    }

    /// Folds the observation into the running sufficient statistics.
    fn add_point(&mut self, _point: P, value: f64) -> Result<(), SurrogateError> {
        if !value.is_finite() {
            return Err(SurrogateError::InvalidInput(
                "observed value must be finite".into(),
            ));
        }

        self.count += 1;
        self.sum += value;
        self.sum_squares += value * value;

        Ok(())
    }

    /// Overrides the named settings, keeping all observations.
    ///
    /// The record may name any subset of `prior_mean`, `prior_variance`,
    /// and `noise_variance`. The combined settings are validated before any
    /// entry is applied, so a rejected record leaves the model unchanged.
    fn update_hyperparameters(&mut self, prior: &Hyperparameters) -> Result<(), SurrogateError> {
        let mut prior_mean = self.prior_mean;
        let mut prior_variance = self.prior_variance;
        let mut noise_variance = self.noise_variance;

        for (name, value) in prior.iter() {
            match name {
                PRIOR_MEAN => prior_mean = value,
                PRIOR_VARIANCE => prior_variance = value,
                NOISE_VARIANCE => noise_variance = value,
                unknown => {
                    return Err(SurrogateError::InvalidInput(format!(
                        "unknown hyperparameter `{unknown}`"
                    )));
                }
            }
        }

        Self::validate(prior_mean, prior_variance, noise_variance)
            .map_err(|error| SurrogateError::InvalidInput(error.to_string()))?;

        self.prior_mean = prior_mean;
        self.prior_variance = prior_variance;
        self.noise_variance = noise_variance;

        Ok(())
    }

    /// Returns the `prior_mean`, `prior_variance`, and `noise_variance`
    /// entries currently in effect.
    fn hyperparameters(&self) -> Hyperparameters {
        Hyperparameters::new()
            .with(PRIOR_MEAN, self.prior_mean)
            .with(PRIOR_VARIANCE, self.prior_variance)
            .with(NOISE_VARIANCE, self.noise_variance)
    }

    /// Returns the level's posterior moments, shared by all points.
    fn posterior(&self, points: &[P]) -> Result<Posterior, SurrogateError> {
        let (mean, variance) = self.level();

        Ok(Posterior {
            mean,
            variance,
            len: points.len(),
        })
    }

    /// Returns the posterior mean of the level.
    fn mean(&self, _point: &P) -> Result<f64, SurrogateError> {
        Ok(self.level().0)
    }

    /// Returns the posterior variance of the level.
    fn variance(&self, _point: &P) -> Result<f64, SurrogateError> {
        Ok(self.level().1)
    }

    /// Draws one level from the posterior and repeats it across the points.
    fn sample(&self, points: &[P], rng: &mut dyn RngCore) -> Result<Vec<f64>, SurrogateError> {
        if points.is_empty() {
            return Ok(Vec::new());
        }

        let (mean, variance) = self.level();
        let level = Normal::new(mean, variance.sqrt())
            .map_err(|error| SurrogateError::Calculation(error.to_string()))?
            .sample(rng);

        Ok(vec![level; points.len()])
    }

    /// Computes the closed-form marginal likelihood of all observations.
    ///
    /// Under this model the observations are jointly Gaussian with mean
    /// `m₀·1` and covariance `σ²I + v₀·11ᵀ`, whose determinant and inverse
    /// have closed forms in `n`. An empty data set has log probability zero.
    fn log_marginal_likelihood(&self) -> Result<f64, SurrogateError> {
        if self.count == 0 {
            return Ok(0.0);
        }

        let n = self.count as f64;
        let v0 = self.prior_variance;
        let s2 = self.noise_variance;

        // Residual sums around the prior mean: Σ(y−m₀) and Σ(y−m₀)².
        let residual_sum = self.sum - n * self.prior_mean;
        let residual_sum_squares =
            self.sum_squares - 2.0 * self.prior_mean * self.sum + n * self.prior_mean.powi(2);

        let log_det = (n - 1.0) * s2.ln() + (s2 + n * v0).ln();
        let quadratic =
            residual_sum_squares / s2 - v0 * residual_sum.powi(2) / (s2 * (s2 + n * v0));

        Ok(-0.5 * (n * (2.0 * PI).ln() + log_det + quadratic))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn new_rejects_invalid_settings() {
        assert_eq!(
            GlobalMean::<f64>::new(f64::NAN, 1.0, 1.0),
            Err(ConfigError::PriorMean)
        );
        assert_eq!(
            GlobalMean::<f64>::new(0.0, 0.0, 1.0),
            Err(ConfigError::PriorVariance)
        );
        assert_eq!(
            GlobalMean::<f64>::new(0.0, f64::INFINITY, 1.0),
            Err(ConfigError::PriorVariance)
        );
        assert_eq!(
            GlobalMean::<f64>::new(0.0, 1.0, -2.0),
            Err(ConfigError::NoiseVariance)
        );
    }

    #[test]
    fn posterior_before_any_data_is_the_prior() -> Result<(), SurrogateError> {
        let model = GlobalMean::<f64>::new(3.0, 4.0, 1.0).unwrap();

        assert_eq!(model.prior_mean(), 3.0);
        assert_eq!(model.prior_variance(), 4.0);
        assert_eq!(model.noise_variance(), 1.0);
        assert_eq!(model.mean(&0.0)?, 3.0);
        assert_eq!(model.variance(&0.0)?, 4.0);
        assert_eq!(model.log_marginal_likelihood()?, 0.0);

        let posterior = model.posterior(&[0.0, 1.0])?;
        assert_eq!(posterior.mean(), 3.0);
        assert_eq!(posterior.variance(), 4.0);
        assert_eq!(posterior.len(), 2);
        assert!(!posterior.is_empty());

        Ok(())
    }

    #[test]
    fn one_observation_updates_the_level() -> Result<(), SurrogateError> {
        let mut model = GlobalMean::<f64>::new(0.0, 1.0, 1.0).unwrap();
        model.add_point(0.0, 2.0)?;

        // Precision 1/1 + 1/1 = 2, so the variance halves and the mean
        // lands halfway between prior mean and observation.
        assert_relative_eq!(model.variance(&0.0)?, 0.5);
        assert_relative_eq!(model.mean(&0.0)?, 1.0);

        Ok(())
    }

    #[test]
    fn strong_data_overrides_the_prior() -> Result<(), SurrogateError> {
        let mut model = GlobalMean::<f64>::new(100.0, 1e6, 0.01).unwrap();
        model.add_points(vec![0.0; 4], vec![2.0, 2.1, 1.9, 2.0])?;

        assert_relative_eq!(model.mean(&0.0)?, 2.0, epsilon = 1e-6);
        assert!(model.variance(&0.0)? < 0.01);

        Ok(())
    }

    #[test]
    fn rejects_a_non_finite_observation() {
        let mut model = GlobalMean::<f64>::default();
        let result = model.add_point(0.0, f64::INFINITY);

        assert_eq!(
            result,
            Err(SurrogateError::InvalidInput(
                "observed value must be finite".into()
            ))
        );
        assert_eq!(model.observations(), 0);
    }

    #[test]
    fn log_marginal_likelihood_of_one_observation_is_its_predictive_density() {
        let mut model = GlobalMean::<f64>::new(0.5, 2.0, 0.8).unwrap();
        model.add_point(0.0, 1.7).unwrap();

        // One observation is marginally N(m₀, v₀ + σ²).
        let variance = 2.0 + 0.8;
        let residual = 1.7 - 0.5;
        let expected = -0.5 * ((2.0 * PI * variance).ln() + residual * residual / variance);

        assert_relative_eq!(model.log_marginal_likelihood().unwrap(), expected);
    }

    #[test]
    fn log_marginal_likelihood_chains_one_observation_at_a_time() {
        // p(y₁, y₂) = p(y₁) · p(y₂ | y₁), where y₂ given y₁ is normal
        // around the updated level with the noise variance added.
        let mut model = GlobalMean::<f64>::new(0.5, 2.0, 0.8).unwrap();
        model.add_point(0.0, 1.7).unwrap();

        let first = model.log_marginal_likelihood().unwrap();
        let level_mean = model.mean(&0.0).unwrap();
        let level_variance = model.variance(&0.0).unwrap();

        model.add_point(1.0, -0.3).unwrap();
        let both = model.log_marginal_likelihood().unwrap();

        let predictive_variance = level_variance + 0.8;
        let residual = -0.3 - level_mean;
        let conditional = -0.5
            * ((2.0 * PI * predictive_variance).ln()
                + residual * residual / predictive_variance);

        assert_relative_eq!(both, first + conditional, epsilon = 1e-12);
    }

    #[test]
    fn update_overrides_named_settings_and_keeps_observations() -> Result<(), SurrogateError> {
        let mut model = GlobalMean::<f64>::new(0.0, 1.0, 1.0).unwrap();
        model.add_points(vec![0.0, 1.0, 2.0], vec![1.0, 2.0, 3.0])?;

        let prior = Hyperparameters::new().with("noise_variance", 3.0);
        model.update_hyperparameters(&prior)?;

        assert_eq!(model.observations(), 3);
        assert_eq!(model.hyperparameters().get("noise_variance"), Some(3.0));

        // Precision 1/1 + 3/3 = 2 under the new noise setting.
        assert_relative_eq!(model.variance(&0.0)?, 0.5);
        assert_relative_eq!(model.mean(&0.0)?, 1.0);

        Ok(())
    }

    #[test]
    fn update_rejects_unknown_names() {
        let mut model = GlobalMean::<f64>::default();
        let prior = Hyperparameters::new().with("noise", 1.0);

        assert_eq!(
            model.update_hyperparameters(&prior),
            Err(SurrogateError::InvalidInput(
                "unknown hyperparameter `noise`".into()
            ))
        );
    }

    #[test]
    fn update_validates_before_applying_anything() {
        let mut model = GlobalMean::<f64>::new(0.0, 1.0, 1.0).unwrap();
        let prior = Hyperparameters::new()
            .with("prior_mean", 5.0)
            .with("prior_variance", -1.0);

        let result = model.update_hyperparameters(&prior);

        assert_eq!(
            result,
            Err(SurrogateError::InvalidInput(
                "prior_variance must be finite and positive".into()
            ))
        );
        assert_eq!(model.hyperparameters().get("prior_mean"), Some(0.0));
        assert_eq!(model.hyperparameters().get("prior_variance"), Some(1.0));
    }

    #[test]
    fn joint_sample_repeats_one_level_across_points() -> Result<(), SurrogateError> {
        let mut model = GlobalMean::<f64>::default();
        model.add_points(vec![0.0, 1.0], vec![1.0, 3.0])?;

        let mut rng = StdRng::seed_from_u64(7);
        let draw = model.sample(&[0.0, 10.0, -10.0], &mut rng)?;

        assert_eq!(draw.len(), 3);
        assert_eq!(draw[0], draw[1]);
        assert_eq!(draw[0], draw[2]);

        // A fresh call advances the generator and lands elsewhere.
        let next = model.sample(&[0.0], &mut rng)?;
        assert_ne!(next[0], draw[0]);

        Ok(())
    }

    #[test]
    fn equally_seeded_generators_draw_identical_samples() -> Result<(), SurrogateError> {
        let model = GlobalMean::<f64>::default();

        let joint = model.sample(&[0.5], &mut StdRng::seed_from_u64(11))?;
        let single = model.sample_at(&0.5, &mut StdRng::seed_from_u64(11))?;

        assert_eq!(joint, vec![single]);

        Ok(())
    }

    #[test]
    fn sampling_no_points_draws_nothing() -> Result<(), SurrogateError> {
        let model = GlobalMean::<f64>::default();
        let mut rng = StdRng::seed_from_u64(0);

        assert_eq!(model.sample(&[], &mut rng)?, Vec::<f64>::new());

        Ok(())
    }
}
