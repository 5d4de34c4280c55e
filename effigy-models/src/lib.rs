//! Reference surrogate models for the Effigy framework.
//!
//! Each model here implements [`effigy_core::Surrogate`] with nothing more
//! than scalar arithmetic, trading modeling power for transparency. They
//! serve as baselines for model comparison and as known-good substitutes
//! when exercising code written against the contract.

mod point_mass;

pub mod constant;
pub mod global_mean;
pub mod nearest_neighbor;

pub use constant::Constant;
pub use global_mean::GlobalMean;
pub use nearest_neighbor::NearestNeighbor;
pub use point_mass::PointMass;
