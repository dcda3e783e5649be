pub mod documentation;
pub mod error;
pub mod portfolio;
pub mod scoring;
pub mod types;
pub mod weights;

#[cfg(feature = "amplification")]
pub mod amplification;

#[cfg(feature = "hold_period")]
pub mod hold_period;

#[cfg(feature = "assessment")]
pub mod assessment;

pub use error::PriorityError;
pub use types::*;
pub use weights::WeightConfig;

/// Standard result type for all priority-engine operations
pub type PriorityResult<T> = Result<T, PriorityError>;
