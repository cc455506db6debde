//! Engagement constants - fixed values of the combat model
//!
//! Values that a classroom may want to tune live in `EngineConfig`; these
//! are the defaults it starts from.

// Mobility
pub const FIXED_DETECTABLE_AREA: f64 = 5.0;

// Numerical stability: substituted for A, sigma and b at a division
pub const DIVISION_EPSILON: f64 = 0.01;

// First strike
pub const FIRST_STRIKE_FRACTION: f64 = 0.3;

// Per-side damage random factor band
pub const RANDOM_FACTOR_MIN: f64 = 0.8;
pub const RANDOM_FACTOR_MAX: f64 = 1.2;

// Phase indices
pub const PHASE_COUNT: usize = 5;
