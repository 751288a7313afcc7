//! External body forces.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Body force acting on every particle.
///
/// `time` is the accumulated simulation time handed to
/// [`Fluid::step`](crate::Fluid::step), so implementations may vary with
/// time. `density` is the particle's density for the current tick.
pub trait ExternalForce: Send + Sync {
    /// Acceleration contributed at `time` for a particle of `density`.
    fn acceleration(&self, time: f64, density: f64) -> DVec3;
}

/// Standard gravity.
pub const STANDARD_GRAVITY: DVec3 = DVec3::new(0.0, -9.81, 0.0);

/// Uniform gravity, optionally scaled by local density.
///
/// Density scaling keeps the body force proportional to how much fluid a
/// particle represents, which is the default behaviour of the model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gravity {
    /// Gravitational acceleration vector.
    pub acceleration: DVec3,
    /// Multiply by density.
    pub density_scaled: bool,
}

impl Default for Gravity {
    fn default() -> Self {
        Self { acceleration: STANDARD_GRAVITY, density_scaled: true }
    }
}

impl Gravity {
    /// No body force at all.
    pub const fn zero() -> Self {
        Self { acceleration: DVec3::ZERO, density_scaled: false }
    }

    /// Unscaled gravity with the given vector.
    pub const fn uniform(acceleration: DVec3) -> Self {
        Self { acceleration, density_scaled: false }
    }
}

impl ExternalForce for Gravity {
    fn acceleration(&self, _time: f64, density: f64) -> DVec3 {
        if self.density_scaled {
            self.acceleration * density
        } else {
            self.acceleration
        }
    }
}
