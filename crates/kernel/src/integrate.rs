//! Semi-implicit Euler integration with speed clamping and wall handling.
//!
//! ```text
//! v' = clamp(v + a * dt)
//! x' = x + v * dt          (pre-update velocity)
//! ```
//!
//! `dt` is the fixed physics substep, never the frame time. The candidate
//! `x'` is then checked against the domain: violated axes reflect their
//! component of `v'`, and any violation keeps the particle at `x`.

use glam::DVec3;

use crate::boundary::{DomainBounds, Reflection};
use crate::particle::Particle;

/// New state for one particle, not yet committed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationOutcome {
    /// Velocity to commit (always committed).
    pub velocity: DVec3,
    /// Position to commit: the candidate, or the old position on violation.
    pub position: DVec3,
    /// Wall check result.
    pub reflection: Reflection,
}

impl IntegrationOutcome {
    /// Write the outcome into the particle.
    pub fn apply(&self, particle: &mut Particle) {
        particle.velocity = self.velocity;
        particle.position = self.position;
    }
}

/// Scale `velocity` down to `max_speed` if it is faster, keeping direction.
#[inline]
pub fn clamp_speed(velocity: DVec3, max_speed: Option<f64>) -> DVec3 {
    match max_speed {
        Some(max) if velocity.length_squared() > max * max => velocity.normalize() * max,
        _ => velocity,
    }
}

/// Advance one particle by one substep given its acceleration.
pub fn integrate(
    particle: &Particle,
    acceleration: DVec3,
    substep: f64,
    max_speed: Option<f64>,
    bounds: &DomainBounds,
) -> IntegrationOutcome {
    let new_velocity = clamp_speed(particle.velocity + acceleration * substep, max_speed);
    let candidate = particle.position + particle.velocity * substep;

    let reflection = bounds.reflect(candidate, new_velocity);
    let position = if reflection.any() { particle.position } else { candidate };

    IntegrationOutcome { velocity: reflection.velocity, position, reflection }
}
