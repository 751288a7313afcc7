//! Core SPH operators: neighborhood, density, pressure and forces.
//!
//! All operators work on an arena of particles addressed by index together
//! with the voxel grid built for the current tick. They read only
//! `shadow_position`, mass, velocity and the per-tick caches, so evaluating
//! them for one particle never depends on another particle's in-progress
//! update.
//!
//! ```text
//! rho_i    = m_i W(0) + sum_j m_j W(r_ij)
//! P_i      = k (rho_i - rho0)
//! f_p,i    = sum_j m_j (P_i / rho_i^2 + P_j / rho_j^2) gradW(r_ij) e_ij
//! f_v,i    = mu / rho_i * sum_j (m_j / rho_j) mu lapW(r_ij) (v_j - v_i)
//! a_i      = f_ext,i + f_v,i - f_p,i
//! ```
//!
//! where `e_ij` is the unit vector from particle `i` towards neighbor `j`.

use glam::DVec3;

use crate::eos::linear_eos;
use crate::force::ExternalForce;
use crate::neighbor::VoxelGrid;
use crate::params::FluidParams;
use crate::particle::Particle;
use crate::smoothing::SmoothingKernels;

/// Everything SPH evaluation needs for one tick, borrowed immutably.
///
/// Copyable and `Sync`, so the same context can be shared across worker
/// threads once the grid is built.
#[derive(Clone, Copy)]
pub struct SphContext<'a> {
    /// Particle arena
    pub particles: &'a [Particle],
    /// Grid rebuilt from the particles' shadow positions this tick
    pub grid: &'a VoxelGrid,
    /// Kernels for the smoothing radius
    pub kernels: &'a SmoothingKernels,
    /// Model constants
    pub params: &'a FluidParams,
    /// Body force
    pub external_force: &'a dyn ExternalForce,
}

impl<'a> SphContext<'a> {
    /// Neighbors of particle `i`: grid candidates strictly closer than the
    /// smoothing radius. Computed once per tick and cached on the particle.
    pub fn neighborhood(&self, i: usize) -> &'a [usize] {
        let particles = self.particles;
        let me = &particles[i];
        let h = self.kernels.radius();
        me.neighbors_or_init(|| {
            let mut out = Vec::new();
            self.grid.for_each_candidate(i, |j| {
                if me.distance_to(&particles[j]) < h {
                    out.push(j);
                }
            });
            out
        })
    }

    /// Density of particle `i`, including its own contribution. Cached per
    /// tick.
    pub fn density(&self, i: usize) -> f64 {
        let me = &self.particles[i];
        me.density_or_init(|| {
            let mut rho = me.mass * self.kernels.density(0.0);
            for &j in self.neighborhood(i) {
                let other = &self.particles[j];
                rho += other.mass * self.kernels.density(me.distance_to(other));
            }
            rho
        })
    }

    /// Density of `i` if it is usable as a divisor.
    ///
    /// Density is positive by construction (positive mass, positive self
    /// contribution); anything else means the constants are broken.
    fn divisor_density(&self, i: usize) -> Option<f64> {
        let rho = self.density(i);
        debug_assert!(
            rho.is_finite() && rho > 0.0,
            "particle {i} has degenerate density {rho}"
        );
        if rho.is_finite() && rho > 0.0 {
            Some(rho)
        } else {
            tracing::error!(particle = i, density = rho, "degenerate density, skipping force terms");
            None
        }
    }

    /// Pressure of particle `i` from the linear equation of state. May be
    /// negative.
    pub fn pressure(&self, i: usize) -> f64 {
        linear_eos(self.density(i), self.params.rest_density, self.params.stiffness)
    }

    /// Symmetric pressure-gradient term. The acceleration subtracts it.
    pub fn pressure_gradient_force(&self, i: usize) -> DVec3 {
        let Some(rho_i) = self.divisor_density(i) else {
            return DVec3::ZERO;
        };
        let me = &self.particles[i];
        let term_i = self.pressure(i) / (rho_i * rho_i);

        let mut total = DVec3::ZERO;
        for &j in self.neighborhood(i) {
            let other = &self.particles[j];
            let offset = other.shadow_position() - me.shadow_position();
            let r = offset.length();
            // Coincident particles define no direction.
            if r <= 0.0 {
                continue;
            }
            let Some(rho_j) = self.divisor_density(j) else {
                continue;
            };
            let term_j = self.pressure(j) / (rho_j * rho_j);
            let weight = other.mass * (term_i + term_j) * self.kernels.pressure_gradient(r);
            total += offset / r * weight;
        }
        total
    }

    /// Viscous term pulling particle `i` towards its neighbors' velocity.
    pub fn viscous_force(&self, i: usize) -> DVec3 {
        let Some(rho_i) = self.divisor_density(i) else {
            return DVec3::ZERO;
        };
        let me = &self.particles[i];
        let mu = self.params.viscosity;

        let mut total = DVec3::ZERO;
        for &j in self.neighborhood(i) {
            let other = &self.particles[j];
            let Some(rho_j) = self.divisor_density(j) else {
                continue;
            };
            let weight = other.mass / rho_j * self.kernels.viscosity(me.distance_to(other));
            total += (other.velocity - me.velocity) * weight;
        }
        total * (mu / rho_i)
    }

    /// Body force on particle `i` at accumulated time `time`.
    pub fn external_force(&self, i: usize, time: f64) -> DVec3 {
        self.external_force.acceleration(time, self.density(i))
    }

    /// Total acceleration of particle `i`.
    pub fn acceleration(&self, i: usize, time: f64) -> DVec3 {
        self.external_force(i, time) + self.viscous_force(i) - self.pressure_gradient_force(i)
    }
}
