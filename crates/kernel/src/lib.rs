//! Voxel-grid SPH fluid kernel
//!
//! This crate is the computational core of the fluid simulation: particles
//! carrying mass, position and velocity evolve under Smoothed Particle
//! Hydrodynamics, with a voxel grid for neighbor search and semi-implicit
//! Euler integration against axis-aligned walls.
//!
//! # Modules
//! - [`smoothing`] -- poly6 density, spiky gradient and viscosity Laplacian kernels.
//! - [`neighbor`] -- voxel grid keyed by integer cell coordinates.
//! - [`particle`] -- particle state with shadow position and per-tick caches.
//! - [`sph`] -- neighborhood, density, pressure and force operators.
//! - [`eos`] -- linear equation of state.
//! - [`boundary`] -- per-axis domain walls and velocity reflection.
//! - [`force`] -- external body forces (gravity).
//! - [`integrate`] -- semi-implicit Euler step with speed clamp.
//! - [`fluid`] -- the particle arena and the per-tick pipeline.
//! - [`params`] -- model constants and their validation.

#![warn(missing_docs)]

pub mod boundary;
pub mod eos;
pub mod fluid;
pub mod force;
pub mod integrate;
pub mod neighbor;
pub mod params;
pub mod particle;
pub mod smoothing;
pub mod sph;

use glam::DVec3;

pub use boundary::{AxisBounds, DomainBounds, Reflection};
pub use eos::linear_eos;
pub use fluid::Fluid;
pub use force::{ExternalForce, Gravity, STANDARD_GRAVITY};
pub use integrate::{clamp_speed, integrate, IntegrationOutcome};
pub use neighbor::{VoxelGrid, VoxelKey};
pub use params::{FluidParams, ParamError};
pub use particle::Particle;
pub use smoothing::{density_kernel, pressure_gradient_kernel, viscosity_kernel, SmoothingKernels};
pub use sph::SphContext;

// ---------------------------------------------------------------------------
// SimulationKernel trait
// ---------------------------------------------------------------------------

/// Conservation and diagnostic quantities for a simulation snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FluidMetrics {
    /// Number of particles.
    pub particle_count: usize,
    /// Sum of particle masses.
    pub total_mass: f64,
    /// Sum of `m |v|^2 / 2`.
    pub kinetic_energy: f64,
    /// Sum of `m v`.
    pub momentum: DVec3,
    /// Largest `|rho - rho0| / rho0` over all particles.
    pub max_density_deviation: f64,
    /// Largest particle speed.
    pub max_speed: f64,
    /// Particles that hit a wall during the last tick.
    pub boundary_contacts: usize,
}

/// Anything a frame clock can drive.
///
/// A tick is:
///
/// 1. Snapshot positions and rebuild the neighbor index
/// 2. Density summation
/// 3. Force computation (pressure gradient + viscous + external)
/// 4. Time integration (semi-implicit Euler) and wall handling
pub trait SimulationKernel {
    /// Advance one tick. `accumulated_time` is the simulation time before
    /// this tick, `time_delta` the frame delta that triggered it.
    fn step(&mut self, accumulated_time: f64, time_delta: f64);

    /// Current particle state, in stable index order.
    fn particles(&self) -> &[Particle];

    /// Current diagnostic metrics.
    fn metrics(&self) -> FluidMetrics;

    /// Number of particles in the simulation.
    fn particle_count(&self) -> usize {
        self.particles().len()
    }
}
