//! Domain setup: lattice seeding and fluid construction

use glam::DVec3;
use sph_kernel::{Fluid, Particle};

use crate::config::{ConfigError, LatticeConfig, SimulationConfig};

/// Place `nx * ny * nz` particles at rest on a cubic lattice.
///
/// Particles are ordered x-major: the index of the particle at lattice
/// coordinates `(i, j, k)` is `(i * ny + j) * nz + k`.
pub fn seed_lattice(lattice: &LatticeConfig) -> Vec<Particle> {
    let [nx, ny, nz] = lattice.dimensions;
    let origin = DVec3::from(lattice.origin);

    let mut particles = Vec::with_capacity(lattice.particle_count().unwrap_or(0));
    for i in 0..nx {
        for j in 0..ny {
            for k in 0..nz {
                let offset = DVec3::new(i as f64, j as f64, k as f64) * lattice.spacing;
                particles.push(Particle::new(origin + offset, lattice.particle_mass));
            }
        }
    }
    particles
}

/// Build a fluid from a validated configuration.
pub fn build_fluid(config: &SimulationConfig) -> Result<Fluid, ConfigError> {
    let particles = seed_lattice(&config.lattice);
    tracing::info!(
        "Seeded {} particles on a {:?} lattice (spacing {})",
        particles.len(),
        config.lattice.dimensions,
        config.lattice.spacing
    );

    let fluid = Fluid::new(particles, config.fluid.clone(), config.bounds, config.gravity())?;
    Ok(fluid)
}
