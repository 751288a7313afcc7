//! Orchestration Layer
//!
//! This crate wires the fluid kernel to the outside world:
//! - JSON configuration loading and validation
//! - Lattice seeding of the initial particle block
//! - The frame clock that steps the fluid and the sink seam that reads it

#![warn(missing_docs)]

pub mod clock;
pub mod config;
pub mod domain;

pub use clock::{BoundsSink, FrameClock, FrameSink};
pub use config::{ConfigError, LatticeConfig, SimulationConfig};
pub use domain::{build_fluid, seed_lattice};

use sph_kernel::Fluid;
use std::path::Path;

/// Create a complete simulation from a configuration file
///
/// This function performs the full simulation setup pipeline:
/// 1. Load and validate the configuration
/// 2. Seed the particle lattice
/// 3. Create the fluid
/// 4. Hand it to a frame clock
///
/// # Example
/// ```no_run
/// use sph_orchestrator::{create_simulation, BoundsSink};
///
/// let (config, mut clock) = create_simulation("configs/dam-break.json")?;
/// let metrics = clock.run(config.frames, config.frame_interval, &mut BoundsSink::default());
/// println!("{} particles", metrics.particle_count);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn create_simulation(
    config_path: impl AsRef<Path>,
) -> Result<(SimulationConfig, FrameClock<Fluid>), ConfigError> {
    let config_path = config_path.as_ref();
    tracing::info!("Creating simulation from config: {}", config_path.display());

    let config = SimulationConfig::load(config_path)?;
    tracing::info!("Configuration loaded: {}", config.name);

    let fluid = build_fluid(&config)?;
    tracing::info!(
        "Fluid ready: {} particles, h = {}, voxel edge = {}, parallel = {}",
        fluid.particles().len(),
        config.fluid.smoothing_radius,
        config.fluid.voxel_edge_length,
        config.fluid.parallel
    );

    Ok((config, FrameClock::new(fluid)))
}
