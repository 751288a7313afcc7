//! Configuration parsing and validation for fluid simulations

use serde::{Deserialize, Serialize};
use sph_kernel::{DomainBounds, FluidParams, Gravity, ParamError, STANDARD_GRAVITY};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a configuration could not be used.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// File that was requested
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid configuration JSON.
    #[error("failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// A physical parameter or domain wall is out of range.
    #[error("invalid parameter: {0}")]
    Param(#[from] ParamError),
    /// The lattice would seed no particles.
    #[error("lattice has no particles: dimensions {0:?}")]
    EmptyLattice([usize; 3]),
    /// Lattice spacing must be positive and finite.
    #[error("lattice spacing must be positive and finite, got {0}")]
    LatticeSpacing(f64),
    /// Particle mass must be positive and finite.
    #[error("particle mass must be positive and finite, got {0}")]
    ParticleMass(f64),
    /// The lattice dimensions multiply past the addressable particle count.
    #[error("lattice dimensions {0:?} overflow the particle count")]
    LatticeTooLarge([usize; 3]),
    /// Part of the lattice lies outside the domain walls.
    #[error("lattice corner {corner:?} lies outside the domain")]
    LatticeOutsideBounds {
        /// First offending corner
        corner: [f64; 3],
    },
    /// Frame interval must be positive and finite.
    #[error("frame interval must be positive and finite, got {0}")]
    FrameInterval(f64),
}

/// Main simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Human-readable simulation name
    #[serde(default = "default_name")]
    pub name: String,
    /// SPH constants and integrator settings
    #[serde(default)]
    pub fluid: FluidParams,
    /// Domain walls with per-axis restitution
    #[serde(default)]
    pub bounds: DomainBounds,
    /// Gravity vector
    #[serde(default = "default_gravity")]
    pub gravity: [f64; 3],
    /// Scale gravity by each particle's density
    #[serde(default = "default_density_scaled")]
    pub gravity_density_scaled: bool,
    /// Initial particle block
    #[serde(default)]
    pub lattice: LatticeConfig,
    /// Number of frames for a headless run
    #[serde(default = "default_frames")]
    pub frames: u64,
    /// Seconds between frames for a headless run
    #[serde(default = "default_frame_interval")]
    pub frame_interval: f64,
}

/// Rectangular block of particles seeded at rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatticeConfig {
    /// Position of the first particle
    #[serde(default)]
    pub origin: [f64; 3],
    /// Particle count along each axis
    #[serde(default = "default_dimensions")]
    pub dimensions: [usize; 3],
    /// Distance between neighboring particles
    #[serde(default = "default_spacing")]
    pub spacing: f64,
    /// Mass of every particle
    #[serde(default = "default_particle_mass")]
    pub particle_mass: f64,
}

// Default values
fn default_name() -> String {
    "fluid".to_string()
}

fn default_gravity() -> [f64; 3] {
    STANDARD_GRAVITY.to_array()
}

fn default_density_scaled() -> bool {
    true
}

fn default_frames() -> u64 {
    600
}

fn default_frame_interval() -> f64 {
    1.0 / 60.0
}

fn default_dimensions() -> [usize; 3] {
    [10, 5, 10]
}

fn default_spacing() -> f64 {
    0.5
}

fn default_particle_mass() -> f64 {
    1.0
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            origin: [0.0; 3],
            dimensions: default_dimensions(),
            spacing: default_spacing(),
            particle_mass: default_particle_mass(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            fluid: FluidParams::default(),
            bounds: DomainBounds::default(),
            gravity: default_gravity(),
            gravity_density_scaled: default_density_scaled(),
            lattice: LatticeConfig::default(),
            frames: default_frames(),
            frame_interval: default_frame_interval(),
        }
    }
}

impl LatticeConfig {
    /// Total particle count `nx * ny * nz`, or `None` if it overflows.
    pub fn particle_count(&self) -> Option<usize> {
        let [nx, ny, nz] = self.dimensions;
        nx.checked_mul(ny)?.checked_mul(nz)
    }

    /// Position of the particle opposite the origin.
    pub fn far_corner(&self) -> [f64; 3] {
        let mut corner = self.origin;
        for (c, &n) in corner.iter_mut().zip(&self.dimensions) {
            *c += n.saturating_sub(1) as f64 * self.spacing;
        }
        corner
    }
}

impl SimulationConfig {
    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Parse and validate configuration JSON
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fluid.validate()?;
        self.bounds.validate()?;

        let lattice = &self.lattice;
        match lattice.particle_count() {
            None => return Err(ConfigError::LatticeTooLarge(lattice.dimensions)),
            Some(0) => return Err(ConfigError::EmptyLattice(lattice.dimensions)),
            Some(_) => {}
        }
        if !(lattice.spacing.is_finite() && lattice.spacing > 0.0) {
            return Err(ConfigError::LatticeSpacing(lattice.spacing));
        }
        if !(lattice.particle_mass.is_finite() && lattice.particle_mass > 0.0) {
            return Err(ConfigError::ParticleMass(lattice.particle_mass));
        }
        for corner in [lattice.origin, lattice.far_corner()] {
            if !self.bounds.contains(corner.into()) {
                return Err(ConfigError::LatticeOutsideBounds { corner });
            }
        }

        if !(self.frame_interval.is_finite() && self.frame_interval > 0.0) {
            return Err(ConfigError::FrameInterval(self.frame_interval));
        }
        Ok(())
    }

    /// External force described by the gravity settings
    pub fn gravity(&self) -> Gravity {
        Gravity {
            acceleration: self.gravity.into(),
            density_scaled: self.gravity_density_scaled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.lattice.particle_count(), Some(500));
        assert_eq!(config.gravity(), Gravity::default());
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = SimulationConfig::from_json("{}").unwrap();
        assert_eq!(config, SimulationConfig::default());
    }

    #[test]
    fn test_partial_json() {
        let config = SimulationConfig::from_json(
            r#"{
                "name": "drop",
                "fluid": { "viscosity": 0.5, "max_speed": null },
                "lattice": { "dimensions": [2, 3, 4], "spacing": 0.25 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.name, "drop");
        assert_eq!(config.fluid.viscosity, 0.5);
        assert_eq!(config.fluid.max_speed, None);
        assert_eq!(config.fluid.smoothing_radius, 1.0);
        assert_eq!(config.lattice.particle_count(), Some(24));
        assert_eq!(config.lattice.particle_mass, 1.0);
    }

    #[test]
    fn test_validation_smoothing_radius() {
        let err = SimulationConfig::from_json(r#"{ "fluid": { "smoothing_radius": 0.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Param(ParamError::NotPositive { name: "smoothing_radius", .. })));
        assert!(err.to_string().contains("smoothing_radius"), "{err}");
    }

    #[test]
    fn test_validation_voxel_edge() {
        let mut config = SimulationConfig::default();
        config.fluid.voxel_edge_length = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::Param(_))));
    }

    #[test]
    fn test_validation_domain_bounds() {
        let mut config = SimulationConfig::default();
        config.bounds.x.min = Some(20.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Param(ParamError::InvertedBounds { axis: "x", .. }))
        ));
    }

    #[test]
    fn test_validation_lattice() {
        let mut config = SimulationConfig::default();
        config.lattice.dimensions = [10, 0, 10];
        assert!(matches!(config.validate(), Err(ConfigError::EmptyLattice(_))));

        let mut config = SimulationConfig::default();
        config.lattice.spacing = -0.5;
        assert!(matches!(config.validate(), Err(ConfigError::LatticeSpacing(_))));

        let mut config = SimulationConfig::default();
        config.lattice.particle_mass = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::ParticleMass(_))));

        let mut config = SimulationConfig::default();
        config.lattice.spacing = 5.0;
        assert!(matches!(config.validate(), Err(ConfigError::LatticeOutsideBounds { .. })));
    }

    #[test]
    fn test_validation_lattice_overflow() {
        let mut config = SimulationConfig::default();
        config.lattice.dimensions = [usize::MAX, 2, 1];
        assert_eq!(config.lattice.particle_count(), None);
        assert!(matches!(config.validate(), Err(ConfigError::LatticeTooLarge([usize::MAX, 2, 1]))));

        let err = SimulationConfig::from_json(r#"{ "lattice": { "dimensions": [4294967296, 4294967296, 2] } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::LatticeTooLarge(_)), "{err}");
    }

    #[test]
    fn test_validation_voxel_reach() {
        let mut config = SimulationConfig::default();
        config.fluid.voxel_edge_length = 1.0e-4;
        assert!(matches!(config.validate(), Err(ConfigError::Param(ParamError::VoxelReach { .. }))));
    }

    #[test]
    fn test_far_corner() {
        let lattice = LatticeConfig {
            origin: [1.0, 2.0, 3.0],
            dimensions: [3, 1, 2],
            spacing: 0.5,
            particle_mass: 1.0,
        };
        assert_eq!(lattice.far_corner(), [2.0, 2.0, 3.5]);
    }

    #[test]
    fn test_missing_file() {
        let err = SimulationConfig::load("does/not/exist.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_malformed_json() {
        let err = SimulationConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
