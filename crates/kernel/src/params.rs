//! Physical parameters of the fluid and their validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::eos::{DEFAULT_REST_DENSITY, DEFAULT_STIFFNESS};
use crate::neighbor::{voxel_reach, MAX_VOXEL_REACH};

/// A parameter that cannot produce a meaningful simulation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    /// A value that must be strictly positive and finite was not.
    #[error("{name} must be positive and finite, got {value}")]
    NotPositive {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
    },
    /// A value that must be non-negative and finite was not.
    #[error("{name} must be non-negative and finite, got {value}")]
    Negative {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
    },
    /// A domain axis whose minimum is not below its maximum.
    #[error("{axis} bounds are inverted: min {min} >= max {max}")]
    InvertedBounds {
        /// Axis label
        axis: &'static str,
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },
    /// A bound that is NaN or infinite.
    #[error("{axis} bound must be finite, got {value}")]
    NonFiniteBound {
        /// Axis label
        axis: &'static str,
        /// Offending value
        value: f64,
    },
    /// A voxel edge so small relative to the smoothing radius that the
    /// neighbor search would span too many voxels.
    #[error(
        "voxel_edge_length {voxel_edge_length} needs {reach} voxel rings to cover \
         smoothing_radius {smoothing_radius} (at most {max} allowed)"
    )]
    VoxelReach {
        /// Voxel edge length
        voxel_edge_length: f64,
        /// Smoothing radius
        smoothing_radius: f64,
        /// Rings the search would need
        reach: f64,
        /// Largest allowed ring count
        max: i64,
    },
    /// Restitution outside `[0, 1]`.
    #[error("{axis} restitution must be within [0, 1], got {value}")]
    Restitution {
        /// Axis label
        axis: &'static str,
        /// Offending value
        value: f64,
    },
}

/// Constants of the SPH model and the integrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FluidParams {
    /// Smoothing radius `h`; kernels vanish beyond it.
    pub smoothing_radius: f64,
    /// Rest density `rho0`.
    pub rest_density: f64,
    /// Stiffness `k` of the linear equation of state.
    pub stiffness: f64,
    /// Viscosity coefficient `mu`.
    pub viscosity: f64,
    /// Voxel edge length of the neighbor grid.
    pub voxel_edge_length: f64,
    /// Fixed physics substep used by integration, independent of frame time.
    pub fixed_substep: f64,
    /// Optional cap on particle speed after the velocity update.
    pub max_speed: Option<f64>,
    /// Evaluate accelerations on the rayon thread pool.
    pub parallel: bool,
}

impl Default for FluidParams {
    fn default() -> Self {
        Self {
            smoothing_radius: 1.0,
            rest_density: DEFAULT_REST_DENSITY,
            stiffness: DEFAULT_STIFFNESS,
            viscosity: 1.0,
            voxel_edge_length: 1.0,
            fixed_substep: 0.01,
            max_speed: Some(10.0),
            parallel: false,
        }
    }
}

pub(crate) fn require_positive(name: &'static str, value: f64) -> Result<(), ParamError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ParamError::NotPositive { name, value })
    }
}

pub(crate) fn require_non_negative(name: &'static str, value: f64) -> Result<(), ParamError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ParamError::Negative { name, value })
    }
}

impl FluidParams {
    /// Check every constant, returning the first problem found.
    pub fn validate(&self) -> Result<(), ParamError> {
        require_positive("smoothing_radius", self.smoothing_radius)?;
        require_positive("rest_density", self.rest_density)?;
        require_non_negative("stiffness", self.stiffness)?;
        require_non_negative("viscosity", self.viscosity)?;
        require_positive("voxel_edge_length", self.voxel_edge_length)?;
        let reach = voxel_reach(self.voxel_edge_length, self.smoothing_radius);
        if reach > MAX_VOXEL_REACH as f64 {
            return Err(ParamError::VoxelReach {
                voxel_edge_length: self.voxel_edge_length,
                smoothing_radius: self.smoothing_radius,
                reach,
                max: MAX_VOXEL_REACH,
            });
        }
        require_positive("fixed_substep", self.fixed_substep)?;
        if let Some(max_speed) = self.max_speed {
            require_positive("max_speed", max_speed)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(FluidParams::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_non_positive_smoothing_radius() {
        let params = FluidParams { smoothing_radius: 0.0, ..Default::default() };
        assert_eq!(
            params.validate(),
            Err(ParamError::NotPositive { name: "smoothing_radius", value: 0.0 })
        );
    }

    #[test]
    fn rejects_non_positive_voxel_edge() {
        let params = FluidParams { voxel_edge_length: -1.0, ..Default::default() };
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("voxel_edge_length"), "{err}");
    }

    #[test]
    fn rejects_voxel_edge_far_below_smoothing_radius() {
        let params = FluidParams { voxel_edge_length: 1.0e-4, ..Default::default() };
        let err = params.validate().unwrap_err();
        assert!(matches!(err, ParamError::VoxelReach { max: MAX_VOXEL_REACH, .. }), "{err}");

        let params = FluidParams { voxel_edge_length: 1.0e-12, ..Default::default() };
        assert!(matches!(params.validate(), Err(ParamError::VoxelReach { .. })));

        // Exactly at the limit is fine.
        let params = FluidParams { voxel_edge_length: 1.0 / MAX_VOXEL_REACH as f64, ..Default::default() };
        assert_eq!(params.validate(), Ok(()));
    }

    #[test]
    fn rejects_nan() {
        let params = FluidParams { rest_density: f64::NAN, ..Default::default() };
        assert!(params.validate().is_err());
    }

    #[test]
    fn zero_viscosity_and_no_speed_cap_are_allowed() {
        let params = FluidParams { viscosity: 0.0, max_speed: None, ..Default::default() };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn rejects_zero_max_speed() {
        let params = FluidParams { max_speed: Some(0.0), ..Default::default() };
        assert!(params.validate().is_err());
    }
}
