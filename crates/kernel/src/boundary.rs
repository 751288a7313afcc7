//! Axis-aligned domain bounds and the reflection policy.
//!
//! Each axis may be closed on either side. When a particle's candidate
//! position leaves the domain on an axis, that axis's velocity component is
//! negated and scaled by the axis restitution. If any axis was violated the
//! particle keeps its previous position for the tick; the reflected velocity
//! is always committed.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::params::ParamError;

/// Bounds and restitution for one axis.
///
/// A missing `min`/`max` leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisBounds {
    /// Lower wall
    #[serde(default)]
    pub min: Option<f64>,
    /// Upper wall
    #[serde(default)]
    pub max: Option<f64>,
    /// Factor applied to the reflected velocity component, in `[0, 1]`.
    pub restitution: f64,
}

impl AxisBounds {
    /// Walls on both sides.
    pub const fn closed(min: f64, max: f64, restitution: f64) -> Self {
        Self { min: Some(min), max: Some(max), restitution }
    }

    /// Floor only.
    pub const fn floor(min: f64, restitution: f64) -> Self {
        Self { min: Some(min), max: None, restitution }
    }

    /// No walls.
    pub const fn open() -> Self {
        Self { min: None, max: None, restitution: 1.0 }
    }

    /// Whether `value` lies within the walls (walls themselves are inside).
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }

    fn validate(&self, axis: &'static str) -> Result<(), ParamError> {
        for value in self.min.into_iter().chain(self.max) {
            if !value.is_finite() {
                return Err(ParamError::NonFiniteBound { axis, value });
            }
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min >= max {
                return Err(ParamError::InvertedBounds { axis, min, max });
            }
        }
        if !(0.0..=1.0).contains(&self.restitution) {
            return Err(ParamError::Restitution { axis, value: self.restitution });
        }
        Ok(())
    }
}

/// Result of checking a candidate position against the domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reflection {
    /// Velocity with every violated component reflected and damped.
    pub velocity: DVec3,
    /// Which axes (x, y, z) were violated.
    pub violated: [bool; 3],
}

impl Reflection {
    /// `true` if any axis was violated; the position update is then dropped.
    pub fn any(&self) -> bool {
        self.violated.iter().any(|&v| v)
    }
}

/// Simulation domain: one [`AxisBounds`] per axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainBounds {
    /// X walls
    pub x: AxisBounds,
    /// Y walls
    pub y: AxisBounds,
    /// Z walls
    pub z: AxisBounds,
}

impl Default for DomainBounds {
    /// Side walls at +-10 on x and z, floor at y = -10 with stronger damping.
    fn default() -> Self {
        Self {
            x: AxisBounds::closed(-10.0, 10.0, 0.9),
            y: AxisBounds::floor(-10.0, 0.6),
            z: AxisBounds::closed(-10.0, 10.0, 0.9),
        }
    }
}

impl DomainBounds {
    /// A domain with no walls at all.
    pub const fn unbounded() -> Self {
        Self { x: AxisBounds::open(), y: AxisBounds::open(), z: AxisBounds::open() }
    }

    /// Check that walls are finite, ordered and restitutions lie in `[0, 1]`.
    pub fn validate(&self) -> Result<(), ParamError> {
        self.x.validate("x")?;
        self.y.validate("y")?;
        self.z.validate("z")?;
        Ok(())
    }

    fn axes(&self) -> [&AxisBounds; 3] {
        [&self.x, &self.y, &self.z]
    }

    /// Whether `point` is inside the domain on every axis.
    pub fn contains(&self, point: DVec3) -> bool {
        self.axes()
            .iter()
            .zip(point.to_array())
            .all(|(axis, v)| axis.contains(v))
    }

    /// Reflect `velocity` on every axis where `candidate` leaves the domain.
    pub fn reflect(&self, candidate: DVec3, velocity: DVec3) -> Reflection {
        let mut v = velocity.to_array();
        let mut violated = [false; 3];
        for (k, axis) in self.axes().iter().enumerate() {
            if !axis.contains(candidate[k]) {
                v[k] = -v[k] * axis.restitution;
                violated[k] = true;
            }
        }
        Reflection { velocity: DVec3::from_array(v), violated }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_domain_is_valid() {
        assert_eq!(DomainBounds::default().validate(), Ok(()));
        assert_eq!(DomainBounds::unbounded().validate(), Ok(()));
    }

    #[test]
    fn floor_is_open_above() {
        let floor = AxisBounds::floor(-10.0, 0.6);
        assert!(floor.contains(1.0e9));
        assert!(floor.contains(-10.0));
        assert!(!floor.contains(-10.000001));
    }

    #[test]
    fn reflect_inside_is_identity() {
        let domain = DomainBounds::default();
        let v = DVec3::new(1.0, -2.0, 3.0);
        let r = domain.reflect(DVec3::ZERO, v);
        assert_eq!(r.velocity, v);
        assert!(!r.any());
    }

    #[test]
    fn reflect_floor_damps_only_y() {
        let domain = DomainBounds::default();
        let r = domain.reflect(DVec3::new(0.0, -10.5, 0.0), DVec3::new(1.0, -5.0, 2.0));
        assert_eq!(r.violated, [false, true, false]);
        assert_eq!(r.velocity, DVec3::new(1.0, -5.0 * -0.6, 2.0));
    }

    #[test]
    fn reflect_corner_uses_per_axis_restitution() {
        let domain = DomainBounds::default();
        let r = domain.reflect(DVec3::new(11.0, -11.0, -11.0), DVec3::new(2.0, -1.0, -3.0));
        assert_eq!(r.violated, [true, true, true]);
        assert_eq!(r.velocity, DVec3::new(-2.0 * 0.9, 1.0 * 0.6, 3.0 * 0.9));
    }

    #[test]
    fn reflection_does_not_depend_on_velocity_sign() {
        // Already moving back inside: still reflected.
        let domain = DomainBounds::default();
        let r = domain.reflect(DVec3::new(0.0, -10.1, 0.0), DVec3::new(0.0, 1.0, 0.0));
        assert_eq!(r.velocity.y, -0.6);
    }

    #[test]
    fn rejects_inverted_bounds() {
        let mut domain = DomainBounds::default();
        domain.x = AxisBounds::closed(1.0, -1.0, 0.5);
        assert_eq!(
            domain.validate(),
            Err(ParamError::InvertedBounds { axis: "x", min: 1.0, max: -1.0 })
        );
    }

    #[test]
    fn rejects_restitution_out_of_range() {
        let mut domain = DomainBounds::default();
        domain.y.restitution = 1.5;
        assert!(matches!(domain.validate(), Err(ParamError::Restitution { axis: "y", .. })));
    }

    #[test]
    fn rejects_non_finite_bound() {
        let mut domain = DomainBounds::default();
        domain.z.max = Some(f64::INFINITY);
        assert!(matches!(domain.validate(), Err(ParamError::NonFiniteBound { axis: "z", .. })));
    }
}
