//! Equation of state.
//!
//! The fluid uses the linear (ideal-gas-like) pressure law of Müller et al.
//! (2003):
//!
//! ```text
//! P = k * (rho - rho0)
//! ```
//!
//! which produces gauge pressure: zero at rest density, negative under
//! rarefaction.

/// Default rest density used by [`FluidParams::default`](crate::FluidParams).
pub const DEFAULT_REST_DENSITY: f64 = 1.0;

/// Default stiffness `k`.
pub const DEFAULT_STIFFNESS: f64 = 1.0;

/// Linear equation of state.
///
/// # Arguments
/// * `density` - Current density rho.
/// * `rest_density` - Reference rest density rho0.
/// * `stiffness` - Gas constant `k`.
///
/// # Returns
/// Pressure. Negative when `density < rest_density`; never clamped.
#[inline]
pub fn linear_eos(density: f64, rest_density: f64, stiffness: f64) -> f64 {
    stiffness * (density - rest_density)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_at_rest_density() {
        assert_eq!(linear_eos(1000.0, 1000.0, 3.0), 0.0);
    }

    #[test]
    fn positive_when_compressed() {
        let p = linear_eos(1.2, DEFAULT_REST_DENSITY, DEFAULT_STIFFNESS);
        assert!(p > 0.0, "compressed fluid should have positive pressure, got {p}");
    }

    #[test]
    fn negative_when_rarefied() {
        let p = linear_eos(0.5, DEFAULT_REST_DENSITY, 2.0);
        assert_eq!(p, -1.0);
    }

    #[test]
    fn proportional_to_stiffness() {
        let p1 = linear_eos(2.0, 1.0, 1.0);
        let p2 = linear_eos(2.0, 1.0, 4.0);
        assert_eq!(p2, 4.0 * p1);
    }
}
