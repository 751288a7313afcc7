//! SPH smoothing kernels (Müller et al. 2003).
//!
//! Three kernels share one smoothing radius `h` and all have compact support:
//! they return exactly zero for `r >= h`.
//!
//! ```text
//! poly6 (density):             W(r, h)      =  315 / (64 pi h^9) * (h^2 - r^2)^3
//! spiky gradient (pressure):   grad W(r, h) = -45 / (pi h^6)     * (h - r)^2
//! viscosity laplacian:         lap W(r, h)  =  45 / (pi h^6)     * (h - r)
//! ```
//!
//! The viscosity coefficient is the negated pressure-gradient coefficient
//! rather than a separately derived constant, so the pair is bit-for-bit
//! symmetric.

use std::f64::consts::PI;

/// Poly6 normalization `315 / (64 pi h^9)`.
pub fn density_coefficient(h: f64) -> f64 {
    315.0 / (64.0 * PI * h.powi(9))
}

/// Spiky gradient normalization `-45 / (pi h^6)`. Always negative.
pub fn pressure_gradient_coefficient(h: f64) -> f64 {
    -45.0 / (PI * h.powi(6))
}

/// Viscosity Laplacian normalization, `-pressure_gradient_coefficient(h)`.
pub fn viscosity_coefficient(h: f64) -> f64 {
    -pressure_gradient_coefficient(h)
}

/// Poly6 density kernel.
///
/// # Arguments
/// * `r` - Distance between two particles (>= 0).
/// * `h` - Smoothing radius.
pub fn density_kernel(r: f64, h: f64) -> f64 {
    if r >= h {
        return 0.0;
    }
    let d = h * h - r * r;
    density_coefficient(h) * d * d * d
}

/// Spiky pressure-gradient kernel magnitude (negative inside the support).
pub fn pressure_gradient_kernel(r: f64, h: f64) -> f64 {
    if r >= h {
        return 0.0;
    }
    let d = h - r;
    pressure_gradient_coefficient(h) * d * d
}

/// Viscosity Laplacian kernel (positive inside the support).
pub fn viscosity_kernel(r: f64, h: f64) -> f64 {
    if r >= h {
        return 0.0;
    }
    viscosity_coefficient(h) * (h - r)
}

/// The three kernels with their normalizations precomputed for one radius.
///
/// Evaluates to exactly the same values as the free functions; it only
/// avoids the `powi` calls in the neighbor loops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingKernels {
    h: f64,
    h_squared: f64,
    density_coeff: f64,
    pressure_gradient_coeff: f64,
    viscosity_coeff: f64,
}

impl SmoothingKernels {
    /// Precompute coefficients for smoothing radius `h`.
    pub fn new(h: f64) -> Self {
        Self {
            h,
            h_squared: h * h,
            density_coeff: density_coefficient(h),
            pressure_gradient_coeff: pressure_gradient_coefficient(h),
            viscosity_coeff: viscosity_coefficient(h),
        }
    }

    /// Smoothing radius these kernels were built for.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.h
    }

    /// See [`density_kernel`].
    #[inline]
    pub fn density(&self, r: f64) -> f64 {
        if r >= self.h {
            return 0.0;
        }
        let d = self.h_squared - r * r;
        self.density_coeff * d * d * d
    }

    /// See [`pressure_gradient_kernel`].
    #[inline]
    pub fn pressure_gradient(&self, r: f64) -> f64 {
        if r >= self.h {
            return 0.0;
        }
        let d = self.h - r;
        self.pressure_gradient_coeff * d * d
    }

    /// See [`viscosity_kernel`].
    #[inline]
    pub fn viscosity(&self, r: f64) -> f64 {
        if r >= self.h {
            return 0.0;
        }
        self.viscosity_coeff * (self.h - r)
    }
}
