//! Momentum transfer and resolution relations.
//!
//! Angles are in degrees and wavelengths in whatever length unit the loader
//! chose; Q comes out in the inverse of that unit.

use std::f64::consts::PI;

/// `4π` factor shared by the Q relations.
pub const FOUR_PI: f64 = 4.0 * PI;

/// Momentum transfer `4π/λ · sin(θ)`.
#[inline]
#[must_use]
pub fn q_from(theta: f64, wavelength: f64) -> f64 {
    FOUR_PI / wavelength * theta.to_radians().sin()
}

/// 1-sigma Q resolution for a point with angular spread `dtheta` and
/// wavelength spread `dwavelength`.
///
/// Uses `4π/λ · sqrt((cos θ·Δθ)² + (sin θ·Δλ/λ)²)`, which equals
/// `q·sqrt((Δλ/λ)² + (Δθ/tan θ)²)` but stays finite at θ = 0.
#[inline]
#[must_use]
pub fn dq_from(theta: f64, dtheta: f64, wavelength: f64, dwavelength: f64) -> f64 {
    let t = theta.to_radians();
    let angular = t.cos() * dtheta.to_radians();
    let spectral = t.sin() * dwavelength / wavelength;
    FOUR_PI / wavelength * angular.hypot(spectral)
}

/// Angle in degrees reproducing `q` at `wavelength`.
#[inline]
#[must_use]
pub fn theta_from(q: f64, wavelength: f64) -> f64 {
    (q * wavelength / FOUR_PI).asin().to_degrees()
}
