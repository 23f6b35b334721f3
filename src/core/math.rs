// Math utilities and helper functions

use glam::Vec3;

/// Clamp a value between min and max
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Linear interpolation
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Unit vector from spherical coordinates.
///
/// `theta` is the azimuth around the Y axis, `phi` the polar angle measured
/// from +Y, both in radians.
pub fn spherical_direction(theta: f32, phi: f32) -> Vec3 {
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();
    Vec3::new(sin_phi * cos_theta, cos_phi, sin_phi * sin_theta)
}
