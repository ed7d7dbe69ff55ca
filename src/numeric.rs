/*

    Declare numeric types used throughout this crate.

    WARNING: If you like to use f32 instead of f64
    during computations, you need to change all of these
    together (Float, Vector3, Vector4, Matrix4).

    bevy_math is the vector math layer the bounding
    volumes are built on: min/max, dot, cross, normalize.

    @date: 2 Oct, 2025
    @author: Bartu
*/

use bevy_math::{DMat4, DVec3, DVec4};
pub type Float = f64; // WARNING: If you want to change it to f32, don't forget to update vector and matrix types
pub type Vector3 = DVec3;
pub type Vector4 = DVec4;
pub type Matrix4 = DMat4;

/// World unit axes X, Y, Z in this order.
pub const WORLD_AXES: [Vector3; 3] = [Vector3::X, Vector3::Y, Vector3::Z];

pub fn approx_zero(x: Float) -> bool {
    x.abs() < 1e-8
}

/// Component-wise comparison with tolerance `eps`
pub fn approx_eq(a: Vector3, b: Vector3, eps: Float) -> bool {
    (a - b).abs().max_element() <= eps
}

pub fn transform_point(mat: &Matrix4, v: &Vector3) -> Vector3 {
    let v4 = Vector4::new(v.x, v.y, v.z, 1.0);
    let r = *mat * v4;
    Vector3::new(r.x, r.y, r.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approx_helpers() {
        assert!(approx_zero(1e-9));
        assert!(!approx_zero(1e-3));
        assert!(approx_eq(Vector3::new(1.0, 2.0, 3.0), Vector3::new(1.0005, 2.0, 2.9995), 1e-3));
        assert!(!approx_eq(Vector3::ZERO, Vector3::X, 0.5));
    }

    #[test]
    fn transform_point_applies_translation() {
        let m = Matrix4::from_translation(Vector3::new(1.0, -2.0, 3.0));
        let p = transform_point(&m, &Vector3::ONE);
        assert!(approx_eq(p, Vector3::new(2.0, -1.0, 4.0), 1e-12));
    }
}
