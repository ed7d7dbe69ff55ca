/*

    Half-space plane used by culling and containment
    queries of the bounding volumes.

    Stored as unit normal and signed distance from the origin,
    so that `plane * p` = normal·p - distance is the signed
    distance of point p. Positive side is the "inside" side.

    @date: Nov, 2025
    @author: bartu
*/

use std::ops::Mul;

use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Plane {
    pub normal: Vector3,
    pub distance: Float,
}

impl Plane {

    /// Plane with given normal passing through `point`.
    /// WARNING: Assumes normal is unit length, signed distances are scaled otherwise.
    pub fn new(normal: Vector3, point: Vector3) -> Self {
        Self {
            normal,
            distance: normal.dot(point),
        }
    }

    pub fn from_distance(normal: Vector3, distance: Float) -> Self {
        Self { normal, distance }
    }

    #[inline]
    pub fn signed_distance(&self, p: Vector3) -> Float {
        self.normal.dot(p) - self.distance
    }

    /// Extract the six planes [left, right, bottom, top, near, far] of the view volume
    /// of a combined view-projection matrix (Gribb-Hartmann). Normals point into the volume.
    /// Depth range is expected to be [0, 1] as produced by `perspective_rh` and friends.
    pub fn frustum_from_view_proj(view_proj: &Matrix4) -> [Plane; 6] {
        let r0 = view_proj.row(0);
        let r1 = view_proj.row(1);
        let r2 = view_proj.row(2);
        let r3 = view_proj.row(3);

        [r3 + r0, r3 - r0, r3 + r1, r3 - r1, r2, r3 - r2].map(|v: Vector4| {
            let n = v.truncate();
            let len = n.length();
            if approx_zero(len) {
                warn!("Degenerate frustum plane {:?} in view projection matrix", v);
                return Plane::from_distance(n, -v.w);
            }
            // n·p + w >= 0 inside, i.e. distance = -w
            Plane::from_distance(n / len, -v.w / len)
        })
    }
}

impl Mul<Vector3> for Plane {
    type Output = Float;

    fn mul(self, p: Vector3) -> Float {
        self.signed_distance(p)
    }
}

impl Mul<Vector3> for &Plane {
    type Output = Float;

    fn mul(self, p: Vector3) -> Float {
        self.signed_distance(p)
    }
}
