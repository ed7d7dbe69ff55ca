/*

    Oriented Bounding Box.

    Box is described by its center, three orthonormal axes
    (right handed) and the half extents along those axes.
    Boxes are produced by the fitter (see fitter.rs) from
    a vertex set or by merging two boxes.

    @author: bartu
    @date: 12 Nov, 2025
*/

use std::ops::Add;

use crate::prelude::*;
use crate::aabb::{AxisAlignedBox, BBoxable};
use crate::fitter::{self, FitResult, FitSettings};
use crate::plane::Plane;

/// Default debug display color of oriented boxes (red)
pub const OBB_DEBUG_COLOR: Vector3 = Vector3::new(1.0, 0.0, 0.0);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrientedBox {
    pub center: Vector3,
    pub half_extents: Vector3,
    pub axes: [Vector3; 3],
    /// Only used for debug drawing, not part of the geometry
    pub color: Vector3,
}

impl Default for OrientedBox {
    fn default() -> Self {
        Self::new(Vector3::ZERO, Vector3::ZERO, WORLD_AXES)
    }
}

impl OrientedBox {

    pub fn new(center: Vector3, half_extents: Vector3, axes: [Vector3; 3]) -> Self {
        debug_assert!(axes.iter().all(|a| a.is_normalized()));
        Self {
            center,
            half_extents,
            axes,
            color: OBB_DEBUG_COLOR,
        }
    }

    pub fn with_color(mut self, color: Vector3) -> Self {
        self.color = color;
        self
    }

    /// Fit a box around the points with default settings.
    /// Check `is_valid` of the result before using the box.
    pub fn fit(points: &[Vector3]) -> FitResult {
        fitter::fit_points(points, &FitSettings::default())
    }

    /// Merge two boxes by re-fitting their 16 corners.
    /// WARNING: Both boxes are assumed to be expressed in the same object space
    /// (same origin convention), this is not checked.
    pub fn merge(a: &Self, b: &Self) -> Self {
        let mut corners = Vec::with_capacity(16);
        corners.extend_from_slice(&a.corners());
        corners.extend_from_slice(&b.corners());

        let fit = Self::fit(&corners);
        if !fit.is_valid {
            warn!("Merged oriented box failed validation, caller should fall back to the union of AABBs");
        }
        fit.obb.with_color(a.color)
    }

    /// Corners as center ± axes[0]*hx ± axes[1]*hy ± axes[2]*hz, x sign changing fastest
    pub fn corners(&self) -> [Vector3; 8] {
        let [ax, ay, az] = self.axes;
        let h = self.half_extents;
        std::array::from_fn(|i| {
            let sx = if i & 1 == 0 { -1.0 } else { 1.0 };
            let sy = if i & 2 == 0 { -1.0 } else { 1.0 };
            let sz = if i & 4 == 0 { -1.0 } else { 1.0 };
            self.center + ax * (sx * h.x) + ay * (sy * h.y) + az * (sz * h.z)
        })
    }

    /// Radius of the bounding sphere around the center
    pub fn radius(&self) -> Float {
        0.5 * (self.half_extents * 2.0).length()
    }

    /// Surface area of the box
    pub fn area(&self) -> Float {
        let s = self.half_extents * 2.0;
        2.0 * (s.x * s.y + s.y * s.z + s.z * s.x)
    }

    /// Half width of the box projected onto `normal`
    pub fn box_radius(&self, normal: Vector3) -> Float {
        let h = self.half_extents;
        normal.dot(self.axes[0] * h.x).abs()
            + normal.dot(self.axes[1] * h.y).abs()
            + normal.dot(self.axes[2] * h.z).abs()
    }

    /// Six face planes with normals pointing into the box, half extents scaled by (1 + margin).
    /// Order: [+axes[0], -axes[0], +axes[1], -axes[1], +axes[2], -axes[2]]
    pub fn planes(&self, margin: Float) -> [Plane; 6] {
        let h = self.half_extents * (1.0 + margin);
        std::array::from_fn(|i| {
            let axis = self.axes[i / 2];
            if i % 2 == 0 {
                Plane::new(axis, self.center - axis * h[i / 2])
            } else {
                Plane::new(-axis, self.center + axis * h[i / 2])
            }
        })
    }

    pub fn contains_point(&self, p: Vector3, epsilon: Float) -> bool {
        self.planes(0.0).iter().all(|plane| plane * p >= -epsilon)
    }

    /// See AxisAlignedBox::included, same test with the oriented projection radius
    pub fn included(&self, planes: &[Plane]) -> bool {
        planes
            .iter()
            .all(|plane| plane * self.center - self.box_radius(plane.normal) >= 0.0)
    }

    /// See AxisAlignedBox::visible
    pub fn visible(&self, planes: &[Plane]) -> bool {
        !planes
            .iter()
            .any(|plane| plane * self.center + self.box_radius(plane.normal) < 0.0)
    }
}

impl Add for OrientedBox {
    type Output = OrientedBox;

    fn add(self, rhs: Self) -> Self::Output {
        OrientedBox::merge(&self, &rhs)
    }
}

impl BBoxable for OrientedBox {
    fn get_bbox(&self) -> AxisAlignedBox {
        let h = self.half_extents;
        // Per world axis: sum of |axis_i component| * h_i
        let half = Vector3::new(
            self.axes[0].x.abs() * h.x + self.axes[1].x.abs() * h.y + self.axes[2].x.abs() * h.z,
            self.axes[0].y.abs() * h.x + self.axes[1].y.abs() * h.y + self.axes[2].y.abs() * h.z,
            self.axes[0].z.abs() * h.x + self.axes[1].z.abs() * h.y + self.axes[2].z.abs() * h.z,
        );
        AxisAlignedBox::new(self.center - half, self.center + half).with_color(self.color)
    }
}


// ====================================================================================================
// Bounding volume with fallback
// ====================================================================================================

/// Volume handed to culling and collision consumers: the fitted oriented box
/// when it passed validation, the axis aligned box otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum BoundingVolume {
    Oriented(OrientedBox),
    AxisAligned(AxisAlignedBox),
}

impl BoundingVolume {
    pub fn from_fit(fit: &FitResult, fallback: AxisAlignedBox) -> Self {
        if fit.is_valid {
            BoundingVolume::Oriented(fit.obb)
        } else {
            BoundingVolume::AxisAligned(fallback)
        }
    }

    pub fn is_oriented(&self) -> bool {
        matches!(self, BoundingVolume::Oriented(_))
    }

    pub fn area(&self) -> Float {
        match self {
            BoundingVolume::Oriented(obb) => obb.area(),
            BoundingVolume::AxisAligned(aabb) => aabb.area(),
        }
    }

    pub fn visible(&self, planes: &[Plane]) -> bool {
        match self {
            BoundingVolume::Oriented(obb) => obb.visible(planes),
            BoundingVolume::AxisAligned(aabb) => aabb.visible(planes),
        }
    }

    pub fn included(&self, planes: &[Plane]) -> bool {
        match self {
            BoundingVolume::Oriented(obb) => obb.included(planes),
            BoundingVolume::AxisAligned(aabb) => aabb.included(planes),
        }
    }
}

impl BBoxable for BoundingVolume {
    fn get_bbox(&self) -> AxisAlignedBox {
        match self {
            BoundingVolume::Oriented(obb) => obb.get_bbox(),
            BoundingVolume::AxisAligned(aabb) => *aabb,
        }
    }
}
