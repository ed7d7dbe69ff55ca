/*

    Axis Aligned Bounding Box and its plane / view volume tests.

    Box is stored as lower and upper corners. Queries assume
    lower <= upper component-wise, call normalized() first if
    the corners come from unordered input.

    @author: bartu
    @date: 9 Nov, 2025
*/

use std::ops::Add;

use crate::prelude::*;
use crate::interval::Interval;
use crate::plane::Plane;

/// Default debug display color of axis aligned boxes (green)
pub const AABB_DEBUG_COLOR: Vector3 = Vector3::new(0.0, 1.0, 0.0);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisAlignedBox {
    pub lower: Vector3,
    pub upper: Vector3,
    /// Only used for debug drawing, not part of the geometry
    pub color: Vector3,
}

impl AxisAlignedBox {

    pub fn new(lower: Vector3, upper: Vector3) -> Self {
        Self {
            lower,
            upper,
            color: AABB_DEBUG_COLOR,
        }
    }

    pub fn with_color(mut self, color: Vector3) -> Self {
        self.color = color;
        self
    }

    /// Same box with corners ordered component-wise
    pub fn normalized(&self) -> Self {
        let [x, y, z] = [0, 1, 2].map(|i| Interval::ordered(self.lower[i], self.upper[i]));
        Self {
            lower: Vector3::new(x.min, y.min, z.min),
            upper: Vector3::new(x.max, y.max, z.max),
            color: self.color,
        }
    }

    /// Tight box around the points, None if there are no points
    pub fn from_points(points: &[Vector3]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let (lower, upper) = rest
            .iter()
            .fold((*first, *first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
        Some(Self::new(lower, upper))
    }

    /// Smallest box containing both boxes
    pub fn union(a: &Self, b: &Self) -> Self {
        Self {
            lower: a.lower.min(b.lower),
            upper: a.upper.max(b.upper),
            color: a.color,
        }
    }

    /// Box around the transformed corners, e.g. to move a mesh space box into world space
    pub fn transformed(&self, mat: &Matrix4) -> Self {
        let corners = self.corners().map(|c| transform_point(mat, &c));
        let mut out = Self::new(corners[0], corners[0]).with_color(self.color);
        for c in &corners[1..] {
            out.lower = out.lower.min(*c);
            out.upper = out.upper.max(*c);
        }
        out
    }

    #[inline]
    pub fn center(&self) -> Vector3 {
        (self.lower + self.upper) * 0.5
    }

    #[inline]
    pub fn size(&self) -> Vector3 {
        self.upper - self.lower
    }

    #[inline]
    pub fn half_size(&self) -> Vector3 {
        self.size() * 0.5
    }

    pub fn area(&self) -> Float {
        let s = self.size();
        2.0 * (s.x * s.y + s.y * s.z + s.z * s.x)
    }

    pub fn corners(&self) -> [Vector3; 8] {
        let (lo, hi) = (self.lower, self.upper);
        [
            Vector3::new(lo.x, lo.y, lo.z),
            Vector3::new(hi.x, lo.y, lo.z),
            Vector3::new(lo.x, hi.y, lo.z),
            Vector3::new(hi.x, hi.y, lo.z),
            Vector3::new(lo.x, lo.y, hi.z),
            Vector3::new(hi.x, lo.y, hi.z),
            Vector3::new(lo.x, hi.y, hi.z),
            Vector3::new(hi.x, hi.y, hi.z),
        ]
    }

    pub fn contains_point(&self, p: Vector3) -> bool {
        (0..3).all(|i| Interval::new(self.lower[i], self.upper[i]).contains(p[i]))
    }

    /// Half width of the box projected onto `normal`
    #[inline]
    pub fn box_radius(&self, normal: Vector3) -> Float {
        let h = self.half_size();
        // |n·(X*hx)| + |n·(Y*hy)| + |n·(Z*hz)| with world axes
        normal.x.abs() * h.x + normal.y.abs() * h.y + normal.z.abs() * h.z
    }

    /// True iff the whole box is on the positive side of every plane.
    /// Empty plane set means nothing to cull against, so the box is included.
    pub fn included(&self, planes: &[Plane]) -> bool {
        let center = self.center();
        planes
            .iter()
            .all(|plane| plane * center - self.box_radius(plane.normal) >= 0.0)
    }

    /// False only if the box is entirely on the negative side of some plane.
    /// Box may still be partially outside other planes when true.
    pub fn visible(&self, planes: &[Plane]) -> bool {
        let center = self.center();
        for plane in planes {
            if plane * center + self.box_radius(plane.normal) < 0.0 {
                return false;
            }
        }
        true
    }

    /// Approximate box-box collision: is self not separated by any of other's face planes.
    /// WARNING: This is one sided, not a full overlap test. Kept this way on purpose.
    pub fn collision_test(&self, other: &Self) -> bool {
        self.visible(&other.planes())
    }

    /// Six face planes [+X, -X, +Y, -Y, +Z, -Z] with normals pointing into the box,
    /// so the box interior is on the positive side of all of them.
    pub fn planes(&self) -> [Plane; 6] {
        [
            Plane::new(Vector3::X, self.lower),
            Plane::new(Vector3::NEG_X, self.upper),
            Plane::new(Vector3::Y, self.lower),
            Plane::new(Vector3::NEG_Y, self.upper),
            Plane::new(Vector3::Z, self.lower),
            Plane::new(Vector3::NEG_Z, self.upper),
        ]
    }
}

impl Add for AxisAlignedBox {
    type Output = AxisAlignedBox;

    fn add(self, rhs: Self) -> Self::Output {
        AxisAlignedBox::union(&self, &rhs)
    }
}

/// Anything that can report an axis aligned box around itself
pub trait BBoxable {
    fn get_bbox(&self) -> AxisAlignedBox;
}


#[cfg(test)]
mod tests {
    use super::*;

    fn cube(lo: Float, hi: Float) -> AxisAlignedBox {
        AxisAlignedBox::new(Vector3::splat(lo), Vector3::splat(hi))
    }

    #[test]
    fn derived_quantities() {
        let b = AxisAlignedBox::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(2.0, 4.0, 6.0));
        assert_eq!(b.center(), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(b.size(), Vector3::new(2.0, 4.0, 6.0));
        assert_eq!(b.half_size(), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(b.area(), 2.0 * (8.0 + 24.0 + 12.0));
        assert_eq!(b.box_radius(Vector3::new(0.0, -1.0, 0.0)), 2.0);
    }

    #[test]
    fn union_identity_and_containment() {
        let a = AxisAlignedBox::new(Vector3::new(-1.0, 0.0, 2.0), Vector3::new(1.0, 3.0, 4.0));
        let b = AxisAlignedBox::new(Vector3::new(0.5, -2.0, 3.0), Vector3::new(5.0, 1.0, 3.5));
        assert_eq!(AxisAlignedBox::union(&a, &a), a);

        let u = a + b;
        assert_eq!(u.lower, Vector3::new(-1.0, -2.0, 2.0));
        assert_eq!(u.upper, Vector3::new(5.0, 3.0, 4.0));
        for c in a.corners().iter().chain(b.corners().iter()) {
            assert!(u.contains_point(*c));
        }
    }

    #[test]
    fn normalized_and_from_points() {
        let b = AxisAlignedBox::new(Vector3::new(2.0, -1.0, 5.0), Vector3::new(0.0, 1.0, 3.0)).normalized();
        assert_eq!(b.lower, Vector3::new(0.0, -1.0, 3.0));
        assert_eq!(b.upper, Vector3::new(2.0, 1.0, 5.0));

        let pts = [Vector3::new(1.0, 2.0, 3.0), Vector3::new(-1.0, 5.0, 0.0), Vector3::new(0.0, 0.0, 9.0)];
        let b = AxisAlignedBox::from_points(&pts).unwrap();
        assert_eq!(b.lower, Vector3::new(-1.0, 0.0, 0.0));
        assert_eq!(b.upper, Vector3::new(1.0, 5.0, 9.0));
        assert!(AxisAlignedBox::from_points(&[]).is_none());
    }

    #[test]
    fn empty_plane_set_includes_and_shows_everything() {
        let b = cube(-3.0, 7.0);
        assert!(b.included(&[]));
        assert!(b.visible(&[]));
    }

    #[test]
    fn box_behind_plane_is_not_visible() {
        let b = cube(0.0, 2.0);
        let planes = [Plane::new(Vector3::X, Vector3::new(3.0, 0.0, 0.0))];
        assert!(!b.visible(&planes));
        assert!(!b.included(&planes));
    }

    #[test]
    fn straddling_box_is_visible_but_not_included() {
        let b = cube(0.0, 2.0);
        let planes = [Plane::new(Vector3::X, Vector3::new(1.0, 0.0, 0.0))];
        assert!(b.visible(&planes));
        assert!(!b.included(&planes));

        let planes = [Plane::new(Vector3::X, Vector3::new(-1.0, 0.0, 0.0))];
        assert!(b.visible(&planes));
        assert!(b.included(&planes));
    }

    #[test]
    fn included_implies_visible() {
        let planes = [
            Plane::new(Vector3::new(1.0, 1.0, 0.0).normalize(), Vector3::new(-2.0, 0.0, 0.0)),
            Plane::new(Vector3::NEG_Z, Vector3::new(0.0, 0.0, 4.0)),
            Plane::new(Vector3::Y, Vector3::new(0.0, -5.0, 0.0)),
        ];
        for i in 0..40 {
            let lo = Vector3::new(i as Float * 0.3 - 6.0, (i % 7) as Float - 3.0, (i % 5) as Float - 1.0);
            let b = AxisAlignedBox::new(lo, lo + Vector3::new(1.0, 0.5, 2.0));
            if b.included(&planes) {
                assert!(b.visible(&planes), "{:?}", b);
            }
        }
    }

    #[test]
    fn planes_face_inwards() {
        let b = AxisAlignedBox::new(Vector3::new(-1.0, 0.0, 1.0), Vector3::new(1.0, 2.0, 5.0));
        let center = b.center();
        for plane in b.planes().iter() {
            assert!(plane * center > 0.0);
        }
        assert!(b.included(&b.planes()));
    }

    #[test]
    fn collision_test_against_face_planes() {
        let a = cube(0.0, 2.0);
        assert!(a.collision_test(&cube(1.0, 3.0)));
        assert!(a.collision_test(&cube(0.5, 1.0)));
        assert!(!a.collision_test(&cube(5.0, 6.0)));

        // Sharing a face counts as touching
        assert!(a.collision_test(&cube(2.0, 4.0)));
        let b = AxisAlignedBox::new(Vector3::new(2.5, 2.5, 0.0), Vector3::new(4.0, 4.0, 2.0));
        assert!(!a.collision_test(&b));
    }

    #[test]
    fn transformed_by_translation() {
        let b = cube(-1.0, 1.0).transformed(&Matrix4::from_translation(Vector3::new(3.0, 0.0, 0.0)));
        assert!(approx_eq(b.lower, Vector3::new(2.0, -1.0, -1.0), 1e-12));
        assert!(approx_eq(b.upper, Vector3::new(4.0, 1.0, 1.0), 1e-12));
    }
}
