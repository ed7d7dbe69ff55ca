/*

    Approximate minimum volume Oriented Bounding Box fitting.

    The search is a bounded heuristic over small direction sets,
    NOT an exhaustive search:
        1. Diameter of the point set approximated over 13 fixed directions -> a, b
        2. 9 primary axis candidates built from a, b, the farthest point c from
           line ab and the two extreme points e, f off the plane through a, b, c
        3. For every primary axis s, diameter in the plane perpendicular to s
           approximated over 4 directions
        4. 5 secondary axis candidates in that plane
        5. Every (primary, secondary) pair is scored by hx*hy + hy*hz + hz*hx,
           smallest positive score wins, first seen wins ties
        6-7. Box is built from the winner and validated against the input points

    Direction counts and constructions are part of the expected output,
    changing them changes fitted boxes.

    @author: bartu
    @date: 12 Nov, 2025
*/

use rayon::prelude::*;

use crate::prelude::*;
use crate::interval::Interval;
use crate::json_parser::deser_float;
use crate::obb::OrientedBox;

/// Secondary candidates almost parallel to the primary axis are skipped,
/// compared as squared length ratio of the in-plane part to the whole vector
const PARALLEL_EPSILON: Float = 1e-12;

/// Axis, face diagonal and body diagonal directions of a cube, reduced by symmetry
pub const DIAMETER_DIRECTIONS: [Vector3; 13] = [
    Vector3::new(1.0, 0.0, 0.0),
    Vector3::new(0.0, 1.0, 0.0),
    Vector3::new(0.0, 0.0, 1.0),
    Vector3::new(1.0, 1.0, 0.0),
    Vector3::new(1.0, -1.0, 0.0),
    Vector3::new(1.0, 0.0, 1.0),
    Vector3::new(1.0, 0.0, -1.0),
    Vector3::new(0.0, 1.0, 1.0),
    Vector3::new(0.0, 1.0, -1.0),
    Vector3::new(1.0, 1.0, 1.0),
    Vector3::new(1.0, -1.0, 1.0),
    Vector3::new(1.0, 1.0, -1.0),
    Vector3::new(1.0, -1.0, -1.0),
];

#[derive(Debug, Clone, Copy, Deserialize, Serialize, SmartDefault)]
#[serde(default)]
pub struct FitSettings {
    /// Relative growth of the half extents before validation
    #[default = 0.01]
    #[serde(rename = "FitMargin", deserialize_with = "deser_float")]
    pub margin: Float,

    /// Allowed negative signed distance of an input point during validation
    #[default = 0.001]
    #[serde(rename = "FitEpsilon", deserialize_with = "deser_float")]
    pub epsilon: Float,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitResult {
    pub obb: OrientedBox,
    /// False if some input point is outside of the box (within margin and epsilon).
    /// Callers are expected to fall back to another volume, e.g. the AABB.
    pub is_valid: bool,
}

impl FitResult {
    /// (center, half extents, axes, is_valid)
    pub fn into_parts(self) -> (Vector3, Vector3, [Vector3; 3], bool) {
        (self.obb.center, self.obb.half_extents, self.obb.axes, self.is_valid)
    }
}


// ====================================================================================================
// Direction search helpers
// ====================================================================================================

/// Indices of the points with minimal and maximal key, first seen wins on ties
fn extremal_pair<F>(points: &[Vector3], key: F) -> (usize, usize)
where
    F: Fn(Vector3) -> Float,
{
    let mut imin = 0;
    let mut imax = 0;
    let mut kmin = key(points[0]);
    let mut kmax = kmin;
    for (i, p) in points.iter().enumerate().skip(1) {
        let k = key(*p);
        if k < kmin {
            kmin = k;
            imin = i;
        }
        if k > kmax {
            kmax = k;
            imax = i;
        }
    }
    (imin, imax)
}

/// Among extremal pairs along `directions`, the one maximizing `measure(p_max - p_min)`
fn diameter_pair<F>(points: &[Vector3], directions: &[Vector3], measure: F) -> (usize, usize)
where
    F: Fn(Vector3) -> Float,
{
    let mut best: Option<(usize, usize)> = None;
    let mut best_measure = Float::NEG_INFINITY;
    for dir in directions {
        let (lo, hi) = extremal_pair(points, |p| p.dot(*dir));
        let m = measure(points[hi] - points[lo]);
        if best.is_none() {
            best = Some((lo, hi));
        }
        if m > best_measure {
            best_measure = m;
            best = Some((lo, hi));
        }
    }
    best.unwrap_or((0, 0))
}

/// Component of v perpendicular to the unit vector s
#[inline]
fn reject(v: Vector3, s: Vector3) -> Vector3 {
    v - s * v.dot(s)
}

/// Index of the point farthest from the line through `a` with direction `dir`
fn farthest_from_line(points: &[Vector3], a: Vector3, dir: Vector3) -> usize {
    let mut best = 0;
    let mut best_dist = Float::NEG_INFINITY;
    for (i, p) in points.iter().enumerate() {
        // |(p - a) x dir|^2 is the squared distance scaled by |dir|^2
        let d = (*p - a).cross(dir).length_squared();
        if d > best_dist {
            best_dist = d;
            best = i;
        }
    }
    best
}

/// Two unit vectors x, y such that (x, y, s) is orthonormal.
/// Crosses s with the world axis along which s has the smallest component (X, then Y, then Z on ties).
fn perpendicular_pair(s: Vector3) -> (Vector3, Vector3) {
    let a = s.abs();
    let w = if a.x <= a.y && a.x <= a.z {
        Vector3::X
    } else if a.y <= a.z {
        Vector3::Y
    } else {
        Vector3::Z
    };
    let x = s.cross(w).normalize();
    let y = s.cross(x);
    (x, y)
}

/// Candidates for the primary axis: {d0, c-a, c-b, e-a, e-b, e-c, f-a, f-b, f-c}
fn primary_candidates(points: &[Vector3]) -> [Vector3; 9] {
    let (ia, ib) = diameter_pair(points, &DIAMETER_DIRECTIONS, |v| v.length_squared());
    let (a, b) = (points[ia], points[ib]);
    let d0 = b - a;

    let c = points[farthest_from_line(points, a, d0)];

    // Extremes off the plane through a with normal d0 x (c - a)
    let n = d0.cross(c - a);
    let (ie, i_f) = extremal_pair(points, |p| (p - a).dot(n));
    let (e, f) = (points[ie], points[i_f]);

    [d0, c - a, c - b, e - a, e - b, e - c, f - a, f - b, f - c]
}

/// Candidates for the secondary axis in the plane perpendicular to the unit primary axis `s`:
/// {d1, e-a, e-b, f-a, f-b} where a, b is the in-plane diameter pair and e, f are the
/// extreme points on either side of the line ab within the plane.
/// Returned unprojected, the caller removes the component along `s`.
fn secondary_candidates(points: &[Vector3], s: Vector3) -> [Vector3; 5] {
    let (x, y) = perpendicular_pair(s);
    let directions = [x, y, x + y, x - y];
    let (ia, ib) = diameter_pair(points, &directions, |v| reject(v, s).length_squared());
    let (a, b) = (points[ia], points[ib]);
    let d1 = reject(b - a, s);

    let n = s.cross(d1);
    let (ie, i_f) = extremal_pair(points, |p| (p - a).dot(n));
    let (e, f) = (points[ie], points[i_f]);

    [b - a, e - a, e - b, f - a, f - b]
}

fn extents_along(points: &[Vector3], axes: &[Vector3; 3]) -> [Interval; 3] {
    axes.map(|axis| Interval::from_values(points.iter().map(|p| p.dot(axis))))
}

/// Box from axes and tight extents along them
fn box_from_extents(axes: [Vector3; 3], extents: &[Interval; 3]) -> OrientedBox {
    let center = axes[0] * extents[0].center() + axes[1] * extents[1].center() + axes[2] * extents[2].center();
    let half_extents = Vector3::new(extents[0].size(), extents[1].size(), extents[2].size()) * 0.5;
    OrientedBox::new(center, half_extents, axes)
}


// ====================================================================================================
// Fitting
// ====================================================================================================

/// Fit an approximate minimum surface area oriented box around the points.
///
/// Never fails: empty input gives a zero box at the origin flagged invalid, and
/// collinear or coincident input falls back to world axes with tight extents.
/// Identical input (same order) gives bit-identical output.
pub fn fit_points(points: &[Vector3], settings: &FitSettings) -> FitResult {
    if points.is_empty() {
        warn!("Cannot fit an oriented box around an empty point set");
        return FitResult { obb: OrientedBox::default(), is_valid: false };
    }

    let mut best: Option<([Vector3; 3], [Interval; 3])> = None;
    let mut best_cost = Float::INFINITY;
    let mut best_indices = (0, 0);

    for (i, primary) in primary_candidates(points).iter().enumerate() {
        let Some(s) = primary.try_normalize() else {
            continue; // coincident points
        };

        for (j, secondary) in secondary_candidates(points, s).iter().enumerate() {
            let in_plane = reject(*secondary, s);
            if in_plane.length_squared() <= PARALLEL_EPSILON * secondary.length_squared() {
                continue;
            }
            let t = in_plane.normalize();
            let axes = [s, t, s.cross(t)];

            let extents = extents_along(points, &axes);
            let [hx, hy, hz] = extents.map(|e| e.size() * 0.5);
            let cost = hx * hy + hy * hz + hz * hx;

            // NaN never passes
            if cost > 0.0 && cost < best_cost {
                best_cost = cost;
                best = Some((axes, extents));
                best_indices = (i, j);
            }
        }
    }

    let obb = match best {
        Some((axes, extents)) => {
            debug!(
                "OBB fit over {} points: primary candidate {}, secondary candidate {}, cost {}",
                points.len(), best_indices.0, best_indices.1, best_cost
            );
            box_from_extents(axes, &extents)
        }
        None => {
            debug!("No candidate axes with positive cost for {} points, using world axes", points.len());
            box_from_extents(WORLD_AXES, &extents_along(points, &WORLD_AXES))
        }
    };

    let is_valid = validate(&obb, points, settings);
    if !is_valid {
        warn!("Fitted oriented box does not enclose all {} points", points.len());
    }
    FitResult { obb, is_valid }
}

/// True iff every point is on the inner side (within epsilon) of all six
/// planes of the box grown by the settings margin.
pub fn validate(obb: &OrientedBox, points: &[Vector3], settings: &FitSettings) -> bool {
    let planes = obb.planes(settings.margin);
    points
        .iter()
        .all(|p| planes.iter().all(|plane| plane * *p >= -settings.epsilon))
}

/// Fit independent point sets in parallel. Output order follows input order.
pub fn fit_many<P>(point_sets: &[P], settings: &FitSettings) -> Vec<FitResult>
where
    P: AsRef<[Vector3]> + Sync,
{
    point_sets
        .par_iter()
        .map(|points| fit_points(points.as_ref(), settings))
        .collect()
}


#[cfg(test)]
mod tests {
    use super::*;
    use bevy_math::DMat3;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn unit_cube_corners() -> Vec<Vector3> {
        let mut pts = Vec::new();
        for x in [-0.5, 0.5] {
            for y in [-0.5, 0.5] {
                for z in [-0.5, 0.5] {
                    pts.push(Vector3::new(x, y, z));
                }
            }
        }
        pts
    }

    /// Points inside a box of given half extents, rotated and translated
    fn random_box_cloud(seed: u64, n: usize, half: Vector3, rot: DMat3, offset: Vector3) -> Vec<Vector3> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| {
                let local = Vector3::new(
                    rng.random_range(-half.x..half.x),
                    rng.random_range(-half.y..half.y),
                    rng.random_range(-half.z..half.z),
                );
                rot * local + offset
            })
            .collect()
    }

    fn sorted(v: Vector3) -> [Float; 3] {
        let mut a = v.to_array();
        a.sort_by(|x, y| x.partial_cmp(y).unwrap());
        a
    }

    fn is_world_axis(v: Vector3) -> bool {
        let a = v.abs();
        approx_zero(a.max_element() - 1.0) && approx_zero(a.min_element()) && approx_zero(a.element_sum() - 1.0)
    }

    #[test]
    fn unit_cube_fits_itself() {
        let (center, half, axes, is_valid) = OrientedBox::fit(&unit_cube_corners()).into_parts();
        assert!(is_valid);
        assert!(approx_eq(center, Vector3::ZERO, 1e-9));
        assert!(approx_eq(half, Vector3::splat(0.5), 1e-9));
        for axis in axes.iter() {
            assert!(is_world_axis(*axis), "{:?}", axis);
        }
    }

    #[test]
    fn axes_are_orthonormal_and_right_handed() {
        let rot = DMat3::from_axis_angle(Vector3::new(0.3, 1.0, -0.4).normalize(), 1.1);
        let pts = random_box_cloud(3, 200, Vector3::new(3.0, 1.0, 0.5), rot, Vector3::new(4.0, -1.0, 2.0));
        let fit = fit_points(&pts, &FitSettings::default());
        let [a, b, c] = fit.obb.axes;
        assert!(approx_zero(a.dot(b)) && approx_zero(b.dot(c)) && approx_zero(c.dot(a)));
        for axis in fit.obb.axes.iter() {
            assert!(approx_zero(axis.length() - 1.0));
        }
        assert!(approx_eq(a.cross(b), c, 1e-9));
        assert!(fit.obb.half_extents.min_element() >= 0.0);
    }

    #[test]
    fn rotated_cuboid_corners_are_recovered() {
        let rot = DMat3::from_rotation_z(0.5);
        let half = Vector3::new(2.0, 1.0, 0.5);
        let truth = OrientedBox::new(Vector3::ZERO, half, [rot.x_axis, rot.y_axis, rot.z_axis]);
        let fit = OrientedBox::fit(&truth.corners());

        assert!(fit.is_valid);
        assert!(approx_eq(fit.obb.center, Vector3::ZERO, 1e-9));
        let got = sorted(fit.obb.half_extents);
        assert!(approx_zero(got[0] - 0.5) && approx_zero(got[1] - 1.0) && approx_zero(got[2] - 2.0));
        assert!(approx_zero(fit.obb.area() - truth.area()));
    }

    #[test]
    fn fitted_box_contains_every_input_point() {
        for seed in 0..8 {
            let rot = DMat3::from_rotation_x(0.2 * seed as Float) * DMat3::from_rotation_y(0.7) * DMat3::from_rotation_z(-0.3);
            let pts = random_box_cloud(seed, 120, Vector3::new(2.0, 0.7, 1.3), rot, Vector3::splat(seed as Float));
            let settings = FitSettings::default();
            let fit = fit_points(&pts, &settings);
            assert!(fit.is_valid, "seed {}", seed);
            // Re-run post hoc
            assert!(validate(&fit.obb, &pts, &settings));
            for p in pts.iter() {
                assert!(fit.obb.contains_point(*p, 1e-9));
            }
        }
    }

    #[test]
    fn fitted_box_is_not_worse_than_aabb_for_rotated_cloud() {
        let rot = DMat3::from_axis_angle(Vector3::ONE.normalize(), 0.8);
        let pts = random_box_cloud(11, 400, Vector3::new(4.0, 1.0, 0.25), rot, Vector3::ZERO);
        let fit = OrientedBox::fit(&pts);
        let aabb = crate::aabb::AxisAlignedBox::from_points(&pts).unwrap();
        assert!(fit.is_valid);
        assert!(fit.obb.area() < aabb.area());
    }

    #[test]
    fn scale_invariance() {
        let rot = DMat3::from_rotation_y(0.4) * DMat3::from_rotation_x(-0.9);
        let pts = random_box_cloud(5, 150, Vector3::new(3.0, 1.0, 0.5), rot, Vector3::new(1.0, 2.0, 3.0));
        let k = 2.0;
        let scaled: Vec<Vector3> = pts.iter().map(|p| *p * k).collect();

        let a = OrientedBox::fit(&pts);
        let b = OrientedBox::fit(&scaled);
        assert!(a.is_valid && b.is_valid);
        assert!(approx_eq(b.obb.half_extents, a.obb.half_extents * k, 1e-9));
        assert!(approx_eq(b.obb.center, a.obb.center * k, 1e-9));
        for (x, y) in a.obb.axes.iter().zip(b.obb.axes.iter()) {
            assert!(approx_zero(x.dot(*y).abs() - 1.0));
        }
    }

    #[test]
    fn determinism() {
        let pts = random_box_cloud(9, 300, Vector3::new(1.0, 2.0, 3.0), DMat3::from_rotation_x(0.3), Vector3::ZERO);
        let a = OrientedBox::fit(&pts);
        let b = OrientedBox::fit(&pts);
        assert_eq!(a.obb.center.to_array().map(Float::to_bits), b.obb.center.to_array().map(Float::to_bits));
        assert_eq!(a.obb.half_extents.to_array().map(Float::to_bits), b.obb.half_extents.to_array().map(Float::to_bits));
        for k in 0..3 {
            assert_eq!(a.obb.axes[k].to_array().map(Float::to_bits), b.obb.axes[k].to_array().map(Float::to_bits));
        }
        assert_eq!(a.is_valid, b.is_valid);
    }

    #[test]
    fn fit_many_matches_sequential_fits() {
        let sets: Vec<Vec<Vector3>> = (0..6)
            .map(|seed| random_box_cloud(seed, 64, Vector3::new(1.0, 0.5, 2.0), DMat3::from_rotation_z(seed as Float), Vector3::ZERO))
            .collect();
        let settings = FitSettings::default();
        let parallel = fit_many(&sets, &settings);
        assert_eq!(parallel.len(), sets.len());
        for (set, res) in sets.iter().zip(parallel.iter()) {
            assert_eq!(*res, fit_points(set, &settings));
        }
    }

    #[test]
    fn degenerate_inputs_do_not_panic() {
        let empty = OrientedBox::fit(&[]);
        assert!(!empty.is_valid);

        let single = OrientedBox::fit(&[Vector3::ONE]);
        assert!(single.is_valid);
        assert!(approx_eq(single.obb.center, Vector3::ONE, 1e-12));
        assert_eq!(single.obb.half_extents, Vector3::ZERO);

        let collinear = [Vector3::ZERO, Vector3::ONE, Vector3::splat(2.0)];
        let fit = OrientedBox::fit(&collinear);
        assert!(fit.is_valid);
        assert_eq!(fit.obb.axes, WORLD_AXES);
        assert!(approx_eq(fit.obb.half_extents, Vector3::ONE, 1e-12));

        let planar = [Vector3::ZERO, Vector3::X, Vector3::Y, Vector3::new(1.0, 1.0, 0.0)];
        let fit = OrientedBox::fit(&planar);
        assert!(fit.is_valid);
        assert!(approx_zero(sorted(fit.obb.half_extents)[0]));
        assert!(approx_zero(fit.obb.area() - 2.0));
    }

    #[test]
    fn validation_rejects_points_outside() {
        let obb = OrientedBox::new(Vector3::ZERO, Vector3::ONE, WORLD_AXES);
        let settings = FitSettings::default();
        assert!(validate(&obb, &[Vector3::splat(1.0), Vector3::new(1.005, 0.0, 0.0)], &settings));
        assert!(!validate(&obb, &[Vector3::new(1.02, 0.0, 0.0)], &settings));
    }

    #[test]
    fn perpendicular_pair_is_orthonormal() {
        for s in [Vector3::X, Vector3::Y, Vector3::Z, Vector3::ONE.normalize(), Vector3::new(0.2, -0.9, 0.1).normalize()] {
            let (x, y) = perpendicular_pair(s);
            assert!(approx_zero(x.dot(s)) && approx_zero(y.dot(s)) && approx_zero(x.dot(y)));
            assert!(approx_zero(x.length() - 1.0) && approx_zero(y.length() - 1.0));
        }
    }
}
