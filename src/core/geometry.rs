//! Geometry utilities for measurements and quantity extraction
//!
//! Pure functions over `nalgebra` points; no state. Coordinates are in scene
//! units (meters for IFC models).

use nalgebra::{Point3, Vector3};

use crate::entities::measurement::MeasurementKind;

pub type Point = Point3<f64>;
pub type Vector = Vector3<f64>;

/// Arms shorter than this make an angle undefined
const DEGENERATE_EPSILON: f64 = 1e-12;

/// Euclidean distance between two points
pub fn distance(p0: &Point, p1: &Point) -> f64 {
    (p1 - p0).norm()
}

/// Area of the polygon through `points`, taken as a closed loop
///
/// Newell's method: half the length of the summed cross products of
/// consecutive vertices. Exact for planar polygons and stable for
/// near-planar ones; rotating the point order does not change the result.
pub fn polygon_area(points: &[Point]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let n = points.len();
    let normal = (0..n).fold(Vector::zeros(), |acc, i| {
        let a = &points[i].coords;
        let b = &points[(i + 1) % n].coords;
        acc + a.cross(b)
    });

    normal.norm() / 2.0
}

/// Angle in degrees between `a - vertex` and `b - vertex`
///
/// Returns `None` if either arm has zero length.
pub fn angle(vertex: &Point, a: &Point, b: &Point) -> Option<f64> {
    let u = a - vertex;
    let v = b - vertex;
    let (nu, nv) = (u.norm(), v.norm());
    if nu < DEGENERATE_EPSILON || nv < DEGENERATE_EPSILON {
        return None;
    }

    // Rounding can push the cosine just outside [-1, 1]
    let cos = (u.dot(&v) / (nu * nv)).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

/// Mean of the points; the origin for an empty slice
pub fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::origin();
    }
    let sum = points
        .iter()
        .fold(Vector::zeros(), |acc, p| acc + p.coords);
    Point::from(sum / points.len() as f64)
}

/// Round each coordinate to the nearest multiple of `grid`
///
/// A non-positive or non-finite grid leaves the point unchanged.
pub fn snap_to_grid(point: &Point, grid: f64) -> Point {
    if !(grid.is_finite() && grid > 0.0) {
        return *point;
    }
    point.map(|c| (c / grid).round() * grid)
}

/// Whether `n` points are enough for `kind` to commit
pub fn validate_point_count(kind: MeasurementKind, n: usize) -> bool {
    kind.required_points().is_satisfied_by(n)
}

/// Number of points at which a session of `kind` first tries to commit
pub fn commit_threshold(kind: MeasurementKind) -> usize {
    kind.required_points().minimum()
}

/// Compute the raw value of a measurement in scene units
///
/// Angles use `points[1]` as the vertex. Returns `None` for a wrong point
/// count or degenerate geometry.
pub fn measure(kind: MeasurementKind, points: &[Point]) -> Option<f64> {
    if !validate_point_count(kind, points.len()) {
        return None;
    }

    let value = match kind {
        MeasurementKind::Distance => distance(&points[0], &points[1]),
        MeasurementKind::Area => polygon_area(points),
        MeasurementKind::Angle => angle(&points[1], &points[0], &points[2])?,
    };

    value.is_finite().then_some(value)
}

/// Format a value for display, e.g. `5.00 m` or `90.00°`
pub fn format_measurement(value: f64, kind: MeasurementKind, unit: &str, precision: usize) -> String {
    match kind {
        MeasurementKind::Angle => format!("{:.*}{}", precision, value, unit),
        MeasurementKind::Distance | MeasurementKind::Area => {
            format!("{:.*} {}", precision, value, unit)
        }
    }
}

/// Closest point to `point` on the segment `start..end`
pub fn closest_point_on_segment(point: &Point, start: &Point, end: &Point) -> Point {
    let line = end - start;
    let len_sq = line.norm_squared();
    if len_sq < DEGENERATE_EPSILON {
        return *start;
    }
    let t = ((point - start).dot(&line) / len_sq).clamp(0.0, 1.0);
    start + line * t
}

/// Closest point to `point` on the triangle `a, b, c`
///
/// Projects onto the triangle's plane when the projection falls inside,
/// otherwise takes the nearest of the three edges. Degenerate triangles are
/// treated as their edges.
pub fn closest_point_on_triangle(point: &Point, a: &Point, b: &Point, c: &Point) -> Point {
    let ab = b - a;
    let ac = c - a;
    let ap = point - a;

    let d00 = ab.dot(&ab);
    let d01 = ab.dot(&ac);
    let d11 = ac.dot(&ac);
    let denom = d00 * d11 - d01 * d01;

    if denom.abs() > DEGENERATE_EPSILON {
        let d02 = ab.dot(&ap);
        let d12 = ac.dot(&ap);
        let u = (d11 * d02 - d01 * d12) / denom;
        let v = (d00 * d12 - d01 * d02) / denom;
        if u >= 0.0 && v >= 0.0 && u + v <= 1.0 {
            return a + ab * u + ac * v;
        }
    }

    [
        closest_point_on_segment(point, a, b),
        closest_point_on_segment(point, b, c),
        closest_point_on_segment(point, c, a),
    ]
    .into_iter()
    .min_by(|x, y| distance(point, x).total_cmp(&distance(point, y)))
    .unwrap_or(*a)
}

/// Nearest vertex to `point` within `threshold`, if any
pub fn nearest_vertex(point: &Point, vertices: &[Point], threshold: f64) -> Option<Point> {
    vertices
        .iter()
        .map(|v| (v, distance(point, v)))
        .filter(|(_, d)| *d <= threshold)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(v, _)| *v)
}

/// Triangles of an indexed mesh with flat `x, y, z` vertices
///
/// Trailing indices that do not form a full triangle are ignored. Returns
/// `None` if any index points past the vertex buffer.
pub fn mesh_triangles(vertices: &[f32], indices: &[u32]) -> Option<Vec<[Point; 3]>> {
    let vertex = |i: u32| -> Option<Point> {
        let start = usize::try_from(i).ok()?.checked_mul(3)?;
        let c = vertices.get(start..start + 3)?;
        Some(Point::new(c[0] as f64, c[1] as f64, c[2] as f64))
    };

    indices
        .chunks_exact(3)
        .map(|t| Some([vertex(t[0])?, vertex(t[1])?, vertex(t[2])?]))
        .collect()
}

/// Enclosed volume of a closed triangle mesh
///
/// Sum of the signed tetrahedra spanned by each triangle and the origin;
/// the sign depends on winding, so the magnitude is returned.
pub fn mesh_volume(triangles: &[[Point; 3]]) -> f64 {
    let signed: f64 = triangles
        .iter()
        .map(|[a, b, c]| a.coords.dot(&b.coords.cross(&c.coords)) / 6.0)
        .sum();
    signed.abs()
}

/// Total area of all triangles in a mesh
pub fn mesh_surface_area(triangles: &[[Point; 3]]) -> f64 {
    triangles
        .iter()
        .map(|[a, b, c]| (b - a).cross(&(c - a)).norm() / 2.0)
        .sum()
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    /// Bounds of a flat `x, y, z` vertex buffer
    ///
    /// Trailing values that do not form a full triple are ignored; an
    /// empty buffer has no bounds.
    pub fn from_flat_vertices(vertices: &[f32]) -> Option<Self> {
        let mut chunks = vertices.chunks_exact(3);
        let first = chunks.next()?;
        let start = Point::new(first[0] as f64, first[1] as f64, first[2] as f64);

        let bbox = chunks.fold(
            BoundingBox {
                min: start,
                max: start,
            },
            |mut bb, c| {
                let p = Point::new(c[0] as f64, c[1] as f64, c[2] as f64);
                bb.min = bb.min.inf(&p);
                bb.max = bb.max.sup(&p);
                bb
            },
        );
        Some(bbox)
    }

    pub fn size(&self) -> Vector {
        self.max - self.min
    }

    pub fn volume(&self) -> f64 {
        let s = self.size();
        s.x * s.y * s.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point {
        Point::new(x, y, z)
    }

    #[test]
    fn test_distance_3_4_5() {
        assert_relative_eq!(distance(&p(0.0, 0.0, 0.0), &p(3.0, 4.0, 0.0)), 5.0);
    }

    #[test]
    fn test_unit_square_area() {
        let square = [
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(0.0, 1.0, 0.0),
        ];
        assert_relative_eq!(polygon_area(&square), 1.0);

        // cyclic rotation
        let mut rotated = square.to_vec();
        for _ in 0..4 {
            rotated.rotate_left(1);
            assert_relative_eq!(polygon_area(&rotated), 1.0);
        }
    }

    #[test]
    fn test_area_changes_when_shape_changes() {
        // Swapping two vertices turns the square into a bow-tie
        let bowtie = [
            p(0.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(0.0, 1.0, 0.0),
        ];
        assert!((polygon_area(&bowtie) - 1.0).abs() > 0.1);
    }

    #[test]
    fn test_area_of_tilted_polygon() {
        // 2x3 rectangle in the plane x = z
        let rect = [
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 1.0),
            p(1.0, 3.0, 1.0),
            p(0.0, 3.0, 0.0),
        ];
        assert_relative_eq!(polygon_area(&rect), 3.0 * 2f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_area_needs_three_points() {
        assert_eq!(polygon_area(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)]), 0.0);
    }

    #[test]
    fn test_right_angle() {
        let a = angle(&p(0.0, 0.0, 0.0), &p(1.0, 0.0, 0.0), &p(0.0, 1.0, 0.0)).unwrap();
        assert_relative_eq!(a, 90.0, epsilon = 1e-12);
    }

    #[test]
    fn test_straight_and_zero_angles() {
        let o = p(0.0, 0.0, 0.0);
        let straight = angle(&o, &p(1.0, 0.0, 0.0), &p(-2.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(straight, 180.0, epsilon = 1e-9);
        let zero = angle(&o, &p(1.0, 0.0, 0.0), &p(3.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(zero, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_degenerate_angle() {
        let o = p(1.0, 1.0, 1.0);
        assert_eq!(angle(&o, &o, &p(0.0, 1.0, 0.0)), None);
    }

    #[test]
    fn test_measure_dispatch() {
        let pts = [p(1.0, 0.0, 0.0), p(0.0, 0.0, 0.0), p(0.0, 1.0, 0.0)];
        assert_relative_eq!(
            measure(MeasurementKind::Angle, &pts).unwrap(),
            90.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(measure(MeasurementKind::Area, &pts).unwrap(), 0.5);
        assert_eq!(measure(MeasurementKind::Distance, &pts), None);
        assert_relative_eq!(
            measure(MeasurementKind::Distance, &pts[..2]).unwrap(),
            1.0
        );
    }

    #[test]
    fn test_snap_to_grid() {
        let snapped = snap_to_grid(&p(0.123, -0.051, 2.449), 0.1);
        assert_relative_eq!(snapped.x, 0.1, epsilon = 1e-12);
        assert_relative_eq!(snapped.y, -0.1, epsilon = 1e-12);
        assert_relative_eq!(snapped.z, 2.4, epsilon = 1e-12);

        let untouched = snap_to_grid(&p(0.123, 0.0, 0.0), 0.0);
        assert_eq!(untouched, p(0.123, 0.0, 0.0));
    }

    #[test]
    fn test_format_measurement() {
        assert_eq!(format_measurement(5.0, MeasurementKind::Distance, "m", 2), "5.00 m");
        assert_eq!(format_measurement(1.2341, MeasurementKind::Area, "m²", 3), "1.234 m²");
        assert_eq!(format_measurement(90.0, MeasurementKind::Angle, "°", 2), "90.00°");
    }

    #[test]
    fn test_centroid() {
        let c = centroid(&[p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(2.0, 2.0, 0.0), p(0.0, 2.0, 0.0)]);
        assert_eq!(c, p(1.0, 1.0, 0.0));
        assert_eq!(centroid(&[]), Point::origin());
    }

    #[test]
    fn test_commit_thresholds() {
        assert_eq!(commit_threshold(MeasurementKind::Distance), 2);
        assert_eq!(commit_threshold(MeasurementKind::Area), 3);
        assert_eq!(commit_threshold(MeasurementKind::Angle), 3);
        assert!(!validate_point_count(MeasurementKind::Angle, 4));
        assert!(validate_point_count(MeasurementKind::Area, 5));
    }

    #[test]
    fn test_closest_point_on_segment() {
        let a = p(0.0, 0.0, 0.0);
        let b = p(10.0, 0.0, 0.0);
        assert_eq!(closest_point_on_segment(&p(5.0, 3.0, 0.0), &a, &b), p(5.0, 0.0, 0.0));
        assert_eq!(closest_point_on_segment(&p(-5.0, 1.0, 0.0), &a, &b), a);
        assert_eq!(closest_point_on_segment(&p(15.0, 1.0, 0.0), &a, &b), b);
    }

    #[test]
    fn test_nearest_vertex() {
        let verts = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.95, 0.05, 0.0)];
        assert_eq!(
            nearest_vertex(&p(0.97, 0.04, 0.0), &verts, 0.1),
            Some(p(0.95, 0.05, 0.0))
        );
        assert_eq!(nearest_vertex(&p(5.0, 5.0, 0.0), &verts, 0.1), None);
    }

    #[test]
    fn test_closest_point_on_triangle() {
        let (a, b, c) = (p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(0.0, 2.0, 0.0));
        // above the interior: straight down
        assert_eq!(closest_point_on_triangle(&p(0.5, 0.5, 3.0), &a, &b, &c), p(0.5, 0.5, 0.0));
        // beyond the hypotenuse
        let q = closest_point_on_triangle(&p(2.0, 2.0, 0.0), &a, &b, &c);
        assert_relative_eq!(q, p(1.0, 1.0, 0.0), epsilon = 1e-12);
        // past a corner
        assert_eq!(closest_point_on_triangle(&p(-1.0, -1.0, 0.0), &a, &b, &c), a);
        // collinear corners fall back to the edges
        let flat = closest_point_on_triangle(&p(1.0, 1.0, 0.0), &a, &b, &p(4.0, 0.0, 0.0));
        assert_relative_eq!(flat, p(1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    /// Unit cube as 12 outward-facing triangles
    fn unit_cube() -> (Vec<f32>, Vec<u32>) {
        let vertices = vec![
            0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0, 0.0, 1.0, 1.0,
        ];
        let indices = vec![
            0, 2, 1, 0, 3, 2, // bottom
            4, 5, 6, 4, 6, 7, // top
            0, 1, 5, 0, 5, 4, // front
            2, 3, 7, 2, 7, 6, // back
            1, 2, 6, 1, 6, 5, // right
            0, 4, 7, 0, 7, 3, // left
        ];
        (vertices, indices)
    }

    #[test]
    fn test_mesh_volume_and_area() {
        let (vertices, indices) = unit_cube();
        let tris = mesh_triangles(&vertices, &indices).unwrap();
        assert_eq!(tris.len(), 12);
        assert_relative_eq!(mesh_volume(&tris), 1.0, epsilon = 1e-12);
        assert_relative_eq!(mesh_surface_area(&tris), 6.0, epsilon = 1e-12);

        // flipped winding gives the same magnitude
        let flipped: Vec<u32> = indices.chunks(3).flat_map(|t| [t[0], t[2], t[1]]).collect();
        let tris = mesh_triangles(&vertices, &flipped).unwrap();
        assert_relative_eq!(mesh_volume(&tris), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_mesh_triangles_rejects_bad_index() {
        let (vertices, _) = unit_cube();
        assert!(mesh_triangles(&vertices, &[0, 1, 8]).is_none());
        // a dangling index pair is ignored
        assert_eq!(mesh_triangles(&vertices, &[0, 1, 2, 3, 4]).unwrap().len(), 1);
        assert!(mesh_triangles(&vertices, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_bounding_box() {
        let verts = [0.0, 0.0, 0.0, 4.0, 0.2, 3.0, 2.0, 0.1, 1.0, 9.0];
        let bb = BoundingBox::from_flat_vertices(&verts).unwrap();
        assert_relative_eq!(bb.size().x, 4.0);
        assert_relative_eq!(bb.size().y, 0.2, epsilon = 1e-6);
        assert_relative_eq!(bb.size().z, 3.0);
        assert_relative_eq!(bb.volume(), 2.4, epsilon = 1e-6);
        assert!(BoundingBox::from_flat_vertices(&[]).is_none());
    }
}
