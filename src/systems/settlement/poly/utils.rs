// UTILS

use bevy::prelude::*;

/// find the intersection between two segments, lookup Cramer's rule
/// https://cp-algorithms.com/geometry/lines-intersection.html
/// # Returns `Some(Vec2)` if the segments intersect, `None` otherwise (parallel segments never do)
pub fn line_segment_intersection(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> Option<Vec2> {
    let s1 = p2 - p1;   // direction vector of segment 1
    let s2 = p4 - p3;   // direction vector of segment 2

    let denom = s1.x * s2.y - s2.x * s1.y; // determinant of 2x2 matrix

    // parallel lines
    if denom.abs() < 1e-6 {
        return None;
    }

    let s = (s1.x * (p1.y - p3.y) - s1.y * (p1.x - p3.x)) / denom;
    let t = (s2.x * (p1.y - p3.y) - s2.y * (p1.x - p3.x)) / denom;

    // check if intersection is within both segments
    if (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t) {
        Some(p1 + t * s1)
    } else {
        None
    }
}

/// Segment crossing test that also catches collinear overlap,
/// which `line_segment_intersection` skips as parallel.
pub fn segments_cross(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> bool {
    if line_segment_intersection(p1, p2, p3, p4).is_some() {
        return true;
    }

    let d1 = p2 - p1;
    let cross = d1.perp_dot(p3 - p1);
    if cross.abs() > 1e-3 || d1.perp_dot(p4 - p1).abs() > 1e-3 {
        return false;
    }

    // collinear, compare the projections onto the first segment
    let len_sq = d1.length_squared();
    if len_sq < f32::EPSILON {
        return false;
    }
    let t3 = (p3 - p1).dot(d1) / len_sq;
    let t4 = (p4 - p1).dot(d1) / len_sq;
    let (lo, hi) = if t3 < t4 { (t3, t4) } else { (t4, t3) };
    hi >= 0.0 && lo <= 1.0
}

/// Computes the signed area of a polygon (shoelace)
/// positive -> counter-clockwise with y pointing up
/// # Returns 0.0 for polygons with fewer than 3 vertices.
pub fn polygon_area(polygon: &[Vec2]) -> f32 {
    if polygon.len() < 3 {
        return 0.0;
    }

    let n = polygon.len();
    let mut area = 0.0;

    for i in 0..n {
        let j = (i + 1) % n;
        area += polygon[i].x * polygon[j].y - polygon[j].x * polygon[i].y;
    }

    area / 2.0
}

/// Calculates the area-weighted centroid of a polygon.
/// Degenerate polygons (zero area) fall back to the vertex average, empty ones to `Vec2::ZERO`.
pub fn polygon_centroid(polygon: &[Vec2]) -> Vec2 {
    if polygon.is_empty() {
        return Vec2::ZERO;
    }

    let area = polygon_area(polygon);
    if polygon.len() < 3 || area.abs() < f32::EPSILON {
        return vertex_average(polygon);
    }

    let n = polygon.len();
    let mut cx = 0.0_f64;
    let mut cy = 0.0_f64;

    for i in 0..n {
        let j = (i + 1) % n;
        let p = polygon[i].x as f64 * polygon[j].y as f64 - polygon[j].x as f64 * polygon[i].y as f64;
        cx += (polygon[i].x + polygon[j].x) as f64 * p;
        cy += (polygon[i].y + polygon[j].y) as f64 * p;
    }

    let area_6 = 6.0 * area as f64;
    Vec2::new((cx / area_6) as f32, (cy / area_6) as f32)
}

pub fn vertex_average(points: &[Vec2]) -> Vec2 {
    if points.is_empty() {
        return Vec2::ZERO;
    }
    points.iter().fold(Vec2::ZERO, |acc, p| acc + *p) / points.len() as f32
}

/// Axis-aligned bounds of a point set, `None` when empty
pub fn polygon_bounds(polygon: &[Vec2]) -> Option<Rect> {
    let first = *polygon.first()?;
    let mut min = first;
    let mut max = first;
    for v in polygon.iter().skip(1) {
        min = min.min(*v);
        max = max.max(*v);
    }
    Some(Rect { min, max })
}

/// Strict overlap, boxes that only touch along an edge do not overlap
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.min.x < b.max.x && b.min.x < a.max.x && a.min.y < b.max.y && b.min.y < a.max.y
}

/// Determines whether a point is inside a polygon using the ray-casting algorithm.
/// # Returns `true` if the point is inside the polygon, otherwise `false`.
pub fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;

    for i in 0..polygon.len() {
        let yi = polygon[i].y;
        let yj = polygon[j].y;
        let xi = polygon[i].x;
        let xj = polygon[j].x;

        if ((yi > point.y) != (yj > point.y)) &&
           (point.x < (xj - xi) * (point.y - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Closest point to `point` on the segment `start..end`
pub fn closest_point_on_segment(point: Vec2, start: Vec2, end: Vec2) -> Vec2 {
    let line_vec = end - start;
    let len_sq = line_vec.length_squared();

    if len_sq < f32::EPSILON {
        return start;
    }

    let t = ((point - start).dot(line_vec) / len_sq).clamp(0.0, 1.0);
    start + line_vec * t
}

/// Closest point on a closed polygon outline
pub fn closest_point_on_polygon(point: Vec2, polygon: &[Vec2]) -> Option<Vec2> {
    let n = polygon.len();
    (0..n)
        .map(|i| closest_point_on_segment(point, polygon[i], polygon[(i + 1) % n]))
        .min_by(|a, b| a.distance_squared(point).total_cmp(&b.distance_squared(point)))
}

/// Pulls every vertex towards the centroid by `margin`, dropping vertices closer than that.
/// This is a radial approximation, not a true polygon offset: concave or long thin
/// polygons can come back self-intersecting.
pub fn inset_polygon(polygon: &[Vec2], margin: f32) -> Vec<Vec2> {
    let centroid = polygon_centroid(polygon);

    polygon
        .iter()
        .filter_map(|&vertex| {
            let to_center = centroid - vertex;
            let distance = to_center.length();
            if distance <= margin {
                None
            } else {
                Some(vertex + to_center / distance * margin)
            }
        })
        .collect()
}

/// Corners of a `width` x `depth` rectangle centered on `center`, rotated by `rotation` radians
pub fn rotated_rect(center: Vec2, width: f32, depth: f32, rotation: f32) -> [Vec2; 4] {
    let half_w = width * 0.5;
    let half_d = depth * 0.5;
    let rot = Vec2::from_angle(rotation);

    [
        Vec2::new(-half_w, -half_d),
        Vec2::new(half_w, -half_d),
        Vec2::new(half_w, half_d),
        Vec2::new(-half_w, half_d),
    ]
    .map(|corner| center + rot.rotate(corner))
}
