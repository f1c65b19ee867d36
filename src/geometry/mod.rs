//! Pure geometric helpers on egui's math types.

use std::cmp::Ordering;

use egui::{Pos2, Rect, Vec2};

pub mod hit_testing;

/// Below this magnitude a determinant or length is treated as zero.
pub const EPSILON: f32 = 1e-6;

/// Calculate distance from a point to a line segment
pub fn distance_to_line_segment(point: Pos2, line_start: Pos2, line_end: Pos2) -> f32 {
    point.distance(nearest_point_on_segment(point, line_start, line_end))
}

/// Closest point to `point` lying on the segment `a`..`b`.
pub fn nearest_point_on_segment(point: Pos2, a: Pos2, b: Pos2) -> Pos2 {
    let line_vec = b - a;
    let len_sq = line_vec.length_sq();
    if len_sq <= EPSILON {
        return a;
    }
    let t = ((point - a).dot(line_vec) / len_sq).clamp(0.0, 1.0);
    a + line_vec * t
}

/// Calculate the bounding box for a set of points
pub fn calculate_bounds(points: &[Pos2], padding: f32) -> Rect {
    if points.is_empty() {
        return Rect::NOTHING;
    }
    Rect::from_points(points).expand(padding)
}

/// Intersection of two segments by parametric solve.
///
/// Parallel, collinear and zero-length segments yield `None`.
pub fn segment_intersection(a0: Pos2, a1: Pos2, b0: Pos2, b1: Pos2) -> Option<Pos2> {
    let r = a1 - a0;
    let s = b1 - b0;
    if r.length_sq() <= EPSILON || s.length_sq() <= EPSILON {
        return None;
    }
    let denom = cross(r, s);
    if denom.abs() <= EPSILON {
        return None;
    }
    let qp = b0 - a0;
    let t = cross(qp, s) / denom;
    let u = cross(qp, r) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(a0 + r * t)
    } else {
        None
    }
}

/// Points where the segment crosses the four edges of `rect`, deduplicated.
pub fn rect_segment_intersections(rect: Rect, a: Pos2, b: Pos2) -> Vec<Pos2> {
    let edges = [
        (rect.left_top(), rect.right_top()),
        (rect.right_top(), rect.right_bottom()),
        (rect.right_bottom(), rect.left_bottom()),
        (rect.left_bottom(), rect.left_top()),
    ];
    let mut points: Vec<Pos2> = Vec::new();
    for (e0, e1) in edges {
        if let Some(p) = segment_intersection(a, b, e0, e1) {
            if !points.iter().any(|q| q.distance(p) <= EPSILON) {
                points.push(p);
            }
        }
    }
    points
}

/// Points where the segment crosses the ellipse inscribed in `rect`.
///
/// Solves the quadratic in the ellipse's local frame; only roots with the
/// segment parameter in `[0, 1]` are kept.
pub fn ellipse_segment_intersections(rect: Rect, a: Pos2, b: Pos2) -> Vec<Pos2> {
    let rx = rect.width() / 2.0;
    let ry = rect.height() / 2.0;
    if rx <= EPSILON || ry <= EPSILON {
        return Vec::new();
    }
    let c = rect.center();
    let p = a - c;
    let d = b - a;

    let qa = (d.x * d.x) / (rx * rx) + (d.y * d.y) / (ry * ry);
    let qb = 2.0 * ((p.x * d.x) / (rx * rx) + (p.y * d.y) / (ry * ry));
    let qc = (p.x * p.x) / (rx * rx) + (p.y * p.y) / (ry * ry) - 1.0;
    if qa <= EPSILON {
        return Vec::new();
    }

    let disc = qb * qb - 4.0 * qa * qc;
    let roots = if disc < 0.0 {
        vec![]
    } else if disc <= EPSILON {
        vec![-qb / (2.0 * qa)]
    } else {
        let sq = disc.sqrt();
        vec![(-qb - sq) / (2.0 * qa), (-qb + sq) / (2.0 * qa)]
    };

    roots
        .into_iter()
        .filter(|t| (0.0..=1.0).contains(t))
        .map(|t| a + d * t)
        .collect()
}

/// Whether the segment touches the rectangle (an end inside or an edge crossed).
pub fn segment_intersects_rect(a: Pos2, b: Pos2, rect: Rect) -> bool {
    rect.contains(a) || rect.contains(b) || !rect_segment_intersections(rect, a, b).is_empty()
}

/// Total order on points: by x, then by y.
pub fn cmp_points(a: &Pos2, b: &Pos2) -> Ordering {
    a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y))
}

/// Rational quadratic (conic) evaluated at `t`.
pub fn conic_point(p0: Pos2, p1: Pos2, p2: Pos2, weight: f32, t: f32) -> Pos2 {
    let u = 1.0 - t;
    let b0 = u * u;
    let b1 = 2.0 * weight * u * t;
    let b2 = t * t;
    let denom = b0 + b1 + b2;
    if denom.abs() <= EPSILON {
        return p1;
    }
    let v = (p0.to_vec2() * b0 + p1.to_vec2() * b1 + p2.to_vec2() * b2) / denom;
    v.to_pos2()
}

/// Conic sampled into `segments` straight pieces.
pub fn flatten_conic(p0: Pos2, p1: Pos2, p2: Pos2, weight: f32, segments: usize) -> Vec<Pos2> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| conic_point(p0, p1, p2, weight, i as f32 / segments as f32))
        .collect()
}

/// Ramer–Douglas–Peucker simplification.
///
/// Returns the indices of the retained points, always including both ends.
pub fn simplify_indices(points: &[Pos2], epsilon: f32) -> Vec<usize> {
    match points.len() {
        0 => return Vec::new(),
        1 => return vec![0],
        _ => {}
    }
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    let mut stack = vec![(0, points.len() - 1)];
    while let Some((first, last)) = stack.pop() {
        if last <= first + 1 {
            continue;
        }
        let mut max_distance = 0.0;
        let mut index = first;
        for i in first + 1..last {
            let d = perpendicular_distance(points[i], points[first], points[last]);
            if d > max_distance {
                max_distance = d;
                index = i;
            }
        }
        if max_distance > epsilon {
            keep[index] = true;
            stack.push((first, index));
            stack.push((index, last));
        }
    }

    keep.iter()
        .enumerate()
        .filter_map(|(i, k)| k.then_some(i))
        .collect()
}

/// Distance from `point` to the infinite line through `a` and `b`.
pub fn perpendicular_distance(point: Pos2, a: Pos2, b: Pos2) -> f32 {
    let d = b - a;
    let len = d.length();
    if len <= EPSILON {
        return point.distance(a);
    }
    cross(d, point - a).abs() / len
}

fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}
