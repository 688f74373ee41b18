use egui::{Pos2, Rect, Vec2};

/// Calculate distance from a point to a line segment (useful for stroke hit testing)
pub fn distance_to_line_segment(point: Pos2, line_start: Pos2, line_end: Pos2) -> f32 {
    let line_vec = line_end - line_start;
    let point_vec = point - line_start;

    let line_len = line_vec.length();
    if line_len == 0.0 {
        return point_vec.length();
    }

    let t = ((point_vec.x * line_vec.x + point_vec.y * line_vec.y) / line_len).clamp(0.0, line_len);
    let projection = line_start + (line_vec * t / line_len);
    (point - projection).length()
}

/// Calculate the bounding box for a set of points
pub fn calculate_bounds(points: &[Pos2], padding: f32) -> Rect {
    if points.is_empty() {
        return Rect::NOTHING;
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;

    for point in points {
        min_x = min_x.min(point.x);
        min_y = min_y.min(point.y);
        max_x = max_x.max(point.x);
        max_y = max_y.max(point.y);
    }

    Rect::from_min_max(
        Pos2::new(min_x - padding, min_y - padding),
        Pos2::new(max_x + padding, max_y + padding),
    )
}

/// Total length of the polyline through `points`
pub fn path_length(points: &[Pos2]) -> f32 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Arithmetic mean of the points
pub fn centroid(points: &[Pos2]) -> Option<Pos2> {
    if points.is_empty() {
        return None;
    }
    let sum = points.iter().fold(Vec2::ZERO, |acc, p| acc + p.to_vec2());
    Some((sum / points.len() as f32).to_pos2())
}

/// Resample a polyline into `count` points spaced evenly along its length.
///
/// The first and last input points are always kept. Returns the input
/// unchanged when it has zero length or fewer than two points.
pub fn resample(points: &[Pos2], count: usize) -> Vec<Pos2> {
    let total = path_length(points);
    if points.len() < 2 || count < 2 || total <= f32::EPSILON {
        return points.to_vec();
    }

    let step = total / (count - 1) as f32;
    let mut out = Vec::with_capacity(count);
    out.push(points[0]);

    let mut carried = 0.0;
    for window in points.windows(2) {
        let (a, b) = (window[0], window[1]);
        let seg = a.distance(b);
        if seg <= f32::EPSILON {
            continue;
        }
        // Distance along this segment to the next emitted sample
        let mut along = step - carried;
        while along <= seg && out.len() < count - 1 {
            out.push(a + (b - a) * (along / seg));
            along += step;
        }
        carried = seg - (along - step);
    }

    out.push(points[points.len() - 1]);
    out
}

/// Unsigned change of direction at `at`, in radians (0 = straight on, PI = reversal)
pub fn turning_angle(prev: Pos2, at: Pos2, next: Pos2) -> f32 {
    let a = at - prev;
    let b = next - at;
    let denom = a.length() * b.length();
    if denom <= f32::EPSILON {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}

/// Wrap an angle difference into (-PI, PI]
pub fn wrap_angle(mut angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    while angle > PI {
        angle -= TAU;
    }
    while angle <= -PI {
        angle += TAU;
    }
    angle
}

/// Douglas-Peucker simplification, returning indices of the kept points.
///
/// Both end points are always kept.
pub fn simplify_indices(points: &[Pos2], epsilon: f32) -> Vec<usize> {
    if points.len() < 3 {
        return (0..points.len()).collect();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;

    let mut stack = vec![(0, points.len() - 1)];
    while let Some((first, last)) = stack.pop() {
        if last <= first + 1 {
            continue;
        }
        let mut max_dist = 0.0;
        let mut max_index = first;
        for i in first + 1..last {
            let d = distance_to_line_segment(points[i], points[first], points[last]);
            if d > max_dist {
                max_dist = d;
                max_index = i;
            }
        }
        if max_dist > epsilon {
            keep[max_index] = true;
            stack.push((first, max_index));
            stack.push((max_index, last));
        }
    }

    keep.iter()
        .enumerate()
        .filter_map(|(i, k)| k.then_some(i))
        .collect()
}

/// Scale `rect` by `factor` about its centre
pub fn scale_rect(rect: Rect, factor: f32) -> Rect {
    Rect::from_center_size(rect.center(), rect.size() * factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn test_segment_distance() {
        let d = distance_to_line_segment(pos2(5.0, 5.0), pos2(0.0, 0.0), pos2(10.0, 0.0));
        assert!((d - 5.0).abs() < 1e-5);

        // Beyond the end the distance is to the end point
        let d = distance_to_line_segment(pos2(13.0, 4.0), pos2(0.0, 0.0), pos2(10.0, 0.0));
        assert!((d - 5.0).abs() < 1e-5);

        // Degenerate segment
        let d = distance_to_line_segment(pos2(3.0, 4.0), pos2(0.0, 0.0), pos2(0.0, 0.0));
        assert!((d - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_bounds() {
        let rect = calculate_bounds(&[pos2(1.0, 5.0), pos2(-2.0, 3.0), pos2(4.0, 9.0)], 0.0);
        assert_eq!(rect.min, pos2(-2.0, 3.0));
        assert_eq!(rect.max, pos2(4.0, 9.0));
        assert_eq!(calculate_bounds(&[], 0.0), Rect::NOTHING);
    }

    #[test]
    fn test_resample_even_spacing() {
        let points = [pos2(0.0, 0.0), pos2(10.0, 0.0), pos2(10.0, 10.0)];
        let out = resample(&points, 5);
        assert_eq!(out.len(), 5);
        assert_eq!(out[0], pos2(0.0, 0.0));
        assert_eq!(out[4], pos2(10.0, 10.0));
        assert!(out[2].distance(pos2(10.0, 0.0)) < 1e-4);
        for w in out.windows(2) {
            assert!((w[0].distance(w[1]) - 5.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_simplify_keeps_corner() {
        let points = [
            pos2(0.0, 0.0),
            pos2(5.0, 0.1),
            pos2(10.0, 0.0),
            pos2(10.0, 5.0),
            pos2(10.1, 10.0),
        ];
        assert_eq!(simplify_indices(&points, 1.0), vec![0, 2, 4]);
    }

    #[test]
    fn test_turning_and_wrap() {
        let right = turning_angle(pos2(0.0, 0.0), pos2(1.0, 0.0), pos2(1.0, 1.0));
        assert!((right - std::f32::consts::FRAC_PI_2).abs() < 1e-5);
        assert!(turning_angle(pos2(0.0, 0.0), pos2(1.0, 0.0), pos2(2.0, 0.0)).abs() < 1e-5);
        assert!((wrap_angle(3.0 * std::f32::consts::PI) - std::f32::consts::PI).abs() < 1e-5);
    }
}
