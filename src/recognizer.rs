//! Free-hand stroke classification.
//!
//! [`ShapeRecognizer::recognize`] turns the sampled locations of one stroke
//! into a clean primitive, or `None` when the stroke is too small, too short
//! or does not resemble any supported kind. Recognition is a pure function of
//! the input points and the configuration.
//!
//! Open strokes (start and end apart) are tested as a line, then an arc.
//! Closed strokes are tested as a triangle, then a rectangle, then a circle.
//! The first passing test wins.

use egui::{Pos2, Rect, Vec2};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::geometry;
use crate::shape::RecognizedShape;

/// Tolerances used by [`ShapeRecognizer`]. Ratios are relative to the size of
/// the stroke so recognition does not depend on zoom level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Fewer samples than this are never recognized
    pub min_points: usize,
    /// Bounding boxes thinner than this in either direction are rejected
    pub min_dimension: f32,
    /// Bounding boxes whose larger side is below this are rejected (taps, jitter)
    pub min_extent: f32,
    /// Start/end gap, relative to the bounding diagonal, under which a stroke is closed
    pub closure_ratio: f32,
    /// Max perpendicular deviation from the fitted line, relative to path length
    pub line_tolerance: f32,
    /// RMS radial residual of the circle fit, relative to the radius
    pub arc_tolerance: f32,
    /// Arcs must sweep at least this much
    pub min_arc_sweep_degrees: f32,
    /// Strokes are resampled to this many evenly spaced points before analysis
    pub resample_count: usize,
    /// Polygon simplification tolerance, relative to the bounding diagonal
    pub simplify_ratio: f32,
    /// Corners closer than this (relative to the diagonal) are merged
    pub corner_merge_ratio: f32,
    /// A vertex must turn at least this much to count as a corner
    pub corner_angle_degrees: f32,
    /// Allowed deviation from 90 degrees at each rectangle corner
    pub right_angle_tolerance_degrees: f32,
    /// Rectangle corners must lie this close to the bounding box corners,
    /// relative to the diagonal
    pub corner_fit_ratio: f32,
    /// Max coefficient of variation of the normalized radius for a circle
    pub circle_tolerance: f32,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            min_points: 10,
            min_dimension: 1.0,
            min_extent: 12.0,
            closure_ratio: 0.2,
            line_tolerance: 0.05,
            arc_tolerance: 0.08,
            min_arc_sweep_degrees: 20.0,
            resample_count: 64,
            simplify_ratio: 0.05,
            corner_merge_ratio: 0.06,
            corner_angle_degrees: 35.0,
            right_angle_tolerance_degrees: 25.0,
            corner_fit_ratio: 0.07,
            circle_tolerance: 0.1,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShapeRecognizer {
    config: RecognizerConfig,
}

/// One-shot recognition with the default tolerances
pub fn recognize(points: &[Pos2]) -> Option<RecognizedShape> {
    ShapeRecognizer::default().recognize(points)
}

impl ShapeRecognizer {
    pub fn new(config: RecognizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    pub fn recognize(&self, points: &[Pos2]) -> Option<RecognizedShape> {
        let config = &self.config;
        if points.len() < config.min_points.max(2) {
            return None;
        }

        let bounds = geometry::calculate_bounds(points, 0.0);
        let size = bounds.size();
        if size.min_elem() < config.min_dimension || size.max_elem() < config.min_extent {
            debug!("Stroke too small to recognize: {:?}", size);
            return None;
        }

        let diagonal = size.length();
        let path = geometry::resample(points, config.resample_count);
        let (first, last) = (path[0], path[path.len() - 1]);

        let shape = if first.distance(last) <= config.closure_ratio * diagonal {
            self.classify_closed(&path, bounds, diagonal)
        } else {
            self.classify_open(&path)
        };

        match &shape {
            Some(shape) => debug!("Recognized {} in {:?}", shape.kind(), shape.bounding_rect()),
            None => debug!("No shape recognized from {} points", points.len()),
        }
        shape
    }

    fn classify_open(&self, path: &[Pos2]) -> Option<RecognizedShape> {
        self.fit_line(path).or_else(|| self.fit_arc(path))
    }

    fn classify_closed(&self, path: &[Pos2], bounds: Rect, diagonal: f32) -> Option<RecognizedShape> {
        let corners = self.find_corners(path, diagonal);

        if corners.len() == 3 {
            return Some(RecognizedShape::triangle([corners[0], corners[1], corners[2]]));
        }

        if corners.len() == 4
            && self.has_right_angles(&corners)
            && self.fills_bounds(&corners, bounds, diagonal)
        {
            return Some(RecognizedShape::rectangle(bounds));
        }

        if self.is_round(path, bounds) {
            return Some(RecognizedShape::circle(bounds));
        }

        None
    }

    /// Total least squares line through the points, accepted when no point
    /// strays too far from it.
    fn fit_line(&self, path: &[Pos2]) -> Option<RecognizedShape> {
        let center = geometry::centroid(path)?;
        let (mut sxx, mut syy, mut sxy) = (0.0f32, 0.0f32, 0.0f32);
        for p in path {
            let d = *p - center;
            sxx += d.x * d.x;
            syy += d.y * d.y;
            sxy += d.x * d.y;
        }
        let direction = Vec2::angled(0.5 * (2.0 * sxy).atan2(sxx - syy));
        let normal = direction.rot90();

        let max_deviation = path
            .iter()
            .map(|p| (*p - center).dot(normal).abs())
            .fold(0.0, f32::max);
        let length = geometry::path_length(path);
        if length <= f32::EPSILON || max_deviation / length > self.config.line_tolerance {
            return None;
        }

        let project = |p: Pos2| center + direction * (p - center).dot(direction);
        let start = project(path[0]);
        let end = project(path[path.len() - 1]);
        if start.distance(end) <= f32::EPSILON {
            return None;
        }
        Some(RecognizedShape::line(start, end))
    }

    /// Algebraic circle fit; accepted when the points hug a single radius and
    /// sweep a meaningful angle in one direction.
    fn fit_arc(&self, path: &[Pos2]) -> Option<RecognizedShape> {
        let (center, radius) = fit_circle(path)?;

        let residual = (path
            .iter()
            .map(|p| {
                let r = (p.distance(center) - radius) / radius;
                r * r
            })
            .sum::<f32>()
            / path.len() as f32)
            .sqrt();
        if residual > self.config.arc_tolerance {
            return None;
        }

        let angles: Vec<f32> = path
            .iter()
            .map(|p| {
                let d = *p - center;
                d.y.atan2(d.x)
            })
            .collect();
        let sweep: f32 = angles.windows(2).map(|w| geometry::wrap_angle(w[1] - w[0])).sum();
        if sweep.abs() < self.config.min_arc_sweep_degrees.to_radians() || sweep.abs() >= std::f32::consts::TAU {
            return None;
        }

        Some(RecognizedShape::arc(
            center,
            radius,
            angles[0],
            angles[angles.len() - 1],
            sweep > 0.0,
        ))
    }

    /// Significant corners of a closed stroke, in drawing order.
    fn find_corners(&self, path: &[Pos2], diagonal: f32) -> Vec<Pos2> {
        let epsilon = self.config.simplify_ratio * diagonal;
        let vertices: Vec<Pos2> = geometry::simplify_indices(path, epsilon)
            .into_iter()
            .map(|i| path[i])
            .collect();
        let mut vertices = merge_close(vertices, self.config.corner_merge_ratio * diagonal);

        let min_turn = self.config.corner_angle_degrees.to_radians();
        while vertices.len() > 2 {
            let (index, turn) = cyclic_turns(&vertices)
                .into_iter()
                .enumerate()
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .unwrap_or((0, f32::MAX));
            if turn >= min_turn {
                break;
            }
            vertices.remove(index);
        }
        vertices
    }

    fn has_right_angles(&self, corners: &[Pos2]) -> bool {
        let tolerance = self.config.right_angle_tolerance_degrees.to_radians();
        cyclic_turns(corners)
            .into_iter()
            .all(|turn| (turn - std::f32::consts::FRAC_PI_2).abs() <= tolerance)
    }

    /// A lumpy loop can show four right-angled bulges that sit well inside
    /// its bounding box. A drawn rectangle puts its corners on the box corners.
    fn fills_bounds(&self, corners: &[Pos2], bounds: Rect, diagonal: f32) -> bool {
        let box_corners = [
            bounds.left_top(),
            bounds.right_top(),
            bounds.right_bottom(),
            bounds.left_bottom(),
        ];
        let max_offset = self.config.corner_fit_ratio * diagonal;
        corners.iter().all(|corner| {
            box_corners
                .iter()
                .any(|box_corner| corner.distance(*box_corner) <= max_offset)
        })
    }

    /// Distance from the centroid, normalized by the bounding half-extents so
    /// ellipses count, stays nearly constant.
    fn is_round(&self, path: &[Pos2], bounds: Rect) -> bool {
        let Some(center) = geometry::centroid(path) else {
            return false;
        };
        let half = bounds.size() / 2.0;
        let radii: Vec<f32> = path
            .iter()
            .map(|p| {
                let d = *p - center;
                Vec2::new(d.x / half.x, d.y / half.y).length()
            })
            .collect();

        let n = radii.len() as f32;
        let mean = radii.iter().sum::<f32>() / n;
        if mean <= f32::EPSILON {
            return false;
        }
        let variance = radii.iter().map(|r| (r - mean) * (r - mean)).sum::<f32>() / n;
        variance.sqrt() / mean <= self.config.circle_tolerance
    }
}

/// Least squares circle through the points (Kasa fit), computed about the
/// centroid in f64 for stability.
fn fit_circle(points: &[Pos2]) -> Option<(Pos2, f32)> {
    let mean = geometry::centroid(points)?;
    let (mut sxx, mut syy, mut sxy, mut sxz, mut syz, mut sz) = (0.0f64, 0.0, 0.0, 0.0, 0.0, 0.0);
    for p in points {
        let x = (p.x - mean.x) as f64;
        let y = (p.y - mean.y) as f64;
        let z = x * x + y * y;
        sxx += x * x;
        syy += y * y;
        sxy += x * y;
        sxz += x * z;
        syz += y * z;
        sz += z;
    }

    let det = sxx * syy - sxy * sxy;
    if det.abs() < 1e-9 {
        return None;
    }
    // x^2 + y^2 + D x + E y + F = 0
    let d = -(sxz * syy - syz * sxy) / det;
    let e = -(syz * sxx - sxz * sxy) / det;
    let f = -sz / points.len() as f64;

    let radius_sq = (d * d + e * e) / 4.0 - f;
    if radius_sq <= 0.0 {
        return None;
    }
    let center = Pos2::new(mean.x + (-d / 2.0) as f32, mean.y + (-e / 2.0) as f32);
    Some((center, radius_sq.sqrt() as f32))
}

/// Collapse runs of vertices closer than `distance`, treating the list as a
/// closed polygon.
fn merge_close(vertices: Vec<Pos2>, distance: f32) -> Vec<Pos2> {
    let mut merged: Vec<Pos2> = Vec::with_capacity(vertices.len());
    for v in vertices {
        match merged.last_mut() {
            Some(last) if last.distance(v) < distance => *last = last.lerp(v, 0.5),
            _ => merged.push(v),
        }
    }
    if merged.len() > 1 {
        let (first, last) = (merged[0], merged[merged.len() - 1]);
        if first.distance(last) < distance {
            merged[0] = first.lerp(last, 0.5);
            merged.pop();
        }
    }
    merged
}

fn cyclic_turns(vertices: &[Pos2]) -> Vec<f32> {
    let n = vertices.len();
    (0..n)
        .map(|i| geometry::turning_angle(vertices[(i + n - 1) % n], vertices[i], vertices[(i + 1) % n]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{ShapeGeometry, ShapeKind};
    use egui::pos2;

    fn polyline(corners: &[Pos2], per_edge: usize) -> Vec<Pos2> {
        let mut out = Vec::new();
        for w in corners.windows(2) {
            for i in 0..per_edge {
                out.push(w[0].lerp(w[1], i as f32 / per_edge as f32));
            }
        }
        out.push(corners[corners.len() - 1]);
        out
    }

    #[test]
    fn test_fit_circle_exact() {
        let points: Vec<Pos2> = (0..20)
            .map(|i| pos2(50.0, 40.0) + Vec2::angled(i as f32 * 0.1) * 30.0)
            .collect();
        let (center, radius) = fit_circle(&points).unwrap();
        assert!(center.distance(pos2(50.0, 40.0)) < 0.01);
        assert!((radius - 30.0).abs() < 0.01);
    }

    #[test]
    fn test_fit_circle_rejects_collinear() {
        let points: Vec<Pos2> = (0..10).map(|i| pos2(i as f32, 2.0 * i as f32)).collect();
        assert!(fit_circle(&points).is_none());
    }

    #[test]
    fn test_merge_close_wraps_around() {
        let merged = merge_close(
            vec![pos2(0.0, 0.0), pos2(100.0, 0.0), pos2(100.0, 100.0), pos2(1.0, 1.0)],
            5.0,
        );
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0], pos2(0.5, 0.5));
    }

    #[test]
    fn test_too_few_points() {
        let points = vec![pos2(0.0, 0.0), pos2(50.0, 50.0), pos2(100.0, 0.0)];
        assert!(recognize(&points).is_none());
    }

    #[test]
    fn test_straight_line() {
        let points = polyline(&[pos2(10.0, 10.0), pos2(110.0, 60.0)], 20);
        let shape = recognize(&points).unwrap();
        let (start, end) = shape.line_endpoints().unwrap();
        assert!(start.distance(pos2(10.0, 10.0)) < 0.5);
        assert!(end.distance(pos2(110.0, 60.0)) < 0.5);
    }

    #[test]
    fn test_open_l_shape_is_not_recognized() {
        let points = polyline(&[pos2(0.0, 0.0), pos2(0.0, 100.0), pos2(100.0, 100.0)], 15);
        assert!(recognize(&points).is_none());
    }

    #[test]
    fn test_half_circle_is_arc() {
        // Angles 0..PI run clockwise on a y-down canvas
        let points: Vec<Pos2> = (0..=30)
            .map(|i| pos2(100.0, 100.0) + Vec2::angled(i as f32 / 30.0 * std::f32::consts::PI) * 50.0)
            .collect();
        let shape = recognize(&points).unwrap();
        assert_eq!(shape.kind(), ShapeKind::Arc);
        match *shape.geometry() {
            ShapeGeometry::Arc {
                center,
                radius,
                clockwise,
                ..
            } => {
                assert!(center.distance(pos2(100.0, 100.0)) < 1.0);
                assert!((radius - 50.0).abs() < 1.0);
                assert!(clockwise);
            }
            other => panic!("expected an arc, got {:?}", other),
        }
    }

    #[test]
    fn test_triangle_corners() {
        let corners = [pos2(50.0, 0.0), pos2(100.0, 90.0), pos2(0.0, 90.0), pos2(50.0, 0.0)];
        let shape = recognize(&polyline(&corners, 20)).unwrap();
        let vertices = shape.triangle_vertices().unwrap();
        for expected in &corners[..3] {
            assert!(vertices.iter().any(|v| v.distance(*expected) < 6.0));
        }
    }

    #[test]
    fn test_skewed_quad_is_not_rectangle() {
        let corners = [
            pos2(0.0, 0.0),
            pos2(100.0, 0.0),
            pos2(160.0, 100.0),
            pos2(60.0, 100.0),
            pos2(0.0, 0.0),
        ];
        let shape = recognize(&polyline(&corners, 20));
        assert!(shape.map_or(true, |s| s.kind() != ShapeKind::Rectangle));
    }

    #[test]
    fn test_four_lobed_loop_is_circle() {
        // Radius bulges by 10% four times per turn, at every phase
        for step in 0..48 {
            let phase = step as f32 / 48.0 * std::f32::consts::TAU;
            let points: Vec<Pos2> = (0..40)
                .map(|i| {
                    let t = i as f32 / 40.0 * std::f32::consts::TAU;
                    pos2(100.0, 100.0) + Vec2::angled(t) * 50.0 * (1.0 + 0.1 * (4.0 * t + phase).sin())
                })
                .collect();
            let shape = recognize(&points).expect("round loop");
            assert_eq!(shape.kind(), ShapeKind::Circle, "phase step {}", step);
        }
    }

    #[test]
    fn test_fills_bounds() {
        let recognizer = ShapeRecognizer::default();
        let bounds = Rect::from_min_max(pos2(0.0, 0.0), pos2(100.0, 100.0));
        let diagonal = bounds.size().length();
        let square = [pos2(2.0, 1.0), pos2(99.0, 0.0), pos2(100.0, 98.0), pos2(0.0, 100.0)];
        assert!(recognizer.fills_bounds(&square, bounds, diagonal));

        let diamond = [pos2(50.0, 0.0), pos2(100.0, 50.0), pos2(50.0, 100.0), pos2(0.0, 50.0)];
        assert!(!recognizer.fills_bounds(&diamond, bounds, diagonal));
    }
}
