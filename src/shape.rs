//! Geometric primitives produced by shape recognition.
//!
//! A [`RecognizedShape`] always carries an axis-aligned bounding rect plus the
//! parameters of exactly one primitive kind. The kind-specific parameters live
//! in [`ShapeGeometry`] so a line without end points (or a triangle with two
//! vertices) cannot be constructed.

use egui::{Pos2, Rect, Vec2, pos2};
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};
use std::fmt;

use crate::geometry;

/// Points per edge when a rectangle is turned into a stroke
pub const RECTANGLE_EDGE_STEPS: usize = 20;
/// Segments used to approximate a full ellipse
pub const ELLIPSE_SEGMENTS: usize = 40;
/// Segments used to approximate an arc sweep
pub const ARC_SEGMENTS: usize = 30;
/// Points per edge when a triangle is turned into a stroke
pub const TRIANGLE_EDGE_STEPS: usize = 15;

/// Line angles snap to multiples of this when perfecting (15 degrees)
pub const LINE_SNAP_ANGLE: f32 = PI / 12.0;

/// Aspect ratios inside this band already count as square / round
const PERFECT_ASPECT_MIN: f32 = 0.95;
const PERFECT_ASPECT_MAX: f32 = 1.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Line,
    Rectangle,
    Circle,
    Arc,
    Triangle,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Line => "line",
            Self::Rectangle => "rectangle",
            Self::Circle => "circle",
            Self::Arc => "arc",
            Self::Triangle => "triangle",
        };
        f.write_str(name)
    }
}

/// Kind-specific parameters of a recognized primitive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ShapeGeometry {
    Line {
        start: Pos2,
        end: Pos2,
    },
    /// Corners are implied by the bounding rect
    Rectangle,
    /// A non-square bounding rect makes this an ellipse
    Circle,
    /// Angles are polar angles around `center` on the canvas (y grows down).
    /// `clockwise` is clockwise as seen on screen, i.e. the angle increases
    /// from `start_angle` to `end_angle`.
    Arc {
        center: Pos2,
        radius: f32,
        start_angle: f32,
        end_angle: f32,
        clockwise: bool,
    },
    Triangle {
        vertices: [Pos2; 3],
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecognizedShape {
    bounding_rect: Rect,
    geometry: ShapeGeometry,
}

impl RecognizedShape {
    pub fn line(start: Pos2, end: Pos2) -> Self {
        Self {
            bounding_rect: Rect::from_two_pos(start, end),
            geometry: ShapeGeometry::Line { start, end },
        }
    }

    pub fn rectangle(rect: Rect) -> Self {
        Self {
            bounding_rect: rect,
            geometry: ShapeGeometry::Rectangle,
        }
    }

    pub fn circle(rect: Rect) -> Self {
        Self {
            bounding_rect: rect,
            geometry: ShapeGeometry::Circle,
        }
    }

    /// An arc; its bounding rect is the extent of the swept outline
    pub fn arc(center: Pos2, radius: f32, start_angle: f32, end_angle: f32, clockwise: bool) -> Self {
        let geometry = ShapeGeometry::Arc {
            center,
            radius,
            start_angle,
            end_angle,
            clockwise,
        };
        let outline = arc_points(center, radius, start_angle, end_angle, clockwise);
        Self {
            bounding_rect: geometry::calculate_bounds(&outline, 0.0),
            geometry,
        }
    }

    pub fn triangle(vertices: [Pos2; 3]) -> Self {
        Self {
            bounding_rect: geometry::calculate_bounds(&vertices, 0.0),
            geometry: ShapeGeometry::Triangle { vertices },
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self.geometry {
            ShapeGeometry::Line { .. } => ShapeKind::Line,
            ShapeGeometry::Rectangle => ShapeKind::Rectangle,
            ShapeGeometry::Circle => ShapeKind::Circle,
            ShapeGeometry::Arc { .. } => ShapeKind::Arc,
            ShapeGeometry::Triangle { .. } => ShapeKind::Triangle,
        }
    }

    pub fn bounding_rect(&self) -> Rect {
        self.bounding_rect
    }

    pub fn geometry(&self) -> &ShapeGeometry {
        &self.geometry
    }

    pub fn line_endpoints(&self) -> Option<(Pos2, Pos2)> {
        match self.geometry {
            ShapeGeometry::Line { start, end } => Some((start, end)),
            _ => None,
        }
    }

    pub fn triangle_vertices(&self) -> Option<[Pos2; 3]> {
        match self.geometry {
            ShapeGeometry::Triangle { vertices } => Some(vertices),
            _ => None,
        }
    }

    /// Shift the whole shape by `delta`
    pub fn translated(&self, delta: Vec2) -> Self {
        let geometry = match self.geometry {
            ShapeGeometry::Line { start, end } => ShapeGeometry::Line {
                start: start + delta,
                end: end + delta,
            },
            ShapeGeometry::Arc {
                center,
                radius,
                start_angle,
                end_angle,
                clockwise,
            } => ShapeGeometry::Arc {
                center: center + delta,
                radius,
                start_angle,
                end_angle,
                clockwise,
            },
            ShapeGeometry::Triangle { vertices } => ShapeGeometry::Triangle {
                vertices: vertices.map(|v| v + delta),
            },
            other => other,
        };
        Self {
            bounding_rect: self.bounding_rect.translate(delta),
            geometry,
        }
    }

    /// Uniformly scale the shape about the centre of its bounding rect.
    ///
    /// Line end points are rescaled about the line's own midpoint.
    pub fn scaled(&self, factor: f32) -> Self {
        let pivot = self.bounding_rect.center();
        let about = |p: Pos2, c: Pos2| c + (p - c) * factor;
        let geometry = match self.geometry {
            ShapeGeometry::Line { start, end } => {
                let mid = start.lerp(end, 0.5);
                ShapeGeometry::Line {
                    start: about(start, mid),
                    end: about(end, mid),
                }
            }
            ShapeGeometry::Arc {
                center,
                radius,
                start_angle,
                end_angle,
                clockwise,
            } => ShapeGeometry::Arc {
                center: about(center, pivot),
                radius: radius * factor,
                start_angle,
                end_angle,
                clockwise,
            },
            ShapeGeometry::Triangle { vertices } => ShapeGeometry::Triangle {
                vertices: vertices.map(|v| about(v, pivot)),
            },
            other => other,
        };
        Self {
            bounding_rect: geometry::scale_rect(self.bounding_rect, factor),
            geometry,
        }
    }

    /// Whether [`Self::perfected`] would change anything meaningful
    pub fn can_be_perfected(&self) -> bool {
        match self.geometry {
            ShapeGeometry::Circle | ShapeGeometry::Rectangle => {
                let size = self.bounding_rect.size();
                if size.y <= f32::EPSILON {
                    return true;
                }
                let aspect = size.x / size.y;
                !(PERFECT_ASPECT_MIN..=PERFECT_ASPECT_MAX).contains(&aspect)
            }
            ShapeGeometry::Line { .. } => true,
            _ => false,
        }
    }

    /// The "perfect" version of this shape: ellipse to circle, rectangle to
    /// square, line to the nearest 15 degree angle. Other kinds are returned
    /// unchanged.
    pub fn perfected(&self) -> Self {
        match self.geometry {
            ShapeGeometry::Circle | ShapeGeometry::Rectangle => {
                let side = (self.bounding_rect.width() + self.bounding_rect.height()) / 2.0;
                Self {
                    bounding_rect: Rect::from_center_size(self.bounding_rect.center(), Vec2::splat(side)),
                    geometry: self.geometry,
                }
            }
            ShapeGeometry::Line { start, end } => {
                let delta = end - start;
                let snapped = (delta.y.atan2(delta.x) / LINE_SNAP_ANGLE).round() * LINE_SNAP_ANGLE;
                let end = start + Vec2::angled(snapped) * delta.length();
                Self::line(start, end)
            }
            _ => *self,
        }
    }

    /// Synthesize the dense outline used both for preview and for the
    /// committed stroke.
    pub fn outline_points(&self) -> Vec<Pos2> {
        let rect = self.bounding_rect;
        match self.geometry {
            ShapeGeometry::Line { start, end } => vec![start, end],
            ShapeGeometry::Rectangle => {
                let corners = [rect.left_top(), rect.right_top(), rect.right_bottom(), rect.left_bottom()];
                closed_polyline(&corners, RECTANGLE_EDGE_STEPS)
            }
            ShapeGeometry::Circle => {
                let center = rect.center();
                let radii = rect.size() / 2.0;
                (0..=ELLIPSE_SEGMENTS)
                    .map(|i| {
                        let angle = i as f32 / ELLIPSE_SEGMENTS as f32 * TAU;
                        pos2(center.x + radii.x * angle.cos(), center.y + radii.y * angle.sin())
                    })
                    .collect()
            }
            ShapeGeometry::Arc {
                center,
                radius,
                start_angle,
                end_angle,
                clockwise,
            } => arc_points(center, radius, start_angle, end_angle, clockwise),
            ShapeGeometry::Triangle { vertices } => closed_polyline(&vertices, TRIANGLE_EDGE_STEPS),
        }
    }
}

/// Signed sweep from `start_angle` to `end_angle` in the requested direction
pub fn arc_sweep(start_angle: f32, end_angle: f32, clockwise: bool) -> f32 {
    let mut sweep = end_angle - start_angle;
    if clockwise {
        while sweep < 0.0 {
            sweep += TAU;
        }
    } else {
        while sweep > 0.0 {
            sweep -= TAU;
        }
    }
    sweep
}

fn arc_points(center: Pos2, radius: f32, start_angle: f32, end_angle: f32, clockwise: bool) -> Vec<Pos2> {
    let sweep = arc_sweep(start_angle, end_angle, clockwise);
    (0..=ARC_SEGMENTS)
        .map(|i| {
            let angle = start_angle + sweep * (i as f32 / ARC_SEGMENTS as f32);
            center + Vec2::angled(angle) * radius
        })
        .collect()
}

/// Walk the polygon edges, emitting `steps` points per edge and closing back
/// on the first vertex.
fn closed_polyline(vertices: &[Pos2], steps: usize) -> Vec<Pos2> {
    let mut out = Vec::with_capacity(vertices.len() * steps + 1);
    out.push(vertices[0]);
    for (i, &from) in vertices.iter().enumerate() {
        let to = vertices[(i + 1) % vertices.len()];
        for step in 1..=steps {
            out.push(from.lerp(to, step as f32 / steps as f32));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Pos2, b: Pos2) -> bool {
        a.distance(b) < 1e-3
    }

    #[test]
    fn test_kind_matches_geometry() {
        assert_eq!(RecognizedShape::line(pos2(0.0, 0.0), pos2(5.0, 5.0)).kind(), ShapeKind::Line);
        let rect = Rect::from_min_size(pos2(0.0, 0.0), Vec2::splat(10.0));
        assert_eq!(RecognizedShape::rectangle(rect).kind(), ShapeKind::Rectangle);
        assert_eq!(RecognizedShape::circle(rect).kind(), ShapeKind::Circle);
        assert!(RecognizedShape::circle(rect).line_endpoints().is_none());
    }

    #[test]
    fn test_translate_moves_every_parameter() {
        let tri = RecognizedShape::triangle([pos2(0.0, 0.0), pos2(10.0, 0.0), pos2(5.0, 8.0)]);
        let moved = tri.translated(Vec2::new(3.0, -2.0));
        let vertices = moved.triangle_vertices().unwrap();
        assert!(approx(vertices[2], pos2(8.0, 6.0)));
        assert!(approx(moved.bounding_rect().min, pos2(3.0, -2.0)));
    }

    #[test]
    fn test_scale_line_about_midpoint() {
        let line = RecognizedShape::line(pos2(0.0, 0.0), pos2(10.0, 0.0));
        let (start, end) = line.scaled(2.0).line_endpoints().unwrap();
        assert!(approx(start, pos2(-5.0, 0.0)));
        assert!(approx(end, pos2(15.0, 0.0)));
    }

    #[test]
    fn test_scale_keeps_center() {
        let rect = Rect::from_min_size(pos2(10.0, 10.0), Vec2::new(40.0, 20.0));
        let scaled = RecognizedShape::rectangle(rect).scaled(1.5);
        assert!(approx(scaled.bounding_rect().center(), rect.center()));
        assert!((scaled.bounding_rect().width() - 60.0).abs() < 1e-3);
    }

    #[test]
    fn test_perfect_ellipse_and_square() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), Vec2::new(100.0, 60.0));
        let ellipse = RecognizedShape::circle(rect);
        assert!(ellipse.can_be_perfected());
        let circle = ellipse.perfected();
        assert_eq!(circle.kind(), ShapeKind::Circle);
        assert!((circle.bounding_rect().width() - 80.0).abs() < 1e-3);
        assert!((circle.bounding_rect().height() - 80.0).abs() < 1e-3);
        assert!(approx(circle.bounding_rect().center(), rect.center()));
        assert!(!circle.can_be_perfected());
    }

    #[test]
    fn test_perfect_line_snaps_to_fifteen_degrees() {
        let line = RecognizedShape::line(pos2(0.0, 0.0), pos2(100.0, 10.0));
        let (start, end) = line.perfected().line_endpoints().unwrap();
        assert_eq!(start, pos2(0.0, 0.0));
        // atan(0.1) is under 7.5 degrees so the line snaps flat
        assert!(end.y.abs() < 1e-3);
        assert!((end.x - (100.0f32.hypot(10.0))).abs() < 1e-3);
    }

    #[test]
    fn test_triangle_and_arc_are_not_perfectible() {
        let tri = RecognizedShape::triangle([pos2(0.0, 0.0), pos2(10.0, 0.0), pos2(5.0, 8.0)]);
        assert!(!tri.can_be_perfected());
        assert_eq!(tri.perfected(), tri);
    }

    #[test]
    fn test_outline_point_counts() {
        let rect = Rect::from_min_size(pos2(0.0, 0.0), Vec2::splat(10.0));
        assert_eq!(RecognizedShape::line(pos2(0.0, 0.0), pos2(1.0, 1.0)).outline_points().len(), 2);
        assert_eq!(RecognizedShape::rectangle(rect).outline_points().len(), 4 * RECTANGLE_EDGE_STEPS + 1);
        assert_eq!(RecognizedShape::circle(rect).outline_points().len(), ELLIPSE_SEGMENTS + 1);
        let tri = RecognizedShape::triangle([pos2(0.0, 0.0), pos2(10.0, 0.0), pos2(5.0, 8.0)]);
        let outline = tri.outline_points();
        assert_eq!(outline.len(), 3 * TRIANGLE_EDGE_STEPS + 1);
        assert!(approx(outline[0], *outline.last().unwrap()));
    }

    #[test]
    fn test_arc_direction() {
        // Quarter arc from angle 0 to PI/2: on screen that runs clockwise
        let arc = RecognizedShape::arc(pos2(0.0, 0.0), 10.0, 0.0, PI / 2.0, true);
        let outline = arc.outline_points();
        assert_eq!(outline.len(), ARC_SEGMENTS + 1);
        assert!(approx(outline[0], pos2(10.0, 0.0)));
        assert!(approx(outline[ARC_SEGMENTS], pos2(0.0, 10.0)));
        assert!(approx(outline[ARC_SEGMENTS / 2], pos2(0.0, 0.0) + Vec2::angled(PI / 4.0) * 10.0));

        // Same end points the other way round covers three quarters
        let long_way = RecognizedShape::arc(pos2(0.0, 0.0), 10.0, 0.0, PI / 2.0, false);
        let mid = long_way.outline_points()[ARC_SEGMENTS / 2];
        assert!(approx(mid, pos2(0.0, 0.0) + Vec2::angled(-3.0 * PI / 4.0) * 10.0));
        assert!(long_way.bounding_rect().width() > 19.0);
    }
}
