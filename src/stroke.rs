use egui::{Color32, Pos2, Rect};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::geometry;

/// Immutable stroke for sharing. Samples are plain locations in capture
/// order; pressure, tilt and timing are not tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    id: Uuid,
    points: Vec<Pos2>,
    color: Color32,
    thickness: f32,
}

// Define a reference-counted type alias for Stroke
pub type StrokeRef = Arc<Stroke>;

impl Stroke {
    // Create a new immutable stroke
    pub fn new(color: Color32, thickness: f32, points: Vec<Pos2>) -> Self {
        Self {
            id: Uuid::new_v4(),
            points,
            color,
            thickness,
        }
    }

    // Create a new reference-counted Stroke
    pub fn new_ref(color: Color32, thickness: f32, points: Vec<Pos2>) -> StrokeRef {
        Arc::new(Self::new(color, thickness, points))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn points(&self) -> &[Pos2] {
        &self.points
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn thickness(&self) -> f32 {
        self.thickness
    }

    /// Append a sample while the stroke is still being captured
    pub(crate) fn push_point(&mut self, point: Pos2) {
        self.points.push(point);
    }

    pub fn rect(&self) -> Rect {
        geometry::calculate_bounds(&self.points, self.thickness / 2.0)
    }

    /// True if `pos` lies within `tolerance` of the stroke's centre line
    pub fn hit_test(&self, pos: Pos2, tolerance: f32) -> bool {
        let reach = self.thickness / 2.0 + tolerance;
        match self.points.as_slice() {
            [] => false,
            [only] => only.distance(pos) <= reach,
            points => points
                .windows(2)
                .any(|w| geometry::distance_to_line_segment(pos, w[0], w[1]) <= reach),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    #[test]
    fn test_hit_test() {
        let stroke = Stroke::new(Color32::BLACK, 4.0, vec![pos2(0.0, 0.0), pos2(10.0, 0.0)]);
        assert!(stroke.hit_test(pos2(5.0, 2.0), 0.0));
        assert!(!stroke.hit_test(pos2(5.0, 3.0), 0.0));
        assert!(stroke.hit_test(pos2(5.0, 3.0), 1.5));
    }
}
