use egui::Vec2;

use crate::shape::RecognizedShape;

/// Smallest scale a resize drag can produce
pub const MIN_SCALE: f32 = 0.5;
/// Largest scale a resize drag can produce
pub const MAX_SCALE: f32 = 3.0;

/// How a drag after snapping is interpreted
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Adjustment {
    Move(Vec2),
    /// Uniform scale about the shape's centre
    Resize(f32),
}

/// Drags shorter than `threshold` move the shape; anything at or beyond the
/// threshold resizes it, growing with the drag distance relative to the
/// shape's larger side.
pub fn classify_drag(shape: &RecognizedShape, drag: Vec2, threshold: f32) -> Adjustment {
    let distance = drag.length();
    if distance < threshold {
        return Adjustment::Move(drag);
    }

    let size = shape.bounding_rect().size().max_elem();
    let factor = 1.0 + distance / size.max(1.0);
    Adjustment::Resize(factor.clamp(MIN_SCALE, MAX_SCALE))
}

pub fn adjust_shape(shape: &RecognizedShape, drag: Vec2, threshold: f32) -> RecognizedShape {
    match classify_drag(shape, drag, threshold) {
        Adjustment::Move(delta) => shape.translated(delta),
        Adjustment::Resize(factor) => shape.scaled(factor),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Rect, pos2, vec2};

    fn square() -> RecognizedShape {
        RecognizedShape::rectangle(Rect::from_min_size(pos2(0.0, 0.0), vec2(100.0, 100.0)))
    }

    #[test]
    fn test_threshold_boundary() {
        // Just under the threshold moves
        assert!(matches!(classify_drag(&square(), vec2(0.0, 29.99), 30.0), Adjustment::Move(_)));
        // Exactly at the threshold resizes
        assert_eq!(classify_drag(&square(), vec2(18.0, 24.0), 30.0), Adjustment::Resize(1.3));
    }

    #[test]
    fn test_move_translates() {
        let moved = adjust_shape(&square(), vec2(5.0, -3.0), 30.0);
        assert_eq!(moved.bounding_rect().min, pos2(5.0, -3.0));
    }

    #[test]
    fn test_resize_is_clamped() {
        assert_eq!(classify_drag(&square(), vec2(1000.0, 0.0), 30.0), Adjustment::Resize(MAX_SCALE));
    }

    #[test]
    fn test_tiny_shape_uses_unit_size() {
        let line = RecognizedShape::line(pos2(0.0, 0.0), pos2(0.5, 0.0));
        assert_eq!(classify_drag(&line, vec2(30.0, 0.0), 30.0), Adjustment::Resize(MAX_SCALE));
    }
}
