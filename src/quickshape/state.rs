use serde::{Deserialize, Serialize};
use std::fmt;

/// The QuickShape gesture state.
///
/// ```text
///  Idle ──stroke grows──► DrawingStroke ──hold + recognized──► ShapeSnapped(n)
///   ▲                        │                                   │
///   │                        │ lift / cancel                     │ count > n
///   │                        ▼                                   ▼
///   └────────────── lift (commit) / cancel ◄──────────────── AdjustingShape
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuickShapeState {
    #[default]
    Idle,
    /// A stroke is being drawn and the hold timer is watching it
    DrawingStroke,
    /// A shape replaced the raw stroke; `stroke_count` is the drawing's stroke
    /// count right after the raw stroke was stripped
    ShapeSnapped { stroke_count: usize },
    /// Continued dragging is moving or resizing the shape
    AdjustingShape,
}

impl QuickShapeState {
    /// Validates whether a transition to the new state is allowed
    pub fn can_transition_to(&self, next: &QuickShapeState) -> bool {
        match (self, next) {
            // Every state can be abandoned
            (_, QuickShapeState::Idle) => true,
            (QuickShapeState::Idle, QuickShapeState::DrawingStroke) => true,
            (QuickShapeState::DrawingStroke, QuickShapeState::ShapeSnapped { .. }) => true,
            (QuickShapeState::ShapeSnapped { .. }, QuickShapeState::AdjustingShape) => true,
            _ => false,
        }
    }

    /// True while a recognized shape is waiting to be committed
    pub fn has_pending_shape(&self) -> bool {
        matches!(self, Self::ShapeSnapped { .. } | Self::AdjustingShape)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::DrawingStroke => "DrawingStroke",
            Self::ShapeSnapped { .. } => "ShapeSnapped",
            Self::AdjustingShape => "AdjustingShape",
        }
    }
}

impl fmt::Display for QuickShapeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeSnapped { stroke_count } => write!(f, "ShapeSnapped({})", stroke_count),
            other => f.write_str(other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_cannot_skip_to_snapped() {
        let idle = QuickShapeState::Idle;
        assert!(!idle.can_transition_to(&QuickShapeState::ShapeSnapped { stroke_count: 1 }));
        assert!(!idle.can_transition_to(&QuickShapeState::AdjustingShape));
        assert!(idle.can_transition_to(&QuickShapeState::DrawingStroke));
    }

    #[test]
    fn test_forward_path() {
        let snapped = QuickShapeState::ShapeSnapped { stroke_count: 0 };
        assert!(QuickShapeState::DrawingStroke.can_transition_to(&snapped));
        assert!(snapped.can_transition_to(&QuickShapeState::AdjustingShape));
        assert!(!QuickShapeState::DrawingStroke.can_transition_to(&QuickShapeState::AdjustingShape));
        assert!(!QuickShapeState::AdjustingShape.can_transition_to(&snapped));
    }

    #[test]
    fn test_everything_returns_to_idle() {
        for state in [
            QuickShapeState::Idle,
            QuickShapeState::DrawingStroke,
            QuickShapeState::ShapeSnapped { stroke_count: 3 },
            QuickShapeState::AdjustingShape,
        ] {
            assert!(state.can_transition_to(&QuickShapeState::Idle));
        }
    }

    #[test]
    fn test_pending_and_display() {
        assert!(QuickShapeState::AdjustingShape.has_pending_shape());
        assert!(!QuickShapeState::DrawingStroke.has_pending_shape());
        assert_eq!(QuickShapeState::ShapeSnapped { stroke_count: 2 }.to_string(), "ShapeSnapped(2)");
    }
}
