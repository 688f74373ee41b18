use crate::quickshape::{CancelReason, QuickShapeState};
use crate::shape::ShapeKind;

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeEvent {
    StateChanged {
        old: QuickShapeState,
        new: QuickShapeState,
    },
    /// The hold timer was armed or re-armed
    HoldTimerStarted,
    /// The raw stroke was replaced by a live preview
    ShapeSnapped {
        kind: ShapeKind,
    },
    ShapePerfected {
        kind: ShapeKind,
    },
    /// A clean stroke was appended to the drawing
    ShapeCommitted {
        kind: ShapeKind,
    },
    /// A pending shape was dropped without committing
    ShapeCancelled {
        reason: CancelReason,
        restored_raw_stroke: bool,
    },
}
