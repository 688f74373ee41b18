//! QuickShape: turn a wobbly stroke into a clean primitive while the pointer
//! is still down.
//!
//! The [`QuickShapeController`] watches the drawing surface for stroke growth,
//! arms a [`HoldTimer`] whenever the user is actively drawing, and runs the
//! recognizer once the user pauses. A recognized shape replaces the raw stroke
//! with a live preview; continued dragging moves or resizes it and lifting the
//! pointer commits it as a synthetic stroke.

mod adjust;
mod controller;
mod state;
mod timer;

pub use adjust::{Adjustment, MAX_SCALE, MIN_SCALE, adjust_shape, classify_drag};
pub use controller::{CancelReason, LiftOutcome, QuickShapeController};
pub use state::QuickShapeState;
pub use timer::HoldTimer;
