use egui::{Color32, Pos2};
use log::{debug, info, warn};

use super::adjust;
use super::state::QuickShapeState;
use super::timer::HoldTimer;
use crate::config::QuickShapeConfig;
use crate::document::{Drawing, DrawingSurface};
use crate::error::TransitionError;
use crate::event::{EventBus, EventHandler, ShapeEvent};
use crate::geometry::path_length;
use crate::recognizer::ShapeRecognizer;
use crate::shape::{RecognizedShape, ShapeKind};
use crate::stroke::Stroke;

const FALLBACK_COLOR: Color32 = Color32::BLACK;
const FALLBACK_THICKNESS: f32 = 2.0;

/// Why a pending shape is being abandoned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The user picked another tool; the candidate is dropped
    ToolSwitch,
    /// Undo while a shape is pending; the raw stroke comes back
    Undo,
    /// The surrounding UI asked for it
    Explicit,
}

/// What happened to the gesture when the pointer was lifted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiftOutcome {
    /// Nothing was recognized; the raw stroke stays as drawn
    RawStroke,
    /// A clean stroke of this kind was appended to the drawing
    Committed(ShapeKind),
    /// The candidate was degenerate and dropped
    Discarded,
}

/// Adjustment bookkeeping captured when continued dragging begins
#[derive(Debug, Clone)]
struct DragOrigin {
    start: Pos2,
    shape: RecognizedShape,
}

/// Drives QuickShape for one pointer gesture at a time.
///
/// The controller never owns strokes. It observes the surface after every
/// change, swaps whole drawing snapshots in and out, and keeps the candidate
/// shape to itself until commit.
#[derive(Debug)]
pub struct QuickShapeController {
    config: QuickShapeConfig,
    /// Config handed over mid-gesture, applied once the controller is idle
    pending_config: Option<QuickShapeConfig>,
    recognizer: ShapeRecognizer,
    state: QuickShapeState,
    timer: HoldTimer,
    /// Stroke count when the gesture started
    baseline_count: usize,
    /// Sample count of the active stroke at the last growth check
    last_point_count: usize,
    /// Stroke count right after the raw stroke was stripped
    snap_count: usize,
    candidate: Option<RecognizedShape>,
    drag_origin: Option<DragOrigin>,
    /// The drawing as it was just before the raw stroke was stripped
    drawing_before_recognition: Option<Drawing>,
    /// Style of the raw stroke, reused for the committed one
    style: (Color32, f32),
    events: EventBus,
}

impl Default for QuickShapeController {
    fn default() -> Self {
        Self::new(QuickShapeConfig::default())
    }
}

impl QuickShapeController {
    pub fn new(config: QuickShapeConfig) -> Self {
        Self {
            recognizer: ShapeRecognizer::new(config.recognizer.clone()),
            config,
            pending_config: None,
            state: QuickShapeState::Idle,
            timer: HoldTimer::new(),
            baseline_count: 0,
            last_point_count: 0,
            snap_count: 0,
            candidate: None,
            drag_origin: None,
            drawing_before_recognition: None,
            style: (FALLBACK_COLOR, FALLBACK_THICKNESS),
            events: EventBus::new(),
        }
    }

    pub fn config(&self) -> &QuickShapeConfig {
        &self.config
    }

    /// Swap in new tunables. During a gesture the change is held back and
    /// applied as soon as the controller returns to idle.
    pub fn set_config(&mut self, config: QuickShapeConfig) {
        if self.state != QuickShapeState::Idle {
            debug!("Deferring config change until the {} gesture ends", self.state);
            self.pending_config = Some(config);
            return;
        }
        self.pending_config = None;
        self.apply_config(config);
    }

    fn apply_config(&mut self, config: QuickShapeConfig) {
        self.recognizer = ShapeRecognizer::new(config.recognizer.clone());
        self.config = config;
    }

    pub fn state(&self) -> QuickShapeState {
        self.state
    }

    /// The shape currently shown in place of the raw stroke, if any
    pub fn preview(&self) -> Option<&RecognizedShape> {
        if self.state.has_pending_shape() {
            self.candidate.as_ref()
        } else {
            None
        }
    }

    pub fn is_timer_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// When the hold timer will fire, for scheduling a repaint
    pub fn timer_deadline(&self) -> Option<f64> {
        self.timer.deadline()
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.events.subscribe(handler);
    }

    /// A new gesture starts. A shape still pending from a missed lift is
    /// cancelled, leaving its raw stroke discarded.
    pub fn on_pointer_down(&mut self, surface: &mut dyn DrawingSurface) {
        self.cancel(surface, CancelReason::Explicit);
        self.baseline_count = surface.stroke_count();
        debug!("QuickShape gesture started with {} strokes", self.baseline_count);
    }

    /// Must be called after every change the pointer makes to the drawing
    pub fn on_drawing_changed(&mut self, surface: &mut dyn DrawingSurface, now: f64) {
        match self.state {
            QuickShapeState::Idle => self.begin_tracking(surface, now),
            QuickShapeState::DrawingStroke => self.check_growth(surface, now),
            QuickShapeState::ShapeSnapped { stroke_count } => {
                if surface.stroke_count() > stroke_count {
                    self.begin_adjusting(surface);
                }
            }
            QuickShapeState::AdjustingShape => self.update_adjustment(surface),
        }
    }

    /// Poll the hold timer. Recognition only ever runs from here.
    pub fn tick(&mut self, surface: &mut dyn DrawingSurface, now: f64) {
        if self.timer.fire_if_due(now) {
            self.on_hold_elapsed(surface);
        }
    }

    /// The pointer was lifted. Commits a pending shape; otherwise the drawing
    /// is left exactly as the user drew it.
    pub fn on_pointer_up(&mut self, surface: &mut dyn DrawingSurface) -> LiftOutcome {
        self.timer.cancel();
        if self.state.has_pending_shape() {
            return match self.commit(surface) {
                Some(kind) => LiftOutcome::Committed(kind),
                None => LiftOutcome::Discarded,
            };
        }
        self.reset();
        LiftOutcome::RawStroke
    }

    /// Commit the pending shape as a clean stroke. Returns its kind, or `None`
    /// if nothing was pending or the synthesized stroke was degenerate.
    pub fn commit(&mut self, surface: &mut dyn DrawingSurface) -> Option<ShapeKind> {
        self.timer.cancel();
        if !self.state.has_pending_shape() {
            return None;
        }

        let Some(shape) = self.candidate.take() else {
            self.reset();
            return None;
        };

        let mut before = surface.drawing().clone();
        before.truncate(self.snap_count);

        let points = shape.outline_points();
        if points.len() < 2 {
            debug!("Dropping degenerate {} with {} points", shape.kind(), points.len());
            surface.replace_drawing(before);
            self.reset();
            return None;
        }

        let (color, thickness) = self.style;
        let after = before.with_stroke(Stroke::new_ref(color, thickness, points));
        surface.replace_drawing(after.clone());
        surface.register_undo(before, after);

        let kind = shape.kind();
        info!("Committed {}", kind);
        self.events.emit(ShapeEvent::ShapeCommitted { kind });
        self.reset();
        Some(kind)
    }

    /// Abandon the gesture. Returns true if a pending shape was dropped.
    ///
    /// Undo brings back the raw stroke as it was before recognition. Any
    /// other reason leaves the raw stroke discarded.
    pub fn cancel(&mut self, surface: &mut dyn DrawingSurface, reason: CancelReason) -> bool {
        self.timer.cancel();
        if !self.state.has_pending_shape() {
            self.reset();
            return false;
        }

        let restored_raw_stroke = match (reason, self.drawing_before_recognition.take()) {
            (CancelReason::Undo, Some(saved)) => {
                surface.replace_drawing(saved);
                true
            }
            _ => {
                self.strip_tracking_segments(surface);
                false
            }
        };

        info!("Cancelled pending shape ({:?}, restored: {})", reason, restored_raw_stroke);
        self.events.emit(ShapeEvent::ShapeCancelled { reason, restored_raw_stroke });
        self.reset();
        true
    }

    /// Replace the candidate with its idealized form. Only available while
    /// the shape is snapped and not being dragged.
    pub fn snap_to_perfect(&mut self) -> bool {
        if !matches!(self.state, QuickShapeState::ShapeSnapped { .. }) {
            return false;
        }
        let Some(shape) = self.candidate.as_mut() else {
            return false;
        };
        if !shape.can_be_perfected() {
            return false;
        }

        *shape = shape.perfected();
        let kind = shape.kind();
        info!("Perfected {}", kind);
        self.events.emit(ShapeEvent::ShapePerfected { kind });
        true
    }

    fn begin_tracking(&mut self, surface: &dyn DrawingSurface, now: f64) {
        if surface.stroke_count() <= self.baseline_count {
            return;
        }
        if let Err(err) = self.transition_to(QuickShapeState::DrawingStroke) {
            warn!("{}", err);
            return;
        }
        self.baseline_count = surface.stroke_count();
        self.last_point_count = surface.drawing().last().map_or(0, |s| s.points().len());
        self.start_timer(now);
    }

    /// Re-arm the hold timer while the stroke keeps growing noticeably
    fn check_growth(&mut self, surface: &dyn DrawingSurface, now: f64) {
        if surface.stroke_count() != self.baseline_count {
            return;
        }
        let Some(stroke) = surface.drawing().last() else {
            return;
        };

        let points = stroke.points();
        if points.len() < self.last_point_count + self.config.growth_point_step {
            return;
        }

        let added = &points[self.last_point_count.saturating_sub(1)..];
        if path_length(added) > self.config.growth_min_length {
            self.last_point_count = points.len();
            self.start_timer(now);
        }
    }

    fn on_hold_elapsed(&mut self, surface: &mut dyn DrawingSurface) {
        if self.state != QuickShapeState::DrawingStroke {
            return;
        }

        let drawing = surface.drawing();
        let Some(stroke) = drawing.last() else {
            return;
        };
        if stroke.points().len() < self.config.min_recognition_points {
            debug!("Hold elapsed with only {} points", stroke.points().len());
            return;
        }
        let Some(shape) = self.recognizer.recognize(stroke.points()) else {
            debug!("Hold elapsed, no shape recognized");
            return;
        };

        let before = drawing.clone();
        let mut stripped = before.clone();
        stripped.pop();
        let stroke_count = stripped.len();

        if let Err(err) = self.transition_to(QuickShapeState::ShapeSnapped { stroke_count }) {
            warn!("{}", err);
            return;
        }

        self.style = (stroke.color(), stroke.thickness());
        surface.replace_drawing(stripped);
        self.drawing_before_recognition = Some(before);
        self.snap_count = stroke_count;

        let kind = shape.kind();
        self.candidate = Some(shape);
        info!("Snapped to {}", kind);
        self.events.emit(ShapeEvent::ShapeSnapped { kind });
    }

    fn begin_adjusting(&mut self, surface: &mut dyn DrawingSurface) {
        let Some(shape) = self.candidate.clone() else {
            return;
        };
        let Some(start) = surface.drawing().last().and_then(|s| s.points().first().copied()) else {
            return;
        };
        if let Err(err) = self.transition_to(QuickShapeState::AdjustingShape) {
            warn!("{}", err);
            return;
        }

        self.drag_origin = Some(DragOrigin { start, shape });
        self.update_adjustment(surface);
    }

    fn update_adjustment(&mut self, surface: &mut dyn DrawingSurface) {
        if surface.stroke_count() <= self.snap_count {
            return;
        }
        let Some(origin) = &self.drag_origin else {
            return;
        };
        let Some(current) = surface.drawing().last().and_then(|s| s.points().last().copied()) else {
            return;
        };

        let drag = current - origin.start;
        self.candidate = Some(adjust::adjust_shape(
            &origin.shape,
            drag,
            self.config.move_resize_threshold,
        ));
        self.strip_tracking_segments(surface);
    }

    /// Drop any strokes that accumulated past the snap count
    fn strip_tracking_segments(&self, surface: &mut dyn DrawingSurface) {
        if surface.stroke_count() > self.snap_count {
            let mut drawing = surface.drawing().clone();
            drawing.truncate(self.snap_count);
            surface.replace_drawing(drawing);
        }
    }

    fn start_timer(&mut self, now: f64) {
        self.timer.start(now, self.config.hold_duration_secs);
        debug!("Hold timer armed until {:.3}", now + self.config.hold_duration_secs);
        self.events.emit(ShapeEvent::HoldTimerStarted);
    }

    fn transition_to(&mut self, new_state: QuickShapeState) -> Result<(), TransitionError> {
        if !self.state.can_transition_to(&new_state) {
            return Err(TransitionError::InvalidStateTransition {
                from: self.state.to_string(),
                to: new_state.to_string(),
            });
        }

        let old = std::mem::replace(&mut self.state, new_state);
        debug!("QuickShape state: {} -> {}", old, new_state);
        self.events.emit(ShapeEvent::StateChanged { old, new: new_state });
        Ok(())
    }

    fn reset(&mut self) {
        self.timer.cancel();
        self.candidate = None;
        self.drag_origin = None;
        self.drawing_before_recognition = None;
        self.snap_count = 0;
        self.last_point_count = 0;
        self.style = (FALLBACK_COLOR, FALLBACK_THICKNESS);
        if self.state != QuickShapeState::Idle {
            // Idle is reachable from every state
            let _ = self.transition_to(QuickShapeState::Idle);
        }
        if let Some(config) = self.pending_config.take() {
            debug!("Applying deferred config change");
            self.apply_config(config);
        }
    }
}
