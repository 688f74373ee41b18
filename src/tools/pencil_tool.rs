use egui::{Color32, Pos2, Slider, Ui};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::config::QuickShapeConfig;
use crate::document::{Document, DrawingSurface};
use crate::event::EventHandler;
use crate::quickshape::{CancelReason, LiftOutcome, QuickShapeController};
use crate::renderer::Renderer;
use crate::stroke::{Stroke, StrokeRef};
use crate::tools::Tool;

/// Persisted pencil options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PencilSettings {
    pub color: Color32,
    pub thickness: f32,
    /// Hold still after drawing to snap the stroke to a shape
    pub quickshape: bool,
}

impl Default for PencilSettings {
    fn default() -> Self {
        Self {
            color: Color32::BLACK,
            thickness: 2.0,
            quickshape: true,
        }
    }
}

/// Freehand pencil. While QuickShape is on, every change to the live stroke
/// is reported to the controller, which may swap the stroke for a shape.
#[derive(Debug, Default)]
pub struct PencilTool {
    settings: PencilSettings,
    controller: QuickShapeController,
    /// Index of the stroke the pointer is currently extending
    active_stroke: Option<usize>,
}

impl PencilTool {
    pub fn new(settings: PencilSettings, config: QuickShapeConfig) -> Self {
        Self {
            settings,
            controller: QuickShapeController::new(config),
            active_stroke: None,
        }
    }

    pub fn settings(&self) -> &PencilSettings {
        &self.settings
    }

    pub fn quickshape(&self) -> &QuickShapeController {
        &self.controller
    }

    pub fn set_quickshape_config(&mut self, config: QuickShapeConfig) {
        self.controller.set_config(config);
    }

    /// Route QuickShape feedback (snap, commit) to `handler`
    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        self.controller.subscribe(handler);
    }

    pub fn is_drawing(&self) -> bool {
        self.active_stroke.is_some()
    }

    pub fn current_state_name(&self) -> &'static str {
        if self.active_stroke.is_none() {
            "Ready"
        } else {
            self.controller.state().name()
        }
    }

    fn new_segment(&self, pos: Pos2) -> StrokeRef {
        Stroke::new_ref(self.settings.color, self.settings.thickness, vec![pos])
    }

    /// A raw stroke is live in the document but not yet in the history
    fn record_live_stroke(&self, doc: &mut Document) {
        if let Some(stroke) = doc.drawing().last().cloned() {
            doc.record(Command::AddStroke(stroke));
        }
    }
}

impl Tool for PencilTool {
    fn name(&self) -> &'static str {
        "Pencil"
    }

    fn activate(&mut self, _doc: &Document) {
        self.active_stroke = None;
    }

    fn deactivate(&mut self, doc: &mut Document) {
        if self.active_stroke.take().is_none() {
            return;
        }
        let had_shape = self.controller.state().has_pending_shape();
        self.controller.cancel(doc, CancelReason::ToolSwitch);
        if !had_shape {
            // Switched tools mid-stroke; keep what was drawn
            self.record_live_stroke(doc);
        }
    }

    fn on_pointer_down(&mut self, pos: Pos2, doc: &mut Document, now: f64) -> Option<Command> {
        if self.settings.quickshape {
            self.controller.on_pointer_down(doc);
        }
        self.active_stroke = Some(doc.begin_stroke(self.new_segment(pos)));
        if self.settings.quickshape {
            self.controller.on_drawing_changed(doc, now);
        }
        None
    }

    fn on_pointer_move(&mut self, pos: Pos2, doc: &mut Document, now: f64) -> Option<Command> {
        let index = self.active_stroke?;
        if !doc.extend_stroke(index, pos) {
            // The stroke was taken by QuickShape; keep feeding it fresh segments
            self.active_stroke = Some(doc.begin_stroke(self.new_segment(pos)));
        }
        if self.settings.quickshape {
            self.controller.on_drawing_changed(doc, now);
        }
        None
    }

    fn on_pointer_up(&mut self, _pos: Pos2, doc: &mut Document, _now: f64) -> Option<Command> {
        let index = self.active_stroke.take()?;
        if !self.settings.quickshape {
            return doc.detach_stroke(index).map(Command::AddStroke);
        }

        match self.controller.on_pointer_up(doc) {
            LiftOutcome::RawStroke => doc.detach_stroke(index).map(Command::AddStroke),
            // The controller already registered its own undo step
            LiftOutcome::Committed(kind) => {
                debug!("Pencil stroke became a {}", kind);
                None
            }
            LiftOutcome::Discarded => None,
        }
    }

    fn tick(&mut self, doc: &mut Document, now: f64) {
        if self.active_stroke.is_some() {
            self.controller.tick(doc, now);
        }
    }

    fn on_secondary_tap(&mut self) -> bool {
        self.controller.snap_to_perfect()
    }

    fn cancel(&mut self, doc: &mut Document, reason: CancelReason) -> bool {
        if !self.controller.cancel(doc, reason) {
            return false;
        }
        self.active_stroke = None;
        if reason == CancelReason::Undo {
            // The raw stroke is back; make it undoable on its own
            self.record_live_stroke(doc);
        }
        true
    }

    fn next_deadline(&self) -> Option<f64> {
        self.controller.timer_deadline()
    }

    fn update_preview(&mut self, renderer: &mut Renderer) {
        renderer.set_preview_shape(self.controller.preview().copied());
        renderer.set_preview_color(self.settings.color);
    }

    fn clear_preview(&mut self, renderer: &mut Renderer) {
        renderer.set_preview_shape(None);
    }

    fn ui(&mut self, ui: &mut Ui, _doc: &Document) -> Option<Command> {
        ui.horizontal(|ui| {
            ui.label("Color:");
            egui::color_picker::color_edit_button_srgba(
                ui,
                &mut self.settings.color,
                egui::color_picker::Alpha::Opaque,
            );
        });
        ui.horizontal(|ui| {
            ui.label("Thickness:");
            ui.add(Slider::new(&mut self.settings.thickness, 1.0..=30.0));
        });

        let was_enabled = self.settings.quickshape;
        ui.checkbox(&mut self.settings.quickshape, "QuickShape")
            .on_hover_text("Hold still at the end of a stroke to snap it to a shape");
        if was_enabled != self.settings.quickshape {
            info!("QuickShape {}", if self.settings.quickshape { "enabled" } else { "disabled" });
        }

        if self.controller.preview().is_some() {
            ui.label("Right-click to perfect, drag to adjust");
        }
        None
    }
}
