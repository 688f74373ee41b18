use egui::{Pos2, Ui};

use crate::command::Command;
use crate::document::Document;
use crate::quickshape::CancelReason;
use crate::renderer::Renderer;

/// Tool trait defines the interface for all drawing tools
pub trait Tool {
    /// Return the name of the tool
    fn name(&self) -> &'static str;

    /// Called when the tool is selected (activated).
    fn activate(&mut self, _doc: &Document) {}

    /// Called when the tool is deselected. Anything in flight must be
    /// settled so the document is left consistent.
    fn deactivate(&mut self, doc: &mut Document);

    /// Handle pointer press on the canvas.
    /// Return a Command for the app to execute, or None.
    fn on_pointer_down(&mut self, pos: Pos2, doc: &mut Document, now: f64) -> Option<Command>;

    /// Handle pointer drag while the pointer is held down.
    fn on_pointer_move(&mut self, pos: Pos2, doc: &mut Document, now: f64) -> Option<Command>;

    /// Handle pointer release. Return a Command to finalize the action.
    fn on_pointer_up(&mut self, pos: Pos2, doc: &mut Document, now: f64) -> Option<Command>;

    /// Called once per frame so time-based behaviour can run
    fn tick(&mut self, _doc: &mut Document, _now: f64) {}

    /// A secondary input arrived while the primary one is down
    fn on_secondary_tap(&mut self) -> bool {
        false
    }

    /// Abandon pending work. Returns true if something was cancelled.
    fn cancel(&mut self, _doc: &mut Document, _reason: CancelReason) -> bool {
        false
    }

    /// When the tool next needs a tick, if ever
    fn next_deadline(&self) -> Option<f64> {
        None
    }

    /// Update any preview rendering for the tool's current state
    fn update_preview(&mut self, renderer: &mut Renderer);

    /// Clear any preview rendering
    fn clear_preview(&mut self, renderer: &mut Renderer);

    /// Show tool-specific controls in the tool panel.
    fn ui(&mut self, ui: &mut Ui, doc: &Document) -> Option<Command>;
}

mod eraser_tool;
pub use eraser_tool::EraserTool;

mod pencil_tool;
pub use pencil_tool::{PencilSettings, PencilTool};

/// Enum representing all available tool types
#[derive(Debug)]
pub enum ToolType {
    Pencil(PencilTool),
    Eraser(EraserTool),
}

impl Tool for ToolType {
    fn name(&self) -> &'static str {
        match self {
            Self::Pencil(tool) => tool.name(),
            Self::Eraser(tool) => tool.name(),
        }
    }

    fn activate(&mut self, doc: &Document) {
        match self {
            Self::Pencil(tool) => tool.activate(doc),
            Self::Eraser(tool) => tool.activate(doc),
        }
    }

    fn deactivate(&mut self, doc: &mut Document) {
        match self {
            Self::Pencil(tool) => tool.deactivate(doc),
            Self::Eraser(tool) => tool.deactivate(doc),
        }
    }

    fn on_pointer_down(&mut self, pos: Pos2, doc: &mut Document, now: f64) -> Option<Command> {
        match self {
            Self::Pencil(tool) => tool.on_pointer_down(pos, doc, now),
            Self::Eraser(tool) => tool.on_pointer_down(pos, doc, now),
        }
    }

    fn on_pointer_move(&mut self, pos: Pos2, doc: &mut Document, now: f64) -> Option<Command> {
        match self {
            Self::Pencil(tool) => tool.on_pointer_move(pos, doc, now),
            Self::Eraser(tool) => tool.on_pointer_move(pos, doc, now),
        }
    }

    fn on_pointer_up(&mut self, pos: Pos2, doc: &mut Document, now: f64) -> Option<Command> {
        match self {
            Self::Pencil(tool) => tool.on_pointer_up(pos, doc, now),
            Self::Eraser(tool) => tool.on_pointer_up(pos, doc, now),
        }
    }

    fn tick(&mut self, doc: &mut Document, now: f64) {
        match self {
            Self::Pencil(tool) => tool.tick(doc, now),
            Self::Eraser(tool) => tool.tick(doc, now),
        }
    }

    fn on_secondary_tap(&mut self) -> bool {
        match self {
            Self::Pencil(tool) => tool.on_secondary_tap(),
            Self::Eraser(tool) => tool.on_secondary_tap(),
        }
    }

    fn cancel(&mut self, doc: &mut Document, reason: CancelReason) -> bool {
        match self {
            Self::Pencil(tool) => tool.cancel(doc, reason),
            Self::Eraser(tool) => tool.cancel(doc, reason),
        }
    }

    fn next_deadline(&self) -> Option<f64> {
        match self {
            Self::Pencil(tool) => tool.next_deadline(),
            Self::Eraser(tool) => tool.next_deadline(),
        }
    }

    fn update_preview(&mut self, renderer: &mut Renderer) {
        match self {
            Self::Pencil(tool) => tool.update_preview(renderer),
            Self::Eraser(tool) => tool.update_preview(renderer),
        }
    }

    fn clear_preview(&mut self, renderer: &mut Renderer) {
        match self {
            Self::Pencil(tool) => tool.clear_preview(renderer),
            Self::Eraser(tool) => tool.clear_preview(renderer),
        }
    }

    fn ui(&mut self, ui: &mut Ui, doc: &Document) -> Option<Command> {
        match self {
            Self::Pencil(tool) => tool.ui(ui, doc),
            Self::Eraser(tool) => tool.ui(ui, doc),
        }
    }
}

impl ToolType {
    pub fn as_pencil(&self) -> Option<&PencilTool> {
        match self {
            Self::Pencil(tool) => Some(tool),
            _ => None,
        }
    }

    pub fn as_pencil_mut(&mut self) -> Option<&mut PencilTool> {
        match self {
            Self::Pencil(tool) => Some(tool),
            _ => None,
        }
    }

    pub fn current_state_name(&self) -> &'static str {
        match self {
            Self::Pencil(tool) => tool.current_state_name(),
            Self::Eraser(tool) => tool.current_state_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_names() {
        assert_eq!(ToolType::Pencil(PencilTool::default()).name(), "Pencil");
        assert_eq!(ToolType::Eraser(EraserTool::default()).name(), "Eraser");
    }

    #[test]
    fn test_only_pencil_has_quickshape() {
        let mut pencil = ToolType::Pencil(PencilTool::default());
        let mut eraser = ToolType::Eraser(EraserTool::default());
        assert!(pencil.as_pencil().is_some());
        assert!(eraser.as_pencil_mut().is_none());

        let mut doc = Document::new();
        assert!(!eraser.cancel(&mut doc, CancelReason::Undo));
        assert!(!pencil.cancel(&mut doc, CancelReason::Undo));
        assert_eq!(pencil.current_state_name(), "Ready");
        assert!(eraser.next_deadline().is_none());
    }
}
