use egui::{Pos2, Slider, Ui};
use log::debug;

use crate::command::Command;
use crate::document::Document;
use crate::renderer::Renderer;
use crate::tools::Tool;

/// Removes whole strokes that the pointer passes over
#[derive(Debug, Clone)]
pub struct EraserTool {
    /// Extra reach around each stroke's own thickness
    pub tolerance: f32,
    erasing: bool,
}

impl Default for EraserTool {
    fn default() -> Self {
        Self {
            tolerance: 4.0,
            erasing: false,
        }
    }
}

impl EraserTool {
    /// The topmost stroke under `pos`, as a removal command
    fn erase_at(&self, pos: Pos2, doc: &Document) -> Option<Command> {
        let (index, stroke) = doc
            .strokes()
            .iter()
            .enumerate()
            .rev()
            .find(|(_, stroke)| stroke.hit_test(pos, self.tolerance))?;
        debug!("Erasing stroke {} at index {}", stroke.id(), index);
        Some(Command::RemoveStroke {
            index,
            stroke: stroke.clone(),
        })
    }

    pub fn current_state_name(&self) -> &'static str {
        if self.erasing { "Erasing" } else { "Ready" }
    }
}

impl Tool for EraserTool {
    fn name(&self) -> &'static str {
        "Eraser"
    }

    fn deactivate(&mut self, _doc: &mut Document) {
        self.erasing = false;
    }

    fn on_pointer_down(&mut self, pos: Pos2, doc: &mut Document, _now: f64) -> Option<Command> {
        self.erasing = true;
        self.erase_at(pos, doc)
    }

    fn on_pointer_move(&mut self, pos: Pos2, doc: &mut Document, _now: f64) -> Option<Command> {
        if !self.erasing {
            return None;
        }
        self.erase_at(pos, doc)
    }

    fn on_pointer_up(&mut self, _pos: Pos2, _doc: &mut Document, _now: f64) -> Option<Command> {
        self.erasing = false;
        None
    }

    fn update_preview(&mut self, renderer: &mut Renderer) {
        renderer.set_preview_shape(None);
    }

    fn clear_preview(&mut self, renderer: &mut Renderer) {
        renderer.set_preview_shape(None);
    }

    fn ui(&mut self, ui: &mut Ui, _doc: &Document) -> Option<Command> {
        ui.horizontal(|ui| {
            ui.label("Reach:");
            ui.add(Slider::new(&mut self.tolerance, 0.0..=20.0));
        });
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::Stroke;
    use egui::{Color32, pos2};

    fn doc_with_two_strokes() -> Document {
        let mut doc = Document::new();
        doc.execute(Command::AddStroke(Stroke::new_ref(
            Color32::BLACK,
            2.0,
            vec![pos2(0.0, 0.0), pos2(100.0, 0.0)],
        )));
        doc.execute(Command::AddStroke(Stroke::new_ref(
            Color32::RED,
            2.0,
            vec![pos2(50.0, -50.0), pos2(50.0, 50.0)],
        )));
        doc
    }

    #[test]
    fn test_erases_topmost_hit() {
        let mut doc = doc_with_two_strokes();
        let mut eraser = EraserTool::default();

        let command = eraser.on_pointer_down(pos2(50.0, 0.0), &mut doc, 0.0);
        match command {
            Some(Command::RemoveStroke { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected a removal, got {:?}", other),
        }
    }

    #[test]
    fn test_only_erases_while_pressed() {
        let mut doc = doc_with_two_strokes();
        let mut eraser = EraserTool::default();
        assert!(eraser.on_pointer_move(pos2(10.0, 0.0), &mut doc, 0.0).is_none());

        eraser.on_pointer_down(pos2(500.0, 500.0), &mut doc, 0.0);
        assert!(eraser.on_pointer_move(pos2(10.0, 1.0), &mut doc, 0.0).is_some());
        eraser.on_pointer_up(pos2(10.0, 1.0), &mut doc, 0.0);
        assert!(eraser.on_pointer_move(pos2(10.0, 0.0), &mut doc, 0.0).is_none());
    }

    #[test]
    fn test_removal_is_undoable() {
        let mut doc = doc_with_two_strokes();
        let mut eraser = EraserTool::default();
        let command = eraser.on_pointer_down(pos2(10.0, 0.0), &mut doc, 0.0).unwrap();
        doc.execute(command);
        assert_eq!(doc.strokes().len(), 1);
        doc.undo().unwrap();
        assert_eq!(doc.strokes().len(), 2);
        assert_eq!(doc.strokes()[0].color(), Color32::BLACK);
    }
}
