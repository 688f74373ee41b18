use egui::Pos2;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::command::{Command, CommandHistory};
use crate::error::CommandError;
use crate::stroke::StrokeRef;

/// An immutable-by-convention snapshot of every stroke on the canvas.
///
/// Strokes are shared through `Arc`, so cloning a snapshot for undo is cheap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    strokes: Vec<StrokeRef>,
}

impl Drawing {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_strokes(strokes: Vec<StrokeRef>) -> Self {
        Self { strokes }
    }

    pub fn strokes(&self) -> &[StrokeRef] {
        &self.strokes
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    pub fn last(&self) -> Option<&StrokeRef> {
        self.strokes.last()
    }

    pub fn push(&mut self, stroke: StrokeRef) {
        self.strokes.push(stroke);
    }

    pub fn pop(&mut self) -> Option<StrokeRef> {
        self.strokes.pop()
    }

    pub fn insert(&mut self, index: usize, stroke: StrokeRef) {
        let index = index.min(self.strokes.len());
        self.strokes.insert(index, stroke);
    }

    /// Remove a stroke by identity, returning its former index
    pub fn remove(&mut self, stroke: &StrokeRef) -> Option<usize> {
        let index = self.strokes.iter().position(|s| s.id() == stroke.id())?;
        self.strokes.remove(index);
        Some(index)
    }

    pub fn remove_at(&mut self, index: usize) -> Option<StrokeRef> {
        (index < self.strokes.len()).then(|| self.strokes.remove(index))
    }

    /// Keep only the first `len` strokes
    pub fn truncate(&mut self, len: usize) {
        self.strokes.truncate(len);
    }

    /// A copy of this drawing with `stroke` appended
    pub fn with_stroke(&self, stroke: StrokeRef) -> Self {
        let mut next = self.clone();
        next.push(stroke);
        next
    }

    /// Append a sample to the stroke at `index`. Returns false if there is no
    /// such stroke (for instance because it was stripped from the drawing).
    pub fn extend_stroke(&mut self, index: usize, point: Pos2) -> bool {
        match self.strokes.get_mut(index) {
            Some(stroke) => {
                Arc::make_mut(stroke).push_point(point);
                true
            }
            None => false,
        }
    }
}

/// The drawing surface the QuickShape controller talks to.
///
/// The surface owns the committed strokes; the controller only ever swaps in
/// whole snapshots and asks for undo checkpoints.
pub trait DrawingSurface {
    fn drawing(&self) -> &Drawing;

    /// Replace the visible drawing without recording an undo step
    fn replace_drawing(&mut self, drawing: Drawing);

    /// Record that the drawing changed from `before` to `after`
    fn register_undo(&mut self, before: Drawing, after: Drawing);

    fn stroke_count(&self) -> usize {
        self.drawing().len()
    }
}

/// The canvas document: the current drawing plus its undo history
#[derive(Debug, Default)]
pub struct Document {
    drawing: Drawing,
    history: CommandHistory,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strokes(&self) -> &[StrokeRef] {
        self.drawing.strokes()
    }

    /// Start capturing a stroke, returning its index in the drawing
    pub fn begin_stroke(&mut self, stroke: StrokeRef) -> usize {
        self.drawing.push(stroke);
        self.drawing.len() - 1
    }

    pub fn extend_stroke(&mut self, index: usize, point: Pos2) -> bool {
        self.drawing.extend_stroke(index, point)
    }

    /// Take a live stroke back out of the drawing so it can be re-added
    /// through an undoable command
    pub fn detach_stroke(&mut self, index: usize) -> Option<StrokeRef> {
        self.drawing.remove_at(index)
    }

    /// Apply a command to the drawing and record it for undo
    pub fn execute(&mut self, command: Command) {
        self.history.execute(command, &mut self.drawing);
    }

    /// Record a command whose effect is already visible in the drawing
    pub fn record(&mut self, command: Command) {
        self.history.record(command);
    }

    pub fn undo(&mut self) -> Result<(), CommandError> {
        self.history.undo(&mut self.drawing)
    }

    pub fn redo(&mut self) -> Result<(), CommandError> {
        self.history.redo(&mut self.drawing)
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }
}

impl DrawingSurface for Document {
    fn drawing(&self) -> &Drawing {
        &self.drawing
    }

    fn replace_drawing(&mut self, drawing: Drawing) {
        self.drawing = drawing;
    }

    fn register_undo(&mut self, before: Drawing, after: Drawing) {
        self.history.record(Command::ReplaceDrawing { before, after });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::Stroke;
    use egui::{Color32, pos2};

    fn stroke(x: f32) -> StrokeRef {
        Stroke::new_ref(Color32::BLACK, 2.0, vec![pos2(x, 0.0), pos2(x, 10.0)])
    }

    #[test]
    fn test_extend_stroke() {
        let mut doc = Document::new();
        let index = doc.begin_stroke(stroke(0.0));
        assert!(doc.extend_stroke(index, pos2(5.0, 5.0)));
        assert_eq!(doc.strokes()[index].points().len(), 3);
        assert!(!doc.extend_stroke(index + 1, pos2(5.0, 5.0)));
    }

    #[test]
    fn test_extend_does_not_touch_snapshots() {
        let mut doc = Document::new();
        let index = doc.begin_stroke(stroke(0.0));
        let snapshot = doc.drawing().clone();
        doc.extend_stroke(index, pos2(5.0, 5.0));
        assert_eq!(snapshot.strokes()[0].points().len(), 2);
        assert_eq!(doc.strokes()[0].points().len(), 3);
    }

    #[test]
    fn test_register_undo_restores_before() {
        let mut doc = Document::new();
        doc.execute(Command::AddStroke(stroke(0.0)));

        let before = doc.drawing().clone();
        let after = before.with_stroke(stroke(1.0));
        doc.replace_drawing(after.clone());
        doc.register_undo(before.clone(), after.clone());

        doc.undo().unwrap();
        assert_eq!(doc.drawing(), &before);
        doc.redo().unwrap();
        assert_eq!(doc.drawing(), &after);
    }

    #[test]
    fn test_remove_by_identity() {
        let a = stroke(0.0);
        let b = stroke(1.0);
        let mut drawing = Drawing::from_strokes(vec![a.clone(), b.clone()]);
        assert_eq!(drawing.remove(&b), Some(1));
        assert_eq!(drawing.remove(&b), None);
        assert_eq!(drawing.len(), 1);
    }
}
