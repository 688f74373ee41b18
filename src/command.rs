use crate::document::Drawing;
use crate::error::CommandError;
use crate::stroke::StrokeRef;

/// Represents actions that can be undone/redone in the drawing application
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Appends a stroke to the drawing
    AddStroke(StrokeRef),
    /// Removes a stroke that sat at `index`
    RemoveStroke { index: usize, stroke: StrokeRef },
    /// Swaps the whole drawing between two snapshots
    ReplaceDrawing { before: Drawing, after: Drawing },
}

impl Command {
    pub fn execute(&self, drawing: &mut Drawing) {
        match self {
            Command::AddStroke(stroke) => drawing.push(stroke.clone()),
            Command::RemoveStroke { stroke, .. } => {
                drawing.remove(stroke);
            }
            Command::ReplaceDrawing { after, .. } => *drawing = after.clone(),
        }
    }

    pub fn undo(&self, drawing: &mut Drawing) {
        match self {
            Command::AddStroke(stroke) => {
                drawing.remove(stroke);
            }
            Command::RemoveStroke { index, stroke } => drawing.insert(*index, stroke.clone()),
            Command::ReplaceDrawing { before, .. } => *drawing = before.clone(),
        }
    }
}

/// Manages the history of executed commands for undo/redo functionality
#[derive(Debug, Default)]
pub struct CommandHistory {
    /// Stack of commands that can be undone
    undo_stack: Vec<Command>,
    /// Stack of commands that can be redone
    redo_stack: Vec<Command>,
}

impl CommandHistory {
    /// Creates a new empty command history
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute a command and add it to the history
    pub fn execute(&mut self, command: Command, drawing: &mut Drawing) {
        command.execute(drawing);
        self.record(command);
    }

    /// Add an already-applied command to the history
    pub fn record(&mut self, command: Command) {
        self.undo_stack.push(command);
        self.redo_stack.clear(); // Clear redo stack when new command is executed
    }

    /// Undo the last executed command
    pub fn undo(&mut self, drawing: &mut Drawing) -> Result<(), CommandError> {
        let command = self.undo_stack.pop().ok_or(CommandError::NothingToUndo)?;
        command.undo(drawing);
        self.redo_stack.push(command);
        Ok(())
    }

    /// Redo the last undone command
    pub fn redo(&mut self, drawing: &mut Drawing) -> Result<(), CommandError> {
        let command = self.redo_stack.pop().ok_or(CommandError::NothingToRedo)?;
        command.execute(drawing);
        self.undo_stack.push(command);
        Ok(())
    }

    /// Returns true if there are commands that can be undone
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there are commands that can be redone
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_stack(&self) -> &[Command] {
        &self.undo_stack
    }

    pub fn redo_stack(&self) -> &[Command] {
        &self.redo_stack
    }

    /// Clear the command history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stroke::Stroke;
    use egui::{Color32, pos2};

    #[test]
    fn test_add_undo_redo() {
        let stroke = Stroke::new_ref(Color32::BLACK, 2.0, vec![pos2(0.0, 0.0), pos2(1.0, 1.0)]);
        let mut drawing = Drawing::new();
        let mut history = CommandHistory::new();

        history.execute(Command::AddStroke(stroke.clone()), &mut drawing);
        assert_eq!(drawing.len(), 1);

        history.undo(&mut drawing).unwrap();
        assert!(drawing.is_empty());
        assert!(history.can_redo());

        history.redo(&mut drawing).unwrap();
        assert_eq!(drawing.strokes()[0].id(), stroke.id());
    }

    #[test]
    fn test_remove_restores_position() {
        let a = Stroke::new_ref(Color32::BLACK, 2.0, vec![pos2(0.0, 0.0)]);
        let b = Stroke::new_ref(Color32::BLACK, 2.0, vec![pos2(1.0, 1.0)]);
        let mut drawing = Drawing::from_strokes(vec![a.clone(), b.clone()]);
        let mut history = CommandHistory::new();

        history.execute(Command::RemoveStroke { index: 0, stroke: a.clone() }, &mut drawing);
        assert_eq!(drawing.len(), 1);
        history.undo(&mut drawing).unwrap();
        assert_eq!(drawing.strokes()[0].id(), a.id());
        assert_eq!(drawing.strokes()[1].id(), b.id());
    }

    #[test]
    fn test_empty_history_errors() {
        let mut drawing = Drawing::new();
        let mut history = CommandHistory::new();
        assert_eq!(history.undo(&mut drawing), Err(CommandError::NothingToUndo));
        assert_eq!(history.redo(&mut drawing), Err(CommandError::NothingToRedo));
    }

    #[test]
    fn test_new_command_clears_redo() {
        let stroke = Stroke::new_ref(Color32::BLACK, 2.0, vec![pos2(0.0, 0.0)]);
        let mut drawing = Drawing::new();
        let mut history = CommandHistory::new();
        history.execute(Command::AddStroke(stroke.clone()), &mut drawing);
        history.undo(&mut drawing).unwrap();
        history.execute(Command::AddStroke(stroke), &mut drawing);
        assert!(!history.can_redo());
    }
}
