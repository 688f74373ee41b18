#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod command;
pub mod config;
pub mod document;
pub mod error;
pub mod event;
pub mod geometry;
pub mod input;
pub mod quickshape;
pub mod recognizer;
pub mod renderer;
pub mod shape;
pub mod stroke;
pub mod tools;

pub use app::QuickShapeApp;
pub use command::{Command, CommandHistory};
pub use config::QuickShapeConfig;
pub use document::{Document, Drawing, DrawingSurface};
pub use error::{CommandError, ConfigError, TransitionError};
pub use event::{EventBus, EventHandler, ShapeEvent};
pub use input::{InputEvent, InputLocation};
pub use quickshape::{CancelReason, LiftOutcome, QuickShapeController, QuickShapeState};
pub use recognizer::{RecognizerConfig, ShapeRecognizer, recognize};
pub use renderer::Renderer;
pub use shape::{RecognizedShape, ShapeGeometry, ShapeKind};
pub use stroke::{Stroke, StrokeRef};
pub use tools::{Tool, ToolType};
