use eframe::egui::{self, Color32, Painter, Rect, Shape};

use crate::shape::RecognizedShape;
use crate::stroke::StrokeRef;

const CANVAS_COLOR: Color32 = Color32::WHITE;
const PREVIEW_GUIDE_COLOR: Color32 = Color32::from_rgb(33, 150, 243);

/// Paints the committed strokes and, while QuickShape has a candidate, the
/// live shape preview on top of them.
#[derive(Debug)]
pub struct Renderer {
    ctx: egui::Context,
    preview_shape: Option<RecognizedShape>,
    preview_color: Color32,
    /// Thin outline of the preview's bounding box
    show_preview_bounds: bool,
}

impl Renderer {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        Self::with_context(cc.egui_ctx.clone())
    }

    pub fn with_context(ctx: egui::Context) -> Self {
        Self {
            ctx,
            preview_shape: None,
            preview_color: Color32::BLACK,
            show_preview_bounds: true,
        }
    }

    pub fn set_preview_shape(&mut self, shape: Option<RecognizedShape>) {
        if self.preview_shape != shape {
            self.preview_shape = shape;
            self.ctx.request_repaint();
        }
    }

    pub fn preview_shape(&self) -> Option<&RecognizedShape> {
        self.preview_shape.as_ref()
    }

    pub fn set_preview_color(&mut self, color: Color32) {
        self.preview_color = color;
    }

    pub fn set_show_preview_bounds(&mut self, show: bool) {
        self.show_preview_bounds = show;
    }

    /// Renders the canvas into `rect`
    pub fn render(&self, painter: &Painter, rect: Rect, strokes: &[StrokeRef]) {
        painter.rect_filled(rect, 0.0, CANVAS_COLOR);
        let painter = painter.with_clip_rect(rect);

        for stroke in strokes {
            painter.add(stroke_shape(stroke.points(), stroke.thickness(), stroke.color()));
        }

        if let Some(shape) = &self.preview_shape {
            self.render_preview(&painter, shape);
        }
    }

    fn render_preview(&self, painter: &Painter, shape: &RecognizedShape) {
        if self.show_preview_bounds {
            painter.rect_stroke(
                shape.bounding_rect(),
                0.0,
                egui::Stroke::new(1.0, PREVIEW_GUIDE_COLOR.gamma_multiply(0.5)),
            );
        }
        painter.add(stroke_shape(&shape.outline_points(), 2.0, self.preview_color));
    }
}

fn stroke_shape(points: &[egui::Pos2], thickness: f32, color: Color32) -> Shape {
    match points {
        [] => Shape::Noop,
        [only] => Shape::circle_filled(*only, thickness / 2.0, color),
        points => Shape::line(points.to_vec(), egui::Stroke::new(thickness, color)),
    }
}
