use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use egui::{Key, PointerButton, Pos2};
use log::{debug, info, warn};

use crate::config::QuickShapeConfig;
use crate::document::{Document, Drawing, DrawingSurface};
use crate::event::ShapeEvent;
use crate::input::{InputEvent, InputHandler};
use crate::quickshape::CancelReason;
use crate::renderer::Renderer;
use crate::tools::{EraserTool, PencilSettings, PencilTool, Tool, ToolType};

/// Everything persisted between runs.
/// We derive Deserialize/Serialize so we can persist app state on shutdown.
#[derive(serde::Deserialize, serde::Serialize, Debug, Default)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
pub struct AppSettings {
    pub quickshape: QuickShapeConfig,
    pub pencil: PencilSettings,
    pub drawing: Drawing,
}

pub struct QuickShapeApp {
    renderer: Option<Renderer>,
    document: Document,
    tools: Vec<ToolType>,
    active_tool: usize,
    input_handler: InputHandler,
    /// Whether the active tool saw the current primary press
    pointer_active: bool,
    quickshape_config: QuickShapeConfig,
    /// Last QuickShape feedback, shown in the side panel
    status: Rc<RefCell<String>>,
}

impl Default for QuickShapeApp {
    fn default() -> Self {
        Self::from_settings(AppSettings::default(), None)
    }
}

impl QuickShapeApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings: AppSettings = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();

        let settings = match settings.quickshape.validate() {
            Ok(()) => settings,
            Err(err) => {
                warn!("Discarding stored QuickShape config: {}", err);
                AppSettings {
                    quickshape: QuickShapeConfig::default(),
                    ..settings
                }
            }
        };

        Self::from_settings(settings, Some(Renderer::new(cc)))
    }

    pub fn from_settings(settings: AppSettings, renderer: Option<Renderer>) -> Self {
        let pencil = PencilTool::new(settings.pencil, settings.quickshape.clone());
        let status = Rc::new(RefCell::new(String::new()));
        {
            let status = Rc::clone(&status);
            pencil.subscribe(Box::new(move |event: &ShapeEvent| {
                if let Some(message) = feedback_message(event) {
                    *status.borrow_mut() = message;
                }
            }));
        }

        let mut document = Document::new();
        document.replace_drawing(settings.drawing);

        Self {
            renderer,
            document,
            tools: vec![ToolType::Pencil(pencil), ToolType::Eraser(EraserTool::default())],
            active_tool: 0,
            input_handler: InputHandler::default(),
            pointer_active: false,
            quickshape_config: settings.quickshape,
            status,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn active_tool(&self) -> &ToolType {
        &self.tools[self.active_tool]
    }

    pub fn available_tools(&self) -> &[ToolType] {
        &self.tools
    }

    pub fn status(&self) -> String {
        self.status.borrow().clone()
    }

    fn pencil(&self) -> Option<&PencilTool> {
        self.tools.iter().find_map(ToolType::as_pencil)
    }

    pub fn set_active_tool_by_name(&mut self, name: &str) {
        let Some(index) = self.tools.iter().position(|tool| tool.name() == name) else {
            warn!("Unknown tool: {}", name);
            return;
        };
        if index == self.active_tool {
            return;
        }

        self.tools[self.active_tool].deactivate(&mut self.document);
        if let Some(renderer) = &mut self.renderer {
            self.tools[self.active_tool].clear_preview(renderer);
        }
        self.active_tool = index;
        self.pointer_active = false;
        self.tools[index].activate(&self.document);
        info!("Switched to {} tool", name);
    }

    /// Undo while a shape is pending brings the raw stroke back instead of
    /// popping the history
    pub fn undo(&mut self) {
        if self.tools[self.active_tool].cancel(&mut self.document, CancelReason::Undo) {
            self.pointer_active = false;
            return;
        }
        if let Err(err) = self.document.undo() {
            debug!("{}", err);
        }
    }

    pub fn redo(&mut self) {
        if let Err(err) = self.document.redo() {
            debug!("{}", err);
        }
    }

    pub fn cancel_pending(&mut self) {
        if self.tools[self.active_tool].cancel(&mut self.document, CancelReason::Explicit) {
            self.pointer_active = false;
        }
    }

    pub fn clear_canvas(&mut self) {
        self.cancel_pending();
        let before = self.document.drawing().clone();
        if before.is_empty() {
            return;
        }
        self.document.replace_drawing(Drawing::new());
        self.document.register_undo(before, Drawing::new());
    }

    pub fn set_quickshape_config(&mut self, config: QuickShapeConfig) {
        if let Err(err) = config.validate() {
            warn!("Rejected QuickShape config: {}", err);
            return;
        }
        for tool in &mut self.tools {
            if let Some(pencil) = tool.as_pencil_mut() {
                pencil.set_quickshape_config(config.clone());
            }
        }
        self.quickshape_config = config;
    }

    pub fn handle_input_event(&mut self, event: InputEvent, now: f64) {
        match event {
            InputEvent::PointerDown {
                location,
                button: PointerButton::Primary,
            } if location.is_in_canvas => {
                self.pointer_active = true;
                self.pointer_down(location.position, now);
            }
            InputEvent::PointerMove { location, held_buttons }
                if self.pointer_active && held_buttons.contains(&PointerButton::Primary) =>
            {
                let tool = &mut self.tools[self.active_tool];
                if let Some(command) = tool.on_pointer_move(location.position, &mut self.document, now) {
                    self.document.execute(command);
                }
            }
            InputEvent::PointerUp {
                location,
                button: PointerButton::Primary,
            } if self.pointer_active => self.pointer_up(location.position, now),
            InputEvent::PointerLeave { last_known_location } if self.pointer_active => {
                self.pointer_up(last_known_location.position, now)
            }
            InputEvent::SecondaryTap { .. } if self.pointer_active => {
                if self.tools[self.active_tool].on_secondary_tap() {
                    debug!("Secondary tap perfected the pending shape");
                }
            }
            InputEvent::KeyDown { key, modifiers } => match key {
                Key::Z if modifiers.command && modifiers.shift => self.redo(),
                Key::Z if modifiers.command => self.undo(),
                Key::Escape => self.cancel_pending(),
                _ => {}
            },
            _ => {}
        }
    }

    fn pointer_down(&mut self, pos: Pos2, now: f64) {
        let tool = &mut self.tools[self.active_tool];
        if let Some(command) = tool.on_pointer_down(pos, &mut self.document, now) {
            self.document.execute(command);
        }
    }

    fn pointer_up(&mut self, pos: Pos2, now: f64) {
        self.pointer_active = false;
        let tool = &mut self.tools[self.active_tool];
        if let Some(command) = tool.on_pointer_up(pos, &mut self.document, now) {
            self.document.execute(command);
        }
    }

    /// Run timers and schedule the next repaint they need
    pub fn tick(&mut self, ctx: &egui::Context, now: f64) {
        let tool = &mut self.tools[self.active_tool];
        tool.tick(&mut self.document, now);
        if let Some(deadline) = tool.next_deadline() {
            ctx.request_repaint_after(Duration::from_secs_f64((deadline - now).max(0.0)));
        }
    }

    fn tools_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("tools_panel")
            .resizable(true)
            .default_width(200.0)
            .show(ctx, |ui| {
                ui.heading("Tools");

                let active_name = self.active_tool().name();
                let tool_names: Vec<&'static str> = self.tools.iter().map(|tool| tool.name()).collect();
                for name in tool_names {
                    if ui.selectable_label(active_name == name, name).clicked() {
                        self.set_active_tool_by_name(name);
                    }
                }
                ui.separator();

                let tool = &mut self.tools[self.active_tool];
                if let Some(command) = tool.ui(ui, &self.document) {
                    self.document.execute(command);
                }
                ui.separator();

                ui.horizontal(|ui| {
                    let can_undo = self.document.history().can_undo();
                    let can_redo = self.document.history().can_redo();
                    if ui.add_enabled(can_undo, egui::Button::new("Undo")).clicked() {
                        self.undo();
                    }
                    if ui.add_enabled(can_redo, egui::Button::new("Redo")).clicked() {
                        self.redo();
                    }
                });
                if ui.button("Clear").clicked() {
                    self.clear_canvas();
                }
                ui.separator();

                self.quickshape_settings(ui);
                ui.separator();

                ui.label(format!("State: {}", self.active_tool().current_state_name()));
                ui.label(format!("Strokes: {}", self.document.strokes().len()));
                let status = self.status();
                if !status.is_empty() {
                    ui.label(status);
                }
            });
    }

    fn quickshape_settings(&mut self, ui: &mut egui::Ui) {
        let mut config = self.quickshape_config.clone();
        egui::CollapsingHeader::new("QuickShape").show(ui, |ui| {
            ui.add(egui::Slider::new(&mut config.hold_duration_secs, 0.1..=2.0).text("Hold (s)"));
            ui.add(egui::Slider::new(&mut config.move_resize_threshold, 5.0..=100.0).text("Resize after"));
            if ui.button("Reset").clicked() {
                config = QuickShapeConfig::default();
            }
        });
        if config != self.quickshape_config {
            self.set_quickshape_config(config);
        }
    }

    fn settings(&self) -> AppSettings {
        AppSettings {
            quickshape: self.quickshape_config.clone(),
            pencil: self.pencil().map(|p| p.settings().clone()).unwrap_or_default(),
            drawing: self.document.drawing().clone(),
        }
    }
}

/// Text for the events worth telling the user about
fn feedback_message(event: &ShapeEvent) -> Option<String> {
    match event {
        ShapeEvent::ShapeSnapped { kind } => Some(format!("Snapped to {}", kind)),
        ShapeEvent::ShapePerfected { kind } => Some(format!("Perfect {}", kind)),
        ShapeEvent::ShapeCommitted { kind } => Some(format!("Added {}", kind)),
        ShapeEvent::ShapeCancelled {
            restored_raw_stroke: true,
            ..
        } => Some("Restored original stroke".to_string()),
        ShapeEvent::ShapeCancelled { .. } => Some("Shape discarded".to_string()),
        _ => None,
    }
}

impl eframe::App for QuickShapeApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, eframe::APP_KEY, &self.settings());
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.tools_panel(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::drag());
            let rect = response.rect;
            self.input_handler.set_canvas_rect(rect);

            let now = ctx.input(|input| input.time);
            for event in self.input_handler.process_input(ctx) {
                self.handle_input_event(event, now);
            }
            self.tick(ctx, now);

            if let Some(renderer) = &mut self.renderer {
                self.tools[self.active_tool].update_preview(renderer);
                renderer.render(&painter, rect, self.document.strokes());
            }
        });
    }
}
