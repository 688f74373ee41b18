use egui::{Context, Key, Modifiers, PointerButton, Pos2, Rect};

/// Represents the location where an input event occurred
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputLocation {
    /// The position in screen coordinates
    pub position: Pos2,
    /// Whether this position is within the canvas bounds
    pub is_in_canvas: bool,
}

/// Input events the canvas cares about, distilled from raw egui input
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        location: InputLocation,
        button: PointerButton,
    },
    PointerUp {
        location: InputLocation,
        button: PointerButton,
    },
    /// Pointer moved (with or without buttons pressed)
    PointerMove {
        location: InputLocation,
        /// Buttons that are currently held down
        held_buttons: Vec<PointerButton>,
    },
    /// Pointer left the window, possibly while a button was still held
    PointerLeave {
        last_known_location: InputLocation,
    },
    /// A second input while the primary button is held: right click during a
    /// drag, or a second finger on a touch screen
    SecondaryTap {
        location: InputLocation,
    },
    KeyDown {
        key: Key,
        modifiers: Modifiers,
    },
}

impl InputEvent {
    /// Helper to check if an input event occurred within the canvas
    pub fn is_in_canvas(&self) -> bool {
        match self {
            InputEvent::PointerDown { location, .. }
            | InputEvent::PointerUp { location, .. }
            | InputEvent::PointerMove { location, .. }
            | InputEvent::SecondaryTap { location } => location.is_in_canvas,
            InputEvent::PointerLeave { last_known_location } => last_known_location.is_in_canvas,
            InputEvent::KeyDown { .. } => false,
        }
    }
}

/// Handles converting raw egui input into our domain-specific InputEvents
#[derive(Debug, Clone)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    canvas_rect: Rect,
    /// Touch ids currently on the screen
    touches: Vec<u64>,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new(Rect::NOTHING)
    }
}

impl InputHandler {
    pub fn new(canvas_rect: Rect) -> Self {
        Self {
            last_pointer_pos: None,
            canvas_rect,
            touches: Vec::new(),
        }
    }

    /// Update the canvas rectangle (e.g. if window is resized)
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = rect;
    }

    fn make_location(&self, pos: Pos2) -> InputLocation {
        InputLocation {
            position: pos,
            is_in_canvas: self.canvas_rect.contains(pos),
        }
    }

    /// Process raw egui input and generate our InputEvents
    pub fn process_input(&mut self, ctx: &Context) -> Vec<InputEvent> {
        let mut events = Vec::new();

        ctx.input(|input| {
            if let Some(pos) = input.pointer.hover_pos() {
                if Some(pos) != self.last_pointer_pos {
                    let held_buttons = [PointerButton::Primary, PointerButton::Secondary]
                        .into_iter()
                        .filter(|button| input.pointer.button_down(*button))
                        .collect();
                    events.push(InputEvent::PointerMove {
                        location: self.make_location(pos),
                        held_buttons,
                    });
                }
                self.last_pointer_pos = Some(pos);
            } else if let Some(last) = self.last_pointer_pos.take() {
                events.push(InputEvent::PointerLeave {
                    last_known_location: self.make_location(last),
                });
            }

            let primary_down = input.pointer.button_down(PointerButton::Primary);
            if let Some(pos) = input.pointer.interact_pos() {
                let location = self.make_location(pos);
                if input.pointer.button_pressed(PointerButton::Primary) {
                    events.push(InputEvent::PointerDown {
                        location,
                        button: PointerButton::Primary,
                    });
                }
                if input.pointer.button_pressed(PointerButton::Secondary) && primary_down {
                    events.push(InputEvent::SecondaryTap { location });
                }
                if input.pointer.button_released(PointerButton::Primary) {
                    events.push(InputEvent::PointerUp {
                        location,
                        button: PointerButton::Primary,
                    });
                }
            }

            for event in &input.raw.events {
                match event {
                    egui::Event::Key {
                        key,
                        pressed: true,
                        modifiers,
                        ..
                    } => events.push(InputEvent::KeyDown {
                        key: *key,
                        modifiers: *modifiers,
                    }),
                    egui::Event::Touch { id, phase, pos, .. } => {
                        self.track_touch(id.0, *phase, *pos, &mut events);
                    }
                    _ => {}
                }
            }
        });

        events
    }

    /// A touch that starts while another finger is already down is a
    /// secondary tap
    fn track_touch(&mut self, id: u64, phase: egui::TouchPhase, pos: Pos2, events: &mut Vec<InputEvent>) {
        match phase {
            egui::TouchPhase::Start => {
                if !self.touches.is_empty() {
                    events.push(InputEvent::SecondaryTap {
                        location: self.make_location(pos),
                    });
                }
                self.touches.push(id);
            }
            egui::TouchPhase::End | egui::TouchPhase::Cancel => self.touches.retain(|t| *t != id),
            egui::TouchPhase::Move => {}
        }
    }
}
