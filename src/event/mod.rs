mod bus;
mod events;

pub use bus::EventBus;
pub use events::ShapeEvent;

/// Receives QuickShape notifications (haptics, sounds, status text).
///
/// Handlers are fire-and-forget: nothing they do feeds back into the
/// controller.
pub trait EventHandler {
    fn handle_event(&mut self, event: &ShapeEvent);
}

impl<F> EventHandler for F
where
    F: FnMut(&ShapeEvent),
{
    fn handle_event(&mut self, event: &ShapeEvent) {
        self(event)
    }
}
