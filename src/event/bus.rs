use std::cell::RefCell;
use std::collections::VecDeque;

use log::trace;

use crate::event::{EventHandler, ShapeEvent};

/// Delivers QuickShape events to every subscribed handler, in order.
///
/// Handlers may reach the bus again while they run. An event emitted from
/// inside a dispatch is queued and delivered once the current event has
/// reached every handler, and a handler subscribed mid-dispatch starts
/// receiving from the next event on.
#[derive(Default)]
pub struct EventBus {
    handlers: RefCell<Vec<Box<dyn EventHandler>>>,
    queued_events: RefCell<VecDeque<ShapeEvent>>,
    late_handlers: RefCell<Vec<Box<dyn EventHandler>>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let handlers = match self.handlers.try_borrow() {
            Ok(handlers) => format!("<{} handlers>", handlers.len()),
            Err(_) => "<dispatching>".to_string(),
        };
        f.debug_struct("EventBus")
            .field("handlers", &handlers)
            .field("queued_events", &self.queued_events.borrow().len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) {
        match self.handlers.try_borrow_mut() {
            Ok(mut handlers) => handlers.push(handler),
            Err(_) => self.late_handlers.borrow_mut().push(handler),
        }
    }

    pub fn emit(&self, event: ShapeEvent) {
        let Ok(mut handlers) = self.handlers.try_borrow_mut() else {
            trace!("Queueing {:?} behind the running dispatch", event);
            self.queued_events.borrow_mut().push_back(event);
            return;
        };

        let mut next = Some(event);
        while let Some(event) = next {
            for handler in handlers.iter_mut() {
                handler.handle_event(&event);
            }
            handlers.append(&mut self.late_handlers.borrow_mut());
            next = self.queued_events.borrow_mut().pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ShapeKind;
    use std::rc::Rc;

    fn recorder(seen: &Rc<RefCell<Vec<ShapeEvent>>>) -> Box<dyn EventHandler> {
        let seen = Rc::clone(seen);
        Box::new(move |event: &ShapeEvent| seen.borrow_mut().push(event.clone()))
    }

    #[test]
    fn test_emit_reaches_every_handler() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let bus = EventBus::new();
        bus.subscribe(recorder(&seen));
        bus.subscribe(recorder(&seen));

        bus.emit(ShapeEvent::HoldTimerStarted);
        assert_eq!(*seen.borrow(), vec![ShapeEvent::HoldTimerStarted, ShapeEvent::HoldTimerStarted]);
    }

    #[test]
    fn test_handler_can_emit_while_dispatching() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let bus = Rc::new(EventBus::new());
        {
            let bus_ref = Rc::downgrade(&bus);
            bus.subscribe(Box::new(move |event: &ShapeEvent| {
                if let (ShapeEvent::ShapeSnapped { kind }, Some(bus)) = (event, bus_ref.upgrade()) {
                    bus.emit(ShapeEvent::ShapeCommitted { kind: *kind });
                }
            }));
        }
        bus.subscribe(recorder(&seen));

        bus.emit(ShapeEvent::ShapeSnapped { kind: ShapeKind::Line });
        assert_eq!(
            *seen.borrow(),
            vec![
                ShapeEvent::ShapeSnapped { kind: ShapeKind::Line },
                ShapeEvent::ShapeCommitted { kind: ShapeKind::Line },
            ]
        );
    }

    #[test]
    fn test_subscribe_while_dispatching() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let bus = Rc::new(EventBus::new());
        {
            let bus_ref = Rc::downgrade(&bus);
            let seen = Rc::clone(&seen);
            let mut subscribed = false;
            bus.subscribe(Box::new(move |_: &ShapeEvent| {
                if let (false, Some(bus)) = (subscribed, bus_ref.upgrade()) {
                    bus.subscribe(recorder(&seen));
                    subscribed = true;
                }
            }));
        }

        bus.emit(ShapeEvent::HoldTimerStarted);
        assert!(seen.borrow().is_empty());
        assert!(format!("{:?}", bus).contains("2 handlers"));

        bus.emit(ShapeEvent::ShapeCommitted { kind: ShapeKind::Circle });
        assert_eq!(*seen.borrow(), vec![ShapeEvent::ShapeCommitted { kind: ShapeKind::Circle }]);
    }
}
