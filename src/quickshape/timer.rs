/// A single-shot, cancellable hold timer.
///
/// The controller is driven from the UI thread, so instead of a background
/// timer this stores a deadline that is checked on every tick. Starting the
/// timer replaces any pending deadline; there is never more than one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HoldTimer {
    deadline: Option<f64>,
}

impl HoldTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the timer to fire `duration` seconds after `now`
    pub fn start(&mut self, now: f64, duration: f64) {
        self.deadline = Some(now + duration);
    }

    /// Cancel a pending deadline. Returns true if one was pending.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<f64> {
        self.deadline
    }

    /// Returns true exactly once when the deadline has passed
    pub fn fire_if_due(&mut self, now: f64) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
