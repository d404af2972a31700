/// A cancellable one-shot deadline on a millisecond clock.
///
/// The timer carries a payload that is handed back exactly once: either
/// when [`poll`](Self::poll) sees the deadline pass, or when the timer is
/// cancelled or re-armed first.
#[derive(Debug, Clone, PartialEq)]
pub struct OneShotTimer<T> {
    pending: Option<(f64, T)>,
}

impl<T> Default for OneShotTimer<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> OneShotTimer<T> {
    /// An idle timer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm to fire `delay_ms` after `now_ms`, returning the payload of a
    /// still-pending previous arming (which will now never fire).
    pub fn arm(&mut self, now_ms: f64, delay_ms: f64, payload: T) -> Option<T> {
        self.pending
            .replace((now_ms + delay_ms, payload))
            .map(|(_, previous)| previous)
    }

    /// Cancel without firing.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, payload)| payload)
    }

    /// Fire if the deadline has been reached.
    pub fn poll(&mut self, now_ms: f64) -> Option<T> {
        match self.pending {
            Some((deadline, _)) if now_ms >= deadline => self.cancel(),
            _ => None,
        }
    }

    /// Whether the timer is armed.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Deadline of the pending arming.
    #[must_use]
    pub fn deadline(&self) -> Option<f64> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }
}
