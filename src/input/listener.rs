/// Outcome of [`ListenerSlot::bind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    /// Nothing was attached before; the listener is now attached.
    Attached,
    /// The dependencies changed; the old listener was detached first.
    Rebound,
    /// Same dependencies as the current attachment; nothing changed.
    Unchanged,
}

/// Attachment state of one event listener keyed by the identities it
/// depends on (render surface, camera, scene, step size).
///
/// Binding with the same key is a no-op; binding with a different key
/// detaches and re-attaches; [`unbind`](Self::unbind) detaches. At most one
/// attachment exists at a time, so listeners never accumulate.
#[derive(Debug)]
pub struct ListenerSlot<K> {
    name: &'static str,
    bound: Option<K>,
}

impl<K: PartialEq + Copy + std::fmt::Debug> ListenerSlot<K> {
    /// An unattached slot; `name` appears in log lines.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self { name, bound: None }
    }

    /// Attach for `key`, replacing any attachment with different
    /// dependencies.
    pub fn bind(&mut self, key: K) -> BindOutcome {
        match self.bound.replace(key) {
            Some(previous) if previous == key => BindOutcome::Unchanged,
            Some(previous) => {
                log::debug!("{}: rebinding {previous:?} -> {key:?}", self.name);
                BindOutcome::Rebound
            }
            None => {
                log::debug!("{}: attached {key:?}", self.name);
                BindOutcome::Attached
            }
        }
    }

    /// Detach. Returns whether anything was attached.
    pub fn unbind(&mut self) -> bool {
        let was_bound = self.bound.take().is_some();
        if was_bound {
            log::debug!("{}: detached", self.name);
        }
        was_bound
    }

    /// Whether a listener is currently attached.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    /// Dependencies of the current attachment.
    #[must_use]
    pub fn key(&self) -> Option<K> {
        self.bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_is_unchanged() {
        let mut slot = ListenerSlot::new("test");
        assert_eq!(slot.bind(1_u32), BindOutcome::Attached);
        assert_eq!(slot.bind(1), BindOutcome::Unchanged);
        assert_eq!(slot.key(), Some(1));
    }

    #[test]
    fn new_key_rebinds() {
        let mut slot = ListenerSlot::new("test");
        let _ = slot.bind(1_u32);
        assert_eq!(slot.bind(2), BindOutcome::Rebound);
        assert_eq!(slot.key(), Some(2));
    }

    #[test]
    fn unbind_detaches_once() {
        let mut slot = ListenerSlot::new("test");
        let _ = slot.bind(1_u32);
        assert!(slot.unbind());
        assert!(!slot.unbind());
        assert!(!slot.is_bound());
        assert_eq!(slot.bind(1), BindOutcome::Attached);
    }
}
