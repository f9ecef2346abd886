/// Handle to a registered layer callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CallbackId(pub u64);

/// Ordered callback registry that tolerates mutation while its callbacks run.
///
/// A run takes the entries out, so callbacks can be invoked without holding a borrow on
/// the owner. Registrations made during a run land after the running entries; removals
/// made during a run are applied when the run finishes and are visible through
/// [`CallbackList::is_cancelled`] in the meantime.
pub(crate) struct CallbackList<F> {
    next_id: u64,
    entries: Vec<(CallbackId, F)>,
    running: Vec<CallbackId>,
    cancelled: Vec<CallbackId>,
}

impl<F> Default for CallbackList<F> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
            running: Vec::new(),
            cancelled: Vec::new(),
        }
    }
}

impl<F> CallbackList<F> {
    pub(crate) fn push(&mut self, f: F) -> CallbackId {
        self.next_id += 1;
        let id = CallbackId(self.next_id);
        self.entries.push((id, f));
        id
    }

    pub(crate) fn remove(&mut self, id: CallbackId) -> bool {
        if let Some(idx) = self.entries.iter().position(|(i, _)| *i == id) {
            self.entries.remove(idx);
            return true;
        }
        if self.running.contains(&id) && !self.cancelled.contains(&id) {
            self.cancelled.push(id);
            return true;
        }
        false
    }

    pub(crate) fn is_running(&self) -> bool {
        !self.running.is_empty()
    }

    pub(crate) fn is_cancelled(&self, id: CallbackId) -> bool {
        self.cancelled.contains(&id)
    }

    pub(crate) fn take_for_run(&mut self) -> Vec<(CallbackId, F)> {
        let taken = std::mem::take(&mut self.entries);
        self.running = taken.iter().map(|(id, _)| *id).collect();
        taken
    }

    pub(crate) fn finish_run(&mut self, taken: Vec<(CallbackId, F)>) {
        let cancelled = std::mem::take(&mut self.cancelled);
        let added = std::mem::take(&mut self.entries);
        self.entries = taken
            .into_iter()
            .filter(|(id, _)| !cancelled.contains(id))
            .chain(added)
            .collect();
        self.running.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len() + self.running.len() - self.cancelled.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.cancelled = self.running.clone();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/callbacks.rs"]
mod tests;
