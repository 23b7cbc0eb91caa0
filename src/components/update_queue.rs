use std::collections::VecDeque;

/// Free text to carry into a re-serialized shadow buffer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FreeText {
    /// Text remembered before a tag deletion, else whatever is typed now.
    Restore,
    Clear,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Recompute {
    Arrangement,
    Format(FreeText),
}

/// Recomputations requested by state changes, drained before the next render.
///
/// Every task is a pure function of the state at drain time, so pushing the
/// same task twice is collapsed.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct UpdateQueue {
    pending: VecDeque<Recompute>,
}

impl UpdateQueue {
    pub fn push(&mut self, task: Recompute) {
        if !self.pending.contains(&task) {
            self.pending.push_back(task);
        }
    }

    pub fn pop(&mut self) -> Option<Recompute> {
        self.pending.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}
