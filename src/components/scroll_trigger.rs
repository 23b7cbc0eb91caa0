use std::ops::Range;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use futures::task::{LocalSpawn, LocalSpawnExt};

pub type LoadMoreHandler = Rc<dyn Fn() -> LocalBoxFuture<'static, ()>>;

/// Detects the last option row coming into view.
///
/// Fires once per appearance: a row that scrolls away and back fires again.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ScrollTrigger {
    // Keyed by row index, not option: a refilter that keeps the last row on
    // screen does not count as a new appearance.
    visible_last_row: Option<usize>,
}

impl ScrollTrigger {
    pub fn on_row_appear(&mut self, index: usize, row_count: usize) -> bool {
        if index >= row_count || index + 1 != row_count {
            return false;
        }
        if self.visible_last_row == Some(index) {
            return false;
        }
        self.visible_last_row = Some(index);
        true
    }

    pub fn on_row_disappear(&mut self, index: usize) {
        if self.visible_last_row == Some(index) {
            self.visible_last_row = None;
        }
    }

    /// Range-based variant for hosts that report which rows they rendered.
    pub fn on_visible_range(&mut self, range: Range<usize>, row_count: usize) -> bool {
        let Some(last) = row_count.checked_sub(1) else {
            self.reset();
            return false;
        };
        if range.contains(&last) {
            return self.on_row_appear(last, row_count);
        }
        self.visible_last_row = None;
        false
    }

    pub fn reset(&mut self) {
        self.visible_last_row = None;
    }
}

/// Run the load-more callback without waiting for it. A missing handler is
/// skipped.
pub fn dispatch_load_more(handler: Option<&LoadMoreHandler>, spawner: &impl LocalSpawn) -> bool {
    let Some(handler) = handler else {
        return false;
    };
    match spawner.spawn_local((handler)()) {
        Ok(()) => {
            tracing::debug!("dispatched load-more request");
            true
        }
        Err(error) => {
            tracing::debug!(%error, "load-more request dropped");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use futures::FutureExt;
    use futures::executor::LocalPool;

    use super::*;

    #[test]
    fn fires_once_when_last_row_appears() {
        let mut trigger = ScrollTrigger::default();
        assert!(!trigger.on_row_appear(3, 10));
        assert!(trigger.on_row_appear(9, 10));
        assert!(!trigger.on_row_appear(9, 10));
    }

    #[test]
    fn refires_after_last_row_leaves_and_returns() {
        let mut trigger = ScrollTrigger::default();
        assert!(trigger.on_row_appear(4, 5));
        trigger.on_row_disappear(4);
        assert!(trigger.on_row_appear(4, 5));
    }

    #[test]
    fn new_last_row_after_growth_fires_again() {
        let mut trigger = ScrollTrigger::default();
        assert!(trigger.on_visible_range(2..5, 5));
        assert!(!trigger.on_visible_range(2..5, 5));
        assert!(trigger.on_visible_range(6..10, 10));
    }

    #[test]
    fn refilter_keeping_last_row_on_screen_does_not_refire() {
        let mut trigger = ScrollTrigger::default();
        assert!(trigger.on_visible_range(0..4, 4));
        // Different options now fill the same four rows.
        assert!(!trigger.on_visible_range(0..4, 4));
        assert!(trigger.on_visible_range(0..3, 3));
    }

    #[test]
    fn out_of_range_rows_are_ignored() {
        let mut trigger = ScrollTrigger::default();
        assert!(!trigger.on_row_appear(12, 10));
        assert!(!trigger.on_row_appear(0, 0));
        assert!(!trigger.on_visible_range(0..0, 0));
    }

    #[test]
    fn scrolling_away_through_a_range_rearms() {
        let mut trigger = ScrollTrigger::default();
        assert!(trigger.on_visible_range(7..10, 10));
        assert!(!trigger.on_visible_range(0..3, 10));
        assert!(trigger.on_visible_range(7..10, 10));
    }

    #[test]
    fn dispatch_runs_handler_on_spawner() {
        let calls = Rc::new(Cell::new(0));
        let handler: LoadMoreHandler = {
            let calls = calls.clone();
            Rc::new(move || {
                let calls = calls.clone();
                async move { calls.set(calls.get() + 1) }.boxed_local()
            })
        };

        let mut pool = LocalPool::new();
        assert!(dispatch_load_more(Some(&handler), &pool.spawner()));
        assert_eq!(calls.get(), 0);
        pool.run_until_stalled();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn dispatch_skips_missing_handler() {
        let pool = LocalPool::new();
        assert!(!dispatch_load_more(None, &pool.spawner()));
    }
}
