//! Cooperative work queue
//!
//! Heavy batched work runs in slices: each call to `run_until_budget`
//! processes items until its budget is spent and then hands control back
//! to the host loop. The rest stays queued for the next call.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How much work one slice may do. The item limit always applies; the
/// time limit only when set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    pub max_items: usize,
    pub max_time: Option<Duration>,
}

impl Budget {
    pub fn items(max_items: usize) -> Self {
        Self {
            max_items,
            max_time: None,
        }
    }

    pub fn with_time(mut self, max_time: Duration) -> Self {
        self.max_time = Some(max_time);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Budget spent with work left over
    Yielded { remaining: usize },
    Drained,
}

#[derive(Debug)]
pub struct WorkQueue<T> {
    items: VecDeque<T>,
}

impl<T> Default for WorkQueue<T> {
    fn default() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }
}

impl<T: PartialEq> WorkQueue<T> {
    /// Queue `item` unless an equal item is already waiting.
    pub fn push_unique(&mut self, item: T) {
        if !self.items.contains(&item) {
            self.items.push_back(item);
        }
    }
}

impl<T> WorkQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: T) {
        self.items.push_back(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Process items front to back until the queue is empty or `budget`
    /// is spent. At least one item runs per call when any are queued.
    pub fn run_until_budget(&mut self, budget: Budget, mut work: impl FnMut(T)) -> RunOutcome {
        let started = Instant::now();
        let mut done = 0;
        while let Some(item) = self.items.pop_front() {
            work(item);
            done += 1;

            if self.items.is_empty() {
                break;
            }
            let out_of_items = done >= budget.max_items.max(1);
            let out_of_time = budget.max_time.is_some_and(|limit| started.elapsed() >= limit);
            if out_of_items || out_of_time {
                tracing::trace!(done, left = self.items.len(), "work queue yielding");
                return RunOutcome::Yielded {
                    remaining: self.items.len(),
                };
            }
        }
        RunOutcome::Drained
    }
}
