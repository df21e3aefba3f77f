// src/crawl/frontier.rs
// =============================================================================
// The frontier: links waiting to be downloaded, tagged with their depth.
//
// The orchestrator pops from the front; extraction tasks push to the back
// while the orchestrator is running, so the queue sits behind a lock.
// =============================================================================

use std::collections::VecDeque;

use parking_lot::Mutex;

/// A link waiting to be downloaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLink {
    pub url: String,
    /// Remaining hop budget, always >= 1
    pub depth: usize,
}

impl PendingLink {
    pub fn new(url: impl Into<String>, depth: usize) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// Unbounded FIFO of pending links shared between the orchestrator and the
/// extraction workers
#[derive(Debug, Default)]
pub struct Frontier {
    queue: Mutex<VecDeque<PendingLink>>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, link: PendingLink) {
        self.queue.lock().push_back(link);
    }

    pub fn pop(&self) -> Option<PendingLink> {
        self.queue.lock().pop_front()
    }

    /// Depth of the next link, without removing it
    pub fn front_depth(&self) -> Option<usize> {
        self.queue.lock().front().map(|link| link.depth)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }
}
