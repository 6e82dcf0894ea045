//! C7: Frontier. De-duplicating work queue with depth/page bounds and a
//! priority hint (§4.7) — a `BinaryHeap` draining lower-priority-value
//! entries first, FIFO among ties.

use crate::model::FrontierEntry;
use crate::robots::RobotsRegistry;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use tokio::sync::Mutex;
use url::Url;

struct HeapItem {
    priority: u8,
    seq: u64,
    entry: FrontierEntry,
}

impl PartialEq for HeapItem {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}
impl Eq for HeapItem {}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed so BinaryHeap (a max-heap) pops the lowest priority value
        // first, and the earliest-inserted entry first among ties.
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}
impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// De-duplicating, depth/page-bounded, priority-ordered work queue.
pub struct Frontier {
    visited: Mutex<HashSet<String>>,
    queue: Mutex<BinaryHeap<HeapItem>>,
    seq: AtomicU64,
    max_depth: usize,
}

impl Frontier {
    pub fn new(max_depth: usize) -> Self {
        Self {
            visited: Mutex::new(HashSet::new()),
            queue: Mutex::new(BinaryHeap::new()),
            seq: AtomicU64::new(0),
            max_depth,
        }
    }

    /// Attempt to admit `normalized_url` (discovered from a page at
    /// `from_depth`) into the frontier. Rejects out-of-depth, already-visited,
    /// and (when `respect_robots` is set) robots-disallowed URLs.
    pub async fn try_admit(
        &self,
        normalized_url: &str,
        from_depth: usize,
        robots: &RobotsRegistry,
        respect_robots: bool,
    ) -> bool {
        if normalized_url.is_empty() {
            return false;
        }
        let depth = from_depth + 1;
        if depth > self.max_depth {
            return false;
        }

        {
            let visited = self.visited.lock().await;
            if visited.contains(normalized_url) {
                return false;
            }
        }

        if respect_robots {
            if let Ok(parsed) = Url::parse(normalized_url) {
                robots.process_host(&parsed).await;
                if !robots.is_allowed(&parsed).await {
                    return false;
                }
            }
        }

        {
            let mut visited = self.visited.lock().await;
            if !visited.insert(normalized_url.to_string()) {
                return false;
            }
        }

        let priority = compute_priority(normalized_url, from_depth);
        let seq = self.seq.fetch_add(1, AtomicOrdering::Relaxed);
        let entry = FrontierEntry {
            url: normalized_url.to_string(),
            depth,
            priority,
        };
        self.queue.lock().await.push(HeapItem { priority, seq, entry });
        true
    }

    /// Pop the highest-priority (lowest value) entry, if any.
    pub async fn pop(&self) -> Option<FrontierEntry> {
        self.queue.lock().await.pop().map(|item| item.entry)
    }

    pub async fn len(&self) -> usize {
        self.queue.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.queue.lock().await.is_empty()
    }
}

fn compute_priority(url: &str, from_depth: usize) -> u8 {
    let mut priority: i32 = from_depth as i32 + 1;
    let lower = url.to_lowercase();
    if lower.contains("index") || lower.contains("home") || lower.contains("main") {
        priority -= 1;
    }
    if url.contains('?') {
        priority += 1;
    }
    if url.contains('#') {
        priority += 2;
    }
    priority.clamp(1, 10) as u8
}
