//! Sliding Window Buffer - bounded FIFO of the most recent samples

use std::collections::VecDeque;

use crate::types::Sample;

/// Oldest-first buffer holding at most `capacity` samples.
#[derive(Debug, Clone)]
pub struct TelemetryWindow {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl TelemetryWindow {
    /// Create an empty window. A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Append a present sample, evicting the oldest first when full.
    /// An absent sample leaves the window untouched.
    pub fn push(&mut self, sample: Option<Sample>) {
        let Some(sample) = sample else {
            return;
        };
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Change the capacity. Shrinking drops the oldest surplus entries.
    pub fn resize(&mut self, capacity: usize) {
        let capacity = capacity.max(1);
        if capacity == self.capacity {
            return;
        }
        while self.samples.len() > capacity {
            self.samples.pop_front();
        }
        self.capacity = capacity;
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Ordered copy of the contents, oldest first.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.iter().cloned().collect()
    }
}
