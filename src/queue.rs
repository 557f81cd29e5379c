use crate::error::{IsingError, Result};

/// Bounded FIFO of lattice coordinates backing the cascading update.
///
/// Entries live in two parallel ring buffers (rows and columns) addressed by
/// `counter % capacity`. The counters only grow while the queue is in use and
/// are rewound to zero whenever the queue drains, so they stay small over a
/// long run.
#[derive(Debug, Clone)]
pub struct PropagationQueue {
    capacity: usize,
    front: usize,
    back: usize,
    rows: Vec<usize>,
    cols: Vec<usize>,
}

impl PropagationQueue {
    /// Create an empty queue that can hold `capacity` coordinates at once.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(IsingError::config(
                "queue_capacity",
                "must hold at least one coordinate",
            ));
        }
        Ok(Self {
            capacity,
            front: 0,
            back: 0,
            rows: vec![0; capacity],
            cols: vec![0; capacity],
        })
    }

    /// Queue sized for one cascade on an `n` x `n` lattice.
    ///
    /// A site flips at most once per cascade and every flip pushes four
    /// neighbours, so a cascade never pushes more than `4 * n * n` entries.
    pub fn for_lattice(n: usize) -> Result<Self> {
        Self::with_capacity(4 * n * n)
    }

    /// Append a coordinate at the back of the queue.
    pub fn push(&mut self, row: usize, col: usize) -> Result<()> {
        if self.len() >= self.capacity {
            return Err(IsingError::Internal(format!(
                "propagation queue overflow: {} entries already queued",
                self.capacity
            )));
        }
        let slot = self.back % self.capacity;
        self.rows[slot] = row;
        self.cols[slot] = col;
        self.back += 1;
        Ok(())
    }

    /// Remove and return the coordinate at the front of the queue.
    pub fn pop(&mut self) -> Option<(usize, usize)> {
        if self.is_empty() {
            return None;
        }
        let slot = self.front % self.capacity;
        let coord = (self.rows[slot], self.cols[slot]);
        self.front += 1;
        if self.front == self.back {
            self.clear();
        }
        Some(coord)
    }

    pub fn is_empty(&self) -> bool {
        self.front == self.back
    }

    /// Number of coordinates currently queued.
    pub fn len(&self) -> usize {
        self.back - self.front
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every queued coordinate.
    pub fn clear(&mut self) {
        self.front = 0;
        self.back = 0;
    }
}
