use itertools::iproduct;

use crate::error::{IsingError, Result};
use crate::queue::PropagationQueue;

/// Square lattice of Ising spins with periodic boundary conditions.
///
/// Spins are stored row-major in a flat vector and are always +1 or -1.
/// Neighbour lookups go through precomputed `prev`/`next` tables so that the
/// hot loop never evaluates a modulo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lattice {
    /// Lattice size (N x N)
    size: usize,
    /// Spin configuration: +1 or -1 for each site
    spins: Vec<i8>,
    /// `prev[k] = (k - 1) mod N`
    prev: Vec<usize>,
    /// `next[k] = (k + 1) mod N`
    next: Vec<usize>,
}

impl Lattice {
    /// Create an `n` x `n` lattice in the ferromagnetic ground state (all spins up).
    pub fn new(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(IsingError::config("lattice_size", "must be positive"));
        }
        Ok(Self {
            size: n,
            spins: vec![1; n * n],
            prev: (0..n).map(|k| (k + n - 1) % n).collect(),
            next: (0..n).map(|k| (k + 1) % n).collect(),
        })
    }

    /// Linear dimension N.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of sites, N².
    pub fn sites(&self) -> usize {
        self.spins.len()
    }

    /// Periodic predecessor of a row or column index.
    #[inline]
    pub fn prev(&self, k: usize) -> usize {
        self.prev[k]
    }

    /// Periodic successor of a row or column index.
    #[inline]
    pub fn next(&self, k: usize) -> usize {
        self.next[k]
    }

    /// Spin at `(i, j)`.
    #[inline]
    pub fn spin(&self, i: usize, j: usize) -> i8 {
        debug_assert!(i < self.size && j < self.size);
        self.spins[i * self.size + j]
    }

    /// Flip the spin at `(i, j)` and return its value before the flip.
    #[inline]
    pub fn flip(&mut self, i: usize, j: usize) -> i8 {
        assert!(
            i < self.size && j < self.size,
            "site ({i}, {j}) outside {0}x{0} lattice",
            self.size
        );
        let idx = i * self.size + j;
        let s = self.spins[idx];
        self.spins[idx] = -s;
        s
    }

    /// Energy change that flipping the spin at `(i, j)` would cause (J = 1).
    #[inline]
    pub fn flip_energy_delta(&self, i: usize, j: usize) -> i32 {
        // A lone spin is its own neighbour; its energy does not depend on its sign.
        if self.size == 1 {
            return 0;
        }
        let neighbours = self.spin(self.prev[i], j) as i32
            + self.spin(i, self.prev[j]) as i32
            + self.spin(self.next[i], j) as i32
            + self.spin(i, self.next[j]) as i32;
        2 * self.spin(i, j) as i32 * neighbours
    }

    /// Total energy recomputed from scratch.
    ///
    /// Every bond is visited once by pairing each site with its previous-row
    /// and next-column neighbour.
    pub fn total_energy(&self) -> i64 {
        iproduct!(0..self.size, 0..self.size)
            .map(|(i, j)| {
                let s = self.spin(i, j) as i64;
                -s * (self.spin(self.prev[i], j) as i64 + self.spin(i, self.next[j]) as i64)
            })
            .sum()
    }

    /// Sum of all spins.
    pub fn total_magnetization(&self) -> i64 {
        self.spins.iter().map(|&s| s as i64).sum()
    }

    /// Enqueue the four nearest neighbours of `(i, j)`.
    pub fn push_neighbors(&self, i: usize, j: usize, queue: &mut PropagationQueue) -> Result<()> {
        queue.push(i, self.next[j])?;
        queue.push(i, self.prev[j])?;
        queue.push(self.next[i], j)?;
        queue.push(self.prev[i], j)?;
        Ok(())
    }

    /// Return every spin to +1.
    pub fn reset(&mut self) {
        self.spins.fill(1);
    }

    /// Row-major view of the spins.
    pub fn spins(&self) -> &[i8] {
        &self.spins
    }
}
