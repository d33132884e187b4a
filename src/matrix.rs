//! Flat row-major matrices over a prime field.
//!
//! Matrices are immutable once produced except for in-place additive
//! masking during `encode`.

use rand::distributions::{Distribution, Uniform};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

/// Dense row-major matrix of field elements.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matrix {
    pub rows: u32,
    pub cols: u32,
    pub data: Vec<u32>,
}

impl Matrix {
    /// Zeroed rows × cols matrix.
    pub fn zeroed(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            data: vec![0u32; rows as usize * cols as usize],
        }
    }

    /// Matrix with entries sampled uniformly from `[0, p)`, reproducible
    /// from `seed`.
    pub fn random(rows: u32, cols: u32, p: u32, seed: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let dist = Uniform::from(0..p);
        let data = (0..rows as usize * cols as usize)
            .map(|_| dist.sample(&mut rng))
            .collect();
        Self { rows, cols, data }
    }

    /// Row `i` as a slice.
    pub fn row(&self, i: u32) -> &[u32] {
        let cols = self.cols as usize;
        &self.data[i as usize * cols..(i as usize + 1) * cols]
    }
}

/// Length-`l` selector vector with a single 1 at `idx`.
pub fn unit_vector(l: u32, idx: u32) -> Vec<u32> {
    let mut v = vec![0u32; l as usize];
    v[idx as usize] = 1;
    v
}
