//! Systematic Reed-Solomon code via barycentric Lagrange interpolation.

use crate::error::{PirError, Result};
use crate::math::PrimeField;

/// `[n, k]` Reed-Solomon code with evaluation points `0, 1, ..., n-1`.
///
/// Systematic: the first `k` shares are the message itself, the
/// remaining `n - k` are evaluations of its degree-`< k` interpolant at
/// the points `k..n`. Erasure positions are known to the decoder, so
/// any `k` clean shares recover the message.
#[derive(Debug)]
pub struct ReedSolomonCode {
    k: u32,
    n: u32,
    field: PrimeField,
}

impl ReedSolomonCode {
    /// Fails with `InvalidModulus` when `n` exceeds the field size and
    /// the evaluation points would collide mod p.
    pub fn new(k: u32, n: u32, field: PrimeField) -> Result<Self> {
        debug_assert!(k >= 1 && k <= n);
        if n as u64 > field.modulus() as u64 {
            return Err(PirError::InvalidModulus {
                q: field.modulus(),
                n,
            });
        }
        Ok(Self { k, n, field })
    }

    pub fn message_len(&self) -> u32 {
        self.k
    }

    pub fn code_len(&self) -> u32 {
        self.n
    }

    /// Barycentric weights `w_i = 1 / Π_{j≠i}(x_i - x_j)` for the given
    /// interpolation nodes.
    fn barycentric_weights(&self, nodes: &[u32]) -> Result<Vec<u32>> {
        nodes
            .iter()
            .enumerate()
            .map(|(i, &xi)| {
                let mut den = 1u32;
                for (j, &xj) in nodes.iter().enumerate() {
                    if i != j {
                        den = self.field.mul(den, self.field.sub(xi, xj));
                    }
                }
                self.field.inv(den)
            })
            .collect()
    }

    /// `L_i(x*) = w_i · Π_{j≠i}(x* - x_j)`.
    fn basis_eval(&self, i: usize, nodes: &[u32], weights: &[u32], x_star: u32) -> u32 {
        let mut num = weights[i];
        for (j, &xj) in nodes.iter().enumerate() {
            if i != j {
                num = self.field.mul(num, self.field.sub(x_star, xj));
            }
        }
        num
    }

    /// Evaluates the interpolant through `(x, y)` pairs at `x_star`.
    pub fn interpolate_eval(&self, x: &[u32], y: &[u32], x_star: u32) -> Result<u32> {
        debug_assert_eq!(x.len(), y.len());
        if let Some(i) = x.iter().position(|&xi| xi == x_star) {
            return Ok(y[i] % self.field.modulus());
        }

        let weights = self.barycentric_weights(x)?;
        let mut acc = 0u32;
        for i in 0..x.len() {
            let li = self.basis_eval(i, x, &weights, x_star);
            acc = self.field.add(acc, self.field.mul(y[i], li));
        }
        Ok(acc)
    }

    /// Non-systematic rows of the generator matrix: `(n - k) × k`
    /// row-major, where row `r` holds `L_0..L_{k-1}` evaluated at the
    /// point `k + r`. The systematic identity rows are implicit.
    pub fn generator_rows(&self) -> Result<Vec<u32>> {
        let k = self.k as usize;
        let nodes: Vec<u32> = (0..self.k).collect();
        let weights = self.barycentric_weights(&nodes)?;

        let mut rows = vec![0u32; (self.n - self.k) as usize * k];
        for r in 0..(self.n - self.k) as usize {
            let x_star = self.k + r as u32;
            for col in 0..k {
                rows[r * k + col] = self.basis_eval(col, &nodes, &weights, x_star);
            }
        }
        Ok(rows)
    }

    /// Recovers the `k` message symbols from `n` shares with the erased
    /// positions flagged in `noisy`.
    ///
    /// Clean systematic prefixes pass straight through; otherwise the
    /// first `k` clean shares anywhere in the word are interpolated.
    /// Fails with `InsufficientShares` when fewer than `k` survive.
    pub fn decode(&self, shares: &[u32], noisy: &[bool]) -> Result<Vec<u32>> {
        debug_assert_eq!(shares.len(), self.n as usize);
        debug_assert_eq!(noisy.len(), self.n as usize);
        let k = self.k as usize;

        if noisy[..k].iter().all(|&flag| !flag) {
            return Ok(shares[..k].to_vec());
        }

        let mut x_in = Vec::with_capacity(k);
        let mut y_in = Vec::with_capacity(k);
        for (i, &flag) in noisy.iter().enumerate() {
            if !flag && x_in.len() < k {
                x_in.push(i as u32);
                y_in.push(shares[i]);
            }
        }
        if x_in.len() < k {
            return Err(PirError::InsufficientShares {
                clean: x_in.len(),
                needed: k,
            });
        }

        let mut message = shares[..k].to_vec();
        for (i, symbol) in message.iter_mut().enumerate() {
            if noisy[i] {
                *symbol = self.interpolate_eval(&x_in, &y_in, i as u32)?;
            }
        }
        Ok(message)
    }
}
