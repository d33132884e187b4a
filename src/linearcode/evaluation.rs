//! NTT evaluation code.

use std::fmt;
use std::sync::Arc;

use super::LinearCode;
use crate::error::Result;
use crate::math::NttProvider;

/// Code whose redundancy coordinates are point evaluations of the row
/// polynomial, computed with a length-`n` NTT (`n` = smallest power of
/// two covering both L and K).
///
/// The DFT matrix is symmetric, so the same transform serves both
/// directions: redundancy is `-NTT(row)` truncated to K, and the dual
/// span is `+NTT(coeffs)` truncated to L. Orthogonality follows from
/// `Σ_t row[t]·NTT(coeffs)[t] = Σ_j coeffs[j]·NTT(row)[j]`.
///
/// Unlike [`super::RandomCode`] there is no key material here; the Ring
/// variant relies on its masking layer alone for privacy.
pub struct EvaluationCode {
    l: u32,
    k: u32,
    q: u32,
    n: usize,
    root: u32,
    ntt: Arc<dyn NttProvider>,
}

impl fmt::Debug for EvaluationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationCode")
            .field("l", &self.l)
            .field("k", &self.k)
            .field("q", &self.q)
            .field("n", &self.n)
            .finish()
    }
}

impl EvaluationCode {
    /// Fails with `InvalidModulus` when `q - 1` does not admit a
    /// transform long enough for both L and K.
    pub fn new(l: u32, k: u32, q: u32, ntt: Arc<dyn NttProvider>) -> Result<Self> {
        let n = l.max(k).next_power_of_two() as usize;
        let root = ntt.nth_root_of_unity(q, n as u32)?;
        Ok(Self { l, k, q, n, root, ntt })
    }

    fn transform(&self, input: &[u32]) -> Vec<u32> {
        let mut buf = vec![0u32; self.n];
        buf[..input.len()].copy_from_slice(input);
        self.ntt.forward(&mut buf, self.root, self.q);
        buf
    }
}

impl LinearCode for EvaluationCode {
    fn message_len(&self) -> u32 {
        self.l
    }

    fn redundancy_len(&self) -> u32 {
        self.k
    }

    fn encode_redundancy(&self, row: &[u32], out: &mut [u32]) {
        let evals = self.transform(row);
        for (o, e) in out.iter_mut().zip(&evals[..self.k as usize]) {
            *o = (self.q - e) % self.q;
        }
    }

    fn dual_span(&self, coeffs: &[u32], out: &mut [u32]) {
        let evals = self.transform(coeffs);
        out.copy_from_slice(&evals[..self.l as usize]);
    }
}
