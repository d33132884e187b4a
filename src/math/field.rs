//! Modular arithmetic over the prime field Z_p.
//!
//! Elements live in `[0, p)` as `u32`; products go through `u64`
//! intermediates, so any prime below 2^32 works. Bulk operations are
//! routed through the [`FieldVectorOps`] capability the field was
//! constructed with, after bounds validation.

use std::fmt;
use std::sync::Arc;

use rand::distributions::{Distribution, Uniform};
use rand::Rng;

use super::vec_ops::{FieldVectorOps, ScalarVectorOps};
use crate::error::{PirError, Result};

/// Prime field with an injected bulk-arithmetic kernel.
#[derive(Clone)]
pub struct PrimeField {
    p: u32,
    ops: Arc<dyn FieldVectorOps>,
}

impl fmt::Debug for PrimeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrimeField").field("p", &self.p).finish()
    }
}

impl PrimeField {
    /// Field with the scalar reference kernel.
    pub fn new(p: u32) -> Self {
        Self::with_ops(p, Arc::new(ScalarVectorOps))
    }

    /// Field with a caller-supplied bulk kernel.
    pub fn with_ops(p: u32, ops: Arc<dyn FieldVectorOps>) -> Self {
        debug_assert!(p >= 2);
        Self { p, ops }
    }

    /// The modulus p.
    pub fn modulus(&self) -> u32 {
        self.p
    }

    pub fn add(&self, a: u32, b: u32) -> u32 {
        ((a as u64 + b as u64) % self.p as u64) as u32
    }

    pub fn sub(&self, a: u32, b: u32) -> u32 {
        ((a as u64 + self.p as u64 - b as u64) % self.p as u64) as u32
    }

    pub fn mul(&self, a: u32, b: u32) -> u32 {
        ((a as u64 * b as u64) % self.p as u64) as u32
    }

    pub fn neg(&self, a: u32) -> u32 {
        (self.p - a) % self.p
    }

    /// Modular inverse via the extended Euclidean algorithm.
    ///
    /// Fails with `NotInvertible` for 0 and for operands sharing a factor
    /// with the modulus.
    pub fn inv(&self, a: u32) -> Result<u32> {
        let (mut t, mut new_t): (i64, i64) = (0, 1);
        let (mut r, mut new_r): (i64, i64) = (self.p as i64, a as i64);

        while new_r != 0 {
            let quotient = r / new_r;
            (t, new_t) = (new_t, t - quotient * new_t);
            (r, new_r) = (new_r, r - quotient * new_r);
        }

        if r > 1 {
            return Err(PirError::NotInvertible {
                value: a,
                modulus: self.p,
            });
        }
        if t < 0 {
            t += self.p as i64;
        }
        Ok(t as u32)
    }

    /// Uniform element in `[0, p)`.
    pub fn sample_element<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        rng.gen_range(0..self.p)
    }

    /// `n` uniform elements.
    pub fn sample_vector<R: Rng + ?Sized>(&self, n: u32, rng: &mut R) -> Vec<u32> {
        let dist = Uniform::from(0..self.p);
        (0..n).map(|_| dist.sample(rng)).collect()
    }

    /// `n` uniform nonzero (hence invertible) elements.
    pub fn sample_invertible_vec<R: Rng + ?Sized>(&self, n: u32, rng: &mut R) -> Vec<u32> {
        let dist = Uniform::from(1..self.p);
        (0..n).map(|_| dist.sample(rng)).collect()
    }

    /// Batch inverse; fails on the first non-unit.
    pub fn invert_vector(&self, vec: &[u32]) -> Result<Vec<u32>> {
        vec.iter().map(|&v| self.inv(v)).collect()
    }

    fn check_range(buf_len: usize, off: usize, len: usize) -> Result<()> {
        if off.checked_add(len).map_or(true, |end| end > buf_len) {
            return Err(PirError::DimensionMismatch {
                offset: off,
                length: len,
                buffer: buf_len,
            });
        }
        Ok(())
    }

    /// `dst[dst_off..+len] += src[src_off..+len]` elementwise mod p.
    pub fn add_vectors(
        &self,
        dst: &mut [u32],
        dst_off: usize,
        src: &[u32],
        src_off: usize,
        len: usize,
    ) -> Result<()> {
        Self::check_range(dst.len(), dst_off, len)?;
        Self::check_range(src.len(), src_off, len)?;
        self.ops.add_vectors(dst, dst_off, src, src_off, len, self.p);
        Ok(())
    }

    /// `dst[dst_off..+len] -= src[src_off..+len]` elementwise mod p.
    pub fn sub_vectors(
        &self,
        dst: &mut [u32],
        dst_off: usize,
        src: &[u32],
        src_off: usize,
        len: usize,
    ) -> Result<()> {
        Self::check_range(dst.len(), dst_off, len)?;
        Self::check_range(src.len(), src_off, len)?;
        self.ops.sub_vectors(dst, dst_off, src, src_off, len, self.p);
        Ok(())
    }

    /// `dst[off..+len] *= scalar` mod p.
    pub fn mul_vector(&self, dst: &mut [u32], off: usize, scalar: u32, len: usize) -> Result<()> {
        Self::check_range(dst.len(), off, len)?;
        self.ops.mul_vector(dst, off, scalar, len, self.p);
        Ok(())
    }

    /// `dst[off..+len] = -dst[off..+len]` mod p.
    pub fn neg_vector(&self, dst: &mut [u32], off: usize, len: usize) -> Result<()> {
        Self::check_range(dst.len(), off, len)?;
        self.ops.neg_vector(dst, off, len, self.p);
        Ok(())
    }
}
