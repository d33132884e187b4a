//! Number-Theoretic Transform over Z_q.
//!
//! Cyclic (not negacyclic) convolution: circulant-matrix multiplication
//! reduces to pointwise multiplication in the NTT domain, which is how
//! the trapdoor-matrix engine applies every circulant factor in
//! O(n log n). The transform length is always a power of two here, and
//! q must satisfy q ≡ 1 (mod n) for a primitive n-th root of unity to
//! exist.
//!
//! The provider is an injected capability: a native or SIMD NTT may be
//! swapped in, and must agree bit-for-bit with [`RadixTwoNtt`] since
//! field arithmetic is exact.

use crate::error::{PirError, Result};

/// Root-of-unity computation and cyclic convolution over Z_q.
pub trait NttProvider: Send + Sync {
    /// Deterministic primitive n-th root of unity mod q.
    ///
    /// Fails with `InvalidModulus` when `(q - 1) % n != 0`.
    fn nth_root_of_unity(&self, q: u32, n: u32) -> Result<u32>;

    /// In-place forward transform of `a` (length must be a power of two)
    /// at the given primitive root of that length.
    fn forward(&self, a: &mut [u32], root: u32, q: u32);

    /// In-place inverse transform.
    fn inverse(&self, a: &mut [u32], root: u32, q: u32);

    /// Exact cyclic convolution: `out = a * b` of length `a.len()`.
    fn convolve(&self, a: &[u32], b: &[u32], out: &mut [u32], root: u32, q: u32);
}

/// `base^exp mod q` by square-and-multiply.
pub fn mod_pow(base: u32, mut exp: u64, q: u32) -> u32 {
    let mut result: u64 = 1;
    let mut b = base as u64 % q as u64;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * b % q as u64;
        }
        b = b * b % q as u64;
        exp >>= 1;
    }
    result as u32
}

/// Iterative radix-2 Cooley-Tukey reference implementation.
#[derive(Clone, Copy, Debug, Default)]
pub struct RadixTwoNtt;

impl RadixTwoNtt {
    fn prime_factors(mut n: u32) -> Vec<u32> {
        let mut factors = Vec::new();
        let mut d = 2u32;
        while d as u64 * d as u64 <= n as u64 {
            if n % d == 0 {
                factors.push(d);
                while n % d == 0 {
                    n /= d;
                }
            }
            d += 1;
        }
        if n > 1 {
            factors.push(n);
        }
        factors
    }
}

impl NttProvider for RadixTwoNtt {
    fn nth_root_of_unity(&self, q: u32, n: u32) -> Result<u32> {
        if n == 0 || (q - 1) % n != 0 {
            return Err(PirError::InvalidModulus { q, n });
        }
        if n == 1 {
            return Ok(1);
        }

        let factors = Self::prime_factors(n);
        // Ascending candidate search keeps the result identical on every
        // host; both protocol sides derive the same root.
        for alpha in 2..q {
            let beta = mod_pow(alpha, ((q - 1) / n) as u64, q);
            if beta == 1 {
                continue;
            }
            let primitive = factors
                .iter()
                .all(|&r| mod_pow(beta, (n / r) as u64, q) != 1);
            if primitive {
                return Ok(beta);
            }
        }
        Err(PirError::InvalidModulus { q, n })
    }

    fn forward(&self, a: &mut [u32], root: u32, q: u32) {
        let n = a.len();
        debug_assert!(n.is_power_of_two());

        // Bit-reversal permutation.
        let mut j = 0usize;
        for i in 1..n {
            let mut bit = n >> 1;
            while j & bit != 0 {
                j ^= bit;
                bit >>= 1;
            }
            j ^= bit;
            if i < j {
                a.swap(i, j);
            }
        }

        let mut len = 2usize;
        while len <= n {
            let wlen = mod_pow(root, (n / len) as u64, q);
            for start in (0..n).step_by(len) {
                let mut w: u64 = 1;
                for k in 0..len / 2 {
                    let u = a[start + k] as u64;
                    let v = a[start + k + len / 2] as u64 * w % q as u64;
                    a[start + k] = ((u + v) % q as u64) as u32;
                    a[start + k + len / 2] = ((u + q as u64 - v) % q as u64) as u32;
                    w = w * wlen as u64 % q as u64;
                }
            }
            len <<= 1;
        }
    }

    fn inverse(&self, a: &mut [u32], root: u32, q: u32) {
        let n = a.len();
        let inv_root = mod_pow(root, (q - 2) as u64, q);
        self.forward(a, inv_root, q);

        let inv_n = mod_pow(n as u32, (q - 2) as u64, q);
        for x in a.iter_mut() {
            *x = (*x as u64 * inv_n as u64 % q as u64) as u32;
        }
    }

    fn convolve(&self, a: &[u32], b: &[u32], out: &mut [u32], root: u32, q: u32) {
        let n = a.len();
        debug_assert_eq!(n, b.len());
        debug_assert_eq!(n, out.len());

        let mut fa = a.to_vec();
        let mut fb = b.to_vec();
        self.forward(&mut fa, root, q);
        self.forward(&mut fb, root, q);
        for i in 0..n {
            fa[i] = (fa[i] as u64 * fb[i] as u64 % q as u64) as u32;
        }
        self.inverse(&mut fa, root, q);
        out.copy_from_slice(&fa);
    }
}
