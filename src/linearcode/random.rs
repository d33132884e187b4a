//! Seeded random linear code.

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use super::LinearCode;
use crate::error::Result;
use crate::math::{MatVecKernel, PrimeField};

/// Systematic code `[I_L | P]` with `P` expanded from a ChaCha20 seed.
///
/// Both materialized maps are derived from the same `L × K` sample of P:
/// redundancy is `P^T · row` and the dual span is `-P · coeffs`, so a
/// codeword and a spanned dual vector are always orthogonal. The seed is
/// the client's code key; the server only ever sees expanded vectors.
pub struct RandomCode {
    l: u32,
    k: u32,
    field: PrimeField,
    matvec: Arc<dyn MatVecKernel>,
    /// `K × L` row-major: P transposed.
    rlc: Vec<u32>,
    /// `L × K` row-major: -P.
    dual: Vec<u32>,
}

impl RandomCode {
    pub fn new(
        l: u32,
        k: u32,
        field: PrimeField,
        seed: u64,
        matvec: Arc<dyn MatVecKernel>,
    ) -> Result<Self> {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let (l_us, k_us) = (l as usize, k as usize);

        let mut rlc = vec![0u32; k_us * l_us];
        let mut dual = vec![0u32; l_us * k_us];
        // Sampling order is row-by-row over P itself; it is part of the
        // key derivation and must not change.
        for i in 0..l_us {
            for j in 0..k_us {
                let p_ij = field.sample_element(&mut rng);
                rlc[j * l_us + i] = p_ij;
                dual[i * k_us + j] = p_ij;
            }
        }
        field.neg_vector(&mut dual, 0, l_us * k_us)?;

        Ok(Self {
            l,
            k,
            field,
            matvec,
            rlc,
            dual,
        })
    }

    /// The materialized `K × L` redundancy map, row-major.
    pub fn rlc_matrix(&self) -> &[u32] {
        &self.rlc
    }

    /// The materialized `L × K` dual map, row-major.
    pub fn dual_matrix(&self) -> &[u32] {
        &self.dual
    }
}

impl LinearCode for RandomCode {
    fn message_len(&self) -> u32 {
        self.l
    }

    fn redundancy_len(&self) -> u32 {
        self.k
    }

    fn encode_redundancy(&self, row: &[u32], out: &mut [u32]) {
        self.matvec
            .mat_vec(&self.rlc, row, out, self.k, self.l, self.field.modulus());
    }

    fn dual_span(&self, coeffs: &[u32], out: &mut [u32]) {
        self.matvec
            .mat_vec(&self.dual, coeffs, out, self.l, self.k, self.field.modulus());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::ScalarMatVec;
    use rand::Rng;
    use rand::SeedableRng;

    const P: u32 = 65537;

    fn code(seed: u64) -> RandomCode {
        RandomCode::new(12, 4, PrimeField::new(P), seed, Arc::new(ScalarMatVec)).unwrap()
    }

    #[test]
    fn test_same_seed_same_code() {
        let a = code(42);
        let b = code(42);
        assert_eq!(a.rlc_matrix(), b.rlc_matrix());
        assert_eq!(a.dual_matrix(), b.dual_matrix());
    }

    #[test]
    fn test_different_seed_different_code() {
        assert_ne!(code(42).rlc_matrix(), code(43).rlc_matrix());
    }

    #[test]
    fn test_dual_is_negated_transpose_of_rlc() {
        let c = code(7);
        let (l, k) = (12usize, 4usize);
        for i in 0..l {
            for j in 0..k {
                let p_ij = c.rlc_matrix()[j * l + i];
                assert_eq!(c.dual_matrix()[i * k + j], (P - p_ij) % P);
            }
        }
    }

    #[test]
    fn test_orthogonality() {
        let c = code(3);
        let field = PrimeField::new(P);
        let mut rng = ChaCha20Rng::seed_from_u64(8);

        let row = field.sample_vector(12, &mut rng);
        let coeffs: Vec<u32> = (0..4).map(|_| rng.gen_range(0..P)).collect();

        let mut redundancy = vec![0u32; 4];
        c.encode_redundancy(&row, &mut redundancy);
        let mut span = vec![0u32; 12];
        c.dual_span(&coeffs, &mut span);

        let mut dot: u64 = 0;
        for (a, b) in row.iter().zip(&span) {
            dot = (dot + *a as u64 * *b as u64) % P as u64;
        }
        for (a, b) in redundancy.iter().zip(&coeffs) {
            dot = (dot + *a as u64 * *b as u64) % P as u64;
        }
        assert_eq!(dot, 0);
    }
}
