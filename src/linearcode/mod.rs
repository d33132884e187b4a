//! Linear codes for query construction.
//!
//! A query replica is a vector in the null space of the row code, plus
//! the selector. Two code families share one seam:
//!
//! - [`RandomCode`]: systematic `[I_L | P]` with `P` sampled from a seed;
//!   pseudorandom to anyone without the seed. The primary choice.
//! - [`EvaluationCode`]: Vandermonde-style code evaluated with the NTT;
//!   used by the Ring protocol variant where speed matters more than a
//!   per-key code.
//!
//! Both expose the two maps the orchestrator needs: redundancy
//! coordinates for a database row, and null-space coordinates for a
//! vector of random coefficients. For any row `m` and coefficients `r`,
//! `(m ∥ redundancy(m)) · (span(r) ∥ r) = 0`.

mod evaluation;
mod random;

pub use evaluation::EvaluationCode;
pub use random::RandomCode;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::math::{MatVecKernel, NttProvider, PrimeField};

/// Systematic linear code and its dual, as used by Encode and Query.
pub trait LinearCode: Send + Sync {
    /// Number of message coordinates L.
    fn message_len(&self) -> u32;

    /// Number of redundancy coordinates K.
    fn redundancy_len(&self) -> u32;

    /// Writes the K redundancy coordinates of `row` (length L) into `out`.
    fn encode_redundancy(&self, row: &[u32], out: &mut [u32]);

    /// Writes the L null-space coordinates spanned by `coeffs` (length K)
    /// into `out`; `(out ∥ coeffs)` lies in the dual of the row code.
    fn dual_span(&self, coeffs: &[u32], out: &mut [u32]);
}

/// Code family selector, part of the protocol parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodeKind {
    /// Seeded random linear code (LPN and Split-LSN variants).
    Random,
    /// NTT evaluation code (Ring variant).
    Evaluation,
}

/// Builds the configured code strategy.
pub fn make_code(
    kind: CodeKind,
    l: u32,
    k: u32,
    field: &PrimeField,
    seed: u64,
    ntt: &Arc<dyn NttProvider>,
    matvec: &Arc<dyn MatVecKernel>,
) -> Result<Box<dyn LinearCode>> {
    match kind {
        CodeKind::Random => Ok(Box::new(RandomCode::new(
            l,
            k,
            field.clone(),
            seed,
            Arc::clone(matvec),
        )?)),
        CodeKind::Evaluation => Ok(Box::new(EvaluationCode::new(
            l,
            k,
            field.modulus(),
            Arc::clone(ntt),
        )?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{RadixTwoNtt, ScalarMatVec};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    const P: u32 = 65537;

    /// Codeword/dual orthogonality must hold for both families.
    #[test]
    fn test_null_space_property() {
        let field = PrimeField::new(P);
        let ntt: Arc<dyn NttProvider> = Arc::new(RadixTwoNtt);
        let matvec: Arc<dyn MatVecKernel> = Arc::new(ScalarMatVec);
        let (l, k) = (24u32, 8u32);

        for kind in [CodeKind::Random, CodeKind::Evaluation] {
            let code = make_code(kind, l, k, &field, 99, &ntt, &matvec).unwrap();
            let mut rng = ChaCha20Rng::seed_from_u64(17);

            for _ in 0..8 {
                let row = field.sample_vector(l, &mut rng);
                let coeffs = field.sample_vector(k, &mut rng);

                let mut redundancy = vec![0u32; k as usize];
                code.encode_redundancy(&row, &mut redundancy);
                let mut span = vec![0u32; l as usize];
                code.dual_span(&coeffs, &mut span);

                let mut dot: u64 = 0;
                for (a, b) in row.iter().zip(&span) {
                    dot = (dot + *a as u64 * *b as u64) % P as u64;
                }
                for (a, b) in redundancy.iter().zip(&coeffs) {
                    dot = (dot + *a as u64 * *b as u64) % P as u64;
                }
                assert_eq!(dot, 0, "codeword not orthogonal to dual ({:?})", kind);
            }
        }
    }
}
