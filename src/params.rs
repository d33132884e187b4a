//! Protocol parameter sets.
//!
//! A parameter set fixes the field, the database geometry, the linear
//! code family, and the masking scheme. All five protocol phases take
//! the same validated [`PirParams`]; nothing is renegotiated mid-run.

use serde::{Deserialize, Serialize};

use crate::error::{PirError, Result};
use crate::linearcode::CodeKind;

/// How answers are hidden from the server.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Masking {
    /// LPN-style masking: the database is split into `m1` interleaved
    /// slices, erasure-coded up to `ecc_length` replicas, and each query
    /// replica gets independent Bernoulli(`epsilon`) noise.
    Lpn {
        m1: u32,
        ecc_length: u32,
        epsilon: f64,
    },
    /// Split-block masking: one noiseless query split into `num_blocks`
    /// segments, each scaled by an independent invertible coefficient.
    SplitBlock { num_blocks: u32 },
}

/// Complete protocol configuration.
///
/// The Ring variant is not a separate type: it is `CodeKind::Evaluation`
/// combined with [`Masking::SplitBlock`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PirParams {
    /// Field modulus, prime.
    pub p: u32,
    /// Database rows.
    pub m: u32,
    /// Record length: message coordinates per row.
    pub l: u32,
    /// Redundancy coordinates per encoded row.
    pub k: u32,
    pub code: CodeKind,
    pub masking: Masking,
}

fn is_prime(p: u32) -> bool {
    if p < 2 {
        return false;
    }
    let mut d = 2u32;
    while d as u64 * d as u64 <= p as u64 {
        if p % d == 0 {
            return false;
        }
        d += 1;
    }
    true
}

impl PirParams {
    /// The primary LPN-hardened configuration with the random code.
    pub fn lpn(p: u32, m: u32, l: u32, k: u32, m1: u32, ecc_length: u32, epsilon: f64) -> Self {
        Self {
            p,
            m,
            l,
            k,
            code: CodeKind::Random,
            masking: Masking::Lpn {
                m1,
                ecc_length,
                epsilon,
            },
        }
    }

    /// Split-block masking over the random code.
    pub fn split_block(p: u32, m: u32, l: u32, k: u32, num_blocks: u32) -> Self {
        Self {
            p,
            m,
            l,
            k,
            code: CodeKind::Random,
            masking: Masking::SplitBlock { num_blocks },
        }
    }

    /// Split-block masking over the NTT evaluation code.
    pub fn ring(p: u32, m: u32, l: u32, k: u32, num_blocks: u32) -> Self {
        Self {
            code: CodeKind::Evaluation,
            ..Self::split_block(p, m, l, k, num_blocks)
        }
    }

    /// Encoded row width L + K.
    pub fn n(&self) -> u32 {
        self.l + self.k
    }

    /// Independent query replicas a client sends.
    pub fn num_replicas(&self) -> u32 {
        match self.masking {
            Masking::Lpn { ecc_length, .. } => ecc_length,
            Masking::SplitBlock { .. } => 1,
        }
    }

    /// Rows of the trapdoored masking matrix: one mask per slice row for
    /// LPN, one per database row for split-block.
    pub fn tdm_rows(&self) -> u32 {
        match self.masking {
            Masking::Lpn { m1, .. } => self.m / m1,
            Masking::SplitBlock { .. } => self.m,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |reason: String| Err(PirError::InvalidParams(reason));

        if !is_prime(self.p) {
            return fail(format!("modulus {} is not prime", self.p));
        }
        if self.m == 0 || self.l == 0 || self.k == 0 {
            return fail("dimensions m, l, k must be nonzero".into());
        }

        match self.masking {
            Masking::Lpn {
                m1,
                ecc_length,
                epsilon,
            } => {
                if m1 == 0 || self.m % m1 != 0 {
                    return fail(format!("slice count {} must divide m = {}", m1, self.m));
                }
                if ecc_length < m1 {
                    return fail(format!(
                        "erasure code length {} shorter than its message length {}",
                        ecc_length, m1
                    ));
                }
                if ecc_length as u64 > self.p as u64 {
                    return fail(format!(
                        "erasure code length {} exceeds field size {}",
                        ecc_length, self.p
                    ));
                }
                if !(0.0..1.0).contains(&epsilon) {
                    return fail(format!("noise rate {} outside [0, 1)", epsilon));
                }
            }
            Masking::SplitBlock { num_blocks } => {
                if num_blocks == 0 || self.n() % num_blocks != 0 {
                    return fail(format!(
                        "block count {} must divide encoded width {}",
                        num_blocks,
                        self.n()
                    ));
                }
            }
        }
        Ok(())
    }
}
