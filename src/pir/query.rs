//! Query: hide a selector inside codeword-orthogonal vectors.

use rand::Rng;
use tracing::debug;

use super::types::{Aux, Pir, Query, SecretKey};
use crate::error::{PirError, Result};
use crate::params::Masking;

impl Pir {
    /// Builds a query for `selector`, a length-`L` combination of row
    /// entries (a unit vector retrieves one column of every row).
    ///
    /// Each replica is `dual_span(r) + noise + selector` over the first
    /// `L` positions with `r` itself in the last `K`: orthogonality
    /// makes the server's inner product collapse to `<row, selector>`
    /// plus mask and noise terms the auxiliary data undoes. Masks are
    /// computed before any split-block scaling so decode sees them
    /// unscaled.
    pub fn query<R: Rng + ?Sized>(
        &self,
        sk: &SecretKey,
        selector: &[u32],
        rng: &mut R,
    ) -> Result<(Query, Aux)> {
        let l = self.params.l as usize;
        if selector.len() != l {
            return Err(PirError::DimensionMismatch {
                offset: 0,
                length: selector.len(),
                buffer: l,
            });
        }

        match self.params.masking {
            Masking::Lpn {
                ecc_length,
                epsilon,
                ..
            } => self.query_lpn(sk, selector, ecc_length, epsilon, rng),
            Masking::SplitBlock { num_blocks } => {
                self.query_split_block(sk, selector, num_blocks, rng)
            }
        }
    }

    /// Noise vector with each entry nonzero independently with
    /// probability `epsilon`.
    fn sample_noise<R: Rng + ?Sized>(&self, len: usize, epsilon: f64, rng: &mut R) -> Vec<u32> {
        (0..len)
            .map(|_| {
                if rng.gen_bool(epsilon) {
                    rng.gen_range(1..self.params.p)
                } else {
                    0
                }
            })
            .collect()
    }

    fn query_lpn<R: Rng + ?Sized>(
        &self,
        sk: &SecretKey,
        selector: &[u32],
        ecc_length: u32,
        epsilon: f64,
        rng: &mut R,
    ) -> Result<(Query, Aux)> {
        let code = self.code_for(sk.linear_code_key)?;
        let tdm = self.tdm_for(sk)?;
        let (l, k, n) = (
            self.params.l as usize,
            self.params.k as usize,
            self.params.n() as usize,
        );
        let rows_per_slice = self.params.tdm_rows() as usize;

        let mut data = vec![0u32; n * ecc_length as usize];
        let mut noisy_replicas = vec![false; ecc_length as usize];
        let mut masks = Vec::with_capacity(rows_per_slice * ecc_length as usize);

        for t in 0..ecc_length as usize {
            let replica = &mut data[t * n..(t + 1) * n];
            let r = self.field.sample_vector(k as u32, rng);
            code.dual_span(&r, &mut replica[..l]);

            let noise = self.sample_noise(l, epsilon, rng);
            if noise.iter().any(|&x| x != 0) {
                noisy_replicas[t] = true;
                self.field.add_vectors(replica, 0, &noise, 0, l)?;
            }

            replica[l..].copy_from_slice(&r);
            self.field.add_vectors(replica, 0, selector, 0, l)?;

            masks.extend_from_slice(&tdm.apply_slice(replica, t as u64)?);
        }

        debug!(
            replicas = ecc_length,
            noisy = noisy_replicas.iter().filter(|&&f| f).count(),
            "query built"
        );
        Ok((
            Query {
                data,
                replica_len: n as u32,
                replicas: ecc_length,
            },
            Aux::Lpn {
                noisy_replicas,
                masks,
            },
        ))
    }

    fn query_split_block<R: Rng + ?Sized>(
        &self,
        sk: &SecretKey,
        selector: &[u32],
        num_blocks: u32,
        rng: &mut R,
    ) -> Result<(Query, Aux)> {
        let code = self.code_for(sk.linear_code_key)?;
        let tdm = self.tdm_for(sk)?;
        let (l, k, n) = (
            self.params.l as usize,
            self.params.k as usize,
            self.params.n() as usize,
        );

        let coeffs = self.field.sample_vector(k as u32, rng);
        let mut data = vec![0u32; n];
        code.dual_span(&coeffs, &mut data[..l]);
        data[l..].copy_from_slice(&coeffs);
        self.field.add_vectors(&mut data, 0, selector, 0, l)?;

        let masks = tdm.apply(&data)?;

        let coeff = self.field.sample_invertible_vec(num_blocks, rng);
        let b = n / num_blocks as usize;
        for (i, &c) in coeff.iter().enumerate() {
            self.field.mul_vector(&mut data, i * b, c, b)?;
        }

        debug!(blocks = num_blocks, "query built");
        Ok((
            Query {
                data,
                replica_len: n as u32,
                replicas: 1,
            },
            Aux::SplitBlock { coeff, masks },
        ))
    }
}
