//! Answer: the server's oblivious matrix-vector products.

use rayon::prelude::*;
use tracing::debug;

use super::types::{Pir, Query, Response};
use crate::error::{PirError, Result};
use crate::matrix::Matrix;
use crate::params::Masking;

impl Pir {
    /// Computes the server response: per replica slice, the product of
    /// that slice of the encoded matrix with the matching query replica
    /// (LPN), or the per-block partial products of the whole matrix with
    /// the scaled query (split-block). The server learns nothing beyond
    /// the query vector itself.
    pub fn answer(&self, encoded: &Matrix, query: &Query) -> Result<Response> {
        let n = self.params.n();
        let expected = (self.params.num_replicas() * n) as usize;
        if query.replica_len != n || query.data.len() != expected {
            return Err(PirError::DimensionMismatch {
                offset: 0,
                length: query.data.len(),
                buffer: expected,
            });
        }

        match self.params.masking {
            Masking::Lpn { ecc_length, .. } => {
                let rows_per_slice = self.params.tdm_rows() as usize;
                let entries_per_slice = rows_per_slice * n as usize;
                if encoded.data.len() != entries_per_slice * ecc_length as usize {
                    return Err(PirError::DimensionMismatch {
                        offset: 0,
                        length: encoded.data.len(),
                        buffer: entries_per_slice * ecc_length as usize,
                    });
                }

                let mut answers = vec![0u32; rows_per_slice * ecc_length as usize];
                answers
                    .par_chunks_mut(rows_per_slice)
                    .enumerate()
                    .for_each(|(t, out)| {
                        self.matvec.mat_vec(
                            &encoded.data[t * entries_per_slice..(t + 1) * entries_per_slice],
                            &query.data[t * n as usize..(t + 1) * n as usize],
                            out,
                            rows_per_slice as u32,
                            n,
                            self.params.p,
                        );
                    });

                debug!(replicas = ecc_length, ans_len = rows_per_slice, "answered");
                Ok(Response {
                    data: answers,
                    ans_len: rows_per_slice as u32,
                })
            }
            Masking::SplitBlock { num_blocks } => {
                let m = self.params.m;
                if encoded.data.len() != m as usize * n as usize {
                    return Err(PirError::DimensionMismatch {
                        offset: 0,
                        length: encoded.data.len(),
                        buffer: m as usize * n as usize,
                    });
                }

                let mut answers = vec![0u32; num_blocks as usize * m as usize];
                self.matvec.block_mat_vec(
                    &encoded.data,
                    &query.data,
                    &mut answers,
                    m,
                    n,
                    num_blocks,
                    self.params.p,
                );

                debug!(blocks = num_blocks, ans_len = m, "answered");
                Ok(Response {
                    data: answers,
                    ans_len: m,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::unit_vector;
    use crate::params::PirParams;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    const P: u32 = 65537;

    #[test]
    fn test_answer_shapes() {
        let pir = Pir::new(PirParams::lpn(P, 64, 32, 8, 4, 7, 0.0)).unwrap();
        let sk = pir.keygen(1);
        let db = Matrix::random(64, 32, P, 2);
        let masks = pir.generate_masks(&sk).unwrap();
        let encoded = pir.encode(&sk, &db, &masks).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(0);
        let (query, _) = pir.query(&sk, &unit_vector(32, 0), &mut rng).unwrap();

        let response = pir.answer(&encoded, &query).unwrap();
        assert_eq!(response.ans_len, 16);
        assert_eq!(response.data.len(), 16 * 7);
    }

    #[test]
    fn test_malformed_query_rejected() {
        let pir = Pir::new(PirParams::lpn(P, 64, 32, 8, 4, 7, 0.0)).unwrap();
        let encoded = Matrix::zeroed(16 * 7, 40);
        let query = Query {
            data: vec![0u32; 40],
            replica_len: 40,
            replicas: 1,
        };
        assert!(matches!(
            pir.answer(&encoded, &query),
            Err(PirError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_wrong_matrix_size_rejected() {
        let pir = Pir::new(PirParams::split_block(P, 64, 32, 8, 4)).unwrap();
        let encoded = Matrix::zeroed(63, 40);
        let query = Query {
            data: vec![0u32; 40],
            replica_len: 40,
            replicas: 1,
        };
        assert!(matches!(
            pir.answer(&encoded, &query),
            Err(PirError::DimensionMismatch { .. })
        ));
    }
}
