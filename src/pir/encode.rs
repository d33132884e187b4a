//! Encode: expand, erasure-code and mask the database.

use rayon::prelude::*;
use tracing::debug;

use super::types::{Pir, SecretKey};
use crate::ecc::ReedSolomonCode;
use crate::error::{PirError, Result};
use crate::math::transform_to_blockwise;
use crate::matrix::Matrix;
use crate::params::Masking;

impl Pir {
    /// Materializes the masking matrices that [`Pir::encode`] adds: one
    /// per replica slice for LPN, a single one for split-block. Split
    /// out so the (expensive) materialization can be cached or timed
    /// independently of the encode itself.
    pub fn generate_masks(&self, sk: &SecretKey) -> Result<Vec<Vec<u32>>> {
        let tdm = self.tdm_for(sk)?;
        match self.params.masking {
            Masking::Lpn { ecc_length, .. } => (0..ecc_length)
                .map(|t| tdm.materialize_slice(t as u64))
                .collect(),
            Masking::SplitBlock { .. } => Ok(vec![tdm.materialize()?]),
        }
    }

    /// Turns the `M × L` database into the masked server-side matrix.
    ///
    /// Every row is widened to `N = L + K` with its code redundancy.
    /// Under LPN masking the rows are additionally dealt into `m1`
    /// interleaved slices, erasure-coded entrywise up to `ecc_length`
    /// replica slices, and each slice gets its own mask. Under
    /// split-block masking the single masked matrix is re-laid out
    /// block-contiguously for the answer kernel.
    pub fn encode(&self, sk: &SecretKey, database: &Matrix, masks: &[Vec<u32>]) -> Result<Matrix> {
        let p = self.params;
        if database.rows != p.m || database.cols != p.l {
            return Err(PirError::InvalidParams(format!(
                "database is {}x{}, parameters expect {}x{}",
                database.rows, database.cols, p.m, p.l
            )));
        }
        if masks.len() != p.num_replicas() as usize {
            return Err(PirError::InvalidParams(format!(
                "expected {} mask matrices, got {}",
                p.num_replicas(),
                masks.len()
            )));
        }

        match p.masking {
            Masking::Lpn {
                m1, ecc_length, ..
            } => self.encode_lpn(sk, database, masks, m1, ecc_length),
            Masking::SplitBlock { num_blocks } => {
                self.encode_split_block(sk, database, &masks[0], num_blocks)
            }
        }
    }

    fn encode_lpn(
        &self,
        sk: &SecretKey,
        database: &Matrix,
        masks: &[Vec<u32>],
        m1: u32,
        ecc_length: u32,
    ) -> Result<Matrix> {
        let code = self.code_for(sk.linear_code_key)?;
        let q = self.params.p as u64;
        let (l, n) = (self.params.l as usize, self.params.n() as usize);
        let rows_per_slice = (self.params.m / m1) as usize;
        let entries_per_slice = rows_per_slice * n;

        let rs = ReedSolomonCode::new(m1, ecc_length, self.field.clone())?;
        let generator = rs.generator_rows()?;

        let mut encoded = vec![0u32; entries_per_slice * ecc_length as usize];
        let (systematic, parity) = encoded.split_at_mut(entries_per_slice * m1 as usize);

        // Slice j holds every m1-th database row starting at offset j,
        // each widened to N.
        systematic
            .par_chunks_mut(entries_per_slice)
            .enumerate()
            .for_each(|(j, slice)| {
                for i in 0..rows_per_slice {
                    let row = database.row(i as u32 * m1 + j as u32);
                    let out = &mut slice[i * n..(i + 1) * n];
                    out[..l].copy_from_slice(row);
                    code.encode_redundancy(row, &mut out[l..]);
                }
            });

        // Replica slice m1 + r combines the systematic slices row-wise
        // with generator row r; entrywise this is exactly the erasure
        // encoding of each (row, column) message across slices.
        let systematic_view: &[u32] = systematic;
        parity
            .par_chunks_mut(entries_per_slice)
            .enumerate()
            .for_each(|(r, slice)| {
                let weights = &generator[r * m1 as usize..(r + 1) * m1 as usize];
                let mut acc = vec![0u64; n];
                for i in 0..rows_per_slice {
                    acc.iter_mut().for_each(|a| *a = 0);
                    for (t, &w) in weights.iter().enumerate() {
                        let src = &systematic_view[t * entries_per_slice + i * n..][..n];
                        for (a, &x) in acc.iter_mut().zip(src) {
                            *a += w as u64 * x as u64 % q;
                        }
                    }
                    for (o, &a) in slice[i * n..(i + 1) * n].iter_mut().zip(&acc) {
                        *o = (a % q) as u32;
                    }
                }
            });

        for (s, mask) in masks.iter().enumerate() {
            self.field
                .add_vectors(&mut encoded, s * entries_per_slice, mask, 0, entries_per_slice)?;
        }

        debug!(
            slices = ecc_length,
            rows_per_slice,
            width = n,
            "database encoded"
        );
        Ok(Matrix {
            rows: rows_per_slice as u32 * ecc_length,
            cols: n as u32,
            data: encoded,
        })
    }

    fn encode_split_block(
        &self,
        sk: &SecretKey,
        database: &Matrix,
        mask: &[u32],
        num_blocks: u32,
    ) -> Result<Matrix> {
        let code = self.code_for(sk.linear_code_key)?;
        let (m, l, n) = (self.params.m, self.params.l as usize, self.params.n() as usize);

        let mut encoded = vec![0u32; m as usize * n];
        encoded
            .par_chunks_mut(n)
            .zip(database.data.par_chunks(l))
            .for_each(|(out, row)| {
                out[..l].copy_from_slice(row);
                code.encode_redundancy(row, &mut out[l..]);
            });

        let len = encoded.len();
        self.field.add_vectors(&mut encoded, 0, mask, 0, len)?;

        // Block-contiguous layout: the answer kernel streams each of the
        // num_blocks column blocks sequentially.
        let data = transform_to_blockwise(&encoded, m, n as u32, num_blocks);

        debug!(rows = m, width = n, blocks = num_blocks, "database encoded");
        Ok(Matrix {
            rows: m,
            cols: n as u32,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::PirParams;

    const P: u32 = 65537;

    #[test]
    fn test_encode_rejects_wrong_database_shape() {
        let pir = Pir::new(PirParams::lpn(P, 64, 32, 8, 4, 7, 0.0)).unwrap();
        let sk = pir.keygen(1);
        let masks = pir.generate_masks(&sk).unwrap();
        let bad = Matrix::random(64, 16, P, 2);
        assert!(matches!(
            pir.encode(&sk, &bad, &masks),
            Err(PirError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_encode_rejects_wrong_mask_count() {
        let pir = Pir::new(PirParams::lpn(P, 64, 32, 8, 4, 7, 0.0)).unwrap();
        let sk = pir.keygen(1);
        let db = Matrix::random(64, 32, P, 2);
        assert!(matches!(
            pir.encode(&sk, &db, &[]),
            Err(PirError::InvalidParams(_))
        ));
    }

    #[test]
    fn test_lpn_encode_shape() {
        let pir = Pir::new(PirParams::lpn(P, 64, 32, 8, 4, 7, 0.0)).unwrap();
        let sk = pir.keygen(9);
        let db = Matrix::random(64, 32, P, 3);
        let masks = pir.generate_masks(&sk).unwrap();
        let encoded = pir.encode(&sk, &db, &masks).unwrap();
        assert_eq!(encoded.rows, 16 * 7);
        assert_eq!(encoded.cols, 40);
        assert_eq!(encoded.data.len(), 16 * 7 * 40);
    }

    #[test]
    fn test_lpn_systematic_slice_holds_masked_rows() {
        let pir = Pir::new(PirParams::lpn(P, 64, 32, 8, 4, 7, 0.0)).unwrap();
        let sk = pir.keygen(9);
        let db = Matrix::random(64, 32, P, 3);
        let masks = pir.generate_masks(&sk).unwrap();
        let encoded = pir.encode(&sk, &db, &masks).unwrap();

        // Slice 2, row 5 should be (db row 5*4+2 || redundancy) + mask.
        let n = 40usize;
        let entries = 16 * n;
        let got = &encoded.data[2 * entries + 5 * n..2 * entries + 5 * n + 32];
        let field = pir.field().clone();
        let mut expected = db.row(5 * 4 + 2).to_vec();
        field
            .add_vectors(&mut expected, 0, &masks[2], 5 * n, 32)
            .unwrap();
        assert_eq!(got, &expected[..]);
    }

    #[test]
    fn test_split_block_encode_is_blockwise() {
        let pir = Pir::new(PirParams::split_block(P, 8, 32, 8, 4)).unwrap();
        let sk = pir.keygen(5);
        let db = Matrix::random(8, 32, P, 6);
        let masks = pir.generate_masks(&sk).unwrap();
        let encoded = pir.encode(&sk, &db, &masks).unwrap();
        assert_eq!(encoded.data.len(), 8 * 40);

        // First 10 entries are block 0 of row 0: masked row prefix.
        let mut expected = db.row(0)[..10].to_vec();
        pir.field()
            .add_vectors(&mut expected, 0, &masks[0], 0, 10)
            .unwrap();
        assert_eq!(&encoded.data[..10], &expected[..]);
    }
}
