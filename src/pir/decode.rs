//! Decode: strip masks and recover `<row, selector>` for every row.

use super::types::{Aux, Pir, Response};
use crate::ecc::ReedSolomonCode;
use crate::error::{PirError, Result};
use crate::params::Masking;

impl Pir {
    /// Recovers the length-`M` result vector, entry `r` holding the
    /// inner product of database row `r` with the query selector.
    ///
    /// LPN: subtract the per-replica masks, then erasure-decode each row
    /// position across replicas, skipping the ones flagged noisy.
    /// Split-block: recombine the per-block partial sums with the
    /// inverted coefficients, then subtract the mask.
    pub fn decode(&self, response: &Response, aux: &Aux) -> Result<Vec<u32>> {
        match (&self.params.masking, aux) {
            (
                &Masking::Lpn {
                    m1, ecc_length, ..
                },
                Aux::Lpn {
                    noisy_replicas,
                    masks,
                },
            ) => self.decode_lpn(response, noisy_replicas, masks, m1, ecc_length),
            (&Masking::SplitBlock { num_blocks }, Aux::SplitBlock { coeff, masks }) => {
                self.decode_split_block(response, coeff, masks, num_blocks)
            }
            _ => Err(PirError::InvalidParams(
                "auxiliary data does not match the configured masking".into(),
            )),
        }
    }

    fn decode_lpn(
        &self,
        response: &Response,
        noisy_replicas: &[bool],
        masks: &[u32],
        m1: u32,
        ecc_length: u32,
    ) -> Result<Vec<u32>> {
        let ans_len = response.ans_len as usize;
        let expected = ans_len * ecc_length as usize;
        if response.data.len() != expected || masks.len() != expected {
            return Err(PirError::DimensionMismatch {
                offset: 0,
                length: response.data.len().min(masks.len()),
                buffer: expected,
            });
        }
        if noisy_replicas.len() != ecc_length as usize {
            return Err(PirError::DimensionMismatch {
                offset: 0,
                length: noisy_replicas.len(),
                buffer: ecc_length as usize,
            });
        }

        let mut answers = response.data.clone();
        self.field.sub_vectors(&mut answers, 0, masks, 0, expected)?;

        let rs = ReedSolomonCode::new(m1, ecc_length, self.field.clone())?;
        let mut result = vec![0u32; self.params.m as usize];
        let mut shares = vec![0u32; ecc_length as usize];

        for i in 0..ans_len {
            for (j, share) in shares.iter_mut().enumerate() {
                *share = answers[j * ans_len + i];
            }
            let message = rs.decode(&shares, noisy_replicas)?;
            result[i * m1 as usize..(i + 1) * m1 as usize].copy_from_slice(&message);
        }
        Ok(result)
    }

    fn decode_split_block(
        &self,
        response: &Response,
        coeff: &[u32],
        masks: &[u32],
        num_blocks: u32,
    ) -> Result<Vec<u32>> {
        let m = self.params.m;
        let expected = num_blocks as usize * m as usize;
        if response.data.len() != expected || coeff.len() != num_blocks as usize {
            return Err(PirError::DimensionMismatch {
                offset: 0,
                length: response.data.len(),
                buffer: expected,
            });
        }
        let inverted = self.field.invert_vector(coeff)?;

        let mut result = vec![0u32; m as usize];
        self.matvec.block_vec_mat(
            &response.data,
            &inverted,
            &mut result,
            num_blocks,
            m,
            1,
            self.params.p,
        );

        self.field.sub_vectors(&mut result, 0, masks, 0, m as usize)?;
        Ok(result)
    }
}
