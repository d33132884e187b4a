//! Dense matrix-by-vector kernels over Z_p.
//!
//! These are the inner-product-heavy paths of Encode/Answer/Decode,
//! modeled as a pluggable capability so a native or SIMD kernel can
//! replace the scalar reference. Each product is reduced mod p before
//! accumulating in u64, so the sums stay in range for any prime below
//! 2^32; field arithmetic is exact, so any summation order yields the
//! same result and implementations must be bit-identical.

/// Matrix-vector products consumed by the orchestrator.
pub trait MatVecKernel: Send + Sync {
    /// `out[r] = Σ_c mat[r * cols + c] * vec[c] mod p` for a row-major
    /// `rows × cols` matrix.
    fn mat_vec(&self, mat: &[u32], vec: &[u32], out: &mut [u32], rows: u32, cols: u32, p: u32);

    /// Per-block products of a block-row-major matrix against one vector.
    ///
    /// `mat` stores `s` blocks of `rows × (cols/s)` contiguously (see
    /// [`transform_to_blockwise`]); block `b` is multiplied by
    /// `vec[b*cols/s..]` and written to `out[b*rows..]`.
    fn block_mat_vec(&self, mat: &[u32], vec: &[u32], out: &mut [u32], rows: u32, cols: u32, s: u32, p: u32);

    /// Weighted row-group combination of a row-major `rows × cols` matrix:
    /// the rows are split into `s` groups of `rows/s`, and group `b`
    /// contributes `out[b*cols + c] = Σ_r vec[r] * mat[r * cols + c]` over
    /// its rows.
    fn block_vec_mat(&self, mat: &[u32], vec: &[u32], out: &mut [u32], rows: u32, cols: u32, s: u32, p: u32);
}

/// Portable reference kernel.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScalarMatVec;

impl MatVecKernel for ScalarMatVec {
    fn mat_vec(&self, mat: &[u32], vec: &[u32], out: &mut [u32], rows: u32, cols: u32, p: u32) {
        let cols = cols as usize;
        for row in 0..rows as usize {
            let row_ptr = &mat[row * cols..(row + 1) * cols];
            let mut acc: u64 = 0;
            for (m, v) in row_ptr.iter().zip(vec) {
                acc += *m as u64 * *v as u64 % p as u64;
            }
            out[row] = (acc % p as u64) as u32;
        }
    }

    fn block_mat_vec(&self, mat: &[u32], vec: &[u32], out: &mut [u32], rows: u32, cols: u32, s: u32, p: u32) {
        debug_assert_eq!(cols % s, 0);
        let b = (cols / s) as usize;
        let rows_us = rows as usize;

        for blk in 0..s as usize {
            let mat_blk = &mat[blk * rows_us * b..(blk + 1) * rows_us * b];
            let vec_blk = &vec[blk * b..(blk + 1) * b];
            let out_blk = &mut out[blk * rows_us..(blk + 1) * rows_us];
            self.mat_vec(mat_blk, vec_blk, out_blk, rows, b as u32, p);
        }
    }

    fn block_vec_mat(&self, mat: &[u32], vec: &[u32], out: &mut [u32], rows: u32, cols: u32, s: u32, p: u32) {
        debug_assert_eq!(rows % s, 0);
        let b = (rows / s) as usize;
        let cols = cols as usize;
        let mut acc = vec![0u64; cols];

        for blk in 0..s as usize {
            acc.iter_mut().for_each(|a| *a = 0);
            for i in 0..b {
                let row = blk * b + i;
                let w = vec[row] as u64;
                let row_ptr = &mat[row * cols..(row + 1) * cols];
                for (a, m) in acc.iter_mut().zip(row_ptr) {
                    *a += *m as u64 * w % p as u64;
                }
            }
            for (o, a) in out[blk * cols..(blk + 1) * cols].iter_mut().zip(&acc) {
                *o = (*a % p as u64) as u32;
            }
        }
    }
}

/// Relays a row-major `rows × cols` matrix into block-row-major order:
/// `s` column-blocks, each stored as a contiguous `rows × (cols/s)`
/// sub-matrix, so [`MatVecKernel::block_mat_vec`] streams sequentially.
pub fn transform_to_blockwise(mat: &[u32], rows: u32, cols: u32, s: u32) -> Vec<u32> {
    debug_assert_eq!(cols % s, 0);
    let b = (cols / s) as usize;
    let cols = cols as usize;
    let mut blocked = vec![0u32; mat.len()];

    for row in 0..rows as usize {
        for blk in 0..s as usize {
            let src = &mat[row * cols + blk * b..row * cols + (blk + 1) * b];
            let dst_start = (blk * rows as usize + row) * b;
            blocked[dst_start..dst_start + b].copy_from_slice(src);
        }
    }
    blocked
}
