//! Trapdoored pseudorandom matrix engine.
//!
//! An `M × N` matrix is defined implicitly by five seeds and never has
//! to be stored: it is a grid of `B × B` blocks, each the product chain
//! `S_L · Π_L · S_mid · Π_R · S_R` of two quasi-cyclic factors, a full
//! circulant, and two row permutations, all expanded from per-block
//! seed offsets. The structure is the trapdoor: the holder of the seeds
//! can apply the matrix to a vector in `O(N log B)` through NTT
//! convolutions, while the matrix itself is indistinguishable from
//! random to anyone without them.
//!
//! The client uses [`Tdm::apply_slice`] (fast path); the server, which
//! receives the seeds inside public parameters, materializes rows with
//! [`Tdm::materialize_slice`] to mask the encoded database. Both paths
//! must produce bit-identical matrices.

use std::fmt;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

use crate::error::{PirError, Result};
use crate::math::{NttProvider, PrimeField};

/// Each block row-expands by this factor mid-chain before folding back.
pub const EXPANSION_FACTOR: u32 = 2;

/// Seed distance between consecutive matrix slices.
pub const SLICE_SEED_SHIFT: u64 = 13758;

/// The five seeds of the block chain, in application order
/// `S_L · Π_L · S_mid · Π_R · S_R`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TdmSeeds {
    pub left: u64,
    pub perm_left: u64,
    pub mid: u64,
    pub perm_right: u64,
    pub right: u64,
}

/// Serializable description of a trapdoored matrix: dimensions, field,
/// and seeds. This is what travels inside keys and public parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TdmDescriptor {
    pub rows: u32,
    pub cols: u32,
    pub q: u32,
    pub seeds: TdmSeeds,
}

/// Evaluator for a [`TdmDescriptor`], with block geometry and NTT roots
/// resolved once at construction.
pub struct Tdm {
    desc: TdmDescriptor,
    field: PrimeField,
    ntt: Arc<dyn NttProvider>,
    block: u32,
    m_pad: u32,
    n_pad: u32,
    root_b: u32,
    root_2b: u32,
}

impl fmt::Debug for Tdm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tdm")
            .field("desc", &self.desc)
            .field("block", &self.block)
            .finish()
    }
}

fn round_up(v: u32, block: u32) -> u32 {
    (v + block - 1) / block * block
}

/// Block side length for an `rows × cols` matrix over Z_q: the smaller
/// dimension rounded up to a power of two, capped at `(q-1)/2` so a
/// `2B`-point transform still fits in the multiplicative group.
fn determine_block_size(rows: u32, cols: u32, q: u32) -> u32 {
    let mn = rows.min(cols);
    if mn >= (q - 1) / 2 {
        (q - 1) / 2
    } else {
        mn.next_power_of_two()
    }
}

/// Seeded Fisher-Yates permutation of `0..n`.
fn permutation(n: u32, seed: u64) -> Vec<u32> {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    let mut perm: Vec<u32> = (0..n).collect();
    perm.shuffle(&mut rng);
    perm
}

/// Out-of-place gather `new[t] = old[perm[t]]`.
fn permute_vector(vec: &mut [u32], perm: &[u32]) {
    let old = vec.to_vec();
    for (dst, &src) in vec.iter_mut().zip(perm) {
        *dst = old[src as usize];
    }
}

/// Row gather on a row-major `perm.len() × cols` matrix.
fn permute_rows(mat: &mut [u32], cols: usize, perm: &[u32]) {
    let old = mat.to_vec();
    for (t, &src) in perm.iter().enumerate() {
        mat[t * cols..(t + 1) * cols].copy_from_slice(&old[src as usize * cols..(src as usize + 1) * cols]);
    }
}

impl Tdm {
    /// Fails with `InvalidModulus` when the block geometry admits no
    /// power-of-two transform, or `q` lacks the required roots of unity.
    pub fn new(desc: TdmDescriptor, field: PrimeField, ntt: Arc<dyn NttProvider>) -> Result<Self> {
        debug_assert!(desc.rows >= 1 && desc.cols >= 1);
        debug_assert_eq!(field.modulus(), desc.q);

        let block = determine_block_size(desc.rows, desc.cols, desc.q);
        if !block.is_power_of_two() {
            return Err(PirError::InvalidModulus {
                q: desc.q,
                n: block,
            });
        }
        let root_b = ntt.nth_root_of_unity(desc.q, block)?;
        let root_2b = ntt.nth_root_of_unity(desc.q, EXPANSION_FACTOR * block)?;

        Ok(Self {
            m_pad: round_up(desc.rows, block),
            n_pad: round_up(desc.cols, block),
            desc,
            field,
            ntt,
            block,
            root_b,
            root_2b,
        })
    }

    pub fn descriptor(&self) -> &TdmDescriptor {
        &self.desc
    }

    /// Padded input length expected by [`Self::apply_slice`].
    pub fn padded_cols(&self) -> u32 {
        self.n_pad
    }

    /// Generating row of one circulant factor, sampled in natural order.
    fn circulant_poly(&self, size: u32, seed: u64) -> Vec<u32> {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        self.field.sample_vector(size, &mut rng)
    }

    /// Circulant-times-vector as a cyclic convolution. The kernel is the
    /// index-reversed generating row: `kernel[0] = poly[0]`,
    /// `kernel[s-t] = poly[t]`, which makes `conv(kernel, v)[i] =
    /// Σ_j poly[(j-i) mod s] v[j]`, exactly row `i` of the circulant.
    fn circulant_vec_mul(&self, size: u32, root: u32, seed: u64, v: &[u32]) -> Vec<u32> {
        let mut kernel = self.circulant_poly(size, seed);
        kernel[1..].reverse();

        let mut out = vec![0u32; size as usize];
        self.ntt.convolve(&kernel, v, &mut out, root, self.desc.q);
        out
    }

    /// Circulant-times-matrix, one convolution per column of `mat`
    /// (`size` rows × `cols`, row-major).
    fn circulant_mat_mul(&self, size: u32, root: u32, seed: u64, mat: &[u32], cols: usize) -> Vec<u32> {
        let mut kernel = self.circulant_poly(size, seed);
        kernel[1..].reverse();

        let rows = size as usize;
        let mut result = vec![0u32; rows * cols];
        let mut column = vec![0u32; rows];
        let mut out = vec![0u32; rows];
        for j in 0..cols {
            for i in 0..rows {
                column[i] = mat[i * cols + j];
            }
            self.ntt.convolve(&kernel, &column, &mut out, root, self.desc.q);
            for i in 0..rows {
                result[i * cols + j] = out[i];
            }
        }
        result
    }

    /// One block of the chain applied to a length-`B` vector.
    fn block_eval(&self, v: &[u32], delta: u64) -> Result<Vec<u32>> {
        let b = self.block as usize;
        let s = self.desc.seeds;

        // S_R = [I // C_R]: expand B -> 2B.
        let mut res = vec![0u32; EXPANSION_FACTOR as usize * b];
        res[..b].copy_from_slice(v);
        let lower = self.circulant_vec_mul(self.block, self.root_b, s.right.wrapping_add(delta), v);
        res[b..].copy_from_slice(&lower);

        permute_vector(&mut res, &permutation(EXPANSION_FACTOR * self.block, s.perm_right.wrapping_add(delta)));

        let mut res = self.circulant_vec_mul(
            EXPANSION_FACTOR * self.block,
            self.root_2b,
            s.mid.wrapping_add(delta),
            &res,
        );

        permute_vector(&mut res, &permutation(EXPANSION_FACTOR * self.block, s.perm_left.wrapping_add(delta)));

        // S_L = [I | C_L]: fold 2B -> B.
        let folded = self.circulant_vec_mul(self.block, self.root_b, s.left.wrapping_add(delta), &res[b..]);
        self.field.add_vectors(&mut res, 0, &folded, 0, b)?;
        res.truncate(b);
        Ok(res)
    }

    /// Applies slice 0. See [`Self::apply_slice`].
    pub fn apply(&self, v: &[u32]) -> Result<Vec<u32>> {
        self.apply_slice(v, 0)
    }

    /// Applies the slice-`slice` matrix to `v` through the seed chain,
    /// without materializing anything. Inputs shorter than the padded
    /// width are zero-extended; longer inputs are a `DimensionMismatch`.
    /// Output has exactly `rows` entries.
    pub fn apply_slice(&self, v: &[u32], slice: u64) -> Result<Vec<u32>> {
        let n_pad = self.n_pad as usize;
        if v.len() > n_pad {
            return Err(PirError::DimensionMismatch {
                offset: 0,
                length: v.len(),
                buffer: n_pad,
            });
        }
        let mut padded = vec![0u32; n_pad];
        padded[..v.len()].copy_from_slice(v);

        let b = self.block as usize;
        let row_blocks = (self.m_pad / self.block) as u64;
        let col_blocks = (self.n_pad / self.block) as u64;
        let slice_shift = slice.wrapping_mul(SLICE_SEED_SHIFT);

        let mut acc = vec![0u32; self.m_pad as usize];
        for j in 0..col_blocks {
            let bv = &padded[j as usize * b..(j as usize + 1) * b];
            for i in 0..row_blocks {
                let delta = (i * row_blocks + j).wrapping_add(slice_shift);
                let out = self.block_eval(bv, delta)?;
                self.field.add_vectors(&mut acc, i as usize * b, &out, 0, b)?;
            }
        }
        acc.truncate(self.desc.rows as usize);
        Ok(acc)
    }

    /// One explicit `B × B` block, built factor by factor. Must agree
    /// bit-for-bit with [`Self::block_eval`] applied to unit vectors.
    fn materialize_block(&self, delta: u64) -> Result<Vec<u32>> {
        let b = self.block as usize;
        let two_b = EXPANSION_FACTOR as usize * b;
        let s = self.desc.seeds;

        // S_R = [I // C_R], 2B x B.
        let mut sr = vec![0u32; two_b * b];
        for t in 0..b {
            sr[t * b + t] = 1;
        }
        let poly = self.circulant_poly(self.block, s.right.wrapping_add(delta));
        for t in 0..b {
            let row = &mut sr[(b + t) * b..(b + t + 1) * b];
            row[t..].copy_from_slice(&poly[..b - t]);
            row[..t].copy_from_slice(&poly[b - t..]);
        }

        permute_rows(&mut sr, b, &permutation(EXPANSION_FACTOR * self.block, s.perm_right.wrapping_add(delta)));

        let mut mid = self.circulant_mat_mul(
            EXPANSION_FACTOR * self.block,
            self.root_2b,
            s.mid.wrapping_add(delta),
            &sr,
            b,
        );

        permute_rows(&mut mid, b, &permutation(EXPANSION_FACTOR * self.block, s.perm_left.wrapping_add(delta)));

        // S_L = [I | C_L] folds the lower half onto the upper.
        let mut folded = self.circulant_mat_mul(self.block, self.root_b, s.left.wrapping_add(delta), &mid[b * b..], b);
        for t in 0..b {
            self.field.add_vectors(&mut folded, t * b, &mid, t * b, b)?;
        }
        Ok(folded)
    }

    /// Materializes slice 0. See [`Self::materialize_slice`].
    pub fn materialize(&self) -> Result<Vec<u32>> {
        self.materialize_slice(0)
    }

    /// The explicit `rows × cols` matrix of slice `slice`, row-major.
    /// Blocks extending past the true dimensions are cropped.
    pub fn materialize_slice(&self, slice: u64) -> Result<Vec<u32>> {
        let (rows, cols) = (self.desc.rows as usize, self.desc.cols as usize);
        let b = self.block as usize;
        let row_blocks = (self.m_pad / self.block) as u64;
        let col_blocks = (self.n_pad / self.block) as u64;
        let slice_shift = slice.wrapping_mul(SLICE_SEED_SHIFT);

        let mut full = vec![0u32; rows * cols];
        for i in 0..row_blocks {
            for j in 0..col_blocks {
                let delta = (i * row_blocks + j).wrapping_add(slice_shift);
                let blk = self.materialize_block(delta)?;

                let row0 = i as usize * b;
                let col0 = j as usize * b;
                let copy_rows = b.min(rows.saturating_sub(row0));
                let copy_cols = b.min(cols.saturating_sub(col0));
                for k in 0..copy_rows {
                    full[(row0 + k) * cols + col0..(row0 + k) * cols + col0 + copy_cols]
                        .copy_from_slice(&blk[k * b..k * b + copy_cols]);
                }
            }
        }
        Ok(full)
    }
}
