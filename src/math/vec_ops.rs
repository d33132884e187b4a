//! Bulk elementwise field arithmetic on offset-addressed buffers.
//!
//! `FieldVectorOps` is the seam where a vectorized (SIMD) kernel can be
//! plugged in. Field arithmetic is exact, so any implementation must be
//! bit-identical to [`ScalarVectorOps`]; the trait exists for speed, not
//! semantics. Implementations are chosen at `PrimeField` construction.
//!
//! All operations mutate `dst[dst_off..dst_off + len]` in place. That
//! matches the one aliasing pattern the protocol uses: destination and
//! first operand at identical offsets. Bounds are validated by the
//! `PrimeField` wrappers before any call lands here.

/// Elementwise vector arithmetic over Z_p on sub-ranges of larger arenas.
pub trait FieldVectorOps: Send + Sync {
    /// `dst[dst_off + i] = (dst[dst_off + i] + src[src_off + i]) mod p`.
    fn add_vectors(&self, dst: &mut [u32], dst_off: usize, src: &[u32], src_off: usize, len: usize, p: u32);

    /// `dst[dst_off + i] = (dst[dst_off + i] - src[src_off + i]) mod p`.
    fn sub_vectors(&self, dst: &mut [u32], dst_off: usize, src: &[u32], src_off: usize, len: usize, p: u32);

    /// `dst[dst_off + i] = (dst[dst_off + i] * scalar) mod p`.
    fn mul_vector(&self, dst: &mut [u32], dst_off: usize, scalar: u32, len: usize, p: u32);

    /// `dst[dst_off + i] = (p - dst[dst_off + i]) mod p`.
    fn neg_vector(&self, dst: &mut [u32], dst_off: usize, len: usize, p: u32);
}

/// Portable reference implementation: plain loops, u64 intermediates.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScalarVectorOps;

impl FieldVectorOps for ScalarVectorOps {
    fn add_vectors(&self, dst: &mut [u32], dst_off: usize, src: &[u32], src_off: usize, len: usize, p: u32) {
        for i in 0..len {
            let sum = dst[dst_off + i] as u64 + src[src_off + i] as u64;
            dst[dst_off + i] = (sum % p as u64) as u32;
        }
    }

    fn sub_vectors(&self, dst: &mut [u32], dst_off: usize, src: &[u32], src_off: usize, len: usize, p: u32) {
        for i in 0..len {
            let diff = dst[dst_off + i] as u64 + p as u64 - src[src_off + i] as u64;
            dst[dst_off + i] = (diff % p as u64) as u32;
        }
    }

    fn mul_vector(&self, dst: &mut [u32], dst_off: usize, scalar: u32, len: usize, p: u32) {
        for i in 0..len {
            let prod = dst[dst_off + i] as u64 * scalar as u64;
            dst[dst_off + i] = (prod % p as u64) as u32;
        }
    }

    fn neg_vector(&self, dst: &mut [u32], dst_off: usize, len: usize, p: u32) {
        for i in 0..len {
            dst[dst_off + i] = (p - dst[dst_off + i]) % p;
        }
    }
}
