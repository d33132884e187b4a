//! Mathematical primitives for the PIR core.
//!
//! - **Prime-field arithmetic** with offset-addressed bulk operations
//! - **Cyclic NTT** for circulant multiplication inside the TDM engine
//! - **Matrix-vector kernels** for the Encode/Answer/Decode hot paths
//!
//! The bulk/NTT/mat-vec kernels are capabilities injected at object
//! construction; the scalar implementations here are the reference
//! semantics that any accelerated implementation must match exactly.

pub mod field;
pub mod matvec;
pub mod ntt;
pub mod vec_ops;

pub use field::PrimeField;
pub use matvec::{transform_to_blockwise, MatVecKernel, ScalarMatVec};
pub use ntt::{mod_pow, NttProvider, RadixTwoNtt};
pub use vec_ops::{FieldVectorOps, ScalarVectorOps};
