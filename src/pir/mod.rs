//! The five-phase protocol orchestrator.
//!
//! 1. **KeyGen**: derive the code key and masking-matrix seeds.
//! 2. **Encode**: widen each database row with code redundancy,
//!    erasure-code across slices (LPN), and add the trapdoored masks.
//! 3. **Query**: hide a selector inside vectors orthogonal to every
//!    codeword, with LPN noise or split-block scaling on top.
//! 4. **Answer**: the server's only job, matrix-vector products against
//!    the masked matrix.
//! 5. **Decode**: strip masks, undo noise or scaling, and read off
//!    `<row, selector>` for every row.
//!
//! All phases hang off [`Pir`], constructed once from validated
//! [`crate::params::PirParams`].

mod answer;
mod decode;
mod encode;
mod keygen;
mod query;
mod types;

pub use types::{Aux, Pir, Query, Response, SecretKey};
