//! Computational single-server private information retrieval built on
//! random linear codes, trapdoored pseudorandom matrices and
//! Reed-Solomon erasure coding.
//!
//! The server stores a masked, code-expanded copy of the database and
//! answers queries with plain matrix-vector products; the client, who
//! holds the seeds behind the masks and the code, removes them and
//! recovers one linear functional of every database row per query.
//! Query privacy rests on the Learning Parity with Noise assumption in
//! the primary configuration, with split-block and NTT-ring
//! configurations available through [`params::PirParams`].
//!
//! ```no_run
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha20Rng;
//! use rlc_pir::matrix::{unit_vector, Matrix};
//! use rlc_pir::params::PirParams;
//! use rlc_pir::pir::Pir;
//!
//! # fn main() -> rlc_pir::error::Result<()> {
//! let params = PirParams::lpn(65537, 1024, 1024, 16, 4, 7, 1e-3);
//! let pir = Pir::new(params)?;
//! let sk = pir.keygen(0xC0FFEE);
//!
//! let database = Matrix::random(1024, 1024, 65537, 7);
//! let masks = pir.generate_masks(&sk)?;
//! let encoded = pir.encode(&sk, &database, &masks)?;
//!
//! let mut rng = ChaCha20Rng::from_entropy();
//! let (query, aux) = pir.query(&sk, &unit_vector(1024, 42), &mut rng)?;
//! let response = pir.answer(&encoded, &query)?;
//! let column = pir.decode(&response, &aux)?;
//! assert_eq!(column[3], database.row(3)[42]);
//! # Ok(())
//! # }
//! ```

pub mod ecc;
pub mod error;
pub mod linearcode;
pub mod math;
pub mod matrix;
pub mod params;
pub mod pir;
pub mod tdm;

pub use error::{PirError, Result};
pub use params::{Masking, PirParams};
pub use pir::{Aux, Pir, Query, Response, SecretKey};
