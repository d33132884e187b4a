//! Orchestrator context and protocol artifacts.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::linearcode::{make_code, LinearCode};
use crate::math::{
    FieldVectorOps, MatVecKernel, NttProvider, PrimeField, RadixTwoNtt, ScalarMatVec,
    ScalarVectorOps,
};
use crate::params::PirParams;
use crate::tdm::{Tdm, TdmDescriptor};

/// Protocol context: validated parameters plus the injected math
/// capabilities every phase runs on.
///
/// Both sides of the protocol construct a `Pir` from the same
/// parameters; the capabilities may differ (a server might plug in
/// SIMD kernels) as long as the results are bit-identical.
pub struct Pir {
    pub(crate) params: PirParams,
    pub(crate) field: PrimeField,
    pub(crate) ntt: Arc<dyn NttProvider>,
    pub(crate) matvec: Arc<dyn MatVecKernel>,
}

impl Pir {
    /// Context with the scalar reference capabilities.
    pub fn new(params: PirParams) -> Result<Self> {
        Self::with_capabilities(
            params,
            Arc::new(ScalarVectorOps),
            Arc::new(RadixTwoNtt),
            Arc::new(ScalarMatVec),
        )
    }

    /// Context with caller-supplied kernels. Fails if the parameter set
    /// does not validate.
    pub fn with_capabilities(
        params: PirParams,
        vec_ops: Arc<dyn FieldVectorOps>,
        ntt: Arc<dyn NttProvider>,
        matvec: Arc<dyn MatVecKernel>,
    ) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            field: PrimeField::with_ops(params.p, vec_ops),
            params,
            ntt,
            matvec,
        })
    }

    pub fn params(&self) -> &PirParams {
        &self.params
    }

    pub fn field(&self) -> &PrimeField {
        &self.field
    }

    /// The linear code derived from a secret code key.
    pub(crate) fn code_for(&self, key: u64) -> Result<Box<dyn LinearCode>> {
        make_code(
            self.params.code,
            self.params.l,
            self.params.k,
            &self.field,
            key,
            &self.ntt,
            &self.matvec,
        )
    }

    /// The masking-matrix evaluator for a secret key.
    pub(crate) fn tdm_for(&self, sk: &SecretKey) -> Result<Tdm> {
        Tdm::new(sk.tdm, self.field.clone(), Arc::clone(&self.ntt))
    }
}

/// Client secret: the code key and the trapdoored masking matrix.
/// Everything else is re-derived from these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretKey {
    pub linear_code_key: u64,
    pub tdm: TdmDescriptor,
}

/// What the client sends: `replicas` concatenated vectors of
/// `replica_len` field elements each.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    pub data: Vec<u32>,
    pub replica_len: u32,
    pub replicas: u32,
}

/// Client-side decoding state produced alongside a query. Never sent to
/// the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aux {
    /// Which replicas carry noise, and the per-replica mask values.
    Lpn {
        noisy_replicas: Vec<bool>,
        masks: Vec<u32>,
    },
    /// The invertible per-block scaling coefficients and the mask values.
    SplitBlock { coeff: Vec<u32>, masks: Vec<u32> },
}

/// What the server sends back: one answer group per replica (LPN) or
/// per block (split-block), each of `ans_len` field elements.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub data: Vec<u32>,
    pub ans_len: u32,
}
