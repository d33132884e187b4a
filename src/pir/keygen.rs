//! KeyGen: derive all secret material from one master seed.

use super::types::{Pir, SecretKey};
use crate::tdm::{TdmDescriptor, TdmSeeds};

impl Pir {
    /// Derives a secret key. The code key is the seed itself; the five
    /// masking-matrix seeds sit at fixed offsets so the whole key
    /// reconstructs from the one value.
    ///
    /// The masking matrix has one row per answer entry: `M / m1` rows
    /// under LPN slicing, `M` otherwise, and always `N` columns.
    pub fn keygen(&self, seed: u64) -> SecretKey {
        SecretKey {
            linear_code_key: seed,
            tdm: TdmDescriptor {
                rows: self.params.tdm_rows(),
                cols: self.params.n(),
                q: self.params.p,
                seeds: TdmSeeds {
                    left: seed.wrapping_add(1),
                    perm_left: seed.wrapping_add(1 << 10),
                    mid: seed.wrapping_add(1 << 11),
                    perm_right: seed.wrapping_add(1 << 12),
                    right: seed.wrapping_add(1 << 13),
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::PirParams;

    #[test]
    fn test_keygen_is_deterministic() {
        let pir = Pir::new(PirParams::lpn(65537, 64, 32, 8, 4, 7, 0.0)).unwrap();
        assert_eq!(pir.keygen(42), pir.keygen(42));
        assert_ne!(pir.keygen(42), pir.keygen(43));
    }

    #[test]
    fn test_tdm_geometry_follows_masking() {
        let lpn = Pir::new(PirParams::lpn(65537, 64, 32, 8, 4, 7, 0.0)).unwrap();
        let sk = lpn.keygen(1);
        assert_eq!(sk.tdm.rows, 16); // M / m1
        assert_eq!(sk.tdm.cols, 40); // L + K

        let split = Pir::new(PirParams::split_block(65537, 64, 32, 8, 4)).unwrap();
        let sk = split.keygen(1);
        assert_eq!(sk.tdm.rows, 64);
        assert_eq!(sk.tdm.cols, 40);
    }

    #[test]
    fn test_seed_offsets_are_distinct() {
        let pir = Pir::new(PirParams::lpn(65537, 64, 32, 8, 4, 7, 0.0)).unwrap();
        let s = pir.keygen(100).tdm.seeds;
        let all = [s.left, s.perm_left, s.mid, s.perm_right, s.right];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_secret_key_serde_roundtrip() {
        let pir = Pir::new(PirParams::lpn(65537, 64, 32, 8, 4, 7, 0.0)).unwrap();
        let sk = pir.keygen(7);
        let bytes = bincode::serialize(&sk).unwrap();
        assert_eq!(bincode::deserialize::<SecretKey>(&bytes).unwrap(), sk);
    }
}
