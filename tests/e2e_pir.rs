//! End-to-end protocol correctness tests.
//!
//! Full flow for every variant: KeyGen → Encode → Query → Answer →
//! Decode = one linear functional of every database row.

use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use rlc_pir::matrix::{unit_vector, Matrix};
use rlc_pir::params::PirParams;
use rlc_pir::pir::{Aux, Pir, Query, Response, SecretKey};
use rlc_pir::PirError;

const P: u32 = 65537;

fn column(db: &Matrix, col: usize) -> Vec<u32> {
    (0..db.rows).map(|r| db.row(r)[col]).collect()
}

fn run_retrieval(pir: &Pir, db: &Matrix, seed: u64, col: u32) -> Vec<u32> {
    let sk = pir.keygen(seed);
    let masks = pir.generate_masks(&sk).unwrap();
    let encoded = pir.encode(&sk, db, &masks).unwrap();

    let mut rng = ChaCha20Rng::seed_from_u64(seed ^ 0x5eed);
    let (query, aux) = pir.query(&sk, &unit_vector(db.cols, col), &mut rng).unwrap();
    let response = pir.answer(&encoded, &query).unwrap();
    pir.decode(&response, &aux).unwrap()
}

#[test]
fn test_e2e_lpn_full_size() {
    let params = PirParams::lpn(P, 1024, 1024, 16, 4, 7, (2.0f64).powi(-40));
    let pir = Pir::new(params).unwrap();
    let db = Matrix::random(1024, 1024, P, 31);

    let result = run_retrieval(&pir, &db, 0xC0FFEE, 42);
    assert_eq!(result, column(&db, 42));
}

#[test]
fn test_e2e_lpn_every_column_small() {
    let params = PirParams::lpn(P, 16, 8, 8, 2, 5, 0.0);
    let pir = Pir::new(params).unwrap();
    let db = Matrix::random(16, 8, P, 4);

    for col in 0..8 {
        let result = run_retrieval(&pir, &db, 100 + col as u64, col);
        assert_eq!(result, column(&db, col as usize), "column {}", col);
    }
}

#[test]
fn test_e2e_lpn_noisy_replicas_are_ignored() {
    // Small row length and noticeable noise rate: some replicas carry
    // noise, the rest decode the column exactly. With fewer than m1
    // clean replicas the decoder must refuse rather than emit garbage.
    let params = PirParams::lpn(P, 8, 8, 8, 2, 7, 0.05);
    let pir = Pir::new(params).unwrap();
    let db = Matrix::random(8, 8, P, 9);

    let sk = pir.keygen(77);
    let masks = pir.generate_masks(&sk).unwrap();
    let encoded = pir.encode(&sk, &db, &masks).unwrap();

    let mut rng = ChaCha20Rng::seed_from_u64(123);
    for trial in 0..20 {
        let (query, aux) = pir.query(&sk, &unit_vector(8, 3), &mut rng).unwrap();
        let response = pir.answer(&encoded, &query).unwrap();

        let clean = match &aux {
            Aux::Lpn { noisy_replicas, .. } => noisy_replicas.iter().filter(|&&f| !f).count(),
            _ => unreachable!(),
        };
        match pir.decode(&response, &aux) {
            Ok(result) => {
                assert!(clean >= 2, "trial {}", trial);
                assert_eq!(result, column(&db, 3), "trial {}", trial);
            }
            Err(PirError::InsufficientShares { .. }) => assert!(clean < 2, "trial {}", trial),
            Err(e) => panic!("unexpected error in trial {}: {}", trial, e),
        }
    }
}

#[test]
fn test_e2e_lpn_multi_column_selector() {
    // A selector with two ones returns the sum of two columns.
    let params = PirParams::lpn(P, 16, 8, 8, 2, 5, 0.0);
    let pir = Pir::new(params).unwrap();
    let db = Matrix::random(16, 8, P, 5);

    let sk = pir.keygen(200);
    let masks = pir.generate_masks(&sk).unwrap();
    let encoded = pir.encode(&sk, &db, &masks).unwrap();

    let mut selector = unit_vector(8, 1);
    selector[6] = 1;
    let mut rng = ChaCha20Rng::seed_from_u64(8);
    let (query, aux) = pir.query(&sk, &selector, &mut rng).unwrap();
    let response = pir.answer(&encoded, &query).unwrap();
    let result = pir.decode(&response, &aux).unwrap();

    let expected: Vec<u32> = (0..16)
        .map(|r| ((db.row(r)[1] as u64 + db.row(r)[6] as u64) % P as u64) as u32)
        .collect();
    assert_eq!(result, expected);
}

#[test]
fn test_e2e_encode_constant_database_replicates_slices() {
    // Every row identical means every systematic slice is identical,
    // and the erasure code of a constant message is that constant, so
    // once the masks are stripped all replica slices must agree.
    let params = PirParams::lpn(P, 16, 8, 8, 4, 7, 0.0);
    let pir = Pir::new(params).unwrap();
    let db = Matrix {
        rows: 16,
        cols: 8,
        data: vec![7u32; 16 * 8],
    };

    let sk = pir.keygen(61);
    let masks = pir.generate_masks(&sk).unwrap();
    let encoded = pir.encode(&sk, &db, &masks).unwrap();

    // 4 rows per slice, each widened to N = 16.
    let entries = 4 * 16;
    let field = pir.field().clone();
    let mut slices = Vec::new();
    for (t, mask) in masks.iter().enumerate() {
        let mut slice = encoded.data[t * entries..(t + 1) * entries].to_vec();
        field.sub_vectors(&mut slice, 0, mask, 0, entries).unwrap();
        slices.push(slice);
    }
    for (t, slice) in slices.iter().enumerate().skip(1) {
        assert_eq!(slice, &slices[0], "replica slice {}", t);
    }
}

#[test]
fn test_e2e_split_block() {
    let params = PirParams::split_block(P, 64, 32, 8, 4);
    let pir = Pir::new(params).unwrap();
    let db = Matrix::random(64, 32, P, 11);

    for col in [0u32, 7, 31] {
        let result = run_retrieval(&pir, &db, 300 + col as u64, col);
        assert_eq!(result, column(&db, col as usize), "column {}", col);
    }
}

#[test]
fn test_e2e_ring() {
    let params = PirParams::ring(P, 64, 32, 8, 4);
    let pir = Pir::new(params).unwrap();
    let db = Matrix::random(64, 32, P, 12);

    for col in [0u32, 13, 31] {
        let result = run_retrieval(&pir, &db, 400 + col as u64, col);
        assert_eq!(result, column(&db, col as usize), "column {}", col);
    }
}

#[test]
fn test_e2e_key_independence() {
    // Two keys over the same database produce different encodings but
    // the same retrieved column.
    let params = PirParams::lpn(P, 16, 8, 8, 2, 5, 0.0);
    let pir = Pir::new(params).unwrap();
    let db = Matrix::random(16, 8, P, 21);

    let sk_a = pir.keygen(1);
    let sk_b = pir.keygen(2);
    let enc_a = pir
        .encode(&sk_a, &db, &pir.generate_masks(&sk_a).unwrap())
        .unwrap();
    let enc_b = pir
        .encode(&sk_b, &db, &pir.generate_masks(&sk_b).unwrap())
        .unwrap();
    assert_ne!(enc_a.data, enc_b.data);

    assert_eq!(run_retrieval(&pir, &db, 1, 4), column(&db, 4));
    assert_eq!(run_retrieval(&pir, &db, 2, 4), column(&db, 4));
}

#[test]
fn test_e2e_artifacts_survive_serialization() {
    // The server round trips its inputs and outputs through bincode, as
    // it would over a wire.
    let params = PirParams::split_block(P, 64, 32, 8, 4);
    let pir = Pir::new(params).unwrap();
    let db = Matrix::random(64, 32, P, 14);

    let sk = pir.keygen(55);
    let sk: SecretKey = bincode::deserialize(&bincode::serialize(&sk).unwrap()).unwrap();

    let masks = pir.generate_masks(&sk).unwrap();
    let encoded = pir.encode(&sk, &db, &masks).unwrap();
    let encoded: Matrix = bincode::deserialize(&bincode::serialize(&encoded).unwrap()).unwrap();

    let mut rng = ChaCha20Rng::seed_from_u64(99);
    let (query, aux) = pir.query(&sk, &unit_vector(32, 17), &mut rng).unwrap();
    let query: Query = bincode::deserialize(&bincode::serialize(&query).unwrap()).unwrap();

    let response = pir.answer(&encoded, &query).unwrap();
    let response: Response =
        bincode::deserialize(&bincode::serialize(&response).unwrap()).unwrap();

    assert_eq!(pir.decode(&response, &aux).unwrap(), column(&db, 17));
}
