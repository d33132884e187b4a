//! Erasure coding for noisy-position recovery.
//!
//! The LPN variant deliberately corrupts a few query positions; the
//! decoder sees which positions were corrupted (the client chose them)
//! and recovers the clean record from the redundant ones. A systematic
//! Reed-Solomon code over the protocol field does that recovery.

mod reed_solomon;

pub use reed_solomon::ReedSolomonCode;
