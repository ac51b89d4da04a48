//! Experiment assignment
//!
//! Pure, stateless session → variant mapping. The session id is hashed with
//! SHA-256 (stable across processes, restarts, and architectures, unlike the
//! std hasher) into a basis-point bucket; buckets below the configured split
//! go to Strategy A, the rest to Strategy B. No counter or storage is ever
//! consulted, so no assignment table can drift out of sync.

use cdx_common::events::Variant;
use sha2::{Digest, Sha256};

use crate::{Error, Result};

const BUCKETS: u64 = 10_000;

/// Deterministic hash-based traffic split
#[derive(Debug, Clone, Copy)]
pub struct ExperimentSplit {
    /// Share of sessions assigned to Strategy A, in basis points of 10000
    basis_points: u16,
}

impl ExperimentSplit {
    pub fn new(basis_points: u16) -> Result<Self> {
        if basis_points > BUCKETS as u16 {
            return Err(Error::Config(format!(
                "split basis points must be <= {BUCKETS}, got {basis_points}"
            )));
        }
        Ok(Self { basis_points })
    }

    /// The default 50/50 split
    pub fn even() -> Self {
        Self { basis_points: 5000 }
    }

    /// Map a session id to its variant. Same id, same variant, always.
    pub fn assign(&self, session_id: &str) -> Variant {
        let digest = Sha256::digest(session_id.as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        let bucket = u64::from_be_bytes(prefix) % BUCKETS;
        if bucket < u64::from(self.basis_points) {
            Variant::A
        } else {
            Variant::B
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_is_deterministic() {
        let split = ExperimentSplit::even();
        for session in ["alice", "bob", "sess-42", ""] {
            let first = split.assign(session);
            for _ in 0..50 {
                assert_eq!(split.assign(session), first);
            }
        }
    }

    #[test]
    fn test_assignment_is_stable_across_processes() {
        // Pinned digests: these must never change between runs or hosts
        let split = ExperimentSplit::even();
        assert_eq!(split.assign("alice"), Variant::A);
        assert_eq!(split.assign("bob"), Variant::B);
        assert_eq!(split.assign("sess-42"), Variant::B);
    }

    #[test]
    fn test_extreme_splits() {
        let all_a = ExperimentSplit::new(10_000).unwrap();
        let all_b = ExperimentSplit::new(0).unwrap();
        for i in 0..200 {
            let session = format!("session-{i}");
            assert_eq!(all_a.assign(&session), Variant::A);
            assert_eq!(all_b.assign(&session), Variant::B);
        }
    }

    #[test]
    fn test_even_split_is_roughly_balanced() {
        let split = ExperimentSplit::even();
        let a_count = (0..10_000)
            .filter(|i| split.assign(&format!("session-{i}")) == Variant::A)
            .count();
        // Loose bound; the hash is uniform, not exact
        assert!(
            (4_500..=5_500).contains(&a_count),
            "expected ~5000 A assignments, got {a_count}"
        );
    }

    #[test]
    fn test_invalid_split_rejected() {
        assert!(ExperimentSplit::new(10_001).is_err());
    }
}
