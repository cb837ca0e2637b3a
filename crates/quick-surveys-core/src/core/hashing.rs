// crates/quick-surveys-core/src/core/hashing.rs
// ============================================================================
// Module: Quick Surveys Bucket Hashing
// Description: Deterministic scores and token encoding for coverage bucketing.
// Purpose: Map a (survey, token) pair to a stable point in the unit interval.
// Dependencies: sha2
// ============================================================================

//! ## Overview
//! Bucketing must give the same answer for the same survey and token on every
//! page load. The score is derived from SHA-256 over `"<name>:<token>"`: the
//! top 53 bits of the digest are scaled into `[0, 1)`, which is exactly the
//! precision of an `f64` mantissa.

// ============================================================================
// SECTION: Imports
// ============================================================================

use sha2::Digest;
use sha2::Sha256;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Number of digest bits used for the score.
const SCORE_BITS: u32 = 53;

/// Scale applied to the truncated digest (2^53).
const SCORE_SCALE: f64 = 9_007_199_254_740_992.0;

// ============================================================================
// SECTION: Scoring
// ============================================================================

/// Returns the bucket score of `name` and `token` in `[0, 1)`.
#[must_use]
pub fn bucket_score(name: &str, token: &str) -> f64 {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    hasher.update(b":");
    hasher.update(token.as_bytes());
    let digest = hasher.finalize();
    let mut head = [0_u8; 8];
    head.copy_from_slice(&digest[.. 8]);
    let bits = u64::from_be_bytes(head) >> (64 - SCORE_BITS);
    #[allow(clippy::cast_precision_loss, reason = "53-bit values are exact in f64.")]
    let score = bits as f64 / SCORE_SCALE;
    score
}

// ============================================================================
// SECTION: Hex Encoding
// ============================================================================

/// Encodes bytes as a lowercase hex string.
#[must_use]
pub fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[usize::from(byte >> 4)] as char);
        out.push(HEX[usize::from(byte & 0x0f)] as char);
    }
    out
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests hex output is lowercase and padded.
    #[test]
    fn hex_encode_is_lowercase_and_padded() {
        assert_eq!(hex_encode(&[0x00, 0x0a, 0xff]), "000aff");
    }

    /// Tests scores stay within [0, 1).
    #[test]
    fn score_stays_in_unit_interval() {
        for token in ["", "a", "0123456789abcdef0123", "token with spaces"] {
            let score = bucket_score("survey", token);
            assert!((0.0 .. 1.0).contains(&score));
        }
    }

    /// Tests the score changes with either input.
    #[test]
    fn score_depends_on_both_inputs() {
        assert!((bucket_score("a", "b:c") - bucket_score("a:b", "c")).abs() < f64::EPSILON);
        assert!((bucket_score("one", "t") - bucket_score("two", "t")).abs() > f64::EPSILON);
    }
}
