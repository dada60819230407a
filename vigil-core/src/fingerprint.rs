//! Content fingerprinting
//!
//! Fingerprints identify frame content, not frame identity: identical bytes
//! delivered twice produce the same fingerprint and can short-circuit to the
//! same cached result.

use sha2::{Digest, Sha256};

/// Hex length kept from the full SHA-256 digest
const FINGERPRINT_LEN: usize = 16;

/// Compute the truncated-hex content fingerprint of a byte slice
pub fn fingerprint_hex(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())[..FINGERPRINT_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_is_stable() {
        let a = fingerprint_hex(b"frame bytes");
        let b = fingerprint_hex(b"frame bytes");
        assert_eq!(a, b);
        assert_eq!(a.len(), FINGERPRINT_LEN);
    }

    #[test]
    fn test_fingerprint_differs_by_content() {
        assert_ne!(fingerprint_hex(b"frame a"), fingerprint_hex(b"frame b"));
    }
}
