use rand::RngCore;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};

/// `n` cryptographically random bytes from the OS entropy source,
/// hex-encoded. Fresh on every call; a salt is never shared between
/// credentials.
pub fn generate_salt(n: usize) -> String {
    let mut bytes = vec![0u8; n];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hex SHA-256 over the UTF-8 bytes of `password + salt_hex`.
/// Deterministic given the same inputs.
///
/// A single fast digest is acceptable here only because this is a
/// low-threat system; a hardened deployment would swap in a memory-hard
/// KDF behind the same three-function interface.
pub fn hash_password(password: &str, salt_hex: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hasher.update(salt_hex.as_bytes());
    hex::encode(hasher.finalize())
}

/// Recomputes the hash and compares it to the expected value in constant
/// time. Never errors; a malformed or empty expected hash simply fails the
/// comparison.
pub fn validate_password(password: &str, salt_hex: &str, expected_hash_hex: &str) -> bool {
    let computed = hash_password(password, salt_hex);
    constant_time_eq(computed.as_bytes(), expected_hash_hex.as_bytes())
}

/// Byte comparison whose running time does not depend on where the first
/// mismatch occurs. The length check is folded into the accumulator rather
/// than short-circuited.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let mut diff = a.len() ^ b.len();
    for i in 0..a.len().min(b.len()) {
        diff |= usize::from(a[i] ^ b[i]);
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let salt = generate_salt(16);
        assert_eq!(hash_password("hunter2", &salt), hash_password("hunter2", &salt));
    }

    #[test]
    fn salt_is_fresh_on_every_call() {
        assert_ne!(generate_salt(16), generate_salt(16));
        assert_eq!(generate_salt(16).len(), 32);
    }

    #[test]
    fn validate_accepts_matching_password() {
        let salt = generate_salt(16);
        let hash = hash_password("hunter2", &salt);
        assert!(validate_password("hunter2", &salt, &hash));
    }

    #[test]
    fn validate_rejects_wrong_password() {
        let salt = generate_salt(16);
        let hash = hash_password("hunter2", &salt);
        assert!(!validate_password("hunter3", &salt, &hash));
        assert!(!validate_password("", &salt, &hash));
    }

    #[test]
    fn validate_rejects_wrong_salt() {
        let hash = hash_password("hunter2", &generate_salt(16));
        assert!(!validate_password("hunter2", &generate_salt(16), &hash));
    }

    #[test]
    fn validate_rejects_empty_or_truncated_expected_hash() {
        let salt = generate_salt(16);
        let hash = hash_password("hunter2", &salt);
        assert!(!validate_password("hunter2", &salt, ""));
        assert!(!validate_password("hunter2", &salt, &hash[..hash.len() - 2]));
    }

    #[test]
    fn constant_time_eq_handles_length_mismatch() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(!constant_time_eq(b"", b"x"));
        assert!(constant_time_eq(b"", b""));
    }
}
