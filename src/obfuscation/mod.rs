//! Obfuscation of sensitive values before traffic is exported.

pub mod path;

use sha2::{Digest, Sha256};

pub use path::PathObfuscator;

/// Hex SHA-256 of `value`.
pub fn obfuscate_string(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obfuscate_string_is_stable_hex() {
        let hashed = obfuscate_string("1234");
        assert_eq!(hashed.len(), 64);
        assert!(hashed.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hashed, obfuscate_string("1234"));
        assert_ne!(hashed, obfuscate_string("1235"));
    }
}
