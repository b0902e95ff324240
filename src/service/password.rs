use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Hex SHA-256 of `salt` followed by `password`.
pub fn hash(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn verify(password: &str, salt: &str, expected: &str) -> bool {
    bool::from(hash(password, salt).as_bytes().ct_eq(expected.as_bytes()))
}
