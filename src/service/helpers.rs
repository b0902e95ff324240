use rand::RngCore;

/// 40 lowercase hex characters of fresh randomness.
pub fn random_hash() -> String {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Integer percentage of `min` over `max`; `0` when `max` is zero.
pub fn get_percent(min: u64, max: u64) -> u64 {
    if max == 0 {
        return 0;
    }
    min.saturating_mul(100) / max
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_hash_is_forty_hex_chars() {
        let a = random_hash();
        let b = random_hash();
        assert_eq!(a.len(), 40);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn percent_handles_zero_and_truncates() {
        assert_eq!(get_percent(5, 0), 0);
        assert_eq!(get_percent(1, 3), 33);
        assert_eq!(get_percent(4, 4), 100);
    }
}
