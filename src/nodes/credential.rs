use rand::distr::Alphanumeric;
use rand::Rng;

pub const CREDENTIAL_LEN: usize = 32;

/// Fresh node communication secret.
pub fn generate_node_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(CREDENTIAL_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passwords_are_long_alphanumeric_and_distinct() {
        let first = generate_node_password();
        let second = generate_node_password();
        assert_eq!(first.len(), CREDENTIAL_LEN);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(first, second);
    }
}
