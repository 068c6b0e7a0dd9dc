// src/utils/random.rs

use rand::Rng;

use crate::config::RANDOM_SUFFIX_LENGTH;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Random lowercase-alphanumeric string of the given length.
pub fn random_string(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Default quiz path for a freshly created quiz.
pub fn random_quiz_path() -> String {
    random_string(RANDOM_SUFFIX_LENGTH)
}

/// Collision-avoiding participant username. The display name is not unique on its own.
pub fn participant_username(display_name: &str) -> String {
    format!("{}+{}", display_name, random_string(RANDOM_SUFFIX_LENGTH))
}

/// Five-digit one-time verification code.
pub fn verify_code() -> u32 {
    rand::thread_rng().gen_range(11111..=99999)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_string_alphabet() {
        let s = random_string(64);
        assert_eq!(s.len(), 64);
        assert!(s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_participant_username_suffix() {
        let name = participant_username("alice");
        let (display, suffix) = name.split_once('+').unwrap();
        assert_eq!(display, "alice");
        assert_eq!(suffix.len(), RANDOM_SUFFIX_LENGTH);
    }

    #[test]
    fn test_verify_code_has_five_digits() {
        for _ in 0..100 {
            let code = verify_code();
            assert!((11111..=99999).contains(&code));
        }
    }
}
