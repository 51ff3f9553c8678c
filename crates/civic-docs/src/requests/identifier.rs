use rand::Rng;

use super::domain::RequestId;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const CODE_RANDOM_LEN: usize = 10;

/// Mint a request code for the given document type.
///
/// The shape is `<INITIALS><10 random alphanumerics>-<3-digit number>`, where
/// the initials are the first letter of each word in the document type,
/// uppercased. The generator never consults the store; collisions surface as
/// insert conflicts and the caller remints.
pub fn mint(document_type: &str) -> RequestId {
    let mut code: String = document_type
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .map(|first| first.to_ascii_uppercase())
        .collect();

    let mut rng = rand::rng();
    for _ in 0..CODE_RANDOM_LEN {
        let idx = rng.random_range(0..CODE_ALPHABET.len());
        code.push(CODE_ALPHABET[idx] as char);
    }

    let suffix: u16 = rng.random_range(100..1000);
    RequestId(format!("{code}-{suffix}"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn codes_start_with_uppercased_initials() {
        assert!(mint("Barangay Clearance").as_str().starts_with("BC"));
        assert!(mint("certificate of indigency").as_str().starts_with("COI"));
        assert!(mint("Business Permit").as_str().starts_with("BP"));
    }

    #[test]
    fn codes_carry_random_body_and_numeric_suffix() {
        let id = mint("Barangay Clearance");
        let (body, suffix) = id.as_str().split_once('-').expect("hyphenated code");
        assert_eq!(body.len(), "BC".len() + CODE_RANDOM_LEN);
        assert!(body.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(suffix.len(), 3);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn single_word_types_get_single_initials() {
        let id = mint("Indigency");
        assert!(id.as_str().starts_with('I'));
        let (body, _) = id.as_str().split_once('-').expect("hyphenated code");
        assert_eq!(body.len(), 1 + CODE_RANDOM_LEN);
    }

    #[test]
    fn repeated_mints_diverge() {
        let mut seen = HashSet::new();
        for _ in 0..128 {
            assert!(seen.insert(mint("Business Permit").0), "duplicate code minted");
        }
    }
}
