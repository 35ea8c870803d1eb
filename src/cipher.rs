//! Caesar cipher over the uppercase Latin alphabet
//!
//! Only `A`..=`Z` rotate. Everything else, including lowercase and accented
//! letters, is copied through untouched.

use crate::consts::ALPHABET_LEN;

/// Fold any integer shift into [0, 26)
#[inline]
pub fn normalize_shift(shift: i32) -> u8 {
    let n = ALPHABET_LEN as i32;
    (((shift % n) + n) % n) as u8
}

/// Rotate a single character by an already-normalized shift
#[inline]
fn rotate(c: char, shift: u8) -> char {
    if c.is_ascii_uppercase() {
        let pos = c as u8 - b'A';
        (b'A' + (pos + shift) % ALPHABET_LEN as u8) as char
    } else {
        c
    }
}

/// Encrypt `text` with the given shift.
///
/// Stored shifts may be negative or larger than 25 (hand-edited storage,
/// unvalidated admin input); they are normalized here instead of rejected.
pub fn encrypt(text: &str, shift: i32) -> String {
    let shift = normalize_shift(shift);
    text.chars().map(|c| rotate(c, shift)).collect()
}

/// Undo [`encrypt`] for the same shift
pub fn decrypt(text: &str, shift: i32) -> String {
    let inverse = ALPHABET_LEN as i32 - i32::from(normalize_shift(shift));
    encrypt(text, inverse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_known_word() {
        assert_eq!(encrypt("CHAVE", 5), "HMFAJ");
        assert_eq!(encrypt("FUTURO", 3), "IXWXUR");
    }

    #[test]
    fn test_encrypt_wraps_past_z() {
        assert_eq!(encrypt("XYZ", 3), "ABC");
    }

    #[test]
    fn test_non_letters_pass_through() {
        assert_eq!(encrypt("A B-1 é z!", 1), "B C-1 é z!");
    }

    #[test]
    fn test_negative_and_large_shifts() {
        assert_eq!(encrypt("ABC", -1), "ZAB");
        assert_eq!(encrypt("ABC", 27), "BCD");
        assert_eq!(encrypt("ABC", -27), "ZAB");
        assert_eq!(encrypt("ABC", i32::MIN), encrypt("ABC", normalize_shift(i32::MIN) as i32));
    }

    #[test]
    fn test_normalize_shift_range() {
        assert_eq!(normalize_shift(0), 0);
        assert_eq!(normalize_shift(26), 0);
        assert_eq!(normalize_shift(-1), 25);
        assert_eq!(normalize_shift(-26), 0);
        assert_eq!(normalize_shift(53), 1);
    }

    #[test]
    fn test_decrypt_reverses() {
        assert_eq!(decrypt("HMFAJ", 5), "CHAVE");
        assert_eq!(decrypt(&encrypt("SENHA", -40), -40), "SENHA");
    }
}
