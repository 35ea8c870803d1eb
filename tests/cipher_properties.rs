use std::collections::HashSet;

use cryptex::consts::STEP_DEG;
use cryptex::ring::{RingAssembly, RingKind, letter_index, snap};
use cryptex::{decrypt, encrypt, normalize_shift};
use glam::Vec2;
use proptest::prelude::*;

proptest! {
    #[test]
    fn decrypt_inverts_encrypt(text in "[A-Z]{0,40}", shift in any::<i32>()) {
        prop_assert_eq!(decrypt(&encrypt(&text, shift), shift), text);
    }

    #[test]
    fn encrypt_permutes_alphabet(shift in -1000i32..1000) {
        let alphabet: String = ('A'..='Z').collect();
        let rotated = encrypt(&alphabet, shift);
        let distinct: HashSet<char> = rotated.chars().collect();
        prop_assert_eq!(distinct.len(), 26);
        prop_assert!(rotated.chars().all(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn non_letters_are_invariant(text in "[a-z0-9 .,!?éãç-]{0,40}", shift in any::<i32>()) {
        prop_assert_eq!(encrypt(&text, shift), text);
    }

    #[test]
    fn shift_is_periodic(text in "[A-Z ]{0,30}", shift in -500i32..500) {
        prop_assert_eq!(encrypt(&text, shift), encrypt(&text, shift + 26));
        prop_assert_eq!(encrypt(&text, 26), encrypt(&text, 0));
        prop_assert_eq!(encrypt(&text, 0), text);
    }

    #[test]
    fn normalized_shift_in_range(shift in any::<i32>()) {
        prop_assert!(normalize_shift(shift) < 26);
    }

    #[test]
    fn gesture_settles_on_snapped_rotation(delta in -720.0f32..720.0) {
        let center = Vec2::new(150.0, 150.0);
        let mut rings = RingAssembly::new();
        rings.pointer_down(Vec2::new(290.0, 150.0), center, 150.0);
        rings.drag_by(delta);
        rings.pointer_up();

        let rot = rings.rotation(RingKind::Outer);
        prop_assert!((rot - snap(delta)).abs() < 1e-3);
        // Always lands on a letter position
        let steps = rot / STEP_DEG;
        prop_assert!((steps - steps.round()).abs() < 1e-3);
    }

    #[test]
    fn letter_index_in_range(rot in -10_000.0f32..10_000.0) {
        prop_assert!(letter_index(rot) < 26);
    }
}
