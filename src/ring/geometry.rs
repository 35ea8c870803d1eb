//! Ring geometry
//!
//! Rotations are in degrees and unbounded: dragging round twice yields 720,
//! not 0. Only the derived letter index wraps.

use glam::Vec2;

use crate::consts::{ALPHABET_LEN, FIRST_GLYPH_DEG, GLYPH_INSET, STEP_DEG};
use crate::polar_to_cartesian;

/// Round a rotation to the nearest letter position
#[inline]
pub fn snap(rotation: f32) -> f32 {
    (rotation / STEP_DEG).round() * STEP_DEG
}

/// Letter position a rotation rests on, in [0, 26)
#[inline]
pub fn letter_index(rotation: f32) -> u8 {
    let steps = (rotation / STEP_DEG).round() as i64;
    steps.rem_euclid(ALPHABET_LEN as i64) as u8
}

/// Decorative offset between the rings, in [0, 26)
#[inline]
pub fn alignment_offset(inner_rotation: f32, outer_rotation: f32) -> u8 {
    let diff = i16::from(letter_index(inner_rotation)) - i16::from(letter_index(outer_rotation));
    diff.rem_euclid(ALPHABET_LEN as i16) as u8
}

/// Radius for a ring's glyphs given the ring element's rendered width
#[inline]
pub fn ring_radius(container_width: f32) -> f32 {
    (container_width / 2.0 - GLYPH_INSET).max(0.0)
}

/// Where one letter sits on its ring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphPlacement {
    pub letter: char,
    /// Angle around the ring center (degrees, -90 = top)
    pub angle_deg: f32,
    pub radius: f32,
}

impl GlyphPlacement {
    /// Offset from the ring center (screen coordinates)
    pub fn offset(&self) -> Vec2 {
        polar_to_cartesian(self.radius, self.angle_deg)
    }
}

/// All 26 letters evenly spaced, `A` at the top
pub fn glyph_layout(radius: f32) -> Vec<GlyphPlacement> {
    (b'A'..=b'Z')
        .enumerate()
        .map(|(i, letter)| GlyphPlacement {
            letter: letter as char,
            angle_deg: i as f32 * STEP_DEG + FIRST_GLYPH_DEG,
            radius,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_rounds_to_nearest_step() {
        assert_eq!(snap(0.0), 0.0);
        assert!((snap(7.0) - STEP_DEG).abs() < 1e-4);
        assert!(snap(6.0).abs() < 1e-4);
        assert!((snap(-7.0) + STEP_DEG).abs() < 1e-4);
        assert!((snap(365.0) - 26.0 * STEP_DEG).abs() < 1e-3);
    }

    #[test]
    fn test_letter_index_wraps_non_negative() {
        assert_eq!(letter_index(0.0), 0);
        assert_eq!(letter_index(STEP_DEG), 1);
        assert_eq!(letter_index(-STEP_DEG), 25);
        assert_eq!(letter_index(360.0), 0);
        assert_eq!(letter_index(-360.0 - 2.0 * STEP_DEG), 24);
    }

    #[test]
    fn test_alignment_offset() {
        assert_eq!(alignment_offset(0.0, 0.0), 0);
        assert_eq!(alignment_offset(3.0 * STEP_DEG, 0.0), 3);
        assert_eq!(alignment_offset(0.0, 3.0 * STEP_DEG), 23);
        assert_eq!(alignment_offset(-STEP_DEG, 720.0), 25);
    }

    #[test]
    fn test_glyph_layout() {
        let glyphs = glyph_layout(100.0);
        assert_eq!(glyphs.len(), 26);
        assert_eq!(glyphs[0].letter, 'A');
        assert_eq!(glyphs[0].angle_deg, -90.0);
        assert_eq!(glyphs[25].letter, 'Z');
        assert!((glyphs[13].angle_deg - 90.0).abs() < 1e-3);

        let top = glyphs[0].offset();
        assert!(top.x.abs() < 1e-3 && (top.y + 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_ring_radius() {
        assert_eq!(ring_radius(300.0), 132.0);
        assert_eq!(ring_radius(10.0), 0.0);
    }
}
