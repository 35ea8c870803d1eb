//! Cryptex ring mechanics
//!
//! Two concentric letter rings rotate independently. Pure math lives in
//! `geometry`; the drag state machine lives in `gesture`. No DOM access.

pub mod geometry;
pub mod gesture;

pub use geometry::{
    GlyphPlacement, alignment_offset, glyph_layout, letter_index, ring_radius, snap,
};
pub use gesture::{Gesture, RingAssembly, RingKind, RingSnapshot};
