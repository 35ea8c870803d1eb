//! Cryptex - a dual-ring rotary cipher toy
//!
//! Core modules:
//! - `cipher`: Caesar alphabet rotation
//! - `puzzles`: Ordered puzzle collection persisted in key-value storage
//! - `ring`: Ring rotation, drag gestures and snapping
//! - `game`: Level flow and answer checking
//! - `admin`: Password-gated puzzle management
//! - `app`: Session facade that turns user intents into UI events
//! - `platform`: Storage and deferred-task abstraction (browser/native)
//! - `audio`: Procedural feedback tones

pub mod admin;
pub mod app;
pub mod audio;
pub mod cipher;
pub mod game;
pub mod platform;
pub mod puzzles;
pub mod ring;

pub use app::{Cryptex, UiEvent};
pub use cipher::{decrypt, encrypt, normalize_shift};
pub use puzzles::{Puzzle, PuzzleError, PuzzleStore};

use glam::Vec2;

/// Configuration constants
pub mod consts {
    /// Admin panel password.
    ///
    /// Plaintext and compiled into the wasm bundle: this is a cosmetic gate
    /// for the puzzle editor, NOT a security control.
    pub const ADMIN_SECRET: &str = "123";

    /// LocalStorage key holding the JSON puzzle array
    pub const PUZZLES_STORAGE_KEY: &str = "cryptex_v7_db";

    /// Letters on each ring
    pub const ALPHABET_LEN: usize = 26;
    /// Angular distance between two adjacent letters (degrees)
    pub const STEP_DEG: f32 = 360.0 / ALPHABET_LEN as f32;
    /// Pointer closer than this fraction of the outer radius grabs the inner ring
    pub const INNER_RING_RATIO: f32 = 0.62;
    /// Distance between a ring's edge and its letter glyphs (px)
    pub const GLYPH_INSET: f32 = 18.0;
    /// Angle of the first letter (A sits at the top)
    pub const FIRST_GLYPH_DEG: f32 = -90.0;

    /// CSS transition used when a ring settles after a drag
    pub const SETTLE_TRANSITION: &str = "transform 0.4s cubic-bezier(0.175, 0.885, 0.32, 1.275)";

    /// How long the wrong-answer glitch stays visible (ms)
    pub const ERROR_FLASH_MS: u32 = 500;
    /// Delay before re-laying out the rings after a window resize (ms)
    pub const RESIZE_RELAYOUT_MS: u32 = 100;
}

/// Angle of `point` around `center` in degrees, screen coordinates (y down)
#[inline]
pub fn angle_deg(point: Vec2, center: Vec2) -> f32 {
    let d = point - center;
    d.y.atan2(d.x).to_degrees()
}

/// Convert polar (r, degrees) to cartesian offset from the ring center
#[inline]
pub fn polar_to_cartesian(r: f32, degrees: f32) -> Vec2 {
    let theta = degrees.to_radians();
    Vec2::new(r * theta.cos(), r * theta.sin())
}
