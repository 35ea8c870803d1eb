//! Drag gesture state machine
//!
//! `Idle -> Dragging(ring) -> Idle`. A gesture grabs exactly one ring, chosen
//! by how far from the center it started, and snaps that ring on release.

use glam::Vec2;

use super::geometry::{alignment_offset, snap};
use crate::angle_deg;
use crate::consts::INNER_RING_RATIO;

/// Which ring a gesture controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RingKind {
    Inner,
    Outer,
}

/// Current gesture
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging {
        ring: RingKind,
        /// Pointer angle when the drag began (degrees)
        start_angle: f32,
        /// Ring rotation when the drag began (degrees)
        baseline: f32,
    },
}

/// Render-facing copy of the ring state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingSnapshot {
    pub inner_rotation: f32,
    pub outer_rotation: f32,
    /// False while the inner ring follows the pointer (no CSS transition)
    pub inner_animated: bool,
    pub outer_animated: bool,
}

/// Both rings plus the gesture driving them
#[derive(Debug, Clone)]
pub struct RingAssembly {
    inner_rotation: f32,
    outer_rotation: f32,
    inner_animated: bool,
    outer_animated: bool,
    gesture: Gesture,
}

impl Default for RingAssembly {
    fn default() -> Self {
        Self {
            inner_rotation: 0.0,
            outer_rotation: 0.0,
            inner_animated: true,
            outer_animated: true,
            gesture: Gesture::Idle,
        }
    }
}

impl RingAssembly {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a drag. `outer_radius` is half the assembly's rendered width.
    /// Returns the grabbed ring, or `None` if a drag is already active.
    pub fn pointer_down(
        &mut self,
        pointer: Vec2,
        center: Vec2,
        outer_radius: f32,
    ) -> Option<RingKind> {
        if self.is_dragging() {
            return None;
        }

        let ring = if pointer.distance(center) < outer_radius * INNER_RING_RATIO {
            RingKind::Inner
        } else {
            RingKind::Outer
        };

        let baseline = self.rotation(ring);
        self.set_animated(ring, false);
        self.gesture = Gesture::Dragging {
            ring,
            start_angle: angle_deg(pointer, center),
            baseline,
        };
        Some(ring)
    }

    /// Follow the pointer. Returns true when a ring moved (and the caller
    /// should suppress scrolling/selection for this event).
    pub fn pointer_move(&mut self, pointer: Vec2, center: Vec2) -> bool {
        let Gesture::Dragging { start_angle, .. } = self.gesture else {
            return false;
        };
        self.drag_by(angle_deg(pointer, center) - start_angle)
    }

    /// Set the dragged ring to its baseline plus `delta` degrees
    pub fn drag_by(&mut self, delta: f32) -> bool {
        let Gesture::Dragging { ring, baseline, .. } = self.gesture else {
            return false;
        };
        self.set_rotation(ring, baseline + delta);
        true
    }

    /// End the drag: snap, re-enable the settle transition, and return the
    /// new alignment offset. `None` when no drag was active.
    pub fn pointer_up(&mut self) -> Option<u8> {
        let Gesture::Dragging { ring, .. } = self.gesture else {
            return None;
        };

        let settled = snap(self.rotation(ring));
        log::debug!("{:?} ring settled at {:.2} deg", ring, settled);
        self.set_rotation(ring, settled);
        self.set_animated(ring, true);
        self.gesture = Gesture::Idle;
        Some(self.offset())
    }

    /// Decorative alignment offset between the rings
    pub fn offset(&self) -> u8 {
        alignment_offset(self.inner_rotation, self.outer_rotation)
    }

    pub fn rotation(&self, ring: RingKind) -> f32 {
        match ring {
            RingKind::Inner => self.inner_rotation,
            RingKind::Outer => self.outer_rotation,
        }
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, Gesture::Dragging { .. })
    }

    pub fn snapshot(&self) -> RingSnapshot {
        RingSnapshot {
            inner_rotation: self.inner_rotation,
            outer_rotation: self.outer_rotation,
            inner_animated: self.inner_animated,
            outer_animated: self.outer_animated,
        }
    }

    fn set_rotation(&mut self, ring: RingKind, rotation: f32) {
        match ring {
            RingKind::Inner => self.inner_rotation = rotation,
            RingKind::Outer => self.outer_rotation = rotation,
        }
    }

    fn set_animated(&mut self, ring: RingKind, animated: bool) {
        match ring {
            RingKind::Inner => self.inner_animated = animated,
            RingKind::Outer => self.outer_animated = animated,
        }
    }
}
