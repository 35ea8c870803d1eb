//! Session facade
//!
//! `Cryptex` owns the puzzle store, the session, the rings and the admin
//! panel. Every user intent is a method call; every visible consequence is
//! queued as a [`UiEvent`] for the presentation layer to drain and draw.

use glam::Vec2;

use crate::admin::{
    self, AdminError, AdminPanel, AdminTab, AdminView, INCOMPLETE_NOTICE, PuzzleRow, SAVED_NOTICE,
};
use crate::audio::Tone;
use crate::consts::{ADMIN_SECRET, ERROR_FLASH_MS, RESIZE_RELAYOUT_MS};
use crate::game::{AnswerOutcome, GameFlow, GameSession, LevelView};
use crate::platform::KeyValueStorage;
use crate::puzzles::{Puzzle, PuzzleError, PuzzleStore};
use crate::ring::{GlyphPlacement, RingAssembly, RingSnapshot, glyph_layout, ring_radius};

/// Work that runs after a delay. At most one of each kind is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Deferred {
    /// End the wrong-answer glitch
    HideGlitch,
    /// Re-measure the rings after a resize
    Relayout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Success,
    Glitch,
}

/// Render instructions, in the order they were produced
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    LevelLoaded(LevelView),
    Feedback(Option<&'static str>),
    ShowOverlay(Overlay),
    HideOverlay(Overlay),
    Shake(bool),
    Schedule { task: Deferred, delay_ms: u32 },
    PlayTone(Tone),
    RingsChanged(RingSnapshot),
    OffsetChanged(u8),
    RingLayout {
        outer: Vec<GlyphPlacement>,
        inner: Vec<GlyphPlacement>,
    },
    /// The presentation layer should measure the rings and call
    /// [`Cryptex::layout_rings`]
    MeasureRings,
    PuzzlesChanged { total: usize },
    PuzzleList(Vec<PuzzleRow>),
    AdminViewChanged(AdminView),
    LoginError(Option<&'static str>),
    /// Blocking notice (alert)
    Notice(&'static str),
    ClearCreateForm,
    Preview(String),
    /// Start over from a fresh page
    Reload,
}

/// The whole toy
pub struct Cryptex<S> {
    store: PuzzleStore<S>,
    game: GameFlow,
    admin: AdminPanel,
    rings: RingAssembly,
    events: Vec<UiEvent>,
}

impl<S: KeyValueStorage> Cryptex<S> {
    /// Load puzzles and queue the first frame
    pub fn new(storage: S) -> Self {
        let mut app = Self {
            store: PuzzleStore::load(storage),
            game: GameFlow::new(),
            admin: AdminPanel::new(ADMIN_SECRET),
            rings: RingAssembly::new(),
            events: Vec::new(),
        };
        app.emit_initial();
        app
    }

    /// Take all queued events
    pub fn drain_events(&mut self) -> Vec<UiEvent> {
        std::mem::take(&mut self.events)
    }

    // === Rings ===

    /// Place the letter glyphs for the rings' measured widths
    pub fn layout_rings(&mut self, outer_width: f32, inner_width: f32) {
        self.events.push(UiEvent::RingLayout {
            outer: glyph_layout(ring_radius(outer_width)),
            inner: glyph_layout(ring_radius(inner_width)),
        });
        self.events.push(UiEvent::RingsChanged(self.rings.snapshot()));
    }

    /// Window resized; relayout once things settle
    pub fn on_resize(&mut self) {
        self.events.push(UiEvent::Schedule {
            task: Deferred::Relayout,
            delay_ms: RESIZE_RELAYOUT_MS,
        });
    }

    /// Returns true if a ring was grabbed
    pub fn pointer_down(&mut self, pointer: Vec2, center: Vec2, outer_radius: f32) -> bool {
        if self.rings.pointer_down(pointer, center, outer_radius).is_none() {
            return false;
        }
        self.events.push(UiEvent::RingsChanged(self.rings.snapshot()));
        true
    }

    /// Returns true while a drag is in progress (suppress default handling)
    pub fn pointer_move(&mut self, pointer: Vec2, center: Vec2) -> bool {
        if !self.rings.pointer_move(pointer, center) {
            return false;
        }
        self.events.push(UiEvent::RingsChanged(self.rings.snapshot()));
        true
    }

    pub fn pointer_up(&mut self) {
        if let Some(offset) = self.rings.pointer_up() {
            self.events.push(UiEvent::RingsChanged(self.rings.snapshot()));
            self.events.push(UiEvent::OffsetChanged(offset));
        }
    }

    // === Game flow ===

    pub fn check_answer(&mut self, input: &str) -> Option<AnswerOutcome> {
        let outcome = self.game.check_answer(self.store.puzzles(), input)?;
        match outcome {
            AnswerOutcome::Correct => {
                log::info!("Level {} solved", self.game.session.puzzle_index + 1);
                self.events.push(UiEvent::PlayTone(Tone::Success));
                self.events.push(UiEvent::ShowOverlay(Overlay::Success));
            }
            AnswerOutcome::Wrong => {
                self.events.push(UiEvent::PlayTone(Tone::Error));
                self.events.push(UiEvent::ShowOverlay(Overlay::Glitch));
                self.events.push(UiEvent::Shake(true));
                self.events.push(UiEvent::Feedback(self.game.overlays().feedback));
                self.events.push(UiEvent::Schedule {
                    task: Deferred::HideGlitch,
                    delay_ms: ERROR_FLASH_MS,
                });
            }
        }
        Some(outcome)
    }

    /// Advance and hide the success overlay
    pub fn next_level(&mut self) {
        match self.game.next_level(self.store.puzzles()) {
            Some(view) => self.push_level(view),
            None => self.events.push(UiEvent::HideOverlay(Overlay::Success)),
        }
    }

    /// A deferred task came due
    pub fn fire(&mut self, task: Deferred) {
        match task {
            Deferred::HideGlitch => {
                self.game.hide_glitch();
                self.events.push(UiEvent::HideOverlay(Overlay::Glitch));
                self.events.push(UiEvent::Shake(false));
            }
            Deferred::Relayout => self.events.push(UiEvent::MeasureRings),
        }
    }

    // === Admin ===

    pub fn toggle_admin(&mut self) {
        let view = self.admin.toggle(&self.game.session);
        self.push_admin_view(view);
    }

    pub fn login(&mut self, password: &str) -> Result<(), AdminError> {
        let result = self.admin.login(&mut self.game.session, password);
        self.events.push(UiEvent::LoginError(self.admin.login_error()));
        if result.is_ok() {
            self.push_admin_view(self.admin.view());
            self.push_puzzle_count();
        }
        result
    }

    pub fn switch_tab(&mut self, tab: AdminTab) -> Result<(), AdminError> {
        self.admin.switch_tab(&self.game.session, tab)?;
        self.push_admin_view(self.admin.view());
        Ok(())
    }

    /// Live ciphertext for the create form
    pub fn preview(&mut self, answer: &str, shift_field: &str) {
        let text = admin::preview(answer, shift_field);
        self.events.push(UiEvent::Preview(text));
    }

    pub fn create_puzzle(
        &mut self,
        answer: &str,
        shift_field: &str,
        hint: &str,
    ) -> Result<usize, AdminError> {
        let was_empty = self.store.is_empty();
        match self
            .admin
            .create(&self.game.session, &mut self.store, answer, shift_field, hint)
        {
            Ok(index) => {
                self.events.push(UiEvent::Notice(SAVED_NOTICE));
                self.events.push(UiEvent::ClearCreateForm);
                self.events.push(UiEvent::Preview(String::new()));
                self.push_puzzle_count();
                if was_empty {
                    self.reload_level();
                }
                Ok(index)
            }
            Err(e) => {
                self.report(&e);
                Err(e)
            }
        }
    }

    pub fn delete_puzzle(
        &mut self,
        index: usize,
        confirm: impl FnOnce(&str) -> bool,
    ) -> Result<Puzzle, AdminError> {
        let removed = self
            .admin
            .delete(&self.game.session, &mut self.store, index, confirm)
            .inspect_err(|e| self.report(e))?;

        self.game.on_collection_shrunk(self.store.len());
        self.events.push(UiEvent::PuzzleList(admin::list_rows(self.store.puzzles())));
        self.push_puzzle_count();
        self.reload_level();
        Ok(removed)
    }

    /// Wipe storage and restart the whole session
    pub fn clear_all(&mut self, confirm: impl FnOnce(&str) -> bool) -> Result<(), AdminError> {
        self.admin
            .clear_all(&self.game.session, &mut self.store, confirm)
            .inspect_err(|e| self.report(e))?;

        self.game = GameFlow::new();
        self.rings = RingAssembly::new();
        self.events.clear();
        self.events.push(UiEvent::AdminViewChanged(AdminView::Closed));
        self.emit_initial();
        self.events.push(UiEvent::Reload);
        Ok(())
    }

    // === Accessors ===

    pub fn session(&self) -> &GameSession {
        &self.game.session
    }

    pub fn game(&self) -> &GameFlow {
        &self.game
    }

    pub fn puzzles(&self) -> &[Puzzle] {
        self.store.puzzles()
    }

    pub fn rings(&self) -> &RingAssembly {
        &self.rings
    }

    pub fn admin_view(&self) -> AdminView {
        self.admin.view()
    }

    pub fn storage(&self) -> &S {
        self.store.storage()
    }

    // === Internals ===

    fn emit_initial(&mut self) {
        self.events.push(UiEvent::MeasureRings);
        self.events.push(UiEvent::OffsetChanged(self.rings.offset()));
        self.push_puzzle_count();
        self.reload_level();
    }

    fn reload_level(&mut self) {
        if let Some(view) = self.game.load_level(self.store.puzzles()) {
            self.push_level(view);
        }
    }

    fn push_level(&mut self, view: LevelView) {
        self.events.push(UiEvent::LevelLoaded(view));
        self.events.push(UiEvent::Feedback(None));
        self.events.push(UiEvent::HideOverlay(Overlay::Success));
    }

    fn push_puzzle_count(&mut self) {
        self.events.push(UiEvent::PuzzlesChanged {
            total: self.store.len(),
        });
    }

    fn push_admin_view(&mut self, view: AdminView) {
        self.events.push(UiEvent::AdminViewChanged(view));
        if view == AdminView::Dashboard(AdminTab::List) {
            self.events
                .push(UiEvent::PuzzleList(admin::list_rows(self.store.puzzles())));
        }
    }

    fn report(&mut self, error: &AdminError) {
        match error {
            AdminError::Puzzle(PuzzleError::MissingAnswer | PuzzleError::MissingHint) => {
                self.events.push(UiEvent::Notice(INCOMPLETE_NOTICE));
            }
            AdminError::Puzzle(PuzzleError::Storage(e)) => {
                log::error!("Puzzle storage failed: {}", e);
            }
            AdminError::Cancelled => {}
            other => log::warn!("Admin action rejected: {}", other),
        }
    }
}
