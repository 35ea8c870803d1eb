//! Level flow and answer checking
//!
//! All state that lives only for the page session is held in
//! [`GameSession`]; nothing here is persisted.

use crate::puzzles::Puzzle;

/// Feedback text shown under the answer box after a wrong guess
pub const WRONG_ANSWER_MESSAGE: &str = "ERRO DE CRIPTOGRAFIA";

/// Per-page-load session state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameSession {
    /// Index of the active puzzle (0-based)
    pub puzzle_index: usize,
    /// Set by a successful admin login, never persisted
    pub admin_logged_in: bool,
}

/// Everything needed to draw the current puzzle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelView {
    /// 1-based level number
    pub level_number: usize,
    pub total: usize,
    pub hint: String,
    pub ciphertext: String,
}

/// Result of submitting an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct,
    Wrong,
}

/// Visual state layered over the puzzle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overlays {
    /// "Decrypted!" panel with the next-level button
    pub success: bool,
    /// Red glitch overlay plus screen shake
    pub glitch: bool,
    /// Message under the answer box
    pub feedback: Option<&'static str>,
}

/// Game flow controller
#[derive(Debug, Clone, Default)]
pub struct GameFlow {
    pub session: GameSession,
    overlays: Overlays,
}

impl GameFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the view for the active puzzle and reset transient feedback.
    /// Returns `None` when there are no puzzles.
    pub fn load_level(&mut self, puzzles: &[Puzzle]) -> Option<LevelView> {
        if puzzles.is_empty() {
            return None;
        }
        if self.session.puzzle_index >= puzzles.len() {
            self.session.puzzle_index = 0;
        }

        let puzzle = &puzzles[self.session.puzzle_index];
        self.overlays = Overlays::default();
        log::info!("Level {} loaded", self.session.puzzle_index + 1);

        Some(LevelView {
            level_number: self.session.puzzle_index + 1,
            total: puzzles.len(),
            hint: puzzle.hint.clone(),
            ciphertext: puzzle.ciphertext(),
        })
    }

    /// Compare a typed answer (case-insensitive, trimmed) with the plaintext.
    /// `None` when there is no active puzzle.
    pub fn check_answer(&mut self, puzzles: &[Puzzle], input: &str) -> Option<AnswerOutcome> {
        let puzzle = self.current(puzzles)?;
        let answer = input.trim().to_uppercase();

        if answer == puzzle.text {
            self.overlays.success = true;
            Some(AnswerOutcome::Correct)
        } else {
            self.overlays.glitch = true;
            self.overlays.feedback = Some(WRONG_ANSWER_MESSAGE);
            Some(AnswerOutcome::Wrong)
        }
    }

    /// Deferred end of the wrong-answer glitch. The feedback text stays.
    pub fn hide_glitch(&mut self) {
        self.overlays.glitch = false;
    }

    /// Dismiss the success panel and move to the next puzzle, wrapping to
    /// the first after the last.
    pub fn next_level(&mut self, puzzles: &[Puzzle]) -> Option<LevelView> {
        self.overlays.success = false;
        if puzzles.is_empty() {
            return None;
        }
        self.session.puzzle_index = (self.session.puzzle_index + 1) % puzzles.len();
        self.load_level(puzzles)
    }

    /// Keep the active index valid after puzzles were removed
    pub fn on_collection_shrunk(&mut self, len: usize) {
        if self.session.puzzle_index >= len {
            self.session.puzzle_index = 0;
        }
    }

    pub fn current<'a>(&self, puzzles: &'a [Puzzle]) -> Option<&'a Puzzle> {
        puzzles.get(self.session.puzzle_index)
    }

    pub fn overlays(&self) -> &Overlays {
        &self.overlays
    }
}
