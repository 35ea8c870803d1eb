//! Password-gated puzzle editor
//!
//! The password is a compile-time constant shipped in the bundle. It keeps
//! players from wandering into the editor; it does not protect anything.

use std::fmt;

use thiserror::Error;

use crate::cipher::encrypt;
use crate::game::GameSession;
use crate::platform::KeyValueStorage;
use crate::puzzles::{Puzzle, PuzzleError, PuzzleStore};

/// Inline message for a wrong password
pub const WRONG_PASSWORD_MESSAGE: &str = "Senha Incorreta";
/// Notice after a puzzle is created
pub const SAVED_NOTICE: &str = "Salvo!";
/// Notice when the create form is incomplete
pub const INCOMPLETE_NOTICE: &str = "Preencha tudo";
/// Confirmation prompt before deleting one puzzle
pub const CONFIRM_DELETE: &str = "Apagar?";
/// Confirmation prompt before wiping storage
pub const CONFIRM_CLEAR: &str = "Apagar TUDO?";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdminError {
    #[error("admin login required")]
    NotLoggedIn,
    #[error("wrong admin password")]
    WrongPassword,
    #[error("cancelled by user")]
    Cancelled,
    #[error(transparent)]
    Puzzle(#[from] PuzzleError),
}

/// Dashboard tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminTab {
    List,
    Create,
}

/// What the admin modal is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminView {
    Closed,
    Login,
    Dashboard(AdminTab),
}

/// One line of the puzzle list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleRow {
    /// 1-based position (also the level number)
    pub number: usize,
    pub text: String,
    pub shift: i32,
}

impl fmt::Display for PuzzleRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} (Chave: {})", self.number, self.text, self.shift)
    }
}

/// Parse the shift form field by its leading integer: optional sign, then
/// digits, rest ignored (`"3.7"` is 3, `"12abc"` is 12). No digits counts
/// as 0. Magnitudes beyond `i32` are reduced mod 26.
pub fn parse_shift(field: &str) -> i32 {
    let field = field.trim_start();
    let (negative, digits) = match field.as_bytes().first() {
        Some(b'-') => (true, &field[1..]),
        Some(b'+') => (false, &field[1..]),
        _ => (false, field),
    };

    let mut value: i64 = 0;
    let mut folded = false;
    for digit in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value * 10 + i64::from(digit - b'0');
        if value > i64::from(i32::MAX) {
            value %= 26;
            folded = true;
        }
    }

    let value = if negative { -value } else { value };
    if folded {
        value.rem_euclid(26) as i32
    } else {
        value as i32
    }
}

/// Ciphertext preview for the create form
pub fn preview(answer: &str, shift_field: &str) -> String {
    encrypt(&answer.to_uppercase(), parse_shift(shift_field))
}

/// Rows for the dashboard list, numbered from 1
pub fn list_rows(puzzles: &[Puzzle]) -> Vec<PuzzleRow> {
    puzzles
        .iter()
        .enumerate()
        .map(|(i, p)| PuzzleRow {
            number: i + 1,
            text: p.text.clone(),
            shift: p.shift,
        })
        .collect()
}

/// Admin controller
#[derive(Debug, Clone)]
pub struct AdminPanel {
    secret: &'static str,
    view: AdminView,
    login_error: Option<&'static str>,
}

impl AdminPanel {
    pub fn new(secret: &'static str) -> Self {
        Self {
            secret,
            view: AdminView::Closed,
            login_error: None,
        }
    }

    /// Toggle the modal. Opens straight onto the dashboard when the session
    /// is already logged in.
    pub fn toggle(&mut self, session: &GameSession) -> AdminView {
        self.view = match self.view {
            AdminView::Closed if session.admin_logged_in => AdminView::Dashboard(AdminTab::List),
            AdminView::Closed => AdminView::Login,
            _ => AdminView::Closed,
        };
        self.view
    }

    /// Check the password. No lockout, no retry limit.
    pub fn login(&mut self, session: &mut GameSession, password: &str) -> Result<(), AdminError> {
        if password != self.secret {
            log::info!("Admin login rejected");
            self.login_error = Some(WRONG_PASSWORD_MESSAGE);
            return Err(AdminError::WrongPassword);
        }

        session.admin_logged_in = true;
        self.login_error = None;
        self.view = AdminView::Dashboard(AdminTab::List);
        log::info!("Admin logged in");
        Ok(())
    }

    pub fn switch_tab(&mut self, session: &GameSession, tab: AdminTab) -> Result<(), AdminError> {
        Self::require_login(session)?;
        self.view = AdminView::Dashboard(tab);
        Ok(())
    }

    /// Validate and append a puzzle from the create form
    pub fn create<S: KeyValueStorage>(
        &self,
        session: &GameSession,
        store: &mut PuzzleStore<S>,
        answer: &str,
        shift_field: &str,
        hint: &str,
    ) -> Result<usize, AdminError> {
        Self::require_login(session)?;
        let index = store.add(answer, parse_shift(shift_field), hint)?;
        log::info!("Puzzle #{} created", index + 1);
        Ok(index)
    }

    /// Remove a puzzle after the user confirms
    pub fn delete<S: KeyValueStorage>(
        &self,
        session: &GameSession,
        store: &mut PuzzleStore<S>,
        index: usize,
        confirm: impl FnOnce(&str) -> bool,
    ) -> Result<Puzzle, AdminError> {
        Self::require_login(session)?;
        if !confirm(CONFIRM_DELETE) {
            return Err(AdminError::Cancelled);
        }
        let removed = store.remove(index)?;
        log::info!("Puzzle #{} deleted", index + 1);
        Ok(removed)
    }

    /// Wipe storage after the user confirms
    pub fn clear_all<S: KeyValueStorage>(
        &mut self,
        session: &GameSession,
        store: &mut PuzzleStore<S>,
        confirm: impl FnOnce(&str) -> bool,
    ) -> Result<(), AdminError> {
        Self::require_login(session)?;
        if !confirm(CONFIRM_CLEAR) {
            return Err(AdminError::Cancelled);
        }
        store.clear()?;
        self.view = AdminView::Closed;
        self.login_error = None;
        Ok(())
    }

    pub fn view(&self) -> AdminView {
        self.view
    }

    pub fn login_error(&self) -> Option<&'static str> {
        self.login_error
    }

    fn require_login(session: &GameSession) -> Result<(), AdminError> {
        if session.admin_logged_in {
            Ok(())
        } else {
            Err(AdminError::NotLoggedIn)
        }
    }
}
