//! Puzzle collection
//!
//! Persisted as a single JSON array in key-value storage. Insertion order is
//! level order, so a puzzle's identity is its index.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::consts::PUZZLES_STORAGE_KEY;
use crate::platform::{KeyValueStorage, StorageError};

/// Answer of the puzzle seeded into empty storage
pub const DEFAULT_TEXT: &str = "FUTURO";
/// Shift of the seeded puzzle
pub const DEFAULT_SHIFT: i32 = 3;
/// Hint of the seeded puzzle
pub const DEFAULT_HINT: &str = "Ainda não aconteceu";

/// A single Caesar puzzle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    /// Plaintext answer (uppercase)
    pub text: String,
    /// Cipher key; may be outside [0, 25] in hand-edited data
    #[serde(default, deserialize_with = "lenient_shift")]
    pub shift: i32,
    /// Free-text clue shown above the ciphertext
    pub hint: String,
}

impl Puzzle {
    pub fn new(text: impl Into<String>, shift: i32, hint: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            shift,
            hint: hint.into(),
        }
    }

    /// The puzzle seeded when storage holds nothing usable
    pub fn seed() -> Self {
        Self::new(DEFAULT_TEXT, DEFAULT_SHIFT, DEFAULT_HINT)
    }

    /// Ciphertext shown to the player
    pub fn ciphertext(&self) -> String {
        crate::cipher::encrypt(&self.text, self.shift)
    }
}

/// Read a stored shift from any JSON number or `null`.
///
/// A blank shift field used to be saved as `null`; it reads as 0. Fractions
/// truncate toward zero. Values beyond `i32` are reduced mod 26, which
/// encrypts identically.
fn lenient_shift<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Option::<serde_json::Number>::deserialize(deserializer)?;
    Ok(number.map_or(0, |n| fold_shift(&n)))
}

fn fold_shift(number: &serde_json::Number) -> i32 {
    if let Some(i) = number.as_i64() {
        return i32::try_from(i).unwrap_or_else(|_| i.rem_euclid(26) as i32);
    }
    if let Some(u) = number.as_u64() {
        return (u % 26) as i32;
    }
    match number.as_f64() {
        Some(f) if f.is_finite() => {
            let whole = f.trunc();
            if whole >= f64::from(i32::MIN) && whole <= f64::from(i32::MAX) {
                whole as i32
            } else {
                whole.rem_euclid(26.0) as i32
            }
        }
        _ => 0,
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PuzzleError {
    #[error("puzzle answer is empty")]
    MissingAnswer,
    #[error("puzzle hint is empty")]
    MissingHint,
    #[error("no puzzle at index {0}")]
    NoSuchPuzzle(usize),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Ordered puzzles plus the storage they persist to
#[derive(Debug)]
pub struct PuzzleStore<S> {
    storage: S,
    puzzles: Vec<Puzzle>,
}

impl<S: KeyValueStorage> PuzzleStore<S> {
    /// Read the persisted collection, seeding the default puzzle when the key
    /// is absent, unparsable, or holds an empty list.
    ///
    /// Records are read one by one; an unreadable record is skipped and the
    /// stored data is left untouched so nothing is lost.
    pub fn load(storage: S) -> Self {
        let records = storage.get(PUZZLES_STORAGE_KEY).and_then(|json| {
            match serde_json::from_str::<Vec<serde_json::Value>>(&json) {
                Ok(records) => Some(records),
                Err(e) => {
                    log::warn!("Discarding malformed puzzle data: {}", e);
                    None
                }
            }
        });

        let mut store = Self {
            storage,
            puzzles: Vec::new(),
        };

        let Some(records) = records else {
            store.seed();
            return store;
        };

        let stored = records.len();
        store.puzzles = records
            .into_iter()
            .enumerate()
            .filter_map(|(i, record)| match serde_json::from_value(record) {
                Ok(puzzle) => Some(puzzle),
                Err(e) => {
                    log::warn!("Skipping unreadable puzzle #{}: {}", i + 1, e);
                    None
                }
            })
            .collect();

        if !store.puzzles.is_empty() {
            log::info!("Loaded {} of {} puzzles", store.puzzles.len(), stored);
        } else if stored == 0 {
            store.seed();
        } else {
            log::warn!("No readable puzzles, playing the default without saving it");
            store.puzzles = vec![Puzzle::seed()];
        }

        store
    }

    fn seed(&mut self) {
        log::info!("No puzzles found, seeding default");
        self.puzzles = vec![Puzzle::seed()];
        if let Err(e) = self.save() {
            log::warn!("Could not persist default puzzle: {}", e);
        }
    }

    /// Persist the whole collection, overwriting what was stored
    pub fn save(&mut self) -> Result<(), PuzzleError> {
        Self::write(&mut self.storage, &self.puzzles)
    }

    fn write(storage: &mut S, puzzles: &[Puzzle]) -> Result<(), PuzzleError> {
        let json =
            serde_json::to_string(puzzles).map_err(|e| StorageError::Write(e.to_string()))?;
        storage.set(PUZZLES_STORAGE_KEY, &json)?;
        log::info!("Puzzles saved ({} entries)", puzzles.len());
        Ok(())
    }

    /// Persist `candidate`, then adopt it. On failure the collection is
    /// unchanged.
    fn commit(&mut self, candidate: Vec<Puzzle>) -> Result<(), PuzzleError> {
        Self::write(&mut self.storage, &candidate)?;
        self.puzzles = candidate;
        Ok(())
    }

    /// Append a puzzle. The answer is uppercased and trimmed; the shift is
    /// stored as given.
    pub fn add(&mut self, text: &str, shift: i32, hint: &str) -> Result<usize, PuzzleError> {
        let text = text.trim().to_uppercase();
        if text.is_empty() {
            return Err(PuzzleError::MissingAnswer);
        }
        if hint.is_empty() {
            return Err(PuzzleError::MissingHint);
        }

        let mut candidate = self.puzzles.clone();
        candidate.push(Puzzle::new(text, shift, hint));
        self.commit(candidate)?;
        Ok(self.puzzles.len() - 1)
    }

    /// Remove the puzzle at `index` and persist
    pub fn remove(&mut self, index: usize) -> Result<Puzzle, PuzzleError> {
        if index >= self.puzzles.len() {
            return Err(PuzzleError::NoSuchPuzzle(index));
        }
        let mut candidate = self.puzzles.clone();
        let removed = candidate.remove(index);
        self.commit(candidate)?;
        Ok(removed)
    }

    /// Erase persisted state and start over as a fresh load would
    pub fn clear(&mut self) -> Result<(), PuzzleError> {
        self.storage.remove(PUZZLES_STORAGE_KEY)?;
        log::info!("Puzzle storage cleared");
        self.commit(vec![Puzzle::seed()])
    }

    pub fn puzzles(&self) -> &[Puzzle] {
        &self.puzzles
    }

    pub fn get(&self, index: usize) -> Option<&Puzzle> {
        self.puzzles.get(index)
    }

    pub fn len(&self) -> usize {
        self.puzzles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.puzzles.is_empty()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}
