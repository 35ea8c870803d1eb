use cryptex::admin::{AdminError, AdminTab, AdminView};
use cryptex::app::{Deferred, Overlay};
use cryptex::audio::Tone;
use cryptex::consts::{ADMIN_SECRET, ERROR_FLASH_MS, PUZZLES_STORAGE_KEY};
use cryptex::game::AnswerOutcome;
use cryptex::platform::{
    KeyValueStorage, ManualTimers, MemoryStorage, ScheduledTasks, StorageError,
};
use cryptex::{Cryptex, Puzzle, PuzzleError, UiEvent};

const TWO_PUZZLES: &str =
    r#"[{"text":"CHAVE","shift":5,"hint":"h1"},{"text":"SENHA","shift":1,"hint":"h2"}]"#;

/// Minimal presentation layer: routes scheduling through real cancellable
/// tasks and remembers what is on screen.
struct Harness {
    app: Cryptex<MemoryStorage>,
    timers: ScheduledTasks<Deferred, ManualTimers<Deferred>>,
    glitch_visible: bool,
    tones: Vec<Tone>,
    last_level: Option<cryptex::game::LevelView>,
}

impl Harness {
    fn new(storage: MemoryStorage) -> Self {
        let mut harness = Self {
            app: Cryptex::new(storage),
            timers: ScheduledTasks::new(ManualTimers::new()),
            glitch_visible: false,
            tones: Vec::new(),
            last_level: None,
        };
        harness.pump();
        harness
    }

    fn pump(&mut self) {
        for event in self.app.drain_events() {
            match event {
                UiEvent::Schedule { task, delay_ms } => self.timers.schedule(task, delay_ms),
                UiEvent::ShowOverlay(Overlay::Glitch) => self.glitch_visible = true,
                UiEvent::HideOverlay(Overlay::Glitch) => self.glitch_visible = false,
                UiEvent::PlayTone(tone) => self.tones.push(tone),
                UiEvent::LevelLoaded(view) => self.last_level = Some(view),
                _ => {}
            }
        }
    }

    fn advance(&mut self, ms: u64) -> usize {
        let fired = self.timers.backend_mut().advance(ms);
        let count = fired.len();
        for task in fired {
            self.timers.finished(task);
            self.app.fire(task);
        }
        self.pump();
        count
    }
}

#[test]
fn scenario_first_level_of_stored_puzzles() {
    let storage = MemoryStorage::new().with_entry(PUZZLES_STORAGE_KEY, TWO_PUZZLES);
    let harness = Harness::new(storage);

    let view = harness.last_level.expect("level loaded");
    assert_eq!(view.ciphertext, "HMFAJ");
    assert_eq!(view.hint, "h1");
    assert_eq!(view.total, 2);
}

#[test]
fn scenario_solve_and_advance_wraps() {
    let storage = MemoryStorage::new().with_entry(PUZZLES_STORAGE_KEY, TWO_PUZZLES);
    let mut h = Harness::new(storage);

    assert_eq!(h.app.check_answer("chave"), Some(AnswerOutcome::Correct));
    h.app.next_level();
    h.pump();
    assert_eq!(h.last_level.as_ref().unwrap().hint, "h2");

    assert_eq!(h.app.check_answer(" senha "), Some(AnswerOutcome::Correct));
    h.app.next_level();
    h.pump();
    assert_eq!(h.last_level.as_ref().unwrap().level_number, 1);
    assert_eq!(h.tones, vec![Tone::Success, Tone::Success]);
}

#[test]
fn scenario_glitch_hides_after_delay() {
    let mut h = Harness::new(MemoryStorage::new());
    h.app.check_answer("ERRADO");
    h.pump();
    assert!(h.glitch_visible);
    assert_eq!(h.tones, vec![Tone::Error]);

    assert_eq!(h.advance(u64::from(ERROR_FLASH_MS) - 1), 0);
    assert!(h.glitch_visible);
    assert_eq!(h.advance(1), 1);
    assert!(!h.glitch_visible);
}

#[test]
fn scenario_rapid_wrong_answers_replace_pending_hide() {
    let mut h = Harness::new(MemoryStorage::new());
    h.app.check_answer("A");
    h.pump();
    h.advance(400);

    h.app.check_answer("B");
    h.pump();
    assert_eq!(h.timers.backend_mut().pending_count(), 1);

    // First deadline (500ms) passes with the glitch still up
    assert_eq!(h.advance(200), 0);
    assert!(h.glitch_visible);

    assert_eq!(h.advance(300), 1);
    assert!(!h.glitch_visible);
    assert!(!h.timers.is_pending(Deferred::HideGlitch));
}

#[test]
fn scenario_admin_login() {
    let storage = MemoryStorage::new().with_entry(PUZZLES_STORAGE_KEY, TWO_PUZZLES);
    let mut app = Cryptex::new(storage);
    app.toggle_admin();
    app.drain_events();

    assert_eq!(app.login("wrong"), Err(AdminError::WrongPassword));
    assert!(!app.session().admin_logged_in);
    assert_eq!(app.admin_view(), AdminView::Login);
    assert_eq!(app.switch_tab(AdminTab::List), Err(AdminError::NotLoggedIn));

    app.drain_events();
    app.login(ADMIN_SECRET).unwrap();
    assert!(app.session().admin_logged_in);
    assert_eq!(app.admin_view(), AdminView::Dashboard(AdminTab::List));

    let events = app.drain_events();
    let rows = events
        .iter()
        .find_map(|e| match e {
            UiEvent::PuzzleList(rows) => Some(rows.clone()),
            _ => None,
        })
        .expect("list rendered");
    let lines: Vec<String> = rows.iter().map(|r| r.to_string()).collect();
    assert_eq!(lines, vec!["#1 CHAVE (Chave: 5)", "#2 SENHA (Chave: 1)"]);
}

#[test]
fn scenario_create_puzzle_from_form() {
    let mut app = Cryptex::new(MemoryStorage::new());
    app.toggle_admin();
    app.login(ADMIN_SECRET).unwrap();
    app.switch_tab(AdminTab::Create).unwrap();
    app.drain_events();

    app.preview("lua", "2");
    assert_eq!(app.drain_events(), vec![UiEvent::Preview("NWC".to_string())]);

    assert!(app.create_puzzle("lua", "", "").is_err());
    assert!(app.drain_events().contains(&UiEvent::Notice("Preencha tudo")));

    assert_eq!(app.create_puzzle("lua", "2", "satélite").unwrap(), 1);
    let events = app.drain_events();
    assert!(events.contains(&UiEvent::Notice("Salvo!")));
    assert!(events.contains(&UiEvent::ClearCreateForm));
    assert!(events.contains(&UiEvent::PuzzlesChanged { total: 2 }));

    let json = app.storage().get(PUZZLES_STORAGE_KEY).unwrap();
    let stored: Vec<Puzzle> = serde_json::from_str(&json).unwrap();
    assert_eq!(stored[1], Puzzle::new("LUA", 2, "satélite"));
}

#[test]
fn scenario_delete_active_puzzle_resets_index() {
    let storage = MemoryStorage::new().with_entry(PUZZLES_STORAGE_KEY, TWO_PUZZLES);
    let mut h = Harness::new(storage);
    h.app.toggle_admin();
    h.app.login(ADMIN_SECRET).unwrap();

    h.app.check_answer("CHAVE");
    h.app.next_level();
    assert_eq!(h.app.session().puzzle_index, 1);

    h.app.delete_puzzle(1, |_| true).unwrap();
    h.pump();
    assert_eq!(h.app.session().puzzle_index, 0);
    assert_eq!(h.last_level.as_ref().unwrap().hint, "h1");
    assert_eq!(h.app.puzzles().len(), 1);
}

#[test]
fn scenario_delete_everything_then_check_is_noop() {
    let mut app = Cryptex::new(MemoryStorage::new());
    app.toggle_admin();
    app.login(ADMIN_SECRET).unwrap();

    app.delete_puzzle(0, |_| true).unwrap();
    assert!(app.puzzles().is_empty());
    assert_eq!(app.check_answer("FUTURO"), None);
    app.next_level();

    // Adding a puzzle brings a level back
    app.drain_events();
    app.create_puzzle("SOL", "1", "estrela").unwrap();
    assert!(app
        .drain_events()
        .iter()
        .any(|e| matches!(e, UiEvent::LevelLoaded(v) if v.ciphertext == "TPM")));
}

#[test]
fn scenario_cancelled_delete_keeps_puzzle() {
    let mut app = Cryptex::new(MemoryStorage::new());
    app.toggle_admin();
    app.login(ADMIN_SECRET).unwrap();

    assert_eq!(app.delete_puzzle(0, |_| false), Err(AdminError::Cancelled));
    assert_eq!(app.puzzles().len(), 1);
}

#[test]
fn scenario_clear_all_restarts_session() {
    let storage = MemoryStorage::new().with_entry(PUZZLES_STORAGE_KEY, TWO_PUZZLES);
    let mut app = Cryptex::new(storage);
    app.toggle_admin();
    app.login(ADMIN_SECRET).unwrap();
    app.check_answer("CHAVE");
    app.next_level();

    app.clear_all(|_| true).unwrap();
    let events = app.drain_events();
    assert_eq!(events.last(), Some(&UiEvent::Reload));
    assert!(!app.session().admin_logged_in);
    assert_eq!(app.session().puzzle_index, 0);

    // A fresh page load sees exactly the default puzzle
    let reloaded = Cryptex::new(app.storage().clone());
    assert_eq!(reloaded.puzzles(), &[Puzzle::new("FUTURO", 3, "Ainda não aconteceu")]);
}

/// Storage that can be read but rejects every write
struct ReadOnlyStorage(MemoryStorage);

impl KeyValueStorage for ReadOnlyStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }

    fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }
}

#[test]
fn scenario_failed_delete_keeps_session_consistent() {
    let storage =
        ReadOnlyStorage(MemoryStorage::new().with_entry(PUZZLES_STORAGE_KEY, TWO_PUZZLES));
    let mut app = Cryptex::new(storage);
    app.toggle_admin();
    app.login(ADMIN_SECRET).unwrap();
    app.check_answer("CHAVE");
    app.next_level();
    app.drain_events();

    assert_eq!(
        app.delete_puzzle(1, |_| true),
        Err(AdminError::Puzzle(PuzzleError::Storage(
            StorageError::Unavailable
        )))
    );
    assert_eq!(app.puzzles().len(), 2);
    assert_eq!(app.session().puzzle_index, 1);
    assert_eq!(app.check_answer("SENHA"), Some(AnswerOutcome::Correct));

    assert!(app.create_puzzle("LUA", "2", "h3").is_err());
    assert_eq!(app.puzzles().len(), 2);
}

#[test]
fn scenario_stored_puzzles_survive_odd_shifts() {
    let json = r#"[{"text":"CHAVE","shift":5,"hint":"h1"},{"text":"SOL","shift":null,"hint":"h2"}]"#;
    let h = Harness::new(MemoryStorage::new().with_entry(PUZZLES_STORAGE_KEY, json));

    assert_eq!(h.app.puzzles().len(), 2);
    assert_eq!(h.last_level.as_ref().unwrap().ciphertext, "HMFAJ");
    assert_eq!(h.app.storage().get(PUZZLES_STORAGE_KEY).unwrap(), json);
}
