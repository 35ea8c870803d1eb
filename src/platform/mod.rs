//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Storage (LocalStorage on web, in-memory on native and in tests)
//! - Deferred tasks (setTimeout on web, a manual clock on native)

pub mod storage;
pub mod timers;

pub use storage::{KeyValueStorage, MemoryStorage, StorageError};
pub use timers::{ManualTimers, ScheduledTasks, TimerBackend};

#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
#[cfg(target_arch = "wasm32")]
pub use timers::BrowserTimers;
