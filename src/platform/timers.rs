//! Cancellable deferred tasks
//!
//! A task is identified by a key (e.g. "hide the glitch overlay"). Scheduling
//! a key that is already pending cancels the earlier timer, so rapid repeated
//! input never leaves two conflicting callbacks in flight.

use std::cell::RefCell;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{JsCast, closure::Closure};

/// Something that can fire a key after a delay
pub trait TimerBackend<K> {
    type Handle: Copy;

    /// Arrange for `key` to be delivered after `delay_ms`. `None` if the
    /// platform refused the timer.
    fn schedule(&mut self, key: K, delay_ms: u32) -> Option<Self::Handle>;
    /// Cancel a timer; cancelling an already-fired handle is a no-op
    fn cancel(&mut self, handle: Self::Handle);
}

/// At most one pending timer per key
pub struct ScheduledTasks<K, B>
where
    B: TimerBackend<K>,
{
    backend: B,
    pending: HashMap<K, B::Handle>,
}

impl<K, B> ScheduledTasks<K, B>
where
    K: Copy + Eq + Hash,
    B: TimerBackend<K>,
{
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            pending: HashMap::new(),
        }
    }

    /// Schedule `key`, replacing any pending timer for the same key
    pub fn schedule(&mut self, key: K, delay_ms: u32) {
        self.cancel(key);
        if let Some(handle) = self.backend.schedule(key, delay_ms) {
            self.pending.insert(key, handle);
        } else {
            log::warn!("Failed to schedule deferred task");
        }
    }

    /// Cancel the pending timer for `key`, if any
    pub fn cancel(&mut self, key: K) {
        if let Some(handle) = self.pending.remove(&key) {
            self.backend.cancel(handle);
        }
    }

    /// Mark `key` as delivered (call from the firing callback)
    pub fn finished(&mut self, key: K) {
        self.pending.remove(&key);
    }

    pub fn is_pending(&self, key: K) -> bool {
        self.pending.contains_key(&key)
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

/// Timer backend driven by an explicit clock (native build and tests)
#[derive(Debug)]
pub struct ManualTimers<K> {
    now_ms: u64,
    next_handle: u32,
    queue: Vec<(u32, u64, K)>,
}

impl<K> Default for ManualTimers<K> {
    fn default() -> Self {
        Self {
            now_ms: 0,
            next_handle: 1,
            queue: Vec::new(),
        }
    }
}

impl<K> ManualTimers<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the clock and return the keys that came due, oldest first
    pub fn advance(&mut self, ms: u64) -> Vec<K> {
        self.now_ms += ms;
        let now = self.now_ms;

        let mut due: Vec<(u32, u64, K)> = Vec::new();
        let mut i = 0;
        while i < self.queue.len() {
            if self.queue[i].1 <= now {
                due.push(self.queue.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|(handle, at, _)| (*at, *handle));
        due.into_iter().map(|(_, _, key)| key).collect()
    }

    /// Timers still waiting to fire
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }
}

impl<K> TimerBackend<K> for ManualTimers<K> {
    type Handle = u32;

    fn schedule(&mut self, key: K, delay_ms: u32) -> Option<u32> {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.queue
            .push((handle, self.now_ms + u64::from(delay_ms), key));
        Some(handle)
    }

    fn cancel(&mut self, handle: u32) {
        self.queue.retain(|(h, _, _)| *h != handle);
    }
}

/// Callbacks owned by a timer backend until their timer is cancelled or has
/// fired. A fired callback marks itself and is dropped on a later `take` or
/// `reap`, never from inside its own invocation.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
struct CallbackSlots<T> {
    next_token: u32,
    live: HashMap<u32, T>,
    fired: Rc<RefCell<Vec<u32>>>,
}

/// Moved into a callback so it can report that it ran
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
struct FiredMark {
    token: u32,
    fired: Rc<RefCell<Vec<u32>>>,
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
impl FiredMark {
    fn mark(&self) {
        self.fired.borrow_mut().push(self.token);
    }
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
impl<T> CallbackSlots<T> {
    fn new() -> Self {
        Self {
            next_token: 1,
            live: HashMap::new(),
            fired: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Allocate a token for a callback about to be created
    fn reserve(&mut self) -> FiredMark {
        self.reap();
        let token = self.next_token;
        self.next_token = self.next_token.wrapping_add(1);
        FiredMark {
            token,
            fired: self.fired.clone(),
        }
    }

    fn insert(&mut self, token: u32, callback: T) {
        self.live.insert(token, callback);
    }

    /// Remove a callback that is still waiting, if any
    fn take(&mut self, token: u32) -> Option<T> {
        self.reap();
        self.live.remove(&token)
    }

    fn reap(&mut self) {
        for token in self.fired.borrow_mut().drain(..) {
            self.live.remove(&token);
        }
    }

    fn len(&self) -> usize {
        self.live.len()
    }
}

/// `window.setTimeout` backend (WASM only)
#[cfg(target_arch = "wasm32")]
pub struct BrowserTimers<K> {
    dispatch: Rc<dyn Fn(K)>,
    slots: CallbackSlots<(i32, Closure<dyn FnMut()>)>,
}

#[cfg(target_arch = "wasm32")]
impl<K> BrowserTimers<K> {
    /// `dispatch` is invoked with the key when its timer fires
    pub fn new(dispatch: impl Fn(K) + 'static) -> Self {
        Self {
            dispatch: Rc::new(dispatch),
            slots: CallbackSlots::new(),
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl<K: Copy + 'static> TimerBackend<K> for BrowserTimers<K> {
    type Handle = u32;

    fn schedule(&mut self, key: K, delay_ms: u32) -> Option<u32> {
        let window = web_sys::window()?;
        let mark = self.slots.reserve();
        let token = mark.token;

        let dispatch = self.dispatch.clone();
        let callback = Closure::<dyn FnMut()>::new(move || {
            dispatch(key);
            mark.mark();
        });

        let id = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.as_ref().unchecked_ref::<js_sys::Function>(),
                delay_ms as i32,
            )
            .ok()?;
        self.slots.insert(token, (id, callback));
        Some(token)
    }

    fn cancel(&mut self, handle: u32) {
        let Some((id, _callback)) = self.slots.take(handle) else {
            return;
        };
        if let Some(window) = web_sys::window() {
            window.clear_timeout_with_handle(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Task {
        Hide,
        Relayout,
    }

    #[test]
    fn test_fires_after_delay() {
        let mut tasks = ScheduledTasks::new(ManualTimers::new());
        tasks.schedule(Task::Hide, 500);
        assert!(tasks.is_pending(Task::Hide));

        assert!(tasks.backend_mut().advance(499).is_empty());
        assert_eq!(tasks.backend_mut().advance(1), vec![Task::Hide]);
    }

    #[test]
    fn test_reschedule_replaces_pending() {
        let mut tasks = ScheduledTasks::new(ManualTimers::new());
        tasks.schedule(Task::Hide, 500);
        tasks.backend_mut().advance(300);
        tasks.schedule(Task::Hide, 500);
        assert_eq!(tasks.backend_mut().pending_count(), 1);

        // The first deadline passes without firing
        assert!(tasks.backend_mut().advance(250).is_empty());
        assert_eq!(tasks.backend_mut().advance(250), vec![Task::Hide]);
    }

    #[test]
    fn test_keys_are_independent() {
        let mut tasks = ScheduledTasks::new(ManualTimers::new());
        tasks.schedule(Task::Relayout, 100);
        tasks.schedule(Task::Hide, 50);
        tasks.cancel(Task::Relayout);

        assert_eq!(tasks.backend_mut().advance(1000), vec![Task::Hide]);
        assert!(!tasks.is_pending(Task::Relayout));
    }

    #[test]
    fn test_callback_slots_free_cancelled_and_fired() {
        let alive = Rc::new(());
        let mut slots = CallbackSlots::new();

        let first = slots.reserve();
        slots.insert(first.token, alive.clone());
        let second = slots.reserve();
        slots.insert(second.token, alive.clone());
        assert_eq!(Rc::strong_count(&alive), 3);

        // Cancelled: dropped straight away
        assert!(slots.take(first.token).is_some());
        assert_eq!(Rc::strong_count(&alive), 2);

        // Fired: dropped on the next bookkeeping call
        second.mark();
        assert_eq!(slots.len(), 1);
        let _third = slots.reserve();
        assert_eq!(slots.len(), 0);
        assert_eq!(Rc::strong_count(&alive), 1);
        assert!(slots.take(second.token).is_none());
    }

    #[test]
    fn test_finished_clears_pending() {
        let mut tasks = ScheduledTasks::new(ManualTimers::new());
        tasks.schedule(Task::Hide, 10);
        for key in tasks.backend_mut().advance(10) {
            tasks.finished(key);
        }
        assert!(!tasks.is_pending(Task::Hide));
    }
}
