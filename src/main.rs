//! Cryptex entry point
//!
//! Binds the game to the page: DOM events in, `UiEvent`s out.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        AddEventListenerOptions, Document, Element, HtmlElement, HtmlInputElement, MouseEvent,
        TouchEvent,
    };

    use cryptex::admin::{AdminTab, AdminView, PuzzleRow};
    use cryptex::app::{Deferred, Overlay};
    use cryptex::audio::AudioManager;
    use cryptex::consts::SETTLE_TRANSITION;
    use cryptex::platform::{BrowserTimers, LocalStorage, ScheduledTasks};
    use cryptex::ring::{GlyphPlacement, RingSnapshot};
    use cryptex::{Cryptex, UiEvent};

    /// Everything behind the event handlers
    struct Shell {
        app: Cryptex<LocalStorage>,
        audio: AudioManager,
    }

    type Timers = ScheduledTasks<Deferred, BrowserTimers<Deferred>>;

    /// Handles cloned into every closure
    #[derive(Clone)]
    struct Ui {
        shell: Rc<RefCell<Shell>>,
        timers: Rc<RefCell<Timers>>,
    }

    impl Ui {
        fn new(shell: Shell) -> Self {
            let shell = Rc::new(RefCell::new(shell));
            let timers = Rc::new_cyclic(|weak: &Weak<RefCell<Timers>>| {
                let weak = weak.clone();
                let shell = shell.clone();
                RefCell::new(ScheduledTasks::new(BrowserTimers::new(move |task| {
                    let Some(timers) = weak.upgrade() else { return };
                    timers.borrow_mut().finished(task);
                    shell.borrow_mut().app.fire(task);
                    flush(&Ui {
                        shell: shell.clone(),
                        timers,
                    });
                })))
            });
            Self { shell, timers }
        }

        /// Run an app method, then draw what it produced
        fn with_app(&self, f: impl FnOnce(&mut Cryptex<LocalStorage>)) {
            f(&mut self.shell.borrow_mut().app);
            flush(self);
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn by_id(id: &str) -> Option<Element> {
        document()?.get_element_by_id(id)
    }

    fn html_by_id(id: &str) -> Option<HtmlElement> {
        by_id(id)?.dyn_into().ok()
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(id: &str, hidden: bool) {
        if let Some(el) = by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    fn input_value(id: &str) -> String {
        by_id(id)
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default()
    }

    fn set_input_value(id: &str, value: &str) {
        if let Some(input) = by_id(id).and_then(|el| el.dyn_into::<HtmlInputElement>().ok()) {
            input.set_value(value);
        }
    }

    fn confirm(message: &str) -> bool {
        web_sys::window()
            .and_then(|w| w.confirm_with_message(message).ok())
            .unwrap_or(false)
    }

    /// Drain and draw until the app has nothing more to say
    fn flush(ui: &Ui) {
        loop {
            let events = ui.shell.borrow_mut().app.drain_events();
            if events.is_empty() {
                break;
            }
            for event in events {
                render(ui, event);
            }
        }
    }

    fn render(ui: &Ui, event: UiEvent) {
        match event {
            UiEvent::LevelLoaded(view) => {
                set_text("level-num", &view.level_number.to_string());
                set_text("puzzle-hint", &view.hint);
                set_text("puzzle-code", &view.ciphertext);
                set_input_value("answer-input", "");
            }
            UiEvent::Feedback(message) => {
                set_text("feedback", message.unwrap_or(""));
                if let Some(el) = html_by_id("feedback") {
                    let color = if message.is_some() { "var(--error)" } else { "" };
                    let _ = el.style().set_property("color", color);
                }
            }
            UiEvent::ShowOverlay(overlay) => set_hidden(overlay_id(overlay), false),
            UiEvent::HideOverlay(overlay) => set_hidden(overlay_id(overlay), true),
            UiEvent::Shake(on) => {
                if let Some(body) = document().and_then(|d| d.body()) {
                    let _ = body.class_list().toggle_with_force("shake-screen", on);
                }
            }
            UiEvent::Schedule { task, delay_ms } => ui.timers.borrow_mut().schedule(task, delay_ms),
            UiEvent::PlayTone(tone) => ui.shell.borrow().audio.play(tone),
            UiEvent::RingsChanged(snapshot) => draw_rings(&snapshot),
            UiEvent::OffsetChanged(offset) => set_text("offset-val", &offset.to_string()),
            UiEvent::RingLayout { outer, inner } => {
                place_glyphs("outer-ring", r#"<div class="ring-decoration"></div>"#, &outer);
                place_glyphs(
                    "inner-ring",
                    r#"<div class="center-knob"><i class="ph-fill ph-fingerprint"></i></div>"#,
                    &inner,
                );
            }
            UiEvent::MeasureRings => {
                let outer = html_by_id("outer-ring").map(|el| el.offset_width()).unwrap_or(0);
                let inner = html_by_id("inner-ring").map(|el| el.offset_width()).unwrap_or(0);
                ui.shell
                    .borrow_mut()
                    .app
                    .layout_rings(outer as f32, inner as f32);
            }
            UiEvent::PuzzlesChanged { total } => set_text("total-puzzles", &total.to_string()),
            UiEvent::PuzzleList(rows) => {
                let (Some(doc), Some(list)) = (document(), by_id("puzzle-list-container")) else {
                    return;
                };
                list.set_inner_html("");
                for row in &rows {
                    if let Some(item) = puzzle_item(&doc, row) {
                        let _ = list.append_child(&item);
                    }
                }
            }
            UiEvent::AdminViewChanged(view) => draw_admin(view),
            UiEvent::LoginError(message) => set_text("login-error", message.unwrap_or("")),
            UiEvent::Notice(message) => {
                if let Some(window) = web_sys::window() {
                    let _ = window.alert_with_message(message);
                }
            }
            UiEvent::ClearCreateForm => {
                set_input_value("adm-ans", "");
                set_input_value("adm-hint", "");
            }
            UiEvent::Preview(text) => set_text("adm-preview", &text),
            UiEvent::Reload => {
                if let Some(window) = web_sys::window() {
                    let _ = window.location().reload();
                }
            }
        }
    }

    fn overlay_id(overlay: Overlay) -> &'static str {
        match overlay {
            Overlay::Success => "success-overlay",
            Overlay::Glitch => "error-overlay",
        }
    }

    fn draw_rings(snapshot: &RingSnapshot) {
        for (id, rotation, animated) in [
            ("inner-ring", snapshot.inner_rotation, snapshot.inner_animated),
            ("outer-ring", snapshot.outer_rotation, snapshot.outer_animated),
        ] {
            if let Some(el) = html_by_id(id) {
                let style = el.style();
                let transition = if animated { SETTLE_TRANSITION } else { "none" };
                let _ = style.set_property("transition", transition);
                let _ = style.set_property("--rot", &format!("{}deg", rotation));
            }
        }
    }

    fn place_glyphs(ring_id: &str, decoration: &str, glyphs: &[GlyphPlacement]) {
        let (Some(doc), Some(ring)) = (document(), by_id(ring_id)) else {
            return;
        };
        ring.set_inner_html(decoration);

        for glyph in glyphs {
            let Some(el) = doc
                .create_element("div")
                .ok()
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            else {
                continue;
            };
            el.set_class_name("char");
            el.set_text_content(Some(&glyph.letter.to_string()));
            // Consumed by the stylesheet's ferris-wheel transform
            let style = el.style();
            let _ = style.set_property("--initial-angle", &format!("{}deg", glyph.angle_deg));
            let _ = style.set_property("--radius", &format!("{}px", glyph.radius));
            let _ = ring.append_child(&el);
        }
    }

    fn puzzle_item(doc: &Document, row: &PuzzleRow) -> Option<Element> {
        let item = doc.create_element("div").ok()?;
        item.set_class_name("puzzle-item");

        let label = doc.create_element("span").ok()?;
        let bold = doc.create_element("b").ok()?;
        bold.set_text_content(Some(&row.text));
        label.append_with_str_1(&format!("#{} ", row.number)).ok()?;
        label.append_with_node_1(&bold).ok()?;
        label.append_with_str_1(&format!(" (Chave: {})", row.shift)).ok()?;

        let button = doc.create_element("button").ok()?;
        button.set_class_name("btn-delete");
        button
            .set_attribute("data-index", &(row.number - 1).to_string())
            .ok()?;
        button.set_inner_html(r#"<i class="ph ph-trash"></i>"#);

        item.append_with_node_1(&label).ok()?;
        item.append_with_node_1(&button).ok()?;
        Some(item)
    }

    fn draw_admin(view: AdminView) {
        set_hidden("admin-modal", view == AdminView::Closed);
        let AdminView::Dashboard(tab) = view else {
            set_hidden("adm-login-view", false);
            set_hidden("adm-dashboard-view", true);
            return;
        };

        set_input_value("adm-pass-input", "");
        set_hidden("adm-login-view", true);
        set_hidden("adm-dashboard-view", false);
        set_hidden("tab-list", tab != AdminTab::List);
        set_hidden("tab-create", tab != AdminTab::Create);
        for (id, active) in [
            ("tab-btn-list", tab == AdminTab::List),
            ("tab-btn-create", tab == AdminTab::Create),
        ] {
            if let Some(el) = by_id(id) {
                let _ = el.class_list().toggle_with_force("active", active);
            }
        }
    }

    /// Wrapper center in client coordinates and its outer radius
    fn wrapper_geometry() -> Option<(Vec2, f32)> {
        let wrapper = html_by_id("disk-wrapper")?;
        let rect = wrapper.get_bounding_client_rect();
        let center = Vec2::new(
            (rect.left() + rect.width() / 2.0) as f32,
            (rect.top() + rect.height() / 2.0) as f32,
        );
        Some((center, wrapper.offset_width() as f32 / 2.0))
    }

    fn touch_point(event: &TouchEvent) -> Option<Vec2> {
        let touch = event.touches().get(0)?;
        Some(Vec2::new(touch.client_x() as f32, touch.client_y() as f32))
    }

    fn mouse_point(event: &MouseEvent) -> Vec2 {
        Vec2::new(event.client_x() as f32, event.client_y() as f32)
    }

    fn non_passive() -> AddEventListenerOptions {
        let options = AddEventListenerOptions::new();
        options.set_passive(false);
        options
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Cryptex starting...");

        let storage = LocalStorage::new();
        let ui = Ui::new(Shell {
            app: Cryptex::new(storage),
            audio: AudioManager::new(),
        });

        setup_ring_handlers(&ui);
        setup_game_buttons(&ui);
        setup_admin_handlers(&ui);

        flush(&ui);
        log::info!("Cryptex running!");
    }

    fn setup_ring_handlers(ui: &Ui) {
        let Some(window) = web_sys::window() else { return };
        let Some(wrapper) = by_id("disk-wrapper") else {
            log::error!("Missing #disk-wrapper");
            return;
        };

        // Mouse down on the disk
        {
            let ui = ui.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let Some((center, radius)) = wrapper_geometry() else { return };
                ui.with_app(|app| {
                    app.pointer_down(mouse_point(&event), center, radius);
                });
            });
            let _ = wrapper
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start on the disk
        {
            let ui = ui.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let (Some(point), Some((center, radius))) = (touch_point(&event), wrapper_geometry())
                else {
                    return;
                };
                ui.with_app(|app| {
                    app.pointer_down(point, center, radius);
                });
            });
            let _ = wrapper.add_event_listener_with_callback_and_add_event_listener_options(
                "touchstart",
                closure.as_ref().unchecked_ref(),
                &non_passive(),
            );
            closure.forget();
        }

        // Mouse move anywhere while dragging
        {
            let ui = ui.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let Some((center, _)) = wrapper_geometry() else { return };
                let mut dragging = false;
                ui.with_app(|app| dragging = app.pointer_move(mouse_point(&event), center));
                if dragging {
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move (must be non-passive to stop page scrolling)
        {
            let ui = ui.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let (Some(point), Some((center, _))) = (touch_point(&event), wrapper_geometry())
                else {
                    return;
                };
                let mut dragging = false;
                ui.with_app(|app| dragging = app.pointer_move(point, center));
                if dragging {
                    event.prevent_default();
                }
            });
            let _ = window.add_event_listener_with_callback_and_add_event_listener_options(
                "touchmove",
                closure.as_ref().unchecked_ref(),
                &non_passive(),
            );
            closure.forget();
        }

        // Release
        for name in ["mouseup", "touchend"] {
            let ui = ui.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                ui.with_app(|app| app.pointer_up());
            });
            let _ = window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Resize - glyph radius depends on the rendered ring size
        {
            let ui = ui.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                ui.with_app(|app| app.on_resize());
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn on_click(id: &str, ui: &Ui, handler: impl Fn(&Ui) + 'static) {
        let Some(el) = by_id(id) else {
            log::warn!("Missing #{}", id);
            return;
        };
        let ui = ui.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| handler(&ui));
        let _ = el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_game_buttons(ui: &Ui) {
        on_click("check-btn", ui, |ui| {
            let answer = input_value("answer-input");
            ui.with_app(|app| {
                app.check_answer(&answer);
            });
        });
        on_click("next-btn", ui, |ui| ui.with_app(|app| app.next_level()));

        // Enter in the answer box submits
        if let Some(input) = by_id("answer-input") {
            let ui = ui.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                if event.key() == "Enter" {
                    let answer = input_value("answer-input");
                    ui.with_app(|app| {
                        app.check_answer(&answer);
                    });
                }
            });
            let _ = input.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_admin_handlers(ui: &Ui) {
        on_click("admin-btn", ui, |ui| ui.with_app(|app| app.toggle_admin()));
        on_click("admin-close-btn", ui, |ui| ui.with_app(|app| app.toggle_admin()));
        on_click("login-btn", ui, |ui| {
            let password = input_value("adm-pass-input");
            ui.with_app(|app| {
                let _ = app.login(&password);
            });
        });
        on_click("tab-btn-list", ui, |ui| {
            ui.with_app(|app| {
                let _ = app.switch_tab(AdminTab::List);
            })
        });
        on_click("tab-btn-create", ui, |ui| {
            ui.with_app(|app| {
                let _ = app.switch_tab(AdminTab::Create);
            })
        });
        on_click("save-btn", ui, |ui| {
            let answer = input_value("adm-ans");
            let shift = input_value("adm-shift");
            let hint = input_value("adm-hint");
            ui.with_app(|app| {
                let _ = app.create_puzzle(&answer, &shift, &hint);
            });
        });
        on_click("clear-btn", ui, |ui| {
            ui.with_app(|app| {
                let _ = app.clear_all(confirm);
            })
        });

        // Live ciphertext preview
        for id in ["adm-ans", "adm-shift"] {
            let Some(el) = by_id(id) else { continue };
            let ui = ui.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let answer = input_value("adm-ans");
                let shift = input_value("adm-shift");
                ui.with_app(|app| app.preview(&answer, &shift));
            });
            let _ = el.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Delete buttons are re-rendered with the list, so listen on the container
        if let Some(list) = by_id("puzzle-list-container") {
            let ui = ui.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                    return;
                };
                let Some(index) = target
                    .closest(".btn-delete")
                    .ok()
                    .flatten()
                    .and_then(|btn| btn.get_attribute("data-index"))
                    .and_then(|raw| raw.parse::<usize>().ok())
                else {
                    return;
                };
                ui.with_app(|app| {
                    let _ = app.delete_puzzle(index, confirm);
                });
            });
            let _ = list.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_app::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use cryptex::Cryptex;
    use cryptex::platform::MemoryStorage;

    env_logger::init();
    log::info!("Cryptex (native) starting...");
    log::info!("Native mode has no UI - run with `trunk serve` for the web version");

    // Smoke-run the default puzzle through the game flow
    let app = Cryptex::new(MemoryStorage::new());
    for (i, puzzle) in app.puzzles().iter().enumerate() {
        println!("#{} {} -> {}", i + 1, puzzle.hint, puzzle.ciphertext());
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
