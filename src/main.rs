//! Canvas Toys entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};

    use glam::IVec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        Document, HtmlCanvasElement, HtmlElement, HtmlFormElement, HtmlInputElement,
        KeyboardEvent, MouseEvent, SubmitEvent,
    };

    use canvas_toys::audio::ClipPlayer;
    use canvas_toys::auth::{self, AuthAction, AuthClient, AuthRequest};
    use canvas_toys::highscores::RunRecord;
    use canvas_toys::platform;
    use canvas_toys::renderer::{CanvasSurface, parse_css_rgb};
    use canvas_toys::settings::{FieldInput, PatternConfig};
    use canvas_toys::sim::{FrameDriver, FrameHandle, FrameScheduler, SoundRange};
    use canvas_toys::{KeyAction, Settings, SnakeRecords, Toy, ToyKind, ToyNotice};

    /// Running page state
    struct Game {
        toy: Toy,
        scheduler: FrameScheduler,
        surface: CanvasSurface,
        settings: Settings,
        records: SnakeRecords,
        audio: ClipPlayer,
    }

    impl Game {
        fn new(kind: ToyKind, surface: CanvasSurface, seed: u64) -> Self {
            let settings = Settings::load();
            let bounds = platform::viewport();
            surface.resize(bounds);
            let records = SnakeRecords::load();
            let mut toy = Toy::new(kind, &settings, bounds, seed);
            toy.restore_high_score(records.best);
            let scheduler = FrameScheduler::new(toy.frame_delay_ms());
            let audio = ClipPlayer::new(&settings.audio);
            Self {
                toy,
                scheduler,
                surface,
                settings,
                records,
                audio,
            }
        }

        fn resize(&mut self) {
            let bounds = platform::viewport();
            self.surface.resize(bounds);
            self.toy.resize(bounds);
            self.toy.draw_background(&mut self.surface);
        }

        /// Record the run and build the game-over message
        fn game_over(&mut self, score: u32, deaths: u32, length: u32) -> String {
            let now = platform::now_ms();
            let run = RunRecord {
                score,
                length,
                timestamp: now,
            };
            if let Some(place) = self.records.record(run) {
                log::info!("Run listed at place {}", place);
            }
            self.records.save();
            format!(
                "You died.\nTotal Deaths: {}\nScore this run: {}\n\n{}",
                deaths,
                score,
                self.records.summary(now)
            )
        }
    }

    /// `requestAnimationFrame` side of the scheduler
    struct RafDriver(Weak<RefCell<Game>>);

    impl RafDriver {
        fn new(game: &Rc<RefCell<Game>>) -> Self {
            Self(Rc::downgrade(game))
        }
    }

    impl FrameDriver for RafDriver {
        fn request(&mut self) -> FrameHandle {
            let game = self.0.clone();
            let closure = Closure::once(move |time: f64| {
                if let Some(game) = game.upgrade() {
                    game_loop(game, time);
                }
            });
            let handle = web_sys::window()
                .and_then(|w| {
                    w.request_animation_frame(closure.as_ref().unchecked_ref())
                        .ok()
                })
                .unwrap_or(0);
            closure.forget();
            handle
        }

        fn cancel(&mut self, handle: FrameHandle) {
            if let Some(window) = web_sys::window() {
                let _ = window.cancel_animation_frame(handle);
            }
        }
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let mut driver = RafDriver::new(&game);

        let notice = {
            let mut g = game.borrow_mut();
            let g = &mut *g;
            if g.scheduler.begin_frame(time) {
                let clip_idle = g.audio.is_idle();
                g.toy.step(&mut g.surface, clip_idle)
            } else {
                None
            }
        };

        match notice {
            Some(ToyNotice::GameOver {
                score,
                deaths,
                length,
                ..
            }) => {
                let message = {
                    let mut g = game.borrow_mut();
                    g.scheduler.pause(&mut driver);
                    g.game_over(score, deaths, length)
                };
                if let Some(window) = web_sys::window() {
                    let _ = window.alert_with_message(&message);
                }
            }
            Some(ToyNotice::PlayClip(range)) => play_clip(&game, range),
            None => {}
        }

        game.borrow_mut().scheduler.end_frame(&mut driver);
    }

    fn play_clip(game: &Rc<RefCell<Game>>, range: SoundRange) {
        let weak = Rc::downgrade(game);
        game.borrow().audio.play_range(range, move || {
            if let Some(game) = weak.upgrade() {
                game.borrow_mut().toy.clip_finished();
            }
        });
    }

    fn toggle_pause(game: &Rc<RefCell<Game>>) {
        let mut driver = RafDriver::new(game);
        let mut g = game.borrow_mut();
        if g.scheduler.toggle(&mut driver) {
            g.toy.on_resume();
            log::info!("Resumed");
        } else {
            log::info!("Paused");
        }
    }

    /// Pull the page's existing `<article>` boxes into the cube field
    fn adopt_articles(game: &Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let Some(document) = window.document() else { return };
        let articles = document.get_elements_by_tag_name("article");
        let mut g = game.borrow_mut();
        let Toy::Cubes(field) = &mut g.toy else { return };

        for i in 0..articles.length() {
            let Some(el) = articles.item(i).and_then(|e| e.dyn_into::<HtmlElement>().ok()) else {
                continue;
            };
            let rgb = window
                .get_computed_style(&el)
                .ok()
                .flatten()
                .and_then(|style| style.get_property_value("background-color").ok())
                .and_then(|css| parse_css_rgb(&css))
                .unwrap_or([255, 255, 255]);
            field.adopt(
                IVec2::new(el.offset_left(), el.offset_top()),
                IVec2::new(el.client_width(), el.client_height()),
                rgb,
            );
            let _ = el.set_attribute("hidden", "");
        }
        log::info!("Adopted {} page elements as cubes", articles.length());
    }

    fn find_or_create_canvas() -> Option<HtmlCanvasElement> {
        let document = web_sys::window()?.document()?;
        if let Some(el) = document.get_element_by_id("canvas") {
            return el.dyn_into().ok();
        }
        let canvas: HtmlCanvasElement = document.create_element("canvas").ok()?.dyn_into().ok()?;
        canvas.set_id("canvas");
        document.body()?.append_child(&canvas).ok()?;
        Some(canvas)
    }

    fn toy_from_hash() -> ToyKind {
        web_sys::window()
            .and_then(|w| w.location().hash().ok())
            .and_then(|hash| ToyKind::from_str(&hash))
            .unwrap_or_default()
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Canvas Toys starting...");

        let Some(canvas) = find_or_create_canvas() else {
            log::error!("No canvas available");
            return;
        };
        let Some(surface) = CanvasSurface::new(canvas) else {
            log::error!("Canvas has no 2D context");
            return;
        };

        let kind = toy_from_hash();
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            document.set_title(kind.title());
        }

        let seed = platform::time_seed();
        let game = Rc::new(RefCell::new(Game::new(kind, surface, seed)));
        log::info!("{} initialized with seed: {}", kind.as_str(), seed);

        if kind == ToyKind::Cubes {
            adopt_articles(&game);
        }
        {
            let mut g = game.borrow_mut();
            let g = &mut *g;
            g.toy.draw_background(&mut g.surface);
        }

        setup_input_handlers(game.clone());
        if kind == ToyKind::Pattern {
            setup_pattern_menu(game.clone());
        }
        setup_auth();

        {
            let mut driver = RafDriver::new(&game);
            game.borrow_mut().scheduler.start(&mut driver);
        }

        log::info!("Canvas Toys running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let code = event.code();
                if code == "Space" || code.starts_with("Arrow") {
                    event.prevent_default();
                }
                let action = game.borrow_mut().toy.key_down(&code, &event.key());
                if action == KeyAction::TogglePause {
                    toggle_pause(&game);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().toy.key_up(&event.key());
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let pos = IVec2::new(event.client_x(), event.client_y());
                game.borrow_mut().toy.pointer_moved(pos);
            });
            let _ = window
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().resize();
            });
            let _ = window
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if let Some(window) = web_sys::window() {
                    let _ = window.location().reload();
                }
            });
            let _ = window
                .add_event_listener_with_callback("hashchange", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Named inputs of a form, checkboxes as `true`/`false`
    fn form_inputs(form: &HtmlFormElement) -> Vec<(String, String)> {
        let inputs = form.get_elements_by_tag_name("input");
        (0..inputs.length())
            .filter_map(|i| inputs.item(i)?.dyn_into::<HtmlInputElement>().ok())
            .filter(|input| input.type_() != "submit" && !input.name().is_empty())
            .map(|input| {
                let value = if input.type_() == "checkbox" {
                    input.checked().to_string()
                } else {
                    input.value()
                };
                (input.name(), value)
            })
            .collect()
    }

    fn create<T: JsCast>(document: &Document, tag: &str) -> Option<T> {
        document.create_element(tag).ok()?.dyn_into::<T>().ok()
    }

    /// Options menu: a toggle button and a hidden form with one labelled
    /// input per pattern setting
    fn build_pattern_menu(
        document: &Document,
        config: &PatternConfig,
    ) -> Option<(HtmlElement, HtmlElement, HtmlFormElement)> {
        let menu: HtmlElement = create(document, "article")?;
        menu.set_id("pattern-menu");

        let toggle: HtmlElement = create(document, "button")?;
        toggle.set_attribute("type", "button").ok()?;
        toggle.set_class_name("toggle");
        toggle.set_text_content(Some("| | |"));

        let form: HtmlFormElement = create(document, "form")?;
        form.set_hidden(true);

        let mut group = String::new();
        for field in config.form_fields() {
            if field.group() != group {
                group = field.group().to_string();
                let title: HtmlElement = create(document, "label")?;
                title.set_class_name("title");
                title.set_text_content(Some(&group));
                form.append_child(&title).ok()?;
            }

            let input: HtmlInputElement = create(document, "input")?;
            input.set_type(field.input.html_type());
            input.set_name(&field.name);
            match field.input {
                FieldInput::Checkbox => input.set_checked(field.is_checked()),
                FieldInput::Number => {
                    input.set_step("any");
                    input.set_value(&field.value);
                }
                FieldInput::Text => input.set_value(&field.value),
            }

            let label: HtmlElement = create(document, "label")?;
            let caption: HtmlElement = create(document, "span")?;
            caption.set_text_content(Some(&field.label()));
            label.append_child(&caption).ok()?;
            label.append_child(&input).ok()?;
            form.append_child(&label).ok()?;
        }

        let submit: HtmlInputElement = create(document, "input")?;
        submit.set_type("submit");
        submit.set_value("Submit new constants.");
        form.append_child(&submit).ok()?;

        menu.append_child(&toggle).ok()?;
        menu.append_child(&form).ok()?;
        document.body()?.append_child(&menu).ok()?;
        Some((menu, toggle, form))
    }

    fn setup_pattern_menu(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        let config = game.borrow().settings.pattern.clone();
        let Some((menu, toggle, form)) = build_pattern_menu(&document, &config) else {
            log::warn!("Failed to build the pattern menu");
            return;
        };

        {
            let form = form.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                form.set_hidden(!form.hidden());
            });
            let _ = toggle.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let form = form.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                form.set_hidden(true);
            });
            let _ = menu.add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let form_clone = form.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: SubmitEvent| {
            event.prevent_default();
            let fields = form_inputs(&form_clone);
            let mut g = game.borrow_mut();
            let g = &mut *g;

            let mut config = g.settings.pattern.clone();
            match config.apply_form(fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))) {
                Ok(applied) => {
                    log::info!("Applied {} pattern settings", applied);
                    g.settings.pattern = config.clone();
                    g.settings.save();
                    g.scheduler.set_frame_delay(config.frame_delay_ms);
                    if g.toy.reconfigure_pattern(config) {
                        g.toy.draw_background(&mut g.surface);
                    }
                    form_clone.set_hidden(true);
                }
                Err(e) => log::warn!("Pattern menu rejected: {}", e),
            }
        });
        let _ = form.add_event_listener_with_callback("submit", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn update_auth_button() {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(button) = document.get_element_by_id("auth-button") {
            let (action, label) = if auth::is_signed_in() {
                (AuthAction::SignOut, "Sign out")
            } else {
                (AuthAction::SignIn, "Sign up/ in")
            };
            let _ = button.set_attribute("data-action", action.as_str());
            button.set_text_content(Some(label));
        }
    }

    fn input_value(form: &HtmlFormElement, suffix: &str) -> Option<String> {
        let inputs = form.get_elements_by_tag_name("input");
        (0..inputs.length())
            .filter_map(|i| inputs.item(i)?.dyn_into::<HtmlInputElement>().ok())
            .find(|input| input.id().ends_with(suffix))
            .map(|input| input.value())
    }

    fn setup_auth() {
        let client = AuthClient::default();

        {
            let client = client.clone();
            wasm_bindgen_futures::spawn_local(async move {
                client.request(&AuthRequest::check_session()).await;
                update_auth_button();
            });
        }

        let document = web_sys::window().unwrap().document().unwrap();
        let form = document
            .get_element_by_id("auth-menu")
            .and_then(|el| el.dyn_into::<HtmlFormElement>().ok());

        if let Some(button) = document.get_element_by_id("auth-button") {
            let client = client.clone();
            let form = form.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                if auth::is_signed_in() {
                    let client = client.clone();
                    wasm_bindgen_futures::spawn_local(async move {
                        client.request(&AuthRequest::sign_out()).await;
                        update_auth_button();
                    });
                } else if let Some(form) = &form {
                    form.set_hidden(!form.hidden());
                }
            });
            let _ = button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let Some(form) = form else { return };
        setup_auth_switches(&form);

        {
            let form = form.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if event.key() == "Escape" {
                    form.set_hidden(true);
                }
            });
            let _ = document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let form_clone = form.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: SubmitEvent| {
            event.prevent_default();
            let action = event
                .submitter()
                .and_then(|s| s.get_attribute("data-action"))
                .and_then(|a| AuthAction::from_str(&a))
                .unwrap_or(AuthAction::SignIn);

            let username = input_value(&form_clone, "-username").unwrap_or_default();
            let password = input_value(&form_clone, "-password").unwrap_or_default();
            let confirmation = input_value(&form_clone, "-confirm");

            let request = match AuthRequest::from_form(action, &username, &password, confirmation.as_deref()) {
                Ok(request) => request,
                Err(e) => {
                    log::warn!("Auth form rejected: {}", e);
                    let _ = form_clone.set_attribute("class", "error");
                    return;
                }
            };
            let _ = form_clone.remove_attribute("class");

            let client = client.clone();
            let form = form_clone.clone();
            wasm_bindgen_futures::spawn_local(async move {
                client.request(&request).await;
                update_auth_button();
                if auth::is_signed_in() {
                    form.set_hidden(true);
                }
            });
        });
        let _ = form.add_event_listener_with_callback("submit", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Show the confirmation input and retarget the submit buttons for `mode`
    fn switch_auth_mode(form: &HtmlFormElement, mode: AuthAction) {
        let _ = form.set_attribute("data-mode", mode.as_str());
        let inputs = form.get_elements_by_tag_name("input");
        for input in (0..inputs.length()).filter_map(|i| inputs.item(i)?.dyn_into::<HtmlInputElement>().ok()) {
            if input.id().ends_with("-confirm") {
                input.set_hidden(!mode.needs_confirmation());
            } else if input.type_() == "submit" {
                let _ = input.set_attribute("data-action", mode.as_str());
            }
        }
    }

    /// `label[data-switch]` flips the form between sign-in and sign-up
    fn setup_auth_switches(form: &HtmlFormElement) {
        let initial = if auth::is_signed_in() { AuthAction::SignIn } else { AuthAction::SignUp };
        switch_auth_mode(form, initial);

        let labels = form.get_elements_by_tag_name("label");
        for label in (0..labels.length()).filter_map(|i| labels.item(i)) {
            let Some(mode) = label.get_attribute("data-switch").and_then(|m| AuthAction::from_str(&m)) else {
                continue;
            };
            let form = form.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                switch_auth_mode(&form, mode);
            });
            let _ = label.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Canvas Toys (native) starting...");
    log::info!("Native mode runs every toy headless - serve the wasm build for the real thing");

    headless::run_all(canvas_toys::platform::time_seed());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use canvas_toys::highscores::RunRecord;
    use canvas_toys::renderer::RecordingSurface;
    use canvas_toys::sim::Bounds;
    use canvas_toys::{Settings, SnakeRecords, Toy, ToyKind, ToyNotice};

    const FRAMES: usize = 300;

    pub fn run_all(seed: u64) {
        let mut settings = Settings::load();
        settings.cubes.count = 200;
        settings.pattern.bud_count = 200;
        let bounds = Bounds::default();

        for kind in ToyKind::ALL {
            run_toy(kind, &settings, bounds, seed);
        }
    }

    fn run_toy(kind: ToyKind, settings: &Settings, bounds: Bounds, seed: u64) {
        let mut toy = Toy::new(kind, settings, bounds, seed);
        let mut surface = RecordingSurface::new(bounds);
        let mut records = SnakeRecords::default();
        let mut clips = 0;
        let mut deaths = 0;
        let mut commands = 0;

        if kind == ToyKind::Loop {
            toy.key_down("KeyD", "d");
            toy.key_down("KeyZ", "z");
        }

        for frame in 0..FRAMES {
            // Wander so the snake eventually meets its tail or an apple
            if kind == ToyKind::Snake && frame % 7 == 0 {
                let turns = ["ArrowUp", "ArrowLeft", "ArrowDown", "ArrowRight"];
                toy.key_down(turns[(frame / 7) % turns.len()], "");
            }

            match toy.step(&mut surface, true) {
                Some(ToyNotice::GameOver { score, length, .. }) => {
                    deaths += 1;
                    records.record(RunRecord {
                        score,
                        length,
                        timestamp: frame as f64,
                    });
                    toy.on_resume();
                }
                Some(ToyNotice::PlayClip(_)) => {
                    clips += 1;
                    toy.clip_finished();
                }
                None => {}
            }
            commands += surface.flush();
        }

        log::info!(
            "{}: {} frames, {} draw commands, {} deaths, {} clips, best score {}",
            kind.as_str(),
            FRAMES,
            commands,
            deaths,
            clips,
            records.best
        );
        println!("✓ {} ran {} frames ({} draw commands)", kind.title(), FRAMES, commands);
    }
}
