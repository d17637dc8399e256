//! Comment Wall entry point
//!
//! On the web this mounts the widget into the host page and wires the form
//! and list events. Natively it renders a JSON snapshot to HTML.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_widget {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        Document, Element, Event, HtmlFormElement, HtmlInputElement, HtmlTextAreaElement,
        MouseEvent, Window,
    };

    use comment_wall::platform::{self, LocalStorage};
    use comment_wall::view::{self, Action, dom};
    use comment_wall::{CommentId, CommentWidget, Prompt, WidgetConfig};

    /// `window.alert` / `window.confirm`
    struct BrowserPrompt {
        window: Window,
    }

    impl Prompt for BrowserPrompt {
        fn alert(&self, message: &str) {
            let _ = self.window.alert_with_message(message);
        }

        fn confirm(&self, message: &str) -> bool {
            self.window.confirm_with_message(message).unwrap_or(false)
        }
    }

    /// Widget instance plus the DOM handles it renders into
    struct App {
        widget: CommentWidget<LocalStorage>,
        document: Document,
        list: Element,
        prompt: BrowserPrompt,
    }

    impl App {
        fn render(&mut self) {
            let nodes = self.widget.render();
            if let Err(e) = dom::mount(&self.document, &self.list, &nodes) {
                log::error!("Render failed: {:?}", e);
            }
        }

        /// Current value of an `<input>` or `<textarea>` by element id
        fn field_value(&self, id: &str) -> String {
            let Some(el) = self.document.get_element_by_id(id) else {
                log::warn!("Missing form field #{}", id);
                return String::new();
            };
            match el.dyn_into::<HtmlInputElement>() {
                Ok(input) => input.value(),
                Err(el) => el
                    .dyn_into::<HtmlTextAreaElement>()
                    .map(|t| t.value())
                    .unwrap_or_default(),
            }
        }

        /// Live textarea value for a comment being edited
        fn edit_value(&self, id: &CommentId) -> Option<String> {
            self.list
                .query_selector(&view::edit_textarea_selector(id))
                .ok()
                .flatten()
                .and_then(|el| el.dyn_into::<HtmlTextAreaElement>().ok())
                .map(|t| t.value())
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Comment Wall starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");
        let config = WidgetConfig::load();

        let Some(storage) = LocalStorage::open() else {
            log::error!("LocalStorage unavailable, comments cannot be persisted");
            return;
        };

        let list = document
            .get_element_by_id(&config.list_id)
            .expect("no comment list container");
        let form: HtmlFormElement = document
            .get_element_by_id(&config.form_id)
            .expect("no comment form")
            .dyn_into()
            .expect("not a form");

        let mut widget = CommentWidget::new(storage, config, platform::clock_seed());
        if let Err(e) = widget.init(platform::now()) {
            log::error!("Failed to assign ids to legacy comments: {}", e);
        }

        let app = Rc::new(RefCell::new(App {
            widget,
            document,
            list: list.clone(),
            prompt: BrowserPrompt { window },
        }));
        app.borrow_mut().render();

        setup_form(&form, app.clone());
        setup_list_clicks(&list, app.clone());
        setup_draft_tracking(&list, app);

        log::info!("Comment Wall running!");
    }

    fn setup_form(form: &HtmlFormElement, app: Rc<RefCell<App>>) {
        let form_clone = form.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: Event| {
            event.prevent_default();
            let mut a = app.borrow_mut();
            let config = a.widget.config().clone();
            let author = a.field_value(&config.author_input_id);
            let text = a.field_value(&config.text_input_id);

            let App { widget, prompt, .. } = &mut *a;
            match widget.handle_submit(&author, &text, &*prompt, platform::now()) {
                Ok(true) => {
                    a.render();
                    form_clone.reset();
                }
                Ok(false) => {}
                Err(e) => log::error!("Failed to add comment: {}", e),
            }
        });
        let _ = form.add_event_listener_with_callback("submit", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_list_clicks(list: &Element, app: Rc<RefCell<App>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let Some(control) = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest(&format!("[{}]", view::ACTION_ATTR)).ok().flatten())
            else {
                return;
            };
            let Some(action) = control
                .get_attribute(view::ACTION_ATTR)
                .and_then(|s| Action::from_str(&s))
            else {
                return;
            };
            let Some(id) = control.get_attribute(view::ID_ATTR).map(CommentId::from) else {
                return;
            };

            let mut a = app.borrow_mut();
            let draft = match action {
                Action::Save => a.edit_value(&id),
                _ => None,
            };
            let App { widget, prompt, .. } = &mut *a;
            match widget.handle_action(action, &id, draft.as_deref(), &*prompt, platform::now()) {
                Ok(true) => {
                    a.render();
                    if action == Action::Edit {
                        dom::focus(&a.list, &view::edit_textarea_selector(&id));
                    }
                }
                Ok(false) => {}
                Err(e) => log::error!("Failed to {} comment {}: {}", action.as_str(), id, e),
            }
        });
        let _ = list.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_draft_tracking(list: &Element, app: Rc<RefCell<App>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: Event| {
            let Some(textarea) = event
                .target()
                .and_then(|t| t.dyn_into::<HtmlTextAreaElement>().ok())
            else {
                return;
            };
            if let Some(id) = textarea.get_attribute(view::ID_ATTR) {
                app.borrow_mut()
                    .widget
                    .update_draft(&CommentId::from(id), &textarea.value());
            }
        });
        let _ = list.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_widget::run();
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use clap::Parser;

    use comment_wall::{CommentWidget, Locale, MemoryStore, WidgetConfig, platform, view};

    /// Render a comment snapshot (the JSON array stored in LocalStorage) to HTML
    #[derive(Parser, Debug)]
    #[command(name = "comment-wall", version, about)]
    pub struct Cli {
        /// JSON file holding the persisted comment array
        pub snapshot: PathBuf,

        /// Date locale (fr, en)
        #[arg(long, default_value = "fr")]
        pub locale: String,

        /// Storage key the snapshot is loaded under
        #[arg(long)]
        pub key: Option<String>,
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        let cli = Cli::parse();

        let mut config = WidgetConfig::load();
        config.locale = Locale::from_str(&cli.locale)
            .ok_or_else(|| format!("unknown locale '{}'", cli.locale))?;
        if let Some(key) = cli.key {
            config.storage_key = key;
        }

        let json = std::fs::read_to_string(&cli.snapshot)?;
        log::info!("Rendering {}", cli.snapshot.display());

        let backend = MemoryStore::with_value(&config.storage_key, json);
        let mut widget = CommentWidget::new(backend, config, platform::clock_seed());
        widget.init(platform::now())?;

        println!("{}", view::to_html(&widget.render()));
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    log::info!("Comment Wall (native) starting...");
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
