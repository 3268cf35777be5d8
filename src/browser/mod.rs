use std::rc::Rc;

use gloo_events::EventListener;
use wasm_bindgen::prelude::*;
use web_sys::Window;

use crate::api::ApiClient;
use crate::config::AppConfig;
use crate::currency::{format_currency, format_currency_text};
use crate::session::{GateOutcome, Session};

mod badge;
mod dom;
mod storage;
mod transport;

use storage::{BrowserNavigator, BrowserStore};
use transport::GlooTransport;

const CONFIG_ATTRIBUTE: &str = "data-paisatrack-config";

#[derive(Debug, thiserror::Error)]
pub enum BootError {
    #[error("window is unavailable")]
    NoWindow,
    #[error("document is unavailable")]
    NoDocument,
    #[error("failed to install `{0}` on window")]
    Global(&'static str),
}

pub(crate) type PageApi = ApiClient<GlooTransport>;

/// WASM entry point. Runs the page controller once the DOM is parsed.
pub fn start() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(log::Level::Trace));

    let config = AppConfig::load(page_config().as_deref());
    log::set_max_level(config.log_level().to_level_filter());

    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        log::error!("{}", BootError::NoDocument);
        return;
    };
    if document.ready_state() == "loading" {
        EventListener::once(&document, "DOMContentLoaded", move |_| run(config)).forget();
    } else {
        run(config);
    }
}

fn run(config: AppConfig) {
    if let Err(error) = boot(config) {
        log::error!("page controller failed to start: {error}");
    }
}

fn boot(config: AppConfig) -> Result<(), BootError> {
    let window = web_sys::window().ok_or(BootError::NoWindow)?;
    let document = window.document().ok_or(BootError::NoDocument)?;

    let session = Session::restore(BrowserStore, BrowserNavigator, &config);
    let api = Rc::new(ApiClient::new(session.clone(), GlooTransport, &config));

    install_globals(&window)?;

    if let GateOutcome::Authenticated(Some(user)) = session.gate() {
        dom::render_user_badge(&document, &user);
    }

    dom::fill_default_dates(&document);
    dom::bind_transaction_type(&document);
    dom::bind_credit_card_rule(&document);
    dom::bind_form_validation(&document);
    dom::bind_layout(&window, &document);
    dom::bind_logout_buttons(&document, api);

    log::info!("page controller ready");
    Ok(())
}

fn page_config() -> Option<String> {
    web_sys::window()?
        .document()?
        .body()?
        .get_attribute(CONFIG_ATTRIBUTE)
}

/// Helpers the server templates call from inline handlers.
fn install_globals(window: &Window) -> Result<(), BootError> {
    expose(
        window,
        "toggleFilters",
        Closure::<dyn Fn()>::new(dom::toggle_filters).into_js_value(),
    )?;
    expose(
        window,
        "confirmDelete",
        Closure::<dyn Fn(JsValue) -> bool>::new(|message: JsValue| {
            dom::confirm_delete(message.as_string())
        })
        .into_js_value(),
    )?;
    expose(
        window,
        "formatCurrency",
        Closure::<dyn Fn(JsValue) -> String>::new(|amount: JsValue| match amount.as_f64() {
            Some(number) => format_currency(number),
            None => format_currency_text(&amount.as_string().unwrap_or_default()),
        })
        .into_js_value(),
    )
}

fn expose(window: &Window, name: &'static str, value: JsValue) -> Result<(), BootError> {
    js_sys::Reflect::set(window, &JsValue::from_str(name), &value)
        .map_err(|_| BootError::Global(name))?;
    Ok(())
}
