use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    Document, Element, EventTarget, HtmlElement, HtmlInputElement, HtmlSelectElement,
    ScrollBehavior, ScrollIntoViewOptions, Window,
};

use super::{badge, PageApi};
use crate::form::{
    category_for_destination, validate_submission, CategoryField, FieldGroup, GroupVisibility,
    SubmittedForm,
};
use crate::layout::{toggle_filter_section, ClassChange, LayoutPlan};
use crate::session::UserProfile;

const TRANSACTION_TYPE_ID: &str = "transaction_type";
const TO_ACCOUNT_ID: &str = "to_account";
const CATEGORY_ID: &str = "category";
const USER_MENU_ID: &str = "navbarDropdown";
const FILTER_SECTION_ID: &str = "filter-section";

const LOGOUT_PROMPT: &str = "Are you sure you want to logout?";
const DELETE_PROMPT: &str = "Are you sure you want to delete this item?";

/// A value-bearing form control: either `<select>` or `<input>`.
enum FormField {
    Input(HtmlInputElement),
    Select(HtmlSelectElement),
}

impl FormField {
    fn from_element(element: Element) -> Option<Self> {
        match element.dyn_into::<HtmlSelectElement>() {
            Ok(select) => Some(Self::Select(select)),
            Err(element) => element.dyn_into::<HtmlInputElement>().ok().map(Self::Input),
        }
    }

    fn value(&self) -> String {
        match self {
            Self::Input(input) => input.value(),
            Self::Select(select) => select.value(),
        }
    }

    fn set_value(&self, value: &str) {
        match self {
            Self::Input(input) => input.set_value(value),
            Self::Select(select) => select.set_value(value),
        }
    }

    fn set_disabled(&self, disabled: bool) {
        match self {
            Self::Input(input) => input.set_disabled(disabled),
            Self::Select(select) => select.set_disabled(disabled),
        }
    }

    fn target(&self) -> &EventTarget {
        match self {
            Self::Input(input) => input.as_ref(),
            Self::Select(select) => select.as_ref(),
        }
    }
}

fn by_id<T: JsCast>(document: &Document, id: &str) -> Option<T> {
    document.get_element_by_id(id)?.dyn_into::<T>().ok()
}

fn field_by_id(document: &Document, id: &str) -> Option<FormField> {
    FormField::from_element(document.get_element_by_id(id)?)
}

fn field_in(form: &Element, selector: &str) -> Option<FormField> {
    FormField::from_element(form.query_selector(selector).ok()??)
}

fn query_all(document: &Document, selector: &str) -> Vec<Element> {
    let Ok(nodes) = document.query_selector_all(selector) else {
        log::debug!("invalid selector {selector}");
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|index| nodes.item(index))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

fn set_display(element: &HtmlElement, display: &str) {
    if element.style().set_property("display", display).is_err() {
        log::debug!("could not set display on #{}", element.id());
    }
}

fn viewport_width(window: &Window) -> f64 {
    window
        .inner_width()
        .ok()
        .and_then(|width| width.as_f64())
        .unwrap_or(0.0)
}

fn alert(message: &str) {
    let shown = web_sys::window().map(|window| window.alert_with_message(message).is_ok());
    if shown != Some(true) {
        log::debug!("could not show alert: {message}");
    }
}

fn confirm(message: &str) -> bool {
    web_sys::window()
        .and_then(|window| window.confirm_with_message(message).ok())
        .unwrap_or(false)
}

pub(super) fn render_user_badge(document: &Document, user: &UserProfile) {
    if let Some(root) = document.get_element_by_id(USER_MENU_ID) {
        badge::mount(root, &user.username);
    }
}

pub(super) fn fill_default_dates(document: &Document) {
    let iso = String::from(js_sys::Date::new_0().to_iso_string());
    let today = iso.split('T').next().unwrap_or_default();
    query_all(document, "input[type=\"date\"]")
        .into_iter()
        .filter_map(|element| element.dyn_into::<HtmlInputElement>().ok())
        .filter(|input| input.value().is_empty())
        .for_each(|input| input.set_value(today));
}

fn apply_visibility(document: &Document, visibility: GroupVisibility) {
    for group in FieldGroup::ALL {
        if let Some(element) = by_id::<HtmlElement>(document, group.element_id()) {
            let display = if visibility.is_shown(group) { "block" } else { "none" };
            set_display(&element, display);
        }
    }
}

pub(super) fn bind_transaction_type(document: &Document) {
    let Some(selector) = field_by_id(document, TRANSACTION_TYPE_ID) else {
        return;
    };
    apply_visibility(document, GroupVisibility::for_value(&selector.value()));

    let target = selector.target().clone();
    let document = document.clone();
    EventListener::new(&target, "change", move |_| {
        apply_visibility(&document, GroupVisibility::for_value(&selector.value()));
    })
    .forget();
}

fn apply_category_rule(document: &Document, to_account: &str) {
    let Some(category) = field_by_id(document, CATEGORY_ID) else {
        return;
    };
    match category_for_destination(Some(to_account)) {
        CategoryField::Locked(value) => {
            category.set_value(value);
            category.set_disabled(true);
        }
        CategoryField::Editable => category.set_disabled(false),
    }
}

pub(super) fn bind_credit_card_rule(document: &Document) {
    let Some(to_account) = field_by_id(document, TO_ACCOUNT_ID) else {
        return;
    };
    apply_category_rule(document, &to_account.value());

    let target = to_account.target().clone();
    let document = document.clone();
    EventListener::new(&target, "change", move |_| {
        apply_category_rule(&document, &to_account.value());
    })
    .forget();
}

fn read_form(form: &Element) -> SubmittedForm {
    let value = |selector: &str| field_in(form, selector).map(|field| field.value());
    SubmittedForm {
        amount: value("input[name=\"amount\"]"),
        account: value("select[name=\"account\"]"),
        transaction_type: value("select[name=\"transaction_type\"]"),
        from_account: value("select[name=\"from_account\"]"),
        to_account: value("select[name=\"to_account\"]"),
    }
}

pub(super) fn bind_form_validation(document: &Document) {
    for form in query_all(document, "form") {
        guard_submit(form, alert);
    }
}

/// Cancels the submit and reports the first broken rule through `notify`.
fn guard_submit(form: Element, notify: fn(&str)) {
    let target = form.clone();
    EventListener::new_with_options(
        &target,
        "submit",
        EventListenerOptions::enable_prevent_default(),
        move |event| {
            if let Err(error) = validate_submission(&read_form(&form)) {
                event.prevent_default();
                log::debug!("blocked form submission: {error}");
                notify(&error.to_string());
            }
        },
    )
    .forget();
}

fn apply_layout(window: &Window, document: &Document) {
    let plan = LayoutPlan::for_width(viewport_width(window));
    for rule in plan.class_rules() {
        for element in query_all(document, rule.selector) {
            let classes = element.class_list();
            for change in &rule.changes {
                let applied = match change {
                    ClassChange::Add(class) => classes.add_1(class),
                    ClassChange::Remove(class) => classes.remove_1(class),
                };
                if applied.is_err() {
                    log::debug!("class update {change:?} failed on {}", rule.selector);
                }
            }
        }
    }
}

pub(super) fn bind_layout(window: &Window, document: &Document) {
    apply_layout(window, document);

    let (resized, document) = (window.clone(), document.clone());
    EventListener::new(window, "resize", move |_| apply_layout(&resized, &document)).forget();
}

pub(super) fn toggle_filters() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(section) = window
        .document()
        .and_then(|document| by_id::<HtmlElement>(&document, FILTER_SECTION_ID))
    else {
        return;
    };

    let current = section
        .style()
        .get_property_value("display")
        .unwrap_or_default();
    let next = toggle_filter_section(&current, viewport_width(&window));
    set_display(&section, next.display);

    if next.scroll_into_view {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        section.scroll_into_view_with_scroll_into_view_options(&options);
    }
}

pub(super) fn confirm_delete(message: Option<String>) -> bool {
    let message = message.filter(|message| !message.is_empty());
    confirm(message.as_deref().unwrap_or(DELETE_PROMPT))
}

pub(super) fn bind_logout_buttons(document: &Document, api: Rc<PageApi>) {
    for button in query_all(document, "[data-logout]") {
        let api = api.clone();
        EventListener::new_with_options(
            &button,
            "click",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                event.prevent_default();
                if !confirm(LOGOUT_PROMPT) {
                    return;
                }
                let api = api.clone();
                spawn_local(async move { api.sign_out().await });
            },
        )
        .forget();
    }
}
