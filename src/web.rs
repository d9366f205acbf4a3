//! `web_sys` implementations of the page traits.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, ScrollBehavior, ScrollToOptions, Window};

use crate::dom::{FrameClock, PageNode, Viewport};
use crate::error::{FxError, Result};

impl PageNode for Element {
    fn attribute(&self, name: &str) -> Option<String> {
        self.get_attribute(name)
    }

    fn add_class(&self, class: &str) {
        let _ = self.class_list().add_1(class);
    }

    fn remove_class(&self, class: &str) {
        let _ = self.class_list().remove_1(class);
    }

    fn toggle_class(&self, class: &str) {
        let _ = self.class_list().toggle(class);
    }

    fn has_class(&self, class: &str) -> bool {
        self.class_list().contains(class)
    }

    fn set_text(&self, text: &str) {
        self.set_text_content(Some(text));
    }

    fn set_style(&self, property: &str, value: &str) {
        if let Some(html) = self.dyn_ref::<HtmlElement>() {
            let _ = html.style().set_property(property, value);
        }
    }

    fn clear_style(&self, property: &str) {
        if let Some(html) = self.dyn_ref::<HtmlElement>() {
            let _ = html.style().remove_property(property);
        }
    }

    fn top(&self) -> f64 {
        self.get_bounding_client_rect().top()
    }
}

/// The live window and document.
#[derive(Clone)]
pub struct BrowserPage {
    window: Window,
    document: Document,
}

impl BrowserPage {
    pub fn current() -> Result<Self> {
        let window = web_sys::window().ok_or(FxError::NoWindow)?;
        let document = window.document().ok_or(FxError::NoDocument)?;
        Ok(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    /// All matches in document order. An invalid selector matches nothing.
    pub fn query_all(&self, selector: &str) -> Vec<Element> {
        query_all_in(&self.document, selector)
    }
}

/// `querySelectorAll` on any element or document.
pub fn query_all_in(root: &JsValue, selector: &str) -> Vec<Element> {
    let list = if let Some(document) = root.dyn_ref::<Document>() {
        document.query_selector_all(selector)
    } else if let Some(element) = root.dyn_ref::<Element>() {
        element.query_selector_all(selector)
    } else {
        return Vec::new();
    };

    let Ok(list) = list else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

impl Viewport for BrowserPage {
    type Node = Element;

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn smooth_scroll_to(&self, top: f64) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }
}

impl FrameClock for BrowserPage {
    fn now(&self) -> f64 {
        self.window.performance().map(|p| p.now()).unwrap_or(0.0)
    }

    fn request_frame(&self, callback: Box<dyn FnOnce(f64)>) {
        let step = Closure::once_into_js(move |ts: f64| callback(ts));
        let _ = self.window.request_animation_frame(step.unchecked_ref());
    }
}
