//! The slice of the DOM the page effects touch.
//!
//! Everything above this layer is written against these traits, so the
//! effect logic runs the same against `web_sys` handles and test fakes.

/// A handle to one element on the page.
pub trait PageNode: Clone + PartialEq + 'static {
    fn attribute(&self, name: &str) -> Option<String>;

    fn add_class(&self, class: &str);
    fn remove_class(&self, class: &str);
    fn toggle_class(&self, class: &str);
    fn has_class(&self, class: &str) -> bool;

    fn set_text(&self, text: &str);

    /// Inline style override; clearing restores the stylesheet value.
    fn set_style(&self, property: &str, value: &str);
    fn clear_style(&self, property: &str);

    /// Top edge relative to the viewport, in CSS pixels.
    fn top(&self) -> f64;
}

pub trait Viewport {
    type Node: PageNode;

    fn scroll_y(&self) -> f64;
    fn element_by_id(&self, id: &str) -> Option<Self::Node>;
    fn smooth_scroll_to(&self, top: f64);
}

/// Wall clock plus the host's animation-frame scheduler.
pub trait FrameClock: Clone + 'static {
    /// Milliseconds on the same timeline as frame timestamps.
    fn now(&self) -> f64;
    fn request_frame(&self, callback: Box<dyn FnOnce(f64)>);
}
