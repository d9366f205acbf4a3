//! In-memory stand-ins for the DOM used by the unit tests.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use crate::dom::{FrameClock, PageNode, Viewport};

#[derive(Debug, Default)]
pub struct NodeState {
    pub attributes: BTreeMap<String, String>,
    pub classes: Vec<String>,
    pub text: String,
    pub style: BTreeMap<String, String>,
    pub top: f64,
    /// Every class mutation, in order.
    pub class_writes: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeNode(pub Rc<RefCell<NodeState>>);

impl PartialEq for FakeNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl FakeNode {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attr(self, name: &str, value: &str) -> Self {
        self.0
            .borrow_mut()
            .attributes
            .insert(name.to_string(), value.to_string());
        self
    }

    pub fn at(self, top: f64) -> Self {
        self.0.borrow_mut().top = top;
        self
    }

    pub fn text(&self) -> String {
        self.0.borrow().text.clone()
    }

    pub fn style(&self, property: &str) -> Option<String> {
        self.0.borrow().style.get(property).cloned()
    }

    pub fn class_writes(&self) -> usize {
        self.0.borrow().class_writes.len()
    }
}

impl PageNode for FakeNode {
    fn attribute(&self, name: &str) -> Option<String> {
        self.0.borrow().attributes.get(name).cloned()
    }

    fn add_class(&self, class: &str) {
        let mut state = self.0.borrow_mut();
        if !state.classes.iter().any(|c| c == class) {
            state.classes.push(class.to_string());
        }
        state.class_writes.push(format!("+{}", class));
    }

    fn remove_class(&self, class: &str) {
        let mut state = self.0.borrow_mut();
        state.classes.retain(|c| c != class);
        state.class_writes.push(format!("-{}", class));
    }

    fn toggle_class(&self, class: &str) {
        if self.has_class(class) {
            self.remove_class(class);
        } else {
            self.add_class(class);
        }
    }

    fn has_class(&self, class: &str) -> bool {
        self.0.borrow().classes.iter().any(|c| c == class)
    }

    fn set_text(&self, text: &str) {
        self.0.borrow_mut().text = text.to_string();
    }

    fn set_style(&self, property: &str, value: &str) {
        self.0
            .borrow_mut()
            .style
            .insert(property.to_string(), value.to_string());
    }

    fn clear_style(&self, property: &str) {
        self.0.borrow_mut().style.remove(property);
    }

    fn top(&self) -> f64 {
        self.0.borrow().top
    }
}

#[derive(Default)]
pub struct FakeViewport {
    pub scroll_y: f64,
    pub elements: BTreeMap<String, FakeNode>,
    pub scrolls: RefCell<Vec<f64>>,
}

impl FakeViewport {
    pub fn with_element(mut self, id: &str, node: FakeNode) -> Self {
        self.elements.insert(id.to_string(), node);
        self
    }
}

impl Viewport for FakeViewport {
    type Node = FakeNode;

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn element_by_id(&self, id: &str) -> Option<FakeNode> {
        self.elements.get(id).cloned()
    }

    fn smooth_scroll_to(&self, top: f64) {
        self.scrolls.borrow_mut().push(top);
    }
}

#[derive(Default)]
struct ClockState {
    now: f64,
    frames: VecDeque<Box<dyn FnOnce(f64)>>,
}

/// A clock whose frames only run when the test pumps them.
#[derive(Clone, Default)]
pub struct FakeClock(Rc<RefCell<ClockState>>);

impl FakeClock {
    pub fn at(now: f64) -> Self {
        let clock = Self::default();
        clock.0.borrow_mut().now = now;
        clock
    }

    pub fn pending(&self) -> usize {
        self.0.borrow().frames.len()
    }

    /// Advances time and runs every frame queued before the call.
    /// Returns how many callbacks ran.
    pub fn tick(&self, ts: f64) -> usize {
        let due: Vec<_> = {
            let mut state = self.0.borrow_mut();
            state.now = ts;
            state.frames.drain(..).collect()
        };
        let ran = due.len();
        for frame in due {
            frame(ts);
        }
        ran
    }
}

impl FrameClock for FakeClock {
    fn now(&self) -> f64 {
        self.0.borrow().now
    }

    fn request_frame(&self, callback: Box<dyn FnOnce(f64)>) {
        self.0.borrow_mut().frames.push_back(callback);
    }
}
