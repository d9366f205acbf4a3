use crate::dom::PageNode;

/// Mobile menu: a toggle button opening and closing the nav link list.
pub struct MobileMenu<N> {
    links: N,
    open_class: String,
}

impl<N: PageNode> MobileMenu<N> {
    pub fn new(links: N, open_class: impl Into<String>) -> Self {
        Self {
            links,
            open_class: open_class.into(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.links.has_class(&self.open_class)
    }

    pub fn on_toggle(&self) {
        self.links.toggle_class(&self.open_class);
    }

    /// Following a link closes the menu.
    pub fn on_link_activated(&self) {
        self.links.remove_class(&self.open_class);
    }
}
