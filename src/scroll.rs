use log::debug;

use crate::dom::PageNode;

/// Navbar appearance driven by the vertical scroll offset.
pub struct NavbarState<N> {
    navbar: N,
    class: String,
    threshold: f64,
    scrolled: Option<bool>,
}

impl<N: PageNode> NavbarState<N> {
    pub fn new(navbar: N, class: impl Into<String>, threshold: f64) -> Self {
        Self {
            navbar,
            class: class.into(),
            threshold,
            scrolled: None,
        }
    }

    pub fn is_scrolled(&self) -> bool {
        self.scrolled.unwrap_or(false)
    }

    /// Applies the class for `scroll_y`. Returns true only when the
    /// presentation actually changed.
    pub fn on_scroll(&mut self, scroll_y: f64) -> bool {
        let scrolled = scroll_y > self.threshold;
        if self.scrolled == Some(scrolled) {
            return false;
        }

        if scrolled {
            self.navbar.add_class(&self.class);
        } else {
            self.navbar.remove_class(&self.class);
        }
        self.scrolled = Some(scrolled);
        true
    }
}

/// Marks the nav entry matching the section currently in view.
pub struct SectionHighlighter<N> {
    entries: Vec<N>,
    property: String,
    value: String,
}

impl<N: PageNode> SectionHighlighter<N> {
    pub fn new(entries: Vec<N>, property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            entries,
            property: property.into(),
            value: value.into(),
        }
    }

    fn matches(entry: &N, section_id: &str) -> bool {
        entry
            .attribute("href")
            .and_then(|href| href.strip_prefix('#').map(|id| id == section_id))
            .unwrap_or(false)
    }

    pub fn has_entry_for(&self, section_id: &str) -> bool {
        self.entries.iter().any(|entry| Self::matches(entry, section_id))
    }

    /// Clears every entry, then marks the first one pointing at `#section_id`.
    /// At most one entry is active afterwards.
    pub fn highlight(&self, section_id: &str) {
        for entry in &self.entries {
            entry.clear_style(&self.property);
        }
        if let Some(entry) = self.entries.iter().find(|entry| Self::matches(entry, section_id)) {
            entry.set_style(&self.property, &self.value);
        }
    }

    /// Handles one visibility batch (topmost first). The first section with a
    /// matching entry wins; a batch with none leaves the highlight as it was.
    pub fn on_sections_visible(&self, sections: &[N]) -> Option<String> {
        let id = sections
            .iter()
            .filter_map(|section| section.attribute("id"))
            .find(|id| !id.is_empty() && self.has_entry_for(id));

        match id {
            Some(id) => {
                self.highlight(&id);
                Some(id)
            }
            None => {
                debug!("no nav entry for visible sections");
                None
            }
        }
    }
}
