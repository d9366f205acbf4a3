use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{AddEventListenerOptions, Element, Event, EventTarget};

use crate::anchor;
use crate::config::Config;
use crate::counter::{animate_counter, CounterSettings};
use crate::dom::Viewport;
use crate::error::Result;
use crate::fade;
use crate::menu::MobileMenu;
use crate::scroll::{NavbarState, SectionHighlighter};
use crate::watcher::{try_watcher, VisibilityWatcher};
use crate::web::{query_all_in, BrowserPage};

type Listener = Closure<dyn FnMut(Event)>;

/// Owns every listener and observer the page effects need. Dropping it
/// detaches observers; `keep_alive` pins it for the life of the page.
pub struct PageController {
    page: BrowserPage,
    listeners: Vec<Listener>,
    watchers: Vec<VisibilityWatcher>,
    navbar: Option<Rc<RefCell<NavbarState<Element>>>>,
}

impl PageController {
    pub fn start(config: Config) -> Result<Self> {
        let page = BrowserPage::current()?;
        let mut controller = Self {
            page,
            listeners: Vec::new(),
            watchers: Vec::new(),
            navbar: None,
        };

        controller.wire_navbar(&config)?;
        controller.wire_menu(&config)?;
        controller.wire_fade(&config);
        controller.wire_counters(&config);
        controller.wire_sections(&config);
        controller.wire_anchors(&config)?;

        info!(
            "landing effects ready: {} listeners, {} watchers",
            controller.listeners.len(),
            controller.watchers.len()
        );
        Ok(controller)
    }

    pub fn is_scrolled(&self) -> bool {
        self.navbar
            .as_ref()
            .map(|navbar| navbar.borrow().is_scrolled())
            .unwrap_or(false)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn watcher_count(&self) -> usize {
        self.watchers.len()
    }

    /// The page is the process boundary, so the controller is never torn down.
    pub fn keep_alive(self) {
        std::mem::forget(self);
    }

    fn listen<F>(&mut self, target: &EventTarget, event: &str, handler: F) -> Result<()>
    where
        F: FnMut(Event) + 'static,
    {
        let closure: Listener = Closure::new(handler);
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        self.listeners.push(closure);
        Ok(())
    }

    fn wire_navbar(&mut self, config: &Config) -> Result<()> {
        let Some(navbar) = self.page.query(&config.selectors.navbar) else {
            debug!("no navbar at {:?}, scroll state disabled", config.selectors.navbar);
            return Ok(());
        };

        let state = Rc::new(RefCell::new(NavbarState::new(
            navbar,
            config.classes.scrolled.clone(),
            config.scroll_threshold,
        )));

        // Initial check, in case the page was restored mid-scroll
        state.borrow_mut().on_scroll(self.page.scroll_y());

        let page = self.page.clone();
        let reactor = state.clone();
        let closure: Listener = Closure::new(move |_: Event| {
            reactor.borrow_mut().on_scroll(page.scroll_y());
        });

        let options = AddEventListenerOptions::new();
        options.set_passive(true);
        self.page
            .window()
            .add_event_listener_with_callback_and_add_event_listener_options(
                "scroll",
                closure.as_ref().unchecked_ref(),
                &options,
            )?;

        self.listeners.push(closure);
        self.navbar = Some(state);
        Ok(())
    }

    fn wire_menu(&mut self, config: &Config) -> Result<()> {
        let toggle = self.page.query(&config.selectors.menu_toggle);
        let links = self.page.query(&config.selectors.menu_links);
        let (Some(toggle), Some(links)) = (toggle, links) else {
            debug!("mobile menu markup missing, toggle not wired");
            return Ok(());
        };

        let menu = Rc::new(MobileMenu::new(links.clone(), config.classes.open.clone()));

        {
            let menu = menu.clone();
            self.listen(&toggle, "click", move |_| menu.on_toggle())?;
        }

        for link in query_all_in(&links, "a") {
            let menu = menu.clone();
            self.listen(&link, "click", move |_| menu.on_link_activated())?;
        }
        Ok(())
    }

    fn wire_fade(&mut self, config: &Config) {
        let elements = self.page.query_all(&config.selectors.fade);
        if elements.is_empty() {
            return;
        }

        let class = config.classes.visible.clone();
        let watcher = try_watcher("fade-in", config.fade_threshold, &config.fade_root_margin, true, move |visible| {
            fade::reveal(visible, &class)
        });
        if let Some(watcher) = watcher {
            let count = watcher.observe_all(&elements);
            debug!("watching {} fade-in elements", count);
            self.watchers.push(watcher);
        }
    }

    fn wire_counters(&mut self, config: &Config) {
        let elements = self.page.query_all(&config.selectors.counters);
        if elements.is_empty() {
            return;
        }

        let clock = self.page.clone();
        let settings = CounterSettings {
            attribute: config.counter_attribute.clone(),
            duration_ms: config.counter_duration_ms,
        };
        let watcher = try_watcher("counter", config.counter_threshold, "0px", true, move |visible| {
            for element in visible {
                animate_counter(element.clone(), &clock, &settings);
            }
        });
        if let Some(watcher) = watcher {
            let count = watcher.observe_all(&elements);
            debug!("watching {} counters", count);
            self.watchers.push(watcher);
        }
    }

    fn wire_sections(&mut self, config: &Config) {
        let sections = self.page.query_all(&config.selectors.sections);
        let entries = self.page.query_all(&config.selectors.nav_entries);
        if sections.is_empty() || entries.is_empty() {
            debug!("no sections or nav entries, highlighting disabled");
            return;
        }

        let highlighter = SectionHighlighter::new(
            entries,
            config.active_style_property.clone(),
            config.active_style_value.clone(),
        );
        let watcher = try_watcher(
            "section",
            config.section_threshold,
            &config.section_root_margin,
            false,
            move |visible| {
                if let Some(id) = highlighter.on_sections_visible(visible) {
                    debug!("active section: {}", id);
                }
            },
        );
        if let Some(watcher) = watcher {
            watcher.observe_all(&sections);
            self.watchers.push(watcher);
        }
    }

    fn wire_anchors(&mut self, config: &Config) -> Result<()> {
        for link in self.page.query_all(&config.selectors.anchors) {
            let page = self.page.clone();
            let offset = config.header_offset;
            let target = link.clone();
            self.listen(&link, "click", move |event: Event| {
                let Some(href) = target.get_attribute("href") else {
                    return;
                };
                if anchor::navigate(&page, &href, offset) {
                    event.prevent_default();
                }
            })?;
        }
        Ok(())
    }
}
