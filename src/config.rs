use log::Level;
use serde::Deserialize;

use crate::error::Result;

/// Attribute on `<html>` that may carry a JSON object overriding any field below.
pub const CONFIG_ATTRIBUTE: &str = "data-landing-fx";

#[cfg(debug_assertions)]
pub fn default_log_level() -> Level {
    Level::Debug // Verbose while developing locally
}

#[cfg(not(debug_assertions))]
pub fn default_log_level() -> Level {
    Level::Info
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub log_level: Level,
    pub selectors: Selectors,
    pub classes: Classes,

    /// Navbar turns "scrolled" strictly above this many pixels.
    pub scroll_threshold: f64,
    /// Sticky header height subtracted from anchor scroll targets.
    pub header_offset: f64,

    pub counter_attribute: String,
    pub counter_duration_ms: f64,
    pub counter_threshold: f64,

    pub fade_threshold: f64,
    pub fade_root_margin: String,

    pub section_threshold: f64,
    pub section_root_margin: String,

    pub active_style_property: String,
    pub active_style_value: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Selectors {
    pub navbar: String,
    pub menu_toggle: String,
    pub menu_links: String,
    pub fade: String,
    pub counters: String,
    pub sections: String,
    pub nav_entries: String,
    pub anchors: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Classes {
    pub scrolled: String,
    pub open: String,
    pub visible: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            selectors: Selectors::default(),
            classes: Classes::default(),
            scroll_threshold: 40.0,
            header_offset: 72.0,
            counter_attribute: "data-target".to_string(),
            counter_duration_ms: 1200.0,
            counter_threshold: 0.5,
            fade_threshold: 0.1,
            fade_root_margin: "0px 0px -40px 0px".to_string(),
            section_threshold: 0.35,
            section_root_margin: "-80px 0px -20% 0px".to_string(),
            active_style_property: "color".to_string(),
            active_style_value: "var(--text)".to_string(),
        }
    }
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            navbar: "#navbar".to_string(),
            menu_toggle: ".nav-toggle".to_string(),
            menu_links: ".nav-links".to_string(),
            fade: ".fade-in".to_string(),
            counters: ".stat-number[data-target]".to_string(),
            sections: "section[id]".to_string(),
            nav_entries: ".nav-links a[href^=\"#\"]".to_string(),
            anchors: "a[href^=\"#\"]".to_string(),
        }
    }
}

impl Default for Classes {
    fn default() -> Self {
        Self {
            scrolled: "scrolled".to_string(),
            open: "open".to_string(),
            visible: "visible".to_string(),
        }
    }
}

impl Config {
    /// Parses the attribute payload; absent or blank means defaults.
    pub fn from_attribute(raw: Option<&str>) -> Result<Self> {
        match raw.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(json) => Ok(serde_json::from_str(json)?),
        }
    }

    /// Reads the override from `<html>`, falling back to defaults on bad JSON.
    /// The parse error is handed back so it can be logged once logging is up.
    pub fn load(document: Option<&web_sys::Document>) -> (Self, Option<crate::error::FxError>) {
        let raw = document
            .and_then(|d| d.document_element())
            .and_then(|root| root.get_attribute(CONFIG_ATTRIBUTE));

        match Self::from_attribute(raw.as_deref()) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }
}
