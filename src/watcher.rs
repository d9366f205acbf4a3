//! Visibility watching on top of `IntersectionObserver`.
//!
//! `WatchState` holds the bookkeeping (one-shot memory and batch ordering) and
//! knows nothing about the browser. `VisibilityWatcher` feeds it real
//! observer entries.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use js_sys::Array;
use log::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use crate::error::{FxError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarginLength {
    Px(f64),
    Percent(f64),
}

impl FromStr for MarginLength {
    type Err = FxError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || FxError::InvalidMargin(s.to_string());
        if let Some(n) = s.strip_suffix("px") {
            n.parse().map(MarginLength::Px).map_err(|_| invalid())
        } else if let Some(n) = s.strip_suffix('%') {
            n.parse().map(MarginLength::Percent).map_err(|_| invalid())
        } else if s == "0" {
            Ok(MarginLength::Px(0.0))
        } else {
            Err(invalid())
        }
    }
}

impl fmt::Display for MarginLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarginLength::Px(n) => write!(f, "{}px", n),
            MarginLength::Percent(n) => write!(f, "{}%", n),
        }
    }
}

/// Grows (positive) or shrinks (negative) the viewport box used for the
/// visibility test, in CSS margin order: top, right, bottom, left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootMargin {
    pub top: MarginLength,
    pub right: MarginLength,
    pub bottom: MarginLength,
    pub left: MarginLength,
}

impl Default for RootMargin {
    fn default() -> Self {
        let zero = MarginLength::Px(0.0);
        Self { top: zero, right: zero, bottom: zero, left: zero }
    }
}

impl FromStr for RootMargin {
    type Err = FxError;

    /// Accepts the 1 to 4 value CSS margin shorthand.
    fn from_str(s: &str) -> Result<Self> {
        let parts = s
            .split_whitespace()
            .map(MarginLength::from_str)
            .collect::<Result<Vec<_>>>()?;

        let (top, right, bottom, left) = match parts.as_slice() {
            [all] => (*all, *all, *all, *all),
            [vertical, horizontal] => (*vertical, *horizontal, *vertical, *horizontal),
            [top, horizontal, bottom] => (*top, *horizontal, *bottom, *horizontal),
            [top, right, bottom, left] => (*top, *right, *bottom, *left),
            _ => return Err(FxError::InvalidMargin(s.to_string())),
        };
        Ok(Self { top, right, bottom, left })
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatchOptions {
    /// Visible ratio (0 to 1) the element must reach.
    pub threshold: f64,
    pub root_margin: RootMargin,
    /// Fire once per element, then stop watching it.
    pub one_shot: bool,
}

impl WatchOptions {
    pub fn new(threshold: f64, root_margin: &str, one_shot: bool) -> Result<Self> {
        Ok(Self {
            threshold: threshold.clamp(0.0, 1.0),
            root_margin: root_margin.parse()?,
            one_shot,
        })
    }
}

#[derive(Debug, Clone)]
pub struct VisibilityEntry<N> {
    pub target: N,
    pub is_intersecting: bool,
    /// Visible fraction of the target inside the adjusted viewport.
    pub ratio: f64,
    /// Viewport-relative top edge, used to order a batch.
    pub top: f64,
}

/// Browsers report ratios a hair under the threshold they just crossed.
const RATIO_EPSILON: f64 = 1e-6;

/// Mirrors the observer's target list. One-shot targets leave it as soon as
/// they fire, so nothing is remembered past that point.
pub struct WatchState<N> {
    threshold: f64,
    one_shot: bool,
    watched: Vec<N>,
}

impl<N: Clone + PartialEq> WatchState<N> {
    pub fn new(threshold: f64, one_shot: bool) -> Self {
        Self { threshold, one_shot, watched: Vec::new() }
    }

    pub fn watch(&mut self, target: N) {
        if !self.is_watching(&target) {
            self.watched.push(target);
        }
    }

    pub fn is_watching(&self, target: &N) -> bool {
        self.watched.contains(target)
    }

    pub fn watched_count(&self) -> usize {
        self.watched.len()
    }

    fn is_entering(&self, entry: &VisibilityEntry<N>) -> bool {
        entry.is_intersecting && entry.ratio + RATIO_EPSILON >= self.threshold
    }

    /// Returns the watched targets that just entered at or above the
    /// threshold, topmost first. Entries for targets on their way out (still
    /// intersecting, ratio under threshold) are dropped.
    pub fn deliver<I>(&mut self, entries: I) -> Vec<N>
    where
        I: IntoIterator<Item = VisibilityEntry<N>>,
    {
        let mut visible: Vec<VisibilityEntry<N>> = Vec::new();
        for entry in entries {
            if !self.is_entering(&entry) || !self.is_watching(&entry.target) {
                continue;
            }
            if self.one_shot {
                self.watched.retain(|t| *t != entry.target);
            } else if visible.iter().any(|v| v.target == entry.target) {
                continue;
            }
            visible.push(entry);
        }

        visible.sort_by(|a, b| a.top.total_cmp(&b.top));
        visible.into_iter().map(|entry| entry.target).collect()
    }
}

type ObserverCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

/// A browser `IntersectionObserver` that hands each batch of newly visible
/// elements to `handler`, topmost first.
pub struct VisibilityWatcher {
    observer: IntersectionObserver,
    state: Rc<RefCell<WatchState<Element>>>,
    _callback: ObserverCallback,
}

impl VisibilityWatcher {
    pub fn new<F>(options: &WatchOptions, mut handler: F) -> Result<Self>
    where
        F: FnMut(&[Element]) + 'static,
    {
        let one_shot = options.one_shot;
        let state = Rc::new(RefCell::new(WatchState::<Element>::new(options.threshold, one_shot)));

        let callback: ObserverCallback = {
            let state = state.clone();
            Closure::new(move |entries: Array, observer: IntersectionObserver| {
                let batch = entries.iter().filter_map(|value| {
                    let entry = value.dyn_into::<IntersectionObserverEntry>().ok()?;
                    Some(VisibilityEntry {
                        target: entry.target(),
                        is_intersecting: entry.is_intersecting(),
                        ratio: entry.intersection_ratio(),
                        top: entry.bounding_client_rect().top(),
                    })
                });

                let visible = state.borrow_mut().deliver(batch);
                if visible.is_empty() {
                    return;
                }
                if one_shot {
                    for element in &visible {
                        observer.unobserve(element);
                    }
                }
                handler(visible.as_slice());
            })
        };

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin.to_string());

        let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;

        Ok(Self { observer, state, _callback: callback })
    }

    pub fn observe(&self, element: &Element) {
        self.state.borrow_mut().watch(element.clone());
        self.observer.observe(element);
    }

    pub fn observe_all<'a>(&self, elements: impl IntoIterator<Item = &'a Element>) -> usize {
        let mut count = 0;
        for element in elements {
            self.observe(element);
            count += 1;
        }
        count
    }

    /// Elements still waiting to fire (one-shot) or being tracked (persistent).
    pub fn watched_count(&self) -> usize {
        self.state.borrow().watched_count()
    }
}

impl Drop for VisibilityWatcher {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Builds a watcher, logging instead of failing when options or the
/// observer itself can't be created.
pub fn try_watcher<F>(name: &str, threshold: f64, root_margin: &str, one_shot: bool, handler: F) -> Option<VisibilityWatcher>
where
    F: FnMut(&[Element]) + 'static,
{
    let built = WatchOptions::new(threshold, root_margin, one_shot)
        .and_then(|options| VisibilityWatcher::new(&options, handler));
    match built {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            warn!("{} watcher disabled: {}", name, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(target: u32, is_intersecting: bool, ratio: f64, top: f64) -> VisibilityEntry<u32> {
        VisibilityEntry { target, is_intersecting, ratio, top }
    }

    fn watching(threshold: f64, one_shot: bool, targets: &[u32]) -> WatchState<u32> {
        let mut state = WatchState::new(threshold, one_shot);
        for target in targets {
            state.watch(*target);
        }
        state
    }

    #[test]
    fn parses_margin_shorthand() {
        let margin: RootMargin = "-80px 0px -20% 0px".parse().unwrap();
        assert_eq!(margin.top, MarginLength::Px(-80.0));
        assert_eq!(margin.bottom, MarginLength::Percent(-20.0));
        assert_eq!(margin.to_string(), "-80px 0px -20% 0px");

        let uniform: RootMargin = "10px".parse().unwrap();
        assert_eq!(uniform.to_string(), "10px 10px 10px 10px");

        let pair: RootMargin = "0 5%".parse().unwrap();
        assert_eq!(pair.to_string(), "0px 5% 0px 5%");

        let three: RootMargin = "1px 2px 3px".parse().unwrap();
        assert_eq!(three.to_string(), "1px 2px 3px 2px");
    }

    #[test]
    fn rejects_bad_margins() {
        assert!("".parse::<RootMargin>().is_err());
        assert!("10em".parse::<RootMargin>().is_err());
        assert!("1px 2px 3px 4px 5px".parse::<RootMargin>().is_err());
        assert!(WatchOptions::new(0.1, "wide", true).is_err());
    }

    #[test]
    fn threshold_is_clamped() {
        assert_eq!(WatchOptions::new(1.5, "0px", false).unwrap().threshold, 1.0);
        assert_eq!(WatchOptions::new(-1.0, "0px", false).unwrap().threshold, 0.0);
    }

    #[test]
    fn one_shot_fires_once_per_target() {
        let mut state = watching(0.1, true, &[1, 2]);

        assert_eq!(state.deliver(vec![entry(1, true, 0.5, 0.0)]), vec![1]);
        assert!(!state.is_watching(&1));
        assert_eq!(state.watched_count(), 1);

        // Leaving and re-entering the viewport does not fire again.
        assert!(state.deliver(vec![entry(1, false, 0.0, 0.0)]).is_empty());
        assert_eq!(state.deliver(vec![entry(1, true, 1.0, 0.0), entry(2, true, 1.0, 50.0)]), vec![2]);
        assert!(state.deliver(vec![entry(2, true, 1.0, 50.0)]).is_empty());
        assert_eq!(state.watched_count(), 0);
    }

    #[test]
    fn one_shot_ignores_duplicate_records_in_a_batch() {
        let mut state = watching(0.1, true, &[4]);
        let visible = state.deliver(vec![entry(4, true, 0.2, 10.0), entry(4, true, 0.9, 10.0)]);
        assert_eq!(visible, vec![4]);
    }

    #[test]
    fn persistent_watch_fires_on_every_entry() {
        let mut state = watching(0.35, false, &[7]);
        for _ in 0..3 {
            assert_eq!(state.deliver(vec![entry(7, true, 0.4, 10.0)]), vec![7]);
        }
        assert!(state.is_watching(&7));
    }

    #[test]
    fn unwatched_targets_are_ignored() {
        let mut state = watching(0.0, false, &[1]);
        assert!(state.deliver(vec![entry(5, true, 1.0, 0.0)]).is_empty());
    }

    #[test]
    fn below_threshold_entries_do_not_fire() {
        let mut state = watching(0.5, true, &[1, 2]);

        // First observer callback with only a sliver on screen.
        assert!(state.deliver(vec![entry(1, true, 0.05, 700.0)]).is_empty());
        assert!(state.is_watching(&1));

        // A ratio reported just under the crossed threshold still counts.
        assert_eq!(state.deliver(vec![entry(1, true, 0.4999999, 500.0)]), vec![1]);
        assert!(state.deliver(vec![entry(2, true, 0.3, 100.0)]).is_empty());
    }

    #[test]
    fn leaving_section_loses_to_entering_one() {
        let mut state = watching(0.35, false, &[1, 2]);

        // Section 1 scrolls up and out (still intersecting, under threshold)
        // while section 2 comes in below it.
        let visible = state.deliver(vec![entry(1, true, 0.2, -400.0), entry(2, true, 0.4, 300.0)]);
        assert_eq!(visible, vec![2]);
    }

    #[test]
    fn batches_are_ordered_topmost_first() {
        let mut state = watching(0.1, false, &[1, 2, 3, 9]);
        let visible = state.deliver(vec![
            entry(3, true, 0.5, 400.0),
            entry(1, true, 0.5, -20.0),
            entry(9, false, 0.0, -500.0),
            entry(2, true, 0.5, 120.0),
        ]);
        assert_eq!(visible, vec![1, 2, 3]);
    }
}
