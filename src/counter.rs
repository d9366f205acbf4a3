use log::debug;

use crate::dom::{FrameClock, PageNode};

/// Cubic ease-out: fast start, slow finish. Input is clamped to [0, 1].
pub fn ease_out_cubic(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    1.0 - (1.0 - p).powi(3)
}

/// Reads a counter target the way `parseInt(raw, 10)` would, rejecting
/// negatives and anything without leading digits.
pub fn parse_target(raw: &str) -> Option<u64> {
    let trimmed = raw.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());

    let digits = &unsigned[..digits_end];
    if digits.is_empty() {
        return None;
    }
    // Overlong values saturate rather than disappear.
    Some(digits.parse().unwrap_or(u64::MAX))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterAnimation {
    pub start: f64,
    pub target: u64,
    pub duration: f64,
}

impl CounterAnimation {
    pub fn new(start: f64, target: u64, duration: f64) -> Self {
        Self { start, target, duration }
    }

    pub fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start) / self.duration).clamp(0.0, 1.0)
    }

    pub fn value_at(&self, now: f64) -> u64 {
        let eased = ease_out_cubic(self.progress(now));
        let value = (eased * self.target as f64).round() as u64;
        value.min(self.target)
    }

    pub fn is_complete(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }
}

#[derive(Debug, Clone)]
pub struct CounterSettings {
    pub attribute: String,
    pub duration_ms: f64,
}

/// Counts the node's text up from 0 to its target attribute, one write per
/// animation frame. Nodes without a usable target are left untouched.
pub fn animate_counter<N: PageNode, C: FrameClock>(node: N, clock: &C, settings: &CounterSettings) {
    let Some(target) = node.attribute(&settings.attribute).as_deref().and_then(parse_target) else {
        debug!("counter skipped: no numeric {} attribute", settings.attribute);
        return;
    };

    let animation = CounterAnimation::new(clock.now(), target, settings.duration_ms);
    schedule_step(node, clock.clone(), animation);
}

fn schedule_step<N: PageNode, C: FrameClock>(node: N, clock: C, animation: CounterAnimation) {
    let next = clock.clone();
    clock.request_frame(Box::new(move |ts| {
        node.set_text(&animation.value_at(ts).to_string());
        if !animation.is_complete(ts) {
            schedule_step(node, next, animation);
        }
    }));
}
