use crate::dom::{PageNode, Viewport};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnchorAction {
    /// Suppress the default jump and smooth-scroll to `top`.
    Scroll { top: f64 },
    /// Let the browser handle the click.
    Passthrough,
}

/// `"#pricing"` -> `Some("pricing")`. A bare `#` or any other href is not a
/// same-page fragment.
pub fn fragment_id(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

pub fn resolve<V: Viewport>(viewport: &V, href: &str, header_offset: f64) -> AnchorAction {
    let Some(target) = fragment_id(href).and_then(|id| viewport.element_by_id(id)) else {
        return AnchorAction::Passthrough;
    };

    // The browser clamps the smooth scroll to the document bounds.
    AnchorAction::Scroll {
        top: target.top() + viewport.scroll_y() - header_offset,
    }
}

/// Performs the scroll for a resolved click. Returns whether the default
/// navigation should be prevented.
pub fn navigate<V: Viewport>(viewport: &V, href: &str, header_offset: f64) -> bool {
    match resolve(viewport, href, header_offset) {
        AnchorAction::Scroll { top } => {
            viewport.smooth_scroll_to(top);
            true
        }
        AnchorAction::Passthrough => false,
    }
}
