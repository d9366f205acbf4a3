use crate::dom::PageNode;

/// Reveals every element in a visibility batch by adding `class`.
pub fn reveal<N: PageNode>(elements: &[N], class: &str) {
    for element in elements {
        element.add_class(class);
    }
}
