//! Page-number navigation for paginated lists.

/// How many page numbers to show on each side of the current page.
pub const DEFAULT_SHOW_EITHER_SIDE: usize = 2;

/// Page numbers for a navigation list.
///
/// `current` is 1-indexed. Yields `Some(page)` for each page number to show
/// and `None` for an ellipsis standing in for a gap. The first and last pages
/// are always shown, as is every page within `show_either_side` of
/// `current`. A gap of exactly one page shows that page instead of an
/// ellipsis.
pub fn nav(
    current: usize,
    total: usize,
    show_either_side: usize,
) -> impl Iterator<Item = Option<usize>> {
    (1..=total).filter_map(move |page| {
        let distance = page.abs_diff(current);
        if page == 1 || page == total || distance <= show_either_side {
            Some(Some(page))
        } else if page == 2 || page == total - 1 {
            // First page of the leading gap or last page of the trailing one.
            if distance == show_either_side + 1 {
                Some(Some(page))
            } else {
                Some(None)
            }
        } else {
            None
        }
    })
}
