//! Slug derivation for post titles.

/// Slug used when a title contains no word characters at all.
pub const DEFAULT_SLUG: &str = "post";

/// Derive a URL-safe slug from a title.
///
/// Lower-cases the title and collapses every run of characters other than
/// ASCII letters and digits into a single `-`, with no leading or trailing
/// separator. Falls back to [`DEFAULT_SLUG`] when nothing is left.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;

    for c in title.trim().chars() {
        if c.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    if slug.is_empty() {
        DEFAULT_SLUG.to_string()
    } else {
        slug
    }
}

/// Slug candidate for the given collision index: `base`, `base-1`, `base-2`, ...
pub fn with_suffix(base: &str, index: u32) -> String {
    if index == 0 {
        base.to_string()
    } else {
        format!("{base}-{index}")
    }
}
