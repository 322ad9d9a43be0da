//! Slug normalization and page path derivation.

use crate::error::SitemapError;
use unicode_normalization::UnicodeNormalization;

/// Derive a URL slug from a title.
///
/// Decomposes to NFKD and drops combining marks, so "Café" becomes "cafe".
/// Runs of anything that is not an ASCII alphanumeric collapse to a single `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.nfkd() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if !c.is_ascii() && !c.is_alphanumeric() {
            // combining marks left over from decomposition
            continue;
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Reject slugs that cannot form a path segment.
pub fn validate_slug(slug: &str) -> Result<(), SitemapError> {
    if slug.is_empty() {
        return Err(SitemapError::Validation("Slug cannot be empty".to_string()));
    }
    if slug.contains('/') {
        return Err(SitemapError::Validation(format!(
            "Slug '{}' cannot contain '/'",
            slug
        )));
    }
    if slug.chars().any(char::is_whitespace) {
        return Err(SitemapError::Validation(format!(
            "Slug '{}' cannot contain whitespace",
            slug
        )));
    }
    Ok(())
}

/// Join slugs ordered from the top-most ancestor down to the node itself.
///
/// An empty list is the root, `"/"`.
pub fn join_slugs<'a, I>(slugs: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut path = String::from("/");
    let mut first = true;
    for slug in slugs {
        if !first {
            path.push('/');
        }
        path.push_str(slug);
        first = false;
    }
    path
}
