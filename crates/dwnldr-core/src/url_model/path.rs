//! Filename hint from the URL path.

use percent_encoding::percent_decode_str;

/// Returns the last non-empty segment of the percent-decoded path of `url`.
///
/// The path is decoded before it is split, so an encoded `%2F` separates
/// segments too. `None` when the URL cannot be parsed or its path is empty,
/// root, or ends in a dot segment. The query string and fragment never
/// contribute to the name.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let decoded = percent_decode_str(parsed.path()).decode_utf8_lossy();
    let segment = decoded.split('/').filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}
