//! Local filename derivation from URLs.

mod path;

pub use path::filename_from_url_path;

/// Filename used when the URL path yields nothing usable.
pub const DEFAULT_FILENAME: &str = "index";

/// Derives the default local filename for `url`: its last non-empty path
/// segment, or [`DEFAULT_FILENAME`] for an empty or root path.
///
/// - `derive_filename("http://example.com/100MB.test")` → `"100MB.test"`
/// - `derive_filename("http://example.com/")` → `"index"`
pub fn derive_filename(url: &str) -> String {
    filename_from_url_path(url).unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_from_path() {
        assert_eq!(derive_filename("https://example.com/archive.zip"), "archive.zip");
        assert_eq!(derive_filename("http://example.com/my%20file.iso"), "my file.iso");
    }

    #[test]
    fn root_falls_back_to_index() {
        assert_eq!(derive_filename("https://example.com/"), "index");
        assert_eq!(derive_filename("https://example.com"), "index");
        assert_eq!(derive_filename("https://example.com/.."), "index");
    }
}
