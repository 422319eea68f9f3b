//! Target-filename derivation from image URLs.

/// Derives the local filename for a URL: the final path segment with any
/// query string stripped.
///
/// The derivation is deterministic, so the same URL always maps to the same
/// file on disk.
#[must_use]
pub fn filename_from_url(url: &str) -> String {
    let without_query = url.split('?').next().unwrap_or(url);
    without_query
        .rsplit('/')
        .next()
        .unwrap_or(without_query)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_url() {
        assert_eq!(filename_from_url("https://i.redd.it/abc123.jpg"), "abc123.jpg");
    }

    #[test]
    fn query_string_stripped() {
        assert_eq!(
            filename_from_url("https://i.redd.it/abc123.png?width=640&crop=smart"),
            "abc123.png"
        );
    }

    #[test]
    fn nested_path_uses_final_segment() {
        assert_eq!(
            filename_from_url("https://example.com/a/b/c/wall.jpeg"),
            "wall.jpeg"
        );
    }

    #[test]
    fn no_slashes_returns_input() {
        assert_eq!(filename_from_url("plain.jpg"), "plain.jpg");
    }

    #[test]
    fn same_url_same_filename() {
        let url = "https://i.redd.it/xyz.jpg?s=1";
        assert_eq!(filename_from_url(url), filename_from_url(url));
    }
}
