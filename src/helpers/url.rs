/// Appends a trailing slash if `url` does not already end with one.
pub fn add_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_owned()
    } else {
        format!("{}/", url)
    }
}

/// Joins URL path segments so that exactly one `/` separates each pair,
/// whatever slashes the caller put at the edges of each piece.
pub fn join_url(base: &str, segments: &[&str]) -> String {
    let mut url = base.trim_end_matches('/').to_owned();
    for segment in segments {
        let segment = segment.trim_matches('/');
        if segment.is_empty() {
            continue;
        }
        url.push('/');
        url.push_str(segment);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_url_uses_exactly_one_separator() {
        assert_eq!(join_url("https://host/v1", &["projects", "p"]), "https://host/v1/projects/p");
        assert_eq!(join_url("https://host/v1/", &["/projects/", "p"]), "https://host/v1/projects/p");
        assert_eq!(join_url("http://localhost:8042", &["/dicom-web", "servers", "siteA"]), "http://localhost:8042/dicom-web/servers/siteA");
    }

    #[test]
    fn join_url_skips_empty_segments() {
        assert_eq!(join_url("http://h/", &["", "/", "a"]), "http://h/a");
    }

    #[test]
    fn trailing_slash_is_added_once() {
        assert_eq!(add_trailing_slash("http://h/dicomWeb"), "http://h/dicomWeb/");
        assert_eq!(add_trailing_slash("http://h/dicomWeb/"), "http://h/dicomWeb/");
        assert_eq!(add_trailing_slash(""), "/");
    }
}
