//! Web-search and page URL construction

use crate::core::error::Result;
use url::form_urlencoded;
use url::Url;

/// `base?q=<query>` with the query form-encoded
pub fn search_url(base: &str, query: &str) -> Result<String> {
    let url = Url::parse_with_params(base, &[("q", query.trim())])?;
    Ok(url.into())
}

/// Concatenate an encoded query onto a prefix that already ends in `=`
pub fn append_query(prefix: &str, query: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(query.trim().as_bytes()).collect();
    format!("{}{}", prefix, encoded)
}

/// Absolute URL for a spoken page name such as `viquipedia.org`
pub fn page_url(target: &str) -> Result<String> {
    let target = target.trim();
    let url = match Url::parse(target) {
        Ok(url) if url.has_host() => url,
        _ => Url::parse(&format!("https://{}", target))?,
    };
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_encodes_query() {
        let url = search_url("https://www.google.com/search", "què ha passat el 2026").unwrap();
        assert_eq!(
            url,
            "https://www.google.com/search?q=qu%C3%A8+ha+passat+el+2026"
        );
    }

    #[test]
    fn test_search_url_rejects_bad_base() {
        assert!(search_url("not a url", "x").is_err());
    }

    #[test]
    fn test_page_url_adds_scheme() {
        assert_eq!(page_url("viquipedia.org").unwrap(), "https://viquipedia.org/");
        assert_eq!(
            page_url("http://example.com/a").unwrap(),
            "http://example.com/a"
        );
    }

    #[test]
    fn test_append_query() {
        assert_eq!(
            append_query("https://www.youtube.com/results?search_query=", " els catarres "),
            "https://www.youtube.com/results?search_query=els+catarres"
        );
    }
}
