use axum::http::HeaderValue;
use url::{ParseError, Url};

/// Validate a client-supplied URL and return its canonical serialization.
///
/// Accepts only absolute `http`/`https` URLs with a non-empty host. Errors are
/// human-readable and returned to the client as-is.
pub fn canonicalize(raw: &str) -> Result<String, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("url is required".into());
    }

    // Scheme-less input such as "example.com" parses as a relative reference,
    // so report it as a scheme problem.
    let parsed = Url::parse(raw).map_err(|e| match e {
        ParseError::RelativeUrlWithoutBase => "url scheme must be http or https".to_owned(),
        _ => "invalid url".to_owned(),
    })?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err("url scheme must be http or https".into());
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err("url host is required".into());
    }

    Ok(parsed.to_string())
}

/// Return `true` if a URL read back from the store is still usable as a
/// redirect target: non-empty, parsable, and sendable as a `Location` value.
pub fn is_valid_stored(url: &str) -> bool {
    !url.is_empty() && Url::parse(url).is_ok() && HeaderValue::from_str(url).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_whitespace() {
        assert_eq!(canonicalize("").unwrap_err(), "url is required");
        assert_eq!(canonicalize("   ").unwrap_err(), "url is required");
    }

    #[test]
    fn scheme_less_input_reports_the_scheme() {
        for raw in ["not a url", "example.com"] {
            assert_eq!(
                canonicalize(raw).unwrap_err(),
                "url scheme must be http or https",
                "{raw:?}"
            );
        }
    }

    #[test]
    fn rejects_unparsable() {
        assert_eq!(canonicalize("http://").unwrap_err(), "invalid url");
        assert_eq!(canonicalize("http://exa mple.com").unwrap_err(), "invalid url");
    }

    #[test]
    fn rejects_other_schemes() {
        assert_eq!(
            canonicalize("ftp://x.com").unwrap_err(),
            "url scheme must be http or https"
        );
        assert!(canonicalize("javascript:alert(1)").is_err());
    }

    #[test]
    fn accepts_and_canonicalizes() {
        assert_eq!(
            canonicalize("http://example.com/path").unwrap(),
            "http://example.com/path"
        );
        assert_eq!(
            canonicalize("  HTTPS://Example.COM  ").unwrap(),
            "https://example.com/"
        );
    }

    #[test]
    fn stored_url_checks() {
        assert!(is_valid_stored("http://example.com"));
        assert!(!is_valid_stored(""));
        assert!(!is_valid_stored("::not a url::"));
        // Parses, but a control character cannot go into a Location header.
        assert!(!is_valid_stored("http://example.com/\u{1}"));
    }
}
