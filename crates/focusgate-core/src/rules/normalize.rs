//! Domain normalization.
//!
//! Syntactic canonicalization of a user-supplied site string down to a
//! bare hostname. This is a sanity check, not hostname validation: the
//! rule-matching engine is the final arbiter of what a pattern matches.

/// Normalize a raw site string to a bare lowercase hostname.
///
/// Trims whitespace, lowercases, strips an `http://`/`https://` scheme
/// and a leading `www.`, and truncates at the first path, query,
/// fragment, or port separator. Returns `None` when the result is empty
/// or contains no `.`.
pub fn normalize_domain(raw: &str) -> Option<String> {
    let mut s = raw.trim().to_lowercase();
    for scheme in ["https://", "http://"] {
        if let Some(rest) = s.strip_prefix(scheme) {
            s = rest.to_string();
            break;
        }
    }
    if let Some(rest) = s.strip_prefix("www.") {
        s = rest.to_string();
    }
    if let Some(cut) = s.find(['/', '?', '#', ':']) {
        s.truncate(cut);
    }
    if s.is_empty() || !s.contains('.') {
        return None;
    }
    Some(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_scheme_www_path_and_case() {
        assert_eq!(
            normalize_domain("https://www.Example.com/path?x=1"),
            Some("example.com".to_string())
        );
    }

    #[test]
    fn strips_port_and_fragment() {
        assert_eq!(
            normalize_domain("http://site.org:8080#top"),
            Some("site.org".to_string())
        );
        assert_eq!(
            normalize_domain("news.ycombinator.com/item?id=1"),
            Some("news.ycombinator.com".to_string())
        );
    }

    #[test]
    fn rejects_dotless_and_empty() {
        assert_eq!(normalize_domain("localhost"), None);
        assert_eq!(normalize_domain(""), None);
        assert_eq!(normalize_domain("   "), None);
        assert_eq!(normalize_domain("https://"), None);
    }

    #[test]
    fn keeps_subdomains_other_than_www() {
        assert_eq!(
            normalize_domain("m.facebook.com"),
            Some("m.facebook.com".to_string())
        );
    }

    proptest! {
        #[test]
        fn output_is_canonical(raw in "\\PC{0,60}") {
            if let Some(d) = normalize_domain(&raw) {
                prop_assert!(d.contains('.'));
                prop_assert_eq!(d.clone(), d.to_lowercase());
                prop_assert!(!d.chars().any(|c| "/?#:".contains(c)));
                prop_assert!(d.trim() == d);
                prop_assert!(!d.is_empty());
            }
        }
    }
}
