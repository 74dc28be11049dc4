//! AROI domain parsing (spec §4.E step 2, GLOSSARY "AROI").

use url::Url;

const PLACEHOLDER_HOSTS: &[&str] = &["example.com", "example.org", "example.net", "localhost"];

/// Finds the first URL-like token in `contact` whose host is not an obvious
/// placeholder, returning its host. Falls back to `"none"`.
pub fn parse_aroi(contact: Option<&str>) -> String {
    let Some(contact) = contact else { return "none".to_string() };

    for token in contact.split_whitespace() {
        let Some(host) = extract_host(token) else { continue };
        let host = host.to_lowercase();
        if host.is_empty() || PLACEHOLDER_HOSTS.contains(&host.as_str()) {
            continue;
        }
        if host.contains('.') {
            return host;
        }
    }
    "none".to_string()
}

/// Recognizes `https://`, `http://`, and onionoo's `url:`-prefixed contact
/// tokens, then hands the rest to `url::Url::parse` for host extraction.
/// Tokens without one of these prefixes (email addresses, free text) are
/// never handed to the parser, so an `email:user@host` token can't be
/// mistaken for URL userinfo-and-host syntax.
fn extract_host(token: &str) -> Option<String> {
    let candidate = if token.starts_with("https://") || token.starts_with("http://") {
        token.to_string()
    } else {
        let rest = token.strip_prefix("url:")?;
        if rest.starts_with("https://") || rest.starts_with("http://") {
            rest.to_string()
        } else {
            format!("https://{rest}")
        }
    };
    Url::parse(&candidate).ok()?.host_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_contact_is_none() {
        assert_eq!(parse_aroi(None), "none");
        assert_eq!(parse_aroi(Some("")), "none");
    }

    #[test]
    fn extracts_url_host() {
        assert_eq!(
            parse_aroi(Some("email:admin@relay.example url:https://torproject-relays.example.net")),
            "torproject-relays.example.net"
        );
    }

    #[test]
    fn skips_placeholder_hosts() {
        assert_eq!(parse_aroi(Some("url:https://example.com")), "none");
    }

    #[test]
    fn non_url_contact_strings_yield_none() {
        assert_eq!(parse_aroi(Some("Jane Doe <jane@doe>")), "none");
    }
}
