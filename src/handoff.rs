//! Cross-domain session handoff.
//!
//! Login happens on the platform root; the tenant dashboard lives on a
//! different origin with no shared cookie domain. The issuing side builds
//! a redirect URL with the token in the URL fragment, which the browser
//! never sends in the HTTP request line, so it does not land in server
//! access logs. The receiving side parses the fragment, stores the token
//! in the per-tenant credential store, then strips the fragment from the
//! visible URL so it cannot linger in history or bookmarks.

use url::Url;

/// Build the handoff redirect URL: `<base>/dashboard#token=<urlencoded>`.
/// The token goes in the fragment, never the query string or path.
pub fn handoff_url(base_url: &str, token: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base_url)?;
    url.set_path("/dashboard");
    url.set_query(None);

    let encoded: String = url::form_urlencoded::byte_serialize(token.as_bytes()).collect();
    url.set_fragment(Some(&format!("token={}", encoded)));
    Ok(url)
}

/// Receiving side: pull the token out of a handoff URL, if present.
pub fn extract_token(url: &Url) -> Option<String> {
    let fragment = url.fragment()?;
    parse_fragment(fragment)
}

/// Parse a raw fragment string (`token=...`, possibly among other pairs).
pub fn parse_fragment(fragment: &str) -> Option<String> {
    url::form_urlencoded::parse(fragment.as_bytes())
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
}

/// The URL to show after the token has been captured; equivalent to the
/// client-side history replacement that drops the fragment.
pub fn strip_fragment(url: &Url) -> Url {
    let mut stripped = url.clone();
    stripped.set_fragment(None);
    stripped
}
