//! Log Redaction Layer
//!
//! Scrubs Discord CDN signatures, bot tokens and auth headers from strings
//! prior to logging.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Query parameters Discord attaches to signed CDN links.
const SIGNED_QUERY_PARAMS: &[&str] = &["ex", "is", "hm"];

static BOT_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z\d_-]{23,28}\.[A-Za-z\d_-]{6,7}\.[A-Za-z\d_-]{27,}").expect("valid token pattern")
});
static AUTH_HEADER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(Bot|Bearer)\s+[A-Za-z0-9\-\._~+/]+=*").expect("valid auth pattern"));

/// Strip signing parameters from a URL so log lines don't carry working links.
///
/// Strings that don't parse as URLs are returned unchanged.
pub fn redact_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };
    if url.query().is_none() {
        return raw.to_string();
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !SIGNED_QUERY_PARAMS.contains(&k.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
    url.to_string()
}

/// Redacts sensitive patterns in a free-form string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = AUTH_HEADER_RE.replace_all(input, "[REDACTED_AUTH]");
    BOT_TOKEN_RE
        .replace_all(&redacted, "[REDACTED_TOKEN]")
        .to_string()
}
