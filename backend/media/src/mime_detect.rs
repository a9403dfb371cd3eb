//! Media classification.
//!
//! URL extensions are unreliable (CDNs rewrite them) and content-type headers
//! are sometimes missing or generic, so a payload counts as video when any of
//! the extension, the header or the container signature says so.

use gifsmith_core::MediaKind;
use url::Url;

/// Extensions treated as video when they end the URL path.
pub const VIDEO_EXTENSIONS: &[&str] = &[".mp4", ".mov", ".avi", ".webm", ".mkv", ".m4v"];

/// ISO base media (MP4/MOV) box type found at offset 4.
const FTYP_SIGNATURE: &[u8] = b"ftyp";

/// How many leading bytes are searched for the signature.
const SIGNATURE_WINDOW: usize = 12;

/// Classify a fetched payload.
pub fn classify(url: &str, content_type: Option<&str>, bytes: &[u8]) -> MediaKind {
    if url_has_video_extension(url)
        || content_type.is_some_and(is_video)
        || has_mp4_signature(bytes)
    {
        MediaKind::Video
    } else {
        MediaKind::Image
    }
}

/// Whether the URL path (query and fragment ignored) ends in a video extension.
pub fn url_has_video_extension(url: &str) -> bool {
    video_extension(url).is_some()
}

/// The matching video extension of a URL path, including the leading dot.
pub fn video_extension(url: &str) -> Option<&'static str> {
    let path = url_path(url).to_ascii_lowercase();
    VIDEO_EXTENSIONS
        .iter()
        .find(|ext| path.ends_with(*ext))
        .copied()
}

/// Whether the first bytes contain the `ftyp` box signature.
pub fn has_mp4_signature(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(SIGNATURE_WINDOW)];
    window
        .windows(FTYP_SIGNATURE.len())
        .any(|w| w == FTYP_SIGNATURE)
}

/// Whether a MIME type is for video.
pub fn is_video(mime: &str) -> bool {
    mime.trim().to_ascii_lowercase().starts_with("video/")
}

/// Whether a MIME type is for an image.
pub fn is_image(mime: &str) -> bool {
    mime.trim().to_ascii_lowercase().starts_with("image/")
}

fn url_path(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        // Not absolute; strip query and fragment by hand.
        Err(_) => url
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    }
}
