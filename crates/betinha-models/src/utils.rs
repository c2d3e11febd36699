//! Utility functions for input classification and output naming.
//!
//! These helpers are pure and shared by the worker and any presentation
//! shell, so both agree on how paths and URLs are interpreted.

use crate::OutputFormat;

/// URL prefixes that are routed through the downloader.
pub const SUPPORTED_URL_PREFIXES: [&str; 4] = [
    "https://www.youtube.com/",
    "https://youtu.be/",
    "http://www.youtube.com/",
    "http://youtu.be/",
];

/// Check if the input is a remote URL the downloader handles.
pub fn is_supported_url(input: &str) -> bool {
    SUPPORTED_URL_PREFIXES
        .iter()
        .any(|prefix| input.starts_with(prefix))
}

/// Append the format's canonical extension unless the path already ends with it.
///
/// Idempotent: applying it to its own result returns the same string.
pub fn append_extension_if_missing(path: &str, format: OutputFormat) -> String {
    let ext = format.extension();
    if path.ends_with(ext) {
        path.to_string()
    } else {
        format!("{}{}", path, ext)
    }
}

/// Render a remaining-time estimate as `HH:MM:SS`.
///
/// Negative and non-finite values render as zero.
pub fn format_eta(secs: f64) -> String {
    let secs = if secs.is_finite() { secs.max(0.0) } else { 0.0 };
    let total = (secs + 0.5) as u64;
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}
