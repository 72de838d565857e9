//! Content-Type detection from file extensions.
//!
//! Unlisted extensions fall back to `text/plain`.

/// Map a file extension to its Content-Type.
///
/// # Examples
/// ```
/// use riffle::mime::content_type_for;
/// assert_eq!(content_type_for(Some("css")), "text/css");
/// assert_eq!(content_type_for(Some("xyz")), "text/plain");
/// assert_eq!(content_type_for(None), "text/plain");
/// ```
pub fn content_type_for(extension: Option<&str>) -> &'static str {
    match extension {
        Some("css") => "text/css",
        Some("js" | "mjs") => "text/javascript",
        Some("json") => "application/json",
        Some("html" | "htm") => "text/html; charset=utf-8",

        // Images
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",

        // Fonts
        Some("woff2") => "font/woff2",

        _ => "text/plain",
    }
}
