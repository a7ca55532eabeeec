//! MIME type detection utilities.
//!
//! Provides consistent MIME handling for fetched icons and HTTP responses.

/// Common MIME type constants.
pub mod types {
    // Text
    pub const HTML: &str = "text/html; charset=utf-8";
    pub const PLAIN: &str = "text/plain; charset=utf-8";
    pub const JSON: &str = "application/json";

    // Images
    pub const PNG: &str = "image/png";
    pub const JPEG: &str = "image/jpeg";
    pub const GIF: &str = "image/gif";
    pub const WEBP: &str = "image/webp";
    pub const SVG: &str = "image/svg+xml";
    pub const ICO: &str = "image/x-icon";
    pub const BMP: &str = "image/bmp";
}

/// Get MIME type for favicon/icon URLs.
///
/// Defaults to `image/x-icon` for unknown extensions, which is appropriate
/// for favicon files.
pub fn for_icon(path: &str) -> &'static str {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let ext = path.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("png") => types::PNG,
        Some("svg") => types::SVG,
        Some("webp") => types::WEBP,
        Some("gif") => types::GIF,
        Some("jpg" | "jpeg") => types::JPEG,
        Some("bmp") => types::BMP,
        _ => types::ICO,
    }
}

/// Guess an image MIME type from magic bytes.
pub fn sniff_image(bytes: &[u8]) -> Option<&'static str> {
    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    match bytes {
        [0x00, 0x00, 0x01 | 0x02, 0x00, ..] => Some(types::ICO),
        b if b.starts_with(PNG_MAGIC) => Some(types::PNG),
        b if b.starts_with(b"GIF87a") || b.starts_with(b"GIF89a") => Some(types::GIF),
        [0xFF, 0xD8, 0xFF, ..] => Some(types::JPEG),
        b if b.len() >= 12 && &b[..4] == b"RIFF" && &b[8..12] == b"WEBP" => Some(types::WEBP),
        b if b.starts_with(b"BM") => Some(types::BMP),
        b if looks_like_svg(b) => Some(types::SVG),
        _ => None,
    }
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(512)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();
    let head = head.trim_start();
    (head.starts_with("<svg") || head.starts_with("<?xml")) && head.contains("<svg")
}

/// Strip parameters from a Content-Type value (`image/png; q=1` → `image/png`).
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Check if the MIME type represents an image.
pub fn is_image(mime: &str) -> bool {
    mime.starts_with("image/")
}

/// Check if the MIME type represents HTML.
pub fn is_html(mime: &str) -> bool {
    mime == "text/html" || mime == "application/xhtml+xml"
}

/// Decide the image MIME type of a fetched body.
///
/// Magic bytes win over the declared type; a declared `image/*` type is
/// accepted when sniffing is inconclusive. HTML bodies are never images
/// (soft-404 pages often come back with 200).
pub fn image_mime(content_type: Option<&str>, bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    if let Some(sniffed) = sniff_image(bytes) {
        return Some(sniffed.to_string());
    }
    let declared = essence(content_type?);
    (is_image(&declared) && !looks_like_html(bytes)).then_some(declared)
}

fn looks_like_html(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(256)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();
    let head = head.trim_start();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}
