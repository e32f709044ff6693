//! Key-to-entry-name mapping for the directory substrate.
//!
//! Keys are arbitrary strings; entry names must be flat (no separators) and
//! must never begin with `.` (dot-prefixed names are reserved for staging
//! entries). The mapping is a reversible byte-level escaping: bytes outside
//! `[A-Za-z0-9._-]`, the escape character `%`, and a leading `.` are written
//! as `%XX`. Distinct keys always map to distinct entry names.

/// Escape a key into a directory entry name.
pub(crate) fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for (i, b) in key.bytes().enumerate() {
        let plain = matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b'.');
        if plain && !(i == 0 && b == b'.') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

/// Reverse [`escape_key`]. Returns `None` for names this mapping never
/// produces (stray `%`, bad hex, invalid UTF-8).
pub(crate) fn unescape_entry(name: &str) -> Option<String> {
    let bytes = name.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = hex_digit(*bytes.get(i + 1)?)?;
            let lo = hex_digit(*bytes.get(i + 2)?)?;
            out.push(hi * 16 + lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

// Uppercase only: the escaper emits uppercase hex, and accepting both
// cases would let two distinct entry names unescape to one key.
fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Guess a MIME content type from the key's extension.
///
/// The directory substrate persists only the payload, so the content type
/// is reconstructed the same way the original file-like values derived
/// theirs: from the name. Unknown extensions fall back to
/// `application/octet-stream`.
pub(crate) fn content_type_for(key: &str) -> &'static str {
    let name = key.rsplit('/').next().unwrap_or(key);
    let extension = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext,
        _ => return "application/octet-stream",
    };
    match extension.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "flac" => "audio/flac",
        "pdf" => "application/pdf",
        "json" => "application/json",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}
