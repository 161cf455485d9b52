//! Image reference classification and `image://` quoting.

use crate::paths::movie_path_list;

/// Marker the library uses for art that is still waiting to be discovered.
pub const PENDING_ART: &str = "artdump://pending";

const REMOTE_PREFIXES: &[&str] = &["http"];
const THUMBNAIL_PREFIXES: &[&str] = &["image://video@"];
const EMBEDDED_PREFIXES: &[&str] = &["image://video_", "image://music"];

/// What an art value points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    /// Remote provider URL.
    Remote,
    /// Thumbnail generated by the host from the video file.
    GeneratedThumbnail,
    /// Image embedded in a media file.
    Embedded,
    /// Plain file on a local or network filesystem.
    File,
}

impl ImageKind {
    pub fn classify(value: &str) -> Self {
        if starts_with_any(value, REMOTE_PREFIXES) {
            ImageKind::Remote
        } else if starts_with_any(value, THUMBNAIL_PREFIXES) {
            ImageKind::GeneratedThumbnail
        } else if starts_with_any(value, EMBEDDED_PREFIXES) {
            ImageKind::Embedded
        } else {
            ImageKind::File
        }
    }

    pub fn is_file(&self) -> bool {
        *self == ImageKind::File
    }
}

fn starts_with_any(value: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|p| value.starts_with(p))
}

/// Whether the value uses a scheme the fetch engine can download.
pub fn is_fetchable(url: &str) -> bool {
    ["http://", "https://"].iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// Unwraps an `image://<quoted>/` value. Embedded and generated images keep their wrapping.
pub fn unquote_image(value: &str) -> String {
    if value.starts_with("image://")
        && !value.starts_with("image://video")
        && !value.starts_with("image://music")
    {
        let inner = &value["image://".len()..];
        let inner = inner.strip_suffix('/').unwrap_or(inner);
        return urlencoding::decode(inner)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| inner.to_string());
    }
    value.to_string()
}

/// Wraps a path as `image://<quoted>/`, the form the host uses for cache lookups.
pub fn quote_image(value: &str) -> String {
    if value.starts_with("image://") {
        return value.to_string();
    }
    format!("image://{}/", quote_path(value))
}

/// Percent-encodes a path the way the host does: lowercase escapes, with `(`, `)` and `!`
/// left as is.
pub fn quote_path(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' => out.push(byte as char),
            b'_' | b'.' | b'-' | b'~' | b'(' | b')' | b'!' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02x}", byte)),
        }
    }
    out
}

/// Builds the generated-thumbnail reference for a video file.
///
/// Returns `None` for disc images, which the host cannot extract a frame from.
pub fn video_thumbnail_path(video_file: &str) -> Option<String> {
    if video_file.starts_with("image://") {
        return Some(video_file.to_string());
    }
    let path = movie_path_list(video_file).into_iter().next()?;
    if path.ends_with(".iso") {
        return None;
    }
    Some(format!("image://video@{}/", quote_path(&path)))
}
