//! URL extraction from loosely-typed fal.ai responses.
//!
//! Different models return the generated media URL under different shapes.
//! Rather than probing properties dynamically, the known shapes are kept as
//! explicit key-path tables per media kind, tried in priority order.

use serde_json::Value;

/// One step of an accessor path into a JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    /// Object field access, e.g. `.url`.
    Key(&'static str),
    /// Array element access, e.g. `[0]`.
    Index(usize),
}

/// An accessor path describing where a URL may live inside a response,
/// e.g. `images[0].url`.
pub type KeyPath = &'static [Segment];

use Segment::{Index, Key};

/// Known locations of the image URL in text-to-image responses,
/// in priority order.
pub const IMAGE_URL_PATHS: &[KeyPath] = &[
    &[Key("image"), Key("url")],
    &[Key("images"), Index(0), Key("url")],
    &[Key("images"), Index(0), Key("image_url")],
    &[Key("url")],
    &[Key("output"), Index(0), Key("url")],
];

/// Known locations of the video URL in image-to-video responses,
/// in priority order.
pub const VIDEO_URL_PATHS: &[KeyPath] = &[
    &[Key("video"), Key("url")],
    &[Key("video_url")],
    &[Key("url")],
    &[Key("outputs"), Index(0), Key("url")],
    &[Key("outputs"), Index(0), Key("video"), Key("url")],
];

/// Find the first non-empty string at any of the given key paths.
///
/// Paths are tried in order; the first match wins. Returns `None` when no
/// path yields a non-empty string, which callers surface as an extraction
/// error after logging the raw response.
pub fn extract_url<'a>(value: &'a Value, paths: &[KeyPath]) -> Option<&'a str> {
    paths.iter().find_map(|path| lookup(value, path))
}

fn lookup<'a>(value: &'a Value, path: KeyPath) -> Option<&'a str> {
    let mut current = value;
    for segment in path {
        current = match segment {
            Segment::Key(key) => current.get(key)?,
            Segment::Index(index) => current.get(index)?,
        };
    }
    current.as_str().filter(|s| !s.is_empty())
}
