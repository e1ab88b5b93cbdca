// ABOUTME: Centralized constants for image embedding
// ABOUTME: Contains URL prefixes, the media type allow-list, attribute filters and reader limits

use phf::{phf_set, Set};

/// Prefixes that decide how a reference is treated
pub mod prefixes {
    /// Inline data URL scheme; references starting with it are never re-encoded
    pub const DATA_URL: &str = "data:";

    pub const HTTP: &str = "http://";
    pub const HTTPS: &str = "https://";

    /// Returns true when the reference looks like a remote URL
    pub fn is_remote(location: &str) -> bool {
        location.starts_with(HTTP) || location.starts_with(HTTPS)
    }
}

/// Media types that may be inlined.
/// See https://developer.mozilla.org/en-US/docs/Web/Media/Formats/Image_types
pub static ALLOWED_MEDIA_TYPES: Set<&'static str> = phf_set! {
    "image/apng",
    "image/avif",
    "image/gif",
    "image/jpeg",
    "image/png",
    "image/svg+xml",
    "image/webp",
};

/// Attributes allowed on any HTML element
pub static GLOBAL_ATTRIBUTES: Set<&'static str> = phf_set! {
    "accesskey",
    "autocapitalize",
    "autofocus",
    "class",
    "contenteditable",
    "dir",
    "draggable",
    "enterkeyhint",
    "hidden",
    "id",
    "inert",
    "inputmode",
    "is",
    "itemid",
    "itemprop",
    "itemref",
    "itemscope",
    "itemtype",
    "lang",
    "part",
    "role",
    "slot",
    "spellcheck",
    "style",
    "tabindex",
    "title",
    "translate",
};

/// Attributes allowed on `<img>` in addition to the global ones
pub static IMAGE_ATTRIBUTES: Set<&'static str> = phf_set! {
    "align",
    "border",
    "crossorigin",
    "decoding",
    "height",
    "importance",
    "intrinsicsize",
    "ismap",
    "loading",
    "referrerpolicy",
    "sizes",
    "srcset",
    "usemap",
    "width",
};

/// Limits for the remote reader
pub mod remote {
    use std::time::Duration;

    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub const DEFAULT_MAX_REDIRECTS: usize = 3;

    /// 10MB, matching typical CMS upload limits
    pub const DEFAULT_MAX_SIZE_BYTES: u64 = 10 * 1024 * 1024;

    pub const USER_AGENT: &str = concat!("img64/", env!("CARGO_PKG_VERSION"));
}
