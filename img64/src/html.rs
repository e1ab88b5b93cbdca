// ABOUTME: HTML output helpers shared with the markdown host: escaping, URL safety and attributes
// ABOUTME: Keeps everything the renderer writes into an attribute value well-formed

use crate::constants::{GLOBAL_ATTRIBUTES, IMAGE_ATTRIBUTES};
use pulldown_cmark_escape::{escape_href, escape_html};

const DANGEROUS_SCHEMES: [&str; 4] = ["javascript:", "vbscript:", "file:", "data:"];

const DATA_IMAGE: &str = "data:image/";

/// Inline image subtypes that browsers will not execute
const SAFE_DATA_IMAGE_TYPES: [&str; 5] = ["png;", "gif;", "jpeg;", "webp;", "svg+xml;"];

/// Returns true for URLs that should not be emitted unless unsafe output is enabled
pub fn is_dangerous_url(url: &str) -> bool {
    if has_prefix_ignore_case(url, DATA_IMAGE) {
        let subtype = &url[DATA_IMAGE.len()..];
        return !SAFE_DATA_IMAGE_TYPES
            .iter()
            .any(|safe| has_prefix_ignore_case(subtype, safe));
    }

    DANGEROUS_SCHEMES
        .iter()
        .any(|scheme| has_prefix_ignore_case(url, scheme))
}

fn has_prefix_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len() && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

// Writing into a String cannot fail, so the results below are discarded.

/// Percent-escapes a URL and HTML-escapes the result for use in an attribute
pub fn push_escaped_url(out: &mut String, url: &str) {
    let _ = escape_href(&mut *out, url);
}

pub fn push_escaped_html(out: &mut String, text: &str) {
    let _ = escape_html(&mut *out, text);
}

/// Whether an attribute may appear on an `<img>` element
pub fn is_image_attribute(name: &str) -> bool {
    GLOBAL_ATTRIBUTES.contains(name) || IMAGE_ATTRIBUTES.contains(name) || name.starts_with("data-")
}

/// Writes ` name="value"` for each permitted attribute, in order
pub fn render_attributes(out: &mut String, attributes: &[(String, String)]) {
    for (name, value) in attributes {
        if !is_image_attribute(name) {
            log::debug!("Dropping attribute not allowed on images: {}", name);
            continue;
        }
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        push_escaped_html(out, value);
        out.push('"');
    }
}
