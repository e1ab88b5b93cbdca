// ABOUTME: Content sniffing that maps raw image bytes to a MIME type label
// ABOUTME: Enforces the allow-list of web image types that may be inlined

use crate::constants::ALLOWED_MEDIA_TYPES;
use crate::error::EmbedError;

const PNG_SIGNATURE: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// How far into a text file to look for an `<svg` root
const SVG_SNIFF_LEN: usize = 1024;

/// Detects the media type of `bytes` from their content.
///
/// Always returns a label; bytes that are not a recognised image are
/// labelled `text/plain` or `application/octet-stream`.
pub fn detect(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(PNG_SIGNATURE) {
        return if is_animated_png(bytes) {
            "image/apng"
        } else {
            "image/png"
        };
    }

    if is_avif(bytes) {
        return "image/avif";
    }

    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type();
    }

    if is_svg(bytes) {
        return "image/svg+xml";
    }

    if std::str::from_utf8(bytes).is_ok() {
        "text/plain"
    } else {
        "application/octet-stream"
    }
}

/// Detects the media type and checks it against the allow-list
pub fn classify(bytes: &[u8]) -> Result<&'static str, EmbedError> {
    let media_type = detect(bytes);
    if ALLOWED_MEDIA_TYPES.contains(media_type) {
        Ok(media_type)
    } else {
        Err(EmbedError::UnsupportedMediaType(media_type.to_string()))
    }
}

/// An animated PNG carries an `acTL` chunk before the first `IDAT`
fn is_animated_png(bytes: &[u8]) -> bool {
    let mut offset = PNG_SIGNATURE.len();

    while offset + 8 <= bytes.len() {
        let length = u32::from_be_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ]) as usize;

        match &bytes[offset + 4..offset + 8] {
            b"acTL" => return true,
            b"IDAT" => return false,
            _ => {}
        }

        // length + type + data + crc
        offset = match offset.checked_add(12).and_then(|o| o.checked_add(length)) {
            Some(next) => next,
            None => return false,
        };
    }

    false
}

/// ISO-BMFF `ftyp` box whose major or compatible brands name AVIF
fn is_avif(bytes: &[u8]) -> bool {
    if bytes.len() < 12 || &bytes[4..8] != b"ftyp" {
        return false;
    }

    let box_len = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    let end = box_len.clamp(12, bytes.len());

    // major brand, minor version, then compatible brands
    let major = &bytes[8..12];
    if major == b"avif" || major == b"avis" {
        return true;
    }

    bytes
        .get(16..end)
        .map(|brands| {
            brands
                .chunks_exact(4)
                .any(|brand| brand == b"avif" || brand == b"avis")
        })
        .unwrap_or(false)
}

fn is_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(SVG_SNIFF_LEN)];

    // A multi-byte character may be cut at the sniff boundary
    let text = match std::str::from_utf8(head) {
        Ok(text) => text,
        Err(e) if e.error_len().is_none() => match std::str::from_utf8(&head[..e.valid_up_to()]) {
            Ok(text) => text,
            Err(_) => return false,
        },
        Err(_) => return false,
    };

    let lowered = text.trim_start_matches('\u{feff}').to_ascii_lowercase();
    let mut rest = lowered.as_str();

    // Skip the XML prolog, comments and an SVG doctype; the root element must be <svg>
    loop {
        rest = rest.trim_start();
        if let Some(after) = rest.strip_prefix("<?") {
            match after.find("?>") {
                Some(end) => rest = &after[end + 2..],
                None => return false,
            }
        } else if let Some(after) = rest.strip_prefix("<!--") {
            match after.find("-->") {
                Some(end) => rest = &after[end + 3..],
                None => return false,
            }
        } else if let Some(after) = rest.strip_prefix("<!doctype") {
            if !after.trim_start().starts_with("svg") {
                return false;
            }
            match after.find('>') {
                Some(end) => rest = &after[end + 1..],
                None => return false,
            }
        } else {
            break;
        }
    }

    rest.strip_prefix("<svg").is_some_and(|after| {
        after.is_empty() || after.starts_with(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_with_chunks(chunks: &[&[u8; 4]]) -> Vec<u8> {
        let mut data = PNG_SIGNATURE.to_vec();
        for chunk_type in chunks {
            data.extend_from_slice(&[0, 0, 0, 1]);
            data.extend_from_slice(*chunk_type);
            data.push(0);
            data.extend_from_slice(&[0, 0, 0, 0]);
        }
        data
    }

    #[test]
    fn test_detect_png_and_apng() {
        assert_eq!(detect(&png_with_chunks(&[b"IHDR", b"IDAT"])), "image/png");
        assert_eq!(
            detect(&png_with_chunks(&[b"IHDR", b"acTL", b"IDAT"])),
            "image/apng"
        );
        // acTL after IDAT does not make an animation
        assert_eq!(
            detect(&png_with_chunks(&[b"IHDR", b"IDAT", b"acTL"])),
            "image/png"
        );
    }

    #[test]
    fn test_detect_raster_signatures() {
        assert_eq!(
            detect(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46]),
            "image/jpeg"
        );
        assert_eq!(detect(b"GIF89a\x01\x00\x01\x00"), "image/gif");
        assert_eq!(detect(b"GIF87a\x01\x00\x01\x00"), "image/gif");
        assert_eq!(detect(b"RIFF\x24\x00\x00\x00WEBPVP8 "), "image/webp");
    }

    #[test]
    fn test_detect_avif() {
        let mut data = vec![0, 0, 0, 0x20];
        data.extend_from_slice(b"ftypavif");
        data.extend_from_slice(&[0, 0, 0, 0]);
        data.extend_from_slice(b"avifmif1miafMA1B");
        assert_eq!(detect(&data), "image/avif");

        let mut compatible = vec![0, 0, 0, 0x18];
        compatible.extend_from_slice(b"ftypmif1");
        compatible.extend_from_slice(&[0, 0, 0, 0]);
        compatible.extend_from_slice(b"mif1avif");
        assert_eq!(detect(&compatible), "image/avif");
    }

    #[test]
    fn test_detect_svg() {
        assert_eq!(
            detect(br#"<svg xmlns="http://www.w3.org/2000/svg"></svg>"#),
            "image/svg+xml"
        );
        assert_eq!(
            detect(b"<?xml version=\"1.0\"?>\n<!-- logo -->\n<SVG></SVG>"),
            "image/svg+xml"
        );
        assert_eq!(detect(b"plain text mentioning <svg"), "text/plain");
        assert_eq!(
            detect(
                b"<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"svg11.dtd\">\n<svg width=\"1\"/>"
            ),
            "image/svg+xml"
        );
    }

    #[test]
    fn test_detect_rejects_documents_with_inline_svg() {
        let html = b"<!DOCTYPE html><html><body><p>hi</p><svg></svg></body></html>";
        assert_eq!(detect(html), "text/plain");
        assert!(matches!(
            classify(html),
            Err(EmbedError::UnsupportedMediaType(_))
        ));

        assert_eq!(detect(b"<html><svg></svg></html>"), "text/plain");
        assert_eq!(detect(b"<!-- <svg> --><div><svg/></div>"), "text/plain");
        assert_eq!(detect(b"<svgfont></svgfont>"), "text/plain");
        assert_eq!(detect(b"<?xml version=\"1.0\""), "text/plain");
    }

    #[test]
    fn test_detect_non_images() {
        assert_eq!(detect(b"Gopher"), "text/plain");
        assert_eq!(detect(&[0x00, 0x9F, 0x92, 0x96]), "application/octet-stream");
        assert_eq!(detect(b""), "text/plain");
    }

    #[test]
    fn test_classify_rejects_disallowed_types() {
        let err = classify(b"Gopher").unwrap_err();
        assert_eq!(err.to_string(), "can not embed the filetype text/plain");

        // BMP is an image, but not one the allow-list accepts
        let bmp = b"BM\x3a\x00\x00\x00\x00\x00\x00\x00\x36\x00\x00\x00\x28\x00";
        assert!(matches!(
            classify(bmp),
            Err(EmbedError::UnsupportedMediaType(ref t)) if t == "image/bmp"
        ));
    }

    #[test]
    fn test_classify_accepts_allowed_types() {
        assert_eq!(
            classify(&png_with_chunks(&[b"IHDR"])).unwrap(),
            "image/png"
        );
        assert_eq!(classify(b"GIF89a\x01\x00\x01\x00").unwrap(), "image/gif");
    }
}
