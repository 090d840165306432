pub const FALLBACK_MIME: &str = "application/octet-stream";

/// Sniffs a MIME type from the leading bytes of an image or audio payload.
pub fn detect_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, 0x50, 0x4E, 0x47, ..] => "image/png",
        [0x47, 0x49, 0x46, 0x38, ..] => "image/gif",
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => "image/webp",
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x41, 0x56, 0x45, ..] => "audio/wav",
        [0x49, 0x44, 0x33, ..] | [0xFF, 0xFB, ..] | [0xFF, 0xF3, ..] | [0xFF, 0xF2, ..] => {
            "audio/mpeg"
        }
        [0x66, 0x4C, 0x61, 0x43, ..] => "audio/flac",
        [0x4F, 0x67, 0x67, 0x53, ..] => "audio/ogg",
        _ => {
            tracing::warn!(
                "Unrecognized payload format (first 4 bytes: {:02X?}), falling back to {}",
                &bytes[..bytes.len().min(4)],
                FALLBACK_MIME
            );
            FALLBACK_MIME
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_png() {
        assert_eq!(
            detect_mime(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A]),
            "image/png"
        );
    }

    #[test]
    fn test_detect_jpeg() {
        assert_eq!(detect_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
    }

    #[test]
    fn test_detect_webp() {
        assert_eq!(
            detect_mime(&[
                0x52, 0x49, 0x46, 0x46, 0x00, 0x00, 0x00, 0x00, 0x57, 0x45, 0x42, 0x50
            ]),
            "image/webp"
        );
    }

    #[test]
    fn test_detect_wav() {
        assert_eq!(
            detect_mime(&[
                0x52, 0x49, 0x46, 0x46, 0x24, 0x08, 0x00, 0x00, 0x57, 0x41, 0x56, 0x45
            ]),
            "audio/wav"
        );
    }

    #[test]
    fn test_detect_mp3_with_id3_tag() {
        assert_eq!(detect_mime(b"ID3\x04\x00"), "audio/mpeg");
    }

    #[test]
    fn test_unknown_falls_back_to_octet_stream() {
        assert_eq!(detect_mime(&[0x00, 0x01, 0x02, 0x03]), FALLBACK_MIME);
    }

    #[test]
    fn test_empty_falls_back_to_octet_stream() {
        assert_eq!(detect_mime(&[]), FALLBACK_MIME);
    }
}
