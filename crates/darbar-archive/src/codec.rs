//! Filename to URL-segment encoding.
//!
//! The origin's static file server only resolves names escaped the way its
//! own listings escape them: every UTF-8 byte outside `A-Z a-z 0-9 - _ . ~` is
//! written as `%XX` with uppercase hex. Generic component encoders leave
//! `! ' ( ) *` bare, and bare parentheses (common in timestamped names such as
//! `(02;00)`) break resolution, so those are escaped as well.

use std::borrow::Cow;

/// Percent-encode one path segment.
pub fn encode_segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

/// Reverse of [`encode_segment`]. Input that does not decode to valid UTF-8
/// is returned unchanged.
pub fn decode_segment(encoded: &str) -> String {
    match urlencoding::decode(encoded) {
        Ok(Cow::Borrowed(s)) => s.to_string(),
        Ok(Cow::Owned(s)) => s,
        Err(_) => encoded.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parentheses_are_escaped() {
        let encoded = encode_segment("Track (02;00).mp3");
        assert_eq!(encoded, "Track%20%2802%3B00%29.mp3");
        assert!(!encoded.contains('('));
        assert!(!encoded.contains(')'));
    }

    #[test]
    fn test_reserved_marks_are_escaped() {
        assert_eq!(encode_segment("!'()*"), "%21%27%28%29%2A");
    }

    #[test]
    fn test_unreserved_pass_through() {
        assert_eq!(encode_segment("Asa-Di_Vaar.v2~x"), "Asa-Di_Vaar.v2~x");
    }

    #[test]
    fn test_empty_segment() {
        assert_eq!(encode_segment(""), "");
        assert_eq!(decode_segment(""), "");
    }

    #[test]
    fn test_non_ascii_uses_utf8_bytes() {
        assert_eq!(encode_segment("ਕੀਰਤਨ"), "%E0%A8%95%E0%A9%80%E0%A8%B0%E0%A8%A4%E0%A8%A8");
    }

    #[test]
    fn test_slash_is_escaped_inside_segment() {
        assert_eq!(encode_segment("Bhai X/Y"), "Bhai%20X%2FY");
    }

    #[test]
    fn test_decode_segment() {
        assert_eq!(decode_segment("Tin%20Pehar"), "Tin Pehar");
        assert_eq!(decode_segment("plain"), "plain");
        // %FF alone is not UTF-8
        assert_eq!(decode_segment("bad%FF"), "bad%FF");
    }
}
