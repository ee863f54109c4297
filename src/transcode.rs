//! Legacy 8-bit (Macintosh Western / "MacRoman") text to UTF-8, and the
//! XML escaping rules applied on top of it.

/// `sMacRomanToUTF8Table[byte - 0x80]` gives the UTF-8 bytes for a high byte.
/// Transcribed verbatim from the legacy importer's lookup table.
#[rustfmt::skip]
const HIGH_BYTE_TABLE: [&[u8]; 128] = [
    &[0xc3, 0x84], &[0xc3, 0x85], &[0xc3, 0x87], &[0xc3, 0x89],
    &[0xc3, 0x91], &[0xc3, 0x96], &[0xc3, 0x9c], &[0xc3, 0xa1],
    &[0xc3, 0xa0], &[0xc3, 0xa2], &[0xc3, 0xa4], &[0xc3, 0xa3],
    &[0xc3, 0xa5], &[0xc3, 0xa7], &[0xc3, 0xa9], &[0xc3, 0xa8],
    &[0xc3, 0xaa], &[0xc3, 0xab], &[0xc3, 0xad], &[0xc3, 0xac],
    &[0xc3, 0xae], &[0xc3, 0xaf], &[0xc3, 0xb1], &[0xc3, 0xb3],
    &[0xc3, 0xb2], &[0xc3, 0xb4], &[0xc3, 0xb6], &[0xc3, 0xb5],
    &[0xc3, 0xba], &[0xc3, 0xb9], &[0xc3, 0xbb], &[0xc3, 0xbc],
    &[0xe2, 0x80, 0xa0], &[0xc2, 0xb0], &[0xc2, 0xa2], &[0xc2, 0xa3],
    &[0xc2, 0xa7], &[0xe2, 0x80, 0xa2], &[0xc2, 0xb6], &[0xc3, 0x9f],
    &[0xc2, 0xae], &[0xc2, 0xa9], &[0xe2, 0x84, 0xa2], &[0xc2, 0xb4],
    &[0xc2, 0xa8], &[0xe2, 0x89, 0xa0], &[0xc3, 0x86], &[0xc3, 0x98],
    &[0xe2, 0x88, 0x9e], &[0xc2, 0xb1], &[0xe2, 0x89, 0xa4], &[0xe2, 0x89, 0xa5],
    &[0xc2, 0xa5], &[0xc2, 0xb5], &[0xe2, 0x88, 0x82], &[0xe2, 0x88, 0x91],
    &[0xe2, 0x88, 0x8f], &[0xcf, 0x80], &[0xe2, 0x88, 0xab], &[0xc2, 0xaa],
    &[0xc2, 0xba], &[0xce, 0xa9], &[0xc3, 0xa6], &[0xc3, 0xb8],
    &[0xc2, 0xbf], &[0xc2, 0xa1], &[0xc2, 0xac], &[0xe2, 0x88, 0x9a],
    &[0xc6, 0x92], &[0xe2, 0x89, 0x88], &[0xe2, 0x88, 0x86], &[0xc2, 0xab],
    &[0xc2, 0xbb], &[0xe2, 0x80, 0xa6], &[0xc2, 0xa0], &[0xc3, 0x80],
    &[0xc3, 0x83], &[0xc3, 0x95], &[0xc5, 0x92], &[0xc5, 0x93],
    &[0xe2, 0x80, 0x93], &[0xe2, 0x80, 0x94], &[0xe2, 0x80, 0x9c], &[0xe2, 0x80, 0x9d],
    &[0xe2, 0x80, 0x98], &[0xe2, 0x80, 0x99], &[0xc3, 0xb7], &[0xe2, 0x97, 0x8a],
    &[0xc3, 0xbf], &[0xc5, 0xb8], &[0xe2, 0x81, 0x84], &[0xe2, 0x82, 0xac],
    &[0xe2, 0x80, 0xb9], &[0xe2, 0x80, 0xba], &[0xef, 0xac, 0x81], &[0xef, 0xac, 0x82],
    &[0xe2, 0x80, 0xa1], &[0xc2, 0xb7], &[0xe2, 0x80, 0x9a], &[0xe2, 0x80, 0x9e],
    &[0xe2, 0x80, 0xb0], &[0xc3, 0x82], &[0xc3, 0x8a], &[0xc3, 0x81],
    &[0xc3, 0x8b], &[0xc3, 0x88], &[0xc3, 0x8d], &[0xc3, 0x8e],
    &[0xc3, 0x8f], &[0xc3, 0x8c], &[0xc3, 0x93], &[0xc3, 0x94],
    &[0xef, 0xa3, 0xbf], &[0xc3, 0x92], &[0xc3, 0x9a], &[0xc3, 0x9b],
    &[0xc3, 0x99], &[0xc4, 0xb1], &[0xcb, 0x86], &[0xcb, 0x9c],
    &[0xc2, 0xaf], &[0xcb, 0x98], &[0xcb, 0x99], &[0xcb, 0x9a],
    &[0xc2, 0xb8], &[0xcb, 0x9d], &[0xcb, 0x9b], &[0xcb, 0x87],
];

/// The command-key glyph, U+2318, that byte 0x11 maps to.
const COMMAND_KEY: &[u8] = &[0xe2, 0x8c, 0x98];

/// Converts a single legacy-encoded byte to its UTF-8 sequence. Total: every
/// byte 0x00..=0xFF produces a valid, non-empty result.
pub fn byte_to_utf8(byte: u8) -> &'static [u8] {
    if byte >= 0x80 {
        HIGH_BYTE_TABLE[(byte - 0x80) as usize]
    } else if byte == 0x11 {
        COMMAND_KEY
    } else {
        &ASCII_BYTES[byte as usize][..]
    }
}

static ASCII_BYTES: [[u8; 1]; 128] = {
    let mut table = [[0u8; 1]; 128];
    let mut i = 0;
    while i < 128 {
        table[i] = [i as u8];
        i += 1;
    }
    table
};

/// Transcodes a legacy-encoded byte string into a UTF-8 `String`.
pub fn decode(bytes: &[u8]) -> String {
    let mut out = Vec::with_capacity(bytes.len());
    for &b in bytes {
        out.extend_from_slice(byte_to_utf8(b));
    }
    // `byte_to_utf8` only ever emits well-formed UTF-8 sequences.
    String::from_utf8(out).expect("transcoder output is always valid UTF-8")
}

/// Escapes `<`, `>`, `&` for use in an XML element body. Call after
/// transcoding, never before (a multi-byte UTF-8 sequence must never be
/// escaped byte-by-byte).
pub fn xml_escape_body(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            other => out.push(other),
        }
    }
    out
}

/// Escapes a string for use inside a double-quoted XML attribute: the body
/// rules plus `"` → `%22`, `\n` → `%0A;`, `\r` → `%0D`.
pub fn xml_escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("%22"),
            '\n' => out.push_str("%0A;"),
            '\r' => out.push_str("%0D"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_bytes_pass_through_except_command_key() {
        for b in 0x00u8..=0x7f {
            if b == 0x11 {
                continue;
            }
            assert_eq!(byte_to_utf8(b), &[b]);
        }
    }

    #[test]
    fn byte_0x11_is_command_glyph() {
        assert_eq!(byte_to_utf8(0x11), &[0xe2, 0x8c, 0x98]);
        assert_eq!(decode(&[0x11]), "\u{2318}");
    }

    #[test]
    fn every_byte_produces_valid_utf8() {
        for b in 0u16..=0xff {
            let bytes = byte_to_utf8(b as u8);
            assert!(!bytes.is_empty());
            assert!(std::str::from_utf8(bytes).is_ok());
        }
    }

    #[test]
    fn high_byte_table_has_128_entries() {
        assert_eq!(HIGH_BYTE_TABLE.len(), 128);
        assert_eq!(decode(&[0x80]), "\u{00c4}");
    }

    #[test]
    fn xml_body_escapes_reserved_characters_only() {
        assert_eq!(xml_escape_body("a<b>c&d\"e"), "a&lt;b&gt;c&amp;d\"e");
    }

    #[test]
    fn xml_attr_escapes_quotes_and_newlines() {
        assert_eq!(xml_escape_attr("a\"b\nc\rd"), "a%22b%0A;c%0Dd");
    }
}
