//! WinAnsiEncoding for the standard Type1 fonts used in generated PDFs.
//!
//! Helvetica and Helvetica-Bold are referenced without embedding, so every
//! string shown on a page must be a single-byte WinAnsi (cp1252) string.
//! Characters outside that code page are substituted with [`PLACEHOLDER`].

/// Byte written in place of characters WinAnsi cannot represent.
pub const PLACEHOLDER: u8 = b'?';

/// Characters that WinAnsi places in the 0x80..=0x9F range.
const WIN_ANSI_HIGH: [(char, u8); 27] = [
    ('\u{20AC}', 0x80),
    ('\u{201A}', 0x82),
    ('\u{0192}', 0x83),
    ('\u{201E}', 0x84),
    ('\u{2026}', 0x85),
    ('\u{2020}', 0x86),
    ('\u{2021}', 0x87),
    ('\u{02C6}', 0x88),
    ('\u{2030}', 0x89),
    ('\u{0160}', 0x8A),
    ('\u{2039}', 0x8B),
    ('\u{0152}', 0x8C),
    ('\u{017D}', 0x8E),
    ('\u{2018}', 0x91),
    ('\u{2019}', 0x92),
    ('\u{201C}', 0x93),
    ('\u{201D}', 0x94),
    ('\u{2022}', 0x95),
    ('\u{2013}', 0x96),
    ('\u{2014}', 0x97),
    ('\u{02DC}', 0x98),
    ('\u{2122}', 0x99),
    ('\u{0161}', 0x9A),
    ('\u{203A}', 0x9B),
    ('\u{0153}', 0x9C),
    ('\u{017E}', 0x9E),
    ('\u{0178}', 0x9F),
];

/// Map a single character to its WinAnsi byte, if it has one.
pub fn win_ansi_byte(c: char) -> Option<u8> {
    match u32::from(c) {
        0x20..=0x7E | 0xA0..=0xFF => u8::try_from(u32::from(c)).ok(),
        _ => WIN_ANSI_HIGH
            .iter()
            .find(|(ch, _)| *ch == c)
            .map(|(_, byte)| *byte),
    }
}

/// Result of encoding a string for a WinAnsi font
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    /// Number of characters replaced by the placeholder
    pub replaced: usize,
}

/// Encode `text` as WinAnsi, substituting [`PLACEHOLDER`] for anything the
/// code page lacks. Never fails.
pub fn encode_win_ansi(text: &str) -> Encoded {
    let mut bytes = Vec::with_capacity(text.len());
    let mut replaced = 0;

    for c in text.chars() {
        if let Some(byte) = win_ansi_byte(c) {
            bytes.push(byte);
        } else {
            bytes.push(PLACEHOLDER);
            replaced += 1;
        }
    }

    Encoded { bytes, replaced }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        let encoded = encode_win_ansi("Hello, World!");
        assert_eq!(encoded.bytes, b"Hello, World!");
        assert_eq!(encoded.replaced, 0);
    }

    #[test]
    fn test_latin1_range() {
        let encoded = encode_win_ansi("Añejo café");
        assert_eq!(encoded.bytes, b"A\xF1ejo caf\xE9");
        assert_eq!(encoded.replaced, 0);
    }

    #[test]
    fn test_typographic_punctuation() {
        let encoded = encode_win_ansi("\u{201C}quoted\u{201D} \u{2014} 5\u{20AC}");
        assert_eq!(encoded.bytes, b"\x93quoted\x94 \x97 5\x80");
        assert_eq!(encoded.replaced, 0);
    }

    #[test]
    fn test_unsupported_characters_use_placeholder() {
        let encoded = encode_win_ansi("Привет 漢字");
        assert_eq!(encoded.bytes, b"?????? ??");
        assert_eq!(encoded.replaced, 8);
    }

    #[test]
    fn test_control_characters_are_replaced() {
        let encoded = encode_win_ansi("a\tb\u{7F}");
        assert_eq!(encoded.bytes, b"a?b?");
        assert_eq!(encoded.replaced, 2);
    }
}
