//! Cleanup applied to raw translation service output.

/// Decode `raw` as UTF-8, silently dropping every invalid byte sequence.
///
/// Nothing is replaced or escaped, unlike the PDF renderer which keeps
/// unsupported characters as a `?` placeholder.
pub fn sanitize_text(raw: &[u8]) -> String {
    let mut text = String::with_capacity(raw.len());
    for chunk in raw.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    text
}

/// Remove `\uXXXX` escapes for surrogates that have no partner.
///
/// JSON allows such escapes but they decode to no character, and
/// `serde_json` rejects them. A high surrogate escape immediately followed
/// by a low surrogate escape is kept, so the pair still decodes.
pub fn strip_unpaired_surrogates(json: &str) -> String {
    let bytes = json.as_bytes();
    let mut text = String::with_capacity(json.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            i += 1;
            continue;
        }
        match escaped_unit(bytes, i) {
            Some(high) if is_high_surrogate(high) => {
                if escaped_unit(bytes, i + 6).is_some_and(is_low_surrogate) {
                    i += 12;
                } else {
                    text.push_str(&json[copied..i]);
                    i += 6;
                    copied = i;
                }
            }
            Some(low) if is_low_surrogate(low) => {
                text.push_str(&json[copied..i]);
                i += 6;
                copied = i;
            }
            // Skip the escaped character so `\\` never starts an escape
            _ => i += 2,
        }
    }

    text.push_str(&json[copied..]);
    text
}

/// The code unit of a `\uXXXX` escape starting at `at`.
fn escaped_unit(bytes: &[u8], at: usize) -> Option<u16> {
    match bytes.get(at..at + 6)? {
        [b'\\', b'u', hex @ ..] if hex.iter().all(u8::is_ascii_hexdigit) => {
            u16::from_str_radix(std::str::from_utf8(hex).ok()?, 16).ok()
        }
        _ => None,
    }
}

const fn is_high_surrogate(unit: u16) -> bool {
    matches!(unit, 0xD800..=0xDBFF)
}

const fn is_low_surrogate(unit: u16) -> bool {
    matches!(unit, 0xDC00..=0xDFFF)
}
