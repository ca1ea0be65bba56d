use unicode_normalization::UnicodeNormalization as _;

/// The byte written in place of the characters which have no WinAnsi equivalent.
pub const REPLACEMENT_BYTE: u8 = b'?';

/// The characters of the 0x80 to 0x9F range of WinAnsi, which is where it departs from Latin-1.
/// Undefined positions are `None`.
const WIN_ANSI_HIGH_TABLE: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

/// Encodes the text into the bytes expected by the standard fonts when they use `WinAnsiEncoding`.
/// The text is normalized in the NFC form first, so that combining sequences collapse onto the
/// precomposed Latin characters whenever possible. Tabulations become spaces, the other control
/// characters are replaced like any character without a WinAnsi equivalent.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.nfc()
        .map(|character| {
            encode_character(character).unwrap_or_else(|| {
                log::warn!(
                    "Unable to encode the character {:?} in WinAnsi, replacing it",
                    character
                );
                REPLACEMENT_BYTE
            })
        })
        .collect()
}

/// Decodes WinAnsi bytes back into text, the undefined bytes become U+FFFD.
pub fn decode_win_ansi(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&byte| match byte {
            0x80..=0x9F => WIN_ANSI_HIGH_TABLE[(byte - 0x80) as usize]
                .unwrap_or(char::REPLACEMENT_CHARACTER),
            _ => char::from(byte),
        })
        .collect()
}

fn encode_character(character: char) -> Option<u8> {
    match character as u32 {
        code @ (0x20..=0x7E | 0xA0..=0xFF) => Some(code as u8),
        0x09 => Some(b' '),
        _ => WIN_ANSI_HIGH_TABLE
            .iter()
            .position(|entry| *entry == Some(character))
            .map(|index| 0x80 + index as u8),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_is_left_untouched() {
        assert_eq!(encode_win_ansi("Page 1 of 3"), b"Page 1 of 3".to_vec());
    }

    #[test]
    fn bullet_maps_into_the_high_range() {
        assert_eq!(encode_win_ansi("• AI"), vec![0x95, b' ', b'A', b'I']);
        assert_eq!(decode_win_ansi(&[0x95, b' ', b'A', b'I']), "• AI");
    }

    #[test]
    fn combining_sequences_are_composed_before_encoding() {
        // "e" followed by a combining acute accent
        assert_eq!(encode_win_ansi("e\u{0301}"), vec![0xE9]);
    }

    #[test]
    fn unencodable_characters_are_replaced() {
        assert_eq!(encode_win_ansi("✅ ok"), b"? ok".to_vec());
    }

    #[test]
    fn tabulations_become_spaces_and_line_breaks_are_replaced() {
        assert_eq!(encode_win_ansi("tab\there"), b"tab here".to_vec());
        assert_eq!(encode_win_ansi("two\nlines\r"), b"two?lines?".to_vec());
    }

    #[test]
    fn undefined_bytes_decode_to_the_replacement_character() {
        assert_eq!(decode_win_ansi(&[0x81]), "\u{FFFD}");
    }
}
