//! UTF-8 / UTF-16 conversions used at the runtime's boundaries.
//!
//! Strings are stored as UTF-16 code units. Anything leaving the runtime as
//! bytes (stdout, the regex engine, URI escapes) goes through here.

use crate::runner::text::unicode::{is_high_surrogate, is_low_surrogate};

pub const REPLACEMENT_CHARACTER: u32 = 0xFFFD;

pub fn utf8_to_utf16(s: &str) -> Vec<u16> {
    s.encode_utf16().collect()
}

/// Lone surrogates become U+FFFD.
pub fn utf16_to_utf8(units: &[u16]) -> String {
    char::decode_utf16(units.iter().copied())
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Code point starting at `index` and the number of code units it spans.
/// Unpaired surrogates are returned as themselves with width 1.
pub fn code_point_at(units: &[u16], index: usize) -> (u32, usize) {
    let first = units[index];
    if is_high_surrogate(first) && index + 1 < units.len() {
        let second = units[index + 1];
        if is_low_surrogate(second) {
            let cp = 0x10000 + (((first as u32) - 0xD800) << 10) + ((second as u32) - 0xDC00);
            return (cp, 2);
        }
    }
    (first as u32, 1)
}

pub fn push_code_point(units: &mut Vec<u16>, cp: u32) {
    if cp < 0x10000 {
        units.push(cp as u16);
    } else {
        let v = cp - 0x10000;
        units.push(0xD800 + (v >> 10) as u16);
        units.push(0xDC00 + (v & 0x3FF) as u16);
    }
}

/// Writes the UTF-8 form of `cp` into `buf`, returning the byte count.
/// Surrogate code points are encoded as-is, which callers must reject first.
pub fn encode_utf8(cp: u32, buf: &mut [u8; 4]) -> usize {
    if cp < 0x80 {
        buf[0] = cp as u8;
        1
    } else if cp < 0x800 {
        buf[0] = 0xC0 | (cp >> 6) as u8;
        buf[1] = 0x80 | (cp & 0x3F) as u8;
        2
    } else if cp < 0x10000 {
        buf[0] = 0xE0 | (cp >> 12) as u8;
        buf[1] = 0x80 | ((cp >> 6) & 0x3F) as u8;
        buf[2] = 0x80 | (cp & 0x3F) as u8;
        3
    } else {
        buf[0] = 0xF0 | (cp >> 18) as u8;
        buf[1] = 0x80 | ((cp >> 12) & 0x3F) as u8;
        buf[2] = 0x80 | ((cp >> 6) & 0x3F) as u8;
        buf[3] = 0x80 | (cp & 0x3F) as u8;
        4
    }
}

/// Number of bytes in a UTF-8 sequence introduced by `lead`, or `None` when
/// `lead` cannot start a sequence.
pub fn utf8_sequence_length(lead: u8) -> Option<usize> {
    if lead & 0x80 == 0 {
        Some(1)
    } else if lead & 0xE0 == 0xC0 {
        Some(2)
    } else if lead & 0xF0 == 0xE0 {
        Some(3)
    } else if lead & 0xF8 == 0xF0 {
        Some(4)
    } else {
        None
    }
}

/// Decodes one complete UTF-8 sequence, rejecting overlong forms,
/// surrogates and values past U+10FFFF.
pub fn decode_utf8_sequence(bytes: &[u8]) -> Option<u32> {
    let n = bytes.len();
    if n == 0 || utf8_sequence_length(bytes[0])? != n {
        return None;
    }
    if n == 1 {
        return Some(bytes[0] as u32);
    }
    let mut cp = (bytes[0] as u32) & (0x7F >> n);
    for &b in &bytes[1..] {
        if b & 0xC0 != 0x80 {
            return None;
        }
        cp = (cp << 6) | (b & 0x3F) as u32;
    }
    let min = match n {
        2 => 0x80,
        3 => 0x800,
        _ => 0x10000,
    };
    if cp < min || cp > 0x10FFFF || (0xD800..=0xDFFF).contains(&cp) {
        return None;
    }
    Some(cp)
}

/// First code point of the plane that stands in for surrogate code units.
pub const SURROGATE_PLANE: u32 = 0xF0000;

/// The character that stands for code unit `unit` in a [`Utf16Offsets`]
/// text. Surrogates move into plane 15, every other unit is itself.
pub fn unit_char(unit: u32) -> char {
    let cp = if (0xD800..=0xDFFF).contains(&unit) {
        SURROGATE_PLANE + (unit - 0xD800)
    } else {
        unit
    };
    char::from_u32(cp).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Inverse of [`unit_char`].
pub fn char_unit(c: char) -> u32 {
    let cp = c as u32;
    if (SURROGATE_PLANE..SURROGATE_PLANE + 0x800).contains(&cp) {
        cp - SURROGATE_PLANE + 0xD800
    } else {
        cp
    }
}

/// A string rewritten so that each UTF-16 code unit is exactly one `char`,
/// with the byte offset of every unit. A surrogate pair is two characters.
pub struct Utf16Offsets {
    text: String,
    unit_to_byte: Vec<usize>,
}

impl Utf16Offsets {
    pub fn new(units: &[u16]) -> Self {
        let mut text = String::with_capacity(units.len());
        let mut unit_to_byte = Vec::with_capacity(units.len() + 1);
        for &u in units {
            unit_to_byte.push(text.len());
            text.push(unit_char(u as u32));
        }
        unit_to_byte.push(text.len());
        Utf16Offsets { text, unit_to_byte }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn to_unit(&self, byte_offset: usize) -> usize {
        match self.unit_to_byte.binary_search(&byte_offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        }
    }

    pub fn to_byte(&self, unit_index: usize) -> usize {
        self.unit_to_byte[unit_index.min(self.unit_to_byte.len() - 1)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surrogate_pair_code_point() {
        let units = utf8_to_utf16("a\u{1F600}b");
        assert_eq!(units.len(), 4);
        assert_eq!(code_point_at(&units, 1), (0x1F600, 2));
        assert_eq!(code_point_at(&units, 3), (b'b' as u32, 1));
    }

    #[test]
    fn test_lone_surrogate_is_replaced() {
        assert_eq!(utf16_to_utf8(&[0x61, 0xD800]), "a\u{FFFD}");
    }

    #[test]
    fn test_decode_rejects_overlong() {
        assert_eq!(decode_utf8_sequence(&[0xC0, 0x80]), None);
        assert_eq!(decode_utf8_sequence(&[0xE2, 0x82, 0xAC]), Some(0x20AC));
        assert_eq!(decode_utf8_sequence(&[0xED, 0xA0, 0x80]), None);
    }

    #[test]
    fn test_offsets_give_one_char_per_unit() {
        let units = utf8_to_utf16("é\u{1F600}x");
        let offsets = Utf16Offsets::new(&units);
        assert_eq!(offsets.text().chars().count(), 4);
        assert_eq!(offsets.to_unit(0), 0);
        assert_eq!(offsets.to_unit(2), 1);
        assert_eq!(offsets.to_unit(6), 2);
        assert_eq!(offsets.to_byte(3), 10);
        assert_eq!(offsets.to_unit(offsets.text().len()), 4);
    }

    #[test]
    fn test_surrogate_units_map_to_plane_fifteen() {
        assert_eq!(unit_char(0xD83D) as u32, 0xF003D);
        assert_eq!(char_unit(unit_char(0xDE00)), 0xDE00);
        assert_eq!(unit_char(0x41), 'A');
        assert_eq!(char_unit('A'), 0x41);
    }
}
