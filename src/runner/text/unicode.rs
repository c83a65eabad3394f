//! Character class predicates over UTF-16 code units.

pub const TAB: u16 = 0x0009;
pub const VT: u16 = 0x000B;
pub const FF: u16 = 0x000C;
pub const SP: u16 = 0x0020;
pub const NBSP: u16 = 0x00A0;
pub const BOM: u16 = 0xFEFF;
pub const LF: u16 = 0x000A;
pub const CR: u16 = 0x000D;
pub const LS: u16 = 0x2028;
pub const PS: u16 = 0x2029;

/// WhiteSpace production: the named controls plus the `Zs` category.
pub fn is_white_space(c: u16) -> bool {
    match c {
        TAB | VT | FF | SP | NBSP | BOM => true,
        0x1680 | 0x180E | 0x2000..=0x200A | 0x202F | 0x205F | 0x3000 => true,
        _ => false,
    }
}

pub fn is_line_terminator(c: u16) -> bool {
    matches!(c, LF | CR | LS | PS)
}

/// The set stripped by `String.prototype.trim` and by ToNumber.
pub fn is_trimmable(c: u16) -> bool {
    is_white_space(c) || is_line_terminator(c)
}

pub fn is_decimal_digit(c: u16) -> bool {
    (b'0' as u16..=b'9' as u16).contains(&c)
}

pub fn hex_value(c: u16) -> Option<u32> {
    match c {
        0x30..=0x39 => Some((c - 0x30) as u32),
        0x41..=0x46 => Some((c - 0x41 + 10) as u32),
        0x61..=0x66 => Some((c - 0x61 + 10) as u32),
        _ => None,
    }
}

/// Value of `c` as a digit in bases up to 36.
pub fn digit_value(c: u16) -> Option<u32> {
    match c {
        0x30..=0x39 => Some((c - 0x30) as u32),
        0x41..=0x5A => Some((c - 0x41 + 10) as u32),
        0x61..=0x7A => Some((c - 0x61 + 10) as u32),
        _ => None,
    }
}

pub fn is_ascii_alpha(c: u16) -> bool {
    (0x41..=0x5A).contains(&c) || (0x61..=0x7A).contains(&c)
}

/// `IdentifierPart` restricted to what the runtime checks (regex flags, key names).
pub fn is_word_char(c: u16) -> bool {
    is_ascii_alpha(c) || is_decimal_digit(c) || c == b'_' as u16
}

pub fn is_high_surrogate(c: u16) -> bool {
    (0xD800..=0xDBFF).contains(&c)
}

pub fn is_low_surrogate(c: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&c)
}

pub fn is_surrogate(c: u16) -> bool {
    (0xD800..=0xDFFF).contains(&c)
}
