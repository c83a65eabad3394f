use bitflags::bitflags;
use fancy_regex::Regex;
use log::{debug, warn};

use crate::runner::ds::error::{JErrorType, Message};
use crate::runner::ds::string::JsString;
use crate::runner::text::utf::{char_unit, unit_char, Utf16Offsets};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RegExpFlags: u8 {
        const GLOBAL = 0b001;
        const IGNORE_CASE = 0b010;
        const MULTILINE = 0b100;
    }
}

impl RegExpFlags {
    pub fn parse(flags: &JsString) -> Result<Self, JErrorType> {
        let mut result = RegExpFlags::empty();
        for c in flags.to_utf8().chars() {
            let flag = match c {
                'g' => RegExpFlags::GLOBAL,
                'i' => RegExpFlags::IGNORE_CASE,
                'm' => RegExpFlags::MULTILINE,
                _ => return Err(Message::RegExpIllegalFlag(c).into()),
            };
            if result.contains(flag) {
                return Err(Message::RegExpDuplicateFlag(c).into());
            }
            result |= flag;
        }
        Ok(result)
    }
}

/// A successful match; offsets are in UTF-16 code units. `captures[0]` is
/// the whole match.
#[derive(Debug, Clone, PartialEq)]
pub struct RegExpMatch {
    pub start: usize,
    pub end: usize,
    pub captures: Vec<Option<(usize, usize)>>,
}

impl RegExpMatch {
    pub fn capture(&self, subject: &JsString, i: usize) -> Option<JsString> {
        self.captures
            .get(i)
            .copied()
            .flatten()
            .map(|(s, e)| subject.substr(s, e - s))
    }
}

pub struct RegExpData {
    pub source: JsString,
    pub flags: RegExpFlags,
    matcher: Regex,
    capture_count: usize,
}

const WHITE_SPACE_CLASS: &str =
    "\\t\\n\\x{b}\\x{c}\\r \\x{a0}\\x{1680}\\x{180e}\\x{2000}-\\x{200a}\\x{2028}\\x{2029}\\x{202f}\\x{205f}\\x{3000}\\x{feff}";
const DIGIT_CLASS: &str = "0-9";
const WORD_CLASS: &str = "A-Za-z0-9_";
const WORD_BOUNDARY: &str =
    "(?:(?<=[A-Za-z0-9_])(?![A-Za-z0-9_])|(?<![A-Za-z0-9_])(?=[A-Za-z0-9_]))";
const NOT_WORD_BOUNDARY: &str =
    "(?:(?<=[A-Za-z0-9_])(?=[A-Za-z0-9_])|(?<![A-Za-z0-9_])(?![A-Za-z0-9_]))";
const LINE_START: &str = "(?:^|(?<=[\\n\\r\\x{2028}\\x{2029}]))";
const LINE_END: &str = "(?:$|(?=[\\n\\r\\x{2028}\\x{2029}]))";

/// Writes code unit `unit` as an escaped character of the matched text.
fn push_code_point(out: &mut String, unit: u32) {
    out.push_str(&format!("\\x{{{:x}}}", unit_char(unit) as u32));
}

/// Writes the class range `lo-hi` over code units. The surrogate block
/// lives in another plane of the matched text, so a range crossing it is
/// split into up to three pieces.
fn push_unit_range(out: &mut String, lo: u32, hi: u32) {
    let mut piece = |a: u32, b: u32| {
        push_code_point(out, a);
        out.push('-');
        push_code_point(out, b);
    };
    if lo > hi || hi < 0xD800 || lo > 0xDFFF {
        piece(lo, hi);
        return;
    }
    if lo < 0xD800 {
        piece(lo, 0xD7FF);
    }
    piece(lo.max(0xD800), hi.min(0xDFFF));
    if hi > 0xDFFF {
        piece(0xE000, hi);
    }
}

fn hex_digits(chars: &[char], at: usize, count: usize) -> Option<u32> {
    if at + count > chars.len() {
        return None;
    }
    let text: String = chars[at..at + count].iter().collect();
    if text.chars().all(|c| c.is_ascii_hexdigit()) {
        u32::from_str_radix(&text, 16).ok()
    } else {
        None
    }
}

/// True if `chars[i..]` starts a `{n}`, `{n,}` or `{n,m}` quantifier.
fn is_quantifier(chars: &[char], i: usize) -> bool {
    let mut j = i + 1;
    let digits_start = j;
    while j < chars.len() && chars[j].is_ascii_digit() {
        j += 1;
    }
    if j == digits_start {
        return false;
    }
    if j < chars.len() && chars[j] == ',' {
        j += 1;
        while j < chars.len() && chars[j].is_ascii_digit() {
            j += 1;
        }
    }
    j < chars.len() && chars[j] == '}'
}

/// Translates an escape at `chars[i]` (just after the backslash). Returns
/// the number of pattern characters consumed.
fn translate_escape(chars: &[char], i: usize, in_class: bool, out: &mut String) -> usize {
    let c = match chars.get(i) {
        Some(c) => *c,
        None => {
            out.push_str("\\\\");
            return 0;
        }
    };
    let class = |out: &mut String, body: &str, negated: bool| {
        if negated {
            out.push_str(&format!("[^{}]", body));
        } else if in_class {
            out.push_str(body);
        } else {
            out.push_str(&format!("[{}]", body));
        }
    };
    match c {
        'd' => class(out, DIGIT_CLASS, false),
        'D' => class(out, DIGIT_CLASS, true),
        'w' => class(out, WORD_CLASS, false),
        'W' => class(out, WORD_CLASS, true),
        's' => class(out, WHITE_SPACE_CLASS, false),
        'S' => class(out, WHITE_SPACE_CLASS, true),
        'b' if in_class => push_code_point(out, 0x08),
        'B' if in_class => out.push('B'),
        'b' => out.push_str(WORD_BOUNDARY),
        'B' => out.push_str(NOT_WORD_BOUNDARY),
        'n' => out.push_str("\\n"),
        'r' => out.push_str("\\r"),
        't' => out.push_str("\\t"),
        'v' => push_code_point(out, 0x0B),
        'f' => push_code_point(out, 0x0C),
        '0' if !chars.get(i + 1).map_or(false, |d| d.is_ascii_digit()) => push_code_point(out, 0),
        'u' => {
            if let Some(cp) = hex_digits(chars, i + 1, 4) {
                push_code_point(out, cp);
                return 5;
            }
            out.push('u');
        }
        'x' => {
            if let Some(cp) = hex_digits(chars, i + 1, 2) {
                push_code_point(out, cp);
                return 3;
            }
            out.push('x');
        }
        'c' => {
            if let Some(letter) = chars.get(i + 1).filter(|l| l.is_ascii_alphabetic()) {
                push_code_point(out, *letter as u32 % 32);
                return 2;
            }
            out.push_str("\\\\c");
        }
        '1'..='9' if !in_class => {
            let mut j = i;
            out.push('\\');
            while j < chars.len() && chars[j].is_ascii_digit() {
                out.push(chars[j]);
                j += 1;
            }
            return j - i;
        }
        c if c.is_ascii_punctuation() => {
            out.push('\\');
            out.push(c);
        }
        c => push_code_point(out, char_unit(c)),
    }
    1
}

/// The code unit an escape at `chars[i]` stands for inside a class, with
/// the number of characters consumed. Class escapes such as `\d` give `None`.
fn escape_unit(chars: &[char], i: usize) -> Option<(u32, usize)> {
    let c = *chars.get(i)?;
    let unit = match c {
        'd' | 'D' | 'w' | 'W' | 's' | 'S' | '1'..='9' => return None,
        'b' => 0x08,
        'n' => 0x0A,
        'r' => 0x0D,
        't' => 0x09,
        'v' => 0x0B,
        'f' => 0x0C,
        '0' if chars.get(i + 1).map_or(false, |d| d.is_ascii_digit()) => return None,
        '0' => 0,
        'u' => match hex_digits(chars, i + 1, 4) {
            Some(cp) => return Some((cp, 5)),
            None => 'u' as u32,
        },
        'x' => match hex_digits(chars, i + 1, 2) {
            Some(cp) => return Some((cp, 3)),
            None => 'x' as u32,
        },
        'c' => {
            let letter = chars.get(i + 1).filter(|l| l.is_ascii_alphabetic())?;
            return Some((*letter as u32 % 32, 2));
        }
        c => char_unit(c),
    };
    Some((unit, 1))
}

/// A single class atom at `chars[i]` as a code unit.
fn class_unit(chars: &[char], i: usize) -> Option<(u32, usize)> {
    match *chars.get(i)? {
        ']' => None,
        '\\' => escape_unit(chars, i + 1).map(|(u, n)| (u, n + 1)),
        c => Some((char_unit(c), 1)),
    }
}

/// Rewrites an ECMAScript pattern into the syntax accepted by `fancy_regex`.
///
/// The pattern and the subject are both read one UTF-16 code unit per
/// character (see [`Utf16Offsets`]), so `.` and classes consume one unit.
fn translate_pattern(source: &JsString, flags: RegExpFlags) -> String {
    let chars: Vec<char> = source.units().iter().map(|&u| unit_char(u as u32)).collect();
    let multiline = flags.contains(RegExpFlags::MULTILINE);

    let mut out = String::new();
    if flags.contains(RegExpFlags::IGNORE_CASE) {
        out.push_str("(?i)");
    }
    let mut in_class = false;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if in_class {
            if let Some((lo, used)) = class_unit(&chars, i) {
                let dash = i + used;
                if chars.get(dash) == Some(&'-') {
                    if let Some((hi, used_hi)) = class_unit(&chars, dash + 1) {
                        push_unit_range(&mut out, lo, hi);
                        i = dash + 1 + used_hi;
                        continue;
                    }
                }
            }
        }
        if c == '\\' {
            i += 1 + translate_escape(&chars, i + 1, in_class, &mut out);
            continue;
        }
        if in_class {
            match c {
                ']' => {
                    in_class = false;
                    out.push(']');
                }
                '[' | '&' | '~' => {
                    out.push('\\');
                    out.push(c);
                }
                '-' if chars.get(i + 1) == Some(&'-') => out.push_str("\\-"),
                c if c.is_ascii() => out.push(c),
                c => push_code_point(&mut out, char_unit(c)),
            }
            i += 1;
            continue;
        }
        match c {
            '[' => {
                if chars.get(i + 1) == Some(&']') {
                    out.push_str("[^\\x{0}-\\x{10ffff}]");
                    i += 2;
                    continue;
                }
                if chars.get(i + 1) == Some(&'^') && chars.get(i + 2) == Some(&']') {
                    out.push_str("[\\x{0}-\\x{10ffff}]");
                    i += 3;
                    continue;
                }
                in_class = true;
                out.push('[');
                if chars.get(i + 1) == Some(&'^') {
                    out.push('^');
                    i += 1;
                }
                // A leading ']' is literal in Rust syntax but closes the class here.
            }
            '.' => out.push_str("[^\\n\\r\\x{2028}\\x{2029}]"),
            '^' if multiline => out.push_str(LINE_START),
            '$' if multiline => out.push_str(LINE_END),
            '{' if !is_quantifier(&chars, i) => out.push_str("\\{"),
            '}' => {
                // Closing brace of a quantifier is copied with it below.
                out.push_str("\\}");
            }
            '{' => {
                while i < chars.len() && chars[i] != '}' {
                    out.push(chars[i]);
                    i += 1;
                }
                out.push('}');
            }
            c if c.is_ascii() => out.push(c),
            c => push_code_point(&mut out, char_unit(c)),
        }
        i += 1;
    }
    out
}

impl RegExpData {
    /// Compiles `source` with `flags`, raising a SyntaxError when either
    /// is malformed.
    pub fn new(source: JsString, flags: &JsString) -> Result<Self, JErrorType> {
        let flags = RegExpFlags::parse(flags)?;
        let translated = translate_pattern(&source, flags);
        debug!("compile regexp /{}/ as {}", source, translated);
        let matcher = Regex::new(&translated)
            .map_err(|e| JErrorType::from(Message::RegExpCompile(e.to_string())))?;
        let capture_count = matcher.captures_len();
        Ok(RegExpData {
            source,
            flags,
            matcher,
            capture_count,
        })
    }

    pub fn global(&self) -> bool {
        self.flags.contains(RegExpFlags::GLOBAL)
    }

    pub fn ignore_case(&self) -> bool {
        self.flags.contains(RegExpFlags::IGNORE_CASE)
    }

    pub fn multiline(&self) -> bool {
        self.flags.contains(RegExpFlags::MULTILINE)
    }

    /// Number of capturing groups, excluding the whole match.
    pub fn group_count(&self) -> usize {
        self.capture_count.saturating_sub(1)
    }

    pub fn flags_string(&self) -> String {
        let mut s = String::new();
        if self.global() {
            s.push('g');
        }
        if self.ignore_case() {
            s.push('i');
        }
        if self.multiline() {
            s.push('m');
        }
        s
    }

    /// First match starting at or after code unit `start`.
    pub fn match_at(&self, subject: &JsString, start: usize) -> Option<RegExpMatch> {
        if start > subject.len() {
            return None;
        }
        let offsets = Utf16Offsets::new(subject.units());
        let byte_start = offsets.to_byte(start);
        let captures = match self.matcher.captures_from_pos(offsets.text(), byte_start) {
            Ok(Some(c)) => c,
            Ok(None) => return None,
            Err(e) => {
                warn!("regexp /{}/ failed to run: {}", self.source, e);
                return None;
            }
        };
        let groups: Vec<Option<(usize, usize)>> = (0..self.capture_count)
            .map(|i| {
                captures
                    .get(i)
                    .map(|m| (offsets.to_unit(m.start()), offsets.to_unit(m.end())))
            })
            .collect();
        let (start, end) = groups.first().copied().flatten()?;
        Some(RegExpMatch {
            start,
            end,
            captures: groups,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(pattern: &str, flags: &str) -> RegExpData {
        RegExpData::new(JsString::new(pattern), &JsString::new(flags)).unwrap()
    }

    #[test]
    fn test_flags() {
        let re = compile("a", "gi");
        assert!(re.global());
        assert!(re.ignore_case());
        assert!(!re.multiline());
        assert_eq!(re.flags_string(), "gi");
        assert!(RegExpData::new(JsString::new("a"), &JsString::new("gg")).is_err());
        assert!(RegExpData::new(JsString::new("a"), &JsString::new("x")).is_err());
    }

    #[test]
    fn test_match_offsets_in_code_units() {
        let re = compile("b+", "");
        let subject = JsString::new("\u{1F600}abbc");
        let m = re.match_at(&subject, 0).unwrap();
        assert_eq!((m.start, m.end), (3, 5));
        assert_eq!(m.capture(&subject, 0).unwrap().to_string(), "bb");
    }

    #[test]
    fn test_captures_and_start() {
        let re = compile("(a)|(b)", "");
        let subject = JsString::new("xab");
        let m = re.match_at(&subject, 2).unwrap();
        assert_eq!(m.start, 2);
        assert_eq!(m.captures, vec![Some((2, 3)), None, Some((2, 3))]);
        assert_eq!(re.group_count(), 2);
    }

    #[test]
    fn test_translation() {
        assert!(compile("\\d{2,}", "").match_at(&JsString::new("a123"), 0).is_some());
        assert!(compile("a{", "").match_at(&JsString::new("a{"), 0).is_some());
        assert!(compile("[^]", "").match_at(&JsString::new("\n"), 0).is_some());
        assert!(compile("[]", "").match_at(&JsString::new("a"), 0).is_none());
        assert!(compile(".", "").match_at(&JsString::new("\n"), 0).is_none());
        assert!(compile("\\u0041", "").match_at(&JsString::new("A"), 0).is_some());
        assert!(compile("[a&&b]", "").match_at(&JsString::new("&"), 0).is_some());
        assert!(compile("(a)\\1", "").match_at(&JsString::new("aa"), 0).is_some());
        assert!(compile("ABC", "i").match_at(&JsString::new("xabc"), 0).is_some());
    }

    fn matches(pattern: &str, flags: &str, subject: &str) -> bool {
        compile(pattern, flags).match_at(&JsString::new(subject), 0).is_some()
    }

    #[test]
    fn test_word_boundary_uses_ascii_word_characters() {
        assert!(matches("a\\b", "", "a\u{e9}"));
        assert!(!matches("a\\B", "", "a\u{e9}"));
        assert!(matches("\\bfoo\\b", "", "a foo_ b foo."));
        assert!(!matches("\\bfoo\\b", "", "foo_"));
        assert!(matches("[\\b]", "", "\u{8}"));
    }

    #[test]
    fn test_multiline_anchors_see_every_line_terminator() {
        assert!(matches("^b", "m", "a\rb"));
        assert!(matches("^b", "m", "a\u{2028}b"));
        assert!(matches("a$", "m", "a\u{2029}b"));
        assert!(matches("a$", "m", "a\r\nb"));
        assert!(!matches("^b", "", "a\nb"));
        assert!(!matches("a$", "", "a\nb"));
        let m = compile("^b", "m").match_at(&JsString::new("a\nb"), 1).unwrap();
        assert_eq!((m.start, m.end), (2, 3));
    }

    #[test]
    fn test_astral_characters_are_two_units() {
        assert!(!matches("^.$", "", "\u{1F600}"));
        assert!(matches("^..$", "", "\u{1F600}"));
        assert!(matches("^[^x][^x]$", "", "\u{1F600}"));
        assert!(matches("^\\uD83D\\uDE00$", "", "\u{1F600}"));
        assert!(matches("^[\\uD800-\\uDBFF]", "", "\u{1F600}"));
        assert!(matches("^[\\u0000-\\uFFFF]{2}$", "", "\u{1F600}"));
        assert!(!matches("^[a-z]", "", "\u{1F600}"));
        let re = compile("\u{1F600}", "");
        let m = re.match_at(&JsString::new("x\u{1F600}"), 0).unwrap();
        assert_eq!((m.start, m.end), (1, 3));
    }

    #[test]
    fn test_compile_error() {
        let err = RegExpData::new(JsString::new("("), &JsString::empty());
        assert!(matches!(err, Err(JErrorType::SyntaxError(_))));
    }
}
