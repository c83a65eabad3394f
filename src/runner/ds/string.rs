use std::cell::{Cell, OnceCell, RefCell};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::runner::text::utf::{utf16_to_utf8, utf8_to_utf16};

const DJB2_SEED: u32 = 5381;

pub struct StringData {
    units: Box<[u16]>,
    hash: Cell<Option<u32>>,
    intern_id: Cell<Option<u32>>,
    utf8: OnceCell<String>,
}

/// Immutable UTF-16 string shared by reference.
#[derive(Clone)]
pub struct JsString(Rc<StringData>);

#[derive(Default)]
struct InternTable {
    by_content: HashMap<JsString, u32>,
    by_id: Vec<JsString>,
}

thread_local! {
    static INTERN_TABLE: RefCell<InternTable> = RefCell::new(InternTable::default());
}

impl JsString {
    pub fn from_units(units: Vec<u16>) -> Self {
        JsString(Rc::new(StringData {
            units: units.into_boxed_slice(),
            hash: Cell::new(None),
            intern_id: Cell::new(None),
            utf8: OnceCell::new(),
        }))
    }

    pub fn new(s: &str) -> Self {
        let js = JsString::from_units(utf8_to_utf16(s));
        let _ = js.0.utf8.set(s.to_string());
        js
    }

    pub fn empty() -> Self {
        JsString::from_units(Vec::new())
    }

    pub fn from_utf8(bytes: &[u8]) -> Option<Self> {
        std::str::from_utf8(bytes).ok().map(JsString::new)
    }

    pub fn len(&self) -> usize {
        self.0.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.units.is_empty()
    }

    pub fn units(&self) -> &[u16] {
        &self.0.units
    }

    pub fn at(&self, i: usize) -> u16 {
        self.0.units[i]
    }

    /// djb2 over the code units, computed once.
    pub fn hash_value(&self) -> u32 {
        if let Some(h) = self.0.hash.get() {
            return h;
        }
        let h = self
            .0
            .units
            .iter()
            .fold(DJB2_SEED, |h, &c| h.wrapping_mul(33).wrapping_add(c as u32));
        self.0.hash.set(Some(h));
        h
    }

    pub fn concat(&self, other: &JsString) -> JsString {
        if other.is_empty() {
            return self.clone();
        }
        if self.is_empty() {
            return other.clone();
        }
        let mut units = Vec::with_capacity(self.len() + other.len());
        units.extend_from_slice(self.units());
        units.extend_from_slice(other.units());
        JsString::from_units(units)
    }

    /// Clamped to the bounds of the string.
    pub fn substr(&self, start: usize, len: usize) -> JsString {
        let start = start.min(self.len());
        let end = start.saturating_add(len).min(self.len());
        if start == 0 && end == self.len() {
            return self.clone();
        }
        JsString::from_units(self.0.units[start..end].to_vec())
    }

    pub fn take(&self, n: usize) -> JsString {
        self.substr(0, n)
    }

    pub fn skip(&self, n: usize) -> JsString {
        self.substr(n, self.len())
    }

    pub fn index_of(&self, needle: &JsString, from: usize) -> Option<usize> {
        let hay = self.units();
        let needle = needle.units();
        if from > hay.len() {
            return None;
        }
        if needle.is_empty() {
            return Some(from);
        }
        if needle.len() > hay.len() {
            return None;
        }
        (from..=hay.len() - needle.len()).find(|&i| &hay[i..i + needle.len()] == needle)
    }

    /// Greatest match position that is `<= from`.
    pub fn last_index_of(&self, needle: &JsString, from: usize) -> Option<usize> {
        let hay = self.units();
        let needle = needle.units();
        if needle.len() > hay.len() {
            return None;
        }
        let start = from.min(hay.len() - needle.len());
        (0..=start)
            .rev()
            .find(|&i| &hay[i..i + needle.len()] == needle)
    }

    pub fn to_lower(&self) -> JsString {
        self.map_chars(|c, out| out.extend(c.to_lowercase()))
    }

    pub fn to_upper(&self) -> JsString {
        self.map_chars(|c, out| out.extend(c.to_uppercase()))
    }

    fn map_chars(&self, f: impl Fn(char, &mut String)) -> JsString {
        let mut units = Vec::with_capacity(self.len());
        let mut buf = String::new();
        for r in char::decode_utf16(self.units().iter().copied()) {
            match r {
                Ok(c) => {
                    buf.clear();
                    f(c, &mut buf);
                    units.extend(buf.encode_utf16());
                }
                Err(e) => units.push(e.unpaired_surrogate()),
            }
        }
        JsString::from_units(units)
    }

    /// Strips units matching `pred` from both ends.
    pub fn trim(&self, pred: impl Fn(u16) -> bool) -> JsString {
        let units = self.units();
        let start = units.iter().position(|&c| !pred(c)).unwrap_or(units.len());
        let end = units
            .iter()
            .rposition(|&c| !pred(c))
            .map(|i| i + 1)
            .unwrap_or(start);
        self.substr(start, end.saturating_sub(start))
    }

    pub fn trim_start(&self, pred: impl Fn(u16) -> bool) -> JsString {
        let start = self
            .units()
            .iter()
            .position(|&c| !pred(c))
            .unwrap_or(self.len());
        self.skip(start)
    }

    /// Code-unit lexicographic order.
    pub fn compare(&self, other: &JsString) -> Ordering {
        self.units().cmp(other.units())
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        let mut it = self.units().iter();
        prefix.encode_utf16().all(|u| it.next() == Some(&u))
    }

    pub fn to_utf8(&self) -> &str {
        self.0.utf8.get_or_init(|| utf16_to_utf8(&self.0.units))
    }

    pub fn ptr_eq(a: &JsString, b: &JsString) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    /// Returns the canonical interned instance for `s`.
    pub fn intern(s: &str) -> JsString {
        JsString::new(s).interned()
    }

    pub fn interned(&self) -> JsString {
        if self.0.intern_id.get().is_some() {
            return self.clone();
        }
        INTERN_TABLE.with(|table| {
            let mut table = table.borrow_mut();
            if let Some(&id) = table.by_content.get(self) {
                return table.by_id[id as usize].clone();
            }
            let id = table.by_id.len() as u32;
            self.0.intern_id.set(Some(id));
            table.by_id.push(self.clone());
            table.by_content.insert(self.clone(), id);
            self.clone()
        })
    }

    pub fn intern_id(&self) -> Option<u32> {
        self.0.intern_id.get()
    }

    /// Id of the interned copy of this string, interning it first if needed.
    pub fn intern_id_or_insert(&self) -> u32 {
        let interned = self.interned();
        interned.0.intern_id.get().unwrap_or_default()
    }

    pub fn from_intern_id(id: u32) -> Option<JsString> {
        INTERN_TABLE.with(|table| table.borrow().by_id.get(id as usize).cloned())
    }

    /// Raw pointer used by the tagged value encoding.
    pub(crate) fn into_raw(self) -> *const StringData {
        Rc::into_raw(self.0)
    }

    /// # Safety
    /// `ptr` must come from `into_raw` and still own one strong count.
    pub(crate) unsafe fn from_raw(ptr: *const StringData) -> JsString {
        JsString(Rc::from_raw(ptr))
    }
}

impl PartialEq for JsString {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || self.units() == other.units()
    }
}

impl Eq for JsString {}

impl Hash for JsString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u32(self.hash_value());
    }
}

impl PartialOrd for JsString {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl Ord for JsString {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl fmt::Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_utf8())
    }
}

impl fmt::Debug for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_utf8())
    }
}

impl From<&str> for JsString {
    fn from(s: &str) -> Self {
        JsString::new(s)
    }
}

impl From<String> for JsString {
    fn from(s: String) -> Self {
        JsString::new(&s)
    }
}

impl From<Vec<u16>> for JsString {
    fn from(units: Vec<u16>) -> Self {
        JsString::from_units(units)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::text::unicode::is_trimmable;

    #[test]
    fn test_hash_is_djb2() {
        let s = JsString::new("ab");
        let expected = (5381u32 * 33 + 97) * 33 + 98;
        assert_eq!(s.hash_value(), expected);
        assert_eq!(s.hash_value(), expected);
    }

    #[test]
    fn test_index_of() {
        let s = JsString::new("abcabcabc");
        assert_eq!(s.index_of(&JsString::new("bc"), 3), Some(4));
        assert_eq!(s.index_of(&JsString::new("zz"), 0), None);
        assert_eq!(s.index_of(&JsString::empty(), 9), Some(9));
        assert_eq!(s.index_of(&JsString::empty(), 10), None);
    }

    #[test]
    fn test_last_index_of() {
        let s = JsString::new("abcabcabc");
        assert_eq!(s.last_index_of(&JsString::new("bc"), 9), Some(7));
        assert_eq!(s.last_index_of(&JsString::new("bc"), 6), Some(4));
        assert_eq!(JsString::empty().last_index_of(&JsString::new("x"), 0), None);
    }

    #[test]
    fn test_substr_clamps() {
        let s = JsString::new("hello");
        assert_eq!(s.substr(1, 3).to_utf8(), "ell");
        assert_eq!(s.substr(3, 100).to_utf8(), "lo");
        assert_eq!(s.substr(10, 1).to_utf8(), "");
        assert_eq!(s.take(2).to_utf8(), "he");
        assert_eq!(s.skip(2).to_utf8(), "llo");
    }

    #[test]
    fn test_case_mapping_keeps_lone_surrogates() {
        let s = JsString::from_units(vec![0x61, 0xD800, 0x42]);
        assert_eq!(s.to_upper().units(), &[0x41, 0xD800, 0x42]);
        assert_eq!(JsString::new("ß").to_upper().to_utf8(), "SS");
    }

    #[test]
    fn test_trim() {
        let s = JsString::new("\u{00A0} x y \n");
        assert_eq!(s.trim(is_trimmable).to_utf8(), "x y");
        assert_eq!(JsString::new("   ").trim(is_trimmable).to_utf8(), "");
    }

    #[test]
    fn test_intern_ids_are_stable() {
        let a = JsString::intern("length");
        let b = JsString::new("length").interned();
        assert!(JsString::ptr_eq(&a, &b));
        let id = a.intern_id().unwrap();
        assert_eq!(JsString::from_intern_id(id).unwrap(), a);
    }

    #[test]
    fn test_compare_by_code_unit() {
        assert_eq!(JsString::new("a").compare(&JsString::new("b")), Ordering::Less);
        assert_eq!(
            JsString::new("\u{FF61}").compare(&JsString::new("\u{1F600}")),
            Ordering::Greater
        );
    }
}
