use std::cell::RefCell;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::runner::ds::object::{JsObject, JsObjectType};
use crate::runner::ds::string::{JsString, StringData};

// NaN-boxed layout: doubles occupy every bit pattern whose top 16 bits are at
// most 0xFFF8 (NaNs are canonicalised to 0x7FF8...). Non-number values use the
// remaining quiet-NaN space with a tag in the top 16 bits and a 48-bit payload.
const TAG_SHIFT: u32 = 48;
const TAG_MASK: u64 = 0xFFFF << TAG_SHIFT;
const PAYLOAD_MASK: u64 = (1 << TAG_SHIFT) - 1;
const CANONICAL_NAN: u64 = 0x7FF8_0000_0000_0000;

const TAG_NOTHING: u64 = 0xFFF9 << TAG_SHIFT;
const TAG_UNDEFINED: u64 = 0xFFFA << TAG_SHIFT;
const TAG_NULL: u64 = 0xFFFB << TAG_SHIFT;
const TAG_BOOLEAN: u64 = 0xFFFC << TAG_SHIFT;
const TAG_STRING: u64 = 0xFFFD << TAG_SHIFT;
const TAG_OBJECT: u64 = 0xFFFE << TAG_SHIFT;

/// Puts a heap pointer under `tag`. An address that does not fit the
/// 48-bit payload could not be unpacked again.
fn pack_pointer(tag: u64, ptr: u64) -> u64 {
    assert!(ptr & !PAYLOAD_MASK == 0, "payload pointer {:#x} exceeds 48 bits", ptr);
    tag | ptr
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueTag {
    Nothing,
    Undefined,
    Null,
    Boolean,
    Number,
    String,
    Object,
}

/// A 64-bit tagged value.
///
/// Strings and objects are owning references: cloning a value bumps the
/// reference count, dropping it releases it.
pub struct JsValue {
    bits: u64,
    _not_send: PhantomData<*const ()>,
}

/// Owned, matchable view of a `JsValue`.
pub enum ValueKind {
    Nothing,
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(JsString),
    Object(JsObjectType),
}

impl JsValue {
    const fn from_bits(bits: u64) -> Self {
        JsValue {
            bits,
            _not_send: PhantomData,
        }
    }

    pub const fn nothing() -> Self {
        JsValue::from_bits(TAG_NOTHING)
    }

    pub const fn undefined() -> Self {
        JsValue::from_bits(TAG_UNDEFINED)
    }

    pub const fn null() -> Self {
        JsValue::from_bits(TAG_NULL)
    }

    pub const fn boolean(b: bool) -> Self {
        JsValue::from_bits(TAG_BOOLEAN | b as u64)
    }

    pub fn number(n: f64) -> Self {
        if n.is_nan() {
            JsValue::from_bits(CANONICAL_NAN)
        } else {
            JsValue::from_bits(n.to_bits())
        }
    }

    pub fn string(s: JsString) -> Self {
        JsValue::from_bits(pack_pointer(TAG_STRING, s.into_raw() as u64))
    }

    pub fn object(o: JsObjectType) -> Self {
        JsValue::from_bits(pack_pointer(TAG_OBJECT, Rc::into_raw(o) as u64))
    }

    pub fn str(s: &str) -> Self {
        JsValue::string(JsString::new(s))
    }

    pub fn tag(&self) -> ValueTag {
        if self.is_number() {
            return ValueTag::Number;
        }
        match self.bits & TAG_MASK {
            TAG_NOTHING => ValueTag::Nothing,
            TAG_UNDEFINED => ValueTag::Undefined,
            TAG_NULL => ValueTag::Null,
            TAG_BOOLEAN => ValueTag::Boolean,
            TAG_STRING => ValueTag::String,
            _ => ValueTag::Object,
        }
    }

    #[inline]
    pub fn is_number(&self) -> bool {
        self.bits < TAG_NOTHING
    }

    pub fn is_nothing(&self) -> bool {
        self.bits == TAG_NOTHING
    }

    pub fn is_undefined(&self) -> bool {
        self.bits == TAG_UNDEFINED
    }

    pub fn is_null(&self) -> bool {
        self.bits == TAG_NULL
    }

    pub fn is_null_or_undefined(&self) -> bool {
        self.is_null() || self.is_undefined()
    }

    pub fn is_boolean(&self) -> bool {
        self.bits & TAG_MASK == TAG_BOOLEAN
    }

    pub fn is_string(&self) -> bool {
        self.bits & TAG_MASK == TAG_STRING
    }

    pub fn is_object(&self) -> bool {
        self.bits & TAG_MASK == TAG_OBJECT
    }

    pub fn is_primitive(&self) -> bool {
        !self.is_object()
    }

    pub fn as_boolean(&self) -> bool {
        debug_assert!(self.is_boolean());
        self.bits & 1 == 1
    }

    pub fn as_number(&self) -> f64 {
        debug_assert!(self.is_number());
        f64::from_bits(self.bits)
    }

    fn payload(&self) -> u64 {
        self.bits & PAYLOAD_MASK
    }

    pub fn as_string(&self) -> JsString {
        debug_assert!(self.is_string());
        let ptr = self.payload() as *const StringData;
        // SAFETY: the payload was produced by `JsString::into_raw` and this
        // value still owns a strong count, so adding one more is sound.
        unsafe {
            Rc::increment_strong_count(ptr);
            JsString::from_raw(ptr)
        }
    }

    pub fn as_object(&self) -> JsObjectType {
        debug_assert!(self.is_object());
        let ptr = self.payload() as *const RefCell<JsObject>;
        // SAFETY: see `as_string`.
        unsafe {
            Rc::increment_strong_count(ptr);
            Rc::from_raw(ptr)
        }
    }

    pub fn try_object(&self) -> Option<JsObjectType> {
        if self.is_object() {
            Some(self.as_object())
        } else {
            None
        }
    }

    pub fn try_string(&self) -> Option<JsString> {
        if self.is_string() {
            Some(self.as_string())
        } else {
            None
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self.tag() {
            ValueTag::Nothing => ValueKind::Nothing,
            ValueTag::Undefined => ValueKind::Undefined,
            ValueTag::Null => ValueKind::Null,
            ValueTag::Boolean => ValueKind::Boolean(self.as_boolean()),
            ValueTag::Number => ValueKind::Number(self.as_number()),
            ValueTag::String => ValueKind::String(self.as_string()),
            ValueTag::Object => ValueKind::Object(self.as_object()),
        }
    }

    /// Raw encoding, for diagnostics and bit-pattern tests.
    pub fn to_bits(&self) -> u64 {
        self.bits
    }

    /// Address of the object payload. The reference count is untouched.
    pub(crate) fn object_ptr(&self) -> Option<*const RefCell<JsObject>> {
        if self.is_object() {
            Some(self.payload() as *const RefCell<JsObject>)
        } else {
            None
        }
    }

    /// Object identity for object values, `false` otherwise.
    pub fn same_object(&self, other: &JsObjectType) -> bool {
        self.is_object() && self.payload() == (Rc::as_ptr(other) as u64 & PAYLOAD_MASK)
    }

    /// True for objects with a [[Call]] internal method.
    pub fn is_callable(&self) -> bool {
        self.is_object() && self.as_object().borrow().is_callable()
    }
}

impl Clone for JsValue {
    fn clone(&self) -> Self {
        match self.bits & TAG_MASK {
            TAG_STRING => {
                // SAFETY: payload holds a live `Rc<StringData>`.
                unsafe { Rc::increment_strong_count(self.payload() as *const StringData) }
            }
            TAG_OBJECT => {
                // SAFETY: payload holds a live `Rc<RefCell<JsObject>>`.
                unsafe { Rc::increment_strong_count(self.payload() as *const RefCell<JsObject>) }
            }
            _ => {}
        }
        JsValue::from_bits(self.bits)
    }
}

impl Drop for JsValue {
    fn drop(&mut self) {
        match self.bits & TAG_MASK {
            // SAFETY: each tagged pointer owns exactly one strong count.
            TAG_STRING => unsafe { Rc::decrement_strong_count(self.payload() as *const StringData) },
            TAG_OBJECT => unsafe {
                Rc::decrement_strong_count(self.payload() as *const RefCell<JsObject>)
            },
            _ => {}
        }
    }
}

/// Bit-pattern equality. Language-level equality lives in
/// `operations::test_and_comparison`.
impl PartialEq for JsValue {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl Eq for JsValue {}

impl Default for JsValue {
    fn default() -> Self {
        JsValue::undefined()
    }
}

impl fmt::Debug for JsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            ValueKind::Nothing => write!(f, "JsValue::Nothing"),
            ValueKind::Undefined => write!(f, "JsValue::Undefined"),
            ValueKind::Null => write!(f, "JsValue::Null"),
            ValueKind::Boolean(b) => write!(f, "JsValue::Boolean({})", b),
            ValueKind::Number(n) => write!(f, "JsValue::Number({:?})", n),
            ValueKind::String(s) => write!(f, "JsValue::String({:?})", s),
            ValueKind::Object(o) => {
                let class = o.try_borrow().map(|o| o.class).unwrap_or("...");
                write!(f, "JsValue::Object([object {}])", class)
            }
        }
    }
}

impl From<f64> for JsValue {
    fn from(n: f64) -> Self {
        JsValue::number(n)
    }
}

impl From<i32> for JsValue {
    fn from(n: i32) -> Self {
        JsValue::number(n as f64)
    }
}

impl From<u32> for JsValue {
    fn from(n: u32) -> Self {
        JsValue::number(n as f64)
    }
}

impl From<usize> for JsValue {
    fn from(n: usize) -> Self {
        JsValue::number(n as f64)
    }
}

impl From<bool> for JsValue {
    fn from(b: bool) -> Self {
        JsValue::boolean(b)
    }
}

impl From<JsString> for JsValue {
    fn from(s: JsString) -> Self {
        JsValue::string(s)
    }
}

impl From<&str> for JsValue {
    fn from(s: &str) -> Self {
        JsValue::str(s)
    }
}

impl From<JsObjectType> for JsValue {
    fn from(o: JsObjectType) -> Self {
        JsValue::object(o)
    }
}

impl From<Option<JsObjectType>> for JsValue {
    fn from(o: Option<JsObjectType>) -> Self {
        match o {
            Some(o) => JsValue::object(o),
            None => JsValue::null(),
        }
    }
}
