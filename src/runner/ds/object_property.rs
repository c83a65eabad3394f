use std::fmt;

use crate::runner::ds::string::JsString;
use crate::runner::ds::value::JsValue;

const RAW_STRING_FLAG: u64 = 1 << 32;

/// Property name. Canonical array indices (`0 ..= 2^32 - 2`) are always
/// stored as `Index`, so a key has exactly one representation.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    Index(u32),
    Str(JsString),
}

impl PropertyKey {
    pub fn from_js_string(s: JsString) -> Self {
        match parse_array_index(s.units()) {
            Some(i) => PropertyKey::Index(i),
            None => PropertyKey::Str(s),
        }
    }

    pub fn from_u32(i: u32) -> Self {
        if i == u32::MAX {
            PropertyKey::Str(JsString::new("4294967295"))
        } else {
            PropertyKey::Index(i)
        }
    }

    /// Interned key for a name known at compile time.
    pub fn named(s: &str) -> Self {
        PropertyKey::from_js_string(JsString::intern(s))
    }

    pub fn is_index(&self) -> bool {
        matches!(self, PropertyKey::Index(_))
    }

    pub fn as_index(&self) -> Option<u32> {
        match self {
            PropertyKey::Index(i) => Some(*i),
            PropertyKey::Str(_) => None,
        }
    }

    pub fn as_string(&self) -> JsString {
        match self {
            PropertyKey::Index(i) => JsString::new(&i.to_string()),
            PropertyKey::Str(s) => s.clone(),
        }
    }

    pub fn is_named(&self, name: &str) -> bool {
        match self {
            PropertyKey::Str(s) => s.units().iter().copied().eq(name.encode_utf16()),
            PropertyKey::Index(_) => false,
        }
    }

    /// Compact id used by emitted code: indices map to themselves, names to
    /// their intern id with bit 32 set.
    pub fn to_raw(&self) -> u64 {
        match self {
            PropertyKey::Index(i) => *i as u64,
            PropertyKey::Str(s) => RAW_STRING_FLAG | s.intern_id_or_insert() as u64,
        }
    }

    pub fn from_raw(raw: u64) -> Option<Self> {
        if raw & RAW_STRING_FLAG == 0 {
            Some(PropertyKey::from_u32(raw as u32))
        } else {
            JsString::from_intern_id(raw as u32).map(PropertyKey::Str)
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::Index(i) => write!(f, "{}", i),
            PropertyKey::Str(s) => write!(f, "{}", s),
        }
    }
}

impl fmt::Debug for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::Index(i) => write!(f, "PropertyKey::Index({})", i),
            PropertyKey::Str(s) => write!(f, "PropertyKey::Str({:?})", s),
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(s: &str) -> Self {
        PropertyKey::from_js_string(JsString::new(s))
    }
}

impl From<u32> for PropertyKey {
    fn from(i: u32) -> Self {
        PropertyKey::from_u32(i)
    }
}

impl From<JsString> for PropertyKey {
    fn from(s: JsString) -> Self {
        PropertyKey::from_js_string(s)
    }
}

fn parse_array_index(units: &[u16]) -> Option<u32> {
    if units.is_empty() || units.len() > 10 {
        return None;
    }
    if units.len() > 1 && units[0] == b'0' as u16 {
        return None;
    }
    let mut n: u64 = 0;
    for &c in units {
        if !(b'0' as u16..=b'9' as u16).contains(&c) {
            return None;
        }
        n = n * 10 + (c - b'0' as u16) as u64;
    }
    if n < u32::MAX as u64 {
        Some(n as u32)
    } else {
        None
    }
}

#[derive(Clone, Debug)]
pub struct PropertyDescriptorData {
    pub value: JsValue,
    pub writable: bool,
    pub enumerable: bool,
    pub configurable: bool,
}

/// `get`/`set` hold a callable or `undefined`.
#[derive(Clone, Debug)]
pub struct PropertyDescriptorAccessor {
    pub get: JsValue,
    pub set: JsValue,
    pub enumerable: bool,
    pub configurable: bool,
}

/// A stored property: every field present.
#[derive(Clone, Debug)]
pub enum PropertyDescriptor {
    Data(PropertyDescriptorData),
    Accessor(PropertyDescriptorAccessor),
}

impl PropertyDescriptor {
    pub fn data(value: JsValue, writable: bool, enumerable: bool, configurable: bool) -> Self {
        PropertyDescriptor::Data(PropertyDescriptorData {
            value,
            writable,
            enumerable,
            configurable,
        })
    }

    pub fn accessor(get: JsValue, set: JsValue, enumerable: bool, configurable: bool) -> Self {
        PropertyDescriptor::Accessor(PropertyDescriptorAccessor {
            get,
            set,
            enumerable,
            configurable,
        })
    }

    /// Fills every absent field with its default (`undefined` / `false`).
    pub fn new_from_property_descriptor_setter(desc: &PropertyDescriptorSetter) -> Self {
        let enumerable = desc.enumerable.unwrap_or(false);
        let configurable = desc.configurable.unwrap_or(false);
        if desc.is_accessor_descriptor() {
            PropertyDescriptor::accessor(
                desc.get.clone().unwrap_or_default(),
                desc.set.clone().unwrap_or_default(),
                enumerable,
                configurable,
            )
        } else {
            PropertyDescriptor::data(
                desc.value.clone().unwrap_or_default(),
                desc.writable.unwrap_or(false),
                enumerable,
                configurable,
            )
        }
    }

    pub fn is_enumerable(&self) -> bool {
        match self {
            PropertyDescriptor::Data(d) => d.enumerable,
            PropertyDescriptor::Accessor(a) => a.enumerable,
        }
    }

    pub fn is_configurable(&self) -> bool {
        match self {
            PropertyDescriptor::Data(d) => d.configurable,
            PropertyDescriptor::Accessor(a) => a.configurable,
        }
    }

    pub fn is_data_descriptor(&self) -> bool {
        matches!(self, PropertyDescriptor::Data(_))
    }

    pub fn is_accessor_descriptor(&self) -> bool {
        matches!(self, PropertyDescriptor::Accessor(_))
    }

    pub fn is_writable(&self) -> bool {
        match self {
            PropertyDescriptor::Data(d) => d.writable,
            PropertyDescriptor::Accessor(_) => false,
        }
    }

    pub(crate) fn set_enumerable(&mut self, v: bool) {
        match self {
            PropertyDescriptor::Data(d) => d.enumerable = v,
            PropertyDescriptor::Accessor(a) => a.enumerable = v,
        }
    }

    pub(crate) fn set_configurable(&mut self, v: bool) {
        match self {
            PropertyDescriptor::Data(d) => d.configurable = v,
            PropertyDescriptor::Accessor(a) => a.configurable = v,
        }
    }
}

/// A descriptor as passed to [[DefineOwnProperty]]: each field may be absent.
#[derive(Clone, Debug, Default)]
pub struct PropertyDescriptorSetter {
    pub value: Option<JsValue>,
    pub writable: Option<bool>,
    pub get: Option<JsValue>,
    pub set: Option<JsValue>,
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
}

impl PropertyDescriptorSetter {
    pub fn new() -> Self {
        PropertyDescriptorSetter::default()
    }

    pub fn new_data(value: JsValue, writable: bool, enumerable: bool, configurable: bool) -> Self {
        PropertyDescriptorSetter {
            value: Some(value),
            writable: Some(writable),
            enumerable: Some(enumerable),
            configurable: Some(configurable),
            ..Default::default()
        }
    }

    pub fn new_accessor(get: JsValue, set: JsValue, enumerable: bool, configurable: bool) -> Self {
        PropertyDescriptorSetter {
            get: Some(get),
            set: Some(set),
            enumerable: Some(enumerable),
            configurable: Some(configurable),
            ..Default::default()
        }
    }

    pub fn new_from_property_descriptor(desc: &PropertyDescriptor) -> Self {
        match desc {
            PropertyDescriptor::Data(d) => PropertyDescriptorSetter::new_data(
                d.value.clone(),
                d.writable,
                d.enumerable,
                d.configurable,
            ),
            PropertyDescriptor::Accessor(a) => PropertyDescriptorSetter::new_accessor(
                a.get.clone(),
                a.set.clone(),
                a.enumerable,
                a.configurable,
            ),
        }
    }

    pub fn with_value(mut self, value: JsValue) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_writable(mut self, writable: bool) -> Self {
        self.writable = Some(writable);
        self
    }

    pub fn with_get(mut self, get: JsValue) -> Self {
        self.get = Some(get);
        self
    }

    pub fn with_set(mut self, set: JsValue) -> Self {
        self.set = Some(set);
        self
    }

    pub fn with_enumerable(mut self, enumerable: bool) -> Self {
        self.enumerable = Some(enumerable);
        self
    }

    pub fn with_configurable(mut self, configurable: bool) -> Self {
        self.configurable = Some(configurable);
        self
    }

    pub fn is_accessor_descriptor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    pub fn is_generic_descriptor(&self) -> bool {
        !self.is_accessor_descriptor() && !self.is_data_descriptor()
    }

    pub fn is_empty(&self) -> bool {
        self.is_generic_descriptor() && self.enumerable.is_none() && self.configurable.is_none()
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn has_writable(&self) -> bool {
        self.writable.is_some()
    }

    pub fn has_get(&self) -> bool {
        self.get.is_some()
    }

    pub fn has_set(&self) -> bool {
        self.set.is_some()
    }

    pub fn has_enumerable(&self) -> bool {
        self.enumerable.is_some()
    }

    pub fn has_configurable(&self) -> bool {
        self.configurable.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_indices() {
        assert_eq!(PropertyKey::from("0"), PropertyKey::Index(0));
        assert_eq!(PropertyKey::from("4294967294"), PropertyKey::Index(4294967294));
        assert!(!PropertyKey::from("4294967295").is_index());
        assert!(!PropertyKey::from("01").is_index());
        assert!(!PropertyKey::from("-1").is_index());
        assert!(!PropertyKey::from("1.0").is_index());
        assert!(!PropertyKey::from("").is_index());
        assert_eq!(PropertyKey::from_u32(u32::MAX), PropertyKey::from("4294967295"));
    }

    #[test]
    fn test_key_to_string_is_total() {
        assert_eq!(PropertyKey::Index(42).as_string().to_utf8(), "42");
        assert_eq!(PropertyKey::from("abc").to_string(), "abc");
        assert_eq!(PropertyKey::Index(7).as_index(), Some(7));
        assert_eq!(PropertyKey::from("x").as_index(), None);
    }

    #[test]
    fn test_raw_keys() {
        let k = PropertyKey::named("length");
        assert_eq!(PropertyKey::from_raw(k.to_raw()), Some(k));
        assert_eq!(PropertyKey::from_raw(12), Some(PropertyKey::Index(12)));
    }

    #[test]
    fn test_descriptor_shapes() {
        let generic = PropertyDescriptorSetter::new().with_enumerable(true);
        assert!(generic.is_generic_descriptor());
        assert!(!generic.is_empty());
        let data = PropertyDescriptorSetter::new().with_value(JsValue::number(1.0));
        assert!(data.is_data_descriptor());
        let full = PropertyDescriptor::new_from_property_descriptor_setter(&data);
        assert!(!full.is_writable());
        assert!(!full.is_enumerable());
        assert!(!full.is_configurable());
        let acc = PropertyDescriptorSetter::new().with_get(JsValue::undefined());
        assert!(acc.is_accessor_descriptor());
        assert!(PropertyDescriptor::new_from_property_descriptor_setter(&acc)
            .is_accessor_descriptor());
    }
}
