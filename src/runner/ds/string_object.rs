use crate::runner::ds::object::{JsObject, JsObjectType, ObjectKind};
use crate::runner::ds::object_property::{PropertyDescriptor, PropertyKey};
use crate::runner::ds::string::JsString;
use crate::runner::ds::value::JsValue;

pub fn new_string_object(prototype: JsObjectType, s: JsString) -> JsObjectType {
    let len = s.len() as u32;
    let mut obj = JsObject::new("String", Some(prototype), ObjectKind::String(s));
    obj.define_value(PropertyKey::named("length"), JsValue::from(len), false, false, false);
    obj.into_ref()
}

/// String wrapper [[GetOwnProperty]]: indices inside the string resolve to
/// read-only, enumerable one-unit strings.
pub fn get_own_property(
    obj: &JsObject,
    s: &JsString,
    p: &PropertyKey,
) -> Option<PropertyDescriptor> {
    if let Some(desc) = obj.own_property(p) {
        return Some(desc.clone());
    }
    let index = p.as_index()? as usize;
    if index >= s.len() {
        return None;
    }
    Some(PropertyDescriptor::data(
        JsValue::string(s.substr(index, 1)),
        false,
        true,
        false,
    ))
}
