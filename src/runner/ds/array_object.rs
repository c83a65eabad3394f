use crate::runner::ds::error::{JErrorType, Message};
use crate::runner::ds::object::{
    delete, ordinary_define_own_property, JsObject, JsObjectType, ObjectKind,
};
use crate::runner::ds::object_property::{PropertyDescriptor, PropertyDescriptorSetter, PropertyKey};
use crate::runner::ds::operations::type_conversion::{to_number, to_uint32};
use crate::runner::ds::value::JsValue;
use crate::runner::types::EvalContext;

pub fn length_key() -> PropertyKey {
    PropertyKey::named("length")
}

/// A fresh array with the given prototype and elements; `length` is
/// writable, non-enumerable and non-configurable.
pub fn new_array_object(prototype: JsObjectType, items: Vec<JsValue>) -> JsObjectType {
    let mut obj = JsObject::new("Array", Some(prototype), ObjectKind::Array);
    let len = items.len() as u32;
    for (i, item) in items.into_iter().enumerate() {
        obj.define_value(PropertyKey::Index(i as u32), item, true, true, true);
    }
    obj.define_value(length_key(), JsValue::from(len), true, false, false);
    obj.into_ref()
}

fn get_own_length_property(o: &JsObjectType) -> (u32, bool) {
    match o.borrow().own_property(&length_key()) {
        Some(PropertyDescriptor::Data(d)) => (d.value.as_number() as u32, d.writable),
        _ => (0, false),
    }
}

pub fn array_length(o: &JsObjectType) -> u32 {
    get_own_length_property(o).0
}

fn reject(throw: bool, message: Message) -> Result<bool, JErrorType> {
    if throw {
        Err(message.into())
    } else {
        Ok(false)
    }
}

/// Array [[DefineOwnProperty]]: keeps `length` above every index and
/// truncates when `length` shrinks.
pub fn define_own_property(
    ctx: &mut EvalContext,
    o: &JsObjectType,
    p: &PropertyKey,
    desc: PropertyDescriptorSetter,
    throw: bool,
) -> Result<bool, JErrorType> {
    let length_prop = length_key();
    let (old_len, old_len_writable) = get_own_length_property(o);
    if *p == length_prop {
        let value = match &desc.value {
            None => return ordinary_define_own_property(o, p, &desc, throw),
            Some(v) => v.clone(),
        };
        let new_len = to_uint32(ctx, &value)?;
        let number = to_number(ctx, &value)?;
        if new_len as f64 != number {
            return Err(Message::InvalidArrayLength(format!("{}", number)).into());
        }
        let mut new_len_desc = desc.clone();
        new_len_desc.value = Some(JsValue::from(new_len));
        if new_len >= old_len {
            return ordinary_define_own_property(o, p, &new_len_desc, throw);
        }
        if !old_len_writable {
            return reject(throw, Message::CannotRedefine(length_prop.to_string()));
        }
        let new_writable = if new_len_desc.writable == Some(false) {
            new_len_desc.writable = Some(true);
            false
        } else {
            true
        };
        if !ordinary_define_own_property(o, p, &new_len_desc, throw)? {
            return Ok(false);
        }
        let mut doomed: Vec<u32> = o
            .borrow()
            .property_keys()
            .filter_map(|k| k.as_index())
            .filter(|&i| i >= new_len)
            .collect();
        doomed.sort_unstable_by(|a, b| b.cmp(a));
        for index in doomed {
            if !delete(o, &PropertyKey::Index(index), false)? {
                new_len_desc.value = Some(JsValue::from(index + 1));
                if !new_writable {
                    new_len_desc.writable = Some(false);
                }
                ordinary_define_own_property(o, p, &new_len_desc, false)?;
                return reject(throw, Message::CannotDelete(index.to_string()));
            }
        }
        if !new_writable {
            let frozen = PropertyDescriptorSetter::new().with_writable(false);
            ordinary_define_own_property(o, p, &frozen, false)?;
        }
        return Ok(true);
    }
    if let Some(index) = p.as_index() {
        if index >= old_len && !old_len_writable {
            return reject(throw, Message::CannotPut(index.to_string()));
        }
        if !ordinary_define_own_property(o, p, &desc, false)? {
            return reject(throw, Message::CannotRedefine(index.to_string()));
        }
        if index >= old_len {
            let grown = PropertyDescriptorSetter::new().with_value(JsValue::from(index + 1));
            ordinary_define_own_property(o, &length_prop, &grown, false)?;
        }
        return Ok(true);
    }
    ordinary_define_own_property(o, p, &desc, throw)
}
