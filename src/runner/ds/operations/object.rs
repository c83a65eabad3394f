use crate::runner::ds::error::{JErrorType, Message};
use crate::runner::ds::function_object;
use crate::runner::ds::object::{self, JsObjectType};
use crate::runner::ds::object_property::{
    PropertyDescriptor, PropertyDescriptorSetter, PropertyKey,
};
use crate::runner::ds::operations::type_conversion::{to_boolean, to_object, to_uint32};
use crate::runner::ds::value::JsValue;
use crate::runner::types::EvalContext;

/// [[Get]] on any value; primitives are looked up through their wrapper's
/// prototype chain with the primitive itself as receiver.
pub fn get_v(ctx: &mut EvalContext, v: &JsValue, p: &PropertyKey) -> Result<JsValue, JErrorType> {
    match v.try_object() {
        Some(o) => object::get(ctx, &o, p),
        None => {
            let o = to_object(ctx, v)?;
            object::get_with_receiver(ctx, &o, p, v)
        }
    }
}

/// The callable at `v[p]`, or undefined when absent.
pub fn get_method(
    ctx: &mut EvalContext,
    v: &JsValue,
    p: &PropertyKey,
) -> Result<JsValue, JErrorType> {
    let f = get_v(ctx, v, p)?;
    if f.is_null_or_undefined() {
        Ok(JsValue::undefined())
    } else if f.is_callable() {
        Ok(f)
    } else {
        Err(Message::NotAFunctionNamed(p.to_string()).into())
    }
}

/// Calls the method `name` of `v` with `v` as this.
pub fn invoke(
    ctx: &mut EvalContext,
    v: &JsValue,
    name: &str,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let f = get_v(ctx, v, &PropertyKey::named(name))?;
    if !f.is_callable() {
        return Err(Message::NotAFunctionNamed(name.to_string()).into());
    }
    function_object::call_value(ctx, &f, v.clone(), args)
}

pub fn define_property_or_throw(
    ctx: &mut EvalContext,
    o: &JsObjectType,
    p: &PropertyKey,
    desc: PropertyDescriptorSetter,
) -> Result<(), JErrorType> {
    object::define_own_property(ctx, o, p, desc, true)?;
    Ok(())
}

/// Defines a fresh `(true, true, true)` data property, as object and array
/// literals and the built-ins that build arrays do.
pub fn create_data_property(
    ctx: &mut EvalContext,
    o: &JsObjectType,
    p: PropertyKey,
    v: JsValue,
) -> Result<bool, JErrorType> {
    object::define_own_property(
        ctx,
        o,
        &p,
        PropertyDescriptorSetter::new_data(v, true, true, true),
        false,
    )
}

fn optional_field(
    ctx: &mut EvalContext,
    o: &JsObjectType,
    name: &str,
) -> Result<Option<JsValue>, JErrorType> {
    let key = PropertyKey::named(name);
    if object::has_property(o, &key) {
        Ok(Some(object::get(ctx, o, &key)?))
    } else {
        Ok(None)
    }
}

/// ToPropertyDescriptor (8.10.5)
pub fn to_property_descriptor(
    ctx: &mut EvalContext,
    v: &JsValue,
) -> Result<PropertyDescriptorSetter, JErrorType> {
    let o = v
        .try_object()
        .ok_or_else(|| JErrorType::from(Message::NotAnObject))?;
    let mut desc = PropertyDescriptorSetter::new();
    if let Some(e) = optional_field(ctx, &o, "enumerable")? {
        desc.enumerable = Some(to_boolean(&e));
    }
    if let Some(c) = optional_field(ctx, &o, "configurable")? {
        desc.configurable = Some(to_boolean(&c));
    }
    if let Some(value) = optional_field(ctx, &o, "value")? {
        desc.value = Some(value);
    }
    if let Some(w) = optional_field(ctx, &o, "writable")? {
        desc.writable = Some(to_boolean(&w));
    }
    if let Some(get) = optional_field(ctx, &o, "get")? {
        if !get.is_undefined() && !get.is_callable() {
            return Err(Message::GetterNotCallable.into());
        }
        desc.get = Some(get);
    }
    if let Some(set) = optional_field(ctx, &o, "set")? {
        if !set.is_undefined() && !set.is_callable() {
            return Err(Message::SetterNotCallable.into());
        }
        desc.set = Some(set);
    }
    if desc.is_accessor_descriptor() && desc.is_data_descriptor() {
        return Err(Message::MixedDescriptor.into());
    }
    Ok(desc)
}

/// FromPropertyDescriptor (8.10.4)
pub fn from_property_descriptor(
    ctx: &mut EvalContext,
    desc: Option<PropertyDescriptor>,
) -> Result<JsValue, JErrorType> {
    let desc = match desc {
        None => return Ok(JsValue::undefined()),
        Some(desc) => desc,
    };
    let obj = ctx.new_object()?;
    {
        let mut o = obj.borrow_mut();
        match &desc {
            PropertyDescriptor::Data(d) => {
                o.define_value("value", d.value.clone(), true, true, true);
                o.define_value("writable", JsValue::from(d.writable), true, true, true);
            }
            PropertyDescriptor::Accessor(a) => {
                o.define_value("get", a.get.clone(), true, true, true);
                o.define_value("set", a.set.clone(), true, true, true);
            }
        }
        o.define_value("enumerable", JsValue::from(desc.is_enumerable()), true, true, true);
        o.define_value("configurable", JsValue::from(desc.is_configurable()), true, true, true);
    }
    Ok(JsValue::object(obj))
}

/// Reads `length` and the indexed elements of an array-like, for
/// `Function.prototype.apply`.
pub fn create_list_from_array_like(
    ctx: &mut EvalContext,
    v: &JsValue,
) -> Result<Vec<JsValue>, JErrorType> {
    if v.is_null_or_undefined() {
        return Ok(Vec::new());
    }
    let o = v
        .try_object()
        .ok_or_else(|| JErrorType::from(Message::NotAnObject))?;
    let len_value = object::get_named(ctx, &o, "length")?;
    let len = to_uint32(ctx, &len_value)?;
    let mut list = Vec::with_capacity(len.min(1 << 16) as usize);
    for i in 0..len {
        list.push(object::get(ctx, &o, &PropertyKey::from_u32(i))?);
    }
    Ok(list)
}

/// `ToUint32(o.length)`, the length of any array-like.
pub fn length_of_array_like(ctx: &mut EvalContext, o: &JsObjectType) -> Result<u32, JErrorType> {
    let len = object::get_named(ctx, o, "length")?;
    to_uint32(ctx, &len)
}
