//! Object built-in.
//!
//! The `Object` constructor, its reflection functions (15.2.3) and the
//! methods of `Object.prototype` (15.2.4).

use crate::runner::ds::error::{JErrorType, Message};
use crate::runner::ds::object::{self, JsObjectType};
use crate::runner::ds::object_property::{PropertyDescriptor, PropertyDescriptorSetter, PropertyKey};
use crate::runner::ds::operations::object::{
    from_property_descriptor, invoke, to_property_descriptor,
};
use crate::runner::ds::operations::type_conversion::{to_object, to_property_key};
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::value::JsValue;
use crate::runner::types::{arg, BuiltInObject, EvalContext};

/// Register the Object constructor and populate `Object.prototype`.
pub fn register(ctx: &mut EvalContext) -> Result<(), JErrorType> {
    BuiltInObject::new("Object")
        .with_prototype(WellKnownIntrinsics::ObjectPrototype)
        .with_constructor(object_constructor, 1)
        .add_static_method("getPrototypeOf", object_get_prototype_of, 1)
        .add_static_method("getOwnPropertyDescriptor", object_get_own_property_descriptor, 2)
        .add_static_method("getOwnPropertyNames", object_get_own_property_names, 1)
        .add_static_method("create", object_create, 2)
        .add_static_method("defineProperty", object_define_property, 3)
        .add_static_method("defineProperties", object_define_properties, 2)
        .add_static_method("seal", object_seal, 1)
        .add_static_method("freeze", object_freeze, 1)
        .add_static_method("preventExtensions", object_prevent_extensions, 1)
        .add_static_method("isSealed", object_is_sealed, 1)
        .add_static_method("isFrozen", object_is_frozen, 1)
        .add_static_method("isExtensible", object_is_extensible, 1)
        .add_static_method("keys", object_keys, 1)
        .add_method("toString", object_proto_to_string, 0)
        .add_method("toLocaleString", object_proto_to_locale_string, 0)
        .add_method("valueOf", object_proto_value_of, 0)
        .add_method("hasOwnProperty", object_proto_has_own_property, 1)
        .add_method("isPrototypeOf", object_proto_is_prototype_of, 1)
        .add_method("propertyIsEnumerable", object_proto_property_is_enumerable, 1)
        .register(ctx)?;
    Ok(())
}

fn require_object(v: &JsValue) -> Result<JsObjectType, JErrorType> {
    v.try_object()
        .ok_or_else(|| JErrorType::from(Message::NotAnObject))
}

/// Object(value) and new Object(value)
fn object_constructor(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let value = arg(&args, 0);
    if value.is_null_or_undefined() {
        return Ok(JsValue::object(ctx.new_object()?));
    }
    Ok(JsValue::object(to_object(ctx, &value)?))
}

/// Object.getPrototypeOf
fn object_get_prototype_of(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = require_object(&arg(&args, 0))?;
    Ok(object::get_prototype_of(&o).map_or(JsValue::null(), JsValue::object))
}

/// Object.getOwnPropertyDescriptor
fn object_get_own_property_descriptor(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = require_object(&arg(&args, 0))?;
    let key = to_property_key(ctx, &arg(&args, 1))?;
    let desc = object::get_own_property(&o, &key);
    from_property_descriptor(ctx, desc)
}

/// Object.getOwnPropertyNames
fn object_get_own_property_names(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = require_object(&arg(&args, 0))?;
    let names = object::own_property_keys(&o)
        .into_iter()
        .map(|k| JsValue::string(k.as_string()))
        .collect();
    Ok(JsValue::object(ctx.new_array(names)?))
}

/// Defines every own enumerable property of `properties` on `o` (15.2.3.7).
/// All descriptors are converted before any is applied.
fn define_properties(
    ctx: &mut EvalContext,
    o: &JsObjectType,
    properties: &JsValue,
) -> Result<(), JErrorType> {
    let props = to_object(ctx, properties)?;
    let mut descriptors = Vec::new();
    for key in object::own_enumerable_keys(&props) {
        let desc_obj = object::get(ctx, &props, &key)?;
        descriptors.push((key, to_property_descriptor(ctx, &desc_obj)?));
    }
    for (key, desc) in descriptors {
        object::define_own_property(ctx, o, &key, desc, true)?;
    }
    Ok(())
}

/// Object.create
fn object_create(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let proto = arg(&args, 0);
    let prototype = match proto.try_object() {
        Some(p) => Some(p),
        None if proto.is_null() => None,
        None => return Err(Message::NotAnObject.into()),
    };
    let o = ctx.new_object_with_prototype(prototype)?;
    let properties = arg(&args, 1);
    if !properties.is_undefined() {
        define_properties(ctx, &o, &properties)?;
    }
    Ok(JsValue::object(o))
}

/// Object.defineProperty
fn object_define_property(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let target = arg(&args, 0);
    let o = require_object(&target)?;
    let key = to_property_key(ctx, &arg(&args, 1))?;
    let desc = to_property_descriptor(ctx, &arg(&args, 2))?;
    object::define_own_property(ctx, &o, &key, desc, true)?;
    Ok(target)
}

/// Object.defineProperties
fn object_define_properties(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let target = arg(&args, 0);
    let o = require_object(&target)?;
    define_properties(ctx, &o, &arg(&args, 1))?;
    Ok(target)
}

/// Tightens every own property of `o` and makes it non-extensible.
fn restrict(ctx: &mut EvalContext, o: &JsObjectType, freeze: bool) -> Result<(), JErrorType> {
    for key in object::own_property_keys(o) {
        let current = match object::get_own_property(o, &key) {
            Some(desc) => desc,
            None => continue,
        };
        let mut desc = PropertyDescriptorSetter::new().with_configurable(false);
        if freeze && current.is_data_descriptor() {
            desc = desc.with_writable(false);
        }
        object::define_own_property(ctx, o, &key, desc, true)?;
    }
    o.borrow_mut().extensible = false;
    Ok(())
}

/// Object.seal
fn object_seal(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let target = arg(&args, 0);
    restrict(ctx, &require_object(&target)?, false)?;
    Ok(target)
}

/// Object.freeze
fn object_freeze(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let target = arg(&args, 0);
    restrict(ctx, &require_object(&target)?, true)?;
    Ok(target)
}

/// Object.preventExtensions
fn object_prevent_extensions(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let target = arg(&args, 0);
    require_object(&target)?.borrow_mut().extensible = false;
    Ok(target)
}

fn test_integrity(o: &JsObjectType, frozen: bool) -> bool {
    if o.borrow().extensible {
        return false;
    }
    object::own_property_keys(o).iter().all(|key| {
        match object::get_own_property(o, key) {
            Some(PropertyDescriptor::Data(d)) => !d.configurable && !(frozen && d.writable),
            Some(desc) => !desc.is_configurable(),
            None => true,
        }
    })
}

/// Object.isSealed
fn object_is_sealed(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = require_object(&arg(&args, 0))?;
    Ok(JsValue::from(test_integrity(&o, false)))
}

/// Object.isFrozen
fn object_is_frozen(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = require_object(&arg(&args, 0))?;
    Ok(JsValue::from(test_integrity(&o, true)))
}

/// Object.isExtensible
fn object_is_extensible(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = require_object(&arg(&args, 0))?;
    let extensible = o.borrow().extensible;
    Ok(JsValue::from(extensible))
}

/// Object.keys
fn object_keys(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = require_object(&arg(&args, 0))?;
    let names = object::own_enumerable_keys(&o)
        .into_iter()
        .map(|k| JsValue::string(k.as_string()))
        .collect();
    Ok(JsValue::object(ctx.new_array(names)?))
}

/// Object.prototype.toString
fn object_proto_to_string(
    ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let class = if this.is_undefined() {
        "Undefined"
    } else if this.is_null() {
        "Null"
    } else {
        let o = to_object(ctx, &this)?;
        let class = o.borrow().class;
        class
    };
    Ok(JsValue::string(format!("[object {}]", class).as_str().into()))
}

/// Object.prototype.toLocaleString
fn object_proto_to_locale_string(
    ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = JsValue::object(to_object(ctx, &this)?);
    invoke(ctx, &o, "toString", Vec::new())
}

/// Object.prototype.valueOf
fn object_proto_value_of(
    ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::object(to_object(ctx, &this)?))
}

/// Object.prototype.hasOwnProperty
fn object_proto_has_own_property(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let key = to_property_key(ctx, &arg(&args, 0))?;
    let o = to_object(ctx, &this)?;
    Ok(JsValue::from(object::has_own_property(&o, &key)))
}

/// Object.prototype.isPrototypeOf
fn object_proto_is_prototype_of(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let v = match arg(&args, 0).try_object() {
        Some(v) => v,
        None => return Ok(JsValue::from(false)),
    };
    let o = to_object(ctx, &this)?;
    Ok(JsValue::from(object::is_prototype_of(&o, &v)))
}

/// Object.prototype.propertyIsEnumerable
fn object_proto_property_is_enumerable(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let key: PropertyKey = to_property_key(ctx, &arg(&args, 0))?;
    let o = to_object(ctx, &this)?;
    let enumerable = object::get_own_property(&o, &key).map_or(false, |d| d.is_enumerable());
    Ok(JsValue::from(enumerable))
}
