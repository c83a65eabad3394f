use std::collections::HashMap;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::lex_env::JsLexEnvironmentType;
use crate::runner::ds::object::{ordinary_define_own_property, JsObject, JsObjectType, ObjectKind};
use crate::runner::ds::object_property::{
    PropertyDescriptor, PropertyDescriptorSetter, PropertyKey,
};
use crate::runner::ds::operations::lex_env::with_declarative;
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::string::JsString;
use crate::runner::ds::value::JsValue;
use crate::runner::types::EvalContext;

/// Internal state of an arguments object: indices still mapped to formal
/// parameter bindings of the function's variable environment.
pub struct ArgumentsData {
    pub env: JsLexEnvironmentType,
    mapped: HashMap<u32, JsString>,
}

impl ArgumentsData {
    pub fn new(env: JsLexEnvironmentType) -> Self {
        ArgumentsData {
            env,
            mapped: HashMap::new(),
        }
    }

    pub fn is_mapped(&self, index: u32) -> bool {
        self.mapped.contains_key(&index)
    }

    pub fn link(&mut self, index: u32, name: JsString) {
        self.mapped.insert(index, name);
    }

    pub fn unmap(&mut self, index: u32) {
        self.mapped.remove(&index);
    }

    fn mapped_name(&self, p: &PropertyKey) -> Option<&JsString> {
        self.mapped.get(&p.as_index()?)
    }

    fn read(&self, name: &JsString) -> Option<JsValue> {
        with_declarative(&self.env, |d| d.binding_value(name)).flatten()
    }

    fn write(&self, name: &JsString, value: JsValue) {
        with_declarative(&self.env, |d| d.store_binding_value(name, value));
    }
}

/// Creates the arguments object of an activation (10.6). Mapping of
/// indices to parameters is added afterwards with `link_parameter`.
pub fn new_arguments_object(
    ctx: &mut EvalContext,
    callee: &JsValue,
    args: &[JsValue],
    env: JsLexEnvironmentType,
    strict: bool,
) -> Result<JsObjectType, JErrorType> {
    ctx.heap.allocate()?;
    let proto = ctx.intrinsic(WellKnownIntrinsics::ObjectPrototype);
    let mut obj = JsObject::new(
        "Arguments",
        Some(proto),
        ObjectKind::Arguments(ArgumentsData::new(env)),
    );
    obj.define_value("length", JsValue::from(args.len()), true, false, true);
    for (i, arg) in args.iter().enumerate() {
        obj.define_value(PropertyKey::Index(i as u32), arg.clone(), true, true, true);
    }
    if strict {
        let thrower = JsValue::object(ctx.intrinsic(WellKnownIntrinsics::ThrowTypeError));
        for name in ["caller", "callee"] {
            obj.insert_property(
                PropertyKey::named(name),
                PropertyDescriptor::accessor(thrower.clone(), thrower.clone(), false, false),
            );
        }
    } else {
        obj.define_value("callee", callee.clone(), true, false, true);
    }
    Ok(obj.into_ref())
}

/// Maps index `i` to the binding `name`. Indices beyond the actual
/// arguments are never mapped.
pub fn link_parameter(o: &JsObjectType, i: u32, name: JsString) {
    let mut obj = o.borrow_mut();
    if obj.own_property(&PropertyKey::Index(i)).is_none() {
        return;
    }
    if let ObjectKind::Arguments(a) = &mut obj.kind {
        a.link(i, name);
    }
}

/// Arguments [[GetOwnProperty]]: mapped indices reflect the current value
/// of their parameter binding.
pub fn get_own_property(
    obj: &JsObject,
    a: &ArgumentsData,
    p: &PropertyKey,
) -> Option<PropertyDescriptor> {
    let mut desc = obj.own_property(p)?.clone();
    if let Some(name) = a.mapped_name(p) {
        if let (PropertyDescriptor::Data(d), Some(v)) = (&mut desc, a.read(name)) {
            d.value = v;
        }
    }
    Some(desc)
}

/// Arguments [[DefineOwnProperty]]
pub fn define_own_property(
    o: &JsObjectType,
    p: &PropertyKey,
    desc: PropertyDescriptorSetter,
    throw: bool,
) -> Result<bool, JErrorType> {
    let mapped = match &o.borrow().kind {
        ObjectKind::Arguments(a) => a.mapped_name(p).cloned(),
        _ => None,
    };
    if !ordinary_define_own_property(o, p, &desc, throw)? {
        return Ok(false);
    }
    if let Some(name) = mapped {
        let mut obj = o.borrow_mut();
        if let ObjectKind::Arguments(a) = &mut obj.kind {
            if desc.is_accessor_descriptor() {
                a.unmap(p.as_index().unwrap_or_default());
            } else {
                if let Some(v) = &desc.value {
                    a.write(&name, v.clone());
                }
                if desc.writable == Some(false) {
                    a.unmap(p.as_index().unwrap_or_default());
                }
            }
        }
    }
    Ok(true)
}
