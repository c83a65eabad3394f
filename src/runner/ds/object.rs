use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::runner::ds::arguments_object::{self, ArgumentsData};
use crate::runner::ds::array_object;
use crate::runner::ds::error::{JErrorType, Message};
use crate::runner::ds::function_object::{self, BoundFunctionData, FunctionCode, FunctionData};
use crate::runner::ds::heap::{self, HeapRef};
use crate::runner::ds::object_property::{
    PropertyDescriptor, PropertyDescriptorSetter, PropertyKey,
};
use crate::runner::ds::operations::test_and_comparison::same_value;
use crate::runner::ds::operations::type_conversion::PreferredType;
use crate::runner::ds::regexp_object::RegExpData;
use crate::runner::ds::string::JsString;
use crate::runner::ds::string_object;
use crate::runner::ds::value::JsValue;
use crate::runner::types::EvalContext;

pub type JsObjectType = Rc<RefCell<JsObject>>;

/// Everything [`JsObject::sever`] took out of an object.
pub(crate) type SeveredObject = (
    Option<JsObjectType>,
    IndexMap<PropertyKey, PropertyDescriptor>,
    ObjectKind,
);

/// Per-kind internal state. Only a handful of internal methods differ by
/// kind; they dispatch on this enum.
pub enum ObjectKind {
    Ordinary,
    Array,
    Function(FunctionData),
    BoundFunction(BoundFunctionData),
    Arguments(ArgumentsData),
    String(JsString),
    Number(f64),
    Boolean(bool),
    Date(f64),
    RegExp(RegExpData),
    Error,
}

pub struct JsObject {
    pub class: &'static str,
    pub prototype: Option<JsObjectType>,
    pub extensible: bool,
    properties: IndexMap<PropertyKey, PropertyDescriptor>,
    pub kind: ObjectKind,
}

impl JsObject {
    pub fn new(class: &'static str, prototype: Option<JsObjectType>, kind: ObjectKind) -> Self {
        heap::track_object();
        JsObject {
            class,
            prototype,
            extensible: true,
            properties: IndexMap::new(),
            kind,
        }
    }

    pub fn ordinary(prototype: Option<JsObjectType>) -> Self {
        JsObject::new("Object", prototype, ObjectKind::Ordinary)
    }

    pub fn into_ref(self) -> JsObjectType {
        let o = Rc::new(RefCell::new(self));
        heap::register_object(&o);
        o
    }

    /// Pushes every heap node this object holds a strong reference to.
    pub(crate) fn trace(&self, out: &mut Vec<HeapRef>) {
        if let Some(p) = &self.prototype {
            out.push(HeapRef::object(p));
        }
        for desc in self.properties.values() {
            match desc {
                PropertyDescriptor::Data(d) => out.extend(HeapRef::value(&d.value)),
                PropertyDescriptor::Accessor(a) => {
                    out.extend(HeapRef::value(&a.get));
                    out.extend(HeapRef::value(&a.set));
                }
            }
        }
        match &self.kind {
            ObjectKind::Function(f) => {
                if let FunctionCode::Compiled { scope, .. } = &f.code {
                    out.push(HeapRef::environment(scope));
                }
            }
            ObjectKind::BoundFunction(b) => {
                out.push(HeapRef::object(&b.target));
                out.extend(HeapRef::value(&b.bound_this));
                out.extend(b.bound_args.iter().filter_map(HeapRef::value));
            }
            ObjectKind::Arguments(a) => out.push(HeapRef::environment(&a.env)),
            _ => {}
        }
    }

    /// Takes out every reference this object holds, leaving an empty
    /// ordinary object. The caller drops the result outside any borrow.
    pub(crate) fn sever(&mut self) -> SeveredObject {
        (
            self.prototype.take(),
            std::mem::take(&mut self.properties),
            std::mem::replace(&mut self.kind, ObjectKind::Ordinary),
        )
    }

    pub fn is_callable(&self) -> bool {
        matches!(
            self.kind,
            ObjectKind::Function(_) | ObjectKind::BoundFunction(_)
        )
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, ObjectKind::Array)
    }

    /// Own property as stored, without kind-specific synthesis.
    pub fn own_property(&self, key: &PropertyKey) -> Option<&PropertyDescriptor> {
        self.properties.get(key)
    }

    pub fn own_property_mut(&mut self, key: &PropertyKey) -> Option<&mut PropertyDescriptor> {
        self.properties.get_mut(key)
    }

    /// Inserts or replaces; a replaced key keeps its position.
    pub fn insert_property(&mut self, key: PropertyKey, desc: PropertyDescriptor) {
        self.properties.insert(key, desc);
    }

    pub fn remove_property(&mut self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        self.properties.shift_remove(key)
    }

    /// Shorthand used while populating built-ins.
    pub fn define_value(
        &mut self,
        key: impl Into<PropertyKey>,
        value: JsValue,
        writable: bool,
        enumerable: bool,
        configurable: bool,
    ) {
        self.insert_property(
            key.into(),
            PropertyDescriptor::data(value, writable, enumerable, configurable),
        );
    }

    pub fn property_keys(&self) -> impl Iterator<Item = &PropertyKey> {
        self.properties.keys()
    }

    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    pub fn properties_mut(&mut self) -> impl Iterator<Item = (&PropertyKey, &mut PropertyDescriptor)> {
        self.properties.iter_mut()
    }

    pub fn data_value(&self, key: &PropertyKey) -> Option<JsValue> {
        match self.properties.get(key) {
            Some(PropertyDescriptor::Data(d)) => Some(d.value.clone()),
            _ => None,
        }
    }
}

impl Drop for JsObject {
    fn drop(&mut self) {
        heap::untrack_object();
    }
}

fn property_name(p: &PropertyKey) -> String {
    p.to_string()
}

fn reject<T: Default>(throw: bool, message: Message) -> Result<T, JErrorType> {
    if throw {
        Err(message.into())
    } else {
        Ok(T::default())
    }
}

pub fn get_prototype_of(o: &JsObjectType) -> Option<JsObjectType> {
    o.borrow().prototype.clone()
}

/// Returns false if `prototype` would close a cycle or `o` is not extensible.
pub fn set_prototype_of(o: &JsObjectType, prototype: Option<JsObjectType>) -> bool {
    let current = o.borrow().prototype.clone();
    match (&current, &prototype) {
        (None, None) => return true,
        (Some(c), Some(p)) if Rc::ptr_eq(c, p) => return true,
        _ => {}
    }
    if !o.borrow().extensible {
        return false;
    }
    let mut p = prototype.clone();
    while let Some(some_p) = p {
        if Rc::ptr_eq(&some_p, o) {
            // To prevent circular chain
            return false;
        }
        p = some_p.borrow().prototype.clone();
    }
    o.borrow_mut().prototype = prototype;
    true
}

/// [[GetOwnProperty]]
pub fn get_own_property(o: &JsObjectType, p: &PropertyKey) -> Option<PropertyDescriptor> {
    let obj = o.borrow();
    match &obj.kind {
        ObjectKind::String(s) => string_object::get_own_property(&obj, s, p),
        ObjectKind::Arguments(a) => arguments_object::get_own_property(&obj, a, p),
        _ => obj.own_property(p).cloned(),
    }
}

/// [[GetProperty]]
pub fn get_property(o: &JsObjectType, p: &PropertyKey) -> Option<PropertyDescriptor> {
    let mut current = Some(o.clone());
    while let Some(obj) = current {
        if let Some(desc) = get_own_property(&obj, p) {
            return Some(desc);
        }
        current = obj.borrow().prototype.clone();
    }
    None
}

/// [[Get]]
pub fn get(ctx: &mut EvalContext, o: &JsObjectType, p: &PropertyKey) -> Result<JsValue, JErrorType> {
    let v = get_with_receiver(ctx, o, p, &JsValue::object(o.clone()))?;
    let checks_caller = {
        let obj = o.borrow();
        obj.is_callable() || matches!(obj.kind, ObjectKind::Arguments(_))
    };
    if checks_caller && p.is_named("caller") && function_object::is_strict_function(&v) {
        return Err(Message::StrictCaller.into());
    }
    Ok(v)
}

/// [[Get]] with an explicit receiver for accessor calls. Primitive bases use
/// their wrapper's prototype chain but keep the primitive as `this`.
pub fn get_with_receiver(
    ctx: &mut EvalContext,
    o: &JsObjectType,
    p: &PropertyKey,
    receiver: &JsValue,
) -> Result<JsValue, JErrorType> {
    match get_property(o, p) {
        None => Ok(JsValue::undefined()),
        Some(PropertyDescriptor::Data(d)) => Ok(d.value),
        Some(PropertyDescriptor::Accessor(a)) => {
            if a.get.is_undefined() {
                Ok(JsValue::undefined())
            } else {
                function_object::call_value(ctx, &a.get, receiver.clone(), Vec::new())
            }
        }
    }
}

pub fn get_named(ctx: &mut EvalContext, o: &JsObjectType, name: &str) -> Result<JsValue, JErrorType> {
    get(ctx, o, &PropertyKey::named(name))
}

/// [[CanPut]]
pub fn can_put(o: &JsObjectType, p: &PropertyKey) -> bool {
    if let Some(desc) = get_own_property(o, p) {
        return match desc {
            PropertyDescriptor::Accessor(a) => !a.set.is_undefined(),
            PropertyDescriptor::Data(d) => d.writable,
        };
    }
    let (proto, extensible) = {
        let obj = o.borrow();
        (obj.prototype.clone(), obj.extensible)
    };
    let proto = match proto {
        None => return extensible,
        Some(proto) => proto,
    };
    match get_property(&proto, p) {
        None => extensible,
        Some(PropertyDescriptor::Accessor(a)) => !a.set.is_undefined(),
        Some(PropertyDescriptor::Data(d)) => extensible && d.writable,
    }
}

/// [[Put]]
pub fn put(
    ctx: &mut EvalContext,
    o: &JsObjectType,
    p: &PropertyKey,
    v: JsValue,
    throw: bool,
) -> Result<(), JErrorType> {
    put_with_receiver(ctx, o, p, v, &JsValue::object(o.clone()), throw)
}

pub fn put_with_receiver(
    ctx: &mut EvalContext,
    o: &JsObjectType,
    p: &PropertyKey,
    v: JsValue,
    receiver: &JsValue,
    throw: bool,
) -> Result<(), JErrorType> {
    if !can_put(o, p) {
        let message = match get_property(o, p) {
            Some(PropertyDescriptor::Accessor(_)) => Message::AccessorWithoutSetter(property_name(p)),
            _ => Message::CannotPut(property_name(p)),
        };
        return reject(throw, message);
    }
    let receiver_obj = receiver.try_object();
    let is_self = receiver_obj.as_ref().map_or(false, |r| Rc::ptr_eq(r, o));
    if let Some(PropertyDescriptor::Data(_)) = get_own_property(o, p) {
        if is_self {
            let desc = PropertyDescriptorSetter::new().with_value(v);
            define_own_property(ctx, o, p, desc, throw)?;
            return Ok(());
        }
    }
    if let Some(PropertyDescriptor::Accessor(a)) = get_property(o, p) {
        function_object::call_value(ctx, &a.set, receiver.clone(), vec![v])?;
        return Ok(());
    }
    match receiver_obj {
        Some(r) if is_self => {
            let desc = PropertyDescriptorSetter::new_data(v, true, true, true);
            define_own_property(ctx, &r, p, desc, throw)?;
            Ok(())
        }
        // Creating a property on a primitive's temporary wrapper is unobservable.
        _ => reject(throw, Message::CannotPut(property_name(p))),
    }
}

pub fn put_named(
    ctx: &mut EvalContext,
    o: &JsObjectType,
    name: &str,
    v: JsValue,
) -> Result<(), JErrorType> {
    put(ctx, o, &PropertyKey::named(name), v, true)
}

/// [[HasProperty]]
pub fn has_property(o: &JsObjectType, p: &PropertyKey) -> bool {
    get_property(o, p).is_some()
}

pub fn has_own_property(o: &JsObjectType, p: &PropertyKey) -> bool {
    get_own_property(o, p).is_some()
}

/// [[Delete]]
pub fn delete(o: &JsObjectType, p: &PropertyKey, throw: bool) -> Result<bool, JErrorType> {
    let desc = match get_own_property(o, p) {
        None => return Ok(true),
        Some(desc) => desc,
    };
    if !desc.is_configurable() {
        return reject(throw, Message::CannotDelete(property_name(p)));
    }
    let mut obj = o.borrow_mut();
    obj.remove_property(p);
    if let ObjectKind::Arguments(a) = &mut obj.kind {
        if let Some(i) = p.as_index() {
            a.unmap(i);
        }
    }
    Ok(true)
}

/// [[DefaultValue]]
pub fn default_value(
    ctx: &mut EvalContext,
    o: &JsObjectType,
    hint: PreferredType,
) -> Result<JsValue, JErrorType> {
    let hint = match hint {
        PreferredType::Default => {
            if matches!(o.borrow().kind, ObjectKind::Date(_)) {
                PreferredType::String
            } else {
                PreferredType::Number
            }
        }
        h => h,
    };
    let order = match hint {
        PreferredType::String => ["toString", "valueOf"],
        _ => ["valueOf", "toString"],
    };
    for name in order.iter() {
        let method = get_named(ctx, o, name)?;
        if method.is_callable() {
            let result = function_object::call_value(ctx, &method, JsValue::object(o.clone()), Vec::new())?;
            if result.is_primitive() {
                return Ok(result);
            }
        }
    }
    Err(Message::NoDefaultValue.into())
}

/// [[DefineOwnProperty]], dispatched on object kind.
pub fn define_own_property(
    ctx: &mut EvalContext,
    o: &JsObjectType,
    p: &PropertyKey,
    desc: PropertyDescriptorSetter,
    throw: bool,
) -> Result<bool, JErrorType> {
    let (is_array, is_arguments) = {
        let obj = o.borrow();
        (
            obj.is_array(),
            matches!(obj.kind, ObjectKind::Arguments(_)),
        )
    };
    if is_array {
        array_object::define_own_property(ctx, o, p, desc, throw)
    } else if is_arguments {
        arguments_object::define_own_property(o, p, desc, throw)
    } else {
        ordinary_define_own_property(o, p, &desc, throw)
    }
}

fn same_optional(a: &Option<JsValue>, b: &JsValue) -> bool {
    a.as_ref().map_or(true, |a| same_value(a, b))
}

fn same_flag(a: Option<bool>, b: bool) -> bool {
    a.map_or(true, |a| a == b)
}

/// True if every field present in `desc` already holds in `current`.
fn is_noop(desc: &PropertyDescriptorSetter, current: &PropertyDescriptor) -> bool {
    if !same_flag(desc.enumerable, current.is_enumerable())
        || !same_flag(desc.configurable, current.is_configurable())
    {
        return false;
    }
    match current {
        PropertyDescriptor::Data(d) => {
            !desc.is_accessor_descriptor()
                && same_optional(&desc.value, &d.value)
                && same_flag(desc.writable, d.writable)
        }
        PropertyDescriptor::Accessor(a) => {
            !desc.is_data_descriptor()
                && same_optional(&desc.get, &a.get)
                && same_optional(&desc.set, &a.set)
        }
    }
}

/// The generic [[DefineOwnProperty]] state machine.
pub fn ordinary_define_own_property(
    o: &JsObjectType,
    p: &PropertyKey,
    desc: &PropertyDescriptorSetter,
    throw: bool,
) -> Result<bool, JErrorType> {
    let current = match get_own_property(o, p) {
        None => {
            if !o.borrow().extensible {
                return reject(throw, Message::NotExtensible(property_name(p)));
            }
            o.borrow_mut().insert_property(
                p.clone(),
                PropertyDescriptor::new_from_property_descriptor_setter(desc),
            );
            return Ok(true);
        }
        Some(current) => current,
    };
    if is_noop(desc, &current) {
        return Ok(true);
    }
    let redefine = || Message::CannotRedefine(property_name(p));
    if !current.is_configurable() {
        if desc.configurable == Some(true) {
            return reject(throw, redefine());
        }
        if let Some(e) = desc.enumerable {
            if e != current.is_enumerable() {
                return reject(throw, redefine());
            }
        }
    }
    let mut updated = current.clone();
    if desc.is_generic_descriptor() {
        // Only attribute bits change.
    } else if current.is_data_descriptor() != desc.is_data_descriptor() {
        if !current.is_configurable() {
            return reject(throw, redefine());
        }
        let (enumerable, configurable) = (current.is_enumerable(), current.is_configurable());
        updated = if current.is_data_descriptor() {
            PropertyDescriptor::accessor(
                JsValue::undefined(),
                JsValue::undefined(),
                enumerable,
                configurable,
            )
        } else {
            PropertyDescriptor::data(JsValue::undefined(), false, enumerable, configurable)
        };
    } else if let PropertyDescriptor::Data(d) = &current {
        if !d.configurable && !d.writable {
            if desc.writable == Some(true) {
                return reject(throw, redefine());
            }
            if !same_optional(&desc.value, &d.value) {
                return reject(throw, redefine());
            }
        }
    } else if let PropertyDescriptor::Accessor(a) = &current {
        if !a.configurable
            && (!same_optional(&desc.set, &a.set) || !same_optional(&desc.get, &a.get))
        {
            return reject(throw, redefine());
        }
    }

    match &mut updated {
        PropertyDescriptor::Data(d) => {
            if let Some(v) = &desc.value {
                d.value = v.clone();
            }
            if let Some(w) = desc.writable {
                d.writable = w;
            }
        }
        PropertyDescriptor::Accessor(a) => {
            if let Some(g) = &desc.get {
                a.get = g.clone();
            }
            if let Some(s) = &desc.set {
                a.set = s.clone();
            }
        }
    }
    if let Some(e) = desc.enumerable {
        updated.set_enumerable(e);
    }
    if let Some(c) = desc.configurable {
        updated.set_configurable(c);
    }
    o.borrow_mut().insert_property(p.clone(), updated);
    Ok(true)
}

/// Own keys: array indices ascending, then names in insertion order.
pub fn own_property_keys(o: &JsObjectType) -> Vec<PropertyKey> {
    let obj = o.borrow();
    let mut indices: Vec<u32> = obj.property_keys().filter_map(|k| k.as_index()).collect();
    if let ObjectKind::String(s) = &obj.kind {
        indices.extend(0..s.len() as u32);
    }
    indices.sort_unstable();
    indices.dedup();
    let mut keys: Vec<PropertyKey> = indices.into_iter().map(PropertyKey::Index).collect();
    keys.extend(obj.property_keys().filter(|k| !k.is_index()).cloned());
    keys
}

pub fn own_enumerable_keys(o: &JsObjectType) -> Vec<PropertyKey> {
    own_property_keys(o)
        .into_iter()
        .filter(|k| get_own_property(o, k).map_or(false, |d| d.is_enumerable()))
        .collect()
}

/// Snapshot of the keys a for-in loop visits: enumerable keys along the
/// prototype chain, each name once, shadowed keys skipped. Keys deleted
/// before they are reached are skipped by `next`.
pub struct PropertyIterator {
    object: Option<JsObjectType>,
    keys: Vec<PropertyKey>,
    position: usize,
}

impl PropertyIterator {
    pub fn new(object: Option<JsObjectType>) -> Self {
        let mut keys = Vec::new();
        let mut seen = HashSet::new();
        let mut current = object.clone();
        while let Some(obj) = current {
            for key in own_property_keys(&obj) {
                if !seen.insert(key.clone()) {
                    continue;
                }
                if get_own_property(&obj, &key).map_or(false, |d| d.is_enumerable()) {
                    keys.push(key);
                }
            }
            current = obj.borrow().prototype.clone();
        }
        PropertyIterator {
            object,
            keys,
            position: 0,
        }
    }

    pub fn next_key(&mut self) -> Option<PropertyKey> {
        let object = self.object.as_ref()?;
        while self.position < self.keys.len() {
            let key = self.keys[self.position].clone();
            self.position += 1;
            if has_property(object, &key) {
                return Some(key);
            }
        }
        None
    }
}

/// Walks `o`'s prototype chain looking for `proto`.
pub fn is_prototype_of(proto: &JsObjectType, o: &JsObjectType) -> bool {
    let mut current = o.borrow().prototype.clone();
    while let Some(p) = current {
        if Rc::ptr_eq(&p, proto) {
            return true;
        }
        current = p.borrow().prototype.clone();
    }
    false
}
