use std::collections::HashMap;

use crate::runner::ds::error::{JErrorType, Message};
use crate::runner::ds::object::{self, JsObjectType};
use crate::runner::ds::object_property::{PropertyDescriptorSetter, PropertyKey};
use crate::runner::ds::string::JsString;
use crate::runner::ds::value::JsValue;
use crate::runner::types::EvalContext;

pub trait EnvironmentRecord {
    fn has_binding(&self, name: &JsString) -> bool;
    fn create_mutable_binding(
        &mut self,
        ctx: &mut EvalContext,
        name: JsString,
        can_delete: bool,
    ) -> Result<(), JErrorType>;
    fn set_mutable_binding(
        &mut self,
        ctx: &mut EvalContext,
        name: JsString,
        value: JsValue,
        strict: bool,
    ) -> Result<(), JErrorType>;
    fn get_binding_value(
        &self,
        ctx: &mut EvalContext,
        name: &JsString,
        strict: bool,
    ) -> Result<JsValue, JErrorType>;
    fn delete_binding(&mut self, name: &JsString) -> Result<bool, JErrorType>;
    fn implicit_this_value(&self) -> JsValue;
}

pub enum EnvironmentRecordType {
    Declarative(DeclarativeEnvironmentRecord),
    Object(ObjectEnvironmentRecord),
}

impl EnvironmentRecordType {
    pub fn has_binding(&self, name: &JsString) -> bool {
        match self {
            EnvironmentRecordType::Declarative(d) => d.has_binding(name),
            EnvironmentRecordType::Object(o) => o.has_binding(name),
        }
    }

    pub fn implicit_this_value(&self) -> JsValue {
        match self {
            EnvironmentRecordType::Declarative(d) => d.implicit_this_value(),
            EnvironmentRecordType::Object(o) => o.implicit_this_value(),
        }
    }
}

pub struct Binding {
    /// `nothing` until an immutable binding is initialised.
    pub value: JsValue,
    pub mutable: bool,
    pub deletable: bool,
}

#[derive(Default)]
pub struct DeclarativeEnvironmentRecord {
    bindings: HashMap<JsString, Binding>,
}

impl DeclarativeEnvironmentRecord {
    pub fn new() -> Self {
        DeclarativeEnvironmentRecord {
            bindings: HashMap::new(),
        }
    }

    pub fn create_immutable_binding(&mut self, name: JsString) {
        self.bindings.entry(name).or_insert(Binding {
            value: JsValue::nothing(),
            mutable: false,
            deletable: false,
        });
    }

    pub fn initialize_immutable_binding(&mut self, name: &JsString, value: JsValue) {
        if let Some(b) = self.bindings.get_mut(name) {
            if b.value.is_nothing() {
                b.value = value;
            }
        }
    }

    /// Declares and initialises a binding in one step.
    pub fn insert_binding(&mut self, name: JsString, value: JsValue, mutable: bool) {
        self.bindings.insert(
            name,
            Binding {
                value,
                mutable,
                deletable: false,
            },
        );
    }

    pub fn values(&self) -> impl Iterator<Item = &JsValue> {
        self.bindings.values().map(|b| &b.value)
    }

    /// Raw read with no uninitialised/strict checks.
    pub fn binding_value(&self, name: &JsString) -> Option<JsValue> {
        self.bindings.get(name).map(|b| b.value.clone())
    }

    /// Raw write that ignores mutability.
    pub fn store_binding_value(&mut self, name: &JsString, value: JsValue) {
        if let Some(b) = self.bindings.get_mut(name) {
            b.value = value;
        }
    }

    fn set_binding(&mut self, name: JsString, value: JsValue, strict: bool) -> Result<(), JErrorType> {
        match self.bindings.get_mut(&name) {
            None => Err(Message::NotDefined(name.to_string()).into()),
            Some(b) if b.mutable => {
                b.value = value;
                Ok(())
            }
            Some(_) => {
                if strict {
                    Err(Message::ImmutableBinding(name.to_string()).into())
                } else {
                    Ok(())
                }
            }
        }
    }

    fn binding(&self, name: &JsString, strict: bool) -> Result<JsValue, JErrorType> {
        match self.bindings.get(name) {
            None => Err(Message::NotDefined(name.to_string()).into()),
            Some(b) if b.value.is_nothing() => {
                if strict {
                    Err(Message::NotDefined(name.to_string()).into())
                } else {
                    Ok(JsValue::undefined())
                }
            }
            Some(b) => Ok(b.value.clone()),
        }
    }
}

impl EnvironmentRecord for DeclarativeEnvironmentRecord {
    fn has_binding(&self, name: &JsString) -> bool {
        self.bindings.contains_key(name)
    }

    fn create_mutable_binding(
        &mut self,
        _ctx: &mut EvalContext,
        name: JsString,
        can_delete: bool,
    ) -> Result<(), JErrorType> {
        self.bindings.entry(name).or_insert(Binding {
            value: JsValue::undefined(),
            mutable: true,
            deletable: can_delete,
        });
        Ok(())
    }

    fn set_mutable_binding(
        &mut self,
        _ctx: &mut EvalContext,
        name: JsString,
        value: JsValue,
        strict: bool,
    ) -> Result<(), JErrorType> {
        self.set_binding(name, value, strict)
    }

    fn get_binding_value(
        &self,
        _ctx: &mut EvalContext,
        name: &JsString,
        strict: bool,
    ) -> Result<JsValue, JErrorType> {
        self.binding(name, strict)
    }

    fn delete_binding(&mut self, name: &JsString) -> Result<bool, JErrorType> {
        Ok(match self.bindings.get(name) {
            None => true,
            Some(b) if !b.deletable => false,
            Some(_) => {
                self.bindings.remove(name);
                true
            }
        })
    }

    fn implicit_this_value(&self) -> JsValue {
        JsValue::undefined()
    }
}

#[derive(Clone)]
pub struct ObjectEnvironmentRecord {
    pub binding_object: JsObjectType,
    pub provide_this: bool,
}

impl ObjectEnvironmentRecord {
    pub fn new(binding_object: JsObjectType, provide_this: bool) -> Self {
        ObjectEnvironmentRecord {
            binding_object,
            provide_this,
        }
    }
}

impl EnvironmentRecord for ObjectEnvironmentRecord {
    fn has_binding(&self, name: &JsString) -> bool {
        object::has_property(&self.binding_object, &PropertyKey::from(name.clone()))
    }

    fn create_mutable_binding(
        &mut self,
        ctx: &mut EvalContext,
        name: JsString,
        can_delete: bool,
    ) -> Result<(), JErrorType> {
        let desc = PropertyDescriptorSetter::new_data(JsValue::undefined(), true, true, can_delete);
        object::define_own_property(ctx, &self.binding_object, &PropertyKey::from(name), desc, true)?;
        Ok(())
    }

    fn set_mutable_binding(
        &mut self,
        ctx: &mut EvalContext,
        name: JsString,
        value: JsValue,
        strict: bool,
    ) -> Result<(), JErrorType> {
        object::put(ctx, &self.binding_object, &PropertyKey::from(name), value, strict)
    }

    fn get_binding_value(
        &self,
        ctx: &mut EvalContext,
        name: &JsString,
        strict: bool,
    ) -> Result<JsValue, JErrorType> {
        let key = PropertyKey::from(name.clone());
        if !object::has_property(&self.binding_object, &key) {
            return if strict {
                Err(Message::NotDefined(name.to_string()).into())
            } else {
                Ok(JsValue::undefined())
            };
        }
        object::get(ctx, &self.binding_object, &key)
    }

    fn delete_binding(&mut self, name: &JsString) -> Result<bool, JErrorType> {
        object::delete(&self.binding_object, &PropertyKey::from(name.clone()), false)
    }

    fn implicit_this_value(&self) -> JsValue {
        if self.provide_this {
            JsValue::object(self.binding_object.clone())
        } else {
            JsValue::undefined()
        }
    }
}
