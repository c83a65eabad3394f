use crate::runner::ds::env_record::{
    DeclarativeEnvironmentRecord, EnvironmentRecord, EnvironmentRecordType,
    ObjectEnvironmentRecord,
};
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::lex_env::{JsLexEnvironmentType, LexEnvironment};
use crate::runner::ds::misc::{Reference, ReferenceBase};
use crate::runner::ds::object::JsObjectType;
use crate::runner::ds::string::JsString;
use crate::runner::ds::value::JsValue;
use crate::runner::types::EvalContext;

pub fn new_declarative_environment(outer_lex: Option<JsLexEnvironmentType>) -> JsLexEnvironmentType {
    LexEnvironment::new_ref(
        EnvironmentRecordType::Declarative(DeclarativeEnvironmentRecord::new()),
        outer_lex,
    )
}

pub fn new_object_environment(
    o: JsObjectType,
    provide_this: bool,
    outer_lex: Option<JsLexEnvironmentType>,
) -> JsLexEnvironmentType {
    LexEnvironment::new_ref(
        EnvironmentRecordType::Object(ObjectEnvironmentRecord::new(o, provide_this)),
        outer_lex,
    )
}

/// Object records are cloned out so that no borrow of the environment is
/// held while accessors or setters run.
fn object_record(env: &JsLexEnvironmentType) -> Option<ObjectEnvironmentRecord> {
    match &env.borrow().inner {
        EnvironmentRecordType::Object(o) => Some(o.clone()),
        EnvironmentRecordType::Declarative(_) => None,
    }
}

/// Runs `f` against the declarative record of `env`, if it has one.
pub fn with_declarative<R>(
    env: &JsLexEnvironmentType,
    f: impl FnOnce(&mut DeclarativeEnvironmentRecord) -> R,
) -> Option<R> {
    match &mut env.borrow_mut().inner {
        EnvironmentRecordType::Declarative(d) => Some(f(d)),
        EnvironmentRecordType::Object(_) => None,
    }
}

pub fn has_binding(env: &JsLexEnvironmentType, name: &JsString) -> bool {
    match object_record(env) {
        Some(o) => o.has_binding(name),
        None => env.borrow().inner.has_binding(name),
    }
}

pub fn create_mutable_binding(
    ctx: &mut EvalContext,
    env: &JsLexEnvironmentType,
    name: JsString,
    can_delete: bool,
) -> Result<(), JErrorType> {
    match object_record(env) {
        Some(mut o) => o.create_mutable_binding(ctx, name, can_delete),
        None => match &mut env.borrow_mut().inner {
            EnvironmentRecordType::Declarative(d) => d.create_mutable_binding(ctx, name, can_delete),
            EnvironmentRecordType::Object(_) => Ok(()),
        },
    }
}

pub fn set_mutable_binding(
    ctx: &mut EvalContext,
    env: &JsLexEnvironmentType,
    name: JsString,
    value: JsValue,
    strict: bool,
) -> Result<(), JErrorType> {
    match object_record(env) {
        Some(mut o) => o.set_mutable_binding(ctx, name, value, strict),
        None => match &mut env.borrow_mut().inner {
            EnvironmentRecordType::Declarative(d) => d.set_mutable_binding(ctx, name, value, strict),
            EnvironmentRecordType::Object(_) => Ok(()),
        },
    }
}

pub fn get_binding_value(
    ctx: &mut EvalContext,
    env: &JsLexEnvironmentType,
    name: &JsString,
    strict: bool,
) -> Result<JsValue, JErrorType> {
    match object_record(env) {
        Some(o) => o.get_binding_value(ctx, name, strict),
        None => match &env.borrow().inner {
            EnvironmentRecordType::Declarative(d) => d.get_binding_value(ctx, name, strict),
            EnvironmentRecordType::Object(_) => Ok(JsValue::undefined()),
        },
    }
}

pub fn delete_binding(env: &JsLexEnvironmentType, name: &JsString) -> Result<bool, JErrorType> {
    match object_record(env) {
        Some(mut o) => o.delete_binding(name),
        None => match &mut env.borrow_mut().inner {
            EnvironmentRecordType::Declarative(d) => d.delete_binding(name),
            EnvironmentRecordType::Object(_) => Ok(true),
        },
    }
}

pub fn implicit_this_value(env: &JsLexEnvironmentType) -> JsValue {
    env.borrow().inner.implicit_this_value()
}

pub fn is_object_environment(env: &JsLexEnvironmentType) -> bool {
    object_record(env).is_some()
}

/// The object behind an object environment record.
pub fn binding_object(env: &JsLexEnvironmentType) -> Option<JsObjectType> {
    object_record(env).map(|o| o.binding_object)
}

/// Walks outward from `lex` to the environment that binds `name`.
pub fn get_identifier_reference(
    lex: Option<JsLexEnvironmentType>,
    name: JsString,
    strict: bool,
) -> Reference {
    let mut current = lex;
    while let Some(env) = current {
        if has_binding(&env, &name) {
            return Reference {
                base: ReferenceBase::Environment(env),
                name,
                strict,
            };
        }
        current = env.borrow().outer();
    }
    Reference {
        base: ReferenceBase::Unresolvable,
        name,
        strict,
    }
}
