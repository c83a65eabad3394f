use crate::runner::ds::error::{JErrorType, Message};
use crate::runner::ds::lex_env::JsLexEnvironmentType;
use crate::runner::ds::object;
use crate::runner::ds::object_property::PropertyKey;
use crate::runner::ds::operations::lex_env::{get_binding_value, set_mutable_binding};
use crate::runner::ds::operations::type_conversion::to_object;
use crate::runner::ds::string::JsString;
use crate::runner::ds::value::JsValue;
use crate::runner::types::EvalContext;

pub enum ReferenceBase {
    Unresolvable,
    Value(JsValue),
    Environment(JsLexEnvironmentType),
}

/// A resolved name: (base, referenced name, strict flag).
pub struct Reference {
    pub base: ReferenceBase,
    pub name: JsString,
    pub strict: bool,
}

impl Reference {
    pub fn new_property(base: JsValue, name: JsString, strict: bool) -> Self {
        Reference {
            base: ReferenceBase::Value(base),
            name,
            strict,
        }
    }

    pub fn is_unresolvable(&self) -> bool {
        matches!(self.base, ReferenceBase::Unresolvable)
    }

    pub fn is_property_reference(&self) -> bool {
        matches!(self.base, ReferenceBase::Value(_))
    }

    pub fn has_primitive_base(&self) -> bool {
        match &self.base {
            ReferenceBase::Value(v) => v.is_primitive(),
            _ => false,
        }
    }

    fn key(&self) -> PropertyKey {
        PropertyKey::from(self.name.clone())
    }
}

/// GetValue
pub fn get_value(ctx: &mut EvalContext, r: &Reference) -> Result<JsValue, JErrorType> {
    match &r.base {
        ReferenceBase::Unresolvable => Err(Message::NotDefined(r.name.to_string()).into()),
        ReferenceBase::Value(base) => {
            if let Some(o) = base.try_object() {
                object::get(ctx, &o, &r.key())
            } else {
                let o = to_object(ctx, base)?;
                object::get_with_receiver(ctx, &o, &r.key(), base)
            }
        }
        ReferenceBase::Environment(env) => get_binding_value(ctx, env, &r.name, r.strict),
    }
}

/// PutValue
pub fn put_value(ctx: &mut EvalContext, r: &Reference, w: JsValue) -> Result<(), JErrorType> {
    match &r.base {
        ReferenceBase::Unresolvable => {
            if r.strict {
                Err(Message::NotDefined(r.name.to_string()).into())
            } else {
                let global = ctx.global_object();
                object::put(ctx, &global, &r.key(), w, false)
            }
        }
        ReferenceBase::Value(base) => {
            if let Some(o) = base.try_object() {
                object::put(ctx, &o, &r.key(), w, r.strict)
            } else {
                let o = to_object(ctx, base)?;
                object::put_with_receiver(ctx, &o, &r.key(), w, base, r.strict)
            }
        }
        ReferenceBase::Environment(env) => {
            set_mutable_binding(ctx, env, r.name.clone(), w, r.strict)
        }
    }
}
