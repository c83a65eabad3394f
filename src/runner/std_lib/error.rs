//! Error built-in objects.
//!
//! Provides Error and the six native error constructors. Each prototype
//! carries its own `name` and an empty `message`; only `Error.prototype`
//! has `toString`.

use crate::runner::ds::error::{ErrorKind, JErrorType, Message};
use crate::runner::ds::object;
use crate::runner::ds::operations::type_conversion::to_string;
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::string::JsString;
use crate::runner::ds::value::JsValue;
use crate::runner::text::builder::StringBuilder;
use crate::runner::types::{arg, BuiltInObject, EvalContext, NativeFn};

macro_rules! error_constructor {
    ($name:ident, $kind:expr) => {
        fn $name(
            ctx: &mut EvalContext,
            _this: JsValue,
            args: Vec<JsValue>,
        ) -> Result<JsValue, JErrorType> {
            construct_error(ctx, $kind, &arg(&args, 0))
        }
    };
}

error_constructor!(error_ctor, ErrorKind::Error);
error_constructor!(eval_error_ctor, ErrorKind::EvalError);
error_constructor!(range_error_ctor, ErrorKind::RangeError);
error_constructor!(reference_error_ctor, ErrorKind::ReferenceError);
error_constructor!(syntax_error_ctor, ErrorKind::SyntaxError);
error_constructor!(type_error_ctor, ErrorKind::TypeError);
error_constructor!(uri_error_ctor, ErrorKind::URIError);

fn constructor_for(kind: ErrorKind) -> NativeFn {
    match kind {
        ErrorKind::Error => error_ctor,
        ErrorKind::EvalError => eval_error_ctor,
        ErrorKind::RangeError => range_error_ctor,
        ErrorKind::ReferenceError => reference_error_ctor,
        ErrorKind::SyntaxError => syntax_error_ctor,
        ErrorKind::TypeError => type_error_ctor,
        ErrorKind::URIError => uri_error_ctor,
    }
}

/// Register all error types.
pub fn register(ctx: &mut EvalContext) -> Result<(), JErrorType> {
    for kind in ErrorKind::ALL {
        let proto = WellKnownIntrinsics::error_prototype(kind);
        let mut builtin = BuiltInObject::new(kind.name())
            .with_prototype(proto)
            .with_constructor(constructor_for(kind), 1);
        if kind == ErrorKind::Error {
            builtin = builtin.add_method("toString", error_proto_to_string, 0);
        }
        builtin.register(ctx)?;
        let prototype = ctx.intrinsic(proto);
        let mut p = prototype.borrow_mut();
        p.define_value("name", JsValue::str(kind.name()), true, false, true);
        p.define_value("message", JsValue::string(JsString::empty()), true, false, true);
    }
    Ok(())
}

/// `Error(message)` and `new Error(message)` behave alike.
fn construct_error(
    ctx: &mut EvalContext,
    kind: ErrorKind,
    message: &JsValue,
) -> Result<JsValue, JErrorType> {
    let e = ctx.new_error(kind, "")?;
    if !message.is_undefined() {
        let text = to_string(ctx, message)?;
        e.borrow_mut()
            .define_value("message", JsValue::string(text), true, false, true);
    }
    Ok(JsValue::object(e))
}

/// Error.prototype.toString
fn error_proto_to_string(
    ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = this
        .try_object()
        .ok_or_else(|| JErrorType::from(Message::IncompatibleReceiver("Error", "toString")))?;
    let name = match object::get_named(ctx, &o, "name")? {
        v if v.is_undefined() => JsString::intern("Error"),
        v => to_string(ctx, &v)?,
    };
    let message = match object::get_named(ctx, &o, "message")? {
        v if v.is_undefined() => JsString::empty(),
        v => to_string(ctx, &v)?,
    };
    if name.is_empty() {
        return Ok(JsValue::string(message));
    }
    if message.is_empty() {
        return Ok(JsValue::string(name));
    }
    let mut out = StringBuilder::new();
    out.push_js(&name).push_str(": ").push_js(&message);
    Ok(JsValue::string(out.build()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::config::RuntimeConfig;

    fn context() -> EvalContext {
        EvalContext::new(RuntimeConfig::default()).unwrap()
    }

    #[test]
    fn test_native_error_to_string() {
        let mut ctx = context();
        let e = range_error_ctor(&mut ctx, JsValue::undefined(), vec![JsValue::str("bad")]).unwrap();
        let s = error_proto_to_string(&mut ctx, e, vec![]).unwrap();
        assert_eq!(s.as_string().to_string(), "RangeError: bad");
        let e = error_ctor(&mut ctx, JsValue::undefined(), vec![]).unwrap();
        let s = error_proto_to_string(&mut ctx, e, vec![]).unwrap();
        assert_eq!(s.as_string().to_string(), "Error");
    }

    #[test]
    fn test_prototype_chain() {
        let ctx = context();
        let type_error = ctx.intrinsic(WellKnownIntrinsics::TypeErrorPrototype);
        let error = ctx.intrinsic(WellKnownIntrinsics::ErrorPrototype);
        assert!(object::is_prototype_of(&error, &type_error));
        let name = type_error.borrow().data_value(&"name".into()).unwrap();
        assert_eq!(name.as_string().to_string(), "TypeError");
    }
}
