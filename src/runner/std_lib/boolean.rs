//! Boolean built-in.

use crate::runner::ds::error::{JErrorType, Message};
use crate::runner::ds::object::{JsObject, ObjectKind};
use crate::runner::ds::operations::type_conversion::to_boolean;
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::string::JsString;
use crate::runner::ds::value::JsValue;
use crate::runner::types::{arg, BuiltInObject, EvalContext};

pub fn register(ctx: &mut EvalContext) -> Result<(), JErrorType> {
    BuiltInObject::new("Boolean")
        .with_prototype(WellKnownIntrinsics::BooleanPrototype)
        .with_constructor(boolean_call, 1)
        .with_construct(boolean_construct)
        .add_method("toString", boolean_proto_to_string, 0)
        .add_method("valueOf", boolean_proto_value_of, 0)
        .register(ctx)?;
    Ok(())
}

fn this_boolean(this: &JsValue, method: &'static str) -> Result<bool, JErrorType> {
    if this.is_boolean() {
        return Ok(this.as_boolean());
    }
    if let Some(o) = this.try_object() {
        if let ObjectKind::Boolean(b) = o.borrow().kind {
            return Ok(b);
        }
    }
    Err(Message::IncompatibleReceiver("Boolean", method).into())
}

fn boolean_call(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::from(to_boolean(&arg(&args, 0))))
}

fn boolean_construct(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let b = to_boolean(&arg(&args, 0));
    ctx.heap.allocate()?;
    let proto = ctx.intrinsic(WellKnownIntrinsics::BooleanPrototype);
    let o = JsObject::new("Boolean", Some(proto), ObjectKind::Boolean(b)).into_ref();
    Ok(JsValue::object(o))
}

/// Boolean.prototype.toString
fn boolean_proto_to_string(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let b = this_boolean(&this, "toString")?;
    Ok(JsValue::string(JsString::intern(if b { "true" } else { "false" })))
}

/// Boolean.prototype.valueOf
fn boolean_proto_value_of(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::from(this_boolean(&this, "valueOf")?))
}
