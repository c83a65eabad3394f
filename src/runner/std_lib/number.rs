//! Number built-in.
//!
//! Provides the Number constructor, its constants and the formatting
//! methods of `Number.prototype`.

use crate::runner::ds::error::{JErrorType, Message};
use crate::runner::ds::object::{JsObject, ObjectKind};
use crate::runner::ds::operations::number_format::{
    number_to_string, to_exponential, to_fixed, to_precision, to_radix_string,
};
use crate::runner::ds::operations::type_conversion::{to_integer, to_number};
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::string::JsString;
use crate::runner::ds::value::JsValue;
use crate::runner::types::{arg, BuiltInObject, EvalContext};

/// Register the Number built-in.
pub fn register(ctx: &mut EvalContext) -> Result<(), JErrorType> {
    BuiltInObject::new("Number")
        .with_prototype(WellKnownIntrinsics::NumberPrototype)
        .with_constructor(number_call, 1)
        .with_construct(number_construct)
        .add_property("MAX_VALUE", JsValue::number(f64::MAX))
        .add_property("MIN_VALUE", JsValue::number(5e-324))
        .add_property("NaN", JsValue::number(f64::NAN))
        .add_property("NEGATIVE_INFINITY", JsValue::number(f64::NEG_INFINITY))
        .add_property("POSITIVE_INFINITY", JsValue::number(f64::INFINITY))
        .add_method("toString", number_proto_to_string, 1)
        .add_method("toLocaleString", number_proto_to_locale_string, 0)
        .add_method("valueOf", number_proto_value_of, 0)
        .add_method("toFixed", number_proto_to_fixed, 1)
        .add_method("toExponential", number_proto_to_exponential, 1)
        .add_method("toPrecision", number_proto_to_precision, 1)
        .register(ctx)?;
    Ok(())
}

fn this_number(this: &JsValue, method: &'static str) -> Result<f64, JErrorType> {
    if this.is_number() {
        return Ok(this.as_number());
    }
    if let Some(o) = this.try_object() {
        if let ObjectKind::Number(n) = o.borrow().kind {
            return Ok(n);
        }
    }
    Err(Message::IncompatibleReceiver("Number", method).into())
}

fn string_result(s: String) -> Result<JsValue, JErrorType> {
    Ok(JsValue::string(JsString::from(s)))
}

/// Number(value)
fn number_call(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    match args.first() {
        Some(v) => Ok(JsValue::number(to_number(ctx, v)?)),
        None => Ok(JsValue::number(0.0)),
    }
}

/// new Number(value)
fn number_construct(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let n = match args.first() {
        Some(v) => to_number(ctx, v)?,
        None => 0.0,
    };
    ctx.heap.allocate()?;
    let proto = ctx.intrinsic(WellKnownIntrinsics::NumberPrototype);
    let o = JsObject::new("Number", Some(proto), ObjectKind::Number(n)).into_ref();
    Ok(JsValue::object(o))
}

/// Number.prototype.toString
fn number_proto_to_string(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let x = this_number(&this, "toString")?;
    let radix = match arg(&args, 0) {
        v if v.is_undefined() => 10.0,
        v => to_integer(ctx, &v)?,
    };
    if !(2.0..=36.0).contains(&radix) {
        return Err(Message::BadRadix.into());
    }
    if radix == 10.0 {
        string_result(number_to_string(x))
    } else {
        string_result(to_radix_string(x, radix as u32))
    }
}

/// Number.prototype.toLocaleString
fn number_proto_to_locale_string(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let x = this_number(&this, "toLocaleString")?;
    string_result(number_to_string(x))
}

/// Number.prototype.valueOf
fn number_proto_value_of(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::number(this_number(&this, "valueOf")?))
}

/// Number.prototype.toFixed
fn number_proto_to_fixed(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let x = this_number(&this, "toFixed")?;
    let f = to_integer(ctx, &arg(&args, 0))?;
    if !(0.0..=20.0).contains(&f) {
        return Err(Message::FractionDigits.into());
    }
    if x.is_nan() || x.abs() >= 1e21 {
        return string_result(number_to_string(x));
    }
    string_result(to_fixed(x, f as usize))
}

/// Number.prototype.toExponential
fn number_proto_to_exponential(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let x = this_number(&this, "toExponential")?;
    let fraction_digits = arg(&args, 0);
    let f = to_integer(ctx, &fraction_digits)?;
    if !x.is_finite() {
        return string_result(number_to_string(x));
    }
    if !(0.0..=20.0).contains(&f) {
        return Err(Message::FractionDigits.into());
    }
    let digits = if fraction_digits.is_undefined() {
        None
    } else {
        Some(f as usize)
    };
    string_result(to_exponential(x, digits))
}

/// Number.prototype.toPrecision
fn number_proto_to_precision(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let x = this_number(&this, "toPrecision")?;
    let precision = arg(&args, 0);
    if precision.is_undefined() {
        return string_result(number_to_string(x));
    }
    let p = to_integer(ctx, &precision)?;
    if !x.is_finite() {
        return string_result(number_to_string(x));
    }
    if !(1.0..=21.0).contains(&p) {
        return Err(Message::Precision.into());
    }
    string_result(to_precision(x, p as usize))
}
