use crate::parser::RuntimeParser;
use crate::runner::ds::error::{JErrorType, Message};
use crate::runner::ds::object::{self, JsObject, JsObjectType, ObjectKind};
use crate::runner::ds::object_property::PropertyKey;
use crate::runner::ds::operations::number_format::number_to_string;
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::string::JsString;
use crate::runner::ds::string_object::new_string_object;
use crate::runner::ds::value::{JsValue, ValueKind};
use crate::runner::types::EvalContext;

pub const TYPE_STR_UNDEFINED: &str = "undefined";
pub const TYPE_STR_NULL: &str = "null";
pub const TYPE_STR_BOOLEAN: &str = "boolean";
pub const TYPE_STR_STRING: &str = "string";
pub const TYPE_STR_NUMBER: &str = "number";
pub const TYPE_STR_OBJECT: &str = "object";
pub const TYPE_STR_FUNCTION: &str = "function";

/// The result of the `typeof` operator.
pub fn get_type(a: &JsValue) -> &'static str {
    match a.kind() {
        ValueKind::Nothing | ValueKind::Undefined => TYPE_STR_UNDEFINED,
        ValueKind::Null => TYPE_STR_OBJECT,
        ValueKind::Boolean(_) => TYPE_STR_BOOLEAN,
        ValueKind::String(_) => TYPE_STR_STRING,
        ValueKind::Number(_) => TYPE_STR_NUMBER,
        ValueKind::Object(o) => {
            if o.borrow().is_callable() {
                TYPE_STR_FUNCTION
            } else {
                TYPE_STR_OBJECT
            }
        }
    }
}

/// Name of the language type, used in messages.
pub fn type_name(a: &JsValue) -> &'static str {
    if a.is_null() {
        TYPE_STR_NULL
    } else {
        get_type(a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredType {
    Default,
    String,
    Number,
}

pub fn to_primitive(
    ctx: &mut EvalContext,
    v: &JsValue,
    preferred_type: PreferredType,
) -> Result<JsValue, JErrorType> {
    match v.try_object() {
        Some(o) => object::default_value(ctx, &o, preferred_type),
        None => Ok(v.clone()),
    }
}

pub fn to_boolean(v: &JsValue) -> bool {
    match v.kind() {
        ValueKind::Nothing | ValueKind::Undefined | ValueKind::Null => false,
        ValueKind::Boolean(b) => b,
        ValueKind::Number(n) => !(n == 0.0 || n.is_nan()),
        ValueKind::String(s) => !s.is_empty(),
        ValueKind::Object(_) => true,
    }
}

pub fn string_to_number(s: &JsString) -> f64 {
    RuntimeParser::parse_numeric_string(s.to_utf8())
}

pub fn to_number(ctx: &mut EvalContext, v: &JsValue) -> Result<f64, JErrorType> {
    Ok(match v.kind() {
        ValueKind::Nothing | ValueKind::Undefined => f64::NAN,
        ValueKind::Null => 0.0,
        ValueKind::Boolean(b) => {
            if b {
                1.0
            } else {
                0.0
            }
        }
        ValueKind::Number(n) => n,
        ValueKind::String(s) => string_to_number(&s),
        ValueKind::Object(_) => {
            let pv = to_primitive(ctx, v, PreferredType::Number)?;
            to_number(ctx, &pv)?
        }
    })
}

pub fn f64_to_integer(n: f64) -> f64 {
    if n.is_nan() {
        0.0
    } else if n.is_infinite() || n == 0.0 {
        n
    } else {
        n.trunc()
    }
}

fn modulo_pow2(n: f64, bits: u32) -> f64 {
    if !n.is_finite() || n == 0.0 {
        return 0.0;
    }
    let m = 2f64.powi(bits as i32);
    let r = n.trunc() % m;
    if r < 0.0 {
        r + m
    } else {
        r
    }
}

pub fn f64_to_uint32(n: f64) -> u32 {
    modulo_pow2(n, 32) as u32
}

pub fn f64_to_int32(n: f64) -> i32 {
    f64_to_uint32(n) as i32
}

pub fn f64_to_uint16(n: f64) -> u16 {
    modulo_pow2(n, 16) as u16
}

pub fn to_integer(ctx: &mut EvalContext, v: &JsValue) -> Result<f64, JErrorType> {
    Ok(f64_to_integer(to_number(ctx, v)?))
}

pub fn to_int32(ctx: &mut EvalContext, v: &JsValue) -> Result<i32, JErrorType> {
    Ok(f64_to_int32(to_number(ctx, v)?))
}

pub fn to_uint32(ctx: &mut EvalContext, v: &JsValue) -> Result<u32, JErrorType> {
    Ok(f64_to_uint32(to_number(ctx, v)?))
}

pub fn to_uint16(ctx: &mut EvalContext, v: &JsValue) -> Result<u16, JErrorType> {
    Ok(f64_to_uint16(to_number(ctx, v)?))
}

/// ToString for values that are already primitive.
pub fn primitive_to_string(v: &JsValue) -> JsString {
    match v.kind() {
        ValueKind::Nothing | ValueKind::Undefined => JsString::intern("undefined"),
        ValueKind::Null => JsString::intern("null"),
        ValueKind::Boolean(true) => JsString::intern("true"),
        ValueKind::Boolean(false) => JsString::intern("false"),
        ValueKind::Number(n) => JsString::from(number_to_string(n)),
        ValueKind::String(s) => s,
        ValueKind::Object(_) => JsString::intern("[object Object]"),
    }
}

pub fn to_string(ctx: &mut EvalContext, v: &JsValue) -> Result<JsString, JErrorType> {
    if v.is_object() {
        let pv = to_primitive(ctx, v, PreferredType::String)?;
        Ok(primitive_to_string(&pv))
    } else {
        Ok(primitive_to_string(v))
    }
}

/// ToString followed by key canonicalisation; numbers that are array
/// indices skip the string round trip.
pub fn to_property_key(ctx: &mut EvalContext, v: &JsValue) -> Result<PropertyKey, JErrorType> {
    if v.is_number() {
        let n = v.as_number();
        if n >= 0.0 && n < u32::MAX as f64 && n.fract() == 0.0 && !(n == 0.0 && n.is_sign_negative()) {
            return Ok(PropertyKey::Index(n as u32));
        }
    }
    Ok(PropertyKey::from(to_string(ctx, v)?))
}

pub fn check_object_coercible(v: &JsValue) -> Result<(), JErrorType> {
    if v.is_null_or_undefined() {
        Err(Message::NullToObject.into())
    } else {
        Ok(())
    }
}

pub fn to_object(ctx: &mut EvalContext, v: &JsValue) -> Result<JsObjectType, JErrorType> {
    let obj = match v.kind() {
        ValueKind::Object(o) => return Ok(o),
        ValueKind::Nothing | ValueKind::Undefined | ValueKind::Null => {
            return Err(Message::NullToObject.into())
        }
        ValueKind::Boolean(b) => {
            let proto = ctx.intrinsic(WellKnownIntrinsics::BooleanPrototype);
            ctx.heap.allocate()?;
            JsObject::new("Boolean", Some(proto), ObjectKind::Boolean(b)).into_ref()
        }
        ValueKind::Number(n) => {
            let proto = ctx.intrinsic(WellKnownIntrinsics::NumberPrototype);
            ctx.heap.allocate()?;
            JsObject::new("Number", Some(proto), ObjectKind::Number(n)).into_ref()
        }
        ValueKind::String(s) => {
            let proto = ctx.intrinsic(WellKnownIntrinsics::StringPrototype);
            ctx.heap.allocate()?;
            new_string_object(proto, s)
        }
    };
    Ok(obj)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_boolean() {
        assert!(!to_boolean(&JsValue::undefined()));
        assert!(!to_boolean(&JsValue::null()));
        assert!(!to_boolean(&JsValue::number(0.0)));
        assert!(!to_boolean(&JsValue::number(-0.0)));
        assert!(!to_boolean(&JsValue::number(f64::NAN)));
        assert!(!to_boolean(&JsValue::str("")));
        assert!(to_boolean(&JsValue::str("0")));
        assert!(to_boolean(&JsValue::number(-1.0)));
        assert!(to_boolean(&JsValue::boolean(true)));
    }

    #[test]
    fn test_integer_conversions() {
        assert_eq!(f64_to_int32(4294967296.0 + 5.0), 5);
        assert_eq!(f64_to_int32(2147483648.0), -2147483648);
        assert_eq!(f64_to_int32(-1.5), -1);
        assert_eq!(f64_to_uint32(-1.0), 4294967295);
        assert_eq!(f64_to_uint32(f64::NAN), 0);
        assert_eq!(f64_to_uint32(f64::INFINITY), 0);
        assert_eq!(f64_to_uint16(65537.0), 1);
        assert_eq!(f64_to_integer(-3.7), -3.0);
        assert_eq!(f64_to_integer(f64::NAN), 0.0);
        assert_eq!(f64_to_integer(f64::NEG_INFINITY), f64::NEG_INFINITY);
    }

    #[test]
    fn test_primitive_to_string() {
        assert_eq!(primitive_to_string(&JsValue::undefined()).to_string(), "undefined");
        assert_eq!(primitive_to_string(&JsValue::null()).to_string(), "null");
        assert_eq!(primitive_to_string(&JsValue::boolean(false)).to_string(), "false");
        assert_eq!(primitive_to_string(&JsValue::number(-0.0)).to_string(), "0");
        assert_eq!(primitive_to_string(&JsValue::number(1e21)).to_string(), "1e+21");
    }

    #[test]
    fn test_get_type() {
        assert_eq!(get_type(&JsValue::null()), "object");
        assert_eq!(get_type(&JsValue::undefined()), "undefined");
        assert_eq!(get_type(&JsValue::str("x")), "string");
        assert_eq!(get_type(&JsValue::number(1.0)), "number");
        assert_eq!(type_name(&JsValue::null()), "null");
    }

    #[test]
    fn test_string_to_number() {
        assert_eq!(string_to_number(&JsString::new("  12  ")), 12.0);
        assert_eq!(string_to_number(&JsString::new("")), 0.0);
        assert_eq!(string_to_number(&JsString::new("0x1F")), 31.0);
        assert!(string_to_number(&JsString::new("abc")).is_nan());
        assert_eq!(string_to_number(&JsString::new("-Infinity")), f64::NEG_INFINITY);
    }
}
