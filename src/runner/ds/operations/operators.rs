use crate::runner::ds::error::{JErrorType, Message};
use crate::runner::ds::function_object::has_instance;
use crate::runner::ds::object;
use crate::runner::ds::operations::test_and_comparison::abstract_relational_comparison;
use crate::runner::ds::operations::type_conversion::{
    f64_to_int32, f64_to_uint32, get_type, to_boolean, to_number, to_primitive,
    to_property_key, to_string, PreferredType,
};
use crate::runner::ds::string::JsString;
use crate::runner::ds::value::JsValue;
use crate::runner::types::EvalContext;

pub fn type_of(v: &JsValue) -> JsString {
    JsString::intern(get_type(v))
}

pub fn logical_not(v: &JsValue) -> bool {
    !to_boolean(v)
}

pub fn bitwise_not(ctx: &mut EvalContext, v: &JsValue) -> Result<f64, JErrorType> {
    Ok(!f64_to_int32(to_number(ctx, v)?) as f64)
}

pub fn unary_plus(ctx: &mut EvalContext, v: &JsValue) -> Result<f64, JErrorType> {
    to_number(ctx, v)
}

pub fn unary_minus(ctx: &mut EvalContext, v: &JsValue) -> Result<f64, JErrorType> {
    Ok(-to_number(ctx, v)?)
}

/// The `+` operator (11.6.1): string concatenation if either primitive is a
/// string, numeric addition otherwise.
pub fn add(ctx: &mut EvalContext, l: &JsValue, r: &JsValue) -> Result<JsValue, JErrorType> {
    if l.is_number() && r.is_number() {
        return Ok(JsValue::number(l.as_number() + r.as_number()));
    }
    let lp = to_primitive(ctx, l, PreferredType::Default)?;
    let rp = to_primitive(ctx, r, PreferredType::Default)?;
    if lp.is_string() || rp.is_string() {
        let ls = to_string(ctx, &lp)?;
        let rs = to_string(ctx, &rp)?;
        return Ok(JsValue::string(ls.concat(&rs)));
    }
    Ok(JsValue::number(to_number(ctx, &lp)? + to_number(ctx, &rp)?))
}

fn numeric(
    ctx: &mut EvalContext,
    l: &JsValue,
    r: &JsValue,
    op: impl Fn(f64, f64) -> f64,
) -> Result<f64, JErrorType> {
    let ln = to_number(ctx, l)?;
    let rn = to_number(ctx, r)?;
    Ok(op(ln, rn))
}

pub fn subtract(ctx: &mut EvalContext, l: &JsValue, r: &JsValue) -> Result<f64, JErrorType> {
    numeric(ctx, l, r, |a, b| a - b)
}

pub fn multiply(ctx: &mut EvalContext, l: &JsValue, r: &JsValue) -> Result<f64, JErrorType> {
    numeric(ctx, l, r, |a, b| a * b)
}

pub fn divide(ctx: &mut EvalContext, l: &JsValue, r: &JsValue) -> Result<f64, JErrorType> {
    numeric(ctx, l, r, |a, b| a / b)
}

/// `%` keeps the sign of the dividend, like C's fmod.
pub fn modulo(ctx: &mut EvalContext, l: &JsValue, r: &JsValue) -> Result<f64, JErrorType> {
    numeric(ctx, l, r, |a, b| a % b)
}

fn int32_pair(ctx: &mut EvalContext, l: &JsValue, r: &JsValue) -> Result<(i32, i32), JErrorType> {
    let ln = to_number(ctx, l)?;
    let rn = to_number(ctx, r)?;
    Ok((f64_to_int32(ln), f64_to_int32(rn)))
}

pub fn bitwise_or(ctx: &mut EvalContext, l: &JsValue, r: &JsValue) -> Result<f64, JErrorType> {
    let (a, b) = int32_pair(ctx, l, r)?;
    Ok((a | b) as f64)
}

pub fn bitwise_xor(ctx: &mut EvalContext, l: &JsValue, r: &JsValue) -> Result<f64, JErrorType> {
    let (a, b) = int32_pair(ctx, l, r)?;
    Ok((a ^ b) as f64)
}

pub fn bitwise_and(ctx: &mut EvalContext, l: &JsValue, r: &JsValue) -> Result<f64, JErrorType> {
    let (a, b) = int32_pair(ctx, l, r)?;
    Ok((a & b) as f64)
}

pub fn shift_left(ctx: &mut EvalContext, l: &JsValue, r: &JsValue) -> Result<f64, JErrorType> {
    let (a, b) = int32_pair(ctx, l, r)?;
    Ok(a.wrapping_shl(b as u32 & 0x1F) as f64)
}

pub fn shift_right(ctx: &mut EvalContext, l: &JsValue, r: &JsValue) -> Result<f64, JErrorType> {
    let (a, b) = int32_pair(ctx, l, r)?;
    Ok((a >> (b as u32 & 0x1F)) as f64)
}

pub fn shift_right_unsigned(
    ctx: &mut EvalContext,
    l: &JsValue,
    r: &JsValue,
) -> Result<f64, JErrorType> {
    let ln = to_number(ctx, l)?;
    let rn = to_number(ctx, r)?;
    Ok((f64_to_uint32(ln) >> (f64_to_uint32(rn) & 0x1F)) as f64)
}

/// The `in` operator.
pub fn has_property_in(ctx: &mut EvalContext, l: &JsValue, r: &JsValue) -> Result<bool, JErrorType> {
    let o = r
        .try_object()
        .ok_or_else(|| JErrorType::from(Message::InNeedsObject))?;
    let key = to_property_key(ctx, l)?;
    Ok(object::has_property(&o, &key))
}

/// The `instanceof` operator.
pub fn instance_of(ctx: &mut EvalContext, l: &JsValue, r: &JsValue) -> Result<bool, JErrorType> {
    let f = match r.try_object() {
        Some(f) if f.borrow().is_callable() => f,
        Some(_) => return Err(Message::NotAFunction.into()),
        None => return Err(Message::InstanceofNeedsObject.into()),
    };
    has_instance(ctx, &f, l)
}

pub fn less_than(ctx: &mut EvalContext, l: &JsValue, r: &JsValue) -> Result<bool, JErrorType> {
    Ok(abstract_relational_comparison(ctx, l, r, true)?.unwrap_or(false))
}

pub fn greater_than(ctx: &mut EvalContext, l: &JsValue, r: &JsValue) -> Result<bool, JErrorType> {
    Ok(abstract_relational_comparison(ctx, r, l, false)?.unwrap_or(false))
}

pub fn less_than_or_equal(
    ctx: &mut EvalContext,
    l: &JsValue,
    r: &JsValue,
) -> Result<bool, JErrorType> {
    Ok(matches!(abstract_relational_comparison(ctx, r, l, false)?, Some(false)))
}

pub fn greater_than_or_equal(
    ctx: &mut EvalContext,
    l: &JsValue,
    r: &JsValue,
) -> Result<bool, JErrorType> {
    Ok(matches!(abstract_relational_comparison(ctx, l, r, true)?, Some(false)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::config::RuntimeConfig;

    fn context() -> EvalContext {
        EvalContext::new(RuntimeConfig::default()).unwrap()
    }

    fn n(x: f64) -> JsValue {
        JsValue::number(x)
    }

    #[test]
    fn test_add_concatenates_strings() {
        let mut ctx = context();
        let v = add(&mut ctx, &JsValue::str("a"), &n(1.0)).unwrap();
        assert_eq!(v.as_string().to_string(), "a1");
        let v = add(&mut ctx, &n(1.5), &n(2.0)).unwrap();
        assert_eq!(v.as_number(), 3.5);
        let v = add(&mut ctx, &JsValue::boolean(true), &JsValue::null()).unwrap();
        assert_eq!(v.as_number(), 1.0);
    }

    #[test]
    fn test_modulo_sign() {
        let mut ctx = context();
        assert_eq!(modulo(&mut ctx, &n(-5.0), &n(3.0)).unwrap(), -2.0);
        assert_eq!(modulo(&mut ctx, &n(5.5), &n(2.0)).unwrap(), 1.5);
        assert!(modulo(&mut ctx, &n(1.0), &n(0.0)).unwrap().is_nan());
    }

    #[test]
    fn test_shifts() {
        let mut ctx = context();
        assert_eq!(shift_left(&mut ctx, &n(1.0), &n(33.0)).unwrap(), 2.0);
        assert_eq!(shift_right(&mut ctx, &n(-8.0), &n(1.0)).unwrap(), -4.0);
        assert_eq!(shift_right_unsigned(&mut ctx, &n(-1.0), &n(0.0)).unwrap(), 4294967295.0);
        assert_eq!(bitwise_not(&mut ctx, &n(0.0)).unwrap(), -1.0);
        assert_eq!(bitwise_xor(&mut ctx, &n(5.0), &n(1.0)).unwrap(), 4.0);
    }

    #[test]
    fn test_relational_with_nan() {
        let mut ctx = context();
        let nan = n(f64::NAN);
        assert!(!less_than(&mut ctx, &nan, &n(1.0)).unwrap());
        assert!(!greater_than_or_equal(&mut ctx, &nan, &n(1.0)).unwrap());
        assert!(less_than_or_equal(&mut ctx, &n(1.0), &n(1.0)).unwrap());
        assert!(greater_than(&mut ctx, &JsValue::str("b"), &JsValue::str("a")).unwrap());
    }

    #[test]
    fn test_in_requires_object() {
        let mut ctx = context();
        let err = has_property_in(&mut ctx, &JsValue::str("x"), &n(1.0)).unwrap_err();
        assert_eq!(err.message(), Some("expected object in 'in' check."));
        let a = ctx.new_array(vec![n(1.0)]).unwrap();
        assert!(has_property_in(&mut ctx, &n(0.0), &JsValue::object(a.clone())).unwrap());
        assert!(has_property_in(&mut ctx, &JsValue::str("length"), &JsValue::object(a)).unwrap());
    }

    #[test]
    fn test_type_of() {
        assert_eq!(type_of(&JsValue::null()).to_string(), "object");
        assert_eq!(type_of(&JsValue::boolean(true)).to_string(), "boolean");
    }
}
