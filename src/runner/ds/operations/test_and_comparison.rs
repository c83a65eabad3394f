use std::cmp::Ordering;
use std::rc::Rc;

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::operations::type_conversion::{
    string_to_number, to_number, to_primitive, PreferredType,
};
use crate::runner::ds::value::{JsValue, ValueKind};
use crate::runner::types::EvalContext;

fn is_same_value(a: &JsValue, b: &JsValue, strict_mode: bool) -> bool {
    match (a.kind(), b.kind()) {
        (ValueKind::Number(x), ValueKind::Number(y)) => {
            if strict_mode {
                x == y
            } else if x.is_nan() && y.is_nan() {
                true
            } else {
                x == y && x.is_sign_negative() == y.is_sign_negative()
            }
        }
        (ValueKind::String(x), ValueKind::String(y)) => x == y,
        (ValueKind::Object(x), ValueKind::Object(y)) => Rc::ptr_eq(&x, &y),
        (ValueKind::Boolean(x), ValueKind::Boolean(y)) => x == y,
        _ => a.tag() == b.tag(),
    }
}

/// SameValue: NaN equals NaN, +0 and -0 differ.
pub fn same_value(a: &JsValue, b: &JsValue) -> bool {
    is_same_value(a, b, false)
}

/// The `===` operator.
pub fn strict_equality_comparison(a: &JsValue, b: &JsValue) -> bool {
    is_same_value(a, b, true)
}

/// The `==` operator.
pub fn abstract_equality_comparison(
    ctx: &mut EvalContext,
    x: &JsValue,
    y: &JsValue,
) -> Result<bool, JErrorType> {
    if x.tag() == y.tag() {
        return Ok(strict_equality_comparison(x, y));
    }
    if x.is_null_or_undefined() && y.is_null_or_undefined() {
        return Ok(true);
    }
    match (x.kind(), y.kind()) {
        (ValueKind::Number(n), ValueKind::String(s)) => Ok(n == string_to_number(&s)),
        (ValueKind::String(s), ValueKind::Number(n)) => Ok(string_to_number(&s) == n),
        (ValueKind::Boolean(b), _) => {
            let xn = JsValue::number(if b { 1.0 } else { 0.0 });
            abstract_equality_comparison(ctx, &xn, y)
        }
        (_, ValueKind::Boolean(b)) => {
            let yn = JsValue::number(if b { 1.0 } else { 0.0 });
            abstract_equality_comparison(ctx, x, &yn)
        }
        (ValueKind::Number(_), ValueKind::Object(_)) | (ValueKind::String(_), ValueKind::Object(_)) => {
            let yp = to_primitive(ctx, y, PreferredType::Default)?;
            abstract_equality_comparison(ctx, x, &yp)
        }
        (ValueKind::Object(_), ValueKind::Number(_)) | (ValueKind::Object(_), ValueKind::String(_)) => {
            let xp = to_primitive(ctx, x, PreferredType::Default)?;
            abstract_equality_comparison(ctx, &xp, y)
        }
        _ => Ok(false),
    }
}

/// The abstract relational comparison `x < y`. `None` stands for the
/// undefined result produced when either side is NaN.
pub fn abstract_relational_comparison(
    ctx: &mut EvalContext,
    x: &JsValue,
    y: &JsValue,
    left_first: bool,
) -> Result<Option<bool>, JErrorType> {
    let (px, py) = if left_first {
        let px = to_primitive(ctx, x, PreferredType::Number)?;
        let py = to_primitive(ctx, y, PreferredType::Number)?;
        (px, py)
    } else {
        let py = to_primitive(ctx, y, PreferredType::Number)?;
        let px = to_primitive(ctx, x, PreferredType::Number)?;
        (px, py)
    };
    if let (Some(sx), Some(sy)) = (px.try_string(), py.try_string()) {
        return Ok(Some(sx.compare(&sy) == Ordering::Less));
    }
    let nx = to_number(ctx, &px)?;
    let ny = to_number(ctx, &py)?;
    if nx.is_nan() || ny.is_nan() {
        return Ok(None);
    }
    Ok(Some(nx < ny))
}
