//! Math built-in object.
//!
//! Provides mathematical constants and functions.

use crate::runner::ds::error::JErrorType;
use crate::runner::ds::operations::type_conversion::to_number;
use crate::runner::ds::value::JsValue;
use crate::runner::types::{arg, BuiltInObject, EvalContext};

/// Register the Math object.
pub fn register(ctx: &mut EvalContext) -> Result<(), JErrorType> {
    BuiltInObject::new("Math")
        // Constants
        .add_property("E", JsValue::number(std::f64::consts::E))
        .add_property("LN10", JsValue::number(std::f64::consts::LN_10))
        .add_property("LN2", JsValue::number(std::f64::consts::LN_2))
        .add_property("LOG10E", JsValue::number(std::f64::consts::LOG10_E))
        .add_property("LOG2E", JsValue::number(std::f64::consts::LOG2_E))
        .add_property("PI", JsValue::number(std::f64::consts::PI))
        .add_property("SQRT1_2", JsValue::number(std::f64::consts::FRAC_1_SQRT_2))
        .add_property("SQRT2", JsValue::number(std::f64::consts::SQRT_2))
        // Methods
        .add_method("abs", math_abs, 1)
        .add_method("acos", math_acos, 1)
        .add_method("asin", math_asin, 1)
        .add_method("atan", math_atan, 1)
        .add_method("atan2", math_atan2, 2)
        .add_method("ceil", math_ceil, 1)
        .add_method("cos", math_cos, 1)
        .add_method("exp", math_exp, 1)
        .add_method("floor", math_floor, 1)
        .add_method("log", math_log, 1)
        .add_method("max", math_max, 2)
        .add_method("min", math_min, 2)
        .add_method("pow", math_pow, 2)
        .add_method("random", math_random, 0)
        .add_method("round", math_round, 1)
        .add_method("sin", math_sin, 1)
        .add_method("sqrt", math_sqrt, 1)
        .add_method("tan", math_tan, 1)
        .register(ctx)?;
    Ok(())
}

/// Applies `f` to ToNumber of the first argument.
fn unary(
    ctx: &mut EvalContext,
    args: &[JsValue],
    f: impl Fn(f64) -> f64,
) -> Result<JsValue, JErrorType> {
    let x = to_number(ctx, &arg(args, 0))?;
    Ok(JsValue::number(f(x)))
}

/// Math.abs
fn math_abs(ctx: &mut EvalContext, _this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    unary(ctx, &args, f64::abs)
}

/// Math.acos
fn math_acos(ctx: &mut EvalContext, _this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    unary(ctx, &args, f64::acos)
}

/// Math.asin
fn math_asin(ctx: &mut EvalContext, _this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    unary(ctx, &args, f64::asin)
}

/// Math.atan
fn math_atan(ctx: &mut EvalContext, _this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    unary(ctx, &args, f64::atan)
}

/// Math.atan2
fn math_atan2(ctx: &mut EvalContext, _this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let y = to_number(ctx, &arg(&args, 0))?;
    let x = to_number(ctx, &arg(&args, 1))?;
    Ok(JsValue::number(y.atan2(x)))
}

/// Math.ceil
fn math_ceil(ctx: &mut EvalContext, _this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    unary(ctx, &args, f64::ceil)
}

/// Math.cos
fn math_cos(ctx: &mut EvalContext, _this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    unary(ctx, &args, f64::cos)
}

/// Math.exp
fn math_exp(ctx: &mut EvalContext, _this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    unary(ctx, &args, f64::exp)
}

/// Math.floor
fn math_floor(ctx: &mut EvalContext, _this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    unary(ctx, &args, f64::floor)
}

/// Math.log
fn math_log(ctx: &mut EvalContext, _this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    unary(ctx, &args, f64::ln)
}

/// Folds all arguments; every argument is converted even after a NaN.
fn extremum(
    ctx: &mut EvalContext,
    args: &[JsValue],
    start: f64,
    pick_right: impl Fn(f64, f64) -> bool,
) -> Result<JsValue, JErrorType> {
    let mut result = start;
    let mut nan = false;
    for a in args {
        let n = to_number(ctx, a)?;
        if n.is_nan() {
            nan = true;
        } else if pick_right(result, n) {
            result = n;
        }
    }
    Ok(JsValue::number(if nan { f64::NAN } else { result }))
}

/// Math.max
fn math_max(ctx: &mut EvalContext, _this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    // +0 is larger than -0 here
    extremum(ctx, &args, f64::NEG_INFINITY, |cur, n| {
        n > cur || (n == 0.0 && cur == 0.0 && cur.is_sign_negative() && n.is_sign_positive())
    })
}

/// Math.min
fn math_min(ctx: &mut EvalContext, _this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    extremum(ctx, &args, f64::INFINITY, |cur, n| {
        n < cur || (n == 0.0 && cur == 0.0 && cur.is_sign_positive() && n.is_sign_negative())
    })
}

/// Exponentiation with the ES5 special cases that differ from `powf`.
pub fn pow(x: f64, y: f64) -> f64 {
    if y.is_nan() {
        return f64::NAN;
    }
    if y == 0.0 {
        return 1.0;
    }
    if x.abs() == 1.0 && y.is_infinite() {
        return f64::NAN;
    }
    x.powf(y)
}

/// Math.pow
fn math_pow(ctx: &mut EvalContext, _this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    let x = to_number(ctx, &arg(&args, 0))?;
    let y = to_number(ctx, &arg(&args, 1))?;
    Ok(JsValue::number(pow(x, y)))
}

/// Math.random
fn math_random(_ctx: &mut EvalContext, _this: JsValue, _args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    Ok(JsValue::number(rand::random::<f64>()))
}

/// Rounds half up, keeping the sign of zero results for negative inputs.
pub fn round(x: f64) -> f64 {
    if !x.is_finite() || x == 0.0 || x.abs() >= 4503599627370496.0 {
        return x;
    }
    if x > 0.0 && x < 0.5 {
        return 0.0;
    }
    if x < 0.0 && x >= -0.5 {
        return -0.0;
    }
    let r = x.floor();
    if x - r >= 0.5 {
        r + 1.0
    } else {
        r
    }
}

/// Math.round
fn math_round(ctx: &mut EvalContext, _this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    unary(ctx, &args, round)
}

/// Math.sin
fn math_sin(ctx: &mut EvalContext, _this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    unary(ctx, &args, f64::sin)
}

/// Math.sqrt
fn math_sqrt(ctx: &mut EvalContext, _this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    unary(ctx, &args, f64::sqrt)
}

/// Math.tan
fn math_tan(ctx: &mut EvalContext, _this: JsValue, args: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    unary(ctx, &args, f64::tan)
}
