//! Function and value properties of the global object (15.1.1, 15.1.2).

use log::debug;

use crate::parser::RuntimeParser;
use crate::runner::ds::error::{JErrorType, Message};
use crate::runner::ds::execution_context::{ContextKind, ExecutionContext};
use crate::runner::ds::function_object::EsaFunction;
use crate::runner::ds::lex_env::JsLexEnvironmentType;
use crate::runner::ds::operations::lex_env::new_declarative_environment;
use crate::runner::ds::operations::type_conversion::{to_int32, to_number, to_string};
use crate::runner::ds::value::JsValue;
use crate::runner::text::unicode::{digit_value, is_trimmable};
use crate::runner::types::{arg, define_global_function, define_global_value, EvalContext};

pub fn register(ctx: &mut EvalContext) -> Result<(), JErrorType> {
    define_global_value(ctx, "NaN", JsValue::number(f64::NAN));
    define_global_value(ctx, "Infinity", JsValue::number(f64::INFINITY));
    define_global_value(ctx, "undefined", JsValue::undefined());
    define_global_function(ctx, "eval", global_eval, 1)?;
    define_global_function(ctx, "parseInt", global_parse_int, 2)?;
    define_global_function(ctx, "parseFloat", global_parse_float, 1)?;
    define_global_function(ctx, "isNaN", global_is_nan, 1)?;
    define_global_function(ctx, "isFinite", global_is_finite, 1)?;
    Ok(())
}

/// parseInt over code units (15.1.2.2).
pub fn parse_int(units: &[u16], radix: i32) -> f64 {
    let start = units.iter().position(|&c| !is_trimmable(c)).unwrap_or(units.len());
    let mut s = &units[start..];
    let mut sign = 1.0;
    if let Some(&c) = s.first() {
        if c == '-' as u16 || c == '+' as u16 {
            if c == '-' as u16 {
                sign = -1.0;
            }
            s = &s[1..];
        }
    }
    let mut radix = radix;
    let mut strip_prefix = true;
    if radix != 0 {
        if !(2..=36).contains(&radix) {
            return f64::NAN;
        }
        if radix != 16 {
            strip_prefix = false;
        }
    } else {
        radix = 10;
    }
    if strip_prefix
        && s.len() >= 2
        && s[0] == '0' as u16
        && (s[1] == 'x' as u16 || s[1] == 'X' as u16)
    {
        s = &s[2..];
        radix = 16;
    }
    let digits: Vec<u32> = s
        .iter()
        .map_while(|&c| digit_value(c).filter(|&d| d < radix as u32))
        .collect();
    if digits.is_empty() {
        return f64::NAN;
    }
    let value = if radix == 10 {
        // exact decimal rounding for long inputs
        let text: String = digits.iter().filter_map(|&d| char::from_digit(d, 10)).collect();
        text.parse::<f64>().unwrap_or(f64::NAN)
    } else {
        digits.iter().fold(0.0, |acc, &d| acc * radix as f64 + d as f64)
    };
    sign * value
}

/// parseInt(string, radix)
fn global_parse_int(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = to_string(ctx, &arg(&args, 0))?;
    let radix = to_int32(ctx, &arg(&args, 1))?;
    Ok(JsValue::number(parse_int(s.units(), radix)))
}

/// parseFloat(string)
fn global_parse_float(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = to_string(ctx, &arg(&args, 0))?;
    let n = RuntimeParser::parse_float_prefix(s.to_utf8()).unwrap_or(f64::NAN);
    Ok(JsValue::number(n))
}

/// isNaN(number)
fn global_is_nan(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::from(to_number(ctx, &arg(&args, 0))?.is_nan()))
}

/// isFinite(number)
fn global_is_finite(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::from(to_number(ctx, &arg(&args, 0))?.is_finite()))
}

/// Runs compiled eval code in a fresh eval context over the given
/// environments (10.4.2).
fn run_eval_code(
    ctx: &mut EvalContext,
    code: EsaFunction,
    lex_env: JsLexEnvironmentType,
    var_env: JsLexEnvironmentType,
    this_binding: JsValue,
    strict: bool,
) -> Result<JsValue, JErrorType> {
    let context_depth = ctx.ctx_stack.len();
    ctx.ctx_stack.push_execution_ctx(ExecutionContext {
        kind: ContextKind::Eval,
        function: None,
        lex_env,
        var_env,
        this_binding: this_binding.clone(),
        strict,
    });
    let frame = ctx
        .call_stack
        .push_frame_excl_args(0, 0, JsValue::undefined(), this_binding);
    let ok = code(ctx, 0, frame.fp, frame.vp);
    let result = ctx.call_stack.pop_frame(&frame);
    ctx.ctx_stack.truncate(context_depth);
    if ok {
        return Ok(result);
    }
    let exception = ctx.ctx_stack.take_pending_exception();
    if exception.is_nothing() {
        Ok(JsValue::undefined())
    } else {
        Err(JErrorType::Thrown(exception))
    }
}

/// eval(x) (15.1.2.1). A direct call, flagged by the call primitives,
/// evaluates in the caller's environments; any other call uses the global
/// environment.
fn global_eval(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let direct = ctx.take_direct_eval();
    let source = match arg(&args, 0).try_string() {
        Some(s) => s,
        None => return Ok(arg(&args, 0)),
    };
    let compiler = ctx
        .source_compiler()
        .ok_or_else(|| JErrorType::from(Message::NoSourceCompiler))?;
    let caller_strict = direct && ctx.is_strict();
    debug!("eval of {} code units, direct={}", source.len(), direct);
    let compiled = compiler.compile_eval(&source, caller_strict)?;
    let strict = caller_strict || compiled.strict;
    let (lex_env, var_env, this_binding) = if direct {
        (ctx.lex_env(), ctx.var_env(), ctx.this_binding())
    } else {
        (ctx.global_env(), ctx.global_env(), JsValue::object(ctx.global_object()))
    };
    let (lex_env, var_env) = if strict {
        let env = new_declarative_environment(Some(lex_env));
        (env.clone(), env)
    } else {
        (lex_env, var_env)
    };
    run_eval_code(ctx, compiled.code, lex_env, var_env, this_binding, strict)
}
