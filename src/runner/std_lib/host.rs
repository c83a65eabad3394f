//! Host functions used by conformance test harnesses: `print`, `error`,
//! `runTestCase` and the small helpers the harness includes expect.

use crate::runner::ds::error::{ErrorKind, JErrorType};
use crate::runner::ds::function_object::call;
use crate::runner::ds::object::{self, JsObjectType};
use crate::runner::ds::object_property::PropertyKey;
use crate::runner::ds::operations::lex_env::get_identifier_reference;
use crate::runner::ds::operations::object::length_of_array_like;
use crate::runner::ds::operations::test_and_comparison::{
    abstract_relational_comparison, strict_equality_comparison,
};
use crate::runner::ds::operations::type_conversion::{to_boolean, to_object, to_string};
use crate::runner::ds::value::JsValue;
use crate::runner::types::{arg, define_global_function, EvalContext};

const FAILURE_PREFIX: &str = "test262 error: ";

pub fn register(ctx: &mut EvalContext) -> Result<(), JErrorType> {
    for name in ["print", "PRINT", "$PRINT"] {
        define_global_function(ctx, name, host_print, 1)?;
    }
    for name in ["error", "ERROR", "$ERROR", "$FAIL"] {
        define_global_function(ctx, name, host_error, 1)?;
    }
    define_global_function(ctx, "runTestCase", host_run_test_case, 1)?;
    define_global_function(ctx, "fnGlobalObject", host_fn_global_object, 0)?;
    define_global_function(ctx, "fnExists", host_fn_exists, 1)?;
    define_global_function(ctx, "compareArray", host_compare_array, 2)?;
    define_global_function(ctx, "arrayContains", host_array_contains, 2)?;
    Ok(())
}

fn failure(message: &str) -> JErrorType {
    JErrorType::new(ErrorKind::Error, format!("{}{}", FAILURE_PREFIX, message))
}

/// print(message) - Writes ToString(message) and a newline.
fn host_print(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    if let Some(message) = args.first() {
        let line = to_string(ctx, message)?;
        ctx.write_line(line.to_string());
    }
    Ok(JsValue::undefined())
}

/// error(message) - Throws an Error carrying the harness prefix.
fn host_error(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    match args.first() {
        Some(message) => {
            let message = to_string(ctx, message)?;
            Err(failure(message.to_utf8()))
        }
        None => Ok(JsValue::undefined()),
    }
}

/// runTestCase(testcase) - Fails unless the test function returns a
/// truthy value.
fn host_run_test_case(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let test = match args.first().and_then(|f| f.try_object()) {
        Some(f) if f.borrow().is_callable() => f,
        _ => return Err(failure("runTestCase failed, no test function.")),
    };
    let this = ctx.this_binding();
    if !to_boolean(&call(ctx, &test, this, Vec::new())?) {
        return Err(failure("runTestCase failed."));
    }
    Ok(JsValue::undefined())
}

/// fnGlobalObject()
fn host_fn_global_object(
    ctx: &mut EvalContext,
    _this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::object(ctx.global_object()))
}

/// fnExists(name) - Whether `name` resolves from the running context.
fn host_fn_exists(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let name = to_string(ctx, &arg(&args, 0))?;
    let reference = get_identifier_reference(Some(ctx.lex_env()), name, false);
    Ok(JsValue::from(!reference.is_unresolvable()))
}

fn elements(ctx: &mut EvalContext, o: &JsObjectType) -> Result<Vec<JsValue>, JErrorType> {
    let len = length_of_array_like(ctx, o)?;
    let mut items = Vec::with_capacity(len as usize);
    for i in 0..len {
        items.push(object::get(ctx, o, &PropertyKey::from_u32(i))?);
    }
    Ok(items)
}

/// Insertion sort by the `<` operator; comparison errors propagate.
fn sort_by_less_than(ctx: &mut EvalContext, items: &mut [JsValue]) -> Result<(), JErrorType> {
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 {
            let less = abstract_relational_comparison(ctx, &items[j], &items[j - 1], true)?;
            if less != Some(true) {
                break;
            }
            items.swap(j, j - 1);
            j -= 1;
        }
    }
    Ok(())
}

/// compareArray(a, b) - Whether both hold the same elements, in any order.
fn host_compare_array(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let a = to_object(ctx, &arg(&args, 0))?;
    let b = to_object(ctx, &arg(&args, 1))?;
    let mut left = elements(ctx, &a)?;
    let mut right = elements(ctx, &b)?;
    if left.len() != right.len() {
        return Ok(JsValue::from(false));
    }
    sort_by_less_than(ctx, &mut left)?;
    sort_by_less_than(ctx, &mut right)?;
    let same = left
        .iter()
        .zip(right.iter())
        .all(|(x, y)| strict_equality_comparison(x, y));
    Ok(JsValue::from(same))
}

/// arrayContains(array, expected) - Whether every expected element occurs.
fn host_array_contains(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let array = to_object(ctx, &arg(&args, 0))?;
    let expected = to_object(ctx, &arg(&args, 1))?;
    let haystack = elements(ctx, &array)?;
    let needles = elements(ctx, &expected)?;
    let all = needles
        .iter()
        .all(|e| haystack.iter().any(|a| strict_equality_comparison(e, a)));
    Ok(JsValue::from(all))
}
