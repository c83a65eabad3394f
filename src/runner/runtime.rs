//! Program entry: bootstraps the realm, runs compiled global code and maps
//! the outcome to a process exit code.

use log::{debug, error};

use crate::runner::config::RuntimeConfig;
use crate::runner::ds::error::JErrorType;
use crate::runner::ds::function_object::EsaFunction;
use crate::runner::ds::operations::type_conversion::{to_string, type_name};
use crate::runner::ds::value::JsValue;
use crate::runner::types::EvalContext;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// Generated code that registers interned strings and global declarations.
pub type GlobalDataFn = fn(&mut EvalContext) -> bool;

fn take_exception(ctx: &mut EvalContext) -> JErrorType {
    let exception = ctx.ctx_stack.take_pending_exception();
    if exception.is_nothing() {
        JErrorType::Error("global code failed without an exception".to_string())
    } else {
        JErrorType::Thrown(exception)
    }
}

/// Creates the realm and the global object, then runs `global_data`.
pub fn init(config: RuntimeConfig, global_data: GlobalDataFn) -> Result<EvalContext, JErrorType> {
    let mut ctx = EvalContext::new(config)?;
    debug!("running global data initialiser");
    if !global_data(&mut ctx) {
        return Err(take_exception(&mut ctx));
    }
    Ok(ctx)
}

/// Runs the compiled entry point in a fresh top-level frame whose `this`
/// is the global object.
pub fn run(ctx: &mut EvalContext, global_main: EsaFunction) -> Result<JsValue, JErrorType> {
    let this = JsValue::object(ctx.global_object());
    let frame = ctx
        .call_stack
        .push_frame_excl_args(0, 0, JsValue::undefined(), this);
    let ok = global_main(ctx, 0, frame.fp, frame.vp);
    let result = ctx.call_stack.pop_frame(&frame);
    if ok {
        Ok(result)
    } else {
        Err(take_exception(ctx))
    }
}

/// `ToString(exception)`; Error objects render as `Name: message`.
pub fn format_exception(ctx: &mut EvalContext, e: JErrorType) -> String {
    let value = ctx.error_to_value(e);
    match to_string(ctx, &value) {
        Ok(s) => s.to_string(),
        Err(_) => format!("<{}>", type_name(&value)),
    }
}

/// Reports an uncaught exception on stderr and returns the failure code.
pub fn report_uncaught(ctx: &mut EvalContext, e: JErrorType) -> i32 {
    let message = format_exception(ctx, e);
    error!("uncaught exception: {}", message);
    eprintln!("Uncaught {}", message);
    EXIT_FAILURE
}

/// init followed by run, as a process exit code.
pub fn main(global_data: GlobalDataFn, global_main: EsaFunction, config: RuntimeConfig) -> i32 {
    let mut ctx = match init(config, global_data) {
        Ok(ctx) => ctx,
        Err(JErrorType::Thrown(v)) => {
            error!("initialisation failed: {:?}", v);
            eprintln!("Uncaught {:?}", v);
            return EXIT_FAILURE;
        }
        Err(e) => {
            error!("initialisation failed: {}", e);
            eprintln!("Uncaught {}", e);
            return EXIT_FAILURE;
        }
    };
    match run(&mut ctx, global_main) {
        Ok(_) => EXIT_SUCCESS,
        Err(e) => report_uncaught(&mut ctx, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::api::{
        esa_ctx_decl_var, esa_ctx_get, esa_ctx_put, esa_ex_set, esa_frm_set_result, esa_str_intern,
    };
    use crate::runner::ds::error::ErrorKind;
    use crate::runner::ds::frame::StackPtr;

    fn no_data(_ctx: &mut EvalContext) -> bool {
        true
    }

    /// var answer;
    fn declare_answer(ctx: &mut EvalContext) -> bool {
        esa_ctx_decl_var(ctx, false, false, esa_str_intern("answer"))
    }

    /// answer = 42; answer
    fn set_answer(ctx: &mut EvalContext, _argc: u32, fp: StackPtr, vp: StackPtr) -> bool {
        let key = esa_str_intern("answer");
        if !esa_ctx_put(ctx, key, JsValue::number(42.0)) {
            return false;
        }
        let mut v = JsValue::undefined();
        if !esa_ctx_get(ctx, key, &mut v) {
            return false;
        }
        esa_frm_set_result(ctx, fp, vp, v);
        true
    }

    fn throw_error(ctx: &mut EvalContext, _argc: u32, _fp: StackPtr, _vp: StackPtr) -> bool {
        let e = ctx.new_error(ErrorKind::RangeError, "too far").unwrap();
        esa_ex_set(ctx, JsValue::object(e));
        false
    }

    fn fail_data(ctx: &mut EvalContext) -> bool {
        esa_ex_set(ctx, JsValue::str("bad data"));
        false
    }

    #[test]
    fn test_run_returns_result() {
        let mut ctx = init(RuntimeConfig::default(), declare_answer).unwrap();
        let v = run(&mut ctx, set_answer).unwrap();
        assert_eq!(v.as_number(), 42.0);
        assert_eq!(ctx.call_stack.size(), 0);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(main(declare_answer, set_answer, RuntimeConfig::default()), EXIT_SUCCESS);
        assert_eq!(main(no_data, throw_error, RuntimeConfig::default()), EXIT_FAILURE);
        assert_eq!(main(fail_data, set_answer, RuntimeConfig::default()), EXIT_FAILURE);
    }

    #[test]
    fn test_format_uses_error_to_string() {
        let mut ctx = init(RuntimeConfig::default(), no_data).unwrap();
        let e = run(&mut ctx, throw_error).unwrap_err();
        assert_eq!(format_exception(&mut ctx, e), "RangeError: too far");
        let thrown = JErrorType::Thrown(JsValue::number(3.0));
        assert_eq!(format_exception(&mut ctx, thrown), "3");
    }
}
