//! End-to-end tests: host-written functions stand in for compiled code and
//! drive the runtime only through the `esa_*` primitives, the runtime entry
//! points and the source compiler hook.

extern crate esrt;


use std::rc::Rc;

use esrt::runner::api::*;
use esrt::runner::config::RuntimeConfig;
use esrt::runner::ds::error::JErrorType;
use esrt::runner::ds::frame::StackPtr;
use esrt::runner::ds::heap::{collect_cycles, live_objects, Heap, HeapConfig};
use esrt::runner::ds::string::JsString;
use esrt::runner::ds::value::JsValue;
use esrt::runner::runtime::{self, EXIT_FAILURE, EXIT_SUCCESS};
use esrt::runner::types::{CompiledSource, EvalContext, SourceCompiler};
use runtime_util::*;

fn raw(s: &str) -> u64 {
    esa_str_intern(s)
}

fn no_data(_ctx: &mut EvalContext) -> bool {
    true
}

// ============================================================================
// Closures
// ============================================================================

mod closure_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// function () { return ++count; }
    fn increment(ctx: &mut EvalContext, _argc: u32, fp: StackPtr, vp: StackPtr) -> bool {
        let mut count = JsValue::undefined();
        if !esa_ctx_get(ctx, raw("count"), &mut count) {
            return false;
        }
        let mut next = JsValue::undefined();
        if !esa_b_add(ctx, &count, &JsValue::number(1.0), &mut next) {
            return false;
        }
        if !esa_ctx_put(ctx, raw("count"), next.clone()) {
            return false;
        }
        esa_frm_set_result(ctx, fp, vp, next);
        true
    }

    /// function makeCounter(start) { var count = start; return function () { return ++count; }; }
    fn make_counter(ctx: &mut EvalContext, argc: u32, fp: StackPtr, vp: StackPtr) -> bool {
        if !esa_ctx_decl_var(ctx, false, false, raw("count")) {
            return false;
        }
        let start = esa_frm_arg(ctx, argc, fp, 0);
        if !esa_ctx_put(ctx, raw("count"), start) {
            return false;
        }
        let mut f = JsValue::undefined();
        if !esa_new_fun_expr(ctx, increment, false, 0, &mut f) {
            return false;
        }
        esa_frm_set_result(ctx, fp, vp, f);
        true
    }

    fn call0(ctx: &mut EvalContext, f: &JsValue) -> JsValue {
        let mut result = JsValue::undefined();
        assert!(esa_call(ctx, f, 0, &mut result));
        result
    }

    #[test]
    fn test_counters_keep_separate_state() {
        let mut ctx = context();
        let make = function(&mut ctx, make_counter, 1);
        esa_stk_push(&mut ctx, JsValue::number(0.0));
        let mut first = JsValue::undefined();
        assert!(esa_call(&mut ctx, &make, 1, &mut first));
        esa_stk_push(&mut ctx, JsValue::number(100.0));
        let mut second = JsValue::undefined();
        assert!(esa_call(&mut ctx, &make, 1, &mut second));

        assert_eq!(call0(&mut ctx, &first).as_number(), 1.0);
        assert_eq!(call0(&mut ctx, &first).as_number(), 2.0);
        assert_eq!(call0(&mut ctx, &second).as_number(), 101.0);
        assert_eq!(call0(&mut ctx, &first).as_number(), 3.0);

        let mut leaked = JsValue::undefined();
        assert!(!esa_ctx_get(&mut ctx, raw("count"), &mut leaked));
        esa_ex_clear(&mut ctx);
        assert_eq!(ctx.call_stack.size(), 0);
    }
}

// ============================================================================
// try / catch / finally
// ============================================================================

mod exception_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// function () { throw new TypeError("nope"); }
    fn thrower(ctx: &mut EvalContext, _argc: u32, _fp: StackPtr, _vp: StackPtr) -> bool {
        let ctor = {
            let mut c = JsValue::undefined();
            if !esa_ctx_get(ctx, raw("TypeError"), &mut c) {
                return false;
            }
            c
        };
        esa_stk_push(ctx, JsValue::str("nope"));
        let mut e = JsValue::undefined();
        if !esa_call_new(ctx, &ctor, 1, &mut e) {
            return false;
        }
        esa_ex_set(ctx, e);
        false
    }

    /// try { thrower(); } catch (e) { caught = e.message; } finally { cleaned = true; }
    fn try_catch_finally(ctx: &mut EvalContext, _argc: u32, _fp: StackPtr, _vp: StackPtr) -> bool {
        let mut ignored = JsValue::undefined();
        if !esa_call_named(ctx, raw("thrower"), 0, &mut ignored) {
            if !esa_ctx_enter_catch(ctx, raw("e")) {
                return false;
            }
            let mut e = JsValue::undefined();
            let mut message = JsValue::undefined();
            let ok = esa_ctx_get(ctx, raw("e"), &mut e)
                && esa_prp_get(ctx, &e, raw("message"), &mut message)
                && esa_ctx_put(ctx, raw("caught"), message);
            esa_ctx_leave(ctx);
            if !ok {
                return false;
            }
        }
        let state = esa_ex_save_state(ctx);
        esa_ex_clear(ctx);
        if !esa_ctx_put(ctx, raw("cleaned"), JsValue::boolean(true)) {
            return false;
        }
        esa_ex_load_state(ctx, state);
        true
    }

    /// try { thrower(); } finally { cleaned = true; }
    fn try_finally_rethrows(ctx: &mut EvalContext, _argc: u32, _fp: StackPtr, _vp: StackPtr) -> bool {
        let mut ignored = JsValue::undefined();
        let completed = esa_call_named(ctx, raw("thrower"), 0, &mut ignored);
        let state = esa_ex_save_state(ctx);
        esa_ex_clear(ctx);
        if !esa_ctx_put(ctx, raw("cleaned"), JsValue::boolean(true)) {
            return false;
        }
        esa_ex_load_state(ctx, state);
        completed
    }

    fn declare(ctx: &mut EvalContext) -> bool {
        let mut f = JsValue::undefined();
        esa_new_fun_decl(ctx, thrower, false, 0, &mut f)
            && esa_ctx_decl_fun(ctx, false, false, raw("thrower"), f)
            && esa_ctx_decl_var(ctx, false, false, raw("caught"))
            && esa_ctx_decl_var(ctx, false, false, raw("cleaned"))
    }

    #[test]
    fn test_catch_then_finally() {
        let mut ctx = runtime::init(RuntimeConfig::default(), declare).unwrap();
        runtime::run(&mut ctx, try_catch_finally).unwrap();
        let caught = global(&mut ctx, "caught");
        assert_eq!(text(&mut ctx, &caught), "nope");
        assert!(global(&mut ctx, "cleaned").as_boolean());
        assert!(esa_ex_get(&ctx).is_nothing());
    }

    #[test]
    fn test_finally_rethrows_pending_exception() {
        let mut ctx = runtime::init(RuntimeConfig::default(), declare).unwrap();
        let e = runtime::run(&mut ctx, try_finally_rethrows).unwrap_err();
        assert!(global(&mut ctx, "cleaned").as_boolean());
        assert!(global(&mut ctx, "caught").is_undefined());
        assert_eq!(runtime::format_exception(&mut ctx, e), "TypeError: nope");
    }

    #[test]
    fn test_uncaught_exception_exit_code() {
        assert_eq!(runtime::main(declare, try_catch_finally, RuntimeConfig::default()), EXIT_SUCCESS);
        assert_eq!(runtime::main(declare, try_finally_rethrows, RuntimeConfig::default()), EXIT_FAILURE);
    }

    /// function recurse() { return recurse(); }
    fn recurse(ctx: &mut EvalContext, _argc: u32, fp: StackPtr, vp: StackPtr) -> bool {
        let mut result = JsValue::undefined();
        if !esa_call_named(ctx, raw("recurse"), 0, &mut result) {
            return false;
        }
        esa_frm_set_result(ctx, fp, vp, result);
        true
    }

    fn declare_recurse(ctx: &mut EvalContext) -> bool {
        let mut f = JsValue::undefined();
        esa_new_fun_decl(ctx, recurse, false, 0, &mut f)
            && esa_ctx_decl_fun(ctx, false, false, raw("recurse"), f)
    }

    fn start_recursion(ctx: &mut EvalContext, argc: u32, fp: StackPtr, vp: StackPtr) -> bool {
        recurse(ctx, argc, fp, vp)
    }

    #[test]
    fn test_call_depth_limit() {
        let config = RuntimeConfig::new().with_max_call_depth(40);
        let mut ctx = runtime::init(config, declare_recurse).unwrap();
        let e = runtime::run(&mut ctx, start_recursion).unwrap_err();
        assert!(runtime::format_exception(&mut ctx, e).starts_with("RangeError"));
        assert_eq!(ctx.call_stack.size(), 0);
        assert_eq!(ctx.ctx_stack.len(), 1);
    }

    #[test]
    fn test_heap_limit() {
        let mut ctx = context();
        collect_cycles();
        ctx.heap = Heap::new(HeapConfig::with_limit(live_objects() + 2));
        let first = new_object(&mut ctx);
        let second = new_object(&mut ctx);
        let mut third = JsValue::undefined();
        assert!(!esa_new_obj(&mut ctx, &mut third));
        let e = esa_ex_get(&ctx);
        esa_ex_clear(&mut ctx);
        let name = get(&mut ctx, &e, "name");
        assert_eq!(text(&mut ctx, &name), "RangeError");
        drop(first);
        drop(second);
        drop(e);
        assert!(esa_new_obj(&mut ctx, &mut third));
    }

    /// function () {}
    fn empty_body(_ctx: &mut EvalContext, _argc: u32, _fp: StackPtr, _vp: StackPtr) -> bool {
        true
    }

    #[test]
    fn test_dropped_functions_are_reclaimed_under_heap_limit() {
        let mut ctx = context();
        collect_cycles();
        let limit = live_objects() + 100;
        ctx.heap = Heap::new(HeapConfig::with_limit(limit));
        for i in 0..1000 {
            let mut f = JsValue::undefined();
            assert!(esa_new_fun_expr(&mut ctx, empty_body, false, 0, &mut f), "failed at {}", i);
            let proto = get(&mut ctx, &f, "prototype");
            let ctor = get(&mut ctx, &proto, "constructor");
            assert!(ctor.same_object(&f.as_object()));
        }
        assert!(live_objects() <= limit);
    }

    #[test]
    fn test_reachable_functions_still_count_against_limit() {
        let mut ctx = context();
        collect_cycles();
        ctx.heap = Heap::new(HeapConfig::with_limit(live_objects() + 100));
        let mut kept = Vec::new();
        let mut failed = false;
        for _ in 0..100 {
            let mut f = JsValue::undefined();
            if !esa_new_fun_expr(&mut ctx, empty_body, false, 0, &mut f) {
                failed = true;
                break;
            }
            kept.push(f);
        }
        assert!(failed);
        let e = esa_ex_get(&ctx);
        esa_ex_clear(&mut ctx);
        let name = get(&mut ctx, &e, "name");
        assert_eq!(text(&mut ctx, &name), "RangeError");
        assert!(kept.len() <= 50);
    }
}

// ============================================================================
// for-in, with and arguments
// ============================================================================

mod scope_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// var keys = ""; for (var k in o) keys += k + ";"; return keys;
    fn collect_keys(ctx: &mut EvalContext, argc: u32, fp: StackPtr, vp: StackPtr) -> bool {
        let o = esa_frm_arg(ctx, argc, fp, 0);
        let mut it = None;
        if !esa_prp_it_new(ctx, &o, &mut it) {
            return false;
        }
        let mut keys = JsValue::str("");
        if let Some(mut it) = it {
            let mut k = JsValue::undefined();
            while esa_prp_it_next(&mut it, &mut k) {
                let mut with_key = JsValue::undefined();
                if !esa_b_add(ctx, &keys, &k, &mut with_key) {
                    return false;
                }
                if !esa_b_add(ctx, &with_key, &JsValue::str(";"), &mut keys) {
                    return false;
                }
            }
        }
        esa_frm_set_result(ctx, fp, vp, keys);
        true
    }

    fn keys_of(ctx: &mut EvalContext, o: JsValue) -> String {
        let f = function(ctx, collect_keys, 1);
        esa_stk_push(ctx, o);
        let mut result = JsValue::undefined();
        assert!(esa_call(ctx, &f, 1, &mut result));
        text(ctx, &result)
    }

    #[test]
    fn test_for_in_order_and_inherited_keys() {
        let mut ctx = context();
        let proto = new_object(&mut ctx);
        put(&mut ctx, &proto, "inherited", JsValue::number(1.0));
        let object_ctor = global(&mut ctx, "Object");
        let o = call_method(&mut ctx, &object_ctor, "create", &[proto]).unwrap();
        put(&mut ctx, &o, "z", JsValue::number(1.0));
        put(&mut ctx, &o, "1", JsValue::number(1.0));
        put(&mut ctx, &o, "a", JsValue::number(1.0));
        assert_eq!(keys_of(&mut ctx, o), "1;z;a;inherited;");
    }

    #[test]
    fn test_for_in_skips_non_enumerable_and_shadowed() {
        let mut ctx = context();
        let a = numbers(&mut ctx, &[5.0, 6.0]);
        assert_eq!(keys_of(&mut ctx, a), "0;1;");
        assert_eq!(keys_of(&mut ctx, JsValue::null()), "");
        assert_eq!(keys_of(&mut ctx, JsValue::str("hi")), "0;1;");
    }

    /// with (o) { x = x * 2; y = 1; }
    fn with_block(ctx: &mut EvalContext, argc: u32, fp: StackPtr, _vp: StackPtr) -> bool {
        let o = esa_frm_arg(ctx, argc, fp, 0);
        if !esa_ctx_enter_with(ctx, &o) {
            return false;
        }
        let mut x = JsValue::undefined();
        let mut doubled = JsValue::undefined();
        let ok = esa_ctx_get(ctx, raw("x"), &mut x)
            && esa_b_mul(ctx, &x, &JsValue::number(2.0), &mut doubled)
            && esa_ctx_put(ctx, raw("x"), doubled)
            && esa_ctx_put(ctx, raw("y"), JsValue::number(1.0));
        esa_ctx_leave(ctx);
        ok
    }

    #[test]
    fn test_with_writes_object_then_global() {
        let mut ctx = context();
        let o = new_object(&mut ctx);
        put(&mut ctx, &o, "x", JsValue::number(21.0));
        let f = function(&mut ctx, with_block, 1);
        esa_stk_push(&mut ctx, o.clone());
        let mut ignored = JsValue::undefined();
        assert!(esa_call(&mut ctx, &f, 1, &mut ignored));
        assert_eq!(get(&mut ctx, &o, "x").as_number(), 42.0);
        assert!(get(&mut ctx, &o, "y").is_undefined());
        assert_eq!(global(&mut ctx, "y").as_number(), 1.0);
    }

    /// function (a) { arguments[0] = 9; var before = a; a = 4; return before + ":" + arguments[0]; }
    fn mapped_arguments(ctx: &mut EvalContext, argc: u32, fp: StackPtr, vp: StackPtr) -> bool {
        let a = esa_frm_arg(ctx, argc, fp, 0);
        if !esa_ctx_decl_prm(ctx, false, raw("a"), a) {
            return false;
        }
        let mut args = JsValue::undefined();
        if !esa_args_obj_init(ctx, argc, fp, vp, &mut args) {
            return false;
        }
        if !esa_args_obj_link(ctx, &args, 0, raw("a")) {
            return false;
        }
        let zero = JsValue::number(0.0);
        let mut before = JsValue::undefined();
        let mut after = JsValue::undefined();
        let ok = esa_prp_put_slow(ctx, &args, &zero, JsValue::number(9.0))
            && esa_ctx_get(ctx, raw("a"), &mut before)
            && esa_ctx_put(ctx, raw("a"), JsValue::number(4.0))
            && esa_prp_get_slow(ctx, &args, &zero, &mut after);
        if !ok {
            return false;
        }
        let mut left = JsValue::undefined();
        let mut out = JsValue::undefined();
        if !esa_b_add(ctx, &before, &JsValue::str(":"), &mut left)
            || !esa_b_add(ctx, &left, &after, &mut out)
        {
            return false;
        }
        esa_frm_set_result(ctx, fp, vp, out);
        true
    }

    #[test]
    fn test_arguments_alias_parameters() {
        let mut ctx = context();
        let f = function(&mut ctx, mapped_arguments, 1);
        esa_stk_push(&mut ctx, JsValue::number(1.0));
        let mut result = JsValue::undefined();
        assert!(esa_call(&mut ctx, &f, 1, &mut result));
        assert_eq!(text(&mut ctx, &result), "9:4");
    }

    #[test]
    fn test_unpassed_parameter_is_not_mapped() {
        let mut ctx = context();
        let f = function(&mut ctx, mapped_arguments, 1);
        let mut result = JsValue::undefined();
        assert!(esa_call(&mut ctx, &f, 0, &mut result));
        assert_eq!(text(&mut ctx, &result), "undefined:9");
    }
}

// ============================================================================
// eval through a source compiler
// ============================================================================

mod eval_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// var fromEval = 5; fromEval
    fn eval_body(ctx: &mut EvalContext, _argc: u32, fp: StackPtr, vp: StackPtr) -> bool {
        if !esa_ctx_decl_var(ctx, true, false, raw("fromEval")) {
            return false;
        }
        if !esa_ctx_put(ctx, raw("fromEval"), JsValue::number(5.0)) {
            return false;
        }
        esa_frm_set_result(ctx, fp, vp, JsValue::number(5.0));
        true
    }

    /// "use strict"; var fromEval = 5;
    fn strict_eval_body(ctx: &mut EvalContext, argc: u32, fp: StackPtr, vp: StackPtr) -> bool {
        esa_ctx_set_strict(ctx, true);
        eval_body(ctx, argc, fp, vp)
    }

    /// function (x, y) { return x * y; }
    fn multiply(ctx: &mut EvalContext, argc: u32, fp: StackPtr, vp: StackPtr) -> bool {
        let x = esa_frm_arg(ctx, argc, fp, 0);
        let y = esa_frm_arg(ctx, argc, fp, 1);
        let mut product = JsValue::undefined();
        if !esa_b_mul(ctx, &x, &y, &mut product) {
            return false;
        }
        esa_frm_set_result(ctx, fp, vp, product);
        true
    }

    struct TableCompiler;

    impl SourceCompiler for TableCompiler {
        fn compile_eval(&self, source: &JsString, _strict: bool) -> Result<CompiledSource, JErrorType> {
            match source.to_string().as_str() {
                "var fromEval = 5" => Ok(CompiledSource {
                    code: eval_body,
                    param_count: 0,
                    strict: false,
                }),
                "'use strict'; var fromEval = 5" => Ok(CompiledSource {
                    code: strict_eval_body,
                    param_count: 0,
                    strict: true,
                }),
                other => Err(JErrorType::SyntaxError(format!("cannot compile '{}'", other))),
            }
        }

        fn compile_function(&self, params: &JsString, body: &JsString) -> Result<CompiledSource, JErrorType> {
            if params.to_string() == "x,y" && body.to_string() == "return x * y" {
                Ok(CompiledSource {
                    code: multiply,
                    param_count: 2,
                    strict: false,
                })
            } else {
                Err(JErrorType::SyntaxError("unexpected function source".to_string()))
            }
        }
    }

    fn eval_context() -> EvalContext {
        let mut ctx = context();
        ctx.set_source_compiler(Rc::new(TableCompiler));
        ctx
    }

    /// function () { var r = eval(src); return typeof fromEval; }
    fn direct_eval_caller(ctx: &mut EvalContext, argc: u32, fp: StackPtr, vp: StackPtr) -> bool {
        let src = esa_frm_arg(ctx, argc, fp, 0);
        esa_stk_push(ctx, src);
        let mut r = JsValue::undefined();
        if !esa_call_named(ctx, raw("eval"), 1, &mut r) {
            return false;
        }
        let mut v = JsValue::undefined();
        if !esa_ctx_get(ctx, raw("fromEval"), &mut v) {
            esa_ex_clear(ctx);
        }
        let mut t = JsValue::undefined();
        esa_u_typeof(&v, &mut t);
        esa_frm_set_result(ctx, fp, vp, t);
        true
    }

    fn run_caller(ctx: &mut EvalContext, src: &str) -> String {
        let f = function(ctx, direct_eval_caller, 1);
        esa_stk_push(ctx, JsValue::str(src));
        let mut result = JsValue::undefined();
        assert!(esa_call(ctx, &f, 1, &mut result));
        text(ctx, &result)
    }

    #[test]
    fn test_direct_eval_declares_in_caller() {
        let mut ctx = eval_context();
        assert_eq!(run_caller(&mut ctx, "var fromEval = 5"), "number");
        assert!(global(&mut ctx, "fromEval").is_undefined());
    }

    #[test]
    fn test_strict_eval_gets_own_environment() {
        let mut ctx = eval_context();
        assert_eq!(run_caller(&mut ctx, "'use strict'; var fromEval = 5"), "undefined");
    }

    #[test]
    fn test_indirect_eval_declares_global() {
        let mut ctx = eval_context();
        let eval = global(&mut ctx, "eval");
        esa_stk_push(&mut ctx, JsValue::str("var fromEval = 5"));
        let mut result = JsValue::undefined();
        assert!(esa_call(&mut ctx, &eval, 1, &mut result));
        assert_eq!(result.as_number(), 5.0);
        assert_eq!(global(&mut ctx, "fromEval").as_number(), 5.0);
        let mut deleted = JsValue::undefined();
        assert!(esa_ctx_del(&mut ctx, raw("fromEval"), &mut deleted));
        assert!(deleted.as_boolean());
    }

    #[test]
    fn test_compile_error_is_syntax_error() {
        let mut ctx = eval_context();
        let e = call_global(&mut ctx, "eval", &[JsValue::str("}")]).unwrap_err();
        let name = get(&mut ctx, &e, "name");
        assert_eq!(text(&mut ctx, &name), "SyntaxError");
    }

    #[test]
    fn test_function_constructor() {
        let mut ctx = eval_context();
        let f = construct_global(&mut ctx, "Function", &[JsValue::str("x"), JsValue::str("y"), JsValue::str("return x * y")])
            .unwrap();
        let v = call_method(&mut ctx, &f, "call", &[JsValue::null(), JsValue::number(6.0), JsValue::number(7.0)])
            .unwrap();
        assert_eq!(v.as_number(), 42.0);
        assert_eq!(get(&mut ctx, &f, "length").as_number(), 2.0);
    }
}

// ============================================================================
// Host helpers
// ============================================================================

mod host_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// print("answer: " + 42)
    fn print_answer(ctx: &mut EvalContext, _argc: u32, _fp: StackPtr, _vp: StackPtr) -> bool {
        let mut msg = JsValue::undefined();
        if !esa_b_add(ctx, &JsValue::str("answer: "), &JsValue::number(42.0), &mut msg) {
            return false;
        }
        esa_stk_push(ctx, msg);
        let mut ignored = JsValue::undefined();
        esa_call_named(ctx, raw("print"), 1, &mut ignored)
    }

    #[test]
    fn test_print_writes_line() {
        let mut ctx = runtime::init(RuntimeConfig::default(), no_data).unwrap();
        ctx.capture_output();
        runtime::run(&mut ctx, print_answer).unwrap();
        assert_eq!(ctx.take_output(), vec!["answer: 42".to_string()]);
    }

    #[test]
    fn test_error_helper_prefixes_message() {
        let mut ctx = context();
        let e = call_global(&mut ctx, "$ERROR", &[JsValue::str("bad")]).unwrap_err();
        let message = get(&mut ctx, &e, "message");
        assert_eq!(text(&mut ctx, &message), "test262 error: bad");
    }
}
