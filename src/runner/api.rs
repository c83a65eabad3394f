//! The `esa_*` primitives called by ahead-of-time compiled code.
//!
//! Every fallible primitive reports failure by returning `false` after
//! depositing the exception in the running context's pending-exception slot.
//! Results are written through `result` out parameters so that compiled code
//! can keep them in frame slots. Property names arrive as raw key ids (see
//! [`PropertyKey::to_raw`]) registered with [`esa_str_intern`].

use std::rc::Rc;

use log::trace;

use crate::runner::ds::error::{JErrorType, Message};
use crate::runner::ds::execution_context::{ContextKind, ExecutionContext};
use crate::runner::ds::frame::{CallFrame, StackPtr};
use crate::runner::ds::function_object::{
    call_pushed, construct, new_compiled_function, EsaFunction, FunctionCode, FunctionData,
};
use crate::runner::ds::arguments_object::{link_parameter, new_arguments_object};
use crate::runner::ds::lex_env::JsLexEnvironmentType;
use crate::runner::ds::misc::{get_value, put_value, ReferenceBase};
use crate::runner::ds::object::{self, JsObjectType, ObjectKind, PropertyIterator};
use crate::runner::ds::object_property::{PropertyDescriptorSetter, PropertyKey};
use crate::runner::ds::operations::lex_env::{
    create_mutable_binding, delete_binding, get_identifier_reference, has_binding,
    implicit_this_value, new_declarative_environment, new_object_environment,
    set_mutable_binding, with_declarative,
};
use crate::runner::ds::operations::operators;
use crate::runner::ds::operations::test_and_comparison::{
    abstract_equality_comparison, strict_equality_comparison,
};
use crate::runner::ds::operations::type_conversion::{
    check_object_coercible, to_boolean, to_number, to_object, to_property_key, to_string,
};
use crate::runner::ds::string::JsString;
use crate::runner::ds::value::JsValue;
use crate::runner::std_lib::regexp::new_regexp_object;
use crate::runner::types::EvalContext;

/// Writes `r` to `result`, or deposits the error.
fn complete<T: Into<JsValue>>(
    ctx: &mut EvalContext,
    r: Result<T, JErrorType>,
    result: &mut JsValue,
) -> bool {
    match r {
        Ok(v) => {
            *result = v.into();
            true
        }
        Err(e) => {
            ctx.throw(e);
            false
        }
    }
}

fn check<T>(ctx: &mut EvalContext, r: Result<T, JErrorType>) -> bool {
    match r {
        Ok(_) => true,
        Err(e) => {
            ctx.throw(e);
            false
        }
    }
}

fn key(raw: u64) -> Result<PropertyKey, JErrorType> {
    PropertyKey::from_raw(raw).ok_or_else(|| Message::UnknownKey(raw).into())
}

fn name(raw: u64) -> Result<JsString, JErrorType> {
    key(raw).map(|k| k.as_string())
}

/// Drops `argc` pushed arguments of a call that failed before it started.
fn discard_args(ctx: &mut EvalContext, argc: u32, e: JErrorType) -> JErrorType {
    ctx.call_stack.free(argc as usize);
    e
}

// Strings and keys.

pub fn esa_new_str(units: &[u16]) -> JsString {
    JsString::from_units(units.to_vec())
}

/// Registers `s` and returns its raw key id.
pub fn esa_str_intern(s: &str) -> u64 {
    PropertyKey::from_js_string(JsString::intern(s)).to_raw()
}

// Stack and frames.

pub fn esa_stk_alloc(ctx: &mut EvalContext, count: u32) -> StackPtr {
    ctx.call_stack.alloc(count as usize)
}

pub fn esa_stk_free(ctx: &mut EvalContext, count: u32) {
    ctx.call_stack.free(count as usize);
}

/// Pushes one call argument.
pub fn esa_stk_push(ctx: &mut EvalContext, value: JsValue) {
    ctx.call_stack.push(value);
}

pub fn esa_stk_get(ctx: &EvalContext, ptr: StackPtr) -> JsValue {
    ctx.call_stack.get(ptr)
}

pub fn esa_stk_set(ctx: &mut EvalContext, ptr: StackPtr, value: JsValue) {
    ctx.call_stack.set(ptr, value);
}

/// Copies the first `prmc` arguments at `fp` into the slots at `dst`,
/// padding with undefined when fewer than `prmc` were passed.
pub fn esa_init_args(ctx: &mut EvalContext, dst: StackPtr, argc: u32, fp: StackPtr, prmc: u32) {
    for i in 0..prmc as usize {
        let v = if i < argc as usize {
            ctx.call_stack.get(fp + i)
        } else {
            JsValue::undefined()
        };
        ctx.call_stack.set(dst + i, v);
    }
}

/// Argument `i` of the frame, undefined beyond `argc`.
pub fn esa_frm_arg(ctx: &EvalContext, argc: u32, fp: StackPtr, i: u32) -> JsValue {
    if i < argc {
        ctx.call_stack.get(fp + i as usize)
    } else {
        JsValue::undefined()
    }
}

pub fn esa_frm_this(ctx: &EvalContext, fp: StackPtr, vp: StackPtr) -> JsValue {
    ctx.call_stack.get(CallFrame { argc: 0, fp, vp }.this_ptr())
}

pub fn esa_frm_callee(ctx: &EvalContext, fp: StackPtr, vp: StackPtr) -> JsValue {
    ctx.call_stack.get(CallFrame { argc: 0, fp, vp }.callee_ptr())
}

pub fn esa_frm_set_result(ctx: &mut EvalContext, fp: StackPtr, vp: StackPtr, value: JsValue) {
    let ptr = CallFrame { argc: 0, fp, vp }.result_ptr();
    ctx.call_stack.set(ptr, value);
}

// Arguments object.

fn init_arguments(
    ctx: &mut EvalContext,
    argc: u32,
    fp: StackPtr,
    vp: StackPtr,
) -> Result<JsValue, JErrorType> {
    let env = ctx.var_env();
    let binding = JsString::intern("arguments");
    if has_binding(&env, &binding) {
        return Ok(JsValue::nothing());
    }
    let frame = CallFrame { argc, fp, vp };
    let callee = ctx.call_stack.get(frame.callee_ptr());
    let args = ctx.call_stack.values(fp, argc as usize);
    let strict = ctx.is_strict();
    let o = new_arguments_object(ctx, &callee, &args, env.clone(), strict)?;
    let value = JsValue::object(o);
    let bound = value.clone();
    with_declarative(&env, move |d| {
        if strict {
            d.create_immutable_binding(binding.clone());
            d.initialize_immutable_binding(&binding, bound);
        } else {
            d.insert_binding(binding, bound, true);
        }
    });
    Ok(value)
}

/// Creates the `arguments` binding of the running function unless a
/// declaration already took the name, in which case `result` is nothing.
pub fn esa_args_obj_init(
    ctx: &mut EvalContext,
    argc: u32,
    fp: StackPtr,
    vp: StackPtr,
    result: &mut JsValue,
) -> bool {
    let r = init_arguments(ctx, argc, fp, vp);
    complete(ctx, r, result)
}

/// Maps index `i` of an arguments object to the parameter `raw_key`.
pub fn esa_args_obj_link(ctx: &mut EvalContext, args: &JsValue, i: u32, raw_key: u64) -> bool {
    let r = name(raw_key).map(|n| {
        if let Some(o) = args.try_object() {
            link_parameter(&o, i, n);
        }
    });
    check(ctx, r)
}

// Execution contexts.

pub fn esa_ctx_running(ctx: &EvalContext) -> Option<&ExecutionContext> {
    ctx.running_context()
}

pub fn esa_ctx_set_strict(ctx: &mut EvalContext, strict: bool) {
    if let Some(c) = ctx.ctx_stack.get_running_execution_ctx_mut() {
        c.strict = strict;
    }
}

pub fn esa_ctx_this(ctx: &EvalContext) -> JsValue {
    ctx.this_binding()
}

fn declare_function(
    ctx: &mut EvalContext,
    is_eval: bool,
    is_strict: bool,
    raw_key: u64,
    fo: JsValue,
) -> Result<(), JErrorType> {
    let key = key(raw_key)?;
    let fn_name = key.as_string();
    let env = ctx.var_env();
    if !has_binding(&env, &fn_name) {
        create_mutable_binding(ctx, &env, fn_name.clone(), is_eval)?;
    } else if Rc::ptr_eq(&env, &ctx.global_env()) {
        let go = ctx.global_object();
        if let Some(existing) = object::get_property(&go, &key) {
            if existing.is_configurable() {
                let desc = PropertyDescriptorSetter::new_data(JsValue::undefined(), true, true, is_eval);
                object::define_own_property(ctx, &go, &key, desc, true)?;
            } else if existing.is_accessor_descriptor()
                || !(existing.is_writable() && existing.is_enumerable())
            {
                return Err(Message::GlobalDeclaration(fn_name.to_string()).into());
            }
        }
    }
    set_mutable_binding(ctx, &env, fn_name, fo, is_strict)
}

/// Declaration binding instantiation for one function declaration (10.5
/// step 5).
pub fn esa_ctx_decl_fun(
    ctx: &mut EvalContext,
    is_eval: bool,
    is_strict: bool,
    raw_key: u64,
    fo: JsValue,
) -> bool {
    let r = declare_function(ctx, is_eval, is_strict, raw_key, fo);
    check(ctx, r)
}

/// Declares a `var` in the variable environment unless already bound
/// (10.5 step 8).
pub fn esa_ctx_decl_var(ctx: &mut EvalContext, is_eval: bool, is_strict: bool, raw_key: u64) -> bool {
    let r = name(raw_key).and_then(|n| {
        let env = ctx.var_env();
        if has_binding(&env, &n) {
            return Ok(());
        }
        create_mutable_binding(ctx, &env, n.clone(), is_eval)?;
        set_mutable_binding(ctx, &env, n, JsValue::undefined(), is_strict)
    });
    check(ctx, r)
}

/// Binds a formal parameter (10.5 step 4).
pub fn esa_ctx_decl_prm(ctx: &mut EvalContext, is_strict: bool, raw_key: u64, po: JsValue) -> bool {
    let r = name(raw_key).and_then(|n| {
        let env = ctx.var_env();
        if !has_binding(&env, &n) {
            create_mutable_binding(ctx, &env, n.clone(), false)?;
        }
        set_mutable_binding(ctx, &env, n, po, is_strict)
    });
    check(ctx, r)
}

/// Binds `raw_key` in the declarative variable environment to the value in
/// `slot`. With `inherit`, an existing binding wins and its value is
/// copied back into the slot.
fn link_binding(ctx: &mut EvalContext, raw_key: u64, slot: StackPtr, inherit: bool) -> Result<(), JErrorType> {
    let n = name(raw_key)?;
    let env = ctx.var_env();
    let value = ctx.call_stack.get(slot);
    let existing = with_declarative(&env, |d| {
        match d.binding_value(&n) {
            Some(v) if inherit => Some(v),
            _ => {
                d.insert_binding(n.clone(), value, true);
                None
            }
        }
    })
    .flatten();
    if let Some(v) = existing {
        ctx.call_stack.set(slot, v);
    }
    Ok(())
}

pub fn esa_ctx_link_fun(ctx: &mut EvalContext, raw_key: u64, slot: StackPtr) -> bool {
    let r = link_binding(ctx, raw_key, slot, false);
    check(ctx, r)
}

pub fn esa_ctx_link_var(ctx: &mut EvalContext, raw_key: u64, slot: StackPtr) -> bool {
    let r = link_binding(ctx, raw_key, slot, true);
    check(ctx, r)
}

pub fn esa_ctx_link_prm(ctx: &mut EvalContext, raw_key: u64, slot: StackPtr) -> bool {
    let r = link_binding(ctx, raw_key, slot, true);
    check(ctx, r)
}

/// Identifier lookup from the running lexical environment.
pub fn esa_ctx_get(ctx: &mut EvalContext, raw_key: u64, result: &mut JsValue) -> bool {
    let r = name(raw_key).and_then(|n| {
        let reference = get_identifier_reference(Some(ctx.lex_env()), n, ctx.is_strict());
        get_value(ctx, &reference)
    });
    complete(ctx, r, result)
}

/// Identifier assignment. Unresolvable names land on the global object
/// unless the running code is strict.
pub fn esa_ctx_put(ctx: &mut EvalContext, raw_key: u64, value: JsValue) -> bool {
    let r = name(raw_key).and_then(|n| {
        let reference = get_identifier_reference(Some(ctx.lex_env()), n, ctx.is_strict());
        if reference.is_unresolvable() && reference.strict {
            return Err(Message::UnresolvableReference(reference.name.to_string()).into());
        }
        put_value(ctx, &reference, value)
    });
    check(ctx, r)
}

/// `delete name` (11.4.1).
pub fn esa_ctx_del(ctx: &mut EvalContext, raw_key: u64, result: &mut JsValue) -> bool {
    let r = name(raw_key).and_then(|n| {
        let reference = get_identifier_reference(Some(ctx.lex_env()), n, ctx.is_strict());
        match &reference.base {
            ReferenceBase::Environment(env) => delete_binding(env, &reference.name),
            _ if reference.strict => Err(Message::StrictDeleteUnqualified.into()),
            _ => Ok(true),
        }
    });
    complete(ctx, r, result)
}

fn push_nested(ctx: &mut EvalContext, kind: ContextKind, lex_env: JsLexEnvironmentType) {
    let nested = match ctx.running_context() {
        Some(running) => running.nested(kind, lex_env),
        None => ExecutionContext {
            kind,
            function: None,
            lex_env,
            var_env: ctx.global_env(),
            this_binding: JsValue::object(ctx.global_object()),
            strict: false,
        },
    };
    trace!("enter {:?} context", kind);
    ctx.ctx_stack.push_execution_ctx(nested);
}

/// Enters the body of `with (value)`.
pub fn esa_ctx_enter_with(ctx: &mut EvalContext, value: &JsValue) -> bool {
    match to_object(ctx, value) {
        Ok(o) => {
            let env = new_object_environment(o, true, Some(ctx.lex_env()));
            push_nested(ctx, ContextKind::With, env);
            true
        }
        Err(e) => {
            ctx.throw(e);
            false
        }
    }
}

/// Enters a catch block, binding the pending exception to `raw_key` and
/// clearing it.
pub fn esa_ctx_enter_catch(ctx: &mut EvalContext, raw_key: u64) -> bool {
    let n = match name(raw_key) {
        Ok(n) => n,
        Err(e) => {
            ctx.throw(e);
            return false;
        }
    };
    let exception = ctx.ctx_stack.take_pending_exception();
    let env = new_declarative_environment(Some(ctx.lex_env()));
    with_declarative(&env, |d| d.insert_binding(n, exception, true));
    push_nested(ctx, ContextKind::Catch, env);
    true
}

/// Leaves the innermost `with` or catch block.
pub fn esa_ctx_leave(ctx: &mut EvalContext) {
    if let Some(c) = ctx.ctx_stack.pop_running_execution_ctx() {
        trace!("leave {:?} context", c.kind);
    }
}

// Exceptions.

/// The current exception state, for restoring after a `finally` block.
pub fn esa_ex_save_state(ctx: &EvalContext) -> JsValue {
    ctx.ctx_stack.pending_exception()
}

pub fn esa_ex_load_state(ctx: &mut EvalContext, state: JsValue) {
    ctx.ctx_stack.set_pending_exception(state);
}

pub fn esa_ex_get(ctx: &EvalContext) -> JsValue {
    ctx.ctx_stack.pending_exception()
}

/// `throw value`
pub fn esa_ex_set(ctx: &mut EvalContext, value: JsValue) {
    ctx.ctx_stack.set_pending_exception(value);
}

pub fn esa_ex_clear(ctx: &mut EvalContext) {
    ctx.ctx_stack.clear_pending_exception();
}

// Properties.

/// Starts a for-in enumeration. Null and undefined enumerate nothing.
pub fn esa_prp_it_new(ctx: &mut EvalContext, value: &JsValue, result: &mut Option<PropertyIterator>) -> bool {
    if value.is_null_or_undefined() {
        *result = Some(PropertyIterator::new(None));
        return true;
    }
    match to_object(ctx, value) {
        Ok(o) => {
            *result = Some(PropertyIterator::new(Some(o)));
            true
        }
        Err(e) => {
            ctx.throw(e);
            false
        }
    }
}

/// Writes the next key as a string; false once the enumeration is done.
pub fn esa_prp_it_next(it: &mut PropertyIterator, result: &mut JsValue) -> bool {
    match it.next_key() {
        Some(k) => {
            *result = JsValue::string(k.as_string());
            true
        }
        None => false,
    }
}

/// Object literal `{key: value}`.
pub fn esa_prp_def_data(ctx: &mut EvalContext, obj: &JsValue, key: &JsValue, value: JsValue) -> bool {
    let r = to_property_key(ctx, key).and_then(|k| {
        let o = to_object(ctx, obj)?;
        let desc = PropertyDescriptorSetter::new_data(value, true, true, true);
        object::define_own_property(ctx, &o, &k, desc, false)
    });
    check(ctx, r)
}

/// Object literal `get key() {}` or `set key(v) {}`.
pub fn esa_prp_def_accessor(
    ctx: &mut EvalContext,
    obj: &JsValue,
    raw_key: u64,
    fun: JsValue,
    is_setter: bool,
) -> bool {
    let r = key(raw_key).and_then(|k| {
        let o = to_object(ctx, obj)?;
        let desc = PropertyDescriptorSetter::new()
            .with_enumerable(true)
            .with_configurable(true);
        let desc = if is_setter { desc.with_set(fun) } else { desc.with_get(fun) };
        object::define_own_property(ctx, &o, &k, desc, false)
    });
    check(ctx, r)
}

fn get_property(ctx: &mut EvalContext, src: &JsValue, key: &PropertyKey) -> Result<JsValue, JErrorType> {
    match src.try_object() {
        Some(o) => object::get(ctx, &o, key),
        None => {
            let o = to_object(ctx, src)?;
            object::get_with_receiver(ctx, &o, key, src)
        }
    }
}

fn put_property(ctx: &mut EvalContext, dst: &JsValue, key: &PropertyKey, value: JsValue) -> Result<(), JErrorType> {
    let strict = ctx.is_strict();
    match dst.try_object() {
        Some(o) => object::put(ctx, &o, key, value, strict),
        None => {
            let o = to_object(ctx, dst)?;
            object::put_with_receiver(ctx, &o, key, value, dst, strict)
        }
    }
}

fn delete_property(ctx: &mut EvalContext, src: &JsValue, key: &PropertyKey) -> Result<bool, JErrorType> {
    let o = to_object(ctx, src)?;
    object::delete(&o, key, ctx.is_strict())
}

/// `src[key]` for a key known at compile time.
pub fn esa_prp_get(ctx: &mut EvalContext, src: &JsValue, raw_key: u64, result: &mut JsValue) -> bool {
    let r = key(raw_key).and_then(|k| get_property(ctx, src, &k));
    complete(ctx, r, result)
}

/// `src[key]` for a computed key.
pub fn esa_prp_get_slow(ctx: &mut EvalContext, src: &JsValue, key: &JsValue, result: &mut JsValue) -> bool {
    let r = to_property_key(ctx, key).and_then(|k| get_property(ctx, src, &k));
    complete(ctx, r, result)
}

pub fn esa_prp_put(ctx: &mut EvalContext, dst: &JsValue, raw_key: u64, value: JsValue) -> bool {
    let r = key(raw_key).and_then(|k| put_property(ctx, dst, &k, value));
    check(ctx, r)
}

pub fn esa_prp_put_slow(ctx: &mut EvalContext, dst: &JsValue, key: &JsValue, value: JsValue) -> bool {
    let r = to_property_key(ctx, key).and_then(|k| put_property(ctx, dst, &k, value));
    check(ctx, r)
}

pub fn esa_prp_del(ctx: &mut EvalContext, src: &JsValue, raw_key: u64, result: &mut JsValue) -> bool {
    let r = key(raw_key).and_then(|k| delete_property(ctx, src, &k));
    complete(ctx, r, result)
}

pub fn esa_prp_del_slow(ctx: &mut EvalContext, src: &JsValue, key: &JsValue, result: &mut JsValue) -> bool {
    let r = to_property_key(ctx, key).and_then(|k| delete_property(ctx, src, &k));
    complete(ctx, r, result)
}

// Calls. Arguments are pushed with `esa_stk_push` before the call and are
// consumed by it on every path.

fn callable(v: &JsValue) -> Option<JsObjectType> {
    v.try_object().filter(|o| o.borrow().is_callable())
}

fn is_builtin_eval(f: &JsObjectType) -> bool {
    match &f.borrow().kind {
        ObjectKind::Function(FunctionData {
            code: FunctionCode::Native { .. },
            name,
            ..
        }) => name.to_utf8() == "eval",
        _ => false,
    }
}

fn invoke(
    ctx: &mut EvalContext,
    fun: &JsValue,
    this: JsValue,
    argc: u32,
    direct_eval: bool,
) -> Result<JsValue, JErrorType> {
    let f = match callable(fun) {
        Some(f) => f,
        None => return Err(discard_args(ctx, argc, Message::NotAFunction.into())),
    };
    if direct_eval && is_builtin_eval(&f) {
        ctx.mark_direct_eval();
    }
    call_pushed(ctx, &f, this, argc)
}

/// `fun(args..)` where `fun` is not a reference.
pub fn esa_call(ctx: &mut EvalContext, fun: &JsValue, argc: u32, result: &mut JsValue) -> bool {
    let r = invoke(ctx, fun, JsValue::undefined(), argc, false);
    complete(ctx, r, result)
}

fn call_keyed(ctx: &mut EvalContext, src: &JsValue, key: Result<PropertyKey, JErrorType>, argc: u32) -> Result<JsValue, JErrorType> {
    let fun = match key.and_then(|k| get_property(ctx, src, &k).map(|f| (k, f))) {
        Ok(found) => found,
        Err(e) => return Err(discard_args(ctx, argc, e)),
    };
    let (k, fun) = fun;
    invoke(ctx, &fun, src.clone(), argc, k.is_named("eval"))
}

/// `src.key(args..)`
pub fn esa_call_keyed(ctx: &mut EvalContext, src: &JsValue, raw_key: u64, argc: u32, result: &mut JsValue) -> bool {
    let r = call_keyed(ctx, src, key(raw_key), argc);
    complete(ctx, r, result)
}

/// `src[key](args..)`
pub fn esa_call_keyed_slow(ctx: &mut EvalContext, src: &JsValue, key: &JsValue, argc: u32, result: &mut JsValue) -> bool {
    let k = to_property_key(ctx, key);
    let r = call_keyed(ctx, src, k, argc);
    complete(ctx, r, result)
}

fn call_named(ctx: &mut EvalContext, raw_key: u64, argc: u32) -> Result<JsValue, JErrorType> {
    let looked_up = name(raw_key).and_then(|n| {
        let reference = get_identifier_reference(Some(ctx.lex_env()), n, ctx.is_strict());
        let this = match &reference.base {
            ReferenceBase::Environment(env) => implicit_this_value(env),
            ReferenceBase::Unresolvable => {
                return Err(Message::NotDefined(reference.name.to_string()).into())
            }
            ReferenceBase::Value(v) => v.clone(),
        };
        let fun = get_value(ctx, &reference)?;
        if callable(&fun).is_none() {
            return Err(Message::NotAFunctionNamed(reference.name.to_string()).into());
        }
        Ok((reference.name.to_utf8() == "eval", fun, this))
    });
    match looked_up {
        Ok((eval, fun, this)) => invoke(ctx, &fun, this, argc, eval),
        Err(e) => Err(discard_args(ctx, argc, e)),
    }
}

/// `name(args..)` resolved through the scope chain.
pub fn esa_call_named(ctx: &mut EvalContext, raw_key: u64, argc: u32, result: &mut JsValue) -> bool {
    let r = call_named(ctx, raw_key, argc);
    complete(ctx, r, result)
}

fn call_new(ctx: &mut EvalContext, fun: &JsValue, argc: u32) -> Result<JsValue, JErrorType> {
    let start = ctx.call_stack.next() - argc as usize;
    let args = ctx.call_stack.values(start, argc as usize);
    ctx.call_stack.free(argc as usize);
    let f = fun.try_object().ok_or(JErrorType::from(Message::NotAnObject))?;
    if !f.borrow().is_callable() {
        return Err(Message::NotAFunction.into());
    }
    construct(ctx, &f, args)
}

/// `new fun(args..)`
pub fn esa_call_new(ctx: &mut EvalContext, fun: &JsValue, argc: u32, result: &mut JsValue) -> bool {
    let r = call_new(ctx, fun, argc);
    complete(ctx, r, result)
}

// Literals.

pub fn esa_new_obj(ctx: &mut EvalContext, result: &mut JsValue) -> bool {
    let r = ctx.new_object();
    complete(ctx, r, result)
}

/// Array literal. `nothing` items are elisions.
pub fn esa_new_arr(ctx: &mut EvalContext, items: &[JsValue], result: &mut JsValue) -> bool {
    let r = ctx.new_array(items.to_vec()).map(|a| {
        for (i, item) in items.iter().enumerate() {
            if item.is_nothing() {
                a.borrow_mut().remove_property(&PropertyKey::Index(i as u32));
            }
        }
        a
    });
    complete(ctx, r, result)
}

pub fn esa_new_reg_exp(ctx: &mut EvalContext, pattern: &JsString, flags: &JsString, result: &mut JsValue) -> bool {
    let r = new_regexp_object(ctx, pattern.clone(), flags);
    complete(ctx, r, result)
}

/// A function declaration closes over the variable environment.
pub fn esa_new_fun_decl(
    ctx: &mut EvalContext,
    code: EsaFunction,
    strict: bool,
    param_count: u32,
    result: &mut JsValue,
) -> bool {
    let scope = ctx.var_env();
    let r = new_compiled_function(ctx, code, scope, strict, param_count);
    complete(ctx, r, result)
}

/// A function expression closes over the lexical environment.
pub fn esa_new_fun_expr(
    ctx: &mut EvalContext,
    code: EsaFunction,
    strict: bool,
    param_count: u32,
    result: &mut JsValue,
) -> bool {
    let scope = ctx.lex_env();
    let r = new_compiled_function(ctx, code, scope, strict, param_count);
    complete(ctx, r, result)
}

// Conversions.

pub fn esa_val_to_bool(value: &JsValue) -> bool {
    to_boolean(value)
}

pub fn esa_val_to_num(ctx: &mut EvalContext, value: &JsValue, result: &mut f64) -> bool {
    match to_number(ctx, value) {
        Ok(n) => {
            *result = n;
            true
        }
        Err(e) => {
            ctx.throw(e);
            false
        }
    }
}

pub fn esa_val_to_str(ctx: &mut EvalContext, value: &JsValue, result: &mut JsValue) -> bool {
    let r = to_string(ctx, value);
    complete(ctx, r, result)
}

pub fn esa_val_to_obj(ctx: &mut EvalContext, value: &JsValue, result: &mut JsValue) -> bool {
    let r = to_object(ctx, value);
    complete(ctx, r, result)
}

/// CheckObjectCoercible
pub fn esa_val_chk_coerc(ctx: &mut EvalContext, value: &JsValue) -> bool {
    let r = check_object_coercible(value);
    check(ctx, r)
}

// Operators.

pub fn esa_u_typeof(value: &JsValue, result: &mut JsValue) -> bool {
    *result = JsValue::string(operators::type_of(value));
    true
}

pub fn esa_u_not(value: &JsValue, result: &mut JsValue) -> bool {
    *result = JsValue::from(operators::logical_not(value));
    true
}

macro_rules! unary_op {
    ($name:ident, $op:path) => {
        pub fn $name(ctx: &mut EvalContext, value: &JsValue, result: &mut JsValue) -> bool {
            let r = $op(ctx, value);
            complete(ctx, r, result)
        }
    };
}

unary_op!(esa_u_bit_not, operators::bitwise_not);
unary_op!(esa_u_add, operators::unary_plus);
unary_op!(esa_u_sub, operators::unary_minus);

macro_rules! binary_op {
    ($name:ident, $op:path) => {
        pub fn $name(ctx: &mut EvalContext, lval: &JsValue, rval: &JsValue, result: &mut JsValue) -> bool {
            let r = $op(ctx, lval, rval);
            complete(ctx, r, result)
        }
    };
}

binary_op!(esa_b_or, operators::bitwise_or);
binary_op!(esa_b_xor, operators::bitwise_xor);
binary_op!(esa_b_and, operators::bitwise_and);
binary_op!(esa_b_shl, operators::shift_left);
binary_op!(esa_b_sar, operators::shift_right);
binary_op!(esa_b_shr, operators::shift_right_unsigned);
binary_op!(esa_b_add, operators::add);
binary_op!(esa_b_sub, operators::subtract);
binary_op!(esa_b_mul, operators::multiply);
binary_op!(esa_b_div, operators::divide);
binary_op!(esa_b_mod, operators::modulo);
binary_op!(esa_c_in, operators::has_property_in);
binary_op!(esa_c_instance_of, operators::instance_of);
binary_op!(esa_c_eq, abstract_equality_comparison);
binary_op!(esa_c_lt, operators::less_than);
binary_op!(esa_c_gt, operators::greater_than);
binary_op!(esa_c_lte, operators::less_than_or_equal);
binary_op!(esa_c_gte, operators::greater_than_or_equal);

pub fn esa_c_neq(ctx: &mut EvalContext, lval: &JsValue, rval: &JsValue, result: &mut JsValue) -> bool {
    let r = abstract_equality_comparison(ctx, lval, rval).map(|eq| !eq);
    complete(ctx, r, result)
}

pub fn esa_c_strict_eq(lval: &JsValue, rval: &JsValue, result: &mut JsValue) -> bool {
    *result = JsValue::from(strict_equality_comparison(lval, rval));
    true
}

pub fn esa_c_strict_neq(lval: &JsValue, rval: &JsValue, result: &mut JsValue) -> bool {
    *result = JsValue::from(!strict_equality_comparison(lval, rval));
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::config::RuntimeConfig;
    use crate::runner::ds::error::ErrorKind;

    fn context() -> EvalContext {
        EvalContext::new(RuntimeConfig::default()).unwrap()
    }

    fn raw(s: &str) -> u64 {
        esa_str_intern(s)
    }

    /// function (a, b) { return a + b; }
    fn add_args(ctx: &mut EvalContext, argc: u32, fp: StackPtr, vp: StackPtr) -> bool {
        let a = esa_frm_arg(ctx, argc, fp, 0);
        let b = esa_frm_arg(ctx, argc, fp, 1);
        let mut sum = JsValue::undefined();
        if !esa_b_add(ctx, &a, &b, &mut sum) {
            return false;
        }
        esa_frm_set_result(ctx, fp, vp, sum);
        true
    }

    /// function () { throw "boom"; }
    fn throws(ctx: &mut EvalContext, _argc: u32, _fp: StackPtr, _vp: StackPtr) -> bool {
        esa_ex_set(ctx, JsValue::str("boom"));
        false
    }

    /// function () { return arguments.length; }
    fn count_arguments(ctx: &mut EvalContext, argc: u32, fp: StackPtr, vp: StackPtr) -> bool {
        let mut args = JsValue::undefined();
        if !esa_args_obj_init(ctx, argc, fp, vp, &mut args) {
            return false;
        }
        let mut len = JsValue::undefined();
        if !esa_prp_get(ctx, &args, raw("length"), &mut len) {
            return false;
        }
        esa_frm_set_result(ctx, fp, vp, len);
        true
    }

    #[test]
    fn test_call_compiled_function() {
        let mut ctx = context();
        let mut f = JsValue::undefined();
        assert!(esa_new_fun_expr(&mut ctx, add_args, false, 2, &mut f));
        esa_stk_push(&mut ctx, JsValue::number(2.0));
        esa_stk_push(&mut ctx, JsValue::number(40.0));
        let mut result = JsValue::undefined();
        assert!(esa_call(&mut ctx, &f, 2, &mut result));
        assert_eq!(result.as_number(), 42.0);
        assert_eq!(ctx.call_stack.size(), 0);
    }

    #[test]
    fn test_missing_arguments_are_undefined() {
        let mut ctx = context();
        let mut f = JsValue::undefined();
        assert!(esa_new_fun_expr(&mut ctx, add_args, false, 2, &mut f));
        esa_stk_push(&mut ctx, JsValue::str("x"));
        let mut result = JsValue::undefined();
        assert!(esa_call(&mut ctx, &f, 1, &mut result));
        assert_eq!(result.as_string().to_string(), "xundefined");
    }

    #[test]
    fn test_thrown_value_reaches_caller() {
        let mut ctx = context();
        let mut f = JsValue::undefined();
        assert!(esa_new_fun_expr(&mut ctx, throws, false, 0, &mut f));
        let mut result = JsValue::undefined();
        assert!(!esa_call(&mut ctx, &f, 0, &mut result));
        assert_eq!(esa_ex_get(&ctx).as_string().to_string(), "boom");
        esa_ex_clear(&mut ctx);
        assert!(esa_ex_get(&ctx).is_nothing());
    }

    #[test]
    fn test_call_non_callable_frees_arguments() {
        let mut ctx = context();
        esa_stk_push(&mut ctx, JsValue::number(1.0));
        let mut result = JsValue::undefined();
        assert!(!esa_call(&mut ctx, &JsValue::number(3.0), 1, &mut result));
        assert_eq!(ctx.call_stack.size(), 0);
        let e = esa_ex_get(&ctx);
        let proto = object::get_prototype_of(&e.as_object()).unwrap();
        assert!(Rc::ptr_eq(
            &proto,
            &ctx.intrinsic(crate::runner::ds::realm::WellKnownIntrinsics::error_prototype(
                ErrorKind::TypeError
            ))
        ));
    }

    #[test]
    fn test_arguments_object() {
        let mut ctx = context();
        let mut f = JsValue::undefined();
        assert!(esa_new_fun_expr(&mut ctx, count_arguments, false, 0, &mut f));
        for i in 0..3 {
            esa_stk_push(&mut ctx, JsValue::number(i as f64));
        }
        let mut result = JsValue::undefined();
        assert!(esa_call(&mut ctx, &f, 3, &mut result));
        assert_eq!(result.as_number(), 3.0);
    }

    #[test]
    fn test_global_declarations_and_lookup() {
        let mut ctx = context();
        assert!(esa_ctx_decl_var(&mut ctx, false, false, raw("counter")));
        let mut v = JsValue::null();
        assert!(esa_ctx_get(&mut ctx, raw("counter"), &mut v));
        assert!(v.is_undefined());
        assert!(esa_ctx_put(&mut ctx, raw("counter"), JsValue::number(7.0)));
        assert!(esa_ctx_get(&mut ctx, raw("counter"), &mut v));
        assert_eq!(v.as_number(), 7.0);
        assert!(!esa_ctx_get(&mut ctx, raw("missing"), &mut v));
        let e = esa_ex_get(&ctx).as_object();
        let mut message = JsValue::undefined();
        esa_ex_clear(&mut ctx);
        assert!(esa_prp_get(&mut ctx, &JsValue::object(e), raw("message"), &mut message));
        assert_eq!(message.as_string().to_string(), "'missing' is not defined.");
    }

    #[test]
    fn test_strict_assignment_to_undeclared() {
        let mut ctx = context();
        esa_ctx_set_strict(&mut ctx, true);
        assert!(!esa_ctx_put(&mut ctx, raw("undeclared"), JsValue::number(1.0)));
        esa_ex_clear(&mut ctx);
        let mut result = JsValue::undefined();
        assert!(!esa_ctx_del(&mut ctx, raw("undeclared"), &mut result));
        esa_ex_clear(&mut ctx);
        esa_ctx_set_strict(&mut ctx, false);
        assert!(esa_ctx_put(&mut ctx, raw("undeclared"), JsValue::number(1.0)));
        assert!(esa_ctx_del(&mut ctx, raw("undeclared"), &mut result));
        assert!(result.as_boolean());
    }

    #[test]
    fn test_redeclaring_readonly_global_function_fails() {
        let mut ctx = context();
        let mut f = JsValue::undefined();
        assert!(esa_new_fun_decl(&mut ctx, add_args, false, 2, &mut f));
        assert!(!esa_ctx_decl_fun(&mut ctx, false, false, raw("NaN"), f.clone()));
        esa_ex_clear(&mut ctx);
        assert!(esa_ctx_decl_fun(&mut ctx, false, false, raw("plus"), f));
        esa_stk_push(&mut ctx, JsValue::number(1.0));
        esa_stk_push(&mut ctx, JsValue::number(2.0));
        let mut result = JsValue::undefined();
        assert!(esa_call_named(&mut ctx, raw("plus"), 2, &mut result));
        assert_eq!(result.as_number(), 3.0);
    }

    #[test]
    fn test_catch_binds_and_clears_exception() {
        let mut ctx = context();
        esa_ex_set(&mut ctx, JsValue::number(9.0));
        let saved = esa_ex_save_state(&ctx);
        assert!(esa_ctx_enter_catch(&mut ctx, raw("e")));
        assert!(esa_ex_get(&ctx).is_nothing());
        let mut e = JsValue::undefined();
        assert!(esa_ctx_get(&mut ctx, raw("e"), &mut e));
        assert_eq!(e.as_number(), 9.0);
        esa_ctx_leave(&mut ctx);
        assert!(!esa_ctx_get(&mut ctx, raw("e"), &mut e));
        esa_ex_load_state(&mut ctx, saved);
        assert_eq!(esa_ex_get(&ctx).as_number(), 9.0);
    }

    #[test]
    fn test_with_scope_resolves_properties() {
        let mut ctx = context();
        let mut o = JsValue::undefined();
        assert!(esa_new_obj(&mut ctx, &mut o));
        assert!(esa_prp_def_data(&mut ctx, &o, &JsValue::str("x"), JsValue::number(5.0)));
        assert!(esa_ctx_enter_with(&mut ctx, &o));
        assert!(esa_ctx_put(&mut ctx, raw("x"), JsValue::number(6.0)));
        esa_ctx_leave(&mut ctx);
        let mut x = JsValue::undefined();
        assert!(esa_prp_get(&mut ctx, &o, raw("x"), &mut x));
        assert_eq!(x.as_number(), 6.0);
        assert!(!esa_ctx_enter_with(&mut ctx, &JsValue::null()));
    }

    #[test]
    fn test_property_iteration_order() {
        let mut ctx = context();
        let mut o = JsValue::undefined();
        assert!(esa_new_obj(&mut ctx, &mut o));
        for k in ["b", "1", "a", "0"] {
            assert!(esa_prp_def_data(&mut ctx, &o, &JsValue::str(k), JsValue::null()));
        }
        let mut it = None;
        assert!(esa_prp_it_new(&mut ctx, &o, &mut it));
        let mut it = it.unwrap();
        let mut keys = Vec::new();
        let mut k = JsValue::undefined();
        while esa_prp_it_next(&mut it, &mut k) {
            keys.push(k.as_string().to_string());
        }
        assert_eq!(keys, vec!["0", "1", "b", "a"]);

        let mut empty = None;
        assert!(esa_prp_it_new(&mut ctx, &JsValue::undefined(), &mut empty));
        assert!(!esa_prp_it_next(&mut empty.unwrap(), &mut k));
    }

    #[test]
    fn test_accessor_literal() {
        let mut ctx = context();
        let mut o = JsValue::undefined();
        let mut getter = JsValue::undefined();
        assert!(esa_new_obj(&mut ctx, &mut o));
        assert!(esa_new_fun_expr(&mut ctx, count_arguments, false, 0, &mut getter));
        assert!(esa_prp_def_accessor(&mut ctx, &o, raw("size"), getter, false));
        let mut size = JsValue::undefined();
        assert!(esa_prp_get(&mut ctx, &o, raw("size"), &mut size));
        assert_eq!(size.as_number(), 0.0);
    }

    #[test]
    fn test_array_literal_holes() {
        let mut ctx = context();
        let mut a = JsValue::undefined();
        let items = [JsValue::number(1.0), JsValue::nothing(), JsValue::number(3.0)];
        assert!(esa_new_arr(&mut ctx, &items, &mut a));
        let mut len = JsValue::undefined();
        assert!(esa_prp_get(&mut ctx, &a, raw("length"), &mut len));
        assert_eq!(len.as_number(), 3.0);
        let mut present = JsValue::undefined();
        assert!(esa_c_in(&mut ctx, &JsValue::number(1.0), &a, &mut present));
        assert!(!present.as_boolean());
    }

    #[test]
    fn test_keyed_call_on_primitive() {
        let mut ctx = context();
        let s = JsValue::str("abcabcabc");
        esa_stk_push(&mut ctx, JsValue::str("bc"));
        esa_stk_push(&mut ctx, JsValue::number(3.0));
        let mut result = JsValue::undefined();
        assert!(esa_call_keyed(&mut ctx, &s, raw("indexOf"), 2, &mut result));
        assert_eq!(result.as_number(), 4.0);
    }

    #[test]
    fn test_construct_requires_object() {
        let mut ctx = context();
        let mut result = JsValue::undefined();
        esa_stk_push(&mut ctx, JsValue::number(1.0));
        assert!(!esa_call_new(&mut ctx, &JsValue::str("nope"), 1, &mut result));
        assert_eq!(ctx.call_stack.size(), 0);
    }

    #[test]
    fn test_operators() {
        let mut ctx = context();
        let mut r = JsValue::undefined();
        assert!(esa_b_add(&mut ctx, &JsValue::number(1.0), &JsValue::str("2"), &mut r));
        assert_eq!(r.as_string().to_string(), "12");
        assert!(esa_b_shr(&mut ctx, &JsValue::number(-1.0), &JsValue::number(0.0), &mut r));
        assert_eq!(r.as_number(), 4294967295.0);
        assert!(esa_c_eq(&mut ctx, &JsValue::null(), &JsValue::undefined(), &mut r));
        assert!(r.as_boolean());
        assert!(esa_c_strict_neq(&JsValue::null(), &JsValue::undefined(), &mut r));
        assert!(r.as_boolean());
        assert!(esa_c_lt(&mut ctx, &JsValue::str("a"), &JsValue::str("b"), &mut r));
        assert!(r.as_boolean());
        assert!(esa_u_typeof(&JsValue::null(), &mut r));
        assert_eq!(r.as_string().to_string(), "object");
        assert!(!esa_c_in(&mut ctx, &JsValue::str("x"), &JsValue::number(1.0), &mut r));
    }
}
