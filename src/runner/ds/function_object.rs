use log::trace;

use crate::runner::ds::error::{JErrorType, Message};
use crate::runner::ds::execution_context::{ContextKind, ExecutionContext};
use crate::runner::ds::frame::StackPtr;
use crate::runner::ds::lex_env::JsLexEnvironmentType;
use crate::runner::ds::object::{self, JsObject, JsObjectType, ObjectKind};
use crate::runner::ds::object_property::{PropertyDescriptorSetter, PropertyKey};
use crate::runner::ds::operations::lex_env::new_declarative_environment;
use crate::runner::ds::operations::type_conversion::to_object;
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::string::JsString;
use crate::runner::ds::value::JsValue;
use crate::runner::types::{EvalContext, NativeFn};

/// Entry point of a compiled function: `(ctx, argc, fp, vp)`. Returns false
/// when an exception was left in the pending-exception slot.
pub type EsaFunction = fn(&mut EvalContext, u32, StackPtr, StackPtr) -> bool;

#[derive(Clone)]
pub enum FunctionCode {
    Native {
        call: NativeFn,
        construct: Option<NativeFn>,
    },
    Compiled {
        code: EsaFunction,
        scope: JsLexEnvironmentType,
        param_count: u32,
    },
}

#[derive(Clone)]
pub struct FunctionData {
    pub code: FunctionCode,
    pub strict: bool,
    pub name: JsString,
}

#[derive(Clone)]
pub struct BoundFunctionData {
    pub target: JsObjectType,
    pub bound_this: JsValue,
    pub bound_args: Vec<JsValue>,
}

fn function_data(f: &JsObjectType) -> Option<FunctionData> {
    match &f.borrow().kind {
        ObjectKind::Function(data) => Some(data.clone()),
        _ => None,
    }
}

fn bound_data(f: &JsObjectType) -> Option<BoundFunctionData> {
    match &f.borrow().kind {
        ObjectKind::BoundFunction(data) => Some(data.clone()),
        _ => None,
    }
}

/// True for compiled functions created in strict mode code.
pub fn is_strict_function(v: &JsValue) -> bool {
    match v.try_object() {
        Some(o) => match &o.borrow().kind {
            ObjectKind::Function(FunctionData {
                code: FunctionCode::Compiled { .. },
                strict,
                ..
            }) => *strict,
            _ => false,
        },
        None => false,
    }
}

pub fn is_constructor(f: &JsObjectType) -> bool {
    match &f.borrow().kind {
        ObjectKind::Function(FunctionData {
            code: FunctionCode::Native { construct, .. },
            ..
        }) => construct.is_some(),
        ObjectKind::Function(_) => true,
        ObjectKind::BoundFunction(b) => is_constructor(&b.target),
        _ => false,
    }
}

/// Resolves the this binding of a non-strict callee (10.4.3).
fn this_binding(ctx: &mut EvalContext, strict: bool, this: JsValue) -> Result<JsValue, JErrorType> {
    if strict {
        Ok(this)
    } else if this.is_null_or_undefined() {
        Ok(JsValue::object(ctx.global_object()))
    } else if this.is_object() {
        Ok(this)
    } else {
        Ok(JsValue::object(to_object(ctx, &this)?))
    }
}

/// Runs compiled code over the `argc` arguments already pushed on the call
/// stack. The arguments are consumed whether or not the call succeeds.
fn call_compiled(
    ctx: &mut EvalContext,
    f: &JsObjectType,
    this: JsValue,
    argc: u32,
    code: EsaFunction,
    scope: JsLexEnvironmentType,
    param_count: u32,
    strict: bool,
) -> Result<JsValue, JErrorType> {
    let this = match this_binding(ctx, strict, this) {
        Ok(this) => this,
        Err(e) => {
            ctx.call_stack.free(argc as usize);
            return Err(e);
        }
    };
    let env = new_declarative_environment(Some(scope));
    let context_depth = ctx.ctx_stack.len();
    ctx.ctx_stack.push_execution_ctx(ExecutionContext {
        kind: ContextKind::Function,
        function: Some(f.clone()),
        lex_env: env.clone(),
        var_env: env,
        this_binding: this.clone(),
        strict,
    });
    let frame =
        ctx.call_stack
            .push_frame_excl_args(argc, param_count, JsValue::object(f.clone()), this);
    let ok = code(ctx, argc, frame.fp, frame.vp);
    let result = ctx.call_stack.pop_frame(&frame);
    ctx.ctx_stack.truncate(context_depth);
    if ok {
        Ok(result)
    } else {
        let exception = ctx.ctx_stack.take_pending_exception();
        if exception.is_nothing() {
            Ok(JsValue::undefined())
        } else {
            Err(JErrorType::Thrown(exception))
        }
    }
}

/// [[Call]] with `argc` arguments already pushed on the call stack.
pub fn call_pushed(
    ctx: &mut EvalContext,
    f: &JsObjectType,
    this: JsValue,
    argc: u32,
) -> Result<JsValue, JErrorType> {
    if let Some(FunctionData {
        code: FunctionCode::Compiled {
            code,
            scope,
            param_count,
        },
        strict,
        ..
    }) = function_data(f)
    {
        if let Err(e) = ctx.enter_call() {
            ctx.call_stack.free(argc as usize);
            return Err(e);
        }
        let result = call_compiled(ctx, f, this, argc, code, scope, param_count, strict);
        ctx.leave_call();
        return result;
    }
    let start = ctx.call_stack.next() - argc as usize;
    let args = ctx.call_stack.values(start, argc as usize);
    ctx.call_stack.free(argc as usize);
    call(ctx, f, this, args)
}

/// [[Call]]
pub fn call(
    ctx: &mut EvalContext,
    f: &JsObjectType,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    if let Some(bound) = bound_data(f) {
        let mut all_args = bound.bound_args;
        all_args.extend(args);
        return call(ctx, &bound.target, bound.bound_this, all_args);
    }
    let data = function_data(f).ok_or(JErrorType::from(Message::NotAFunction))?;
    match data.code {
        FunctionCode::Native { call, .. } => {
            ctx.enter_call()?;
            let result = call(ctx, this, args);
            ctx.leave_call();
            result
        }
        FunctionCode::Compiled { .. } => {
            let argc = args.len() as u32;
            for arg in args {
                ctx.call_stack.push(arg);
            }
            call_pushed(ctx, f, this, argc)
        }
    }
}

/// Calls `f` if it is callable, otherwise raises a TypeError.
pub fn call_value(
    ctx: &mut EvalContext,
    f: &JsValue,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    match f.try_object() {
        Some(o) if o.borrow().is_callable() => call(ctx, &o, this, args),
        _ => Err(Message::NotAFunction.into()),
    }
}

/// [[Construct]]
pub fn construct(
    ctx: &mut EvalContext,
    f: &JsObjectType,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    if let Some(bound) = bound_data(f) {
        let mut all_args = bound.bound_args;
        all_args.extend(args);
        return construct(ctx, &bound.target, all_args);
    }
    let data = function_data(f).ok_or(JErrorType::from(Message::NotAFunction))?;
    match data.code {
        FunctionCode::Native { construct, .. } => match construct {
            Some(construct) => {
                ctx.enter_call()?;
                let result = construct(ctx, JsValue::undefined(), args);
                ctx.leave_call();
                result
            }
            None => Err(Message::NotAConstructor.into()),
        },
        FunctionCode::Compiled { .. } => {
            let proto = match object::get_named(ctx, f, "prototype")?.try_object() {
                Some(p) => p,
                None => ctx.intrinsic(WellKnownIntrinsics::ObjectPrototype),
            };
            let obj = ctx.new_object_with_prototype(Some(proto))?;
            let result = call(ctx, f, JsValue::object(obj.clone()), args)?;
            if result.is_object() {
                Ok(result)
            } else {
                Ok(JsValue::object(obj))
            }
        }
    }
}

/// [[HasInstance]]
pub fn has_instance(
    ctx: &mut EvalContext,
    f: &JsObjectType,
    v: &JsValue,
) -> Result<bool, JErrorType> {
    if let Some(bound) = bound_data(f) {
        return has_instance(ctx, &bound.target, v);
    }
    let v = match v.try_object() {
        Some(v) => v,
        None => return Ok(false),
    };
    let proto = match object::get_named(ctx, f, "prototype")?.try_object() {
        Some(p) => p,
        None => return Err(Message::InstanceofNeedsObject.into()),
    };
    Ok(object::is_prototype_of(&proto, &v))
}

/// A built-in function object.
pub fn new_native_function(
    ctx: &mut EvalContext,
    name: &str,
    call: NativeFn,
    construct: Option<NativeFn>,
    length: u32,
) -> Result<JsObjectType, JErrorType> {
    ctx.heap.allocate()?;
    let proto = ctx.intrinsic(WellKnownIntrinsics::FunctionPrototype);
    let mut obj = JsObject::new(
        "Function",
        Some(proto),
        ObjectKind::Function(FunctionData {
            code: FunctionCode::Native { call, construct },
            strict: false,
            name: JsString::intern(name),
        }),
    );
    obj.define_value("length", JsValue::from(length), false, false, false);
    Ok(obj.into_ref())
}

fn define_poison_pills(ctx: &mut EvalContext, f: &JsObjectType) -> Result<(), JErrorType> {
    let thrower = JsValue::object(ctx.intrinsic(WellKnownIntrinsics::ThrowTypeError));
    for name in ["caller", "arguments"] {
        let desc = PropertyDescriptorSetter::new_accessor(thrower.clone(), thrower.clone(), false, false);
        object::define_own_property(ctx, f, &PropertyKey::named(name), desc, false)?;
    }
    Ok(())
}

/// A function object for compiled code closing over `scope` (13.2).
pub fn new_compiled_function(
    ctx: &mut EvalContext,
    code: EsaFunction,
    scope: JsLexEnvironmentType,
    strict: bool,
    param_count: u32,
) -> Result<JsObjectType, JErrorType> {
    ctx.heap.allocate()?;
    let proto = ctx.intrinsic(WellKnownIntrinsics::FunctionPrototype);
    let mut obj = JsObject::new(
        "Function",
        Some(proto),
        ObjectKind::Function(FunctionData {
            code: FunctionCode::Compiled {
                code,
                scope,
                param_count,
            },
            strict,
            name: JsString::empty(),
        }),
    );
    obj.define_value("length", JsValue::from(param_count), false, false, false);
    let f = obj.into_ref();
    let prototype = ctx.new_object()?;
    prototype
        .borrow_mut()
        .define_value("constructor", JsValue::object(f.clone()), true, false, true);
    f.borrow_mut()
        .define_value("prototype", JsValue::object(prototype), true, false, false);
    if strict {
        define_poison_pills(ctx, &f)?;
    }
    trace!("new compiled function, {} parameters, strict={}", param_count, strict);
    Ok(f)
}

/// Function.prototype.bind's result (15.3.4.5).
pub fn new_bound_function(
    ctx: &mut EvalContext,
    target: JsObjectType,
    bound_this: JsValue,
    bound_args: Vec<JsValue>,
) -> Result<JsObjectType, JErrorType> {
    let length = if target.borrow().is_callable() {
        let target_len = object::get_named(ctx, &target, "length")?;
        let target_len = if target_len.is_number() {
            target_len.as_number()
        } else {
            0.0
        };
        (target_len - bound_args.len() as f64).max(0.0)
    } else {
        0.0
    };
    ctx.heap.allocate()?;
    let proto = ctx.intrinsic(WellKnownIntrinsics::FunctionPrototype);
    let mut obj = JsObject::new(
        "Function",
        Some(proto),
        ObjectKind::BoundFunction(BoundFunctionData {
            target,
            bound_this,
            bound_args,
        }),
    );
    obj.define_value("length", JsValue::number(length), false, false, false);
    let f = obj.into_ref();
    define_poison_pills(ctx, &f)?;
    Ok(f)
}

/// Body of Function.prototype itself.
pub fn empty_function(
    _ctx: &mut EvalContext,
    _this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::undefined())
}

/// The %ThrowTypeError% accessor used for strict-mode poison pills.
pub fn throw_type_error(
    _ctx: &mut EvalContext,
    _this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Err(Message::StrictPoisonPill.into())
}
