//! Function built-in.
//!
//! `Function(p1, ..., body)` hands its source text to the installed
//! `SourceCompiler`; the prototype methods work on any callable.

use log::debug;

use crate::runner::ds::error::{JErrorType, Message};
use crate::runner::ds::function_object::{
    self, new_bound_function, new_compiled_function, FunctionCode,
};
use crate::runner::ds::object::{JsObjectType, ObjectKind};
use crate::runner::ds::operations::object::create_list_from_array_like;
use crate::runner::ds::operations::type_conversion::to_string;
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::string::JsString;
use crate::runner::ds::value::JsValue;
use crate::runner::text::builder::StringBuilder;
use crate::runner::types::{arg, BuiltInObject, EvalContext};

/// Register the Function constructor and populate `Function.prototype`.
pub fn register(ctx: &mut EvalContext) -> Result<(), JErrorType> {
    BuiltInObject::new("Function")
        .with_prototype(WellKnownIntrinsics::FunctionPrototype)
        .with_constructor(function_constructor, 1)
        .add_method("toString", function_proto_to_string, 0)
        .add_method("apply", function_proto_apply, 2)
        .add_method("call", function_proto_call, 1)
        .add_method("bind", function_proto_bind, 1)
        .register(ctx)?;
    Ok(())
}

fn this_function(this: &JsValue, method: &'static str) -> Result<JsObjectType, JErrorType> {
    match this.try_object() {
        Some(f) if f.borrow().is_callable() => Ok(f),
        _ => Err(Message::IncompatibleReceiver("Function", method).into()),
    }
}

/// Function(p1, p2, ..., body) (15.3.2.1)
fn function_constructor(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let (body, params) = match args.split_last() {
        Some((body, params)) => (to_string(ctx, body)?, params),
        None => (JsString::empty(), &[][..]),
    };
    let mut list = StringBuilder::new();
    for (i, p) in params.iter().enumerate() {
        if i > 0 {
            list.push_char(',');
        }
        let p = to_string(ctx, p)?;
        list.push_js(&p);
    }
    let params = list.build();
    let compiler = ctx
        .source_compiler()
        .ok_or_else(|| JErrorType::from(Message::NoSourceCompiler))?;
    debug!("compiling Function({}) with {} body units", params, body.len());
    let compiled = compiler.compile_function(&params, &body)?;
    let scope = ctx.global_env();
    let f = new_compiled_function(ctx, compiled.code, scope, compiled.strict, compiled.param_count)?;
    Ok(JsValue::object(f))
}

/// Function.prototype.toString
fn function_proto_to_string(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let f = this_function(&this, "toString")?;
    let text = match &f.borrow().kind {
        ObjectKind::Function(data) => match data.code {
            FunctionCode::Native { .. } => {
                format!("function {}() {{ [native code] }}", data.name)
            }
            FunctionCode::Compiled { .. } => "function () { [compiled code] }".to_string(),
        },
        _ => "function () { [native code] }".to_string(),
    };
    Ok(JsValue::string(JsString::from(text)))
}

/// Function.prototype.apply
fn function_proto_apply(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let f = this_function(&this, "apply")?;
    let list = create_list_from_array_like(ctx, &arg(&args, 1))?;
    function_object::call(ctx, &f, arg(&args, 0), list)
}

/// Function.prototype.call
fn function_proto_call(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let f = this_function(&this, "call")?;
    let mut args = args.into_iter();
    let this_arg = args.next().unwrap_or_default();
    function_object::call(ctx, &f, this_arg, args.collect())
}

/// Function.prototype.bind
fn function_proto_bind(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let target = this_function(&this, "bind")?;
    let mut args = args.into_iter();
    let bound_this = args.next().unwrap_or_default();
    let f = new_bound_function(ctx, target, bound_this, args.collect())?;
    Ok(JsValue::object(f))
}
