//! Core types shared by the runtime and the built-in library.

use std::rc::Rc;

use log::debug;

use crate::runner::config::RuntimeConfig;
use crate::runner::ds::error::{ErrorKind, JErrorType, Message};
use crate::runner::ds::execution_context::{
    ContextKind, ExecutionContext, ExecutionContextStack,
};
use crate::runner::ds::frame::CallStack;
use crate::runner::ds::function_object::{new_native_function, EsaFunction};
use crate::runner::ds::heap::Heap;
use crate::runner::ds::lex_env::JsLexEnvironmentType;
use crate::runner::ds::array_object::new_array_object;
use crate::runner::ds::object::{JsObject, JsObjectType, ObjectKind};
use crate::runner::ds::object_property::{PropertyDescriptorSetter, PropertyKey};
use crate::runner::ds::object;
use crate::runner::ds::realm::{CodeRealm, WellKnownIntrinsics};
use crate::runner::ds::string::JsString;
use crate::runner::ds::value::JsValue;
use crate::runner::std_lib::register_core_builtins;

/// Function signature for built-in methods.
/// Native functions receive the evaluation context, `this` value, and arguments.
pub type NativeFn = fn(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType>;

/// Output of a `SourceCompiler`: an entry point using the compiled-code ABI.
#[derive(Clone, Copy)]
pub struct CompiledSource {
    pub code: EsaFunction,
    pub param_count: u32,
    pub strict: bool,
}

/// Hook through which `eval` and `Function(...)` reach a compiler.
pub trait SourceCompiler {
    /// Compiles eval code. `strict` is true when the caller is strict code.
    fn compile_eval(&self, source: &JsString, strict: bool) -> Result<CompiledSource, JErrorType>;

    /// Compiles the body of `new Function(params, body)`.
    fn compile_function(
        &self,
        params: &JsString,
        body: &JsString,
    ) -> Result<CompiledSource, JErrorType>;
}

/// Returns argument `i`, or undefined when fewer were passed.
pub fn arg(args: &[JsValue], i: usize) -> JsValue {
    args.get(i).cloned().unwrap_or_default()
}

/// Everything a running program touches: the realm, the context stack with
/// its pending exception, the value stack and the heap accounting.
pub struct EvalContext {
    pub realm: CodeRealm,
    pub ctx_stack: ExecutionContextStack,
    pub call_stack: CallStack,
    pub heap: Heap,
    pub config: RuntimeConfig,
    source_compiler: Option<Rc<dyn SourceCompiler>>,
    call_depth: usize,
    direct_eval: bool,
    captured_output: Option<Vec<String>>,
}

impl EvalContext {
    /// Creates the realm, enters global code and installs the built-in
    /// library.
    pub fn new(config: RuntimeConfig) -> Result<Self, JErrorType> {
        let realm = CodeRealm::new();
        let mut ctx_stack = ExecutionContextStack::new();
        ctx_stack.push_execution_ctx(ExecutionContext {
            kind: ContextKind::Global,
            function: None,
            lex_env: realm.global_env.clone(),
            var_env: realm.global_env.clone(),
            this_binding: JsValue::object(realm.global_this.clone()),
            strict: config.strict,
        });
        let mut ctx = EvalContext {
            realm,
            ctx_stack,
            call_stack: CallStack::new(),
            heap: Heap::new(config.heap_config()),
            config,
            source_compiler: None,
            call_depth: 0,
            direct_eval: false,
            captured_output: None,
        };
        register_core_builtins(&mut ctx)?;
        debug!("runtime context ready, {} live objects", crate::runner::ds::heap::live_objects());
        Ok(ctx)
    }

    pub fn intrinsic(&self, which: WellKnownIntrinsics) -> JsObjectType {
        self.realm.intrinsic(which)
    }

    pub fn global_object(&self) -> JsObjectType {
        self.realm.global_this.clone()
    }

    pub fn global_env(&self) -> JsLexEnvironmentType {
        self.realm.global_env.clone()
    }

    pub fn running_context(&self) -> Option<&ExecutionContext> {
        self.ctx_stack.get_running_execution_ctx()
    }

    pub fn lex_env(&self) -> JsLexEnvironmentType {
        self.running_context()
            .map_or_else(|| self.global_env(), |c| c.lex_env.clone())
    }

    pub fn var_env(&self) -> JsLexEnvironmentType {
        self.running_context()
            .map_or_else(|| self.global_env(), |c| c.var_env.clone())
    }

    pub fn this_binding(&self) -> JsValue {
        self.running_context()
            .map_or_else(|| JsValue::object(self.global_object()), |c| c.this_binding.clone())
    }

    pub fn is_strict(&self) -> bool {
        self.ctx_stack.is_strict()
    }

    /// Counts one level of native or compiled call nesting.
    pub fn enter_call(&mut self) -> Result<(), JErrorType> {
        if self.call_depth >= self.config.max_call_depth {
            return Err(Message::StackOverflow.into());
        }
        self.call_depth += 1;
        Ok(())
    }

    pub fn leave_call(&mut self) {
        self.call_depth = self.call_depth.saturating_sub(1);
    }

    pub fn call_depth(&self) -> usize {
        self.call_depth
    }

    pub fn new_object_with_prototype(
        &mut self,
        prototype: Option<JsObjectType>,
    ) -> Result<JsObjectType, JErrorType> {
        self.heap.allocate()?;
        Ok(JsObject::ordinary(prototype).into_ref())
    }

    pub fn new_object(&mut self) -> Result<JsObjectType, JErrorType> {
        let proto = self.intrinsic(WellKnownIntrinsics::ObjectPrototype);
        self.new_object_with_prototype(Some(proto))
    }

    pub fn new_array(&mut self, items: Vec<JsValue>) -> Result<JsObjectType, JErrorType> {
        self.heap.allocate()?;
        let proto = self.intrinsic(WellKnownIntrinsics::ArrayPrototype);
        Ok(new_array_object(proto, items))
    }

    pub fn new_function(
        &mut self,
        name: &str,
        call: NativeFn,
        length: u32,
    ) -> Result<JsObjectType, JErrorType> {
        new_native_function(self, name, call, None, length)
    }

    fn make_error(&self, kind: ErrorKind, message: &str) -> JsObjectType {
        let proto = self.intrinsic(WellKnownIntrinsics::error_prototype(kind));
        let mut obj = JsObject::new("Error", Some(proto), ObjectKind::Error);
        if !message.is_empty() {
            obj.define_value("message", JsValue::str(message), true, false, true);
        }
        obj.into_ref()
    }

    /// An Error object of the given kind, counted against the heap limit.
    pub fn new_error(&mut self, kind: ErrorKind, message: &str) -> Result<JsObjectType, JErrorType> {
        self.heap.allocate()?;
        Ok(self.make_error(kind, message))
    }

    /// The script-visible value of a failure. Native errors become Error
    /// objects; this never fails, so an out-of-memory error can still be
    /// reported.
    pub fn error_to_value(&mut self, e: JErrorType) -> JsValue {
        match e {
            JErrorType::Thrown(v) => v,
            other => {
                let kind = other.kind().unwrap_or(ErrorKind::Error);
                let message = other.message().unwrap_or_default().to_string();
                JsValue::object(self.make_error(kind, &message))
            }
        }
    }

    /// Deposits `e` in the pending-exception slot.
    pub fn throw(&mut self, e: JErrorType) {
        let v = self.error_to_value(e);
        self.ctx_stack.set_pending_exception(v);
    }

    pub fn set_source_compiler(&mut self, compiler: Rc<dyn SourceCompiler>) {
        self.source_compiler = Some(compiler);
    }

    pub fn source_compiler(&self) -> Option<Rc<dyn SourceCompiler>> {
        self.source_compiler.clone()
    }

    /// Marks the next call of the `eval` built-in as a direct call.
    pub fn mark_direct_eval(&mut self) {
        self.direct_eval = true;
    }

    pub fn take_direct_eval(&mut self) -> bool {
        std::mem::replace(&mut self.direct_eval, false)
    }

    /// Redirects the `print` host function into a buffer.
    pub fn capture_output(&mut self) {
        self.captured_output = Some(Vec::new());
    }

    pub fn take_output(&mut self) -> Vec<String> {
        self.captured_output.as_mut().map(std::mem::take).unwrap_or_default()
    }

    pub fn write_line(&mut self, line: String) {
        match &mut self.captured_output {
            Some(buffer) => buffer.push(line),
            None => println!("{}", line),
        }
    }
}

enum Member {
    Method(&'static str, NativeFn, u32),
    Value(&'static str, JsValue),
}

/// Built-in object definition.
/// Describes a constructor with its prototype, or a namespace object such as
/// `Math`, and installs it on the global object.
pub struct BuiltInObject {
    /// Name of the global binding, also used as the class of namespaces.
    pub name: &'static str,
    /// Existing prototype skeleton this built-in populates.
    pub prototype: Option<WellKnownIntrinsics>,
    constructor: Option<(NativeFn, Option<NativeFn>, u32)>,
    methods: Vec<Member>,
    statics: Vec<Member>,
}

fn method_descriptor(value: JsValue) -> PropertyDescriptorSetter {
    PropertyDescriptorSetter::new_data(value, true, false, true)
}

fn install(
    ctx: &mut EvalContext,
    target: &JsObjectType,
    members: Vec<Member>,
) -> Result<(), JErrorType> {
    for member in members {
        match member {
            Member::Method(name, f, length) => {
                let fo = new_native_function(ctx, name, f, None, length)?;
                target
                    .borrow_mut()
                    .define_value(PropertyKey::named(name), JsValue::object(fo), true, false, true);
            }
            Member::Value(name, value) => {
                target
                    .borrow_mut()
                    .define_value(PropertyKey::named(name), value, false, false, false);
            }
        }
    }
    Ok(())
}

impl BuiltInObject {
    /// Create a new built-in object with the given name.
    pub fn new(name: &'static str) -> Self {
        BuiltInObject {
            name,
            prototype: None,
            constructor: None,
            methods: Vec::new(),
            statics: Vec::new(),
        }
    }

    /// Populate an existing prototype skeleton.
    pub fn with_prototype(mut self, prototype: WellKnownIntrinsics) -> Self {
        self.prototype = Some(prototype);
        self
    }

    /// Set the constructor; the same function serves `new`.
    pub fn with_constructor(mut self, call: NativeFn, length: u32) -> Self {
        self.constructor = Some((call, Some(call), length));
        self
    }

    /// Use a different function for `new` than for plain calls.
    pub fn with_construct(mut self, construct: NativeFn) -> Self {
        if let Some((_, c, _)) = &mut self.constructor {
            *c = Some(construct);
        }
        self
    }

    /// Add a method to the prototype, or to the object itself when there is
    /// no prototype.
    pub fn add_method(mut self, name: &'static str, func: NativeFn, length: u32) -> Self {
        self.methods.push(Member::Method(name, func, length));
        self
    }

    /// Add a method to the constructor.
    pub fn add_static_method(mut self, name: &'static str, func: NativeFn, length: u32) -> Self {
        self.statics.push(Member::Method(name, func, length));
        self
    }

    /// Add a read-only property to the constructor or namespace object.
    pub fn add_property(mut self, name: &'static str, value: JsValue) -> Self {
        self.statics.push(Member::Value(name, value));
        self
    }

    /// Materialises the built-in and binds it on the global object.
    pub fn register(self, ctx: &mut EvalContext) -> Result<JsObjectType, JErrorType> {
        let prototype = self.prototype.map(|p| ctx.intrinsic(p));
        let holder = match self.constructor {
            Some((call, construct, length)) => {
                let ctor = new_native_function(ctx, self.name, call, construct, length)?;
                if let Some(proto) = &prototype {
                    ctor.borrow_mut().define_value(
                        "prototype",
                        JsValue::object(proto.clone()),
                        false,
                        false,
                        false,
                    );
                    proto.borrow_mut().define_value(
                        "constructor",
                        JsValue::object(ctor.clone()),
                        true,
                        false,
                        true,
                    );
                }
                ctor
            }
            None => {
                ctx.heap.allocate()?;
                let proto = ctx.intrinsic(WellKnownIntrinsics::ObjectPrototype);
                JsObject::new(self.name, Some(proto), ObjectKind::Ordinary).into_ref()
            }
        };
        let method_target = prototype.unwrap_or_else(|| holder.clone());
        install(ctx, &method_target, self.methods)?;
        install(ctx, &holder, self.statics)?;
        let global = ctx.global_object();
        object::define_own_property(
            ctx,
            &global,
            &PropertyKey::named(self.name),
            method_descriptor(JsValue::object(holder.clone())),
            true,
        )?;
        debug!("registered built-in {}", self.name);
        Ok(holder)
    }
}

/// Binds a native function on the global object.
pub fn define_global_function(
    ctx: &mut EvalContext,
    name: &'static str,
    func: NativeFn,
    length: u32,
) -> Result<JsObjectType, JErrorType> {
    let fo = new_native_function(ctx, name, func, None, length)?;
    let global = ctx.global_object();
    object::define_own_property(
        ctx,
        &global,
        &PropertyKey::named(name),
        method_descriptor(JsValue::object(fo.clone())),
        true,
    )?;
    Ok(fo)
}

/// Binds a non-writable, non-enumerable, non-configurable global value.
pub fn define_global_value(ctx: &mut EvalContext, name: &'static str, value: JsValue) {
    ctx.global_object()
        .borrow_mut()
        .define_value(PropertyKey::named(name), value, false, false, false);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_has_global_context() {
        let ctx = EvalContext::new(RuntimeConfig::default()).unwrap();
        assert_eq!(ctx.ctx_stack.len(), 1);
        assert!(!ctx.is_strict());
        assert!(ctx.this_binding().same_object(&ctx.global_object()));
    }

    #[test]
    fn test_call_depth_limit() {
        let mut ctx = EvalContext::new(RuntimeConfig::default().with_max_call_depth(2)).unwrap();
        assert!(ctx.enter_call().is_ok());
        assert!(ctx.enter_call().is_ok());
        let err = ctx.enter_call().unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::RangeError));
        ctx.leave_call();
        assert!(ctx.enter_call().is_ok());
    }

    #[test]
    fn test_error_to_value_builds_error_object() {
        let mut ctx = EvalContext::new(RuntimeConfig::default()).unwrap();
        let v = ctx.error_to_value(Message::NotAFunction.into());
        let o = v.try_object().unwrap();
        assert_eq!(o.borrow().class, "Error");
        let proto = ctx.intrinsic(WellKnownIntrinsics::TypeErrorPrototype);
        assert!(std::rc::Rc::ptr_eq(o.borrow().prototype.as_ref().unwrap(), &proto));
        let thrown = ctx.error_to_value(JErrorType::Thrown(JsValue::number(3.0)));
        assert_eq!(thrown.as_number(), 3.0);
    }

    #[test]
    fn test_capture_output() {
        let mut ctx = EvalContext::new(RuntimeConfig::default()).unwrap();
        ctx.capture_output();
        ctx.write_line("hello".to_string());
        assert_eq!(ctx.take_output(), vec!["hello".to_string()]);
        assert!(ctx.take_output().is_empty());
    }
}
