use log::trace;

use crate::runner::ds::lex_env::JsLexEnvironmentType;
use crate::runner::ds::object::JsObjectType;
use crate::runner::ds::value::JsValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    Global,
    Function,
    Eval,
    With,
    Catch,
}

pub struct ExecutionContext {
    pub kind: ContextKind,
    pub function: Option<JsObjectType>,
    pub lex_env: JsLexEnvironmentType,
    pub var_env: JsLexEnvironmentType,
    pub this_binding: JsValue,
    pub strict: bool,
}

impl ExecutionContext {
    /// A context for a nested block (`with` or `catch`) that shares
    /// everything with `self` except the lexical environment.
    pub fn nested(&self, kind: ContextKind, lex_env: JsLexEnvironmentType) -> Self {
        ExecutionContext {
            kind,
            function: self.function.clone(),
            lex_env,
            var_env: self.var_env.clone(),
            this_binding: self.this_binding.clone(),
            strict: self.strict,
        }
    }
}

/// Running contexts plus the pending exception.
///
/// The exception slot holds `nothing` when no exception is propagating.
pub struct ExecutionContextStack {
    stack: Vec<ExecutionContext>,
    pending_exception: JsValue,
}

impl Default for ExecutionContextStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionContextStack {
    pub fn new() -> Self {
        ExecutionContextStack {
            stack: Vec::new(),
            pending_exception: JsValue::nothing(),
        }
    }

    pub fn get_running_execution_ctx(&self) -> Option<&ExecutionContext> {
        self.stack.last()
    }

    pub fn get_running_execution_ctx_mut(&mut self) -> Option<&mut ExecutionContext> {
        self.stack.last_mut()
    }

    pub fn pop_running_execution_ctx(&mut self) -> Option<ExecutionContext> {
        let ctx = self.stack.pop();
        if let Some(c) = &ctx {
            trace!("leave {:?} context, depth {}", c.kind, self.stack.len());
        }
        ctx
    }

    pub fn push_execution_ctx(&mut self, ctx: ExecutionContext) {
        trace!("enter {:?} context, depth {}", ctx.kind, self.stack.len() + 1);
        self.stack.push(ctx)
    }

    /// Drops contexts above `len`, e.g. `with` blocks left open by an
    /// abrupt completion.
    pub fn truncate(&mut self, len: usize) {
        while self.stack.len() > len {
            self.pop_running_execution_ctx();
        }
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn is_strict(&self) -> bool {
        self.stack.last().map_or(false, |c| c.strict)
    }

    pub fn has_pending_exception(&self) -> bool {
        !self.pending_exception.is_nothing()
    }

    pub fn pending_exception(&self) -> JsValue {
        self.pending_exception.clone()
    }

    pub fn set_pending_exception(&mut self, value: JsValue) {
        self.pending_exception = value;
    }

    /// Removes and returns the pending exception.
    pub fn take_pending_exception(&mut self) -> JsValue {
        std::mem::replace(&mut self.pending_exception, JsValue::nothing())
    }

    pub fn clear_pending_exception(&mut self) {
        self.pending_exception = JsValue::nothing();
    }
}
