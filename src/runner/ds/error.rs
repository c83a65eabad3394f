use thiserror::Error;

use crate::runner::ds::value::JsValue;

/// Native error constructors, in the order they hang off the realm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Error,
    EvalError,
    RangeError,
    ReferenceError,
    SyntaxError,
    TypeError,
    URIError,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::Error,
        ErrorKind::EvalError,
        ErrorKind::RangeError,
        ErrorKind::ReferenceError,
        ErrorKind::SyntaxError,
        ErrorKind::TypeError,
        ErrorKind::URIError,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::Error => "Error",
            ErrorKind::EvalError => "EvalError",
            ErrorKind::RangeError => "RangeError",
            ErrorKind::ReferenceError => "ReferenceError",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::URIError => "URIError",
        }
    }
}

/// Failure of a runtime operation.
///
/// Native variants carry a message and are materialised into Error objects
/// only when they cross into script-visible state. `Thrown` carries a value
/// that was already thrown by script code.
#[derive(Debug, Clone, Error)]
pub enum JErrorType {
    #[error("Error: {0}")]
    Error(String),
    #[error("EvalError: {0}")]
    EvalError(String),
    #[error("RangeError: {0}")]
    RangeError(String),
    #[error("ReferenceError: {0}")]
    ReferenceError(String),
    #[error("SyntaxError: {0}")]
    SyntaxError(String),
    #[error("TypeError: {0}")]
    TypeError(String),
    #[error("URIError: {0}")]
    URIError(String),
    #[error("uncaught exception {0:?}")]
    Thrown(JsValue),
}

impl JErrorType {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::Error => JErrorType::Error(message),
            ErrorKind::EvalError => JErrorType::EvalError(message),
            ErrorKind::RangeError => JErrorType::RangeError(message),
            ErrorKind::ReferenceError => JErrorType::ReferenceError(message),
            ErrorKind::SyntaxError => JErrorType::SyntaxError(message),
            ErrorKind::TypeError => JErrorType::TypeError(message),
            ErrorKind::URIError => JErrorType::URIError(message),
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        Some(match self {
            JErrorType::Error(_) => ErrorKind::Error,
            JErrorType::EvalError(_) => ErrorKind::EvalError,
            JErrorType::RangeError(_) => ErrorKind::RangeError,
            JErrorType::ReferenceError(_) => ErrorKind::ReferenceError,
            JErrorType::SyntaxError(_) => ErrorKind::SyntaxError,
            JErrorType::TypeError(_) => ErrorKind::TypeError,
            JErrorType::URIError(_) => ErrorKind::URIError,
            JErrorType::Thrown(_) => return None,
        })
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            JErrorType::Error(m)
            | JErrorType::EvalError(m)
            | JErrorType::RangeError(m)
            | JErrorType::ReferenceError(m)
            | JErrorType::SyntaxError(m)
            | JErrorType::TypeError(m)
            | JErrorType::URIError(m) => Some(m),
            JErrorType::Thrown(_) => None,
        }
    }
}

/// Built-in message templates, keyed by id.
#[derive(Debug, Clone, Error)]
pub enum Message {
    #[error("invalid array length '{0}'")]
    InvalidArrayLength(String),
    #[error("radix must be a value between 2 and 36.")]
    BadRadix,
    #[error("the number of fractional digits must be a value between 0 and 20.")]
    FractionDigits,
    #[error("date number must be a finite number.")]
    NonFiniteDate,
    #[error("precision must be a value between 1 and 21.")]
    Precision,
    #[error("maximum call stack size exceeded.")]
    StackOverflow,
    #[error("out of memory.")]
    OutOfMemory,

    #[error("'{0}' is not defined.")]
    NotDefined(String),
    #[error("unresolvable reference to '{0}'.")]
    UnresolvableReference(String),

    #[error("assignment to eval or arguments is not allowed in strict mode.")]
    StrictEvalArguments,
    #[error("unqualified identifier cannot be deleted in strict mode.")]
    StrictDeleteUnqualified,
    #[error("could not compile regular expression: {0}.")]
    RegExpCompile(String),
    #[error("illegal flag '{0}' in regular expression.")]
    RegExpIllegalFlag(char),
    #[error("duplicate flag '{0}' in regular expression.")]
    RegExpDuplicateFlag(char),
    #[error("illegal formal parameter list")]
    IllegalParameterList,
    #[error("unexpected token '{0}' in JSON at position {1}.")]
    JsonUnexpectedToken(String, usize),
    #[error("unexpected end of JSON input.")]
    JsonUnexpectedEnd,

    #[error("cannot convert null or undefined to an object.")]
    NullToObject,
    #[error("object cannot be converted to a primitive value.")]
    NoDefaultValue,
    #[error("cannot update immutable binding '{0}'.")]
    ImmutableBinding(String),
    #[error("cannot put property '{0}'.")]
    CannotPut(String),
    #[error("cannot put property '{0}', target property is an accessor without a setter.")]
    AccessorWithoutSetter(String),
    #[error("cannot delete property '{0}'.")]
    CannotDelete(String),
    #[error("cannot define property '{0}', it is not extensible.")]
    NotExtensible(String),
    #[error("cannot redefine property '{0}'.")]
    CannotRedefine(String),
    #[error("caller property of an object cannot be accessed in strict mode.")]
    StrictCaller,
    #[error("'caller', 'callee' and 'arguments' properties may not be accessed in strict mode.")]
    StrictPoisonPill,
    #[error("expected object in function instanceof check.")]
    InstanceofNeedsObject,
    #[error("expected object in 'in' check.")]
    InNeedsObject,
    #[error("object is not a function.")]
    NotAFunction,
    #[error("element is not an object.")]
    NotAnObject,
    #[error("expected {0} value or object.")]
    ExpectedValue(&'static str),
    #[error("getter is not callable or undefined, cannot convert object to property.")]
    GetterNotCallable,
    #[error("setter is not callable or undefined, cannot convert object to property.")]
    SetterNotCallable,
    #[error("property descriptor cannot both specify accessors and a value or writable attribute.")]
    MixedDescriptor,
    #[error("function declaration '{0}' conflicts with an existing global property.")]
    GlobalDeclaration(String),
    #[error("'{0}' is not a function.")]
    NotAFunctionNamed(String),
    #[error("{0}.prototype.{1} called on incompatible receiver.")]
    IncompatibleReceiver(&'static str, &'static str),
    #[error("flags cannot be specified when specifying a RegExp object pattern.")]
    RegExpFlagsWithObject,
    #[error("built-in objects cannot be used as constructors.")]
    NotAConstructor,
    #[error("specified parameter is not callable.")]
    ParameterNotCallable,
    #[error("cannot reduce without an accumulator or initial value.")]
    ReduceEmpty,
    #[error("unknown property key id {0:#x}.")]
    UnknownKey(u64),
    #[error("cyclic prototype chain.")]
    PrototypeCycle,
    #[error("converting circular structure to JSON.")]
    JsonCyclic,
    #[error("invalid time value.")]
    InvalidTimeValue,

    #[error("bad uri format.")]
    BadUri,
    #[error("couldn't encode string in uri format.")]
    UriEncode,

    #[error("evaluating source text requires a source compiler.")]
    NoSourceCompiler,
}

impl Message {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Message::InvalidArrayLength(_)
            | Message::BadRadix
            | Message::FractionDigits
            | Message::NonFiniteDate
            | Message::Precision
            | Message::StackOverflow
            | Message::OutOfMemory
            | Message::InvalidTimeValue => ErrorKind::RangeError,
            Message::NotDefined(_) | Message::UnresolvableReference(_) => {
                ErrorKind::ReferenceError
            }
            Message::StrictEvalArguments
            | Message::StrictDeleteUnqualified
            | Message::RegExpCompile(_)
            | Message::RegExpIllegalFlag(_)
            | Message::RegExpDuplicateFlag(_)
            | Message::IllegalParameterList
            | Message::JsonUnexpectedToken(..)
            | Message::JsonUnexpectedEnd => ErrorKind::SyntaxError,
            Message::BadUri | Message::UriEncode => ErrorKind::URIError,
            Message::NoSourceCompiler => ErrorKind::EvalError,
            _ => ErrorKind::TypeError,
        }
    }
}

impl From<Message> for JErrorType {
    fn from(m: Message) -> Self {
        JErrorType::new(m.kind(), m.to_string())
    }
}
