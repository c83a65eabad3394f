//! RegExp built-in.
//!
//! Patterns are compiled once, when the object is created; `exec` and the
//! String methods that take a regular expression share [`exec_at`].

use crate::runner::ds::error::{JErrorType, Message};
use crate::runner::ds::object::{self, JsObject, JsObjectType, ObjectKind};
use crate::runner::ds::object_property::PropertyKey;
use crate::runner::ds::operations::type_conversion::{to_integer, to_string};
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::regexp_object::{RegExpData, RegExpMatch};
use crate::runner::ds::string::JsString;
use crate::runner::ds::value::JsValue;
use crate::runner::types::{arg, BuiltInObject, EvalContext};

/// Register the RegExp constructor and populate `RegExp.prototype`.
pub fn register(ctx: &mut EvalContext) -> Result<(), JErrorType> {
    BuiltInObject::new("RegExp")
        .with_prototype(WellKnownIntrinsics::RegExpPrototype)
        .with_constructor(regexp_call, 2)
        .with_construct(regexp_construct)
        .add_method("exec", regexp_proto_exec, 1)
        .add_method("test", regexp_proto_test, 1)
        .add_method("toString", regexp_proto_to_string, 0)
        .register(ctx)?;
    Ok(())
}

/// Creates a RegExp instance; a malformed pattern or flag string raises
/// a SyntaxError.
pub fn new_regexp_object(
    ctx: &mut EvalContext,
    source: JsString,
    flags: &JsString,
) -> Result<JsObjectType, JErrorType> {
    let data = RegExpData::new(source, flags)?;
    ctx.heap.allocate()?;
    let proto = ctx.intrinsic(WellKnownIntrinsics::RegExpPrototype);
    let source = if data.source.is_empty() {
        JsString::intern("(?:)")
    } else {
        data.source.clone()
    };
    let (global, ignore_case, multiline) = (data.global(), data.ignore_case(), data.multiline());
    let mut obj = JsObject::new("RegExp", Some(proto), ObjectKind::RegExp(data));
    obj.define_value("source", JsValue::string(source), false, false, false);
    obj.define_value("global", JsValue::from(global), false, false, false);
    obj.define_value("ignoreCase", JsValue::from(ignore_case), false, false, false);
    obj.define_value("multiline", JsValue::from(multiline), false, false, false);
    obj.define_value("lastIndex", JsValue::number(0.0), true, false, false);
    Ok(obj.into_ref())
}

/// The RegExp object behind `v`, if it is one.
pub fn as_regexp(v: &JsValue) -> Option<JsObjectType> {
    v.try_object()
        .filter(|o| matches!(o.borrow().kind, ObjectKind::RegExp(_)))
}

/// First match in `subject` at or after `start`; no lastIndex bookkeeping.
pub fn match_from(r: &JsObjectType, subject: &JsString, start: usize) -> Option<RegExpMatch> {
    match &r.borrow().kind {
        ObjectKind::RegExp(data) => data.match_at(subject, start),
        _ => None,
    }
}

pub fn is_global(r: &JsObjectType) -> bool {
    match &r.borrow().kind {
        ObjectKind::RegExp(data) => data.global(),
        _ => false,
    }
}

pub fn set_last_index(ctx: &mut EvalContext, r: &JsObjectType, index: f64) -> Result<(), JErrorType> {
    object::put(ctx, r, &PropertyKey::named("lastIndex"), JsValue::number(index), true)
}

/// The array `exec` returns: the match and its captures, plus `index`
/// and `input`.
pub fn match_result(
    ctx: &mut EvalContext,
    m: &RegExpMatch,
    subject: &JsString,
) -> Result<JsObjectType, JErrorType> {
    let items = (0..m.captures.len())
        .map(|i| m.capture(subject, i).map_or(JsValue::undefined(), JsValue::string))
        .collect();
    let a = ctx.new_array(items)?;
    {
        let mut o = a.borrow_mut();
        o.define_value("index", JsValue::from(m.start), true, true, true);
        o.define_value("input", JsValue::string(subject.clone()), true, true, true);
    }
    Ok(a)
}

/// RegExpBuiltinExec (15.10.6.2 steps 4 to 11): honours and updates
/// `lastIndex`, returning the match on success.
pub fn exec_at(
    ctx: &mut EvalContext,
    r: &JsObjectType,
    subject: &JsString,
) -> Result<Option<RegExpMatch>, JErrorType> {
    let last_index = object::get_named(ctx, r, "lastIndex")?;
    let last_index = to_integer(ctx, &last_index)?;
    let global = is_global(r);
    let i = if global { last_index } else { 0.0 };
    if i < 0.0 || i > subject.len() as f64 {
        set_last_index(ctx, r, 0.0)?;
        return Ok(None);
    }
    match match_from(r, subject, i as usize) {
        None => {
            set_last_index(ctx, r, 0.0)?;
            Ok(None)
        }
        Some(m) => {
            if global {
                set_last_index(ctx, r, m.end as f64)?;
            }
            Ok(Some(m))
        }
    }
}

fn this_regexp(this: &JsValue, method: &'static str) -> Result<JsObjectType, JErrorType> {
    as_regexp(this).ok_or_else(|| Message::IncompatibleReceiver("RegExp", method).into())
}

/// new RegExp(pattern, flags)
fn regexp_construct(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let pattern = arg(&args, 0);
    let flags = arg(&args, 1);
    let (source, flags) = match as_regexp(&pattern) {
        Some(r) => {
            if !flags.is_undefined() {
                return Err(Message::RegExpFlagsWithObject.into());
            }
            match &r.borrow().kind {
                ObjectKind::RegExp(data) => {
                    (data.source.clone(), JsString::from(data.flags_string()))
                }
                _ => (JsString::empty(), JsString::empty()),
            }
        }
        None => {
            let source = if pattern.is_undefined() {
                JsString::empty()
            } else {
                to_string(ctx, &pattern)?
            };
            let flags = if flags.is_undefined() {
                JsString::empty()
            } else {
                to_string(ctx, &flags)?
            };
            (source, flags)
        }
    };
    Ok(JsValue::object(new_regexp_object(ctx, source, &flags)?))
}

/// RegExp(pattern, flags) called as a function
fn regexp_call(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let pattern = arg(&args, 0);
    if as_regexp(&pattern).is_some() && arg(&args, 1).is_undefined() {
        return Ok(pattern);
    }
    regexp_construct(ctx, this, args)
}

/// RegExp.prototype.exec
fn regexp_proto_exec(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let r = this_regexp(&this, "exec")?;
    let subject = to_string(ctx, &arg(&args, 0))?;
    match exec_at(ctx, &r, &subject)? {
        Some(m) => Ok(JsValue::object(match_result(ctx, &m, &subject)?)),
        None => Ok(JsValue::null()),
    }
}

/// RegExp.prototype.test
fn regexp_proto_test(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let r = this_regexp(&this, "test")?;
    let subject = to_string(ctx, &arg(&args, 0))?;
    Ok(JsValue::from(exec_at(ctx, &r, &subject)?.is_some()))
}

/// RegExp.prototype.toString
fn regexp_proto_to_string(
    ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let r = this_regexp(&this, "toString")?;
    let source = object::get_named(ctx, &r, "source")?;
    let source = to_string(ctx, &source)?;
    let flags = match &r.borrow().kind {
        ObjectKind::RegExp(data) => data.flags_string(),
        _ => String::new(),
    };
    Ok(JsValue::string(JsString::from(format!("/{}/{}", source, flags))))
}
