//! String built-in.
//!
//! Provides the String constructor and the ES5 prototype methods. Indices
//! and lengths are in UTF-16 code units throughout.

use crate::runner::ds::error::{JErrorType, Message};
use crate::runner::ds::function_object::call_value;
use crate::runner::ds::object::{JsObjectType, ObjectKind};
use crate::runner::ds::operations::type_conversion::{
    check_object_coercible, to_integer, to_number, to_string, to_uint16, to_uint32,
};
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::regexp_object::RegExpMatch;
use crate::runner::ds::string::JsString;
use crate::runner::ds::string_object::new_string_object;
use crate::runner::ds::value::JsValue;
use crate::runner::std_lib::regexp::{
    as_regexp, exec_at, is_global, match_from, match_result, new_regexp_object, set_last_index,
};
use crate::runner::text::builder::StringBuilder;
use crate::runner::text::unicode::is_trimmable;
use crate::runner::types::{arg, BuiltInObject, EvalContext};

/// Register the String built-in.
pub fn register(ctx: &mut EvalContext) -> Result<(), JErrorType> {
    BuiltInObject::new("String")
        .with_prototype(WellKnownIntrinsics::StringPrototype)
        .with_constructor(string_call, 1)
        .with_construct(string_construct)
        .add_static_method("fromCharCode", string_from_char_code, 1)
        .add_method("toString", string_proto_to_string, 0)
        .add_method("valueOf", string_proto_value_of, 0)
        .add_method("charAt", string_proto_char_at, 1)
        .add_method("charCodeAt", string_proto_char_code_at, 1)
        .add_method("concat", string_proto_concat, 1)
        .add_method("indexOf", string_proto_index_of, 1)
        .add_method("lastIndexOf", string_proto_last_index_of, 1)
        .add_method("localeCompare", string_proto_locale_compare, 1)
        .add_method("match", string_proto_match, 1)
        .add_method("replace", string_proto_replace, 2)
        .add_method("search", string_proto_search, 1)
        .add_method("slice", string_proto_slice, 2)
        .add_method("split", string_proto_split, 2)
        .add_method("substr", string_proto_substr, 2)
        .add_method("substring", string_proto_substring, 2)
        .add_method("toLowerCase", string_proto_to_lower_case, 0)
        .add_method("toLocaleLowerCase", string_proto_to_lower_case, 0)
        .add_method("toUpperCase", string_proto_to_upper_case, 0)
        .add_method("toLocaleUpperCase", string_proto_to_upper_case, 0)
        .add_method("trim", string_proto_trim, 0)
        .register(ctx)?;
    Ok(())
}

/// `this` coerced the way the generic String methods require.
fn this_string(ctx: &mut EvalContext, this: &JsValue) -> Result<JsString, JErrorType> {
    check_object_coercible(this)?;
    to_string(ctx, this)
}

fn string_value(this: &JsValue, method: &'static str) -> Result<JsString, JErrorType> {
    if let Some(s) = this.try_string() {
        return Ok(s);
    }
    if let Some(o) = this.try_object() {
        if let ObjectKind::String(s) = &o.borrow().kind {
            return Ok(s.clone());
        }
    }
    Err(Message::IncompatibleReceiver("String", method).into())
}

/// Clamps a relative position into `0..=len`.
fn clamp(pos: f64, len: usize) -> usize {
    pos.max(0.0).min(len as f64) as usize
}

fn new_array(ctx: &mut EvalContext, items: Vec<JsValue>) -> Result<JsValue, JErrorType> {
    Ok(JsValue::object(ctx.new_array(items)?))
}

/// String(value)
fn string_call(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    match args.first() {
        Some(v) => Ok(JsValue::string(to_string(ctx, v)?)),
        None => Ok(JsValue::string(JsString::empty())),
    }
}

/// new String(value)
fn string_construct(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = match args.first() {
        Some(v) => to_string(ctx, v)?,
        None => JsString::empty(),
    };
    ctx.heap.allocate()?;
    let proto = ctx.intrinsic(WellKnownIntrinsics::StringPrototype);
    Ok(JsValue::object(new_string_object(proto, s)))
}

/// String.fromCharCode
fn string_from_char_code(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let mut units = Vec::with_capacity(args.len());
    for a in &args {
        units.push(to_uint16(ctx, a)?);
    }
    Ok(JsValue::string(JsString::from_units(units)))
}

/// String.prototype.toString
fn string_proto_to_string(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::string(string_value(&this, "toString")?))
}

/// String.prototype.valueOf
fn string_proto_value_of(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::string(string_value(&this, "valueOf")?))
}

/// String.prototype.charAt
fn string_proto_char_at(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = this_string(ctx, &this)?;
    let pos = to_integer(ctx, &arg(&args, 0))?;
    if pos < 0.0 || pos >= s.len() as f64 {
        return Ok(JsValue::string(JsString::empty()));
    }
    Ok(JsValue::string(s.substr(pos as usize, 1)))
}

/// String.prototype.charCodeAt
fn string_proto_char_code_at(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = this_string(ctx, &this)?;
    let pos = to_integer(ctx, &arg(&args, 0))?;
    if pos < 0.0 || pos >= s.len() as f64 {
        return Ok(JsValue::number(f64::NAN));
    }
    Ok(JsValue::number(s.at(pos as usize) as f64))
}

/// String.prototype.concat
fn string_proto_concat(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = this_string(ctx, &this)?;
    let mut out = StringBuilder::new();
    out.push_js(&s);
    for a in &args {
        let part = to_string(ctx, a)?;
        out.push_js(&part);
    }
    Ok(JsValue::string(out.build()))
}

/// String.prototype.indexOf
fn string_proto_index_of(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = this_string(ctx, &this)?;
    let search = to_string(ctx, &arg(&args, 0))?;
    let pos = to_integer(ctx, &arg(&args, 1))?;
    let start = clamp(pos, s.len());
    let found = s.index_of(&search, start).map_or(-1.0, |i| i as f64);
    Ok(JsValue::number(found))
}

/// String.prototype.lastIndexOf
fn string_proto_last_index_of(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = this_string(ctx, &this)?;
    let search = to_string(ctx, &arg(&args, 0))?;
    let num_pos = to_number(ctx, &arg(&args, 1))?;
    let pos = if num_pos.is_nan() {
        f64::INFINITY
    } else {
        num_pos.trunc()
    };
    let start = clamp(pos, s.len());
    let found = s.last_index_of(&search, start).map_or(-1.0, |i| i as f64);
    Ok(JsValue::number(found))
}

/// String.prototype.localeCompare
fn string_proto_locale_compare(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = this_string(ctx, &this)?;
    let that = to_string(ctx, &arg(&args, 0))?;
    let order = s.compare(&that) as i32;
    Ok(JsValue::number(order as f64))
}

/// Converts a `match`/`search` argument into a RegExp object.
fn coerce_regexp(ctx: &mut EvalContext, v: &JsValue) -> Result<JsObjectType, JErrorType> {
    if let Some(r) = as_regexp(v) {
        return Ok(r);
    }
    let source = if v.is_undefined() {
        JsString::empty()
    } else {
        to_string(ctx, v)?
    };
    new_regexp_object(ctx, source, &JsString::empty())
}

/// String.prototype.match
fn string_proto_match(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = this_string(ctx, &this)?;
    let rx = coerce_regexp(ctx, &arg(&args, 0))?;
    if !is_global(&rx) {
        return match exec_at(ctx, &rx, &s)? {
            Some(m) => Ok(JsValue::object(match_result(ctx, &m, &s)?)),
            None => Ok(JsValue::null()),
        };
    }
    let mut matches = Vec::new();
    let mut start = 0;
    while start <= s.len() {
        let m = match match_from(&rx, &s, start) {
            Some(m) => m,
            None => break,
        };
        start = if m.end == m.start { m.end + 1 } else { m.end };
        matches.push(JsValue::string(s.substr(m.start, m.end - m.start)));
    }
    set_last_index(ctx, &rx, 0.0)?;
    if matches.is_empty() {
        Ok(JsValue::null())
    } else {
        new_array(ctx, matches)
    }
}

/// Expands `$$`, `$&`, `` $` ``, `$'`, `$n` and `$nn` in a replacement
/// template.
fn expand_replacement(template: &JsString, subject: &JsString, m: &RegExpMatch, out: &mut StringBuilder) {
    let t = template.units();
    let group_count = m.captures.len().saturating_sub(1);
    let digit = |u: u16| (u as u32).checked_sub('0' as u32).filter(|d| *d < 10).map(|d| d as usize);
    let mut i = 0;
    while i < t.len() {
        if t[i] != '$' as u16 || i + 1 >= t.len() {
            out.push_unit(t[i]);
            i += 1;
            continue;
        }
        let next = t[i + 1];
        if next == '$' as u16 {
            out.push_char('$');
            i += 2;
        } else if next == '&' as u16 {
            out.push_units(&subject.units()[m.start..m.end]);
            i += 2;
        } else if next == '`' as u16 {
            out.push_units(&subject.units()[..m.start]);
            i += 2;
        } else if next == '\'' as u16 {
            out.push_units(&subject.units()[m.end..]);
            i += 2;
        } else if let Some(d1) = digit(next) {
            let two = t.get(i + 2).copied().and_then(digit).map(|d2| d1 * 10 + d2);
            let (n, width) = match two {
                Some(nn) if nn >= 1 && nn <= group_count => (nn, 3),
                _ => (d1, 2),
            };
            if n >= 1 && n <= group_count {
                if let Some(c) = m.capture(subject, n) {
                    out.push_js(&c);
                }
                i += width;
            } else {
                out.push_unit(t[i]);
                i += 1;
            }
        } else {
            out.push_unit(t[i]);
            i += 1;
        }
    }
}

/// String.prototype.replace
fn string_proto_replace(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = this_string(ctx, &this)?;
    let search = arg(&args, 0);
    let replace = arg(&args, 1);

    let mut matches = Vec::new();
    if let Some(rx) = as_regexp(&search) {
        if is_global(&rx) {
            set_last_index(ctx, &rx, 0.0)?;
            let mut start = 0;
            while start <= s.len() {
                let m = match match_from(&rx, &s, start) {
                    Some(m) => m,
                    None => break,
                };
                start = if m.end == m.start { m.end + 1 } else { m.end };
                matches.push(m);
            }
            set_last_index(ctx, &rx, 0.0)?;
        } else if let Some(m) = exec_at(ctx, &rx, &s)? {
            matches.push(m);
        }
    } else {
        let needle = to_string(ctx, &search)?;
        if let Some(start) = s.index_of(&needle, 0) {
            let end = start + needle.len();
            matches.push(RegExpMatch {
                start,
                end,
                captures: vec![Some((start, end))],
            });
        }
    }

    let template = if replace.is_callable() {
        None
    } else {
        Some(to_string(ctx, &replace)?)
    };
    let mut out = StringBuilder::new();
    let mut last = 0;
    for m in &matches {
        out.push_units(&s.units()[last..m.start]);
        match &template {
            Some(t) => expand_replacement(t, &s, m, &mut out),
            None => {
                let mut call_args: Vec<JsValue> = (0..m.captures.len())
                    .map(|i| m.capture(&s, i).map_or(JsValue::undefined(), JsValue::string))
                    .collect();
                call_args.push(JsValue::from(m.start));
                call_args.push(JsValue::string(s.clone()));
                let v = call_value(ctx, &replace, JsValue::undefined(), call_args)?;
                let piece = to_string(ctx, &v)?;
                out.push_js(&piece);
            }
        }
        last = m.end;
    }
    out.push_units(&s.units()[last..]);
    Ok(JsValue::string(out.build()))
}

/// String.prototype.search
fn string_proto_search(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = this_string(ctx, &this)?;
    let rx = coerce_regexp(ctx, &arg(&args, 0))?;
    let found = match_from(&rx, &s, 0).map_or(-1.0, |m| m.start as f64);
    Ok(JsValue::number(found))
}

/// String.prototype.slice
fn string_proto_slice(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = this_string(ctx, &this)?;
    let len = s.len() as f64;
    let relative = |n: f64| if n < 0.0 { (len + n).max(0.0) } else { n.min(len) };
    let from = relative(to_integer(ctx, &arg(&args, 0))?);
    let to = match arg(&args, 1) {
        v if v.is_undefined() => len,
        v => relative(to_integer(ctx, &v)?),
    };
    let span = (to - from).max(0.0);
    Ok(JsValue::string(s.substr(from as usize, span as usize)))
}

/// SplitMatch for a string separator: the end of `sep` when it occurs at `q`.
fn split_at_string(s: &JsString, q: usize, sep: &JsString) -> Option<(usize, usize)> {
    s.index_of(sep, q).map(|start| (start, start + sep.len()))
}

/// String.prototype.split
fn string_proto_split(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = this_string(ctx, &this)?;
    let limit = match arg(&args, 1) {
        v if v.is_undefined() => u32::MAX as usize,
        v => to_uint32(ctx, &v)? as usize,
    };
    let separator = arg(&args, 0);
    let rx = as_regexp(&separator);
    let sep = match (&rx, separator.is_undefined()) {
        (Some(_), _) => None,
        (None, true) => return new_array(ctx, vec![JsValue::string(s)]),
        (None, false) => Some(to_string(ctx, &separator)?),
    };
    if limit == 0 {
        return new_array(ctx, Vec::new());
    }
    let find = |q: usize| -> Option<RegExpMatch> {
        match (&rx, &sep) {
            (Some(r), _) => match_from(r, &s, q),
            (None, Some(sep)) => split_at_string(&s, q, sep).map(|(start, end)| RegExpMatch {
                start,
                end,
                captures: vec![Some((start, end))],
            }),
            (None, None) => None,
        }
    };

    let size = s.len();
    if size == 0 {
        return match find(0) {
            Some(_) => new_array(ctx, Vec::new()),
            None => new_array(ctx, vec![JsValue::string(s.clone())]),
        };
    }

    let mut parts = Vec::new();
    let mut p = 0;
    let mut q = p;
    while q < size {
        let m = match find(q) {
            Some(m) if m.start < size => m,
            _ => break,
        };
        if m.end == p {
            q = m.start + 1;
            continue;
        }
        parts.push(JsValue::string(s.substr(p, m.start - p)));
        if parts.len() == limit {
            return new_array(ctx, parts);
        }
        for i in 1..m.captures.len() {
            parts.push(m.capture(&s, i).map_or(JsValue::undefined(), JsValue::string));
            if parts.len() == limit {
                return new_array(ctx, parts);
            }
        }
        p = m.end;
        q = p;
    }
    parts.push(JsValue::string(s.skip(p)));
    new_array(ctx, parts)
}

/// String.prototype.substr
fn string_proto_substr(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = this_string(ctx, &this)?;
    let len = s.len() as f64;
    let start = to_integer(ctx, &arg(&args, 0))?;
    let length = match arg(&args, 1) {
        v if v.is_undefined() => f64::INFINITY,
        v => to_integer(ctx, &v)?,
    };
    let start = if start < 0.0 { (len + start).max(0.0) } else { start.min(len) };
    let count = length.max(0.0).min(len - start);
    if count <= 0.0 {
        return Ok(JsValue::string(JsString::empty()));
    }
    Ok(JsValue::string(s.substr(start as usize, count as usize)))
}

/// String.prototype.substring
fn string_proto_substring(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = this_string(ctx, &this)?;
    let len = s.len();
    let start = clamp(to_integer(ctx, &arg(&args, 0))?, len);
    let end = match arg(&args, 1) {
        v if v.is_undefined() => len,
        v => clamp(to_integer(ctx, &v)?, len),
    };
    let (from, to) = if start <= end { (start, end) } else { (end, start) };
    Ok(JsValue::string(s.substr(from, to - from)))
}

/// String.prototype.toLowerCase
fn string_proto_to_lower_case(
    ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::string(this_string(ctx, &this)?.to_lower()))
}

/// String.prototype.toUpperCase
fn string_proto_to_upper_case(
    ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::string(this_string(ctx, &this)?.to_upper()))
}

/// String.prototype.trim
fn string_proto_trim(
    ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::string(this_string(ctx, &this)?.trim(is_trimmable)))
}
