//! JSON built-in object.
//!
//! Provides JSON.parse (a recursive descent over the UTF-16 text, with an
//! optional reviver) and JSON.stringify (with replacer function or key list,
//! indentation gap and cycle detection).

use std::rc::Rc;

use crate::runner::ds::error::{JErrorType, Message};
use crate::runner::ds::function_object::call_value;
use crate::runner::ds::object::{self, JsObjectType, ObjectKind};
use crate::runner::ds::object_property::PropertyKey;
use crate::runner::ds::operations::number_format::number_to_string;
use crate::runner::ds::operations::object::{create_data_property, length_of_array_like};
use crate::runner::ds::operations::type_conversion::{to_integer, to_number, to_string};
use crate::runner::ds::string::JsString;
use crate::runner::ds::value::JsValue;
use crate::runner::text::builder::StringBuilder;
use crate::runner::types::{arg, BuiltInObject, EvalContext};

/// Register the JSON object.
pub fn register(ctx: &mut EvalContext) -> Result<(), JErrorType> {
    BuiltInObject::new("JSON")
        .add_method("parse", json_parse, 2)
        .add_method("stringify", json_stringify, 3)
        .register(ctx)?;
    Ok(())
}

struct Parser<'a> {
    text: &'a [u16],
    pos: usize,
}

fn is_json_space(c: u16) -> bool {
    matches!(c, 0x20 | 0x09 | 0x0A | 0x0D)
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<u16> {
        self.text.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().map_or(false, is_json_space) {
            self.pos += 1;
        }
    }

    fn unexpected(&self) -> JErrorType {
        match self.peek() {
            None => Message::JsonUnexpectedEnd.into(),
            Some(c) => {
                let token = String::from_utf16_lossy(&[c]);
                Message::JsonUnexpectedToken(token, self.pos).into()
            }
        }
    }

    fn expect(&mut self, c: char) -> Result<(), JErrorType> {
        if self.peek() == Some(c as u16) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    fn expect_word(&mut self, word: &str) -> Result<(), JErrorType> {
        for c in word.chars() {
            self.expect(c)?;
        }
        Ok(())
    }

    fn parse_value(&mut self, ctx: &mut EvalContext) -> Result<JsValue, JErrorType> {
        self.skip_whitespace();
        let c = self.peek().ok_or_else(|| JErrorType::from(Message::JsonUnexpectedEnd))?;
        match char::from_u32(c as u32).unwrap_or('\u{FFFD}') {
            '{' => self.parse_nested(ctx, Self::parse_object),
            '[' => self.parse_nested(ctx, Self::parse_array),
            '"' => Ok(JsValue::string(self.parse_string()?)),
            't' => {
                self.expect_word("true")?;
                Ok(JsValue::boolean(true))
            }
            'f' => {
                self.expect_word("false")?;
                Ok(JsValue::boolean(false))
            }
            'n' => {
                self.expect_word("null")?;
                Ok(JsValue::null())
            }
            '-' | '0'..='9' => self.parse_number(),
            _ => Err(self.unexpected()),
        }
    }

    /// Nesting counts against the call depth, so deep input raises a
    /// RangeError.
    fn parse_nested(
        &mut self,
        ctx: &mut EvalContext,
        parse: fn(&mut Self, &mut EvalContext) -> Result<JsValue, JErrorType>,
    ) -> Result<JsValue, JErrorType> {
        ctx.enter_call()?;
        let result = parse(self, ctx);
        ctx.leave_call();
        result
    }

    fn digits(&mut self) -> usize {
        let start = self.pos;
        while self.peek().map_or(false, |c| (b'0' as u16..=b'9' as u16).contains(&c)) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn parse_number(&mut self) -> Result<JsValue, JErrorType> {
        let start = self.pos;
        if self.peek() == Some('-' as u16) {
            self.pos += 1;
        }
        if self.peek() == Some('0' as u16) {
            self.pos += 1;
        } else if self.digits() == 0 {
            return Err(self.unexpected());
        }
        if self.peek() == Some('.' as u16) {
            self.pos += 1;
            if self.digits() == 0 {
                return Err(self.unexpected());
            }
        }
        if matches!(self.peek(), Some(c) if c == 'e' as u16 || c == 'E' as u16) {
            self.pos += 1;
            if matches!(self.peek(), Some(c) if c == '+' as u16 || c == '-' as u16) {
                self.pos += 1;
            }
            if self.digits() == 0 {
                return Err(self.unexpected());
            }
        }
        let literal = String::from_utf16_lossy(&self.text[start..self.pos]);
        literal
            .parse::<f64>()
            .map(JsValue::number)
            .map_err(|_| Message::JsonUnexpectedToken(literal, start).into())
    }

    fn parse_string(&mut self) -> Result<JsString, JErrorType> {
        self.expect('"')?;
        let mut out = StringBuilder::new();
        loop {
            let c = self.peek().ok_or_else(|| JErrorType::from(Message::JsonUnexpectedEnd))?;
            if c == '"' as u16 {
                self.pos += 1;
                return Ok(out.build());
            }
            if c < 0x20 {
                return Err(self.unexpected());
            }
            self.pos += 1;
            if c != '\\' as u16 {
                out.push_unit(c);
                continue;
            }
            let e = self.peek().ok_or_else(|| JErrorType::from(Message::JsonUnexpectedEnd))?;
            let unit = match char::from_u32(e as u32).unwrap_or('\0') {
                '"' => '"' as u16,
                '\\' => '\\' as u16,
                '/' => '/' as u16,
                'b' => 0x08,
                'f' => 0x0C,
                'n' => 0x0A,
                'r' => 0x0D,
                't' => 0x09,
                'u' => {
                    let mut v = 0u16;
                    for k in 1..=4 {
                        let h = self.text.get(self.pos + k).copied();
                        let d = h
                            .and_then(|h| char::from_u32(h as u32))
                            .and_then(|h| h.to_digit(16));
                        match d {
                            Some(d) => v = v * 16 + d as u16,
                            None => {
                                self.pos += k;
                                return Err(self.unexpected());
                            }
                        }
                    }
                    self.pos += 4;
                    v
                }
                _ => return Err(self.unexpected()),
            };
            self.pos += 1;
            out.push_unit(unit);
        }
    }

    fn parse_array(&mut self, ctx: &mut EvalContext) -> Result<JsValue, JErrorType> {
        self.expect('[')?;
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(']' as u16) {
            self.pos += 1;
            return Ok(JsValue::object(ctx.new_array(items)?));
        }
        loop {
            items.push(self.parse_value(ctx)?);
            self.skip_whitespace();
            if self.peek() == Some(',' as u16) {
                self.pos += 1;
                continue;
            }
            self.expect(']')?;
            return Ok(JsValue::object(ctx.new_array(items)?));
        }
    }

    fn parse_object(&mut self, ctx: &mut EvalContext) -> Result<JsValue, JErrorType> {
        self.expect('{')?;
        let o = ctx.new_object()?;
        self.skip_whitespace();
        if self.peek() == Some('}' as u16) {
            self.pos += 1;
            return Ok(JsValue::object(o));
        }
        loop {
            self.skip_whitespace();
            let key = self.parse_string()?;
            self.skip_whitespace();
            self.expect(':')?;
            let value = self.parse_value(ctx)?;
            create_data_property(ctx, &o, PropertyKey::from(key), value)?;
            self.skip_whitespace();
            if self.peek() == Some(',' as u16) {
                self.pos += 1;
                continue;
            }
            self.expect('}')?;
            return Ok(JsValue::object(o));
        }
    }
}

/// Parses JSON text into a value without a reviver.
pub fn parse_text(ctx: &mut EvalContext, text: &JsString) -> Result<JsValue, JErrorType> {
    let mut parser = Parser {
        text: text.units(),
        pos: 0,
    };
    let value = parser.parse_value(ctx)?;
    parser.skip_whitespace();
    if parser.pos < text.len() {
        return Err(parser.unexpected());
    }
    Ok(value)
}

/// Walk (15.12.2): revives bottom-up, deleting properties the reviver maps
/// to undefined.
fn internalize(
    ctx: &mut EvalContext,
    reviver: &JsValue,
    holder: &JsObjectType,
    name: PropertyKey,
) -> Result<JsValue, JErrorType> {
    let val = object::get(ctx, holder, &name)?;
    if let Some(o) = val.try_object() {
        let keys: Vec<PropertyKey> = if o.borrow().is_array() {
            let len = length_of_array_like(ctx, &o)?;
            (0..len).map(PropertyKey::from_u32).collect()
        } else {
            object::own_enumerable_keys(&o)
        };
        for key in keys {
            let element = internalize(ctx, reviver, &o, key.clone())?;
            if element.is_undefined() {
                object::delete(&o, &key, false)?;
            } else {
                create_data_property(ctx, &o, key, element)?;
            }
        }
    }
    let key = JsValue::string(name.as_string());
    call_value(ctx, reviver, JsValue::object(holder.clone()), vec![key, val])
}

/// JSON.parse
fn json_parse(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let text = to_string(ctx, &arg(&args, 0))?;
    let unfiltered = parse_text(ctx, &text)?;
    let reviver = arg(&args, 1);
    if !reviver.is_callable() {
        return Ok(unfiltered);
    }
    let root = ctx.new_object()?;
    create_data_property(ctx, &root, PropertyKey::named(""), unfiltered)?;
    internalize(ctx, &reviver, &root, PropertyKey::named(""))
}

/// State of one JSON.stringify call.
pub struct Stringifier {
    replacer: Option<JsValue>,
    property_list: Option<Vec<PropertyKey>>,
    gap: JsString,
    indent: JsString,
    stack: Vec<JsObjectType>,
}

/// Quote (15.12.3)
fn quote(s: &JsString, out: &mut StringBuilder) {
    out.push_char('"');
    for &c in s.units() {
        match c {
            0x22 => out.push_str("\\\""),
            0x5C => out.push_str("\\\\"),
            0x08 => out.push_str("\\b"),
            0x0C => out.push_str("\\f"),
            0x0A => out.push_str("\\n"),
            0x0D => out.push_str("\\r"),
            0x09 => out.push_str("\\t"),
            c if c < 0x20 => out.push_str(&format!("\\u{:04x}", c)),
            c => out.push_unit(c),
        };
    }
    out.push_char('"');
}

impl Stringifier {
    /// Interprets the `replacer` and `space` arguments of JSON.stringify.
    pub fn new(ctx: &mut EvalContext, replacer: &JsValue, space: &JsValue) -> Result<Self, JErrorType> {
        let mut function = None;
        let mut property_list = None;
        if replacer.is_callable() {
            function = Some(replacer.clone());
        } else if let Some(r) = replacer.try_object().filter(|r| r.borrow().is_array()) {
            let len = length_of_array_like(ctx, &r)?;
            let mut list: Vec<PropertyKey> = Vec::new();
            for i in 0..len {
                let v = object::get(ctx, &r, &PropertyKey::from_u32(i))?;
                let item = match v.try_object() {
                    Some(o) if matches!(o.borrow().kind, ObjectKind::String(_) | ObjectKind::Number(_)) => {
                        Some(to_string(ctx, &v)?)
                    }
                    Some(_) => None,
                    None if v.is_string() || v.is_number() => Some(to_string(ctx, &v)?),
                    None => None,
                };
                if let Some(item) = item {
                    let key = PropertyKey::from(item);
                    if !list.contains(&key) {
                        list.push(key);
                    }
                }
            }
            property_list = Some(list);
        }

        let space = match space.try_object() {
            Some(o) => match o.borrow().kind {
                ObjectKind::Number(n) => JsValue::number(n),
                ObjectKind::String(ref s) => JsValue::string(s.clone()),
                _ => space.clone(),
            },
            None => space.clone(),
        };
        let gap = if space.is_number() {
            let n = to_integer(ctx, &space)?.min(10.0);
            JsString::from(" ".repeat(n.max(0.0) as usize))
        } else if let Some(s) = space.try_string() {
            s.take(10)
        } else {
            JsString::empty()
        };
        Ok(Stringifier {
            replacer: function,
            property_list,
            gap,
            indent: JsString::empty(),
            stack: Vec::new(),
        })
    }

    /// Str(key, holder); `None` stands for undefined.
    fn serialize_property(
        &mut self,
        ctx: &mut EvalContext,
        key: &PropertyKey,
        holder: &JsObjectType,
    ) -> Result<Option<JsString>, JErrorType> {
        let mut value = object::get(ctx, holder, key)?;
        if let Some(o) = value.try_object() {
            let to_json = object::get_named(ctx, &o, "toJSON")?;
            if to_json.is_callable() {
                let k = JsValue::string(key.as_string());
                value = call_value(ctx, &to_json, value.clone(), vec![k])?;
            }
        }
        if let Some(replacer) = self.replacer.clone() {
            let k = JsValue::string(key.as_string());
            value = call_value(ctx, &replacer, JsValue::object(holder.clone()), vec![k, value])?;
        }
        if let Some(o) = value.try_object() {
            let unwrapped = match o.borrow().kind {
                ObjectKind::Number(_) => Some(true),
                ObjectKind::String(_) => Some(false),
                ObjectKind::Boolean(b) => {
                    value = JsValue::boolean(b);
                    None
                }
                _ => None,
            };
            match unwrapped {
                Some(true) => value = JsValue::number(to_number(ctx, &value)?),
                Some(false) => value = JsValue::string(to_string(ctx, &value)?),
                None => {}
            }
        }
        if value.is_null() {
            return Ok(Some(JsString::intern("null")));
        }
        if value.is_boolean() {
            return Ok(Some(JsString::intern(if value.as_boolean() { "true" } else { "false" })));
        }
        if let Some(s) = value.try_string() {
            let mut out = StringBuilder::new();
            quote(&s, &mut out);
            return Ok(Some(out.build()));
        }
        if value.is_number() {
            let n = value.as_number();
            return Ok(Some(if n.is_finite() {
                JsString::from(number_to_string(n))
            } else {
                JsString::intern("null")
            }));
        }
        match value.try_object() {
            Some(o) if !o.borrow().is_callable() => {
                if o.borrow().is_array() {
                    self.serialize_array(ctx, &o).map(Some)
                } else {
                    self.serialize_object(ctx, &o).map(Some)
                }
            }
            _ => Ok(None),
        }
    }

    fn enter(&mut self, ctx: &mut EvalContext, o: &JsObjectType) -> Result<JsString, JErrorType> {
        if self.stack.iter().any(|s| Rc::ptr_eq(s, o)) {
            return Err(Message::JsonCyclic.into());
        }
        ctx.enter_call()?;
        self.stack.push(o.clone());
        let stepback = self.indent.clone();
        self.indent = self.indent.concat(&self.gap);
        Ok(stepback)
    }

    fn leave(&mut self, ctx: &mut EvalContext, stepback: JsString) {
        ctx.leave_call();
        self.stack.pop();
        self.indent = stepback;
    }

    fn wrap(&self, open: char, close: char, partial: Vec<JsString>, stepback: &JsString) -> JsString {
        let mut out = StringBuilder::new();
        out.push_char(open);
        if !partial.is_empty() {
            if self.gap.is_empty() {
                for (i, p) in partial.iter().enumerate() {
                    if i > 0 {
                        out.push_char(',');
                    }
                    out.push_js(p);
                }
            } else {
                for (i, p) in partial.iter().enumerate() {
                    out.push_str(if i > 0 { ",\n" } else { "\n" });
                    out.push_js(&self.indent);
                    out.push_js(p);
                }
                out.push_char('\n');
                out.push_js(stepback);
            }
        }
        out.push_char(close);
        out.build()
    }

    /// JO (15.12.3)
    fn serialize_object(&mut self, ctx: &mut EvalContext, o: &JsObjectType) -> Result<JsString, JErrorType> {
        let stepback = self.enter(ctx, o)?;
        let result = self
            .object_members(ctx, o)
            .map(|partial| self.wrap('{', '}', partial, &stepback));
        self.leave(ctx, stepback);
        result
    }

    fn object_members(&mut self, ctx: &mut EvalContext, o: &JsObjectType) -> Result<Vec<JsString>, JErrorType> {
        let keys = match &self.property_list {
            Some(list) => list.clone(),
            None => object::own_enumerable_keys(o),
        };
        let mut partial = Vec::new();
        for key in keys {
            if let Some(s) = self.serialize_property(ctx, &key, o)? {
                let mut member = StringBuilder::new();
                quote(&key.as_string(), &mut member);
                member.push_char(':');
                if !self.gap.is_empty() {
                    member.push_char(' ');
                }
                member.push_js(&s);
                partial.push(member.build());
            }
        }
        Ok(partial)
    }

    /// JA (15.12.3)
    fn serialize_array(&mut self, ctx: &mut EvalContext, o: &JsObjectType) -> Result<JsString, JErrorType> {
        let stepback = self.enter(ctx, o)?;
        let result = self
            .array_elements(ctx, o)
            .map(|partial| self.wrap('[', ']', partial, &stepback));
        self.leave(ctx, stepback);
        result
    }

    fn array_elements(&mut self, ctx: &mut EvalContext, o: &JsObjectType) -> Result<Vec<JsString>, JErrorType> {
        let len = length_of_array_like(ctx, o)?;
        let mut partial = Vec::with_capacity(len.min(1 << 16) as usize);
        for i in 0..len {
            let s = self.serialize_property(ctx, &PropertyKey::from_u32(i), o)?;
            partial.push(s.unwrap_or_else(|| JsString::intern("null")));
        }
        Ok(partial)
    }

    /// Serialises `value` through a wrapper object, as JSON.stringify does.
    pub fn stringify(&mut self, ctx: &mut EvalContext, value: JsValue) -> Result<Option<JsString>, JErrorType> {
        let wrapper = ctx.new_object()?;
        create_data_property(ctx, &wrapper, PropertyKey::named(""), value)?;
        self.serialize_property(ctx, &PropertyKey::named(""), &wrapper)
    }
}

/// JSON.stringify
fn json_stringify(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let mut stringifier = Stringifier::new(ctx, &arg(&args, 1), &arg(&args, 2))?;
    match stringifier.stringify(ctx, arg(&args, 0))? {
        Some(s) => Ok(JsValue::string(s)),
        None => Ok(JsValue::undefined()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::config::RuntimeConfig;
    use pretty_assertions::assert_eq;

    fn context() -> EvalContext {
        EvalContext::new(RuntimeConfig::default()).unwrap()
    }

    fn round_trip(ctx: &mut EvalContext, text: &str, space: JsValue) -> String {
        let v = parse_text(ctx, &JsString::new(text)).unwrap();
        let s = json_stringify(ctx, JsValue::undefined(), vec![v, JsValue::undefined(), space]).unwrap();
        s.as_string().to_string()
    }

    #[test]
    fn test_parse_nested() {
        let mut ctx = context();
        let v = parse_text(&mut ctx, &JsString::new(r#" {"a":[1,2,3],"b":{"c":"\u0041\n"}} "#)).unwrap();
        let a = object::get_named(&mut ctx, &v.as_object(), "a").unwrap();
        let third = object::get(&mut ctx, &a.as_object(), &PropertyKey::Index(2)).unwrap();
        assert_eq!(third.as_number(), 3.0);
    }

    #[test]
    fn test_parse_errors() {
        let mut ctx = context();
        for bad in ["", "01", "[1,]", "{'a':1}", "\"\\x\"", "1 2", "-", "1.", "tru", "\"\u{1}\""] {
            let r = parse_text(&mut ctx, &JsString::new(bad));
            assert!(matches!(r, Err(JErrorType::SyntaxError(_))), "accepted {:?}", bad);
        }
        let err = parse_text(&mut ctx, &JsString::new("[1,]")).unwrap_err();
        assert_eq!(err.message(), Some("unexpected token ']' in JSON at position 3."));
    }

    #[test]
    fn test_stringify_compact_and_indented() {
        let mut ctx = context();
        assert_eq!(round_trip(&mut ctx, r#"{"a":[1,"x",null],"b":{}}"#, JsValue::undefined()), r#"{"a":[1,"x",null],"b":{}}"#);
        assert_eq!(
            round_trip(&mut ctx, r#"{"a":[1,2]}"#, JsValue::number(2.0)),
            "{\n  \"a\": [\n    1,\n    2\n  ]\n}"
        );
    }

    #[test]
    fn test_stringify_omits_undefined_members() {
        let mut ctx = context();
        let o = ctx.new_object().unwrap();
        create_data_property(&mut ctx, &o, PropertyKey::named("a"), JsValue::undefined()).unwrap();
        create_data_property(&mut ctx, &o, PropertyKey::named("b"), JsValue::number(1.0)).unwrap();
        let s = json_stringify(&mut ctx, JsValue::undefined(), vec![JsValue::object(o)]).unwrap();
        assert_eq!(s.as_string().to_string(), r#"{"b":1}"#);
        let u = json_stringify(&mut ctx, JsValue::undefined(), vec![JsValue::undefined()]).unwrap();
        assert!(u.is_undefined());
    }

    #[test]
    fn test_stringify_cycle_is_type_error() {
        let mut ctx = context();
        let o = ctx.new_object().unwrap();
        create_data_property(&mut ctx, &o, PropertyKey::named("self"), JsValue::object(o.clone())).unwrap();
        let err = json_stringify(&mut ctx, JsValue::undefined(), vec![JsValue::object(o.clone())]).unwrap_err();
        assert_eq!(err.message(), Some("converting circular structure to JSON."));
        // break the cycle so the test does not leak
        object::delete(&o, &PropertyKey::named("self"), false).unwrap();
    }

    #[test]
    fn test_deep_nesting_is_range_error() {
        let mut ctx = context();
        let depth = 200_000;
        let deep = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
        let err = parse_text(&mut ctx, &JsString::new(&deep)).unwrap_err();
        assert!(matches!(err, JErrorType::RangeError(_)));
        assert_eq!(ctx.call_depth(), 0);

        let shallow = format!("{}{}", "[".repeat(100), "]".repeat(100));
        let v = parse_text(&mut ctx, &JsString::new(&shallow)).unwrap();
        assert!(v.is_object());

        let mut outer = ctx.new_array(Vec::new()).unwrap();
        for _ in 0..600 {
            outer = ctx.new_array(vec![JsValue::object(outer)]).unwrap();
        }
        let err = json_stringify(&mut ctx, JsValue::undefined(), vec![JsValue::object(outer)]).unwrap_err();
        assert!(matches!(err, JErrorType::RangeError(_)));
        assert_eq!(ctx.call_depth(), 0);
    }

    #[test]
    fn test_quote_escapes() {
        let mut out = StringBuilder::new();
        quote(&JsString::new("a\"\\\u{1}\t"), &mut out);
        assert_eq!(out.build().to_string(), "\"a\\\"\\\\\\u0001\\t\"");
    }
}
