//! Array built-in.
//!
//! Implements the `Array` constructor and the ES5 `Array.prototype` methods
//! (15.4.4). Every method is generic: it reads `length` and the indexed
//! properties of whatever `this` converts to, so they also work on
//! array-likes.

use std::cmp::Ordering;

use crate::runner::ds::array_object::length_key;
use crate::runner::ds::error::{JErrorType, Message};
use crate::runner::ds::function_object::call_value;
use crate::runner::ds::object::{self, JsObjectType};
use crate::runner::ds::object_property::PropertyKey;
use crate::runner::ds::operations::number_format::number_to_string;
use crate::runner::ds::operations::object::{create_data_property, invoke, length_of_array_like};
use crate::runner::ds::operations::test_and_comparison::strict_equality_comparison;
use crate::runner::ds::operations::type_conversion::{
    to_boolean, to_integer, to_number, to_object, to_string, to_uint32,
};
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::string::JsString;
use crate::runner::ds::value::JsValue;
use crate::runner::text::builder::StringBuilder;
use crate::runner::types::{arg, BuiltInObject, EvalContext};

/// Register the Array constructor and populate `Array.prototype`.
pub fn register(ctx: &mut EvalContext) -> Result<(), JErrorType> {
    BuiltInObject::new("Array")
        .with_prototype(WellKnownIntrinsics::ArrayPrototype)
        .with_constructor(array_constructor, 1)
        .add_static_method("isArray", array_is_array, 1)
        .add_method("toString", array_proto_to_string, 0)
        .add_method("toLocaleString", array_proto_to_locale_string, 0)
        .add_method("concat", array_proto_concat, 1)
        .add_method("join", array_proto_join, 1)
        .add_method("pop", array_proto_pop, 0)
        .add_method("push", array_proto_push, 1)
        .add_method("reverse", array_proto_reverse, 0)
        .add_method("shift", array_proto_shift, 0)
        .add_method("slice", array_proto_slice, 2)
        .add_method("sort", array_proto_sort, 1)
        .add_method("splice", array_proto_splice, 2)
        .add_method("unshift", array_proto_unshift, 1)
        .add_method("indexOf", array_proto_index_of, 1)
        .add_method("lastIndexOf", array_proto_last_index_of, 1)
        .add_method("every", array_proto_every, 1)
        .add_method("some", array_proto_some, 1)
        .add_method("forEach", array_proto_for_each, 1)
        .add_method("map", array_proto_map, 1)
        .add_method("filter", array_proto_filter, 1)
        .add_method("reduce", array_proto_reduce, 1)
        .add_method("reduceRight", array_proto_reduce_right, 1)
        .register(ctx)?;
    Ok(())
}

/// Key for an index computed in floating point; values past the index
/// range become ordinary names.
fn key_at(i: f64) -> PropertyKey {
    if i >= 0.0 && i < u32::MAX as f64 {
        PropertyKey::Index(i as u32)
    } else {
        PropertyKey::from(JsString::from(number_to_string(i)))
    }
}

fn get_at(ctx: &mut EvalContext, o: &JsObjectType, i: f64) -> Result<JsValue, JErrorType> {
    object::get(ctx, o, &key_at(i))
}

fn put_at(ctx: &mut EvalContext, o: &JsObjectType, i: f64, v: JsValue) -> Result<(), JErrorType> {
    object::put(ctx, o, &key_at(i), v, true)
}

fn has_at(o: &JsObjectType, i: f64) -> bool {
    object::has_property(o, &key_at(i))
}

fn delete_at(o: &JsObjectType, i: f64) -> Result<(), JErrorType> {
    object::delete(o, &key_at(i), true)?;
    Ok(())
}

fn set_length(ctx: &mut EvalContext, o: &JsObjectType, len: f64) -> Result<(), JErrorType> {
    object::put(ctx, o, &length_key(), JsValue::number(len), true)
}

fn this_and_length(ctx: &mut EvalContext, this: &JsValue) -> Result<(JsObjectType, f64), JErrorType> {
    let o = to_object(ctx, this)?;
    let len = length_of_array_like(ctx, &o)? as f64;
    Ok((o, len))
}

/// Start index from a relative position: negative counts from the end.
fn relative_index(rel: f64, len: f64) -> f64 {
    if rel < 0.0 {
        (len + rel).max(0.0)
    } else {
        rel.min(len)
    }
}

fn callback(v: &JsValue) -> Result<JsValue, JErrorType> {
    if v.is_callable() {
        Ok(v.clone())
    } else {
        Err(Message::ParameterNotCallable.into())
    }
}

/// Array(len) and Array(item0, item1, ...)
fn array_constructor(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    if args.len() == 1 && args[0].is_number() {
        let len = args[0].as_number();
        let n = to_uint32(ctx, &args[0])?;
        if n as f64 != len {
            return Err(Message::InvalidArrayLength(number_to_string(len)).into());
        }
        let a = ctx.new_array(Vec::new())?;
        a.borrow_mut()
            .define_value(length_key(), JsValue::from(n), true, false, false);
        return Ok(JsValue::object(a));
    }
    Ok(JsValue::object(ctx.new_array(args)?))
}

/// Array.isArray
fn array_is_array(
    _ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let is_array = arg(&args, 0)
        .try_object()
        .map_or(false, |o| o.borrow().is_array());
    Ok(JsValue::from(is_array))
}

/// Array.prototype.toString
fn array_proto_to_string(
    ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = to_object(ctx, &this)?;
    let join = object::get_named(ctx, &o, "join")?;
    if join.is_callable() {
        return call_value(ctx, &join, JsValue::object(o), Vec::new());
    }
    let class = o.borrow().class;
    Ok(JsValue::string(JsString::from(format!("[object {}]", class))))
}

fn join_with(
    ctx: &mut EvalContext,
    o: &JsObjectType,
    len: f64,
    separator: &JsString,
    locale: bool,
) -> Result<JsString, JErrorType> {
    let mut out = StringBuilder::new();
    let mut i = 0.0;
    while i < len {
        if i > 0.0 {
            out.push_js(separator);
        }
        let element = get_at(ctx, o, i)?;
        if !element.is_null_or_undefined() {
            let s = if locale {
                let eo = JsValue::object(to_object(ctx, &element)?);
                let v = invoke(ctx, &eo, "toLocaleString", Vec::new())?;
                to_string(ctx, &v)?
            } else {
                to_string(ctx, &element)?
            };
            out.push_js(&s);
        }
        i += 1.0;
    }
    Ok(out.build())
}

/// Array.prototype.toLocaleString
fn array_proto_to_locale_string(
    ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let (o, len) = this_and_length(ctx, &this)?;
    let s = join_with(ctx, &o, len, &JsString::intern(","), true)?;
    Ok(JsValue::string(s))
}

/// Array.prototype.join
fn array_proto_join(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let (o, len) = this_and_length(ctx, &this)?;
    let separator = match arg(&args, 0) {
        v if v.is_undefined() => JsString::intern(","),
        v => to_string(ctx, &v)?,
    };
    let s = join_with(ctx, &o, len, &separator, false)?;
    Ok(JsValue::string(s))
}

/// Array.prototype.concat
fn array_proto_concat(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = to_object(ctx, &this)?;
    let a = ctx.new_array(Vec::new())?;
    let mut n = 0.0;
    let items = std::iter::once(JsValue::object(o)).chain(args);
    for item in items {
        match item.try_object() {
            Some(e) if e.borrow().is_array() => {
                let len = length_of_array_like(ctx, &e)? as f64;
                let mut k = 0.0;
                while k < len {
                    if has_at(&e, k) {
                        let v = get_at(ctx, &e, k)?;
                        create_data_property(ctx, &a, key_at(n), v)?;
                    }
                    n += 1.0;
                    k += 1.0;
                }
            }
            _ => {
                create_data_property(ctx, &a, key_at(n), item)?;
                n += 1.0;
            }
        }
    }
    set_length(ctx, &a, n)?;
    Ok(JsValue::object(a))
}

/// Array.prototype.pop
fn array_proto_pop(
    ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let (o, len) = this_and_length(ctx, &this)?;
    if len == 0.0 {
        set_length(ctx, &o, 0.0)?;
        return Ok(JsValue::undefined());
    }
    let index = len - 1.0;
    let element = get_at(ctx, &o, index)?;
    delete_at(&o, index)?;
    set_length(ctx, &o, index)?;
    Ok(element)
}

/// Array.prototype.push
fn array_proto_push(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let (o, mut n) = this_and_length(ctx, &this)?;
    for item in args {
        put_at(ctx, &o, n, item)?;
        n += 1.0;
    }
    set_length(ctx, &o, n)?;
    Ok(JsValue::number(n))
}

/// Array.prototype.reverse
fn array_proto_reverse(
    ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let (o, len) = this_and_length(ctx, &this)?;
    let middle = (len / 2.0).floor();
    let mut lower = 0.0;
    while lower != middle {
        let upper = len - lower - 1.0;
        let lower_value = get_at(ctx, &o, lower)?;
        let upper_value = get_at(ctx, &o, upper)?;
        match (has_at(&o, lower), has_at(&o, upper)) {
            (true, true) => {
                put_at(ctx, &o, lower, upper_value)?;
                put_at(ctx, &o, upper, lower_value)?;
            }
            (false, true) => {
                put_at(ctx, &o, lower, upper_value)?;
                delete_at(&o, upper)?;
            }
            (true, false) => {
                delete_at(&o, lower)?;
                put_at(ctx, &o, upper, lower_value)?;
            }
            (false, false) => {}
        }
        lower += 1.0;
    }
    Ok(JsValue::object(o))
}

/// Array.prototype.shift
fn array_proto_shift(
    ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let (o, len) = this_and_length(ctx, &this)?;
    if len == 0.0 {
        set_length(ctx, &o, 0.0)?;
        return Ok(JsValue::undefined());
    }
    let first = get_at(ctx, &o, 0.0)?;
    let mut k = 1.0;
    while k < len {
        if has_at(&o, k) {
            let v = get_at(ctx, &o, k)?;
            put_at(ctx, &o, k - 1.0, v)?;
        } else {
            delete_at(&o, k - 1.0)?;
        }
        k += 1.0;
    }
    delete_at(&o, len - 1.0)?;
    set_length(ctx, &o, len - 1.0)?;
    Ok(first)
}

/// Array.prototype.slice
fn array_proto_slice(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let (o, len) = this_and_length(ctx, &this)?;
    let a = ctx.new_array(Vec::new())?;
    let start = relative_index(to_integer(ctx, &arg(&args, 0))?, len);
    let end = match arg(&args, 1) {
        v if v.is_undefined() => len,
        v => relative_index(to_integer(ctx, &v)?, len),
    };
    let mut k = start;
    let mut n = 0.0;
    while k < end {
        if has_at(&o, k) {
            let v = get_at(ctx, &o, k)?;
            create_data_property(ctx, &a, key_at(n), v)?;
        }
        k += 1.0;
        n += 1.0;
    }
    set_length(ctx, &a, n)?;
    Ok(JsValue::object(a))
}

/// SortCompare (15.4.4.11) over two present values: undefined sorts last,
/// then the comparator or string order decides.
fn sort_compare(
    ctx: &mut EvalContext,
    comparefn: &JsValue,
    x: &JsValue,
    y: &JsValue,
) -> Result<Ordering, JErrorType> {
    match (x.is_undefined(), y.is_undefined()) {
        (true, true) => return Ok(Ordering::Equal),
        (true, false) => return Ok(Ordering::Greater),
        (false, true) => return Ok(Ordering::Less),
        _ => {}
    }
    if !comparefn.is_undefined() {
        let v = call_value(ctx, comparefn, JsValue::undefined(), vec![x.clone(), y.clone()])?;
        let n = to_number(ctx, &v)?;
        return Ok(if n < 0.0 {
            Ordering::Less
        } else if n > 0.0 {
            Ordering::Greater
        } else {
            Ordering::Equal
        });
    }
    let xs = to_string(ctx, x)?;
    let ys = to_string(ctx, y)?;
    Ok(xs.compare(&ys))
}

fn sift_down(
    ctx: &mut EvalContext,
    comparefn: &JsValue,
    items: &mut [JsValue],
    mut root: usize,
    end: usize,
) -> Result<(), JErrorType> {
    loop {
        let mut child = 2 * root + 1;
        if child >= end {
            return Ok(());
        }
        if child + 1 < end
            && sort_compare(ctx, comparefn, &items[child], &items[child + 1])? == Ordering::Less
        {
            child += 1;
        }
        if sort_compare(ctx, comparefn, &items[root], &items[child])? != Ordering::Less {
            return Ok(());
        }
        items.swap(root, child);
        root = child;
    }
}

/// In-place heap sort; an inconsistent comparator yields some permutation.
fn heap_sort(
    ctx: &mut EvalContext,
    comparefn: &JsValue,
    items: &mut [JsValue],
) -> Result<(), JErrorType> {
    let n = items.len();
    for start in (0..n / 2).rev() {
        sift_down(ctx, comparefn, items, start, n)?;
    }
    for end in (1..n).rev() {
        items.swap(0, end);
        sift_down(ctx, comparefn, items, 0, end)?;
    }
    Ok(())
}

/// Array.prototype.sort
fn array_proto_sort(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let (o, len) = this_and_length(ctx, &this)?;
    let comparefn = arg(&args, 0);
    if !comparefn.is_undefined() && !comparefn.is_callable() {
        return Err(Message::ParameterNotCallable.into());
    }
    let mut items = Vec::new();
    let mut k = 0.0;
    while k < len {
        if has_at(&o, k) {
            items.push(get_at(ctx, &o, k)?);
        }
        k += 1.0;
    }
    heap_sort(ctx, &comparefn, &mut items)?;
    let present = items.len() as f64;
    for (i, v) in items.into_iter().enumerate() {
        put_at(ctx, &o, i as f64, v)?;
    }
    let mut k = present;
    while k < len {
        delete_at(&o, k)?;
        k += 1.0;
    }
    Ok(JsValue::object(o))
}

/// Array.prototype.splice
fn array_proto_splice(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let (o, len) = this_and_length(ctx, &this)?;
    let a = ctx.new_array(Vec::new())?;
    let start = relative_index(to_integer(ctx, &arg(&args, 0))?, len);
    let delete_count = if args.is_empty() {
        0.0
    } else if args.len() == 1 {
        len - start
    } else {
        to_integer(ctx, &args[1])?.max(0.0).min(len - start)
    };
    let mut k = 0.0;
    while k < delete_count {
        if has_at(&o, start + k) {
            let v = get_at(ctx, &o, start + k)?;
            create_data_property(ctx, &a, key_at(k), v)?;
        }
        k += 1.0;
    }
    set_length(ctx, &a, delete_count)?;

    let items: Vec<JsValue> = args.into_iter().skip(2).collect();
    let item_count = items.len() as f64;
    if item_count < delete_count {
        let mut k = start;
        while k < len - delete_count {
            let from = k + delete_count;
            let to = k + item_count;
            if has_at(&o, from) {
                let v = get_at(ctx, &o, from)?;
                put_at(ctx, &o, to, v)?;
            } else {
                delete_at(&o, to)?;
            }
            k += 1.0;
        }
        let mut k = len;
        while k > len - delete_count + item_count {
            delete_at(&o, k - 1.0)?;
            k -= 1.0;
        }
    } else if item_count > delete_count {
        let mut k = len - delete_count;
        while k > start {
            let from = k + delete_count - 1.0;
            let to = k + item_count - 1.0;
            if has_at(&o, from) {
                let v = get_at(ctx, &o, from)?;
                put_at(ctx, &o, to, v)?;
            } else {
                delete_at(&o, to)?;
            }
            k -= 1.0;
        }
    }
    for (i, item) in items.into_iter().enumerate() {
        put_at(ctx, &o, start + i as f64, item)?;
    }
    set_length(ctx, &o, len - delete_count + item_count)?;
    Ok(JsValue::object(a))
}

/// Array.prototype.unshift
fn array_proto_unshift(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let (o, len) = this_and_length(ctx, &this)?;
    let count = args.len() as f64;
    let mut k = len;
    while k > 0.0 {
        let from = k - 1.0;
        let to = k + count - 1.0;
        if has_at(&o, from) {
            let v = get_at(ctx, &o, from)?;
            put_at(ctx, &o, to, v)?;
        } else {
            delete_at(&o, to)?;
        }
        k -= 1.0;
    }
    for (j, item) in args.into_iter().enumerate() {
        put_at(ctx, &o, j as f64, item)?;
    }
    set_length(ctx, &o, len + count)?;
    Ok(JsValue::number(len + count))
}

/// Array.prototype.indexOf
fn array_proto_index_of(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let (o, len) = this_and_length(ctx, &this)?;
    if len == 0.0 {
        return Ok(JsValue::number(-1.0));
    }
    let n = if args.len() > 1 {
        to_integer(ctx, &args[1])?
    } else {
        0.0
    };
    if n >= len {
        return Ok(JsValue::number(-1.0));
    }
    let target = arg(&args, 0);
    let mut k = if n >= 0.0 { n } else { (len + n).max(0.0) };
    while k < len {
        if has_at(&o, k) {
            let element = get_at(ctx, &o, k)?;
            if strict_equality_comparison(&target, &element) {
                return Ok(JsValue::number(k));
            }
        }
        k += 1.0;
    }
    Ok(JsValue::number(-1.0))
}

/// Array.prototype.lastIndexOf
fn array_proto_last_index_of(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let (o, len) = this_and_length(ctx, &this)?;
    if len == 0.0 {
        return Ok(JsValue::number(-1.0));
    }
    let n = if args.len() > 1 {
        to_integer(ctx, &args[1])?
    } else {
        len - 1.0
    };
    let target = arg(&args, 0);
    let mut k = if n >= 0.0 { n.min(len - 1.0) } else { len + n };
    while k >= 0.0 {
        if has_at(&o, k) {
            let element = get_at(ctx, &o, k)?;
            if strict_equality_comparison(&target, &element) {
                return Ok(JsValue::number(k));
            }
        }
        k -= 1.0;
    }
    Ok(JsValue::number(-1.0))
}

/// Shared loop of the iteration methods: calls `f(value, index, object)`
/// for each present index and hands the result to `visit`, which returns
/// false to stop early.
fn for_each_present(
    ctx: &mut EvalContext,
    this: &JsValue,
    args: &[JsValue],
    mut visit: impl FnMut(&mut EvalContext, f64, JsValue, JsValue) -> Result<bool, JErrorType>,
) -> Result<(), JErrorType> {
    let (o, len) = this_and_length(ctx, this)?;
    let f = callback(&arg(args, 0))?;
    let this_arg = arg(args, 1);
    let mut k = 0.0;
    while k < len {
        if has_at(&o, k) {
            let value = get_at(ctx, &o, k)?;
            let result = call_value(
                ctx,
                &f,
                this_arg.clone(),
                vec![value.clone(), JsValue::number(k), JsValue::object(o.clone())],
            )?;
            if !visit(ctx, k, value, result)? {
                break;
            }
        }
        k += 1.0;
    }
    Ok(())
}

/// Array.prototype.every
fn array_proto_every(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let mut all = true;
    for_each_present(ctx, &this, &args, |_, _, _, result| {
        all = to_boolean(&result);
        Ok(all)
    })?;
    Ok(JsValue::from(all))
}

/// Array.prototype.some
fn array_proto_some(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let mut any = false;
    for_each_present(ctx, &this, &args, |_, _, _, result| {
        any = to_boolean(&result);
        Ok(!any)
    })?;
    Ok(JsValue::from(any))
}

/// Array.prototype.forEach
fn array_proto_for_each(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    for_each_present(ctx, &this, &args, |_, _, _, _| Ok(true))?;
    Ok(JsValue::undefined())
}

/// Array.prototype.map
fn array_proto_map(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = to_object(ctx, &this)?;
    let len = length_of_array_like(ctx, &o)?;
    let a = ctx.new_array(Vec::new())?;
    a.borrow_mut()
        .define_value(length_key(), JsValue::from(len), true, false, false);
    let target = a.clone();
    for_each_present(ctx, &JsValue::object(o), &args, |ctx, k, _, result| {
        create_data_property(ctx, &target, key_at(k), result)?;
        Ok(true)
    })?;
    Ok(JsValue::object(a))
}

/// Array.prototype.filter
fn array_proto_filter(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let a = ctx.new_array(Vec::new())?;
    let target = a.clone();
    let mut to = 0.0;
    for_each_present(ctx, &this, &args, |ctx, _, value, result| {
        if to_boolean(&result) {
            create_data_property(ctx, &target, key_at(to), value)?;
            to += 1.0;
        }
        Ok(true)
    })?;
    Ok(JsValue::object(a))
}

fn reduce_impl(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
    from_right: bool,
) -> Result<JsValue, JErrorType> {
    let (o, len) = this_and_length(ctx, &this)?;
    let f = callback(&arg(&args, 0))?;
    let step = if from_right { -1.0 } else { 1.0 };
    let mut k = if from_right { len - 1.0 } else { 0.0 };
    let in_range = |k: f64| k >= 0.0 && k < len;
    let mut accumulator = if args.len() > 1 {
        args[1].clone()
    } else {
        loop {
            if !in_range(k) {
                return Err(Message::ReduceEmpty.into());
            }
            let present = has_at(&o, k);
            let current = k;
            k += step;
            if present {
                break get_at(ctx, &o, current)?;
            }
        }
    };
    while in_range(k) {
        if has_at(&o, k) {
            let value = get_at(ctx, &o, k)?;
            accumulator = call_value(
                ctx,
                &f,
                JsValue::undefined(),
                vec![accumulator, value, JsValue::number(k), JsValue::object(o.clone())],
            )?;
        }
        k += step;
    }
    Ok(accumulator)
}

/// Array.prototype.reduce
fn array_proto_reduce(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    reduce_impl(ctx, this, args, false)
}

/// Array.prototype.reduceRight
fn array_proto_reduce_right(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    reduce_impl(ctx, this, args, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::config::RuntimeConfig;
    use pretty_assertions::assert_eq;

    fn context() -> EvalContext {
        EvalContext::new(RuntimeConfig::default()).unwrap()
    }

    fn numbers(ctx: &mut EvalContext, v: &JsValue) -> Vec<f64> {
        let o = v.as_object();
        let len = length_of_array_like(ctx, &o).unwrap();
        (0..len)
            .map(|i| get_at(ctx, &o, i as f64).unwrap().as_number())
            .collect()
    }

    fn array_of(ctx: &mut EvalContext, items: &[f64]) -> JsValue {
        let items = items.iter().map(|&n| JsValue::number(n)).collect();
        JsValue::object(ctx.new_array(items).unwrap())
    }

    #[test]
    fn test_heap_sort_orders_numbers_as_strings() {
        let mut ctx = context();
        let a = array_of(&mut ctx, &[10.0, 9.0, 1.0]);
        array_proto_sort(&mut ctx, a.clone(), vec![]).unwrap();
        assert_eq!(numbers(&mut ctx, &a), vec![1.0, 10.0, 9.0]);
    }

    #[test]
    fn test_sort_moves_holes_to_the_end() {
        let mut ctx = context();
        let a = array_of(&mut ctx, &[3.0, 1.0]);
        let o = a.as_object();
        set_length(&mut ctx, &o, 4.0).unwrap();
        put_at(&mut ctx, &o, 3.0, JsValue::number(2.0)).unwrap();
        array_proto_sort(&mut ctx, a.clone(), vec![]).unwrap();
        assert!(has_at(&o, 2.0));
        assert!(!has_at(&o, 3.0));
        assert_eq!(get_at(&mut ctx, &o, 2.0).unwrap().as_number(), 3.0);
    }

    #[test]
    fn test_splice_removes_and_inserts() {
        let mut ctx = context();
        let a = array_of(&mut ctx, &[1.0, 2.0, 3.0, 4.0]);
        let removed = array_proto_splice(
            &mut ctx,
            a.clone(),
            vec![JsValue::number(1.0), JsValue::number(2.0), JsValue::number(9.0)],
        )
        .unwrap();
        assert_eq!(numbers(&mut ctx, &removed), vec![2.0, 3.0]);
        assert_eq!(numbers(&mut ctx, &a), vec![1.0, 9.0, 4.0]);
    }

    #[test]
    fn test_unshift_and_shift() {
        let mut ctx = context();
        let a = array_of(&mut ctx, &[2.0]);
        let len = array_proto_unshift(&mut ctx, a.clone(), vec![JsValue::number(1.0)]).unwrap();
        assert_eq!(len.as_number(), 2.0);
        let first = array_proto_shift(&mut ctx, a.clone(), vec![]).unwrap();
        assert_eq!(first.as_number(), 1.0);
        assert_eq!(numbers(&mut ctx, &a), vec![2.0]);
    }

    #[test]
    fn test_reduce_empty_without_initial_value() {
        let mut ctx = context();
        let a = array_of(&mut ctx, &[]);
        let f = JsValue::object(ctx.intrinsic(WellKnownIntrinsics::FunctionPrototype));
        let err = array_proto_reduce(&mut ctx, a, vec![f]).unwrap_err();
        assert_eq!(err.message(), Some("cannot reduce without an accumulator or initial value."));
    }

    #[test]
    fn test_to_locale_string_skips_null_and_undefined() {
        let mut ctx = context();
        let a = JsValue::object(
            ctx.new_array(vec![
                JsValue::number(1.0),
                JsValue::null(),
                JsValue::boolean(true),
                JsValue::undefined(),
                JsValue::str("x"),
            ])
            .unwrap(),
        );
        let s = array_proto_to_locale_string(&mut ctx, a, vec![]).unwrap();
        assert_eq!(s.as_string().to_string(), "1,,true,,x");
    }

    #[test]
    fn test_last_index_of_negative_start() {
        let mut ctx = context();
        let a = array_of(&mut ctx, &[1.0, 2.0, 1.0]);
        let i = array_proto_last_index_of(
            &mut ctx,
            a,
            vec![JsValue::number(1.0), JsValue::number(-2.0)],
        )
        .unwrap();
        assert_eq!(i.as_number(), 0.0);
    }
}
