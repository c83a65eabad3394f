//! Property-based checks of the runtime's universal invariants.

extern crate esrt;


use esrt::runner::api::{
    esa_frm_arg, esa_frm_set_result, esa_frm_this, esa_prp_def_accessor, esa_prp_get,
    esa_prp_get_slow, esa_prp_put, esa_prp_put_slow, esa_str_intern,
};
use esrt::runner::ds::frame::StackPtr;
use esrt::runner::ds::object::{define_own_property, get_own_property};
use esrt::runner::ds::object_property::{PropertyDescriptorSetter, PropertyKey};
use esrt::runner::ds::operations::number_format::number_to_string;
use esrt::runner::ds::operations::type_conversion::to_number;
use esrt::runner::ds::string::JsString;
use esrt::runner::ds::value::JsValue;
use esrt::runner::std_lib::uri;
use esrt::runner::types::EvalContext;
use proptest::prelude::*;
use runtime_util::*;

#[derive(Debug, Clone)]
enum Json {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    Arr(Vec<Json>),
    Obj(Vec<(String, Json)>),
}

fn json_strategy() -> impl Strategy<Value = Json> {
    let leaf = prop_oneof![
        Just(Json::Null),
        any::<bool>().prop_map(Json::Bool),
        any::<f64>().prop_filter("finite", |n| n.is_finite()).prop_map(Json::Num),
        any::<String>().prop_map(Json::Str),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Json::Arr),
            prop::collection::vec(("[a-z_]{1,3}", inner), 0..4).prop_map(Json::Obj),
        ]
    })
}

#[derive(Debug, Clone)]
enum Scalar {
    Undefined,
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
}

fn scalar_strategy() -> impl Strategy<Value = Scalar> {
    prop_oneof![
        Just(Scalar::Undefined),
        Just(Scalar::Null),
        any::<bool>().prop_map(Scalar::Bool),
        any::<f64>().prop_map(Scalar::Num),
        any::<String>().prop_map(Scalar::Str),
    ]
}

fn scalar(v: &Scalar) -> JsValue {
    match v {
        Scalar::Undefined => JsValue::undefined(),
        Scalar::Null => JsValue::null(),
        Scalar::Bool(b) => JsValue::boolean(*b),
        Scalar::Num(n) => JsValue::number(*n),
        Scalar::Str(s) => JsValue::str(s),
    }
}

/// Same value for Put/Get purposes: strings by content, the rest by bits.
fn same_value(a: &JsValue, b: &JsValue) -> bool {
    match (a.try_string(), b.try_string()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

const SLOT: &str = "__slot";

/// get p() { return this.__slot; }
fn slot_getter(ctx: &mut EvalContext, _argc: u32, fp: StackPtr, vp: StackPtr) -> bool {
    let this = esa_frm_this(ctx, fp, vp);
    let mut v = JsValue::undefined();
    if !esa_prp_get(ctx, &this, esa_str_intern(SLOT), &mut v) {
        return false;
    }
    esa_frm_set_result(ctx, fp, vp, v);
    true
}

/// set p(v) { this.__slot = v; }
fn slot_setter(ctx: &mut EvalContext, argc: u32, fp: StackPtr, vp: StackPtr) -> bool {
    let this = esa_frm_this(ctx, fp, vp);
    let v = esa_frm_arg(ctx, argc, fp, 0);
    esa_prp_put(ctx, &this, esa_str_intern(SLOT), v)
}

fn build(ctx: &mut EvalContext, v: &Json) -> JsValue {
    match v {
        Json::Null => JsValue::null(),
        Json::Bool(b) => JsValue::boolean(*b),
        Json::Num(n) => JsValue::number(*n),
        Json::Str(s) => JsValue::str(s),
        Json::Arr(items) => {
            let items: Vec<JsValue> = items.iter().map(|i| build(ctx, i)).collect();
            new_array(ctx, &items)
        }
        Json::Obj(members) => {
            let o = new_object(ctx);
            for (k, m) in members {
                let m = build(ctx, m);
                put(ctx, &o, k, m);
            }
            o
        }
    }
}

fn stringify(ctx: &mut EvalContext, v: JsValue) -> String {
    let json = global(ctx, "JSON");
    let s = call_method(ctx, &json, "stringify", &[v]).unwrap();
    text(ctx, &s)
}

fn parse(ctx: &mut EvalContext, s: &str) -> JsValue {
    let json = global(ctx, "JSON");
    call_method(ctx, &json, "parse", &[JsValue::str(s)]).unwrap()
}

// ============================================================================
// Values and strings
// ============================================================================

proptest! {
    #[test]
    fn number_values_round_trip(n in any::<f64>()) {
        let back = JsValue::number(JsValue::number(n).as_number()).as_number();
        if n.is_nan() {
            prop_assert!(back.is_nan());
        } else {
            prop_assert_eq!(back.to_bits(), n.to_bits());
        }
    }

    #[test]
    fn boolean_and_string_values_round_trip(b in any::<bool>(), s in any::<String>()) {
        prop_assert_eq!(JsValue::boolean(b).as_boolean(), b);
        let v = JsValue::str(&s);
        prop_assert!(v.is_string());
        let u = v.as_string();
        prop_assert_eq!(u.to_utf8(), s.as_str());
    }

    #[test]
    fn utf8_transcoding_round_trips(s in any::<String>()) {
        let js = JsString::from_utf8(s.as_bytes()).unwrap();
        let expected: Vec<u16> = s.encode_utf16().collect();
        prop_assert_eq!(js.units(), expected.as_slice());
        prop_assert_eq!(js.to_utf8(), s.as_str());
    }
}

// ============================================================================
// Conversions, JSON and URI
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn canonical_number_strings_are_fixed_points(n in any::<f64>()) {
        let mut ctx = context();
        let canonical = number_to_string(n);
        let parsed = to_number(&mut ctx, &JsValue::str(&canonical)).unwrap();
        prop_assert_eq!(number_to_string(parsed), canonical);
    }

    #[test]
    fn json_parse_inverts_stringify(v in json_strategy()) {
        let mut ctx = context();
        let value = build(&mut ctx, &v);
        let first = stringify(&mut ctx, value);
        let reparsed = parse(&mut ctx, &first);
        let second = stringify(&mut ctx, reparsed);
        prop_assert_eq!(first, second);
    }
}

proptest! {
    #[test]
    fn uri_component_coding_round_trips(s in any::<String>()) {
        let original = JsString::from(s.clone());
        let encoded = uri::encode_uri_component(&original).unwrap();
        prop_assert!(encoded.units().iter().all(|&u| u < 0x80));
        let decoded = uri::decode_uri_component(&encoded).unwrap();
        prop_assert_eq!(decoded.to_utf8(), s.as_str());
        let again = uri::encode_uri_component(&decoded).unwrap();
        prop_assert_eq!(again.to_utf8(), encoded.to_utf8());
    }

    #[test]
    fn uri_coding_round_trips(s in any::<String>()) {
        let original = JsString::from(s.clone());
        let encoded = uri::encode_uri(&original).unwrap();
        let decoded = uri::decode_uri(&encoded).unwrap();
        prop_assert_eq!(decoded.to_utf8(), s.as_str());
        let again = uri::encode_uri(&decoded).unwrap();
        prop_assert_eq!(again.to_utf8(), encoded.to_utf8());
    }
}

// ============================================================================
// Object model
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn sort_permutes_present_elements(items in prop::collection::vec(prop::option::of(-50i32..50), 0..24)) {
        let mut ctx = context();
        let values: Vec<JsValue> = items
            .iter()
            .map(|i| i.map_or(JsValue::nothing(), |n| JsValue::number(n as f64)))
            .collect();
        let a = new_array(&mut ctx, &values);
        call_method(&mut ctx, &a, "sort", &[]).unwrap();

        let mut expected: Vec<i32> = items.iter().flatten().copied().collect();
        let present = expected.len();
        prop_assert_eq!(get(&mut ctx, &a, "length").as_number(), items.len() as f64);
        let mut actual = Vec::new();
        for i in 0..items.len() {
            let key = JsValue::number(i as f64);
            let has = call_method(&mut ctx, &a, "hasOwnProperty", &[key]).unwrap();
            prop_assert_eq!(has.as_boolean(), i < present);
            if i < present {
                actual.push(get(&mut ctx, &a, &i.to_string()).as_number() as i32);
            }
        }
        let mut strings: Vec<String> = expected.iter().map(|n| n.to_string()).collect();
        strings.sort();
        let actual_strings: Vec<String> = actual.iter().map(|n| n.to_string()).collect();
        prop_assert_eq!(actual_strings, strings);
        expected.sort_unstable();
        actual.sort_unstable();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn get_returns_what_put_stored(
        name in "[a-z]{1,4}",
        index in 0u32..2000,
        use_index in any::<bool>(),
        on_array in any::<bool>(),
        first in scalar_strategy(),
        second in scalar_strategy(),
    ) {
        let mut ctx = context();
        let o = if on_array { new_array(&mut ctx, &[]) } else { new_object(&mut ctx) };
        let key = if use_index { JsValue::number(index as f64) } else { JsValue::str(&name) };
        for v in [&first, &second] {
            let v = scalar(v);
            prop_assert!(esa_prp_put_slow(&mut ctx, &o, &key, v.clone()));
            let mut back = JsValue::nothing();
            prop_assert!(esa_prp_get_slow(&mut ctx, &o, &key, &mut back));
            prop_assert!(same_value(&back, &v), "{:?} read back as {:?}", v, back);
        }
    }

    #[test]
    fn get_through_accessor_returns_what_setter_stored(
        values in prop::collection::vec(scalar_strategy(), 1..4),
        on_prototype in any::<bool>(),
    ) {
        let mut ctx = context();
        let holder = new_object(&mut ctx);
        let getter = function(&mut ctx, slot_getter, 0);
        let setter = function(&mut ctx, slot_setter, 1);
        let p = esa_str_intern("p");
        prop_assert!(esa_prp_def_accessor(&mut ctx, &holder, p, getter, false));
        prop_assert!(esa_prp_def_accessor(&mut ctx, &holder, p, setter, true));
        let target = if on_prototype {
            let object_ctor = global(&mut ctx, "Object");
            call_method(&mut ctx, &object_ctor, "create", &[holder.clone()]).unwrap()
        } else {
            holder.clone()
        };
        for v in &values {
            let v = scalar(v);
            prop_assert!(esa_prp_put(&mut ctx, &target, p, v.clone()));
            let mut back = JsValue::nothing();
            prop_assert!(esa_prp_get(&mut ctx, &target, p, &mut back));
            prop_assert!(same_value(&back, &v), "{:?} read back as {:?}", v, back);
        }
        let own = get_own_property(&target.as_object(), &PropertyKey::named("p"));
        prop_assert_eq!(own.is_some(), !on_prototype);
    }

    #[test]
    fn rejected_redefinition_leaves_property_unchanged(
        value in -5i32..5,
        writable in any::<bool>(),
        enumerable in any::<bool>(),
        new_value in prop::option::of(-5i32..5),
        new_writable in prop::option::of(any::<bool>()),
        new_enumerable in prop::option::of(any::<bool>()),
        new_configurable in prop::option::of(any::<bool>()),
        as_accessor in any::<bool>(),
    ) {
        let mut ctx = context();
        let o = ctx.new_object().unwrap();
        let key = PropertyKey::named("p");
        let initial = PropertyDescriptorSetter::new_data(
            JsValue::number(value as f64),
            writable,
            enumerable,
            false,
        );
        prop_assert!(define_own_property(&mut ctx, &o, &key, initial, false).unwrap());
        let before = format!("{:?}", get_own_property(&o, &key));

        let mut update = PropertyDescriptorSetter::new();
        if as_accessor {
            update = update.with_get(JsValue::undefined());
        } else {
            if let Some(v) = new_value {
                update = update.with_value(JsValue::number(v as f64));
            }
            if let Some(w) = new_writable {
                update = update.with_writable(w);
            }
        }
        if let Some(e) = new_enumerable {
            update = update.with_enumerable(e);
        }
        if let Some(c) = new_configurable {
            update = update.with_configurable(c);
        }
        let accepted = define_own_property(&mut ctx, &o, &key, update, false).unwrap();
        let after = get_own_property(&o, &key).unwrap();
        if !accepted {
            prop_assert_eq!(format!("{:?}", Some(after.clone())), before);
        }
        prop_assert!(!after.is_configurable());
        if !writable {
            prop_assert!(!after.is_writable());
        }
    }
}
