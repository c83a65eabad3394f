//! Date built-in.
//!
//! Time values are milliseconds since the epoch, UTC, held in the object's
//! `ObjectKind::Date` slot. Calendar arithmetic follows 15.9.1; only the
//! local time zone offset and the current time come from `chrono`.

use chrono::{Local, Offset, TimeZone, Utc};

use crate::parser::{ParsedDate, RuntimeParser};
use crate::runner::ds::error::{JErrorType, Message};
use crate::runner::ds::function_object::call_value;
use crate::runner::ds::object::{self, JsObject, JsObjectType, ObjectKind};
use crate::runner::ds::operations::type_conversion::{
    f64_to_integer, to_number, to_object, to_primitive, to_string, PreferredType,
};
use crate::runner::ds::realm::WellKnownIntrinsics;
use crate::runner::ds::string::JsString;
use crate::runner::ds::value::JsValue;
use crate::runner::types::{arg, BuiltInObject, EvalContext};

const MS_PER_SECOND: f64 = 1000.0;
const MS_PER_MINUTE: f64 = 60_000.0;
const MS_PER_HOUR: f64 = 3_600_000.0;
const MS_PER_DAY: f64 = 86_400_000.0;
const MAX_TIME: f64 = 8.64e15;

const WEEK_DAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
// Day of the year each month starts on, non-leap years.
const MONTH_STARTS: [f64; 13] = [
    0.0, 31.0, 59.0, 90.0, 120.0, 151.0, 181.0, 212.0, 243.0, 273.0, 304.0, 334.0, 365.0,
];

/// Register the Date constructor and populate `Date.prototype`.
pub fn register(ctx: &mut EvalContext) -> Result<(), JErrorType> {
    BuiltInObject::new("Date")
        .with_prototype(WellKnownIntrinsics::DatePrototype)
        .with_constructor(date_call, 7)
        .with_construct(date_construct)
        .add_static_method("parse", date_parse, 1)
        .add_static_method("UTC", date_utc, 7)
        .add_static_method("now", date_now, 0)
        .add_method("toString", date_proto_to_string, 0)
        .add_method("toDateString", date_proto_to_date_string, 0)
        .add_method("toTimeString", date_proto_to_time_string, 0)
        .add_method("toLocaleString", date_proto_to_locale_string, 0)
        .add_method("toLocaleDateString", date_proto_to_locale_date_string, 0)
        .add_method("toLocaleTimeString", date_proto_to_locale_time_string, 0)
        .add_method("toUTCString", date_proto_to_utc_string, 0)
        .add_method("toISOString", date_proto_to_iso_string, 0)
        .add_method("toJSON", date_proto_to_json, 1)
        .add_method("valueOf", date_proto_value_of, 0)
        .add_method("getTime", date_proto_get_time, 0)
        .add_method("getFullYear", date_proto_get_full_year, 0)
        .add_method("getUTCFullYear", date_proto_get_utc_full_year, 0)
        .add_method("getMonth", date_proto_get_month, 0)
        .add_method("getUTCMonth", date_proto_get_utc_month, 0)
        .add_method("getDate", date_proto_get_date, 0)
        .add_method("getUTCDate", date_proto_get_utc_date, 0)
        .add_method("getDay", date_proto_get_day, 0)
        .add_method("getUTCDay", date_proto_get_utc_day, 0)
        .add_method("getHours", date_proto_get_hours, 0)
        .add_method("getUTCHours", date_proto_get_utc_hours, 0)
        .add_method("getMinutes", date_proto_get_minutes, 0)
        .add_method("getUTCMinutes", date_proto_get_utc_minutes, 0)
        .add_method("getSeconds", date_proto_get_seconds, 0)
        .add_method("getUTCSeconds", date_proto_get_utc_seconds, 0)
        .add_method("getMilliseconds", date_proto_get_milliseconds, 0)
        .add_method("getUTCMilliseconds", date_proto_get_utc_milliseconds, 0)
        .add_method("getTimezoneOffset", date_proto_get_timezone_offset, 0)
        .add_method("setTime", date_proto_set_time, 1)
        .add_method("setMilliseconds", date_proto_set_milliseconds, 1)
        .add_method("setUTCMilliseconds", date_proto_set_utc_milliseconds, 1)
        .add_method("setSeconds", date_proto_set_seconds, 2)
        .add_method("setUTCSeconds", date_proto_set_utc_seconds, 2)
        .add_method("setMinutes", date_proto_set_minutes, 3)
        .add_method("setUTCMinutes", date_proto_set_utc_minutes, 3)
        .add_method("setHours", date_proto_set_hours, 4)
        .add_method("setUTCHours", date_proto_set_utc_hours, 4)
        .add_method("setDate", date_proto_set_date, 1)
        .add_method("setUTCDate", date_proto_set_utc_date, 1)
        .add_method("setMonth", date_proto_set_month, 2)
        .add_method("setUTCMonth", date_proto_set_utc_month, 2)
        .add_method("setFullYear", date_proto_set_full_year, 3)
        .add_method("setUTCFullYear", date_proto_set_utc_full_year, 3)
        .register(ctx)?;
    Ok(())
}

// Calendar arithmetic (15.9.1).

fn day(t: f64) -> f64 {
    (t / MS_PER_DAY).floor()
}

fn time_within_day(t: f64) -> f64 {
    t.rem_euclid(MS_PER_DAY)
}

fn day_from_year(y: f64) -> f64 {
    365.0 * (y - 1970.0) + ((y - 1969.0) / 4.0).floor() - ((y - 1901.0) / 100.0).floor()
        + ((y - 1601.0) / 400.0).floor()
}

fn time_from_year(y: f64) -> f64 {
    MS_PER_DAY * day_from_year(y)
}

fn is_leap_year(y: f64) -> bool {
    (y % 4.0 == 0.0 && y % 100.0 != 0.0) || y % 400.0 == 0.0
}

pub fn year_from_time(t: f64) -> f64 {
    let mut y = (t / (MS_PER_DAY * 365.2425)).floor() + 1970.0;
    while time_from_year(y) > t {
        y -= 1.0;
    }
    while time_from_year(y + 1.0) <= t {
        y += 1.0;
    }
    y
}

fn month_start(month: usize, leap: bool) -> f64 {
    MONTH_STARTS[month] + if leap && month >= 2 { 1.0 } else { 0.0 }
}

fn day_within_year(t: f64) -> f64 {
    day(t) - day_from_year(year_from_time(t))
}

pub fn month_from_time(t: f64) -> f64 {
    let d = day_within_year(t);
    let leap = is_leap_year(year_from_time(t));
    (0..12)
        .rev()
        .find(|&m| d >= month_start(m, leap))
        .unwrap_or(0) as f64
}

pub fn date_from_time(t: f64) -> f64 {
    let leap = is_leap_year(year_from_time(t));
    day_within_year(t) - month_start(month_from_time(t) as usize, leap) + 1.0
}

fn week_day(t: f64) -> f64 {
    (day(t) + 4.0).rem_euclid(7.0)
}

fn hour_from_time(t: f64) -> f64 {
    (time_within_day(t) / MS_PER_HOUR).floor()
}

fn min_from_time(t: f64) -> f64 {
    (t / MS_PER_MINUTE).floor().rem_euclid(60.0)
}

fn sec_from_time(t: f64) -> f64 {
    (t / MS_PER_SECOND).floor().rem_euclid(60.0)
}

fn ms_from_time(t: f64) -> f64 {
    t.rem_euclid(MS_PER_SECOND)
}

/// MakeTime (15.9.1.11)
pub fn make_time(hour: f64, min: f64, sec: f64, ms: f64) -> f64 {
    if !(hour.is_finite() && min.is_finite() && sec.is_finite() && ms.is_finite()) {
        return f64::NAN;
    }
    f64_to_integer(hour) * MS_PER_HOUR
        + f64_to_integer(min) * MS_PER_MINUTE
        + f64_to_integer(sec) * MS_PER_SECOND
        + f64_to_integer(ms)
}

/// MakeDay (15.9.1.12)
pub fn make_day(year: f64, month: f64, date: f64) -> f64 {
    if !(year.is_finite() && month.is_finite() && date.is_finite()) {
        return f64::NAN;
    }
    let (y, m, dt) = (f64_to_integer(year), f64_to_integer(month), f64_to_integer(date));
    let ym = y + (m / 12.0).floor();
    if ym.abs() > 400_000.0 {
        return f64::NAN;
    }
    let mn = m.rem_euclid(12.0) as usize;
    day_from_year(ym) + month_start(mn, is_leap_year(ym)) + dt - 1.0
}

/// MakeDate (15.9.1.13)
pub fn make_date(day: f64, time: f64) -> f64 {
    if !(day.is_finite() && time.is_finite()) {
        return f64::NAN;
    }
    day * MS_PER_DAY + time
}

/// TimeClip (15.9.1.14)
pub fn time_clip(time: f64) -> f64 {
    if !time.is_finite() || time.abs() > MAX_TIME {
        return f64::NAN;
    }
    f64_to_integer(time) + 0.0
}

/// Offset of local time from UTC at the UTC instant `t`, in milliseconds,
/// daylight saving included.
fn local_offset(t: f64) -> f64 {
    if !t.is_finite() || t.abs() > MAX_TIME {
        return 0.0;
    }
    match Local.timestamp_millis_opt(t as i64).single() {
        Some(dt) => dt.offset().fix().local_minus_utc() as f64 * MS_PER_SECOND,
        None => 0.0,
    }
}

pub fn local_time(t: f64) -> f64 {
    t + local_offset(t)
}

/// UTC(t) (15.9.1.9): the inverse of [`local_time`].
pub fn utc(t: f64) -> f64 {
    t - local_offset(t - local_offset(t))
}

fn now() -> f64 {
    Utc::now().timestamp_millis() as f64
}

/// Time value of a date string, or NaN when it is not in a recognised
/// format.
pub fn parse_date(s: &str) -> f64 {
    match RuntimeParser::parse_date_string(s) {
        Some(ParsedDate {
            year,
            month,
            day,
            hour,
            minute,
            second,
            millis,
            offset_minutes,
        }) => {
            let date = make_date(make_day(year, month, day), make_time(hour, minute, second, millis));
            match offset_minutes {
                Some(offset) => time_clip(date - offset * MS_PER_MINUTE),
                None => time_clip(utc(date)),
            }
        }
        None => f64::NAN,
    }
}

// Formatting.

fn year_string(y: f64) -> String {
    if y >= 0.0 {
        format!("{:04}", y as i64)
    } else {
        format!("-{:06}", -y as i64)
    }
}

fn date_part(t: f64) -> String {
    format!(
        "{} {} {:02} {}",
        WEEK_DAYS[week_day(t) as usize],
        MONTHS[month_from_time(t) as usize],
        date_from_time(t) as i64,
        year_string(year_from_time(t)),
    )
}

fn clock_part(t: f64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        hour_from_time(t) as i64,
        min_from_time(t) as i64,
        sec_from_time(t) as i64,
    )
}

fn zone_part(tv: f64) -> String {
    let offset = (local_offset(tv) / MS_PER_MINUTE) as i64;
    let sign = if offset < 0 { '-' } else { '+' };
    format!("GMT{}{:02}{:02}", sign, offset.abs() / 60, offset.abs() % 60)
}

/// The form `Date.prototype.toString` produces, readable by [`parse_date`].
pub fn format_local(tv: f64) -> String {
    if tv.is_nan() {
        return "Invalid Date".to_string();
    }
    let t = local_time(tv);
    format!("{} {} {}", date_part(t), clock_part(t), zone_part(tv))
}

pub fn format_utc(tv: f64) -> String {
    if tv.is_nan() {
        return "Invalid Date".to_string();
    }
    format!(
        "{}, {:02} {} {} {} GMT",
        WEEK_DAYS[week_day(tv) as usize],
        date_from_time(tv) as i64,
        MONTHS[month_from_time(tv) as usize],
        year_string(year_from_time(tv)),
        clock_part(tv),
    )
}

pub fn format_iso(tv: f64) -> String {
    let y = year_from_time(tv);
    let year = if (0.0..=9999.0).contains(&y) {
        format!("{:04}", y as i64)
    } else {
        format!("{}{:06}", if y < 0.0 { '-' } else { '+' }, y.abs() as i64)
    };
    format!(
        "{}-{:02}-{:02}T{}.{:03}Z",
        year,
        month_from_time(tv) as i64 + 1,
        date_from_time(tv) as i64,
        clock_part(tv),
        ms_from_time(tv) as i64,
    )
}

// Built-in functions.

fn new_date_object(ctx: &mut EvalContext, tv: f64) -> Result<JsObjectType, JErrorType> {
    ctx.heap.allocate()?;
    let proto = ctx.intrinsic(WellKnownIntrinsics::DatePrototype);
    Ok(JsObject::new("Date", Some(proto), ObjectKind::Date(tv)).into_ref())
}

fn this_time_value(this: &JsValue, method: &'static str) -> Result<f64, JErrorType> {
    if let Some(o) = this.try_object() {
        if let ObjectKind::Date(tv) = o.borrow().kind {
            return Ok(tv);
        }
    }
    Err(Message::IncompatibleReceiver("Date", method).into())
}

fn set_time_value(this: &JsValue, tv: f64) -> JsValue {
    if let Some(o) = this.try_object() {
        o.borrow_mut().kind = ObjectKind::Date(tv);
    }
    JsValue::number(tv)
}

fn string_result(s: String) -> Result<JsValue, JErrorType> {
    Ok(JsValue::string(JsString::from(s)))
}

/// Year, month, date, hours, minutes, seconds and milliseconds from the
/// arguments of the Date constructor and Date.UTC, as a local or UTC
/// time value before clipping.
fn time_from_components(ctx: &mut EvalContext, args: &[JsValue]) -> Result<f64, JErrorType> {
    let mut fields = [f64::NAN, f64::NAN, 1.0, 0.0, 0.0, 0.0, 0.0];
    for (i, v) in args.iter().take(7).enumerate() {
        fields[i] = to_number(ctx, v)?;
    }
    let [year, month, date, hour, min, sec, ms] = fields;
    let mut year = year;
    if !year.is_nan() {
        let y = f64_to_integer(year);
        if (0.0..=99.0).contains(&y) {
            year = 1900.0 + y;
        }
    }
    Ok(make_date(make_day(year, month, date), make_time(hour, min, sec, ms)))
}

/// Date(...) called as a function
fn date_call(
    _ctx: &mut EvalContext,
    _this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    string_result(format_local(time_clip(now())))
}

/// new Date(...)
fn date_construct(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let tv = match args.len() {
        0 => time_clip(now()),
        1 => {
            let v = to_primitive(ctx, &args[0], PreferredType::Default)?;
            match v.try_string() {
                Some(s) => parse_date(s.to_utf8()),
                None => time_clip(to_number(ctx, &v)?),
            }
        }
        _ => time_clip(utc(time_from_components(ctx, &args)?)),
    };
    Ok(JsValue::object(new_date_object(ctx, tv)?))
}

/// Date.parse
fn date_parse(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = to_string(ctx, &arg(&args, 0))?;
    Ok(JsValue::number(parse_date(s.to_utf8())))
}

/// Date.UTC
fn date_utc(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::number(time_clip(time_from_components(ctx, &args)?)))
}

/// Date.now
fn date_now(
    _ctx: &mut EvalContext,
    _this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::number(time_clip(now())))
}

macro_rules! date_formatter {
    ($name:ident, $method:literal, $format:expr) => {
        #[doc = concat!("Date.prototype.", $method)]
        fn $name(
            _ctx: &mut EvalContext,
            this: JsValue,
            _args: Vec<JsValue>,
        ) -> Result<JsValue, JErrorType> {
            let tv = this_time_value(&this, $method)?;
            if tv.is_nan() {
                return string_result("Invalid Date".to_string());
            }
            let format: fn(f64) -> String = $format;
            string_result(format(tv))
        }
    };
}

date_formatter!(date_proto_to_string, "toString", format_local);
date_formatter!(date_proto_to_date_string, "toDateString", |tv| date_part(local_time(tv)));
date_formatter!(date_proto_to_time_string, "toTimeString", |tv| {
    format!("{} {}", clock_part(local_time(tv)), zone_part(tv))
});
date_formatter!(date_proto_to_locale_string, "toLocaleString", |tv| {
    let t = local_time(tv);
    format!("{} {}", date_part(t), clock_part(t))
});
date_formatter!(date_proto_to_locale_date_string, "toLocaleDateString", |tv| {
    date_part(local_time(tv))
});
date_formatter!(date_proto_to_locale_time_string, "toLocaleTimeString", |tv| {
    clock_part(local_time(tv))
});
date_formatter!(date_proto_to_utc_string, "toUTCString", format_utc);

/// Date.prototype.toISOString
fn date_proto_to_iso_string(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let tv = this_time_value(&this, "toISOString")?;
    if !tv.is_finite() {
        return Err(Message::InvalidTimeValue.into());
    }
    string_result(format_iso(tv))
}

/// Date.prototype.toJSON (15.9.5.44)
fn date_proto_to_json(
    ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let o = to_object(ctx, &this)?;
    let tv = to_primitive(ctx, &JsValue::object(o.clone()), PreferredType::Number)?;
    if tv.is_number() && !tv.as_number().is_finite() {
        return Ok(JsValue::null());
    }
    let to_iso = object::get_named(ctx, &o, "toISOString")?;
    if !to_iso.is_callable() {
        return Err(Message::NotAFunctionNamed("toISOString".to_string()).into());
    }
    call_value(ctx, &to_iso, JsValue::object(o), Vec::new())
}

/// Date.prototype.valueOf
fn date_proto_value_of(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::number(this_time_value(&this, "valueOf")?))
}

/// Date.prototype.getTime
fn date_proto_get_time(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    Ok(JsValue::number(this_time_value(&this, "getTime")?))
}

macro_rules! date_getter {
    ($name:ident, $method:literal, $local:expr, $field:expr) => {
        #[doc = concat!("Date.prototype.", $method)]
        fn $name(
            _ctx: &mut EvalContext,
            this: JsValue,
            _args: Vec<JsValue>,
        ) -> Result<JsValue, JErrorType> {
            let tv = this_time_value(&this, $method)?;
            if tv.is_nan() {
                return Ok(JsValue::number(f64::NAN));
            }
            let t = if $local { local_time(tv) } else { tv };
            let field: fn(f64) -> f64 = $field;
            Ok(JsValue::number(field(t)))
        }
    };
}

date_getter!(date_proto_get_full_year, "getFullYear", true, year_from_time);
date_getter!(date_proto_get_utc_full_year, "getUTCFullYear", false, year_from_time);
date_getter!(date_proto_get_month, "getMonth", true, month_from_time);
date_getter!(date_proto_get_utc_month, "getUTCMonth", false, month_from_time);
date_getter!(date_proto_get_date, "getDate", true, date_from_time);
date_getter!(date_proto_get_utc_date, "getUTCDate", false, date_from_time);
date_getter!(date_proto_get_day, "getDay", true, week_day);
date_getter!(date_proto_get_utc_day, "getUTCDay", false, week_day);
date_getter!(date_proto_get_hours, "getHours", true, hour_from_time);
date_getter!(date_proto_get_utc_hours, "getUTCHours", false, hour_from_time);
date_getter!(date_proto_get_minutes, "getMinutes", true, min_from_time);
date_getter!(date_proto_get_utc_minutes, "getUTCMinutes", false, min_from_time);
date_getter!(date_proto_get_seconds, "getSeconds", true, sec_from_time);
date_getter!(date_proto_get_utc_seconds, "getUTCSeconds", false, sec_from_time);
date_getter!(date_proto_get_milliseconds, "getMilliseconds", true, ms_from_time);
date_getter!(date_proto_get_utc_milliseconds, "getUTCMilliseconds", false, ms_from_time);

/// Date.prototype.getTimezoneOffset
fn date_proto_get_timezone_offset(
    _ctx: &mut EvalContext,
    this: JsValue,
    _args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let tv = this_time_value(&this, "getTimezoneOffset")?;
    if tv.is_nan() {
        return Ok(JsValue::number(f64::NAN));
    }
    Ok(JsValue::number((tv - local_time(tv)) / MS_PER_MINUTE))
}

/// Date.prototype.setTime
fn date_proto_set_time(
    ctx: &mut EvalContext,
    this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    this_time_value(&this, "setTime")?;
    let tv = time_clip(to_number(ctx, &arg(&args, 0))?);
    Ok(set_time_value(&this, tv))
}

// Field positions shared by the setters.
const YEAR: usize = 0;
const MONTH: usize = 1;
const DATE: usize = 2;
const HOUR: usize = 3;
const MINUTE: usize = 4;
const SECOND: usize = 5;
const MILLI: usize = 6;

/// Replaces up to `max` consecutive calendar fields starting at `first`
/// with the numeric arguments, then recomposes the time value
/// (15.9.5.28 to 15.9.5.41).
fn set_fields(
    ctx: &mut EvalContext,
    this: &JsValue,
    args: &[JsValue],
    method: &'static str,
    first: usize,
    max: usize,
    local: bool,
) -> Result<JsValue, JErrorType> {
    let tv = this_time_value(this, method)?;
    let count = args.len().clamp(1, max);
    let mut values = Vec::with_capacity(count);
    for i in 0..count {
        values.push(to_number(ctx, &arg(args, i))?);
    }
    let t = if tv.is_nan() {
        if first != YEAR {
            return Ok(set_time_value(this, f64::NAN));
        }
        0.0
    } else if local {
        local_time(tv)
    } else {
        tv
    };
    let mut fields = [
        year_from_time(t),
        month_from_time(t),
        date_from_time(t),
        hour_from_time(t),
        min_from_time(t),
        sec_from_time(t),
        ms_from_time(t),
    ];
    fields[first..first + count].copy_from_slice(&values);
    let date = make_date(
        make_day(fields[YEAR], fields[MONTH], fields[DATE]),
        make_time(fields[HOUR], fields[MINUTE], fields[SECOND], fields[MILLI]),
    );
    let tv = time_clip(if local { utc(date) } else { date });
    Ok(set_time_value(this, tv))
}

macro_rules! date_setter {
    ($name:ident, $method:literal, $first:expr, $max:expr, $local:expr) => {
        #[doc = concat!("Date.prototype.", $method)]
        fn $name(
            ctx: &mut EvalContext,
            this: JsValue,
            args: Vec<JsValue>,
        ) -> Result<JsValue, JErrorType> {
            set_fields(ctx, &this, &args, $method, $first, $max, $local)
        }
    };
}

date_setter!(date_proto_set_milliseconds, "setMilliseconds", MILLI, 1, true);
date_setter!(date_proto_set_utc_milliseconds, "setUTCMilliseconds", MILLI, 1, false);
date_setter!(date_proto_set_seconds, "setSeconds", SECOND, 2, true);
date_setter!(date_proto_set_utc_seconds, "setUTCSeconds", SECOND, 2, false);
date_setter!(date_proto_set_minutes, "setMinutes", MINUTE, 3, true);
date_setter!(date_proto_set_utc_minutes, "setUTCMinutes", MINUTE, 3, false);
date_setter!(date_proto_set_hours, "setHours", HOUR, 4, true);
date_setter!(date_proto_set_utc_hours, "setUTCHours", HOUR, 4, false);
date_setter!(date_proto_set_date, "setDate", DATE, 1, true);
date_setter!(date_proto_set_utc_date, "setUTCDate", DATE, 1, false);
date_setter!(date_proto_set_month, "setMonth", MONTH, 2, true);
date_setter!(date_proto_set_utc_month, "setUTCMonth", MONTH, 2, false);
date_setter!(date_proto_set_full_year, "setFullYear", YEAR, 3, true);
date_setter!(date_proto_set_utc_full_year, "setUTCFullYear", YEAR, 3, false);
