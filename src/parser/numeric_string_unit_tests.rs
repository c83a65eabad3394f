use crate::parser::RuntimeParser;

fn assert_parse(input: &str, expected_output: f64) {
    let actual_output = RuntimeParser::parse_numeric_string(input);
    assert!(
        actual_output == expected_output
            && actual_output.is_sign_negative() == expected_output.is_sign_negative(),
        "For the input: \"{}\", the expected out was: \"{:?}\", but got: \"{:?}\" ",
        input,
        expected_output,
        actual_output
    )
}

fn assert_nan(input: &str) {
    assert!(
        RuntimeParser::parse_numeric_string(input).is_nan(),
        "Was expecting NaN for input \"{}\" but did not get it.",
        input
    )
}

#[test]
fn test_decimal_integer_parse1() {
    assert_parse("1234", 1234.0);
}

#[test]
fn test_decimal_integer_parse_with_white_space() {
    assert_parse("  \t42\n ", 42.0);
    assert_parse("\u{00A0}7\u{2028}", 7.0);
}

#[test]
fn test_empty_is_zero() {
    assert_parse("", 0.0);
    assert_parse("   ", 0.0);
}

#[test]
fn test_signed_values() {
    assert_parse("-12", -12.0);
    assert_parse("+12", 12.0);
    assert_parse("-0", -0.0);
}

#[test]
fn test_fractions_and_exponents() {
    assert_parse("1.5", 1.5);
    assert_parse(".5", 0.5);
    assert_parse("5.", 5.0);
    assert_parse("1e3", 1000.0);
    assert_parse("1.25E-2", 0.0125);
    assert_parse("-2.5e+1", -25.0);
}

#[test]
fn test_hex_parse() {
    assert_parse("0x1F", 31.0);
    assert_parse("0XfF", 255.0);
    assert_nan("-0x10");
    assert_nan("0x");
}

#[test]
fn test_infinity() {
    assert_parse("Infinity", f64::INFINITY);
    assert_parse("-Infinity", f64::NEG_INFINITY);
    assert_nan("infinity");
    assert_nan("inf");
}

#[test]
fn test_invalid_strings() {
    assert_nan("abc");
    assert_nan("1e");
    assert_nan("1 2");
    assert_nan(".");
    assert_nan("NaN");
    assert_nan("12px");
}

#[test]
fn test_float_prefix() {
    assert_eq!(RuntimeParser::parse_float_prefix("3.14abc"), Some(3.14));
    assert_eq!(RuntimeParser::parse_float_prefix("  -1e3x"), Some(-1000.0));
    assert_eq!(RuntimeParser::parse_float_prefix("1e"), Some(1.0));
    assert_eq!(RuntimeParser::parse_float_prefix("Infinityx"), Some(f64::INFINITY));
    assert_eq!(RuntimeParser::parse_float_prefix("0x10"), Some(0.0));
    assert_eq!(RuntimeParser::parse_float_prefix("abc"), None);
}

#[test]
fn test_iso_date_parse() {
    let d = RuntimeParser::parse_date_string("2026-10-19T12:34:56.789Z").unwrap();
    assert_eq!(d.year, 2026.0);
    assert_eq!(d.month, 9.0);
    assert_eq!(d.day, 19.0);
    assert_eq!(d.hour, 12.0);
    assert_eq!(d.minute, 34.0);
    assert_eq!(d.second, 56.0);
    assert_eq!(d.millis, 789.0);
    assert_eq!(d.offset_minutes, Some(0.0));

    let d = RuntimeParser::parse_date_string("2000-01-01T00:00+05:30").unwrap();
    assert_eq!(d.offset_minutes, Some(330.0));

    let d = RuntimeParser::parse_date_string("1999").unwrap();
    assert_eq!((d.year, d.month, d.day), (1999.0, 0.0, 1.0));

    assert!(RuntimeParser::parse_date_string("2000-13-01").is_none());
}

#[test]
fn test_legacy_date_parse() {
    let d = RuntimeParser::parse_date_string("Tue Oct 19 2026 08:05:09 GMT-0130 (XYZ)").unwrap();
    assert_eq!((d.year, d.month, d.day), (2026.0, 9.0, 19.0));
    assert_eq!((d.hour, d.minute, d.second), (8.0, 5.0, 9.0));
    assert_eq!(d.offset_minutes, Some(-90.0));

    let d = RuntimeParser::parse_date_string("Tue, 19 Oct 2026 08:05:09 GMT").unwrap();
    assert_eq!(d.offset_minutes, Some(0.0));

    let d = RuntimeParser::parse_date_string("Oct 19 2026").unwrap();
    assert_eq!(d.offset_minutes, None);

    assert!(RuntimeParser::parse_date_string("yesterday").is_none());
}
