use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::runner::text::unicode::is_trimmable;

#[derive(Parser)]
#[grammar = "parser/runtime_grammar.pest"] // relative to src
pub struct RuntimeParser;

/// Broken-down result of `RuntimeParser::parse_date_string`. Month is
/// zero-based. `offset_minutes` is `None` when the string names no zone and
/// the value is to be read as local time.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDate {
    pub year: f64,
    pub month: f64,
    pub day: f64,
    pub hour: f64,
    pub minute: f64,
    pub second: f64,
    pub millis: f64,
    pub offset_minutes: Option<f64>,
}

impl Default for ParsedDate {
    fn default() -> Self {
        ParsedDate {
            year: 1970.0,
            month: 0.0,
            day: 1.0,
            hour: 0.0,
            minute: 0.0,
            second: 0.0,
            millis: 0.0,
            offset_minutes: Some(0.0),
        }
    }
}

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn is_str_white_space(c: char) -> bool {
    (c as u32) <= 0xFFFF && is_trimmable(c as u32 as u16)
}

fn number_of(pair: &Pair<Rule>) -> f64 {
    pair.as_str().parse::<f64>().unwrap_or(f64::NAN)
}

impl RuntimeParser {
    /// ToNumber applied to a string. Returns NaN when the text is not a
    /// StringNumericLiteral.
    pub fn parse_numeric_string(s: &str) -> f64 {
        let trimmed = s.trim_matches(is_str_white_space);
        if trimmed.is_empty() {
            return 0.0;
        }
        let pairs = match RuntimeParser::parse(Rule::string_numeric_literal, trimmed) {
            Ok(pairs) => pairs,
            Err(_) => return f64::NAN,
        };
        for pair in pairs.flatten() {
            match pair.as_rule() {
                Rule::hex_integer_literal => return hex_value(&pair.as_str()[2..]),
                Rule::str_decimal_literal => return decimal_value(pair.as_str()),
                _ => {}
            }
        }
        f64::NAN
    }

    /// Value of the longest StrDecimalLiteral prefix after leading white
    /// space, or `None` if there is none.
    pub fn parse_float_prefix(s: &str) -> Option<f64> {
        let trimmed = s.trim_start_matches(is_str_white_space);
        let pairs = RuntimeParser::parse(Rule::str_decimal_prefix, trimmed).ok()?;
        pairs
            .flatten()
            .find(|p| p.as_rule() == Rule::str_decimal_literal)
            .map(|p| decimal_value(p.as_str()))
    }

    pub fn parse_date_string(s: &str) -> Option<ParsedDate> {
        let pairs = RuntimeParser::parse(Rule::date_time_string, s.trim()).ok()?;
        let mut date = ParsedDate::default();
        let mut legacy = false;
        let mut offset_sign = 1.0;
        let mut has_time = false;
        for pair in pairs.flatten() {
            match pair.as_rule() {
                Rule::legacy_date_time => {
                    legacy = true;
                    date.offset_minutes = None;
                }
                Rule::iso_time => {
                    has_time = true;
                }
                Rule::iso_year | Rule::year_number => date.year = number_of(&pair),
                Rule::iso_month => date.month = number_of(&pair) - 1.0,
                Rule::iso_day | Rule::day_number => date.day = number_of(&pair),
                Rule::iso_hour | Rule::clock_hour => date.hour = number_of(&pair),
                Rule::iso_minute | Rule::clock_minute => date.minute = number_of(&pair),
                Rule::iso_second | Rule::clock_second => date.second = number_of(&pair),
                Rule::iso_millis => {
                    let digits: String = pair.as_str().chars().chain("00".chars()).take(3).collect();
                    date.millis = digits.parse::<f64>().unwrap_or(0.0);
                }
                Rule::month_name => {
                    let idx = MONTH_NAMES.iter().position(|m| *m == pair.as_str())?;
                    date.month = idx as f64;
                }
                Rule::utc_designator | Rule::gmt_offset => date.offset_minutes = Some(0.0),
                Rule::offset_sign => {
                    offset_sign = if pair.as_str() == "-" { -1.0 } else { 1.0 };
                }
                Rule::offset_hour => {
                    date.offset_minutes = Some(offset_sign * number_of(&pair) * 60.0);
                }
                Rule::offset_minute => {
                    let hours = date.offset_minutes.unwrap_or(0.0);
                    date.offset_minutes = Some(hours + offset_sign * number_of(&pair));
                }
                Rule::offset_hhmm => {
                    let v = number_of(&pair);
                    let minutes = (v / 100.0).trunc() * 60.0 + v % 100.0;
                    date.offset_minutes = Some(offset_sign * minutes);
                }
                _ => {}
            }
        }
        if !legacy && has_time && date.offset_minutes.is_none() {
            date.offset_minutes = Some(0.0);
        }
        if date.month < 0.0
            || date.month > 11.0
            || date.day < 1.0
            || date.day > 31.0
            || date.hour > 24.0
            || date.minute > 59.0
            || date.second > 59.0
            || (date.hour == 24.0 && (date.minute > 0.0 || date.second > 0.0 || date.millis > 0.0))
        {
            return None;
        }
        Some(date)
    }
}

fn hex_value(digits: &str) -> f64 {
    if digits.len() <= 32 {
        if let Ok(v) = u128::from_str_radix(digits, 16) {
            return v as f64;
        }
    }
    digits
        .chars()
        .filter_map(|c| c.to_digit(16))
        .fold(0.0, |acc, d| acc * 16.0 + d as f64)
}

fn decimal_value(text: &str) -> f64 {
    text.parse::<f64>().unwrap_or(f64::NAN)
}
