//! URI handling functions (15.1.3): encodeURI, encodeURIComponent,
//! decodeURI and decodeURIComponent.

use std::collections::HashSet;

use crate::runner::ds::error::{JErrorType, Message};
use crate::runner::ds::operations::type_conversion::to_string;
use crate::runner::ds::string::JsString;
use crate::runner::ds::value::JsValue;
use crate::runner::text::builder::StringBuilder;
use crate::runner::text::unicode::hex_value;
use crate::runner::text::utf::{
    code_point_at, decode_utf8_sequence, encode_utf8, push_code_point, utf8_sequence_length,
};
use crate::runner::types::{arg, define_global_function, EvalContext};

const HEX: &[u8; 16] = b"0123456789ABCDEF";

lazy_static! {
    static ref URI_RESERVED: HashSet<u16> = ";/?:@&=+$,".encode_utf16().collect();
    static ref URI_MARK: HashSet<u16> = "-_.!~*'()".encode_utf16().collect();
}

pub fn register(ctx: &mut EvalContext) -> Result<(), JErrorType> {
    define_global_function(ctx, "decodeURI", global_decode_uri, 1)?;
    define_global_function(ctx, "decodeURIComponent", global_decode_uri_component, 1)?;
    define_global_function(ctx, "encodeURI", global_encode_uri, 1)?;
    define_global_function(ctx, "encodeURIComponent", global_encode_uri_component, 1)?;
    Ok(())
}

fn is_unescaped(c: u16) -> bool {
    (c < 0x80 && (c as u8).is_ascii_alphanumeric()) || URI_MARK.contains(&c)
}

fn is_uri_reserved(c: u16) -> bool {
    URI_RESERVED.contains(&c)
}

/// Encode (15.1.3): every unit outside `unescaped` becomes the
/// percent-escaped UTF-8 form of its code point.
pub fn encode(s: &JsString, unescaped: impl Fn(u16) -> bool) -> Result<JsString, JErrorType> {
    let units = s.units();
    let mut out = StringBuilder::with_capacity(units.len());
    let mut k = 0;
    while k < units.len() {
        let c = units[k];
        if unescaped(c) {
            out.push_unit(c);
            k += 1;
            continue;
        }
        let (v, width) = code_point_at(units, k);
        if (0xD800..=0xDFFF).contains(&v) {
            return Err(Message::UriEncode.into());
        }
        let mut buf = [0u8; 4];
        let n = encode_utf8(v, &mut buf);
        for &b in &buf[..n] {
            out.push_char('%');
            out.push_unit(HEX[(b >> 4) as usize] as u16);
            out.push_unit(HEX[(b & 0xF) as usize] as u16);
        }
        k += width;
    }
    Ok(out.build())
}

/// Reads the `%XY` escape at `k`.
fn escaped_byte(units: &[u16], k: usize) -> Result<u8, JErrorType> {
    if units.get(k) != Some(&('%' as u16)) {
        return Err(Message::BadUri.into());
    }
    let hi = units.get(k + 1).copied().and_then(hex_value);
    let lo = units.get(k + 2).copied().and_then(hex_value);
    match (hi, lo) {
        (Some(hi), Some(lo)) => Ok((hi * 16 + lo) as u8),
        _ => Err(Message::BadUri.into()),
    }
}

/// Decode (15.1.3): escapes whose code point is in `reserved` are kept
/// verbatim.
pub fn decode(s: &JsString, reserved: impl Fn(u16) -> bool) -> Result<JsString, JErrorType> {
    let units = s.units();
    let mut out: Vec<u16> = Vec::with_capacity(units.len());
    let mut k = 0;
    while k < units.len() {
        let c = units[k];
        if c != '%' as u16 {
            out.push(c);
            k += 1;
            continue;
        }
        let start = k;
        let lead = escaped_byte(units, k)?;
        let n = utf8_sequence_length(lead).ok_or_else(|| JErrorType::from(Message::BadUri))?;
        let mut octets = [0u8; 4];
        octets[0] = lead;
        for j in 1..n {
            octets[j] = escaped_byte(units, k + 3 * j)?;
        }
        k += 3 * n;
        let v = decode_utf8_sequence(&octets[..n]).ok_or_else(|| JErrorType::from(Message::BadUri))?;
        if v < 0x10000 && reserved(v as u16) {
            out.extend_from_slice(&units[start..k]);
        } else {
            push_code_point(&mut out, v);
        }
    }
    Ok(JsString::from_units(out))
}

pub fn encode_uri(s: &JsString) -> Result<JsString, JErrorType> {
    encode(s, |c| is_unescaped(c) || is_uri_reserved(c) || c == '#' as u16)
}

pub fn encode_uri_component(s: &JsString) -> Result<JsString, JErrorType> {
    encode(s, is_unescaped)
}

pub fn decode_uri(s: &JsString) -> Result<JsString, JErrorType> {
    decode(s, |c| is_uri_reserved(c) || c == '#' as u16)
}

pub fn decode_uri_component(s: &JsString) -> Result<JsString, JErrorType> {
    decode(s, |_| false)
}

/// decodeURI(encodedURI)
fn global_decode_uri(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = to_string(ctx, &arg(&args, 0))?;
    Ok(JsValue::string(decode_uri(&s)?))
}

/// decodeURIComponent(encodedURIComponent)
fn global_decode_uri_component(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = to_string(ctx, &arg(&args, 0))?;
    Ok(JsValue::string(decode_uri_component(&s)?))
}

/// encodeURI(uri)
fn global_encode_uri(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = to_string(ctx, &arg(&args, 0))?;
    Ok(JsValue::string(encode_uri(&s)?))
}

/// encodeURIComponent(uriComponent)
fn global_encode_uri_component(
    ctx: &mut EvalContext,
    _this: JsValue,
    args: Vec<JsValue>,
) -> Result<JsValue, JErrorType> {
    let s = to_string(ctx, &arg(&args, 0))?;
    Ok(JsValue::string(encode_uri_component(&s)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn js(s: &str) -> JsString {
        JsString::new(s)
    }

    #[test]
    fn test_encode_component_escapes_reserved() {
        assert_eq!(encode_uri_component(&js("a b/c")).unwrap().to_string(), "a%20b%2Fc");
        assert_eq!(encode_uri(&js("a b/c#d")).unwrap().to_string(), "a%20b/c#d");
    }

    #[test]
    fn test_decode_multibyte() {
        assert_eq!(decode_uri(&js("%E2%82%AC")).unwrap().to_string(), "€");
        assert_eq!(decode_uri_component(&js("%F0%9F%98%80")).unwrap().units(), &[0xD83D, 0xDE00]);
    }

    #[test]
    fn test_decode_uri_keeps_reserved_escapes() {
        assert_eq!(decode_uri(&js("%2F%23%41")).unwrap().to_string(), "%2F%23A");
        assert_eq!(decode_uri_component(&js("%2F%23%41")).unwrap().to_string(), "/#A");
    }

    #[test]
    fn test_lone_surrogate_is_uri_error() {
        let s = JsString::from_units(vec![0x61, 0xD800]);
        assert!(matches!(encode_uri(&s), Err(JErrorType::URIError(_))));
        let s = JsString::from_units(vec![0xDC00]);
        assert!(matches!(encode_uri_component(&s), Err(JErrorType::URIError(_))));
    }

    #[test]
    fn test_malformed_escapes_are_uri_errors() {
        for bad in ["%", "%4", "%G0", "%80", "%C3", "%C3%28", "%C0%80", "%ED%A0%80"] {
            assert!(matches!(decode_uri(&js(bad)), Err(JErrorType::URIError(_))), "accepted {}", bad);
        }
    }
}
