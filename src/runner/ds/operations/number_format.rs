//! Number to text conversions: the shortest round-trip form used by
//! ToString, the fixed/exponential/precision forms, and radix output.

/// Enough fractional digits to hold the exact decimal expansion of any f64.
const EXACT_PRECISION: usize = 780;

/// Decimal digits and exponent of a positive finite number:
/// `x = d0.d1d2... * 10^exp`.
struct Decimal {
    digits: Vec<u8>,
    exp: i32,
}

impl Decimal {
    fn parse(formatted: &str) -> Decimal {
        let (mantissa, exp) = formatted.split_once('e').unwrap_or((formatted, "0"));
        let mut digits: Vec<u8> = mantissa
            .bytes()
            .filter(|b| b.is_ascii_digit())
            .map(|b| b - b'0')
            .collect();
        while digits.len() > 1 && digits.last() == Some(&0) {
            digits.pop();
        }
        Decimal {
            digits,
            exp: exp.parse().unwrap_or(0),
        }
    }

    /// Shortest digits that round-trip.
    fn shortest(x: f64) -> Decimal {
        Decimal::parse(&format!("{:e}", x))
    }

    /// Exact decimal expansion.
    fn exact(x: f64) -> Decimal {
        Decimal::parse(&format!("{:.*e}", EXACT_PRECISION, x))
    }

    /// Keeps `keep` significant digits, rounding half up. A carry out of
    /// the leading digit bumps the exponent.
    fn round(&self, keep: usize) -> Decimal {
        let mut digits: Vec<u8> = self.digits.iter().copied().take(keep).collect();
        digits.resize(keep, 0);
        let round_up = self.digits.get(keep).map_or(false, |&d| d >= 5);
        let mut exp = self.exp;
        if round_up {
            let mut i = keep;
            loop {
                if i == 0 {
                    digits.insert(0, 1);
                    digits.truncate(keep.max(1));
                    exp += 1;
                    break;
                }
                i -= 1;
                if digits[i] == 9 {
                    digits[i] = 0;
                } else {
                    digits[i] += 1;
                    break;
                }
            }
        }
        Decimal { digits, exp }
    }

    fn digit_string(&self) -> String {
        self.digits.iter().map(|d| (b'0' + d) as char).collect()
    }
}

fn exponent_suffix(e: i32) -> String {
    if e >= 0 {
        format!("e+{}", e)
    } else {
        format!("e-{}", -e)
    }
}

/// Number::toString for radix 10.
pub fn number_to_string(m: f64) -> String {
    if m.is_nan() {
        return "NaN".to_string();
    }
    if m == 0.0 {
        return "0".to_string();
    }
    if m < 0.0 {
        return format!("-{}", number_to_string(-m));
    }
    if m.is_infinite() {
        return "Infinity".to_string();
    }
    let d = Decimal::shortest(m);
    let s = d.digit_string();
    let k = s.len() as i32;
    let n = d.exp + 1;
    if k <= n && n <= 21 {
        format!("{}{}", s, "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int_part, frac) = s.split_at(n as usize);
        format!("{}.{}", int_part, frac)
    } else if -6 < n && n <= 0 {
        format!("0.{}{}", "0".repeat((-n) as usize), s)
    } else if k == 1 {
        format!("{}{}", s, exponent_suffix(n - 1))
    } else {
        let (first, rest) = s.split_at(1);
        format!("{}.{}{}", first, rest, exponent_suffix(n - 1))
    }
}

/// Number.prototype.toFixed for `0 <= f <= 20` and `|x| < 1e21`.
pub fn to_fixed(x: f64, f: usize) -> String {
    let (sign, x) = if x < 0.0 { ("-", -x) } else { ("", x) };
    let mut m = if x == 0.0 {
        "0".to_string()
    } else {
        let d = Decimal::exact(x);
        let keep = d.exp + 1 + f as i32;
        if keep < 0 {
            "0".to_string()
        } else if keep == 0 {
            if d.digits[0] >= 5 {
                "1".to_string()
            } else {
                "0".to_string()
            }
        } else {
            let r = d.round(keep as usize);
            let mut s = r.digit_string();
            // A carry adds one integer digit.
            let int_digits = (r.exp + 1 + f as i32).max(0) as usize;
            if s.len() < int_digits {
                s.push_str(&"0".repeat(int_digits - s.len()));
            }
            s
        }
    };
    if f != 0 {
        let k = m.len();
        if k <= f {
            m = format!("{}{}", "0".repeat(f + 1 - k), m);
        }
        let split = m.len() - f;
        m = format!("{}.{}", &m[..split], &m[split..]);
    }
    format!("{}{}", sign, m)
}

/// Number.prototype.toExponential for finite `x`; `None` means as many
/// digits as needed.
pub fn to_exponential(x: f64, fraction_digits: Option<usize>) -> String {
    let (sign, x) = if x < 0.0 { ("-", -x) } else { ("", x) };
    let d = if x == 0.0 {
        Decimal {
            digits: vec![0; fraction_digits.unwrap_or(0) + 1],
            exp: 0,
        }
    } else {
        match fraction_digits {
            None => Decimal::shortest(x),
            Some(f) => Decimal::exact(x).round(f + 1),
        }
    };
    let s = d.digit_string();
    let (first, rest) = s.split_at(1);
    if rest.is_empty() {
        format!("{}{}{}", sign, first, exponent_suffix(d.exp))
    } else {
        format!("{}{}.{}{}", sign, first, rest, exponent_suffix(d.exp))
    }
}

/// Number.prototype.toPrecision for finite `x` and `1 <= p <= 21`.
pub fn to_precision(x: f64, p: usize) -> String {
    let (sign, x) = if x < 0.0 { ("-", -x) } else { ("", x) };
    let d = if x == 0.0 {
        Decimal {
            digits: vec![0; p],
            exp: 0,
        }
    } else {
        Decimal::exact(x).round(p)
    };
    let s = d.digit_string();
    let e = d.exp;
    let body = if e < -6 || e >= p as i32 {
        let (first, rest) = s.split_at(1);
        if rest.is_empty() {
            format!("{}{}", first, exponent_suffix(e))
        } else {
            format!("{}.{}{}", first, rest, exponent_suffix(e))
        }
    } else if e == p as i32 - 1 {
        s
    } else if e >= 0 {
        let (int_part, frac) = s.split_at(e as usize + 1);
        format!("{}.{}", int_part, frac)
    } else {
        format!("0.{}{}", "0".repeat((-(e + 1)) as usize), s)
    };
    format!("{}{}", sign, body)
}

const RADIX_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Number.prototype.toString for `2 <= radix <= 36`, radix other than 10.
pub fn to_radix_string(x: f64, radix: u32) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x == 0.0 {
        return "0".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let negative = x < 0.0;
    let x = x.abs();
    let r = radix as f64;
    let mut int_part = x.trunc();
    let mut fraction = x - int_part;

    let mut int_digits = Vec::new();
    if int_part == 0.0 {
        int_digits.push(b'0');
    }
    while int_part >= 1.0 {
        let d = (int_part % r) as usize;
        int_digits.push(RADIX_DIGITS[d]);
        int_part = ((int_part - d as f64) / r).trunc();
    }
    int_digits.reverse();

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&String::from_utf8_lossy(&int_digits));
    if fraction > 0.0 {
        out.push('.');
        // Stop once the remaining fraction is below the input's precision.
        let mut delta = 0.5 * (f64::from_bits(x.to_bits() + 1) - x).max(f64::MIN_POSITIVE);
        let mut emitted = 0;
        loop {
            fraction *= r;
            delta *= r;
            let d = fraction.trunc() as usize;
            fraction -= d as f64;
            out.push(RADIX_DIGITS[d.min(radix as usize - 1)] as char);
            emitted += 1;
            if fraction <= delta || emitted >= 1100 {
                break;
            }
        }
    }
    out
}
