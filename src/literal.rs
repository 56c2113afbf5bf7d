//! Ruby literal rendering for values.
//!
//! Converts runtime values into source text that evaluates back to the same
//! value. Temporal, decimal, network, range and geometry values are written as
//! quoted strings in a fixed database format; ActiveRecord casts them back on
//! assignment.

use crate::value::Value;

/// Trait for converting values to Ruby source literals.
pub trait ToRuby {
    /// Convert this value to a Ruby literal.
    fn to_ruby(&self) -> String;
}

impl ToRuby for Value {
    fn to_ruby(&self) -> String {
        match self {
            Value::Decimal(_) | Value::Ip(_) => string_literal(&self.to_string()),
            Value::Date(_) | Value::Time(_) | Value::DateTime(_) | Value::Timestamp(_) => {
                string_literal(&self.to_string())
            }
            Value::Range(range) => string_literal(&range.to_bracket_notation()),
            Value::Geometry(wkt) => string_literal(wkt),
            Value::Null => "nil".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(f) => float_literal(*f),
            Value::String(s) => string_literal(s),
            Value::Symbol(s) => symbol_literal(s),
            Value::Bytes(bytes) => binary_literal(bytes),
            Value::Array(items) => {
                let items: Vec<String> = items.iter().map(|v| v.to_ruby()).collect();
                format!("[{}]", items.join(", "))
            }
            Value::Hash(pairs) => {
                let pairs: Vec<String> = pairs
                    .iter()
                    .map(|(k, v)| format!("{} => {}", k.to_ruby(), v.to_ruby()))
                    .collect();
                format!("{{{}}}", pairs.join(", "))
            }
            Value::Raw(literal) => literal.clone(),
        }
    }
}

/// Double-quoted Ruby string with `String#inspect` escaping.
pub fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\x0C' => out.push_str("\\f"),
            '\x0B' => out.push_str("\\v"),
            '\x07' => out.push_str("\\a"),
            '\x08' => out.push_str("\\b"),
            '\x1B' => out.push_str("\\e"),
            // `#{`, `#$` and `#@` would interpolate
            '#' if matches!(chars.peek(), Some('{' | '$' | '@')) => out.push_str("\\#"),
            c if c.is_control() => {
                let code = c as u32;
                if code <= 0xFFFF {
                    out.push_str(&format!("\\u{:04X}", code));
                } else {
                    out.push_str(&format!("\\u{{{:X}}}", code));
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Ruby symbol literal, quoted when the name is not a plain identifier.
pub fn symbol_literal(name: &str) -> String {
    if is_identifier(name, &['?', '!', '=']) {
        format!(":{}", name)
    } else {
        format!(":{}", string_literal(name))
    }
}

/// Hash label for keyword-style keys: `name:` or `"odd name":`.
pub fn label_literal(name: &str) -> String {
    if is_identifier(name, &['?', '!']) {
        format!("{}:", name)
    } else {
        format!("{}:", string_literal(name))
    }
}

fn is_identifier(name: &str, suffixes: &[char]) -> bool {
    let body = match name.strip_suffix(|c: char| suffixes.contains(&c)) {
        Some(body) => body,
        None => name,
    };
    let mut chars = body.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn binary_literal(bytes: &[u8]) -> String {
    let mut out = String::from("\"");
    let mut iter = bytes.iter().peekable();
    while let Some(&b) = iter.next() {
        match b {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'#' if matches!(iter.peek(), Some(b'{' | b'$' | b'@')) => out.push_str("\\#"),
            0x20..=0x7E => out.push(b as char),
            _ => out.push_str(&format!("\\x{:02X}", b)),
        }
    }
    out.push_str("\".b");
    out
}

fn float_literal(f: f64) -> String {
    if f.is_nan() {
        "Float::NAN".to_string()
    } else if f.is_infinite() {
        let literal = if f > 0.0 { "Float::INFINITY" } else { "-Float::INFINITY" };
        literal.to_string()
    } else {
        ruby_float(f)
    }
}

/// Ruby `Float#to_s` for finite values: positional notation for decimal
/// exponents in `-4..16`, scientific (`1.0e+20`) otherwise.
pub(crate) fn ruby_float(f: f64) -> String {
    // `{:e}` yields the shortest round-trip digits, e.g. `-1.5e-5`
    let sci = format!("{:e}", f);
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(m) => ("-", m),
        None => ("", mantissa),
    };
    let digits: String = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();

    if (-4..16).contains(&exp) {
        let (int_part, frac_part) = if exp >= 0 {
            let int_len = exp as usize + 1;
            if digits.len() <= int_len {
                (format!("{:0<width$}", digits, width = int_len), "0".to_string())
            } else {
                (digits[..int_len].to_string(), digits[int_len..].to_string())
            }
        } else {
            let zeros = "0".repeat((-exp - 1) as usize);
            ("0".to_string(), format!("{}{}", zeros, digits))
        };
        format!("{}{}.{}", sign, int_part, frac_part)
    } else {
        let frac = if digits.len() > 1 { &digits[1..] } else { "0" };
        format!(
            "{}{}.{}e{}{:02}",
            sign,
            &digits[..1],
            frac,
            if exp < 0 { '-' } else { '+' },
            exp.abs()
        )
    }
}
