//! Runtime values carried by records.
//!
//! Every attribute value belongs to one closed set of kinds. Kinds that have no
//! dedicated variant are carried as [`Value::Raw`], a literal that is emitted
//! verbatim.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;

use crate::literal::{ToRuby, ruby_float};

/// Database-style date format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// Database-style time-of-day format. Fractional seconds only when non-zero.
pub const TIME_FORMAT: &str = "%H:%M:%S%.f";
/// Database-style timestamp format. Fractional seconds only when non-zero.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// NULL / nil
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// String
    String(String),
    /// Symbol (`:name`)
    Symbol(String),
    /// Arbitrary-precision decimal
    Decimal(Decimal),
    /// IP address
    Ip(IpAddr),
    /// Calendar date
    Date(NaiveDate),
    /// Time of day
    Time(NaiveTime),
    /// Timestamp without zone
    DateTime(NaiveDateTime),
    /// Timestamp with zone, normalized to UTC
    Timestamp(DateTime<Utc>),
    /// Bounded or open range
    Range(Box<RangeValue>),
    /// Geometry in its canonical text form (WKT)
    Geometry(String),
    /// Binary data
    Bytes(Vec<u8>),
    /// Array of values
    Array(Vec<Value>),
    /// Ordered key/value pairs
    Hash(Vec<(Value, Value)>),
    /// Pre-rendered literal, written as-is
    Raw(String),
}

impl Value {
    /// Build a range value.
    pub fn range(start: Option<Value>, end: Option<Value>, exclude_end: bool) -> Self {
        Value::Range(Box::new(RangeValue {
            start,
            end,
            exclude_end,
        }))
    }

    /// Build a geometry value from its canonical text.
    pub fn geometry(wkt: impl Into<String>) -> Self {
        Value::Geometry(wkt.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True for values that stand for positive or negative infinity.
    pub fn is_infinite(&self) -> bool {
        matches!(self, Value::Float(f) if f.is_infinite())
    }
}

/// A range of values. A `None` endpoint is unbounded.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeValue {
    pub start: Option<Value>,
    pub end: Option<Value>,
    pub exclude_end: bool,
}

impl RangeValue {
    /// Bracket notation: `[lo,hi]` or `[lo,hi)`, empty for infinite endpoints.
    pub fn to_bracket_notation(&self) -> String {
        let closer = if self.exclude_end { ')' } else { ']' };
        format!(
            "[{},{}{}",
            endpoint(self.start.as_ref()),
            endpoint(self.end.as_ref()),
            closer
        )
    }
}

fn endpoint(value: Option<&Value>) -> String {
    match value {
        Some(v) if !v.is_infinite() => v.to_string(),
        _ => String::new(),
    }
}

/// Raw textual form of a value, without literal quoting.
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) if n.is_nan() => write!(f, "NaN"),
            Value::Float(n) if n.is_infinite() => {
                write!(f, "{}Infinity", if *n < 0.0 { "-" } else { "" })
            }
            Value::Float(n) => write!(f, "{}", ruby_float(*n)),
            Value::String(s) | Value::Symbol(s) | Value::Geometry(s) | Value::Raw(s) => {
                write!(f, "{}", s)
            }
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Ip(ip) => write!(f, "{}", ip),
            Value::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Value::Time(t) => write!(f, "{}", t.format(TIME_FORMAT)),
            Value::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
            Value::Timestamp(ts) => write!(f, "{}", ts.format(DATETIME_FORMAT)),
            Value::Range(r) => write!(f, "{}", r.to_bracket_notation()),
            Value::Bytes(b) => write!(f, "{}", String::from_utf8_lossy(b)),
            Value::Array(_) | Value::Hash(_) => write!(f, "{}", self.to_ruby()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Decimal(d)
    }
}

impl From<IpAddr> for Value {
    fn from(ip: IpAddr) -> Self {
        Value::Ip(ip)
    }
}

impl From<Ipv4Addr> for Value {
    fn from(ip: Ipv4Addr) -> Self {
        Value::Ip(IpAddr::V4(ip))
    }
}

impl From<Ipv6Addr> for Value {
    fn from(ip: Ipv6Addr) -> Self {
        Value::Ip(IpAddr::V6(ip))
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveTime> for Value {
    fn from(t: NaiveTime) -> Self {
        Value::Time(t)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(ts: DateTime<Utc>) -> Self {
        Value::Timestamp(ts)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(ts: DateTime<FixedOffset>) -> Self {
        Value::Timestamp(ts.with_timezone(&Utc))
    }
}

impl From<RangeValue> for Value {
    fn from(r: RangeValue) -> Self {
        Value::Range(Box::new(r))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match (n.as_i64(), n.as_f64()) {
                (Some(i), _) => Value::Int(i),
                // u64 beyond i64 keeps its exact digits
                _ if n.is_u64() => Value::Raw(n.to_string()),
                (None, Some(f)) => Value::Float(f),
                (None, None) => Value::Raw(n.to_string()),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Hash(
                map.into_iter()
                    .map(|(k, v)| (Value::String(k), Value::from(v)))
                    .collect(),
            ),
        }
    }
}
