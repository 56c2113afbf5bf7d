//! Column kinds and text decoding for database sources.
//!
//! Every column is selected as text, so no value depends on what the sqlx
//! Any driver can map. The declared column type (and on SQLite the runtime
//! type of each value) decides how that text becomes a [`Value`].

use std::net::IpAddr;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

use crate::error::{DumpError, DumpResult};
use crate::value::{DATE_FORMAT, DATETIME_FORMAT, TIME_FORMAT, Value};

/// MySQL spatial column types, read back as WKT.
const MYSQL_SPATIAL: &[&str] = &[
    "point",
    "linestring",
    "polygon",
    "multipoint",
    "multilinestring",
    "multipolygon",
    "geometrycollection",
];

/// Database engine behind a connection URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    MySql,
    Sqlite,
}

impl Backend {
    /// Backend named by the URL scheme.
    pub fn from_url(url: &str) -> DumpResult<Self> {
        let scheme = url.split_once(':').map(|(s, _)| s).unwrap_or_default();
        match scheme.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Backend::Postgres),
            "mysql" | "mariadb" => Ok(Backend::MySql),
            "sqlite" => Ok(Backend::Sqlite),
            _ => Err(DumpError::config(format!(
                "unsupported database URL scheme: '{}'",
                scheme
            ))),
        }
    }

    /// Quote a column name.
    pub fn quote(self, name: &str) -> String {
        match self {
            Backend::MySql => format!("`{}`", name.replace('`', "``")),
            Backend::Postgres | Backend::Sqlite => format!("\"{}\"", name.replace('"', "\"\"")),
        }
    }

    /// SQL listing `(name, declared type)` of every column of a table, in
    /// declaration order. Both parts must already be plain identifiers.
    pub fn columns_sql(self, schema: Option<&str>, table: &str) -> String {
        match self {
            Backend::Postgres => format!(
                "SELECT CAST(column_name AS TEXT), CAST(udt_name AS TEXT) \
                 FROM information_schema.columns \
                 WHERE table_schema = {} AND table_name = '{}' \
                 ORDER BY ordinal_position",
                schema.map_or("current_schema()".to_string(), |s| format!("'{}'", s)),
                table
            ),
            Backend::MySql => format!(
                "SELECT CAST(COLUMN_NAME AS CHAR), CAST(COLUMN_TYPE AS CHAR) \
                 FROM information_schema.columns \
                 WHERE TABLE_SCHEMA = {} AND TABLE_NAME = '{}' \
                 ORDER BY ORDINAL_POSITION",
                schema.map_or("DATABASE()".to_string(), |s| format!("'{}'", s)),
                table
            ),
            Backend::Sqlite => format!(
                "SELECT CAST(name AS TEXT), CAST(type AS TEXT) FROM pragma_table_info('{}'{}) \
                 ORDER BY cid",
                table,
                schema.map_or(String::new(), |s| format!(", '{}'", s))
            ),
        }
    }

    /// Expressions selecting one column. SQLite adds `typeof(column)` in
    /// front of the text so the value's runtime type is known.
    pub fn select_exprs(self, name: &str, kind: &ColumnKind) -> Vec<String> {
        let c = self.quote(name);
        match (self, kind) {
            (Backend::Postgres, ColumnKind::Bytes) => vec![format!("encode({}, 'hex')", c)],
            (Backend::Postgres | Backend::MySql, ColumnKind::Geometry) => {
                vec![format!("ST_AsText({})", c)]
            }
            (Backend::Postgres, _) => vec![format!("CAST({} AS TEXT)", c)],
            (Backend::MySql, ColumnKind::Bytes) => vec![format!("HEX({})", c)],
            (Backend::MySql, _) => vec![format!("CAST({} AS CHAR)", c)],
            // Decimals keep SQLite's own shortest text; other reals need all
            // 17 digits to read back exactly
            (Backend::Sqlite, ColumnKind::Decimal) => vec![
                format!("typeof({})", c),
                format!(
                    "CASE typeof({c}) WHEN 'blob' THEN hex({c}) ELSE CAST({c} AS TEXT) END"
                ),
            ],
            (Backend::Sqlite, _) => vec![
                format!("typeof({})", c),
                format!(
                    "CASE typeof({c}) WHEN 'real' THEN printf('%.17g', {c}) \
                     WHEN 'blob' THEN hex({c}) ELSE CAST({c} AS TEXT) END"
                ),
            ],
        }
    }
}

/// How the text of a column is turned back into a value.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnKind {
    Bool,
    Integer,
    Float,
    Decimal,
    Date,
    Time,
    /// Timestamp without zone
    DateTime,
    /// Timestamp with zone
    Timestamp,
    Ip,
    /// Hex-encoded binary
    Bytes,
    /// WKT
    Geometry,
    /// Postgres range of the given element kind
    Range(Box<ColumnKind>),
    Text,
}

impl ColumnKind {
    /// Kind for a declared column type such as `decimal(8,2)`, `int4`,
    /// `tinyint(1)` or `timestamp with time zone`.
    pub fn from_declared(backend: Backend, declared: &str) -> Self {
        let declared = declared.trim().to_ascii_lowercase();
        let base = declared.split('(').next().unwrap_or_default().trim();

        if backend == Backend::Postgres {
            if let Some(element) = range_element(base) {
                return ColumnKind::Range(Box::new(element));
            }
        }

        if matches!(base, "bool" | "boolean") || declared.starts_with("tinyint(1)") {
            ColumnKind::Bool
        } else if matches!(base, "geometry" | "geography")
            || (backend == Backend::MySql && MYSQL_SPATIAL.contains(&base))
        {
            ColumnKind::Geometry
        } else if (base.contains("int")
            && !base.contains("interval")
            && !base.contains("point")
            && !base.ends_with("text"))
            || base.ends_with("serial")
        {
            ColumnKind::Integer
        } else if base.contains("float") || base.contains("double") || base == "real" {
            ColumnKind::Float
        } else if matches!(base, "numeric" | "decimal") {
            ColumnKind::Decimal
        } else if base == "timestamptz"
            || (base.starts_with("timestamp") && declared.contains("with time zone"))
        {
            ColumnKind::Timestamp
        } else if base.starts_with("timestamp") || base == "datetime" {
            ColumnKind::DateTime
        } else if base == "date" {
            ColumnKind::Date
        } else if base == "time" || declared.starts_with("time without time zone") {
            ColumnKind::Time
        } else if base == "inet" {
            ColumnKind::Ip
        } else if base == "bytea" || base.contains("blob") || base.contains("binary") {
            ColumnKind::Bytes
        } else {
            ColumnKind::Text
        }
    }

    /// Adjust a SQLite column's kind to the runtime type of one value
    /// (`integer`, `real`, `text`, `blob` or `null`).
    pub fn for_sqlite_value(&self, runtime: &str) -> ColumnKind {
        match (runtime, self) {
            ("integer", ColumnKind::Bool | ColumnKind::Integer | ColumnKind::Float)
            | ("integer" | "real", ColumnKind::Decimal)
            | ("real", ColumnKind::Float) => self.clone(),
            ("integer", _) => ColumnKind::Integer,
            ("real", _) => ColumnKind::Float,
            ("blob", _) => ColumnKind::Bytes,
            ("text", ColumnKind::Bytes) => ColumnKind::Text,
            _ => self.clone(),
        }
    }

    /// Value for a column's text. Text that does not read as the column's
    /// kind is kept as a string.
    pub fn decode(&self, text: &str) -> Value {
        self.try_decode(text)
            .unwrap_or_else(|| Value::String(text.to_string()))
    }

    fn try_decode(&self, text: &str) -> Option<Value> {
        match self {
            ColumnKind::Bool => match text.to_ascii_lowercase().as_str() {
                "t" | "true" | "1" => Some(Value::Bool(true)),
                "f" | "false" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
            ColumnKind::Integer => decode_integer(text),
            ColumnKind::Float => f64::from_str(text).ok().map(Value::Float),
            ColumnKind::Decimal => Decimal::from_str(text)
                .or_else(|_| Decimal::from_scientific(text))
                .ok()
                .map(Value::Decimal),
            ColumnKind::Date => NaiveDate::parse_from_str(text, DATE_FORMAT)
                .ok()
                .map(Value::Date),
            ColumnKind::Time => NaiveTime::parse_from_str(text, TIME_FORMAT)
                .ok()
                .map(Value::Time),
            ColumnKind::DateTime => parse_datetime(text).map(Value::DateTime),
            ColumnKind::Timestamp => parse_timestamp(text),
            ColumnKind::Ip => decode_ip(text),
            ColumnKind::Bytes => decode_hex(text).map(Value::Bytes),
            ColumnKind::Geometry => Some(Value::geometry(text)),
            ColumnKind::Range(element) => decode_range(element, text),
            ColumnKind::Text => Some(Value::String(text.to_string())),
        }
    }
}

fn range_element(base: &str) -> Option<ColumnKind> {
    match base {
        "int4range" | "int8range" => Some(ColumnKind::Integer),
        "numrange" => Some(ColumnKind::Decimal),
        "daterange" => Some(ColumnKind::Date),
        "tsrange" => Some(ColumnKind::DateTime),
        "tstzrange" => Some(ColumnKind::Timestamp),
        _ => None,
    }
}

fn decode_integer(text: &str) -> Option<Value> {
    if let Ok(n) = text.parse::<i64>() {
        return Some(Value::Int(n));
    }
    // Unsigned 64-bit values beyond i64 keep their digits
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        return Some(Value::Raw(text.to_string()));
    }
    f64::from_str(text).ok().map(Value::Float)
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    [DATETIME_FORMAT, "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

fn parse_timestamp(text: &str) -> Option<Value> {
    let with_offset = [
        "%Y-%m-%d %H:%M:%S%.f%#z",
        "%Y-%m-%dT%H:%M:%S%.f%#z",
        "%Y-%m-%d %H:%M:%S%.f %#z",
    ]
    .iter()
    .find_map(|format| DateTime::parse_from_str(text, format).ok());

    match with_offset {
        Some(ts) => Some(Value::from(ts)),
        // No offset in the text: stored as UTC
        None => parse_datetime(text).map(|naive| Value::Timestamp(naive.and_utc())),
    }
}

/// `10.0.0.1` or `10.0.0.1/32`; networks stay text.
fn decode_ip(text: &str) -> Option<Value> {
    match text.split_once('/') {
        Some((addr, bits)) => {
            let ip: IpAddr = addr.parse().ok()?;
            let host_bits = if ip.is_ipv4() { "32" } else { "128" };
            (bits == host_bits).then_some(Value::Ip(ip))
        }
        None => text.parse().ok().map(Value::Ip),
    }
}

fn decode_hex(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(text.get(i..i + 2)?, 16).ok())
        .collect()
}

/// Postgres range text: `[1,5)`, `[2020-01-01,)`, `(,5]`. Ruby ranges always
/// include their start, so an excluded lower bound stays text.
fn decode_range(element: &ColumnKind, text: &str) -> Option<Value> {
    let (exclusive_start, inner) = match text.strip_prefix('[') {
        Some(inner) => (false, inner),
        None => (true, text.strip_prefix('(')?),
    };
    let (inner, exclude_end) = match inner.strip_suffix(')') {
        Some(inner) => (inner, true),
        None => (inner.strip_suffix(']')?, false),
    };
    let (lower, upper) = inner.split_once(',')?;

    let start = decode_bound(element, lower)?;
    if exclusive_start && start.is_some() {
        return None;
    }
    let end = decode_bound(element, upper)?;
    Some(Value::range(start, end, exclude_end))
}

/// `Some(None)` for an unbounded end.
fn decode_bound(element: &ColumnKind, text: &str) -> Option<Option<Value>> {
    let text = text.trim_matches('"');
    if text.is_empty() || text.eq_ignore_ascii_case("infinity") || text.eq_ignore_ascii_case("-infinity") {
        return Some(None);
    }
    element.try_decode(text).map(Some)
}
