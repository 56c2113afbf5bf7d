//! Records and their literal form.

use crate::literal::{ToRuby, label_literal};
use crate::value::Value;

/// One row: attribute names mapped to values, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    attributes: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style attribute append.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set an attribute. Replacing an existing name keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.attributes.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// How a record is written inside the statement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordLayout<'a> {
    /// `{name: "Al", age: 5}`: every attribute not in `exclude`, in record
    /// order.
    Keyword { exclude: &'a [String] },
    /// `["Al", 5]`: one value per column, `nil` where the record has no such
    /// attribute. The column names are written once by the statement.
    Positional { columns: &'a [String] },
}

/// Render one record as a Ruby literal.
pub fn encode_record(record: &Record, layout: RecordLayout<'_>) -> String {
    match layout {
        RecordLayout::Keyword { exclude } => {
            let pairs: Vec<String> = record
                .iter()
                .filter(|(name, _)| !exclude.iter().any(|e| e == name))
                .map(|(name, v)| format!("{} {}", label_literal(name), v.to_ruby()))
                .collect();
            format!("{{{}}}", pairs.join(", "))
        }
        RecordLayout::Positional { columns } => {
            let values: Vec<String> = columns
                .iter()
                .map(|column| record.get(column).unwrap_or(&Value::Null).to_ruby())
                .collect();
            format!("[{}]", values.join(", "))
        }
    }
}
