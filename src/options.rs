//! Dump options.
//!
//! Options are read-only for the duration of a dump. Nesting depth for the
//! migration scaffold is passed as an argument, never stored here.

use std::path::PathBuf;

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{is_not, take_while, take_while1},
    character::complete::{anychar, char, multispace0, none_of},
    combinator::recognize,
    multi::{many0, many1, separated_list0},
    sequence::{delimited, pair, preceded, separated_pair, tuple},
};

use crate::error::{DumpError, DumpResult};

/// Default page and batch size.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Default migration superclass.
pub const DEFAULT_MIGRATION_BASE: &str = "ActiveRecord::Migration";

/// Attributes left out of every record unless configured otherwise.
pub fn default_exclude() -> Vec<String> {
    vec!["id".into(), "created_at".into(), "updated_at".into()]
}

/// Settings for the `Model.import` form.
///
/// The pairs are appended verbatim to the call, e.g. `validate: false`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportOptions {
    pub trailing: Vec<(String, String)>,
}

impl ImportOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.trailing.push((key.into(), value.into()));
        self
    }

    /// Parse a `key: value, key: value` list.
    pub fn parse(input: &str) -> DumpResult<Self> {
        Ok(Self {
            trailing: parse_import_options(input)?,
        })
    }

    /// The `, key: value` suffix written before the closing parenthesis.
    pub fn suffix(&self) -> String {
        self.trailing
            .iter()
            .map(|(k, v)| format!(", {}: {}", k, v))
            .collect()
    }
}

/// Options for a dump.
#[derive(Debug, Clone, PartialEq)]
pub struct DumpOptions {
    /// Destination file (None = return the code as a string)
    pub file: Option<PathBuf>,
    /// Append to the destination instead of truncating it
    pub append: bool,
    /// Wrap the statement in a migration class
    pub migration: bool,
    /// Ruby filter for the migration's emptiness guard
    pub query: Option<String>,
    /// Use `Model.import` with positional rows
    pub import: Option<ImportOptions>,
    /// Attribute names left out of every record
    pub exclude: Vec<String>,
    /// Records per batch / page
    pub batch_size: usize,
    /// Maximum number of records to dump
    pub limit: Option<usize>,
    /// Superclass of the generated migration
    pub migration_base: String,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            file: None,
            append: false,
            migration: false,
            query: None,
            import: None,
            exclude: default_exclude(),
            batch_size: DEFAULT_BATCH_SIZE,
            limit: None,
            migration_base: DEFAULT_MIGRATION_BASE.to_string(),
        }
    }
}

impl DumpOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    pub fn with_append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    pub fn as_migration(mut self) -> Self {
        self.migration = true;
        self
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_import(mut self, import: ImportOptions) -> Self {
        self.import = Some(import);
        self
    }

    pub fn with_exclude<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_migration_base(mut self, base: impl Into<String>) -> Self {
        self.migration_base = base.into();
        self
    }

    pub fn is_import(&self) -> bool {
        self.import.is_some()
    }

    pub fn excludes(&self, name: &str) -> bool {
        self.exclude.iter().any(|e| e == name)
    }

    /// Reject combinations that cannot be written.
    pub fn validate(&self) -> DumpResult<()> {
        if self.migration && self.file.is_none() {
            return Err(DumpError::config(
                "a migration needs a destination file to name its class",
            ));
        }
        if self.batch_size == 0 {
            return Err(DumpError::config("batch size must be at least 1"));
        }
        Ok(())
    }
}

/// Parse import trailer options: `validate: false, on_duplicate_key_ignore: true`.
///
/// Values are kept as written. Commas inside brackets, braces, parentheses or
/// double-quoted strings do not split values.
pub fn parse_import_options(input: &str) -> DumpResult<Vec<(String, String)>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(Vec::new());
    }

    match option_list(input) {
        Ok(("", pairs)) => Ok(pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.trim().to_string()))
            .collect()),
        Ok((remaining, _)) => Err(DumpError::parse(
            input.len() - remaining.len(),
            format!("Unexpected trailing content: '{}'", remaining),
        )),
        Err(e) => Err(DumpError::parse(0, format!("Parse failed: {:?}", e))),
    }
}

fn option_list(input: &str) -> IResult<&str, Vec<(&str, &str)>> {
    let (input, pairs) = separated_list0(
        tuple((multispace0, char(','), multispace0)),
        option_pair,
    )(input)?;
    let (input, _) = multispace0(input)?;
    Ok((input, pairs))
}

fn option_pair(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        option_key,
        tuple((multispace0, char(':'), multispace0)),
        option_value,
    )(input)
}

fn option_key(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_'),
    ))(input)
}

/// A top-level value runs until the next unnested comma.
fn option_value(input: &str) -> IResult<&str, &str> {
    recognize(many1(alt((quoted, nested, is_not(",[]{}()\"")))))(input)
}

fn nested_content(input: &str) -> IResult<&str, &str> {
    recognize(many0(alt((quoted, nested, is_not("[]{}()\"")))))(input)
}

fn nested(input: &str) -> IResult<&str, &str> {
    alt((
        recognize(delimited(char('['), nested_content, char(']'))),
        recognize(delimited(char('{'), nested_content, char('}'))),
        recognize(delimited(char('('), nested_content, char(')'))),
    ))(input)
}

fn quoted(input: &str) -> IResult<&str, &str> {
    recognize(delimited(
        char('"'),
        many0(alt((preceded(char('\\'), anychar), none_of("\\\"")))),
        char('"'),
    ))(input)
}
