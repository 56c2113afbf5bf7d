//! # seed-dump
//!
//! > **Snapshot rows as code, not as a data dump.**
//!
//! Turns records into Ruby source that recreates them: a `Model.create!`
//! call, a bulk `Model.import`, or a migration wrapping either.
//!
//! ## Quick Example
//!
//! ```rust
//! use seed_dump::prelude::*;
//!
//! let users = Collection::new(
//!     "User",
//!     vec![Record::new().with("id", 1).with("name", "Al").with("age", 5)],
//! );
//!
//! let code = seed_dump::dump(&users, &DumpOptions::default()).unwrap();
//! assert_eq!(
//!     code.as_deref(),
//!     Some("User.create!([\n  {name: \"Al\", age: 5}\n])\n")
//! );
//! ```
//!
//! ## Output Forms
//!
//! | Option      | Output                                                |
//! |-------------|-------------------------------------------------------|
//! | (default)   | `User.create!([{...}, ...])`                          |
//! | `import`    | `User.import([:name, :age], [[...], ...])`            |
//! | `migration` | `class Seed < ActiveRecord::Migration` around the call |
//! | `query`     | `if User.where(...).empty?` guard inside the migration |

pub mod column;
pub mod config;
pub mod database;
pub mod error;
pub mod inflect;
pub mod literal;
pub mod migration;
pub mod options;
pub mod record;
pub mod sink;
pub mod source;
pub mod statement;
pub mod value;

use tracing::{debug, info, warn};

use crate::error::DumpResult;
use crate::options::DumpOptions;
use crate::sink::Sink;
use crate::source::RecordSource;

pub mod prelude {
    pub use crate::Dumped;
    pub use crate::config::Config;
    pub use crate::database::SqlTable;
    pub use crate::error::*;
    pub use crate::literal::ToRuby;
    pub use crate::options::{DumpOptions, ImportOptions};
    pub use crate::record::Record;
    pub use crate::source::{Collection, Paged, PagedQuery, RecordSource};
    pub use crate::value::{RangeValue, Value};
}

/// What a dump produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Dumped {
    /// The source had no records and nothing was opened.
    Empty,
    /// Code for `records` records was written to the configured file.
    File { records: usize },
    /// No file was configured; the generated code.
    Code { records: usize, code: String },
}

/// Dump every record of `source` as Ruby code.
///
/// Returns `Ok(None)` without touching the destination when the source is
/// empty, `Ok(Some(code))` when no file is configured, and `Ok(None)` after
/// writing the file otherwise. The file is closed on every path; a failure
/// while writing leaves whatever was already written in place.
pub fn dump<S>(source: &S, options: &DumpOptions) -> DumpResult<Option<String>>
where
    S: RecordSource + ?Sized,
{
    Ok(match dump_records(source, options)? {
        Dumped::Code { code, .. } => Some(code),
        Dumped::Empty | Dumped::File { .. } => None,
    })
}

/// Like [`dump`], but tells an empty source apart from a written file.
///
/// The source is counted once; paging relies on its own look-ahead.
pub fn dump_records<S>(source: &S, options: &DumpOptions) -> DumpResult<Dumped>
where
    S: RecordSource + ?Sized,
{
    options.validate()?;

    let total = source.count(options.limit)?;
    let model = source.model_name();
    if total == 0 {
        debug!(model = %model, "no records, nothing to dump");
        return Ok(Dumped::Empty);
    }

    if options.query.is_some() && !options.migration {
        warn!(model = %model, "guard query is only used for migrations, ignoring it");
    }

    let mut sink = Sink::open(options)?;
    match (&options.file, options.migration) {
        (Some(path), true) => migration::write_migration(source, options, path, &mut sink)?,
        _ => statement::write_statement(source, options, &mut sink, 0)?,
    }

    let output = sink.finish()?;

    match &options.file {
        Some(path) => info!(model = %model, records = total, path = %path.display(), "dumped"),
        None => info!(model = %model, records = total, "dumped"),
    }
    Ok(match output {
        Some(code) => Dumped::Code {
            records: total,
            code,
        },
        None => Dumped::File { records: total },
    })
}
