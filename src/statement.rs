//! Insertion statement composer.
//!
//! Writes one `Model.create!([...])` or `Model.import([...], [...])` call.
//!
//! ```text
//! User.create!([
//!   {name: "Al", age: 5},
//!   {name: "Bo", age: 7}
//! ])
//! ```

use std::io::Write;

use tracing::{debug, warn};

use crate::error::DumpResult;
use crate::literal::symbol_literal;
use crate::options::DumpOptions;
use crate::record::RecordLayout;
use crate::sink::IndentWriter;
use crate::source::{RecordSource, encode_batches};

const RECORD_SEPARATOR: &str = ",\n  ";

/// Write the insertion call for every record of `source`, each line
/// prefixed with `indent` spaces.
pub fn write_statement<S, W>(
    source: &S,
    options: &DumpOptions,
    out: &mut W,
    indent: usize,
) -> DumpResult<()>
where
    S: RecordSource + ?Sized,
    W: Write + ?Sized,
{
    let mut out = IndentWriter::new(out, indent);
    let model = source.model_name();
    let method = if options.is_import() { "import" } else { "create!" };

    out.write_str(&format!("{}.{}(", model, method))?;

    let columns = if options.is_import() {
        let columns = import_columns(source, options)?;
        let symbols: Vec<String> = columns.iter().map(|name| symbol_literal(name)).collect();
        out.write_str(&format!("[{}], ", symbols.join(", ")))?;
        columns
    } else {
        Vec::new()
    };
    let layout = if options.is_import() {
        RecordLayout::Positional { columns: &columns }
    } else {
        RecordLayout::Keyword {
            exclude: &options.exclude,
        }
    };

    out.write_str("[")?;

    let mut batches = 0usize;
    let mut records = 0usize;
    encode_batches(source, options, layout, |batch| {
        if records == 0 {
            out.write_str("\n  ")?;
        }
        out.write_str(&batch.records.join(RECORD_SEPARATOR))?;
        if !batch.last {
            out.write_str(RECORD_SEPARATOR)?;
        }
        batches += 1;
        records += batch.records.len();
        Ok(())
    })?;

    if records == 0 {
        warn!(model = %model, "source returned no records, wrote an empty list");
    }

    let trailer = options
        .import
        .as_ref()
        .map(|import| import.suffix())
        .unwrap_or_default();
    out.write_str(&format!("\n]{})\n", trailer))?;

    debug!(model = %model, method, batches, records, indent, "wrote statement");
    Ok(())
}

/// Columns listed by the import form: every attribute not excluded.
pub fn import_columns<S>(source: &S, options: &DumpOptions) -> DumpResult<Vec<String>>
where
    S: RecordSource + ?Sized,
{
    Ok(source
        .attribute_names()?
        .into_iter()
        .filter(|name| !options.excludes(name))
        .collect())
}
