//! Record sources and batch enumeration.
//!
//! A [`RecordSource`] hands out its records in ordered batches of bounded
//! size and flags the last one. Two strategies implement it:
//!
//! - [`Collection`]: records already in memory, split into consecutive chunks.
//! - [`Paged`]: records behind a [`PagedQuery`], fetched one page at a time so
//!   the full set is never materialized.

use tracing::trace;

use crate::error::{DumpError, DumpResult};
use crate::options::DumpOptions;
use crate::record::{Record, RecordLayout, encode_record};

/// Callback receiving one batch of records and whether it is the last one.
pub type BatchVisitor<'a> = dyn FnMut(&[Record], bool) -> DumpResult<()> + 'a;

/// Anything that can supply records for a dump.
pub trait RecordSource {
    /// Class name used in generated code (e.g. `User`).
    fn model_name(&self) -> String;

    /// Ordered attribute names of the records.
    fn attribute_names(&self) -> DumpResult<Vec<String>>;

    /// Number of records a dump with this `limit` will visit.
    fn count(&self, limit: Option<usize>) -> DumpResult<usize>;

    /// Visit records in source order, `batch_size` at a time.
    ///
    /// Every record is visited exactly once and only the final batch is
    /// flagged. Nothing is visited for an empty source.
    fn each_batch(
        &self,
        batch_size: usize,
        limit: Option<usize>,
        visit: &mut BatchVisitor<'_>,
    ) -> DumpResult<()>;
}

/// A batch of record literals.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedBatch {
    pub records: Vec<String>,
    pub last: bool,
}

/// Drive a source through the record encoder.
pub fn encode_batches<S, F>(
    source: &S,
    options: &DumpOptions,
    layout: RecordLayout<'_>,
    mut emit: F,
) -> DumpResult<()>
where
    S: RecordSource + ?Sized,
    F: FnMut(EncodedBatch) -> DumpResult<()>,
{
    source.each_batch(options.batch_size, options.limit, &mut |records, last| {
        let records = records.iter().map(|r| encode_record(r, layout)).collect();
        emit(EncodedBatch { records, last })
    })
}

fn check_batch_size(batch_size: usize) -> DumpResult<()> {
    if batch_size == 0 {
        return Err(DumpError::config("batch size must be at least 1"));
    }
    Ok(())
}

// ============================================================================
// Bulk enumeration
// ============================================================================

/// An in-memory, already materialized set of records.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    model: String,
    records: Vec<Record>,
}

impl Collection {
    pub fn new(model: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            model: model.into(),
            records,
        }
    }

    /// Read a JSON array of objects. Key order within each object is kept.
    pub fn from_json(model: impl Into<String>, json: &str) -> DumpResult<Self> {
        let parsed: serde_json::Value =
            serde_json::from_str(json).map_err(|e| DumpError::InvalidInput(e.to_string()))?;

        let serde_json::Value::Array(rows) = parsed else {
            return Err(DumpError::InvalidInput(
                "expected a JSON array of objects".to_string(),
            ));
        };

        let mut records = Vec::with_capacity(rows.len());
        for (i, row) in rows.into_iter().enumerate() {
            let serde_json::Value::Object(map) = row else {
                return Err(DumpError::InvalidInput(format!(
                    "element {} is not an object",
                    i
                )));
            };
            records.push(map.into_iter().collect());
        }

        Ok(Self::new(model, records))
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    fn limited(&self, limit: Option<usize>) -> &[Record] {
        match limit {
            Some(n) if n < self.records.len() => &self.records[..n],
            _ => &self.records,
        }
    }
}

impl RecordSource for Collection {
    fn model_name(&self) -> String {
        self.model.clone()
    }

    /// Every attribute name that appears in any record, in first-seen order.
    fn attribute_names(&self) -> DumpResult<Vec<String>> {
        let mut names: Vec<String> = Vec::new();
        for name in self.records.iter().flat_map(Record::attribute_names) {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    fn count(&self, limit: Option<usize>) -> DumpResult<usize> {
        Ok(self.limited(limit).len())
    }

    fn each_batch(
        &self,
        batch_size: usize,
        limit: Option<usize>,
        visit: &mut BatchVisitor<'_>,
    ) -> DumpResult<()> {
        check_batch_size(batch_size)?;
        let records = self.limited(limit);
        let batches = records.len().div_ceil(batch_size);
        for (i, chunk) in records.chunks(batch_size).enumerate() {
            visit(chunk, i + 1 == batches)?;
        }
        Ok(())
    }
}

// ============================================================================
// Paged enumeration
// ============================================================================

/// A query-capable record store that can be read by offset.
pub trait PagedQuery {
    fn model_name(&self) -> String;

    fn attribute_names(&self) -> DumpResult<Vec<String>>;

    /// Total number of matching records.
    fn count(&self) -> DumpResult<usize>;

    /// Up to `limit` records starting at `offset`, in a stable order.
    fn fetch_page(&self, offset: usize, limit: usize) -> DumpResult<Vec<Record>>;
}

/// Enumerates a [`PagedQuery`] page by page.
#[derive(Debug, Clone)]
pub struct Paged<Q> {
    query: Q,
}

impl<Q: PagedQuery> Paged<Q> {
    pub fn new(query: Q) -> Self {
        Self { query }
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    pub fn into_inner(self) -> Q {
        self.query
    }
}

impl<Q: PagedQuery> RecordSource for Paged<Q> {
    fn model_name(&self) -> String {
        self.query.model_name()
    }

    fn attribute_names(&self) -> DumpResult<Vec<String>> {
        self.query.attribute_names()
    }

    fn count(&self, limit: Option<usize>) -> DumpResult<usize> {
        let total = self.query.count()?;
        Ok(limit.map_or(total, |n| total.min(n)))
    }

    fn each_batch(
        &self,
        batch_size: usize,
        limit: Option<usize>,
        visit: &mut BatchVisitor<'_>,
    ) -> DumpResult<()> {
        check_batch_size(batch_size)?;
        let cap = limit.unwrap_or(usize::MAX);
        if cap == 0 {
            return Ok(());
        }

        let mut fetched = 0;
        let mut request = batch_size.min(cap);
        let mut current = self.query.fetch_page(0, request)?;

        // One page of look-ahead so the last batch is flagged without a count
        while !current.is_empty() {
            fetched += current.len();
            let exhausted = current.len() < request || fetched >= cap;
            let next = if exhausted {
                Vec::new()
            } else {
                request = batch_size.min(cap - fetched);
                self.query.fetch_page(fetched, request)?
            };

            trace!(offset = fetched - current.len(), size = current.len(), "page");
            visit(&current, next.is_empty())?;
            current = next;
        }

        Ok(())
    }
}
