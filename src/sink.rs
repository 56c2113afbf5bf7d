//! Output destinations.
//!
//! A [`Sink`] is either a file (opened for append or truncate) or an in-memory
//! buffer. The file handle is released when the sink is dropped, so every
//! early return or `?` closes it.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};

use tracing::debug;

use crate::error::DumpResult;
use crate::options::DumpOptions;

/// Where generated code is written.
#[derive(Debug)]
pub enum Sink {
    File(BufWriter<File>),
    Memory(Vec<u8>),
}

impl Sink {
    /// Open the destination named by the options, or a fresh buffer.
    pub fn open(options: &DumpOptions) -> DumpResult<Self> {
        match &options.file {
            Some(path) => {
                let mut open = OpenOptions::new();
                if options.append {
                    open.create(true).append(true);
                } else {
                    open.create(true).write(true).truncate(true);
                }
                let file = open.open(path)?;
                debug!(path = %path.display(), append = options.append, "opened destination");
                Ok(Sink::File(BufWriter::new(file)))
            }
            None => Ok(Sink::Memory(Vec::new())),
        }
    }

    /// Flush and close. Returns the text for in-memory sinks.
    pub fn finish(self) -> DumpResult<Option<String>> {
        match self {
            Sink::File(mut writer) => {
                writer.flush()?;
                Ok(None)
            }
            Sink::Memory(buf) => Ok(Some(String::from_utf8_lossy(&buf).into_owned())),
        }
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::File(w) => w.write(buf),
            Sink::Memory(v) => v.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::File(w) => w.flush(),
            Sink::Memory(_) => Ok(()),
        }
    }
}

/// Prefixes every non-empty line with a fixed number of spaces.
pub struct IndentWriter<'a, W: Write + ?Sized> {
    inner: &'a mut W,
    indent: usize,
    at_line_start: bool,
}

impl<'a, W: Write + ?Sized> IndentWriter<'a, W> {
    pub fn new(inner: &'a mut W, indent: usize) -> Self {
        Self {
            inner,
            indent,
            at_line_start: true,
        }
    }

    pub fn write_str(&mut self, text: &str) -> io::Result<()> {
        for line in text.split_inclusive('\n') {
            if self.at_line_start && self.indent > 0 && line != "\n" {
                write!(self.inner, "{:width$}", "", width = self.indent)?;
            }
            self.inner.write_all(line.as_bytes())?;
            self.at_line_start = line.ends_with('\n');
        }
        Ok(())
    }
}
