//! Collaborator traits for lhetab
//!
//! The conversion pipeline only talks to its input and output through these
//! traits: readers for concrete event formats and stores for concrete table
//! formats live in `lt-io`.

use crate::{EventRow, RawEvent, Result, TableSchema};

/// Forward-only source of events.
pub trait EventSource {
    /// Next complete event, `Ok(None)` once the input is exhausted.
    ///
    /// An `Err` is a fault of the reader and terminates the run.
    fn next_event(&mut self) -> Result<Option<RawEvent>>;
}

/// Event-record store: one row per event, fixed schema.
pub trait RecordSink {
    /// Declare the table layout. Called once, before the first row.
    fn declare(&mut self, schema: &TableSchema) -> Result<()>;

    /// Append one row.
    fn write_row(&mut self, row: &EventRow) -> Result<()>;

    /// Flush and make the output durable. Called once, after the last row.
    fn finalize(&mut self) -> Result<()>;
}

/// Adapter turning any iterator of events into an [`EventSource`].
#[derive(Debug)]
pub struct IterSource<I>(pub I);

impl<I> EventSource for IterSource<I>
where
    I: Iterator<Item = Result<RawEvent>>,
{
    fn next_event(&mut self) -> Result<Option<RawEvent>> {
        self.0.next().transpose()
    }
}

impl<S: EventSource + ?Sized> EventSource for &mut S {
    fn next_event(&mut self) -> Result<Option<RawEvent>> {
        (**self).next_event()
    }
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn declare(&mut self, schema: &TableSchema) -> Result<()> {
        (**self).declare(schema)
    }

    fn write_row(&mut self, row: &EventRow) -> Result<()> {
        (**self).write_row(row)
    }

    fn finalize(&mut self) -> Result<()> {
        (**self).finalize()
    }
}
