//! In-memory event-record store.

use lt_core::{Error, EventRow, RecordSink, Result, TableSchema};

/// Keeps every written row in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    schema: Option<TableSchema>,
    rows: Vec<EventRow>,
    finalized: bool,
}

impl MemorySink {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declared schema, if any.
    pub fn schema(&self) -> Option<&TableSchema> {
        self.schema.as_ref()
    }

    /// Rows written so far.
    pub fn rows(&self) -> &[EventRow] {
        &self.rows
    }

    /// `true` once [`RecordSink::finalize`] ran.
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }
}

impl RecordSink for MemorySink {
    fn declare(&mut self, schema: &TableSchema) -> Result<()> {
        if self.schema.is_some() {
            return Err(Error::Store("schema already declared".into()));
        }
        self.schema = Some(schema.clone());
        Ok(())
    }

    fn write_row(&mut self, row: &EventRow) -> Result<()> {
        let schema =
            self.schema.as_ref().ok_or_else(|| Error::Store("write before declare".into()))?;
        if self.finalized {
            return Err(Error::Store("write after finalize".into()));
        }
        schema.check_row(row)?;
        self.rows.push(row.clone());
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Err(Error::Store("store already finalized".into()));
        }
        self.finalized = true;
        Ok(())
    }
}
