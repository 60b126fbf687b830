//! Parquet species-table store.
//!
//! # Schema: `lhetab_species_table_v1`
//!
//! ## Columns
//!
//! | Column      | Arrow Type            | Description                              |
//! |-------------|-----------------------|------------------------------------------|
//! | `event`     | `UInt64`              | 1-based event ordinal                    |
//! | `weight`    | `Float64`             | Generator event weight                   |
//! | `<species>` | `List<Struct<...>>`   | One column per catalog species, pT-sorted |
//!
//! The struct fields are the [`ParticleRecord`] fields, in declaration order.
//!
//! ## Parquet key-value metadata
//!
//! | Key                     | Value                                   |
//! |-------------------------|-----------------------------------------|
//! | `lhetab.schema_version` | `"lhetab_species_table_v1"`             |
//! | `lhetab.species`        | JSON array of species column names      |
//! | `lhetab.capacity`       | Maximum list length per species per row |
//!
//! A file is only readable once [`RecordSink::finalize`] has written the
//! footer; an interrupted conversion leaves an invalid file behind.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, AsArray, Float64Array, Int32Array, ListArray, StructArray, UInt64Array,
};
use arrow::buffer::{OffsetBuffer, ScalarBuffer};
use arrow::datatypes::{
    DataType, Field, FieldRef, Fields, Float64Type, Int32Type, Schema, SchemaRef, UInt64Type,
};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::arrow::ProjectionMask;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use lt_core::{Error, EventRow, ParticleRecord, RecordSink, Result, TableSchema};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Schema version string embedded in Parquet key-value metadata.
pub const SPECIES_TABLE_SCHEMA_V1: &str = "lhetab_species_table_v1";

/// Parquet metadata key for the schema version.
pub const META_KEY_SCHEMA_VERSION: &str = "lhetab.schema_version";

/// Parquet metadata key for the species column names (JSON).
pub const META_KEY_SPECIES: &str = "lhetab.species";

/// Parquet metadata key for the per-row capacity.
pub const META_KEY_CAPACITY: &str = "lhetab.capacity";

/// Event ordinal column.
pub const EVENT_COLUMN: &str = "event";

/// Event weight column.
pub const WEIGHT_COLUMN: &str = "weight";

/// Rows buffered before a record batch is written.
pub const DEFAULT_BATCH_ROWS: usize = 1024;

/// Position of the first species column.
const FIRST_SPECIES_COLUMN: usize = 2;

// ---------------------------------------------------------------------------
// Particle struct layout
// ---------------------------------------------------------------------------

enum ParticleColumn {
    Int(&'static str, fn(&ParticleRecord) -> i32, fn(&mut ParticleRecord, i32)),
    Float(&'static str, fn(&ParticleRecord) -> f64, fn(&mut ParticleRecord, f64)),
}

const PARTICLE_COLUMNS: [ParticleColumn; 19] = [
    ParticleColumn::Int("pdg_id", |p| p.pdg_id, |p, v| p.pdg_id = v),
    ParticleColumn::Int("pdg_id_mother1", |p| p.pdg_id_mother1, |p, v| p.pdg_id_mother1 = v),
    ParticleColumn::Int("pdg_id_mother2", |p| p.pdg_id_mother2, |p, v| p.pdg_id_mother2 = v),
    ParticleColumn::Int("status", |p| p.status, |p, v| p.status = v),
    ParticleColumn::Float("px", |p| p.px, |p, v| p.px = v),
    ParticleColumn::Float("py", |p| p.py, |p, v| p.py = v),
    ParticleColumn::Float("pz", |p| p.pz, |p, v| p.pz = v),
    ParticleColumn::Float("energy", |p| p.energy, |p, v| p.energy = v),
    ParticleColumn::Float("mass", |p| p.mass, |p, v| p.mass = v),
    ParticleColumn::Float("pt", |p| p.pt, |p, v| p.pt = v),
    ParticleColumn::Float("eta", |p| p.eta, |p, v| p.eta = v),
    ParticleColumn::Float("phi", |p| p.phi, |p, v| p.phi = v),
    ParticleColumn::Float("charge", |p| p.charge, |p, v| p.charge = v),
    ParticleColumn::Int("mother1", |p| p.mother1, |p, v| p.mother1 = v),
    ParticleColumn::Int("mother2", |p| p.mother2, |p, v| p.mother2 = v),
    ParticleColumn::Int("color1", |p| p.color1, |p, v| p.color1 = v),
    ParticleColumn::Int("color2", |p| p.color2, |p, v| p.color2 = v),
    ParticleColumn::Float("lifetime", |p| p.lifetime, |p, v| p.lifetime = v),
    ParticleColumn::Int("helicity", |p| p.helicity, |p, v| p.helicity = v),
];

impl ParticleColumn {
    fn field(&self) -> Field {
        match self {
            ParticleColumn::Int(name, ..) => Field::new(*name, DataType::Int32, false),
            ParticleColumn::Float(name, ..) => Field::new(*name, DataType::Float64, false),
        }
    }

    fn build(&self, particles: &[&ParticleRecord]) -> ArrayRef {
        match self {
            ParticleColumn::Int(_, get, _) => {
                Arc::new(Int32Array::from_iter_values(particles.iter().map(|p| get(p))))
            }
            ParticleColumn::Float(_, get, _) => {
                Arc::new(Float64Array::from_iter_values(particles.iter().map(|p| get(p))))
            }
        }
    }

    fn fill(&self, values: &StructArray, out: &mut [ParticleRecord]) -> Result<()> {
        match self {
            ParticleColumn::Int(name, _, set) => {
                let col = values
                    .column_by_name(name)
                    .and_then(|c| c.as_primitive_opt::<Int32Type>())
                    .ok_or_else(|| Error::Store(format!("missing Int32 particle field '{name}'")))?;
                for (p, v) in out.iter_mut().zip(col.values().iter()) {
                    set(p, *v);
                }
            }
            ParticleColumn::Float(name, _, set) => {
                let col = values
                    .column_by_name(name)
                    .and_then(|c| c.as_primitive_opt::<Float64Type>())
                    .ok_or_else(|| Error::Store(format!("missing Float64 particle field '{name}'")))?;
                for (p, v) in out.iter_mut().zip(col.values().iter()) {
                    set(p, *v);
                }
            }
        }
        Ok(())
    }
}

fn particle_fields() -> Fields {
    PARTICLE_COLUMNS.iter().map(ParticleColumn::field).collect::<Vec<_>>().into()
}

fn particle_item_field() -> FieldRef {
    Arc::new(Field::new_list_field(DataType::Struct(particle_fields()), false))
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Arrow schema (with key-value metadata) for a species table.
pub fn species_table_schema(schema: &TableSchema) -> Result<SchemaRef> {
    let mut fields = vec![
        Field::new(EVENT_COLUMN, DataType::UInt64, false),
        Field::new(WEIGHT_COLUMN, DataType::Float64, false),
    ];
    for name in &schema.species {
        if name == EVENT_COLUMN || name == WEIGHT_COLUMN {
            return Err(Error::Validation(format!("species name '{name}' is a reserved column")));
        }
        fields.push(Field::new(name, DataType::List(particle_item_field()), false));
    }

    let species_json = serde_json::to_string(&schema.species)?;
    let metadata = HashMap::from([
        (META_KEY_SCHEMA_VERSION.to_string(), SPECIES_TABLE_SCHEMA_V1.to_string()),
        (META_KEY_SPECIES.to_string(), species_json),
        (META_KEY_CAPACITY.to_string(), schema.capacity.to_string()),
    ]);
    Ok(Arc::new(Schema::new(fields).with_metadata(metadata)))
}

/// Recover the [`TableSchema`] from a species table's key-value metadata.
pub fn table_schema_from_metadata(schema: &Schema) -> Result<TableSchema> {
    let meta = schema.metadata();
    match meta.get(META_KEY_SCHEMA_VERSION) {
        Some(v) if v == SPECIES_TABLE_SCHEMA_V1 => {}
        Some(v) => {
            return Err(Error::Store(format!("unsupported species table schema version '{v}'")));
        }
        None => return Err(Error::Store(format!("missing {META_KEY_SCHEMA_VERSION} metadata"))),
    }

    let species: Vec<String> = meta
        .get(META_KEY_SPECIES)
        .ok_or_else(|| Error::Store(format!("missing {META_KEY_SPECIES} metadata")))
        .and_then(|s| {
            serde_json::from_str(s)
                .map_err(|e| Error::Store(format!("invalid {META_KEY_SPECIES} metadata: {e}")))
        })?;
    let capacity: usize = meta
        .get(META_KEY_CAPACITY)
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Error::Store(format!("missing or invalid {META_KEY_CAPACITY} metadata")))?;

    for name in &species {
        if schema.column_with_name(name).is_none() {
            return Err(Error::Store(format!("species column '{name}' listed in metadata is missing")));
        }
    }
    TableSchema::new(species, capacity)
}

// ---------------------------------------------------------------------------
// Rows <-> RecordBatch
// ---------------------------------------------------------------------------

fn species_array(rows: &[EventRow], species: usize) -> Result<ArrayRef> {
    let mut offsets = Vec::with_capacity(rows.len() + 1);
    offsets.push(0_i32);
    let mut flat: Vec<&ParticleRecord> = Vec::new();
    for row in rows {
        flat.extend(&row.species[species]);
        let end = i32::try_from(flat.len())
            .map_err(|_| Error::Store("species list offsets overflow a record batch".into()))?;
        offsets.push(end);
    }

    let children: Vec<ArrayRef> = PARTICLE_COLUMNS.iter().map(|c| c.build(&flat)).collect();
    let values = StructArray::try_new(particle_fields(), children, None)
        .map_err(|e| Error::Store(format!("failed to build particle struct array: {e}")))?;
    let list = ListArray::try_new(
        particle_item_field(),
        OffsetBuffer::new(ScalarBuffer::from(offsets)),
        Arc::new(values),
        None,
    )
    .map_err(|e| Error::Store(format!("failed to build species list array: {e}")))?;
    Ok(Arc::new(list))
}

/// Build one record batch from validated rows.
pub fn rows_to_record_batch(
    arrow_schema: &SchemaRef,
    schema: &TableSchema,
    rows: &[EventRow],
) -> Result<RecordBatch> {
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(FIRST_SPECIES_COLUMN + schema.species.len());
    columns.push(Arc::new(UInt64Array::from_iter_values(rows.iter().map(|r| r.event))));
    columns.push(Arc::new(Float64Array::from_iter_values(rows.iter().map(|r| r.weight))));
    for s in 0..schema.species.len() {
        columns.push(species_array(rows, s)?);
    }
    RecordBatch::try_new(arrow_schema.clone(), columns)
        .map_err(|e| Error::Store(format!("failed to build RecordBatch: {e}")))
}

fn decode_species(column: &ArrayRef, name: &str) -> Result<Vec<Vec<ParticleRecord>>> {
    let list = column
        .as_list_opt::<i32>()
        .ok_or_else(|| Error::Store(format!("species column '{name}' is not a list")))?;
    let values = list
        .values()
        .as_struct_opt()
        .ok_or_else(|| Error::Store(format!("species column '{name}' does not hold structs")))?;

    let mut flat = vec![ParticleRecord::default(); values.len()];
    for c in &PARTICLE_COLUMNS {
        c.fill(values, &mut flat)?;
    }
    Ok(list
        .value_offsets()
        .windows(2)
        .map(|w| flat[w[0] as usize..w[1] as usize].to_vec())
        .collect())
}

/// Decode a record batch of a species table back into rows.
pub fn record_batch_to_rows(batch: &RecordBatch, schema: &TableSchema) -> Result<Vec<EventRow>> {
    let events = batch
        .column_by_name(EVENT_COLUMN)
        .and_then(|c| c.as_primitive_opt::<UInt64Type>())
        .ok_or_else(|| Error::Store(format!("missing UInt64 column '{EVENT_COLUMN}'")))?;
    let weights = batch
        .column_by_name(WEIGHT_COLUMN)
        .and_then(|c| c.as_primitive_opt::<Float64Type>())
        .ok_or_else(|| Error::Store(format!("missing Float64 column '{WEIGHT_COLUMN}'")))?;

    let mut rows: Vec<EventRow> = events
        .values()
        .iter()
        .zip(weights.values().iter())
        .map(|(&event, &weight)| EventRow { event, weight, species: Vec::new() })
        .collect();
    for name in &schema.species {
        let column = batch
            .column_by_name(name)
            .ok_or_else(|| Error::Store(format!("missing species column '{name}'")))?;
        for (row, list) in rows.iter_mut().zip(decode_species(column, name)?) {
            row.species.push(list);
        }
    }
    Ok(rows)
}

fn default_compression() -> Compression {
    Compression::SNAPPY
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

struct OpenTable {
    schema: TableSchema,
    arrow_schema: SchemaRef,
    writer: ArrowWriter<File>,
    pending: Vec<EventRow>,
}

impl OpenTable {
    fn flush(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let batch = rows_to_record_batch(&self.arrow_schema, &self.schema, &self.pending)?;
        self.writer
            .write(&batch)
            .map_err(|e| Error::Store(format!("failed to write Parquet: {e}")))?;
        self.pending.clear();
        Ok(())
    }
}

/// [`RecordSink`] writing a species table to a Parquet file.
///
/// Rows are buffered and written every `batch_rows` rows.
pub struct ParquetSink {
    path: PathBuf,
    batch_rows: usize,
    file: Option<File>,
    table: Option<OpenTable>,
    rows_written: u64,
    finalized: bool,
}

impl ParquetSink {
    /// Create (or truncate) the output file.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .map_err(|e| Error::Store(format!("failed to create {}: {e}", path.display())))?;
        Ok(Self {
            path: path.to_path_buf(),
            batch_rows: DEFAULT_BATCH_ROWS,
            file: Some(file),
            table: None,
            rows_written: 0,
            finalized: false,
        })
    }

    /// Rows per record batch (at least 1).
    pub fn with_batch_rows(mut self, batch_rows: usize) -> Self {
        self.batch_rows = batch_rows.max(1);
        self
    }

    /// Output path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows accepted so far (buffered rows included).
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }
}

impl RecordSink for ParquetSink {
    fn declare(&mut self, schema: &TableSchema) -> Result<()> {
        let file = self
            .file
            .take()
            .ok_or_else(|| Error::Store(format!("{}: schema already declared", self.path.display())))?;
        let arrow_schema = species_table_schema(schema)?;
        let props = WriterProperties::builder().set_compression(default_compression()).build();
        let writer = ArrowWriter::try_new(file, arrow_schema.clone(), Some(props))
            .map_err(|e| Error::Store(format!("failed to create Parquet writer: {e}")))?;
        tracing::debug!(
            path = %self.path.display(),
            species = schema.species.len(),
            "species table declared"
        );
        self.table = Some(OpenTable {
            schema: schema.clone(),
            arrow_schema,
            writer,
            pending: Vec::with_capacity(self.batch_rows),
        });
        Ok(())
    }

    fn write_row(&mut self, row: &EventRow) -> Result<()> {
        if self.finalized {
            return Err(Error::Store(format!("{}: write after finalize", self.path.display())));
        }
        let table = self
            .table
            .as_mut()
            .ok_or_else(|| Error::Store(format!("{}: write before declare", self.path.display())))?;
        table.schema.check_row(row)?;
        table.pending.push(row.clone());
        self.rows_written += 1;
        if table.pending.len() >= self.batch_rows {
            table.flush()?;
        }
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Err(Error::Store(format!("{}: already finalized", self.path.display())));
        }
        let mut table = self
            .table
            .take()
            .ok_or_else(|| Error::Store(format!("{}: finalize before declare", self.path.display())))?;
        table.flush()?;
        table
            .writer
            .close()
            .map_err(|e| Error::Store(format!("failed to close Parquet writer: {e}")))?;
        self.finalized = true;
        tracing::debug!(path = %self.path.display(), rows = self.rows_written, "species table finalized");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

fn reader_builder(path: &Path) -> Result<ParquetRecordBatchReaderBuilder<File>> {
    let file = File::open(path)
        .map_err(|e| Error::Store(format!("failed to open {}: {e}", path.display())))?;
    ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| Error::Store(format!("failed to read Parquet {}: {e}", path.display())))
}

/// Reads a finalized species table back.
#[derive(Debug, Clone)]
pub struct ParquetTableReader {
    path: PathBuf,
    schema: TableSchema,
    num_rows: u64,
}

impl ParquetTableReader {
    /// Open a table and validate its metadata.
    pub fn open(path: &Path) -> Result<Self> {
        let builder = reader_builder(path)?;
        let schema = table_schema_from_metadata(builder.schema())?;
        let num_rows = u64::try_from(builder.metadata().file_metadata().num_rows()).unwrap_or(0);
        Ok(Self { path: path.to_path_buf(), schema, num_rows })
    }

    /// Species columns and capacity.
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Row count from the file footer.
    pub fn num_rows(&self) -> u64 {
        self.num_rows
    }

    /// Every row, in file order.
    pub fn read_rows(&self) -> Result<Vec<EventRow>> {
        let reader = reader_builder(&self.path)?
            .build()
            .map_err(|e| Error::Store(format!("failed to build Parquet reader: {e}")))?;
        let mut rows = Vec::new();
        for batch in reader {
            let batch =
                batch.map_err(|e| Error::Store(format!("failed to read Parquet batch: {e}")))?;
            rows.extend(record_batch_to_rows(&batch, &self.schema)?);
        }
        Ok(rows)
    }

    /// One species column, one list per row. Only that column is decoded.
    pub fn read_species(&self, species: &str) -> Result<Vec<Vec<ParticleRecord>>> {
        let idx = self
            .schema
            .index_of(species)
            .ok_or_else(|| Error::Validation(format!("no species column '{species}'")))?;
        let builder = reader_builder(&self.path)?;
        let mask = ProjectionMask::roots(builder.parquet_schema(), [FIRST_SPECIES_COLUMN + idx]);
        let reader = builder
            .with_projection(mask)
            .build()
            .map_err(|e| Error::Store(format!("failed to build Parquet reader: {e}")))?;

        let mut lists = Vec::new();
        for batch in reader {
            let batch =
                batch.map_err(|e| Error::Store(format!("failed to read Parquet batch: {e}")))?;
            lists.extend(decode_species(batch.column(0), species)?);
        }
        Ok(lists)
    }
}
