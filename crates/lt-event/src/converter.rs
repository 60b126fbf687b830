//! Event loop: classify → sort → cap → emit, one row per input event.

use lt_core::{Error, EventRow, EventSource, RawEvent, RecordSink, Result, TableSchema};
use serde::Serialize;

use crate::catalog::SpeciesCatalog;
use crate::classify::{ClassificationTally, Classifier};
use crate::config::{ConverterConfig, OverflowPolicy};
use crate::sort::sort_by_pt;

const PROGRESS_EVERY: u64 = 100_000;

/// What happened to one event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventReport {
    /// 1-based event ordinal.
    pub event: u64,
    /// Particle outcomes of this event.
    pub tally: ClassificationTally,
    /// Particles dropped by [`OverflowPolicy::Truncate`].
    pub truncated: usize,
}

/// Totals of a conversion run.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ConversionSummary {
    /// Events pulled from the source.
    pub events_read: u64,
    /// Rows handed to the sink.
    pub rows_written: u64,
    /// Events refused by [`OverflowPolicy::Reject`].
    pub events_rejected: u64,
    /// Particle outcomes over written rows.
    pub particles: ClassificationTally,
    /// Particles dropped by [`OverflowPolicy::Truncate`].
    pub particles_truncated: u64,
    /// Particles written per species, catalog order.
    pub species_counts: Vec<(String, u64)>,
}

/// Drives a [`RecordSink`] from raw events.
///
/// The output schema is every catalog species, declared once at construction,
/// so a species first seen late in the run still has a (possibly empty) list
/// in every row.
pub struct Converter<'a, S: RecordSink> {
    catalog: &'a SpeciesCatalog,
    config: ConverterConfig,
    schema: TableSchema,
    sink: S,
    summary: ConversionSummary,
}

impl<'a, S: RecordSink> Converter<'a, S> {
    /// Validate the configuration and declare the schema to `sink`.
    pub fn new(catalog: &'a SpeciesCatalog, config: ConverterConfig, mut sink: S) -> Result<Self> {
        config.validate()?;
        if catalog.is_empty() {
            return Err(Error::Validation("species catalog is empty".into()));
        }
        let schema = TableSchema::new(catalog.species_names(), config.capacity)?;
        sink.declare(&schema)?;

        tracing::info!(
            species = schema.species.len(),
            capacity = schema.capacity,
            overflow = ?config.overflow,
            "reading {} state particles",
            config.describe_statuses()
        );

        let summary = ConversionSummary {
            species_counts: schema.species.iter().map(|s| (s.clone(), 0)).collect(),
            ..Default::default()
        };
        Ok(Self { catalog, config, schema, sink, summary })
    }

    /// Declared output schema.
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Running totals.
    pub fn summary(&self) -> &ConversionSummary {
        &self.summary
    }

    /// Process one event and write its row.
    ///
    /// Under [`OverflowPolicy::Reject`] an over-full species returns
    /// [`Error::CapacityExceeded`] and no row is written; the converter
    /// remains usable for the next event.
    pub fn push_event(&mut self, event: &RawEvent) -> Result<EventReport> {
        self.summary.events_read += 1;
        let ordinal = self.summary.events_read;

        let mut groups = Classifier::new(self.catalog, &self.config).classify(event);
        let tally = *groups.tally();

        for bucket in groups.buckets_mut() {
            if bucket.len() > 1 {
                sort_by_pt(bucket);
            }
        }

        let capacity = self.schema.capacity;
        let mut truncated = 0;
        for (name, bucket) in self.schema.species.iter().zip(groups.buckets_mut()) {
            if bucket.len() <= capacity {
                continue;
            }
            match self.config.overflow {
                OverflowPolicy::Reject => {
                    self.summary.events_rejected += 1;
                    return Err(Error::CapacityExceeded {
                        event: ordinal,
                        species: name.clone(),
                        count: bucket.len(),
                        capacity,
                    });
                }
                OverflowPolicy::Truncate => {
                    let dropped = bucket.len() - capacity;
                    tracing::warn!(
                        event = ordinal,
                        species = %name,
                        dropped,
                        capacity,
                        "species list truncated to row capacity"
                    );
                    bucket.truncate(capacity);
                    truncated += dropped;
                }
            }
        }
        self.summary.particles_truncated += truncated as u64;

        let row = EventRow { event: ordinal, weight: event.weight, species: groups.into_buckets() };
        self.sink.write_row(&row)?;
        self.summary.rows_written += 1;
        self.summary.particles.merge(&tally);
        for ((_, count), list) in self.summary.species_counts.iter_mut().zip(&row.species) {
            *count += list.len() as u64;
        }

        if ordinal % PROGRESS_EVERY == 0 {
            tracing::info!(events = ordinal, "events processed");
        }
        Ok(EventReport { event: ordinal, tally, truncated })
    }

    /// Pull events until the source is exhausted (or `max_events` is reached).
    ///
    /// An event refused for capacity is skipped and counted in
    /// [`ConversionSummary::events_rejected`]. Reader and store faults stop the
    /// run and leave the sink unfinalized.
    pub fn run<E: EventSource>(&mut self, source: &mut E, max_events: Option<u64>) -> Result<()> {
        while max_events.is_none_or(|max| self.summary.events_read < max) {
            let Some(event) = source.next_event()? else {
                break;
            };
            match self.push_event(&event) {
                Ok(_) => {}
                Err(Error::CapacityExceeded { event, species, count, capacity }) => {
                    tracing::warn!(event, species = %species, count, capacity, "event rejected");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Finalize the sink and return the run totals with the sink.
    pub fn finish(mut self) -> Result<(ConversionSummary, S)> {
        self.sink.finalize()?;
        tracing::info!(
            events = self.summary.events_read,
            rows = self.summary.rows_written,
            rejected = self.summary.events_rejected,
            accepted = self.summary.particles.accepted,
            unknown_type = self.summary.particles.unknown_type,
            status_rejected = self.summary.particles.status_rejected,
            truncated = self.summary.particles_truncated,
            "conversion finished"
        );
        Ok((self.summary, self.sink))
    }
}
