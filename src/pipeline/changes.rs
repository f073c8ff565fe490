//! Percent-change tables across all entities.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::core::SeriesTable;
use crate::error::Result;
use crate::features::{percent_changes, PointChange};
use crate::pipeline::assemble::DATE_FORMAT;
use crate::pipeline::report::SkippedPoint;
use crate::utils::round_to;

/// Key of the date field in every record.
pub const DATE_FIELD: &str = "Date";

/// One row: a date and the entities that have a value for it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord {
    pub date: NaiveDate,
    pub values: Vec<(String, f64)>,
}

impl ChangeRecord {
    pub fn get(&self, entity: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(name, _)| name == entity)
            .map(|&(_, v)| v)
    }
}

impl Serialize for ChangeRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry(DATE_FIELD, &self.date.format(DATE_FORMAT).to_string())?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Percent changes over a fixed period for every column of a table.
///
/// Holds one record per date after the first `period` dates. Serializes as
/// a plain array of records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChangeTable {
    records: Vec<ChangeRecord>,
}

impl ChangeTable {
    /// Compute the table, returning the zero-base points that were left out.
    ///
    /// Columns are processed in parallel; values are rounded to `decimals`.
    pub fn compute(
        table: &SeriesTable,
        period: usize,
        decimals: u32,
    ) -> Result<(Self, Vec<SkippedPoint>)> {
        let columns: Vec<(&str, Vec<PointChange>)> = table
            .columns()
            .par_iter()
            .map(|c| Ok((c.name.as_str(), percent_changes(&c.values, period)?)))
            .collect::<Result<_>>()?;

        let dates = table.dates();
        let rows = dates.len().saturating_sub(period);
        let mut records = Vec::with_capacity(rows);
        let mut skipped = Vec::new();

        for k in 0..rows {
            let date = dates[k + period];
            let mut values = Vec::with_capacity(columns.len());
            for (name, changes) in &columns {
                match changes[k] {
                    PointChange::Value(v) => values.push((name.to_string(), round_to(v, decimals))),
                    PointChange::ZeroBase => skipped.push(SkippedPoint {
                        entity: name.to_string(),
                        date,
                        period,
                    }),
                    PointChange::Missing => {}
                }
            }
            records.push(ChangeRecord { date, values });
        }

        Ok((Self { records }, skipped))
    }

    pub fn records(&self) -> &[ChangeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Serialize for ChangeTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.records.serialize(serializer)
    }
}
