//! Monthly series and the table they are ingested into.

use crate::error::{ForecastError, InputError, Result};
use chrono::{Datelike, Months, NaiveDate};

/// Column name reserved for the date index in combined output.
pub const DATES_KEY: &str = "dates";

/// A single entity's monthly observations.
///
/// Dates are strictly increasing and every value is finite. Missing
/// observations are dropped before a `Series` is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl Series {
    /// Create a series, validating alignment, ordering and finiteness.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: dates.len(),
                got: values.len(),
            });
        }

        for i in 1..dates.len() {
            if dates[i] <= dates[i - 1] {
                return Err(ForecastError::TimestampError(
                    "dates must be strictly increasing".to_string(),
                ));
            }
        }

        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::ComputationError(format!(
                "non-finite value at index {pos}"
            )));
        }

        Ok(Self { dates, values })
    }

    /// Build a series from consecutive months starting at `start`.
    pub fn monthly(start: NaiveDate, values: Vec<f64>) -> Result<Self> {
        let dates = month_sequence(start, values.len())?;
        Self::new(dates, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}

/// A named column of the ingested table, aligned to the table's dates.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// Date-indexed table with one column per entity.
///
/// Cells are `None` where the source had no usable number. Column order
/// follows the source header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesTable {
    dates: Vec<NaiveDate>,
    columns: Vec<Column>,
}

impl SeriesTable {
    /// Create a table and check it can feed a run.
    pub fn new(dates: Vec<NaiveDate>, columns: Vec<Column>) -> std::result::Result<Self, InputError> {
        let table = Self { dates, columns };
        table.validate()?;
        Ok(table)
    }

    /// Fatal checks: non-empty, aligned, strictly increasing, unique names.
    pub fn validate(&self) -> std::result::Result<(), InputError> {
        if self.dates.is_empty() {
            return Err(InputError::EmptyTable);
        }
        if self.columns.is_empty() {
            return Err(InputError::NoEntities);
        }

        for i in 1..self.dates.len() {
            if self.dates[i] <= self.dates[i - 1] {
                return Err(InputError::DatesNotIncreasing { index: i });
            }
        }

        let mut seen = std::collections::HashSet::new();
        for column in &self.columns {
            let name = column.name.trim();
            if name.is_empty() || name == DATES_KEY || !seen.insert(name) {
                return Err(InputError::InvalidColumn(column.name.clone()));
            }
            if column.values.len() != self.dates.len() {
                return Err(InputError::Misaligned {
                    entity: column.name.clone(),
                    expected: self.dates.len(),
                    got: column.values.len(),
                });
            }
        }

        Ok(())
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}

/// Drop missing and non-finite cells from an aligned column.
pub fn column_to_series(dates: &[NaiveDate], column: &Column) -> Result<Series> {
    let (dates, values): (Vec<NaiveDate>, Vec<f64>) = dates
        .iter()
        .zip(column.values.iter())
        .filter_map(|(&d, v)| v.filter(|x| x.is_finite()).map(|x| (d, x)))
        .unzip();
    Series::new(dates, values)
}

/// `count` dates starting at `start`, one calendar month apart.
pub fn month_sequence(start: NaiveDate, count: usize) -> Result<Vec<NaiveDate>> {
    (0..count).map(|i| add_months(start, i)).collect()
}

/// The `count` months following `last`, excluding `last` itself.
pub fn months_after(last: NaiveDate, count: usize) -> Result<Vec<NaiveDate>> {
    (1..=count).map(|i| add_months(last, i)).collect()
}

/// Whole calendar months from `from` to `to`, ignoring the day of month.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    i64::from(to.year() - from.year()) * 12 + i64::from(to.month()) - i64::from(from.month())
}

/// Calendar-month offset; end-of-month days clamp to the target month's end.
pub fn add_months(date: NaiveDate, months: usize) -> Result<NaiveDate> {
    let months = u32::try_from(months)
        .map_err(|_| ForecastError::TimestampError(format!("offset of {months} months")))?;
    date.checked_add_months(Months::new(months)).ok_or_else(|| {
        ForecastError::TimestampError(format!("{date} + {months} months is out of range"))
    })
}
