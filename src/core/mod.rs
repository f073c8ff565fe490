//! Core data structures for monthly series forecasting.

mod forecast;
mod time_series;

pub use forecast::Forecast;
pub use time_series::{
    add_months, column_to_series, month_sequence, months_after, months_between, Column, Series,
    SeriesTable, DATES_KEY,
};
