//! Derived series computed from the historical input.

pub mod change;

pub use change::{
    percent_changes, point_change, PercentChangeSeries, PointChange, ZeroBasePoint,
    MONTH_OVER_MONTH, YEAR_OVER_YEAR,
};
