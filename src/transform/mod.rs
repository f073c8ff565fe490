//! Data transformations applied around model fitting.
//!
//! # Example
//!
//! ```
//! use price_outlook::transform::{inv_log_transform, log_transform};
//!
//! let series = vec![100.0, 105.0, 110.25];
//! let logged = log_transform(&series).unwrap();
//! let restored = inv_log_transform(&logged);
//! assert!((restored[2] - 110.25).abs() < 1e-9);
//! ```

pub mod log;

pub use log::{inv_log_transform, log_transform};
