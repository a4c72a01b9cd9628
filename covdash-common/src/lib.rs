//! # covdash common library
//!
//! Everything the dashboard computes, independent of how it is served:
//! - Report/record data model and region field parsing
//! - CSV and remote API loading
//! - Cached base table (`Dataset`) and data quality summary
//! - Increase percentages, merged increase table, province summary
//! - Least-squares regression and chart-ready series
//! - Configuration loading

pub mod charts;
pub mod config;
pub mod countries;
pub mod dataset;
pub mod error;
pub mod increase;
pub mod load;
pub mod model;
pub mod quality;
pub mod region;
pub mod regression;
pub mod summary;

pub use dataset::{Dataset, LoadInfo};
pub use error::{Error, Result};
pub use model::{CaseRecord, Metric, Report};
