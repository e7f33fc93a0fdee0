//! Livestock weighing analysis: average daily weight gain per animal from
//! a CSV or spreadsheet of weighings, with pasture / age / sex filters and
//! CSV export.

pub mod data;
pub mod error;
pub mod state;
