//! Export of suggestion results for consultation records.

mod report;

pub use report::*;
