//! # Report Operations
//!
//! The submodules contain the aggregation operations that turn loaded DataFrames into
//! chart-ready summaries. Every operation is pure: it reads its input frame, never
//! mutates it, and produces a new, smaller result.

pub mod categorical;
pub mod spatial;
pub mod temporal;
