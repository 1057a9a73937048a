//! # System Module
//!
//! Whole-snapshot summaries computed through the selectors.

mod metrics;

pub use metrics::*;
