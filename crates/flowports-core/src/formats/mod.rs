//! # Formats Module
//!
//! Binary snapshot interchange. Pure transformations: file I/O lives in the
//! app layer.

mod persistence;

pub use persistence::*;
