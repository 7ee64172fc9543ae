//! Transformation module.
//!
//! This module turns source data into output records:
//! - Mapping: Field-mapping table, display types and derived fields
//! - Pipeline: Person assembly and the retrieve / generate commands

pub mod mapping;
pub mod pipeline;

pub use mapping::*;
pub use pipeline::*;
