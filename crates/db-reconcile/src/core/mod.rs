//! Core data model: scalar values and tabular result sets.

pub mod table;
pub mod value;

pub use table::{Row, Table};
pub use value::Value;
