//! Data model types
//!
//! This module contains the types that make up a table: dynamic cell values,
//! records, column and table definitions, and filter/pagination state.

mod column;
mod definition;
mod filter;
mod page;
mod record;
mod record_serde;
mod value;

pub use column::*;
pub use definition::*;
pub use filter::*;
pub use page::*;
pub use record::*;
pub use value::*;
