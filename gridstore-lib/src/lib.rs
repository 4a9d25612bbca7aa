//! Tabular data store engine
//!
//! Holds the state of any number of independent tables keyed by id: raw
//! records, sorting, quick and advanced filtering, pagination and row
//! selection. Tables are driven by [`Action`]s delivered over a synchronous
//! [`bus::Dispatcher`] and report back through `change` / `fail` events.

pub mod action;
pub mod bus;
pub mod config;
pub mod error;
pub mod events;
pub mod fetch;
pub mod model;
pub mod registry;
pub mod store;
pub mod table;

pub use action::Action;
pub use action::RawAction;
pub use action::TableAction;
pub use config::StoreConfig;
pub use error::Error;
pub use store::TableStore;
pub use table::Table;
