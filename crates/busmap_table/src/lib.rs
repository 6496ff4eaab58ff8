//! Bus configuration records and the property tables they are read from.
//!
//! A property table is a two-column `Property,Value` CSV file. Each row is
//! routed through a static dispatch table to a typed handler that fills a
//! [`ConfigRecord`] under construction; the loaded records are collected into
//! a [`RecordSet`] for the validators.

#![warn(missing_docs)]

pub mod builder;
pub mod csv;
pub mod dispatch;
pub mod error;
pub mod loader;
pub mod record;
pub mod set;

pub use builder::RecordBuilder;
pub use csv::{read_rows, PropertyRow, Token};
pub use dispatch::{dispatch, Dispatch, PropertyHandler};
pub use error::TableError;
pub use loader::{load_table, load_table_from_str, load_tables, LoadedTable};
pub use record::{ConfigRecord, Property, PropertySpans, Protocol, RecordKind, Xlen};
pub use set::RecordSet;
