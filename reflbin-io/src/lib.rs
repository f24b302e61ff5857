//! reflbin-io: Record files for reflbin.
//!
//! This crate reads measurement records from JSON and writes reduced
//! records either as JSON or as plain `Q dQ R dR` columns.
//!

mod error;
mod reader;
mod writer;

pub use error::{Error, Result};
pub use reader::{read_records, read_records_from, read_records_str};
pub use writer::{write_records, OutputFormat, RecordWriter};
