//! JSON record readers.
//!
//! A file holds either one record object or an array of records.

use crate::{Error, Result};
use reflbin_core::MeasurementRecord;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

#[derive(Deserialize)]
#[serde(untagged)]
enum RecordFile {
    Many(Vec<MeasurementRecord>),
    One(Box<MeasurementRecord>),
}

impl From<RecordFile> for Vec<MeasurementRecord> {
    fn from(file: RecordFile) -> Self {
        match file {
            RecordFile::Many(records) => records,
            RecordFile::One(record) => vec![*record],
        }
    }
}

/// Reads records from any reader.
///
/// # Errors
/// Returns an error if the input is not valid record JSON.
pub fn read_records_from<R: Read>(reader: R) -> Result<Vec<MeasurementRecord>> {
    let file: RecordFile = serde_json::from_reader(reader)?;
    Ok(file.into())
}

/// Reads records from a JSON string.
///
/// # Errors
/// Returns an error if the string is not valid record JSON.
pub fn read_records_str(json: &str) -> Result<Vec<MeasurementRecord>> {
    let file: RecordFile = serde_json::from_str(json)?;
    Ok(file.into())
}

/// Reads records from a JSON file.
///
/// # Errors
/// Returns an error if the file cannot be opened, is not valid record JSON,
/// or holds an empty array.
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<MeasurementRecord>> {
    let file = File::open(&path)?;
    let records = read_records_from(BufReader::new(file))?;
    if records.is_empty() {
        return Err(Error::NoRecords(path.as_ref().display().to_string()));
    }
    Ok(records)
}
