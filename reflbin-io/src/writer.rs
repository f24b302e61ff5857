//! File writers for reduced reflectivity.

use crate::Result;
use reflbin_core::{Column, MeasurementRecord};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Output layout chosen from the file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Full records as JSON.
    Json,
    /// Whitespace separated `Q dQ R dR` columns.
    Columns,
}

impl OutputFormat {
    /// `.json` selects JSON, anything else the column text format.
    #[must_use]
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Columns,
        }
    }
}

/// Writer for reduced records.
pub struct RecordWriter<W: Write> {
    writer: BufWriter<W>,
}

impl RecordWriter<File> {
    /// Creates a new file writer.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(file))
    }
}

impl<W: Write> RecordWriter<W> {
    /// Wraps any writer.
    #[must_use]
    pub fn new(inner: W) -> Self {
        Self {
            writer: BufWriter::new(inner),
        }
    }

    /// Writes records as JSON: one object for a single record, otherwise
    /// an array.
    pub fn write_json(&mut self, records: &[MeasurementRecord]) -> Result<()> {
        match records {
            [record] => serde_json::to_writer_pretty(&mut self.writer, record)?,
            _ => serde_json::to_writer_pretty(&mut self.writer, records)?,
        }
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Writes each record as a `# name` comment, a column header and one
    /// `Q dQ R dR` line per point. Records are separated by a blank line.
    pub fn write_columns(&mut self, records: &[MeasurementRecord]) -> Result<()> {
        for (k, data) in records.iter().enumerate() {
            if k > 0 {
                writeln!(self.writer)?;
            }
            let q = data.q_values()?;
            let dq = data.dq_values()?;
            let v = data.column(Column::Intensity)?;
            let dv = data.column(Column::IntensityError)?;
            writeln!(self.writer, "# {}", data.label())?;
            writeln!(self.writer, "# Q dQ R dR")?;
            for i in 0..data.points() {
                writeln!(
                    self.writer,
                    "{:.10e} {:.10e} {:.10e} {:.10e}",
                    q[i], dq[i], v[i], dv[i]
                )?;
            }
        }

        self.writer.flush()?;
        Ok(())
    }

    /// Writes in the given format.
    pub fn write(&mut self, records: &[MeasurementRecord], format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Json => self.write_json(records),
            OutputFormat::Columns => self.write_columns(records),
        }
    }

    /// Flushes the writer.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Writes records to `path`, picking the format from its extension.
pub fn write_records<P: AsRef<Path>>(path: P, records: &[MeasurementRecord]) -> Result<()> {
    let format = OutputFormat::from_path(&path);
    RecordWriter::create(path)?.write(records, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read_records;
    use tempfile::{tempdir, NamedTempFile};

    fn record() -> MeasurementRecord {
        MeasurementRecord {
            q: Some(vec![0.01, 0.02]),
            dq: Some(vec![0.0001, 0.0002]),
            v: vec![0.9, 0.05],
            dv: vec![0.01, 0.002],
            ..MeasurementRecord::new("d2o")
        }
    }

    #[test]
    fn test_write_columns() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = RecordWriter::create(file.path()).unwrap();
        writer.write_columns(&[record()]).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "# d2o");
        assert_eq!(lines[1], "# Q dQ R dR");
        assert_eq!(lines.len(), 4);
        let row: Vec<f64> = lines[2]
            .split_whitespace()
            .map(|x| x.parse().unwrap())
            .collect();
        assert_eq!(row.len(), 4);
        assert!((row[0] - 0.01).abs() < 1e-12);
        assert!((row[3] - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_columns_reject_bad_lengths() {
        let mut data = record();
        data.dq = Some(vec![0.1, 0.2, 0.3]);
        let mut writer = RecordWriter::new(Vec::new());
        assert!(writer.write_columns(&[data]).is_err());
    }

    #[test]
    fn test_columns_broadcast_scalar_uncertainty() {
        let mut data = record();
        data.dv = vec![0.01];
        let mut buffer = Vec::new();
        RecordWriter::new(&mut buffer).write_columns(&[data]).unwrap();

        let content = String::from_utf8(buffer).unwrap();
        let rows: Vec<Vec<f64>> = content
            .lines()
            .skip(2)
            .map(|line| line.split_whitespace().map(|x| x.parse().unwrap()).collect())
            .collect();
        assert_eq!(rows.len(), 2);
        assert!((rows[1][2] - 0.05).abs() < 1e-12);
        assert!((rows[1][3] - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_json_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_records(&path, &[record()]).unwrap();
        let records = read_records(&path).unwrap();
        assert_eq!(records, vec![record()]);

        write_records(&path, &[record(), record()]).unwrap();
        assert_eq!(read_records(&path).unwrap().len(), 2);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(OutputFormat::from_path("a/b.JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path("refl.dat"), OutputFormat::Columns);
        assert_eq!(OutputFormat::from_path("refl"), OutputFormat::Columns);
    }
}
