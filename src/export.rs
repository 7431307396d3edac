//! CSV export of a beat table.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::analysis::BeatTable;
use crate::error::{ExportError, Result};

pub const CSV_HEADER: &str = "Beat Time (s), Strength";

/// Write one row per beat, in detection order, creating parent directories
pub fn write_csv<P: AsRef<Path>>(table: &BeatTable, path: P) -> Result<()> {
    let path = path.as_ref();
    write_rows(table, path).map_err(|source| ExportError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}

fn write_rows(table: &BeatTable, path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "{}", CSV_HEADER)?;
    for record in table.records() {
        writeln!(writer, "{}, {}", record.time, record.strength)?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use tempfile::tempdir;

    #[test]
    fn test_rows_follow_detection_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("dir").join("beats.csv");
        let table = BeatTable::build(&[1.5, 0.5], &[0.25, 0.75]).unwrap();

        write_csv(&table, &path).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "Beat Time (s), Strength\n1.5, 0.25\n0.5, 0.75\n");
    }

    #[test]
    fn test_empty_table_writes_header_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        write_csv(&BeatTable::default(), &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "Beat Time (s), Strength\n");
    }

    #[test]
    fn test_write_failure_is_export_error() {
        let dir = tempdir().unwrap();
        // The target is an existing directory
        let err = write_csv(&BeatTable::default(), dir.path()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Export);
    }
}
