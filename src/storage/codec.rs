//! Delimited-text encoding of a [`Table`]: one header record with the
//! column names in declared order, then one record per row.
//!
//! Quoting follows the usual CSV rules (the `csv` crate's defaults), so
//! values holding commas, quotes or line breaks survive a round trip.

use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use snafu::prelude::*;

use super::{Row, Table};
use crate::error::{
    DecodeSnafu, IoSnafu, MalformedHeaderSnafu, NotFoundSnafu, Result, WriteSnafu,
};

/// Creates or truncates `path` and writes the whole table to it.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .from_path(path)
        .context(WriteSnafu { path })?;
    writer
        .write_record(table.columns().iter().map(|c| c.as_str()))
        .context(WriteSnafu { path })?;
    for row in table.rows() {
        writer
            .write_record(table.record(row))
            .context(WriteSnafu { path })?;
    }
    writer.flush().context(IoSnafu { path })
}

/// Reads a table back from `path`. The result is not attached to any
/// database.
pub fn read_table(path: &Path, name: &str) -> Result<Table> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return NotFoundSnafu { path }.fail(),
        Err(e) => return Err(e).context(IoSnafu { path }),
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(file);
    let mut records = reader.records();

    let header = match records.next() {
        Some(record) => record.context(DecodeSnafu { path })?,
        None => return NotFoundSnafu { path }.fail(),
    };
    let mut table = Table::new(name, header.iter()).map_err(|e| {
        MalformedHeaderSnafu {
            path,
            reason: e.to_string(),
        }
        .build()
    })?;

    for record in records {
        let record = record.context(DecodeSnafu { path })?;
        let row: Row = table
            .columns()
            .iter()
            .map(|c| c.to_string())
            .zip(record.iter())
            .collect();
        table.insert(row)?;
    }
    tracing::debug!("loaded {} row(s) of {} from {}", table.len(), name, path.display());
    Ok(table)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::Error;
    use crate::storage::Predicate;
    use std::fs;
    use tempfile::TempDir;

    fn sample() -> Table {
        let mut table = Table::new("notes", ["id", "body", "tag"]).unwrap();
        table
            .insert(Row::from([("id", "1"), ("body", "plain"), ("tag", "a")]))
            .unwrap();
        table
            .insert(Row::from([("id", "2"), ("body", "comma, inside"), ("tag", "")]))
            .unwrap();
        table
            .insert(Row::from([("id", "3"), ("body", "say \"hi\"\nnext line"), ("tag", "b")]))
            .unwrap();
        table
    }

    #[test]
    fn test_round_trip_with_quoting() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.csv");
        let table = sample();
        write_table(&path, &table).unwrap();
        let loaded = read_table(&path, "notes").unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn test_written_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.csv");
        write_table(&path, &sample()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "id,body,tag\n1,plain,a\n2,\"comma, inside\",\n3,\"say \"\"hi\"\"\nnext line\",b\n"
        );
    }

    #[test]
    fn test_omitted_field_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.csv");
        let mut table = Table::new("t", ["a", "b"]).unwrap();
        table.insert(Row::from([("b", "x")])).unwrap();
        write_table(&path, &table).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a,b\n,x\n");
        let loaded = read_table(&path, "t").unwrap();
        assert_eq!(loaded, table);
        let empty_a = Predicate::eq("a", "");
        assert_eq!(loaded.search(&empty_a), table.search(&empty_a));
    }

    #[test]
    fn test_single_empty_column_survives() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.csv");
        let mut table = Table::new("t", ["only"]).unwrap();
        table.insert(Row::from([("only", "")])).unwrap();
        table.insert(Row::from([("only", "x")])).unwrap();
        write_table(&path, &table).unwrap();
        assert_eq!(read_table(&path, "t").unwrap(), table);
    }

    #[test]
    fn test_header_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.csv");
        fs::write(&path, "a,b\n").unwrap();
        let loaded = read_table(&path, "t").unwrap();
        assert_eq!(loaded.columns(), ["a", "b"]);
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_missing_and_empty_files() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.csv");
        assert!(matches!(read_table(&missing, "missing"), Err(Error::NotFound { .. })));

        let empty = dir.path().join("empty.csv");
        fs::write(&empty, "").unwrap();
        assert!(matches!(read_table(&empty, "empty"), Err(Error::NotFound { .. })));
    }

    #[test]
    fn test_ragged_record_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.csv");
        fs::write(&path, "a,b\n1,2\n3\n").unwrap();
        assert!(matches!(read_table(&path, "t"), Err(Error::Decode { .. })));
    }

    #[test]
    fn test_bad_header_is_malformed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.csv");
        fs::write(&path, "id,first name\n1,x\n").unwrap();
        assert!(matches!(read_table(&path, "t"), Err(Error::MalformedHeader { .. })));
        fs::write(&path, "id,id\n1,x\n").unwrap();
        assert!(matches!(read_table(&path, "t"), Err(Error::MalformedHeader { .. })));
    }
}
