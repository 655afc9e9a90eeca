//! CSV ingestion: partition a table CSV into block files.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use buffer::BufferManager;
use catalog::TableMeta;
use common::policy::BlockPolicy;
use common::{Cell, DbError, DbResult};

use crate::writer::BlockWriter;

/// Blockify a table CSV: the first line names the columns, every following
/// line is a row of integers. Rows are packed `max_rows_per_block` per
/// block in one linear pass.
///
/// On failure, blocks written so far remain on disk; the caller unloads the
/// half-built table.
pub fn load(
    name: &str,
    csv_path: &Path,
    policy: BlockPolicy,
    pool: &mut BufferManager,
) -> DbResult<TableMeta> {
    let file = File::open(csv_path)
        .map_err(|e| DbError::Storage(format!("cannot open '{}': {e}", csv_path.display())))?;
    let mut lines = BufReader::new(file).lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => {
            return Err(DbError::Parse(format!(
                "'{}' is empty",
                csv_path.display()
            )));
        }
    };
    let columns = parse_header(&header, csv_path)?;
    let column_count = columns.len();
    let max_rows_per_block = policy.rows_per_block(column_count)?;

    let meta = TableMeta::new(name, csv_path, columns, max_rows_per_block)?;
    let mut writer = BlockWriter::new(meta);

    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = parse_row(&line, column_count)?;
        writer.push(row, pool)?;
    }

    let meta = writer.finish(pool)?;
    if meta.row_count == 0 {
        return Err(DbError::Parse(format!(
            "'{}' has a header but no rows",
            csv_path.display()
        )));
    }
    Ok(meta)
}

fn parse_header(header: &str, csv_path: &Path) -> DbResult<Vec<String>> {
    let columns: Vec<String> = header
        .split(',')
        .map(|token| token.trim().to_string())
        .collect();
    if columns.iter().any(String::is_empty) {
        return Err(DbError::Parse(format!(
            "empty column name in header of '{}'",
            csv_path.display()
        )));
    }
    Ok(columns)
}

fn parse_row(line: &str, expected: usize) -> DbResult<Vec<Cell>> {
    let row = line
        .split(',')
        .map(|token| {
            token
                .trim()
                .parse::<Cell>()
                .map_err(|_| DbError::Parse(format!("non-integer cell '{}'", token.trim())))
        })
        .collect::<DbResult<Vec<Cell>>>()?;
    if row.len() != expected {
        return Err(DbError::Parse(format!(
            "row has {} cells, expected {expected}",
            row.len()
        )));
    }
    Ok(row)
}
