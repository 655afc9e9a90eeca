//! Row tables: CSV blockifier, block writer, external-merge sort, rename
//! and export.
//!
//! A table's rows live in block files of at most `max_rows_per_block` rows
//! each; all access goes through the buffer pool. The sort is the classic
//! two-phase external merge: sorted initial runs, then log2 merge passes.

mod blockify;
mod sort;
#[cfg(test)]
mod tests;
mod writer;

pub use blockify::load;
pub use sort::{SortKey, compare_rows, sort};
pub use writer::BlockWriter;

use buffer::{BufferManager, Cursor};
use catalog::TableMeta;
use common::{Cell, DbError, DbResult};
use std::fs;
use std::path::Path;

/// Rename every block of the table and its metadata. The catalog re-keys
/// the entry separately.
pub fn rename(meta: &mut TableMeta, new_name: &str, pool: &mut BufferManager) -> DbResult<()> {
    pool.rename_owner(&meta.name, new_name, meta.block_count)?;
    meta.name = new_name.to_string();
    Ok(())
}

/// Write the table as a permanent CSV: header and rows, `", "` separated.
pub fn export(meta: &TableMeta, pool: &mut BufferManager, out_path: &Path) -> DbResult<()> {
    let mut text = String::new();
    text.push_str(&meta.columns.join(", "));
    text.push('\n');

    let mut cursor = Cursor::new(&meta.name, meta.block_count);
    while let Some(row) = cursor.next_row(pool)? {
        let line = row
            .iter()
            .map(Cell::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        text.push_str(&line);
        text.push('\n');
    }

    fs::write(out_path, text)
        .map_err(|e| DbError::Storage(format!("export to {} failed: {e}", out_path.display())))
}

/// Collect up to `limit` leading rows (PRINT support).
pub fn first_rows(
    meta: &TableMeta,
    pool: &mut BufferManager,
    limit: usize,
) -> DbResult<Vec<Vec<Cell>>> {
    let mut rows = Vec::new();
    let mut cursor = Cursor::new(&meta.name, meta.block_count);
    while rows.len() < limit {
        match cursor.next_row(pool)? {
            Some(row) => rows.push(row),
            None => break,
        }
    }
    Ok(rows)
}
