use buffer::BufferManager;
use catalog::TableMeta;
use common::{Cell, DbError, DbResult};

/// Accumulates rows for a table under construction and flushes them as
/// blocks of `max_rows_per_block` through the write-through path.
///
/// Every row-producing command (blockify, SELECT, JOIN, ...) goes through
/// this writer so block accounting and distinct statistics stay consistent.
#[derive(Debug)]
pub struct BlockWriter {
    meta: TableMeta,
    buffered: Vec<Vec<Cell>>,
}

impl BlockWriter {
    pub fn new(meta: TableMeta) -> Self {
        Self {
            meta,
            buffered: Vec::new(),
        }
    }

    pub fn meta(&self) -> &TableMeta {
        &self.meta
    }

    /// Append one row, flushing a full block to disk.
    pub fn push(&mut self, row: Vec<Cell>, pool: &mut BufferManager) -> DbResult<()> {
        if row.len() != self.meta.column_count() {
            return Err(DbError::Executor(format!(
                "row of {} cells pushed into table '{}' with {} columns",
                row.len(),
                self.meta.name,
                self.meta.column_count()
            )));
        }
        self.meta.note_row(&row);
        self.buffered.push(row);
        if self.buffered.len() == self.meta.max_rows_per_block {
            self.flush(pool)?;
        }
        Ok(())
    }

    /// Flush the trailing partial block and return the finished metadata.
    pub fn finish(mut self, pool: &mut BufferManager) -> DbResult<TableMeta> {
        self.flush(pool)?;
        Ok(self.meta)
    }

    fn flush(&mut self, pool: &mut BufferManager) -> DbResult<()> {
        if self.buffered.is_empty() {
            return Ok(());
        }
        let rows = std::mem::take(&mut self.buffered);
        let rows_in_block = rows.len();
        pool.write_page(&self.meta.name, self.meta.block_count, rows)?;
        self.meta.record_block(rows_in_block);
        Ok(())
    }
}
