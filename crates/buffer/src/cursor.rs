//! Forward row iteration over a logical object's block sequence.

use crate::BufferManager;
use common::{BlockId, Cell, DbResult};

/// Forward iterator over the rows of one owner's blocks.
///
/// `next_row` walks rows within the current page and crosses into the next
/// block when the page is exhausted. `seek_page` jumps to an arbitrary block
/// (matrix tile access); both go through the pool and may evict.
#[derive(Clone, Debug)]
pub struct Cursor {
    owner: String,
    block_count: usize,
    page_index: BlockId,
    row_index: usize,
}

impl Cursor {
    pub fn new(owner: impl Into<String>, block_count: usize) -> Self {
        Self {
            owner: owner.into(),
            block_count,
            page_index: 0,
            row_index: 0,
        }
    }

    /// Return the current row and advance, or `None` past the last block.
    pub fn next_row(&mut self, pool: &mut BufferManager) -> DbResult<Option<Vec<Cell>>> {
        loop {
            if self.page_index >= self.block_count {
                return Ok(None);
            }
            let page = pool.get_page(&self.owner, self.page_index)?;
            if self.row_index < page.row_count() {
                let row = page.row(self.row_index).to_vec();
                self.row_index += 1;
                return Ok(Some(row));
            }
            self.page_index += 1;
            self.row_index = 0;
        }
    }

    /// Seek to block `k`; the next `next_row` starts at its first row.
    pub fn seek_page(&mut self, k: BlockId) {
        self.page_index = k;
        self.row_index = 0;
    }

    /// Read one cell of the current block (tile access).
    pub fn cell(&self, pool: &mut BufferManager, r: usize, c: usize) -> DbResult<Cell> {
        let page = pool.get_page(&self.owner, self.page_index)?;
        Ok(page.get(r, c))
    }

    pub fn position(&self) -> (BlockId, usize) {
        (self.page_index, self.row_index)
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }
}
