//! Buffer manager: the only gate between logical operators and disk.
//!
//! Holds at most `capacity` resident [`Page`]s in insertion order and evicts
//! FIFO, writing dirty pages back on the way out. Consumers borrow a page for
//! one operation at a time; the borrow ends before the next pool call, which
//! is exactly the discipline the replacement policy needs.
//!
//! # Example
//!
//! ```no_run
//! use buffer::BufferManager;
//!
//! let mut pool = BufferManager::new("/tmp/db/temp", 4);
//! let page = pool.get_page("trips", 0).unwrap();
//! let first = page.row(0).to_vec();
//! ```

mod cursor;
#[cfg(test)]
mod tests;

pub use cursor::Cursor;

use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;

use common::{BlockId, Cell, DbError, DbResult};
use storage::{Page, block_path};

/// Fixed-capacity FIFO cache of resident pages.
///
/// Replacement is FIFO on insertion order, not LRU: a cache hit does not
/// reorder the queue. Tests above this layer depend on that.
#[derive(Debug)]
pub struct BufferManager {
    temp_dir: PathBuf,
    capacity: usize,
    pool: VecDeque<Page>,
    blocks_read: u64,
    blocks_written: u64,
    evictions: u64,
}

impl BufferManager {
    /// Create a pool over the given block directory.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(temp_dir: impl Into<PathBuf>, capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be > 0");
        Self {
            temp_dir: temp_dir.into(),
            capacity,
            pool: VecDeque::with_capacity(capacity),
            blocks_read: 0,
            blocks_written: 0,
            evictions: 0,
        }
    }

    /// Fetch a page, reading it from disk on a miss.
    ///
    /// A hit returns the resident page without touching any counter. A miss
    /// increments `blocks_read`, evicts the oldest resident page when the
    /// pool is full, and appends the new page to the insertion order.
    pub fn get_page(&mut self, owner: &str, index: BlockId) -> DbResult<&mut Page> {
        let pos = self.ensure_resident(owner, index, &[])?;
        Ok(&mut self.pool[pos])
    }

    /// Fetch two distinct blocks of one owner as disjoint mutable borrows.
    ///
    /// Both pages are reserved up front: while the second loads, the first is
    /// pinned against eviction. Needs a pool of at least two frames.
    pub fn fetch_pair(
        &mut self,
        owner: &str,
        first: BlockId,
        second: BlockId,
    ) -> DbResult<(&mut Page, &mut Page)> {
        if first == second {
            return Err(DbError::Storage(format!(
                "pair fetch of {owner} needs two distinct blocks, got {first} twice"
            )));
        }
        if self.capacity < 2 {
            return Err(DbError::Capacity(
                "pair fetch needs a pool of at least 2 frames".into(),
            ));
        }
        self.ensure_resident(owner, first, &[])?;
        self.ensure_resident(owner, second, &[(owner, first)])?;

        let pos_a = self.position(owner, first);
        let pos_b = self.position(owner, second);
        match (pos_a, pos_b) {
            (Some(a), Some(b)) => {
                let slice = self.pool.make_contiguous();
                if a < b {
                    let (left, right) = slice.split_at_mut(b);
                    Ok((&mut left[a], &mut right[0]))
                } else {
                    let (left, right) = slice.split_at_mut(a);
                    Ok((&mut right[0], &mut left[b]))
                }
            }
            _ => Err(DbError::Storage(format!(
                "pair fetch lost a pinned block of {owner}"
            ))),
        }
    }

    /// Write a block straight to disk without pooling it.
    ///
    /// Any stale resident page with the same identity is dropped first, so a
    /// later `get_page` can never observe pre-write contents. Increments
    /// `blocks_written`.
    pub fn write_page(&mut self, owner: &str, index: BlockId, rows: Vec<Vec<Cell>>) -> DbResult<()> {
        self.pool.retain(|page| !page.is(owner, index));
        let mut page = Page::from_rows(owner, index, rows)?;
        page.write(&self.temp_dir)?;
        self.blocks_written += 1;
        Ok(())
    }

    /// Write every dirty resident page back, keeping it resident.
    pub fn flush(&mut self) -> DbResult<()> {
        for page in &mut self.pool {
            if page.is_dirty() {
                page.write(&self.temp_dir)?;
                self.blocks_written += 1;
            }
        }
        Ok(())
    }

    /// Rename every block of `old` on disk and in the pool.
    ///
    /// Resident pages are matched on the owner field alone, never on the
    /// composed file name, so dirty pages flush under the new name later.
    pub fn rename_owner(&mut self, old: &str, new: &str, block_count: usize) -> DbResult<()> {
        for index in 0..block_count {
            let from = block_path(&self.temp_dir, old, index);
            let to = block_path(&self.temp_dir, new, index);
            fs::rename(&from, &to).map_err(|e| {
                DbError::Storage(format!("rename {} failed: {e}", from.display()))
            })?;
        }
        for page in &mut self.pool {
            if page.owner() == old {
                page.set_owner(new);
            }
        }
        Ok(())
    }

    /// Drop every resident page of `owner` without write-back.
    pub fn drop_owner(&mut self, owner: &str) {
        self.pool.retain(|page| page.owner() != owner);
    }

    /// Remove all block files of `owner` and discard its resident pages.
    /// Missing files are logged and skipped.
    pub fn delete_blocks(&mut self, owner: &str, block_count: usize) {
        self.drop_owner(owner);
        for index in 0..block_count {
            let path = block_path(&self.temp_dir, owner, index);
            if let Err(e) = fs::remove_file(&path) {
                tracing::warn!(path = %path.display(), error = %e, "block delete failed");
            }
        }
    }

    /// Remove block files of `owner` from index 0 upward until one is
    /// missing. Covers cleanup of partially blockified objects whose final
    /// block count never got recorded.
    pub fn delete_all_blocks(&mut self, owner: &str) {
        self.drop_owner(owner);
        let mut index = 0;
        loop {
            let path = block_path(&self.temp_dir, owner, index);
            if fs::remove_file(&path).is_err() {
                break;
            }
            index += 1;
        }
    }

    pub fn blocks_read(&self) -> u64 {
        self.blocks_read
    }

    pub fn blocks_written(&self) -> u64 {
        self.blocks_written
    }

    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    pub fn resident_count(&self) -> usize {
        self.pool.len()
    }

    pub fn is_resident(&self, owner: &str, index: BlockId) -> bool {
        self.position(owner, index).is_some()
    }

    pub fn temp_dir(&self) -> &std::path::Path {
        &self.temp_dir
    }

    fn position(&self, owner: &str, index: BlockId) -> Option<usize> {
        self.pool.iter().position(|page| page.is(owner, index))
    }

    /// Make `(owner, index)` resident and return its pool position. On a miss
    /// the page is read from disk and the oldest unpinned page is evicted if
    /// the pool is full.
    ///
    /// # Panics
    ///
    /// Panics if every frame would be pinned: eviction must always have a
    /// victim, or the pool could silently grow past its capacity.
    fn ensure_resident(
        &mut self,
        owner: &str,
        index: BlockId,
        pinned: &[(&str, BlockId)],
    ) -> DbResult<usize> {
        assert!(
            pinned.len() < self.capacity,
            "pinned pages must leave at least one evictable frame"
        );
        if let Some(pos) = self.position(owner, index) {
            return Ok(pos);
        }

        let page = Page::read(&self.temp_dir, owner, index)?;
        self.blocks_read += 1;

        if self.pool.len() >= self.capacity {
            self.evict_one(pinned);
        }
        self.pool.push_back(page);
        Ok(self.pool.len() - 1)
    }

    /// Evict the oldest resident page that is not pinned. Dirty pages are
    /// written back first; write-back failures are logged and swallowed so
    /// no error escapes the eviction path.
    fn evict_one(&mut self, pinned: &[(&str, BlockId)]) {
        let victim = self
            .pool
            .iter()
            .position(|page| !pinned.iter().any(|(o, i)| page.is(o, *i)));
        let Some(pos) = victim else {
            return;
        };
        let Some(mut page) = self.pool.remove(pos) else {
            return;
        };
        if page.is_dirty() {
            match page.write(&self.temp_dir) {
                Ok(()) => self.blocks_written += 1,
                Err(e) => {
                    tracing::warn!(owner = page.owner(), index = page.index(), error = %e,
                        "dirty write-back failed during eviction");
                }
            }
        }
        self.evictions += 1;
    }
}
