//! Two-phase external-merge sort over a table's blocks.
//!
//! Phase one rewrites every block as a sorted run under a shadow name.
//! Phase two runs ceil(log2(block_count)) passes, each merging adjacent run
//! pairs into runs of twice the length, alternating between two shadow
//! names. The finished shadow is substituted for the original via rename.
//! At most two input pages are resident at any time; output goes through
//! the pool's write-through path.

use std::cmp::Ordering;
use std::ops::Range;

use buffer::BufferManager;
use catalog::TableMeta;
use common::{Cell, ColumnId, DbError, DbResult, SortDirection};

/// One resolved sort key: column ordinal plus direction.
#[derive(Clone, Copy, Debug)]
pub struct SortKey {
    pub column: ColumnId,
    pub direction: SortDirection,
}

/// Sort the table in place by the key vector. Stable across equal keys:
/// within a merge, the lower run wins ties.
pub fn sort(meta: &mut TableMeta, keys: &[SortKey], pool: &mut BufferManager) -> DbResult<()> {
    if keys.is_empty() {
        return Err(DbError::Executor("sort needs at least one key".into()));
    }
    for key in keys {
        if key.column >= meta.column_count() {
            return Err(DbError::Executor(format!(
                "sort key column {} out of range for table '{}'",
                key.column, meta.name
            )));
        }
    }
    if meta.block_count == 0 {
        return Ok(());
    }

    // Sorting phase: each source block becomes one sorted run in the shadow.
    let mut src = format!("{}_sorted", meta.name);
    let mut dst = format!("{}_merged", meta.name);
    let mut layout = Vec::with_capacity(meta.block_count);
    for index in 0..meta.block_count {
        let mut rows = pool.get_page(&meta.name, index)?.to_rows();
        rows.sort_by(|a, b| compare_rows(a, b, keys));
        layout.push(rows.len());
        pool.write_page(&src, index, rows)?;
    }
    let mut runs: Vec<Range<usize>> = (0..layout.len()).map(|b| b..b + 1).collect();

    // Merging phase: pair adjacent runs until a single run remains.
    while runs.len() > 1 {
        let mut next_layout: Vec<usize> = Vec::with_capacity(layout.len());
        let mut next_runs = Vec::with_capacity(runs.len().div_ceil(2));

        for pair in runs.chunks(2) {
            let run_start = next_layout.len();
            match pair {
                [left, right] => merge_runs(
                    &src,
                    left.clone(),
                    right.clone(),
                    &dst,
                    &mut next_layout,
                    meta.max_rows_per_block,
                    keys,
                    pool,
                )?,
                [tail] => copy_run(&src, tail.clone(), &dst, &mut next_layout, pool)?,
                _ => unreachable!("chunks(2) yields one or two runs"),
            }
            next_runs.push(run_start..next_layout.len());
        }

        pool.delete_blocks(&src, layout.len());
        std::mem::swap(&mut src, &mut dst);
        layout = next_layout;
        runs = next_runs;
    }

    // Substitute the sorted shadow for the original.
    pool.delete_blocks(&meta.name, meta.block_count);
    pool.rename_owner(&src, &meta.name, layout.len())?;
    meta.block_count = layout.len();
    meta.rows_per_block = layout;
    Ok(())
}

/// Lexicographic comparison across the key vector with per-key direction.
pub fn compare_rows(a: &[Cell], b: &[Cell], keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ordering = a[key.column].cmp(&b[key.column]);
        let directed = match key.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if directed != Ordering::Equal {
            return directed;
        }
    }
    Ordering::Equal
}

/// Row iterator bounded to one run's block range.
struct RunCursor<'a> {
    owner: &'a str,
    end: usize,
    block: usize,
    row: usize,
}

impl<'a> RunCursor<'a> {
    fn new(owner: &'a str, range: Range<usize>) -> Self {
        Self {
            owner,
            end: range.end,
            block: range.start,
            row: 0,
        }
    }

    fn next(&mut self, pool: &mut BufferManager) -> DbResult<Option<Vec<Cell>>> {
        loop {
            if self.block >= self.end {
                return Ok(None);
            }
            let page = pool.get_page(self.owner, self.block)?;
            if self.row < page.row_count() {
                let row = page.row(self.row).to_vec();
                self.row += 1;
                return Ok(Some(row));
            }
            self.block += 1;
            self.row = 0;
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn merge_runs(
    src: &str,
    left: Range<usize>,
    right: Range<usize>,
    dst: &str,
    next_layout: &mut Vec<usize>,
    max_rows_per_block: usize,
    keys: &[SortKey],
    pool: &mut BufferManager,
) -> DbResult<()> {
    let mut a = RunCursor::new(src, left);
    let mut b = RunCursor::new(src, right);
    let mut head_a = a.next(pool)?;
    let mut head_b = b.next(pool)?;
    let mut out: Vec<Vec<Cell>> = Vec::with_capacity(max_rows_per_block);

    loop {
        let row = match (head_a.take(), head_b.take()) {
            (None, None) => break,
            (Some(x), None) => {
                head_a = a.next(pool)?;
                x
            }
            (None, Some(y)) => {
                head_b = b.next(pool)?;
                y
            }
            (Some(x), Some(y)) => {
                if compare_rows(&x, &y, keys) != Ordering::Greater {
                    head_b = Some(y);
                    head_a = a.next(pool)?;
                    x
                } else {
                    head_a = Some(x);
                    head_b = b.next(pool)?;
                    y
                }
            }
        };
        out.push(row);
        if out.len() == max_rows_per_block {
            flush_block(dst, next_layout, &mut out, pool)?;
        }
    }
    if !out.is_empty() {
        flush_block(dst, next_layout, &mut out, pool)?;
    }
    Ok(())
}

/// Carry an unpaired trailing run into the destination unchanged.
fn copy_run(
    src: &str,
    range: Range<usize>,
    dst: &str,
    next_layout: &mut Vec<usize>,
    pool: &mut BufferManager,
) -> DbResult<()> {
    for block in range {
        let rows = pool.get_page(src, block)?.to_rows();
        next_layout.push(rows.len());
        pool.write_page(dst, next_layout.len() - 1, rows)?;
    }
    Ok(())
}

fn flush_block(
    dst: &str,
    next_layout: &mut Vec<usize>,
    out: &mut Vec<Vec<Cell>>,
    pool: &mut BufferManager,
) -> DbResult<()> {
    let rows = std::mem::take(out);
    next_layout.push(rows.len());
    pool.write_page(dst, next_layout.len() - 1, rows)
}
