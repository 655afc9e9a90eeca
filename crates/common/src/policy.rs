//! Block sizing rules derived from the configured block size.

use crate::{CELL_BYTES, DbError, DbResult};
use num_integer::Roots;

/// Sizing policy for table blocks and matrix tiles.
///
/// One block file holds at most `capacity_cells` integers. Tables divide that
/// capacity by their column count; matrices take the largest square tile that
/// fits.
#[derive(Clone, Copy, Debug)]
pub struct BlockPolicy {
    capacity_cells: usize,
}

impl BlockPolicy {
    pub fn new(block_size_bytes: usize) -> Self {
        Self {
            capacity_cells: block_size_bytes / CELL_BYTES,
        }
    }

    /// Number of cells one block can hold.
    pub fn capacity_cells(&self) -> usize {
        self.capacity_cells
    }

    /// Maximum rows per block for a table of `column_count` columns.
    pub fn rows_per_block(&self, column_count: usize) -> DbResult<usize> {
        if column_count == 0 {
            return Err(DbError::Capacity("table has no columns".into()));
        }
        let rows = self.capacity_cells / column_count;
        if rows == 0 {
            return Err(DbError::Capacity(format!(
                "block of {} cells cannot hold a row of {} columns",
                self.capacity_cells, column_count
            )));
        }
        Ok(rows)
    }

    /// Side length `m` of a matrix tile: the largest `m` with `m * m` cells
    /// fitting in one block. Integer square root with a ±1 correction, so no
    /// floating-point drift can creep in.
    pub fn tile_side(&self) -> DbResult<usize> {
        let mut m = self.capacity_cells.sqrt();
        while (m + 1) * (m + 1) <= self.capacity_cells {
            m += 1;
        }
        while m > 0 && m * m > self.capacity_cells {
            m -= 1;
        }
        if m == 0 {
            return Err(DbError::Capacity(format!(
                "block of {} cells cannot hold a single matrix cell",
                self.capacity_cells
            )));
        }
        Ok(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_block_holds_250_cells() {
        let policy = BlockPolicy::new(1000);
        assert_eq!(policy.capacity_cells(), 250);
        assert_eq!(policy.rows_per_block(3).unwrap(), 83);
        assert_eq!(policy.tile_side().unwrap(), 15);
    }

    #[test]
    fn rows_per_block_rejects_oversized_rows() {
        let policy = BlockPolicy::new(8);
        assert_eq!(policy.rows_per_block(2).unwrap(), 1);
        let err = policy.rows_per_block(3).unwrap_err();
        assert!(matches!(err, DbError::Capacity(_)));
    }

    #[test]
    fn tile_side_is_exact_on_perfect_squares() {
        // 16 cells -> 4x4 tile, 64 bytes.
        assert_eq!(BlockPolicy::new(64).tile_side().unwrap(), 4);
        // 17 cells still floor to 4.
        assert_eq!(BlockPolicy::new(68).tile_side().unwrap(), 4);
        // 15 cells floor to 3.
        assert_eq!(BlockPolicy::new(60).tile_side().unwrap(), 3);
    }

    #[test]
    fn tile_side_fails_when_no_cell_fits() {
        let err = BlockPolicy::new(3).tile_side().unwrap_err();
        assert!(matches!(err, DbError::Capacity(_)));
    }
}
