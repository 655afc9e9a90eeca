//! Block storage: one page per file, plain-text integer grids.
//!
//! A [`Page`] is the in-memory image of one block file: a rectangular grid of
//! `i32` cells, one logical row per line, cells separated by single spaces.
//! The file carries no header; dimensions are inferred from the text on read
//! and tracked by the owner's metadata above this layer.

use std::fs;
use std::path::{Path, PathBuf};

use common::{BlockId, Cell, DbError, DbResult};

/// Path of a block file: `<temp_dir>/<owner>_Page<index>`.
pub fn block_path(temp_dir: &Path, owner: &str, index: BlockId) -> PathBuf {
    temp_dir.join(format!("{owner}_Page{index}"))
}

/// One resident block: a rectangular grid of cells plus identity and a dirty
/// flag. Created either by reading its file or from an in-memory grid.
#[derive(Clone, Debug)]
pub struct Page {
    owner: String,
    index: BlockId,
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    dirty: bool,
}

impl Page {
    /// Build a page from row vectors. All rows must have equal length.
    pub fn from_rows(owner: &str, index: BlockId, rows: Vec<Vec<Cell>>) -> DbResult<Self> {
        let row_count = rows.len();
        let col_count = rows.first().map_or(0, Vec::len);
        let mut cells = Vec::with_capacity(row_count * col_count);
        for row in &rows {
            if row.len() != col_count {
                return Err(DbError::Storage(format!(
                    "ragged grid for block {owner}_Page{index}: expected {col_count} cells, got {}",
                    row.len()
                )));
            }
            cells.extend_from_slice(row);
        }
        Ok(Self {
            owner: owner.to_string(),
            index,
            rows: row_count,
            cols: col_count,
            cells,
            dirty: false,
        })
    }

    /// Read a block file, inferring the grid dimensions from its text.
    pub fn read(temp_dir: &Path, owner: &str, index: BlockId) -> DbResult<Self> {
        let path = block_path(temp_dir, owner, index);
        let text = fs::read_to_string(&path)?;

        let mut rows = 0usize;
        let mut cols = 0usize;
        let mut cells = Vec::new();
        for line in text.lines() {
            if line.trim().is_empty() {
                continue;
            }
            let mut width = 0usize;
            for token in line.split_whitespace() {
                let cell: Cell = token.parse().map_err(|_| {
                    DbError::Parse(format!(
                        "non-integer cell '{token}' in block {}",
                        path.display()
                    ))
                })?;
                cells.push(cell);
                width += 1;
            }
            if rows == 0 {
                cols = width;
            } else if width != cols {
                return Err(DbError::Parse(format!(
                    "ragged row in block {}: expected {cols} cells, got {width}",
                    path.display()
                )));
            }
            rows += 1;
        }

        Ok(Self {
            owner: owner.to_string(),
            index,
            rows,
            cols,
            cells,
            dirty: false,
        })
    }

    /// Serialize the grid to its block file and clear the dirty flag.
    pub fn write(&mut self, temp_dir: &Path) -> DbResult<()> {
        let path = block_path(temp_dir, &self.owner, self.index);
        let mut text = String::with_capacity(self.cells.len() * 4);
        for row in self.cells.chunks(self.cols.max(1)) {
            let line = row
                .iter()
                .map(Cell::to_string)
                .collect::<Vec<_>>()
                .join(" ");
            text.push_str(&line);
            text.push('\n');
        }
        fs::write(&path, text)
            .map_err(|e| DbError::Storage(format!("write {} failed: {e}", path.display())))?;
        self.dirty = false;
        Ok(())
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn index(&self) -> BlockId {
        self.index
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn col_count(&self) -> usize {
        self.cols
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Identity check against an `(owner, index)` pair.
    pub fn is(&self, owner: &str, index: BlockId) -> bool {
        self.owner == owner && self.index == index
    }

    /// Rewrite the owner field (rename support). The page index is untouched.
    pub fn set_owner(&mut self, owner: &str) {
        self.owner = owner.to_string();
    }

    pub fn get(&self, r: usize, c: usize) -> Cell {
        self.cells[r * self.cols + c]
    }

    pub fn set(&mut self, r: usize, c: usize, value: Cell) {
        self.cells[r * self.cols + c] = value;
        self.dirty = true;
    }

    /// Borrow one logical row.
    pub fn row(&self, r: usize) -> &[Cell] {
        &self.cells[r * self.cols..(r + 1) * self.cols]
    }

    /// Clone the grid out as row vectors.
    pub fn to_rows(&self) -> Vec<Vec<Cell>> {
        (0..self.rows).map(|r| self.row(r).to_vec()).collect()
    }

    /// In-place transpose of a square tile. Marks the page dirty.
    pub fn transpose_in_place(&mut self) -> DbResult<()> {
        if self.rows != self.cols {
            return Err(DbError::Storage(format!(
                "in-place transpose needs a square tile, got {}x{}",
                self.rows, self.cols
            )));
        }
        for i in 0..self.rows {
            for j in (i + 1)..self.cols {
                self.cells.swap(i * self.cols + j, j * self.cols + i);
            }
        }
        self.dirty = true;
        Ok(())
    }

    /// Swap-and-transpose an off-diagonal tile pair: `self` becomes the old
    /// `other` transposed and vice versa, so the matrix as a whole sees a
    /// single global transpose. Marks both pages dirty.
    pub fn transpose_with(&mut self, other: &mut Page) -> DbResult<()> {
        self.check_pair_dims(other, "pair transpose")?;
        let old_self = self.cells.clone();

        for i in 0..self.rows {
            for j in 0..self.cols {
                self.cells[i * self.cols + j] = other.cells[j * other.cols + i];
            }
        }
        for i in 0..other.rows {
            for j in 0..other.cols {
                other.cells[i * other.cols + j] = old_self[j * self.cols + i];
            }
        }
        self.dirty = true;
        other.dirty = true;
        Ok(())
    }

    /// Diagonal-tile `A <- A - A^T`. The diagonal zeroes out; mirrored cells
    /// become negations of each other.
    pub fn subtract_transpose_in_place(&mut self) -> DbResult<()> {
        if self.rows != self.cols {
            return Err(DbError::Storage(format!(
                "subtract-transpose needs a square tile, got {}x{}",
                self.rows, self.cols
            )));
        }
        for i in 0..self.rows {
            for j in (i + 1)..self.cols {
                let upper = self.cells[i * self.cols + j];
                let lower = self.cells[j * self.cols + i];
                self.cells[i * self.cols + j] = upper - lower;
                self.cells[j * self.cols + i] = lower - upper;
            }
            self.cells[i * self.cols + i] = 0;
        }
        self.dirty = true;
        Ok(())
    }

    /// Off-diagonal pair `(A, B) <- (A - B^T, B - A^T)`, computed from the
    /// pre-call values of both tiles.
    pub fn subtract_transpose_with(&mut self, other: &mut Page) -> DbResult<()> {
        self.check_pair_dims(other, "pair subtract-transpose")?;
        for i in 0..self.rows {
            for j in 0..self.cols {
                let diff = self.cells[i * self.cols + j] - other.cells[j * other.cols + i];
                self.cells[i * self.cols + j] = diff;
                other.cells[j * other.cols + i] = -diff;
            }
        }
        self.dirty = true;
        other.dirty = true;
        Ok(())
    }

    fn check_pair_dims(&self, other: &Page, what: &str) -> DbResult<()> {
        if self.rows != other.cols || self.cols != other.rows {
            return Err(DbError::Storage(format!(
                "{what} needs mirrored dimensions, got {}x{} and {}x{}",
                self.rows, self.cols, other.rows, other.cols
            )));
        }
        Ok(())
    }
}
