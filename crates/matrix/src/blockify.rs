//! CSV ingestion: partition a square matrix CSV into tile files.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use buffer::BufferManager;
use catalog::MatrixMeta;
use common::policy::BlockPolicy;
use common::{Cell, DbError, DbResult};

/// Blockify a matrix CSV in one linear pass.
///
/// Every line (the first included) is a data row; the dimension is the
/// comma count of the first line plus one. One row-stripe of tile buffers
/// stays live: cell at column `c` goes to tile `c / m`, local column
/// `c % m`. A stripe flushes after `m` rows, or at EOF for the shorter
/// final stripe.
pub fn load(
    name: &str,
    csv_path: &Path,
    policy: BlockPolicy,
    pool: &mut BufferManager,
) -> DbResult<MatrixMeta> {
    let file = File::open(csv_path)
        .map_err(|e| DbError::Storage(format!("cannot open '{}': {e}", csv_path.display())))?;
    let mut lines = BufReader::new(file).lines();

    let first = match lines.next() {
        Some(line) => line?,
        None => {
            return Err(DbError::Parse(format!(
                "'{}' is empty",
                csv_path.display()
            )));
        }
    };
    let dimension = first.split(',').count();
    let tile_side = policy.tile_side()?;

    let mut meta = MatrixMeta::new(name, csv_path, dimension, tile_side);
    let mut stripe = Stripe::new(meta.tiles_per_stripe, tile_side);
    let mut total_rows = 0usize;

    for line in std::iter::once(Ok(first)).chain(lines) {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = parse_row(&line, dimension)?;
        total_rows += 1;
        if total_rows > dimension {
            return Err(DbError::Parse(format!(
                "'{}' has more than {dimension} rows",
                csv_path.display()
            )));
        }
        stripe.push_row(&row);
        if stripe.is_full() {
            stripe.flush(&mut meta, pool)?;
        }
    }

    if !stripe.is_empty() {
        stripe.flush(&mut meta, pool)?;
    }
    if total_rows != dimension {
        return Err(DbError::Parse(format!(
            "'{}' has {total_rows} rows for dimension {dimension}",
            csv_path.display()
        )));
    }

    Ok(meta)
}

/// One row-stripe of live tile buffers.
struct Stripe {
    tiles: Vec<Vec<Vec<Cell>>>,
    tile_side: usize,
    rows: usize,
}

impl Stripe {
    fn new(tiles_per_stripe: usize, tile_side: usize) -> Self {
        Self {
            tiles: vec![Vec::new(); tiles_per_stripe],
            tile_side,
            rows: 0,
        }
    }

    fn push_row(&mut self, row: &[Cell]) {
        for (tile, chunk) in self.tiles.iter_mut().zip(row.chunks(self.tile_side)) {
            tile.push(chunk.to_vec());
        }
        self.rows += 1;
    }

    fn is_full(&self) -> bool {
        self.rows == self.tile_side
    }

    fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Flush every tile of the stripe, recording live dimensions: the final
    /// stripe may carry fewer than `tile_side` rows, the final column tile
    /// fewer columns.
    fn flush(&mut self, meta: &mut MatrixMeta, pool: &mut BufferManager) -> DbResult<()> {
        for tile in &mut self.tiles {
            let rows = std::mem::take(tile);
            let dims = (rows.len(), rows.first().map_or(0, Vec::len));
            pool.write_page(&meta.name, meta.block_count, rows)?;
            meta.dims_per_block.push(dims);
            meta.block_count += 1;
        }
        self.rows = 0;
        Ok(())
    }
}

fn parse_row(line: &str, dimension: usize) -> DbResult<Vec<Cell>> {
    let row = line
        .split(',')
        .map(|token| {
            token
                .trim()
                .parse::<Cell>()
                .map_err(|_| DbError::Parse(format!("non-integer cell '{}'", token.trim())))
        })
        .collect::<DbResult<Vec<Cell>>>()?;
    if row.len() != dimension {
        return Err(DbError::Parse(format!(
            "matrix row has {} cells, expected {dimension}",
            row.len()
        )));
    }
    Ok(row)
}
