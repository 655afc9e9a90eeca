//! Square-tiled matrices: blockify, in-place blocked transpose, symmetry
//! check, compute (A - A^T), rename and export.
//!
//! A matrix of dimension N is cut into ceil(N/m)^2 tiles of side m (border
//! tiles smaller); tile (i, j) lives at linear block index
//! `i * tiles_per_stripe + j`. All tile access goes through the buffer pool.

mod blockify;
mod compute;
mod symmetry;
mod transpose;

pub use blockify::load;
pub use compute::compute;
pub use symmetry::is_symmetric;
pub use transpose::transpose;

use buffer::BufferManager;
use catalog::MatrixMeta;
use common::{Cell, DbError, DbResult};
use std::fs;
use std::path::Path;

/// Rename every tile of the matrix and its metadata; `original_name` keeps
/// the load-time name. The catalog re-keys the entry separately.
pub fn rename(meta: &mut MatrixMeta, new_name: &str, pool: &mut BufferManager) -> DbResult<()> {
    pool.rename_owner(&meta.name, new_name, meta.block_count)?;
    meta.name = new_name.to_string();
    Ok(())
}

/// Write the matrix as a permanent CSV, space-separated, one row per line.
pub fn export(meta: &MatrixMeta, pool: &mut BufferManager, out_path: &Path) -> DbResult<()> {
    let mut text = String::new();
    for row in rows(meta, pool, meta.dimension, meta.dimension)? {
        let line = row
            .iter()
            .map(Cell::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        text.push_str(&line);
        text.push('\n');
    }
    fs::write(out_path, text)
        .map_err(|e| DbError::Storage(format!("export to {} failed: {e}", out_path.display())))
}

/// Collect the leading `limit x limit` window of the matrix (PRINT support).
pub fn first_rows(
    meta: &MatrixMeta,
    pool: &mut BufferManager,
    limit: usize,
) -> DbResult<Vec<Vec<Cell>>> {
    rows(meta, pool, limit, limit)
}

/// Reassemble up to `row_limit x col_limit` cells stripe by stripe.
fn rows(
    meta: &MatrixMeta,
    pool: &mut BufferManager,
    row_limit: usize,
    col_limit: usize,
) -> DbResult<Vec<Vec<Cell>>> {
    let row_limit = row_limit.min(meta.dimension);
    let col_limit = col_limit.min(meta.dimension);
    let mut out = Vec::with_capacity(row_limit);

    let mut emitted = 0;
    for i in 0..meta.tiles_per_stripe {
        let (stripe_rows, _) = meta.tile_dims(i, 0);
        for r in 0..stripe_rows {
            if emitted == row_limit {
                return Ok(out);
            }
            let mut row = Vec::with_capacity(col_limit);
            for j in 0..meta.tiles_per_stripe {
                if row.len() == col_limit {
                    break;
                }
                let page = pool.get_page(&meta.name, meta.tile_index(i, j))?;
                for c in 0..page.col_count() {
                    if row.len() == col_limit {
                        break;
                    }
                    row.push(page.get(r, c));
                }
            }
            out.push(row);
            emitted += 1;
        }
    }
    Ok(out)
}
