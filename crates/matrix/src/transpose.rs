use buffer::BufferManager;
use catalog::MatrixMeta;
use common::DbResult;

/// Transpose the matrix in place, tile by tile.
///
/// Diagonal tiles transpose within their page; each off-diagonal pair
/// `(i, j)`, `i < j`, is swapped-and-transposed in one step, so the whole
/// matrix sees a single global transpose. Pages are left dirty for the pool
/// to write back. A matrix known to be symmetric is left untouched.
pub fn transpose(meta: &MatrixMeta, pool: &mut BufferManager) -> DbResult<()> {
    if meta.symmetric == Some(true) {
        return Ok(());
    }

    for i in 0..meta.tiles_per_stripe {
        pool.get_page(&meta.name, meta.tile_index(i, i))?
            .transpose_in_place()?;
        for j in (i + 1)..meta.tiles_per_stripe {
            let upper = meta.tile_index(i, j);
            let lower = meta.tile_index(j, i);
            let (a, b) = pool.fetch_pair(&meta.name, upper, lower)?;
            a.transpose_with(b)?;
        }
    }
    Ok(())
}
