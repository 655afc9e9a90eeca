use buffer::BufferManager;
use catalog::MatrixMeta;
use common::DbResult;

/// Materialize `new = src - src^T` under a fresh name.
///
/// Works on copies of the source tiles: each diagonal tile gets the
/// in-place subtract-transpose, each off-diagonal pair the pairwise form,
/// and the results are written straight through under the new name. The
/// source matrix's blocks are untouched.
pub fn compute(src: &MatrixMeta, new_name: &str, pool: &mut BufferManager) -> DbResult<MatrixMeta> {
    let mut meta = MatrixMeta::new(new_name, src.source_path.clone(), src.dimension, src.tile_side);
    meta.dims_per_block = src.dims_per_block.clone();
    meta.block_count = src.block_count;

    for i in 0..src.tiles_per_stripe {
        let diagonal = src.tile_index(i, i);
        let mut tile = pool.get_page(&src.name, diagonal)?.clone();
        tile.subtract_transpose_in_place()?;
        pool.write_page(new_name, diagonal, tile.to_rows())?;

        for j in (i + 1)..src.tiles_per_stripe {
            let upper = src.tile_index(i, j);
            let lower = src.tile_index(j, i);
            let (mut a, mut b) = {
                let (a, b) = pool.fetch_pair(&src.name, upper, lower)?;
                (a.clone(), b.clone())
            };
            a.subtract_transpose_with(&mut b)?;
            pool.write_page(new_name, upper, a.to_rows())?;
            pool.write_page(new_name, lower, b.to_rows())?;
        }
    }
    Ok(meta)
}
