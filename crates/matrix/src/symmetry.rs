use buffer::BufferManager;
use catalog::MatrixMeta;
use common::DbResult;

/// Test the matrix for symmetry, caching the verdict on the metadata.
///
/// Diagonal tiles compare `cell(k, l)` against `cell(l, k)` for `k < l`.
/// Off-diagonal pairs compare the upper tile against the lower over the
/// upper tile's full valid bounds, which covers both triangles of the pair.
/// The first mismatch short-circuits to `false`.
pub fn is_symmetric(meta: &mut MatrixMeta, pool: &mut BufferManager) -> DbResult<bool> {
    if let Some(known) = meta.symmetric {
        return Ok(known);
    }
    let verdict = check(meta, pool)?;
    meta.symmetric = Some(verdict);
    Ok(verdict)
}

fn check(meta: &MatrixMeta, pool: &mut BufferManager) -> DbResult<bool> {
    for i in 0..meta.tiles_per_stripe {
        let page = pool.get_page(&meta.name, meta.tile_index(i, i))?;
        for k in 0..page.row_count() {
            for l in (k + 1)..page.col_count() {
                if page.get(k, l) != page.get(l, k) {
                    return Ok(false);
                }
            }
        }

        for j in (i + 1)..meta.tiles_per_stripe {
            let upper = meta.tile_index(i, j);
            let lower = meta.tile_index(j, i);
            let (a, b) = pool.fetch_pair(&meta.name, upper, lower)?;
            for k in 0..a.row_count() {
                for l in 0..a.col_count() {
                    if a.get(k, l) != b.get(l, k) {
                        return Ok(false);
                    }
                }
            }
        }
    }
    Ok(true)
}
