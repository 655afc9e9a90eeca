use crate::{CommandOutput, Engine};
use common::DbResult;

/// SYMMETRY: test (and cache) whether the matrix equals its transpose.
pub(crate) fn symmetry(engine: &mut Engine, name: &str) -> DbResult<CommandOutput> {
    let verdict = matrix::is_symmetric(engine.catalog.matrix_mut(name)?, &mut engine.pool)?;
    Ok(CommandOutput::Message(verdict.to_string()))
}

/// TRANSPOSE: transpose the matrix in place, tile by tile.
pub(crate) fn transpose(engine: &mut Engine, name: &str) -> DbResult<CommandOutput> {
    let meta = engine.catalog.matrix(name)?.clone();
    matrix::transpose(&meta, &mut engine.pool)?;
    Ok(CommandOutput::Message(format!("transposed '{name}'")))
}

/// `NEW = COMPUTE M`: materialize `M - M^T` under the assigned name.
pub(crate) fn compute(engine: &mut Engine, target: &str, source: &str) -> DbResult<CommandOutput> {
    let src = engine.catalog.matrix(source)?.clone();
    let meta = matrix::compute(&src, target, &mut engine.pool)?;
    let dimension = meta.dimension;
    engine.catalog.insert_matrix(meta)?;
    Ok(CommandOutput::Message(format!(
        "created matrix '{target}' ({dimension}x{dimension})"
    )))
}
