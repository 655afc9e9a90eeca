use crate::{CommandOutput, Engine};
use common::{DbError, DbResult};
use parser::ObjectKind;

/// LOAD: blockify `<data>/<name>.csv` and register the object.
///
/// On a failed blockify the partially written blocks are unloaded before
/// the error surfaces, leaving the catalog in its pre-command state.
pub(crate) fn run(engine: &mut Engine, name: &str, kind: ObjectKind) -> DbResult<CommandOutput> {
    if engine.catalog.contains(name) {
        return Err(DbError::Catalog(format!("name '{name}' is already loaded")));
    }
    let csv = engine.config.csv_path(name);

    match kind {
        ObjectKind::Table => match table::load(name, &csv, engine.policy, &mut engine.pool) {
            Ok(mut meta) => {
                meta.permanent = true;
                let rows = meta.row_count;
                let blocks = meta.block_count;
                engine.catalog.insert_table(meta)?;
                Ok(CommandOutput::Message(format!(
                    "loaded table '{name}' ({rows} rows, {blocks} blocks)"
                )))
            }
            Err(e) => {
                engine.pool.delete_all_blocks(name);
                Err(e)
            }
        },
        ObjectKind::Matrix => match matrix::load(name, &csv, engine.policy, &mut engine.pool) {
            Ok(mut meta) => {
                meta.permanent = true;
                let dimension = meta.dimension;
                let blocks = meta.block_count;
                engine.catalog.insert_matrix(meta)?;
                Ok(CommandOutput::Message(format!(
                    "loaded matrix '{name}' ({dimension}x{dimension}, {blocks} blocks)"
                )))
            }
            Err(e) => {
                engine.pool.delete_all_blocks(name);
                Err(e)
            }
        },
    }
}
