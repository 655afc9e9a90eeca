use crate::{CommandOutput, Engine};
use catalog::CatalogEntry;
use common::DbResult;

/// EXPORT: write the object as `<data>/<name>.csv` and mark it permanent.
pub(crate) fn run(engine: &mut Engine, name: &str) -> DbResult<CommandOutput> {
    let out_path = engine.config.csv_path(name);
    let is_table = matches!(engine.catalog.entry(name)?, CatalogEntry::Table(_));
    if is_table {
        let meta = engine.catalog.table(name)?.clone();
        table::export(&meta, &mut engine.pool, &out_path)?;
        let meta = engine.catalog.table_mut(name)?;
        meta.permanent = true;
        meta.source_path = out_path.clone();
    } else {
        let meta = engine.catalog.matrix(name)?.clone();
        matrix::export(&meta, &mut engine.pool, &out_path)?;
        let meta = engine.catalog.matrix_mut(name)?;
        meta.permanent = true;
        meta.source_path = out_path.clone();
    }
    Ok(CommandOutput::Message(format!(
        "exported '{name}' to '{}'",
        out_path.display()
    )))
}
