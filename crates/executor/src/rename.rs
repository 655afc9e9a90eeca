use crate::{CommandOutput, Engine};
use catalog::CatalogEntry;
use common::{DbError, DbResult};

/// RENAME: move every block file and resident page, then re-key the catalog.
pub(crate) fn run(engine: &mut Engine, old: &str, new: &str) -> DbResult<CommandOutput> {
    if engine.catalog.contains(new) {
        return Err(DbError::Catalog(format!("name '{new}' is already in use")));
    }
    let is_table = matches!(engine.catalog.entry(old)?, CatalogEntry::Table(_));
    if is_table {
        table::rename(engine.catalog.table_mut(old)?, new, &mut engine.pool)?;
    } else {
        matrix::rename(engine.catalog.matrix_mut(old)?, new, &mut engine.pool)?;
    }
    engine.catalog.rename(old, new)?;
    Ok(CommandOutput::Message(format!("renamed '{old}' to '{new}'")))
}
