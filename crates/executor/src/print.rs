use crate::{CommandOutput, Engine};
use catalog::CatalogEntry;
use common::DbResult;

/// PRINT: show the first `print_count` rows of a table, or the leading
/// `print_count x print_count` window of a matrix.
pub(crate) fn run(engine: &mut Engine, name: &str) -> DbResult<CommandOutput> {
    let limit = engine.config.print_count;
    match engine.catalog.entry(name)? {
        CatalogEntry::Table(meta) => {
            let meta = meta.clone();
            let rows = table::first_rows(&meta, &mut engine.pool, limit)?;
            Ok(CommandOutput::Table {
                headers: meta.columns,
                rows,
            })
        }
        CatalogEntry::Matrix(meta) => {
            let meta = meta.clone();
            let rows = matrix::first_rows(&meta, &mut engine.pool, limit)?;
            Ok(CommandOutput::Matrix { rows })
        }
    }
}
