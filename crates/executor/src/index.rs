use crate::{CommandOutput, Engine};
use catalog::TableIndex;
use common::{DbResult, IndexStrategy};

/// INDEX: record (or clear) index metadata on a table column. No index
/// structure is built; the strategy tag is catalog state.
pub(crate) fn run(
    engine: &mut Engine,
    table: &str,
    column: &str,
    strategy: Option<IndexStrategy>,
) -> DbResult<CommandOutput> {
    let meta = engine.catalog.table_mut(table)?;
    let ordinal = meta.require_column(column)?;
    match strategy {
        Some(strategy) => {
            meta.index = Some(TableIndex {
                column: ordinal,
                strategy,
            });
            Ok(CommandOutput::Message(format!(
                "indexed '{table}' on '{column}'"
            )))
        }
        None => {
            meta.index = None;
            Ok(CommandOutput::Message(format!(
                "dropped index metadata on '{table}'"
            )))
        }
    }
}
