use crate::{CommandOutput, Engine};
use common::{DbResult, SortDirection};
use table::SortKey;

/// SORT: external-merge sort the table in place by the key vector.
pub(crate) fn run(
    engine: &mut Engine,
    table_name: &str,
    columns: &[String],
    directions: &[SortDirection],
) -> DbResult<CommandOutput> {
    let keys = {
        let meta = engine.catalog.table(table_name)?;
        columns
            .iter()
            .zip(directions)
            .map(|(column, direction)| {
                Ok(SortKey {
                    column: meta.require_column(column)?,
                    direction: *direction,
                })
            })
            .collect::<DbResult<Vec<_>>>()?
    };
    table::sort(engine.catalog.table_mut(table_name)?, &keys, &mut engine.pool)?;
    Ok(CommandOutput::Message(format!("sorted '{table_name}'")))
}
