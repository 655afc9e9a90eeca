use crate::{register_table, result_table, CommandOutput, Engine};
use buffer::Cursor;
use common::{DbResult, SortDirection};
use table::{BlockWriter, SortKey};

/// `NEW = ORDERBY col ASC|DESC ON t`: copy the table, then external-merge
/// sort the copy by the single key. The source stays untouched.
pub(crate) fn run(
    engine: &mut Engine,
    target: &str,
    column: &str,
    direction: SortDirection,
    table_name: &str,
) -> DbResult<CommandOutput> {
    let src = engine.catalog.table(table_name)?.clone();
    let ordinal = src.require_column(column)?;

    let mut writer = BlockWriter::new(result_table(engine, target, src.columns.clone())?);
    let mut cursor = Cursor::new(&src.name, src.block_count);
    while let Some(row) = cursor.next_row(&mut engine.pool)? {
        writer.push(row, &mut engine.pool)?;
    }
    let mut meta = writer.finish(&mut engine.pool)?;

    table::sort(
        &mut meta,
        &[SortKey {
            column: ordinal,
            direction,
        }],
        &mut engine.pool,
    )?;
    register_table(engine, meta)
}
