use crate::{register_table, result_table, CommandOutput, Engine};
use buffer::Cursor;
use common::DbResult;
use table::BlockWriter;

/// `NEW = PROJECT c1, c2, ... FROM t`: keep the named columns, in the
/// requested order.
pub(crate) fn run(
    engine: &mut Engine,
    target: &str,
    columns: &[String],
    table_name: &str,
) -> DbResult<CommandOutput> {
    let src = engine.catalog.table(table_name)?.clone();
    let ordinals = columns
        .iter()
        .map(|column| src.require_column(column))
        .collect::<DbResult<Vec<_>>>()?;

    let mut writer = BlockWriter::new(result_table(engine, target, columns.to_vec())?);
    let mut cursor = Cursor::new(&src.name, src.block_count);
    while let Some(row) = cursor.next_row(&mut engine.pool)? {
        let projected = ordinals.iter().map(|&ordinal| row[ordinal]).collect();
        writer.push(projected, &mut engine.pool)?;
    }

    let meta = writer.finish(&mut engine.pool)?;
    register_table(engine, meta)
}
