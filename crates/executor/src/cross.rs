use crate::{merged_columns, register_table, result_table, CommandOutput, Engine};
use buffer::Cursor;
use common::DbResult;
use table::BlockWriter;

/// `NEW = CROSS t1 t2`: every pairing of rows from both tables.
pub(crate) fn run(
    engine: &mut Engine,
    target: &str,
    left_name: &str,
    right_name: &str,
) -> DbResult<CommandOutput> {
    let left = engine.catalog.table(left_name)?.clone();
    let right = engine.catalog.table(right_name)?.clone();

    let columns = merged_columns(&left, &right, right_name)?;
    let mut writer = BlockWriter::new(result_table(engine, target, columns)?);

    let mut outer = Cursor::new(&left.name, left.block_count);
    while let Some(left_row) = outer.next_row(&mut engine.pool)? {
        let mut inner = Cursor::new(&right.name, right.block_count);
        while let Some(right_row) = inner.next_row(&mut engine.pool)? {
            let mut paired = left_row.clone();
            paired.extend_from_slice(&right_row);
            writer.push(paired, &mut engine.pool)?;
        }
    }

    let meta = writer.finish(&mut engine.pool)?;
    register_table(engine, meta)
}
