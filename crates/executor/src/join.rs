use crate::{merged_columns, register_table, result_table, CommandOutput, Engine};
use buffer::Cursor;
use common::DbResult;
use parser::BinOp;
use table::BlockWriter;

/// `NEW = JOIN t1, t2 ON c1 op c2`: block nested-loop join. The inner table
/// is rescanned per outer row; both scans go through the pool, so at most
/// two pages are resident for the operator at any moment.
pub(crate) fn run(
    engine: &mut Engine,
    target: &str,
    left_name: &str,
    right_name: &str,
    left_column: &str,
    op: BinOp,
    right_column: &str,
) -> DbResult<CommandOutput> {
    let left = engine.catalog.table(left_name)?.clone();
    let right = engine.catalog.table(right_name)?.clone();
    let left_ordinal = left.require_column(left_column)?;
    let right_ordinal = right.require_column(right_column)?;

    let columns = merged_columns(&left, &right, right_name)?;
    let mut writer = BlockWriter::new(result_table(engine, target, columns)?);

    let mut outer = Cursor::new(&left.name, left.block_count);
    while let Some(left_row) = outer.next_row(&mut engine.pool)? {
        let mut inner = Cursor::new(&right.name, right.block_count);
        while let Some(right_row) = inner.next_row(&mut engine.pool)? {
            if op.eval(left_row[left_ordinal], right_row[right_ordinal]) {
                let mut joined = left_row.clone();
                joined.extend_from_slice(&right_row);
                writer.push(joined, &mut engine.pool)?;
            }
        }
    }

    let meta = writer.finish(&mut engine.pool)?;
    register_table(engine, meta)
}
