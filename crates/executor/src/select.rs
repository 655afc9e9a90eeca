use crate::{register_table, result_table, CommandOutput, Engine};
use buffer::Cursor;
use common::DbResult;
use parser::{BinOp, SelectRhs};
use table::BlockWriter;

/// `NEW = SELECT col op rhs FROM t`: one streaming pass over the source.
pub(crate) fn run(
    engine: &mut Engine,
    target: &str,
    column: &str,
    op: BinOp,
    rhs: &SelectRhs,
    table_name: &str,
) -> DbResult<CommandOutput> {
    let src = engine.catalog.table(table_name)?.clone();
    let lhs_ordinal = src.require_column(column)?;
    let rhs_ordinal = match rhs {
        SelectRhs::Literal(_) => None,
        SelectRhs::Column(name) => Some(src.require_column(name)?),
    };

    let mut writer = BlockWriter::new(result_table(engine, target, src.columns.clone())?);
    let mut cursor = Cursor::new(&src.name, src.block_count);
    while let Some(row) = cursor.next_row(&mut engine.pool)? {
        let keep = match (rhs, rhs_ordinal) {
            (SelectRhs::Literal(value), _) => op.eval(row[lhs_ordinal], *value),
            (SelectRhs::Column(_), Some(ordinal)) => op.eval(row[lhs_ordinal], row[ordinal]),
            (SelectRhs::Column(_), None) => false,
        };
        if keep {
            writer.push(row, &mut engine.pool)?;
        }
    }

    let meta = writer.finish(&mut engine.pool)?;
    register_table(engine, meta)
}
