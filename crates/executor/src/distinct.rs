use crate::{register_table, result_table, CommandOutput, Engine};
use ahash::RandomState;
use buffer::Cursor;
use common::{Cell, DbResult};
use hashbrown::HashSet;
use table::BlockWriter;

/// `NEW = DISTINCT t`: drop duplicate rows, keeping first occurrences in
/// source order.
pub(crate) fn run(engine: &mut Engine, target: &str, table_name: &str) -> DbResult<CommandOutput> {
    let src = engine.catalog.table(table_name)?.clone();

    let mut writer = BlockWriter::new(result_table(engine, target, src.columns.clone())?);
    let mut seen: HashSet<Vec<Cell>, RandomState> = HashSet::default();

    let mut cursor = Cursor::new(&src.name, src.block_count);
    while let Some(row) = cursor.next_row(&mut engine.pool)? {
        if seen.insert(row.clone()) {
            writer.push(row, &mut engine.pool)?;
        }
    }

    let meta = writer.finish(&mut engine.pool)?;
    register_table(engine, meta)
}
