use crate::{CommandOutput, Engine};
use common::DbResult;

/// CLEAR: unload the object and delete its block files. A permanent CSV
/// under the data directory is left alone.
pub(crate) fn run(engine: &mut Engine, name: &str) -> DbResult<CommandOutput> {
    let entry = engine.catalog.remove(name)?;
    engine.pool.delete_blocks(name, entry.block_count());
    Ok(CommandOutput::Message(format!("cleared '{name}'")))
}
