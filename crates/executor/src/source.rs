use crate::{render, CommandOutput, Engine};
use common::{DbError, DbResult};
use std::fs;
use std::path::PathBuf;

/// SOURCE: run a script of commands, one per line. Blank lines and `--`
/// comments are skipped; the first failing line aborts the script with its
/// line number.
pub(crate) fn run(engine: &mut Engine, script: &str) -> DbResult<CommandOutput> {
    let path = resolve(engine, script);
    let text = fs::read_to_string(&path)
        .map_err(|e| DbError::Storage(format!("cannot open script '{}': {e}", path.display())))?;

    let mut transcript = Vec::new();
    let mut executed = 0usize;
    for (number, line) in text.lines().enumerate() {
        if parser::is_blank_or_comment(line) {
            continue;
        }
        let output = engine
            .execute_line(line)
            .map_err(|e| DbError::Executor(format!("{}:{}: {e}", path.display(), number + 1)))?;
        if matches!(output, CommandOutput::Quit) {
            break;
        }
        if let Some(rendered) = render(&output) {
            transcript.push(rendered);
        }
        executed += 1;
    }

    transcript.push(format!(
        "ran {executed} commands from '{}'",
        path.display()
    ));
    Ok(CommandOutput::Message(transcript.join("\n")))
}

/// A script name resolves as given, then relative to the data directory.
fn resolve(engine: &Engine, script: &str) -> PathBuf {
    let direct = PathBuf::from(script);
    if direct.exists() {
        return direct;
    }
    engine.config.data_dir.join(script)
}
