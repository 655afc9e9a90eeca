use anyhow::Result;
use clap::Parser;
use common::{BLOCK_COUNT, BLOCK_SIZE_KB, Config, PRINT_COUNT};
use executor::{CommandOutput, Engine};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::path::PathBuf;

const DEFAULT_DATA_DIR: &str = "./data";

#[derive(Parser, Debug)]
#[command(name = "minira", about = "Interactive console for the block engine")]
struct Args {
    /// Directory containing permanent CSVs; block files live under temp/
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    data_dir: PathBuf,
    /// Size of one block file in kilobytes
    #[arg(long, default_value_t = BLOCK_SIZE_KB)]
    block_size_kb: usize,
    /// Number of pages the buffer pool keeps resident
    #[arg(long, default_value_t = BLOCK_COUNT)]
    block_count: usize,
    /// Row limit for PRINT output
    #[arg(long, default_value_t = PRINT_COUNT)]
    print_count: usize,
    /// Execute one command and exit instead of starting the console
    #[arg(short = 'e', long = "execute")]
    execute: Option<String>,
    /// Run a command script and exit
    script: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    let args = Args::parse();

    let config = Config::builder()
        .data_dir(args.data_dir)
        .block_size(args.block_size_kb * 1000)
        .buffer_capacity(args.block_count)
        .print_count(args.print_count)
        .build();
    let mut engine = Engine::new(config)?;

    if let Some(line) = args.execute {
        run_line(&mut engine, &line)?;
    } else if let Some(script) = args.script {
        run_line(&mut engine, &format!("SOURCE {}", script.display()))?;
    } else {
        repl(&mut engine)?;
    }

    engine.flush()?;
    Ok(())
}

/// One-shot mode: errors are fatal and set the exit code.
fn run_line(engine: &mut Engine, line: &str) -> Result<()> {
    let output = engine.execute_line(line)?;
    if let Some(rendered) = executor::render(&output) {
        println!("{rendered}");
    }
    Ok(())
}

/// Interactive loop: a failing command prints one error line and the
/// session continues.
fn repl(engine: &mut Engine) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    loop {
        match editor.readline("minira> ") {
            Ok(line) => {
                if parser::is_blank_or_comment(&line) {
                    continue;
                }
                let _ = editor.add_history_entry(&line);
                match engine.execute_line(&line) {
                    Ok(CommandOutput::Quit) => break,
                    Ok(output) => {
                        if let Some(rendered) = executor::render(&output) {
                            println!("{rendered}");
                        }
                    }
                    Err(e) => println!("error: {e}"),
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
