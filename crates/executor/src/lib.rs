//! Command execution: thin orchestrations over the storage core.
//!
//! The [`Engine`] owns the catalog, the buffer pool and the configuration --
//! one explicit value passed into every handler, no global singletons. Each
//! command family lives in its own module; row-producing operations stream
//! through a [`buffer::Cursor`] and materialize their result with the table
//! [`table::BlockWriter`], so nothing above the pool ever holds more than the
//! pool's capacity in pages.
//!
//! # Example
//!
//! ```no_run
//! use common::Config;
//! use executor::Engine;
//!
//! let mut engine = Engine::new(Config::default()).unwrap();
//! engine.execute_line("LOAD trips").unwrap();
//! let out = engine.execute_line("r = SELECT fare > 10 FROM trips").unwrap();
//! println!("{}", executor::render(&out).unwrap_or_default());
//! ```

mod clear;
mod cross;
mod distinct;
mod export;
mod groupby;
mod index;
mod join;
mod list;
mod load;
mod matrix_ops;
mod orderby;
mod print;
mod project;
mod rename;
mod select;
mod sort_cmd;
mod source;
#[cfg(test)]
extern crate self as executor;
#[cfg(test)]
#[path = "../../testsupport/src/lib.rs"]
mod testsupport;

use std::fs;

use buffer::BufferManager;
use catalog::{Catalog, TableMeta};
use common::policy::BlockPolicy;
use common::pretty::{self, TableStyleKind};
use common::{Cell, Config, DbError, DbResult};
use parser::{Command, Operation};

/// What a command hands back to the caller for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutput {
    None,
    Message(String),
    Table {
        headers: Vec<String>,
        rows: Vec<Vec<Cell>>,
    },
    Matrix {
        rows: Vec<Vec<Cell>>,
    },
    Listing {
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    Quit,
}

/// Render an output for the terminal; `None` when there is nothing to show.
pub fn render(output: &CommandOutput) -> Option<String> {
    match output {
        CommandOutput::None | CommandOutput::Quit => None,
        CommandOutput::Message(text) => Some(text.clone()),
        CommandOutput::Table { headers, rows } => {
            Some(pretty::render_cell_rows(headers, rows, TableStyleKind::Modern))
        }
        CommandOutput::Matrix { rows } => Some(pretty::format_matrix_rows(rows)),
        CommandOutput::Listing { headers, rows } => {
            let headers: Vec<&str> = headers.iter().map(String::as_str).collect();
            Some(pretty::render_string_table(
                &headers,
                rows.clone(),
                TableStyleKind::Modern,
            ))
        }
    }
}

/// The engine: catalog + buffer pool + configuration.
pub struct Engine {
    pub(crate) config: Config,
    pub(crate) catalog: Catalog,
    pub(crate) pool: BufferManager,
    pub(crate) policy: BlockPolicy,
}

impl Engine {
    /// Build an engine over an existing data directory. The block directory
    /// underneath it is created on demand.
    pub fn new(config: Config) -> DbResult<Self> {
        if !config.data_dir.is_dir() {
            return Err(DbError::Storage(format!(
                "data directory '{}' not found",
                config.data_dir.display()
            )));
        }
        fs::create_dir_all(config.temp_dir())?;
        let pool = BufferManager::new(config.temp_dir(), config.buffer_capacity);
        let policy = BlockPolicy::new(config.block_size);
        Ok(Self {
            config,
            catalog: Catalog::new(),
            pool,
            policy,
        })
    }

    /// Parse and execute one command line.
    pub fn execute_line(&mut self, line: &str) -> DbResult<CommandOutput> {
        let command = parser::parse_command(line)?;
        self.execute(command)
    }

    /// Execute one parsed command.
    pub fn execute(&mut self, command: Command) -> DbResult<CommandOutput> {
        match command {
            Command::Load { name, kind } => load::run(self, &name, kind),
            Command::List { kind } => list::run(self, kind),
            Command::Print { name } => print::run(self, &name),
            Command::Rename { old, new } => rename::run(self, &old, &new),
            Command::Export { name } => export::run(self, &name),
            Command::Clear { name } => clear::run(self, &name),
            Command::Index {
                table,
                column,
                strategy,
            } => index::run(self, &table, &column, strategy),
            Command::Sort {
                table,
                columns,
                directions,
            } => sort_cmd::run(self, &table, &columns, &directions),
            Command::Symmetry { matrix } => matrix_ops::symmetry(self, &matrix),
            Command::Transpose { matrix } => matrix_ops::transpose(self, &matrix),
            Command::Source { script } => source::run(self, &script),
            Command::Quit => Ok(CommandOutput::Quit),
            Command::Assign { target, operation } => self.execute_assignment(&target, operation),
        }
    }

    fn execute_assignment(&mut self, target: &str, operation: Operation) -> DbResult<CommandOutput> {
        if self.catalog.contains(target) {
            return Err(DbError::Catalog(format!(
                "name '{target}' is already in use"
            )));
        }
        match operation {
            Operation::Select {
                column,
                op,
                rhs,
                table,
            } => select::run(self, target, &column, op, &rhs, &table),
            Operation::Project { columns, table } => project::run(self, target, &columns, &table),
            Operation::Join {
                left,
                right,
                left_column,
                op,
                right_column,
            } => join::run(self, target, &left, &right, &left_column, op, &right_column),
            Operation::Cross { left, right } => cross::run(self, target, &left, &right),
            Operation::Distinct { table } => distinct::run(self, target, &table),
            Operation::GroupBy {
                group_column,
                table,
                aggregate,
                agg_column,
            } => groupby::run(self, target, &group_column, &table, aggregate, &agg_column),
            Operation::OrderBy {
                column,
                direction,
                table,
            } => orderby::run(self, target, &column, direction, &table),
            Operation::Compute { matrix } => matrix_ops::compute(self, target, &matrix),
        }
    }

    /// Write every dirty resident page back to disk.
    pub fn flush(&mut self) -> DbResult<()> {
        self.pool.flush()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn pool(&self) -> &BufferManager {
        &self.pool
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Metadata for a table a command is about to materialize. Derived tables
/// are temporary: their source path points under the block directory until
/// EXPORT promotes them.
pub(crate) fn result_table(
    engine: &Engine,
    target: &str,
    columns: Vec<String>,
) -> DbResult<TableMeta> {
    let max_rows_per_block = engine.policy.rows_per_block(columns.len())?;
    TableMeta::new(
        target,
        engine.config.temp_dir().join(format!("{target}.csv")),
        columns,
        max_rows_per_block,
    )
}

/// Register a finished result table and report its row count.
pub(crate) fn register_table(engine: &mut Engine, meta: TableMeta) -> DbResult<CommandOutput> {
    let name = meta.name.clone();
    let rows = meta.row_count;
    engine.catalog.insert_table(meta)?;
    Ok(CommandOutput::Message(format!(
        "created table '{name}' ({rows} rows)"
    )))
}

/// Column headers for a two-table result, disambiguating collisions with
/// the right table's name.
pub(crate) fn merged_columns(
    left: &TableMeta,
    right: &TableMeta,
    right_name: &str,
) -> DbResult<Vec<String>> {
    let mut columns = left.columns.clone();
    for column in &right.columns {
        let name = if columns.contains(column) {
            format!("{right_name}_{column}")
        } else {
            column.clone()
        };
        if columns.contains(&name) {
            return Err(DbError::Executor(format!(
                "cannot disambiguate column '{column}' in two-table result"
            )));
        }
        columns.push(name);
    }
    Ok(columns)
}
