#[cfg(test)]
mod tests;

pub mod policy;
pub mod pretty;

use serde::{Deserialize, Serialize};
use std::{io, path::PathBuf};
use thiserror::Error;

/// A single stored cell. All engine storage is homogeneously typed.
/// Examples:
/// - `let c: Cell = -7;`
/// - `let row: Vec<Cell> = vec![1, 2, 3];`
pub type Cell = i32;

/// On-disk footprint of one cell inside a block.
pub const CELL_BYTES: usize = std::mem::size_of::<Cell>();

/// Nominal block size in kilobytes.
pub const BLOCK_SIZE_KB: usize = 1;

/// Number of pages the buffer pool keeps resident.
pub const BLOCK_COUNT: usize = 8;

/// Maximum number of rows PRINT shows for any object.
pub const PRINT_COUNT: usize = 20;

/// Index of a column within a table schema.
pub type ColumnId = usize;

/// Index of a block within a logical object's block sequence.
pub type BlockId = usize;

/// Per-key direction for sort and ORDERBY commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Index implementations the catalog can record for a table column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexStrategy {
    BTree,
    Hash,
}

/// Canonical error type shared across engine subsystems.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("parse: {0}")]
    Parse(String),
    #[error("catalog: {0}")]
    Catalog(String),
    #[error("storage: {0}")]
    Storage(String),
    #[error("capacity: {0}")]
    Capacity(String),
    #[error("exec: {0}")]
    Executor(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result alias that carries a `DbError`.
pub type DbResult<T> = Result<T, DbError>;

/// Runtime configuration for the engine.
///
/// Defaults mirror the engine constants; `block_size` is carried in bytes so
/// tests can shrink blocks below one kilobyte while the CLI stays in KB.
///
/// # Example
/// ```
/// use common::Config;
/// use std::path::PathBuf;
///
/// let config = Config::builder()
///     .data_dir(PathBuf::from("./my_data"))
///     .block_size(64)
///     .buffer_capacity(4)
///     .build();
/// assert_eq!(config.temp_dir(), PathBuf::from("./my_data/temp"));
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, bon::Builder)]
pub struct Config {
    /// Directory holding permanent CSVs; block files live under `temp/`.
    #[builder(default = PathBuf::from("./data"))]
    pub data_dir: PathBuf,
    /// Size of one block file in bytes.
    #[builder(default = BLOCK_SIZE_KB * 1000)]
    pub block_size: usize,
    /// Number of pages the buffer pool keeps resident.
    #[builder(default = BLOCK_COUNT)]
    pub buffer_capacity: usize,
    /// Row (and matrix column) limit for PRINT.
    #[builder(default = PRINT_COUNT)]
    pub print_count: usize,
}

impl Config {
    /// Directory where block files are written.
    pub fn temp_dir(&self) -> PathBuf {
        self.data_dir.join("temp")
    }

    /// Path of the permanent CSV for a named object.
    pub fn csv_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{name}.csv"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            block_size: BLOCK_SIZE_KB * 1000,
            buffer_capacity: BLOCK_COUNT,
            print_count: PRINT_COUNT,
        }
    }
}

/// Convenient re-exports for downstream crates.
pub mod prelude {
    pub use crate::policy::BlockPolicy;
    pub use crate::{BlockId, Cell, ColumnId, Config, DbError, DbResult, IndexStrategy, SortDirection};
}
