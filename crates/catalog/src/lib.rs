//! Process-wide registry of loaded tables and matrices.
//!
//! The catalog lives only for the life of the process; persisted state
//! between commands consists solely of block files and permanent CSVs.

use std::path::PathBuf;

use ahash::RandomState;
use common::{BlockId, Cell, ColumnId, DbError, DbResult, IndexStrategy};
use hashbrown::{HashMap, HashSet};

type Map<K, V> = HashMap<K, V, RandomState>;
type Set<T> = HashSet<T, RandomState>;

/// Index metadata recorded on a table by the INDEX command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TableIndex {
    pub column: ColumnId,
    pub strategy: IndexStrategy,
}

/// Metadata describing a loaded row table.
#[derive(Clone, Debug)]
pub struct TableMeta {
    pub name: String,
    pub source_path: PathBuf,
    pub columns: Vec<String>,
    pub row_count: usize,
    pub block_count: usize,
    pub max_rows_per_block: usize,
    pub rows_per_block: Vec<usize>,
    pub distinct_values: Vec<Set<Cell>>,
    pub index: Option<TableIndex>,
    /// Permanent objects have a CSV under the data directory; EXPORT sets it.
    pub permanent: bool,
    name_to_ordinal: Map<String, ColumnId>,
}

impl TableMeta {
    pub fn new(
        name: impl Into<String>,
        source_path: impl Into<PathBuf>,
        columns: Vec<String>,
        max_rows_per_block: usize,
    ) -> DbResult<Self> {
        if columns.is_empty() {
            return Err(DbError::Catalog("table must have at least one column".into()));
        }
        let mut name_to_ordinal = Map::default();
        for (ordinal, column) in columns.iter().enumerate() {
            if name_to_ordinal.insert(column.clone(), ordinal).is_some() {
                return Err(DbError::Catalog(format!("duplicate column '{column}'")));
            }
        }
        let column_count = columns.len();
        Ok(Self {
            name: name.into(),
            source_path: source_path.into(),
            columns,
            row_count: 0,
            block_count: 0,
            max_rows_per_block,
            rows_per_block: Vec::new(),
            distinct_values: vec![Set::default(); column_count],
            index: None,
            permanent: false,
            name_to_ordinal,
        })
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Ordinal of a column name, if present.
    pub fn column_index(&self, name: &str) -> Option<ColumnId> {
        self.name_to_ordinal.get(name).copied()
    }

    /// Ordinal of a column name, or a catalog error naming the table.
    pub fn require_column(&self, name: &str) -> DbResult<ColumnId> {
        self.column_index(name).ok_or_else(|| {
            DbError::Catalog(format!("unknown column '{name}' on table '{}'", self.name))
        })
    }

    /// Account one flushed block and fold its rows into the statistics.
    pub fn record_block(&mut self, rows_in_block: usize) {
        self.rows_per_block.push(rows_in_block);
        self.block_count += 1;
        self.row_count += rows_in_block;
    }

    /// Fold one row into the per-column distinct-value sets.
    pub fn note_row(&mut self, row: &[Cell]) {
        for (set, cell) in self.distinct_values.iter_mut().zip(row) {
            set.insert(*cell);
        }
    }

    pub fn distinct_count(&self, column: ColumnId) -> usize {
        self.distinct_values.get(column).map_or(0, Set::len)
    }

    /// Rows accounted across all blocks; equals `row_count` by invariant.
    pub fn accounted_rows(&self) -> usize {
        self.rows_per_block.iter().sum()
    }
}

/// Metadata describing a loaded square-tiled matrix.
#[derive(Clone, Debug)]
pub struct MatrixMeta {
    pub name: String,
    /// Name the matrix was loaded under; rename does not touch it.
    pub original_name: String,
    pub source_path: PathBuf,
    pub dimension: usize,
    /// Side length `m` of an interior tile.
    pub tile_side: usize,
    /// Tiles per row-stripe: ceil(dimension / tile_side).
    pub tiles_per_stripe: usize,
    pub block_count: usize,
    pub dims_per_block: Vec<(usize, usize)>,
    pub symmetric: Option<bool>,
    pub permanent: bool,
}

impl MatrixMeta {
    pub fn new(
        name: impl Into<String>,
        source_path: impl Into<PathBuf>,
        dimension: usize,
        tile_side: usize,
    ) -> Self {
        let name = name.into();
        let tiles_per_stripe = dimension.div_ceil(tile_side);
        Self {
            original_name: name.clone(),
            name,
            source_path: source_path.into(),
            dimension,
            tile_side,
            tiles_per_stripe,
            block_count: 0,
            dims_per_block: Vec::new(),
            symmetric: None,
            permanent: false,
        }
    }

    /// Linear block index of tile `(i, j)`.
    pub fn tile_index(&self, i: usize, j: usize) -> BlockId {
        i * self.tiles_per_stripe + j
    }

    /// Recorded dimensions of tile `(i, j)`.
    pub fn tile_dims(&self, i: usize, j: usize) -> (usize, usize) {
        self.dims_per_block[self.tile_index(i, j)]
    }
}

/// A registered logical object.
#[derive(Clone, Debug)]
pub enum CatalogEntry {
    Table(TableMeta),
    Matrix(MatrixMeta),
}

impl CatalogEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::Table(t) => &t.name,
            Self::Matrix(m) => &m.name,
        }
    }

    pub fn block_count(&self) -> usize {
        match self {
            Self::Table(t) => t.block_count,
            Self::Matrix(m) => m.block_count,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Table(_) => "table",
            Self::Matrix(_) => "matrix",
        }
    }

    fn set_name(&mut self, name: &str) {
        match self {
            Self::Table(t) => t.name = name.to_string(),
            Self::Matrix(m) => m.name = name.to_string(),
        }
    }
}

/// Name -> object registry. Names are unique across both kinds.
#[derive(Debug, Default)]
pub struct Catalog {
    entries: Map<String, CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_free(&self, name: &str) -> DbResult<()> {
        if let Some(existing) = self.entries.get(name) {
            return Err(DbError::Catalog(format!(
                "name '{name}' already registered as a {}",
                existing.kind()
            )));
        }
        Ok(())
    }

    pub fn insert_table(&mut self, meta: TableMeta) -> DbResult<()> {
        self.check_free(&meta.name)?;
        self.entries.insert(meta.name.clone(), CatalogEntry::Table(meta));
        Ok(())
    }

    pub fn insert_matrix(&mut self, meta: MatrixMeta) -> DbResult<()> {
        self.check_free(&meta.name)?;
        self.entries
            .insert(meta.name.clone(), CatalogEntry::Matrix(meta));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn entry(&self, name: &str) -> DbResult<&CatalogEntry> {
        self.entries
            .get(name)
            .ok_or_else(|| DbError::Catalog(format!("unknown name '{name}'")))
    }

    pub fn table(&self, name: &str) -> DbResult<&TableMeta> {
        match self.entries.get(name) {
            Some(CatalogEntry::Table(meta)) => Ok(meta),
            Some(CatalogEntry::Matrix(_)) => {
                Err(DbError::Catalog(format!("'{name}' is a matrix, not a table")))
            }
            None => Err(DbError::Catalog(format!("unknown table '{name}'"))),
        }
    }

    pub fn table_mut(&mut self, name: &str) -> DbResult<&mut TableMeta> {
        match self.entries.get_mut(name) {
            Some(CatalogEntry::Table(meta)) => Ok(meta),
            Some(CatalogEntry::Matrix(_)) => {
                Err(DbError::Catalog(format!("'{name}' is a matrix, not a table")))
            }
            None => Err(DbError::Catalog(format!("unknown table '{name}'"))),
        }
    }

    pub fn matrix(&self, name: &str) -> DbResult<&MatrixMeta> {
        match self.entries.get(name) {
            Some(CatalogEntry::Matrix(meta)) => Ok(meta),
            Some(CatalogEntry::Table(_)) => {
                Err(DbError::Catalog(format!("'{name}' is a table, not a matrix")))
            }
            None => Err(DbError::Catalog(format!("unknown matrix '{name}'"))),
        }
    }

    pub fn matrix_mut(&mut self, name: &str) -> DbResult<&mut MatrixMeta> {
        match self.entries.get_mut(name) {
            Some(CatalogEntry::Matrix(meta)) => Ok(meta),
            Some(CatalogEntry::Table(_)) => {
                Err(DbError::Catalog(format!("'{name}' is a table, not a matrix")))
            }
            None => Err(DbError::Catalog(format!("unknown matrix '{name}'"))),
        }
    }

    /// Remove and return an entry; the caller deletes its block files.
    pub fn remove(&mut self, name: &str) -> DbResult<CatalogEntry> {
        self.entries
            .remove(name)
            .ok_or_else(|| DbError::Catalog(format!("unknown name '{name}'")))
    }

    /// Re-key an entry and rewrite its embedded name.
    pub fn rename(&mut self, old: &str, new: &str) -> DbResult<()> {
        self.check_free(new)?;
        let mut entry = self.remove(old)?;
        entry.set_name(new);
        self.entries.insert(new.to_string(), entry);
        Ok(())
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableMeta> {
        self.entries.values().filter_map(|entry| match entry {
            CatalogEntry::Table(meta) => Some(meta),
            CatalogEntry::Matrix(_) => None,
        })
    }

    pub fn matrices(&self) -> impl Iterator<Item = &MatrixMeta> {
        self.entries.values().filter_map(|entry| match entry {
            CatalogEntry::Matrix(meta) => Some(meta),
            CatalogEntry::Table(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trips() -> TableMeta {
        TableMeta::new(
            "trips",
            "/data/trips.csv",
            vec!["A".into(), "B".into(), "C".into()],
            83,
        )
        .unwrap()
    }

    #[test]
    fn insert_and_lookup_table() {
        let mut catalog = Catalog::new();
        catalog.insert_table(trips()).unwrap();

        let table = catalog.table("trips").unwrap();
        assert_eq!(table.column_index("B"), Some(1));
        assert_eq!(table.column_count(), 3);
        assert!(catalog.contains("trips"));
    }

    #[test]
    fn duplicate_names_rejected_across_kinds() {
        let mut catalog = Catalog::new();
        catalog.insert_table(trips()).unwrap();

        let err = catalog
            .insert_matrix(MatrixMeta::new("trips", "/data/trips.csv", 4, 2))
            .unwrap_err();
        assert!(format!("{err}").contains("already registered"));
    }

    #[test]
    fn kind_mismatch_is_reported() {
        let mut catalog = Catalog::new();
        catalog.insert_table(trips()).unwrap();

        let err = catalog.matrix("trips").unwrap_err();
        assert!(format!("{err}").contains("is a table"));
    }

    #[test]
    fn rejects_duplicate_columns() {
        let err = TableMeta::new("bad", "/x.csv", vec!["A".into(), "A".into()], 10).unwrap_err();
        assert!(format!("{err}").contains("duplicate column"));
    }

    #[test]
    fn block_accounting_tracks_rows() {
        let mut table = trips();
        table.note_row(&[1, 2, 3]);
        table.note_row(&[1, 5, 6]);
        table.record_block(2);
        table.record_block(1);

        assert_eq!(table.row_count, 3);
        assert_eq!(table.block_count, 2);
        assert_eq!(table.rows_per_block, vec![2, 1]);
        assert_eq!(table.accounted_rows(), table.row_count);
        assert_eq!(table.distinct_count(0), 1);
        assert_eq!(table.distinct_count(1), 2);
    }

    #[test]
    fn matrix_tiles_are_row_major() {
        let mut meta = MatrixMeta::new("m", "/data/m.csv", 3, 2);
        meta.dims_per_block = vec![(2, 2), (2, 1), (1, 2), (1, 1)];
        meta.block_count = 4;

        assert_eq!(meta.tiles_per_stripe, 2);
        assert_eq!(meta.tile_index(1, 0), 2);
        assert_eq!(meta.tile_dims(0, 1), (2, 1));
    }

    #[test]
    fn rename_rekeys_and_rewrites_name() {
        let mut catalog = Catalog::new();
        catalog.insert_table(trips()).unwrap();
        catalog.rename("trips", "journeys").unwrap();

        assert!(catalog.table("trips").is_err());
        assert_eq!(catalog.table("journeys").unwrap().name, "journeys");
    }

    #[test]
    fn rename_into_taken_name_fails() {
        let mut catalog = Catalog::new();
        catalog.insert_table(trips()).unwrap();
        catalog
            .insert_matrix(MatrixMeta::new("m", "/data/m.csv", 4, 2))
            .unwrap();

        assert!(catalog.rename("m", "trips").is_err());
        assert!(catalog.matrix("m").is_ok());
    }

    #[test]
    fn remove_returns_the_entry() {
        let mut catalog = Catalog::new();
        catalog.insert_table(trips()).unwrap();

        let entry = catalog.remove("trips").unwrap();
        assert_eq!(entry.name(), "trips");
        assert!(!catalog.contains("trips"));
        assert!(catalog.remove("trips").is_err());
    }
}
