use super::*;
use buffer::BufferManager;
use catalog::TableMeta;
use common::SortDirection;
use common::policy::BlockPolicy;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

/// Pool over a fresh temp dir; block size 24 bytes = 6 cells = 2 rows of 3.
fn setup() -> (TempDir, BufferManager) {
    let dir = TempDir::new().unwrap();
    let temp = dir.path().join("temp");
    std::fs::create_dir_all(&temp).unwrap();
    (dir, BufferManager::new(temp, 4))
}

fn write_csv(dir: &TempDir, file: &str, text: &str) -> PathBuf {
    let path = dir.path().join(file);
    std::fs::write(&path, text).unwrap();
    path
}

fn all_rows(meta: &TableMeta, pool: &mut BufferManager) -> Vec<Vec<common::Cell>> {
    first_rows(meta, pool, usize::MAX).unwrap()
}

const THREE_COL: &str = "A,B,C\n1,2,3\n4,5,6\n7,8,9\n";

#[test]
fn blockify_splits_rows_and_records_counts() {
    let (dir, mut pool) = setup();
    let csv = write_csv(&dir, "t.csv", THREE_COL);

    let meta = load("t", &csv, BlockPolicy::new(24), &mut pool).unwrap();

    assert_eq!(meta.columns, vec!["A", "B", "C"]);
    assert_eq!(meta.max_rows_per_block, 2);
    assert_eq!(meta.rows_per_block, vec![2, 1]);
    assert_eq!(meta.row_count, 3);
    assert_eq!(meta.block_count, 2);
    assert_eq!(meta.accounted_rows(), meta.row_count);
    for index in 0..meta.block_count {
        assert!(storage::block_path(pool.temp_dir(), "t", index).exists());
    }
    assert_eq!(
        all_rows(&meta, &mut pool),
        vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9]]
    );
}

#[test]
fn blockify_tracks_distinct_values_per_column() {
    let (dir, mut pool) = setup();
    let csv = write_csv(&dir, "t.csv", "A,B\n1,5\n1,6\n2,5\n");

    let meta = load("t", &csv, BlockPolicy::new(24), &mut pool).unwrap();
    assert_eq!(meta.distinct_count(0), 2);
    assert_eq!(meta.distinct_count(1), 2);
}

#[test]
fn blockify_accepts_spaces_after_commas() {
    let (dir, mut pool) = setup();
    let csv = write_csv(&dir, "t.csv", "A, B\n1, 2\n3, 4\n");

    let meta = load("t", &csv, BlockPolicy::new(24), &mut pool).unwrap();
    assert_eq!(meta.columns, vec!["A", "B"]);
    assert_eq!(all_rows(&meta, &mut pool), vec![vec![1, 2], vec![3, 4]]);
}

#[test]
fn blockify_rejects_empty_and_header_only_files() {
    let (dir, mut pool) = setup();
    let empty = write_csv(&dir, "empty.csv", "");
    let header_only = write_csv(&dir, "header.csv", "A,B\n");

    assert!(matches!(
        load("e", &empty, BlockPolicy::new(24), &mut pool).unwrap_err(),
        common::DbError::Parse(_)
    ));
    assert!(matches!(
        load("h", &header_only, BlockPolicy::new(24), &mut pool).unwrap_err(),
        common::DbError::Parse(_)
    ));
}

#[test]
fn blockify_rejects_bad_rows() {
    let (dir, mut pool) = setup();
    let bad_cell = write_csv(&dir, "bad.csv", "A,B\n1,x\n");
    let bad_arity = write_csv(&dir, "arity.csv", "A,B\n1,2,3\n");

    assert!(matches!(
        load("b", &bad_cell, BlockPolicy::new(24), &mut pool).unwrap_err(),
        common::DbError::Parse(_)
    ));
    assert!(matches!(
        load("a", &bad_arity, BlockPolicy::new(24), &mut pool).unwrap_err(),
        common::DbError::Parse(_)
    ));
}

#[test]
fn blockify_rejects_missing_file() {
    let (dir, mut pool) = setup();
    let missing = dir.path().join("absent.csv");
    assert!(matches!(
        load("m", &missing, BlockPolicy::new(24), &mut pool).unwrap_err(),
        common::DbError::Storage(_)
    ));
}

#[test]
fn sort_by_desc_then_asc_orders_rows() {
    let (dir, mut pool) = setup();
    let csv = write_csv(&dir, "t.csv", THREE_COL);
    let mut meta = load("t", &csv, BlockPolicy::new(24), &mut pool).unwrap();

    let keys = [
        SortKey {
            column: 1,
            direction: SortDirection::Desc,
        },
        SortKey {
            column: 0,
            direction: SortDirection::Asc,
        },
    ];
    sort(&mut meta, &keys, &mut pool).unwrap();

    assert_eq!(
        all_rows(&meta, &mut pool),
        vec![vec![7, 8, 9], vec![4, 5, 6], vec![1, 2, 3]]
    );
    assert_eq!(meta.accounted_rows(), meta.row_count);

    // Idempotence under the same key vector.
    sort(&mut meta, &keys, &mut pool).unwrap();
    assert_eq!(
        all_rows(&meta, &mut pool),
        vec![vec![7, 8, 9], vec![4, 5, 6], vec![1, 2, 3]]
    );
}

#[test]
fn sort_merges_many_blocks() {
    let (dir, mut pool) = setup();
    let values = [9, 3, 7, 1, 8, 2, 6, 4, 5];
    let text = format!(
        "V\n{}\n",
        values.map(|v| v.to_string()).join("\n")
    );
    let csv = write_csv(&dir, "t.csv", &text);

    // 8 bytes = 2 cells per block -> 2 rows per block, 5 blocks.
    let mut meta = load("t", &csv, BlockPolicy::new(8), &mut pool).unwrap();
    assert_eq!(meta.block_count, 5);

    sort(
        &mut meta,
        &[SortKey {
            column: 0,
            direction: SortDirection::Asc,
        }],
        &mut pool,
    )
    .unwrap();

    let rows: Vec<i32> = all_rows(&meta, &mut pool).into_iter().map(|r| r[0]).collect();
    assert_eq!(rows, vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
    assert_eq!(meta.row_count, 9);
    assert_eq!(meta.accounted_rows(), 9);
    // No shadow blocks survive the substitution.
    assert!(!storage::block_path(pool.temp_dir(), "t_sorted", 0).exists());
    assert!(!storage::block_path(pool.temp_dir(), "t_merged", 0).exists());
}

#[test]
fn sort_is_stable_on_equal_keys() {
    let (dir, mut pool) = setup();
    let csv = write_csv(&dir, "t.csv", "K,P\n5,1\n5,2\n5,3\n5,4\n5,5\n");

    // 16 bytes = 4 cells -> 2 rows per block, 3 blocks.
    let mut meta = load("t", &csv, BlockPolicy::new(16), &mut pool).unwrap();
    assert_eq!(meta.block_count, 3);

    sort(
        &mut meta,
        &[SortKey {
            column: 0,
            direction: SortDirection::Asc,
        }],
        &mut pool,
    )
    .unwrap();

    let order: Vec<i32> = all_rows(&meta, &mut pool).into_iter().map(|r| r[1]).collect();
    assert_eq!(order, vec![1, 2, 3, 4, 5]);
}

#[test]
fn sort_rejects_bad_keys() {
    let (dir, mut pool) = setup();
    let csv = write_csv(&dir, "t.csv", THREE_COL);
    let mut meta = load("t", &csv, BlockPolicy::new(24), &mut pool).unwrap();

    assert!(sort(&mut meta, &[], &mut pool).is_err());
    assert!(
        sort(
            &mut meta,
            &[SortKey {
                column: 9,
                direction: SortDirection::Asc,
            }],
            &mut pool,
        )
        .is_err()
    );
}

#[test]
fn rename_moves_blocks_and_metadata() {
    let (dir, mut pool) = setup();
    let csv = write_csv(&dir, "t.csv", THREE_COL);
    let mut meta = load("t", &csv, BlockPolicy::new(24), &mut pool).unwrap();

    rename(&mut meta, "u", &mut pool).unwrap();

    assert_eq!(meta.name, "u");
    assert!(!storage::block_path(pool.temp_dir(), "t", 0).exists());
    assert!(storage::block_path(pool.temp_dir(), "u", 0).exists());
    assert_eq!(all_rows(&meta, &mut pool).len(), 3);
}

#[test]
fn export_round_trips_normalized_csv() {
    let (dir, mut pool) = setup();
    let csv = write_csv(&dir, "t.csv", "A, B, C\n1, 2, 3\n4, 5, 6\n7, 8, 9\n");
    let meta = load("t", &csv, BlockPolicy::new(24), &mut pool).unwrap();

    let out = dir.path().join("out.csv");
    export(&meta, &mut pool, &out).unwrap();

    let text = std::fs::read_to_string(&out).unwrap();
    assert_eq!(text, "A, B, C\n1, 2, 3\n4, 5, 6\n7, 8, 9\n");
}

#[test]
fn first_rows_stops_at_the_limit() {
    let (dir, mut pool) = setup();
    let csv = write_csv(&dir, "t.csv", THREE_COL);
    let meta = load("t", &csv, BlockPolicy::new(24), &mut pool).unwrap();

    assert_eq!(
        first_rows(&meta, &mut pool, 2).unwrap(),
        vec![vec![1, 2, 3], vec![4, 5, 6]]
    );
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    // Sort is a permutation ordered by the key vector, and idempotent.
    #[test]
    fn sort_preserves_the_row_multiset(
        rows in prop::collection::vec((-50i32..50, -50i32..50), 1..40),
    ) {
        let (dir, mut pool) = setup();
        let text = format!(
            "X,Y\n{}\n",
            rows.iter()
                .map(|(x, y)| format!("{x},{y}"))
                .collect::<Vec<_>>()
                .join("\n")
        );
        let csv = write_csv(&dir, "t.csv", &text);

        // 16 bytes = 4 cells -> 2 rows per block.
        let mut meta = load("t", &csv, BlockPolicy::new(16), &mut pool).unwrap();
        let keys = [
            SortKey { column: 0, direction: SortDirection::Asc },
            SortKey { column: 1, direction: SortDirection::Desc },
        ];
        sort(&mut meta, &keys, &mut pool).unwrap();

        let sorted = all_rows(&meta, &mut pool);
        prop_assert_eq!(meta.accounted_rows(), meta.row_count);

        let mut expected: Vec<Vec<i32>> = rows.iter().map(|(x, y)| vec![*x, *y]).collect();
        expected.sort_by(|a, b| compare_rows(a, b, &keys));
        prop_assert_eq!(&sorted, &expected);

        sort(&mut meta, &keys, &mut pool).unwrap();
        prop_assert_eq!(all_rows(&meta, &mut pool), expected);
    }
}
