use super::*;
use tempfile::tempdir;

/// Seed `count` single-row block files for `owner`, each holding its index.
fn seed_blocks(dir: &std::path::Path, owner: &str, count: usize) {
    for index in 0..count {
        std::fs::write(block_path(dir, owner, index), format!("{index} {index}\n")).unwrap();
    }
}

#[test]
fn hit_returns_resident_page_without_counting() {
    let dir = tempdir().unwrap();
    seed_blocks(dir.path(), "t", 1);
    let mut pool = BufferManager::new(dir.path(), 2);

    pool.get_page("t", 0).unwrap();
    assert_eq!(pool.blocks_read(), 1);

    pool.get_page("t", 0).unwrap();
    assert_eq!(pool.blocks_read(), 1);
    assert_eq!(pool.blocks_written(), 0);
    assert_eq!(pool.evictions(), 0);
}

#[test]
fn fifo_evicts_oldest_two_of_capacity_plus_two() {
    let dir = tempdir().unwrap();
    let capacity = 3;
    seed_blocks(dir.path(), "t", capacity + 2);
    let mut pool = BufferManager::new(dir.path(), capacity);

    for index in 0..capacity + 2 {
        pool.get_page("t", index).unwrap();
        assert!(pool.resident_count() <= capacity);
    }

    assert_eq!(pool.evictions(), 2);
    assert!(!pool.is_resident("t", 0));
    assert!(!pool.is_resident("t", 1));
    for index in 2..capacity + 2 {
        assert!(pool.is_resident("t", index));
    }
    // Clean evictions write nothing back.
    assert_eq!(pool.blocks_written(), 0);
}

#[test]
fn hits_do_not_reorder_the_queue() {
    let dir = tempdir().unwrap();
    seed_blocks(dir.path(), "t", 3);
    let mut pool = BufferManager::new(dir.path(), 2);

    pool.get_page("t", 0).unwrap();
    pool.get_page("t", 1).unwrap();
    // Re-touch page 0; under LRU this would protect it. FIFO must not.
    pool.get_page("t", 0).unwrap();
    pool.get_page("t", 2).unwrap();

    assert!(!pool.is_resident("t", 0));
    assert!(pool.is_resident("t", 1));
    assert!(pool.is_resident("t", 2));
}

#[test]
fn dirty_eviction_writes_back_and_counts() {
    let dir = tempdir().unwrap();
    seed_blocks(dir.path(), "t", 2);
    let mut pool = BufferManager::new(dir.path(), 1);

    pool.get_page("t", 0).unwrap().set(0, 0, 99);
    pool.get_page("t", 1).unwrap();

    assert_eq!(pool.evictions(), 1);
    assert_eq!(pool.blocks_written(), 1);

    let text = std::fs::read_to_string(block_path(dir.path(), "t", 0)).unwrap();
    assert_eq!(text, "99 0\n");
}

#[test]
fn write_page_bypasses_pool_and_counts() {
    let dir = tempdir().unwrap();
    let mut pool = BufferManager::new(dir.path(), 4);

    pool.write_page("t", 0, vec![vec![7, 8]]).unwrap();
    assert_eq!(pool.blocks_written(), 1);
    assert_eq!(pool.resident_count(), 0);
    assert_eq!(pool.blocks_read(), 0);

    let page = pool.get_page("t", 0).unwrap();
    assert_eq!(page.row(0), &[7, 8]);
    assert_eq!(pool.blocks_read(), 1);
}

#[test]
fn write_page_drops_stale_resident_twin() {
    let dir = tempdir().unwrap();
    seed_blocks(dir.path(), "t", 1);
    let mut pool = BufferManager::new(dir.path(), 4);

    pool.get_page("t", 0).unwrap();
    pool.write_page("t", 0, vec![vec![42, 42]]).unwrap();

    // The refreshed block must be re-read from disk, not served stale.
    let page = pool.get_page("t", 0).unwrap();
    assert_eq!(page.row(0), &[42, 42]);
    assert_eq!(pool.blocks_read(), 2);
}

#[test]
fn fetch_pair_returns_disjoint_borrows() {
    let dir = tempdir().unwrap();
    seed_blocks(dir.path(), "m", 3);
    let mut pool = BufferManager::new(dir.path(), 3);

    let (a, b) = pool.fetch_pair("m", 0, 2).unwrap();
    assert_eq!(a.index(), 0);
    assert_eq!(b.index(), 2);
    a.set(0, 0, -1);
    b.set(0, 0, -2);
    assert_eq!(pool.get_page("m", 0).unwrap().get(0, 0), -1);
    assert_eq!(pool.get_page("m", 2).unwrap().get(0, 0), -2);
}

#[test]
fn fetch_pair_pins_first_block_in_a_tiny_pool() {
    let dir = tempdir().unwrap();
    seed_blocks(dir.path(), "m", 2);
    let mut pool = BufferManager::new(dir.path(), 2);

    // Loading the second block fills the pool; the first must survive.
    let (a, b) = pool.fetch_pair("m", 0, 1).unwrap();
    assert_eq!((a.index(), b.index()), (0, 1));
    assert!(pool.is_resident("m", 0));
    assert!(pool.is_resident("m", 1));
}

#[test]
fn fetch_pair_rejects_duplicate_blocks_and_tiny_pools() {
    let dir = tempdir().unwrap();
    seed_blocks(dir.path(), "m", 2);

    let mut pool = BufferManager::new(dir.path(), 2);
    assert!(pool.fetch_pair("m", 1, 1).is_err());

    let mut single = BufferManager::new(dir.path(), 1);
    assert!(matches!(
        single.fetch_pair("m", 0, 1).unwrap_err(),
        common::DbError::Capacity(_)
    ));
}

#[test]
fn rename_owner_moves_files_and_rewrites_residents() {
    let dir = tempdir().unwrap();
    seed_blocks(dir.path(), "old", 2);
    let mut pool = BufferManager::new(dir.path(), 4);

    pool.get_page("old", 0).unwrap();
    pool.rename_owner("old", "new", 2).unwrap();

    assert!(!block_path(dir.path(), "old", 0).exists());
    assert!(block_path(dir.path(), "new", 0).exists());
    assert!(pool.is_resident("new", 0));
    assert!(!pool.is_resident("old", 0));
}

#[test]
fn rename_flushes_dirty_pages_under_the_new_name() {
    // Regression: resident pages must be matched on the owner field, not the
    // composed file name, or a dirty page evicted after rename would write to
    // the old path.
    let dir = tempdir().unwrap();
    seed_blocks(dir.path(), "old", 2);
    let mut pool = BufferManager::new(dir.path(), 1);

    pool.get_page("old", 0).unwrap().set(0, 1, 77);
    pool.rename_owner("old", "new", 2).unwrap();

    // Force eviction of the dirty renamed page.
    pool.get_page("new", 1).unwrap();

    let text = std::fs::read_to_string(block_path(dir.path(), "new", 0)).unwrap();
    assert_eq!(text, "0 77\n");
    assert!(!block_path(dir.path(), "old", 0).exists());
}

#[test]
fn delete_blocks_removes_files_and_residents() {
    let dir = tempdir().unwrap();
    seed_blocks(dir.path(), "t", 2);
    let mut pool = BufferManager::new(dir.path(), 4);

    pool.get_page("t", 0).unwrap();
    pool.delete_blocks("t", 2);

    assert_eq!(pool.resident_count(), 0);
    assert!(!block_path(dir.path(), "t", 0).exists());
    assert!(!block_path(dir.path(), "t", 1).exists());
}

#[test]
fn flush_writes_dirty_residents_and_keeps_them() {
    let dir = tempdir().unwrap();
    seed_blocks(dir.path(), "t", 1);
    let mut pool = BufferManager::new(dir.path(), 2);

    pool.get_page("t", 0).unwrap().set(0, 0, 5);
    pool.flush().unwrap();

    assert_eq!(pool.blocks_written(), 1);
    assert!(pool.is_resident("t", 0));
    let text = std::fs::read_to_string(block_path(dir.path(), "t", 0)).unwrap();
    assert_eq!(text, "5 0\n");

    // A second flush has nothing dirty to write.
    pool.flush().unwrap();
    assert_eq!(pool.blocks_written(), 1);
}

#[test]
#[should_panic(expected = "capacity must be > 0")]
fn zero_capacity_pool_panics() {
    let dir = tempdir().unwrap();
    let _pool = BufferManager::new(dir.path(), 0);
}

#[test]
fn cursor_walks_rows_across_blocks() {
    let dir = tempdir().unwrap();
    std::fs::write(block_path(dir.path(), "t", 0), "1 2\n3 4\n").unwrap();
    std::fs::write(block_path(dir.path(), "t", 1), "5 6\n").unwrap();
    let mut pool = BufferManager::new(dir.path(), 2);

    let mut cursor = Cursor::new("t", 2);
    assert_eq!(cursor.next_row(&mut pool).unwrap(), Some(vec![1, 2]));
    assert_eq!(cursor.next_row(&mut pool).unwrap(), Some(vec![3, 4]));
    assert_eq!(cursor.next_row(&mut pool).unwrap(), Some(vec![5, 6]));
    assert_eq!(cursor.next_row(&mut pool).unwrap(), None);
    assert_eq!(cursor.next_row(&mut pool).unwrap(), None);
}

#[test]
fn cursor_seek_restarts_at_block_start() {
    let dir = tempdir().unwrap();
    std::fs::write(block_path(dir.path(), "t", 0), "1 2\n3 4\n").unwrap();
    std::fs::write(block_path(dir.path(), "t", 1), "5 6\n").unwrap();
    let mut pool = BufferManager::new(dir.path(), 2);

    let mut cursor = Cursor::new("t", 2);
    cursor.seek_page(1);
    assert_eq!(cursor.next_row(&mut pool).unwrap(), Some(vec![5, 6]));

    cursor.seek_page(0);
    assert_eq!(cursor.cell(&mut pool, 1, 0).unwrap(), 3);
    assert_eq!(cursor.next_row(&mut pool).unwrap(), Some(vec![1, 2]));
}
