//! Shared fixtures for integration tests: tempdir-rooted engines, CSV
//! seeding, and block-file readback for byte-level assertions.

pub mod fixtures;

use common::Config;
use executor::Engine;
use tempfile::TempDir;

/// Default test block size: 24 bytes = 6 cells = 2 rows of a 3-column table.
pub const TEST_BLOCK_SIZE: usize = 24;

/// Engine over a fresh temp data directory with small test blocks.
pub fn engine() -> (Engine, TempDir) {
    engine_with(TEST_BLOCK_SIZE, 4)
}

/// Engine with explicit block size (bytes) and pool capacity.
pub fn engine_with(block_size: usize, buffer_capacity: usize) -> (Engine, TempDir) {
    let dir = TempDir::new().expect("create temp data dir");
    let config = Config::builder()
        .data_dir(dir.path().to_path_buf())
        .block_size(block_size)
        .buffer_capacity(buffer_capacity)
        .build();
    let engine = Engine::new(config).expect("create engine");
    (engine, dir)
}

/// Seed `<data>/<name>.csv` so a LOAD command can pick it up.
pub fn put_csv(dir: &TempDir, name: &str, text: &str) {
    std::fs::write(dir.path().join(format!("{name}.csv")), text).expect("seed csv");
}

/// Read one block file of an owner back as text.
pub fn block_text(engine: &Engine, owner: &str, index: usize) -> String {
    std::fs::read_to_string(storage::block_path(engine.pool().temp_dir(), owner, index))
        .expect("read block file")
}

/// Every block file of an owner, in index order.
pub fn block_texts(engine: &Engine, owner: &str, count: usize) -> Vec<String> {
    (0..count).map(|i| block_text(engine, owner, i)).collect()
}
