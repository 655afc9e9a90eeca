use super::*;

#[test]
fn config_defaults_match_engine_constants() {
    let config = Config::default();
    assert_eq!(config.block_size, BLOCK_SIZE_KB * 1000);
    assert_eq!(config.buffer_capacity, BLOCK_COUNT);
    assert_eq!(config.print_count, PRINT_COUNT);
}

#[test]
fn config_builder_overrides_selected_fields() {
    let config = Config::builder().block_size(64).buffer_capacity(3).build();
    assert_eq!(config.block_size, 64);
    assert_eq!(config.buffer_capacity, 3);
    assert_eq!(config.print_count, PRINT_COUNT);
}

#[test]
fn temp_and_csv_paths_hang_off_data_dir() {
    let config = Config::builder()
        .data_dir(std::path::PathBuf::from("/srv/db"))
        .build();
    assert_eq!(config.temp_dir(), std::path::PathBuf::from("/srv/db/temp"));
    assert_eq!(
        config.csv_path("trips"),
        std::path::PathBuf::from("/srv/db/trips.csv")
    );
}

#[test]
fn errors_render_with_kind_prefixes() {
    assert_eq!(
        format!("{}", DbError::Parse("bad token".into())),
        "parse: bad token"
    );
    assert_eq!(
        format!("{}", DbError::Capacity("too small".into())),
        "capacity: too small"
    );
}
