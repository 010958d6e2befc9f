//! The shipped data/ directory matches the built-in configuration.

use rust_decimal_macros::dec;
use starbank_core::config::DeskConfig;

const DATA_DIR: &str = "../data";

#[test]
fn shipped_data_matches_defaults() {
    let loaded = DeskConfig::load(DATA_DIR).unwrap();
    let defaults = DeskConfig::default();

    assert_eq!(loaded.ranks, defaults.ranks);
    assert_eq!(loaded.commissions, defaults.commissions);
    assert_eq!(loaded.collective_goal, dec!(500000));
    assert_eq!(loaded.colony_stages, defaults.colony_stages);
    assert_eq!(loaded.supervisor_roster, defaults.supervisor_roster);
}

#[test]
fn missing_directory_is_an_error() {
    let err = DeskConfig::load("../no-such-data-dir").unwrap_err();
    assert!(err.to_string().contains("Cannot read"));
}
