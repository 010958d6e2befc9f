//! StarBank sales desk: commission and rank progression for a small
//! sales team, backed by a local SQLite ledger.

pub mod calculator;
pub mod clock;
pub mod command;
pub mod config;
pub mod dashboard;
pub mod demo;
pub mod desk;
pub mod duel_subsystem;
pub mod error;
pub mod event;
pub mod ledger_subsystem;
pub mod money;
pub mod name_generator;
pub mod progression_subsystem;
pub mod rng;
pub mod roster_subsystem;
pub mod store;
pub mod subsystem;
pub mod types;
