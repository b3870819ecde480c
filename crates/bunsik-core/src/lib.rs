//! Core bunsik library (menu catalog, order register, print composition, persistence, config).

pub mod catalog;
pub mod config;
pub mod grouping;
pub mod logging;
pub mod notes;
pub mod persistence;
pub mod print;
pub mod register;
pub mod spool;
