pub mod common;

mod config_scenarios;
