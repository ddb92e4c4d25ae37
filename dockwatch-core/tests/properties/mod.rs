//! Property-based tests

mod action_lifecycle_tests;
mod parser_tests;
mod settings_tests;
mod units_tests;
