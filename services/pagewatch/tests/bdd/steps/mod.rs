//! BDD step definitions for pagewatch

pub mod config_steps;
