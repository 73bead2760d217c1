//! Statistical exploration of petroleum-derivative import/export records.
//!
//! The library loads and cleans the CSV once into a [`data::Dataset`] and
//! runs any of five independent [`analysis::Stage`]s against it. The
//! dashboard binary is only one consumer of [`analysis::run_stage`].

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;

pub use analysis::{run_stage, Stage, StageReport};
pub use config::Config;
pub use data::Dataset;
