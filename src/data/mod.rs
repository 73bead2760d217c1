//! Data layer: core types, loading/cleaning, and subgroup filtering.
//!
//! Architecture:
//! ```text
//!  importacoes-exportacoes.csv (';' separated, comma decimals)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse → locale floats → dedupe → drop nulls → volume > 0
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ Dataset   │  Vec<Record>, read-only after cleaning
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  product + operation predicates → subgroup values
//!   └──────────┘
//! ```

pub mod filter;
pub mod loader;
pub mod model;

pub use loader::{load_file, load_reader, LoadOptions};
pub use model::{CleaningStats, Dataset, NumericColumn, Record};
