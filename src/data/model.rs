use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// RawRecord – one parsed row, before cleaning
// ---------------------------------------------------------------------------

/// A parsed row whose cells may still be missing.
///
/// `extra` holds every unrecognised column (e.g. month) as text, in header
/// order, so duplicate and null checks see the whole row.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub year: Option<i64>,
    pub product: Option<String>,
    pub operation: Option<String>,
    pub volume: Option<f64>,
    pub expenditure: Option<f64>,
    pub extra: Vec<Option<String>>,
}

/// Hashable identity of a raw row; floats compare by bit pattern.
pub(crate) type RowKey = (
    Option<i64>,
    Option<String>,
    Option<String>,
    Option<u64>,
    Option<u64>,
    Vec<Option<String>>,
);

impl RawRecord {
    pub(crate) fn key(&self) -> RowKey {
        (
            self.year,
            self.product.clone(),
            self.operation.clone(),
            self.volume.map(f64::to_bits),
            self.expenditure.map(f64::to_bits),
            self.extra.clone(),
        )
    }

    /// `Some(record)` when no cell is missing.
    pub fn complete(self) -> Option<Record> {
        Some(Record {
            year: self.year?,
            product: self.product?,
            operation: self.operation?,
            volume: self.volume.filter(|v| !v.is_nan())?,
            expenditure: self.expenditure.filter(|v| !v.is_nan())?,
            extra: self.extra.into_iter().collect::<Option<Vec<_>>>()?,
        })
    }
}

impl From<&Record> for RawRecord {
    fn from(r: &Record) -> Self {
        RawRecord {
            year: Some(r.year),
            product: Some(r.product.clone()),
            operation: Some(r.operation.clone()),
            volume: Some(r.volume),
            expenditure: Some(r.expenditure),
            extra: r.extra.iter().cloned().map(Some).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one cleaned import/export transaction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub year: i64,
    pub product: String,
    /// Commercial operation, e.g. `IMPORTAÇÃO` / `EXPORTAÇÃO`.
    pub operation: String,
    /// Traded volume, strictly positive.
    pub volume: f64,
    /// Expenditure (imports) or revenue (exports).
    pub expenditure: f64,
    pub extra: Vec<String>,
}

// ---------------------------------------------------------------------------
// Numeric columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NumericColumn {
    Year,
    Volume,
    Expenditure,
}

impl NumericColumn {
    pub const ALL: [NumericColumn; 3] = [
        NumericColumn::Year,
        NumericColumn::Volume,
        NumericColumn::Expenditure,
    ];

    pub fn value(self, record: &Record) -> f64 {
        match self {
            NumericColumn::Year => record.year as f64,
            NumericColumn::Volume => record.volume,
            NumericColumn::Expenditure => record.expenditure,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            NumericColumn::Year => "Year",
            NumericColumn::Volume => "Volume",
            NumericColumn::Expenditure => "Expenditure / revenue",
        }
    }
}

impl fmt::Display for NumericColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// CleaningStats – what each pipeline step removed
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleaningStats {
    pub raw_rows: usize,
    pub duplicates_removed: usize,
    pub incomplete_removed: usize,
    pub non_positive_removed: usize,
}

// ---------------------------------------------------------------------------
// Dataset – the cleaned, immutable table
// ---------------------------------------------------------------------------

/// The cleaned table. Built once by the loader and only read afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
    /// Names of the `extra` columns, in header order.
    pub extra_columns: Vec<String>,
    pub cleaning: CleaningStats,
}

impl Dataset {
    pub fn new(records: Vec<Record>, extra_columns: Vec<String>, cleaning: CleaningStats) -> Self {
        Dataset {
            records,
            extra_columns,
            cleaning,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All values of one numeric column, in file order.
    pub fn column(&self, column: NumericColumn) -> Vec<f64> {
        self.records.iter().map(|r| column.value(r)).collect()
    }

    /// `(min, max)` year, `None` when empty.
    pub fn year_range(&self) -> Option<(i64, i64)> {
        let min = self.records.iter().map(|r| r.year).min()?;
        let max = self.records.iter().map(|r| r.year).max()?;
        Some((min, max))
    }

    /// Sorted distinct product names.
    pub fn products(&self) -> BTreeSet<String> {
        self.records.iter().map(|r| r.product.clone()).collect()
    }

    /// Sorted distinct operation types.
    pub fn operations(&self) -> BTreeSet<String> {
        self.records.iter().map(|r| r.operation.clone()).collect()
    }
}
