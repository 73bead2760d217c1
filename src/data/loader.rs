use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::config::{ColumnNames, Config};
use crate::error::{ConfigError, LoadError};

use super::model::{CleaningStats, Dataset, RawRecord};

/// Cell texts read as missing, in addition to the empty string.
const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-NaN", "-nan", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a",
    "nan", "null",
];

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub separator: u8,
    pub columns: ColumnNames,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            separator: b';',
            columns: ColumnNames::default(),
        }
    }
}

impl LoadOptions {
    pub fn for_path(config: &Config, path: &Path) -> Result<Self, ConfigError> {
        Ok(Self {
            separator: config.separator_for(path)?,
            columns: config.columns.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load and clean the dataset at `path`.
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<Dataset, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_reader(file, options)
}

/// Load and clean a dataset from any byte source.
pub fn load_reader<R: Read>(reader: R, options: &LoadOptions) -> Result<Dataset, LoadError> {
    let table = read_raw(reader, options)?;
    Ok(clean(table))
}

// ---------------------------------------------------------------------------
// Step 1 + 2: parse rows, normalise locale decimals
// ---------------------------------------------------------------------------

/// Parsed rows plus the names of the unrecognised columns.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub rows: Vec<RawRecord>,
    pub extra_columns: Vec<String>,
}

struct ColumnIndex {
    year: usize,
    product: usize,
    operation: usize,
    volume: usize,
    expenditure: usize,
    extra: Vec<usize>,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord, names: &ColumnNames) -> Result<Self, LoadError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| LoadError::MissingColumn(name.to_string()))
        };
        let year = find(&names.year)?;
        let product = find(&names.product)?;
        let operation = find(&names.operation)?;
        let volume = find(&names.volume)?;
        let expenditure = find(&names.expenditure)?;

        let known = [year, product, operation, volume, expenditure];
        let extra = (0..headers.len()).filter(|i| !known.contains(i)).collect();

        Ok(ColumnIndex {
            year,
            product,
            operation,
            volume,
            expenditure,
            extra,
        })
    }
}

/// Parse the delimited text into raw rows. Fails on the first numeric cell
/// that is not a number, so no partial table ever escapes.
pub fn read_raw<R: Read>(reader: R, options: &LoadOptions) -> Result<RawTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(options.separator)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let idx = ColumnIndex::from_headers(&headers, &options.columns)?;
    let extra_columns = idx
        .extra
        .iter()
        .map(|&i| headers[i].trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        // Header is line 1, so the first data row reports line 2.
        let line = record
            .position()
            .map_or(rows.len() + 2, |p| p.line() as usize);
        let cell = |i: usize| cell_text(record.get(i).unwrap_or(""));

        let year = cell(idx.year)
            .map(|s| parse_integer(s, line, &options.columns.year))
            .transpose()?;
        let volume = cell(idx.volume)
            .map(|s| parse_locale_float(s, line, &options.columns.volume))
            .transpose()?;
        let expenditure = cell(idx.expenditure)
            .map(|s| parse_locale_float(s, line, &options.columns.expenditure))
            .transpose()?;

        rows.push(RawRecord {
            year,
            product: cell(idx.product).map(str::to_string),
            operation: cell(idx.operation).map(str::to_string),
            volume,
            expenditure,
            extra: idx
                .extra
                .iter()
                .map(|&i| cell(i).map(str::to_string))
                .collect(),
        });
    }

    Ok(RawTable {
        rows,
        extra_columns,
    })
}

/// Trimmed cell text, or `None` for an empty / NA cell.
fn cell_text(raw: &str) -> Option<&str> {
    let s = raw.trim();
    if s.is_empty() || NA_TOKENS.contains(&s) {
        None
    } else {
        Some(s)
    }
}

/// Parse a decimal written with a comma separator, e.g. `"1234,5"`.
pub fn parse_locale_float(s: &str, row: usize, column: &str) -> Result<f64, LoadError> {
    s.replace(',', ".")
        .parse::<f64>()
        .map_err(|_| LoadError::Parse {
            row,
            column: column.to_string(),
            value: s.to_string(),
        })
}

fn parse_integer(s: &str, row: usize, column: &str) -> Result<i64, LoadError> {
    s.parse::<i64>().map_err(|_| LoadError::Parse {
        row,
        column: column.to_string(),
        value: s.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Steps 3–5: dedupe, drop incomplete rows, drop non-positive volumes
// ---------------------------------------------------------------------------

/// Run the cleaning steps in order. Surviving rows keep their file order.
pub fn clean(table: RawTable) -> Dataset {
    let raw_rows = table.rows.len();

    let mut seen = HashSet::with_capacity(raw_rows);
    let unique: Vec<RawRecord> = table
        .rows
        .into_iter()
        .filter(|row| seen.insert(row.key()))
        .collect();
    let duplicates_removed = raw_rows - unique.len();

    let unique_rows = unique.len();
    let complete: Vec<_> = unique.into_iter().filter_map(RawRecord::complete).collect();
    let incomplete_removed = unique_rows - complete.len();

    let complete_rows = complete.len();
    let records: Vec<_> = complete.into_iter().filter(|r| r.volume > 0.0).collect();
    let non_positive_removed = complete_rows - records.len();

    let cleaning = CleaningStats {
        raw_rows,
        duplicates_removed,
        incomplete_removed,
        non_positive_removed,
    };
    log::info!(
        "Cleaned {raw_rows} rows: {duplicates_removed} duplicates, {incomplete_removed} incomplete, \
         {non_positive_removed} non-positive volumes removed, {} kept",
        records.len()
    );

    Dataset::new(records, table.extra_columns, cleaning)
}

/// Feed an already-cleaned dataset through the pipeline again.
pub fn reclean(dataset: &Dataset) -> Dataset {
    let table = RawTable {
        rows: dataset.records().iter().map(RawRecord::from).collect(),
        extra_columns: dataset.extra_columns.clone(),
    };
    clean(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "ANO;MÊS;PRODUTO;OPERAÇÃO COMERCIAL;IMPORTADO / EXPORTADO;DISPÊNDIO / RECEITA\n";

    fn load(body: &str) -> Result<Dataset, LoadError> {
        let text = format!("{HEADER}{body}");
        load_reader(text.as_bytes(), &LoadOptions::default())
    }

    #[test]
    fn converts_comma_decimals() {
        let ds = load("2020;1;GASOLINA A;EXPORTAÇÃO;1234,5;1000\n").unwrap();
        assert_eq!(ds.len(), 1);
        let r = &ds.records()[0];
        assert_eq!(r.volume, 1234.5);
        assert_eq!(r.expenditure, 1000.0);
        assert_eq!(r.extra, vec!["1".to_string()]);
        assert_eq!(ds.extra_columns, vec!["MÊS".to_string()]);
    }

    #[test]
    fn non_numeric_volume_is_parse_error() {
        let err = load("2020;1;GASOLINA A;EXPORTAÇÃO;abc;1000\n").unwrap_err();
        match err {
            LoadError::Parse { row, column, value } => {
                assert_eq!(row, 2);
                assert_eq!(column, "IMPORTADO / EXPORTADO");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_column_is_reported() {
        let text = "ANO;PRODUTO\n2020;X\n";
        let err = load_reader(text.as_bytes(), &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn(c) if c == "OPERAÇÃO COMERCIAL"));
    }

    #[test]
    fn cleaning_steps_remove_duplicates_nulls_and_zero_volumes() {
        let ds = load(
            "2020;1;GASOLINA A;EXPORTAÇÃO;10,0;100\n\
             2020;1;GASOLINA A;EXPORTAÇÃO;10,0;100\n\
             2020;2;GASOLINA A;EXPORTAÇÃO;10,0;100\n\
             2021;1;ÓLEO DIESEL;;5,0;50\n\
             2021;;ÓLEO DIESEL;IMPORTAÇÃO;5,0;50\n\
             2021;3;ÓLEO DIESEL;IMPORTAÇÃO;NA;50\n\
             2022;1;GLP;IMPORTAÇÃO;0;0\n\
             2022;2;GLP;IMPORTAÇÃO;-1,5;0\n\
             2023;1;GLP;IMPORTAÇÃO;7,25;70\n",
        )
        .unwrap();

        assert_eq!(
            ds.cleaning,
            CleaningStats {
                raw_rows: 9,
                duplicates_removed: 1,
                incomplete_removed: 3,
                non_positive_removed: 2,
            }
        );
        let volumes: Vec<f64> = ds.records().iter().map(|r| r.volume).collect();
        assert_eq!(volumes, vec![10.0, 10.0, 7.25]);
        assert_eq!(ds.year_range(), Some((2020, 2023)));
    }

    #[test]
    fn cleaned_dataset_satisfies_invariants() {
        let ds = load(
            "2020;1;A;EXPORTAÇÃO;1,0;1\n\
             2020;1;A;EXPORTAÇÃO;1,0;1\n\
             2020;1;B;EXPORTAÇÃO;0,0;1\n\
             ;1;B;EXPORTAÇÃO;3,0;1\n\
             2021;1;B;EXPORTAÇÃO;3,0;1\n",
        )
        .unwrap();

        let mut keys = HashSet::new();
        for r in ds.records() {
            assert!(r.volume > 0.0);
            assert!(keys.insert(RawRecord::from(r).key()), "duplicate survived");
        }
    }

    #[test]
    fn cleaning_is_idempotent() {
        let ds = load(
            "2020;1;A;EXPORTAÇÃO;1,0;1\n\
             2020;1;A;EXPORTAÇÃO;1,0;1\n\
             2021;1;B;IMPORTAÇÃO;0;1\n\
             2022;1;B;IMPORTAÇÃO;2,5;\n\
             2023;4;C;IMPORTAÇÃO;9,75;12\n",
        )
        .unwrap();
        let again = reclean(&ds);
        assert_eq!(again.records(), ds.records());
        assert_eq!(again.cleaning.duplicates_removed, 0);
        assert_eq!(again.cleaning.incomplete_removed, 0);
        assert_eq!(again.cleaning.non_positive_removed, 0);
    }

    #[test]
    fn custom_separator() {
        let text = "ANO,PRODUTO,OPERAÇÃO COMERCIAL,IMPORTADO / EXPORTADO,DISPÊNDIO / RECEITA\n\
                    2020,A,EXPORTAÇÃO,\"3,5\",10\n";
        let options = LoadOptions {
            separator: b',',
            ..LoadOptions::default()
        };
        let ds = load_reader(text.as_bytes(), &options).unwrap();
        assert_eq!(ds.records()[0].volume, 3.5);
        assert!(ds.extra_columns.is_empty());
    }
}
