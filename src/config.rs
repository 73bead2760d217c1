use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV: &str = "PETRO_CONFIG";

// ---------------------------------------------------------------------------
// Top-level configuration
// ---------------------------------------------------------------------------

/// Everything the dashboard needs to know before it loads the dataset.
///
/// All fields have defaults, so a JSON file only needs the keys it changes:
///
/// ```json
/// { "data_path": "data/2023.csv", "analysis": { "sample_size": 500 } }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_path: PathBuf,
    /// Field separator; a `.tsv` file always uses a tab.
    pub separator: char,
    pub columns: ColumnNames,
    pub analysis: AnalysisConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("importacoes-exportacoes.csv"),
            separator: ';',
            columns: ColumnNames::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl Config {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// The CSV reader splits on a single byte.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.separator_byte().map(|_| ())
    }

    fn separator_byte(&self) -> Result<u8, ConfigError> {
        if self.separator.is_ascii() {
            Ok(self.separator as u8)
        } else {
            Err(ConfigError::Separator(self.separator))
        }
    }

    /// Config from `$PETRO_CONFIG` (or defaults), with the data path
    /// overridden by `data_path` when given.
    pub fn resolve(data_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => {
                log::info!("Reading config from {}", Path::new(&path).display());
                Self::load(Path::new(&path))?
            }
            None => Self::default(),
        };
        if let Some(path) = data_path {
            config.data_path = path;
        }
        config.validate()?;
        Ok(config)
    }

    /// Separator byte for `path`: tab for `.tsv`, the configured one otherwise.
    pub fn separator_for(&self, path: &Path) -> Result<u8, ConfigError> {
        let is_tsv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("tsv"));
        if is_tsv {
            Ok(b'\t')
        } else {
            self.separator_byte()
        }
    }
}

// ---------------------------------------------------------------------------
// Header names of the recognised columns
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnNames {
    pub year: String,
    pub product: String,
    pub operation: String,
    pub volume: String,
    pub expenditure: String,
}

impl Default for ColumnNames {
    fn default() -> Self {
        Self {
            year: "ANO".into(),
            product: "PRODUTO".into(),
            operation: "OPERAÇÃO COMERCIAL".into(),
            volume: "IMPORTADO / EXPORTADO".into(),
            expenditure: "DISPÊNDIO / RECEITA".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Analysis parameters
// ---------------------------------------------------------------------------

/// A product / operation pair selecting one subgroup of records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subgroup {
    pub product: String,
    pub operation: String,
}

impl Subgroup {
    pub fn new(product: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            operation: operation.into(),
        }
    }
}

impl std::fmt::Display for Subgroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.product, self.operation)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Upper fence = Q3 + multiplier × IQR.
    pub iqr_multiplier: f64,

    pub zscore_threshold: f64,
    /// Reference point for the theoretical right-tail probability.
    pub tail_z: f64,
    pub histogram_bins: usize,
    /// Standard normal density is evaluated on `[-grid_limit, grid_limit]`.
    pub density_grid_limit: f64,
    pub density_grid_points: usize,

    pub sample_size: usize,
    pub seed: u64,
    pub z_critical: f64,

    pub significance: f64,
    pub group_a: Subgroup,
    pub group_b: Subgroup,
    pub proportion_threshold: f64,
    pub reference_proportion: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            iqr_multiplier: 1.5,
            zscore_threshold: 1.0,
            tail_z: 1.96,
            histogram_bins: 50,
            density_grid_limit: 4.0,
            density_grid_points: 100,
            sample_size: 300,
            seed: 42,
            z_critical: 1.96,
            significance: 0.05,
            group_a: Subgroup::new("GASOLINA A", "EXPORTAÇÃO"),
            group_b: Subgroup::new("ÓLEO DIESEL", "EXPORTAÇÃO"),
            proportion_threshold: 500_000.0,
            reference_proportion: 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "separator": ",", "analysis": { "seed": 7 } }"#).unwrap();
        assert_eq!(config.separator, ',');
        assert_eq!(config.analysis.seed, 7);
        assert_eq!(config.analysis.sample_size, 300);
        assert_eq!(config.columns.volume, "IMPORTADO / EXPORTADO");
    }

    #[test]
    fn tsv_extension_forces_tab() {
        let config = Config::default();
        assert_eq!(config.separator_for(Path::new("data.TSV")).unwrap(), b'\t');
        assert_eq!(config.separator_for(Path::new("data.csv")).unwrap(), b';');
    }

    #[test]
    fn non_ascii_separator_is_rejected() {
        let config: Config = serde_json::from_str(r#"{ "separator": "é" }"#).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Separator('é'))));
        assert!(matches!(
            config.separator_for(Path::new("data.csv")),
            Err(ConfigError::Separator('é'))
        ));
        // A .tsv file never consults the configured separator.
        assert_eq!(config.separator_for(Path::new("data.tsv")).unwrap(), b'\t');
    }

    #[test]
    fn load_rejects_non_ascii_separator() {
        let path = std::env::temp_dir().join(format!("petro-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{ "separator": "§" }"#).unwrap();
        let result = Config::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(ConfigError::Separator('§'))));
    }
}
