use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{PipelineError, Result};
use crate::models::CanonicalField;

/// Environment variable that overrides `data_dir` from the config file.
pub const DATA_DIR_ENV: &str = "PRICE_AGGREGATOR_DATA_DIR";

pub const DEFAULT_CONFIG_PATH: &str = "src/configs/sources.toml";

/// Cell values read as "missing" by the source reader.
const DEFAULT_NA_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// What to do when a configured source file cannot be opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingSourcePolicy {
    /// Abort the whole load.
    #[default]
    Fail,
    /// Log the failure and continue with zero rows for that source.
    Skip,
}

/// Declarative table of every source the aggregator ingests, in ingestion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub on_missing_source: MissingSourcePolicy,
    #[serde(default = "default_na_values")]
    pub na_values: Vec<String>,
    pub sources: Vec<SourceSpec>,
}

/// One source/category export and how its columns map onto canonical fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub file: String,
    pub source: String,
    pub category: String,
    pub columns: BTreeMap<String, CanonicalField>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_na_values() -> Vec<String> {
    DEFAULT_NA_VALUES.iter().map(|s| s.to_string()).collect()
}

impl SourcesConfig {
    /// Load configuration from a TOML file, then apply environment overrides.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        Ok(config.with_data_dir_override(env::var(DATA_DIR_ENV).ok()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SourcesConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Use `path` when given; otherwise the default config file if present,
    /// falling back to the built-in source table.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }

        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            info!("Loading source table from {}", default_path.display());
            return Self::from_file(default_path);
        }

        warn!(
            "No config file at {}, using built-in source table",
            default_path.display()
        );
        Ok(Self::default().with_data_dir_override(env::var(DATA_DIR_ENV).ok()))
    }

    pub fn with_data_dir_override(mut self, data_dir: Option<String>) -> Self {
        if let Some(dir) = data_dir.filter(|d| !d.trim().is_empty()) {
            self.data_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.sources.is_empty() {
            return Err(PipelineError::Config(
                "at least one source must be configured".to_string(),
            ));
        }

        for (index, spec) in self.sources.iter().enumerate() {
            if spec.file.trim().is_empty() {
                return Err(PipelineError::Config(format!(
                    "source #{} has an empty file name",
                    index + 1
                )));
            }
            if spec.source.trim().is_empty() || spec.category.trim().is_empty() {
                return Err(PipelineError::Config(format!(
                    "source '{}' needs both a source label and a category label",
                    spec.file
                )));
            }

            let mut seen: HashMap<CanonicalField, &str> = HashMap::new();
            for (raw, field) in &spec.columns {
                if let Some(previous) = seen.insert(*field, raw) {
                    return Err(PipelineError::Config(format!(
                        "source '{}' maps both '{}' and '{}' to {}",
                        spec.file, previous, raw, field
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn resolve_path(&self, spec: &SourceSpec) -> PathBuf {
        self.data_dir.join(&spec.file)
    }
}

impl SourceSpec {
    pub fn new(
        file: &str,
        source: &str,
        category: &str,
        columns: &[(&str, CanonicalField)],
    ) -> Self {
        Self {
            file: file.to_string(),
            source: source.to_string(),
            category: category.to_string(),
            columns: columns
                .iter()
                .map(|(raw, field)| (raw.to_string(), *field))
                .collect(),
        }
    }

    /// Raw header that feeds `field`, if the source provides one.
    pub fn column_for(&self, field: CanonicalField) -> Option<&str> {
        self.columns
            .iter()
            .find(|(_, mapped)| **mapped == field)
            .map(|(raw, _)| raw.as_str())
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        use CanonicalField::{Brand, Price, ProductName};

        let marketplace = [
            ("Product Name", ProductName),
            ("Price", Price),
            ("Brand", Brand),
        ];
        let flipkart = [
            ("Product", ProductName),
            ("Selling Price", Price),
            ("Brand", Brand),
        ];

        Self {
            data_dir: default_data_dir(),
            on_missing_source: MissingSourcePolicy::Fail,
            na_values: default_na_values(),
            sources: vec![
                SourceSpec::new("amazon1.csv", "Amazon", "Electronics", &marketplace),
                SourceSpec::new("amazon2.csv", "Amazon", "Electronics", &marketplace),
                SourceSpec::new("flipkart_mobile_data.csv", "Flipkart", "Mobile", &flipkart),
                SourceSpec::new("flipkart_laptops.csv", "Flipkart", "Laptop", &flipkart),
                SourceSpec::new("flipkart_earphones.csv", "Flipkart", "Earphones", &flipkart),
                SourceSpec::new("croma.csv", "Croma", "Electronics", &marketplace),
                SourceSpec::new(
                    "Reliance Digital India Product Dataset.csv",
                    "Reliance Digital",
                    "Electronics",
                    &marketplace,
                ),
            ],
        }
    }
}
