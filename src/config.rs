use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Source column names for the four fields every sales table must carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMapping {
    pub timestamp: String,
    pub date: String,
    pub product: String,
    pub amount: String,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            timestamp: "datetime".to_string(),
            date: "date".to_string(),
            product: "coffee_name".to_string(),
            amount: "money".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

pub const DEFAULT_ALL_PRODUCTS: &str = "All";

/// Settings read from a JSON file; every field is optional.
///
/// ```json
/// {
///   "sources": ["Coffee Sales_1.csv", "Coffee Sales_2.csv"],
///   "columns": { "product": "coffee_name" },
///   "all_products": "All"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub sources: Vec<PathBuf>,
    pub columns: ColumnMapping,
    /// Selection value meaning "do not filter by product".
    pub all_products: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            sources: vec![
                PathBuf::from("Coffee Sales_1.csv"),
                PathBuf::from("Coffee Sales_2.csv"),
            ],
            columns: ColumnMapping::default(),
            all_products: DEFAULT_ALL_PRODUCTS.to_string(),
        }
    }
}

impl DashboardConfig {
    /// Read and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: DashboardConfig =
            serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let cols = &self.columns;
        for (field, name) in [
            ("timestamp", &cols.timestamp),
            ("date", &cols.date),
            ("product", &cols.product),
            ("amount", &cols.amount),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "column name for '{field}' is empty"
                )));
            }
        }
        if self.all_products.is_empty() {
            return Err(ConfigError::Invalid(
                "all_products sentinel is empty".to_string(),
            ));
        }
        Ok(())
    }
}
