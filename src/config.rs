use crate::model::catalog::{Catalog, ColumnConfig};
use crate::model::criteria::{Criteria, Pagination, DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS};
use crate::services::DEFAULT_EXPORT_FILENAME;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted user settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Report definition opened last
    #[serde(default)]
    pub last_report: Option<PathBuf>,
    /// Dataset opened last
    #[serde(default)]
    pub last_data: Option<PathBuf>,
    /// Directory export files are written to
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
    /// Page size used when the report definition has none
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            last_report: None,
            last_data: None,
            export_dir: None,
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    pub fn config_dir() -> Option<PathBuf> {
        let home = env::var("HOME").ok()?;
        Some(PathBuf::from(home).join(".report-tui"))
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("config.json"))
    }

    pub fn log_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("report-tui.log"))
    }

    pub fn load() -> Option<Config> {
        let config_path = Self::config_path()?;
        if !config_path.exists() {
            return None;
        }

        let contents = fs::read_to_string(&config_path).ok()?;
        serde_json::from_str(&contents).ok()
    }

    /// Save the config to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let config_dir = Self::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
        }

        let config_path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(&config_path, contents)?;

        Ok(())
    }

    /// Where an export file with the given name goes
    pub fn export_path(&self, filename: &str) -> PathBuf {
        match &self.export_dir {
            Some(dir) => dir.join(filename),
            None => PathBuf::from(filename),
        }
    }
}

/// Export settings of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub filename: String,
    /// Row keys to export; the visible columns when empty
    pub headers: Vec<String>,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            filename: DEFAULT_EXPORT_FILENAME.to_string(),
            headers: Vec::new(),
        }
    }
}

/// Everything the host hands to a report
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportDefinition {
    pub title: String,
    /// Selectable dimensions, metrics and filters
    #[serde(alias = "criteriaView")]
    pub catalog: Catalog,
    #[serde(alias = "columnConfig")]
    pub columns: Vec<ColumnConfig>,
    /// Initial criteria
    pub criteria: Criteria,
    pub export: ExportSettings,
    /// Page the table when the initial criteria carry no pagination
    pub paginate: bool,
}

impl ReportDefinition {
    /// Load a definition from `.json`, `.yaml` or `.yml`
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read report definition {}", path.display()))?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        let definition = match ext.as_deref() {
            Some("json") => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))?,
            Some("yaml") | Some("yml") => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))?,
            _ => bail!(
                "Unsupported report definition {} (expected .json, .yaml or .yml)",
                path.display()
            ),
        };
        Ok(definition)
    }

    /// Start on page 1 at `page_size` when paging is requested but unset
    ///
    /// Sizes outside the offered options fall back to the default. Returns
    /// whether pagination was added.
    pub fn apply_default_pagination(&mut self, page_size: usize) -> bool {
        if !self.paginate || self.criteria.pagination.is_some() {
            return false;
        }
        let size = if PAGE_SIZE_OPTIONS.contains(&page_size) {
            page_size
        } else {
            DEFAULT_PAGE_SIZE
        };
        self.criteria.pagination = Some(Pagination::new(1, size));
        true
    }

    /// Drop selections the catalog does not know about
    ///
    /// Returns the number of keys removed.
    pub fn prune_stale_criteria(&mut self) -> usize {
        let catalog = &self.catalog;
        let criteria = &mut self.criteria;
        let before = criteria.dimensions.len() + criteria.metrics.len() + criteria.filters.len();

        criteria
            .dimensions
            .retain(|d| catalog.dimensions.iter().any(|i| &i.value == d));
        criteria
            .metrics
            .retain(|m| catalog.metrics.iter().any(|i| &i.value == m));
        criteria.filters.retain(|id, _| catalog.filter(id).is_some());

        before - (criteria.dimensions.len() + criteria.metrics.len() + criteria.filters.len())
    }
}
