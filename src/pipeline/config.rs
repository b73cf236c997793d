//! Feature derivation configuration

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default sport-time columns, in the order their percentage columns are appended.
pub const DEFAULT_SPORT_COLUMNS: [&str; 16] = [
    "futebol",
    "futebol_intenacional",
    "futebol_olimpico",
    "blog_cartola",
    "atletismo",
    "ginastica",
    "judo",
    "natacao",
    "basquete",
    "handebol",
    "volei",
    "tenis",
    "canoagem",
    "saltos_ornamentais",
    "home",
    "home_olimpiadas",
];

pub const DAYS_COLUMN: &str = "dias";
pub const VISITS_COLUMN: &str = "visitas";
pub const PAGE_VIEWS_COLUMN: &str = "pviews";

/// Name of the row-wise total of all sport-time columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TotalTimeColumn {
    /// `tempo_modalidades`
    #[default]
    TempoModalidades,
    /// `tempo_total`
    TempoTotal,
}

impl TotalTimeColumn {
    pub fn as_str(&self) -> &'static str {
        match self {
            TotalTimeColumn::TempoModalidades => "tempo_modalidades",
            TotalTimeColumn::TempoTotal => "tempo_total",
        }
    }
}

impl std::fmt::Display for TotalTimeColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration passed explicitly into every derivation step.
///
/// Two pipelines holding different configurations never interfere with each
/// other, since nothing is read from process-wide state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Which name the total sport time is stored under
    pub total_time_column: TotalTimeColumn,
    /// Mutually exclusive time-spend categories
    pub sport_columns: Vec<String>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            total_time_column: TotalTimeColumn::default(),
            sport_columns: DEFAULT_SPORT_COLUMNS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl FeatureConfig {
    pub fn with_total_time_column(mut self, column: TotalTimeColumn) -> Self {
        self.total_time_column = column;
        self
    }

    pub fn with_sport_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sport_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Load a configuration from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: FeatureConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn total_time_name(&self) -> &'static str {
        self.total_time_column.as_str()
    }

    /// `<sport>_perc` for every sport column, in configuration order
    pub fn perc_column_names(&self) -> Vec<String> {
        self.sport_columns
            .iter()
            .map(|name| format!("{}_perc", name))
            .collect()
    }
}
