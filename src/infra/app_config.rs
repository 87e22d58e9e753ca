use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::application::aggregate::{DEFAULT_CAPACITY, RollingWindow};
use crate::application::classify::{
    ComplaintClassifier, DEFAULT_HIGH_PRIORITY_THRESHOLD, DEFAULT_MAX_TEXT_CHARS,
    KeywordCategorizer, LabelNormalizer,
};
use crate::domain::{
    CategoryRule, ClassifyError, ClassifyResult, LabelMarkers, LabelScheme, MatchStrategy,
    Taxonomy,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Number of most recent complaints kept in the rolling window.
    pub capacity: usize,
    /// Stored text is cut to this many characters; 0 keeps it whole.
    pub max_text_chars: usize,
    pub high_priority_threshold: f64,
    pub labels: LabelsConfig,
    pub taxonomy: TaxonomyConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelsConfig {
    /// Marker groups, tested in order.
    pub groups: Vec<LabelMarkers>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomyConfig {
    pub default_category: String,
    pub strategy: MatchStrategy,
    /// Categories in precedence order.
    pub categories: Vec<CategoryRule>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            high_priority_threshold: DEFAULT_HIGH_PRIORITY_THRESHOLD,
            labels: LabelsConfig::default(),
            taxonomy: TaxonomyConfig::default(),
        }
    }
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            groups: LabelScheme::default_groups(),
        }
    }
}

impl Default for TaxonomyConfig {
    fn default() -> Self {
        Self {
            default_category: Taxonomy::DEFAULT_CATEGORY.to_string(),
            strategy: MatchStrategy::default(),
            categories: Taxonomy::default_rules(),
        }
    }
}

impl AppConfig {
    pub fn taxonomy(&self) -> ClassifyResult<Taxonomy> {
        Taxonomy::new(
            self.taxonomy.categories.clone(),
            self.taxonomy.default_category.clone(),
            self.taxonomy.strategy,
        )
    }

    pub fn label_scheme(&self) -> ClassifyResult<LabelScheme> {
        LabelScheme::new(self.labels.groups.clone())
    }

    pub fn classifier(&self) -> ClassifyResult<ComplaintClassifier> {
        if !(0.0..=1.0).contains(&self.high_priority_threshold) {
            return Err(ClassifyError::invalid(
                "high_priority_threshold",
                format!("{} is outside [0, 1]", self.high_priority_threshold),
            ));
        }
        let max_text_chars = (self.max_text_chars > 0).then_some(self.max_text_chars);
        Ok(ComplaintClassifier::new(
            LabelNormalizer::new(self.label_scheme()?),
            KeywordCategorizer::new(self.taxonomy()?),
        )
        .with_high_priority_threshold(self.high_priority_threshold)
        .with_max_text_chars(max_text_chars))
    }

    pub fn window(&self) -> ClassifyResult<RollingWindow> {
        RollingWindow::new(self.capacity, &self.taxonomy()?)
    }

    /// Check every section without keeping the built parts.
    pub fn validate(&self) -> ClassifyResult<()> {
        self.classifier()?;
        self.window()?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

/// Load the config from `explicit`, `COMPLAINTPRO_CONFIG_PATH` or the data dir.
///
/// A missing file at the default location yields the built-in defaults; a
/// path the user named must exist.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => match std::env::var("COMPLAINTPRO_CONFIG_PATH") {
            Ok(path) => (PathBuf::from(path), true),
            Err(_) => (app_data_dir().join("config.toml"), false),
        },
    };

    if !required && !path.exists() {
        log::debug!("No config at {}, using defaults", path.display());
        return Ok(AppConfig::default());
    }

    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config: AppConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("Invalid config: {}", path.display()))?;
    log::info!("Loaded config from {}", path.display());
    Ok(config)
}

pub fn save_config(config: &AppConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, config.to_toml()?)
        .with_context(|| format!("Failed to write config: {}", path.display()))
}

pub fn app_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var("COMPLAINTPRO_DATA_HOME") {
        return PathBuf::from(path);
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = home::home_dir() {
            return home
                .join("Library")
                .join("Application Support")
                .join("ComplaintPro");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("ComplaintPro");
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(xdg) = std::env::var_os("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("complaintpro");
        }
        if let Some(home) = home::home_dir() {
            return home.join(".local").join("share").join("complaintpro");
        }
    }

    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".complaintpro")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RawComplaint, Sentiment};

    #[test]
    fn defaults_round_trip_through_toml() {
        let config = AppConfig::default();
        let parsed: AppConfig = toml::from_str(&config.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            capacity = 5

            [taxonomy]
            default_category = "Other"
            strategy = "most_hits"

            [[taxonomy.categories]]
            label = "Billing"
            keywords = ["Rechnung"]
            "#,
        )
        .unwrap();
        assert_eq!(config.capacity, 5);
        assert_eq!(config.max_text_chars, DEFAULT_MAX_TEXT_CHARS);
        assert_eq!(config.labels, LabelsConfig::default());

        let taxonomy = config.taxonomy().unwrap();
        assert_eq!(taxonomy.strategy(), MatchStrategy::MostHits);
        assert_eq!(taxonomy.labels(), vec!["Billing", "Other"]);
        assert_eq!(config.window().unwrap().capacity(), 5);
    }

    #[test]
    fn custom_label_groups_drive_the_classifier() {
        let config: AppConfig = toml::from_str(
            r#"
            [[labels.groups]]
            sentiment = "positive"
            markers = ["gut"]
            "#,
        )
        .unwrap();
        let record = config
            .classifier()
            .unwrap()
            .classify(&RawComplaint::text("Alles super").with_label("GUT"))
            .unwrap();
        assert_eq!(record.sentiment(), Sentiment::Positive);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let config = AppConfig {
            capacity: 0,
            ..AppConfig::default()
        };
        assert_eq!(config.validate().unwrap_err().field(), "capacity");

        let config = AppConfig {
            high_priority_threshold: 1.5,
            ..AppConfig::default()
        };
        assert_eq!(
            config.validate().unwrap_err().field(),
            "high_priority_threshold"
        );
    }

    #[test]
    fn load_config_reads_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = AppConfig {
            capacity: 7,
            ..AppConfig::default()
        };
        save_config(&config, &path).unwrap();
        assert_eq!(load_config(Some(&path)).unwrap(), config);
    }

    #[test]
    fn load_config_fails_on_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(&dir.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn load_config_rejects_invalid_taxonomy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[taxonomy]\ndefault_category = \"\"\n").unwrap();
        let err = load_config(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("default category"));
    }
}
