//! Site configuration management.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Main configuration structure for Folio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site-wide settings.
    pub site: SiteConfig,

    /// Where content comes from.
    #[serde(default)]
    pub source: SourceConfig,

    /// Listing page settings.
    #[serde(default)]
    pub listing: ListingConfig,

    /// Grid sections rendered from CMS-managed grid elements.
    #[serde(default)]
    pub grid: GridConfig,
}

/// Site-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site title.
    pub title: String,

    /// Base URL for the site (e.g., "https://example.com").
    #[serde(default)]
    pub base_url: String,

    /// Language code used in rendered markup.
    #[serde(default = "default_language")]
    pub language: String,

    /// Site description for meta tags.
    #[serde(default)]
    pub description: Option<String>,
}

/// Content source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Directory holding one flat JSON file per collection.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Base URL serving the same JSON files over HTTP.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Content API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Content API version header value.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Environment variable holding the content API token.
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Cache time-to-live in seconds; 0 disables caching.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Collection name to file name overrides (relative to `data_dir`).
    #[serde(default)]
    pub collections: BTreeMap<String, String>,

    /// Collection name to content API database id.
    #[serde(default)]
    pub databases: BTreeMap<String, String>,
}

/// How a listing slices its matches into pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowMode {
    /// Only page N is shown.
    Paged,
    /// Pages 1 through N are shown.
    #[default]
    LoadMore,
}

/// Listing page configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Number of records per page.
    #[serde(default = "default_per_page")]
    pub per_page: usize,

    /// Search input debounce in milliseconds.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Window mode.
    #[serde(default)]
    pub window: WindowMode,

    /// Text shown when a listing has no matches.
    #[serde(default = "default_empty_message")]
    pub empty_message: String,
}

/// Grid section configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Known grid sections.
    #[serde(default = "default_grid_sections")]
    pub sections: Vec<GridSection>,
}

/// One grid section: where its elements go and how they render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSection {
    /// Section id as stored on grid elements.
    pub id: String,

    /// Container selector inside the section.
    pub container: String,

    /// Template tag used for each element.
    #[serde(default = "default_grid_template")]
    pub template: String,
}

impl GridSection {
    /// Create a new grid section entry.
    pub fn new(
        id: impl Into<String>,
        container: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            container: container.into(),
            template: template.into(),
        }
    }
}

// Default value functions
fn default_language() -> String {
    "ja".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_api_base() -> String {
    "https://api.notion.com/v1".to_string()
}

fn default_api_version() -> String {
    "2022-06-28".to_string()
}

fn default_token_env() -> String {
    "NOTION_API_KEY".to_string()
}

fn default_cache_ttl() -> u64 {
    300 // 5 minutes
}

fn default_per_page() -> usize {
    6
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_empty_message() -> String {
    "記事が見つかりませんでした。".to_string()
}

fn default_grid_template() -> String {
    "default".to_string()
}

fn default_grid_sections() -> Vec<GridSection> {
    vec![
        GridSection::new("sns-content", ".project-grid", "sns_card"),
        GridSection::new("brand-content", ".brand-showcase", "brand_item"),
        GridSection::new("development-content", ".development-grid", "dev_card"),
        GridSection::new("writing-content", ".writing-grid", "article_card"),
        GridSection::new("ec-content", ".project-grid", "ec_card"),
        GridSection::new("channels-showcase", ".channels-grid", "channel_card"),
        GridSection::new("business-areas", ".areas-grid", "area_card"),
    ]
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            base_url: None,
            api_base: default_api_base(),
            api_version: default_api_version(),
            token_env: default_token_env(),
            cache_ttl_secs: default_cache_ttl(),
            collections: BTreeMap::new(),
            databases: BTreeMap::new(),
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            debounce_ms: default_debounce_ms(),
            window: WindowMode::default(),
            empty_message: default_empty_message(),
        }
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            sections: default_grid_sections(),
        }
    }
}

impl GridConfig {
    /// Look up a grid section by id.
    pub fn section(&self, id: &str) -> Option<&GridSection> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Whether the section id belongs to a grid section.
    pub fn is_grid(&self, id: &str) -> bool {
        self.section(id).is_some()
    }
}

impl SourceConfig {
    /// File name for a collection, honouring overrides.
    pub fn file_name(&self, collection: &str) -> String {
        self.collections
            .get(collection)
            .cloned()
            .unwrap_or_else(|| format!("{collection}.json"))
    }

    /// Path of a collection's JSON file under `data_dir`.
    pub fn file_path(&self, collection: &str) -> PathBuf {
        self.data_dir.join(self.file_name(collection))
    }

    /// Content API database id for a collection.
    pub fn database_id(&self, collection: &str) -> Option<&str> {
        self.databases.get(collection).map(String::as_str)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig {
                title: "Folio".to_string(),
                base_url: String::new(),
                language: default_language(),
                description: None,
            },
            source: SourceConfig::default(),
            listing: ListingConfig::default(),
            grid: GridConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            CoreError::config_with_source(
                format!("Failed to parse config file: {}", path.display()),
                e,
            )
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration layered with `FOLIO__*` environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("FOLIO").separator("__"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.site.title.is_empty() {
            return Err(CoreError::config("site.title cannot be empty"));
        }

        if self.listing.per_page == 0 {
            return Err(CoreError::config("listing.per_page must be at least 1"));
        }

        for section in &self.grid.sections {
            if section.id.is_empty() {
                return Err(CoreError::config("grid section id cannot be empty"));
            }
            if section.container.is_empty() {
                return Err(CoreError::config(format!(
                    "grid section '{}' has no container selector",
                    section.id
                )));
            }
        }

        if self.site.base_url.ends_with('/') {
            tracing::warn!("site.base_url should not have a trailing slash");
        }

        Ok(())
    }

    /// Get the full URL for a path.
    pub fn url_for(&self, path: &str) -> String {
        let base = self.site.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn create_test_config() -> String {
        r#"
[site]
title = "Test Site"
base_url = "https://example.com"
language = "en"

[source]
data_dir = "content"
cache_ttl_secs = 60

[source.collections]
note_articles = "notes.json"

[source.databases]
note_articles = "abc123"

[listing]
per_page = 9
debounce_ms = 250
window = "paged"
empty_message = "Nothing here"

[[grid.sections]]
id = "sns-content"
container = ".project-grid"
template = "sns_card"
"#
        .to_string()
    }

    #[test]
    fn test_load_config() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("folio.toml");
        let mut file = std::fs::File::create(&config_path).expect("create file");
        file.write_all(create_test_config().as_bytes())
            .expect("write");

        let config = Config::load(&config_path).expect("load config");

        assert_eq!(config.site.title, "Test Site");
        assert_eq!(config.site.language, "en");
        assert_eq!(config.source.data_dir, PathBuf::from("content"));
        assert_eq!(config.source.cache_ttl_secs, 60);
        assert_eq!(
            config.source.file_path("note_articles"),
            PathBuf::from("content/notes.json")
        );
        assert_eq!(config.source.database_id("note_articles"), Some("abc123"));
        assert_eq!(config.listing.per_page, 9);
        assert_eq!(config.listing.debounce_ms, 250);
        assert_eq!(config.listing.window, WindowMode::Paged);
        assert_eq!(config.listing.empty_message, "Nothing here");
        assert_eq!(config.grid.sections.len(), 1);
    }

    #[test]
    fn test_config_defaults() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("folio.toml");
        let minimal_config = r#"
[site]
title = "Minimal Site"
"#;
        std::fs::write(&config_path, minimal_config).expect("write");

        let config = Config::load(&config_path).expect("load config");

        assert_eq!(config.site.language, "ja");
        assert_eq!(config.source.cache_ttl_secs, 300);
        assert_eq!(config.source.api_version, "2022-06-28");
        assert_eq!(
            config.source.file_path("affiling_articles"),
            PathBuf::from("data/affiling_articles.json")
        );
        assert_eq!(config.listing.per_page, 6);
        assert_eq!(config.listing.debounce_ms, 300);
        assert_eq!(config.listing.window, WindowMode::LoadMore);
        assert_eq!(config.grid.sections.len(), 7);
        assert!(config.grid.is_grid("business-areas"));
        assert!(!config.grid.is_grid("hero"));
    }

    #[test]
    fn test_url_for() {
        let mut config = Config::default();
        config.site.base_url = "https://example.com".to_string();

        assert_eq!(config.url_for("/note.html"), "https://example.com/note.html");
        assert_eq!(config.url_for("note.html"), "https://example.com/note.html");
    }

    #[test]
    fn test_config_validation_empty_title() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("folio.toml");
        std::fs::write(&config_path, "[site]\ntitle = \"\"\n").expect("write");

        let result = Config::load(&config_path);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("title cannot be empty")
        );
    }

    #[test]
    fn test_config_validation_zero_per_page() {
        let mut config = Config::default();
        config.listing.per_page = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_grid_without_container() {
        let mut config = Config::default();
        config.grid.sections.push(GridSection::new("broken", "", "default"));
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_config_not_found() {
        let result = Config::load(Path::new("/nonexistent/folio.toml"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
    }
}
