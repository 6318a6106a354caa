//! Check command - validate configuration and data files

use std::path::Path;

use color_eyre::eyre::{Result, bail};
use folio_core::{Config, Normalizer, RawRecord};
use serde_json::Value;

use crate::collection::Collection;

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run the check command.
///
/// Validates configuration and every JSON file in the data directory.
pub fn run(config_path: &Path, strict: bool) -> Result<()> {
    tracing::info!(?config_path, strict, "Checking configuration and data");

    let mut result = ValidationResult::default();

    println!("Checking configuration...");
    let config = match super::load_config(config_path) {
        Ok(c) => {
            println!("  ✓ Configuration valid");
            Some(c)
        }
        Err(e) => {
            result.add_error(format!("Configuration error: {e:#}"));
            println!("  ✗ Configuration invalid: {e:#}");
            None
        }
    };

    if let Some(ref cfg) = config {
        println!("\nChecking configuration values...");
        check_config_values(cfg, &mut result);

        println!("\nChecking data files...");
        check_data_dir(&cfg.source.data_dir, &mut result);
    }

    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if result.has_warnings() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    if strict && result.has_warnings() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            result.warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

/// Check configuration values for common issues.
pub fn check_config_values(config: &Config, result: &mut ValidationResult) {
    if config.site.base_url.is_empty() {
        result.add_warning("site.base_url is empty");
    } else if !config.site.base_url.starts_with("http") {
        result.add_warning("site.base_url should start with http:// or https://");
    }

    if let Some(base) = config.source.base_url.as_deref()
        && !base.starts_with("http")
    {
        result.add_warning("source.base_url should start with http:// or https://");
    }

    if !config.source.databases.is_empty() && super::api_token(&config.source).is_none() {
        result.add_warning(format!(
            "source.databases is set but {} is not, sync will fail and the content API is not used as a fallback",
            config.source.token_env
        ));
    }

    for collection in config.source.databases.keys() {
        if Collection::from_name(collection).is_none() {
            result.add_warning(format!("Unrecognized collection in source.databases: {collection}"));
        }
    }

    if config.source.cache_ttl_secs == 0 {
        result.add_warning("source.cache_ttl_secs is 0, caching is disabled");
    }

    println!("  ✓ Configuration values checked");
}

/// Check every JSON file under the data directory.
pub fn check_data_dir(dir: &Path, result: &mut ValidationResult) {
    if !dir.is_dir() {
        result.add_error(format!("Data directory missing: {}", dir.display()));
        println!("  ✗ {}/ missing", dir.display());
        return;
    }

    let normalizer = Normalizer::new();
    let mut checked = 0;

    for entry in walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        checked += 1;
        check_data_file(path, &normalizer, result);
    }

    println!("  ✓ {checked} data file(s) checked");
}

fn check_data_file(path: &Path, normalizer: &Normalizer, result: &mut ValidationResult) {
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let value: Value = match std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()))
    {
        Ok(v) => v,
        Err(e) => {
            result.add_error(format!("{}: {e}", path.display()));
            return;
        }
    };

    if !value.is_array() {
        result.add_warning(format!(
            "{}: not a JSON array, it will load as empty",
            path.display()
        ));
        return;
    }

    let Some(collection) = Collection::from_name(&name) else {
        result.add_warning(format!("{}: unrecognized collection", path.display()));
        return;
    };

    let raws = RawRecord::from_results(&value);
    let report = collection.report(normalizer, &raws);
    println!(
        "  ℹ {name} ({collection}): {} record(s), {} published",
        report.records, report.published
    );

    if !report.defaulted_dates.is_empty() {
        result.add_warning(format!(
            "{name}: {} record(s) without a date, defaulted to now: {}",
            report.defaulted_dates.len(),
            report.defaulted_dates.join(", ")
        ));
    }
    if !report.duplicate_ids.is_empty() {
        result.add_warning(format!(
            "{name}: duplicate ids, the last record wins: {}",
            report.duplicate_ids.join(", ")
        ));
    }
}
