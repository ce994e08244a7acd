//! Configuration loading for the coverage catalog.
//!
//! Loads configuration parameters from config/parameters.yaml and one
//! coverage configuration per YAML file from config/coverages/.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use coverage_catalog::{ConfigurationParameter, CoverageConfiguration};

/// Everything the harvester knows about the catalog.
#[derive(Debug, Clone, Default)]
pub struct HarvestCatalog {
    pub parameters: Vec<ConfigurationParameter>,
    pub coverage_configurations: Vec<CoverageConfiguration>,
}

#[derive(Debug, Deserialize)]
struct ParametersFile {
    parameters: Vec<ConfigurationParameter>,
}

/// Load the full catalog from a config directory.
pub fn load_catalog(config_dir: &Path) -> Result<HarvestCatalog> {
    let parameters = load_parameters(&config_dir.join("parameters.yaml"))?;
    let coverage_configurations = load_coverage_configurations(&config_dir.join("coverages"))?;

    info!(
        parameters = parameters.len(),
        coverage_configurations = coverage_configurations.len(),
        "Loaded coverage catalog"
    );

    Ok(HarvestCatalog {
        parameters,
        coverage_configurations,
    })
}

fn load_parameters(path: &Path) -> Result<Vec<ConfigurationParameter>> {
    if !path.exists() {
        warn!(path = %path.display(), "Parameters file not found");
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read parameters file: {}", path.display()))?;

    let file: ParametersFile = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse parameters file: {}", path.display()))?;

    debug!(count = file.parameters.len(), path = %path.display(), "Loaded parameters");
    Ok(file.parameters)
}

/// Load all enabled coverage configurations from a directory.
///
/// A file that fails to parse is logged and skipped; one malformed entry
/// must not abort the batch.
fn load_coverage_configurations(dir: &Path) -> Result<Vec<CoverageConfiguration>> {
    if !dir.exists() {
        warn!(path = %dir.display(), "Coverages config directory not found");
        return Ok(Vec::new());
    }

    let mut configurations = Vec::new();

    let mut entries: Vec<_> = std::fs::read_dir(dir)?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|entry| entry.path())
        .collect();
    entries.sort();

    for path in entries {
        if !path.extension().map_or(false, |ext| ext == "yaml" || ext == "yml") {
            continue;
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read coverage configuration");
                continue;
            }
        };

        match serde_yaml::from_str::<CoverageConfiguration>(&content) {
            Ok(configuration) => {
                if configuration.enabled {
                    info!(
                        configuration = %configuration.identifier,
                        indicator = %configuration.climatic_indicator.identifier,
                        "Loaded coverage configuration"
                    );
                    configurations.push(configuration);
                } else {
                    debug!(
                        configuration = %configuration.identifier,
                        "Skipping disabled coverage configuration"
                    );
                }
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to parse coverage configuration");
            }
        }
    }

    Ok(configurations)
}

/// Warn about catalog entries that cannot produce coverages.
///
/// Nothing here is fatal: a broken configuration degrades to an empty
/// identifier list at generation time.
pub fn validate_catalog(catalog: &HarvestCatalog) {
    for configuration in &catalog.coverage_configurations {
        for parameter in configuration.pattern_parameters() {
            if !catalog.parameters.iter().any(|p| p.name == parameter) {
                warn!(
                    configuration = %configuration.identifier,
                    parameter = %parameter,
                    "Template names an undeclared parameter"
                );
            }
            if configuration.values_for(parameter).next().is_none() {
                warn!(
                    configuration = %configuration.identifier,
                    parameter = %parameter,
                    "Template segment has no bound values and will produce no coverages"
                );
            }
        }

        for possible_value in &configuration.possible_values {
            if possible_value.value.contains('-') {
                warn!(
                    configuration = %configuration.identifier,
                    value = %possible_value.value,
                    "Value name contains a hyphen, which breaks identifier parsing"
                );
            }

            let declared = catalog
                .parameters
                .iter()
                .find(|p| p.name == possible_value.parameter);
            match declared {
                None => warn!(
                    configuration = %configuration.identifier,
                    parameter = %possible_value.parameter,
                    "Possible value references an undeclared parameter"
                ),
                Some(parameter) => {
                    if parameter.value(&possible_value.value).is_none() {
                        warn!(
                            configuration = %configuration.identifier,
                            parameter = %possible_value.parameter,
                            value = %possible_value.value,
                            "Possible value not declared for its parameter"
                        );
                    }
                }
            }
        }
    }
}
