//! Coverage identifier generation.
//!
//! Expands a configuration's identifier template over its possible-value
//! space. For a pattern `"{indicator}-{measure}-{scenario}"` with two
//! measures and two scenarios this yields four identifiers, e.g.
//! `tas-abs-rcp26`.

use tracing::debug;

use crate::configuration::CoverageConfiguration;
use crate::filter::ValueFilter;
use crate::parameter::{find_parameter, ConfigurationParameter};

/// One concrete dataset instance derived from a configuration.
///
/// Never persisted; lives for the duration of a single operation.
#[derive(Debug, Clone)]
pub struct Coverage<'a> {
    pub identifier: String,
    pub configuration: &'a CoverageConfiguration,
}

impl<'a> Coverage<'a> {
    /// Zip the identifier's value segments with the template's parameter
    /// names, in segment order.
    pub fn segment_bindings(&self) -> Vec<(&str, &str)> {
        self.configuration
            .pattern_parameters()
            .into_iter()
            .zip(self.identifier.split('-').skip(1))
            .collect()
    }

    /// Bindings for URL templating, using each value's internal value
    /// when the declared parameter set provides one.
    ///
    /// Always includes a `climatic_indicator` binding so URL patterns can
    /// reference the dataset family directly.
    pub fn url_bindings(&self, parameters: &[ConfigurationParameter]) -> Vec<(String, String)> {
        let mut bindings = vec![(
            "climatic_indicator".to_string(),
            self.configuration.climatic_indicator.identifier.clone(),
        )];
        for (parameter, value) in self.segment_bindings() {
            let substituted = find_parameter(parameters, parameter)
                .and_then(|p| p.value(value))
                .map(|v| v.internal_value().to_string())
                .unwrap_or_else(|| value.to_string());
            bindings.push((parameter.to_string(), substituted));
        }
        bindings
    }
}

/// Enumerate every legal identifier for a configuration.
///
/// Per template segment, the value pool is the configuration's declared
/// values for that parameter, in `possible_values` order, intersected
/// with the filter when the parameter is restricted. The result is the
/// Cartesian product in segment order; an empty pool yields an empty
/// list rather than an error.
pub fn generate_identifiers(
    configuration: &CoverageConfiguration,
    value_filter: Option<&ValueFilter>,
) -> Vec<String> {
    let parameters = configuration.pattern_parameters();

    let mut pools: Vec<Vec<&str>> = Vec::with_capacity(parameters.len());
    for parameter in &parameters {
        let pool: Vec<&str> = configuration
            .values_for(parameter)
            .filter(|value| value_filter.map_or(true, |f| f.allows(parameter, value)))
            .collect();

        if pool.is_empty() {
            debug!(
                configuration = %configuration.identifier,
                parameter = %parameter,
                "No usable values for template segment, producing no identifiers"
            );
            return Vec::new();
        }

        pools.push(pool);
    }

    // Product in segment order: earlier segments vary slowest.
    let mut combinations: Vec<Vec<&str>> = vec![Vec::new()];
    for pool in &pools {
        let mut extended = Vec::with_capacity(combinations.len() * pool.len());
        for combination in &combinations {
            for value in pool {
                let mut next = combination.clone();
                next.push(value);
                extended.push(next);
            }
        }
        combinations = extended;
    }

    combinations
        .into_iter()
        .map(|combination| {
            let mut segments = Vec::with_capacity(combination.len() + 1);
            segments.push(configuration.climatic_indicator.identifier.as_str());
            segments.extend(combination);
            segments.join("-")
        })
        .collect()
}

/// Generate every coverage implied by a set of configurations.
///
/// Output preserves configuration iteration order and, within each
/// configuration, identifier generation order.
pub fn collect_all_coverages<'a>(
    configurations: &'a [CoverageConfiguration],
    value_filter: Option<&ValueFilter>,
) -> Vec<Coverage<'a>> {
    configurations
        .iter()
        .flat_map(|configuration| {
            generate_identifiers(configuration, value_filter)
                .into_iter()
                .map(move |identifier| Coverage {
                    identifier,
                    configuration,
                })
        })
        .collect()
}
