//! Coverage configurations: dataset families and their legal value space.

use serde::{Deserialize, Serialize};

/// The dataset family a configuration belongs to (e.g. mean temperature).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClimaticIndicator {
    /// First segment of every coverage identifier derived from this family
    pub identifier: String,

    /// Human-readable name
    #[serde(default)]
    pub name: String,

    /// Measure unit (e.g. "°C")
    #[serde(default)]
    pub unit: String,
}

/// One (parameter name, value name) binding legal for a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PossibleValue {
    pub parameter: String,
    pub value: String,
}

/// A family of datasets sharing a naming template.
///
/// `coverage_id_pattern` looks like `"{indicator}-{measure}-{scenario}"`:
/// each segment after the first names a configuration parameter, and the
/// Cartesian product of the per-parameter value pools in `possible_values`
/// defines the legal identifier space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageConfiguration {
    pub identifier: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    pub coverage_id_pattern: String,

    pub climatic_indicator: ClimaticIndicator,

    /// Ordered value bindings; iteration order fixes generation order
    #[serde(default)]
    pub possible_values: Vec<PossibleValue>,

    /// Template for the dataset's location on the remote THREDDS server.
    /// May contain `{parameter}` placeholders and fnmatch wildcards.
    pub thredds_url_pattern: String,

    /// Related configurations, referenced by identifier
    #[serde(default)]
    pub secondary_coverage_configurations: Vec<String>,

    /// Lower uncertainty-bound configuration, referenced by identifier
    #[serde(default)]
    pub uncertainty_lower_bound: Option<String>,

    /// Upper uncertainty-bound configuration, referenced by identifier
    #[serde(default)]
    pub uncertainty_upper_bound: Option<String>,
}

fn default_enabled() -> bool {
    true
}

impl CoverageConfiguration {
    /// Parameter names from the identifier template, in segment order.
    ///
    /// The first segment is reserved for the climatic indicator and is
    /// not returned.
    pub fn pattern_parameters(&self) -> Vec<&str> {
        self.coverage_id_pattern
            .split('-')
            .skip(1)
            .map(|segment| {
                segment
                    .trim_start_matches('{')
                    .trim_end_matches('}')
            })
            .collect()
    }

    /// Declared value names for one parameter, in `possible_values` order.
    pub fn values_for<'a>(&'a self, parameter: &'a str) -> impl Iterator<Item = &'a str> {
        self.possible_values
            .iter()
            .filter(move |pv| pv.parameter == parameter)
            .map(|pv| pv.value.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_configuration() -> CoverageConfiguration {
        CoverageConfiguration {
            identifier: "tas-seasonal".to_string(),
            enabled: true,
            coverage_id_pattern: "{indicator}-{measure}-{scenario}".to_string(),
            climatic_indicator: ClimaticIndicator {
                identifier: "tas".to_string(),
                name: "Mean temperature".to_string(),
                unit: "°C".to_string(),
            },
            possible_values: vec![
                PossibleValue {
                    parameter: "measure".to_string(),
                    value: "abs".to_string(),
                },
                PossibleValue {
                    parameter: "scenario".to_string(),
                    value: "rcp26".to_string(),
                },
                PossibleValue {
                    parameter: "scenario".to_string(),
                    value: "rcp85".to_string(),
                },
            ],
            thredds_url_pattern: "seasonal/{scenario}/tas_{measure}.nc".to_string(),
            secondary_coverage_configurations: Vec::new(),
            uncertainty_lower_bound: None,
            uncertainty_upper_bound: None,
        }
    }

    #[test]
    fn test_pattern_parameters() {
        let configuration = sample_configuration();
        assert_eq!(configuration.pattern_parameters(), vec!["measure", "scenario"]);
    }

    #[test]
    fn test_pattern_without_parameters() {
        let mut configuration = sample_configuration();
        configuration.coverage_id_pattern = "{indicator}".to_string();
        assert!(configuration.pattern_parameters().is_empty());
    }

    #[test]
    fn test_values_for_preserves_declaration_order() {
        let configuration = sample_configuration();
        let scenarios: Vec<_> = configuration.values_for("scenario").collect();
        assert_eq!(scenarios, vec!["rcp26", "rcp85"]);
        assert_eq!(configuration.values_for("unknown").count(), 0);
    }

    #[test]
    fn test_deserialize_from_yaml() {
        let yaml = r#"
identifier: tas-annual
coverage_id_pattern: "{indicator}-{measure}"
climatic_indicator:
  identifier: tas
  name: "Mean temperature"
possible_values:
  - parameter: measure
    value: abs
  - parameter: measure
    value: anom
thredds_url_pattern: "annual/tas_{measure}.nc"
"#;
        let configuration: CoverageConfiguration = serde_yaml::from_str(yaml).unwrap();
        assert!(configuration.enabled);
        assert_eq!(configuration.pattern_parameters(), vec!["measure"]);
        assert_eq!(configuration.possible_values.len(), 2);
        assert!(configuration.uncertainty_upper_bound.is_none());
    }
}
