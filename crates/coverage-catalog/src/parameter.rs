//! Configuration parameters: named axes of variation and their legal values.

use serde::{Deserialize, Serialize};

/// One legal value of a configuration parameter.
///
/// Value names must not contain `-`: the coverage identifier scheme joins
/// segments with hyphens and parses them back by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationParameterValue {
    /// Name used in coverage identifiers and filters
    pub name: String,

    /// Value substituted into URL templates (defaults to `name`)
    #[serde(default)]
    pub internal_value: Option<String>,

    /// Display ordering within the parameter
    #[serde(default)]
    pub sort_order: i32,
}

impl ConfigurationParameterValue {
    /// The value to substitute into URL templates.
    pub fn internal_value(&self) -> &str {
        self.internal_value.as_deref().unwrap_or(&self.name)
    }
}

/// A named axis of variation (e.g. "measure", "scenario").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigurationParameter {
    pub name: String,

    #[serde(default)]
    pub description: String,

    pub values: Vec<ConfigurationParameterValue>,
}

impl ConfigurationParameter {
    /// Look up a value by name.
    pub fn value(&self, name: &str) -> Option<&ConfigurationParameterValue> {
        self.values.iter().find(|v| v.name == name)
    }

    /// Values ordered by `sort_order`, then declaration order.
    pub fn sorted_values(&self) -> Vec<&ConfigurationParameterValue> {
        let mut values: Vec<_> = self.values.iter().collect();
        values.sort_by_key(|v| v.sort_order);
        values
    }
}

/// Find a parameter by name in a declared set.
pub fn find_parameter<'a>(
    parameters: &'a [ConfigurationParameter],
    name: &str,
) -> Option<&'a ConfigurationParameter> {
    parameters.iter().find(|p| p.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_parameter() -> ConfigurationParameter {
        ConfigurationParameter {
            name: "scenario".to_string(),
            description: String::new(),
            values: vec![
                ConfigurationParameterValue {
                    name: "rcp85".to_string(),
                    internal_value: None,
                    sort_order: 2,
                },
                ConfigurationParameterValue {
                    name: "rcp26".to_string(),
                    internal_value: Some("rcp2_6".to_string()),
                    sort_order: 1,
                },
            ],
        }
    }

    #[test]
    fn test_internal_value_defaults_to_name() {
        let parameter = scenario_parameter();
        assert_eq!(parameter.value("rcp85").unwrap().internal_value(), "rcp85");
        assert_eq!(parameter.value("rcp26").unwrap().internal_value(), "rcp2_6");
    }

    #[test]
    fn test_sorted_values() {
        let parameter = scenario_parameter();
        let names: Vec<_> = parameter.sorted_values().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["rcp26", "rcp85"]);
    }

    #[test]
    fn test_unknown_value() {
        assert!(scenario_parameter().value("rcp45").is_none());
    }
}
