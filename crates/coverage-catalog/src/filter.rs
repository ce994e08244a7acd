//! Narrowing filters over the parameter-value space.

use std::collections::{HashMap, HashSet};

/// Restricts which parameter values identifier generation may use.
///
/// A parameter with no entry is unfiltered. Filtering only ever narrows
/// the identifier space: a value is used when it is both declared as a
/// possible value of the configuration and allowed here.
#[derive(Debug, Clone, Default)]
pub struct ValueFilter {
    allowed: HashMap<String, HashSet<String>>,
}

impl ValueFilter {
    /// Build a filter from (parameter name, value name) pairs.
    pub fn from_pairs<I, P, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (P, V)>,
        P: Into<String>,
        V: Into<String>,
    {
        let mut allowed: HashMap<String, HashSet<String>> = HashMap::new();
        for (parameter, value) in pairs {
            allowed.entry(parameter.into()).or_default().insert(value.into());
        }
        Self { allowed }
    }

    /// Whether `value` may be used for `parameter`.
    pub fn allows(&self, parameter: &str, value: &str) -> bool {
        match self.allowed.get(parameter) {
            Some(values) => values.contains(value),
            None => true,
        }
    }

    /// True when no parameter is restricted.
    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter_allows_everything() {
        let filter = ValueFilter::default();
        assert!(filter.is_empty());
        assert!(filter.allows("scenario", "rcp26"));
    }

    #[test]
    fn test_filtered_parameter() {
        let filter = ValueFilter::from_pairs([("scenario", "rcp26"), ("scenario", "rcp45")]);
        assert!(filter.allows("scenario", "rcp26"));
        assert!(filter.allows("scenario", "rcp45"));
        assert!(!filter.allows("scenario", "rcp85"));
        // unfiltered parameters stay wide open
        assert!(filter.allows("measure", "anything"));
    }
}
