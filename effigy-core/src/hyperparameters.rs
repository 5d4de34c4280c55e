use std::collections::BTreeMap;
use std::fmt;

/// An ordered, named record of a model's tunable settings.
///
/// Each entry pairs a name with a scalar value, and entries iterate in
/// lexicographic name order regardless of insertion order. The record is
/// immutable once built: [`Surrogate::update_hyperparameters`] replaces a
/// model's settings wholesale rather than editing them in place, so two
/// records with the same entries always compare equal and print identically.
///
/// [`Surrogate::update_hyperparameters`]: crate::Surrogate::update_hyperparameters
///
/// # Example
///
/// ```
/// use effigy_core::Hyperparameters;
///
/// let params = Hyperparameters::new()
///     .with("length_scale", 1.5)
///     .with("noise_variance", 0.1);
///
/// assert_eq!(params.get("length_scale"), Some(1.5));
/// assert_eq!(params.to_string(), "{length_scale: 1.5, noise_variance: 0.1}");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde-derive",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct Hyperparameters {
    values: BTreeMap<String, f64>,
}

impl Hyperparameters {
    /// Creates an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new record with the given entry added, keeping other entries unchanged.
    ///
    /// Adding a name that is already present replaces its value.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    /// Returns the value stored under `name`, or `None` if absent.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Returns `true` if an entry named `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the record has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over entries in lexicographic name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(name, &value)| (name.as_str(), value))
    }

    /// Iterates over entry names in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl fmt::Display for Hyperparameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        write!(f, "}}")
    }
}

impl FromIterator<(String, f64)> for Hyperparameters {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<(&'a str, f64)> for Hyperparameters {
    fn from_iter<I: IntoIterator<Item = (&'a str, f64)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }
}

impl IntoIterator for Hyperparameters {
    type Item = (String, f64);
    type IntoIter = std::collections::btree_map::IntoIter<String, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_incrementally_and_reads_back() {
        let params = Hyperparameters::new()
            .with("noise_variance", 0.25)
            .with("prior_mean", -1.0);

        assert_eq!(params.len(), 2);
        assert!(params.contains("noise_variance"));
        assert_eq!(params.get("prior_mean"), Some(-1.0));
        assert_eq!(params.get("missing"), None);
        assert!(!params.contains("missing"));
    }

    #[test]
    fn empty_record_reports_empty() {
        let params = Hyperparameters::new();
        assert!(params.is_empty());
        assert_eq!(params.len(), 0);
        assert_eq!(params.to_string(), "{}");
    }

    #[test]
    fn iterates_in_name_order_regardless_of_insertion_order() {
        let params = Hyperparameters::new()
            .with("zeta", 3.0)
            .with("alpha", 1.0)
            .with("mid", 2.0);

        let names: Vec<&str> = params.names().collect();
        assert_eq!(names, ["alpha", "mid", "zeta"]);

        let entries: Vec<(&str, f64)> = params.iter().collect();
        assert_eq!(entries, [("alpha", 1.0), ("mid", 2.0), ("zeta", 3.0)]);
    }

    #[test]
    fn with_replaces_an_existing_entry() {
        let params = Hyperparameters::new()
            .with("length_scale", 1.0)
            .with("length_scale", 2.5);

        assert_eq!(params.len(), 1);
        assert_eq!(params.get("length_scale"), Some(2.5));
    }

    #[test]
    fn equal_entries_compare_equal_in_any_insertion_order() {
        let forward = Hyperparameters::new().with("a", 1.0).with("b", 2.0);
        let backward = Hyperparameters::new().with("b", 2.0).with("a", 1.0);
        assert_eq!(forward, backward);
    }

    #[test]
    fn displays_entries_in_name_order() {
        let params = Hyperparameters::new()
            .with("noise_variance", 0.5)
            .with("mean", 2.0);
        assert_eq!(params.to_string(), "{mean: 2, noise_variance: 0.5}");
    }

    #[test]
    fn collects_from_name_value_pairs() {
        let params: Hyperparameters = [("a", 1.0), ("b", 2.0)].into_iter().collect();
        assert_eq!(params.get("a"), Some(1.0));
        assert_eq!(params.get("b"), Some(2.0));
    }

    #[test]
    fn round_trips_through_into_iterator() {
        let params = Hyperparameters::new().with("a", 1.0).with("b", 2.0);
        let rebuilt: Hyperparameters = params.clone().into_iter().collect();
        assert_eq!(rebuilt, params);
    }
}
