use indexmap::IndexMap;

/// Garment column that holds fabric weight in ounces.
pub const WEIGHT_FIELD: &str = "Weight";

/// Named body measurements in inches. NaN is stored as given and read back
/// as unknown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyProfile {
    values: IndexMap<String, f64>,
}

impl BodyProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Measurement value, `None` when absent or NaN
    pub fn get(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied().filter(|v| !v.is_nan())
    }

    /// Stored value without NaN filtering
    pub fn raw(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: f64) {
        self.values.insert(field.into(), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for BodyProfile {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// One garment's display name and measurements.
#[derive(Debug, Clone, PartialEq)]
pub struct GarmentProfile {
    pub name: String,
    values: IndexMap<String, f64>,
}

impl GarmentProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: IndexMap::new(),
        }
    }

    /// Builder-style insert, handy for fixtures
    pub fn with(mut self, field: impl Into<String>, value: f64) -> Self {
        self.insert(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<f64> {
        self.values.get(field).copied().filter(|v| !v.is_nan())
    }

    pub fn insert(&mut self, field: impl Into<String>, value: f64) {
        self.values.insert(field.into(), value);
    }

    /// Fabric weight in ounces, if known
    pub fn weight(&self) -> Option<f64> {
        self.get(WEIGHT_FIELD)
    }

    pub fn is_empty(&self) -> bool {
        self.values.values().all(|v| v.is_nan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_reads_as_unknown() {
        let body: BodyProfile = [("ChestWidth", 19.0), ("HemWidth", f64::NAN)]
            .into_iter()
            .collect();
        assert_eq!(body.get("ChestWidth"), Some(19.0));
        assert_eq!(body.get("HemWidth"), None);
        assert!(body.raw("HemWidth").unwrap().is_nan());
        assert_eq!(body.get("SleeveLength"), None);
        assert_eq!(body.len(), 2);
    }

    #[test]
    fn test_garment_builder() {
        let shirt = GarmentProfile::new("Pocket Tee")
            .with("ChestWidth", 21.0)
            .with(WEIGHT_FIELD, 6.1);
        assert_eq!(shirt.name, "Pocket Tee");
        assert_eq!(shirt.get("ChestWidth"), Some(21.0));
        assert_eq!(shirt.weight(), Some(6.1));
        assert!(!shirt.is_empty());
    }

    #[test]
    fn test_garment_without_values_is_empty() {
        assert!(GarmentProfile::new("Blank").is_empty());
        assert!(GarmentProfile::new("Blank").with("Weight", f64::NAN).is_empty());
    }
}
