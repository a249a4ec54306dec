//! Feature Vector - model input for one reading

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::layout::{feature_index, FEATURE_COUNT, FEATURE_LAYOUT};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Indexed by `layout::IDX_*`
    pub values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values }
    }

    /// `None` unless exactly FEATURE_COUNT values
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        values.try_into().ok().map(Self::from_values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn named(&self, name: &str) -> Option<f64> {
        feature_index(name).map(|i| self.values[i])
    }

    /// name → value, for debug logs
    pub fn to_map(&self) -> BTreeMap<&'static str, f64> {
        FEATURE_LAYOUT.iter().copied().zip(self.values).collect()
    }
}

impl From<[f64; FEATURE_COUNT]> for FeatureVector {
    fn from(values: [f64; FEATURE_COUNT]) -> Self {
        Self::from_values(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_slice_length() {
        assert!(FeatureVector::from_slice(&[1.0; 6]).is_none());
        assert!(FeatureVector::from_slice(&[1.0; 8]).is_none());

        let v = FeatureVector::from_slice(&[21.0, 40.0, 3.0, 4.0, 5.0, 0.5, 0.5]).unwrap();
        assert_eq!(v.named("connections"), Some(5.0));
        assert_eq!(v.named("pressure"), None);
        assert_eq!(v.to_map()["humidity"], 40.0);
    }
}
