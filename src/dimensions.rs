//! The four relational dimensions and the vector that positions a quiz taker on them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One axis of the relationship profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    EmotionalDepth,
    RelationalStyle,
    ValuesAlignment,
    CommunicationStyle,
}

impl Dimension {
    /// Canonical order used for prompts, insights, and distance computation.
    pub const ALL: [Dimension; 4] = [
        Dimension::EmotionalDepth,
        Dimension::RelationalStyle,
        Dimension::ValuesAlignment,
        Dimension::CommunicationStyle,
    ];

    /// Wire key, as it appears in oracle replies and serialized vectors.
    pub fn key(self) -> &'static str {
        match self {
            Dimension::EmotionalDepth => "emotional_depth",
            Dimension::RelationalStyle => "relational_style",
            Dimension::ValuesAlignment => "values_alignment",
            Dimension::CommunicationStyle => "communication_style",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Dimension::EmotionalDepth => "Emotional Depth",
            Dimension::RelationalStyle => "Relational Style",
            Dimension::ValuesAlignment => "Values Alignment",
            Dimension::CommunicationStyle => "Communication Style",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.key().eq_ignore_ascii_case(key.trim()))
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Position on the four dimensions. Unbounded: adjustments may push a value anywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionVector {
    pub emotional_depth: f64,
    pub relational_style: f64,
    pub values_alignment: f64,
    pub communication_style: f64,
}

impl DimensionVector {
    pub fn new(
        emotional_depth: f64,
        relational_style: f64,
        values_alignment: f64,
        communication_style: f64,
    ) -> Self {
        Self {
            emotional_depth,
            relational_style,
            values_alignment,
            communication_style,
        }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn get(&self, dim: Dimension) -> f64 {
        match dim {
            Dimension::EmotionalDepth => self.emotional_depth,
            Dimension::RelationalStyle => self.relational_style,
            Dimension::ValuesAlignment => self.values_alignment,
            Dimension::CommunicationStyle => self.communication_style,
        }
    }

    fn slot(&mut self, dim: Dimension) -> &mut f64 {
        match dim {
            Dimension::EmotionalDepth => &mut self.emotional_depth,
            Dimension::RelationalStyle => &mut self.relational_style,
            Dimension::ValuesAlignment => &mut self.values_alignment,
            Dimension::CommunicationStyle => &mut self.communication_style,
        }
    }

    pub fn set(&mut self, dim: Dimension, value: f64) {
        *self.slot(dim) = value;
    }

    pub fn add(&mut self, dim: Dimension, delta: f64) {
        *self.slot(dim) += delta;
    }

    /// Builder-style setter, handy for catalogs and tests.
    pub fn with(mut self, dim: Dimension, value: f64) -> Self {
        self.set(dim, value);
        self
    }

    /// Component-wise sum.
    pub fn accumulate(&mut self, other: &DimensionVector) {
        for dim in Dimension::ALL {
            self.add(dim, other.get(dim));
        }
    }

    /// Euclidean distance between two profiles.
    pub fn distance(&self, other: &DimensionVector) -> f64 {
        Dimension::ALL
            .iter()
            .map(|&d| {
                let diff = self.get(d) - other.get(d);
                diff * diff
            })
            .sum::<f64>()
            .sqrt()
    }

    pub fn is_finite(&self) -> bool {
        Dimension::ALL.iter().all(|&d| self.get(d).is_finite())
    }

    /// (dimension, value) pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        Dimension::ALL.into_iter().map(move |d| (d, self.get(d)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_all_zero() {
        let v = DimensionVector::default();
        assert!(v.iter().all(|(_, x)| x == 0.0));
    }

    #[test]
    fn add_and_get_touch_only_one_axis() {
        let mut v = DimensionVector::zero();
        v.add(Dimension::ValuesAlignment, 1.5);
        v.add(Dimension::ValuesAlignment, -0.5);
        assert_eq!(v.values_alignment, 1.0);
        assert_eq!(v.emotional_depth, 0.0);
        assert_eq!(v.relational_style, 0.0);
        assert_eq!(v.communication_style, 0.0);
    }

    #[test]
    fn distance_is_euclidean() {
        let a = DimensionVector::new(0.0, 0.0, 0.0, 0.0);
        let b = DimensionVector::new(3.0, 4.0, 0.0, 0.0);
        assert!((a.distance(&b) - 5.0).abs() < 1e-12);
        assert_eq!(a.distance(&a), 0.0);
    }

    #[test]
    fn missing_fields_deserialize_to_zero() {
        let v: DimensionVector = serde_json::from_str(r#"{"emotional_depth": 2.5}"#).unwrap();
        assert_eq!(v, DimensionVector::zero().with(Dimension::EmotionalDepth, 2.5));
    }

    #[test]
    fn from_key_is_case_insensitive() {
        assert_eq!(
            Dimension::from_key(" Communication_Style "),
            Some(Dimension::CommunicationStyle)
        );
        assert_eq!(Dimension::from_key("charisma"), None);
    }
}
