//! Archetype catalog and nearest-profile matching.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::dimensions::{Dimension, DimensionVector};
use crate::error::{AffinityError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub text: String,
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Archetype {
    pub id: String,
    pub name: String,
    pub tagline: String,
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<Keyword>,
    /// Names of archetypes this one pairs well with
    #[serde(default)]
    pub compatible_with: Vec<String>,
    /// Reference position the user vector is measured against
    pub profile: DimensionVector,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchetypeMatch {
    pub archetype: Archetype,
    pub distance: f64,
    /// `1 / (1 + distance)`: 1.0 for an exact match, approaching 0 with distance
    pub similarity: f64,
}

/// Read-only archetype reference data, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArchetypeCatalog {
    archetypes: Vec<Archetype>,
}

impl ArchetypeCatalog {
    pub fn new(archetypes: Vec<Archetype>) -> Result<Self> {
        for a in &archetypes {
            if !a.profile.is_finite() {
                return Err(AffinityError::Validation {
                    message: format!("archetype '{}' has a non-finite profile", a.id),
                });
            }
        }
        Ok(Self { archetypes })
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let archetypes: Vec<Archetype> = serde_json::from_str(&content)?;
        tracing::debug!(
            "Loaded {} archetypes from {}",
            archetypes.len(),
            path.display()
        );
        Self::new(archetypes)
    }

    pub fn archetypes(&self) -> &[Archetype] {
        &self.archetypes
    }

    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archetypes.is_empty()
    }

    pub fn by_name(&self, name: &str) -> Option<&Archetype> {
        self.archetypes
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }

    /// Resolve `compatible_with` names; names missing from the catalog are dropped.
    pub fn compatible_archetypes<'a>(&'a self, archetype: &Archetype) -> Vec<&'a Archetype> {
        archetype
            .compatible_with
            .iter()
            .filter_map(|name| self.by_name(name))
            .collect()
    }

    pub fn builtin() -> Self {
        use Dimension::*;
        let v = DimensionVector::zero;

        Self {
            archetypes: vec![
                archetype(
                    "deep-connector",
                    "The Deep Connector",
                    "Love, for you, lives in the conversations that go past midnight.",
                    "You look for emotional intimacy above all else. You open up readily and \
                     want a partner who meets you there.",
                    &[("Empathetic", "💞"), ("Introspective", "🌙"), ("Devoted", "🕯️")],
                    &["The Steady Anchor", "The Thoughtful Communicator"],
                    v().with(EmotionalDepth, 3.0)
                        .with(RelationalStyle, 1.0)
                        .with(CommunicationStyle, 1.0),
                ),
                archetype(
                    "free-spirit",
                    "The Free Spirit",
                    "Connection that leaves room to breathe.",
                    "You value independence and novelty. The best relationships, for you, are \
                     adventures shared between two whole people.",
                    &[("Adventurous", "🌍"), ("Independent", "🦋"), ("Playful", "🎈")],
                    &["The Passionate Idealist", "The Thoughtful Communicator"],
                    v().with(RelationalStyle, -2.0)
                        .with(EmotionalDepth, 0.5)
                        .with(CommunicationStyle, 0.5),
                ),
                archetype(
                    "steady-anchor",
                    "The Steady Anchor",
                    "Reliability is your love language.",
                    "You build trust through consistency. Shared routines and kept promises \
                     matter more to you than grand gestures.",
                    &[("Loyal", "⚓"), ("Grounded", "🌳"), ("Patient", "⏳")],
                    &["The Deep Connector", "The Harmonizer"],
                    v().with(RelationalStyle, 2.5)
                        .with(ValuesAlignment, 1.0)
                        .with(CommunicationStyle, -0.5),
                ),
                archetype(
                    "passionate-idealist",
                    "The Passionate Idealist",
                    "You love with conviction.",
                    "Shared values are your foundation. You want a partner who believes in the \
                     same things and will build toward them with you.",
                    &[("Principled", "🔥"), ("Visionary", "✨"), ("Committed", "🤝")],
                    &["The Free Spirit", "The Steady Anchor"],
                    v().with(ValuesAlignment, 3.0).with(EmotionalDepth, 1.0),
                ),
                archetype(
                    "thoughtful-communicator",
                    "The Thoughtful Communicator",
                    "Every conflict is a conversation waiting to happen.",
                    "You name what you feel and expect the same in return. Clarity and honesty \
                     make you feel safe.",
                    &[("Honest", "💬"), ("Curious", "🔍"), ("Direct", "🎯")],
                    &["The Deep Connector", "The Free Spirit"],
                    v().with(CommunicationStyle, 3.0).with(EmotionalDepth, 0.5),
                ),
                archetype(
                    "harmonizer",
                    "The Harmonizer",
                    "Peace at home is worth protecting.",
                    "You are easygoing and adaptable, and you prefer to smooth things over \
                     rather than escalate. Calm is your superpower.",
                    &[("Easygoing", "🕊️"), ("Adaptable", "🌊"), ("Warm", "☀️")],
                    &["The Steady Anchor", "The Passionate Idealist"],
                    v().with(CommunicationStyle, -2.0).with(RelationalStyle, 1.0),
                ),
            ],
        }
    }
}

fn archetype(
    id: &str,
    name: &str,
    tagline: &str,
    description: &str,
    keywords: &[(&str, &str)],
    compatible_with: &[&str],
    profile: DimensionVector,
) -> Archetype {
    Archetype {
        id: id.to_string(),
        name: name.to_string(),
        tagline: tagline.to_string(),
        description: description.to_string(),
        keywords: keywords
            .iter()
            .map(|(text, emoji)| Keyword {
                text: text.to_string(),
                emoji: emoji.to_string(),
            })
            .collect(),
        compatible_with: compatible_with.iter().map(|s| s.to_string()).collect(),
        profile,
    }
}

/// Rank the catalog by distance to `vector`, nearest first.
///
/// The sort is stable, so equidistant archetypes keep catalog order and the
/// first-declared one wins.
pub fn match_archetypes(
    vector: &DimensionVector,
    catalog: &ArchetypeCatalog,
) -> Result<Vec<ArchetypeMatch>> {
    if catalog.is_empty() {
        return Err(AffinityError::EmptyCatalog);
    }

    let mut matches: Vec<ArchetypeMatch> = catalog
        .archetypes()
        .iter()
        .map(|a| {
            let distance = vector.distance(&a.profile);
            ArchetypeMatch {
                archetype: a.clone(),
                distance,
                similarity: 1.0 / (1.0 + distance),
            }
        })
        .collect();

    matches.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    Ok(matches)
}
